use crate::cli::Cli;
use log::LevelFilter;
use sports_data::translation::CacheSettings;

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub sport: String,
    pub cache: CacheSettings,
    pub log_level: LevelFilter,
}

impl AppSettings {
    /// Cache settings from the environment, overridden by the global flags.
    /// `RUST_LOG` still wins over `log_level`.
    pub fn load(cli: &Cli) -> Self {
        let mut cache = CacheSettings::from_env();
        if let Some(root) = &cli.cache_dir {
            cache.root = root.clone();
        }
        cache.use_cache = !cli.no_cache;
        cache.reset_cache = cli.reset_cache;

        Self {
            sport: cli.sport.clone(),
            cache,
            log_level: if cli.verbose { LevelFilter::Debug } else { LevelFilter::Warn },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::Path;

    #[test]
    fn global_flags_override_defaults() {
        let cli = Cli::parse_from(["lukhed-sports", "providers"]);
        let settings = AppSettings::load(&cli);
        assert!(settings.cache.use_cache);
        assert!(!settings.cache.reset_cache);
        assert_eq!(settings.log_level, LevelFilter::Warn);
        assert_eq!(settings.sport, "nfl");

        let cli = Cli::parse_from([
            "lukhed-sports",
            "providers",
            "--no-cache",
            "--reset-cache",
            "--verbose",
            "--cache-dir",
            "/tmp/teams",
        ]);
        let settings = AppSettings::load(&cli);
        assert!(!settings.cache.use_cache);
        assert!(settings.cache.reset_cache);
        assert_eq!(settings.cache.root, Path::new("/tmp/teams"));
        assert_eq!(settings.log_level, LevelFilter::Debug);
    }
}
