mod cli;
mod settings;

use crate::cli::{Cli, Command};
use crate::settings::AppSettings;
use anyhow::Context;
use clap::Parser;
use log::debug;
use sports_data::odds;
use sports_data::translation::{CacheSettings, ConversionRequest, TeamConversion, TranslationError};

fn main() -> anyhow::Result<()> {
    better_panic::install();

    let cli = Cli::parse();
    let settings = AppSettings::load(&cli);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(settings.log_level.as_str()))
        .init();
    debug!("settings: {settings:?}");

    run(cli.command, &settings)
}

fn run(command: Command, settings: &AppSettings) -> anyhow::Result<()> {
    if let Command::Odds { value, from, to } = &command {
        let converted = odds::convert_odds(value, *from, *to)?;
        let probability = odds::implied_probability(value, *from)?;
        println!("{converted}\t(implied {:.2}%)", probability * 100.0);
        return Ok(());
    }

    let mut conversion = match TeamConversion::new(&settings.sport, cache_settings_for(&command, settings)) {
        Ok(conversion) => conversion,
        Err(e @ TranslationError::UnsupportedSport(_)) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
        Err(e) => return Err(e).context("could not prepare team conversions"),
    };

    match command {
        Command::Providers => {
            for provider in conversion.supported_providers()? {
                println!("{provider}");
            }
        }
        Command::Convert { team, from, to, from_type, to_type, from_season, to_season } => {
            let request = ConversionRequest::new(&from, &to)
                .team_types(&from_type, &to_type)
                .from_season(from_season)
                .to_season(to_season);
            let result = conversion.convert_team(&team, &request)?;
            println!("{result}");
        }
        Command::Teams { provider, team_type, season } => {
            let teams = conversion
                .team_list(&provider, &team_type, season)
                .with_context(|| format!("no {team_type} team list for {provider} ({season})"))?;
            for (i, team) in teams.iter().enumerate() {
                println!("{i:>3}  {team}");
            }
        }
        Command::ClearCache => {
            conversion.clear_cache()?;
            println!("cleared {}", conversion.cache_dir().display());
        }
        Command::ResetCache => {
            let count = conversion.reset_cache()?;
            println!("downloaded {count} files to {}", conversion.cache_dir().display());
        }
        Command::Odds { .. } => {}
    }
    Ok(())
}

/// `reset-cache` downloads the dataset itself, so construction must not do it first.
fn cache_settings_for(command: &Command, settings: &AppSettings) -> CacheSettings {
    let mut cache = settings.cache.clone();
    if *command == Command::ResetCache {
        cache.reset_cache = false;
    }
    cache
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_command_does_not_download_twice() {
        let cli = Cli::parse_from(["lukhed-sports", "--reset-cache", "reset-cache"]);
        let settings = AppSettings::load(&cli);
        assert!(settings.cache.reset_cache);
        assert!(!cache_settings_for(&cli.command, &settings).reset_cache);

        let cli = Cli::parse_from(["lukhed-sports", "--reset-cache", "providers"]);
        let settings = AppSettings::load(&cli);
        assert!(cache_settings_for(&cli.command, &settings).reset_cache);
    }
}
