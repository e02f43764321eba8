use clap::{Parser, Subcommand};
use sports_data::Season;
use sports_data::odds::OddsFormat;
use std::path::PathBuf;

/// Team name translation and betting helpers.
#[derive(Parser, Debug)]
#[command(name = "lukhed-sports", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Sport for team translations
    #[arg(long, global = true, default_value = "nfl")]
    pub sport: String,

    /// Do not read or write the local cache
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Re-download the sport's translation data before running
    #[arg(long, global = true)]
    pub reset_cache: bool,

    /// Cache root (default: $LUKHED_SPORTS_CACHE_DIR, then lukhed_sports/local_cache/translations)
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// List every provider in the translation dataset
    Providers,

    /// Translate a team name from one provider's naming to another's
    Convert {
        team: String,
        /// Source provider, any synonym (e.g. "Action Network")
        #[arg(long)]
        from: String,
        /// Target provider
        #[arg(long)]
        to: String,
        #[arg(long, default_value = "long")]
        from_type: String,
        #[arg(long, default_value = "long")]
        to_type: String,
        /// A year or "latest"
        #[arg(long, default_value = "latest")]
        from_season: Season,
        #[arg(long, default_value = "latest")]
        to_season: Season,
    },

    /// Print a provider's ordered team list
    Teams {
        provider: String,
        #[arg(long = "type", default_value = "long")]
        team_type: String,
        #[arg(long, default_value = "latest")]
        season: Season,
    },

    /// Convert odds between formats and show the implied probability
    Odds {
        #[arg(allow_hyphen_values = true)]
        value: String,
        #[arg(long, default_value = "american")]
        from: OddsFormat,
        #[arg(long, default_value = "decimal")]
        to: OddsFormat,
    },

    /// Delete the sport's cached translation files
    ClearCache,

    /// Delete and re-download the sport's translation files
    ResetCache,
}
