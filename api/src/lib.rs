pub mod client;
pub mod draftkings;
pub mod github;
pub mod grading;
pub mod ngs;
pub mod odds;
pub mod record;
pub mod sportspage;
pub mod translation;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Domain types shared by the provider wrappers and the pure helpers
// ---------------------------------------------------------------------------

/// Sports with a team translation dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sport {
    Nfl,
}

impl Sport {
    pub const SUPPORTED: [Sport; 1] = [Sport::Nfl];

    /// Case-insensitive lookup against the supported list.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::SUPPORTED.into_iter().find(|s| s.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Nfl => "nfl",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Season selector used by the translation tables and the schedule wrapper.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Season {
    /// The most recent season a data source knows about.
    #[default]
    Latest,
    Year(i32),
}

impl From<i32> for Season {
    fn from(year: i32) -> Self {
        Season::Year(year)
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("latest") || s.eq_ignore_ascii_case("current") {
            return Ok(Season::Latest);
        }
        s.parse::<i32>()
            .map(Season::Year)
            .map_err(|_| format!("invalid season '{s}': use a year or 'latest'"))
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Season::Latest => f.write_str("latest"),
            Season::Year(year) => write!(f, "{year}"),
        }
    }
}

/// Result of a single wager or game from one side's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Win,
    Loss,
    Push,
}

impl Grade {
    /// Win = 1, loss = -1, push = 0.
    pub fn as_int(&self) -> i32 {
        match self {
            Grade::Win => 1,
            Grade::Loss => -1,
            Grade::Push => 0,
        }
    }

    pub fn short(&self) -> &'static str {
        match self {
            Grade::Win => "w",
            Grade::Loss => "l",
            Grade::Push => "push",
        }
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "w" | "win" => Ok(Grade::Win),
            "l" | "loss" => Ok(Grade::Loss),
            "p" | "push" | "tie" => Ok(Grade::Push),
            other => Err(format!("invalid result '{other}': use win, loss or push")),
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Grade::Win => "win",
            Grade::Loss => "loss",
            Grade::Push => "push",
        })
    }
}

/// Which team of a game an outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Away,
    Home,
    Tie,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalSide {
    Over,
    Under,
}

impl FromStr for TotalSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "over" | "o" => Ok(TotalSide::Over),
            "under" | "u" => Ok(TotalSide::Under),
            other => Err(format!("invalid total side '{other}': use over or under")),
        }
    }
}

/// Round half away from zero to `places` decimal places.
pub(crate) fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    let rounded = (value * factor).round() / factor;
    // Avoid printing "-0".
    if rounded == 0.0 { 0.0 } else { rounded }
}
