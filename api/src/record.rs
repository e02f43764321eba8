//! Win-loss-push records and streaks.

use crate::grading::unit_profit;
use crate::{Grade, round_to};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A `wins-losses-pushes` record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
    pub pushes: u32,
}

impl Record {
    pub fn new(wins: u32, losses: u32, pushes: u32) -> Self {
        Self { wins, losses, pushes }
    }

    pub fn from_results<I: IntoIterator<Item = Grade>>(results: I) -> Self {
        results.into_iter().fold(Self::default(), |mut record, grade| {
            record.add(grade);
            record
        })
    }

    pub fn add(&mut self, grade: Grade) {
        match grade {
            Grade::Win => self.wins += 1,
            Grade::Loss => self.losses += 1,
            Grade::Push => self.pushes += 1,
        }
    }

    pub fn games_played(&self) -> u32 {
        self.wins + self.losses + self.pushes
    }

    pub fn plus_minus(&self) -> i64 {
        i64::from(self.wins) - i64::from(self.losses)
    }

    /// Net units if every win and loss was a flat bet at `american_odds`.
    pub fn unit_profit(&self, american_odds: i32, units: f64) -> f64 {
        let won = f64::from(self.wins) * unit_profit(american_odds, units, Grade::Win);
        let lost = f64::from(self.losses) * unit_profit(american_odds, units, Grade::Loss);
        round_to(won + lost, 2)
    }

    pub fn percentages(&self, places: u32) -> RecordPercentages {
        let total = f64::from(self.games_played());
        let decided = f64::from(self.wins + self.losses);
        let (wins, losses, pushes) = (f64::from(self.wins), f64::from(self.losses), f64::from(self.pushes));

        let pct = |numerator: f64, denominator: f64| {
            (denominator > 0.0).then(|| round_to(numerator / denominator * 100.0, places))
        };

        RecordPercentages {
            win: pct(wins, total),
            win_pushes_half: pct(wins + 0.5 * pushes, total),
            win_ignore_pushes: pct(wins, decided),
            loss: pct(losses, total),
            loss_pushes_half: pct(losses + 0.5 * pushes, total),
            loss_ignore_pushes: pct(losses, decided),
            push: pct(pushes, total),
        }
    }

    /// Fraction of games won, to two places. `None` with no qualifying games.
    pub fn win_rate(&self, exclude_push: bool) -> Option<f64> {
        let games = if exclude_push { self.wins + self.losses } else { self.games_played() };
        (games > 0).then(|| round_to(f64::from(self.wins) / f64::from(games), 2))
    }
}

impl FromIterator<Grade> for Record {
    fn from_iter<I: IntoIterator<Item = Grade>>(iter: I) -> Self {
        Self::from_results(iter)
    }
}

impl FromStr for Record {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('-').collect();
        let &[wins, losses, pushes] = parts.as_slice() else {
            return Err(format!("invalid record '{s}': expected wins-losses-pushes"));
        };
        let count = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| format!("invalid record '{s}': '{part}' is not a count"))
        };
        Ok(Self::new(count(wins)?, count(losses)?, count(pushes)?))
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.wins, self.losses, self.pushes)
    }
}

/// Percentages (0-100) under the three common push conventions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPercentages {
    pub win: Option<f64>,
    pub win_pushes_half: Option<f64>,
    pub win_ignore_pushes: Option<f64>,
    pub loss: Option<f64>,
    pub loss_pushes_half: Option<f64>,
    pub loss_ignore_pushes: Option<f64>,
    pub push: Option<f64>,
}

// ---------------------------------------------------------------------------
// Streaks: positive counts wins, negative counts losses
// ---------------------------------------------------------------------------

/// The streak after one more result.
pub fn extend_streak(current: i32, grade: Grade) -> i32 {
    let step = grade.as_int();
    let continues = (current > 0 && step > 0) || (current < 0 && step < 0);
    if continues { current + step } else { step }
}

/// Streak at the end of `results` (oldest first). A trailing push gives 0.
pub fn streak(results: &[Grade]) -> i32 {
    let Some(last) = results.last() else {
        return 0;
    };
    let run = results.iter().rev().take_while(|g| *g == last).count();
    last.as_int() * i32::try_from(run).unwrap_or(i32::MAX)
}

/// Streak going into each game, so entry `i` ignores `results[i]` and later.
pub fn streak_list(results: &[Grade]) -> Vec<i32> {
    (0..results.len()).map(|i| streak(&results[..i])).collect()
}
