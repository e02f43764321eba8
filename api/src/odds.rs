//! Odds format conversion. Every conversion goes through decimal odds.

use crate::round_to;
use std::fmt;
use std::str::FromStr;

const FRACTION_DENOMINATOR: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OddsFormat {
    American,
    Decimal,
    Fractional,
}

impl FromStr for OddsFormat {
    type Err = OddsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "american" | "us" => Ok(OddsFormat::American),
            "decimal" | "eu" => Ok(OddsFormat::Decimal),
            "fractional" | "uk" => Ok(OddsFormat::Fractional),
            other => Err(OddsError::UnknownFormat(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OddsError {
    InvalidNumber(String),
    InvalidFraction(String),
    UnknownFormat(String),
    OutOfRange(String),
}

impl fmt::Display for OddsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OddsError::InvalidNumber(s) => write!(f, "'{s}' is not a number"),
            OddsError::InvalidFraction(s) => write!(f, "'{s}' is not a fraction like 5/2"),
            OddsError::UnknownFormat(s) => {
                write!(f, "unknown odds format '{s}': use american, decimal or fractional")
            }
            OddsError::OutOfRange(s) => write!(f, "odds '{s}' have no equivalent in the requested format"),
        }
    }
}

impl std::error::Error for OddsError {}

/// Decimal odds to six places.
pub fn to_decimal(odds: &str, format: OddsFormat) -> Result<f64, OddsError> {
    let text = odds.trim();
    let decimal = match format {
        OddsFormat::American => {
            let american = parse_number(text)?;
            if american == 0.0 {
                return Err(OddsError::OutOfRange(text.to_owned()));
            }
            if american > 0.0 {
                american / 100.0 + 1.0
            } else {
                100.0 / american.abs() + 1.0
            }
        }
        OddsFormat::Decimal => parse_number(text)?,
        OddsFormat::Fractional => {
            let (numerator, denominator) = text
                .split_once('/')
                .and_then(|(n, d)| Some((n.trim().parse::<i64>().ok()?, d.trim().parse::<i64>().ok()?)))
                .filter(|(n, d)| *n >= 0 && *d > 0)
                .ok_or_else(|| OddsError::InvalidFraction(text.to_owned()))?;
            numerator as f64 / denominator as f64 + 1.0
        }
    };
    Ok(round_to(decimal, 6))
}

/// Convert odds text between formats. Unchanged when `from == to`.
///
/// Decimal output has three places, American output carries an explicit `+`
/// at even money and longer, and fractional output is reduced from thousandths.
pub fn convert_odds(odds: &str, from: OddsFormat, to: OddsFormat) -> Result<String, OddsError> {
    if from == to {
        return Ok(odds.trim().to_owned());
    }
    let decimal = to_decimal(odds, from)?;

    match to {
        OddsFormat::Decimal => Ok(round_to(decimal, 3).to_string()),
        OddsFormat::American => {
            if decimal >= 2.0 {
                Ok(format!("+{}", ((decimal - 1.0) * 100.0).round() as i64))
            } else if decimal > 1.0 {
                Ok(format!("{}", (-100.0 / (decimal - 1.0)).round() as i64))
            } else {
                Err(OddsError::OutOfRange(odds.trim().to_owned()))
            }
        }
        OddsFormat::Fractional => {
            let profit = decimal - 1.0;
            if profit < 0.0 {
                return Err(OddsError::OutOfRange(odds.trim().to_owned()));
            }
            let numerator = (profit * FRACTION_DENOMINATOR as f64).round() as i64;
            if numerator == 0 {
                return Ok("0/1".to_owned());
            }
            let divisor = gcd(numerator, FRACTION_DENOMINATOR);
            Ok(format!("{}/{}", numerator / divisor, FRACTION_DENOMINATOR / divisor))
        }
    }
}

/// Break-even win probability, to four places.
pub fn implied_probability(odds: &str, format: OddsFormat) -> Result<f64, OddsError> {
    let decimal = to_decimal(odds, format)?;
    if decimal <= 0.0 {
        return Err(OddsError::OutOfRange(odds.trim().to_owned()));
    }
    Ok(round_to(1.0 / decimal, 4))
}

fn parse_number(text: &str) -> Result<f64, OddsError> {
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| OddsError::InvalidNumber(text.to_owned()))
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
