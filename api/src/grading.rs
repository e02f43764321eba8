//! Wager grading against final scores.
//!
//! Margins are reported from the bettor's side: positive means the pick
//! cleared the number by that much.

use crate::{Grade, Side, TotalSide, round_to};
use serde::Serialize;

/// "pk"/"ev" are pick'em (0). Blank and "n/a" are no line at all.
pub fn parse_spread(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("pk") || text.eq_ignore_ascii_case("ev") {
        return Some(0.0);
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `+3.5`, `-7.0`, or `EV` for zero. Whole numbers keep one decimal place.
pub fn pretty_spread(value: f64) -> String {
    let number = if value.fract() == 0.0 { format!("{value:.1}") } else { format!("{value}") };
    if value > 0.0 {
        format!("+{number}")
    } else if value < 0.0 {
        number
    } else {
        "EV".to_owned()
    }
}

/// Grade a spread bet. `None` when the spread cannot be read.
pub fn grade_side(pick_score: f64, opp_score: f64, spread: &str) -> Option<(Grade, f64)> {
    let margin = pick_score + parse_spread(spread)? - opp_score;
    Some((grade_margin(margin), margin))
}

/// Grade an over/under. The margin is `combined score - line` regardless of side.
pub fn grade_total(away_score: f64, home_score: f64, line: f64, side: TotalSide) -> (Grade, f64) {
    let margin = away_score + home_score - line;
    if margin == 0.0 {
        return (Grade::Push, 0.0);
    }
    let won = match side {
        TotalSide::Over => margin > 0.0,
        TotalSide::Under => margin < 0.0,
    };
    (if won { Grade::Win } else { Grade::Loss }, margin)
}

pub fn grade_moneyline(pick_score: i32, opp_score: i32) -> Grade {
    grade_margin(f64::from(pick_score - opp_score))
}

/// Units won or lost on a single wager at American odds.
pub fn unit_profit(american_odds: i32, units: f64, grade: Grade) -> f64 {
    match grade {
        Grade::Loss => -units,
        Grade::Push => 0.0,
        Grade::Win if american_odds < 0 => round_to(100.0 / f64::from(american_odds.abs()) * units, 2),
        Grade::Win => round_to(f64::from(american_odds) / 100.0 * units, 2),
    }
}

/// `(absolute move, signed move)` from `start` to `end`.
pub fn odd_move(start: f64, end: f64) -> (f64, f64) {
    let signed = end - start;
    ((start - end).abs(), if signed == 0.0 { 0.0 } else { signed })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Absolute,
    /// Points gained (positive) or lost by whoever holds the opening number.
    Value,
}

pub fn spread_move(open: f64, latest: f64, kind: MoveKind) -> f64 {
    match kind {
        MoveKind::Absolute => (open - latest).abs(),
        MoveKind::Value => open - latest,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalResult {
    Over,
    Under,
    Push,
}

/// Everything derivable about one final score against its closing lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsSummary {
    pub away_score: Option<i32>,
    pub home_score: Option<i32>,
    pub home_spread: Option<f64>,
    pub total: Option<f64>,
    pub winner: Option<Side>,
    pub ats_winner: Option<Side>,
    pub home_win_by: Option<i32>,
    pub away_win_by: Option<i32>,
    pub away_ats_grade: Option<Grade>,
    pub home_ats_grade: Option<Grade>,
    pub away_cover_by: Option<f64>,
    pub home_cover_by: Option<f64>,
    pub total_grade: Option<TotalResult>,
    pub over_cover_by: Option<f64>,
    pub under_cover_by: Option<f64>,
    pub total_cover_by: Option<f64>,
}

/// Scores are required for anything beyond echoing the inputs back.
/// A missing spread or total only blanks the fields that depend on it.
pub fn ats_summary(
    away_score: Option<i32>,
    home_score: Option<i32>,
    home_spread: Option<f64>,
    total: Option<f64>,
) -> AtsSummary {
    let mut summary = AtsSummary {
        away_score,
        home_score,
        home_spread,
        total,
        ..AtsSummary::default()
    };
    let (Some(away), Some(home)) = (away_score, home_score) else {
        return summary;
    };

    summary.home_win_by = Some(home - away);
    summary.away_win_by = Some(away - home);
    summary.winner = Some(game_winner(away, home));

    if let Some(spread) = home_spread {
        let home_cover_by = f64::from(home) + spread - f64::from(away);
        let home_grade = grade_margin(home_cover_by);
        summary.home_ats_grade = Some(home_grade);
        summary.away_ats_grade = Some(opposite(home_grade));
        summary.home_cover_by = Some(home_cover_by);
        summary.away_cover_by = Some(-home_cover_by);
        summary.ats_winner = Some(side_for_home_grade(home_grade));
    }

    if let Some(line) = total {
        let combined = f64::from(away + home);
        let cover_by = combined - line;
        summary.total_cover_by = Some(cover_by);
        summary.over_cover_by = Some(cover_by);
        summary.under_cover_by = Some(-cover_by);
        summary.total_grade = Some(if cover_by > 0.0 {
            TotalResult::Over
        } else if cover_by < 0.0 {
            TotalResult::Under
        } else {
            TotalResult::Push
        });
    }

    summary
}

/// Which team covered, with the spread quoted for `spread_for`.
/// `Side::Tie` is a push; `None` when the spread cannot be read or `spread_for` is `Tie`.
pub fn spread_winner(away_score: f64, home_score: f64, spread: &str, spread_for: Side) -> Option<Side> {
    let grade = match spread_for {
        Side::Away => grade_side(away_score, home_score, spread)?.0,
        Side::Home => grade_side(home_score, away_score, spread)?.0,
        Side::Tie => return None,
    };
    Some(match grade {
        Grade::Win if spread_for == Side::Away => Side::Away,
        Grade::Win => Side::Home,
        Grade::Loss if spread_for == Side::Away => Side::Home,
        Grade::Loss => Side::Away,
        Grade::Push => Side::Tie,
    })
}

pub fn game_winner(away_score: i32, home_score: i32) -> Side {
    match away_score.cmp(&home_score) {
        std::cmp::Ordering::Greater => Side::Away,
        std::cmp::Ordering::Less => Side::Home,
        std::cmp::Ordering::Equal => Side::Tie,
    }
}

/// The favoured team given both spreads; `Side::Tie` for a pick'em.
/// `inverse` returns the underdog instead.
pub fn favorite(away_spread: f64, home_spread: f64, inverse: bool) -> Side {
    if away_spread == 0.0 || home_spread == 0.0 {
        return Side::Tie;
    }
    let away_is_dog = away_spread > 0.0;
    if away_is_dog != inverse { Side::Home } else { Side::Away }
}

fn grade_margin(margin: f64) -> Grade {
    if margin > 0.0 {
        Grade::Win
    } else if margin < 0.0 {
        Grade::Loss
    } else {
        Grade::Push
    }
}

fn opposite(grade: Grade) -> Grade {
    match grade {
        Grade::Win => Grade::Loss,
        Grade::Loss => Grade::Win,
        Grade::Push => Grade::Push,
    }
}

fn side_for_home_grade(grade: Grade) -> Side {
    match grade {
        Grade::Win => Side::Home,
        Grade::Loss => Side::Away,
        Grade::Push => Side::Tie,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spread_text_forms() {
        assert_eq!(parse_spread("-3.5"), Some(-3.5));
        assert_eq!(parse_spread(" +7 "), Some(7.0));
        assert_eq!(parse_spread("PK"), Some(0.0));
        assert_eq!(parse_spread("ev"), Some(0.0));
        assert_eq!(parse_spread("n/a"), None);
        assert_eq!(parse_spread(""), None);
    }

    #[test]
    fn pretty_spread_signs_and_even() {
        assert_eq!(pretty_spread(3.5), "+3.5");
        assert_eq!(pretty_spread(-7.0), "-7.0");
        assert_eq!(pretty_spread(3.0), "+3.0");
        assert_eq!(pretty_spread(-2.5), "-2.5");
        assert_eq!(pretty_spread(0.0), "EV");
    }

    #[test]
    fn side_grades_with_margin() {
        assert_eq!(grade_side(24.0, 20.0, "-3.5"), Some((Grade::Win, 0.5)));
        assert_eq!(grade_side(20.0, 24.0, "+3.5"), Some((Grade::Loss, -0.5)));
        assert_eq!(grade_side(20.0, 23.0, "+3"), Some((Grade::Push, 0.0)));
        assert_eq!(grade_side(17.0, 17.0, "pk"), Some((Grade::Push, 0.0)));
        assert_eq!(grade_side(17.0, 10.0, "off"), None);
    }

    #[test]
    fn totals_push_on_the_number() {
        assert_eq!(grade_total(24.0, 20.0, 44.0, TotalSide::Over), (Grade::Push, 0.0));
        assert_eq!(grade_total(24.0, 21.0, 44.5, TotalSide::Over), (Grade::Win, 0.5));
        assert_eq!(grade_total(24.0, 21.0, 44.5, TotalSide::Under), (Grade::Loss, 0.5));
        assert_eq!(grade_total(10.0, 13.0, 41.0, TotalSide::Under), (Grade::Win, -18.0));
    }

    #[test]
    fn moneyline_and_profit() {
        assert_eq!(grade_moneyline(21, 17), Grade::Win);
        assert_eq!(grade_moneyline(17, 21), Grade::Loss);
        assert_eq!(grade_moneyline(17, 17), Grade::Push);

        assert_eq!(unit_profit(-110, 1.0, Grade::Win), 0.91);
        assert_eq!(unit_profit(150, 2.0, Grade::Win), 3.0);
        assert_eq!(unit_profit(-110, 1.5, Grade::Loss), -1.5);
        assert_eq!(unit_profit(-110, 1.0, Grade::Push), 0.0);
    }

    #[test]
    fn line_moves() {
        assert_eq!(odd_move(-3.0, -4.5), (1.5, -1.5));
        assert_eq!(odd_move(3.0, 3.0), (0.0, 0.0));
        assert_eq!(spread_move(-3.0, -6.0, MoveKind::Absolute), 3.0);
        assert_eq!(spread_move(-3.0, -6.0, MoveKind::Value), 3.0);
        assert_eq!(spread_move(3.0, 6.0, MoveKind::Value), -3.0);
    }

    #[test]
    fn ats_summary_for_home_favourite_that_fails_to_cover() {
        let summary = ats_summary(Some(20), Some(23), Some(-3.5), Some(44.5));

        assert_eq!(summary.winner, Some(Side::Home));
        assert_eq!(summary.home_win_by, Some(3));
        assert_eq!(summary.ats_winner, Some(Side::Away));
        assert_eq!(summary.home_ats_grade, Some(Grade::Loss));
        assert_eq!(summary.away_ats_grade, Some(Grade::Win));
        assert_eq!(summary.away_cover_by, Some(0.5));
        assert_eq!(summary.total_grade, Some(TotalResult::Under));
        assert_eq!(summary.under_cover_by, Some(1.5));
        assert_eq!(summary.over_cover_by, Some(-1.5));
    }

    #[test]
    fn ats_summary_leaves_missing_parts_empty() {
        let no_scores = ats_summary(None, Some(10), Some(-3.0), Some(40.0));
        assert_eq!(no_scores.winner, None);
        assert_eq!(no_scores.total_grade, None);
        assert_eq!(no_scores.home_spread, Some(-3.0));

        let no_lines = ats_summary(Some(17), Some(17), None, None);
        assert_eq!(no_lines.winner, Some(Side::Tie));
        assert_eq!(no_lines.ats_winner, None);
        assert_eq!(no_lines.total_cover_by, None);
    }

    #[test]
    fn ats_summary_serialises_with_camel_case_keys() {
        let json = serde_json::to_value(ats_summary(Some(20), Some(20), Some(0.0), Some(40.0))).unwrap();
        assert_eq!(json["atsWinner"], "tie");
        assert_eq!(json["homeAtsGrade"], "push");
        assert_eq!(json["totalGrade"], "push");
    }

    #[test]
    fn winners_and_favourites() {
        assert_eq!(spread_winner(20.0, 24.0, "+3.5", Side::Away), Some(Side::Home));
        assert_eq!(spread_winner(20.0, 23.0, "-3", Side::Home), Some(Side::Tie));
        assert_eq!(spread_winner(20.0, 27.0, "-3", Side::Home), Some(Side::Home));
        assert_eq!(spread_winner(20.0, 27.0, "bad", Side::Home), None);

        assert_eq!(game_winner(3, 7), Side::Home);
        assert_eq!(game_winner(7, 7), Side::Tie);

        assert_eq!(favorite(3.5, -3.5, false), Side::Home);
        assert_eq!(favorite(3.5, -3.5, true), Side::Away);
        assert_eq!(favorite(-7.0, 7.0, false), Side::Away);
        assert_eq!(favorite(0.0, 0.0, false), Side::Tie);
    }
}
