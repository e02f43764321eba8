/// SportsPage Feeds schedules, odds and results through RapidAPI.
/// Endpoint: {base}/games?league={league}&date={yyyy-mm-dd | start,end}
use crate::client::{ApiError, ApiResult, HttpClient};
use crate::grading::{TotalResult, ats_summary};
use crate::{Grade, Side};
use chrono::{DateTime, Local, NaiveDate, TimeDelta, Utc};
use log::{debug, info, warn};
use reqwest::Url;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

const SPORTSPAGE_BASE: &str = "https://sportspage-feeds.p.rapidapi.com";
const RAPIDAPI_HOST: &str = "sportspage-feeds.p.rapidapi.com";
const DEFAULT_TRACKER_FILE: &str = "lukhed_sports/local_cache/sportsPageTracker.json";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

const LIMIT_HEADER: &str = "x-ratelimit-sportspage-limit";
const REMAINING_HEADER: &str = "x-ratelimit-sportspage-remaining";
const RESET_HEADER: &str = "x-ratelimit-sportspage-reset";

pub const API_KEY_ENV: &str = "SPORTSPAGE_API_KEY";
pub const TRACKER_FILE_ENV: &str = "SPORTSPAGE_TRACKER_FILE";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Schedule {
    #[serde(default)]
    pub status: u16,
    pub time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub games: u32,
    #[serde(default)]
    pub skip: u32,
    #[serde(default)]
    pub results: Vec<Game>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub game_id: Option<i64>,
    pub schedule: GameTime,
    pub summary: Option<String>,
    #[serde(default)]
    pub details: GameDetails,
    #[serde(default)]
    pub status: String,
    pub teams: Teams,
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub venue: Venue,
    #[serde(default)]
    pub odds: Vec<Odds>,
    pub scoreboard: Option<Scoreboard>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GameTime {
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub tba_time: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GameDetails {
    pub league: Option<String>,
    pub season_type: Option<String>,
    pub season: Option<i32>,
    #[serde(default)]
    pub conference_game: bool,
    #[serde(default)]
    pub division_game: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Teams {
    pub away: TeamInfo,
    pub home: TeamInfo,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TeamInfo {
    pub team: String,
    pub abbreviation: String,
    pub location: Option<String>,
    pub mascot: Option<String>,
    pub conference: Option<String>,
    pub division: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(default)]
    pub neutral_site: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Odds {
    #[serde(default)]
    pub spread: Lines<SpreadLine>,
    #[serde(default)]
    pub moneyline: Lines<MoneylineLine>,
    #[serde(default)]
    pub total: Lines<TotalLine>,
    pub open_date: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Opening and latest prices for one market.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Lines<T> {
    pub open: Option<T>,
    pub current: Option<T>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SpreadLine {
    pub away: Option<f64>,
    pub home: Option<f64>,
    pub away_odds: Option<i32>,
    pub home_odds: Option<i32>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct MoneylineLine {
    pub away_odds: Option<i32>,
    pub home_odds: Option<i32>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct TotalLine {
    pub total: Option<f64>,
    pub over_odds: Option<i32>,
    pub under_odds: Option<i32>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Scoreboard {
    pub score: Option<Score>,
    pub current_period: Option<u32>,
    pub period_time_remaining: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub away: i32,
    pub home: i32,
    #[serde(default)]
    pub away_periods: Vec<i32>,
    #[serde(default)]
    pub home_periods: Vec<i32>,
}

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playing {
    Away,
    Home,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameStyle {
    /// "SEA"
    Abbreviation,
    /// "Seattle Seahawks"
    Full,
}

impl Schedule {
    /// The feed echoes an HTTP-style status in the body.
    pub fn is_valid(&self) -> bool {
        self.status == 200
    }

    pub fn total_games(&self) -> u32 {
        self.games
    }

    pub fn games(&self) -> &[Game] {
        &self.results
    }

    /// Games kicking off between `now` and `minutes` from now, inclusive.
    pub fn games_within_minutes(&self, minutes: i64, now: DateTime<Utc>) -> Vec<&Game> {
        let Some(window) = TimeDelta::try_minutes(minutes) else {
            return Vec::new();
        };
        self.results
            .iter()
            .filter(|game| {
                let until = game.kickoff() - now;
                until >= TimeDelta::zero() && until <= window
            })
            .collect()
    }

    /// True once no game is still waiting to start or in progress.
    pub fn all_games_complete(&self) -> bool {
        self.results.iter().all(Game::is_complete)
    }

    /// Result rows for the games that have gone final.
    pub fn final_results(&self) -> Vec<GameResult> {
        self.results.iter().filter(|g| g.is_final()).map(Game::result).collect()
    }
}

impl Game {
    pub fn kickoff(&self) -> DateTime<Utc> {
        self.schedule.date
    }

    pub fn is_final(&self) -> bool {
        self.status.eq_ignore_ascii_case("final")
    }

    pub fn is_canceled(&self) -> bool {
        self.status.eq_ignore_ascii_case("canceled") || self.status.eq_ignore_ascii_case("cancelled")
    }

    pub fn is_complete(&self) -> bool {
        self.is_final() || self.is_canceled()
    }

    pub fn team(&self, playing: Playing) -> &TeamInfo {
        match playing {
            Playing::Away => &self.teams.away,
            Playing::Home => &self.teams.home,
        }
    }

    pub fn team_name(&self, playing: Playing, style: NameStyle) -> &str {
        let team = self.team(playing);
        match style {
            NameStyle::Abbreviation => &team.abbreviation,
            NameStyle::Full => &team.team,
        }
    }

    pub fn conference(&self, playing: Playing) -> Option<&str> {
        self.team(playing).conference.as_deref()
    }

    /// The feed lists one book; its latest lines are the ones graded against.
    fn lines(&self) -> Option<&Odds> {
        self.odds.first()
    }

    fn current_spread_line(&self) -> Option<&SpreadLine> {
        self.lines()?.spread.current.as_ref()
    }

    fn current_total_line(&self) -> Option<&TotalLine> {
        self.lines()?.total.current.as_ref()
    }

    fn current_moneyline(&self) -> Option<&MoneylineLine> {
        self.lines()?.moneyline.current.as_ref()
    }

    pub fn current_spread(&self, playing: Playing) -> Option<f64> {
        let line = self.current_spread_line()?;
        match playing {
            Playing::Away => line.away,
            Playing::Home => line.home,
        }
    }

    pub fn total(&self) -> Option<f64> {
        self.current_total_line()?.total
    }

    /// `None` for canceled games and games without a scoreboard.
    pub fn final_score(&self, playing: Playing) -> Option<i32> {
        if self.is_canceled() {
            return None;
        }
        let score = self.scoreboard.as_ref()?.score.as_ref()?;
        Some(match playing {
            Playing::Away => score.away,
            Playing::Home => score.home,
        })
    }

    /// Final score graded against the closing spread and total.
    pub fn result(&self) -> GameResult {
        let away_score = self.final_score(Playing::Away);
        let home_score = self.final_score(Playing::Home);
        let home_spread = self.current_spread(Playing::Home);
        let total = self.total();
        let ats = ats_summary(away_score, home_score, home_spread, total);

        let spread = self.current_spread_line();
        let total_line = self.current_total_line();
        let moneyline = self.current_moneyline();

        GameResult {
            away_team: self.teams.away.abbreviation.clone(),
            home_team: self.teams.home.abbreviation.clone(),
            away_team_full: self.teams.away.team.clone(),
            home_team_full: self.teams.home.team.clone(),
            away_conference: self.teams.away.conference.clone(),
            home_conference: self.teams.home.conference.clone(),
            away_spread: self.current_spread(Playing::Away),
            away_odds: spread.and_then(|s| s.away_odds),
            home_spread,
            home_odds: spread.and_then(|s| s.home_odds),
            total,
            total_points_scored: away_score.zip(home_score).map(|(a, h)| a + h),
            over_odds: total_line.and_then(|t| t.over_odds),
            under_odds: total_line.and_then(|t| t.under_odds),
            away_score,
            home_score,
            game_winner: ats.winner,
            ats_winner: ats.ats_winner,
            away_ats_result: ats.away_ats_grade,
            home_ats_result: ats.home_ats_grade,
            away_team_cover_by: ats.away_cover_by,
            home_team_cover_by: ats.home_cover_by,
            total_winner: ats.total_grade,
            under_cover_by: ats.under_cover_by,
            over_cover_by: ats.over_cover_by,
            score_difference_absolute_value: ats.home_win_by.map(i32::abs),
            ats_cover_by_absolute_value: ats.away_cover_by.map(f64::abs),
            total_cover_by_absolute_value: ats.under_cover_by.map(f64::abs),
            away_moneyline: moneyline.and_then(|m| m.away_odds),
            home_moneyline: moneyline.and_then(|m| m.home_odds),
        }
    }
}

/// One graded game, flattened for storage or display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub away_team: String,
    pub home_team: String,
    pub away_team_full: String,
    pub home_team_full: String,
    pub away_conference: Option<String>,
    pub home_conference: Option<String>,
    pub away_spread: Option<f64>,
    pub away_odds: Option<i32>,
    pub home_spread: Option<f64>,
    pub home_odds: Option<i32>,
    pub total: Option<f64>,
    pub total_points_scored: Option<i32>,
    pub over_odds: Option<i32>,
    pub under_odds: Option<i32>,
    pub away_score: Option<i32>,
    pub home_score: Option<i32>,
    pub game_winner: Option<Side>,
    pub ats_winner: Option<Side>,
    pub away_ats_result: Option<Grade>,
    pub home_ats_result: Option<Grade>,
    pub away_team_cover_by: Option<f64>,
    pub home_team_cover_by: Option<f64>,
    pub total_winner: Option<TotalResult>,
    pub under_cover_by: Option<f64>,
    pub over_cover_by: Option<f64>,
    pub score_difference_absolute_value: Option<i32>,
    pub ats_cover_by_absolute_value: Option<f64>,
    pub total_cover_by_absolute_value: Option<f64>,
    pub away_moneyline: Option<i32>,
    pub home_moneyline: Option<i32>,
}

/// Which days a schedule request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleDates {
    Today,
    On(NaiveDate),
    Between(NaiveDate, NaiveDate),
}

impl ScheduleDates {
    /// Build from date strings in `format` (chrono syntax, e.g. `%Y-%m-%d`).
    pub fn parse(start: Option<&str>, end: Option<&str>, format: &str) -> ApiResult<Self> {
        let date = |text: &str| {
            NaiveDate::parse_from_str(text.trim(), format)
                .map_err(|e| ApiError::Other(format!("invalid date '{text}' for format '{format}': {e}")))
        };
        match (start, end) {
            (None, None) => Ok(ScheduleDates::Today),
            (Some(start), None) => Ok(ScheduleDates::On(date(start)?)),
            (Some(start), Some(end)) => Ok(ScheduleDates::Between(date(start)?, date(end)?)),
            (None, Some(_)) => Err(ApiError::Other("an end date needs a start date".to_owned())),
        }
    }

    fn query_value(&self, today: NaiveDate) -> String {
        match self {
            ScheduleDates::Today => today.format(QUERY_DATE_FORMAT).to_string(),
            ScheduleDates::On(day) => day.format(QUERY_DATE_FORMAT).to_string(),
            ScheduleDates::Between(start, end) => {
                format!("{},{}", start.format(QUERY_DATE_FORMAT), end.format(QUERY_DATE_FORMAT))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Call limit tracking
// ---------------------------------------------------------------------------

/// The account's RapidAPI quota as of the last call, persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallTracker {
    pub limit: u32,
    pub remaining: u32,
    pub reset_time: DateTime<Utc>,
    pub last_call: DateTime<Utc>,
}

impl CallTracker {
    /// Read the SportsPage rate-limit headers. `None` if any is missing or not a number.
    pub fn from_headers(headers: &HeaderMap, call_time: DateTime<Utc>) -> Option<Self> {
        let number = |name: &str| -> Option<i64> { headers.get(name)?.to_str().ok()?.trim().parse().ok() };
        let limit = u32::try_from(number(LIMIT_HEADER)?).ok()?;
        let remaining = u32::try_from(number(REMAINING_HEADER)?).ok()?;
        let reset_in = TimeDelta::try_seconds(number(RESET_HEADER)?)?;
        Some(Self { limit, remaining, reset_time: call_time + reset_in, last_call: call_time })
    }

    /// Spent quota that has not reset yet.
    pub fn blocks_at(&self, now: DateTime<Utc>) -> bool {
        self.remaining == 0 && self.reset_time > now
    }

    pub fn load(path: &Path) -> Option<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("could not read call tracker {}: {e}", path.display());
                return None;
            }
        };
        serde_json::from_str(&content)
            .map_err(|e| warn!("ignoring corrupt call tracker {}: {e}", path.display()))
            .ok()
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, content)
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SportsPageSettings {
    pub api_key: String,
    pub base_url: String,
    /// Track the quota and refuse calls once it is spent, until it resets.
    pub block_over_limit: bool,
    pub tracker_file: PathBuf,
    pub timeout: Duration,
}

impl SportsPageSettings {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.split_whitespace().collect(),
            base_url: SPORTSPAGE_BASE.to_owned(),
            block_over_limit: true,
            tracker_file: PathBuf::from(DEFAULT_TRACKER_FILE),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Key from `SPORTSPAGE_API_KEY`, tracker path from `SPORTSPAGE_TRACKER_FILE` when set.
    pub fn from_env() -> Self {
        let mut settings = Self::new(&std::env::var(API_KEY_ENV).unwrap_or_default());
        match std::env::var(TRACKER_FILE_ENV) {
            Ok(path) if !path.trim().is_empty() => settings.tracker_file = PathBuf::from(path),
            _ => {}
        }
        settings
    }
}

/// Schedule client holding the most recently fetched (or supplied) schedule.
#[derive(Debug, Clone)]
pub struct SportsPage {
    http: HttpClient,
    settings: SportsPageSettings,
    tracker: Option<CallTracker>,
    schedule: Option<Schedule>,
}

impl SportsPage {
    pub fn new(settings: SportsPageSettings) -> ApiResult<Self> {
        if settings.api_key.is_empty() {
            return Err(ApiError::Other(format!(
                "no SportsPage API key; set {API_KEY_ENV} (free keys: https://rapidapi.com/SportspageFeeds/api/sportspage-feeds/pricing)"
            )));
        }
        let tracker = if settings.block_over_limit { CallTracker::load(&settings.tracker_file) } else { None };
        Ok(Self {
            http: HttpClient::new().with_timeout(settings.timeout),
            settings,
            tracker,
            schedule: None,
        })
    }

    pub fn from_env() -> ApiResult<Self> {
        Self::new(SportsPageSettings::from_env())
    }

    /// Work from a schedule fetched earlier instead of calling the API.
    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = Some(schedule);
        self
    }

    pub fn schedule(&self) -> Option<&Schedule> {
        self.schedule.as_ref()
    }

    pub fn tracker(&self) -> Option<&CallTracker> {
        self.tracker.as_ref()
    }

    /// Fetch a league's games for the dates and keep them as the working schedule.
    pub fn get_schedule(&mut self, league: &str, dates: ScheduleDates) -> ApiResult<&Schedule> {
        if self.settings.block_over_limit {
            if let Some(tracker) = self.tracker.as_ref().filter(|t| t.blocks_at(Utc::now())) {
                return Err(ApiError::RateLimited(format!(
                    "SportsPage call limit of {} reached until {}; turn off block_over_limit to pay for the call",
                    tracker.limit, tracker.reset_time
                )));
            }
        }

        let league = league.trim().to_lowercase();
        let date = dates.query_value(Local::now().date_naive());
        let url = Url::parse_with_params(
            &format!("{}/games", self.settings.base_url.trim_end_matches('/')),
            &[("league", league.as_str()), ("date", date.as_str())],
        )
        .map_err(|e| ApiError::Other(format!("invalid SportsPage url: {e}")))?;

        let call_time = Utc::now();
        let (schedule, headers): (Schedule, HeaderMap) = self.http.get_json_with_headers(
            url.as_str(),
            &[("x-rapidapi-host", RAPIDAPI_HOST), ("x-rapidapi-key", self.settings.api_key.as_str())],
        )?;
        debug!("{league} schedule for {date}: {} games", schedule.total_games());

        if self.settings.block_over_limit {
            self.record_limits(&headers, call_time);
        }
        Ok(&*self.schedule.insert(schedule))
    }

    pub fn schedule_for_today(&mut self, league: &str) -> ApiResult<&Schedule> {
        self.get_schedule(league, ScheduleDates::Today)
    }

    /// Games in the working schedule starting within `minutes` from now.
    pub fn games_within_minutes(&self, minutes: i64) -> ApiResult<Vec<&Game>> {
        Ok(self.working_schedule()?.games_within_minutes(minutes, Utc::now()))
    }

    pub fn all_games_complete(&self) -> ApiResult<bool> {
        Ok(self.working_schedule()?.all_games_complete())
    }

    fn working_schedule(&self) -> ApiResult<&Schedule> {
        self.schedule
            .as_ref()
            .ok_or_else(|| ApiError::NotFound("no schedule loaded; call get_schedule first".to_owned()))
    }

    fn record_limits(&mut self, headers: &HeaderMap, call_time: DateTime<Utc>) {
        let Some(tracker) = CallTracker::from_headers(headers, call_time) else {
            warn!("SportsPage response had no rate-limit headers; call limit not tracked");
            return;
        };
        info!("SportsPage calls remaining: {} of {}", tracker.remaining, tracker.limit);
        if let Err(e) = tracker.save(&self.settings.tracker_file) {
            warn!("could not save call tracker to {}: {e}", self.settings.tracker_file.display());
        }
        self.tracker = Some(tracker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const SCHEDULE: &str = r#"{
        "status": 200,
        "time": "2021-10-19T12:00:00.000Z",
        "games": 3,
        "skip": 0,
        "results": [
            {
                "gameId": 269860,
                "schedule": {"date": "2021-10-18T00:20:00.000Z", "tbaTime": false},
                "summary": "Seattle Seahawks @ Pittsburgh Steelers",
                "details": {"league": "NFL", "seasonType": "regular", "season": 2021,
                            "conferenceGame": false, "divisionGame": false},
                "status": "final",
                "teams": {
                    "away": {"team": "Seattle Seahawks", "location": "Seattle", "mascot": "Seahawks",
                             "abbreviation": "SEA", "conference": "NFC", "division": "West"},
                    "home": {"team": "Pittsburgh Steelers", "location": "Pittsburgh", "mascot": "Steelers",
                             "abbreviation": "PIT", "conference": "AFC", "division": "North"}
                },
                "lastUpdated": "2021-10-18T03:37:41.063Z",
                "venue": {"name": "Heinz Field", "city": "Pittsburgh", "state": "PA", "neutralSite": false},
                "odds": [{
                    "spread": {
                        "open": {"away": 6, "home": -6, "awayOdds": -110, "homeOdds": -110},
                        "current": {"away": 5.5, "home": -5.5, "awayOdds": -115, "homeOdds": -105}
                    },
                    "moneyline": {
                        "open": {"awayOdds": 210, "homeOdds": -250},
                        "current": {"awayOdds": 190, "homeOdds": -225}
                    },
                    "total": {
                        "open": {"total": 42, "overOdds": -110, "underOdds": -110},
                        "current": {"total": 41.5, "overOdds": -110, "underOdds": -110}
                    },
                    "openDate": "2021-10-11T13:00:00.000Z",
                    "lastUpdated": "2021-10-18T00:15:00.000Z"
                }],
                "scoreboard": {
                    "score": {"away": 20, "home": 23, "awayPeriods": [0, 7, 7, 6, 0],
                              "homePeriods": [7, 7, 0, 6, 3]},
                    "currentPeriod": 5,
                    "periodTimeRemaining": "0:00"
                }
            },
            {
                "gameId": 269861,
                "schedule": {"date": "2021-10-19T00:15:00.000Z"},
                "summary": "Buffalo Bills @ Tennessee Titans",
                "details": {"league": "NFL", "season": 2021, "conferenceGame": true},
                "status": "scheduled",
                "teams": {
                    "away": {"team": "Buffalo Bills", "abbreviation": "BUF", "conference": "AFC"},
                    "home": {"team": "Tennessee Titans", "abbreviation": "TEN", "conference": "AFC"}
                },
                "odds": [{
                    "spread": {"current": {"away": -5.5, "home": 5.5, "awayOdds": -110, "homeOdds": -110}},
                    "total": {"current": {"total": 53.5, "overOdds": -110, "underOdds": -110}}
                }]
            },
            {
                "gameId": 269862,
                "schedule": {"date": "2021-10-19T03:00:00.000Z"},
                "status": "canceled",
                "teams": {
                    "away": {"team": "Denver Broncos", "abbreviation": "DEN"},
                    "home": {"team": "Las Vegas Raiders", "abbreviation": "LV"}
                }
            }
        ]
    }"#;

    fn schedule() -> Schedule {
        serde_json::from_str(SCHEDULE).unwrap()
    }

    fn at(text: &str) -> DateTime<Utc> {
        text.parse().unwrap()
    }

    fn settings(server: &mockito::ServerGuard, tracker_file: &Path) -> SportsPageSettings {
        SportsPageSettings {
            base_url: server.url(),
            tracker_file: tracker_file.to_path_buf(),
            ..SportsPageSettings::new("test-key")
        }
    }

    fn schedule_mock(server: &mut mockito::ServerGuard) -> mockito::Mock {
        server
            .mock("GET", "/games")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("league".into(), "nfl".into()),
                Matcher::UrlEncoded("date".into(), "2021-10-18,2021-10-19".into()),
            ]))
            .match_header("x-rapidapi-key", "test-key")
            .match_header("x-rapidapi-host", RAPIDAPI_HOST)
            .with_header("X-RateLimit-Sportspage-Limit", "20")
            .with_header("X-RateLimit-Sportspage-Remaining", "19")
            .with_header("X-RateLimit-Sportspage-Reset", "3600")
            .with_body(SCHEDULE)
    }

    fn week() -> ScheduleDates {
        ScheduleDates::Between(
            NaiveDate::from_ymd_opt(2021, 10, 18).unwrap(),
            NaiveDate::from_ymd_opt(2021, 10, 19).unwrap(),
        )
    }

    #[test]
    fn schedule_summary_and_team_lookups() {
        let schedule = schedule();
        assert!(schedule.is_valid());
        assert_eq!(schedule.total_games(), 3);

        let game = &schedule.games()[0];
        assert_eq!(game.team_name(Playing::Away, NameStyle::Abbreviation), "SEA");
        assert_eq!(game.team_name(Playing::Home, NameStyle::Full), "Pittsburgh Steelers");
        assert_eq!(game.conference(Playing::Away), Some("NFC"));
        assert_eq!(game.current_spread(Playing::Home), Some(-5.5));
        assert_eq!(game.total(), Some(41.5));
        assert_eq!(game.final_score(Playing::Home), Some(23));
        assert_eq!(schedule.games()[2].conference(Playing::Home), None);
    }

    #[test]
    fn final_game_is_graded_against_closing_lines() {
        let result = schedule().games()[0].result();

        assert_eq!(result.away_team, "SEA");
        assert_eq!(result.home_team_full, "Pittsburgh Steelers");
        assert_eq!(result.total_points_scored, Some(43));
        assert_eq!(result.game_winner, Some(Side::Home));
        assert_eq!(result.ats_winner, Some(Side::Away));
        assert_eq!(result.away_ats_result, Some(Grade::Win));
        assert_eq!(result.home_team_cover_by, Some(-2.5));
        assert_eq!(result.total_winner, Some(TotalResult::Over));
        assert_eq!(result.under_cover_by, Some(-1.5));
        assert_eq!(result.score_difference_absolute_value, Some(3));
        assert_eq!(result.ats_cover_by_absolute_value, Some(2.5));
        assert_eq!(result.total_cover_by_absolute_value, Some(1.5));
        assert_eq!(result.away_odds, Some(-115));
        assert_eq!((result.away_moneyline, result.home_moneyline), (Some(190), Some(-225)));
    }

    #[test]
    fn canceled_game_has_no_scores_or_grades() {
        let schedule = schedule();
        let result = schedule.games()[2].result();

        assert_eq!(result.away_score, None);
        assert_eq!(result.total_points_scored, None);
        assert_eq!(result.game_winner, None);
        assert_eq!(result.total_winner, None);
        assert_eq!(result.home_spread, None);

        let finals = schedule.final_results();
        assert_eq!(finals.len(), 1);
        assert_eq!(finals[0].home_team, "PIT");
    }

    #[test]
    fn games_starting_inside_the_window() {
        let schedule = schedule();
        let now = at("2021-10-19T00:00:00Z");

        let soon = schedule.games_within_minutes(15, now);
        assert_eq!(soon.len(), 1);
        assert_eq!(soon[0].game_id, Some(269861));

        assert!(schedule.games_within_minutes(14, now).is_empty());
        assert_eq!(schedule.games_within_minutes(180, now).len(), 2);
    }

    #[test]
    fn completion_waits_for_scheduled_games() {
        let mut schedule = schedule();
        assert!(!schedule.all_games_complete());

        schedule.results.retain(|g| g.status != "scheduled");
        assert!(schedule.all_games_complete());
    }

    #[test]
    fn date_ranges_parse_in_the_given_format() {
        let today = NaiveDate::from_ymd_opt(2024, 9, 8).unwrap();

        let range = ScheduleDates::parse(Some("20211018"), Some("20211019"), "%Y%m%d").unwrap();
        assert_eq!(range, week());
        assert_eq!(range.query_value(today), "2021-10-18,2021-10-19");

        let single = ScheduleDates::parse(Some("2021-10-18"), None, QUERY_DATE_FORMAT).unwrap();
        assert_eq!(single.query_value(today), "2021-10-18");
        assert_eq!(ScheduleDates::parse(None, None, "%Y").unwrap().query_value(today), "2024-09-08");

        assert!(ScheduleDates::parse(None, Some("2021-10-19"), QUERY_DATE_FORMAT).is_err());
        assert!(ScheduleDates::parse(Some("10/18/2021"), None, QUERY_DATE_FORMAT).is_err());
    }

    #[test]
    fn tracker_reads_rate_limit_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(LIMIT_HEADER, "20".parse().unwrap());
        headers.insert(REMAINING_HEADER, "0".parse().unwrap());
        headers.insert(RESET_HEADER, "60".parse().unwrap());
        let call_time = at("2021-10-19T00:00:00Z");

        let tracker = CallTracker::from_headers(&headers, call_time).unwrap();
        assert_eq!(tracker.reset_time, at("2021-10-19T00:01:00Z"));
        assert!(tracker.blocks_at(at("2021-10-19T00:00:30Z")));
        assert!(!tracker.blocks_at(at("2021-10-19T00:01:00Z")));

        headers.remove(RESET_HEADER);
        assert_eq!(CallTracker::from_headers(&headers, call_time), None);
    }

    #[test]
    fn get_schedule_sends_key_and_tracks_limits() {
        let tmp = tempfile::tempdir().unwrap();
        let tracker_file = tmp.path().join("config").join("tracker.json");
        let mut server = mockito::Server::new();
        let mock = schedule_mock(&mut server).create();

        let mut client = SportsPage::new(settings(&server, &tracker_file)).unwrap();
        let games = client.get_schedule(" NFL ", week()).unwrap().total_games();

        mock.assert();
        assert_eq!(games, 3);
        assert!(!client.all_games_complete().unwrap());

        let tracker = client.tracker().unwrap().clone();
        assert_eq!((tracker.limit, tracker.remaining), (20, 19));
        assert_eq!(tracker.reset_time - tracker.last_call, TimeDelta::seconds(3600));
        assert_eq!(CallTracker::load(&tracker_file), Some(tracker));
    }

    #[test]
    fn spent_quota_blocks_calls_until_reset() {
        let tmp = tempfile::tempdir().unwrap();
        let tracker_file = tmp.path().join("tracker.json");
        let now = Utc::now();
        CallTracker { limit: 20, remaining: 0, reset_time: now + TimeDelta::hours(1), last_call: now }
            .save(&tracker_file)
            .unwrap();
        let mut server = mockito::Server::new();
        let mock = schedule_mock(&mut server).expect(0).create();

        let mut client = SportsPage::new(settings(&server, &tracker_file)).unwrap();
        let err = client.get_schedule("nfl", week()).unwrap_err();

        mock.assert();
        assert!(matches!(err, ApiError::RateLimited(_)), "got {err}");
        assert!(client.schedule().is_none());
    }

    #[test]
    fn expired_quota_and_disabled_blocking_allow_calls() {
        let tmp = tempfile::tempdir().unwrap();
        let tracker_file = tmp.path().join("tracker.json");
        let now = Utc::now();
        let spent = CallTracker { limit: 20, remaining: 0, reset_time: now + TimeDelta::hours(1), last_call: now };
        spent.save(&tracker_file).unwrap();
        let mut server = mockito::Server::new();
        let mock = schedule_mock(&mut server).expect(2).create();

        let unblocked = SportsPageSettings { block_over_limit: false, ..settings(&server, &tracker_file) };
        let mut client = SportsPage::new(unblocked).unwrap();
        client.get_schedule("nfl", week()).unwrap();
        assert!(client.tracker().is_none());
        assert_eq!(CallTracker::load(&tracker_file), Some(spent.clone()));

        let expired = CallTracker { reset_time: now - TimeDelta::minutes(1), ..spent };
        expired.save(&tracker_file).unwrap();
        let mut client = SportsPage::new(settings(&server, &tracker_file)).unwrap();
        client.get_schedule("nfl", week()).unwrap();
        assert_eq!(client.tracker().map(|t| t.remaining), Some(19));

        mock.assert();
    }

    #[test]
    fn missing_key_or_schedule_is_an_error() {
        assert!(matches!(SportsPage::new(SportsPageSettings::new("  ")), Err(ApiError::Other(_))));

        let client = SportsPage::new(SportsPageSettings::new("k e y")).unwrap();
        assert!(matches!(client.all_games_complete(), Err(ApiError::NotFound(_))));

        let client = client.with_schedule(schedule());
        assert_eq!(client.schedule().map(Schedule::total_games), Some(3));
        assert!(client.games_within_minutes(10).is_ok());
    }
}
