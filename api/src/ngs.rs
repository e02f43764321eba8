/// NFL schedule from the Next Gen Stats public API.
/// Endpoints: /api/league/schedule?season={year}, /api/league/schedule/current,
/// /api/gamecenter/overview?gameId={id}
use crate::Season;
use crate::client::{ApiError, ApiResult, HttpClient};
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

const NGS_BASE: &str = "https://nextgenstats.nfl.com";
const NGS_REFERER: &str = "https://nextgenstats.nfl.com/stats/game-center/2023100200";
const REGULAR_SEASON: &str = "REG";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NgsGame {
    #[serde(deserialize_with = "string_or_number")]
    pub game_id: String,
    pub season: Option<i32>,
    #[serde(default)]
    pub season_type: String,
    pub week: u32,
    pub home_team_abbr: String,
    pub visitor_team_abbr: String,
    #[serde(deserialize_with = "string_or_number")]
    pub home_team_id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub visitor_team_id: String,
    pub home_display_name: Option<String>,
    pub visitor_display_name: Option<String>,
    pub game_date: Option<String>,
    pub game_time_eastern: Option<String>,
    /// Kickoff as epoch milliseconds.
    pub iso_time: Option<i64>,
}

impl NgsGame {
    pub fn kickoff(&self) -> Option<DateTime<Utc>> {
        self.iso_time.and_then(DateTime::<Utc>::from_timestamp_millis)
    }

    pub fn involves(&self, team: &str) -> bool {
        self.home_team_abbr.eq_ignore_ascii_case(team) || self.visitor_team_abbr.eq_ignore_ascii_case(team)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWeek {
    pub season: i32,
    #[serde(default)]
    pub season_type: String,
    pub week: u32,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Regular-season schedule for one NFL season.
#[derive(Debug, Clone)]
pub struct NgsSchedule {
    http: HttpClient,
    base_url: String,
    season: i32,
    current: Option<CurrentWeek>,
    games: Vec<NgsGame>,
}

impl NgsSchedule {
    pub fn new(season: impl Into<Season>) -> ApiResult<Self> {
        Self::with_base_url(season, NGS_BASE)
    }

    pub fn with_base_url(season: impl Into<Season>, base_url: &str) -> ApiResult<Self> {
        let mut schedule = Self {
            http: HttpClient::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            season: 0,
            current: None,
            games: Vec::new(),
        };
        schedule.change_season(season)?;
        Ok(schedule)
    }

    pub fn season(&self) -> i32 {
        self.season
    }

    /// The league's current season and week, fetched once.
    pub fn current(&mut self) -> ApiResult<&CurrentWeek> {
        let current = match self.current.take() {
            Some(current) => current,
            None => self.get(&format!("{}/api/league/schedule/current", self.base_url))?,
        };
        Ok(&*self.current.insert(current))
    }

    /// Switch seasons; `Season::Latest` means the league's current season.
    pub fn change_season(&mut self, season: impl Into<Season>) -> ApiResult<()> {
        let season = match season.into() {
            Season::Year(year) => year,
            Season::Latest => self.current()?.season,
        };

        let url = format!("{}/api/league/schedule?season={season}", self.base_url);
        let all: Vec<NgsGame> = self.get(&url)?;
        let total = all.len();
        self.games = all.into_iter().filter(|g| g.season_type == REGULAR_SEASON).collect();
        self.season = season;
        debug!("{season} schedule: {} regular-season games of {total}", self.games.len());
        Ok(())
    }

    pub fn games(&self) -> &[NgsGame] {
        &self.games
    }

    /// The team's game in a regular-season week, by abbreviation.
    pub fn game(&self, team: &str, week: u32) -> ApiResult<&NgsGame> {
        self.games
            .iter()
            .find(|g| g.week == week && g.involves(team))
            .ok_or_else(|| ApiError::NotFound(format!("no {} week {week} game for {team}", self.season)))
    }

    pub fn game_id(&self, team: &str, week: u32) -> ApiResult<String> {
        Ok(self.game(team, week)?.game_id.clone())
    }

    pub fn team_id(&self, team: &str) -> Option<String> {
        self.games.iter().find(|g| g.involves(team)).map(|g| {
            if g.home_team_abbr.eq_ignore_ascii_case(team) {
                g.home_team_id.clone()
            } else {
                g.visitor_team_id.clone()
            }
        })
    }

    /// Raw game center overview for the team's game that week.
    pub fn game_overview(&self, team: &str, week: u32) -> ApiResult<Value> {
        let game_id = self.game_id(team, week)?;
        self.get(&format!("{}/api/gamecenter/overview?gameId={game_id}", self.base_url))
    }

    fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        self.http.get_json(url, &[("Referer", NGS_REFERER)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const SCHEDULE_2023: &str = r#"[
        {"gameId": 2023081000, "season": 2023, "seasonType": "PRE", "week": 1,
         "homeTeamAbbr": "KC", "visitorTeamAbbr": "NO", "homeTeamId": "2310", "visitorTeamId": "3300"},
        {"gameId": 2023090700, "season": 2023, "seasonType": "REG", "week": 1,
         "homeTeamAbbr": "KC", "visitorTeamAbbr": "DET", "homeTeamId": "2310", "visitorTeamId": "1540",
         "gameDate": "09/07/2023", "gameTimeEastern": "20:20:00", "isoTime": 1694132400000},
        {"gameId": "2023091700", "season": 2023, "seasonType": "REG", "week": 2,
         "homeTeamAbbr": "JAX", "visitorTeamAbbr": "KC", "homeTeamId": 2250, "visitorTeamId": 2310}
    ]"#;

    fn schedule_mock(server: &mut mockito::ServerGuard, season: &str, body: &str) -> mockito::Mock {
        server
            .mock("GET", "/api/league/schedule")
            .match_query(Matcher::UrlEncoded("season".into(), season.into()))
            .match_header("referer", NGS_REFERER)
            .with_body(body)
            .create()
    }

    #[test]
    fn keeps_only_regular_season_games() {
        let mut server = mockito::Server::new();
        let mock = schedule_mock(&mut server, "2023", SCHEDULE_2023);

        let schedule = NgsSchedule::with_base_url(2023, &server.url()).unwrap();

        mock.assert();
        assert_eq!(schedule.season(), 2023);
        assert_eq!(schedule.games().len(), 2);
        assert!(schedule.games().iter().all(|g| g.season_type == "REG"));
    }

    #[test]
    fn finds_games_and_ids_by_abbreviation() {
        let mut server = mockito::Server::new();
        let _mock = schedule_mock(&mut server, "2023", SCHEDULE_2023);
        let schedule = NgsSchedule::with_base_url(2023, &server.url()).unwrap();

        let game = schedule.game("det", 1).unwrap();
        assert_eq!(game.home_team_abbr, "KC");
        assert_eq!(game.kickoff().map(|k| k.timestamp()), Some(1_694_132_400));

        assert_eq!(schedule.game_id("kc", 2).unwrap(), "2023091700");
        assert_eq!(schedule.team_id("JAX").as_deref(), Some("2250"));
        assert_eq!(schedule.team_id("DET").as_deref(), Some("1540"));
        assert_eq!(schedule.team_id("SEA"), None);
        assert!(matches!(schedule.game("KC", 9), Err(ApiError::NotFound(_))));
    }

    #[test]
    fn latest_season_resolves_through_current() {
        let mut server = mockito::Server::new();
        let current = server
            .mock("GET", "/api/league/schedule/current")
            .match_header("referer", NGS_REFERER)
            .with_body(r#"{"season": 2024, "seasonType": "REG", "week": 7}"#)
            .expect(1)
            .create();
        let _schedule = schedule_mock(&mut server, "2024", "[]");

        let mut schedule = NgsSchedule::with_base_url(Season::Latest, &server.url()).unwrap();
        assert_eq!(schedule.season(), 2024);
        assert_eq!(schedule.current().unwrap().week, 7);

        current.assert();
    }

    #[test]
    fn change_season_refetches_schedule() {
        let mut server = mockito::Server::new();
        let _first = schedule_mock(&mut server, "2023", SCHEDULE_2023);
        let second = schedule_mock(&mut server, "2022", "[]");

        let mut schedule = NgsSchedule::with_base_url(2023, &server.url()).unwrap();
        schedule.change_season(2022).unwrap();

        second.assert();
        assert_eq!(schedule.season(), 2022);
        assert!(schedule.games().is_empty());
    }

    #[test]
    fn game_overview_requests_the_game_id() {
        let mut server = mockito::Server::new();
        let _schedule = schedule_mock(&mut server, "2023", SCHEDULE_2023);
        let overview = server
            .mock("GET", "/api/gamecenter/overview")
            .match_query(Matcher::UrlEncoded("gameId".into(), "2023090700".into()))
            .with_body(r#"{"gameId": 2023090700, "passers": []}"#)
            .create();

        let schedule = NgsSchedule::with_base_url(2023, &server.url()).unwrap();
        let value = schedule.game_overview("KC", 1).unwrap();

        overview.assert();
        assert_eq!(value["gameId"], 2023090700);
    }
}
