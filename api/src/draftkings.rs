/// DraftKings sportsbook odds for a single league.
/// Endpoints: {base}/leagues/{id} and {base}/leagues/{id}/categories/{category_id}
use crate::client::{ApiError, ApiResult, HttpClient};
use log::debug;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;

const DK_BASE: &str = "https://sportsbook-nash.draftkings.com/api/sportscontent/dkusmi/v1";
const LEAGUES_JSON: &str = include_str!("../data/draftkings_leagues.json");
const DEFAULT_API_DELAY: Duration = Duration::from_millis(300);
const UNICODE_MINUS: char = '\u{2212}';

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LeagueResponse {
    #[serde(default)]
    pub categories: Vec<DkCategory>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DkCategory {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct CategoryResponse {
    #[serde(default)]
    pub selections: Vec<DkSelection>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DkSelection {
    pub id: String,
    #[serde(default)]
    pub market_id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub display_odds: DkDisplayOdds,
    pub points: Option<f64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct DkDisplayOdds {
    #[serde(default)]
    pub american: String,
    #[serde(default)]
    pub decimal: String,
    #[serde(default)]
    pub fractional: String,
}

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

/// One priced outcome in a betting market.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub id: String,
    pub market_id: String,
    pub label: String,
    pub american_odds: Option<i32>,
    pub decimal_odds: Option<f64>,
    pub fractional_odds: String,
    pub points: Option<f64>,
}

impl From<DkSelection> for Selection {
    fn from(raw: DkSelection) -> Self {
        let american = normalize_minus(&raw.display_odds.american);
        Self {
            id: raw.id,
            market_id: raw.market_id,
            label: raw.label,
            american_odds: american.trim().parse().ok(),
            decimal_odds: raw.display_odds.decimal.trim().parse().ok(),
            fractional_odds: normalize_minus(&raw.display_odds.fractional),
            points: raw.points,
        }
    }
}

/// Client for one league's sportsbook markets.
#[derive(Debug, Clone)]
pub struct DkSportsbook {
    http: HttpClient,
    base_url: String,
    api_delay: Duration,
    league: String,
    league_id: u64,
    categories: Vec<DkCategory>,
}

impl DkSportsbook {
    /// Look up the league and load its betting categories.
    pub fn new(league: &str) -> ApiResult<Self> {
        Self::with_options(league, DK_BASE, DEFAULT_API_DELAY)
    }

    pub fn with_options(league: &str, base_url: &str, api_delay: Duration) -> ApiResult<Self> {
        let mut book = Self {
            http: HttpClient::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_delay,
            league: String::new(),
            league_id: 0,
            categories: Vec::new(),
        };
        book.change_league(league)?;
        Ok(book)
    }

    pub fn league(&self) -> &str {
        &self.league
    }

    pub fn league_id(&self) -> u64 {
        self.league_id
    }

    /// Point the client at another league and reload its categories.
    pub fn change_league(&mut self, league: &str) -> ApiResult<()> {
        let league = league.trim().to_lowercase();
        let league_id = lookup_league_id(&league)?;

        let url = format!("{}/leagues/{league_id}", self.base_url);
        let raw: LeagueResponse = self.call(&url)?;
        debug!("{league} has {} betting categories", raw.categories.len());

        self.league = league;
        self.league_id = league_id;
        self.categories = raw.categories;
        Ok(())
    }

    /// Lowercased category names, in the order the sportsbook lists them.
    pub fn available_betting_categories(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.to_lowercase()).collect()
    }

    /// All selections offered under a category such as "game lines".
    pub fn market_by_category(&self, category: &str) -> ApiResult<Vec<Selection>> {
        let wanted = category.trim().to_lowercase();
        let category_id = self
            .categories
            .iter()
            .find(|c| c.name.to_lowercase() == wanted)
            .map(|c| c.id)
            .ok_or_else(|| {
                ApiError::NotFound(format!(
                    "no betting category '{category}' for {}; available: {}",
                    self.league,
                    self.available_betting_categories().join(", ")
                ))
            })?;

        let url = format!("{}/leagues/{}/categories/{category_id}", self.base_url, self.league_id);
        let raw: CategoryResponse = self.call(&url)?;
        Ok(raw.selections.into_iter().map(Selection::from).collect())
    }

    fn call<T: serde::de::DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        if !self.api_delay.is_zero() {
            thread::sleep(self.api_delay);
        }
        self.http.get_json(url, &[])
    }
}

/// Leagues with a known sportsbook event group.
pub fn supported_leagues() -> ApiResult<Vec<String>> {
    Ok(league_table()?.into_keys().collect())
}

fn league_table() -> ApiResult<BTreeMap<String, u64>> {
    serde_json::from_str(LEAGUES_JSON)
        .map_err(|e| ApiError::Other(format!("invalid embedded league table: {e}")))
}

fn lookup_league_id(league: &str) -> ApiResult<u64> {
    let table = league_table()?;
    table.get(league).copied().ok_or_else(|| {
        ApiError::NotFound(format!(
            "no sportsbook data for league '{league}'; supported: {}",
            table.keys().cloned().collect::<Vec<_>>().join(", ")
        ))
    })
}

fn normalize_minus(s: &str) -> String {
    s.replace(UNICODE_MINUS, "-")
}
