//! Cross-provider team name translation.
//!
//! Every provider publishes, per season group, parallel lists of team names in
//! several display styles ("team types"). Index `i` in any of those lists is the
//! same franchise, so translating a name is a case-insensitive position lookup
//! in the source list followed by an index into the target list.
//!
//! Data is layered: the remote dataset is authoritative, a per-sport directory
//! of JSON snapshots sits in front of it, and the instance keeps the key files
//! plus one "from" and one "to" provider file in memory.

pub mod keys;
pub mod store;

use crate::client::ApiError;
use crate::github::{DatasetSource, GithubDataset};
use crate::{Season, Sport};
use keys::{ProviderData, ProviderIndex, SeasonKeys, decode};
use log::{debug, warn};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use store::{DatasetStore, DiskCache};

pub type TranslationResult<T> = Result<T, TranslationError>;

pub const PROVIDER_KEY_FILE: &str = "providerKey.json";
pub const SEASON_KEY_FILE: &str = "seasonKey.json";
pub const SUPPORTED_PROVIDERS_FILE: &str = "supportedProviders.json";
pub const CACHE_DIR_ENV: &str = "LUKHED_SPORTS_CACHE_DIR";
const DEFAULT_CACHE_ROOT: &str = "lukhed_sports/local_cache/translations";
const DEFAULT_TEAM_TYPE: &str = "long";

#[derive(Debug)]
pub enum TranslationError {
    UnsupportedSport(String),
    UnknownProvider(String),
    UnknownSeason { provider: String, season: Season },
    UnknownTeamType { provider: String, group: String, team_type: String },
    InvalidFileName(String),
    Fetch(ApiError),
    Io(std::io::Error, PathBuf),
    Malformed(String, serde_json::Error),
}

impl fmt::Display for TranslationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslationError::UnsupportedSport(sport) => write!(
                f,
                "sport '{sport}' is not supported for team conversions (supported: {})",
                Sport::SUPPORTED.map(|s| s.as_str()).join(", ")
            ),
            TranslationError::UnknownProvider(provider) => {
                write!(f, "provider cannot be found for input '{provider}'")
            }
            TranslationError::UnknownSeason { provider, season } => {
                write!(f, "season {season} was not found in the season key for {provider}")
            }
            TranslationError::UnknownTeamType { provider, group, team_type } => write!(
                f,
                "team type '{team_type}' is not available for {provider} season group '{group}'"
            ),
            TranslationError::InvalidFileName(name) => write!(f, "invalid dataset file name '{name}'"),
            TranslationError::Fetch(e) => write!(f, "dataset fetch failed: {e}"),
            TranslationError::Io(e, path) => write!(f, "cache I/O error at {}: {e}", path.display()),
            TranslationError::Malformed(file, e) => write!(f, "malformed dataset file {file}: {e}"),
        }
    }
}

impl std::error::Error for TranslationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TranslationError::Fetch(e) => Some(e),
            TranslationError::Io(e, _) => Some(e),
            TranslationError::Malformed(_, e) => Some(e),
            _ => None,
        }
    }
}

impl From<ApiError> for TranslationError {
    fn from(e: ApiError) -> Self {
        TranslationError::Fetch(e)
    }
}

/// Cache behaviour for a [`TeamConversion`] instance.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Parent of the per-sport snapshot directories.
    pub root: PathBuf,
    /// Read and write snapshots on disk. When off, every first access goes remote.
    pub use_cache: bool,
    /// Wipe the sport's snapshots and re-download all of them before first use.
    pub reset_cache: bool,
    /// Pause between files during a full download.
    pub download_delay: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_CACHE_ROOT),
            use_cache: true,
            reset_cache: false,
            download_delay: Duration::from_secs(1),
        }
    }
}

impl CacheSettings {
    /// Defaults, with the cache root taken from `LUKHED_SPORTS_CACHE_DIR` when set.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        match std::env::var(CACHE_DIR_ENV) {
            Ok(root) if !root.trim().is_empty() => settings.root = PathBuf::from(root),
            _ => {}
        }
        settings
    }
}

/// Outcome of a translation. A miss hands back the input unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    Translated(String),
    Unresolved(String),
}

impl Conversion {
    pub fn as_str(&self) -> &str {
        match self {
            Conversion::Translated(name) | Conversion::Unresolved(name) => name,
        }
    }

    pub fn into_name(self) -> String {
        match self {
            Conversion::Translated(name) | Conversion::Unresolved(name) => name,
        }
    }

    pub fn is_translated(&self) -> bool {
        matches!(self, Conversion::Translated(_))
    }
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source and target of a [`TeamConversion::convert_team`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub from_provider: String,
    pub to_provider: String,
    pub from_team_type: String,
    pub to_team_type: String,
    pub from_season: Season,
    pub to_season: Season,
}

impl ConversionRequest {
    /// Long names on both sides, latest season on both sides.
    pub fn new(from_provider: &str, to_provider: &str) -> Self {
        Self {
            from_provider: from_provider.to_owned(),
            to_provider: to_provider.to_owned(),
            from_team_type: DEFAULT_TEAM_TYPE.to_owned(),
            to_team_type: DEFAULT_TEAM_TYPE.to_owned(),
            from_season: Season::Latest,
            to_season: Season::Latest,
        }
    }

    pub fn team_types(mut self, from: &str, to: &str) -> Self {
        self.from_team_type = from.to_owned();
        self.to_team_type = to.to_owned();
        self
    }

    pub fn from_season(mut self, season: impl Into<Season>) -> Self {
        self.from_season = season.into();
        self
    }

    pub fn to_season(mut self, season: impl Into<Season>) -> Self {
        self.to_season = season.into();
        self
    }

    /// The same request pointed the other way.
    pub fn reversed(&self) -> Self {
        Self {
            from_provider: self.to_provider.clone(),
            to_provider: self.from_provider.clone(),
            from_team_type: self.to_team_type.clone(),
            to_team_type: self.from_team_type.clone(),
            from_season: self.to_season,
            to_season: self.from_season,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    From,
    To,
}

#[derive(Debug, Clone)]
struct LoadedProvider {
    file: String,
    data: ProviderData,
}

impl LoadedProvider {
    fn names(&self, group: &str, team_type: &str) -> TranslationResult<&[String]> {
        self.data
            .get(group)
            .and_then(|types| types.get(team_type))
            .map(Vec::as_slice)
            .ok_or_else(|| {
                warn!("team type '{team_type}' not found for {} group '{group}'", self.file);
                TranslationError::UnknownTeamType {
                    provider: self.file.clone(),
                    group: group.to_owned(),
                    team_type: team_type.to_owned(),
                }
            })
    }
}

#[derive(Debug, Default)]
struct MemoryCache {
    providers: Option<ProviderIndex>,
    seasons: Option<SeasonKeys>,
    supported: Option<Vec<String>>,
    from: Option<LoadedProvider>,
    to: Option<LoadedProvider>,
}

impl MemoryCache {
    fn invalidate(&mut self) {
        *self = Self::default();
    }

    fn slot(&self, role: Role) -> Option<&LoadedProvider> {
        match role {
            Role::From => self.from.as_ref(),
            Role::To => self.to.as_ref(),
        }
    }

    fn slot_mut(&mut self, role: Role) -> &mut Option<LoadedProvider> {
        match role {
            Role::From => &mut self.from,
            Role::To => &mut self.to,
        }
    }
}

#[derive(Deserialize)]
struct SupportedProviders {
    names: Vec<String>,
}

/// Translates team names between data providers for one sport.
///
/// Methods that may load data take `&mut self`; use one instance per thread.
#[derive(Debug)]
pub struct TeamConversion<S = GithubDataset> {
    sport: Sport,
    store: DatasetStore<S>,
    memory: MemoryCache,
}

impl TeamConversion<GithubDataset> {
    /// Converter backed by the public GitHub dataset.
    pub fn new(sport: &str, settings: CacheSettings) -> TranslationResult<Self> {
        Self::with_source(sport, settings, GithubDataset::default())
    }
}

impl<S: DatasetSource> TeamConversion<S> {
    /// Fails with [`TranslationError::UnsupportedSport`] before touching disk or network.
    pub fn with_source(sport: &str, settings: CacheSettings, source: S) -> TranslationResult<Self> {
        let sport = Sport::from_name(sport)
            .ok_or_else(|| TranslationError::UnsupportedSport(sport.trim().to_lowercase()))?;

        let disk = DiskCache::new(&settings.root, sport);
        let store = DatasetStore::new(source, sport, disk, settings.use_cache, settings.download_delay);

        if settings.reset_cache {
            store.invalidate()?;
            store.download_all()?;
        }
        if settings.use_cache {
            store.disk().ensure()?;
        }

        Ok(Self { sport, store, memory: MemoryCache::default() })
    }

    pub fn sport(&self) -> Sport {
        self.sport
    }

    pub fn cache_dir(&self) -> &Path {
        self.store.disk().dir()
    }

    pub fn source(&self) -> &S {
        self.store.source()
    }

    /// Display names of every provider in the dataset, loaded once per instance.
    pub fn supported_providers(&mut self) -> TranslationResult<&[String]> {
        let names = match self.memory.supported.take() {
            Some(names) => names,
            None => {
                let raw = self.store.get_or_fetch(SUPPORTED_PROVIDERS_FILE)?;
                decode::<SupportedProviders>(SUPPORTED_PROVIDERS_FILE, raw)?.names
            }
        };
        Ok(self.memory.supported.insert(names).as_slice())
    }

    /// Season-group key -> team types available for the provider.
    pub fn supported_data_for_provider(&mut self, provider: &str) -> TranslationResult<BTreeMap<String, Vec<String>>> {
        let file = self.resolve_provider(provider)?;
        let data: ProviderData = match self.loaded_file(&file) {
            Some(loaded) => loaded.data.clone(),
            None => decode(&file, self.store.get_or_fetch(&file)?)?,
        };

        Ok(data
            .into_iter()
            .map(|(group, types)| (group, types.into_keys().collect()))
            .collect())
    }

    /// Ordered team names of one style for the provider's season.
    pub fn team_list(&mut self, provider: &str, team_type: &str, season: impl Into<Season>) -> TranslationResult<Vec<String>> {
        let file = self.load_provider(Role::From, provider)?;
        let group = self.season_group(&file, season.into())?;
        Ok(self.loaded(Role::From)?.names(&group, team_type)?.to_vec())
    }

    /// Translate `team` from one provider's naming to another's.
    ///
    /// Unknown providers, seasons and team types are errors. A team that is not
    /// in the source list is not: it comes back as [`Conversion::Unresolved`].
    pub fn convert_team(&mut self, team: &str, request: &ConversionRequest) -> TranslationResult<Conversion> {
        let from_file = self.load_provider(Role::From, &request.from_provider)?;
        let to_file = self.load_provider(Role::To, &request.to_provider)?;

        // Group keys are per provider; only the season year carries across.
        let from_group = self.season_group(&from_file, request.from_season)?;
        let to_group = self.season_group(&to_file, request.to_season)?;

        let from_list = self.loaded(Role::From)?.names(&from_group, &request.from_team_type)?;
        let to_list = self.loaded(Role::To)?.names(&to_group, &request.to_team_type)?;

        let needle = team.to_lowercase();
        let translated = from_list
            .iter()
            .position(|name| name.to_lowercase() == needle)
            .and_then(|i| to_list.get(i));

        match translated {
            Some(name) => {
                debug!("translated '{team}' ({from_file}) -> '{name}' ({to_file})");
                Ok(Conversion::Translated(name.clone()))
            }
            None => {
                warn!(
                    "{team} could not be translated as it was not found in the {} list for {from_file}; returning the team unchanged",
                    request.from_team_type
                );
                Ok(Conversion::Unresolved(team.to_owned()))
            }
        }
    }

    /// Canonical dataset file for a provider synonym.
    pub fn resolve_provider(&mut self, provider: &str) -> TranslationResult<String> {
        let index = self.provider_index()?;
        index.resolve(provider).map(str::to_owned).ok_or_else(|| {
            warn!("provider cannot be found for the provided input = {provider}");
            TranslationError::UnknownProvider(provider.to_owned())
        })
    }

    /// Drop everything held in memory and on disk. Files are re-fetched lazily.
    pub fn clear_cache(&mut self) -> TranslationResult<()> {
        self.memory.invalidate();
        self.store.invalidate()
    }

    /// Clear, then eagerly download the full dataset for the sport.
    pub fn reset_cache(&mut self) -> TranslationResult<usize> {
        self.clear_cache()?;
        self.store.download_all()
    }

    fn provider_index(&mut self) -> TranslationResult<&ProviderIndex> {
        let index = match self.memory.providers.take() {
            Some(index) => index,
            None => {
                let raw = self.store.get_or_fetch(PROVIDER_KEY_FILE)?;
                ProviderIndex::from_key_file(PROVIDER_KEY_FILE, raw)?
            }
        };
        Ok(&*self.memory.providers.insert(index))
    }

    fn season_keys(&mut self) -> TranslationResult<&SeasonKeys> {
        let keys = match self.memory.seasons.take() {
            Some(keys) => keys,
            None => decode(SEASON_KEY_FILE, self.store.get_or_fetch(SEASON_KEY_FILE)?)?,
        };
        Ok(&*self.memory.seasons.insert(keys))
    }

    fn season_group(&mut self, file: &str, season: Season) -> TranslationResult<String> {
        self.season_keys()?.group_for(file, season)
    }

    /// Load the provider into a slot unless the slot already holds it.
    fn load_provider(&mut self, role: Role, provider: &str) -> TranslationResult<String> {
        let file = self.resolve_provider(provider)?;
        if self.memory.slot(role).is_some_and(|loaded| loaded.file == file) {
            return Ok(file);
        }

        let data: ProviderData = decode(&file, self.store.get_or_fetch(&file)?)?;
        debug!("loaded {file} into the {role:?} slot");
        *self.memory.slot_mut(role) = Some(LoadedProvider { file: file.clone(), data });
        Ok(file)
    }

    fn loaded(&self, role: Role) -> TranslationResult<&LoadedProvider> {
        self.memory
            .slot(role)
            .ok_or_else(|| TranslationError::UnknownProvider(format!("{role:?} provider")))
    }

    fn loaded_file(&self, file: &str) -> Option<&LoadedProvider> {
        [Role::From, Role::To]
            .into_iter()
            .filter_map(|role| self.memory.slot(role))
            .find(|loaded| loaded.file == file)
    }
}
