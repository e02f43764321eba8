//! Typed views of the translation dataset's key files.

use super::{TranslationError, TranslationResult};
use crate::Season;
use log::warn;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// season-group key -> team type -> ordered team names.
pub type ProviderData = BTreeMap<String, BTreeMap<String, Vec<String>>>;

pub(crate) fn decode<T: DeserializeOwned>(file: &str, value: Value) -> TranslationResult<T> {
    serde_json::from_value(value).map_err(|e| TranslationError::Malformed(file.to_owned(), e))
}

/// Lowercase synonym -> canonical provider file, built once from `providerKey.json`.
#[derive(Debug, Clone, Default)]
pub struct ProviderIndex {
    by_synonym: HashMap<String, String>,
    files: Vec<String>,
}

impl ProviderIndex {
    /// Build from the raw `providerKey.json` object, keeping its document order.
    pub fn from_key_file(file: &str, value: Value) -> TranslationResult<Self> {
        let entries: Map<String, Value> = decode(file, value)?;
        let synonyms = entries
            .into_iter()
            .map(|(provider, names)| Ok((provider, decode::<Vec<String>>(file, names)?)))
            .collect::<TranslationResult<Vec<_>>>()?;
        Ok(Self::from_synonyms(synonyms))
    }

    /// Overlapping synonyms keep the first provider in iteration order.
    pub fn from_synonyms<I: IntoIterator<Item = (String, Vec<String>)>>(synonyms: I) -> Self {
        let mut by_synonym: HashMap<String, String> = HashMap::new();
        let mut files = Vec::new();

        for (file, names) in synonyms {
            if names.is_empty() {
                warn!("provider file {file} has no synonyms and cannot be resolved");
            }
            for name in names {
                let key = name.trim().to_lowercase();
                match by_synonym.get(&key) {
                    Some(existing) if *existing != file => warn!(
                        "synonym '{name}' is claimed by both {existing} and {file}; keeping {existing}"
                    ),
                    Some(_) => {}
                    None => {
                        by_synonym.insert(key, file.clone());
                    }
                }
            }
            files.push(file);
        }

        Self { by_synonym, files }
    }

    pub fn resolve(&self, provider: &str) -> Option<&str> {
        self.by_synonym
            .get(&provider.trim().to_lowercase())
            .map(String::as_str)
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }
}

/// provider file -> season-group key -> seasons sharing that naming.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct SeasonKeys {
    providers: HashMap<String, BTreeMap<String, Vec<i32>>>,
}

impl SeasonKeys {
    /// Highest season listed for the provider across all of its groups.
    pub fn latest(&self, file: &str) -> Option<i32> {
        self.providers
            .get(file)?
            .values()
            .flatten()
            .copied()
            .max()
    }

    pub fn group_for(&self, file: &str, season: Season) -> TranslationResult<String> {
        let unknown = || {
            warn!(
                "season {season} was not found in the season key for {file}; \
                 use 'latest' unless you need a prior season"
            );
            TranslationError::UnknownSeason { provider: file.to_owned(), season }
        };

        let groups = self.providers.get(file).ok_or_else(unknown)?;
        let year = match season {
            Season::Latest => self.latest(file).ok_or_else(unknown)?,
            Season::Year(year) => year,
        };

        groups
            .iter()
            .find(|(_, seasons)| seasons.contains(&year))
            .map(|(key, _)| key.clone())
            .ok_or_else(unknown)
    }
}
