//! Remote -> disk tiers of the translation dataset.

use super::{TranslationError, TranslationResult};
use crate::Sport;
use crate::github::DatasetSource;
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

pub const TRANSLATIONS_ROOT: &str = "translations";
pub const MANIFEST_FILE: &str = "structure.json";

/// One directory of whole-file JSON snapshots for a single sport.
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    pub fn new(root: &Path, sport: Sport) -> Self {
        Self { dir: root.join(sport.as_str()) }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    pub fn contains(&self, file: &str) -> bool {
        self.path_for(file).is_file()
    }

    pub fn ensure(&self) -> TranslationResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| TranslationError::Io(e, self.dir.clone()))
    }

    /// `None` when the file is missing or unreadable; either way the caller re-fetches.
    pub fn load(&self, file: &str) -> Option<Value> {
        let path = self.path_for(file);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("could not read cache file {}: {e}", path.display());
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("ignoring corrupt cache file {}: {e}", path.display());
                None
            }
        }
    }

    pub fn store(&self, file: &str, value: &Value) -> TranslationResult<()> {
        self.ensure()?;
        let path = self.path_for(file);
        let content = serde_json::to_string_pretty(value)
            .map_err(|e| TranslationError::Malformed(file.to_owned(), e))?;
        fs::write(&path, content).map_err(|e| TranslationError::Io(e, path))
    }

    /// Delete the directory and everything in it.
    pub fn clear(&self) -> TranslationResult<()> {
        if self.dir.exists() {
            info!("deleting cache at {}", self.dir.display());
            fs::remove_dir_all(&self.dir).map_err(|e| TranslationError::Io(e, self.dir.clone()))?;
        }
        Ok(())
    }
}

/// Tiered file access: disk snapshot first (when enabled), remote otherwise.
#[derive(Debug)]
pub struct DatasetStore<S> {
    source: S,
    sport: Sport,
    disk: DiskCache,
    use_cache: bool,
    download_delay: Duration,
}

impl<S: DatasetSource> DatasetStore<S> {
    pub fn new(source: S, sport: Sport, disk: DiskCache, use_cache: bool, download_delay: Duration) -> Self {
        Self { source, sport, disk, use_cache, download_delay }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn disk(&self) -> &DiskCache {
        &self.disk
    }

    /// Return the file's JSON, pulling it from the remote store on a cache miss.
    pub fn get_or_fetch(&self, file: &str) -> TranslationResult<Value> {
        validate_file_name(file)?;
        if !self.use_cache {
            return self.fetch_remote(file);
        }

        if let Some(value) = self.disk.load(file) {
            debug!("cache hit for {file}");
            return Ok(value);
        }

        let value = self.fetch_remote(file)?;
        self.disk.store(file, &value)?;
        Ok(value)
    }

    /// Wipe the on-disk snapshot; files come back one at a time on next access.
    pub fn invalidate(&self) -> TranslationResult<()> {
        self.disk.clear()?;
        if self.use_cache {
            self.disk.ensure()?;
        }
        Ok(())
    }

    /// File names listed for this sport in the remote directory manifest.
    pub fn manifest(&self) -> TranslationResult<Vec<String>> {
        let path = format!("{TRANSLATIONS_ROOT}/{MANIFEST_FILE}");
        let raw = self.source.fetch(&path)?;
        let mut sports: HashMap<String, Vec<String>> = super::keys::decode(MANIFEST_FILE, raw)?;
        sports
            .remove(self.sport.as_str())
            .ok_or_else(|| TranslationError::UnsupportedSport(self.sport.to_string()))
    }

    /// Download every manifest file to disk, pausing between files.
    pub fn download_all(&self) -> TranslationResult<usize> {
        let files = self.manifest()?;
        let total = files.len();
        info!("downloading {total} files to cache...");

        for (i, file) in files.iter().enumerate() {
            validate_file_name(file)?;
            if i > 0 && !self.download_delay.is_zero() {
                thread::sleep(self.download_delay);
            }
            let value = self.fetch_remote(file)?;
            self.disk.store(file, &value)?;
            info!("downloaded {} of {total} files", i + 1);
        }

        Ok(total)
    }

    fn fetch_remote(&self, file: &str) -> TranslationResult<Value> {
        let path = format!("{TRANSLATIONS_ROOT}/{}/{file}", self.sport.as_str());
        debug!("fetching {path}");
        Ok(self.source.fetch(&path)?)
    }
}

fn validate_file_name(file: &str) -> TranslationResult<()> {
    let invalid = file.is_empty() || file == "." || file == ".." || file.contains(['/', '\\']);
    if invalid {
        Err(TranslationError::InvalidFileName(file.to_owned()))
    } else {
        Ok(())
    }
}
