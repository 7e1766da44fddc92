//! Layered configuration: defaults, TOML file, environment, command line.
//!
//! The file is looked up in this order, first hit wins:
//! 1. `--config <path>` on the command line
//! 2. `docindex.toml` in the current directory
//! 3. `<config dir>/docindex/config.toml` (e.g. `~/.config/docindex/config.toml`)
//!
//! Environment variables override file values:
//! - `DOCINDEX_SEARCH_DIR` sets `search_dir`
//! - `DOCINDEX_CACHE_DIR` sets `cache.dir`
//! - `DOCINDEX_MAX_RESULTS` sets `max_results`
//! - `DOCINDEX_NO_CACHE=1` disables snapshots

use crate::error::Result;
use crate::search::SnapshotStore;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "docindex.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Generated `search/` directory to load at startup
    pub search_dir: Option<PathBuf>,

    /// Result cap applied when a query doesn't pass its own limit
    pub max_results: usize,

    /// Minimum Jaro-Winkler similarity for "did you mean" suggestions
    pub suggestion_threshold: f64,

    /// Snapshot and corpus cache settings
    pub cache: CacheSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Write and reuse binary snapshots of parsed files
    pub enabled: bool,

    /// Snapshot directory; defaults to the platform cache dir
    pub dir: Option<PathBuf>,

    /// Number of loaded search directories kept in memory
    pub corpus_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            search_dir: None,
            max_results: 50,
            suggestion_threshold: 0.8,
            cache: CacheSettings::default(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            corpus_capacity: 8,
        }
    }
}

impl Settings {
    /// Loads settings from `explicit` or the first config file found, then
    /// applies environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut settings = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::discover() {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        settings.apply_env(|name| std::env::var(name).ok())?;
        Ok(settings)
    }

    /// Parses a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(settings)
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.is_file() {
            return Some(local);
        }

        dirs::config_dir()
            .map(|dir| dir.join("docindex").join("config.toml"))
            .filter(|path| path.is_file())
    }

    /// Applies `DOCINDEX_*` overrides read through `var`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(dir) = var("DOCINDEX_SEARCH_DIR") {
            self.search_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = var("DOCINDEX_CACHE_DIR") {
            self.cache.dir = Some(PathBuf::from(dir));
        }
        if let Some(max) = var("DOCINDEX_MAX_RESULTS") {
            self.max_results = max
                .trim()
                .parse()
                .with_context(|| format!("DOCINDEX_MAX_RESULTS must be a number, got '{}'", max))?;
        }
        if var("DOCINDEX_NO_CACHE").is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true")) {
            self.cache.enabled = false;
        }
        Ok(())
    }

    /// Snapshot store for the configured cache directory, if snapshots are enabled.
    pub fn snapshot_store(&self) -> Option<SnapshotStore> {
        if !self.cache.enabled {
            return None;
        }

        self.cache
            .dir
            .clone()
            .or_else(|| dirs::cache_dir().map(|dir| dir.join("docindex")))
            .map(SnapshotStore::new)
    }
}
