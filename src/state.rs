//! Shared server state: the configured search directory and loaded corpora.
//!
//! Corpora are immutable once loaded and handed out as `Arc`s; only the cache
//! and the current-directory slot sit behind locks.

use crate::config::Settings;
use crate::error::Result;
use crate::search::{SearchCorpus, SnapshotStore};
use anyhow::{Context, anyhow};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct IndexState {
    /// LRU cache of loaded corpora, keyed by canonical directory
    cache: RwLock<LruCache<PathBuf, Arc<SearchCorpus>>>,

    /// Directory queries run against when none is given
    search_dir: RwLock<Option<PathBuf>>,

    /// Snapshot store shared by all loads (None when disabled)
    snapshots: Option<SnapshotStore>,

    settings: Settings,
}

impl std::fmt::Debug for IndexState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexState")
            .field("cache_size", &self.cache.try_read().map(|c| c.len()).ok())
            .field("search_dir", &self.search_dir.try_read().map(|d| d.clone()).ok())
            .field("snapshots", &self.snapshots)
            .finish_non_exhaustive()
    }
}

impl IndexState {
    pub fn new(settings: Settings) -> Self {
        let capacity = NonZeroUsize::new(settings.cache.corpus_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: RwLock::new(LruCache::new(capacity)),
            search_dir: RwLock::new(settings.search_dir.clone()),
            snapshots: settings.snapshot_store(),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get the current search directory.
    pub async fn search_dir(&self) -> Option<PathBuf> {
        self.search_dir.read().await.clone()
    }

    /// Loads `dir` and makes it the current search directory.
    ///
    /// Always rereads the directory so a rebuilt documentation set replaces
    /// the cached corpus; unchanged shards come back from snapshots. The
    /// previous directory stays current if loading fails.
    pub async fn set_search_dir(&self, dir: &Path) -> Result<Arc<SearchCorpus>> {
        let dir = canonical(dir).await?;
        let corpus = self.read_corpus(dir).await?;
        *self.search_dir.write().await = Some(corpus.root().to_path_buf());
        Ok(corpus)
    }

    /// Corpus for the current search directory.
    pub async fn corpus(&self) -> Result<Arc<SearchCorpus>> {
        let dir = self.search_dir().await.ok_or_else(|| {
            anyhow!("No search directory configured. Use set_search_dir with a generated `search/` directory.")
        })?;
        self.load(&dir).await
    }

    /// Loads a corpus, reusing the cached copy when present.
    pub async fn load(&self, dir: &Path) -> Result<Arc<SearchCorpus>> {
        let dir = canonical(dir).await?;

        {
            let mut cache = self.cache.write().await;
            if let Some(corpus) = cache.get(&dir) {
                tracing::debug!("Cache hit for {}", dir.display());
                return Ok(corpus.clone());
            }
        }

        self.read_corpus(dir).await
    }

    /// Reads `dir` from disk and replaces its cache slot.
    async fn read_corpus(&self, dir: PathBuf) -> Result<Arc<SearchCorpus>> {
        tracing::info!("Loading search data from {}", dir.display());
        let snapshots = self.snapshots.clone();
        let load_dir = dir.clone();
        // Parsing is CPU bound; keep it off the transport's worker threads
        let corpus = tokio::task::spawn_blocking(move || SearchCorpus::load_dir(&load_dir, snapshots.as_ref()))
            .await
            .context("Search data loading task panicked")??;

        let corpus = Arc::new(corpus);
        self.cache.write().await.put(dir, corpus.clone());
        Ok(corpus)
    }

    pub async fn cached_count(&self) -> usize {
        self.cache.read().await.len()
    }
}

async fn canonical(dir: &Path) -> Result<PathBuf> {
    tokio::fs::canonicalize(dir)
        .await
        .with_context(|| format!("Search directory not found: {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use tempfile::TempDir;

    fn settings() -> Settings {
        let mut settings = Settings::default();
        settings.cache.enabled = false;
        settings
    }

    fn write_shard(dir: &Path) {
        std::fs::write(
            dir.join("all_73.js"),
            "var searchData=[['sgn',['sgn',['../namespacekmath.html#a1e0f',1,'kmath::sgn(T val)']]]];",
        )
        .unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_corpus_requires_search_dir() {
        let state = IndexState::new(settings());
        let_assert!(Err(e) = state.corpus().await);
        check!(e.to_string().contains("No search directory"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_set_search_dir_loads_and_caches() {
        let temp = TempDir::new().unwrap();
        write_shard(temp.path());
        let state = IndexState::new(settings());

        let corpus = state.set_search_dir(temp.path()).await.unwrap();
        check!(corpus.total_entries() == 1);
        check!(state.cached_count().await == 1);

        let again = state.corpus().await.unwrap();
        check!(Arc::ptr_eq(&corpus, &again));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_set_search_dir_rereads_rebuilt_docs() {
        let temp = TempDir::new().unwrap();
        write_shard(temp.path());
        let state = IndexState::new(settings());
        let first = state.set_search_dir(temp.path()).await.unwrap();

        std::fs::write(
            temp.path().join("all_7a.js"),
            "var searchData=[['zip',['zip',['../namespaceseq.html#a9',1,'seq']]]];",
        )
        .unwrap();

        let second = state.set_search_dir(temp.path()).await.unwrap();
        check!(!Arc::ptr_eq(&first, &second));
        check!(second.total_entries() == 2);
        check!(state.cached_count().await == 1);

        let current = state.corpus().await.unwrap();
        check!(Arc::ptr_eq(&second, &current));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_failed_load_keeps_previous_dir() {
        let temp = TempDir::new().unwrap();
        write_shard(temp.path());
        let empty = TempDir::new().unwrap();
        let state = IndexState::new(settings());

        state.set_search_dir(temp.path()).await.unwrap();
        check!(state.set_search_dir(empty.path()).await.is_err());

        let current = state.search_dir().await.unwrap();
        check!(current == std::fs::canonicalize(temp.path()).unwrap());
    }
}
