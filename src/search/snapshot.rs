//! Binary snapshots of parsed search data.
//!
//! Parsing the JavaScript form is cheap for one shard but adds up across a
//! large documentation set. Each parsed file is stored as a postcard snapshot
//! keyed by the xxh3 hash of its path, and reused only while the xxh3 hash of
//! the file contents still matches.

use super::entry::IndexEntry;
use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use xxhash_rust::xxh3::xxh3_64;

/// Bumped whenever the snapshot layout or entry types change.
const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
struct Snapshot {
    version: u32,
    fingerprint: u64,
    rows: Vec<IndexEntry>,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    fingerprint: u64,
    rows: &'a [IndexEntry],
}

/// Content fingerprint of a search data file.
pub fn fingerprint(bytes: &[u8]) -> u64 {
    xxh3_64(bytes)
}

/// Directory of cached snapshots.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Snapshot file used for `source`.
    pub fn path_for(&self, source: &Path) -> PathBuf {
        let id = xxh3_64(source.as_os_str().as_encoded_bytes());
        self.dir.join(format!("{:016x}.idx", id))
    }

    /// Returns the cached rows for `source` if the snapshot matches `fingerprint`.
    pub fn load(&self, source: &Path, fingerprint: u64) -> Option<Vec<IndexEntry>> {
        let path = self.path_for(source);
        let bytes = std::fs::read(&path).ok()?;

        match decode(&bytes) {
            Ok(snapshot) if snapshot.version == SNAPSHOT_VERSION && snapshot.fingerprint == fingerprint => {
                tracing::debug!("Using snapshot {} for {}", path.display(), source.display());
                Some(snapshot.rows)
            }
            Ok(_) => {
                tracing::info!(
                    "Snapshot stale for {}, will reparse (file: {})",
                    source.display(),
                    path.display()
                );
                None
            }
            Err(e) => {
                tracing::warn!("Failed to decode snapshot at {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Writes a snapshot for `source`. Failures are logged and otherwise ignored.
    pub fn store(&self, source: &Path, fingerprint: u64, rows: &[IndexEntry]) {
        let path = self.path_for(source);
        let snapshot = SnapshotRef {
            version: SNAPSHOT_VERSION,
            fingerprint,
            rows,
        };

        let bytes = match postcard::to_stdvec(&snapshot) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Failed to encode snapshot for {}: {}", source.display(), e);
                return;
            }
        };

        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            tracing::warn!("Failed to create snapshot dir {}: {}", self.dir.display(), e);
            return;
        }

        // Write then rename so readers never see a half-written snapshot
        let tmp = path.with_extension("idx.tmp");
        let result = std::fs::write(&tmp, &bytes).and_then(|()| std::fs::rename(&tmp, &path));
        match result {
            Ok(()) => tracing::debug!("Cached snapshot for {} at {}", source.display(), path.display()),
            Err(e) => {
                tracing::warn!("Failed to write snapshot to {}: {}", path.display(), e);
                let _ = std::fs::remove_file(&tmp);
            }
        }
    }
}

fn decode(bytes: &[u8]) -> Result<Snapshot, LoadError> {
    Ok(postcard::from_bytes(bytes)?)
}
