//! Shared test fixtures and utilities for integration tests.
//!
//! # Test Isolation Strategy
//!
//! Tests that touch the filesystem copy the checked-in search data under
//! `tests/fixtures/search/` into a fresh temporary directory. Each test gets:
//! - Its own `search/` directory it may modify
//! - Its own snapshot directory (cold snapshot cache)
//! - Its own `IndexState` with an empty corpus cache
//!
//! # Available Fixtures
//!
//! - `fixture_index`: the `all_73.js` shard loaded straight from the repo (read-only tests)
//! - `isolated_search_dir`: a temp copy of the fixture directory with an `IndexState`

use docindex::search::load_file;
use docindex::{IndexState, Settings, SymbolIndex};
use rstest::fixture;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Returns the project root directory (where Cargo.toml lives).
pub fn project_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Checked-in generated search directory.
pub fn fixture_dir() -> PathBuf {
    project_root().join("tests/fixtures/search")
}

/// A temporary directory for test isolation.
///
/// Automatically cleaned up when dropped.
#[allow(dead_code)] // Methods used across different integration test crates
pub struct TempWorkspace {
    _temp: TempDir,
    root: PathBuf,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl TempWorkspace {
    /// Creates a new empty temporary workspace.
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        Self { _temp: temp, root }
    }

    /// Returns the root path of this workspace.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Creates a file with the given content within this workspace.
    ///
    /// Parent directories are created automatically if they don't exist.
    ///
    /// # Panics
    /// Panics if file creation fails.
    pub fn create_file(&self, path: &str, content: &str) {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!("Failed to create parent directory for '{}': {}", path, e)
            });
        }
        std::fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Failed to write file '{}': {}", path, e));
    }

    /// Copies every file of `source` into `dest_relative`.
    ///
    /// # Panics
    /// Panics if copying fails.
    pub fn copy_dir(&self, source: &Path, dest_relative: &str) {
        let dest = self.root.join(dest_relative);
        std::fs::create_dir_all(&dest)
            .unwrap_or_else(|e| panic!("Failed to create '{}': {}", dest_relative, e));

        for entry in std::fs::read_dir(source).expect("Failed to read fixture directory") {
            let entry = entry.expect("Failed to read fixture entry");
            std::fs::copy(entry.path(), dest.join(entry.file_name())).unwrap_or_else(|e| {
                panic!("Failed to copy '{}': {}", entry.path().display(), e)
            });
        }
    }
}

impl Default for TempWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// A temp copy of the fixture search directory plus server state.
#[allow(dead_code)] // Fields used across different integration test crates
pub struct IsolatedSearchDir {
    workspace: TempWorkspace,
    pub state: Arc<IndexState>,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl IsolatedSearchDir {
    pub fn new() -> Self {
        let workspace = TempWorkspace::new();
        workspace.copy_dir(&fixture_dir(), "html/search");

        let mut settings = Settings::default();
        settings.cache.dir = Some(workspace.path().join("snapshots"));
        let state = Arc::new(IndexState::new(settings));

        Self { workspace, state }
    }

    /// Root of the temp workspace.
    pub fn root(&self) -> &Path {
        self.workspace.path()
    }

    /// The copied `search/` directory.
    pub fn search_dir(&self) -> PathBuf {
        self.workspace.path().join("html/search")
    }

    /// Snapshot directory used by this workspace's state.
    pub fn snapshot_dir(&self) -> PathBuf {
        self.workspace.path().join("snapshots")
    }

    pub fn workspace(&self) -> &TempWorkspace {
        &self.workspace
    }
}

impl Default for IsolatedSearchDir {
    fn default() -> Self {
        Self::new()
    }
}

/// The `all_73.js` fixture shard, loaded without snapshots.
#[fixture]
pub fn fixture_index() -> SymbolIndex {
    load_file(&fixture_dir().join("all_73.js"), None).expect("fixture shard should load")
}

/// Creates an isolated search directory for testing.
///
/// Returns `IsolatedSearchDir` rather than just the state because the temp
/// directory must stay alive for the duration of the test.
#[fixture]
pub fn isolated_search_dir() -> IsolatedSearchDir {
    IsolatedSearchDir::new()
}
