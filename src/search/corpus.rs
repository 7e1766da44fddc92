//! Loading a generated `search/` directory.
//!
//! The generator splits its search data by category and by the first character
//! of each key: `all_73.js` holds the keys starting with `s` (0x73) across all
//! categories, `functions_73.js` only the functions. A corpus gathers the shards
//! of each category into one [`SymbolIndex`].

use super::codec::parse_search_data;
use super::entry::IndexEntry;
use super::index::SymbolIndex;
use super::snapshot::{SnapshotStore, fingerprint};
use crate::error::LoadError;
use ignore::WalkBuilder;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

/// `<category>_<hex>.js`
static SHARD_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z]+)_([0-9a-f]+)\.js$").expect("shard pattern is valid")
});

/// Search filter the generator offers in its search box.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SearchCategory {
    All,
    Classes,
    Namespaces,
    Concepts,
    Files,
    Functions,
    Variables,
    Typedefs,
    Enums,
    EnumValues,
    Related,
    Defines,
    Groups,
    Pages,
    Other(String),
}

impl SearchCategory {
    /// File name prefix used for this category's shards.
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Classes => "classes",
            Self::Namespaces => "namespaces",
            Self::Concepts => "concepts",
            Self::Files => "files",
            Self::Functions => "functions",
            Self::Variables => "variables",
            Self::Typedefs => "typedefs",
            Self::Enums => "enums",
            Self::EnumValues => "enumvalues",
            Self::Related => "related",
            Self::Defines => "defines",
            Self::Groups => "groups",
            Self::Pages => "pages",
            Self::Other(name) => name.as_str(),
        }
    }

    /// Label shown in the search filter menu.
    pub fn label(&self) -> &str {
        match self {
            Self::All => "All",
            Self::Classes => "Classes",
            Self::Namespaces => "Namespaces",
            Self::Concepts => "Concepts",
            Self::Files => "Files",
            Self::Functions => "Functions",
            Self::Variables => "Variables",
            Self::Typedefs => "Typedefs",
            Self::Enums => "Enumerations",
            Self::EnumValues => "Enumerator",
            Self::Related => "Friends",
            Self::Defines => "Macros",
            Self::Groups => "Modules",
            Self::Pages => "Pages",
            Self::Other(name) => name.as_str(),
        }
    }
}

impl FromStr for SearchCategory {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "all" => Self::All,
            "classes" => Self::Classes,
            "namespaces" => Self::Namespaces,
            "concepts" => Self::Concepts,
            "files" => Self::Files,
            "functions" => Self::Functions,
            "variables" => Self::Variables,
            "typedefs" => Self::Typedefs,
            "enums" => Self::Enums,
            "enumvalues" => Self::EnumValues,
            "related" => Self::Related,
            "defines" => Self::Defines,
            "groups" => Self::Groups,
            "pages" => Self::Pages,
            other => Self::Other(other.to_string()),
        })
    }
}

impl fmt::Display for SearchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Splits a shard file name into its category.
///
/// Returns `None` for files that are not search data (`search.js`, `searchdata.js`).
pub fn shard_category(file_name: &str) -> Option<SearchCategory> {
    let caps = SHARD_NAME.captures(file_name)?;
    caps.get(1).and_then(|m| m.as_str().parse().ok())
}

/// Reads one search data file into its raw rows, using `snapshots` when given.
pub fn load_rows(path: &Path, snapshots: Option<&SnapshotStore>) -> Result<Vec<IndexEntry>, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let Some(store) = snapshots else {
        return parse_search_data(&text).map_err(|e| e.in_file(path));
    };

    let print = fingerprint(text.as_bytes());
    if let Some(rows) = store.load(path, print) {
        return Ok(rows);
    }

    let rows = parse_search_data(&text).map_err(|e| e.in_file(path))?;
    store.store(path, print, &rows);
    Ok(rows)
}

/// Loads a single search data file into an index.
pub fn load_file(path: &Path, snapshots: Option<&SnapshotStore>) -> Result<SymbolIndex, LoadError> {
    let rows = load_rows(path, snapshots)?;
    SymbolIndex::from_entries(rows).map_err(|e| e.in_file(path))
}

/// All categories of one generated search directory.
#[derive(Debug, Clone)]
pub struct SearchCorpus {
    root: PathBuf,
    categories: Vec<(SearchCategory, SymbolIndex)>,
}

impl SearchCorpus {
    /// Loads every `<category>_<hex>.js` shard directly inside `dir`.
    ///
    /// Shards are read in file-name order; within a category their rows are
    /// concatenated before the index is built, so keys repeated across shards
    /// merge like keys repeated within one file.
    pub fn load_dir(dir: &Path, snapshots: Option<&SnapshotStore>) -> Result<Self, LoadError> {
        let start = std::time::Instant::now();

        let metadata = std::fs::metadata(dir).map_err(|source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(LoadError::Io {
                path: dir.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
            });
        }

        let walker = WalkBuilder::new(dir)
            .max_depth(Some(1))
            .standard_filters(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let mut grouped: Vec<(SearchCategory, Vec<IndexEntry>)> = Vec::new();
        let mut shard_count = 0usize;

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let Some(category) = entry.file_name().to_str().and_then(shard_category) else {
                tracing::trace!("Ignoring non-shard file {}", entry.path().display());
                continue;
            };

            let rows = load_rows(entry.path(), snapshots)?;
            tracing::debug!(
                "Loaded {} rows from {} ({})",
                rows.len(),
                entry.path().display(),
                category
            );
            shard_count += 1;

            match grouped.iter().position(|(c, _)| *c == category) {
                Some(pos) => grouped[pos].1.extend(rows),
                None => grouped.push((category, rows)),
            }
        }

        if shard_count == 0 {
            return Err(LoadError::EmptyDirectory {
                path: dir.to_path_buf(),
            });
        }

        grouped.sort_by(|(a, _), (b, _)| a.cmp(b));
        let categories = grouped
            .into_iter()
            .map(|(category, rows)| {
                SymbolIndex::from_entries(rows)
                    .map(|index| (category, index))
                    .map_err(|e| e.in_file(dir))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let corpus = Self {
            root: dir.to_path_buf(),
            categories,
        };

        tracing::info!(
            "Loaded search corpus from {}: {} shards, {} categories, {} entries in {:?}",
            dir.display(),
            shard_count,
            corpus.categories.len(),
            corpus.total_entries(),
            start.elapsed()
        );

        Ok(corpus)
    }

    /// Builds a corpus from already-loaded indexes.
    pub fn from_indexes(root: impl Into<PathBuf>, mut categories: Vec<(SearchCategory, SymbolIndex)>) -> Self {
        categories.sort_by(|(a, _), (b, _)| a.cmp(b));
        Self {
            root: root.into(),
            categories,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn category(&self, category: &SearchCategory) -> Option<&SymbolIndex> {
        self.categories
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, index)| index)
    }

    /// The `all` index, or the first category if the generator emitted no `all` shards.
    pub fn default_index(&self) -> Option<(&SearchCategory, &SymbolIndex)> {
        self.categories()
            .find(|(c, _)| **c == SearchCategory::All)
            .or_else(|| self.categories().next())
    }

    pub fn categories(&self) -> impl Iterator<Item = (&SearchCategory, &SymbolIndex)> {
        self.categories.iter().map(|(c, index)| (c, index))
    }

    pub fn total_entries(&self) -> usize {
        self.categories.iter().map(|(_, index)| index.len()).sum()
    }
}
