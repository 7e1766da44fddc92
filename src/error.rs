//! Error handling types and utilities.

use std::path::PathBuf;

/// A specialized Result type for docindex application plumbing.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods throughout the binary and configuration code.
pub type Result<T> = anyhow::Result<T>;

/// Error returned when loading search data fails.
///
/// Loading is all-or-nothing: any of these rejects the whole file or directory.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The search data file or directory could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The text is not a valid array literal.
    #[error("Syntax error at byte {offset}: {message}")]
    Syntax { offset: usize, message: String },
    /// A row parsed but does not have the `[key, [label, ...]]` shape.
    #[error("Malformed entry at row {row}: {message}")]
    Schema { row: usize, message: String },
    /// Parsing a specific file failed.
    #[error("{}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<LoadError>,
    },
    /// A search directory contained no `<category>_<hex>.js` files.
    #[error("No search data files found in {}", path.display())]
    EmptyDirectory { path: PathBuf },
    /// A cached snapshot could not be decoded or encoded.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] postcard::Error),
}

impl LoadError {
    pub(crate) fn schema(row: usize, message: impl Into<String>) -> Self {
        Self::Schema {
            row,
            message: message.into(),
        }
    }

    pub(crate) fn in_file(self, path: &std::path::Path) -> Self {
        Self::File {
            path: path.to_path_buf(),
            source: Box::new(self),
        }
    }

    pub(crate) fn syntax(offset: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            offset,
            message: message.into(),
        }
    }
}
