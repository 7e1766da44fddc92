//! Generated documentation search data: loading, validation, and lookup.
//!
//! This module provides the symbol index queried by a documentation search box,
//! the codec for the generator's `searchData` files, key normalization, and
//! loading of whole `search/` directories with snapshot caching.

// Module declarations
pub(crate) mod codec;
pub(crate) mod corpus;
pub(crate) mod entry;
pub(crate) mod index;
pub(crate) mod key;
pub(crate) mod snapshot;

// Public re-exports (used via lib.rs)
pub use codec::{DEFAULT_VAR_NAME, parse_literal, parse_search_data, rows_from_value, write_js, write_json};
pub use corpus::{SearchCategory, SearchCorpus, load_file, load_rows, shard_category};
pub use entry::{IndexEntry, Variant, unescape_html};
pub use index::{Suggestion, SymbolIndex};
pub use key::{decode_key, search_key};
pub use snapshot::{SnapshotStore, fingerprint};
