//! Load, validate, and query the symbol search data emitted by documentation generators.
//!
//! The core type is [`SymbolIndex`]: a read-only map from search key to the
//! documented variants of that symbol, answering prefix and exact lookups.
//! [`SearchCorpus`] loads a whole generated `search/` directory, and
//! [`IndexServer`] serves lookups over MCP.

pub mod cli;
pub mod config;
pub mod error;
pub mod search;
pub mod server;
pub mod state;
pub mod tools;
pub mod tracing;

pub use config::{CacheSettings, Settings};
pub use error::LoadError;
pub use search::{
    IndexEntry, SearchCategory, SearchCorpus, SnapshotStore, Suggestion, SymbolIndex, Variant,
    parse_search_data, search_key, write_js, write_json,
};
pub use server::IndexServer;
pub use state::IndexState;
