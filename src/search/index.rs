//! In-memory symbol index answering prefix and exact key queries.

use super::entry::IndexEntry;
use super::key::search_key;
use crate::error::LoadError;
use ahash::AHashMap;
use rapidfuzz::distance::jaro_winkler;

/// Read-only mapping from search key to documented variants.
///
/// Entries keep their load order; keys are unique. Built once through
/// [`SymbolIndex::from_entries`] and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct SymbolIndex {
    entries: Vec<IndexEntry>,
    /// Lowercased keys, parallel to `entries`, for case-insensitive prefix tests
    folded: Vec<String>,
    /// Exact key → position in `entries`
    positions: AHashMap<String, usize>,
}

/// A near-miss key offered when an exact lookup fails.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion<'a> {
    pub entry: &'a IndexEntry,
    pub score: f64,
}

impl SymbolIndex {
    /// Validates rows and builds the index.
    ///
    /// Rows repeating an earlier key are merged into the first occurrence,
    /// their variants appended in row order.
    pub fn from_entries(rows: impl IntoIterator<Item = IndexEntry>) -> Result<Self, LoadError> {
        let mut index = Self::default();
        let mut merged = 0usize;

        for (row, entry) in rows.into_iter().enumerate() {
            if entry.key.is_empty() {
                return Err(LoadError::schema(row, "empty key"));
            }
            if entry.variants.is_empty() {
                return Err(LoadError::schema(
                    row,
                    format!("'{}' has no destinations", entry.key),
                ));
            }
            if let Some(variant) = entry.variants.iter().find(|v| v.target.is_empty()) {
                return Err(LoadError::schema(
                    row,
                    format!("empty target for '{}'", variant.label),
                ));
            }

            if let Some(&pos) = index.positions.get(&entry.key) {
                index.entries[pos].variants.extend(entry.variants);
                merged += 1;
            } else {
                index.positions.insert(entry.key.clone(), index.entries.len());
                index.folded.push(entry.key.to_lowercase());
                index.entries.push(entry);
            }
        }

        if merged > 0 {
            tracing::debug!(
                "Merged {} duplicate rows into {} entries",
                merged,
                index.entries.len()
            );
        }

        Ok(index)
    }

    /// Every entry whose key starts with `prefix`, compared case-insensitively,
    /// in stored order. An empty prefix matches everything.
    pub fn lookup_prefix(&self, prefix: &str) -> Vec<&IndexEntry> {
        let prefix = prefix.to_lowercase();
        self.entries
            .iter()
            .zip(&self.folded)
            .filter(|(_, folded)| folded.starts_with(&prefix))
            .map(|(entry, _)| entry)
            .collect()
    }

    /// The entry stored under exactly `key`.
    pub fn exact_lookup(&self, key: &str) -> Option<&IndexEntry> {
        self.positions.get(key).map(|&pos| &self.entries[pos])
    }

    /// Prefix lookup accepting either a stored key prefix (`str_2e`) or text
    /// as a user types it (`str.`, `StrFmt`).
    ///
    /// An entry matches if its key starts with the query itself or with the
    /// query converted to the stored key alphabet. Results are in stored order.
    pub fn search(&self, query: &str) -> Vec<&IndexEntry> {
        let raw = query.to_lowercase();
        let encoded = search_key(query);
        self.entries
            .iter()
            .zip(&self.folded)
            .filter(|(_, folded)| folded.starts_with(&raw) || folded.starts_with(&encoded))
            .map(|(entry, _)| entry)
            .collect()
    }

    /// Keys most similar to `key`, best first, with a Jaro-Winkler score
    /// of at least `min_score`.
    ///
    /// `key` may be a stored key or typed text; each candidate is scored
    /// against both forms and keeps the better score.
    pub fn suggest(&self, key: &str, min_score: f64, limit: usize) -> Vec<Suggestion<'_>> {
        let raw = key.to_lowercase();
        let encoded = search_key(key);
        let mut suggestions: Vec<_> = self
            .entries
            .iter()
            .zip(&self.folded)
            .map(|(entry, folded)| {
                let score = jaro_winkler::similarity(raw.chars(), folded.chars());
                let score = if encoded == raw {
                    score
                } else {
                    score.max(jaro_winkler::similarity(encoded.chars(), folded.chars()))
                };
                Suggestion { entry, score }
            })
            .filter(|s| s.score >= min_score)
            .collect();

        // Stable sort keeps stored order among equal scores
        suggestions.sort_by(|a, b| b.score.total_cmp(&a.score));
        suggestions.truncate(limit);
        suggestions
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of variants across all entries.
    pub fn variant_count(&self) -> usize {
        self.entries.iter().map(|e| e.variants.len()).sum()
    }
}
