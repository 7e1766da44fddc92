//! Prefix and exact key lookup handlers.

use crate::search::{IndexEntry, SearchCategory, SearchCorpus, SymbolIndex, Variant, decode_key};
use crate::state::IndexState;
use rmcp::schemars;
use serde::Deserialize;
use std::{fmt::Write as _, sync::Arc};

/// Number of "did you mean" keys offered after a miss.
const SUGGESTION_LIMIT: usize = 5;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LookupPrefixRequest {
    /// Symbol text as typed into a search box (e.g. "sg", "seq.hpp", "StrFmt") or a stored key prefix (e.g. "str_2e")
    pub prefix: String,
    /// Category to search: all, classes, namespaces, files, functions, variables, ... (default: all)
    #[serde(default)]
    pub category: Option<String>,
    /// Maximum number of keys to return (default: configured max_results)
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExactLookupRequest {
    /// Exact stored search key, e.g. "sgn" or "seq_2ehpp"
    pub key: String,
    /// Category to search (default: all)
    #[serde(default)]
    pub category: Option<String>,
}

/// Prefix search over the current search directory.
pub async fn handle_lookup_prefix(
    state: &Arc<IndexState>,
    request: LookupPrefixRequest,
) -> Result<String, String> {
    let corpus = state.corpus().await.map_err(|e| format!("{:#}", e))?;
    let (category, index) = select_index(&corpus, request.category.as_deref())?;

    let limit = request.limit.unwrap_or(state.settings().max_results);
    let matches = index.search(&request.prefix);

    if matches.is_empty() {
        return Ok(format!(
            "No symbols starting with '{}' in {}.\n",
            request.prefix,
            category.label()
        ));
    }

    Ok(format_prefix_results(&request.prefix, category, &matches, limit))
}

/// Exact key lookup over the current search directory.
pub async fn handle_exact_lookup(
    state: &Arc<IndexState>,
    request: ExactLookupRequest,
) -> Result<String, String> {
    let corpus = state.corpus().await.map_err(|e| format!("{:#}", e))?;
    let (category, index) = select_index(&corpus, request.category.as_deref())?;

    if let Some(entry) = index.exact_lookup(&request.key) {
        let mut output = String::new();
        write_entry(&mut output, 1, entry);
        return Ok(output);
    }

    Ok(format_miss(&request.key, category, index, state.settings().suggestion_threshold))
}

/// Resolve the requested category, defaulting to `all`.
fn select_index<'a>(
    corpus: &'a SearchCorpus,
    category: Option<&str>,
) -> Result<(&'a SearchCategory, &'a SymbolIndex), String> {
    let Some(name) = category else {
        return corpus
            .default_index()
            .ok_or_else(|| "Search directory has no categories".to_string());
    };

    let Ok(wanted) = name.parse::<SearchCategory>();
    corpus
        .categories()
        .find(|(c, _)| **c == wanted)
        .ok_or_else(|| {
            let available: Vec<_> = corpus.categories().map(|(c, _)| c.as_str()).collect();
            format!(
                "Category '{}' not found. Available: {}",
                name,
                available.join(", ")
            )
        })
}

/// Render matches grouped by key, capped at `limit` keys.
fn format_prefix_results(
    prefix: &str,
    category: &SearchCategory,
    matches: &[&IndexEntry],
    limit: usize,
) -> String {
    let shown = matches.len().min(limit);
    let mut output = format!(
        "Symbols starting with '{}' in {} ({} of {}):\n\n",
        prefix,
        category.label(),
        shown,
        matches.len()
    );

    for (idx, entry) in matches.iter().take(limit).enumerate() {
        write_entry(&mut output, idx + 1, entry);
    }

    if shown < matches.len() {
        let _ = writeln!(
            output,
            "… {} more. Type a longer prefix to narrow the results.",
            matches.len() - shown
        );
    }

    output
}

/// One numbered result: a single destination inline, several as a list.
///
/// The stored key follows the label in brackets so it can be passed to exact_lookup.
fn write_entry(output: &mut String, number: usize, entry: &IndexEntry) {
    match entry.variants.as_slice() {
        [only] => {
            let _ = write!(output, "{}. `{}` [{}]", number, only.display_label(), entry.key);
            if let Some(scope) = only.display_scope() {
                let _ = write!(output, " ({})", scope);
            }
            let _ = writeln!(output, "{}", external_marker(only));
            let _ = writeln!(output, "   {}\n", only.target);
        }
        variants => {
            let label = variants
                .first()
                .map_or_else(|| decode_key(&entry.key), |v| v.display_label().into_owned());
            let _ = writeln!(
                output,
                "{}. `{}` [{}] ({} matches)",
                number,
                label,
                entry.key,
                variants.len()
            );
            for variant in variants {
                let scope = variant
                    .display_scope()
                    .unwrap_or_else(|| variant.display_label());
                let _ = writeln!(
                    output,
                    "   • {}{} → {}",
                    scope,
                    external_marker(variant),
                    variant.target
                );
            }
            output.push('\n');
        }
    }
}

const fn external_marker(variant: &Variant) -> &'static str {
    if variant.local { "" } else { " [external]" }
}

/// "No entry" message with the closest keys.
fn format_miss(key: &str, category: &SearchCategory, index: &SymbolIndex, threshold: f64) -> String {
    let mut output = format!("No entry for '{}' in {}.\n", key, category.label());

    let suggestions = index.suggest(key, threshold, SUGGESTION_LIMIT);
    if !suggestions.is_empty() {
        output.push_str("\nDid you mean:\n");
        for suggestion in suggestions {
            let _ = writeln!(
                output,
                "• `{}` ({})",
                suggestion.entry.key,
                suggestion.entry.label()
            );
        }
    }

    output
}
