use crate::search::SearchCorpus;
use crate::state::IndexState;
use rmcp::schemars;
use serde::Deserialize;
use std::borrow::Cow;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Parameters for set_search_dir tool
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetSearchDirRequest {
    /// Path to the generated documentation `search/` directory (e.g. `html/search`)
    pub path: String,
}

/// Load a search directory and make it the default for later queries.
pub async fn handle_set_search_dir(
    state: &Arc<IndexState>,
    request: SetSearchDirRequest,
) -> Result<String, String> {
    let previous = state.search_dir().await;
    let path = PathBuf::from(expand_tilde(&request.path).into_owned());

    let corpus = state
        .set_search_dir(&path)
        .await
        .map_err(|e| format!("Failed to load search directory '{}': {:#}", request.path, e))?;

    Ok(format_response(&corpus, previous.as_deref()))
}

/// Format a summary of the loaded categories.
pub fn format_response(corpus: &SearchCorpus, previous: Option<&Path>) -> String {
    let mut response = format!("Search directory set to {}\n", corpus.root().display());

    if let Some(previous) = previous
        && previous != corpus.root()
    {
        let _ = writeln!(response, "(previously {})", previous.display());
    }

    response.push_str("\nCategories:\n");
    for (category, index) in corpus.categories() {
        let _ = writeln!(
            response,
            "• {} ({}): {} keys, {} destinations",
            category.label(),
            category,
            index.len(),
            index.variant_count()
        );
    }

    response
}

/// Expands tilde (`~`) in a path to the user's home directory.
///
/// - `~/foo` becomes `/home/user/foo`
/// - `~` becomes `/home/user`
/// - Other paths are returned unchanged
pub fn expand_tilde(path: &str) -> Cow<'_, str> {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped).display().to_string());
        }
    } else if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Cow::Owned(home.display().to_string());
    }
    Cow::Borrowed(path)
}
