//! Index entries and their documented variants.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::LazyLock;

/// Matches the HTML entities the generator emits in labels and scopes.
static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#([0-9]{1,7})|#[xX]([0-9a-fA-F]{1,6})|(amp|lt|gt|quot|apos|nbsp));")
        .expect("entity pattern is valid")
});

/// One documented occurrence of a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Display name as persisted (HTML-escaped)
    pub label: String,
    /// Containing namespace, class, file, or qualified signature
    pub scope: Option<String>,
    /// Link destination relative to the search directory
    pub target: String,
    /// `true` for pages in this documentation set, `false` for external references
    pub local: bool,
}

impl Variant {
    pub fn new(label: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            scope: None,
            target: target.into(),
            local: true,
        }
    }

    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        let scope = scope.into();
        self.scope = (!scope.is_empty()).then_some(scope);
        self
    }

    #[must_use]
    pub const fn external(mut self) -> Self {
        self.local = false;
        self
    }

    /// Label with HTML entities decoded.
    pub fn display_label(&self) -> Cow<'_, str> {
        unescape_html(&self.label)
    }

    /// Scope with HTML entities decoded.
    pub fn display_scope(&self) -> Option<Cow<'_, str>> {
        self.scope.as_deref().map(unescape_html)
    }
}

/// A search key and every variant documented under it, in generation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub key: String,
    pub variants: Vec<Variant>,
}

impl IndexEntry {
    pub fn new(key: impl Into<String>, variants: Vec<Variant>) -> Self {
        Self {
            key: key.into(),
            variants,
        }
    }

    /// Label shown for the entry as a whole (the first variant's label).
    pub fn label(&self) -> &str {
        self.variants.first().map_or(&self.key, |v| &v.label)
    }
}

/// Decodes the named and numeric HTML entities the generator uses.
///
/// Returns the input unchanged (borrowed) when it contains no entities.
pub fn unescape_html(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    ENTITY.replace_all(text, |caps: &Captures<'_>| {
        let decoded = if let Some(dec) = caps.get(1) {
            dec.as_str().parse::<u32>().ok().and_then(char::from_u32)
        } else if let Some(hex) = caps.get(2) {
            u32::from_str_radix(hex.as_str(), 16)
                .ok()
                .and_then(char::from_u32)
        } else {
            caps.get(3).map(|name| match name.as_str() {
                "amp" => '&',
                "lt" => '<',
                "gt" => '>',
                "quot" => '"',
                "apos" => '\'',
                _ => '\u{a0}',
            })
        };

        decoded.map_or_else(|| caps[0].to_string(), String::from)
    })
}
