//! Drug identity normalization and search term parsing.
//!
//! A name picked from the search step must resolve to the same drug even when the
//! caller changed its case or spacing, so every lookup goes through
//! [`normalize_name`] on both sides of the comparison.

use std::fmt;

use serde::Serialize;

use crate::error::QueryError;

/// Trim, collapse internal whitespace runs to one space, and case-fold.
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Normalized lookup key for a single drug.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DrugIdentity(String);

impl DrugIdentity {
    /// Normalize `raw`; an empty result is `MalformedInput` since aggregators need a name.
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let key = normalize_name(raw);
        if key.is_empty() {
            return Err(QueryError::MalformedInput(
                "drug identity must not be empty".to_string(),
            ));
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Does `name` (as stored) normalize to this identity?
    pub fn matches(&self, name: &str) -> bool {
        normalize_name(name) == self.0
    }
}

impl fmt::Display for DrugIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parsed search input.
///
/// Matching is plain case-insensitive substring containment. There is no typo
/// tolerance: "asprin" does not find "ASPIRIN".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTerm {
    /// Empty or whitespace-only input; resolves to the popular set.
    Popular,
    /// Trimmed, case-folded fragment.
    Fragment(String),
}

impl SearchTerm {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            SearchTerm::Popular
        } else {
            SearchTerm::Fragment(trimmed.to_lowercase())
        }
    }

    /// True when `name` satisfies this term. The popular term matches everything.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            SearchTerm::Popular => true,
            SearchTerm::Fragment(fragment) => name.to_lowercase().contains(fragment.as_str()),
        }
    }
}
