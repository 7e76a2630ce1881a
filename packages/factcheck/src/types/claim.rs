//! Claims extracted from source items.

use serde::{Deserialize, Serialize};

/// A single checkable claim, tied to the source item it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub text: String,
    pub source_item_index: usize,
}

impl Claim {
    pub fn new(text: impl Into<String>, source_item_index: usize) -> Self {
        Self {
            text: text.into(),
            source_item_index,
        }
    }
}

/// Stage 1 output: one claim list per source item plus the fan-out count
/// recorded when each list was parsed.
///
/// Items are appended in source order; the index of an item is the number
/// of items pushed before it. Counts are never recomputed from the lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedClaims {
    lists: Vec<Vec<Claim>>,
    fanout: Vec<usize>,
    unparsed: Vec<usize>,
}

impl ExtractedClaims {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from per-item claim texts in source order.
    pub fn from_texts(lists: impl IntoIterator<Item = Vec<String>>) -> Self {
        let mut extracted = Self::new();
        for texts in lists {
            extracted.push(texts);
        }
        extracted
    }

    /// Record the claims parsed for the next source item. Returns its fan-out.
    pub fn push(&mut self, texts: Vec<String>) -> usize {
        let index = self.lists.len();
        let claims: Vec<Claim> = texts
            .into_iter()
            .map(|text| Claim::new(text, index))
            .collect();
        let count = claims.len();
        self.lists.push(claims);
        self.fanout.push(count);
        count
    }

    /// Record an item whose output could not be parsed, as zero claims.
    pub fn push_unparsed(&mut self) {
        self.unparsed.push(self.lists.len());
        self.push(Vec::new());
    }

    /// Number of source items.
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Per-item fan-out counts, in source order.
    pub fn fanout_counts(&self) -> &[usize] {
        &self.fanout
    }

    /// Total number of claims across all items.
    pub fn total_claims(&self) -> usize {
        self.fanout.iter().sum()
    }

    /// Per-item claim lists, in source order.
    pub fn claim_lists(&self) -> &[Vec<Claim>] {
        &self.lists
    }

    /// Indices of items recorded via [`push_unparsed`](Self::push_unparsed).
    pub fn unparsed_items(&self) -> &[usize] {
        &self.unparsed
    }
}
