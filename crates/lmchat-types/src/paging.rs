use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a freshly fetched page goes relative to already loaded messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// Older history, placed before existing messages
    Prepend,
    /// New arrivals, placed after existing messages
    Append,
}

/// Anything with a stable identifier and a creation timestamp
pub trait Identified {
    fn id(&self) -> &str;
    fn timestamp(&self) -> DateTime<Utc>;
}

/// One slice of a thread's messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePage<T> {
    pub items: Vec<T>,
    pub has_more: bool,
}

impl<T> MessagePage<T> {
    pub fn new(items: Vec<T>, has_more: bool) -> Self {
        Self { items, has_more }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), false)
    }

    /// Build a page from rows fetched with `limit + 1`.
    ///
    /// The extra row only proves that older messages exist; it is dropped.
    pub fn from_probe(mut rows: Vec<T>, limit: usize) -> Self {
        let has_more = rows.len() > limit;
        rows.truncate(limit);
        Self::new(rows, has_more)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> MessagePage<U> {
        MessagePage {
            items: self.items.into_iter().map(f).collect(),
            has_more: self.has_more,
        }
    }
}

/// Legacy "more history" signal: a full page suggests more rows exist.
///
/// Reports a false positive when exactly `requested` rows remain; prefer
/// [`MessagePage::from_probe`] whenever the store can over-fetch by one.
pub fn heuristic_has_more(page_len: usize, requested: usize) -> bool {
    requested > 0 && page_len == requested
}

/// Merge a fetched page into already loaded messages without duplicates.
///
/// Incoming messages whose id is already present (or repeated within the
/// page) are dropped; the rest keep their order and are placed according to
/// `placement`.
pub fn merge_page<T: Identified>(existing: Vec<T>, incoming: Vec<T>, placement: Placement) -> Vec<T> {
    let mut seen: HashSet<String> = existing.iter().map(|m| m.id().to_string()).collect();
    let deduped: Vec<T> = incoming
        .into_iter()
        .filter(|m| seen.insert(m.id().to_string()))
        .collect();

    match placement {
        Placement::Prepend => {
            let mut merged = deduped;
            merged.extend(existing);
            merged
        }
        Placement::Append => {
            let mut merged = existing;
            merged.extend(deduped);
            merged
        }
    }
}

/// Oldest timestamp among `messages`, used as the next exclusive `before` bound
pub fn compute_oldest<T: Identified>(messages: &[T]) -> Option<DateTime<Utc>> {
    messages.iter().map(Identified::timestamp).min()
}
