//! Recently submitted search terms.

use platform_host::{read_json_with, write_json_with, KeyValueStore, StorageError};

/// Storage key holding the recent-search array.
pub const RECENT_SEARCHES_KEY: &str = "recent_searches";

/// Maximum number of remembered searches.
pub const MAX_RECENT_SEARCHES: usize = 10;

/// Most-recent-first list of distinct, trimmed search terms.
#[derive(Debug, Clone)]
pub struct RecentSearches<S> {
    store: S,
}

impl<S: KeyValueStore> RecentSearches<S> {
    /// Recent searches kept in `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Stored terms, newest first. Unreadable data reads as empty.
    ///
    /// Stored terms are trimmed, blanks and repeats dropped, and the list capped at
    /// [`MAX_RECENT_SEARCHES`], whoever wrote them.
    pub fn list(&self) -> Vec<String> {
        let stored = read_json_with::<_, Vec<String>>(&self.store, RECENT_SEARCHES_KEY)
            .ok()
            .flatten()
            .unwrap_or_default();
        let mut terms: Vec<String> = Vec::with_capacity(MAX_RECENT_SEARCHES);
        for term in stored {
            let term = term.trim();
            if !term.is_empty() && !terms.iter().any(|kept| kept == term) {
                terms.push(term.to_string());
            }
            if terms.len() == MAX_RECENT_SEARCHES {
                break;
            }
        }
        terms
    }

    /// Moves `text` to the front (adding it if new) and returns the updated list.
    ///
    /// Blank text is ignored.
    pub fn record(&self, text: &str) -> Result<Vec<String>, StorageError> {
        let text = text.trim();
        let mut terms = self.list();
        if text.is_empty() {
            return Ok(terms);
        }
        terms.retain(|term| term != text);
        terms.insert(0, text.to_string());
        terms.truncate(MAX_RECENT_SEARCHES);
        write_json_with(&self.store, RECENT_SEARCHES_KEY, &terms)?;
        Ok(terms)
    }

    /// Forgets one term and returns the updated list.
    pub fn remove(&self, text: &str) -> Result<Vec<String>, StorageError> {
        let mut terms = self.list();
        let before = terms.len();
        terms.retain(|term| term != text.trim());
        if terms.len() != before {
            write_json_with(&self.store, RECENT_SEARCHES_KEY, &terms)?;
        }
        Ok(terms)
    }

    /// Forgets every term.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(RECENT_SEARCHES_KEY)
    }
}
