use crate::types::SelectedArtifact;
use dashmap::DashMap;
use std::sync::Arc;

/// Memoized fixup-pipeline output, keyed by the full selection value.
///
/// Entries are never evicted. Concurrent callers may compute the same key
/// at the same time; the first insert wins and every caller gets that text.
#[derive(Debug, Default)]
pub struct MaterializationCache {
    entries: DashMap<SelectedArtifact, Arc<str>>,
}

impl MaterializationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached text for `key`, computing it with `compute` on a miss.
    ///
    /// `compute` runs without holding any shard lock.
    pub fn get_or_compute<F>(&self, key: &SelectedArtifact, compute: F) -> Arc<str>
    where
        F: FnOnce() -> String,
    {
        if let Some(text) = self.get(key) {
            return text;
        }

        let text: Arc<str> = Arc::from(compute());
        self.entries
            .entry(key.clone())
            .or_insert(text)
            .value()
            .clone()
    }

    #[must_use]
    pub fn get(&self, key: &SelectedArtifact) -> Option<Arc<str>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
