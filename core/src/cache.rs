// core/src/cache.rs
//
// Session-owned cache from encoded key to the candidate list storage returned
// for it. Pruned wholesale against the current composition key; no size bound.

use crate::candidate::Candidate;
use crate::codec::EncodedKey;
use ahash::AHashMap;
use std::cell::Cell;
use tracing::debug;

#[derive(Debug, Default)]
pub struct CandidateCache {
    entries: AHashMap<EncodedKey, Vec<Candidate>>,
    hits: Cell<usize>,
    misses: Cell<usize>,
}

impl CandidateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the list resolved for `key`, replacing any previous list.
    pub fn put(&mut self, key: EncodedKey, candidates: Vec<Candidate>) {
        self.entries.insert(key, candidates);
    }

    /// Look up a cached list. An empty list is a valid cached answer.
    pub fn get(&self, key: &EncodedKey) -> Option<&[Candidate]> {
        match self.entries.get(key) {
            Some(list) => {
                self.hits.set(self.hits.get() + 1);
                Some(list.as_slice())
            }
            None => {
                self.misses.set(self.misses.get() + 1);
                None
            }
        }
    }

    pub fn contains_key(&self, key: &EncodedKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Drop every entry whose key is not a contiguous substring of
    /// `reference`. Entries for parts of the current composition survive.
    pub fn invalidate(&mut self, reference: &EncodedKey) {
        let before = self.entries.len();
        self.entries.retain(|key, _| reference.contains(key));
        let dropped = before - self.entries.len();
        if dropped > 0 {
            debug!(dropped, kept = self.entries.len(), "pruned candidate cache");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clear entries and statistics.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits.set(0);
        self.misses.set(0);
    }

    /// Returns (hits, misses).
    pub fn stats(&self) -> (usize, usize) {
        (self.hits.get(), self.misses.get())
    }

    /// Hit rate as a percentage (0.0 to 100.0), `None` before any lookup.
    pub fn hit_rate(&self) -> Option<f32> {
        let (hits, misses) = self.stats();
        let total = hits + misses;
        if total == 0 {
            None
        } else {
            Some((hits as f32 / total as f32) * 100.0)
        }
    }
}
