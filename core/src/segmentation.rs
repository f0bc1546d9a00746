// core/src/segmentation.rs
//
// Turns a syllable buffer into one ranked candidate list. Every prefix of the
// buffer, longest first, is resolved through the session cache and then
// storage; the hits are merged with a synthesized full-coverage entry in
// front whenever the whole buffer has no dictionary phrase.

use crate::cache::CandidateCache;
use crate::candidate::Candidate;
use crate::codec::{key_of, raw_text, EncodedKey, Syllable, SyllableCodec};
use crate::error::{CodecError, StorageError};
use crate::storage::StorageBackend;
use crate::Config;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of one query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOutcome {
    pub candidates: Vec<Candidate>,
    /// First storage failure met while resolving. The failed keys were
    /// treated as "no hit", so `candidates` is the degraded list.
    pub lookup_error: Option<StorageError>,
}

/// Generic segmentation engine over any syllable codec.
///
/// The engine itself is stateless between queries; the cache it reads and
/// fills belongs to the calling session.
pub struct SegmentationEngine<C> {
    codec: C,
    storage: Arc<dyn StorageBackend>,
    config: Config,
}

impl<C: SyllableCodec> SegmentationEngine<C> {
    pub fn new(codec: C, storage: Arc<dyn StorageBackend>, config: Config) -> Self {
        Self {
            codec,
            storage,
            config,
        }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn storage(&self) -> &Arc<dyn StorageBackend> {
        &self.storage
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Produce the ranked candidate list for `input`.
    ///
    /// With N syllables and `Lmax` the longest prefix that has dictionary
    /// hits:
    /// - `Lmax == N`: hits for N, N-1, ..., 1 concatenated.
    /// - `0 < Lmax < N`: a synthesized entry (best text for `Lmax` followed by
    ///   the remaining raw symbols, weight N), then hits for `Lmax` down to 1.
    /// - `Lmax == 0`: one synthesized entry holding the raw input, weight N.
    ///
    /// The cache is pruned against the full key first. Storage failures count
    /// as "no hit" and are not cached, so a later query retries them; the
    /// first one is reported in `QueryOutcome::lookup_error`.
    pub async fn query(
        &self,
        input: &str,
        cache: &mut CandidateCache,
    ) -> Result<QueryOutcome, CodecError> {
        let syllables = self.codec.split(input)?;
        if syllables.is_empty() {
            return Ok(QueryOutcome::default());
        }
        let full = key_of(&syllables);
        cache.invalidate(&full);

        let mut failure = None;
        let hits = if self.config.parallel_lookup {
            self.resolve_prefixes_parallel(&full, cache, &mut failure).await
        } else {
            self.resolve_prefixes(&full, cache, &mut failure).await
        };
        let candidates = self.merge(&syllables, &full, hits, cache, &mut failure).await;

        Ok(QueryOutcome {
            candidates,
            lookup_error: failure,
        })
    }

    /// hits[L - 1] holds the list for the prefix of length L.
    async fn resolve_prefixes(
        &self,
        full: &EncodedKey,
        cache: &mut CandidateCache,
        failure: &mut Option<StorageError>,
    ) -> Vec<Vec<Candidate>> {
        let n = full.len();
        let mut hits = vec![Vec::new(); n];
        for len in (1..=n).rev() {
            hits[len - 1] = self.resolve(full.prefix(len), cache, failure).await;
        }
        hits
    }

    async fn resolve_prefixes_parallel(
        &self,
        full: &EncodedKey,
        cache: &mut CandidateCache,
        failure: &mut Option<StorageError>,
    ) -> Vec<Vec<Candidate>> {
        let n = full.len();
        let mut hits = vec![Vec::new(); n];
        let mut missing = Vec::new();
        for len in (1..=n).rev() {
            let key = full.prefix(len);
            match cache.get(&key) {
                Some(list) => hits[len - 1] = list.to_vec(),
                None => missing.push((len, key)),
            }
        }

        let results = join_all(missing.iter().map(|(_, key)| self.storage.lookup(key))).await;
        for ((len, key), result) in missing.into_iter().zip(results) {
            match result {
                Ok(list) => {
                    cache.put(key, list.clone());
                    hits[len - 1] = list;
                }
                Err(err) => self.note_failure(&key, err, failure),
            }
        }
        hits
    }

    /// Resolve one key: cache first, storage on miss.
    async fn resolve(
        &self,
        key: EncodedKey,
        cache: &mut CandidateCache,
        failure: &mut Option<StorageError>,
    ) -> Vec<Candidate> {
        if let Some(list) = cache.get(&key) {
            debug!(%key, hits = list.len(), "cache hit");
            return list.to_vec();
        }
        match self.storage.lookup(&key).await {
            Ok(list) => {
                debug!(%key, hits = list.len(), "storage lookup");
                cache.put(key, list.clone());
                list
            }
            Err(err) => {
                self.note_failure(&key, err, failure);
                Vec::new()
            }
        }
    }

    fn note_failure(
        &self,
        key: &EncodedKey,
        err: StorageError,
        failure: &mut Option<StorageError>,
    ) {
        warn!(%err, %key, backend = self.storage.name(), "lookup failed; treating as no hit");
        failure.get_or_insert(err);
    }

    async fn merge(
        &self,
        syllables: &[Syllable],
        full: &EncodedKey,
        hits: Vec<Vec<Candidate>>,
        cache: &mut CandidateCache,
        failure: &mut Option<StorageError>,
    ) -> Vec<Candidate> {
        let n = syllables.len();
        let weight = n as u32;
        let lmax = (1..=n).rev().find(|&len| !hits[len - 1].is_empty()).unwrap_or(0);

        if lmax == 0 {
            return vec![Candidate::new(raw_text(syllables), weight)];
        }

        let mut out = Vec::with_capacity(hits.iter().map(Vec::len).sum::<usize>() + 1);
        if lmax < n {
            let tail = if self.config.resolve_unmatched_tail {
                self.resolve_tail(syllables, full, lmax, cache, failure).await
            } else {
                raw_text(&syllables[lmax..])
            };
            let head = &hits[lmax - 1][0].text;
            out.push(Candidate::new(format!("{}{}", head, tail), weight));
        }
        for list in hits.into_iter().take(lmax).rev() {
            out.extend(list);
        }
        out
    }

    /// Greedy longest-match text for syllables `[start, N)`; syllables with
    /// no match at any length stay raw.
    async fn resolve_tail(
        &self,
        syllables: &[Syllable],
        full: &EncodedKey,
        start: usize,
        cache: &mut CandidateCache,
        failure: &mut Option<StorageError>,
    ) -> String {
        let n = syllables.len();
        let mut text = String::new();
        let mut pos = start;
        'outer: while pos < n {
            for len in (1..=n - pos).rev() {
                let list = self.resolve(full.slice(pos..pos + len), cache, failure).await;
                if let Some(best) = list.first() {
                    text.push_str(&best.text);
                    pos += len;
                    continue 'outer;
                }
            }
            text.push_str(&syllables[pos].raw);
            pos += 1;
        }
        text
    }
}
