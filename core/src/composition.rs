//! Composition controller: per-session state and session-level operations.
//!
//! The controller owns the raw syllable buffer, the candidate cache and the
//! current candidate list. Queries and confirmations run as actions through
//! an `ActionSerializer`, so at most one of them touches the session at a
//! time; a confirmation that leaves syllables behind queues a follow-up
//! query on the same serializer.

use crate::action_queue::{ActionSerializer, Dispatch};
use crate::cache::CandidateCache;
use crate::candidate::Candidate;
use crate::codec::{raw_text, SyllableCodec};
use crate::context::NotificationSink;
use crate::error::{CodecError, ImeError, StorageError};
use crate::segmentation::SegmentationEngine;
use crate::storage::DictionarySource;
use tracing::{debug, info, warn};

/// Whether anything is buffered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionState {
    Empty,
    Composing,
}

/// Work that runs through the session's serializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Query,
    Confirm(Candidate),
}

/// State touched only by the single in-flight action.
struct Session<C, N> {
    engine: SegmentationEngine<C>,
    cache: CandidateCache,
    sink: N,
    syllables: String,
    candidates: Vec<Candidate>,
    default_candidate: Option<Candidate>,
}

impl<C: SyllableCodec, N: NotificationSink> Session<C, N> {
    /// Replace the buffer and prune the cache against its key. Candidates
    /// for the old buffer are dropped without a notification.
    fn replace_buffer(&mut self, text: String) -> Result<(), CodecError> {
        let key = self.engine.codec().encode(&text)?;
        if text != self.syllables {
            self.clear_candidates();
        }
        self.syllables = text;
        self.cache.invalidate(&key);
        Ok(())
    }

    fn clear_candidates(&mut self) {
        self.candidates.clear();
        self.default_candidate = None;
    }

    fn update_selections(&mut self, candidates: Vec<Candidate>) {
        self.default_candidate = candidates.first().cloned();
        self.candidates = candidates;
        self.sink.on_candidates_update(&self.candidates);
    }

    fn update_composition(&mut self) {
        self.sink.on_composition_update(&self.syllables);
    }

    async fn run_query(&mut self) {
        if self.syllables.is_empty() {
            self.update_selections(Vec::new());
            return;
        }
        match self.engine.query(&self.syllables, &mut self.cache).await {
            Ok(outcome) => {
                if let Some(err) = outcome.lookup_error {
                    self.sink.on_error(&err.into());
                }
                self.update_selections(outcome.candidates);
            }
            Err(err) => {
                warn!(%err, "query rejected");
                self.sink.on_error(&err.into());
            }
        }
    }

    fn confirm(&mut self, entry: Candidate, queue: &mut ActionSerializer<Action>) {
        let syllables = match self.engine.codec().split(&self.syllables) {
            Ok(s) => s,
            Err(err) => {
                self.sink.on_error(&err.into());
                return;
            }
        };
        let consumed = entry.syllable_count().min(syllables.len());
        let remaining = raw_text(&syllables[consumed..]);
        debug!(text = %entry.text, consumed, "confirming selection");

        self.sink.on_composition_end(&entry.text);
        if let Err(err) = self.replace_buffer(remaining) {
            self.sink.on_error(&err.into());
            return;
        }
        self.update_composition();

        if !self.syllables.is_empty() {
            let immediate = queue.submit(Action::Query);
            debug_assert!(immediate.is_none(), "confirm runs inside an in-flight action");
        }
    }
}

impl<C: SyllableCodec, N: NotificationSink> Dispatch<Action> for Session<C, N> {
    async fn dispatch(&mut self, action: Action, queue: &mut ActionSerializer<Action>) {
        match action {
            Action::Query => self.run_query().await,
            Action::Confirm(entry) => self.confirm(entry, queue),
        }
    }
}

/// Per-session composition controller.
pub struct CompositionController<C, N> {
    queue: ActionSerializer<Action>,
    session: Session<C, N>,
}

impl<C: SyllableCodec, N: NotificationSink> CompositionController<C, N> {
    /// Create a session. The cache is owned by the session and dies with it.
    pub fn new(engine: SegmentationEngine<C>, sink: N) -> Self {
        Self {
            queue: ActionSerializer::new(),
            session: Session {
                engine,
                cache: CandidateCache::new(),
                sink,
                syllables: String::new(),
                candidates: Vec::new(),
                default_candidate: None,
            },
        }
    }

    pub fn state(&self) -> CompositionState {
        if self.session.syllables.is_empty() {
            CompositionState::Empty
        } else {
            CompositionState::Composing
        }
    }

    /// The raw, un-encoded symbols typed so far.
    pub fn syllables(&self) -> &str {
        &self.session.syllables
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.session.candidates
    }

    pub fn default_candidate(&self) -> Option<&Candidate> {
        self.session.default_candidate.as_ref()
    }

    pub fn cache(&self) -> &CandidateCache {
        &self.session.cache
    }

    pub fn engine(&self) -> &SegmentationEngine<C> {
        &self.session.engine
    }

    pub fn sink(&self) -> &N {
        &self.session.sink
    }

    pub fn sink_mut(&mut self) -> &mut N {
        &mut self.session.sink
    }

    /// Append one symbol. Does not query.
    ///
    /// An unrecognized symbol is rejected with its position in the buffer and
    /// the buffer is left untouched.
    pub fn append_symbol(&mut self, symbol: char) -> Result<(), CodecError> {
        let mut next = self.session.syllables.clone();
        next.push(symbol);
        self.session.replace_buffer(next)
    }

    /// Append several symbols; all or nothing.
    pub fn append_symbols(&mut self, symbols: &str) -> Result<(), CodecError> {
        let mut next = self.session.syllables.clone();
        next.push_str(symbols);
        self.session.replace_buffer(next)
    }

    /// Replace the whole buffer.
    pub fn set_syllables(&mut self, text: &str) -> Result<(), CodecError> {
        self.session.replace_buffer(text.to_string())
    }

    /// Remove the last raw symbol (backspace).
    pub fn pop_symbol(&mut self) -> Option<char> {
        let mut next = self.session.syllables.clone();
        let removed = next.pop()?;
        match self.session.replace_buffer(next) {
            Ok(()) => Some(removed),
            Err(err) => {
                self.session.sink.on_error(&err.into());
                None
            }
        }
    }

    /// Query candidates for the current buffer and publish them.
    pub async fn query(&mut self) {
        self.submit(Action::Query).await;
    }

    /// Confirm `entry`: drop as many leading syllables as it covers, report
    /// the text, and re-query whatever is left.
    pub async fn confirm_selection(&mut self, entry: Candidate) {
        self.submit(Action::Confirm(entry)).await;
    }

    /// Report the raw buffer for display. No I/O.
    pub fn update_composition(&mut self) {
        self.session.update_composition();
    }

    /// Install `candidates` as the current list and publish it.
    pub fn update_selections(&mut self, candidates: Vec<Candidate>) {
        self.session.update_selections(candidates);
    }

    /// Bulk-load a dictionary into storage. Failures are reported through
    /// `on_error`; `on_load_end` fires either way.
    pub async fn load<S: DictionarySource>(&mut self, source: S) -> Result<usize, StorageError> {
        let result = match source.records() {
            Ok(records) => self.session.engine.storage().bulk_load(records).await,
            Err(err) => Err(err),
        };
        match &result {
            Ok(count) => info!(count, "dictionary loaded"),
            Err(err) => {
                warn!(%err, "dictionary load failed");
                self.session.sink.on_error(&ImeError::from(err.clone()));
            }
        }
        self.session.sink.on_load_end();
        result
    }

    /// Tear the session down: empty buffer, candidates and cache.
    pub fn reset(&mut self) {
        self.session.syllables.clear();
        self.session.clear_candidates();
        self.session.cache.clear();
    }

    async fn submit(&mut self, action: Action) {
        let first = match self.queue.submit(action) {
            Some(first) => first,
            None => {
                // Busy with nobody driving it: an earlier query or confirm
                // future was dropped mid-flight. Pick up where it stopped.
                warn!(pending = self.queue.pending_len(), "resuming abandoned actions");
                match self.queue.complete() {
                    Some(next) => next,
                    None => return,
                }
            }
        };
        self.queue.drive(first, &mut self.session).await;
    }
}
