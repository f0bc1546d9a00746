//! Session-level event surface.
//!
//! A `CompositionController` reports everything a UI needs through a
//! `NotificationSink` injected at construction. Two sinks ship here:
//!
//! - `ImeContext`: accumulates the latest UI state (preedit, candidates,
//!   committed text) so the platform can read plain fields after each call.
//! - `Vec<ImeEvent>`: records every notification in order.

use crate::candidate::Candidate;
use crate::error::ImeError;

/// Receiver for composition notifications.
pub trait NotificationSink {
    /// The raw, unconfirmed composition text changed.
    fn on_composition_update(&mut self, text: &str);

    /// A query finished and produced a new candidate list.
    fn on_candidates_update(&mut self, candidates: &[Candidate]);

    /// Text was confirmed and leaves the composition.
    fn on_composition_end(&mut self, text: &str);

    /// A bulk dictionary load finished (successfully or not).
    fn on_load_end(&mut self) {}

    fn on_error(&mut self, error: &ImeError);
}

/// One recorded notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImeEvent {
    CompositionUpdate(String),
    CandidatesUpdate(Vec<Candidate>),
    CompositionEnd(String),
    LoadEnd,
    Error(ImeError),
}

impl NotificationSink for Vec<ImeEvent> {
    fn on_composition_update(&mut self, text: &str) {
        self.push(ImeEvent::CompositionUpdate(text.to_string()));
    }

    fn on_candidates_update(&mut self, candidates: &[Candidate]) {
        self.push(ImeEvent::CandidatesUpdate(candidates.to_vec()));
    }

    fn on_composition_end(&mut self, text: &str) {
        self.push(ImeEvent::CompositionEnd(text.to_string()));
    }

    fn on_load_end(&mut self) {
        self.push(ImeEvent::LoadEnd);
    }

    fn on_error(&mut self, error: &ImeError) {
        self.push(ImeEvent::Error(error.clone()));
    }
}

/// IME context for platform communication.
///
/// After driving the controller, the platform reads these fields to update
/// the preedit, the candidate window and the committed text.
#[derive(Debug, Clone, Default)]
pub struct ImeContext {
    /// Raw composition being typed (displayed with underline)
    pub preedit_text: String,

    /// Text to commit to the application; accumulates until taken
    pub commit_text: String,

    /// Current candidate list
    pub candidates: Vec<Candidate>,

    /// Most recent error, if any
    pub last_error: Option<ImeError>,

    /// Set once a dictionary load finished
    pub loaded: bool,
}

impl ImeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear preedit and candidates. Does NOT clear commit_text.
    pub fn clear(&mut self) {
        self.preedit_text.clear();
        self.candidates.clear();
        self.last_error = None;
    }

    /// Take the commit text, leaving it empty.
    pub fn take_commit(&mut self) -> String {
        std::mem::take(&mut self.commit_text)
    }

    pub fn has_visible_state(&self) -> bool {
        !self.preedit_text.is_empty() || !self.candidates.is_empty()
    }

    pub fn has_commit(&self) -> bool {
        !self.commit_text.is_empty()
    }
}

impl NotificationSink for ImeContext {
    fn on_composition_update(&mut self, text: &str) {
        self.preedit_text = text.to_string();
        if text.is_empty() {
            self.candidates.clear();
        }
    }

    fn on_candidates_update(&mut self, candidates: &[Candidate]) {
        self.candidates = candidates.to_vec();
    }

    fn on_composition_end(&mut self, text: &str) {
        self.commit_text.push_str(text);
    }

    fn on_load_end(&mut self) {
        self.loaded = true;
    }

    fn on_error(&mut self, error: &ImeError) {
        self.last_error = Some(error.clone());
    }
}
