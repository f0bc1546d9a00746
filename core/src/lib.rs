//! zhuyin-core
//!
//! Language-agnostic machinery of a phonetic input method engine, shared by
//! codec crates such as libzhuyin.
//!
//! Public API:
//! - `EncodedKey` / `SyllableCodec` - dictionary keys and the codec seam
//! - `CandidateCache` - per-session cache pruned against the composition key
//! - `ActionSerializer` - single-flight queue protecting composition state
//! - `StorageBackend` - async dictionary contract (`MemoryStore`, `RedbStore`)
//! - `SegmentationEngine` - syllable buffer -> ranked candidate list
//! - `CompositionController` - session state and session-level operations
//! - `Config` - engine options
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{CodecError, ImeError, StorageError};

pub mod candidate;
pub use candidate::{Candidate, CandidateList};

pub mod codec;
pub use codec::{EncodedKey, EncodedUnit, Syllable, SyllableCodec};

pub mod cache;
pub use cache::CandidateCache;

pub mod action_queue;
pub use action_queue::{ActionSerializer, Dispatch, SerializerState};

pub mod storage;
pub use storage::{DictionaryRecord, DictionarySource, MemoryStore, RedbStore, StorageBackend};

pub mod segmentation;
pub use segmentation::{QueryOutcome, SegmentationEngine};

pub mod context;
pub use context::{ImeContext, ImeEvent, NotificationSink};

pub mod composition;
pub use composition::{Action, CompositionController, CompositionState};

/// Generic engine configuration.
///
/// Language-specific options (dictionary locations, keyboard details) belong
/// in the language crate's config, which flattens this one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Resolve every prefix length of one query with a concurrent fan-out
    /// instead of one lookup after another. The merge order is unchanged.
    pub parallel_lookup: bool,

    /// Fill the tail of the synthesized fallback entry with the longest
    /// dictionary matches found inside it, instead of the raw symbols.
    pub resolve_unmatched_tail: bool,
}

impl Config {
    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_are_sequential_and_raw() {
        let cfg = Config::default();
        assert!(!cfg.parallel_lookup);
        assert!(!cfg.resolve_unmatched_tail);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = Config::from_toml_str("parallel_lookup = true").unwrap();
        assert!(cfg.parallel_lookup);
        assert!(!cfg.resolve_unmatched_tail);
        let text = cfg.to_toml_string().unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), cfg);
    }
}
