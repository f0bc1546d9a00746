//! # libzhuyin
//!
//! Zhuyin/Bopomofo input method engine built on zhuyin-core.

pub mod codec;
pub mod config;
pub mod dictionary;
pub mod engine;

// Re-export session components from core
pub use zhuyin_core::{
    Candidate, CompositionState, ImeContext, ImeError, ImeEvent, NotificationSink, StorageError,
    SyllableCodec,
};

pub use codec::{classify, BopomofoCodec, SymbolRole};
pub use config::ZhuyinConfig;
pub use dictionary::{parse_json_dictionary, JsonDictionary};
pub use engine::{create_engine, create_session, open_session, open_store, Engine, ZhuyinSession};
