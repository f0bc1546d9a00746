//! Error types for zhuyin-core.
//!
//! Every failure is scoped to one composition or one query; none of these
//! errors is fatal to the process. `ImeError` is what travels through the
//! notification surface, so it is `Clone` and comparable.

/// Failure to turn raw phonetic input into an `EncodedKey`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// `index` counts characters (not bytes) from the start of the input.
    #[error("unknown symbol at position {index}: {symbol:?}")]
    InvalidSymbol { index: usize, symbol: char },
}

/// Failure reported by a storage collaborator or a dictionary source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt record for key {key}: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("dictionary source failed: {0}")]
    Source(String),
}

impl StorageError {
    /// Wrap any backend error as `Unavailable`.
    pub fn unavailable<E: std::fmt::Display>(err: E) -> Self {
        StorageError::Unavailable(err.to_string())
    }

    /// Wrap any reader/parser error as `Source`.
    pub fn from_source<E: std::fmt::Display>(err: E) -> Self {
        StorageError::Source(err.to_string())
    }
}

/// Error delivered to `NotificationSink::on_error`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImeError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
