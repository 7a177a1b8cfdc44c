//! Error types for reading and writing rain predictor bin files.

use thiserror::Error;

/// Errors that can occur while encoding, decoding or configuring the codec.
///
/// Every variant is fatal for the operation that raised it; nothing in the
/// codec retries.
#[derive(Error, Debug)]
pub enum RpBinError {
    /// Header keyword mismatch, missing or non-integer field, or an
    /// unsupported container version.
    #[error("header format error: {0}")]
    HeaderFormat(String),

    /// The compressed body or a payload record is damaged or truncated.
    #[error("corrupt payload stream: {0}")]
    Corruption(String),

    /// A payload record starts with a magic number outside the catalog.
    #[error("unknown payload magic 0x{magic:04X} at offset {offset}")]
    UnknownPayload { magic: u16, offset: usize },

    /// A known payload kind carries a record version this codec cannot read.
    #[error("payload 0x{magic:04X} has unsupported version {version}")]
    UnsupportedPayloadVersion { magic: u16, version: u16 },

    /// A payload could not be constructed from the supplied buffers.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RpBinError {
    /// Create a HeaderFormat error.
    pub fn header_format(msg: impl Into<String>) -> Self {
        Self::HeaderFormat(msg.into())
    }

    /// Create a Corruption error.
    pub fn corruption(msg: impl Into<String>) -> Self {
        Self::Corruption(msg.into())
    }

    /// Create an InvalidPayload error.
    pub fn invalid_payload(msg: impl Into<String>) -> Self {
        Self::InvalidPayload(msg.into())
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<serde_json::Error> for RpBinError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, RpBinError>;
