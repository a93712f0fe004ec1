use std::result::Result as StdResult;
use thiserror::Error as ThisError;

/// Unified S7 result type
pub type Result<T> = StdResult<T, Error>;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// First byte of the buffer is not the S7 protocol identifier.
    #[error("invalid protocol id: 0x{found:02x}")]
    InvalidMagic { found: u8 },

    /// Input does not have enough bytes to complete the operation
    #[error("insufficient data: needed {needed} bytes, available {available} bytes")]
    InsufficientData { needed: usize, available: usize },

    /// Decode error for wire-format parsing failures that are not protocol violations but malformed/invalid bytes
    #[error("decode error: {context}")]
    Decode { context: &'static str },

    /// Encode error for wire-format serialization failures
    #[error("encode error: {context}")]
    Encode { context: &'static str },

    /// Addressing mode other than S7ANY inside a variable specification
    #[error("unsupported addressing mode: 0x{mode:02x}")]
    UnsupportedAddressingMode { mode: u8 },

    /// The wire item count is a single byte; larger batches cannot be framed.
    #[error("too many items for one request: {count}")]
    TooManyItems { count: usize },
}
