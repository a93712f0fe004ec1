use super::value::AdsDataType;
use std::result::Result as StdResult;
use thiserror::Error as ThisError;

/// Unified ADS result type
pub type Result<T> = StdResult<T, Error>;

#[derive(Debug, ThisError, Clone, PartialEq, Eq)]
pub enum Error {
    /// Requested type has no decoding; there is no sensible partial result,
    /// so the whole decode call fails.
    #[error("unsupported data type: {0:?}")]
    UnsupportedType(AdsDataType),

    /// Fixed-width buffer whose length is not a whole number of elements
    #[error("buffer length {len} is not a multiple of element size {element}")]
    MisalignedBuffer { len: usize, element: usize },

    #[error("string value is missing its terminating zero byte")]
    UnterminatedString,

    #[error("timestamp tick count is out of the representable range")]
    TimestampOutOfRange,
}
