use chrono::{DateTime, Utc};

/// Target type tag for the ADS value decoder.
///
/// The tag set covers the PLC-side scalar universe; the decoder itself
/// supports the subset listed in [`AdsDataType::element_len`] and rejects the
/// rest with an unsupported-type error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdsDataType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt32,
    Real32,
    Real64,
    /// Zero-terminated Latin-1 string
    String,
    /// 64-bit Windows file time
    Timestamp,
}

impl AdsDataType {
    /// Fixed element width in bytes for the types the decoder supports.
    /// `String` is variable-width, unsupported types answer `None` as well.
    pub fn element_len(self) -> Option<usize> {
        match self {
            AdsDataType::Bool | AdsDataType::Int8 => Some(1),
            AdsDataType::Int16 => Some(2),
            AdsDataType::Int32 | AdsDataType::Real32 => Some(4),
            AdsDataType::Timestamp => Some(8),
            AdsDataType::String
            | AdsDataType::Int64
            | AdsDataType::UInt32
            | AdsDataType::Real64 => None,
        }
    }
}

/// One decoded scalar/temporal value.
#[derive(Debug, Clone, PartialEq)]
pub enum AdsValue {
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Real32(f32),
    String(String),
    Timestamp(DateTime<Utc>),
}

impl AdsValue {
    /// Return the corresponding type tag for this value.
    #[inline]
    pub fn data_type(&self) -> AdsDataType {
        match self {
            AdsValue::Bool(_) => AdsDataType::Bool,
            AdsValue::Int8(_) => AdsDataType::Int8,
            AdsValue::Int16(_) => AdsDataType::Int16,
            AdsValue::Int32(_) => AdsDataType::Int32,
            AdsValue::Real32(_) => AdsDataType::Real32,
            AdsValue::String(_) => AdsDataType::String,
            AdsValue::Timestamp(_) => AdsDataType::Timestamp,
        }
    }
}
