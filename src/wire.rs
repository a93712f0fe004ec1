use bytes::BufMut;

/// Unified wire encoding trait across frame layers.
///
/// Header length fields are always derived from `encoded_len`, never from
/// counting emitted bytes, so every implementation must keep the two methods
/// in exact agreement.
pub trait WireEncode {
    type Error: std::fmt::Debug + Send + Sync + 'static;

    /// Number of bytes `encode_to` will emit for this value.
    fn encoded_len(&self) -> usize;

    fn encode_to<B: BufMut>(&self, dst: &mut B) -> Result<(), Self::Error>;
}
