use super::{
    error::{Error, Result},
    value::{AdsDataType, AdsValue},
};
use chrono::{DateTime, Utc};
use tracing::warn;

/// Milliseconds between the Windows file-time epoch (1601-01-01) and the Unix
/// epoch.
const FILETIME_UNIX_OFFSET_MS: i64 = 11_644_473_600_000;

/// File-time ticks are 100 ns, 10_000 per millisecond.
const FILETIME_TICKS_PER_MS: u64 = 10_000;

/// Decode a little-endian buffer into as many values of `data_type` as it
/// holds, consuming it to exhaustion.
///
/// Strings are zero-terminated Latin-1, the terminator excluded from the
/// decoded value. Fixed-width types require the buffer length to be an exact
/// multiple of the element width. Types without a decoding fail the whole
/// call; a partial result would be meaningless.
pub fn decode_values(data_type: AdsDataType, data: &[u8]) -> Result<Vec<AdsValue>> {
    match data_type {
        AdsDataType::String => decode_strings(data),
        AdsDataType::Bool => {
            decode_fixed(data_type, data, |chunk| {
                AdsValue::Bool((chunk[0] & 0x01) == 0x01)
            })
        }
        AdsDataType::Int8 => decode_fixed(data_type, data, |chunk| AdsValue::Int8(chunk[0] as i8)),
        AdsDataType::Int16 => decode_fixed(data_type, data, |chunk| {
            AdsValue::Int16(i16::from_le_bytes([chunk[0], chunk[1]]))
        }),
        AdsDataType::Int32 => decode_fixed(data_type, data, |chunk| {
            AdsValue::Int32(i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        }),
        AdsDataType::Real32 => decode_fixed(data_type, data, |chunk| {
            AdsValue::Real32(f32::from_bits(u32::from_le_bytes([
                chunk[0], chunk[1], chunk[2], chunk[3],
            ])))
        }),
        AdsDataType::Timestamp => decode_timestamps(data),
        other => {
            warn!(?other, "unsupported data type requested");
            Err(Error::UnsupportedType(other))
        }
    }
}

fn decode_fixed(
    data_type: AdsDataType,
    data: &[u8],
    decode_one: impl Fn(&[u8]) -> AdsValue,
) -> Result<Vec<AdsValue>> {
    let element = data_type.element_len().ok_or(Error::UnsupportedType(data_type))?;
    if data.len() % element != 0 {
        return Err(Error::MisalignedBuffer {
            len: data.len(),
            element,
        });
    }
    Ok(data.chunks_exact(element).map(decode_one).collect())
}

fn decode_strings(data: &[u8]) -> Result<Vec<AdsValue>> {
    let mut values = Vec::new();
    let mut rest = data;
    while !rest.is_empty() {
        let end = rest
            .iter()
            .position(|&b| b == 0x00)
            .ok_or(Error::UnterminatedString)?;
        values.push(AdsValue::String(latin1_to_string(&rest[..end])));
        rest = &rest[end + 1..];
    }
    Ok(values)
}

fn decode_timestamps(data: &[u8]) -> Result<Vec<AdsValue>> {
    let element = 8;
    if data.len() % element != 0 {
        return Err(Error::MisalignedBuffer {
            len: data.len(),
            element,
        });
    }
    data.chunks_exact(element)
        .map(|chunk| {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(chunk);
            let ticks = u64::from_le_bytes(raw);
            filetime_to_utc(ticks).map(AdsValue::Timestamp)
        })
        .collect()
}

/// Convert a Windows file time (100 ns ticks since 1601-01-01 UTC) to UTC.
fn filetime_to_utc(ticks: u64) -> Result<DateTime<Utc>> {
    let unix_ms = (ticks / FILETIME_TICKS_PER_MS) as i64 - FILETIME_UNIX_OFFSET_MS;
    DateTime::from_timestamp_millis(unix_ms).ok_or(Error::TimestampOutOfRange)
}

/// Widen Latin-1 bytes into a `String`, one Unicode scalar per byte.
fn latin1_to_string(input: &[u8]) -> String {
    input.iter().map(|&b| b as char).collect()
}
