use super::{
    super::error::{Error, Result},
    types::{AddressingMode, MemoryArea, SpecificationType, TransportSize},
};
use crate::wire::WireEncode;
use bytes::BufMut;
use nom::number::complete::{be_u16, u8 as nom_u8};
use serde::{Deserialize, Serialize};

/// Encoded size of one S7ANY variable specification.
pub const VAR_ITEM_LEN: usize = 12;

/// Length byte inside a variable specification, covering the fields that
/// follow it.
const ITEM_TAIL_LEN: u8 = 0x0A;

/// One addressed variable in S7ANY form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarItem {
    pub area: MemoryArea,
    /// Data block number when `area` is a data block, else 0
    pub db_number: u16,
    pub transport_size: TransportSize,
    /// Number of consecutive elements
    pub num_elements: u16,
    /// Byte offset within the area
    pub byte_offset: u16,
    /// Bit index 0..=7 for bit-level access, else 0
    pub bit_offset: u8,
}

impl VarItem {
    /// Single-element item at a byte boundary.
    pub fn new(
        area: MemoryArea,
        db_number: u16,
        transport_size: TransportSize,
        byte_offset: u16,
    ) -> Self {
        Self {
            area,
            db_number,
            transport_size,
            num_elements: 1,
            byte_offset,
            bit_offset: 0,
        }
    }

    pub(crate) fn parse(input: &[u8]) -> Result<(&[u8], VarItem)> {
        if input.len() < VAR_ITEM_LEN {
            return Err(Error::InsufficientData {
                needed: VAR_ITEM_LEN,
                available: input.len(),
            });
        }
        let (i, spec_type) = nom_u8::<_, nom::error::Error<&[u8]>>(input)
            .map_err(|_| Error::Decode { context: "var item" })?;
        let _ = SpecificationType::try_from(spec_type).map_err(|_| Error::Decode {
            context: "specification type",
        })?;
        let (i, tail_len) = nom_u8::<_, nom::error::Error<&[u8]>>(i)
            .map_err(|_| Error::Decode { context: "var item" })?;
        if tail_len != ITEM_TAIL_LEN {
            return Err(Error::Decode {
                context: "var item length",
            });
        }
        let (i, mode) = nom_u8::<_, nom::error::Error<&[u8]>>(i)
            .map_err(|_| Error::Decode { context: "var item" })?;
        if !matches!(AddressingMode::try_from(mode), Ok(AddressingMode::S7Any)) {
            return Err(Error::UnsupportedAddressingMode { mode });
        }
        let (i, transport_size) = nom_u8::<_, nom::error::Error<&[u8]>>(i)
            .map_err(|_| Error::Decode { context: "var item" })?;
        let transport_size = TransportSize::try_from(transport_size).map_err(|_| Error::Decode {
            context: "transport size",
        })?;
        let (i, num_elements) = be_u16::<_, nom::error::Error<&[u8]>>(i)
            .map_err(|_| Error::Decode { context: "var item" })?;
        let (i, db_number) = be_u16::<_, nom::error::Error<&[u8]>>(i)
            .map_err(|_| Error::Decode { context: "var item" })?;
        let (i, area_code) = nom_u8::<_, nom::error::Error<&[u8]>>(i)
            .map_err(|_| Error::Decode { context: "var item" })?;
        let area = MemoryArea::try_from(area_code).map_err(|_| Error::Decode {
            context: "memory area",
        })?;
        let (byte_offset, bit_offset) = unpack_address([i[0], i[1], i[2]]);
        Ok((
            &i[3..],
            VarItem {
                area,
                db_number,
                transport_size,
                num_elements,
                byte_offset,
                bit_offset,
            },
        ))
    }
}

impl WireEncode for VarItem {
    type Error = Error;

    fn encoded_len(&self) -> usize {
        VAR_ITEM_LEN
    }

    fn encode_to<B: BufMut>(&self, dst: &mut B) -> Result<()> {
        dst.put_u8(SpecificationType::Variable as u8);
        dst.put_u8(ITEM_TAIL_LEN);
        dst.put_u8(AddressingMode::S7Any as u8);
        dst.put_u8(self.transport_size as u8);
        dst.put_u16(self.num_elements);
        dst.put_u16(self.db_number);
        dst.put_u8(self.area as u8);
        dst.put_slice(&pack_address(self.byte_offset, self.bit_offset));
        Ok(())
    }
}

/// Pack a byte/bit offset pair into the 3-byte wire address.
///
/// The byte offset is not byte-aligned on the wire: the first 16 bits carry
/// `byte_offset >> 5`, the final byte carries the low 5 bits of the byte
/// offset in its upper 5 bits and the bit offset in its lower 3 bits.
#[inline]
pub fn pack_address(byte_offset: u16, bit_offset: u8) -> [u8; 3] {
    let hi = byte_offset >> 5;
    let lo = (((byte_offset & 0x1F) as u8) << 3) | (bit_offset & 0x07);
    [(hi >> 8) as u8, (hi & 0xFF) as u8, lo]
}

/// Exact inverse of [`pack_address`].
#[inline]
pub fn unpack_address(bytes: [u8; 3]) -> (u16, u8) {
    let hi = u16::from_be_bytes([bytes[0], bytes[1]]);
    let byte_offset = (hi << 5) | u16::from(bytes[2] >> 3);
    (byte_offset, bytes[2] & 0x07)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn packed_address_inverse_law() {
        for byte_offset in 0..=u16::MAX {
            for bit_offset in 0..=7u8 {
                let packed = pack_address(byte_offset, bit_offset);
                assert_eq!(
                    unpack_address(packed),
                    (byte_offset, bit_offset),
                    "offset {byte_offset}.{bit_offset}"
                );
            }
        }
    }

    #[test]
    fn db_byte_item_wire_layout() {
        // DB1, byte 40: 40 >> 5 = 1, ((40 & 0x1F) << 3) | 0 = 0x40
        let item = VarItem::new(MemoryArea::DataBlocks, 1, TransportSize::Byte, 40);
        let mut buf = BytesMut::new();
        item.encode_to(&mut buf).unwrap();
        assert_eq!(buf.as_ref(), hex::decode("120a10020001000184000140").unwrap());

        let (rest, parsed) = VarItem::parse(&buf).unwrap();
        assert!(rest.is_empty());
        assert_eq!(parsed, item);
    }

    #[test]
    fn bit_item_round_trip() {
        let item = VarItem {
            area: MemoryArea::Flags,
            db_number: 0,
            transport_size: TransportSize::Bit,
            num_elements: 1,
            byte_offset: 0x1234,
            bit_offset: 5,
        };
        let mut buf = BytesMut::new();
        item.encode_to(&mut buf).unwrap();
        assert_eq!(buf.len(), VAR_ITEM_LEN);
        let (_, parsed) = VarItem::parse(&buf).unwrap();
        assert_eq!(parsed, item);
    }

    #[test]
    fn non_s7any_mode_is_rejected() {
        let mut buf = BytesMut::new();
        VarItem::new(MemoryArea::Inputs, 0, TransportSize::Word, 2)
            .encode_to(&mut buf)
            .unwrap();
        buf[2] = 0xB2;
        match VarItem::parse(&buf) {
            Err(Error::UnsupportedAddressingMode { mode: 0xB2 }) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn truncated_item_is_insufficient_data() {
        let bytes = [0x12u8, 0x0A, 0x10, 0x02];
        match VarItem::parse(&bytes) {
            Err(Error::InsufficientData { needed: 12, available: 4 }) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }
}
