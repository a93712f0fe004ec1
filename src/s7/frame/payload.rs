use super::{
    super::error::{Error, Result},
    types::{DataTransportSize, ReturnCode, VarKind},
};
use crate::wire::WireEncode;
use bytes::{BufMut, Bytes};
use nom::number::complete::{be_u16, u8 as nom_u8};
use tracing::debug;

/// One payload entry of a Read/WriteVar frame.
///
/// Write responses carry only the return code; `transport_size` is `None` and
/// `data` is empty for them, and they occupy a single wire byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarPayloadItem {
    pub return_code: ReturnCode,
    pub transport_size: Option<DataTransportSize>,
    pub data: Bytes,
}

impl VarPayloadItem {
    /// Status-only item, as sent in WriteVar responses.
    pub fn status(return_code: ReturnCode) -> Self {
        Self {
            return_code,
            transport_size: None,
            data: Bytes::new(),
        }
    }

    /// Data-carrying item, as sent in ReadVar responses and WriteVar requests.
    pub fn with_data(return_code: ReturnCode, transport_size: DataTransportSize, data: Bytes) -> Self {
        Self {
            return_code,
            transport_size: Some(transport_size),
            data,
        }
    }
}

impl WireEncode for VarPayloadItem {
    type Error = Error;

    fn encoded_len(&self) -> usize {
        match self.transport_size {
            Some(_) => 1 + 1 + 2 + self.data.len(),
            None => 1,
        }
    }

    fn encode_to<B: BufMut>(&self, dst: &mut B) -> Result<()> {
        dst.put_u8(self.return_code.into());
        let Some(transport_size) = self.transport_size else {
            return Ok(());
        };
        dst.put_u8(transport_size as u8);
        let len_field = if transport_size.size_in_bits() {
            (self.data.len() * 8) as u16
        } else {
            self.data.len() as u16
        };
        dst.put_u16(len_field);
        dst.put_slice(&self.data);
        Ok(())
    }
}

/// Payload section belonging to the frame's Read/WriteVar parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarPayload {
    pub kind: VarKind,
    pub items: Vec<VarPayloadItem>,
}

impl WireEncode for VarPayload {
    type Error = Error;

    fn encoded_len(&self) -> usize {
        self.items.iter().map(WireEncode::encoded_len).sum()
    }

    fn encode_to<B: BufMut>(&self, dst: &mut B) -> Result<()> {
        for item in &self.items {
            item.encode_to(dst)?;
        }
        Ok(())
    }
}

/// Parse the payload section of one frame.
///
/// Which shape the entries take depends on the first Read/WriteVar parameter
/// seen while parsing the parameter section and on the frame direction:
/// write responses are one status byte per item, read responses carry a
/// transport-size tag and a bit- or byte-counted length. Request payloads are
/// not decoded.
pub(crate) fn parse_payloads(
    input: &[u8],
    descriptor: Option<VarKind>,
    is_response: bool,
) -> Result<Vec<VarPayload>> {
    if input.is_empty() {
        return Ok(Vec::new());
    }
    let Some(kind) = descriptor else {
        debug!(len = input.len(), "payload without a var parameter, skipping");
        return Ok(Vec::new());
    };
    if !is_response {
        debug!(len = input.len(), "request payloads are not decoded, skipping");
        return Ok(Vec::new());
    }

    let mut items = Vec::new();
    let mut rest = input;
    while !rest.is_empty() {
        let (i, item) = match kind {
            VarKind::WriteVar => parse_status_item(rest)?,
            VarKind::ReadVar => parse_data_item(rest)?,
        };
        items.push(item);
        rest = i;
    }
    Ok(vec![VarPayload { kind, items }])
}

fn parse_status_item(input: &[u8]) -> Result<(&[u8], VarPayloadItem)> {
    let (i, rc) = nom_u8::<_, nom::error::Error<&[u8]>>(input).map_err(|_| Error::Decode {
        context: "payload return code",
    })?;
    Ok((i, VarPayloadItem::status(ReturnCode::from(rc))))
}

fn parse_data_item(input: &[u8]) -> Result<(&[u8], VarPayloadItem)> {
    let (i, rc) = nom_u8::<_, nom::error::Error<&[u8]>>(input).map_err(|_| Error::Decode {
        context: "payload return code",
    })?;
    let (i, ts) = nom_u8::<_, nom::error::Error<&[u8]>>(i).map_err(|_| Error::Decode {
        context: "payload transport size",
    })?;
    let transport_size = DataTransportSize::try_from(ts).map_err(|_| Error::Decode {
        context: "payload transport size",
    })?;
    let (i, len_field) = be_u16::<_, nom::error::Error<&[u8]>>(i).map_err(|_| Error::Decode {
        context: "payload length",
    })?;
    let data_len = if transport_size.size_in_bits() {
        (len_field as usize).div_ceil(8)
    } else {
        len_field as usize
    };
    if i.len() < data_len {
        return Err(Error::InsufficientData {
            needed: data_len,
            available: i.len(),
        });
    }
    let (data, rest) = i.split_at(data_len);
    Ok((
        rest,
        VarPayloadItem::with_data(
            ReturnCode::from(rc),
            transport_size,
            Bytes::copy_from_slice(data),
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn write_response_items_are_one_byte_each() {
        let payloads = parse_payloads(&[0xFF, 0x0A, 0x05], Some(VarKind::WriteVar), true).unwrap();
        assert_eq!(payloads.len(), 1);
        let items = &payloads[0].items;
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].return_code, ReturnCode::Success);
        assert_eq!(items[1].return_code, ReturnCode::ObjectDoesNotExist);
        assert_eq!(items[2].return_code, ReturnCode::AddressOutOfRange);
        assert!(items.iter().all(|it| it.transport_size.is_none() && it.data.is_empty()));
    }

    #[test]
    fn bit_sized_length_rounds_up() {
        // 17 bits declared, so ceil(17 / 8) = 3 data bytes follow.
        let wire = [0xFFu8, 0x04, 0x00, 0x11, 0xAA, 0xBB, 0xCC];
        let payloads = parse_payloads(&wire, Some(VarKind::ReadVar), true).unwrap();
        let item = &payloads[0].items[0];
        assert_eq!(item.transport_size, Some(DataTransportSize::ByteWordDword));
        assert_eq!(item.data.as_ref(), &[0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn read_response_item_round_trip() {
        let item = VarPayloadItem::with_data(
            ReturnCode::Success,
            DataTransportSize::ByteWordDword,
            Bytes::from_static(&[0x00, 0x2A]),
        );
        let payload = VarPayload {
            kind: VarKind::ReadVar,
            items: vec![item.clone(), item],
        };
        let mut buf = BytesMut::new();
        payload.encode_to(&mut buf).unwrap();
        assert_eq!(buf.len(), payload.encoded_len());
        let parsed = parse_payloads(&buf, Some(VarKind::ReadVar), true).unwrap();
        assert_eq!(parsed, vec![payload]);
    }

    #[test]
    fn byte_counted_item_round_trip() {
        let payload = VarPayload {
            kind: VarKind::ReadVar,
            items: vec![VarPayloadItem::with_data(
                ReturnCode::Success,
                DataTransportSize::OctetString,
                Bytes::from_static(&[1, 2, 3, 4, 5]),
            )],
        };
        let mut buf = BytesMut::new();
        payload.encode_to(&mut buf).unwrap();
        let parsed = parse_payloads(&buf, Some(VarKind::ReadVar), true).unwrap();
        assert_eq!(parsed, vec![payload]);
    }

    #[test]
    fn request_payload_is_skipped() {
        let payloads = parse_payloads(&[0x00, 0x04, 0x00, 0x08, 0x2A], Some(VarKind::WriteVar), false)
            .unwrap();
        assert!(payloads.is_empty());
    }

    #[test]
    fn truncated_data_item_is_insufficient() {
        let wire = [0xFFu8, 0x09, 0x00, 0x04, 0x01];
        match parse_payloads(&wire, Some(VarKind::ReadVar), true) {
            Err(Error::InsufficientData { needed: 4, available: 1 }) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }
}
