use super::{
    super::error::{Error, Result},
    param::{S7Parameter, SetupCommunication},
    payload::{VarPayload, VarPayloadItem},
    types::{DataTransportSize, MessageType, ReturnCode, TransportSize, VarKind},
    S7Frame, VarItem,
};
use bytes::Bytes;

/// Build a Setup-Communication request carrying the caller's requested
/// negotiation values.
pub fn setup_request(
    pdu_ref: u16,
    max_amq_caller: u16,
    max_amq_callee: u16,
    pdu_length: u16,
) -> S7Frame {
    let mut frame = S7Frame::request(MessageType::Job, pdu_ref);
    frame
        .parameters
        .push(S7Parameter::SetupCommunication(SetupCommunication {
            max_amq_caller,
            max_amq_callee,
            pdu_length,
        }));
    frame
}

/// Build a ReadVar request for a list of S7ANY items.
pub fn read_var_request(pdu_ref: u16, items: Vec<VarItem>) -> Result<S7Frame> {
    check_count(items.len())?;
    let mut frame = S7Frame::request(MessageType::Job, pdu_ref);
    frame.parameters.push(S7Parameter::ReadVar { items });
    Ok(frame)
}

/// Build a WriteVar request from (item, raw value) pairs. Each value travels
/// as a payload entry whose transport-size tag follows the item's transport
/// size: bit items use the bit tag, everything else the bit-counted
/// byte/word/dword tag.
pub fn write_var_request(pdu_ref: u16, items: Vec<(VarItem, Bytes)>) -> Result<S7Frame> {
    check_count(items.len())?;
    let mut frame = S7Frame::request(MessageType::Job, pdu_ref);
    let payload_items = items
        .iter()
        .map(|(item, data)| {
            let transport_size = match item.transport_size {
                TransportSize::Bit => DataTransportSize::Bit,
                _ => DataTransportSize::ByteWordDword,
            };
            VarPayloadItem::with_data(ReturnCode::Reserved, transport_size, data.clone())
        })
        .collect();
    frame.parameters.push(S7Parameter::WriteVar {
        items: items.into_iter().map(|(item, _)| item).collect(),
    });
    frame.payloads.push(VarPayload {
        kind: VarKind::WriteVar,
        items: payload_items,
    });
    Ok(frame)
}

fn check_count(count: usize) -> Result<()> {
    if count > u8::MAX as usize {
        return Err(Error::TooManyItems { count });
    }
    Ok(())
}
