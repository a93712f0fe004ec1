pub mod addr;
mod builder;
pub mod header;
pub mod param;
pub mod payload;
pub mod types;

use crate::wire::WireEncode;
use bytes::BufMut;

pub use addr::{pack_address, unpack_address, VarItem, VAR_ITEM_LEN};
pub use builder::{read_var_request, setup_request, write_var_request};
pub use header::{ResponseError, S7Header, PROTOCOL_ID};
pub use param::{S7Parameter, SetupCommunication};
pub use payload::{VarPayload, VarPayloadItem};
pub use types::{
    AddressingMode, DataTransportSize, MemoryArea, MessageType, ParamKind, ReturnCode,
    SpecificationType, TransportSize, VarKind,
};

use super::error::{Error, Result};

/// A complete S7 message: header fields plus ordered parameter and payload
/// sections. Header length fields are not stored; they are derived from the
/// sections when encoding and validated against the wire when decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S7Frame {
    pub message_type: MessageType,
    pub pdu_ref: u16,
    /// Error class/code pair, present on responses
    pub error: Option<ResponseError>,
    pub parameters: Vec<S7Parameter>,
    pub payloads: Vec<VarPayload>,
}

impl S7Frame {
    pub fn request(message_type: MessageType, pdu_ref: u16) -> Self {
        Self {
            message_type,
            pdu_ref,
            error: None,
            parameters: Vec::new(),
            payloads: Vec::new(),
        }
    }

    pub fn response(message_type: MessageType, pdu_ref: u16, error: ResponseError) -> Self {
        Self {
            message_type,
            pdu_ref,
            error: Some(error),
            parameters: Vec::new(),
            payloads: Vec::new(),
        }
    }

    /// Serialized length of the parameter section, per-parameter formulas.
    pub fn param_len(&self) -> usize {
        self.parameters.iter().map(WireEncode::encoded_len).sum()
    }

    /// Serialized length of the payload section, per-item formulas.
    pub fn payload_len(&self) -> usize {
        self.payloads.iter().map(WireEncode::encoded_len).sum()
    }

    /// First Read/WriteVar parameter of the frame; decides how the payload
    /// section is shaped.
    pub fn var_descriptor(&self) -> Option<VarKind> {
        self.parameters.iter().find_map(S7Parameter::var_kind)
    }

    /// First Setup-Communication parameter of the frame, if any.
    pub fn setup_communication(&self) -> Option<&SetupCommunication> {
        self.parameters.iter().find_map(|p| match p {
            S7Parameter::SetupCommunication(setup) => Some(setup),
            _ => None,
        })
    }

    fn header(&self) -> Result<S7Header> {
        let param_len = self.param_len();
        let payload_len = self.payload_len();
        if param_len > u16::MAX as usize || payload_len > u16::MAX as usize {
            return Err(Error::Encode {
                context: "section exceeds 16-bit length field",
            });
        }
        Ok(S7Header {
            message_type: self.message_type,
            reserved: 0,
            pdu_ref: self.pdu_ref,
            param_len: param_len as u16,
            payload_len: payload_len as u16,
            error: if self.message_type.is_response() {
                Some(self.error.unwrap_or_default())
            } else {
                None
            },
        })
    }
}

impl WireEncode for S7Frame {
    type Error = Error;

    fn encoded_len(&self) -> usize {
        let header_len = if self.message_type.is_response() { 12 } else { 10 };
        header_len + self.param_len() + self.payload_len()
    }

    fn encode_to<B: BufMut>(&self, dst: &mut B) -> Result<()> {
        self.header()?.encode_to(dst);
        for param in &self.parameters {
            param.encode_to(dst)?;
        }
        for payload in &self.payloads {
            payload.encode_to(dst)?;
        }
        Ok(())
    }
}
