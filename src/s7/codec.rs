use super::{
    error::Error,
    frame::{param, payload, S7Frame, S7Header, PROTOCOL_ID},
    negotiation::{Negotiation, NegotiationState, SessionConfig, SessionParams},
};
use crate::wire::WireEncode;
use bytes::BytesMut;
use tokio::sync::watch;
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

/// S7 frame codec bound to one connection.
///
/// Decoding is a two-pass walk: the parameter section is parsed first, then
/// the payload section using the first Read/WriteVar parameter as its shape
/// descriptor. The codec owns the connection's negotiation state; a
/// Setup-Communication parameter inside a decoded response updates it before
/// the frame is handed upwards.
///
/// The codec expects whole transport-delivered buffers (the ISO-on-TCP layer
/// below reassembles them); an empty buffer is a legal keep-alive and decodes
/// to no frame.
#[derive(Debug)]
pub struct S7Codec {
    negotiation: Negotiation,
}

impl S7Codec {
    /// Codec plus the receiver on which setup completion is published.
    pub fn new(config: SessionConfig) -> (Self, watch::Receiver<Option<SessionParams>>) {
        let (negotiation, setup_rx) = Negotiation::new(config);
        (Self { negotiation }, setup_rx)
    }

    /// React to the lower transport finishing its handshake: returns the
    /// Setup-Communication request to send.
    pub fn on_transport_connected(&mut self) -> S7Frame {
        self.negotiation.on_transport_connected()
    }

    #[inline]
    pub fn negotiation_state(&self) -> NegotiationState {
        self.negotiation.state()
    }

    /// Working negotiation values; bounds outbound framing once negotiated.
    #[inline]
    pub fn session_params(&self) -> SessionParams {
        self.negotiation.params()
    }
}

impl Encoder<S7Frame> for S7Codec {
    type Error = Error;

    fn encode(&mut self, frame: S7Frame, dst: &mut BytesMut) -> Result<(), Error> {
        dst.reserve(frame.encoded_len());
        frame.encode_to(dst)
    }
}

impl Decoder for S7Codec {
    type Item = S7Frame;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<S7Frame>, Error> {
        if src.is_empty() {
            return Ok(None);
        }
        if src[0] != PROTOCOL_ID {
            let found = src[0];
            warn!(found, "expecting S7 protocol id, dropping buffer");
            src.clear();
            return Err(Error::InvalidMagic { found });
        }

        let (header, rest) = S7Header::parse(src)?;
        let need = header.param_len as usize + header.payload_len as usize;
        if rest.len() < need {
            return Err(Error::InsufficientData {
                needed: need,
                available: rest.len(),
            });
        }

        let total = header.encoded_len() + need;
        let buf = src.split_to(total).freeze();
        let body = &buf[header.encoded_len()..];
        let (param_bytes, payload_bytes) = body.split_at(header.param_len as usize);

        let is_response = header.message_type.is_response();
        let parameters = param::parse_parameters(param_bytes, is_response)?;
        let descriptor = parameters.iter().find_map(param::S7Parameter::var_kind);
        let payloads = payload::parse_payloads(payload_bytes, descriptor, is_response)?;

        let frame = S7Frame {
            message_type: header.message_type,
            pdu_ref: header.pdu_ref,
            error: header.error,
            parameters,
            payloads,
        };

        if is_response {
            if let Some(setup) = frame.setup_communication() {
                self.negotiation.observe_setup(setup);
            }
        }

        Ok(Some(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::super::frame::{
        read_var_request, setup_request, write_var_request, DataTransportSize, MemoryArea,
        MessageType, ResponseError, ReturnCode, S7Parameter, SetupCommunication, TransportSize,
        VarItem, VarKind, VarPayload, VarPayloadItem,
    };
    use super::*;
    use bytes::Bytes;

    fn codec() -> S7Codec {
        S7Codec::new(SessionConfig::default()).0
    }

    fn round_trip(frame: S7Frame) {
        let mut codec = codec();
        let mut buf = BytesMut::new();
        codec.encode(frame.clone(), &mut buf).unwrap();
        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert!(buf.is_empty());
        assert_eq!(decoded, frame);
    }

    fn setup_response(pdu_ref: u16, caller: u16, callee: u16, pdu_length: u16) -> S7Frame {
        let mut frame = S7Frame::response(MessageType::AckData, pdu_ref, ResponseError::default());
        frame
            .parameters
            .push(S7Parameter::SetupCommunication(SetupCommunication {
                max_amq_caller: caller,
                max_amq_callee: callee,
                pdu_length,
            }));
        frame
    }

    #[test]
    fn empty_buffer_decodes_to_no_frame() {
        let mut buf = BytesMut::new();
        assert!(codec().decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn wrong_magic_aborts_this_buffer_only() {
        let mut codec = codec();
        let mut buf = BytesMut::from(&[0x33u8, 0x01, 0x00][..]);
        match codec.decode(&mut buf) {
            Err(Error::InvalidMagic { found: 0x33 }) => {}
            other => panic!("unexpected: {other:?}"),
        }
        assert!(buf.is_empty());

        // The codec keeps working on the next buffer.
        let mut buf = BytesMut::new();
        codec.encode(setup_request(7, 8, 8, 1024), &mut buf).unwrap();
        assert!(codec.decode(&mut buf).unwrap().is_some());
    }

    #[test]
    fn truncated_frame_is_malformed() {
        let mut codec = codec();
        let mut buf = BytesMut::new();
        codec
            .encode(read_var_request(1, vec![VarItem::new(MemoryArea::Flags, 0, TransportSize::Byte, 0)]).unwrap(), &mut buf)
            .unwrap();
        buf.truncate(buf.len() - 3);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(Error::InsufficientData { .. })
        ));
    }

    #[test]
    fn setup_request_round_trip() {
        round_trip(setup_request(7, 8, 8, 1024));
    }

    #[test]
    fn setup_response_round_trip() {
        round_trip(setup_response(7, 4, 4, 960));
    }

    #[test]
    fn read_var_request_round_trip() {
        let items = vec![
            VarItem::new(MemoryArea::DataBlocks, 1, TransportSize::Byte, 40),
            VarItem {
                area: MemoryArea::Inputs,
                db_number: 0,
                transport_size: TransportSize::Bit,
                num_elements: 1,
                byte_offset: 3,
                bit_offset: 6,
            },
        ];
        round_trip(read_var_request(0x2A, items).unwrap());
    }

    #[test]
    fn read_var_response_round_trip() {
        let mut frame = S7Frame::response(MessageType::AckData, 9, ResponseError::default());
        frame.parameters.push(S7Parameter::ReadVar { items: Vec::new() });
        frame.payloads.push(VarPayload {
            kind: VarKind::ReadVar,
            items: vec![
                VarPayloadItem::with_data(
                    ReturnCode::Success,
                    DataTransportSize::ByteWordDword,
                    Bytes::from_static(&[0xAB]),
                ),
                VarPayloadItem::with_data(
                    ReturnCode::Success,
                    DataTransportSize::OctetString,
                    Bytes::from_static(&[1, 2, 3]),
                ),
                VarPayloadItem::with_data(
                    ReturnCode::ObjectDoesNotExist,
                    DataTransportSize::Null,
                    Bytes::new(),
                ),
            ],
        });
        round_trip(frame);
    }

    #[test]
    fn write_var_response_round_trip() {
        let mut frame = S7Frame::response(MessageType::AckData, 5, ResponseError::default());
        frame.parameters.push(S7Parameter::WriteVar { items: Vec::new() });
        frame.payloads.push(VarPayload {
            kind: VarKind::WriteVar,
            items: vec![
                VarPayloadItem::status(ReturnCode::Success),
                VarPayloadItem::status(ReturnCode::AccessDenied),
            ],
        });
        round_trip(frame);
    }

    #[test]
    fn header_length_fields_match_section_formulas() {
        let mut codec = codec();
        let item = VarItem::new(MemoryArea::DataBlocks, 2, TransportSize::Word, 0);
        let frame =
            write_var_request(1, vec![(item, Bytes::from_static(&[0x00, 0x2A]))]).unwrap();
        let mut buf = BytesMut::new();
        codec.encode(frame, &mut buf).unwrap();

        let param_len = u16::from_be_bytes([buf[6], buf[7]]);
        let payload_len = u16::from_be_bytes([buf[8], buf[9]]);
        assert_eq!(param_len, 2 + 12);
        assert_eq!(payload_len, 4 + 2);
    }

    #[test]
    fn bit_sized_read_response_rounds_length_up() {
        // One item declaring 17 bits: 3 data bytes on the wire.
        let mut codec = codec();
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&[
            0x32, 0x03, 0x00, 0x00, 0x00, 0x01, 0x00, 0x02, 0x00, 0x07, 0x00, 0x00,
        ]);
        buf.extend_from_slice(&[0x04, 0x01]); // ReadVar response parameter
        buf.extend_from_slice(&[0xFF, 0x04, 0x00, 0x11, 0xAA, 0xBB, 0xCC]);
        let frame = codec.decode(&mut buf).unwrap().unwrap();
        let item = &frame.payloads[0].items[0];
        assert_eq!(item.data.len(), 3);
    }

    #[test]
    fn setup_response_drives_negotiation() {
        let (mut codec, rx) = S7Codec::new(SessionConfig::default());
        let request = codec.on_transport_connected();
        assert_eq!(request.setup_communication().unwrap().pdu_length, 1024);
        assert_eq!(codec.negotiation_state(), NegotiationState::AwaitingSetupResponse);

        let mut buf = BytesMut::new();
        let mut peer = S7Codec::new(SessionConfig::default()).0;
        peer.encode(setup_response(7, 4, 4, 480), &mut buf).unwrap();
        codec.decode(&mut buf).unwrap().unwrap();

        assert_eq!(codec.negotiation_state(), NegotiationState::Negotiated);
        assert_eq!(codec.session_params().pdu_length, 480);
        assert_eq!(rx.borrow().unwrap().pdu_length, 480);

        // A second answer simply overwrites the values again.
        let mut buf = BytesMut::new();
        peer.encode(setup_response(7, 2, 2, 240), &mut buf).unwrap();
        codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(codec.negotiation_state(), NegotiationState::Negotiated);
        assert_eq!(codec.session_params().pdu_length, 240);
    }

    #[test]
    fn setup_inside_request_does_not_negotiate() {
        let (mut codec, _rx) = S7Codec::new(SessionConfig::default());
        let mut buf = BytesMut::new();
        let mut peer = S7Codec::new(SessionConfig::default()).0;
        peer.encode(setup_request(7, 2, 2, 240), &mut buf).unwrap();
        codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(codec.negotiation_state(), NegotiationState::Uninitialized);
        assert_eq!(codec.session_params().pdu_length, 1024);
    }
}
