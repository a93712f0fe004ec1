use super::{
    super::error::{Error, Result},
    addr::{VarItem, VAR_ITEM_LEN},
    types::{ParamKind, VarKind},
};
use crate::wire::WireEncode;
use bytes::BufMut;
use nom::number::complete::{be_u16, u8 as nom_u8};
use tracing::warn;

/// Setup-Communication negotiation values. All three fields travel as
/// big-endian 16-bit values after a reserved zero byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupCommunication {
    pub max_amq_caller: u16,
    pub max_amq_callee: u16,
    pub pdu_length: u16,
}

/// One decoded frame parameter.
///
/// Response Read/WriteVar parameters carry only the item count on the wire,
/// so their item list is empty after decoding a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum S7Parameter {
    SetupCommunication(SetupCommunication),
    ReadVar { items: Vec<VarItem> },
    WriteVar { items: Vec<VarItem> },
    Unknown { tag: u8 },
}

impl S7Parameter {
    /// Variable operation this parameter describes, if any.
    pub fn var_kind(&self) -> Option<VarKind> {
        match self {
            S7Parameter::ReadVar { .. } => Some(VarKind::ReadVar),
            S7Parameter::WriteVar { .. } => Some(VarKind::WriteVar),
            _ => None,
        }
    }
}

impl WireEncode for S7Parameter {
    type Error = Error;

    fn encoded_len(&self) -> usize {
        match self {
            S7Parameter::SetupCommunication(_) => 1 + 1 + 2 + 2 + 2,
            S7Parameter::ReadVar { items } | S7Parameter::WriteVar { items } => {
                2 + items.len() * VAR_ITEM_LEN
            }
            S7Parameter::Unknown { .. } => 0,
        }
    }

    fn encode_to<B: BufMut>(&self, dst: &mut B) -> Result<()> {
        match self {
            S7Parameter::SetupCommunication(setup) => {
                dst.put_u8(ParamKind::SetupCommunication as u8);
                dst.put_u8(0x00);
                dst.put_u16(setup.max_amq_caller);
                dst.put_u16(setup.max_amq_callee);
                dst.put_u16(setup.pdu_length);
            }
            S7Parameter::ReadVar { items } | S7Parameter::WriteVar { items } => {
                if items.len() > u8::MAX as usize {
                    return Err(Error::TooManyItems { count: items.len() });
                }
                // var_kind is Some for these two arms
                let kind = self.var_kind().ok_or(Error::Encode {
                    context: "var parameter kind",
                })?;
                dst.put_u8(kind.param_tag());
                dst.put_u8(items.len() as u8);
                for item in items {
                    item.encode_to(dst)?;
                }
            }
            S7Parameter::Unknown { tag } => {
                warn!(tag, "encoding this parameter type is not implemented");
            }
        }
        Ok(())
    }
}

/// Parse the complete parameter section of one frame.
///
/// Unknown parameter types are reported and terminate the section; everything
/// decoded up to that point is kept.
pub(crate) fn parse_parameters(mut input: &[u8], is_response: bool) -> Result<Vec<S7Parameter>> {
    let mut params = Vec::new();
    while !input.is_empty() {
        let (rest, tag) = nom_u8::<_, nom::error::Error<&[u8]>>(input).map_err(|_| {
            Error::Decode {
                context: "parameter tag",
            }
        })?;
        match ParamKind::try_from(tag) {
            Ok(ParamKind::SetupCommunication) => {
                let (rest, setup) = parse_setup(rest)?;
                params.push(S7Parameter::SetupCommunication(setup));
                input = rest;
            }
            Ok(param_kind @ (ParamKind::ReadVar | ParamKind::WriteVar)) => {
                let kind = if matches!(param_kind, ParamKind::ReadVar) {
                    VarKind::ReadVar
                } else {
                    VarKind::WriteVar
                };
                let (rest, count) = nom_u8::<_, nom::error::Error<&[u8]>>(rest).map_err(|_| {
                    Error::Decode {
                        context: "var item count",
                    }
                })?;
                let (items, rest) = if is_response {
                    // Responses repeat the count only; items follow in the payload.
                    (Vec::new(), rest)
                } else {
                    parse_items(count, rest)?
                };
                params.push(match kind {
                    VarKind::ReadVar => S7Parameter::ReadVar { items },
                    VarKind::WriteVar => S7Parameter::WriteVar { items },
                });
                input = rest;
            }
            Ok(ParamKind::CpuServices) | Err(_) => {
                warn!(tag, "unsupported parameter type, dropping remainder of parameter section");
                params.push(S7Parameter::Unknown { tag });
                input = &[];
            }
        }
    }
    Ok(params)
}

fn parse_setup(input: &[u8]) -> Result<(&[u8], SetupCommunication)> {
    let (i, _reserved) = nom_u8::<_, nom::error::Error<&[u8]>>(input).map_err(|_| {
        Error::Decode {
            context: "setup communication",
        }
    })?;
    let (i, max_amq_caller) = be_u16::<_, nom::error::Error<&[u8]>>(i).map_err(|_| {
        Error::Decode {
            context: "setup communication",
        }
    })?;
    let (i, max_amq_callee) = be_u16::<_, nom::error::Error<&[u8]>>(i).map_err(|_| {
        Error::Decode {
            context: "setup communication",
        }
    })?;
    let (i, pdu_length) = be_u16::<_, nom::error::Error<&[u8]>>(i).map_err(|_| {
        Error::Decode {
            context: "setup communication",
        }
    })?;
    Ok((
        i,
        SetupCommunication {
            max_amq_caller,
            max_amq_callee,
            pdu_length,
        },
    ))
}

/// Parse up to `count` S7ANY items. An unsupported or malformed item is
/// reported and stops the walk; since the remaining bytes of the section can
/// no longer be attributed, the returned rest is empty in that case.
fn parse_items(count: u8, mut input: &[u8]) -> Result<(Vec<VarItem>, &[u8])> {
    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
        match VarItem::parse(input) {
            Ok((rest, item)) => {
                items.push(item);
                input = rest;
            }
            Err(Error::UnsupportedAddressingMode { mode }) => {
                warn!(mode, "unsupported addressing mode, dropping remaining items");
                return Ok((items, &[]));
            }
            Err(Error::Decode { context }) => {
                warn!(context, "malformed variable item, dropping remaining items");
                return Ok((items, &[]));
            }
            Err(e) => return Err(e),
        }
    }
    Ok((items, input))
}
