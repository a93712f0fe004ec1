use serde_repr::{Deserialize_repr, Serialize_repr};

/// S7 PDU message types
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// Request initiated by the master
    Job = 0x01,
    Ack = 0x02,
    /// Acknowledgement carrying result data
    AckData = 0x03,
    UserData = 0x07,
}

impl MessageType {
    /// Responses additionally carry the error class/code pair in the header.
    #[inline]
    pub fn is_response(self) -> bool {
        matches!(self, MessageType::Ack | MessageType::AckData)
    }
}

impl TryFrom<u8> for MessageType {
    type Error = ();
    fn try_from(v: u8) -> std::result::Result<Self, Self::Error> {
        match v {
            0x01 => Ok(MessageType::Job),
            0x02 => Ok(MessageType::Ack),
            0x03 => Ok(MessageType::AckData),
            0x07 => Ok(MessageType::UserData),
            _ => Err(()),
        }
    }
}

/// Parameter type tags
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    CpuServices = 0x00,
    ReadVar = 0x04,
    WriteVar = 0x05,
    SetupCommunication = 0xF0,
}

impl TryFrom<u8> for ParamKind {
    type Error = ();
    fn try_from(v: u8) -> std::result::Result<Self, Self::Error> {
        match v {
            0x00 => Ok(ParamKind::CpuServices),
            0x04 => Ok(ParamKind::ReadVar),
            0x05 => Ok(ParamKind::WriteVar),
            0xF0 => Ok(ParamKind::SetupCommunication),
            _ => Err(()),
        }
    }
}

/// Which variable operation a Read/WriteVar parameter or payload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    ReadVar,
    WriteVar,
}

impl VarKind {
    #[inline]
    pub fn param_tag(self) -> u8 {
        match self {
            VarKind::ReadVar => ParamKind::ReadVar as u8,
            VarKind::WriteVar => ParamKind::WriteVar as u8,
        }
    }
}

/// Variable specification types
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
pub enum SpecificationType {
    Variable = 0x12,
}

impl TryFrom<u8> for SpecificationType {
    type Error = ();
    fn try_from(v: u8) -> std::result::Result<Self, Self::Error> {
        match v {
            0x12 => Ok(SpecificationType::Variable),
            _ => Err(()),
        }
    }
}

/// Addressing modes inside a variable specification. Only S7ANY is decoded;
/// the other known code points are kept so unsupported items can be named
/// when they are reported and dropped.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    S7Any = 0x10,
    PbcRid = 0x13,
    Alarm = 0x16,
    DbRead = 0xB0,
    Symbolic = 0xB2,
}

impl TryFrom<u8> for AddressingMode {
    type Error = ();
    fn try_from(v: u8) -> std::result::Result<Self, Self::Error> {
        match v {
            0x10 => Ok(AddressingMode::S7Any),
            0x13 => Ok(AddressingMode::PbcRid),
            0x16 => Ok(AddressingMode::Alarm),
            0xB0 => Ok(AddressingMode::DbRead),
            0xB2 => Ok(AddressingMode::Symbolic),
            _ => Err(()),
        }
    }
}

/// S7 memory area codes
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
pub enum MemoryArea {
    /// Direct peripheral access
    DirectPeripheral = 0x80,
    /// Inputs
    Inputs = 0x81,
    /// Outputs
    Outputs = 0x82,
    /// Flag memory (Merker)
    Flags = 0x83,
    /// Data blocks
    DataBlocks = 0x84,
    /// Instance data blocks
    InstanceDataBlocks = 0x85,
    /// Local data
    LocalData = 0x86,
    /// Counters
    Counters = 0x1C,
    /// Timers
    Timers = 0x1D,
}

impl TryFrom<u8> for MemoryArea {
    type Error = ();
    fn try_from(v: u8) -> std::result::Result<Self, Self::Error> {
        match v {
            0x80 => Ok(MemoryArea::DirectPeripheral),
            0x81 => Ok(MemoryArea::Inputs),
            0x82 => Ok(MemoryArea::Outputs),
            0x83 => Ok(MemoryArea::Flags),
            0x84 => Ok(MemoryArea::DataBlocks),
            0x85 => Ok(MemoryArea::InstanceDataBlocks),
            0x86 => Ok(MemoryArea::LocalData),
            0x1C => Ok(MemoryArea::Counters),
            0x1D => Ok(MemoryArea::Timers),
            _ => Err(()),
        }
    }
}

/// Transport size codes used in variable specifications
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
pub enum TransportSize {
    Bit = 0x01,
    Byte = 0x02,
    Char = 0x03,
    Word = 0x04,
    Int = 0x05,
    DWord = 0x06,
    DInt = 0x07,
    Real = 0x08,
    Date = 0x09,
    TimeOfDay = 0x0A,
    Time = 0x0B,
    S5Time = 0x0C,
    DateTime = 0x0F,
    Counter = 0x1C,
    Timer = 0x1D,
}

impl TryFrom<u8> for TransportSize {
    type Error = ();
    fn try_from(v: u8) -> std::result::Result<Self, Self::Error> {
        use TransportSize::*;
        Ok(match v {
            0x01 => Bit,
            0x02 => Byte,
            0x03 => Char,
            0x04 => Word,
            0x05 => Int,
            0x06 => DWord,
            0x07 => DInt,
            0x08 => Real,
            0x09 => Date,
            0x0A => TimeOfDay,
            0x0B => Time,
            0x0C => S5Time,
            0x0F => DateTime,
            0x1C => Counter,
            0x1D => Timer,
            _ => Err(())?,
        })
    }
}

/// Transport size tag carried by payload data items. The tag decides whether
/// the following length field counts bits or bytes.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataTransportSize {
    /// No data
    Null = 0x00,
    /// Bit access, length field in bits
    Bit = 0x03,
    /// Byte/Word/DWord access, length field in bits
    ByteWordDword = 0x04,
    /// Integer access, length field in bits
    Integer = 0x05,
    /// DInteger access, length field in bytes
    DInteger = 0x06,
    /// Real access, length field in bytes
    Real = 0x07,
    /// Octet string, length field in bytes
    OctetString = 0x09,
}

impl DataTransportSize {
    #[inline]
    pub fn size_in_bits(self) -> bool {
        matches!(
            self,
            DataTransportSize::Bit | DataTransportSize::ByteWordDword | DataTransportSize::Integer
        )
    }
}

impl TryFrom<u8> for DataTransportSize {
    type Error = ();
    fn try_from(v: u8) -> std::result::Result<Self, Self::Error> {
        Ok(match v {
            0x00 => DataTransportSize::Null,
            0x03 => DataTransportSize::Bit,
            0x04 => DataTransportSize::ByteWordDword,
            0x05 => DataTransportSize::Integer,
            0x06 => DataTransportSize::DInteger,
            0x07 => DataTransportSize::Real,
            0x09 => DataTransportSize::OctetString,
            _ => Err(())?,
        })
    }
}

/// Per-item return code in Read/WriteVar response payloads.
///
/// Device-reported codes are data, not failures: they are carried through to
/// the caller unchanged, including codes this table does not name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnCode {
    Reserved,
    Success,
    HardwareFault,
    AccessDenied,
    AddressOutOfRange,
    DataTypeNotSupported,
    DataTypeInconsistent,
    ObjectDoesNotExist,
    ObjectNotAvailable,
    Unknown(u8),
}

impl From<u8> for ReturnCode {
    fn from(v: u8) -> Self {
        match v {
            0x00 => ReturnCode::Reserved,
            0xFF => ReturnCode::Success,
            0x01 => ReturnCode::HardwareFault,
            0x03 => ReturnCode::AccessDenied,
            0x05 => ReturnCode::AddressOutOfRange,
            0x06 => ReturnCode::DataTypeNotSupported,
            0x07 => ReturnCode::DataTypeInconsistent,
            0x0A => ReturnCode::ObjectDoesNotExist,
            0x0B => ReturnCode::ObjectNotAvailable,
            other => ReturnCode::Unknown(other),
        }
    }
}

impl From<ReturnCode> for u8 {
    fn from(value: ReturnCode) -> Self {
        match value {
            ReturnCode::Reserved => 0x00,
            ReturnCode::Success => 0xFF,
            ReturnCode::HardwareFault => 0x01,
            ReturnCode::AccessDenied => 0x03,
            ReturnCode::AddressOutOfRange => 0x05,
            ReturnCode::DataTypeNotSupported => 0x06,
            ReturnCode::DataTypeInconsistent => 0x07,
            ReturnCode::ObjectDoesNotExist => 0x0A,
            ReturnCode::ObjectNotAvailable => 0x0B,
            ReturnCode::Unknown(v) => v,
        }
    }
}
