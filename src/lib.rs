//! Protocol codecs for supervisory PLC access.
//!
//! The crate provides the Siemens S7 binary frame codec together with the
//! connection-setup negotiation it drives, the Beckhoff ADS typed-value
//! decoder, and a capability-based connection facade. Transport (ISO-on-TCP
//! framing, sockets) and request queuing live in the surrounding application.

pub mod ads;
pub mod connection;
pub mod s7;
pub mod wire;

pub use connection::{PlcConnection, PlcLister, PlcReader, PlcWriter};
pub use wire::WireEncode;
