pub mod codec;
pub mod error;
pub mod frame;
pub mod negotiation;

pub use codec::S7Codec;
pub use error::{Error, Result};
pub use frame::S7Frame;
pub use negotiation::{Negotiation, NegotiationState, SessionConfig, SessionParams};
