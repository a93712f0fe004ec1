use async_trait::async_trait;
use bytes::Bytes;
use std::result::Result as StdResult;
use thiserror::Error as ThisError;

/// Unified connection result type
pub type Result<T> = StdResult<T, Error>;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("can not use closed connection")]
    Closed,

    #[error("device reported error: {0}")]
    Device(String),

    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Enumerates the addressable items a device exposes.
#[async_trait]
pub trait PlcLister: Send + Sync {
    async fn list(&self) -> Result<Vec<String>>;
}

/// Reads raw values for a batch of addresses.
#[async_trait]
pub trait PlcReader: Send + Sync {
    async fn read(&self, addresses: &[String]) -> Result<Vec<Bytes>>;
}

/// Writes a raw value to a single address.
#[async_trait]
pub trait PlcWriter: Send + Sync {
    async fn write(&self, address: &str, value: Bytes) -> Result<()>;
}

/// A device connection that may additionally satisfy any of the
/// [`PlcLister`]/[`PlcReader`]/[`PlcWriter`] contracts.
///
/// Implementations declare their capabilities by overriding the matching
/// accessor to return `self`; absent capabilities answer `None` rather than
/// failing, so callers can probe before building requests.
pub trait PlcConnection: Send + Sync {
    fn is_connected(&self) -> bool;

    fn as_lister(&self) -> Option<&dyn PlcLister> {
        None
    }

    fn as_reader(&self) -> Option<&dyn PlcReader> {
        None
    }

    fn as_writer(&self) -> Option<&dyn PlcWriter> {
        None
    }
}
