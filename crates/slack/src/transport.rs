use async_trait::async_trait;
use thiserror::Error;

use flowgate_core::config::SlackConfig;

use crate::envelope::SocketEnvelope;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport failed to connect: {0}")]
    Connect(String),
    #[error("transport read failed: {0}")]
    Receive(String),
    #[error("transport ack failed: {0}")]
    Acknowledge(String),
    #[error("transport disconnect failed: {0}")]
    Disconnect(String),
}

/// Seam to the external socket-mode client. The implementation owns the
/// wire protocol end to end (framing, heartbeats, reconnects, signature
/// verification); trigger nodes only see envelopes and acks.
#[async_trait]
pub trait SocketTransport: Send + Sync {
    /// Open the persistent connection bound to the given credentials.
    async fn connect(&self, credentials: &SlackConfig) -> Result<(), TransportError>;
    /// Next delivery, or `None` once the stream has closed.
    async fn next_envelope(&self) -> Result<Option<SocketEnvelope>, TransportError>;
    async fn acknowledge(&self, envelope_id: &str) -> Result<(), TransportError>;
    async fn disconnect(&self) -> Result<(), TransportError>;
}

/// Transport that connects to nothing and delivers nothing. Keeps the
/// wiring honest where no real client is configured.
#[derive(Default)]
pub struct NoopSocketTransport;

#[async_trait]
impl SocketTransport for NoopSocketTransport {
    async fn connect(&self, _credentials: &SlackConfig) -> Result<(), TransportError> {
        Ok(())
    }

    async fn next_envelope(&self) -> Result<Option<SocketEnvelope>, TransportError> {
        Ok(None)
    }

    async fn acknowledge(&self, _envelope_id: &str) -> Result<(), TransportError> {
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        Ok(())
    }
}
