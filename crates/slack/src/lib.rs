//! Slack Socket Mode trigger nodes for Flowgate.
//!
//! This crate bridges the platform's socket event stream into the
//! workflow engine's event queue:
//! - **Envelopes** (`envelope`) - the inbound delivery model
//! - **Transport** (`transport`) - opaque seam to the external socket
//!   client, which owns framing, heartbeats, and reconnects
//! - **Triggers** (`trigger`) - the v1 and v2 trigger nodes
//!
//! # Getting Started
//!
//! 1. Create a Slack app at https://api.slack.com/apps
//! 2. Enable Socket Mode and subscribe to events
//! 3. Set env vars: `FLOWGATE_SLACK_APP_TOKEN`, `FLOWGATE_SLACK_BOT_TOKEN`,
//!    `FLOWGATE_SLACK_SIGNING_SECRET`
//!
//! # Architecture
//!
//! ```text
//! Socket Envelopes → ack → trigger filter → WorkflowEvent batch → EventSink
//! ```

pub mod envelope;
pub mod transport;
pub mod trigger;

pub use envelope::{SocketEnvelope, SocketEvent};
pub use transport::{NoopSocketTransport, SocketTransport, TransportError};
pub use trigger::{SocketTrigger, SocketTriggerV2, TriggerError};
