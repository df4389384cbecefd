use std::sync::Arc;

use tracing::{error, info, warn};

use flowgate_core::config::SlackConfig;
use flowgate_core::queue::{EventSink, WorkflowEvent};
use flowgate_core::trigger::{trigger_properties, NodeDescriptor, TriggerConfig};

use crate::transport::SocketTransport;

use super::{process_envelope, TriggerError};

/// Second-generation socket trigger node. Behaves like
/// [`super::SocketTrigger`] except that a failed connection start is
/// logged and swallowed instead of propagated; the two behaviors are
/// preserved as observed rather than unified (see DESIGN.md).
pub struct SocketTriggerV2 {
    credentials: SlackConfig,
    config: TriggerConfig,
    transport: Arc<dyn SocketTransport>,
    sink: Arc<dyn EventSink>,
}

impl SocketTriggerV2 {
    pub fn new(
        credentials: SlackConfig,
        config: TriggerConfig,
        transport: Arc<dyn SocketTransport>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self { credentials, config, transport, sink }
    }

    /// Host-facing property schema for this node.
    pub fn descriptor() -> NodeDescriptor {
        NodeDescriptor {
            name: "slack_socket_trigger_v2".to_owned(),
            display_name: "Slack Socket Trigger (v2)".to_owned(),
            version: 2,
            properties: trigger_properties(),
        }
    }

    /// Trigger-mode start: connect and pump until the stream closes. A
    /// connect failure leaves the node idle and returns `Ok(())`; the v1
    /// node surfaces the same failure to the caller.
    pub async fn start(&self) -> Result<(), TriggerError> {
        info!(
            event_name = "trigger.connecting",
            node_version = 2,
            trigger_kind = self.config.kind.label(),
            command_filter = self.config.command_filter.as_deref().unwrap_or(""),
            "opening socket mode connection"
        );

        if let Err(error) = self.transport.connect(&self.credentials).await {
            error!(
                event_name = "trigger.start_failed",
                node_version = 2,
                error = %error,
                "socket mode connection failed; trigger stays idle"
            );
            return Ok(());
        }

        info!(event_name = "trigger.connected", node_version = 2, "socket mode connected");
        self.pump().await
    }

    /// Interactive test invocation: connect, wait for the first matching
    /// event, then tear the connection down again.
    pub async fn start_manual(&self) -> Result<Option<WorkflowEvent>, TriggerError> {
        if let Err(error) = self.transport.connect(&self.credentials).await {
            error!(
                event_name = "trigger.start_failed",
                node_version = 2,
                error = %error,
                "socket mode connection failed during manual test"
            );
            return Err(error.into());
        }

        let result = self.pump_first().await;
        self.close().await;
        result
    }

    /// Teardown. Disconnect errors are logged and swallowed: close never
    /// raises past the caller.
    pub async fn close(&self) {
        match self.transport.disconnect().await {
            Ok(()) => {
                info!(event_name = "trigger.closed", node_version = 2, "socket mode disconnected");
            }
            Err(error) => {
                warn!(
                    event_name = "trigger.close_failed",
                    node_version = 2,
                    error = %error,
                    "socket disconnect failed during teardown"
                );
            }
        }
    }

    async fn pump(&self) -> Result<(), TriggerError> {
        loop {
            let Some(envelope) = self.transport.next_envelope().await? else {
                info!(
                    event_name = "trigger.stream_closed",
                    node_version = 2,
                    "socket mode stream closed"
                );
                self.transport.disconnect().await?;
                return Ok(());
            };

            process_envelope(&self.transport, &self.config, &self.sink, &envelope).await?;
        }
    }

    async fn pump_first(&self) -> Result<Option<WorkflowEvent>, TriggerError> {
        loop {
            let Some(envelope) = self.transport.next_envelope().await? else {
                return Ok(None);
            };

            if let Some(event) =
                process_envelope(&self.transport, &self.config, &self.sink, &envelope).await?
            {
                return Ok(Some(event));
            }
        }
    }
}
