use std::sync::Arc;

use tracing::{error, info, warn};

use flowgate_core::config::SlackConfig;
use flowgate_core::queue::{EventSink, WorkflowEvent};
use flowgate_core::trigger::{trigger_properties, NodeDescriptor, TriggerConfig};

use crate::transport::SocketTransport;

use super::{process_envelope, TriggerError};

/// First-generation socket trigger node. Connection-start failure is
/// logged and propagated to the host.
pub struct SocketTrigger {
    credentials: SlackConfig,
    config: TriggerConfig,
    transport: Arc<dyn SocketTransport>,
    sink: Arc<dyn EventSink>,
}

impl SocketTrigger {
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
            name: "slack_socket_trigger".to_owned(),
            display_name: "Slack Socket Trigger".to_owned(),
            version: 1,
            properties: trigger_properties(),
        }
    }

    /// Trigger-mode start: connect and pump until the stream closes.
    pub async fn start(&self) -> Result<(), TriggerError> {
        info!(
            event_name = "trigger.connecting",
            node_version = 1,
            trigger_kind = self.config.kind.label(),
            "opening socket mode connection"
        );

        if let Err(error) = self.transport.connect(&self.credentials).await {
            error!(
                event_name = "trigger.start_failed",
                node_version = 1,
                error = %error,
                "socket mode connection failed"
            );
            return Err(error.into());
        }

        info!(event_name = "trigger.connected", node_version = 1, "socket mode connected");
        self.pump().await
    }

    /// Interactive test invocation: connect, wait for the first matching
    /// event, then tear the connection down again.
    pub async fn start_manual(&self) -> Result<Option<WorkflowEvent>, TriggerError> {
        if let Err(error) = self.transport.connect(&self.credentials).await {
            error!(
                event_name = "trigger.start_failed",
                node_version = 1,
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
                info!(event_name = "trigger.closed", node_version = 1, "socket mode disconnected");
            }
            Err(error) => {
                warn!(
                    event_name = "trigger.close_failed",
                    node_version = 1,
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
                    node_version = 1,
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

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use flowgate_core::queue::EmitError;
    use flowgate_core::trigger::{TriggerConfig, TriggerKind};

    use super::super::testkit::{
        command_envelope, events_api_envelope, interaction_envelope, ops_log, test_credentials,
        RecordingSink, ScriptedTransport,
    };
    use super::super::TriggerError;
    use super::SocketTrigger;
    use crate::transport::TransportError;

    fn trigger(
        config: TriggerConfig,
        transport: Arc<ScriptedTransport>,
        sink: Arc<RecordingSink>,
    ) -> SocketTrigger {
        SocketTrigger::new(test_credentials(), config, transport, sink)
    }

    #[tokio::test]
    async fn only_matching_commands_reach_the_sink() {
        let ops = ops_log();
        let transport = Arc::new(ScriptedTransport::delivering(
            ops.clone(),
            vec![command_envelope("env-1", "/deploy"), command_envelope("env-2", "/status")],
        ));
        let sink = Arc::new(RecordingSink::with_ops(ops));
        let node = trigger(
            TriggerConfig::with_command_filter(TriggerKind::SlashCommand, "deploy"),
            transport.clone(),
            sink.clone(),
        );

        node.start().await.expect("start");

        let events = sink.events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].correlation_id, "env-1");
        // Every envelope is acknowledged, matching or not.
        assert_eq!(transport.acknowledgements().await, vec!["env-1", "env-2"]);
    }

    #[tokio::test]
    async fn empty_filter_matches_every_command() {
        let ops = ops_log();
        let transport = Arc::new(ScriptedTransport::delivering(
            ops.clone(),
            vec![command_envelope("env-1", "/deploy"), command_envelope("env-2", "/status")],
        ));
        let sink = Arc::new(RecordingSink::with_ops(ops));
        let node =
            trigger(TriggerConfig::new(TriggerKind::SlashCommand), transport, sink.clone());

        node.start().await.expect("start");
        assert_eq!(sink.events().await.len(), 2);
    }

    #[tokio::test]
    async fn acknowledgement_is_issued_before_emission() {
        let ops = ops_log();
        let transport = Arc::new(ScriptedTransport::delivering(
            ops.clone(),
            vec![command_envelope("env-1", "/deploy")],
        ));
        let sink = Arc::new(RecordingSink::with_ops(ops.clone()));
        let node =
            trigger(TriggerConfig::new(TriggerKind::SlashCommand), transport, sink);

        node.start().await.expect("start");

        let journal = ops.lock().await.clone();
        assert_eq!(journal, vec!["connect", "ack:env-1", "emit:env-1", "disconnect"]);
    }

    #[tokio::test]
    async fn event_kind_only_forwards_events_api_deliveries() {
        let ops = ops_log();
        let transport = Arc::new(ScriptedTransport::delivering(
            ops.clone(),
            vec![
                command_envelope("env-1", "/deploy"),
                events_api_envelope("env-2"),
                interaction_envelope("env-3"),
            ],
        ));
        let sink = Arc::new(RecordingSink::with_ops(ops));
        let node = trigger(TriggerConfig::new(TriggerKind::Event), transport, sink.clone());

        node.start().await.expect("start");

        let events = sink.events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].correlation_id, "env-2");
        assert!(events[0].fields.body.is_some());
        assert!(events[0].fields.context.is_some());
    }

    #[tokio::test]
    async fn interaction_kind_only_forwards_interactions() {
        let ops = ops_log();
        let transport = Arc::new(ScriptedTransport::delivering(
            ops.clone(),
            vec![events_api_envelope("env-1"), interaction_envelope("env-2")],
        ));
        let sink = Arc::new(RecordingSink::with_ops(ops));
        let node = trigger(TriggerConfig::new(TriggerKind::Interaction), transport, sink.clone());

        node.start().await.expect("start");

        let events = sink.events().await;
        assert_eq!(events.len(), 1);
        assert!(events[0].fields.payload.is_some());
    }

    #[tokio::test]
    async fn start_failure_propagates_to_the_host() {
        let ops = ops_log();
        let transport = Arc::new(ScriptedTransport::with_script(
            ops.clone(),
            vec![Err(TransportError::Connect("network down".to_owned()))],
            vec![],
            vec![],
        ));
        let sink = Arc::new(RecordingSink::with_ops(ops));
        let node = trigger(TriggerConfig::new(TriggerKind::SlashCommand), transport, sink);

        let error = node.start().await.expect_err("v1 start should surface connect failure");
        assert!(matches!(error, TriggerError::Transport(TransportError::Connect(_))));
    }

    #[tokio::test]
    async fn close_swallows_disconnect_failure() {
        let ops = ops_log();
        let transport = Arc::new(ScriptedTransport::with_script(
            ops.clone(),
            vec![],
            vec![],
            vec![Err(TransportError::Disconnect("already gone".to_owned()))],
        ));
        let sink = Arc::new(RecordingSink::with_ops(ops));
        let node =
            trigger(TriggerConfig::new(TriggerKind::SlashCommand), transport.clone(), sink);

        node.close().await;
        assert_eq!(transport.disconnect_calls().await, 1);
    }

    #[tokio::test]
    async fn manual_start_returns_first_match_then_disconnects() {
        let ops = ops_log();
        let transport = Arc::new(ScriptedTransport::delivering(
            ops.clone(),
            vec![
                command_envelope("env-1", "/status"),
                command_envelope("env-2", "/deploy"),
                command_envelope("env-3", "/deploy"),
            ],
        ));
        let sink = Arc::new(RecordingSink::with_ops(ops));
        let node = trigger(
            TriggerConfig::with_command_filter(TriggerKind::SlashCommand, "/deploy"),
            transport.clone(),
            sink.clone(),
        );

        let event = node.start_manual().await.expect("manual start");
        let event = event.expect("a matching event should be captured");
        assert_eq!(event.correlation_id, "env-2");

        // Stops at the first match and tears the connection down.
        assert_eq!(sink.events().await.len(), 1);
        assert_eq!(transport.disconnect_calls().await, 1);
    }

    #[tokio::test]
    async fn manual_start_with_closed_stream_yields_no_event() {
        let ops = ops_log();
        let transport = Arc::new(ScriptedTransport::delivering(ops.clone(), vec![]));
        let sink = Arc::new(RecordingSink::with_ops(ops));
        let node =
            trigger(TriggerConfig::new(TriggerKind::SlashCommand), transport.clone(), sink);

        let event = node.start_manual().await.expect("manual start");
        assert!(event.is_none());
        assert_eq!(transport.disconnect_calls().await, 1);
    }

    #[tokio::test]
    async fn emit_failure_stops_the_pump() {
        let ops = ops_log();
        let transport = Arc::new(ScriptedTransport::delivering(
            ops,
            vec![command_envelope("env-1", "/deploy")],
        ));
        let sink = Arc::new(RecordingSink::failing(EmitError::Closed));
        let node = trigger(TriggerConfig::new(TriggerKind::SlashCommand), transport, sink);

        let error = node.start().await.expect_err("emit failure should stop the pump");
        assert!(matches!(error, TriggerError::Emit(EmitError::Closed)));
    }

    #[test]
    fn descriptor_is_version_one_with_trigger_properties() {
        let descriptor = SocketTrigger::descriptor();
        assert_eq!(descriptor.version, 1);
        assert_eq!(descriptor.name, "slack_socket_trigger");
        assert_eq!(descriptor.properties.len(), 2);
    }
}
