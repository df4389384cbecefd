//! The two socket-mode trigger nodes. `v1` and `v2` are near-duplicate
//! implementations that share envelope matching and forwarding; they
//! differ in how a failed connection start is reported (see each module).

pub mod v1;
pub mod v2;

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use flowgate_core::queue::{EmitError, EmittedFields, EventSink, WorkflowEvent};
use flowgate_core::trigger::TriggerConfig;

use crate::envelope::{SocketEnvelope, SocketEvent};
use crate::transport::{SocketTransport, TransportError};

pub use v1::SocketTrigger;
pub use v2::SocketTriggerV2;

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Emit(#[from] EmitError),
}

/// Whether an inbound event is one the configured trigger fires for.
fn event_matches(config: &TriggerConfig, event: &SocketEvent) -> bool {
    use flowgate_core::trigger::TriggerKind::*;

    match (config.kind, event) {
        (SlashCommand, SocketEvent::SlashCommand { command, .. }) => {
            config.command_matches(command)
        }
        (Event, SocketEvent::EventsApi { .. }) => true,
        (Interaction, SocketEvent::Interaction { .. }) => true,
        _ => false,
    }
}

/// Raw field bag for the engine, carrying whichever sections the
/// transport supplied.
fn emitted_fields(event: &SocketEvent) -> EmittedFields {
    match event {
        SocketEvent::SlashCommand { payload, .. } => {
            EmittedFields { command: Some(payload.clone()), ..Default::default() }
        }
        SocketEvent::EventsApi { body, context } => EmittedFields {
            body: Some(body.clone()),
            context: Some(context.clone()),
            ..Default::default()
        },
        SocketEvent::Interaction { payload, context } => EmittedFields {
            payload: Some(payload.clone()),
            context: Some(context.clone()),
            ..Default::default()
        },
        SocketEvent::Unsupported { .. } => EmittedFields::default(),
    }
}

/// Acknowledge one envelope and, if it matches the trigger configuration,
/// forward it to the engine as a single-item batch. The ack is always
/// issued first: the platform marks unacked deliveries as failed.
async fn process_envelope(
    transport: &Arc<dyn SocketTransport>,
    config: &TriggerConfig,
    sink: &Arc<dyn EventSink>,
    envelope: &SocketEnvelope,
) -> Result<Option<WorkflowEvent>, TriggerError> {
    debug!(
        event_name = "trigger.envelope_received",
        envelope_id = %envelope.envelope_id,
        event_type = envelope.event.event_type(),
        correlation_id = %envelope.envelope_id,
        "received socket envelope"
    );

    if let Err(error) = transport.acknowledge(&envelope.envelope_id).await {
        warn!(
            event_name = "trigger.ack_failed",
            envelope_id = %envelope.envelope_id,
            correlation_id = %envelope.envelope_id,
            error = %error,
            "failed to acknowledge socket envelope"
        );
    } else {
        debug!(
            event_name = "trigger.ack_sent",
            envelope_id = %envelope.envelope_id,
            correlation_id = %envelope.envelope_id,
            "acknowledged socket envelope"
        );
    }

    if !event_matches(config, &envelope.event) {
        return Ok(None);
    }

    let event = WorkflowEvent::new(envelope.envelope_id.clone(), emitted_fields(&envelope.event));
    if let Err(error) = sink.emit(vec![event.clone()]).await {
        warn!(
            event_name = "trigger.emit_failed",
            envelope_id = %envelope.envelope_id,
            correlation_id = %envelope.envelope_id,
            error = %error,
            "workflow engine rejected event batch"
        );
        return Err(error.into());
    }

    debug!(
        event_name = "trigger.event_emitted",
        envelope_id = %envelope.envelope_id,
        correlation_id = %envelope.envelope_id,
        workflow_event_id = %event.id,
        "forwarded event to workflow engine"
    );

    Ok(Some(event))
}


#[cfg(test)]
mod tests {
    use flowgate_core::trigger::{TriggerConfig, TriggerKind};
    use serde_json::json;

    use super::{emitted_fields, event_matches};
    use crate::envelope::SocketEvent;

    #[test]
    fn slash_kind_matches_only_commands() {
        let config = TriggerConfig::new(TriggerKind::SlashCommand);
        let command = SocketEvent::SlashCommand { command: "/go".to_owned(), payload: json!({}) };
        let event = SocketEvent::EventsApi { body: json!({}), context: json!({}) };

        assert!(event_matches(&config, &command));
        assert!(!event_matches(&config, &event));
    }

    #[test]
    fn unsupported_events_never_match_or_emit_fields() {
        let unsupported = SocketEvent::Unsupported { event_type: "hello".to_owned() };
        for kind in [TriggerKind::SlashCommand, TriggerKind::Event, TriggerKind::Interaction] {
            assert!(!event_matches(&TriggerConfig::new(kind), &unsupported));
        }
        assert!(emitted_fields(&unsupported).is_empty());
    }

    #[test]
    fn field_bags_are_forwarded_verbatim() {
        let payload = json!({"command": "/go", "text": "now", "user_id": "U1"});
        let command =
            SocketEvent::SlashCommand { command: "/go".to_owned(), payload: payload.clone() };
        assert_eq!(emitted_fields(&command).command, Some(payload));

        let body = json!({"type": "reaction_added"});
        let context = json!({"retry": 0});
        let event = SocketEvent::EventsApi { body: body.clone(), context: context.clone() };
        let fields = emitted_fields(&event);
        assert_eq!(fields.body, Some(body));
        assert_eq!(fields.context, Some(context));
        assert_eq!(fields.command, None);
    }
}
