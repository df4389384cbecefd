use serde_json::Value;

/// One socket-mode delivery. The platform expects an acknowledgement for
/// `envelope_id` within its deadline, before any downstream work.
#[derive(Clone, Debug, PartialEq)]
pub struct SocketEnvelope {
    pub envelope_id: String,
    pub event: SocketEvent,
}

/// Inbound event classes the transport can deliver. The JSON bags are
/// opaque: they are forwarded to the engine exactly as received.
#[derive(Clone, Debug, PartialEq)]
pub enum SocketEvent {
    /// A slash command invocation. `command` is the invoked name (with
    /// leading `/`), `payload` the full command object from the platform.
    SlashCommand { command: String, payload: Value },
    /// An Events API delivery: the event body plus transport context.
    EventsApi { body: Value, context: Value },
    /// An interactive component action (button, select, modal submit).
    Interaction { payload: Value, context: Value },
    Unsupported { event_type: String },
}

impl SocketEvent {
    pub fn event_type(&self) -> &str {
        match self {
            Self::SlashCommand { .. } => "slash_command",
            Self::EventsApi { .. } => "events_api",
            Self::Interaction { .. } => "interaction",
            Self::Unsupported { event_type } => event_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::SocketEvent;

    #[test]
    fn event_type_names_are_stable() {
        let command = SocketEvent::SlashCommand {
            command: "/deploy".to_owned(),
            payload: json!({"command": "/deploy"}),
        };
        assert_eq!(command.event_type(), "slash_command");

        let unsupported = SocketEvent::Unsupported { event_type: "hello".to_owned() };
        assert_eq!(unsupported.event_type(), "hello");
    }
}
