use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Event classes a trigger node can subscribe to over the socket stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    SlashCommand,
    Event,
    Interaction,
}

impl TriggerKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::SlashCommand => "slash_command",
            Self::Event => "event",
            Self::Interaction => "interaction",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TriggerConfigError {
    #[error("unsupported trigger kind `{0}` (expected slash_command|event|interaction)")]
    UnsupportedKind(String),
}

impl std::str::FromStr for TriggerKind {
    type Err = TriggerConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "slash_command" => Ok(Self::SlashCommand),
            "event" => Ok(Self::Event),
            "interaction" => Ok(Self::Interaction),
            other => Err(TriggerConfigError::UnsupportedKind(other.to_owned())),
        }
    }
}

/// Read-only trigger configuration supplied once at node setup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriggerConfig {
    pub kind: TriggerKind,
    /// Slash-command name the node listens for. `None` (or blank) matches
    /// every command. Only meaningful for `TriggerKind::SlashCommand`.
    pub command_filter: Option<String>,
}

impl TriggerConfig {
    pub fn new(kind: TriggerKind) -> Self {
        Self { kind, command_filter: None }
    }

    pub fn with_command_filter(kind: TriggerKind, filter: impl Into<String>) -> Self {
        Self { kind, command_filter: Some(filter.into()) }
    }

    /// Whether an inbound slash command passes the configured filter.
    /// Comparison ignores a leading `/` and ASCII case on both sides.
    pub fn command_matches(&self, command: &str) -> bool {
        match self.command_filter.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(filter) => normalize_command(filter) == normalize_command(command),
        }
    }
}

fn normalize_command(command: &str) -> String {
    command.trim().trim_start_matches('/').to_ascii_lowercase()
}

/// Declarative property schema exposed to the host UI for a trigger node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NodeDescriptor {
    pub name: String,
    pub display_name: String,
    pub version: u32,
    pub properties: Vec<NodeProperty>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NodeProperty {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub kind: PropertyKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<PropertyOption>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Options,
    Text,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PropertyOption {
    pub value: String,
    pub display_name: String,
    pub description: String,
}

/// The two user-facing fields every socket trigger node exposes: the
/// trigger-type dropdown and the optional slash-command filter.
pub fn trigger_properties() -> Vec<NodeProperty> {
    vec![
        NodeProperty {
            name: "trigger_kind".to_owned(),
            display_name: "Trigger On".to_owned(),
            description: "Which class of socket events starts the workflow".to_owned(),
            kind: PropertyKind::Options,
            required: true,
            options: vec![
                PropertyOption {
                    value: TriggerKind::SlashCommand.label().to_owned(),
                    display_name: "Slash Command".to_owned(),
                    description: "A user invoked a registered slash command".to_owned(),
                },
                PropertyOption {
                    value: TriggerKind::Event.label().to_owned(),
                    display_name: "Event".to_owned(),
                    description: "Any subscribed workspace event was delivered".to_owned(),
                },
                PropertyOption {
                    value: TriggerKind::Interaction.label().to_owned(),
                    display_name: "Interaction".to_owned(),
                    description: "A user acted on an interactive component".to_owned(),
                },
            ],
        },
        NodeProperty {
            name: "command_filter".to_owned(),
            display_name: "Command Name".to_owned(),
            description: "Only fire for this slash command. Leave empty to fire for every command."
                .to_owned(),
            kind: PropertyKind::Text,
            required: false,
            options: Vec::new(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::{trigger_properties, PropertyKind, TriggerConfig, TriggerConfigError, TriggerKind};

    #[test]
    fn empty_filter_matches_every_command() {
        let config = TriggerConfig::new(TriggerKind::SlashCommand);
        assert!(config.command_matches("/deploy"));
        assert!(config.command_matches("/anything"));

        let blank = TriggerConfig::with_command_filter(TriggerKind::SlashCommand, "  ");
        assert!(blank.command_matches("/deploy"));
    }

    #[test]
    fn filter_normalizes_leading_slash_and_case() {
        let config = TriggerConfig::with_command_filter(TriggerKind::SlashCommand, "deploy");
        assert!(config.command_matches("/deploy"));
        assert!(config.command_matches("/DEPLOY"));
        assert!(config.command_matches("deploy"));
        assert!(!config.command_matches("/deploy-prod"));

        let slashed = TriggerConfig::with_command_filter(TriggerKind::SlashCommand, "/Deploy");
        assert!(slashed.command_matches("/deploy"));
    }

    #[test]
    fn trigger_kind_parses_known_labels() {
        assert_eq!("slash_command".parse(), Ok(TriggerKind::SlashCommand));
        assert_eq!(" EVENT ".parse(), Ok(TriggerKind::Event));
        assert_eq!("interaction".parse(), Ok(TriggerKind::Interaction));
        assert_eq!(
            "webhook".parse::<TriggerKind>(),
            Err(TriggerConfigError::UnsupportedKind("webhook".to_owned()))
        );
    }

    #[test]
    fn descriptor_properties_expose_dropdown_and_filter() {
        let properties = trigger_properties();
        assert_eq!(properties.len(), 2);

        let dropdown = &properties[0];
        assert_eq!(dropdown.kind, PropertyKind::Options);
        assert_eq!(dropdown.options.len(), 3);
        assert!(dropdown.required);

        let filter = &properties[1];
        assert_eq!(filter.kind, PropertyKind::Text);
        assert!(!filter.required);
        assert!(filter.options.is_empty());
    }
}
