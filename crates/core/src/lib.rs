//! Core contracts for the Flowgate trigger bridge: configuration, the
//! trigger domain model, and the workflow event queue seam.

pub mod config;
pub mod queue;
pub mod trigger;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat, SlackConfig};
pub use queue::{EmitError, EmittedFields, EventSink, InMemoryEventQueue, WorkflowEvent};
pub use trigger::{
    trigger_properties, NodeDescriptor, NodeProperty, PropertyKind, PropertyOption, TriggerConfig,
    TriggerConfigError, TriggerKind,
};
