use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

/// The raw field bag forwarded into the engine. Whichever of the four
/// sections the transport supplied is carried verbatim; nothing here
/// inspects or rewrites the JSON.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EmittedFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl EmittedFields {
    pub fn is_empty(&self) -> bool {
        self.command.is_none()
            && self.body.is_none()
            && self.context.is_none()
            && self.payload.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WorkflowEvent {
    pub id: Uuid,
    /// Envelope id of the socket delivery that produced this event.
    pub correlation_id: String,
    pub received_at: DateTime<Utc>,
    pub fields: EmittedFields,
}

impl WorkflowEvent {
    pub fn new(correlation_id: impl Into<String>, fields: EmittedFields) -> Self {
        Self {
            id: Uuid::new_v4(),
            correlation_id: correlation_id.into(),
            received_at: Utc::now(),
            fields,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmitError {
    #[error("event sink rejected batch: {0}")]
    Rejected(String),
    #[error("event sink is closed")]
    Closed,
}

/// Emission seam into the workflow engine. Trigger nodes hand over events
/// in single-item batches; the engine side owns everything after that.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, batch: Vec<WorkflowEvent>) -> Result<(), EmitError>;
}

/// Sink backed by an in-process queue. Used by the CLI run path and tests.
#[derive(Default)]
pub struct InMemoryEventQueue {
    events: Mutex<Vec<WorkflowEvent>>,
}

impl InMemoryEventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn drain(&self) -> Vec<WorkflowEvent> {
        let mut events = self.events.lock().await;
        std::mem::take(&mut *events)
    }

    pub async fn len(&self) -> usize {
        self.events.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.lock().await.is_empty()
    }
}

#[async_trait]
impl EventSink for InMemoryEventQueue {
    async fn emit(&self, batch: Vec<WorkflowEvent>) -> Result<(), EmitError> {
        let mut events = self.events.lock().await;
        events.extend(batch);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{EmittedFields, EventSink, InMemoryEventQueue, WorkflowEvent};

    #[tokio::test]
    async fn queue_accumulates_and_drains_batches() {
        let queue = InMemoryEventQueue::new();
        assert!(queue.is_empty().await);

        let event = WorkflowEvent::new(
            "env-1",
            EmittedFields { command: Some(json!({"command": "/deploy"})), ..Default::default() },
        );
        queue.emit(vec![event.clone()]).await.expect("emit");
        assert_eq!(queue.len().await, 1);

        let drained = queue.drain().await;
        assert_eq!(drained, vec![event]);
        assert!(queue.is_empty().await);
    }

    #[test]
    fn emitted_fields_serialize_only_supplied_sections() {
        let fields = EmittedFields { body: Some(json!({"type": "app_mention"})), ..Default::default() };
        let rendered = serde_json::to_value(&fields).expect("serialize");
        assert_eq!(rendered, json!({"body": {"type": "app_mention"}}));
        assert!(!fields.is_empty());
        assert!(EmittedFields::default().is_empty());
    }

    #[test]
    fn workflow_events_carry_envelope_correlation() {
        let event = WorkflowEvent::new("env-9", EmittedFields::default());
        assert_eq!(event.correlation_id, "env-9");
    }
}
