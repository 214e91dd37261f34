//! EventSink implementations.

use std::sync::Mutex;

use tracing::{info, warn};

use crate::domain::DomainEvent;
use crate::ports::EventSink;

/// Forwards events to `tracing`; lost completion events are logged at `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: DomainEvent) {
        match &event {
            DomainEvent::TicketIssued { id, ticket } | DomainEvent::TicketRetired { id, ticket } => {
                info!(event = event.name(), %id, %ticket);
            }
            DomainEvent::CompletionPublished {
                id,
                ticket,
                office_number,
            } => {
                info!(event = event.name(), %id, %ticket, %office_number);
            }
            DomainEvent::CompletionPublishFailed {
                id,
                ticket,
                office_number,
                reason,
            } => {
                warn!(event = event.name(), %id, %ticket, %office_number, %reason, "completion event was not published");
            }
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<DomainEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn publish_failures(&self) -> Vec<DomainEvent> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, DomainEvent::CompletionPublishFailed { .. }))
            .collect()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: DomainEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}
