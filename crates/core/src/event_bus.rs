//! Unified event bus — trait for emitting domain events from any module.
//!
//! Stores accept an `Arc<dyn EventSink>` so campaign and contact activity
//! can be observed without coupling to a delivery pipeline. The real
//! analytics backend is out of scope; tests use `CaptureSink`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Lifecycle events emitted by the stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    CampaignSubmitted,
    CampaignCancelled,
    DispatchStarted,
    DispatchCompleted,
    ContactCreated,
    ContactDeleted,
}

/// A single domain event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    pub event_id: Uuid,
    pub event_type: EventType,
    pub campaign_id: Option<Uuid>,
    pub contact_id: Option<Uuid>,
    pub detail: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

/// Trait for emitting domain events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: DomainEvent);
}

/// No-op sink for modules that don't need event emission.
pub struct NoOpSink;

impl EventSink for NoOpSink {
    fn emit(&self, _event: DomainEvent) {}
}

/// Shared no-op sink.
pub fn noop_sink() -> Arc<dyn EventSink> {
    Arc::new(NoOpSink)
}

/// In-memory sink that captures events for testing.
#[derive(Default)]
pub struct CaptureSink {
    events: Mutex<Vec<DomainEvent>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().expect("event bus mutex poisoned").clone()
    }

    pub fn count(&self) -> usize {
        self.events.lock().expect("event bus mutex poisoned").len()
    }

    pub fn count_type(&self, event_type: EventType) -> usize {
        self.events
            .lock()
            .expect("event bus mutex poisoned")
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }

    pub fn clear(&self) {
        self.events.lock().expect("event bus mutex poisoned").clear();
    }
}

impl EventSink for CaptureSink {
    fn emit(&self, event: DomainEvent) {
        self.events.lock().expect("event bus mutex poisoned").push(event);
    }
}

/// Convenience builder for a `DomainEvent` with minimal boilerplate.
pub fn make_event(
    event_type: EventType,
    campaign_id: Option<Uuid>,
    contact_id: Option<Uuid>,
    detail: serde_json::Value,
) -> DomainEvent {
    DomainEvent {
        event_id: Uuid::new_v4(),
        event_type,
        campaign_id,
        contact_id,
        detail,
        timestamp: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_sink() {
        let sink = CaptureSink::new();
        let campaign = Uuid::new_v4();

        sink.emit(make_event(
            EventType::CampaignSubmitted,
            Some(campaign),
            None,
            serde_json::json!({"name": "Promo"}),
        ));
        sink.emit(make_event(
            EventType::DispatchCompleted,
            Some(campaign),
            None,
            serde_json::json!({}),
        ));

        assert_eq!(sink.count(), 2);
        assert_eq!(sink.count_type(EventType::CampaignSubmitted), 1);
        assert_eq!(sink.events()[0].campaign_id, Some(campaign));

        sink.clear();
        assert_eq!(sink.count(), 0);
    }
}
