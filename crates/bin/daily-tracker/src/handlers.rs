//! Event handlers attached to the bus by the binary.

use std::future::Future;

use daily_tracker_app::ports::{EventHandler, EventStore};
use daily_tracker_domain::error::TrackerError;
use daily_tracker_domain::event::{DomainEvent, EventPayload};

/// Appends every event to an [`EventStore`].
pub struct Recorder<S> {
    store: S,
}

impl<S: EventStore> Recorder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: EventStore> EventHandler for Recorder<S> {
    fn can_handle(&self, _event_type: &str) -> bool {
        true
    }

    fn handle(&self, event: &DomainEvent) -> impl Future<Output = Result<(), TrackerError>> + Send {
        self.store.append(event.clone())
    }
}

/// Warns about nights flagged as poor.
pub struct PoorSleepAlert;

impl EventHandler for PoorSleepAlert {
    fn can_handle(&self, event_type: &str) -> bool {
        event_type == "PoorSleepQualityDetected"
    }

    fn handle(&self, event: &DomainEvent) -> impl Future<Output = Result<(), TrackerError>> + Send {
        if let EventPayload::PoorSleepQualityDetected { reason } = &event.payload {
            tracing::warn!(night = %event.aggregate_id, %reason, "poor sleep detected");
        }
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use daily_tracker_adapter_memory::MemoryEventStore;
    use daily_tracker_domain::event::PoorSleepReason;

    use super::*;

    #[tokio::test]
    async fn should_record_every_event_type() {
        let store = Arc::new(MemoryEventStore::new());
        let recorder = Recorder::new(Arc::clone(&store));

        assert!(EventPayload::TYPES.iter().all(|t| recorder.can_handle(t)));
        recorder
            .handle(&DomainEvent::new("t-1", EventPayload::TaskStarted))
            .await
            .unwrap();
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn should_alert_only_on_poor_sleep() {
        let alert = PoorSleepAlert;
        assert!(alert.can_handle("PoorSleepQualityDetected"));
        assert!(!alert.can_handle("SleepEntryCreated"));

        let event = DomainEvent::new(
            "n-1",
            EventPayload::PoorSleepQualityDetected {
                reason: PoorSleepReason::MultipleAwakenings { awakenings: 3 },
            },
        );
        assert!(alert.handle(&event).await.is_ok());
    }
}
