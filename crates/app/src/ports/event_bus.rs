//! Event bus port: publish/subscribe for domain events.

use std::future::Future;

use daily_tracker_domain::error::TrackerError;
use daily_tracker_domain::event::DomainEvent;

/// Publishes domain events to interested subscribers.
pub trait EventPublisher: Send + Sync {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: DomainEvent) -> impl Future<Output = Result<(), TrackerError>> + Send;

    /// Publish events in order, stopping at the first failure.
    fn publish_batch(
        &self,
        events: Vec<DomainEvent>,
    ) -> impl Future<Output = Result<(), TrackerError>> + Send {
        async move {
            for event in events {
                self.publish(event).await?;
            }
            Ok(())
        }
    }
}

impl<T: EventPublisher> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: DomainEvent) -> impl Future<Output = Result<(), TrackerError>> + Send {
        (**self).publish(event)
    }
}

/// Reacts to published events of the types it accepts.
pub trait EventHandler: Send + Sync {
    /// Whether events named `event_type` (e.g. `"TaskStarted"`) reach
    /// [`handle`](Self::handle).
    fn can_handle(&self, event_type: &str) -> bool;

    fn handle(&self, event: &DomainEvent) -> impl Future<Output = Result<(), TrackerError>> + Send;
}

impl<T: EventHandler> EventHandler for std::sync::Arc<T> {
    fn can_handle(&self, event_type: &str) -> bool {
        (**self).can_handle(event_type)
    }

    fn handle(&self, event: &DomainEvent) -> impl Future<Output = Result<(), TrackerError>> + Send {
        (**self).handle(event)
    }
}
