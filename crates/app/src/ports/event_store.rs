//! Event store port: persistence for published domain events.

use std::future::Future;

use daily_tracker_domain::error::TrackerError;
use daily_tracker_domain::event::DomainEvent;

/// Append-only log of [`DomainEvent`]s.
pub trait EventStore: Send + Sync {
    /// Persist a new event.
    fn append(&self, event: DomainEvent) -> impl Future<Output = Result<(), TrackerError>> + Send;

    /// Events of one aggregate, newest first.
    fn find_by_aggregate(
        &self,
        aggregate_id: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<DomainEvent>, TrackerError>> + Send;

    /// Events of one kind (e.g. `"TaskStarted"`), newest first.
    fn find_by_type(
        &self,
        event_type: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<DomainEvent>, TrackerError>> + Send;
}

impl<T: EventStore> EventStore for std::sync::Arc<T> {
    fn append(&self, event: DomainEvent) -> impl Future<Output = Result<(), TrackerError>> + Send {
        (**self).append(event)
    }

    fn find_by_aggregate(
        &self,
        aggregate_id: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<DomainEvent>, TrackerError>> + Send {
        (**self).find_by_aggregate(aggregate_id, limit)
    }

    fn find_by_type(
        &self,
        event_type: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<DomainEvent>, TrackerError>> + Send {
        (**self).find_by_type(event_type, limit)
    }
}
