//! In-memory implementation of [`EventStore`].

use std::future::{Future, ready};
use std::sync::{Mutex, MutexGuard};

use daily_tracker_app::ports::EventStore;
use daily_tracker_domain::error::TrackerError;
use daily_tracker_domain::event::DomainEvent;

use crate::error::MemoryStoreError;

/// Append-only event log kept in insertion order.
#[derive(Default)]
pub struct MemoryEventStore {
    events: Mutex<Vec<DomainEvent>>,
}

impl MemoryEventStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored events.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the lock is poisoned.
    pub fn len(&self) -> Result<usize, TrackerError> {
        Ok(self.lock()?.len())
    }

    /// # Errors
    ///
    /// Returns a storage error if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, TrackerError> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<DomainEvent>>, MemoryStoreError> {
        self.events
            .lock()
            .map_err(|_| MemoryStoreError::Poisoned { store: "event" })
    }

    fn newest(
        &self,
        limit: usize,
        keep: impl Fn(&DomainEvent) -> bool,
    ) -> Result<Vec<DomainEvent>, TrackerError> {
        Ok(self
            .lock()?
            .iter()
            .rev()
            .filter(|event| keep(event))
            .take(limit)
            .cloned()
            .collect())
    }
}

impl EventStore for MemoryEventStore {
    fn append(&self, event: DomainEvent) -> impl Future<Output = Result<(), TrackerError>> + Send {
        let result = self
            .lock()
            .map(|mut events| events.push(event))
            .map_err(TrackerError::from);
        ready(result)
    }

    fn find_by_aggregate(
        &self,
        aggregate_id: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<DomainEvent>, TrackerError>> + Send {
        ready(self.newest(limit, |event| event.aggregate_id == aggregate_id))
    }

    fn find_by_type(
        &self,
        event_type: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<DomainEvent>, TrackerError>> + Send {
        ready(self.newest(limit, |event| event.event_type() == event_type))
    }
}
