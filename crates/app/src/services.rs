//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.
//!
//! Every mutation follows the same sequence: load the entry, apply the domain
//! operation, save it, then drain its buffered events into the publisher.

pub mod sleep_service;
pub mod task_service;

use daily_tracker_domain::error::TrackerError;
use daily_tracker_domain::event::Aggregate;

use crate::ports::{EntryWriter, EventPublisher};

/// Save `entry`, then publish and clear the events it buffered.
///
/// Events are only handed out once the save succeeded.
async fn commit<T, W, P>(repo: &W, publisher: &P, mut entry: T) -> Result<T, TrackerError>
where
    T: Aggregate,
    W: EntryWriter<T>,
    P: EventPublisher,
{
    repo.save(&entry).await?;
    let events = entry.drain_events();
    let count = events.len();
    publisher.publish_batch(events).await?;
    tracing::debug!(kind = T::KIND, id = %entry.id(), events = count, "entry committed");
    Ok(entry)
}
