//! In-process event bus backed by a tokio broadcast channel.
//!
//! Subscribers either take a raw receiver or attach an [`EventHandler`],
//! which only sees the event types it accepts.

use std::future::Future;

use tokio::sync::broadcast;

use daily_tracker_domain::error::TrackerError;
use daily_tracker_domain::event::DomainEvent;

use crate::ports::{EventHandler, EventPublisher};

/// In-process event bus using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the event is simply dropped).
pub struct InProcessEventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl InProcessEventBus {
    /// Create a new event bus with the given channel capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events on this bus.
    ///
    /// Returns a receiver that will get all events published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }

    /// Attach `handler` to this bus.
    ///
    /// The subscription starts now; the returned future feeds the handler
    /// until the bus is dropped. Spawn it to run the handler, drop or abort it
    /// to unsubscribe.
    pub fn subscribe_handler<H: EventHandler>(
        &self,
        handler: H,
    ) -> impl Future<Output = DispatchReport> + Send + use<H> {
        dispatch(self.subscribe(), handler)
    }

    /// Number of live receivers, handlers included.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, event: DomainEvent) -> impl Future<Output = Result<(), TrackerError>> + Send {
        tracing::debug!(
            event_type = event.event_type(),
            aggregate_id = %event.aggregate_id,
            "publishing event"
        );
        // Sending only fails without receivers; the event is dropped then.
        let _ = self.sender.send(event);
        async { Ok(()) }
    }
}

/// What one handler went through while attached to the bus.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    /// Accepted events handled successfully.
    pub handled: u64,
    /// Events of types the handler does not accept.
    pub ignored: u64,
    /// Accepted events whose handling failed.
    pub failed: u64,
    /// Events lost because the handler fell more than the channel capacity behind.
    pub missed: u64,
}

/// Feed `handler` the events it accepts from `rx` until the channel closes.
///
/// A failing event is logged and counted; later events still reach the handler.
pub async fn dispatch<H: EventHandler>(
    mut rx: broadcast::Receiver<DomainEvent>,
    handler: H,
) -> DispatchReport {
    let mut report = DispatchReport::default();
    loop {
        match rx.recv().await {
            Ok(event) => {
                let event_type = event.event_type();
                if !handler.can_handle(event_type) {
                    report.ignored += 1;
                    continue;
                }
                match handler.handle(&event).await {
                    Ok(()) => report.handled += 1,
                    Err(err) => {
                        report.failed += 1;
                        tracing::error!(
                            event_type,
                            aggregate_id = %event.aggregate_id,
                            error = %err,
                            "event handler failed"
                        );
                    }
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                report.missed += skipped;
                tracing::warn!(skipped, "event handler lagged behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    report
}
