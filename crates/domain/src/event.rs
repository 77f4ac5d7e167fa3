//! Domain events: immutable records of notable state changes.
//!
//! Entities record events into an owned [`EventBuffer`] as they mutate. A
//! caller persists the entity first and then drains the buffer into an event
//! publisher. Nothing is drained automatically: reading [`EventSource::events`]
//! twice without clearing hands out the same events twice.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::id::EventId;
use crate::level::{DaytimeSleepiness, SleepQuality, StressLevel};
use crate::time::{Timestamp, now};

/// Schema version stamped on every event produced by this crate.
pub const EVENT_SCHEMA_VERSION: u32 = 1;

/// A notable state change of an aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub id: EventId,
    pub aggregate_id: String,
    pub occurred_at: Timestamp,
    pub version: u32,
    pub payload: EventPayload,
}

impl DomainEvent {
    /// Create an event for `aggregate_id` stamped with the current time.
    #[must_use]
    pub fn new(aggregate_id: impl Into<String>, payload: EventPayload) -> Self {
        Self::at(aggregate_id, payload, now())
    }

    /// Create an event with an explicit timestamp.
    #[must_use]
    pub fn at(aggregate_id: impl Into<String>, payload: EventPayload, occurred_at: Timestamp) -> Self {
        Self {
            id: EventId::new(),
            aggregate_id: aggregate_id.into(),
            occurred_at,
            version: EVENT_SCHEMA_VERSION,
            payload,
        }
    }

    /// Kind tag used for routing and storage.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        self.payload.event_type()
    }
}

/// Event-specific data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventPayload {
    TaskStarted,
    StressLevelChanged {
        before: StressLevel,
        after: StressLevel,
    },
    SleepEntryCreated {
        date: NaiveDate,
        total_hours: f64,
        quality: SleepQuality,
    },
    SleepLatencyChanged {
        old_latency_secs: i64,
        new_latency_secs: i64,
    },
    NightAwakeningRecorded {
        awakening_number: u32,
    },
    PoorSleepQualityDetected {
        reason: PoorSleepReason,
    },
    DaytimeSleepinessChanged {
        old: DaytimeSleepiness,
        new: DaytimeSleepiness,
    },
    SleepQualityUpdated {
        old: SleepQuality,
        new: SleepQuality,
    },
}

impl EventPayload {
    /// Every kind tag this crate produces.
    pub const TYPES: [&'static str; 8] = [
        "TaskStarted",
        "StressLevelChanged",
        "SleepEntryCreated",
        "SleepLatencyChanged",
        "NightAwakeningRecorded",
        "PoorSleepQualityDetected",
        "DaytimeSleepinessChanged",
        "SleepQualityUpdated",
    ];

    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::TaskStarted => "TaskStarted",
            Self::StressLevelChanged { .. } => "StressLevelChanged",
            Self::SleepEntryCreated { .. } => "SleepEntryCreated",
            Self::SleepLatencyChanged { .. } => "SleepLatencyChanged",
            Self::NightAwakeningRecorded { .. } => "NightAwakeningRecorded",
            Self::PoorSleepQualityDetected { .. } => "PoorSleepQualityDetected",
            Self::DaytimeSleepinessChanged { .. } => "DaytimeSleepinessChanged",
            Self::SleepQualityUpdated { .. } => "SleepQualityUpdated",
        }
    }
}

/// Why a night was flagged as poor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PoorSleepReason {
    MultipleAwakenings { awakenings: u32 },
    LowQualityRating { quality: SleepQuality },
}

impl std::fmt::Display for PoorSleepReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MultipleAwakenings { .. } => f.write_str("multiple night awakenings"),
            Self::LowQualityRating { .. } => f.write_str("low quality rating"),
        }
    }
}

/// Ordered, owned buffer of events not yet handed to a publisher.
///
/// Only the owning entity can append; everyone else can look or drain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventBuffer {
    pending: Vec<DomainEvent>,
}

impl EventBuffer {
    pub(crate) fn record(&mut self, event: DomainEvent) {
        self.pending.push(event);
    }

    /// Events recorded so far, oldest first.
    #[must_use]
    pub fn pending(&self) -> &[DomainEvent] {
        &self.pending
    }

    /// Move every pending event out, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.pending)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Shared event-recording capability of every entity.
pub trait EventSource {
    fn event_buffer(&self) -> &EventBuffer;

    fn event_buffer_mut(&mut self) -> &mut EventBuffer;

    /// Read-only view of the buffered events, oldest first.
    fn events(&self) -> &[DomainEvent] {
        self.event_buffer().pending()
    }

    /// Discard every buffered event.
    fn clear_events(&mut self) {
        self.event_buffer_mut().drain();
    }

    /// Take every buffered event, leaving none behind.
    fn drain_events(&mut self) -> Vec<DomainEvent> {
        self.event_buffer_mut().drain()
    }
}

/// An entity addressed by identity and stored per calendar day.
pub trait Aggregate: EventSource + Clone + Send + Sync + 'static {
    type Id: Clone + Eq + Ord + std::hash::Hash + std::fmt::Display + Send + Sync + 'static;

    /// Resource name used in errors and logs.
    const KIND: &'static str;

    fn id(&self) -> &Self::Id;

    fn date(&self) -> NaiveDate;
}
