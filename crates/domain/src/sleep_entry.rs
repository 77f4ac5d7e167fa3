//! Sleep entry: one night of sleep and how the next day felt.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::{RuleViolation, TrackerError};
use crate::event::{Aggregate, DomainEvent, EventBuffer, EventPayload, EventSource, PoorSleepReason};
use crate::id::SleepEntryId;
use crate::level::{DaytimeSleepiness, SleepQuality};
use crate::task_entry::non_negative;
use crate::time::{as_hours, duration_secs};

/// Longest accepted time to fall asleep, in minutes.
pub const MAX_SLEEP_LATENCY_MINUTES: i64 = 120;

/// Awakenings from which a night is flagged as poor.
pub const POOR_SLEEP_AWAKENINGS: u32 = 3;

/// Minimum change in daytime sleepiness worth an event.
pub const SLEEPINESS_CHANGE_THRESHOLD: u8 = 3;

/// Record of a single night.
///
/// `total_sleep_hours` is derived from bedtime, wake time and sleep latency
/// when the entry is created. A deserialized entry keeps the stored value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SleepEntryRecord")]
pub struct SleepEntry {
    id: SleepEntryId,
    date: NaiveDate,
    bedtime: NaiveDateTime,
    wake_time: NaiveDateTime,
    #[serde(with = "duration_secs")]
    sleep_latency: TimeDelta,
    night_awakenings: u32,
    total_sleep_hours: f64,
    sleep_quality: SleepQuality,
    daytime_sleepiness: DaytimeSleepiness,
    caffeine_after_noon: bool,
    #[serde(with = "duration_secs")]
    screen_use_before_bed: TimeDelta,
    #[serde(with = "duration_secs")]
    evening_free_time: TimeDelta,
    notes: String,
    #[serde(skip)]
    events: EventBuffer,
}

#[derive(Deserialize)]
struct SleepEntryRecord {
    id: SleepEntryId,
    date: NaiveDate,
    bedtime: NaiveDateTime,
    wake_time: NaiveDateTime,
    #[serde(with = "duration_secs")]
    sleep_latency: TimeDelta,
    night_awakenings: u32,
    total_sleep_hours: f64,
    sleep_quality: SleepQuality,
    daytime_sleepiness: DaytimeSleepiness,
    caffeine_after_noon: bool,
    #[serde(with = "duration_secs")]
    screen_use_before_bed: TimeDelta,
    #[serde(with = "duration_secs")]
    evening_free_time: TimeDelta,
    notes: String,
}

impl TryFrom<SleepEntryRecord> for SleepEntry {
    type Error = TrackerError;

    fn try_from(record: SleepEntryRecord) -> Result<Self, Self::Error> {
        check_wake_time(record.bedtime, record.wake_time)?;
        check_latency(record.sleep_latency)?;
        Ok(Self {
            id: record.id,
            date: record.date,
            bedtime: record.bedtime,
            wake_time: record.wake_time,
            sleep_latency: record.sleep_latency,
            night_awakenings: record.night_awakenings,
            total_sleep_hours: record.total_sleep_hours,
            sleep_quality: record.sleep_quality,
            daytime_sleepiness: record.daytime_sleepiness,
            caffeine_after_noon: record.caffeine_after_noon,
            screen_use_before_bed: non_negative(
                "screen_use_before_bed",
                record.screen_use_before_bed,
            )?,
            evening_free_time: non_negative("evening_free_time", record.evening_free_time)?,
            notes: record.notes,
            events: EventBuffer::default(),
        })
    }
}

impl SleepEntry {
    /// Create a sleep entry and record a `SleepEntryCreated` event.
    ///
    /// A wake time earlier than bedtime is read as waking up the next day.
    ///
    /// # Errors
    ///
    /// Returns [`RuleViolation::WakeBeforeBedtime`] when `wake_time` is still
    /// before `bedtime` after rolling it over by a full day.
    pub fn new(
        id: SleepEntryId,
        date: NaiveDate,
        bedtime: NaiveDateTime,
        wake_time: NaiveDateTime,
        sleep_quality: SleepQuality,
    ) -> Result<Self, TrackerError> {
        check_wake_time(bedtime, wake_time)?;

        let mut entry = Self {
            id,
            date,
            bedtime,
            wake_time,
            sleep_latency: TimeDelta::zero(),
            night_awakenings: 0,
            total_sleep_hours: 0.0,
            sleep_quality,
            daytime_sleepiness: DaytimeSleepiness::default(),
            caffeine_after_noon: false,
            screen_use_before_bed: TimeDelta::zero(),
            evening_free_time: TimeDelta::zero(),
            notes: String::new(),
            events: EventBuffer::default(),
        };
        entry.total_sleep_hours = entry.compute_total_sleep_hours();
        entry.record(EventPayload::SleepEntryCreated {
            date,
            total_hours: entry.total_sleep_hours,
            quality: sleep_quality,
        });
        Ok(entry)
    }

    #[must_use]
    pub fn id(&self) -> &SleepEntryId {
        &self.id
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn bedtime(&self) -> NaiveDateTime {
        self.bedtime
    }

    #[must_use]
    pub fn wake_time(&self) -> NaiveDateTime {
        self.wake_time
    }

    #[must_use]
    pub fn sleep_latency(&self) -> TimeDelta {
        self.sleep_latency
    }

    #[must_use]
    pub fn night_awakenings(&self) -> u32 {
        self.night_awakenings
    }

    #[must_use]
    pub fn total_sleep_hours(&self) -> f64 {
        self.total_sleep_hours
    }

    #[must_use]
    pub fn sleep_quality(&self) -> SleepQuality {
        self.sleep_quality
    }

    #[must_use]
    pub fn daytime_sleepiness(&self) -> DaytimeSleepiness {
        self.daytime_sleepiness
    }

    #[must_use]
    pub fn caffeine_after_noon(&self) -> bool {
        self.caffeine_after_noon
    }

    #[must_use]
    pub fn screen_use_before_bed(&self) -> TimeDelta {
        self.screen_use_before_bed
    }

    #[must_use]
    pub fn evening_free_time(&self) -> TimeDelta {
        self.evening_free_time
    }

    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Set how long it took to fall asleep.
    ///
    /// Records `SleepLatencyChanged` only when the value actually changes.
    /// The total sleep hours keep the value computed at creation.
    ///
    /// # Errors
    ///
    /// Returns [`RuleViolation::NegativeSleepLatency`] or
    /// [`RuleViolation::SleepLatencyTooLong`] when `latency` is outside
    /// `0..=2h`.
    pub fn set_sleep_latency(&mut self, latency: TimeDelta) -> Result<(), TrackerError> {
        check_latency(latency)?;

        let old = std::mem::replace(&mut self.sleep_latency, latency);
        if old != latency {
            self.record(EventPayload::SleepLatencyChanged {
                old_latency_secs: old.num_seconds(),
                new_latency_secs: latency.num_seconds(),
            });
        }
        Ok(())
    }

    /// Count one more awakening during the night.
    ///
    /// From the third awakening on, a `PoorSleepQualityDetected` event follows
    /// the `NightAwakeningRecorded` one.
    pub fn record_night_awakening(&mut self) {
        self.night_awakenings = self.night_awakenings.saturating_add(1);
        let awakenings = self.night_awakenings;

        self.record(EventPayload::NightAwakeningRecorded {
            awakening_number: awakenings,
        });
        if awakenings >= POOR_SLEEP_AWAKENINGS {
            self.record(EventPayload::PoorSleepQualityDetected {
                reason: PoorSleepReason::MultipleAwakenings { awakenings },
            });
        }
    }

    /// Record next-day sleepiness; only a swing of 3 or more is an event.
    pub fn set_daytime_sleepiness(&mut self, sleepiness: DaytimeSleepiness) {
        let old = std::mem::replace(&mut self.daytime_sleepiness, sleepiness);
        if old.value().abs_diff(sleepiness.value()) >= SLEEPINESS_CHANGE_THRESHOLD {
            self.record(EventPayload::DaytimeSleepinessChanged {
                old,
                new: sleepiness,
            });
        }
    }

    /// Replace the quality rating, flagging ratings of 3 and below.
    pub fn update_sleep_quality(&mut self, quality: SleepQuality) {
        let old = std::mem::replace(&mut self.sleep_quality, quality);
        self.record(EventPayload::SleepQualityUpdated { old, new: quality });
        if quality.value() <= 3 {
            self.record(EventPayload::PoorSleepQualityDetected {
                reason: PoorSleepReason::LowQualityRating { quality },
            });
        }
    }

    /// Between 7 and 9 hours, quality of at least 6, at most one awakening.
    #[must_use]
    pub fn is_sleep_healthy(&self) -> bool {
        (7.0..=9.0).contains(&self.total_sleep_hours)
            && self.sleep_quality.value() >= 6
            && self.night_awakenings <= 1
    }

    pub fn set_caffeine_after_noon(&mut self, caffeine: bool) {
        self.caffeine_after_noon = caffeine;
    }

    /// # Errors
    ///
    /// Returns [`RuleViolation::NegativeDuration`] for a negative `duration`.
    pub fn set_screen_use_before_bed(&mut self, duration: TimeDelta) -> Result<(), TrackerError> {
        self.screen_use_before_bed = non_negative("screen_use_before_bed", duration)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`RuleViolation::NegativeDuration`] for a negative `duration`.
    pub fn set_evening_free_time(&mut self, duration: TimeDelta) -> Result<(), TrackerError> {
        self.evening_free_time = non_negative("evening_free_time", duration)?;
        Ok(())
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    fn compute_total_sleep_hours(&self) -> f64 {
        let mut in_bed = self.wake_time - self.bedtime;
        if in_bed < TimeDelta::zero() {
            in_bed += TimeDelta::days(1);
        }
        as_hours(in_bed - self.sleep_latency)
    }

    fn record(&mut self, payload: EventPayload) {
        let event = DomainEvent::new(self.id.as_str(), payload);
        self.events.record(event);
    }
}

// A wake time that cannot be rolled over lies at the end of the calendar,
// so it is never before bedtime.
fn check_wake_time(bedtime: NaiveDateTime, wake_time: NaiveDateTime) -> Result<(), TrackerError> {
    match wake_time.checked_add_signed(TimeDelta::days(1)) {
        Some(rolled) if rolled < bedtime => Err(RuleViolation::WakeBeforeBedtime.into()),
        _ => Ok(()),
    }
}

fn check_latency(latency: TimeDelta) -> Result<(), TrackerError> {
    if latency < TimeDelta::zero() {
        return Err(RuleViolation::NegativeSleepLatency.into());
    }
    if latency > TimeDelta::minutes(MAX_SLEEP_LATENCY_MINUTES) {
        return Err(RuleViolation::SleepLatencyTooLong.into());
    }
    Ok(())
}

impl EventSource for SleepEntry {
    fn event_buffer(&self) -> &EventBuffer {
        &self.events
    }

    fn event_buffer_mut(&mut self) -> &mut EventBuffer {
        &mut self.events
    }
}

impl Aggregate for SleepEntry {
    type Id = SleepEntryId;

    const KIND: &'static str = "SleepEntry";

    fn id(&self) -> &SleepEntryId {
        &self.id
    }

    fn date(&self) -> NaiveDate {
        self.date
    }
}
