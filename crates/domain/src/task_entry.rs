//! Task entry: one day's key task, how it went and how it felt.

use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::category::TaskCategory;
use crate::error::{RuleViolation, TrackerError};
use crate::event::{Aggregate, DomainEvent, EventBuffer, EventPayload, EventSource};
use crate::id::TaskEntryId;
use crate::level::{EnergyLevel, MoodLevel, StressLevel};
use crate::time::{Timestamp, duration_secs, now};

/// Record of a single day's key task.
///
/// Created in the "not started" state. [`start`](Self::start) may succeed only
/// once, and the active duration can only be recorded afterwards.
///
/// Serialized entries leave their event buffer behind. Deserializing checks
/// the same rules as the constructor and mutators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TaskEntryRecord")]
pub struct TaskEntry {
    id: TaskEntryId,
    date: NaiveDate,
    day_number: u32,
    key_task: String,
    category: TaskCategory,
    stress_before: StressLevel,
    started: bool,
    start_time: Option<Timestamp>,
    #[serde(with = "duration_secs")]
    active_duration: TimeDelta,
    continued_after: bool,
    stress_after: StressLevel,
    #[serde(with = "duration_secs")]
    distractions: TimeDelta,
    blocks_completed: u32,
    pomodoro_count: u32,
    #[serde(with = "duration_secs")]
    light_exposure: TimeDelta,
    energy: EnergyLevel,
    mood: MoodLevel,
    notes: String,
    #[serde(skip)]
    events: EventBuffer,
}

#[derive(Deserialize)]
struct TaskEntryRecord {
    id: TaskEntryId,
    date: NaiveDate,
    day_number: u32,
    key_task: String,
    category: TaskCategory,
    stress_before: StressLevel,
    started: bool,
    start_time: Option<Timestamp>,
    #[serde(with = "duration_secs")]
    active_duration: TimeDelta,
    continued_after: bool,
    stress_after: StressLevel,
    #[serde(with = "duration_secs")]
    distractions: TimeDelta,
    blocks_completed: u32,
    pomodoro_count: u32,
    #[serde(with = "duration_secs")]
    light_exposure: TimeDelta,
    energy: EnergyLevel,
    mood: MoodLevel,
    notes: String,
}

impl TryFrom<TaskEntryRecord> for TaskEntry {
    type Error = TrackerError;

    fn try_from(record: TaskEntryRecord) -> Result<Self, Self::Error> {
        let mut entry = Self::new(
            record.id,
            record.date,
            record.day_number,
            record.key_task,
            record.category,
            record.stress_before,
        )?;
        entry.started = record.started;
        entry.start_time = record.start_time;
        if record.active_duration != TimeDelta::zero() {
            entry.update_duration(record.active_duration)?;
        }
        entry.continued_after = record.continued_after;
        entry.stress_after = record.stress_after;
        entry.set_distractions(record.distractions)?;
        entry.blocks_completed = record.blocks_completed;
        entry.pomodoro_count = record.pomodoro_count;
        entry.set_light_exposure(record.light_exposure)?;
        entry.energy = record.energy;
        entry.mood = record.mood;
        entry.notes = record.notes;
        Ok(entry)
    }
}

impl TaskEntry {
    /// Create a new, not yet started entry.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::DomainRule`] when:
    /// - `key_task` is empty ([`RuleViolation::EmptyKeyTask`])
    /// - `day_number` is zero ([`RuleViolation::InvalidDayNumber`])
    pub fn new(
        id: TaskEntryId,
        date: NaiveDate,
        day_number: u32,
        key_task: impl Into<String>,
        category: TaskCategory,
        stress_before: StressLevel,
    ) -> Result<Self, TrackerError> {
        let key_task = key_task.into();
        if key_task.is_empty() {
            return Err(RuleViolation::EmptyKeyTask.into());
        }
        if day_number < 1 {
            return Err(RuleViolation::InvalidDayNumber(day_number).into());
        }

        Ok(Self {
            id,
            date,
            day_number,
            key_task,
            category,
            stress_before,
            started: false,
            start_time: None,
            active_duration: TimeDelta::zero(),
            continued_after: false,
            stress_after: StressLevel::default(),
            distractions: TimeDelta::zero(),
            blocks_completed: 0,
            pomodoro_count: 0,
            light_exposure: TimeDelta::zero(),
            energy: EnergyLevel::default(),
            mood: MoodLevel::default(),
            notes: String::new(),
            events: EventBuffer::default(),
        })
    }

    #[must_use]
    pub fn id(&self) -> &TaskEntryId {
        &self.id
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn day_number(&self) -> u32 {
        self.day_number
    }

    #[must_use]
    pub fn key_task(&self) -> &str {
        &self.key_task
    }

    #[must_use]
    pub fn category(&self) -> TaskCategory {
        self.category
    }

    #[must_use]
    pub fn stress_before(&self) -> StressLevel {
        self.stress_before
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    #[must_use]
    pub fn start_time(&self) -> Option<Timestamp> {
        self.start_time
    }

    #[must_use]
    pub fn active_duration(&self) -> TimeDelta {
        self.active_duration
    }

    #[must_use]
    pub fn continued_after(&self) -> bool {
        self.continued_after
    }

    #[must_use]
    pub fn stress_after(&self) -> StressLevel {
        self.stress_after
    }

    #[must_use]
    pub fn distractions(&self) -> TimeDelta {
        self.distractions
    }

    #[must_use]
    pub fn blocks_completed(&self) -> u32 {
        self.blocks_completed
    }

    #[must_use]
    pub fn pomodoro_count(&self) -> u32 {
        self.pomodoro_count
    }

    #[must_use]
    pub fn light_exposure(&self) -> TimeDelta {
        self.light_exposure
    }

    #[must_use]
    pub fn energy(&self) -> EnergyLevel {
        self.energy
    }

    #[must_use]
    pub fn mood(&self) -> MoodLevel {
        self.mood
    }

    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Start the task now.
    ///
    /// # Errors
    ///
    /// Returns [`RuleViolation::TaskAlreadyStarted`] on any call after the
    /// first successful one. Starting is not idempotent.
    pub fn start(&mut self) -> Result<(), TrackerError> {
        self.start_at(now())
    }

    /// Start the task at `at`, recording a `TaskStarted` event.
    ///
    /// # Errors
    ///
    /// Returns [`RuleViolation::TaskAlreadyStarted`] if the task was started before.
    pub fn start_at(&mut self, at: Timestamp) -> Result<(), TrackerError> {
        if self.started {
            return Err(RuleViolation::TaskAlreadyStarted.into());
        }
        self.started = true;
        self.start_time = Some(at);
        self.record(EventPayload::TaskStarted, at);
        Ok(())
    }

    /// Set how long the task was actively worked on.
    ///
    /// # Errors
    ///
    /// Returns [`RuleViolation::TaskNotStarted`] before [`start`](Self::start),
    /// or [`RuleViolation::NegativeDuration`] for a negative `duration`.
    pub fn update_duration(&mut self, duration: TimeDelta) -> Result<(), TrackerError> {
        if !self.started {
            return Err(RuleViolation::TaskNotStarted.into());
        }
        self.active_duration = non_negative("active_duration", duration)?;
        Ok(())
    }

    /// Record the stress level felt after the task.
    ///
    /// Always records a `StressLevelChanged` event, even when the level is
    /// unchanged.
    pub fn set_stress_after(&mut self, level: StressLevel) {
        self.stress_after = level;
        self.record(
            EventPayload::StressLevelChanged {
                before: self.stress_before,
                after: level,
            },
            now(),
        );
    }

    /// Stress before minus stress after. Negative when stress went up.
    #[must_use]
    pub fn calculate_stress_reduction(&self) -> i32 {
        i32::from(self.stress_before.value()) - i32::from(self.stress_after.value())
    }

    pub fn set_continued_after(&mut self, continued: bool) {
        self.continued_after = continued;
    }

    /// # Errors
    ///
    /// Returns [`RuleViolation::NegativeDuration`] for a negative `duration`.
    pub fn set_distractions(&mut self, duration: TimeDelta) -> Result<(), TrackerError> {
        self.distractions = non_negative("distractions", duration)?;
        Ok(())
    }

    pub fn set_blocks_completed(&mut self, blocks: u32) {
        self.blocks_completed = blocks;
    }

    pub fn set_pomodoro_count(&mut self, count: u32) {
        self.pomodoro_count = count;
    }

    /// # Errors
    ///
    /// Returns [`RuleViolation::NegativeDuration`] for a negative `duration`.
    pub fn set_light_exposure(&mut self, duration: TimeDelta) -> Result<(), TrackerError> {
        self.light_exposure = non_negative("light_exposure", duration)?;
        Ok(())
    }

    pub fn set_energy(&mut self, energy: EnergyLevel) {
        self.energy = energy;
    }

    pub fn set_mood(&mut self, mood: MoodLevel) {
        self.mood = mood;
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    fn record(&mut self, payload: EventPayload, at: Timestamp) {
        let event = DomainEvent::at(self.id.as_str(), payload, at);
        self.events.record(event);
    }
}

pub(crate) fn non_negative(
    field: &'static str,
    duration: TimeDelta,
) -> Result<TimeDelta, TrackerError> {
    if duration < TimeDelta::zero() {
        return Err(RuleViolation::NegativeDuration { field }.into());
    }
    Ok(duration)
}

impl EventSource for TaskEntry {
    fn event_buffer(&self) -> &EventBuffer {
        &self.events
    }

    fn event_buffer_mut(&mut self) -> &mut EventBuffer {
        &mut self.events
    }
}

impl Aggregate for TaskEntry {
    type Id = TaskEntryId;

    const KIND: &'static str = "TaskEntry";

    fn id(&self) -> &TaskEntryId {
        &self.id
    }

    fn date(&self) -> NaiveDate {
        self.date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn stress(raw: i64) -> StressLevel {
        StressLevel::new(raw).unwrap()
    }

    fn make_entry() -> TaskEntry {
        TaskEntry::new(
            TaskEntryId::new("test-id-123"),
            date(),
            1,
            "Write the tests",
            TaskCategory::Work,
            stress(7),
        )
        .unwrap()
    }

    #[test]
    fn should_create_not_started_entry_without_events() {
        let entry = make_entry();
        assert_eq!(entry.id().as_str(), "test-id-123");
        assert_eq!(entry.key_task(), "Write the tests");
        assert_eq!(entry.day_number(), 1);
        assert_eq!(entry.category(), TaskCategory::Work);
        assert!(!entry.is_started());
        assert!(entry.start_time().is_none());
        assert_eq!(entry.active_duration(), TimeDelta::zero());
        assert!(entry.events().is_empty());
    }

    #[test]
    fn should_reject_empty_key_task() {
        let result = TaskEntry::new(
            TaskEntryId::new("t"),
            date(),
            1,
            "",
            TaskCategory::Work,
            stress(5),
        );
        assert!(matches!(
            result,
            Err(TrackerError::DomainRule(RuleViolation::EmptyKeyTask))
        ));
    }

    #[test]
    fn should_reject_day_number_zero() {
        let result = TaskEntry::new(
            TaskEntryId::new("t"),
            date(),
            0,
            "Test task",
            TaskCategory::Work,
            stress(5),
        );
        assert!(matches!(
            result,
            Err(TrackerError::DomainRule(RuleViolation::InvalidDayNumber(0)))
        ));
    }

    #[test]
    fn should_record_single_event_when_started() {
        let mut entry = make_entry();
        entry.start().unwrap();

        assert!(entry.is_started());
        assert!(entry.start_time().is_some());
        assert_eq!(entry.events().len(), 1);
        let event = &entry.events()[0];
        assert_eq!(event.event_type(), "TaskStarted");
        assert_eq!(event.aggregate_id, "test-id-123");
        assert_eq!(Some(event.occurred_at), entry.start_time());
    }

    #[test]
    fn should_fail_without_new_event_when_started_twice() {
        let mut entry = make_entry();
        entry.start().unwrap();
        let first_start = entry.start_time();

        let result = entry.start();
        assert!(matches!(
            result,
            Err(TrackerError::DomainRule(RuleViolation::TaskAlreadyStarted))
        ));
        assert_eq!(entry.events().len(), 1);
        assert_eq!(entry.start_time(), first_start);
    }

    #[test]
    fn should_reject_duration_update_before_start() {
        let mut entry = make_entry();
        let result = entry.update_duration(TimeDelta::minutes(30));
        assert!(matches!(
            result,
            Err(TrackerError::DomainRule(RuleViolation::TaskNotStarted))
        ));
        assert_eq!(entry.active_duration(), TimeDelta::zero());
    }

    #[test]
    fn should_reject_negative_duration_and_keep_previous() {
        let mut entry = make_entry();
        entry.start().unwrap();
        entry.update_duration(TimeDelta::minutes(20)).unwrap();

        let result = entry.update_duration(TimeDelta::minutes(-1));
        assert!(matches!(
            result,
            Err(TrackerError::DomainRule(RuleViolation::NegativeDuration { .. }))
        ));
        assert_eq!(entry.active_duration(), TimeDelta::minutes(20));
    }

    #[test]
    fn should_set_duration_exactly_once_started() {
        let mut entry = make_entry();
        entry.start().unwrap();
        entry.update_duration(TimeDelta::minutes(45)).unwrap();
        assert_eq!(entry.active_duration(), TimeDelta::minutes(45));
        entry.update_duration(TimeDelta::zero()).unwrap();
        assert_eq!(entry.active_duration(), TimeDelta::zero());
        assert_eq!(entry.events().len(), 1);
    }

    #[test]
    fn should_record_stress_change_even_when_unchanged() {
        let mut entry = make_entry();
        entry.set_stress_after(stress(3));
        entry.set_stress_after(stress(3));

        assert_eq!(entry.events().len(), 2);
        for event in entry.events() {
            assert_eq!(
                event.payload,
                EventPayload::StressLevelChanged {
                    before: stress(7),
                    after: stress(3),
                }
            );
        }
    }

    #[test]
    fn should_compute_stress_reduction_including_negative() {
        let mut entry = make_entry();
        entry.set_stress_after(stress(3));
        assert_eq!(entry.calculate_stress_reduction(), 4);

        entry.set_stress_after(stress(10));
        assert_eq!(entry.calculate_stress_reduction(), -3);
    }

    #[test]
    fn should_accumulate_until_cleared() {
        let mut entry = make_entry();
        entry.start().unwrap();
        entry.set_stress_after(stress(2));
        assert_eq!(entry.events().len(), 2);
        assert_eq!(entry.events().len(), 2);

        entry.clear_events();
        assert!(entry.events().is_empty());
    }

    #[test]
    fn should_hand_out_events_once_when_drained() {
        let mut entry = make_entry();
        entry.start().unwrap();
        entry.set_stress_after(stress(2));

        let drained = entry.drain_events();
        let types: Vec<_> = drained.iter().map(DomainEvent::event_type).collect();
        assert_eq!(types, ["TaskStarted", "StressLevelChanged"]);
        assert!(entry.drain_events().is_empty());
    }

    #[test]
    fn should_reject_negative_side_durations() {
        let mut entry = make_entry();
        assert!(entry.set_distractions(TimeDelta::minutes(-5)).is_err());
        assert!(entry.set_light_exposure(TimeDelta::seconds(-1)).is_err());

        entry.set_distractions(TimeDelta::minutes(5)).unwrap();
        entry.set_light_exposure(TimeDelta::minutes(40)).unwrap();
        assert_eq!(entry.distractions(), TimeDelta::minutes(5));
        assert_eq!(entry.light_exposure(), TimeDelta::minutes(40));
    }

    #[test]
    fn should_update_plain_attributes_without_events() {
        let mut entry = make_entry();
        entry.set_continued_after(true);
        entry.set_blocks_completed(3);
        entry.set_pomodoro_count(4);
        entry.set_energy(EnergyLevel::new(2).unwrap());
        entry.set_mood(MoodLevel::new(8).unwrap());
        entry.set_notes("felt good");

        assert!(entry.continued_after());
        assert_eq!(entry.blocks_completed(), 3);
        assert_eq!(entry.pomodoro_count(), 4);
        assert!(entry.energy().is_low());
        assert!(entry.mood().is_positive());
        assert_eq!(entry.notes(), "felt good");
        assert!(entry.events().is_empty());
    }

    #[test]
    fn should_restore_serialized_entry_without_events() {
        let mut entry = make_entry();
        entry.start().unwrap();
        entry.update_duration(TimeDelta::minutes(45)).unwrap();
        entry.set_stress_after(stress(3));
        entry.set_pomodoro_count(2);

        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("events").is_none());
        assert_eq!(json["active_duration"], 2700);

        let restored: TaskEntry = serde_json::from_value(json).unwrap();
        assert!(restored.events().is_empty());
        assert_eq!(restored.start_time(), entry.start_time());
        assert_eq!(restored.active_duration(), TimeDelta::minutes(45));
        assert_eq!(restored.calculate_stress_reduction(), 2);
        assert_eq!(restored.pomodoro_count(), 2);
    }

    #[test]
    fn should_refuse_to_deserialize_invalid_entry() {
        let mut json = serde_json::to_value(make_entry()).unwrap();
        json["key_task"] = "".into();
        assert!(serde_json::from_value::<TaskEntry>(json).is_err());

        let mut json = serde_json::to_value(make_entry()).unwrap();
        json["active_duration"] = 600.into();
        assert!(serde_json::from_value::<TaskEntry>(json).is_err());
    }
}
