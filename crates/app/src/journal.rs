//! Journal rows: raw, spreadsheet-like records turned into entries.
//!
//! Rows carry plain values: integers for levels, strings for categories and
//! `HH:MM` clock times, whole minutes for durations. Converting a row checks
//! every field and reports the first malformed one by name.

use chrono::{NaiveDate, NaiveTime, TimeDelta};
use serde::Deserialize;

use daily_tracker_domain::category::TaskCategory;
use daily_tracker_domain::error::{TrackerError, ValidationError};
use daily_tracker_domain::id::{SleepEntryId, TaskEntryId};
use daily_tracker_domain::level::{
    DaytimeSleepiness, EnergyLevel, MoodLevel, SleepQuality, StressLevel,
};
use daily_tracker_domain::sleep_entry::SleepEntry;
use daily_tracker_domain::task_entry::TaskEntry;

const DATE_FORMAT: &str = "%Y-%m-%d";
const CLOCK_FORMAT: &str = "%H:%M";

/// Most awakenings a single night row may report.
pub const MAX_AWAKENINGS: u32 = 24;

/// A whole journal: `[[task]]` and `[[sleep]]` tables.
#[derive(Debug, Default, Deserialize)]
pub struct Journal {
    #[serde(default, rename = "task")]
    pub tasks: Vec<TaskRow>,
    #[serde(default, rename = "sleep")]
    pub nights: Vec<SleepRow>,
}

/// One day's key task as written down.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskRow {
    pub id: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    pub day: i64,
    pub key_task: String,
    pub category: String,
    pub stress_before: i64,
    /// `HH:MM` on `date`, UTC.
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub active_minutes: Option<i64>,
    #[serde(default)]
    pub continued_after: bool,
    #[serde(default)]
    pub stress_after: Option<i64>,
    #[serde(default)]
    pub distraction_minutes: i64,
    #[serde(default)]
    pub blocks_completed: i64,
    #[serde(default)]
    pub pomodoros: i64,
    #[serde(default)]
    pub light_minutes: i64,
    #[serde(default)]
    pub energy: Option<i64>,
    #[serde(default)]
    pub mood: Option<i64>,
    #[serde(default)]
    pub notes: String,
}

/// One night as written down the next morning.
#[derive(Debug, Clone, Deserialize)]
pub struct SleepRow {
    pub id: String,
    pub date: String,
    /// `HH:MM`.
    pub bedtime: String,
    /// `HH:MM`; earlier than `bedtime` means the next day.
    pub wake_time: String,
    pub quality: i64,
    #[serde(default)]
    pub latency_minutes: Option<i64>,
    #[serde(default)]
    pub awakenings: i64,
    #[serde(default)]
    pub daytime_sleepiness: Option<i64>,
    #[serde(default)]
    pub caffeine_after_noon: bool,
    #[serde(default)]
    pub screen_minutes: i64,
    #[serde(default)]
    pub free_time_minutes: i64,
    #[serde(default)]
    pub notes: String,
}

impl TaskRow {
    /// Validate the row and build the entry it describes.
    ///
    /// A `started_at` time starts the entry, so the result may carry a
    /// buffered `TaskStarted` event, and a `stress_after` value a
    /// `StressLevelChanged` one.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Validation`] naming the malformed field, or the
    /// [`TrackerError::DomainRule`] raised by the entry itself.
    pub fn into_entry(self) -> Result<TaskEntry, TrackerError> {
        let id = parse_id("id", &self.id)?;
        let date = parse_date("date", &self.date)?;
        let day = u32::try_from(self.day)
            .map_err(|_| ValidationError::new("day", "must be a positive day number"))?;
        let category = TaskCategory::parse(&self.category)?;
        let stress_before = StressLevel::new(self.stress_before)?;

        let mut entry = TaskEntry::new(
            TaskEntryId::new(id),
            date,
            day,
            self.key_task,
            category,
            stress_before,
        )?;

        if let Some(raw) = self.started_at.as_deref() {
            let clock = parse_clock("started_at", raw)?;
            entry.start_at(date.and_time(clock).and_utc())?;
        }
        if let Some(active) = self.active_minutes {
            entry.update_duration(minutes("active_minutes", active)?)?;
        }
        entry.set_continued_after(self.continued_after);
        if let Some(after) = self.stress_after {
            entry.set_stress_after(StressLevel::new(after)?);
        }
        entry.set_distractions(minutes("distraction_minutes", self.distraction_minutes)?)?;
        entry.set_blocks_completed(count("blocks_completed", self.blocks_completed)?);
        entry.set_pomodoro_count(count("pomodoros", self.pomodoros)?);
        entry.set_light_exposure(minutes("light_minutes", self.light_minutes)?)?;
        if let Some(energy) = self.energy {
            entry.set_energy(EnergyLevel::new(energy)?);
        }
        if let Some(mood) = self.mood {
            entry.set_mood(MoodLevel::new(mood)?);
        }
        entry.set_notes(self.notes);
        Ok(entry)
    }
}

impl SleepRow {
    /// Validate the row and build the night it describes.
    ///
    /// Awakenings are replayed one by one, so three or more leave a
    /// `PoorSleepQualityDetected` event in the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Validation`] naming the malformed field, or the
    /// [`TrackerError::DomainRule`] raised by the entry itself.
    pub fn into_entry(self) -> Result<SleepEntry, TrackerError> {
        let id = parse_id("id", &self.id)?;
        let awakenings = count("awakenings", self.awakenings)?;
        if awakenings > MAX_AWAKENINGS {
            return Err(ValidationError::new(
                "awakenings",
                format!("at most {MAX_AWAKENINGS} per night"),
            )
            .into());
        }
        let date = parse_date("date", &self.date)?;
        let bedtime = date.and_time(parse_clock("bedtime", &self.bedtime)?);
        let mut wake_time = date.and_time(parse_clock("wake_time", &self.wake_time)?);
        if wake_time < bedtime {
            wake_time = wake_time
                .checked_add_signed(TimeDelta::days(1))
                .ok_or_else(|| ValidationError::new("wake_time", "date out of range"))?;
        }
        let quality = SleepQuality::new(self.quality)?;

        let mut entry = SleepEntry::new(SleepEntryId::new(id), date, bedtime, wake_time, quality)?;

        if let Some(latency) = self.latency_minutes {
            entry.set_sleep_latency(minutes("latency_minutes", latency)?)?;
        }
        for _ in 0..awakenings {
            entry.record_night_awakening();
        }
        if let Some(sleepiness) = self.daytime_sleepiness {
            entry.set_daytime_sleepiness(DaytimeSleepiness::new(sleepiness)?);
        }
        entry.set_caffeine_after_noon(self.caffeine_after_noon);
        entry.set_screen_use_before_bed(minutes("screen_minutes", self.screen_minutes)?)?;
        entry.set_evening_free_time(minutes("free_time_minutes", self.free_time_minutes)?)?;
        entry.set_notes(self.notes);
        Ok(entry)
    }
}

fn parse_id<'a>(field: &'static str, raw: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(trimmed)
}

fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|err| ValidationError::new(field, format!("expected YYYY-MM-DD: {err}")))
}

fn parse_clock(field: &'static str, raw: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(raw.trim(), CLOCK_FORMAT)
        .map_err(|err| ValidationError::new(field, format!("expected HH:MM: {err}")))
}

fn count(field: &'static str, raw: i64) -> Result<u32, ValidationError> {
    u32::try_from(raw).map_err(|_| ValidationError::new(field, "must be a non-negative count"))
}

fn minutes(field: &'static str, raw: i64) -> Result<TimeDelta, ValidationError> {
    TimeDelta::try_minutes(raw).ok_or_else(|| ValidationError::new(field, "duration out of range"))
}
