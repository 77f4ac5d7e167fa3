//! Sleep service: use-cases for nightly sleep entries.

use std::path::Path;

use chrono::{NaiveDate, TimeDelta};

use daily_tracker_domain::error::{RuleViolation, TrackerError};
use daily_tracker_domain::id::SleepEntryId;
use daily_tracker_domain::level::{DaytimeSleepiness, SleepQuality};
use daily_tracker_domain::sleep_entry::SleepEntry;

use super::commit;
use crate::ports::{EntryBackup, EntryRepository, EventPublisher};

/// Application service for sleep entries.
pub struct SleepService<R, P> {
    repo: R,
    publisher: P,
}

impl<R: EntryRepository<SleepEntry>, P: EventPublisher> SleepService<R, P> {
    /// Create a new service backed by the given repository and publisher.
    pub fn new(repo: R, publisher: P) -> Self {
        Self { repo, publisher }
    }

    /// Store a newly created night and publish its `SleepEntryCreated` event.
    ///
    /// # Errors
    ///
    /// Returns [`RuleViolation::DuplicateId`] when an entry with the same id is
    /// already stored, or a storage error propagated from the repository.
    #[tracing::instrument(skip(self, entry), fields(sleep_id = %entry.id()))]
    pub async fn log_sleep(&self, entry: SleepEntry) -> Result<SleepEntry, TrackerError> {
        if self.repo.exists(entry.id()).await? {
            return Err(RuleViolation::DuplicateId {
                entity: "SleepEntry",
                id: entry.id().to_string(),
            }
            .into());
        }
        let entry = commit(&self.repo, &self.publisher, entry).await?;
        tracing::info!(
            hours = entry.total_sleep_hours(),
            healthy = entry.is_sleep_healthy(),
            "sleep logged"
        );
        Ok(entry)
    }

    /// Look up a sleep entry by id.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NotFound`] when no entry with `id` exists,
    /// or a storage error from the repository.
    pub async fn get_sleep(&self, id: &SleepEntryId) -> Result<SleepEntry, TrackerError> {
        self.repo.find_by_id(id).await
    }

    /// # Errors
    ///
    /// Returns [`TrackerError::NotFound`] for an unknown id,
    /// [`RuleViolation::NegativeSleepLatency`] or
    /// [`RuleViolation::SleepLatencyTooLong`] for an out-of-range latency, or a
    /// storage error.
    #[tracing::instrument(skip(self))]
    pub async fn set_sleep_latency(
        &self,
        id: &SleepEntryId,
        latency: TimeDelta,
    ) -> Result<SleepEntry, TrackerError> {
        let mut entry = self.repo.find_by_id(id).await?;
        entry.set_sleep_latency(latency)?;
        commit(&self.repo, &self.publisher, entry).await
    }

    /// # Errors
    ///
    /// Returns [`TrackerError::NotFound`] for an unknown id, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn record_night_awakening(
        &self,
        id: &SleepEntryId,
    ) -> Result<SleepEntry, TrackerError> {
        let mut entry = self.repo.find_by_id(id).await?;
        entry.record_night_awakening();
        let entry = commit(&self.repo, &self.publisher, entry).await?;
        tracing::info!(awakenings = entry.night_awakenings(), "night awakening recorded");
        Ok(entry)
    }

    /// # Errors
    ///
    /// Returns [`TrackerError::NotFound`] for an unknown id, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn set_daytime_sleepiness(
        &self,
        id: &SleepEntryId,
        sleepiness: DaytimeSleepiness,
    ) -> Result<SleepEntry, TrackerError> {
        let mut entry = self.repo.find_by_id(id).await?;
        entry.set_daytime_sleepiness(sleepiness);
        commit(&self.repo, &self.publisher, entry).await
    }

    /// # Errors
    ///
    /// Returns [`TrackerError::NotFound`] for an unknown id, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn update_sleep_quality(
        &self,
        id: &SleepEntryId,
        quality: SleepQuality,
    ) -> Result<SleepEntry, TrackerError> {
        let mut entry = self.repo.find_by_id(id).await?;
        entry.update_sleep_quality(quality);
        commit(&self.repo, &self.publisher, entry).await
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn sleep_on(&self, date: NaiveDate) -> Result<Vec<SleepEntry>, TrackerError> {
        self.repo.find_by_date(date).await
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn sleep_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SleepEntry>, TrackerError> {
        self.repo.find_by_date_range(start, end).await
    }

    /// # Errors
    ///
    /// Returns [`TrackerError::NotFound`] for an unknown id, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn delete_sleep(&self, id: &SleepEntryId) -> Result<(), TrackerError> {
        self.repo.delete(id).await
    }
}

impl<R, P> SleepService<R, P>
where
    R: EntryRepository<SleepEntry> + EntryBackup<SleepEntry>,
    P: EventPublisher,
{
    /// Write every stored night to `path`.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the backup cannot be written.
    #[tracing::instrument(skip(self))]
    pub async fn backup(&self, path: &Path) -> Result<usize, TrackerError> {
        let written = self.repo.backup(path).await?;
        tracing::info!(written, "nights backed up");
        Ok(written)
    }

    /// Replace the stored nights with a backup. Restoring publishes no events.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the backup cannot be read or holds an
    /// invalid night; the stored nights are unchanged then.
    #[tracing::instrument(skip(self))]
    pub async fn restore(&self, path: &Path) -> Result<usize, TrackerError> {
        let restored = self.repo.restore(path).await?;
        tracing::info!(restored, "nights restored");
        Ok(restored)
    }
}
