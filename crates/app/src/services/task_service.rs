//! Task service: use-cases for daily task entries.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{NaiveDate, TimeDelta};

use daily_tracker_domain::category::TaskCategory;
use daily_tracker_domain::error::{RuleViolation, TrackerError};
use daily_tracker_domain::id::TaskEntryId;
use daily_tracker_domain::level::StressLevel;
use daily_tracker_domain::task_entry::TaskEntry;

use super::commit;
use crate::ports::{EntryBackup, EntryRepository, EventPublisher, TaskStatistics};

/// Application service for task entries.
pub struct TaskService<R, P> {
    repo: R,
    publisher: P,
}

/// Figures over the tasks of a date range.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSummary {
    pub per_category: BTreeMap<TaskCategory, usize>,
    pub average_stress_reduction: f64,
}

impl<R: EntryRepository<TaskEntry>, P: EventPublisher> TaskService<R, P> {
    /// Create a new service backed by the given repository and publisher.
    pub fn new(repo: R, publisher: P) -> Self {
        Self { repo, publisher }
    }

    /// Store a newly created entry and publish whatever it recorded so far.
    ///
    /// # Errors
    ///
    /// Returns [`RuleViolation::DuplicateId`] when an entry with the same id is
    /// already stored, or a storage error propagated from the repository.
    #[tracing::instrument(skip(self, entry), fields(task_id = %entry.id()))]
    pub async fn create_task(&self, entry: TaskEntry) -> Result<TaskEntry, TrackerError> {
        if self.repo.exists(entry.id()).await? {
            return Err(RuleViolation::DuplicateId {
                entity: "TaskEntry",
                id: entry.id().to_string(),
            }
            .into());
        }
        let entry = commit(&self.repo, &self.publisher, entry).await?;
        tracing::info!(day = entry.day_number(), category = %entry.category(), "task created");
        Ok(entry)
    }

    /// Look up a task entry by id.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NotFound`] when no entry with `id` exists,
    /// or a storage error from the repository.
    pub async fn get_task(&self, id: &TaskEntryId) -> Result<TaskEntry, TrackerError> {
        self.repo.find_by_id(id).await
    }

    /// Start a stored task now.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NotFound`] for an unknown id,
    /// [`RuleViolation::TaskAlreadyStarted`] when it was started before, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn start_task(&self, id: &TaskEntryId) -> Result<TaskEntry, TrackerError> {
        let mut entry = self.repo.find_by_id(id).await?;
        entry.start()?;
        let entry = commit(&self.repo, &self.publisher, entry).await?;
        tracing::info!("task started");
        Ok(entry)
    }

    /// Record the active duration of a started task.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NotFound`] for an unknown id,
    /// [`RuleViolation::TaskNotStarted`] or [`RuleViolation::NegativeDuration`]
    /// when the domain refuses the change, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn update_duration(
        &self,
        id: &TaskEntryId,
        duration: TimeDelta,
    ) -> Result<TaskEntry, TrackerError> {
        let mut entry = self.repo.find_by_id(id).await?;
        entry.update_duration(duration)?;
        commit(&self.repo, &self.publisher, entry).await
    }

    /// Record how stressed one felt after the task.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NotFound`] for an unknown id, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn record_stress_after(
        &self,
        id: &TaskEntryId,
        level: StressLevel,
    ) -> Result<TaskEntry, TrackerError> {
        let mut entry = self.repo.find_by_id(id).await?;
        entry.set_stress_after(level);
        let entry = commit(&self.repo, &self.publisher, entry).await?;
        tracing::info!(reduction = entry.calculate_stress_reduction(), "stress after recorded");
        Ok(entry)
    }

    /// All tasks of a given day.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn tasks_on(&self, date: NaiveDate) -> Result<Vec<TaskEntry>, TrackerError> {
        self.repo.find_by_date(date).await
    }

    /// Tasks dated within `start..=end`, ordered by date.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn tasks_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TaskEntry>, TrackerError> {
        self.repo.find_by_date_range(start, end).await
    }

    /// Delete a task entry by id.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NotFound`] for an unknown id, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn delete_task(&self, id: &TaskEntryId) -> Result<(), TrackerError> {
        self.repo.delete(id).await
    }
}

impl<R, P> TaskService<R, P>
where
    R: EntryRepository<TaskEntry> + TaskStatistics,
    P: EventPublisher,
{
    /// Category counts and mean stress reduction within `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn summary(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<TaskSummary, TrackerError> {
        Ok(TaskSummary {
            per_category: self.repo.count_by_category(start, end).await?,
            average_stress_reduction: self.repo.average_stress_reduction(start, end).await?,
        })
    }
}

impl<R, P> TaskService<R, P>
where
    R: EntryRepository<TaskEntry> + EntryBackup<TaskEntry>,
    P: EventPublisher,
{
    /// Write every stored task to `path`.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the backup cannot be written.
    #[tracing::instrument(skip(self))]
    pub async fn backup(&self, path: &Path) -> Result<usize, TrackerError> {
        let written = self.repo.backup(path).await?;
        tracing::info!(written, "tasks backed up");
        Ok(written)
    }

    /// Replace the stored tasks with a backup. Restoring publishes no events.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the backup cannot be read or holds an
    /// invalid task; the stored tasks are unchanged then.
    #[tracing::instrument(skip(self))]
    pub async fn restore(&self, path: &Path) -> Result<usize, TrackerError> {
        let restored = self.repo.restore(path).await?;
        tracing::info!(restored, "tasks restored");
        Ok(restored)
    }
}
