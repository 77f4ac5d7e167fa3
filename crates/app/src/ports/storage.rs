//! Storage port: repository traits for journal entries.
//!
//! Reading and writing are separate capabilities. A consumer that needs both
//! asks for [`EntryRepository`], which every reader + writer gets for free.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use chrono::{NaiveDate, TimeDelta};

use daily_tracker_domain::category::TaskCategory;
use daily_tracker_domain::error::TrackerError;
use daily_tracker_domain::event::Aggregate;

/// Read access to stored entries of type `T`.
pub trait EntryReader<T: Aggregate>: Send + Sync {
    /// Get an entry by id.
    ///
    /// Fails with [`TrackerError::NotFound`] when no entry has this id.
    fn find_by_id(&self, id: &T::Id) -> impl Future<Output = Result<T, TrackerError>> + Send;

    /// All entries recorded for `date`.
    fn find_by_date(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<T>, TrackerError>> + Send;

    /// Entries dated within `start..=end`, ordered by date.
    fn find_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = Result<Vec<T>, TrackerError>> + Send;

    fn exists(&self, id: &T::Id) -> impl Future<Output = Result<bool, TrackerError>> + Send;
}

/// Write access to stored entries of type `T`.
pub trait EntryWriter<T: Aggregate>: Send + Sync {
    /// Create or replace the stored entry with the same id.
    ///
    /// Buffered events are not part of the stored state.
    fn save(&self, entry: &T) -> impl Future<Output = Result<(), TrackerError>> + Send;

    /// Delete an entry by id.
    ///
    /// Fails with [`TrackerError::NotFound`] when no entry has this id.
    fn delete(&self, id: &T::Id) -> impl Future<Output = Result<(), TrackerError>> + Send;
}

/// Full read/write repository.
pub trait EntryRepository<T: Aggregate>: EntryReader<T> + EntryWriter<T> {}

impl<T: Aggregate, R: EntryReader<T> + EntryWriter<T>> EntryRepository<T> for R {}

/// Short-lived, synchronous cache in front of a reader.
pub trait EntryCache<T: Aggregate>: Send + Sync {
    fn get(&self, id: &T::Id) -> Option<T>;

    /// Cache `entry` for `ttl`, replacing any previous copy.
    fn set(&self, entry: &T, ttl: TimeDelta);

    fn remove(&self, id: &T::Id);

    fn clear(&self);
}

/// Aggregate figures over stored task entries.
pub trait TaskStatistics: Send + Sync {
    /// Number of tasks per category within `start..=end`.
    fn count_by_category(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = Result<BTreeMap<TaskCategory, usize>, TrackerError>> + Send;

    /// Mean stress reduction within `start..=end`; `0.0` when there are no tasks.
    fn average_stress_reduction(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = Result<f64, TrackerError>> + Send;
}

/// Whole-store snapshots written to and read back from a file.
pub trait EntryBackup<T: Aggregate>: Send + Sync {
    /// Write every stored entry to `path`, returning how many were written.
    fn backup(&self, path: &Path) -> impl Future<Output = Result<usize, TrackerError>> + Send;

    /// Replace the stored entries with the ones saved at `path`, returning how
    /// many were loaded.
    ///
    /// The store is left untouched when the file cannot be read or holds an
    /// invalid entry.
    fn restore(&self, path: &Path) -> impl Future<Output = Result<usize, TrackerError>> + Send;
}

impl<T: Aggregate, R: EntryReader<T>> EntryReader<T> for Arc<R> {
    fn find_by_id(&self, id: &T::Id) -> impl Future<Output = Result<T, TrackerError>> + Send {
        (**self).find_by_id(id)
    }

    fn find_by_date(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<T>, TrackerError>> + Send {
        (**self).find_by_date(date)
    }

    fn find_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = Result<Vec<T>, TrackerError>> + Send {
        (**self).find_by_date_range(start, end)
    }

    fn exists(&self, id: &T::Id) -> impl Future<Output = Result<bool, TrackerError>> + Send {
        (**self).exists(id)
    }
}

impl<T: Aggregate, W: EntryWriter<T>> EntryWriter<T> for Arc<W> {
    fn save(&self, entry: &T) -> impl Future<Output = Result<(), TrackerError>> + Send {
        (**self).save(entry)
    }

    fn delete(&self, id: &T::Id) -> impl Future<Output = Result<(), TrackerError>> + Send {
        (**self).delete(id)
    }
}

impl<S: TaskStatistics> TaskStatistics for Arc<S> {
    fn count_by_category(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = Result<BTreeMap<TaskCategory, usize>, TrackerError>> + Send {
        (**self).count_by_category(start, end)
    }

    fn average_stress_reduction(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = Result<f64, TrackerError>> + Send {
        (**self).average_stress_reduction(start, end)
    }
}

impl<T: Aggregate, B: EntryBackup<T>> EntryBackup<T> for Arc<B> {
    fn backup(&self, path: &Path) -> impl Future<Output = Result<usize, TrackerError>> + Send {
        (**self).backup(path)
    }

    fn restore(&self, path: &Path) -> impl Future<Output = Result<usize, TrackerError>> + Send {
        (**self).restore(path)
    }
}
