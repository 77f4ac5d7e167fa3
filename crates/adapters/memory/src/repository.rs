//! In-memory implementation of the entry repository ports.

use std::collections::BTreeMap;
use std::future::{Future, ready};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;

use daily_tracker_app::ports::{EntryBackup, EntryReader, EntryWriter, TaskStatistics};
use daily_tracker_domain::category::TaskCategory;
use daily_tracker_domain::error::{NotFoundError, TrackerError};
use daily_tracker_domain::event::Aggregate;
use daily_tracker_domain::task_entry::TaskEntry;

use crate::error::MemoryStoreError;

/// Map-backed repository for any aggregate.
///
/// Stored copies never carry buffered events. Backups are pretty-printed
/// JSON arrays of entries.
pub struct MemoryRepository<T: Aggregate> {
    entries: Mutex<BTreeMap<T::Id, T>>,
}

impl<T: Aggregate> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
        }
    }
}

impl<T: Aggregate> MemoryRepository<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
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

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<T::Id, T>>, MemoryStoreError> {
        self.entries
            .lock()
            .map_err(|_| MemoryStoreError::Poisoned { store: T::KIND })
    }

    fn not_found(id: &T::Id) -> TrackerError {
        NotFoundError {
            entity: T::KIND,
            id: id.to_string(),
        }
        .into()
    }

    fn get(&self, id: &T::Id) -> Result<T, TrackerError> {
        self.lock()?
            .get(id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    fn select(&self, keep: impl Fn(NaiveDate) -> bool) -> Result<Vec<T>, TrackerError> {
        let mut found: Vec<T> = self
            .lock()?
            .values()
            .filter(|entry| keep(entry.date()))
            .cloned()
            .collect();
        found.sort_by_key(|entry| entry.date());
        Ok(found)
    }

    fn insert(&self, entry: &T) -> Result<(), TrackerError> {
        let mut stored = entry.clone();
        stored.clear_events();
        self.lock()?.insert(stored.id().clone(), stored);
        Ok(())
    }

    fn remove(&self, id: &T::Id) -> Result<(), TrackerError> {
        match self.lock()?.remove(id) {
            Some(_) => Ok(()),
            None => Err(Self::not_found(id)),
        }
    }
}

impl<T: Aggregate> EntryReader<T> for MemoryRepository<T> {
    fn find_by_id(&self, id: &T::Id) -> impl Future<Output = Result<T, TrackerError>> + Send {
        ready(self.get(id))
    }

    fn find_by_date(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<T>, TrackerError>> + Send {
        ready(self.select(|day| day == date))
    }

    fn find_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = Result<Vec<T>, TrackerError>> + Send {
        ready(self.select(|day| (start..=end).contains(&day)))
    }

    fn exists(&self, id: &T::Id) -> impl Future<Output = Result<bool, TrackerError>> + Send {
        let result = self
            .lock()
            .map(|entries| entries.contains_key(id))
            .map_err(TrackerError::from);
        ready(result)
    }
}

impl<T: Aggregate> EntryWriter<T> for MemoryRepository<T> {
    fn save(&self, entry: &T) -> impl Future<Output = Result<(), TrackerError>> + Send {
        ready(self.insert(entry))
    }

    fn delete(&self, id: &T::Id) -> impl Future<Output = Result<(), TrackerError>> + Send {
        ready(self.remove(id))
    }
}

impl<T> MemoryRepository<T>
where
    T: Aggregate + Serialize + DeserializeOwned,
{
    fn write_backup(&self, path: &Path) -> Result<usize, TrackerError> {
        let entries: Vec<T> = self.lock()?.values().cloned().collect();
        let json = serde_json::to_vec_pretty(&entries).map_err(|source| {
            MemoryStoreError::BackupFormat {
                store: T::KIND,
                source,
            }
        })?;
        std::fs::write(path, json).map_err(|source| MemoryStoreError::BackupIo {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(entries.len())
    }

    fn read_backup(&self, path: &Path) -> Result<usize, TrackerError> {
        let raw = std::fs::read(path).map_err(|source| MemoryStoreError::BackupIo {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: Vec<T> =
            serde_json::from_slice(&raw).map_err(|source| MemoryStoreError::BackupFormat {
                store: T::KIND,
                source,
            })?;
        let restored: BTreeMap<T::Id, T> = entries
            .into_iter()
            .map(|entry| (entry.id().clone(), entry))
            .collect();
        let count = restored.len();
        *self.lock()? = restored;
        Ok(count)
    }
}

impl<T> EntryBackup<T> for MemoryRepository<T>
where
    T: Aggregate + Serialize + DeserializeOwned,
{
    fn backup(&self, path: &Path) -> impl Future<Output = Result<usize, TrackerError>> + Send {
        ready(self.write_backup(path))
    }

    fn restore(&self, path: &Path) -> impl Future<Output = Result<usize, TrackerError>> + Send {
        ready(self.read_backup(path))
    }
}

impl TaskStatistics for MemoryRepository<TaskEntry> {
    fn count_by_category(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = Result<BTreeMap<TaskCategory, usize>, TrackerError>> + Send {
        let result = self.select(|day| (start..=end).contains(&day)).map(|tasks| {
            let mut counts = BTreeMap::new();
            for task in &tasks {
                *counts.entry(task.category()).or_insert(0) += 1;
            }
            counts
        });
        ready(result)
    }

    fn average_stress_reduction(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = Result<f64, TrackerError>> + Send {
        let result = self.select(|day| (start..=end).contains(&day)).map(|tasks| {
            if tasks.is_empty() {
                return 0.0;
            }
            let total: i64 = tasks
                .iter()
                .map(|task| i64::from(task.calculate_stress_reduction()))
                .sum();
            mean(total, tasks.len())
        });
        ready(result)
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(total: i64, count: usize) -> f64 {
    total as f64 / count as f64
}
