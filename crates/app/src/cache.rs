//! Read-through, write-through cache in front of a repository.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::Path;

use chrono::{NaiveDate, TimeDelta};

use daily_tracker_domain::category::TaskCategory;
use daily_tracker_domain::error::TrackerError;
use daily_tracker_domain::event::Aggregate;

use crate::ports::{EntryBackup, EntryCache, EntryReader, EntryWriter, TaskStatistics};

/// Repository decorator consulting an [`EntryCache`] on lookups by id.
///
/// Date queries and statistics always go to the inner repository. Saves refresh the cached
/// copy, deletes evict it and a restore empties the cache.
pub struct CachedRepository<R, C> {
    inner: R,
    cache: C,
    ttl: TimeDelta,
}

impl<R, C> CachedRepository<R, C> {
    pub fn new(inner: R, cache: C, ttl: TimeDelta) -> Self {
        Self { inner, cache, ttl }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }
}

impl<T, R, C> EntryReader<T> for CachedRepository<R, C>
where
    T: Aggregate,
    R: EntryReader<T>,
    C: EntryCache<T>,
{
    fn find_by_id(&self, id: &T::Id) -> impl Future<Output = Result<T, TrackerError>> + Send {
        async move {
            if let Some(hit) = self.cache.get(id) {
                tracing::trace!(kind = T::KIND, %id, "cache hit");
                return Ok(hit);
            }
            let entry = self.inner.find_by_id(id).await?;
            self.cache.set(&entry, self.ttl);
            Ok(entry)
        }
    }

    fn find_by_date(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<T>, TrackerError>> + Send {
        self.inner.find_by_date(date)
    }

    fn find_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = Result<Vec<T>, TrackerError>> + Send {
        self.inner.find_by_date_range(start, end)
    }

    fn exists(&self, id: &T::Id) -> impl Future<Output = Result<bool, TrackerError>> + Send {
        async move {
            if self.cache.get(id).is_some() {
                return Ok(true);
            }
            self.inner.exists(id).await
        }
    }
}

impl<T, R, C> EntryWriter<T> for CachedRepository<R, C>
where
    T: Aggregate,
    R: EntryWriter<T>,
    C: EntryCache<T>,
{
    fn save(&self, entry: &T) -> impl Future<Output = Result<(), TrackerError>> + Send {
        async move {
            self.inner.save(entry).await?;
            self.cache.set(entry, self.ttl);
            Ok(())
        }
    }

    fn delete(&self, id: &T::Id) -> impl Future<Output = Result<(), TrackerError>> + Send {
        async move {
            self.cache.remove(id);
            self.inner.delete(id).await
        }
    }
}

impl<R: TaskStatistics, C: Send + Sync> TaskStatistics for CachedRepository<R, C> {
    fn count_by_category(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = Result<BTreeMap<TaskCategory, usize>, TrackerError>> + Send {
        self.inner.count_by_category(start, end)
    }

    fn average_stress_reduction(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = Result<f64, TrackerError>> + Send {
        self.inner.average_stress_reduction(start, end)
    }
}

impl<T, R, C> EntryBackup<T> for CachedRepository<R, C>
where
    T: Aggregate,
    R: EntryBackup<T>,
    C: EntryCache<T>,
{
    fn backup(&self, path: &Path) -> impl Future<Output = Result<usize, TrackerError>> + Send {
        self.inner.backup(path)
    }

    fn restore(&self, path: &Path) -> impl Future<Output = Result<usize, TrackerError>> + Send {
        async move {
            let restored = self.inner.restore(path).await?;
            self.cache.clear();
            Ok(restored)
        }
    }
}
