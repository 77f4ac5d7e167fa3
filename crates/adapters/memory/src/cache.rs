//! In-memory implementation of [`EntryCache`] with per-entry expiry.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::TimeDelta;

use daily_tracker_app::ports::EntryCache;
use daily_tracker_domain::event::Aggregate;
use daily_tracker_domain::time::{Timestamp, now};

struct Slot<T> {
    entry: T,
    expires_at: Timestamp,
}

/// Cache whose entries expire `ttl` after they were set.
///
/// Expired entries are dropped on lookup, and every `set` sweeps the
/// others. A poisoned lock is recovered, since a cache miss is always a
/// valid answer.
pub struct MemoryEntryCache<T: Aggregate> {
    slots: Mutex<HashMap<T::Id, Slot<T>>>,
}

impl<T: Aggregate> Default for MemoryEntryCache<T> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<T: Aggregate> MemoryEntryCache<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots currently held, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<T::Id, Slot<T>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn get_at(&self, id: &T::Id, at: Timestamp) -> Option<T> {
        let mut slots = self.lock();
        match slots.get(id) {
            Some(slot) if slot.expires_at > at => Some(slot.entry.clone()),
            Some(_) => {
                slots.remove(id);
                None
            }
            None => None,
        }
    }

    fn set_at(&self, entry: &T, ttl: TimeDelta, at: Timestamp) {
        if ttl <= TimeDelta::zero() {
            return;
        }
        let Some(expires_at) = at.checked_add_signed(ttl) else {
            return;
        };
        let mut entry = entry.clone();
        entry.clear_events();

        let mut slots = self.lock();
        slots.retain(|_, slot| slot.expires_at > at);
        slots.insert(entry.id().clone(), Slot { entry, expires_at });
    }
}

impl<T: Aggregate> EntryCache<T> for MemoryEntryCache<T> {
    fn get(&self, id: &T::Id) -> Option<T> {
        self.get_at(id, now())
    }

    fn set(&self, entry: &T, ttl: TimeDelta) {
        self.set_at(entry, ttl, now());
    }

    fn remove(&self, id: &T::Id) {
        self.lock().remove(id);
    }

    fn clear(&self) {
        self.lock().clear();
    }
}
