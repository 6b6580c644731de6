//! Time-windowed collection with lazy expiry.
//!
//! [`ExpiringWindow`] keeps items in insertion order together with the
//! instant they were inserted. There is no background sweep: every
//! observing operation (length, indexed read, search, snapshot) first
//! drops entries whose age has reached the configured duration.
//!
//! Timestamps come from [`tokio::time::Instant`], so tests running on a
//! paused runtime can move the clock with `tokio::time::advance`.

use crate::error::WindowError;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Entry<T> {
    item: T,
    inserted_at: Instant,
}

#[derive(Debug)]
struct Inner<T> {
    entries: Vec<Entry<T>>,
    duration: Duration,
}

impl<T> Inner<T> {
    /// Drop every entry whose age is `>= duration`.
    fn evict(&mut self, now: Instant) {
        let duration = self.duration;
        self.entries
            .retain(|entry| now.saturating_duration_since(entry.inserted_at) < duration);
    }

    fn check_index(&self, index: usize) -> Result<(), WindowError> {
        if index >= self.entries.len() {
            return Err(WindowError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        Ok(())
    }
}

/// Thread-safe ordered collection whose entries expire after a fixed duration.
///
/// All operations take the same lock, so they are linearizable with respect
/// to each other. The lock is never held across an `.await`.
#[derive(Debug)]
pub struct ExpiringWindow<T> {
    inner: Mutex<Inner<T>>,
}

impl<T> ExpiringWindow<T> {
    /// Create an empty window whose entries live for `duration`.
    pub fn new(duration: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: Vec::new(),
                duration,
            }),
        }
    }

    /// Current expiry duration.
    pub fn duration(&self) -> Duration {
        self.inner.lock().duration
    }

    /// Change the expiry duration. Applies from the next observation on.
    pub fn set_duration(&self, duration: Duration) {
        self.inner.lock().duration = duration;
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let mut inner = self.inner.lock();
        inner.evict(Instant::now());
        inner.entries.len()
    }

    /// Returns `true` if no live entries remain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append `item` stamped with the current instant.
    ///
    /// No eviction pass runs first; appending is valid regardless of how
    /// stale the rest of the window is.
    pub fn push(&self, item: T) {
        let entry = Entry {
            item,
            inserted_at: Instant::now(),
        };
        self.inner.lock().entries.push(entry);
    }

    /// Insert `item` at `index` among the live entries, shifting later ones.
    ///
    /// `index == len()` appends.
    pub fn insert(&self, index: usize, item: T) -> Result<(), WindowError> {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        inner.evict(now);
        if index > inner.entries.len() {
            return Err(WindowError::IndexOutOfRange {
                index,
                len: inner.entries.len(),
            });
        }
        inner.entries.insert(
            index,
            Entry {
                item,
                inserted_at: now,
            },
        );
        Ok(())
    }

    /// Replace the item at `index`, keeping its original timestamp.
    pub fn set(&self, index: usize, item: T) -> Result<(), WindowError> {
        let mut inner = self.inner.lock();
        inner.check_index(index)?;
        inner.entries[index].item = item;
        Ok(())
    }

    /// Remove and return the item at `index` without re-checking expiry.
    ///
    /// The caller is expected to hold an index from a prior observation.
    pub fn remove_at(&self, index: usize) -> Result<T, WindowError> {
        let mut inner = self.inner.lock();
        inner.check_index(index)?;
        Ok(inner.entries.remove(index).item)
    }

    /// Drop every entry, live or not.
    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }

    /// Evict, then append `item` only if `admit(live_len)` holds.
    ///
    /// The length check and the append happen under one lock acquisition.
    pub fn push_if(&self, item: T, admit: impl FnOnce(usize) -> bool) -> bool {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        inner.evict(now);
        if !admit(inner.entries.len()) {
            return false;
        }
        inner.entries.push(Entry {
            item,
            inserted_at: now,
        });
        true
    }
}

impl<T: Clone> ExpiringWindow<T> {
    /// Clone of the live item at `index`.
    pub fn get(&self, index: usize) -> Result<T, WindowError> {
        let mut inner = self.inner.lock();
        inner.evict(Instant::now());
        inner.check_index(index)?;
        Ok(inner.entries[index].item.clone())
    }

    /// Owned snapshot of the live items, oldest first.
    ///
    /// The snapshot is taken after a single eviction pass under the lock,
    /// so it reflects one consistent state of the window.
    pub fn snapshot(&self) -> Vec<T> {
        let mut inner = self.inner.lock();
        inner.evict(Instant::now());
        inner.entries.iter().map(|e| e.item.clone()).collect()
    }

    /// Iterate over a snapshot of the live items.
    pub fn iter(&self) -> std::vec::IntoIter<T> {
        self.snapshot().into_iter()
    }
}

impl<T: PartialEq> ExpiringWindow<T> {
    /// Position of the first live entry equal to `item`.
    pub fn index_of(&self, item: &T) -> Option<usize> {
        let mut inner = self.inner.lock();
        inner.evict(Instant::now());
        inner.entries.iter().position(|e| &e.item == item)
    }

    /// Returns `true` if a live entry equals `item`.
    pub fn contains(&self, item: &T) -> bool {
        self.index_of(item).is_some()
    }

    /// Remove the first live entry equal to `item`.
    pub fn remove(&self, item: &T) -> bool {
        let mut inner = self.inner.lock();
        inner.evict(Instant::now());
        match inner.entries.iter().position(|e| &e.item == item) {
            Some(index) => {
                inner.entries.remove(index);
                true
            }
            None => false,
        }
    }
}
