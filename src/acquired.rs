// src/acquired.rs
//! RAII convenience layer over `Pool::acquire`/`Pool::release`.

use crate::entry::Entry;
use crate::pool::Pool;
use std::ops::Deref;
use std::sync::Arc;

/// An acquisition borrowed from a [`Pool`], released automatically on drop.
///
/// This is a thin convenience wrapper around the lower-level
/// `Pool::acquire`/`Pool::release` pair: callers who don't need to reason
/// about the raw `Entry` handle can just hold an `Acquired<T>` and let
/// `Drop` return it. If `release` reports the entry has retired, `Drop`
/// removes it instead (disposal, if configured, then runs inside that
/// `remove`).
pub struct Acquired<T: 'static> {
    entry: Option<Arc<Entry<T>>>,
    pool: Pool<T>,
}

impl<T: 'static> Acquired<T> {
    pub(crate) fn new(pool: Pool<T>, entry: Arc<Entry<T>>) -> Self {
        Self {
            entry: Some(entry),
            pool,
        }
    }

    /// The underlying entry, for callers that need `usage_count` or similar.
    pub fn entry(&self) -> &Arc<Entry<T>> {
        self.entry.as_ref().expect("entry taken only by Drop")
    }
}

impl<T: 'static> Deref for Acquired<T> {
    type Target = T;
    fn deref(&self) -> &T {
        self.entry()
            .pooled()
            .expect("acquired entry is always enabled")
    }
}

impl<T: 'static> Drop for Acquired<T> {
    fn drop(&mut self) {
        if let Some(entry) = self.entry.take() {
            if !self.pool.release(&entry) {
                self.pool.remove(&entry);
            }
        }
    }
}

impl<T: 'static> Pool<T> {
    /// Acquires an entry and wraps it in an RAII guard that releases (or
    /// removes, if retired) automatically on drop.
    pub fn acquire_guarded(&self) -> Option<Acquired<T>> {
        self.acquire().map(|entry| Acquired::new(self.clone(), entry))
    }
}
