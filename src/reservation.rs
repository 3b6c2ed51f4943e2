// src/reservation.rs
//! Transient handle over a pending [`Entry`], returned by `Pool::reserve`.

use crate::entry::Entry;
use crate::error::{PoolError, Result};
use crate::pool::PoolInner;
use std::sync::Arc;

/// A handle to a slot that has been carved out of the pool but not yet
/// populated with a value.
///
/// Obtained from [`crate::pool::Pool::reserve`]. The entry behind a
/// `Reservation` is already linked into the pool's shared list; `enable` or
/// `acquire` publishes a value into it, `remove` aborts it. Dropping a
/// `Reservation` without calling any of these leaves the entry pending
/// forever — the caller owns the lifecycle and is expected to resolve every
/// reservation it obtains.
pub struct Reservation<T> {
    pub(crate) pool: Arc<PoolInner<T>>,
    pub(crate) entry: Arc<Entry<T>>,
}

impl<T> Reservation<T> {
    /// The underlying entry, still pending until `enable`/`acquire` succeeds.
    pub fn entry(&self) -> &Arc<Entry<T>> {
        &self.entry
    }

    /// Publishes `value`, transitioning the entry `(MIN, 0) -> (0, 0)`.
    ///
    /// Fails with [`PoolError::NotPending`] if the entry was already enabled
    /// or removed out from under this reservation (it is returned alongside
    /// the un-published `value`).
    pub fn enable(self, value: T) -> Result<()> {
        match self.entry.try_enable(value) {
            Ok(()) => {
                self.pool.pending.fetch_sub(1, std::sync::atomic::Ordering::AcqRel);
                Ok(())
            }
            Err(_value) => Err(PoolError::NotPending),
        }
    }

    /// Publishes `value` and atomically performs the first acquisition,
    /// transitioning the entry `(MIN, 0) -> (1, 1)` in one step so no other
    /// thread has a window to observe it idle first.
    pub fn acquire(self, value: T) -> std::result::Result<Arc<Entry<T>>, PoolError> {
        match self.entry.try_enable_and_acquire(value) {
            Ok(()) => {
                self.pool.pending.fetch_sub(1, std::sync::atomic::Ordering::AcqRel);
                Ok(Arc::clone(&self.entry))
            }
            Err(_value) => Err(PoolError::NotPending),
        }
    }

    /// Aborts the reservation, removing the still-pending entry.
    ///
    /// Because the entry is idle (`lo == 0`) by construction, the underlying
    /// `tryRemove` always succeeds immediately.
    pub fn remove(self) {
        self.pool.remove_entry(&self.entry);
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Pool, PoolConfig};

    #[test]
    fn enable_then_acquire_sees_value() {
        let pool: Pool<&str> = Pool::new(PoolConfig::new(2, 0));
        let r = pool.reserve(-1).unwrap();
        r.enable("hello").unwrap();
        let entry = pool.acquire().unwrap();
        assert_eq!(entry.pooled(), Some(&"hello"));
    }

    #[test]
    fn remove_drops_pending_reservation() {
        let pool: Pool<&str> = Pool::new(PoolConfig::new(2, 0));
        let r = pool.reserve(-1).unwrap();
        r.remove();
        assert_eq!(pool.size(), 0);
        assert_eq!(pool.pending_count(), 0);
    }

    #[test]
    fn acquire_on_enable_is_already_in_use() {
        let pool: Pool<u32> = Pool::new(PoolConfig::new(1, 0));
        let r = pool.reserve(-1).unwrap();
        let entry = r.acquire(7).unwrap();
        assert!(!entry.is_idle());
        assert_eq!(entry.pooled(), Some(&7));
    }
}
