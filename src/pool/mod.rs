// src/pool/mod.rs
//! The pool container: capacity, the shared entry list, and the top-level
//! reserve/acquire/release/remove/close protocol.

pub(crate) mod cache;
pub(crate) mod config;
pub(crate) mod stats;

pub use config::PoolConfig;
pub use stats::PoolStats;

use crate::entry::Entry;
use crate::error::{PoolError, Result};
use crate::reservation::Reservation;
use arc_swap::ArcSwap;
use cache::PoolId;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Something a pooled value can do when it is permanently removed from the
/// pool. Implementing this is optional — values that do not implement it are
/// simply dropped on removal.
pub trait Disposable {
    /// Release any resources held by this value. Errors are logged by the
    /// pool but never propagated — disposal is always best-effort.
    fn dispose(&self) -> std::result::Result<(), Box<dyn std::error::Error>>;
}

pub(crate) struct PoolInner<T> {
    id: PoolId,
    max_entries: usize,
    cache_size: usize,
    max_multiplex: AtomicI32,
    max_usage_count: AtomicI32,
    shared_list: ArcSwap<Vec<Arc<Entry<T>>>>,
    pub(crate) pending: AtomicUsize,
    closed: AtomicBool,
    // Serializes `reserve`'s capacity check and `close`'s snapshot-and-clear
    // against each other; every other operation is lock-free.
    reservation_lock: Mutex<()>,
    disposer: Option<Arc<dyn Fn(&T) -> std::result::Result<(), Box<dyn std::error::Error>> + Send + Sync>>,
}

/// A generic, concurrent, multiplexing object pool.
///
/// Entries may be acquired up to `max_multiplex` times concurrently and
/// retire after `max_usage_count` acquisitions. Acquisition is always
/// non-blocking: it either returns an entry immediately or reports that none
/// is available. Cloning a `Pool` is cheap — it shares the same underlying
/// state via an inner `Arc`, so callers don't need to wrap it in one of
/// their own to share it across threads.
pub struct Pool<T> {
    inner: Arc<PoolInner<T>>,
}

impl<T> Clone for Pool<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: 'static> Pool<T> {
    /// Creates a pool with the given configuration and no disposer: removed
    /// values are simply dropped.
    pub fn new(config: PoolConfig) -> Self {
        Self::with_disposer(config, None)
    }

    /// Creates a pool whose removed/drained values are passed to `disposer`
    /// before being dropped. A disposer error is logged, never propagated.
    pub fn with_disposer(
        config: PoolConfig,
        disposer: Option<Arc<dyn Fn(&T) -> std::result::Result<(), Box<dyn std::error::Error>> + Send + Sync>>,
    ) -> Self {
        assert!(config.max_multiplex >= 1, "max_multiplex must be >= 1");
        assert_ne!(config.max_usage_count, 0, "max_usage_count must not be 0");
        Self {
            inner: Arc::new(PoolInner {
                id: PoolId::next(),
                max_entries: config.max_entries,
                cache_size: config.cache_size,
                max_multiplex: AtomicI32::new(config.max_multiplex),
                max_usage_count: AtomicI32::new(config.max_usage_count),
                shared_list: ArcSwap::from_pointee(Vec::new()),
                pending: AtomicUsize::new(0),
                closed: AtomicBool::new(false),
                reservation_lock: Mutex::new(()),
                disposer,
            }),
        }
    }

    /// Carves out a new pending slot.
    ///
    /// Fails (returns `None`) if the pool is closed, already at
    /// `max_entries`, or `max_reservations >= 0` and at least that many
    /// reservations are already outstanding.
    pub fn reserve(&self, max_reservations: i64) -> Option<Reservation<T>> {
        let _guard = self.inner.reservation_lock.lock().unwrap();
        if self.inner.closed.load(Ordering::Acquire) {
            return None;
        }
        let current = self.inner.shared_list.load();
        if current.len() >= self.inner.max_entries {
            return None;
        }
        if max_reservations >= 0 && self.inner.pending.load(Ordering::Acquire) as i64 >= max_reservations
        {
            return None;
        }
        self.inner.pending.fetch_add(1, Ordering::AcqRel);
        let entry = Arc::new(Entry::pending());
        self.inner.shared_list.rcu(|list| {
            let mut next = (**list).clone();
            next.push(Arc::clone(&entry));
            next
        });
        Some(Reservation {
            pool: Arc::clone(&self.inner),
            entry,
        })
    }

    /// Non-blocking acquisition: the thread-local cache first, then the
    /// shared list in insertion order. Returns `None` if closed or if no
    /// entry can be acquired.
    pub fn acquire(&self) -> Option<Arc<Entry<T>>> {
        if self.inner.closed.load(Ordering::Acquire) {
            return None;
        }
        let max_multiplex = self.inner.max_multiplex.load(Ordering::Relaxed);
        let max_usage_count = self.inner.max_usage_count.load(Ordering::Relaxed);

        if self.inner.cache_size > 0 {
            if let Some(entry) =
                cache::pop_first_acquirable::<T>(self.inner.id, max_multiplex, max_usage_count)
            {
                return Some(entry);
            }
        }

        let snapshot = self.inner.shared_list.load();
        for entry in snapshot.iter() {
            if entry.try_acquire(max_multiplex, max_usage_count) {
                return Some(Arc::clone(entry));
            }
        }
        None
    }

    /// Acquires the entry at `index` in the shared list directly, bypassing
    /// the thread-local cache. Returns `None` if `index` is out of bounds or
    /// `try_acquire` fails on that entry.
    pub fn acquire_at(&self, index: usize) -> Option<Arc<Entry<T>>> {
        let max_multiplex = self.inner.max_multiplex.load(Ordering::Relaxed);
        let max_usage_count = self.inner.max_usage_count.load(Ordering::Relaxed);
        let snapshot = self.inner.shared_list.load();
        let entry = snapshot.get(index)?;
        if entry.try_acquire(max_multiplex, max_usage_count) {
            Some(Arc::clone(entry))
        } else {
            None
        }
    }

    /// Returns an acquisition. `false` means the entry has retired (reached
    /// `max_usage_count` with no remaining concurrent users) or the pool is
    /// closed — the caller must now call `remove` and dispose the value.
    pub fn release(&self, entry: &Arc<Entry<T>>) -> bool {
        if self.inner.closed.load(Ordering::Acquire) {
            return false;
        }
        let max_usage_count = self.inner.max_usage_count.load(Ordering::Relaxed);
        let reusable = entry.try_release(max_usage_count);
        if reusable && self.inner.cache_size > 0 {
            cache::push(self.inner.id, self.inner.cache_size, Arc::clone(entry));
        }
        reusable
    }

    /// Permanently evicts `entry`. Returns `false` if the pool is closed or
    /// the entry is still multiplexed by other callers (a later `release`
    /// will perform the actual removal).
    pub fn remove(&self, entry: &Arc<Entry<T>>) -> bool {
        if self.inner.closed.load(Ordering::Acquire) {
            return false;
        }
        self.inner.remove_entry(entry)
    }

    /// Closes the pool: after this returns, every operation fails uniformly
    /// and `values()` is empty. Every entry is force-closed and fully drained
    /// here, regardless of how many concurrent holders it still has — once
    /// `closed` is set, `release`/`remove` are gated out before they ever
    /// reach the entry, so no other thread will drive its multiplex count to
    /// zero on its own. Each entry's pooled value is disposed exactly once.
    pub fn close(&self) {
        let snapshot = {
            let _guard = self.inner.reservation_lock.lock().unwrap();
            if self.inner.closed.swap(true, Ordering::AcqRel) {
                return; // already closed
            }
            self.inner.shared_list.swap(Arc::new(Vec::new()))
        };
        for entry in snapshot.iter() {
            self.inner.force_remove(entry);
        }
        cache::clear::<T>(self.inner.id);
    }

    /// Sets the concurrent-acquisition cap. Rejects `n < 1`.
    pub fn set_max_multiplex(&self, n: i32) -> Result<()> {
        if n < 1 {
            return Err(PoolError::InvalidMaxMultiplex(n));
        }
        self.inner.max_multiplex.store(n, Ordering::Relaxed);
        Ok(())
    }

    /// Sets the lifetime-acquisition cap. Rejects `k == 0`; negative means
    /// unbounded.
    pub fn set_max_usage_count(&self, k: i32) -> Result<()> {
        if k == 0 {
            return Err(PoolError::InvalidMaxUsageCount);
        }
        self.inner.max_usage_count.store(k, Ordering::Relaxed);
        Ok(())
    }

    /// Number of reserved-but-not-yet-enabled entries.
    pub fn pending_count(&self) -> usize {
        self.inner.pending.load(Ordering::Acquire)
    }

    /// Number of open entries with zero outstanding acquisitions.
    pub fn idle_count(&self) -> usize {
        self.inner
            .shared_list
            .load()
            .iter()
            .filter(|e| {
                let (hi, lo) = e.raw_state();
                hi >= 0 && lo <= 0
            })
            .count()
    }

    /// Number of open entries with at least one outstanding acquisition.
    pub fn in_use_count(&self) -> usize {
        self.inner
            .shared_list
            .load()
            .iter()
            .filter(|e| {
                let (hi, lo) = e.raw_state();
                hi >= 0 && lo > 0
            })
            .count()
    }

    /// Total number of entries currently in the shared list.
    pub fn size(&self) -> usize {
        self.inner.shared_list.load().len()
    }

    /// `true` once `close()` has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// A read-only snapshot of the shared list.
    pub fn values(&self) -> Vec<Arc<Entry<T>>> {
        (**self.inner.shared_list.load()).clone()
    }

    /// A point-in-time snapshot of entry counts. Each field is its own
    /// atomic load, so the fields are not linearizable with each other.
    pub fn stats(&self) -> PoolStats {
        let snapshot = self.inner.shared_list.load();
        let mut idle = 0;
        let mut in_use = 0;
        for e in snapshot.iter() {
            let (hi, lo) = e.raw_state();
            if hi < 0 {
                continue;
            }
            if lo > 0 {
                in_use += 1;
            } else {
                idle += 1;
            }
        }
        PoolStats {
            pending: self.inner.pending.load(Ordering::Acquire),
            idle,
            in_use,
            size: snapshot.len(),
            is_closed: self.inner.closed.load(Ordering::Acquire),
        }
    }
}

impl<T: Disposable + 'static> Pool<T> {
    /// Creates a pool that disposes removed values via their own
    /// [`Disposable::dispose`] implementation, for pooled types that can
    /// express their own cleanup instead of supplying an external closure
    /// to [`Pool::with_disposer`].
    pub fn with_disposal(config: PoolConfig) -> Self {
        Self::with_disposer(config, Some(Arc::new(|v: &T| v.dispose())))
    }
}

impl<T> PoolInner<T> {
    /// Removes `entry` regardless of the pool's closed state: used by
    /// `Pool::remove` (already gated on `closed` by the caller) and by
    /// `Reservation::remove`, which must be able to abort a pending
    /// reservation even if the pool has since closed around it.
    pub(crate) fn remove_entry(&self, entry: &Arc<Entry<T>>) -> bool {
        self.finish_remove(entry)
    }

    fn finish_remove(&self, entry: &Arc<Entry<T>>) -> bool {
        let was_pending = entry.raw_state().0 == i32::MIN;
        let deleted = entry.try_remove();
        if was_pending {
            self.pending.fetch_sub(1, Ordering::AcqRel);
        }
        if deleted {
            self.unlink_and_dispose(entry);
        }
        deleted
    }

    /// Force-closes `entry` and drains it all the way to deletion,
    /// regardless of how many concurrent holders it still has.
    ///
    /// Used only by `Pool::close`: once the pool is marked closed, no other
    /// thread's `release`/`remove` call will ever reach this entry again to
    /// finish draining it one multiplex slot at a time, so this call must do
    /// all of that draining itself in one go rather than relying on the
    /// "last one out" protocol `finish_remove` uses during normal operation.
    fn force_remove(&self, entry: &Arc<Entry<T>>) {
        let was_pending = entry.raw_state().0 == i32::MIN;
        if was_pending {
            self.pending.fetch_sub(1, Ordering::AcqRel);
        }
        while !entry.try_remove() {}
        self.unlink_and_dispose(entry);
    }

    fn unlink_and_dispose(&self, entry: &Arc<Entry<T>>) {
        self.shared_list.rcu(|list| {
            let mut next = (**list).clone();
            next.retain(|e| !Arc::ptr_eq(e, entry));
            next
        });
        if let Some(value) = entry.pooled() {
            if let Some(disposer) = &self.disposer {
                if let Err(err) = disposer(value) {
                    warn!(error = %err, "pooled value failed to dispose");
                }
            }
        }
        debug!("entry removed from pool");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_basic_reserve_enable_acquire_release() {
        let pool: Pool<&str> = Pool::new(PoolConfig::new(2, 0));
        let r1 = pool.reserve(-1).unwrap();
        let r2 = pool.reserve(-1).unwrap();
        assert!(pool.reserve(-1).is_none());
        r1.enable("A").unwrap();
        r2.enable("B").unwrap();

        let first = pool.acquire().unwrap();
        let second = pool.acquire().unwrap();
        assert!(pool.acquire().is_none());
        assert_ne!(first.pooled(), second.pooled());

        assert!(pool.release(&first));
        assert!(pool.release(&second));
        assert!(pool.acquire().is_some());
    }

    #[test]
    fn scenario_multiplexing() {
        let pool: Pool<&str> = Pool::new(PoolConfig::new(1, 0));
        pool.set_max_multiplex(3).unwrap();
        let r = pool.reserve(-1).unwrap();
        r.enable("X").unwrap();

        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        let c = pool.acquire().unwrap();
        assert!(pool.acquire().is_none());

        assert!(pool.release(&a));
        assert!(pool.acquire().is_some());
        let _ = (b, c);
    }

    #[test]
    fn scenario_usage_count_retirement() {
        let pool: Pool<&str> = Pool::new(PoolConfig::new(1, 0));
        pool.set_max_usage_count(2).unwrap();
        let r = pool.reserve(-1).unwrap();
        r.enable("Y").unwrap();

        let e1 = pool.acquire().unwrap();
        assert!(pool.release(&e1));

        let e2 = pool.acquire().unwrap();
        assert!(!pool.release(&e2)); // retired

        assert!(pool.remove(&e2));
        assert_eq!(pool.size(), 0);
    }

    #[test]
    fn scenario_reservation_removal() {
        let pool: Pool<&str> = Pool::new(PoolConfig::new(3, 0));
        let r1 = pool.reserve(-1).unwrap();
        let r2 = pool.reserve(-1).unwrap();
        let r3 = pool.reserve(-1).unwrap();
        r2.remove();
        assert_eq!(pool.size(), 2);
        assert_eq!(pool.pending_count(), 2);
        r1.enable("a").unwrap();
        r3.enable("c").unwrap();
        assert_eq!(pool.pending_count(), 0);
    }

    #[test]
    fn scenario_close_drains_in_use_entries() {
        use std::sync::atomic::AtomicUsize as AU;
        let disposed = Arc::new(AU::new(0));
        let d = Arc::clone(&disposed);
        let pool: Pool<&str> = Pool::with_disposer(
            PoolConfig::new(2, 0),
            Some(Arc::new(move |_v: &&str| {
                d.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })),
        );
        let r1 = pool.reserve(-1).unwrap();
        let r2 = pool.reserve(-1).unwrap();
        r1.enable("a").unwrap();
        r2.enable("b").unwrap();
        let e1 = pool.acquire().unwrap();
        let e2 = pool.acquire().unwrap();

        pool.close();

        assert!(!pool.release(&e1));
        assert!(!pool.release(&e2));
        assert!(pool.remove(&e1) == false); // pool already closed -> gated false
        // but the entries are already force-closed by close(); the holders'
        // own remove attempts only unlink if still multiplexed by no one else
        assert!(pool.values().is_empty());
        assert_eq!(disposed.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn close_fully_drains_multiplexed_entries() {
        use std::sync::atomic::AtomicUsize as AU;
        let disposed = Arc::new(AU::new(0));
        let d = Arc::clone(&disposed);
        let pool: Pool<&str> = Pool::with_disposer(
            PoolConfig::multiplexed(1, 0, 4),
            Some(Arc::new(move |_v: &&str| {
                d.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })),
        );
        let r = pool.reserve(-1).unwrap();
        r.enable("shared").unwrap();

        // Four concurrent holders of the same entry.
        let holders: Vec<_> = (0..4).map(|_| pool.acquire().unwrap()).collect();
        assert_eq!(holders.len(), 4);

        pool.close();

        // The entry must be fully unlinked and disposed exactly once, not
        // left dangling with outstanding multiplex count.
        assert!(pool.values().is_empty());
        assert_eq!(disposed.load(Ordering::SeqCst), 1);

        for h in &holders {
            assert!(!pool.release(h));
        }
    }

    #[test]
    fn closed_pool_rejects_new_operations() {
        let pool: Pool<&str> = Pool::new(PoolConfig::new(2, 0));
        pool.close();
        assert!(pool.reserve(-1).is_none());
        assert!(pool.acquire().is_none());
        assert!(pool.is_closed());
    }

    #[test]
    fn capacity_is_enforced() {
        let pool: Pool<()> = Pool::new(PoolConfig::new(1, 0));
        assert!(pool.reserve(-1).is_some());
        assert!(pool.reserve(-1).is_none());
        assert_eq!(pool.size(), 1);
    }
}
