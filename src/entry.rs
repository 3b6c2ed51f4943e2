// src/entry.rs
//! A single pooled slot: an atomic state machine plus a write-once value.

use crate::bicounter::BiCounter;
use std::sync::OnceLock;
use tracing::trace;

/// One slot in a [`crate::pool::Pool`]'s shared list.
///
/// Owns a [`BiCounter`] encoding `(hi, lo)` — usage count and multiplex count
/// — and a [`OnceLock`] holding the pooled value, written exactly once during
/// `enable`. All transitions are a single dual-field CAS on the counter; see
/// the module-level notes in `lib.rs` for the full state table.
pub struct Entry<T> {
    state: BiCounter,
    pooled: OnceLock<T>,
}

impl<T> Entry<T> {
    /// Constructs a pending entry, `(MIN, 0)`, with no value yet.
    pub(crate) fn pending() -> Self {
        Self {
            state: BiCounter::new(i32::MIN, 0),
            pooled: OnceLock::new(),
        }
    }

    /// Publishes `value`, transitioning `(MIN, 0) -> (0, 0)`.
    ///
    /// Fails (and the caller should drop `value`) if the entry is not
    /// pending, e.g. because it was already enabled or concurrently removed.
    pub(crate) fn try_enable(&self, value: T) -> Result<(), T> {
        let (hi, lo) = self.state.get();
        if hi != i32::MIN || !self.state.compare_and_set(hi, lo, 0, 0) {
            return Err(value);
        }
        // Only one thread can win the CAS above, so this set is uncontended.
        if self.pooled.set(value).is_err() {
            unreachable!("pending entry cannot already hold a value");
        }
        Ok(())
    }

    /// Publishes `value` and atomically performs the first acquisition,
    /// transitioning `(MIN, 0) -> (1, 1)`.
    pub(crate) fn try_enable_and_acquire(&self, value: T) -> Result<(), T> {
        let (hi, lo) = self.state.get();
        if hi != i32::MIN || !self.state.compare_and_set(hi, lo, 1, 1) {
            return Err(value);
        }
        if self.pooled.set(value).is_err() {
            unreachable!("pending entry cannot already hold a value");
        }
        Ok(())
    }

    /// Attempts to acquire one multiplex slot.
    ///
    /// `max_multiplex` and `max_usage_count` are read fresh on every retry of
    /// the CAS loop (per the crate's accepted eventual-consistency contract
    /// for dynamic reconfiguration); `max_usage_count <= 0` means unbounded.
    pub(crate) fn try_acquire(&self, max_multiplex: i32, max_usage_count: i32) -> bool {
        loop {
            let (hi, lo) = self.state.get();
            if hi < 0 {
                return false; // closed or pending
            }
            if lo >= max_multiplex {
                return false;
            }
            if max_usage_count > 0 && hi >= max_usage_count {
                return false;
            }
            if self.state.compare_and_set(hi, lo, hi + 1, lo + 1) {
                trace!(hi = hi + 1, lo = lo + 1, "entry acquired");
                return true;
            }
        }
    }

    /// Releases one multiplex slot.
    ///
    /// Returns `false` if the entry is already closed (the caller should now
    /// call `Pool::remove`) or if it has just exhausted `maxUsageCount` with
    /// no remaining concurrent users (same instruction to the caller).
    /// Returns `true` if the entry remains reusable.
    ///
    /// # Panics
    ///
    /// Panics on a double-release: a post-decrement multiplex count below
    /// zero indicates the caller released an entry it did not hold, which is
    /// corrupted bookkeeping rather than a recoverable outcome.
    pub(crate) fn try_release(&self, max_usage_count: i32) -> bool {
        loop {
            let (hi, lo) = self.state.get();
            if hi < 0 {
                return false;
            }
            let new_lo = lo - 1;
            if new_lo < 0 {
                panic!("double release: entry released more times than acquired");
            }
            if self.state.compare_and_set(hi, lo, hi, new_lo) {
                trace!(hi, lo = new_lo, "entry released");
                let over_used = max_usage_count > 0 && hi >= max_usage_count;
                return !(over_used && new_lo == 0);
            }
        }
    }

    /// Forces the entry to the terminal closed state `(-1, max(lo - 1, 0))`.
    ///
    /// Returns `true` exactly once, to the one thread whose CAS leaves the
    /// entry both closed and idle — the "delete token" that authorizes
    /// unlinking the entry from the shared list and disposing its value.
    pub(crate) fn try_remove(&self) -> bool {
        loop {
            let (hi, lo) = self.state.get();
            let new_lo = (lo - 1).max(0);
            if self.state.compare_and_set(hi, lo, -1, new_lo) {
                trace!(was_hi = hi, was_lo = lo, "entry closed");
                return new_lo == 0;
            }
        }
    }

    /// `true` iff no outstanding acquisitions (`lo <= 0`).
    pub fn is_idle(&self) -> bool {
        self.state.get().1 <= 0
    }

    /// `true` iff the entry has reached the terminal closed state (`hi < 0`).
    pub fn is_closed(&self) -> bool {
        self.state.get().0 < 0
    }

    /// `true` iff the entry has never been enabled (`hi == MIN`).
    pub(crate) fn is_pending(&self) -> bool {
        self.state.get().0 == i32::MIN
    }

    /// Number of acquisitions completed since enablement, `max(hi, 0)`.
    pub fn usage_count(&self) -> usize {
        self.state.get().0.max(0) as usize
    }

    /// Raw `(hi, lo)` snapshot, used by observability and tests.
    pub(crate) fn raw_state(&self) -> (i32, i32) {
        self.state.get()
    }

    /// Returns the pooled value, if the entry has been enabled.
    ///
    /// Safe to call from any thread after observing a successful
    /// `try_acquire`, because the enabling CAS happens-before it.
    pub fn pooled(&self) -> Option<&T> {
        self.pooled.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enable_moves_pending_to_open_idle() {
        let e = Entry::pending();
        assert!(e.is_pending());
        e.try_enable(42).unwrap();
        assert!(!e.is_pending());
        assert!(e.is_idle());
        assert_eq!(e.pooled(), Some(&42));
    }

    #[test]
    fn double_enable_fails_and_returns_value() {
        let e = Entry::pending();
        e.try_enable(1).unwrap();
        let err = e.try_enable(2).unwrap_err();
        assert_eq!(err, 2);
        assert_eq!(e.pooled(), Some(&1));
    }

    #[test]
    fn enable_and_acquire_is_atomic() {
        let e = Entry::pending();
        e.try_enable_and_acquire("x").unwrap();
        assert_eq!(e.raw_state(), (1, 1));
        assert!(!e.is_idle());
    }

    #[test]
    fn acquire_respects_multiplex_cap() {
        let e = Entry::pending();
        e.try_enable(()).unwrap();
        assert!(e.try_acquire(2, -1));
        assert!(e.try_acquire(2, -1));
        assert!(!e.try_acquire(2, -1)); // at cap
    }

    #[test]
    fn acquire_respects_usage_count_cap() {
        let e = Entry::pending();
        e.try_enable(()).unwrap();
        assert!(e.try_acquire(1, 2));
        assert!(e.try_release(2));
        assert!(e.try_acquire(1, 2));
        assert!(!e.try_release(2)); // retired: hi(2) >= max_usage_count(2), lo now 0
        assert!(!e.try_acquire(1, 2)); // retired entries never re-acquire
    }

    #[test]
    fn remove_is_a_single_delete_token() {
        let e = Entry::pending();
        e.try_enable(()).unwrap();
        assert!(e.try_acquire(2, -1));
        assert!(e.try_acquire(2, -1));
        // still multiplexed: tryRemove returns false, entry closed but not idle
        assert!(!e.try_remove());
        assert!(e.is_closed());
        assert!(!e.is_idle());
        // second multiplex user releases onto a closed entry
        assert!(!e.try_release(-1));
        // first multiplex user is still outstanding; remove is idempotent-ish
        // but only the call that drives lo to 0 returns true
        assert!(e.try_remove()); // lo: 1 -> 0
    }

    #[test]
    #[should_panic(expected = "double release")]
    fn double_release_panics() {
        let e = Entry::pending();
        e.try_enable(()).unwrap();
        assert!(e.try_acquire(1, -1));
        assert!(e.try_release(-1));
        e.try_release(-1); // nothing outstanding: panics
    }

    #[test]
    fn usage_count_never_reports_negative() {
        let e = Entry::<()>::pending();
        assert_eq!(e.usage_count(), 0);
    }
}
