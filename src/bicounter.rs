// src/bicounter.rs
//! Packed two-field atomic word used as the sole synchronization primitive
//! for entry state transitions.

use crossbeam::utils::CachePadded;
use std::sync::atomic::{AtomicU64, Ordering};

/// Two signed 32-bit counters, `(hi, lo)`, packed into one 64-bit atomic word.
///
/// `hi` occupies the high 32 bits, `lo` the low 32 bits, both as two's-complement
/// signed values. Every transition goes through [`BiCounter::compare_and_set`],
/// which compares and replaces both fields in a single CAS — partial updates to
/// just one field are never observable.
///
/// Wrapped in [`CachePadded`] so that two entries' counters allocated adjacently
/// (as they are inside [`crate::pool::Pool`]'s shared list) never false-share a
/// cache line under concurrent CAS traffic.
pub(crate) struct BiCounter(CachePadded<AtomicU64>);

#[inline]
fn pack(hi: i32, lo: i32) -> u64 {
    ((hi as u32 as u64) << 32) | (lo as u32 as u64)
}

#[inline]
fn unpack(word: u64) -> (i32, i32) {
    ((word >> 32) as u32 as i32, word as u32 as i32)
}

impl BiCounter {
    /// Creates a counter initialized to `(hi, lo)`.
    pub(crate) fn new(hi: i32, lo: i32) -> Self {
        Self(CachePadded::new(AtomicU64::new(pack(hi, lo))))
    }

    /// Loads both fields with acquire ordering.
    #[inline]
    pub(crate) fn get(&self) -> (i32, i32) {
        unpack(self.0.load(Ordering::Acquire))
    }

    /// Atomically replaces `(expected_hi, expected_lo)` with `(new_hi, new_lo)`.
    ///
    /// Succeeds only if both fields currently match the expected values.
    /// Release ordering on success publishes any writes that happened before
    /// the call (e.g. [`crate::entry::Entry::pooled`]); acquire ordering on
    /// failure lets the caller re-read a consistent `(hi, lo)` for its retry.
    #[inline]
    pub(crate) fn compare_and_set(
        &self,
        expected_hi: i32,
        expected_lo: i32,
        new_hi: i32,
        new_lo: i32,
    ) -> bool {
        let expected = pack(expected_hi, expected_lo);
        let new = pack(new_hi, new_lo);
        self.0
            .compare_exchange(expected, new, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
