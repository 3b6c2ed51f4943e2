// src/pool/cache.rs
//! Per-thread, per-pool-instance cache of recently released entries.
//!
//! `std::thread_local!` is keyed per declaration site, not per value, so one
//! `thread_local!` cannot directly serve every `Pool<T>` instance a thread
//! happens to touch. This works around it the way a discriminant-keyed
//! thread-local registry would: the `thread_local!` is declared inside a
//! generic function, so the compiler monomorphizes a distinct static per
//! `T`, and that per-`T` static is further keyed by [`PoolId`] so distinct
//! `Pool<T>` instances of the same `T` never share a cache.

use crate::entry::Entry;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one `Pool<T>` instance for thread-local cache lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct PoolId(u64);

impl PoolId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

fn cache_for<T: 'static, F, R>(f: F) -> R
where
    F: FnOnce(&mut HashMap<PoolId, Vec<Arc<Entry<T>>>>) -> R,
{
    // This function is generic over `T`, so rustc monomorphizes a distinct
    // static per `T` — the per-instance keying comes from `PoolId` below.
    thread_local! {
        static CACHE: RefCell<HashMap<PoolId, Vec<Arc<Entry<T>>>>> = RefCell::new(HashMap::new());
    }
    CACHE.with(|cell| f(&mut cell.borrow_mut()))
}

/// Pushes `entry` onto this thread's cache for `pool_id` if there is room
/// (`cache_size` is the pool's configured per-thread capacity).
pub(crate) fn push<T: 'static>(pool_id: PoolId, cache_size: usize, entry: Arc<Entry<T>>) {
    cache_for::<T, _, _>(|cache| {
        let slots = cache.entry(pool_id).or_default();
        if slots.len() < cache_size {
            slots.push(entry);
        }
    })
}

/// Pops entries from this thread's cache for `pool_id`, calling `try_acquire`
/// on each until one succeeds. Entries that fail `try_acquire` (stale or
/// poisoned) are discarded, never pushed back. Returns `None` once the cache
/// empties without a hit.
pub(crate) fn pop_first_acquirable<T: 'static>(
    pool_id: PoolId,
    max_multiplex: i32,
    max_usage_count: i32,
) -> Option<Arc<Entry<T>>> {
    cache_for::<T, _, _>(|cache| {
        let slots = cache.entry(pool_id).or_default();
        while let Some(candidate) = slots.pop() {
            if candidate.try_acquire(max_multiplex, max_usage_count) {
                return Some(candidate);
            }
        }
        None
    })
}

/// Drops this thread's cached entries for `pool_id` without touching the
/// shared list. Called when a pool closes so this thread's `Arc` clones do
/// not keep removed entries alive past their disposal.
pub(crate) fn clear<T: 'static>(pool_id: PoolId) {
    cache_for::<T, _, _>(|cache| {
        cache.remove(&pool_id);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_then_pop_round_trips_an_acquirable_entry() {
        let id = PoolId::next();
        let entry = Arc::new(Entry::pending());
        entry.try_enable(()).unwrap();
        push(id, 4, Arc::clone(&entry));
        let got = pop_first_acquirable::<()>(id, 1, -1);
        assert!(got.is_some());
    }

    #[test]
    fn pop_skips_stale_entries() {
        let id = PoolId::next();
        let entry = Arc::new(Entry::pending());
        entry.try_enable(()).unwrap();
        entry.try_remove();
        push(id, 4, Arc::clone(&entry));
        assert!(pop_first_acquirable::<()>(id, 1, -1).is_none());
    }

    #[test]
    fn push_respects_cache_size_cap() {
        let id = PoolId::next();
        for _ in 0..5 {
            let entry = Arc::new(Entry::pending());
            entry.try_enable(()).unwrap();
            push(id, 2, entry);
        }
        let mut hits = 0;
        while pop_first_acquirable::<()>(id, 1, -1).is_some() {
            hits += 1;
        }
        assert!(hits <= 2);
    }
}
