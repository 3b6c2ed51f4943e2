// src/pool/config.rs
//! Construction-time configuration for a pool.

/// Configuration for [`crate::pool::Pool`] construction.
///
/// `max_entries` and `cache_size` are fixed for the pool's lifetime;
/// `max_multiplex` and `max_usage_count` are only the *initial* values —
/// both are mutable afterwards via `Pool::set_max_multiplex` and
/// `Pool::set_max_usage_count`.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Hard upper bound on the number of entries the shared list may hold.
    pub max_entries: usize,
    /// Per-thread cache capacity; `0` disables the cache entirely.
    pub cache_size: usize,
    /// Initial cap on concurrent acquisitions per entry. Must be `>= 1`.
    pub max_multiplex: i32,
    /// Initial cap on lifetime acquisitions per entry. Negative means
    /// unbounded. Must not be `0`.
    pub max_usage_count: i32,
}

impl PoolConfig {
    /// Constructs a config with `max_multiplex = 1` and
    /// `max_usage_count` unbounded — the pool's own defaults.
    pub fn new(max_entries: usize, cache_size: usize) -> Self {
        Self {
            max_entries,
            cache_size,
            max_multiplex: 1,
            max_usage_count: -1,
        }
    }

    /// A pool where every entry may be used exactly once before retiring.
    pub fn single_use(max_entries: usize, cache_size: usize) -> Self {
        Self {
            max_usage_count: 1,
            ..Self::new(max_entries, cache_size)
        }
    }

    /// A pool with no usage-count retirement at all (the default).
    pub fn unbounded(max_entries: usize, cache_size: usize) -> Self {
        Self::new(max_entries, cache_size)
    }

    /// A pool where each entry may be acquired concurrently up to `n` times.
    pub fn multiplexed(max_entries: usize, cache_size: usize, n: i32) -> Self {
        Self {
            max_multiplex: n,
            ..Self::new(max_entries, cache_size)
        }
    }
}
