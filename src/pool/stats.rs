// src/pool/stats.rs
//! Observability snapshot for a pool.

/// A point-in-time snapshot of a pool's entry counts.
///
/// Each field is read with its own atomic load, so the snapshot as a whole
/// is not linearizable across fields under concurrent mutation — consistent
/// with the crate's observability contract ("monotonic snapshots, no
/// synchronization required beyond atomic loads").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Entries reserved but not yet enabled (`hi == MIN`).
    pub pending: usize,
    /// Entries open with zero outstanding acquisitions.
    pub idle: usize,
    /// Entries open with at least one outstanding acquisition.
    pub in_use: usize,
    /// Total entries currently in the shared list.
    pub size: usize,
    /// Whether `close()` has been called.
    pub is_closed: bool,
}

impl PoolStats {
    /// `idle + in_use`, i.e. entries that have been enabled at least once
    /// and have not yet been removed.
    pub fn open(&self) -> usize {
        self.idle + self.in_use
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_sums_idle_and_in_use() {
        let s = PoolStats {
            pending: 1,
            idle: 2,
            in_use: 3,
            size: 6,
            is_closed: false,
        };
        assert_eq!(s.open(), 5);
    }
}
