// src/lib.rs
//! # slotpool
//!
//! A generic, lock-free, multiplexing object pool.
//!
//! Three features make this more than a `Vec<T>` behind a `Mutex`:
//!
//! - **Multiplexing** — an entry may be acquired up to `max_multiplex` times
//!   concurrently, not just once.
//! - **Usage-count retirement** — an entry retires (and must be removed)
//!   after `max_usage_count` acquisitions.
//! - **Per-thread caching** over a lock-free, copy-on-write shared entry
//!   list, so the common case touches no shared cache line at all.
//!
//! Entry state is two signed 32-bit counters packed into one 64-bit atomic
//! word (see [`bicounter`]), so every transition — enable, acquire, release,
//! remove — is a single compare-and-swap. Acquisition never blocks: it
//! either succeeds immediately or reports nothing was available.
//!
//! ```
//! use slotpool::prelude::*;
//!
//! let pool: Pool<String> = Pool::new(PoolConfig::new(4, 8));
//! let reservation = pool.reserve(-1).expect("under capacity");
//! reservation.enable(String::from("connection #1")).unwrap();
//!
//! let acquired = pool.acquire_guarded().expect("an entry is idle");
//! assert_eq!(acquired.as_str(), "connection #1");
//! // dropped here: automatically released back to the pool
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod acquired;
pub mod bicounter;
pub mod entry;
pub mod error;
pub mod pool;
pub mod reservation;

pub use acquired::Acquired;
pub use entry::Entry;
pub use error::{PoolError, Result};
pub use pool::{Disposable, Pool, PoolConfig, PoolStats};
pub use reservation::Reservation;

/// Commonly used imports.
pub mod prelude {
    pub use crate::acquired::Acquired;
    pub use crate::entry::Entry;
    pub use crate::error::{PoolError, Result};
    pub use crate::pool::{Disposable, Pool, PoolConfig, PoolStats};
    pub use crate::reservation::Reservation;
}
