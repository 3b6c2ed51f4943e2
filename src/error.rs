// src/error.rs
//! Error types for pool configuration and reservation misuse.

use std::fmt;

/// Errors produced by pool configuration and reservation operations.
///
/// These cover only the "programmer error" class described in the crate's
/// error handling design: invalid configuration arguments and reservation
/// misuse. Ordinary capacity/availability outcomes (a full pool, a retired
/// entry, a closed pool) are communicated by `Option`/`bool` return values,
/// never by this type — see [`crate::pool::Pool::acquire`] and friends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// `setMaxMultiplex` was called with `n < 1`.
    InvalidMaxMultiplex(i32),
    /// `setMaxUsageCount` was called with `k == 0`.
    InvalidMaxUsageCount,
    /// `enable`/`acquire` was called on a Reservation whose Entry is no
    /// longer pending (already enabled, or removed out from under it).
    NotPending,
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMaxMultiplex(n) => {
                write!(f, "max multiplex must be >= 1, got {}", n)
            }
            Self::InvalidMaxUsageCount => {
                write!(f, "max usage count must not be 0")
            }
            Self::NotPending => write!(f, "entry is not in the pending state"),
        }
    }
}

impl std::error::Error for PoolError {}

/// Convert `PoolError` to `anyhow::Error` for downstream consumers that
/// collapse all error types into one.
#[cfg(feature = "anyhow")]
impl From<PoolError> for anyhow::Error {
    fn from(err: PoolError) -> Self {
        anyhow::anyhow!("{}", err)
    }
}

/// Result type alias for pool configuration and reservation operations.
pub type Result<T> = std::result::Result<T, PoolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_stable() {
        assert_eq!(
            PoolError::InvalidMaxMultiplex(0).to_string(),
            "max multiplex must be >= 1, got 0"
        );
        assert_eq!(
            PoolError::InvalidMaxUsageCount.to_string(),
            "max usage count must not be 0"
        );
    }

    #[cfg(feature = "anyhow")]
    #[test]
    fn converts_to_anyhow() {
        let err: anyhow::Error = PoolError::NotPending.into();
        assert!(err.to_string().contains("pending"));
    }
}
