//! Error type shared by every fallible `ChainedMap` operation

use std::collections::TryReserveError;
use thiserror::Error;

/// Errors reported by `ChainedMap` and `LoadFactors`
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Load-factor bounds do not satisfy `0 < lower < upper < 1`
    #[error("invalid load factors: lower {lower}, upper {upper} (expected 0 < lower < upper < 1)")]
    InvalidConfiguration {
        /// Requested lower bound
        lower: f64,
        /// Requested upper bound
        upper: f64,
    },

    /// Parallel key and value sequences have different lengths
    #[error("mismatched sequence lengths: {keys} keys, {values} values")]
    InvalidArgument {
        /// Number of keys supplied
        keys: usize,
        /// Number of values supplied
        values: usize,
    },

    /// The requested key is not stored in the map
    #[error("key not found")]
    KeyNotFound,

    /// A resized bucket table could not be allocated; the map is unchanged
    #[error("failed to allocate a table of {capacity} buckets")]
    AllocationFailure {
        /// Bucket count of the table that could not be allocated
        capacity: usize,
        /// Underlying reservation failure
        #[source]
        source: TryReserveError,
    },
}

/// Result alias used throughout the crate
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::InvalidConfiguration { lower: 0.8, upper: 0.5 };
        assert_eq!(
            err.to_string(),
            "invalid load factors: lower 0.8, upper 0.5 (expected 0 < lower < upper < 1)"
        );

        let err = Error::InvalidArgument { keys: 3, values: 2 };
        assert_eq!(err.to_string(), "mismatched sequence lengths: 3 keys, 2 values");

        assert_eq!(Error::KeyNotFound.to_string(), "key not found");
    }

    #[test]
    fn test_allocation_failure_keeps_source() {
        let mut buf: Vec<u64> = Vec::new();
        let Err(source) = buf.try_reserve_exact(usize::MAX) else {
            return;
        };
        let err = Error::AllocationFailure { capacity: 1 << 20, source };

        assert_eq!(err.to_string(), "failed to allocate a table of 1048576 buckets");
        assert!(std::error::Error::source(&err).is_some());
    }
}
