//! # Chained Hash Map
//!
//! A Rust implementation of a hash table with separate chaining and
//! load-factor driven resizing.
//!
//! `ChainedMap` keeps a power-of-two array of buckets, each an independent
//! chain of entries. The table doubles before an insert would exceed the upper
//! load factor and halves after a removal falls below the lower one, never
//! dropping under 16 buckets. Every key is stored at most once: inserting an
//! existing key is rejected and the first value is kept.
//!
//! ## Basic Usage
//!
//! ```rust
//! use chainmap::ChainedMap;
//!
//! // Create a new hash map
//! let mut map = ChainedMap::new();
//!
//! // Insert values
//! assert!(map.insert("apple".to_string(), 1));
//! assert!(map.insert("banana".to_string(), 2));
//!
//! // The first value for a key wins
//! assert!(!map.insert("apple".to_string(), 10));
//! assert_eq!(map.get("apple"), Some(&1));
//!
//! // Fallible lookup
//! assert!(map.at("cherry").is_err());
//!
//! // Remove values
//! assert!(map.erase("apple"));
//! assert_eq!(map.get("apple"), None);
//! ```
//!
//! ## Building From Parallel Sequences
//!
//! ```rust
//! use chainmap::{ChainedMap, Error};
//!
//! let phrases = vec!["free money", "act now", "free money"];
//! let weights = vec![5, 3, 8];
//! let map = ChainedMap::from_parallel(phrases, weights)?;
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.at("free money")?, &5);
//!
//! let message = "act now for free money";
//! let score: i32 = map
//!     .iter()
//!     .map(|(phrase, weight)| weight * i32::try_from(message.matches(phrase).count()).unwrap_or(0))
//!     .sum();
//! assert_eq!(score, 8);
//! # Ok::<(), Error>(())
//! ```
//!
//! ## Custom Load Factors
//!
//! ```rust
//! use chainmap::ChainedMap;
//!
//! let mut map = ChainedMap::with_load_factors(0.1, 0.5)?;
//! for i in 0..9 {
//!     map.insert(i, i * i);
//! }
//! // 9 / 16 would exceed 0.5, so the ninth insert doubled the table first
//! assert_eq!(map.capacity(), 32);
//! assert!(ChainedMap::<u32, u32>::with_load_factors(0.8, 0.5).is_err());
//! # Ok::<(), chainmap::Error>(())
//! ```

/// Module implementing the bucket array and its rehash
mod bucket;
/// Module implementing the public map type
mod chained_map;
/// Error type for fallible operations
mod error;
/// Iterators and cursors over the bucket table
mod iter;
/// Load-factor bounds and resize planning
mod load_factor;
/// Chain-length diagnostics
mod utils;

pub use chained_map::ChainedMap;
pub use error::{Error, Result};
pub use iter::{Cursor, IntoIter, Iter, IterMut, Keys, Values};
pub use load_factor::{
    DEFAULT_LOWER_LOAD_FACTOR, DEFAULT_UPPER_LOAD_FACTOR, LoadFactors, MIN_CAPACITY, Resize,
};
pub use utils::ChainStatistics;
