//! Chain-length diagnostics for `ChainedMap`

use crate::ChainedMap;
use std::hash::Hash;

/// Extension trait exposing how entries are spread across buckets.
///
/// Long chains point at a degenerate hash for the key type; with a good hash
/// the mean stays close to the load factor.
pub trait ChainStatistics {
    /// Returns the length of every bucket in index order
    fn chain_lengths(&self) -> Vec<usize>;

    /// Returns the length of the longest bucket
    fn longest_chain(&self) -> usize;

    /// Returns the mean length over non-empty buckets, `0.0` for an empty map
    fn mean_chain_length(&self) -> f64;

    /// Returns `histogram[n]` = number of buckets holding exactly `n` entries
    fn chain_histogram(&self) -> Vec<usize>;
}

impl<K, V> ChainStatistics for ChainedMap<K, V>
where
    K: Eq + Hash,
{
    fn chain_lengths(&self) -> Vec<usize> {
        self.buckets().iter().map(Vec::len).collect()
    }

    fn longest_chain(&self) -> usize {
        self.buckets().iter().map(Vec::len).max().unwrap_or(0)
    }

    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    fn mean_chain_length(&self) -> f64 {
        let occupied = self.buckets().iter().filter(|bucket| !bucket.is_empty()).count();
        if occupied == 0 {
            return 0.0;
        }
        self.len() as f64 / occupied as f64
    }

    fn chain_histogram(&self) -> Vec<usize> {
        let mut histogram = vec![0_usize; self.longest_chain().saturating_add(1)];
        for len in self.buckets().iter().map(Vec::len) {
            if let Some(count) = histogram.get_mut(len) {
                *count = count.saturating_add(1);
            }
        }
        histogram
    }
}
