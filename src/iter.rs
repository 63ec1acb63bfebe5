//! Bucket-order traversal of a `ChainedMap`
//!
//! Entries are visited in ascending bucket index and, within a bucket, in
//! storage order. The borrowing iterators are built on [`Cursor`], a plain
//! `(bucket, slot)` position that is resolved against the table on every step.

use crate::bucket::{Bucket, Entry};
use std::iter::{Flatten, FusedIterator};

/// Position of one entry inside the bucket table.
///
/// A cursor does not borrow the map. It stays meaningful only until the next
/// mutation of the map it came from: after an insert, removal, clear or
/// resize it may resolve to a different entry or to nothing. Resolving a
/// stale cursor is always memory safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    /// Index of the bucket
    bucket: usize,
    /// Position inside the bucket
    slot: usize,
}

impl Cursor {
    /// Returns the bucket index this cursor points into
    #[must_use]
    pub fn bucket(&self) -> usize {
        self.bucket
    }

    /// Returns the position inside the bucket
    #[must_use]
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// First entry of the first non-empty bucket, or `end` for an empty table
    pub(crate) fn begin<K, V>(buckets: &[Bucket<K, V>]) -> Self {
        buckets
            .iter()
            .position(|bucket| !bucket.is_empty())
            .map_or_else(|| Self::end(buckets), |bucket| Self { bucket, slot: 0 })
    }

    /// One past the last entry of the last bucket
    pub(crate) fn end<K, V>(buckets: &[Bucket<K, V>]) -> Self {
        Self {
            bucket: buckets.len().saturating_sub(1),
            slot: buckets.last().map_or(0, Vec::len),
        }
    }

    /// Steps to the next entry, skipping empty buckets
    pub(crate) fn advance<K, V>(self, buckets: &[Bucket<K, V>]) -> Self {
        let end = Self::end(buckets);
        if self == end {
            return end;
        }

        let slot = self.slot.saturating_add(1);
        if buckets.get(self.bucket).is_some_and(|bucket| slot < bucket.len()) {
            return Self { bucket: self.bucket, slot };
        }

        let start = self.bucket.saturating_add(1);
        buckets
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, bucket)| !bucket.is_empty())
            .map_or(end, |(bucket, _)| Self { bucket, slot: 0 })
    }

    /// Looks up the entry under this cursor
    pub(crate) fn resolve<K, V>(self, buckets: &[Bucket<K, V>]) -> Option<&Entry<K, V>> {
        buckets.get(self.bucket)?.get(self.slot)
    }
}

/// Iterator over the key-value pairs of a `ChainedMap`
#[derive(Debug, Clone)]
pub struct Iter<'a, K, V> {
    /// Buckets of the borrowed map
    buckets: &'a [Bucket<K, V>],
    /// Next entry to yield
    cursor: Cursor,
    /// Entries not yet yielded
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    /// Starts an iteration at `begin`
    pub(crate) fn new(buckets: &'a [Bucket<K, V>], len: usize) -> Self {
        Self { buckets, cursor: Cursor::begin(buckets), remaining: len }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entry = self.cursor.resolve(self.buckets)?;
        self.cursor = self.cursor.advance(self.buckets);
        self.remaining = self.remaining.saturating_sub(1);
        Some((&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Iterator over the key-value pairs of a `ChainedMap` with mutable values
#[derive(Debug)]
pub struct IterMut<'a, K, V> {
    /// Entries of the borrowed map in bucket order
    inner: Flatten<std::slice::IterMut<'a, Bucket<K, V>>>,
    /// Entries not yet yielded
    remaining: usize,
}

impl<'a, K, V> IterMut<'a, K, V> {
    /// Starts a mutable iteration over all buckets
    pub(crate) fn new(buckets: &'a mut [Bucket<K, V>], len: usize) -> Self {
        Self { inner: buckets.iter_mut().flatten(), remaining: len }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.inner.next()?;
        self.remaining = self.remaining.saturating_sub(1);
        Some((&entry.key, &mut entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// Owning iterator over the key-value pairs of a `ChainedMap`
#[derive(Debug)]
pub struct IntoIter<K, V> {
    /// Entries of the consumed map in bucket order
    inner: Flatten<std::vec::IntoIter<Bucket<K, V>>>,
    /// Entries not yet yielded
    remaining: usize,
}

impl<K, V> IntoIter<K, V> {
    /// Takes ownership of all buckets
    pub(crate) fn new(buckets: Vec<Bucket<K, V>>, len: usize) -> Self {
        Self { inner: buckets.into_iter().flatten(), remaining: len }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.inner.next()?;
        self.remaining = self.remaining.saturating_sub(1);
        Some((entry.key, entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

/// Iterator over the keys of a `ChainedMap`
#[derive(Debug, Clone)]
pub struct Keys<'a, K, V> {
    /// Underlying pair iterator
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Keys<'a, K, V> {
    /// Wraps a pair iterator
    pub(crate) fn new(inner: Iter<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// Iterator over the values of a `ChainedMap`
#[derive(Debug, Clone)]
pub struct Values<'a, K, V> {
    /// Underlying pair iterator
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Values<'a, K, V> {
    /// Wraps a pair iterator
    pub(crate) fn new(inner: Iter<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}
