//! Bucket store: a power-of-two array of independent chains

use std::{
    borrow::Borrow,
    collections::{TryReserveError, hash_map::DefaultHasher},
    hash::{Hash, Hasher},
    mem,
};

/// A stored key-value pair together with the cached hash of its key
#[derive(Debug, Clone)]
pub(crate) struct Entry<K, V> {
    /// Hash of `key`, reused for every re-index
    pub(crate) hash: u64,
    /// The key in the key-value pair
    pub(crate) key: K,
    /// The value associated with the key
    pub(crate) value: V,
}

/// One chain of entries sharing a bucket index; order carries no meaning
pub(crate) type Bucket<K, V> = Vec<Entry<K, V>>;

/// Computes the hash for a key
pub(crate) fn hash_key<Q: ?Sized + Hash>(key: &Q) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

/// Maps a hash onto `[0, capacity)`; `capacity` must be a power of two
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn index_for(hash: u64, capacity: usize) -> usize {
    (hash as usize) & capacity.saturating_sub(1)
}

/// Fixed-length array of buckets owned by a single map
#[derive(Debug, Clone)]
pub(crate) struct Table<K, V> {
    /// Exactly `capacity` chains
    buckets: Vec<Bucket<K, V>>,
}

impl<K, V> Table<K, V> {
    /// Creates a table of `capacity` empty buckets
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let mut buckets = Vec::with_capacity(capacity);
        buckets.resize_with(capacity, Vec::new);
        Self { buckets }
    }

    /// Returns the number of buckets
    pub(crate) fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns all buckets in index order
    pub(crate) fn buckets(&self) -> &[Bucket<K, V>] {
        &self.buckets
    }

    /// Returns all buckets in index order, mutably
    pub(crate) fn buckets_mut(&mut self) -> &mut [Bucket<K, V>] {
        &mut self.buckets
    }

    /// Consumes the table, yielding its buckets in index order
    pub(crate) fn into_buckets(self) -> Vec<Bucket<K, V>> {
        self.buckets
    }

    /// Returns the chain a hash maps to
    #[allow(clippy::indexing_slicing)]
    pub(crate) fn chain(&self, hash: u64) -> &Bucket<K, V> {
        // the mask keeps the index below `buckets.len()`
        &self.buckets[index_for(hash, self.buckets.len())]
    }

    /// Returns the chain a hash maps to, mutably
    #[allow(clippy::indexing_slicing)]
    pub(crate) fn chain_mut(&mut self, hash: u64) -> &mut Bucket<K, V> {
        let index = index_for(hash, self.buckets.len());
        &mut self.buckets[index]
    }

    /// Locates an entry's position within its chain
    pub(crate) fn position<Q>(&self, hash: u64, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.chain(hash).iter().position(|entry| entry.hash == hash && entry.key.borrow() == key)
    }

    /// Finds the entry for a key
    pub(crate) fn find<Q>(&self, hash: u64, key: &Q) -> Option<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.chain(hash).iter().find(|entry| entry.hash == hash && entry.key.borrow() == key)
    }

    /// Finds the entry for a key, mutably
    pub(crate) fn find_mut<Q>(&mut self, hash: u64, key: &Q) -> Option<&mut Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.chain_mut(hash).iter_mut().find(|entry| entry.hash == hash && entry.key.borrow() == key)
    }

    /// Appends an entry to its chain and returns its position there.
    ///
    /// The caller guarantees the key is not already present.
    pub(crate) fn push(&mut self, entry: Entry<K, V>) -> usize {
        let chain = self.chain_mut(entry.hash);
        chain.push(entry);
        chain.len().saturating_sub(1)
    }

    /// Returns the value stored at a known chain position
    #[allow(clippy::indexing_slicing)]
    pub(crate) fn value_at_mut(&mut self, hash: u64, slot: usize) -> &mut V {
        &mut self.chain_mut(hash)[slot].value
    }

    /// Detaches the entry for a key; the order of the rest of the chain is not kept
    pub(crate) fn take<Q>(&mut self, hash: u64, key: &Q) -> Option<Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let slot = self.position(hash, key)?;
        Some(self.chain_mut(hash).swap_remove(slot))
    }

    /// Drops every entry, keeping the bucket count
    pub(crate) fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    /// Relocates every entry into a fresh table of `new_capacity` buckets.
    ///
    /// All storage for the new table is reserved before any entry moves, so on
    /// failure the current table is left untouched.
    pub(crate) fn try_rehash(&mut self, new_capacity: usize) -> Result<(), TryReserveError> {
        let mut counts: Vec<usize> = Vec::new();
        counts.try_reserve_exact(new_capacity)?;
        counts.resize(new_capacity, 0);
        for entry in self.buckets.iter().flatten() {
            if let Some(count) = counts.get_mut(index_for(entry.hash, new_capacity)) {
                *count = count.saturating_add(1);
            }
        }

        let mut buckets: Vec<Bucket<K, V>> = Vec::new();
        buckets.try_reserve_exact(new_capacity)?;
        for count in counts {
            let mut bucket = Vec::new();
            bucket.try_reserve_exact(count)?;
            buckets.push(bucket);
        }

        // every bucket holds exactly its final length, so no push below reallocates
        let old = mem::replace(&mut self.buckets, buckets);
        for entry in old.into_iter().flatten() {
            if let Some(bucket) = self.buckets.get_mut(index_for(entry.hash, new_capacity)) {
                bucket.push(entry);
            }
        }
        Ok(())
    }

    /// Compares bucket contents index by index, ignoring order within a bucket
    pub(crate) fn same_entries(&self, other: &Self) -> bool
    where
        K: Eq,
        V: PartialEq,
    {
        self.buckets.len() == other.buckets.len() &&
            self.buckets.iter().zip(&other.buckets).all(|(ours, theirs)| {
                ours.len() == theirs.len() &&
                    ours.iter().all(|entry| {
                        theirs.iter().any(|candidate| {
                            candidate.key == entry.key && candidate.value == entry.value
                        })
                    })
            })
    }
}
