use std::{borrow::Borrow, hash::Hash};

use crate::{
    bucket::{Bucket, Entry, Table, hash_key},
    error::{Error, Result},
    iter::{Cursor, IntoIter, Iter, IterMut, Keys, Values},
    load_factor::{LoadFactors, MIN_CAPACITY, Resize},
};

/// A hash table that resolves collisions by separate chaining.
///
/// The bucket count is always a power of two and at least [`MIN_CAPACITY`].
/// It doubles before an insert would push `len / capacity` above the upper
/// load factor, and halves after a removal drops it below the lower one.
/// Each key is stored at most once; inserting an existing key keeps the
/// value already stored.
///
/// Note: This implementation is not thread-safe.
#[derive(Debug, Clone)]
pub struct ChainedMap<K, V> {
    /// The buckets storing the key-value pairs
    table: Table<K, V>,
    /// Current number of elements in the hash table
    size: usize,
    /// Bounds that drive growth and shrink
    load_factors: LoadFactors,
}

impl<K, V> Default for ChainedMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Extend<(K, V)> for ChainedMap<K, V>
where
    K: Eq + Hash,
{
    /// Inserts every pair; a key seen earlier keeps its first value
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for ChainedMap<K, V>
where
    K: Eq + Hash,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K, V> ChainedMap<K, V>
where
    K: Eq + Hash,
{
    /// Creates an empty map with load factors (0.25, 0.75) and 16 buckets
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LoadFactors::default())
    }

    /// Creates an empty map with custom load-factor bounds
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] unless `0 < lower < upper < 1`.
    pub fn with_load_factors(lower: f64, upper: f64) -> Result<Self> {
        LoadFactors::new(lower, upper).map(Self::with_config)
    }

    /// Creates an empty map from already validated bounds
    #[must_use]
    pub fn with_config(load_factors: LoadFactors) -> Self {
        Self { table: Table::with_capacity(MIN_CAPACITY), size: 0, load_factors }
    }

    /// Builds a map from parallel key and value sequences.
    ///
    /// Pairs are inserted in order, so the first occurrence of a repeated key
    /// wins and later ones are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when the sequences differ in length.
    pub fn from_parallel<I, J>(keys: I, values: J) -> Result<Self>
    where
        I: IntoIterator<Item = K>,
        I::IntoIter: ExactSizeIterator,
        J: IntoIterator<Item = V>,
        J::IntoIter: ExactSizeIterator,
    {
        let keys = keys.into_iter();
        let values = values.into_iter();
        if keys.len() != values.len() {
            return Err(Error::InvalidArgument { keys: keys.len(), values: values.len() });
        }
        Ok(keys.zip(values).collect())
    }

    /// Returns the number of elements in the hash table
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if the hash table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the number of buckets in the hash map
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the current load factor of the hash map
    #[must_use]
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    pub fn load_factor(&self) -> f64 {
        self.size as f64 / self.table.capacity() as f64
    }

    /// Returns the bounds this map was built with
    #[must_use]
    pub fn load_factors(&self) -> LoadFactors {
        self.load_factors
    }

    /// Inserts a key-value pair if the key is absent.
    ///
    /// Returns `false` and leaves the map untouched when the key is already
    /// stored. If the grown table cannot be allocated the pair is still
    /// inserted at the current capacity and a warning is logged, which can
    /// leave the load above the upper bound. Use [`Self::try_insert`] to get
    /// the allocation failure back instead.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let hash = hash_key(&key);
        if self.table.find(hash, &key).is_some() {
            return false;
        }
        self.resize_or_warn(self.load_factors.plan_insert(self.size, self.capacity()));
        self.push(Entry { hash, key, value });
        true
    }

    /// Inserts a key-value pair if the key is absent, reporting allocation failure.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`] if growing the table fails; the
    /// map is then exactly as it was before the call.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<bool> {
        let hash = hash_key(&key);
        if self.table.find(hash, &key).is_some() {
            return Ok(false);
        }
        self.resize(self.load_factors.plan_insert(self.size, self.capacity()))?;
        self.push(Entry { hash, key, value });
        Ok(true)
    }

    /// Returns true if the map holds the key
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.find(hash_key(key), key).is_some()
    }

    /// Retrieve a value for a given key
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.find(hash_key(key), key).map(|entry| &entry.value)
    }

    /// Get a mutable reference to a value for a given key
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.find_mut(hash_key(key), key).map(|entry| &mut entry.value)
    }

    /// Returns the value for a key
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if the key is absent.
    pub fn at<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).ok_or(Error::KeyNotFound)
    }

    /// Returns the value for a key, mutably
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if the key is absent.
    pub fn at_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_mut(key).ok_or(Error::KeyNotFound)
    }

    /// Returns the value for a key, inserting `V::default()` first if it is absent.
    ///
    /// The insertion path goes through the same growth check as [`Self::insert`],
    /// including its fallback to the current capacity on allocation failure.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let hash = hash_key(&key);
        let slot = match self.table.position(hash, &key) {
            Some(slot) => slot,
            None => {
                self.resize_or_warn(self.load_factors.plan_insert(self.size, self.capacity()));
                self.push(Entry { hash, key, value: V::default() })
            }
        };
        self.table.value_at_mut(hash, slot)
    }

    /// Returns the length of the chain holding `key`
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if the key is absent.
    pub fn bucket_size<Q>(&self, key: &Q) -> Result<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = hash_key(key);
        if self.table.find(hash, key).is_none() {
            return Err(Error::KeyNotFound);
        }
        Ok(self.table.chain(hash).len())
    }

    /// Removes a key, returning its value.
    ///
    /// Shrinks the table afterwards when the load drops below the lower bound;
    /// if that allocation fails the current capacity is kept and a warning is
    /// logged. [`Self::try_remove`] reports the failure instead.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let value = self.detach(key)?;
        self.resize_or_warn(self.load_factors.plan_remove(self.size, self.capacity()));
        Some(value)
    }

    /// Removes a key, returning whether it was present
    pub fn erase<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove(key).is_some()
    }

    /// Removes a key, reporting allocation failure of the shrink.
    ///
    /// The shrink is performed before the entry is detached, so a failure
    /// leaves the key in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`] if shrinking the table fails; the
    /// map is then exactly as it was before the call.
    pub fn try_remove<Q>(&mut self, key: &Q) -> Result<Option<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if !self.contains_key(key) {
            return Ok(None);
        }
        self.resize(self.load_factors.plan_remove(self.size.saturating_sub(1), self.capacity()))?;
        Ok(self.detach(key))
    }

    /// Clears the hash map, removing all key-value pairs; the capacity is kept
    pub fn clear(&mut self) {
        self.table.clear();
        self.size = 0;
    }

    /// Returns an iterator over the key-value pairs in bucket order
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.table.buckets(), self.size)
    }

    /// Returns an iterator over the key-value pairs with mutable values
    #[must_use]
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(self.table.buckets_mut(), self.size)
    }

    /// Returns an iterator over the keys in bucket order
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    /// Returns an iterator over the values in bucket order
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.iter())
    }

    /// Cursor at the first entry, equal to [`Self::end`] when the map is empty
    #[must_use]
    pub fn begin(&self) -> Cursor {
        Cursor::begin(self.table.buckets())
    }

    /// Cursor one past the last entry of the last bucket
    #[must_use]
    pub fn end(&self) -> Cursor {
        Cursor::end(self.table.buckets())
    }

    /// Cursor following `cursor`; stays at [`Self::end`] once reached
    #[must_use]
    pub fn advance(&self, cursor: Cursor) -> Cursor {
        cursor.advance(self.table.buckets())
    }

    /// Resolves a cursor to the pair it points at
    #[must_use]
    pub fn entry_at(&self, cursor: Cursor) -> Option<(&K, &V)> {
        cursor.resolve(self.table.buckets()).map(|entry| (&entry.key, &entry.value))
    }

    /// Returns the bucket table in index order
    pub(crate) fn buckets(&self) -> &[Bucket<K, V>] {
        self.table.buckets()
    }

    /// Appends an entry known to be absent and returns its chain position
    fn push(&mut self, entry: Entry<K, V>) -> usize {
        self.size = self.size.saturating_add(1);
        self.table.push(entry)
    }

    /// Detaches an entry without consulting the load-factor policy
    fn detach<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self.table.take(hash_key(key), key)?;
        self.size = self.size.saturating_sub(1);
        Some(entry.value)
    }

    /// Carries out a resize plan, leaving the table untouched on failure
    fn resize(&mut self, plan: Resize) -> Result<()> {
        let Some(new_capacity) = plan.target() else {
            return Ok(());
        };
        let old_capacity = self.capacity();
        self.table
            .try_rehash(new_capacity)
            .map_err(|source| Error::AllocationFailure { capacity: new_capacity, source })?;
        log::debug!(
            "{} table from {} to {} buckets ({} entries)",
            if matches!(plan, Resize::Grow(_)) { "grew" } else { "shrank" },
            old_capacity,
            new_capacity,
            self.size
        );
        Ok(())
    }

    /// Carries out a resize plan, keeping the current capacity on failure
    fn resize_or_warn(&mut self, plan: Resize) {
        if let Err(err) = self.resize(plan) {
            log::warn!("{err}; keeping {} buckets", self.capacity());
        }
    }
}

impl<K, V> PartialEq for ChainedMap<K, V>
where
    K: Eq + Hash,
    V: PartialEq,
{
    /// Maps are equal when their bounds, capacity and per-bucket contents match
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size &&
            self.load_factors == other.load_factors &&
            self.table.same_entries(&other.table)
    }
}

// validated bounds are never NaN, so equality is reflexive
impl<K, V> Eq for ChainedMap<K, V>
where
    K: Eq + Hash,
    V: Eq,
{
}

impl<'a, K, V> IntoIterator for &'a ChainedMap<K, V>
where
    K: Eq + Hash,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut ChainedMap<K, V>
where
    K: Eq + Hash,
{
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V> IntoIterator for ChainedMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.table.into_buckets(), self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed(range: std::ops::Range<i32>) -> ChainedMap<String, i32> {
        range.map(|i| (format!("key-{i}"), i)).collect()
    }

    #[test]
    fn test_default_map() {
        let mut map = ChainedMap::new();
        assert_eq!(map.capacity(), 16);
        assert!(map.is_empty());
        assert!((map.load_factors().lower() - 0.25).abs() < f64::EPSILON);
        assert!((map.load_factors().upper() - 0.75).abs() < f64::EPSILON);

        assert!(map.insert("a".to_string(), 1));
        assert_eq!(map.len(), 1);
        assert!((map.load_factor() - 0.0625).abs() < f64::EPSILON);
        assert_eq!(map.capacity(), 16);
        assert_eq!(map.at("a"), Ok(&1));
    }

    #[test]
    fn test_growth_on_breaching_insert() {
        let mut map = keyed(0..12);
        assert_eq!(map.capacity(), 16);

        assert!(map.insert("key-12".to_string(), 12));
        assert_eq!(map.len(), 13);
        assert_eq!(map.capacity(), 32);
        for i in 0..13 {
            assert_eq!(map.get(format!("key-{i}").as_str()), Some(&i));
        }
    }

    #[test]
    fn test_shrink_on_erase() {
        let mut map = keyed(0..13);
        assert_eq!(map.capacity(), 32);

        for i in 0..5 {
            assert!(map.erase(format!("key-{i}").as_str()));
        }
        // 8 / 32 sits exactly on the lower bound
        assert_eq!(map.len(), 8);
        assert_eq!(map.capacity(), 32);

        assert!(map.erase("key-5"));
        assert_eq!(map.capacity(), 16);

        for i in 6..10 {
            assert!(map.erase(format!("key-{i}").as_str()));
        }
        assert_eq!(map.len(), 3);
        // never below the initial capacity
        assert_eq!(map.capacity(), 16);
        for i in 10..13 {
            assert_eq!(map.at(format!("key-{i}").as_str()), Ok(&i));
        }
    }

    #[test]
    fn test_missing_key() {
        let mut map = keyed(0..3);
        assert_eq!(map.at("missing"), Err(Error::KeyNotFound));
        assert_eq!(map.at_mut("missing"), Err(Error::KeyNotFound));
        assert_eq!(map.bucket_size("missing"), Err(Error::KeyNotFound));
        assert!(!map.erase("missing"));
        assert_eq!(map.remove("missing"), None);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_from_parallel_first_occurrence_wins() {
        let map = ChainedMap::from_parallel(vec!["x", "y", "x"], vec![1, 2, 3]);
        let Ok(map) = map else {
            panic!("equal lengths must build");
        };
        assert_eq!(map.len(), 2);
        assert_eq!(map.at("x"), Ok(&1));
        assert_eq!(map.at("y"), Ok(&2));
    }

    #[test]
    fn test_from_parallel_rejects_mismatched_lengths() {
        let map = ChainedMap::from_parallel(vec!["x", "y"], vec![1]);
        assert_eq!(map, Err(Error::InvalidArgument { keys: 2, values: 1 }));
    }

    #[test]
    fn test_invalid_load_factors() {
        let map = ChainedMap::<String, i32>::with_load_factors(0.8, 0.5);
        assert_eq!(map, Err(Error::InvalidConfiguration { lower: 0.8, upper: 0.5 }));
        assert!(ChainedMap::<String, i32>::with_load_factors(0.1, 0.9).is_ok());
    }

    #[test]
    fn test_insert_keeps_first_value() {
        let mut map = ChainedMap::new();
        assert!(map.insert("key1".to_string(), 1));
        assert!(!map.insert("key1".to_string(), 10));
        assert_eq!(map.get("key1"), Some(&1));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_try_insert_and_try_remove() {
        let mut map = ChainedMap::new();
        for i in 0..13 {
            assert_eq!(map.try_insert(i, i * 2), Ok(true));
        }
        assert_eq!(map.try_insert(0, 100), Ok(false));
        assert_eq!(map.capacity(), 32);

        for i in 0..5 {
            assert_eq!(map.try_remove(&i), Ok(Some(i * 2)));
        }
        assert_eq!(map.capacity(), 32);
        assert_eq!(map.try_remove(&5), Ok(Some(10)));
        assert_eq!(map.capacity(), 16);
        assert_eq!(map.try_remove(&5), Ok(None));
        assert_eq!(map.len(), 7);
    }

    #[test]
    fn test_get_or_insert_default() {
        let mut map: ChainedMap<String, i32> = ChainedMap::new();
        *map.get_or_insert_default("hits".to_string()) += 1;
        *map.get_or_insert_default("hits".to_string()) += 1;
        assert_eq!(map.get("hits"), Some(&2));
        assert_eq!(map.len(), 1);

        for i in 0..12 {
            *map.get_or_insert_default(i.to_string()) = i;
        }
        // the 13th entry grew the table
        assert_eq!(map.capacity(), 32);
        assert_eq!(map.get("11"), Some(&11));
    }

    #[test]
    fn test_at_mut_and_get_mut() {
        let mut map = keyed(0..2);
        if let Ok(value) = map.at_mut("key-0") {
            *value += 10;
        }
        if let Some(value) = map.get_mut("key-1") {
            *value += 20;
        }
        assert_eq!(map.at("key-0"), Ok(&10));
        assert_eq!(map.at("key-1"), Ok(&21));
    }

    #[test]
    fn test_bucket_size_counts_chain() {
        let map = keyed(0..10);
        for key in map.keys() {
            let len = map.bucket_size(key.as_str());
            assert!(len.is_ok_and(|len| len >= 1));
        }

        let longest = map.keys().filter_map(|key| map.bucket_size(key.as_str()).ok()).max();
        assert!(longest.is_some_and(|len| len <= 10));
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut map = keyed(0..20);
        let capacity = map.capacity();
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.capacity(), capacity);
        assert!(!map.contains_key("key-1"));
        assert_eq!(map.iter().count(), 0);
        assert!(map.insert("key-1".to_string(), 1));
    }

    #[test]
    fn test_iteration_visits_each_entry_once() {
        let map = keyed(0..50);
        let mut seen: Vec<i32> = map.values().copied().collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..50).collect::<Vec<_>>());
        assert_eq!(map.iter().len(), 50);

        let mut count = 0;
        for (key, value) in &map {
            assert_eq!(key, &format!("key-{value}"));
            count += 1;
        }
        assert_eq!(count, 50);
    }

    #[test]
    fn test_cursor_walk_matches_iter() {
        let map = keyed(0..20);
        let mut walked = Vec::new();
        let mut cursor = map.begin();
        while cursor != map.end() {
            if let Some((_, value)) = map.entry_at(cursor) {
                walked.push(*value);
            }
            cursor = map.advance(cursor);
        }
        let iterated: Vec<i32> = map.values().copied().collect();
        assert_eq!(walked, iterated);

        let empty: ChainedMap<String, i32> = ChainedMap::new();
        assert_eq!(empty.begin(), empty.end());
        assert!(empty.entry_at(empty.begin()).is_none());
    }

    #[test]
    fn test_iter_mut_and_into_iter() {
        let mut map = keyed(0..5);
        for (_, value) in &mut map {
            *value *= 3;
        }
        let mut owned: Vec<(String, i32)> = map.into_iter().collect();
        owned.sort();
        assert_eq!(owned.first(), Some(&("key-0".to_string(), 0)));
        assert_eq!(owned.last(), Some(&("key-4".to_string(), 12)));
        assert_eq!(owned.len(), 5);
    }

    #[test]
    fn test_equality_ignores_insertion_order() {
        let forward = keyed(0..30);
        let backward: ChainedMap<String, i32> =
            (0..30).rev().map(|i| (format!("key-{i}"), i)).collect();
        assert_eq!(forward, backward);
        assert_eq!(backward, forward);
        assert_eq!(forward, forward.clone());

        let mut changed = forward.clone();
        if let Some(value) = changed.get_mut("key-3") {
            *value = -3;
        }
        assert_ne!(forward, changed);
    }

    #[test]
    fn test_equality_compares_configuration() {
        let default: ChainedMap<i32, i32> = ChainedMap::new();
        let Ok(custom) = ChainedMap::with_load_factors(0.2, 0.75) else {
            panic!("valid bounds");
        };
        assert_ne!(default, custom);
    }

    #[test]
    fn test_equality_compares_capacity() {
        let mut grown = keyed(0..13);
        assert!(grown.erase("key-12"));
        assert_eq!(grown.capacity(), 32);

        let fresh = keyed(0..12);
        assert_eq!(fresh.capacity(), 16);
        assert_eq!(grown.len(), fresh.len());
        for (key, value) in &fresh {
            assert_eq!(grown.get(key.as_str()), Some(value));
        }
        assert_ne!(grown, fresh);
        assert_ne!(fresh, grown);
    }

    #[test]
    fn test_insert_then_erase_round_trip() {
        let before = keyed(0..5);
        let mut after = before.clone();
        assert!(after.insert("extra".to_string(), 99));
        assert!(after.erase("extra"));
        assert_eq!(before, after);
    }

    #[test]
    fn test_clone_and_take() {
        let mut map = keyed(0..20);
        let copy = map.clone();
        assert_eq!(copy, map);
        assert_eq!(copy.capacity(), map.capacity());

        let moved = std::mem::take(&mut map);
        assert_eq!(moved, copy);
        assert!(map.is_empty());
        assert_eq!(map.capacity(), 16);
        assert!(map.insert("again".to_string(), 1));
    }
}
