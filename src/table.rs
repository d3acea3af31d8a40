//! HashTable: open-addressed, linearly probed storage keyed by `Key`.
//!
//! Every bucket keeps the hash it was inserted with, so probing compares
//! hashes before bytes and growth relocates buckets without touching the
//! key bytes again.

use crate::error::TableError;
use crate::key::Key;
use core::fmt;

#[derive(Debug)]
struct Bucket<'k, V> {
    hash: u64,
    key: &'k [u8],
    value: V,
}

impl<'k, V> Bucket<'k, V> {
    #[inline]
    fn key(&self) -> Key<'k> {
        Key::with_hash(self.hash, self.key)
    }
}

// `None` is an empty slot. There is no removal, so no tombstones.
type Slot<'k, V> = Option<Bucket<'k, V>>;

/// Outcome of a probe: the slot holding the key, or the first empty slot
/// on its probe path.
enum Probe {
    Found(usize),
    Vacant(usize),
}

/// Result of `HashTable::entry`: a reference to the value cell, tagged by
/// whether this call created it.
#[derive(Debug)]
pub enum Entry<'a, V> {
    /// A new slot was occupied; the value is `V::default()`.
    Inserted(&'a mut V),
    /// The key was already present; the value is whatever was last stored.
    Existing(&'a mut V),
}

impl<'a, V> Entry<'a, V> {
    #[inline]
    pub fn is_inserted(&self) -> bool {
        matches!(self, Entry::Inserted(_))
    }

    #[inline]
    pub fn into_mut(self) -> &'a mut V {
        match self {
            Entry::Inserted(v) | Entry::Existing(v) => v,
        }
    }
}

/// A table from borrowed byte keys to values of type `V`.
///
/// Keys are borrowed for `'k` and never copied; the bytes must outlive the
/// table. Capacity is always a power of two and the table grows by
/// doubling whenever an insert would push the load factor above 3/4.
/// Entries cannot be removed individually; the whole table is torn down at
/// once with `destroy` or `destroy_with`.
///
/// No internal synchronization is performed. Mutation goes through
/// `&mut self`; sharing a table between threads needs external locking.
pub struct HashTable<'k, V> {
    slots: Vec<Slot<'k, V>>,
    len: usize,
}

impl<'k, V> HashTable<'k, V> {
    /// Smallest capacity a table is created with.
    pub const MIN_CAPACITY: usize = 8;
    /// Load factor ceiling as a fraction: `len / capacity <= NUM / DEN`.
    pub const MAX_LOAD_NUM: usize = 3;
    pub const MAX_LOAD_DEN: usize = 4;

    /// Empty table with `MIN_CAPACITY` slots.
    pub fn new() -> Self {
        let mut slots = Vec::with_capacity(Self::MIN_CAPACITY);
        slots.resize_with(Self::MIN_CAPACITY, || None);
        Self { slots, len: 0 }
    }

    /// Empty table sized for `hint` slots, rounded up to a power of two and
    /// to at least `MIN_CAPACITY`.
    pub fn with_capacity(hint: usize) -> Result<Self, TableError> {
        let capacity = hint
            .max(Self::MIN_CAPACITY)
            .checked_next_power_of_two()
            .ok_or(TableError::CapacityOverflow { requested: hint })?;
        let slots = alloc_slots(capacity)?;
        log::trace!("htab: created table with {capacity} slots (hint {hint})");
        Ok(Self { slots, len: 0 })
    }

    /// Number of occupied slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots; always a power of two.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.capacity() as f64
    }

    #[inline]
    fn mask(&self) -> usize {
        self.capacity() - 1
    }

    /// Would one more entry exceed the load factor ceiling?
    #[inline]
    fn must_grow(&self) -> bool {
        (self.len + 1) * Self::MAX_LOAD_DEN > self.capacity() * Self::MAX_LOAD_NUM
    }

    fn probe(&self, key: &Key<'_>) -> Probe {
        let mask = self.mask();
        let mut i = key.hash() as usize & mask;
        loop {
            match &self.slots[i] {
                None => return Probe::Vacant(i),
                Some(b) if b.hash == key.hash() && b.key == key.as_bytes() => {
                    return Probe::Found(i)
                }
                Some(_) => i = (i + 1) & mask,
            }
        }
    }

    fn value_at_mut(&mut self, index: usize) -> &mut V {
        match &mut self.slots[index] {
            Some(b) => &mut b.value,
            None => unreachable!("probe matched an empty slot"),
        }
    }

    /// Insert-or-fetch.
    ///
    /// Returns the value cell for `key`, creating it with `V::default()` if
    /// the key is new. Growth happens here and only here; if it fails the
    /// table is unchanged and the error is returned.
    pub fn entry(&mut self, key: Key<'k>) -> Result<Entry<'_, V>, TableError>
    where
        V: Default,
    {
        loop {
            match self.probe(&key) {
                Probe::Found(i) => return Ok(Entry::Existing(self.value_at_mut(i))),
                Probe::Vacant(_) if self.must_grow() => self.grow()?,
                Probe::Vacant(i) => {
                    self.len += 1;
                    let bucket = self.slots[i].insert(Bucket {
                        hash: key.hash(),
                        key: key.as_bytes(),
                        value: V::default(),
                    });
                    return Ok(Entry::Inserted(&mut bucket.value));
                }
            }
        }
    }

    /// Insert-or-fetch, discarding whether the entry was new.
    #[inline]
    pub fn put(&mut self, key: Key<'k>) -> Result<&mut V, TableError>
    where
        V: Default,
    {
        self.entry(key).map(Entry::into_mut)
    }

    /// Lookup without inserting. Never grows the table.
    pub fn get(&self, key: &Key<'_>) -> Option<&V> {
        match self.probe(key) {
            Probe::Found(i) => self.slots[i].as_ref().map(|b| &b.value),
            Probe::Vacant(_) => None,
        }
    }

    pub fn get_mut(&mut self, key: &Key<'_>) -> Option<&mut V> {
        match self.probe(key) {
            Probe::Found(i) => Some(self.value_at_mut(i)),
            Probe::Vacant(_) => None,
        }
    }

    pub fn contains_key(&self, key: &Key<'_>) -> bool {
        matches!(self.probe(key), Probe::Found(_))
    }

    #[cfg(test)]
    pub(crate) fn occupied_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Double the slot array and relocate every bucket by its stored hash.
    ///
    /// The new array is allocated before anything moves, so a failure
    /// leaves `self` untouched.
    fn grow(&mut self) -> Result<(), TableError> {
        self.grow_with(alloc_slots)
    }

    fn grow_with<A>(&mut self, alloc: A) -> Result<(), TableError>
    where
        A: FnOnce(usize) -> Result<Vec<Slot<'k, V>>, TableError>,
    {
        let old_capacity = self.capacity();
        let new_capacity = old_capacity
            .checked_mul(2)
            .ok_or(TableError::CapacityOverflow {
                requested: old_capacity,
            })?;
        let mut slots = alloc(new_capacity)?;
        let mask = new_capacity - 1;
        for bucket in self.slots.drain(..).flatten() {
            let mut i = bucket.hash as usize & mask;
            while slots[i].is_some() {
                i = (i + 1) & mask;
            }
            slots[i] = Some(bucket);
        }
        self.slots = slots;
        log::debug!(
            "htab: grew from {old_capacity} to {new_capacity} slots ({} entries)",
            self.len
        );
        Ok(())
    }

    /// Unordered iteration over occupied slots.
    pub fn iter(&self) -> Iter<'_, 'k, V> {
        Iter {
            it: self.slots.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, 'k, V> {
        IterMut {
            it: self.slots.iter_mut(),
        }
    }

    /// Tear the table down, dropping every value.
    pub fn destroy(self) {
        self.destroy_with(drop)
    }

    /// Tear the table down, handing each stored value to `cleanup` exactly
    /// once (in unspecified order) before the slot array is released.
    pub fn destroy_with<F>(self, mut cleanup: F)
    where
        F: FnMut(V),
    {
        log::trace!(
            "htab: destroying table with {} entries in {} slots",
            self.len,
            self.capacity()
        );
        for bucket in self.slots.into_iter().flatten() {
            cleanup(bucket.value);
        }
    }
}

fn alloc_slots<'k, V>(capacity: usize) -> Result<Vec<Slot<'k, V>>, TableError> {
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(capacity)
        .map_err(|source| TableError::Alloc {
            slots: capacity,
            source,
        })?;
    slots.resize_with(capacity, || None);
    Ok(slots)
}

impl<V> Default for HashTable<'_, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for HashTable<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over occupied slots of a `HashTable`.
pub struct Iter<'a, 'k, V> {
    it: core::slice::Iter<'a, Slot<'k, V>>,
}

impl<'a, 'k, V> Iterator for Iter<'a, 'k, V> {
    type Item = (Key<'k>, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it
            .by_ref()
            .flatten()
            .next()
            .map(|b| (b.key(), &b.value))
    }
}

/// Iterator over occupied slots with mutable access to values.
pub struct IterMut<'a, 'k, V> {
    it: core::slice::IterMut<'a, Slot<'k, V>>,
}

impl<'a, 'k, V> Iterator for IterMut<'a, 'k, V> {
    type Item = (Key<'k>, &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.by_ref().flatten().next().map(|b| {
            let key = b.key();
            (key, &mut b.value)
        })
    }
}

impl<'a, 'k, V> IntoIterator for &'a HashTable<'k, V> {
    type Item = (Key<'k>, &'a V);
    type IntoIter = Iter<'a, 'k, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
