use alloc::vec::Vec;
use core::fmt::Debug;

/// Initial slot count used by [`ProbeTable::new`].
pub const DEFAULT_CAPACITY: usize = 5;

#[inline(always)]
fn home_index(hash: u64, capacity: usize) -> usize {
    (hash % capacity as u64) as usize
}

/// The i-th candidate slot offsets from the home slot by i². Arithmetic is
/// wrapping, so pathological hashes reduce deterministically instead of
/// panicking.
#[inline(always)]
fn probe(start: usize, attempt: usize, capacity: usize) -> usize {
    start.wrapping_add(attempt.wrapping_mul(attempt)) % capacity
}

#[derive(Clone)]
enum Slot<V> {
    Empty,
    Tombstone,
    Occupied { hash: u64, value: V },
}

/// The state of a single slot, yielded in index order by
/// [`ProbeTable::slots`].
#[derive(Debug, Clone, Copy)]
pub enum SlotState<'a, V> {
    /// Never held a record since the table was last rebuilt.
    Empty,
    /// Held a record that was removed. Probe chains continue past it.
    Tombstone,
    /// Holds a live record.
    Occupied(&'a V),
}

/// An open-addressing hash table using quadratic probing with tombstone
/// deletion.
///
/// `ProbeTable<V>` stores values of type `V` and requires the caller to
/// provide the hash value and an equality predicate for each operation, so
/// the table itself stays agnostic of how records are hashed. Collisions are
/// resolved by probing: the i-th candidate slot offsets from the home slot
/// (`hash % capacity`) by i². Removal leaves a tombstone in place so that
/// probe sequences passing through it keep searching past the point of
/// removal.
///
/// The table grows by doubling whenever it is at least half full, checked
/// before each insertion. Growth rebuilds the slot array from scratch,
/// re-placing every live record under the new capacity and discarding all
/// tombstones. This rebuild is the only way tombstone-occupied slots are
/// reclaimed.
///
/// Note that a quadratic probe sequence modulo a capacity that is neither
/// prime nor a power of two is not guaranteed to visit every slot. When a
/// probe sequence exhausts `capacity` attempts without terminating, the
/// table grows and the operation retries under the new capacity.
///
/// ## Example
///
/// ```rust
/// use quad_probe::probe_table::Entry;
/// use quad_probe::probe_table::ProbeTable;
///
/// let mut table: ProbeTable<&str> = ProbeTable::with_capacity(8);
/// match table.entry(3, |v| *v == "ragnar") {
///     Entry::Vacant(slot) => {
///         slot.insert("ragnar");
///     }
///     Entry::Occupied(_) => {}
/// }
///
/// assert_eq!(table.find(3, |v| *v == "ragnar"), Some(&"ragnar"));
/// assert_eq!(table.remove(3, |v| *v == "ragnar"), Some("ragnar"));
/// assert_eq!(table.find(3, |v| *v == "ragnar"), None);
/// ```
#[derive(Clone)]
pub struct ProbeTable<V> {
    slots: Vec<Slot<V>>,
    len: usize,
    tombstones: usize,
}

impl<V: Debug> Debug for ProbeTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProbeTable")
            .field("len", &self.len)
            .field("tombstones", &self.tombstones)
            .field("slots", &self.slots().collect::<Vec<_>>())
            .finish()
    }
}

impl<V> ProbeTable<V> {
    /// Creates a table with the default initial capacity of
    /// [`DEFAULT_CAPACITY`] slots.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a table with exactly `capacity` slots.
    ///
    /// The capacity is the raw slot count, not the number of records the
    /// table holds before growing: growth triggers once half the slots
    /// hold live records.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. Slot indices are computed modulo the
    /// capacity, so a zero-slot table cannot place anything.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_probe::probe_table::ProbeTable;
    ///
    /// let table: ProbeTable<u64> = ProbeTable::with_capacity(5);
    /// assert_eq!(table.capacity(), 5);
    /// assert!(table.is_empty());
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "initial capacity must be at least 1");
        let mut slots = Vec::new();
        slots.resize_with(capacity, || Slot::Empty);
        Self {
            slots,
            len: 0,
            tombstones: 0,
        }
    }

    /// Returns the number of live records in the table.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table holds no live records.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the current slot count.
    ///
    /// Grows only by doubling and never shrinks.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of tombstone slots left behind by removals.
    ///
    /// Tombstones persist until the next growth rebuild discards them.
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// Returns an iterator over the live records, in unspecified order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.slots.iter(),
        }
    }

    /// Returns an iterator over every slot's state, in index order.
    ///
    /// This is a diagnostic view: it faithfully reflects the current slot
    /// states and carries no further contract.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_probe::probe_table::ProbeTable;
    /// use quad_probe::probe_table::SlotState;
    ///
    /// let mut table: ProbeTable<u64> = ProbeTable::with_capacity(5);
    /// table.entry(2, |&v| v == 9).or_insert(9);
    /// table.remove(2, |&v| v == 9);
    ///
    /// let states: Vec<_> = table.slots().collect();
    /// assert_eq!(states.len(), 5);
    /// assert!(matches!(states[2], SlotState::Tombstone));
    /// ```
    pub fn slots(&self) -> Slots<'_, V> {
        Slots {
            inner: self.slots.iter(),
        }
    }

    /// Locates the slot for a record with the given hash, growing the table
    /// first if it is at least half full.
    ///
    /// The probe sequence starts at `hash % capacity` and advances
    /// quadratically while slots are occupied by non-matching records. It
    /// terminates on the first empty slot, tombstone, or live record
    /// matching `eq`, whichever comes first, so re-inserting an equal
    /// record resolves to the slot that already holds it. If the sequence
    /// exhausts `capacity` attempts without terminating, the table grows
    /// and probing restarts under the new capacity.
    ///
    /// The growth check happens before probing, so a call that resolves to
    /// an occupied entry may still have grown the table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_probe::probe_table::Entry;
    /// use quad_probe::probe_table::ProbeTable;
    ///
    /// let mut table: ProbeTable<(u64, &str)> = ProbeTable::with_capacity(8);
    /// table.entry(7, |v| v.0 == 7).or_insert((7, "first"));
    ///
    /// match table.entry(7, |v| v.0 == 7) {
    ///     Entry::Occupied(mut slot) => {
    ///         let previous = slot.replace((7, "second"));
    ///         assert_eq!(previous.1, "first");
    ///     }
    ///     Entry::Vacant(_) => unreachable!("record was just inserted"),
    /// }
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V> {
        if self.len.saturating_mul(2) >= self.capacity() {
            self.grow();
        }
        loop {
            match self.insert_index(hash, &eq) {
                Some(index) => {
                    return if matches!(self.slots[index], Slot::Occupied { .. }) {
                        Entry::Occupied(OccupiedEntry { table: self, index })
                    } else {
                        Entry::Vacant(VacantEntry {
                            table: self,
                            index,
                            hash,
                        })
                    };
                }
                None => self.grow(),
            }
        }
    }

    /// Returns a reference to the record matching `eq`, if present.
    ///
    /// The probe sequence advances through occupied slots and tombstones
    /// and gives up on the first empty slot, or after `capacity` attempts.
    /// Read-only: an exhausted probe sequence reports not-found rather than
    /// growing the table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_probe::probe_table::ProbeTable;
    ///
    /// let mut table: ProbeTable<u64> = ProbeTable::with_capacity(5);
    /// table.entry(4, |&v| v == 11).or_insert(11);
    ///
    /// assert_eq!(table.find(4, |&v| v == 11), Some(&11));
    /// assert_eq!(table.find(4, |&v| v == 12), None);
    /// ```
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        let capacity = self.capacity();
        let start = home_index(hash, capacity);
        for attempt in 0..capacity {
            let index = probe(start, attempt, capacity);
            match &self.slots[index] {
                Slot::Empty => return None,
                Slot::Occupied { value, .. } if eq(value) => return Some(value),
                _ => {}
            }
        }
        None
    }

    /// Removes and returns the record matching `eq`, if present.
    ///
    /// The record's slot becomes a tombstone rather than an empty slot, so
    /// probe chains that pass through it stay intact. Only a growth rebuild
    /// turns tombstones back into empty slots.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_probe::probe_table::ProbeTable;
    ///
    /// let mut table: ProbeTable<u64> = ProbeTable::with_capacity(5);
    /// table.entry(1, |&v| v == 30).or_insert(30);
    ///
    /// assert_eq!(table.remove(1, |&v| v == 30), Some(30));
    /// assert_eq!(table.remove(1, |&v| v == 30), None);
    /// assert_eq!(table.tombstones(), 1);
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        let capacity = self.capacity();
        let start = home_index(hash, capacity);
        for attempt in 0..capacity {
            let index = probe(start, attempt, capacity);
            match &self.slots[index] {
                Slot::Empty => return None,
                Slot::Occupied { value, .. } if eq(value) => return Some(self.bury(index)),
                _ => {}
            }
        }
        None
    }

    /// First slot at which the insert probe sequence terminates, or `None`
    /// if `capacity` attempts all landed on occupied, non-matching slots.
    fn insert_index(&self, hash: u64, eq: &impl Fn(&V) -> bool) -> Option<usize> {
        let capacity = self.capacity();
        let start = home_index(hash, capacity);
        for attempt in 0..capacity {
            let index = probe(start, attempt, capacity);
            match &self.slots[index] {
                Slot::Occupied { value, .. } if !eq(value) => {}
                _ => return Some(index),
            }
        }
        None
    }

    /// Doubles the capacity and rebuilds the slot array, re-placing every
    /// live record under the new modulus and discarding all tombstones. If
    /// a record cannot be placed within `capacity` attempts under the new
    /// capacity, the capacity doubles again and the rebuild restarts.
    fn grow(&mut self) {
        let mut capacity = self
            .capacity()
            .checked_mul(2)
            .expect("table capacity overflow");
        let mut live: Vec<(u64, V)> = core::mem::take(&mut self.slots)
            .into_iter()
            .filter_map(|slot| match slot {
                Slot::Occupied { hash, value } => Some((hash, value)),
                _ => None,
            })
            .collect();

        'rebuild: loop {
            let mut slots = Vec::new();
            slots.resize_with(capacity, || Slot::Empty);

            while let Some((hash, value)) = live.pop() {
                let Some(index) = first_empty(&slots, hash) else {
                    live.push((hash, value));
                    live.extend(slots.into_iter().filter_map(|slot| match slot {
                        Slot::Occupied { hash, value } => Some((hash, value)),
                        _ => None,
                    }));
                    capacity = capacity.checked_mul(2).expect("table capacity overflow");
                    continue 'rebuild;
                };
                slots[index] = Slot::Occupied { hash, value };
            }

            self.slots = slots;
            self.tombstones = 0;
            return;
        }
    }

    fn place(&mut self, index: usize, hash: u64, value: V) -> &mut V {
        if matches!(self.slots[index], Slot::Tombstone) {
            self.tombstones -= 1;
        }
        self.len += 1;
        self.slots[index] = Slot::Occupied { hash, value };
        self.value_mut(index)
    }

    fn bury(&mut self, index: usize) -> V {
        self.len -= 1;
        self.tombstones += 1;
        match core::mem::replace(&mut self.slots[index], Slot::Tombstone) {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!(),
        }
    }

    fn value_ref(&self, index: usize) -> &V {
        match &self.slots[index] {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!(),
        }
    }

    fn value_mut(&mut self, index: usize) -> &mut V {
        match &mut self.slots[index] {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!(),
        }
    }
}

fn first_empty<V>(slots: &[Slot<V>], hash: u64) -> Option<usize> {
    let capacity = slots.len();
    let start = home_index(hash, capacity);
    (0..capacity)
        .map(|attempt| probe(start, attempt, capacity))
        .find(|&index| matches!(slots[index], Slot::Empty))
}

/// A view into a single slot of a [`ProbeTable`], resolved by
/// [`ProbeTable::entry`].
pub enum Entry<'a, V> {
    /// The probe sequence found a live record matching the predicate.
    Occupied(OccupiedEntry<'a, V>),
    /// The probe sequence terminated at a reusable slot, either empty or a
    /// tombstone.
    Vacant(VacantEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Inserts `default` if the slot is vacant, then returns a mutable
    /// reference to the record in the slot.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_probe::probe_table::ProbeTable;
    ///
    /// let mut table: ProbeTable<u64> = ProbeTable::with_capacity(5);
    /// assert_eq!(*table.entry(0, |&v| v == 5).or_insert(5), 5);
    /// assert_eq!(*table.entry(0, |&v| v == 5).or_insert(99), 5);
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }
}

/// A view into a slot holding a live record.
pub struct OccupiedEntry<'a, V> {
    table: &'a mut ProbeTable<V>,
    index: usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Returns a reference to the record in the slot.
    pub fn get(&self) -> &V {
        self.table.value_ref(self.index)
    }

    /// Returns a mutable reference to the record in the slot.
    pub fn get_mut(&mut self) -> &mut V {
        self.table.value_mut(self.index)
    }

    /// Converts the entry into a mutable reference tied to the table.
    pub fn into_mut(self) -> &'a mut V {
        let OccupiedEntry { table, index } = self;
        table.value_mut(index)
    }

    /// Overwrites the record in the slot and returns the previous one.
    ///
    /// The slot keeps its stored hash; the replacement must be equal to the
    /// old record under the table's hashing scheme.
    pub fn replace(&mut self, value: V) -> V {
        core::mem::replace(self.get_mut(), value)
    }

    /// Removes the record, leaving a tombstone in its slot.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_probe::probe_table::Entry;
    /// use quad_probe::probe_table::ProbeTable;
    ///
    /// let mut table: ProbeTable<u64> = ProbeTable::with_capacity(5);
    /// table.entry(0, |&v| v == 3).or_insert(3);
    ///
    /// if let Entry::Occupied(slot) = table.entry(0, |&v| v == 3) {
    ///     assert_eq!(slot.remove(), 3);
    /// }
    /// assert_eq!(table.len(), 0);
    /// assert_eq!(table.tombstones(), 1);
    /// ```
    pub fn remove(self) -> V {
        let OccupiedEntry { table, index } = self;
        table.bury(index)
    }
}

/// A view into a reusable slot, either empty or a tombstone.
pub struct VacantEntry<'a, V> {
    table: &'a mut ProbeTable<V>,
    index: usize,
    hash: u64,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Fills the slot with `value` and returns a mutable reference to it.
    ///
    /// Filling a tombstone slot reuses it directly; the tombstone count
    /// drops accordingly.
    pub fn insert(self, value: V) -> &'a mut V {
        let VacantEntry { table, index, hash } = self;
        table.place(index, hash, value)
    }
}

/// Iterator over the live records of a [`ProbeTable`].
pub struct Iter<'a, V> {
    inner: core::slice::Iter<'a, Slot<V>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.inner.by_ref() {
            if let Slot::Occupied { value, .. } = slot {
                return Some(value);
            }
        }
        None
    }
}

/// Iterator over the slot states of a [`ProbeTable`], in index order.
pub struct Slots<'a, V> {
    inner: core::slice::Iter<'a, Slot<V>>,
}

impl<'a, V> Iterator for Slots<'a, V> {
    type Item = SlotState<'a, V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|slot| match slot {
            Slot::Empty => SlotState::Empty,
            Slot::Tombstone => SlotState::Tombstone,
            Slot::Occupied { value, .. } => SlotState::Occupied(value),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Slots<'_, V> {}
