use core::fmt::Debug;
use core::fmt::Display;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::hasher::PolyHashBuilder;
use crate::probe_table::DEFAULT_CAPACITY;
use crate::probe_table::Entry;
use crate::probe_table::ProbeTable;
use crate::probe_table::SlotState;

/// A set of self-keyed records backed by the quadratic-probing
/// [`ProbeTable`].
///
/// `ProbeSet<T, S>` stores values of type `T` where `T` implements
/// `Hash + Eq` and uses a configurable hasher builder `S` to hash values.
/// The default builder is [`PolyHashBuilder`], which keeps layouts
/// deterministic across runs.
///
/// Unlike a map, the record is its own key: lookups and removals take a
/// probe record equal to the stored one.
#[derive(Clone)]
pub struct ProbeSet<T, S = PolyHashBuilder> {
    table: ProbeTable<T>,
    hash_builder: S,
}

impl<T, S> PartialEq for ProbeSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }
}

impl<T, S> Eq for ProbeSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
}

impl<T, S> Debug for ProbeSet<T, S>
where
    T: Debug + Hash + Eq,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Renders the index-ordered slot report.
///
/// One header line with the capacity and live count, then one line per
/// slot: `[Empty]`, `[Deleted]`, or the record's own `Display` output.
impl<T, S> Display for ProbeSet<T, S>
where
    T: Display,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(
            f,
            "Hash table (capacity: {}, entries: {}):",
            self.table.capacity(),
            self.table.len()
        )?;
        for (index, state) in self.table.slots().enumerate() {
            match state {
                SlotState::Empty => writeln!(f, "Index {index}: [Empty]")?,
                SlotState::Tombstone => writeln!(f, "Index {index}: [Deleted]")?,
                SlotState::Occupied(value) => writeln!(f, "Index {index}: {value}")?,
            }
        }
        Ok(())
    }
}

impl<T, S> ProbeSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a new set with the given hasher builder and the default
    /// initial capacity of 5 slots.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_probe::PolyHashBuilder;
    /// use quad_probe::ProbeSet;
    ///
    /// let set: ProbeSet<i32, _> = ProbeSet::with_hasher(PolyHashBuilder);
    /// assert!(set.is_empty());
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, hash_builder)
    }

    /// Creates a new set with the specified capacity and hasher builder.
    ///
    /// The table starts with exactly `capacity` slots; it doubles itself
    /// whenever the live count reaches half the slot count.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_probe::PolyHashBuilder;
    /// use quad_probe::ProbeSet;
    ///
    /// let set: ProbeSet<i32, _> = ProbeSet::with_capacity_and_hasher(20, PolyHashBuilder);
    /// assert_eq!(set.capacity(), 20);
    /// ```
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            table: ProbeTable::with_capacity(capacity),
            hash_builder,
        }
    }

    /// Returns the number of records in the set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_probe::ProbeSet;
    ///
    /// let mut set: ProbeSet<i32> = ProbeSet::new();
    /// assert_eq!(set.len(), 0);
    /// set.insert(1);
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no records.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the current number of slots.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the number of tombstone slots left behind by removals.
    ///
    /// Tombstones are reclaimed when the table grows.
    pub fn tombstones(&self) -> usize {
        self.table.tombstones()
    }

    /// Adds a record to the set, replacing the existing record, if any,
    /// that is equal to the given one. Returns the replaced record.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_probe::Miniature;
    /// use quad_probe::ProbeSet;
    ///
    /// let mut roster: ProbeSet<Miniature> = ProbeSet::new();
    /// let captain = Miniature::new(100, "Space Marine Captain", 2020);
    /// assert_eq!(roster.insert(captain.clone()), None);
    /// assert_eq!(roster.insert(captain.clone()), Some(captain));
    /// assert_eq!(roster.len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> Option<T> {
        let hash = self.hash_builder.hash_one(&value);
        match self.table.entry(hash, |v| v == &value) {
            Entry::Occupied(mut entry) => Some(entry.replace(value)),
            Entry::Vacant(entry) => {
                entry.insert(value);
                None
            }
        }
    }

    /// Returns a reference to the record in the set, if any, that is equal
    /// to the given one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_probe::Miniature;
    /// use quad_probe::ProbeSet;
    ///
    /// let mut roster: ProbeSet<Miniature> = ProbeSet::new();
    /// roster.insert(Miniature::new(75, "Ork Warboss", 2021));
    ///
    /// let probe = Miniature::new(75, "Ork Warboss", 2021);
    /// assert_eq!(roster.get(&probe), Some(&probe));
    /// assert_eq!(roster.get(&Miniature::new(75, "Ork Warboss", 2022)), None);
    /// ```
    pub fn get(&self, value: &T) -> Option<&T> {
        let hash = self.hash_builder.hash_one(value);
        self.table.find(hash, |v| v == value)
    }

    /// Returns `true` if the set contains a record equal to the given one.
    pub fn contains(&self, value: &T) -> bool {
        self.get(value).is_some()
    }

    /// Removes a record from the set, leaving a tombstone in its slot.
    /// Returns the removed record, if any.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_probe::Miniature;
    /// use quad_probe::ProbeSet;
    ///
    /// let mut roster: ProbeSet<Miniature> = ProbeSet::new();
    /// let guard = Miniature::new(50, "Imperial Guard", 2019);
    /// roster.insert(guard.clone());
    ///
    /// assert_eq!(roster.remove(&guard), Some(guard.clone()));
    /// assert_eq!(roster.remove(&guard), None);
    /// ```
    pub fn remove(&mut self, value: &T) -> Option<T> {
        let hash = self.hash_builder.hash_one(value);
        self.table.remove(hash, |v| v == value)
    }

    /// Returns an iterator over the records of the set, in slot order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_probe::ProbeSet;
    ///
    /// let mut set: ProbeSet<i32> = ProbeSet::new();
    /// set.insert(1);
    /// set.insert(2);
    /// assert_eq!(set.iter().count(), 2);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an index-ordered iterator over slot states.
    ///
    /// This is the diagnostic view behind the `Display` report: every slot
    /// is yielded exactly once as `Empty`, `Tombstone`, or `Occupied`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_probe::ProbeSet;
    /// use quad_probe::SlotState;
    ///
    /// let set: ProbeSet<i32> = ProbeSet::new();
    /// assert!(set.slots().all(|s| matches!(s, SlotState::Empty)));
    /// ```
    pub fn slots(&self) -> Slots<'_, T> {
        Slots {
            inner: self.table.slots(),
        }
    }
}

impl<T, S> ProbeSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates a new set using the default hasher builder and the default
    /// initial capacity of 5 slots.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quad_probe::ProbeSet;
    ///
    /// let set: ProbeSet<i32> = ProbeSet::new();
    /// assert_eq!(set.capacity(), 5);
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates a new set with the specified capacity using the default
    /// hasher builder.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, S::default())
    }
}

impl<T, S> Default for ProbeSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl<T, S> ProbeSet<T, S>
where
    T: Display,
{
    /// Writes the slot report to standard output.
    pub fn print(&self) {
        print!("{self}");
    }
}

/// An iterator over the records of a `ProbeSet`.
pub struct Iter<'a, T> {
    inner: crate::probe_table::Iter<'a, T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// An index-ordered iterator over the slot states of a `ProbeSet`.
pub struct Slots<'a, T> {
    inner: crate::probe_table::Slots<'a, T>,
}

impl<'a, T> Iterator for Slots<'a, T> {
    type Item = SlotState<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Slots<'_, T> {}

impl<'a, T, S> IntoIterator for &'a ProbeSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, S> FromIterator<T> for ProbeSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T, S> Extend<T> for ProbeSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec::Vec;
    use core::hash::BuildHasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;
    use crate::record::Miniature;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            Self {
                k1: OsRng.try_next_u64().unwrap_or(0),
                k2: OsRng.try_next_u64().unwrap_or(0),
            }
        }
    }

    fn roster() -> [Miniature; 3] {
        [
            Miniature::new(100, "Space Marine Captain", 2020),
            Miniature::new(50, "Imperial Guard", 2019),
            Miniature::new(75, "Ork Warboss", 2021),
        ]
    }

    #[test]
    fn test_new_and_with_hasher() {
        let set: ProbeSet<i32> = ProbeSet::new();
        assert!(set.is_empty());
        assert_eq!(set.capacity(), 5);

        let set2 = ProbeSet::<i32, _>::with_hasher(SipHashBuilder::default());
        assert!(set2.is_empty());
        assert_eq!(set2.capacity(), 5);
    }

    #[test]
    fn test_with_capacity() {
        let set: ProbeSet<i32> = ProbeSet::with_capacity(100);
        assert_eq!(set.capacity(), 100);
        assert!(set.is_empty());

        let set2 = ProbeSet::<i32, _>::with_capacity_and_hasher(200, SipHashBuilder::default());
        assert_eq!(set2.capacity(), 200);
    }

    #[test]
    #[should_panic(expected = "initial capacity must be at least 1")]
    fn test_zero_capacity_is_rejected() {
        let _ = ProbeSet::<i32>::with_capacity(0);
    }

    #[test]
    fn test_insert_and_get() {
        let mut set: ProbeSet<Miniature> = ProbeSet::new();
        let [captain, guard, warboss] = roster();

        assert_eq!(set.insert(captain.clone()), None);
        assert_eq!(set.insert(guard.clone()), None);
        assert_eq!(set.len(), 2);

        assert_eq!(set.get(&captain), Some(&captain));
        assert_eq!(set.get(&guard), Some(&guard));
        assert_eq!(set.get(&warboss), None);
        assert!(set.contains(&captain));
        assert!(!set.contains(&warboss));
    }

    #[test]
    fn test_insert_replaces_equal_record() {
        let mut set: ProbeSet<Miniature> = ProbeSet::new();
        let [captain, ..] = roster();

        assert_eq!(set.insert(captain.clone()), None);
        assert_eq!(set.insert(captain.clone()), Some(captain));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_remove_leaves_tombstone() {
        let mut set: ProbeSet<Miniature> = ProbeSet::new();
        let [captain, guard, warboss] = roster();
        set.insert(captain.clone());
        set.insert(guard.clone());
        set.insert(warboss.clone());

        assert_eq!(set.remove(&guard), Some(guard.clone()));
        assert_eq!(set.len(), 2);
        assert_eq!(set.tombstones(), 1);
        assert!(!set.contains(&guard));
        assert!(set.contains(&captain));
        assert!(set.contains(&warboss));

        assert_eq!(set.remove(&guard), None);
    }

    #[test]
    fn test_near_miss_probes_do_not_match() {
        let mut set: ProbeSet<Miniature> = ProbeSet::new();
        let [captain, ..] = roster();
        set.insert(captain);

        assert!(!set.contains(&Miniature::new(101, "Space Marine Captain", 2020)));
        assert!(!set.contains(&Miniature::new(100, "Space Marine Captain", 2021)));
        assert!(!set.contains(&Miniature::new(100, "Space Marine Sergeant", 2020)));
    }

    #[test]
    fn test_iter_yields_live_records() {
        let mut set: ProbeSet<Miniature> = ProbeSet::new();
        let [captain, guard, warboss] = roster();
        set.insert(captain.clone());
        set.insert(guard.clone());
        set.insert(warboss.clone());
        set.remove(&guard);

        let collected: Vec<&Miniature> = set.iter().collect();
        assert_eq!(collected.len(), 2);
        assert!(collected.contains(&&captain));
        assert!(collected.contains(&&warboss));

        let from_loop: Vec<&Miniature> = (&set).into_iter().collect();
        assert_eq!(from_loop.len(), 2);
    }

    #[test]
    fn test_eq_ignores_slot_layout() {
        let [captain, guard, warboss] = roster();

        let mut forward: ProbeSet<Miniature> = ProbeSet::new();
        let mut backward: ProbeSet<Miniature> = ProbeSet::with_capacity(40);
        for mini in [&captain, &guard, &warboss] {
            forward.insert(mini.clone());
        }
        for mini in [&warboss, &guard, &captain] {
            backward.insert(mini.clone());
        }

        assert_eq!(forward, backward);

        backward.remove(&guard);
        assert_ne!(forward, backward);
    }

    #[test]
    fn test_from_iterator_and_extend() {
        let set: ProbeSet<Miniature> = roster().into_iter().collect();
        assert_eq!(set.len(), 3);

        let mut other: ProbeSet<Miniature> = ProbeSet::new();
        other.extend(roster());
        assert_eq!(set, other);
    }

    #[test]
    fn test_works_with_any_build_hasher() {
        let mut set = ProbeSet::with_hasher(SipHashBuilder::default());
        let [captain, guard, warboss] = roster();
        set.insert(captain.clone());
        set.insert(guard.clone());
        set.insert(warboss.clone());

        assert!(set.contains(&captain));
        assert_eq!(set.remove(&warboss), Some(warboss.clone()));
        assert!(!set.contains(&warboss));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_report_shows_deterministic_layout() {
        // Under the polynomial hasher the three reference records land at
        // slots 2, 1, and 3 of a five-slot table, in insert order.
        let mut set: ProbeSet<Miniature> = ProbeSet::new();
        let [captain, guard, warboss] = roster();
        set.insert(captain);
        set.insert(guard.clone());
        set.insert(warboss);

        assert_eq!(
            set.to_string(),
            "Hash table (capacity: 5, entries: 3):\n\
             Index 0: [Empty]\n\
             Index 1: Imperial Guard (Cost: 50, Year: 2019)\n\
             Index 2: Space Marine Captain (Cost: 100, Year: 2020)\n\
             Index 3: Ork Warboss (Cost: 75, Year: 2021)\n\
             Index 4: [Empty]\n"
        );

        set.remove(&guard);
        assert_eq!(
            set.to_string(),
            "Hash table (capacity: 5, entries: 2):\n\
             Index 0: [Empty]\n\
             Index 1: [Deleted]\n\
             Index 2: Space Marine Captain (Cost: 100, Year: 2020)\n\
             Index 3: Ork Warboss (Cost: 75, Year: 2021)\n\
             Index 4: [Empty]\n"
        );
    }

    #[test]
    fn test_growth_keeps_records_findable() {
        let mut set: ProbeSet<Miniature> = ProbeSet::new();
        let minis: Vec<Miniature> = (0..200)
            .map(|i| Miniature::new(i, alloc::format!("Model {i}"), 2000 + (i % 30)))
            .collect();

        for mini in &minis {
            set.insert(mini.clone());
        }
        assert_eq!(set.len(), 200);
        assert!(set.capacity() >= 400);
        for mini in &minis {
            assert_eq!(set.get(mini), Some(mini));
        }
    }

    #[test]
    fn test_debug_render() {
        let mut set: ProbeSet<String> = ProbeSet::new();
        set.insert("grot".to_string());
        let rendered = alloc::format!("{set:?}");
        assert_eq!(rendered, "{\"grot\"}");
    }
}
