//! The coalesced hash table: slot resolution, insertion policies, lookup.

use std::hash::{BuildHasher, BuildHasherDefault, Hash};

use ahash::AHasher;

use crate::arena::Arena;
use crate::error::{BuildError, Full};
use crate::iter::{Cursor, Iter, IterMut, Keys, Values};

/// Default hash builder, backed by `ahash`. Swap it out via
/// [`MapBuilder::hasher`].
pub type DefaultHashBuilder = BuildHasherDefault<AHasher>;

/// Largest capacity the packed link words can index.
pub const MAX_CAPACITY: usize = crate::link::MAX_SLOT as usize;

const DEFAULT_ADDRESS_FACTOR: f64 = 0.86;
const DEFAULT_PROBE_DEPTH: u32 = 2;

/// Collision placement policy.
///
/// All modes share the no-collision path and the chain splice; they differ
/// only in where the overflow slot comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum InsertionMode {
    /// Late insert coalesced hashing: overflow comes from the free-tail
    /// scan, starting at the high end of the cellar.
    #[default]
    Lich,
    /// Early insert coalesced hashing: a bounded linear probe of the slots
    /// after the colliding key's home slot, falling back to the free-tail
    /// scan when the window is exhausted.
    Eich,
    /// Variable insert coalesced hashing. Accepted as a distinct mode but
    /// dispatches identically to `Eich`; the variant exists so the mode
    /// round-trips through [`CoalescedMap::insertion_mode`].
    Vich,
}

/// Builder for [`CoalescedMap`].
///
/// Capacity is required and fixed for the map's lifetime; everything else
/// has a default.
///
/// # Example
///
/// ```
/// use coalmap::{CoalescedMap, InsertionMode, MapBuilder};
///
/// let map: CoalescedMap<u64, u64> = MapBuilder::new(100)
///     .insertion_mode(InsertionMode::Eich)
///     .address_factor(0.8)
///     .probe_depth(4)
///     .build()
///     .unwrap();
///
/// assert_eq!(map.capacity(), 100);
/// assert_eq!(map.address_len(), 80);
/// ```
#[derive(Clone, Debug)]
pub struct MapBuilder<S = DefaultHashBuilder> {
    capacity: usize,
    mode: InsertionMode,
    address_factor: f64,
    probe_depth: u32,
    hash_builder: S,
}

impl MapBuilder<DefaultHashBuilder> {
    /// Starts a builder for a map of `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            mode: InsertionMode::default(),
            address_factor: DEFAULT_ADDRESS_FACTOR,
            probe_depth: DEFAULT_PROBE_DEPTH,
            hash_builder: DefaultHashBuilder::default(),
        }
    }
}

impl<S> MapBuilder<S> {
    /// Collision placement policy. Default: [`InsertionMode::Lich`].
    pub fn insertion_mode(mut self, mode: InsertionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Fraction of the capacity that is directly addressable by the hash
    /// function; the rest becomes the cellar. Must lie in `(0, 1]`.
    /// Default: 0.86.
    pub fn address_factor(mut self, factor: f64) -> Self {
        self.address_factor = factor;
        self
    }

    /// Probe window used by [`InsertionMode::Eich`]: how many slots after
    /// the home slot are tried before falling back to the free-tail scan.
    /// Default: 2.
    pub fn probe_depth(mut self, depth: u32) -> Self {
        self.probe_depth = depth;
        self
    }

    /// Replaces the hash builder.
    pub fn hasher<S2>(self, hash_builder: S2) -> MapBuilder<S2> {
        MapBuilder {
            capacity: self.capacity,
            mode: self.mode,
            address_factor: self.address_factor,
            probe_depth: self.probe_depth,
            hash_builder,
        }
    }

    /// Allocates the arena and returns the map.
    ///
    /// # Errors
    ///
    /// [`BuildError::ZeroCapacity`], [`BuildError::CapacityOverflow`] or
    /// [`BuildError::AddressFactorOutOfRange`] when the parameters cannot
    /// form a valid table.
    pub fn build<K, V>(self) -> Result<CoalescedMap<K, V, S>, BuildError> {
        if self.capacity == 0 {
            return Err(BuildError::ZeroCapacity);
        }
        if self.capacity > MAX_CAPACITY {
            return Err(BuildError::CapacityOverflow {
                capacity: self.capacity,
                max: MAX_CAPACITY,
            });
        }
        if !(self.address_factor > 0.0 && self.address_factor <= 1.0) {
            return Err(BuildError::AddressFactorOutOfRange {
                factor: self.address_factor,
            });
        }

        let capacity = self.capacity as u32;
        let address_len = ((capacity as f64 * self.address_factor) as u32).clamp(1, capacity);

        Ok(CoalescedMap {
            arena: Arena::new(capacity, address_len),
            hash_builder: self.hash_builder,
            mode: self.mode,
            buckets: 0,
            max_load_factor: 1.0,
            probe_depth: self.probe_depth,
        })
    }
}

/// A fixed-capacity map built on coalesced hashing.
///
/// All entries live in one arena allocated at construction. Colliding
/// entries are linked through currently-unused slots instead of external
/// chains, and the same links double as a global traversal list, so
/// iteration touches only live entries.
///
/// Single-writer: no internal synchronization. Wrap the whole map in a lock
/// to share it; every operation completes within its call, so serializing
/// calls is sufficient.
///
/// There is no deletion and no growth (see the crate docs).
pub struct CoalescedMap<K, V, S = DefaultHashBuilder> {
    arena: Arena<K, V>,
    hash_builder: S,
    mode: InsertionMode,
    buckets: u32,
    max_load_factor: f64,
    probe_depth: u32,
}

impl<K, V> CoalescedMap<K, V> {
    /// Creates a map with the default policy, address factor and hasher.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or exceeds [`MAX_CAPACITY`]. Use
    /// [`MapBuilder::build`] for a fallible construction path.
    pub fn with_capacity(capacity: usize) -> Self {
        match MapBuilder::new(capacity).build() {
            Ok(map) => map,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<K, V, S> CoalescedMap<K, V, S> {
    /// Number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.arena.live() as usize
    }

    /// Returns `true` if no entries are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.arena.live() == 0
    }

    /// Number of data slots, fixed for the map's lifetime.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.arena.capacity() as usize
    }

    /// Number of slots directly addressable by the hash function.
    #[inline]
    pub fn address_len(&self) -> usize {
        self.arena.address_len() as usize
    }

    /// Number of overflow-only slots.
    #[inline]
    pub fn cellar_len(&self) -> usize {
        self.arena.cellar_len() as usize
    }

    /// Number of distinct address-region chain heads in use.
    #[inline]
    pub fn buckets(&self) -> usize {
        self.buckets as usize
    }

    /// Live entries over capacity.
    #[inline]
    pub fn load_factor(&self) -> f64 {
        self.arena.live() as f64 / self.arena.capacity() as f64
    }

    /// The advisory load-factor ceiling. Nothing in this crate acts on it:
    /// rehashing is out of scope, and insertion fails only on true slot
    /// exhaustion. Exposed for callers that rebuild into a larger map when
    /// the table runs hot.
    #[inline]
    pub fn max_load_factor(&self) -> f64 {
        self.max_load_factor
    }

    /// Sets the advisory load-factor ceiling.
    #[inline]
    pub fn set_max_load_factor(&mut self, factor: f64) {
        self.max_load_factor = factor;
    }

    /// The active collision placement policy.
    #[inline]
    pub fn insertion_mode(&self) -> InsertionMode {
        self.mode
    }

    /// Switches the collision placement policy.
    ///
    /// Only permitted while the map is empty - existing placements were
    /// made under the old policy and cannot be revisited. Returns `false`
    /// (and changes nothing) otherwise.
    pub fn set_insertion_mode(&mut self, mode: InsertionMode) -> bool {
        if !self.is_empty() {
            return false;
        }
        self.mode = mode;
        true
    }

    /// The [`InsertionMode::Eich`] probe window length.
    #[inline]
    pub fn probe_depth(&self) -> u32 {
        self.probe_depth
    }

    /// The map's hash builder.
    #[inline]
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Cursor at the first entry in traversal order, or at the end
    /// position if the map is empty.
    pub fn cursor_front(&self) -> Cursor<'_, K, V> {
        Cursor::new(&self.arena, self.arena.head())
    }

    /// Cursor at the past-the-end position. [`CoalescedMap::find`] returns
    /// an equal cursor on a miss.
    pub fn end(&self) -> Cursor<'_, K, V> {
        Cursor::new(&self.arena, self.arena.sentinel())
    }

    /// Iterates entries in traversal order: insertion order for
    /// non-colliding entries, chain-interleaved for colliding ones.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.arena)
    }

    /// Iterates entries with mutable access to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(&mut self.arena)
    }

    /// Iterates keys in traversal order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(&self.arena)
    }

    /// Iterates values in traversal order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(&self.arena)
    }

    /// Drops every entry and resets the whole table - links, bucket count
    /// and the free-tail cursor - to its freshly built state. This is the
    /// only way space ever comes back; there is no per-entry deletion.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.buckets = 0;
    }
}

impl<K, V, S> CoalescedMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Inserts a key/value pair.
    ///
    /// Returns a cursor at the affected entry plus `true` if the pair was
    /// newly inserted. If the key is already present, returns a cursor at
    /// the existing entry plus `false` - first insert wins, the stored
    /// value is not replaced (use [`CoalescedMap::get_mut`] to update in
    /// place).
    ///
    /// # Errors
    ///
    /// `Err(Full((key, value)))` when no free slot is reachable by the
    /// active policy. The arena is untouched in that case.
    ///
    /// # Example
    ///
    /// ```
    /// use coalmap::CoalescedMap;
    ///
    /// let mut map: CoalescedMap<u64, &str> = CoalescedMap::with_capacity(8);
    ///
    /// let (_, inserted) = map.try_insert(1, "one").unwrap();
    /// assert!(inserted);
    ///
    /// let (cursor, inserted) = map.try_insert(1, "uno").unwrap();
    /// assert!(!inserted);
    /// assert_eq!(cursor.value(), Some(&"one"));
    /// ```
    pub fn try_insert(&mut self, key: K, value: V) -> Result<(Cursor<'_, K, V>, bool), Full<(K, V)>> {
        let home = self.slot_for(&key);

        if !self.arena.is_allocated(home) {
            self.arena.construct(home, key, value);
            self.arena.link_singleton(home);
            self.arena.append_to_traversal(home);
            self.buckets += 1;
            return Ok((Cursor::new(&self.arena, home), true));
        }

        // Walk the chain: duplicate check and tail location in one pass.
        let mut at = home;
        let chain_tail = loop {
            if self.arena.entry(at).key == key {
                return Ok((Cursor::new(&self.arena, at), false));
            }
            let link = self.arena.link(at);
            if link.is_tail() {
                break at;
            }
            at = link.next();
        };

        let target = match self.mode {
            InsertionMode::Lich => self.arena.reserve_overflow(),
            InsertionMode::Eich | InsertionMode::Vich => self
                .probe_window(home)
                .or_else(|| self.arena.reserve_overflow()),
        };
        let Some(target) = target else {
            return Err(Full((key, value)));
        };

        self.arena.construct(target, key, value);
        self.arena.splice_after(chain_tail, target);
        Ok((Cursor::new(&self.arena, target), true))
    }

    /// Looks the key up, returning a cursor at its entry or at the end
    /// position ([`Cursor::is_end`]) when absent.
    pub fn find(&self, key: &K) -> Cursor<'_, K, V> {
        match self.find_slot(key) {
            Some(pos) => Cursor::new(&self.arena, pos),
            None => self.end(),
        }
    }

    /// Returns a reference to the value stored for `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.find_slot(key).map(|pos| &self.arena.entry(pos).value)
    }

    /// Returns a mutable reference to the value stored for `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let pos = self.find_slot(key)?;
        Some(&mut self.arena.entry_mut(pos).value)
    }

    /// Returns `true` if the key is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.find_slot(key).is_some()
    }

    #[inline]
    fn slot_for(&self, key: &K) -> u32 {
        (self.hash_builder.hash_one(key) % self.arena.address_len() as u64) as u32
    }

    /// The shared chain walk. Starts at the home slot whenever it is
    /// allocated, head-flagged or not: a slot borrowed as overflow can be a
    /// later key's home, and entries inserted through a borrowed home live
    /// downstream in the borrowing chain.
    fn find_slot(&self, key: &K) -> Option<u32> {
        let home = self.slot_for(key);
        if !self.arena.is_allocated(home) {
            return None;
        }

        let mut at = home;
        loop {
            if self.arena.entry(at).key == *key {
                return Some(at);
            }
            let link = self.arena.link(at);
            if link.is_tail() {
                return None;
            }
            at = link.next();
        }
    }

    /// First unallocated slot among the `probe_depth` slots after `home`,
    /// clamped to the address region. Cellar slots are reachable only
    /// through the free-tail scan.
    fn probe_window(&self, home: u32) -> Option<u32> {
        let end = home.saturating_add(self.probe_depth);
        let mut pos = home + 1;
        while pos <= end && pos < self.arena.address_len() {
            if !self.arena.is_allocated(pos) {
                return Some(pos);
            }
            pos += 1;
        }
        None
    }
}

impl<K, V, S> std::fmt::Debug for CoalescedMap<K, V, S>
where
    K: std::fmt::Debug,
    V: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, S> IntoIterator for &'a CoalescedMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut CoalescedMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
