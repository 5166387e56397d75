use std::cell::RefCell;
use std::hash::Hash;
use std::rc::Rc;

use rustc_hash::FxHashMap;

/// A shared equality predicate over a single domain.
pub type EqualityFn<T> = Rc<dyn Fn(&T, &T) -> bool>;

/// An associative structure for keys matched by a custom equality predicate.
///
/// A hash map would _ideally_ back every cache generation, but a hash map
/// cannot answer lookups once equality is decided by an arbitrary predicate
/// instead of `Eq`. This map keeps the stored keys in insertion order and
/// scans them with the predicate on a lookup miss; keys that match a stored
/// key under plain `Hash + Eq` still resolve through a fast-path index,
/// likely the common case. Scan hits are memoized into the index, so probing
/// with the same key is only slow once.
///
/// The notably slower operations are cache misses and probes whose key
/// changed identity while remaining predicate-equal; both stay linear in the
/// number of stored keys.
pub struct EqualityMap<K, V> {
    equality: EqualityFn<K>,
    /// Fast path from exact keys to slot positions. Interior-mutable so that
    /// lookups through a shared previous generation can still memoize
    /// successful probes.
    index: RefCell<FxHashMap<K, usize>>,
    /// Key-value slots in insertion order, scanned on fast-path misses.
    slots: Vec<(K, V)>,
}

impl<K: Hash + Eq + Clone, V> EqualityMap<K, V> {
    /// Create an empty map matching keys with `equality`.
    pub fn new(equality: EqualityFn<K>) -> Self {
        Self {
            equality,
            index: RefCell::new(FxHashMap::default()),
            slots: Vec::new(),
        }
    }

    /// Look up the value stored under a key the predicate considers equal to
    /// `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        let mut index = self.index.borrow_mut();
        let i = match index.get(key) {
            Some(&i) => i,
            None => {
                let equality = &*self.equality;
                let i = self
                    .slots
                    .iter()
                    .position(|(stored, _)| equality(key, stored))?;
                index.insert(key.clone(), i);
                i
            }
        };
        Some(&self.slots[i].1)
    }

    /// Insert a key confirmed absent by a preceding [`get`](Self::get) miss.
    /// Existence is not re-checked.
    #[inline]
    pub fn set(&mut self, key: K, value: V) {
        self.index.get_mut().insert(key.clone(), self.slots.len());
        self.slots.push((key, value));
    }

    /// The number of stored entries. Indexed probe aliases do not count.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no entries are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modulo_ten() -> EqualityMap<u32, &'static str> {
        EqualityMap::new(Rc::new(|a: &u32, b: &u32| a % 10 == b % 10))
    }

    #[test]
    fn test_exact_key() {
        let mut map = modulo_ten();
        map.set(1, "one");
        map.set(2, "two");
        assert_eq!(map.get(&1), Some(&"one"));
        assert_eq!(map.get(&2), Some(&"two"));
        assert_eq!(map.get(&3), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_predicate_probe_is_memoized() {
        let mut map = modulo_ten();
        map.set(1, "one");
        map.set(2, "two");
        // First probe goes through the linear scan, the second through the
        // index it populated.
        assert_eq!(map.get(&21), Some(&"one"));
        assert_eq!(map.get(&21), Some(&"one"));
        assert_eq!(map.get(&12), Some(&"two"));
        assert_eq!(map.get(&33), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_scan_in_insertion_order() {
        let mut map = EqualityMap::<u32, &'static str>::new(Rc::new(|_, _| true));
        map.set(1, "first");
        map.set(2, "second");
        // A probe that misses the index resolves to the earliest stored
        // key; an exact key still wins through the index.
        assert_eq!(map.get(&99), Some(&"first"));
        assert_eq!(map.get(&2), Some(&"second"));
    }
}
