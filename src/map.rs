use std::collections::BTreeMap;
use std::hash::Hash;
use std::marker::PhantomData;
use std::rc::Rc;

use log::trace;
use rustc_hash::FxHashMap;

use crate::eqmap::EqualityFn;
use crate::memo::{Engine, Memo};

/// Traversal strategy for map-shaped collections.
pub trait MapMapper<K, V, R> {
    /// The mapping that is traversed.
    type Input;
    /// The rebuilt mapping.
    type Output;

    /// Visit every entry exactly once and collect the callback's results
    /// into an output with the same key set.
    fn traverse(&self, input: &Self::Input, f: &mut dyn FnMut(&K, &V) -> R) -> Self::Output;
}

/// Entry-wise traversal of a `BTreeMap`.
#[derive(Copy, Clone, Default)]
pub struct BTreeMapper;

impl<K: Ord + Clone, V, R> MapMapper<K, V, R> for BTreeMapper {
    type Input = BTreeMap<K, V>;
    type Output = BTreeMap<K, R>;

    fn traverse(
        &self,
        input: &BTreeMap<K, V>,
        f: &mut dyn FnMut(&K, &V) -> R,
    ) -> BTreeMap<K, R> {
        input.iter().map(|(k, v)| (k.clone(), f(k, v))).collect()
    }
}

/// A cached entry: the result together with the value it was computed from.
struct Record<V, R> {
    value: V,
    result: R,
}

/// Map-style memoization: per-entry results cached by key, invalidated
/// individually when the value stored at that key changes.
///
/// A nice way to think of this engine is as a collection of independent
/// single-value memoizers, one per key. Key presence alone is not enough for
/// reuse, because the same key can carry a materially different value across
/// generations.
pub struct MapEngine<K, V, A, R, F, M> {
    mapper: M,
    transform: F,
    equality: Option<EqualityFn<V>>,
    unique: bool,
    generation: Option<FxHashMap<K, Record<V, R>>>,
    computations: usize,
    marker: PhantomData<fn(&A)>,
}

impl<K, V, A, R, F, M> MapEngine<K, V, A, R, F, M>
where
    F: FnMut(&V, &A, &K) -> R,
    M: MapMapper<K, V, R>,
{
    /// Create an engine that traverses with `mapper` and computes fresh
    /// entries with `transform`.
    ///
    /// The transform receives the entry's value, the extra arguments, and
    /// the key, in that order.
    pub fn new(mapper: M, transform: F) -> Self {
        Self {
            mapper,
            transform,
            equality: None,
            unique: false,
            generation: None,
            computations: 0,
            marker: PhantomData,
        }
    }

    /// Compare stored against current values with `equality` instead of
    /// `PartialEq`.
    pub fn with_equality(mut self, equality: impl Fn(&V, &V) -> bool + 'static) -> Self {
        self.equality = Some(Rc::new(equality));
        self
    }

    /// When set, a key visited twice within one traversal does not share an
    /// in-progress result; each visit consults only the previous generation.
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }
}

impl<K, V, A, R, F, M> Engine for MapEngine<K, V, A, R, F, M>
where
    K: Hash + Eq + Clone,
    V: PartialEq + Clone,
    R: Clone,
    F: FnMut(&V, &A, &K) -> R,
    M: MapMapper<K, V, R>,
{
    type Input = M::Input;
    type Args = A;
    type Output = M::Output;

    fn clear(&mut self) {
        self.generation = None;
    }

    fn compute(&mut self, input: &M::Input, args: &A) -> M::Output {
        let unique = self.unique;
        let equality = self.equality.as_deref();
        let prev = self.generation.as_ref();
        let mut next: FxHashMap<K, Record<V, R>> = FxHashMap::default();

        let before = self.computations;
        let output = self.mapper.traverse(input, &mut |key, value| {
            if !unique {
                if let Some(record) = next.get(key) {
                    return record.result.clone();
                }
            }

            // Reuse requires the stored value to still match the current
            // one. The previous record is carried over as-is, keeping its
            // value as the baseline for future comparisons.
            if let Some(prev) = prev {
                if let Some(record) = prev.get(key) {
                    let matches = match equality {
                        None => record.value == *value,
                        Some(equality) => equality(&record.value, value),
                    };
                    if matches {
                        let result = record.result.clone();
                        next.insert(
                            key.clone(),
                            Record { value: record.value.clone(), result: result.clone() },
                        );
                        return result;
                    }
                }
            }

            let result = (self.transform)(value, args, key);
            self.computations += 1;
            next.insert(
                key.clone(),
                Record { value: value.clone(), result: result.clone() },
            );
            result
        });

        trace!(
            "map generation rebuilt: {} entries, {} recomputed",
            next.len(),
            self.computations - before,
        );

        // Keys absent from this traversal are evicted with the old
        // generation. A panicking traversal never reaches this point, which
        // leaves the previous generation valid.
        self.generation = Some(next);
        output
    }

    fn computations(&self) -> usize {
        self.computations
    }
}

/// Memoize `transform` entry-wise over a `BTreeMap`.
///
/// Keys of a map are unique by construction, so the in-progress duplicate
/// short-circuit is disabled.
///
/// ```
/// use std::collections::BTreeMap;
/// use elemo::memoize_btree;
///
/// let mut scaled = memoize_btree(|value: &i32, factor: &i32, _: &&str| value * factor);
///
/// let input = BTreeMap::from([("a", 1), ("b", 2)]);
/// assert_eq!(scaled.call(input, 10), &BTreeMap::from([("a", 10), ("b", 20)]));
/// assert_eq!(scaled.recomputations(), 2);
///
/// // Only the entry whose value changed is recomputed.
/// let input = BTreeMap::from([("a", 5), ("b", 2)]);
/// assert_eq!(scaled.call(input, 10), &BTreeMap::from([("a", 50), ("b", 20)]));
/// assert_eq!(scaled.recomputations(), 3);
/// ```
pub fn memoize_btree<K, V, A, R, F>(transform: F) -> Memo<MapEngine<K, V, A, R, F, BTreeMapper>>
where
    K: Ord + Hash + Eq + Clone,
    V: PartialEq + Clone,
    R: Clone,
    F: FnMut(&V, &A, &K) -> R,
{
    Memo::new(MapEngine::new(BTreeMapper, transform).unique(true))
}
