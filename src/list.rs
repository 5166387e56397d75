use std::hash::Hash;
use std::marker::PhantomData;
use std::rc::Rc;

use log::trace;
use rustc_hash::FxHashMap;

use crate::eqmap::{EqualityFn, EqualityMap};
use crate::memo::{Engine, Memo};

/// Traversal strategy for sequence-shaped collections.
///
/// Implementors define how to visit every element of `Self::Input` and how
/// to rebuild an output of matching shape from the per-element results. The
/// engines stay agnostic to the concrete collection representation this
/// way.
pub trait ListMapper<T, R> {
    /// The collection that is traversed.
    type Input;
    /// The rebuilt collection.
    type Output;

    /// Visit every element exactly once and collect the callback's results
    /// into the output shape.
    fn traverse(&self, input: &Self::Input, f: &mut dyn FnMut(&T) -> R) -> Self::Output;
}

/// Element-wise traversal of a `Vec`.
#[derive(Copy, Clone, Default)]
pub struct VecMapper;

impl<T, R> ListMapper<T, R> for VecMapper {
    type Input = Vec<T>;
    type Output = Vec<R>;

    fn traverse(&self, input: &Vec<T>, f: &mut dyn FnMut(&T) -> R) -> Vec<R> {
        input.iter().map(f).collect()
    }
}

/// One cache generation: per-element results keyed by element value.
enum Store<T, R> {
    /// Elements compared with plain `Hash + Eq`.
    Native(FxHashMap<T, R>),
    /// Elements matched with a configured equality predicate.
    Probed(EqualityMap<T, R>),
}

impl<T: Hash + Eq + Clone, R> Store<T, R> {
    fn get(&self, key: &T) -> Option<&R> {
        match self {
            Self::Native(map) => map.get(key),
            Self::Probed(map) => map.get(key),
        }
    }

    fn insert(&mut self, key: T, result: R) {
        match self {
            Self::Native(map) => {
                map.insert(key, result);
            }
            Self::Probed(map) => map.set(key, result),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Native(map) => map.len(),
            Self::Probed(map) => map.len(),
        }
    }
}

/// Set-style memoization: per-element results cached by element value.
///
/// Consider each input as a _set_ of values. From traversal to traversal,
/// all new elements are computed, all removed elements are dropped, and the
/// intersection just stays cached. The cache is exactly one generation deep:
/// an element that vanishes for one call and reappears on a later one is
/// computed again.
pub struct ListEngine<T, A, R, F, M> {
    mapper: M,
    transform: F,
    equality: Option<EqualityFn<T>>,
    unique: bool,
    generation: Option<Store<T, R>>,
    computations: usize,
    marker: PhantomData<fn(&A)>,
}

impl<T, A, R, F, M> ListEngine<T, A, R, F, M>
where
    F: FnMut(&T, &A) -> R,
    M: ListMapper<T, R>,
{
    /// Create an engine that traverses with `mapper` and computes fresh
    /// elements with `transform`.
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

    /// Match elements with `equality` instead of `Hash + Eq`.
    ///
    /// Generations then live in an [`EqualityMap`], which trades pure hash
    /// lookups for a linear scan on misses.
    pub fn with_equality(mut self, equality: impl Fn(&T, &T) -> bool + 'static) -> Self {
        self.equality = Some(Rc::new(equality));
        self
    }

    /// When set, duplicate elements within one traversal do not share an
    /// in-progress result; each occurrence consults only the previous
    /// generation.
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }
}

impl<T, A, R, F, M> Engine for ListEngine<T, A, R, F, M>
where
    T: Hash + Eq + Clone,
    R: Clone,
    F: FnMut(&T, &A) -> R,
    M: ListMapper<T, R>,
{
    type Input = M::Input;
    type Args = A;
    type Output = M::Output;

    fn clear(&mut self) {
        self.generation = None;
    }

    fn compute(&mut self, input: &M::Input, args: &A) -> M::Output {
        let unique = self.unique;
        let prev = self.generation.as_ref();
        let mut next = match &self.equality {
            None => Store::<T, R>::Native(FxHashMap::default()),
            Some(equality) => Store::Probed(EqualityMap::new(Rc::clone(equality))),
        };

        let before = self.computations;
        let output = self.mapper.traverse(input, &mut |value| {
            // Duplicates within this traversal share the first occurrence's
            // result unless uniqueness is requested.
            if !unique {
                if let Some(result) = next.get(value) {
                    return result.clone();
                }
            }

            // Carry unchanged elements over from the previous generation.
            if let Some(prev) = prev {
                if let Some(result) = prev.get(value) {
                    let result = result.clone();
                    next.insert(value.clone(), result.clone());
                    return result;
                }
            }

            let result = (self.transform)(value, args);
            self.computations += 1;
            next.insert(value.clone(), result.clone());
            result
        });

        trace!(
            "list generation rebuilt: {} entries, {} recomputed",
            next.len(),
            self.computations - before,
        );

        // Elements absent from this traversal are dropped with the old
        // generation. A panicking traversal never reaches this point, which
        // leaves the previous generation valid.
        self.generation = Some(next);
        output
    }

    fn computations(&self) -> usize {
        self.computations
    }
}

/// Memoize `transform` element-wise over a `Vec`.
///
/// ```
/// use elemo::memoize_vec;
///
/// let mut scaled = memoize_vec(|value: &i32, factor: &i32| value * factor);
///
/// assert_eq!(scaled.call(vec![1, 2], 10), &[10, 20]);
/// assert_eq!(scaled.call(vec![1, 2, 3], 10), &[10, 20, 30]);
/// assert_eq!(scaled.recomputations(), 3);
/// ```
pub fn memoize_vec<T, A, R, F>(transform: F) -> Memo<ListEngine<T, A, R, F, VecMapper>>
where
    T: Hash + Eq + Clone,
    R: Clone,
    F: FnMut(&T, &A) -> R,
{
    Memo::new(ListEngine::new(VecMapper, transform))
}
