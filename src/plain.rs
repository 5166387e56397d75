use std::marker::PhantomData;

use crate::memo::{Engine, Memo};

/// Whole-result memoization: an engine that recomputes the entire output on
/// every miss.
///
/// Wrapped in a [`Memo`], this is ordinary single-slot memoization of the
/// complete call, with no per-element reuse. It exists as a first-class
/// sibling of the element-aware engines so that both memoization roles can
/// be installed and tested independently.
pub struct PlainEngine<I, A, O, F> {
    func: F,
    computations: usize,
    marker: PhantomData<fn(&I, &A) -> O>,
}

impl<I, A, O, F> PlainEngine<I, A, O, F>
where
    F: FnMut(&I, &A) -> O,
{
    /// Wrap a function computing the whole output from input and arguments.
    pub fn new(func: F) -> Self {
        Self { func, computations: 0, marker: PhantomData }
    }
}

impl<I, A, O, F> Engine for PlainEngine<I, A, O, F>
where
    F: FnMut(&I, &A) -> O,
{
    type Input = I;
    type Args = A;
    type Output = O;

    fn clear(&mut self) {}

    fn compute(&mut self, input: &I, args: &A) -> O {
        let output = (self.func)(input, args);
        self.computations += 1;
        output
    }

    fn computations(&self) -> usize {
        self.computations
    }
}

/// Memoize the most recent call to `func`.
///
/// ```
/// use elemo::memoize_fn;
///
/// let mut total = memoize_fn(|values: &Vec<i32>, offset: &i32| {
///     values.iter().sum::<i32>() + offset
/// });
///
/// assert_eq!(total.call(vec![1, 2, 3], 10), &16);
/// assert_eq!(total.call(vec![1, 2, 3], 10), &16);
/// assert_eq!(total.recomputations(), 1);
/// ```
pub fn memoize_fn<I, A, O, F>(func: F) -> Memo<PlainEngine<I, A, O, F>>
where
    F: FnMut(&I, &A) -> O,
{
    Memo::new(PlainEngine::new(func))
}
