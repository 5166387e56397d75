//! Element-level memoization for collection-shaped derived state.
//!
//! Ordinary memoization caches one output against one input. When the input
//! is a large collection of which only a few elements change between calls,
//! that granularity forces a full recomputation every time. This crate
//! instead caches the per-element transform independently per element (or
//! per key): between two calls, only elements that are new or changed run
//! the transform, everything else is carried over from the previous cache
//! generation.
//!
//! Two engines cover the two collection shapes:
//!
//! - [`ListEngine`] treats the input as a sequence of values and caches by
//!   element value.
//! - [`MapEngine`] treats the input as a key-value mapping, caches by key,
//!   and invalidates an entry when the value stored at its key changes.
//!
//! Both sit below [`Memo`], a single-slot wrapper that skips even the
//! traversal when neither the input nor the extra arguments changed, and
//! drops the per-element generation entirely when the extra arguments do
//! change. [`PlainEngine`] completes the family with ordinary whole-result
//! memoization under the same wrapper, so both memoization roles can be
//! installed wherever a plain memoizing function is expected.
//!
//! How a collection is traversed and rebuilt is an injected strategy
//! ([`ListMapper`] / [`MapMapper`]); [`VecMapper`] and [`BTreeMapper`] cover
//! `Vec` and `BTreeMap`, anything else is a small trait impl away.
//!
//! ```
//! use elemo::memoize_vec;
//!
//! let mut doubled = memoize_vec(|value: &i32, _: &()| value * 2);
//!
//! assert_eq!(doubled.call(vec![1, 2, 3], ()), &[2, 4, 6]);
//! assert_eq!(doubled.recomputations(), 3);
//!
//! // Only the new element runs the transform.
//! assert_eq!(doubled.call(vec![2, 3, 4], ()), &[4, 6, 8]);
//! assert_eq!(doubled.recomputations(), 4);
//! ```
//!
//! Calls run to completion on the calling thread; a memoized instance is a
//! plain mutable value, not a shared cache. Invoking a memoized function
//! from within its own transform cannot compile because every entry point
//! takes `&mut self`.

mod eqmap;
mod list;
mod map;
mod memo;
mod plain;

pub use crate::eqmap::{EqualityFn, EqualityMap};
pub use crate::list::{ListEngine, ListMapper, VecMapper, memoize_vec};
pub use crate::map::{BTreeMapper, MapEngine, MapMapper, memoize_btree};
pub use crate::memo::{Engine, Memo};
pub use crate::plain::{PlainEngine, memoize_fn};
