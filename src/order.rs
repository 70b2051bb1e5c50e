//! Total orders over positions.
//!
//! Positions are opaque to the index. The caller supplies the order, either
//! through `Ord` (`NaturalOrder`) or a closure comparing two positions, e.g.
//! the document order of two range boundaries.
//!
//! The comparator must be a strict total order and must stay stable for as
//! long as the tree holding it is alive. An order that changes between calls
//! breaks the search tree invariants; this is not detected.

use std::cmp::Ordering;

/// A total order over keys of type `K`.
pub trait Comparator<K: ?Sized> {
    /// Compare two keys.
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// The order given by the key's own `Ord` implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> Comparator<K> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        return a.cmp(b);
    }
}

impl<K: ?Sized, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        return self(a, b);
    }
}
