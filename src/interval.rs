//! Stabbing queries over labeled spans.
//!
//! Two position trees index the same intervals, one by start and one by end.
//! A point `p` is covered by an interval iff `start <= p` and `end >= p`, so
//! a query unions every set at or before `p` in the start tree, unions every
//! set at or after `p` in the end tree, and intersects the two.
//!
//! Both trees clone the single comparator passed to `with_comparator`, so
//! starts, ends and query points are always ordered the same way.
//!
//! Values are matched by equality across the two trees, so a value is
//! attached to at most one interval per start and per end. `add` refuses a
//! value already present at either endpoint, and `remove` only detaches a
//! value present at both, so the trees always hold the same memberships.
//!
//! Queries are O(n) in the number of distinct starts and ends. Emptied sets
//! stay in the trees.

use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashSet;

use crate::order::Comparator;
use crate::order::NaturalOrder;
use crate::tree::PositionTree;

/// A closed span `[start, end]` along the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Interval<P> {
    pub start: P,
    pub end: P,
}

impl<P> Interval<P> {
    pub fn new(start: P, end: P) -> Interval<P> {
        return Interval { start, end };
    }
}

/// Values attached to intervals, indexed for stabbing queries.
#[derive(Clone)]
pub struct IntervalIndex<P, T, C = NaturalOrder> {
    by_start: PositionTree<P, FxHashSet<T>, C>,
    by_end: PositionTree<P, FxHashSet<T>, C>,
    /// Number of stored (interval, value) memberships.
    len: usize,
}

impl<P: Ord, T: Eq + Hash + Clone> IntervalIndex<P, T, NaturalOrder> {
    /// Create an empty index ordered by `P: Ord`.
    pub fn new() -> Self {
        return IntervalIndex::with_comparator(NaturalOrder);
    }
}

impl<P: Ord, T: Eq + Hash + Clone> Default for IntervalIndex<P, T, NaturalOrder> {
    fn default() -> Self {
        return Self::new();
    }
}

impl<P, T, C> IntervalIndex<P, T, C>
where
    T: Eq + Hash + Clone,
    C: Comparator<P> + Clone,
{
    /// Create an empty index. Starts and ends are both ordered by `cmp`.
    pub fn with_comparator(cmp: C) -> Self {
        return IntervalIndex {
            by_start: PositionTree::with_comparator(cmp.clone()),
            by_end: PositionTree::with_comparator(cmp),
            len: 0,
        };
    }

    pub fn len(&self) -> usize {
        return self.len;
    }

    pub fn is_empty(&self) -> bool {
        return self.len == 0;
    }

    /// Attach `value` to `interval`.
    ///
    /// Returns false, leaving the index unchanged, if `value` is already
    /// attached at `interval.start` or at `interval.end`.
    pub fn add(&mut self, interval: Interval<P>, value: T) -> bool {
        if holds(&self.by_start, &interval.start, &value) || holds(&self.by_end, &interval.end, &value) {
            return false;
        }
        insert_into(&mut self.by_start, interval.start, value.clone());
        insert_into(&mut self.by_end, interval.end, value);
        self.len += 1;
        return true;
    }

    /// Detach `value` from `interval`.
    ///
    /// Returns false, leaving the index unchanged, unless `value` is attached
    /// at both `interval.start` and `interval.end`.
    pub fn remove(&mut self, interval: &Interval<P>, value: &T) -> bool {
        if !holds(&self.by_start, &interval.start, value) || !holds(&self.by_end, &interval.end, value) {
            return false;
        }
        remove_from(&mut self.by_start, &interval.start, value);
        remove_from(&mut self.by_end, &interval.end, value);
        self.len -= 1;
        return true;
    }

    /// Every value whose interval covers `point`.
    pub fn get_all(&self, point: &P) -> FxHashSet<T> {
        let mut ends_after = FxHashSet::default();
        for node in self.by_end.scan_forward(self.by_end.locate(point), None) {
            if let Some(values) = self.by_end.value(node) {
                ends_after.extend(values.iter().cloned());
            }
        }
        if ends_after.is_empty() {
            return ends_after;
        }

        let mut result = FxHashSet::default();
        let Some(last_start) = self.by_start.infimum_of(point) else {
            return result;
        };
        for node in self.by_start.scan_backward(last_start, None) {
            if let Some(values) = self.by_start.value(node) {
                result.extend(values.iter().filter(|v| ends_after.contains(*v)).cloned());
            }
        }
        return result;
    }
}

impl<P: fmt::Debug, T: fmt::Debug, C: Comparator<P>> fmt::Debug for IntervalIndex<P, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f
            .debug_struct("IntervalIndex")
            .field("by_start", &self.by_start)
            .field("by_end", &self.by_end)
            .finish();
    }
}

fn holds<P, T, C>(tree: &PositionTree<P, FxHashSet<T>, C>, key: &P, value: &T) -> bool
where
    T: Eq + Hash,
    C: Comparator<P>,
{
    return match tree.get(key) {
        Some(values) => values.contains(value),
        None => false,
    };
}

fn insert_into<P, T, C>(tree: &mut PositionTree<P, FxHashSet<T>, C>, key: P, value: T)
where
    T: Eq + Hash,
    C: Comparator<P>,
{
    let node = tree.locate(&key);
    if let Some(values) = tree.value_mut(node) {
        values.insert(value);
        return;
    }
    let mut values = FxHashSet::default();
    values.insert(value);
    tree.set_at(node, key, values);
}

fn remove_from<P, T, C>(tree: &mut PositionTree<P, FxHashSet<T>, C>, key: &P, value: &T)
where
    T: Eq + Hash,
    C: Comparator<P>,
{
    if let Some(values) = tree.get_mut(key) {
        values.remove(value);
    }
}
