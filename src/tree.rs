//! Ordered position index.
//!
//! An unbalanced binary search tree keyed by caller-ordered positions. Every
//! gap in the tree is itself an addressable node: a set node always owns two
//! children, which are unset until a key lands there. This lets `locate` hand
//! back a reference to the exact slot a key belongs in before anything is
//! stored, and lets `infimum` walk upwards from that slot to the nearest key
//! before it.
//!
//! # Structure
//!
//! Nodes live in an arena and refer to each other by index. The arena owns
//! every node; `pre`/`post` are tree edges and `parent` is a back reference
//! used only for climbing. Nodes are never removed, so a `NodeRef` stays
//! valid for the whole life of its tree.
//!
//! ```text
//!            (5)
//!          /     \
//!        (2)      _
//!       /   \
//!      _     _
//! ```
//!
//! In-order, every slot (set or unset) has a position: `_ 2 _ 5 _`.
//! `successor`/`predecessor` move one slot at a time through that sequence,
//! and the scans skip the gaps.
//!
//! # Complexity
//!
//! The tree is never rebalanced, so every operation is O(depth), which is
//! O(n) for keys inserted in sorted order.

use std::cmp::Ordering;
use std::fmt;

use crate::order::Comparator;
use crate::order::NaturalOrder;

/// Handle to a node slot in a `PositionTree`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(u32);

impl NodeRef {
    /// The root slot, which exists from construction.
    pub const ROOT: NodeRef = NodeRef(0);

    #[inline]
    fn idx(self) -> usize {
        return self.0 as usize;
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "NodeRef({})", self.0);
    }
}

/// Contents of a node slot.
#[derive(Clone, Debug)]
pub enum Slot<K, V> {
    /// A gap in the tree: no key yet, no children.
    Unset,
    /// A populated node with both children present (possibly unset).
    Set {
        key: K,
        value: V,
        pre: NodeRef,
        post: NodeRef,
    },
}

#[derive(Clone, Debug)]
struct Node<K, V> {
    parent: Option<NodeRef>,
    slot: Slot<K, V>,
}

/// An unbalanced binary search tree with addressable gaps.
#[derive(Clone)]
pub struct PositionTree<K, V, C = NaturalOrder> {
    /// Arena of nodes. Index 0 is the root.
    nodes: Vec<Node<K, V>>,
    /// Number of set nodes.
    len: usize,
    cmp: C,
}

impl<K: Ord, V> PositionTree<K, V, NaturalOrder> {
    /// Create an empty tree ordered by `K: Ord`.
    pub fn new() -> Self {
        return PositionTree::with_comparator(NaturalOrder);
    }
}

impl<K: Ord, V> Default for PositionTree<K, V, NaturalOrder> {
    fn default() -> Self {
        return Self::new();
    }
}

impl<K, V, C: Comparator<K>> PositionTree<K, V, C> {
    /// Create an empty tree ordered by `cmp`. Only the unset root exists.
    pub fn with_comparator(cmp: C) -> Self {
        return PositionTree {
            nodes: vec![Node { parent: None, slot: Slot::Unset }],
            len: 0,
            cmp,
        };
    }

    /// The comparator this tree orders keys with.
    pub fn comparator(&self) -> &C {
        return &self.cmp;
    }

    /// Number of set nodes.
    pub fn len(&self) -> usize {
        return self.len;
    }

    pub fn is_empty(&self) -> bool {
        return self.len == 0;
    }

    /// The root slot.
    pub fn root(&self) -> NodeRef {
        return NodeRef::ROOT;
    }

    // --- Node access helpers ---

    fn node(&self, node: NodeRef) -> &Node<K, V> {
        return &self.nodes[node.idx()];
    }

    fn node_mut(&mut self, node: NodeRef) -> &mut Node<K, V> {
        return &mut self.nodes[node.idx()];
    }

    fn alloc_gap(&mut self, parent: NodeRef) -> NodeRef {
        let node = NodeRef(u32::try_from(self.nodes.len()).expect("position tree is full"));
        self.nodes.push(Node { parent: Some(parent), slot: Slot::Unset });
        return node;
    }

    fn pre(&self, node: NodeRef) -> Option<NodeRef> {
        return match self.node(node).slot {
            Slot::Set { pre, .. } => Some(pre),
            Slot::Unset => None,
        };
    }

    fn post(&self, node: NodeRef) -> Option<NodeRef> {
        return match self.node(node).slot {
            Slot::Set { post, .. } => Some(post),
            Slot::Unset => None,
        };
    }

    /// The raw slot of a node.
    ///
    /// # Panics
    ///
    /// Panics if `node` was not issued by this tree. The same holds for every
    /// method taking a `NodeRef`.
    pub fn slot(&self, node: NodeRef) -> &Slot<K, V> {
        return &self.node(node).slot;
    }

    /// The parent of a node, `None` for the root.
    ///
    /// # Panics
    ///
    /// Panics if `node` was not issued by this tree.
    pub fn parent(&self, node: NodeRef) -> Option<NodeRef> {
        return self.node(node).parent;
    }

    /// Whether the node holds a key.
    pub fn is_set(&self, node: NodeRef) -> bool {
        return matches!(self.node(node).slot, Slot::Set { .. });
    }

    pub fn key(&self, node: NodeRef) -> Option<&K> {
        return match &self.node(node).slot {
            Slot::Set { key, .. } => Some(key),
            Slot::Unset => None,
        };
    }

    /// The value stored at a node, `None` for a gap.
    ///
    /// # Panics
    ///
    /// Panics if `node` was not issued by this tree.
    pub fn value(&self, node: NodeRef) -> Option<&V> {
        return match &self.node(node).slot {
            Slot::Set { value, .. } => Some(value),
            Slot::Unset => None,
        };
    }

    /// # Panics
    ///
    /// Panics if `node` was not issued by this tree.
    pub fn value_mut(&mut self, node: NodeRef) -> Option<&mut V> {
        return match &mut self.node_mut(node).slot {
            Slot::Set { value, .. } => Some(value),
            Slot::Unset => None,
        };
    }

    // --- Lookup ---

    /// Find the node holding `key`, or the unset slot where `key` belongs.
    ///
    /// Every gap already exists as an unset node, so this never allocates.
    pub fn locate(&self, key: &K) -> NodeRef {
        let mut current = NodeRef::ROOT;
        loop {
            match &self.node(current).slot {
                Slot::Unset => return current,
                Slot::Set { key: here, pre, post, .. } => {
                    match self.cmp.compare(key, here) {
                        Ordering::Less => current = *pre,
                        Ordering::Greater => current = *post,
                        Ordering::Equal => return current,
                    }
                }
            }
        }
    }

    /// The value stored at `key`, if any.
    pub fn get(&self, key: &K) -> Option<&V> {
        return self.value(self.locate(key));
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let node = self.locate(key);
        return self.value_mut(node);
    }

    /// Store `value` at `key`, returning the value it replaced.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        let node = self.locate(&key);
        return self.set_at(node, key, value);
    }

    /// Store at a slot previously returned by `locate(&key)`.
    ///
    /// If the slot is already set its value is replaced (the existing key is
    /// kept) and the old value returned. Otherwise the slot is populated and
    /// gains two unset children.
    pub fn set_at(&mut self, node: NodeRef, key: K, value: V) -> Option<V> {
        if let Slot::Set { value: old, .. } = &mut self.node_mut(node).slot {
            return Some(std::mem::replace(old, value));
        }

        let pre = self.alloc_gap(node);
        let post = self.alloc_gap(node);
        self.node_mut(node).slot = Slot::Set { key, value, pre, post };
        self.len += 1;
        return None;
    }

    // --- Navigation ---

    /// The nearest set node at or before `node` in key order.
    ///
    /// A set node is its own infimum. For a gap, climb while the current node
    /// is a left child; the first ancestor reached through a right-child edge
    /// holds the greatest key below the gap. Returns `None` when the climb
    /// reaches the root without such an edge, i.e. nothing precedes the gap.
    pub fn infimum(&self, node: NodeRef) -> Option<NodeRef> {
        if self.is_set(node) {
            return Some(node);
        }

        let mut current = node;
        while let Some(parent) = self.parent(current) {
            if self.post(parent) == Some(current) {
                return Some(parent);
            }
            current = parent;
        }
        return None;
    }

    /// The nearest set node at or before `key`.
    pub fn infimum_of(&self, key: &K) -> Option<NodeRef> {
        return self.infimum(self.locate(key));
    }

    /// The next slot in order (set or unset), or `None` at the end.
    pub fn successor(&self, node: NodeRef) -> Option<NodeRef> {
        if let Some(post) = self.post(node) {
            let mut result = post;
            while let Some(pre) = self.pre(result) {
                result = pre;
            }
            return Some(result);
        }

        let mut current = node;
        while let Some(parent) = self.parent(current) {
            if self.pre(parent) == Some(current) {
                return Some(parent);
            }
            current = parent;
        }
        return None;
    }

    /// The previous slot in order (set or unset), or `None` at the start.
    pub fn predecessor(&self, node: NodeRef) -> Option<NodeRef> {
        if let Some(pre) = self.pre(node) {
            let mut result = pre;
            while let Some(post) = self.post(result) {
                result = post;
            }
            return Some(result);
        }

        let mut current = node;
        while let Some(parent) = self.parent(current) {
            if self.post(parent) == Some(current) {
                return Some(parent);
            }
            current = parent;
        }
        return None;
    }

    /// The first set node strictly after `node`.
    pub fn next_set(&self, node: NodeRef) -> Option<NodeRef> {
        let mut cursor = self.successor(node);
        while let Some(n) = cursor {
            if self.is_set(n) {
                return Some(n);
            }
            cursor = self.successor(n);
        }
        return None;
    }

    /// The first set node strictly before `node`.
    pub fn prev_set(&self, node: NodeRef) -> Option<NodeRef> {
        let mut cursor = self.predecessor(node);
        while let Some(n) = cursor {
            if self.is_set(n) {
                return Some(n);
            }
            cursor = self.predecessor(n);
        }
        return None;
    }

    /// The first slot in order (the leftmost gap).
    pub fn first(&self) -> NodeRef {
        let mut current = NodeRef::ROOT;
        while let Some(pre) = self.pre(current) {
            current = pre;
        }
        return current;
    }

    /// The last slot in order (the rightmost gap).
    pub fn last(&self) -> NodeRef {
        let mut current = NodeRef::ROOT;
        while let Some(post) = self.post(current) {
            current = post;
        }
        return current;
    }

    /// Set nodes from `from` (inclusive) forward to `until` (exclusive).
    /// `until = None` scans to the end.
    pub fn scan_forward(&self, from: NodeRef, until: Option<NodeRef>) -> Scan<'_, K, V, C> {
        return Scan { tree: self, cursor: Some(from), until, reverse: false };
    }

    /// Set nodes from `from` (inclusive) backward to `until` (exclusive).
    /// `until = None` scans to the start.
    pub fn scan_backward(&self, from: NodeRef, until: Option<NodeRef>) -> Scan<'_, K, V, C> {
        return Scan { tree: self, cursor: Some(from), until, reverse: true };
    }

    /// All `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        return self.scan_forward(self.first(), None).map(move |node| {
            match &self.node(node).slot {
                Slot::Set { key, value, .. } => (key, value),
                Slot::Unset => unreachable!("scan yields set nodes only"),
            }
        });
    }

    /// Depth of the deepest set node. Zero for an empty tree.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(NodeRef::ROOT, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            if let Slot::Set { pre, post, .. } = self.node(node).slot {
                deepest = deepest.max(depth + 1);
                stack.push((pre, depth + 1));
                stack.push((post, depth + 1));
            }
        }
        return deepest;
    }

    // --- Invariant checking ---

    /// Assert the search tree invariants. Panics on violation.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        let mut count = 0;
        let mut prev: Option<&K> = None;
        for node in self.scan_forward(self.first(), None) {
            let key = self.key(node).unwrap();
            if let Some(prev) = prev {
                assert_eq!(
                    self.cmp.compare(prev, key),
                    Ordering::Less,
                    "INVARIANT VIOLATED: keys out of order at {:?}",
                    node
                );
            }
            if let Slot::Set { pre, post, .. } = self.node(node).slot {
                assert_eq!(self.parent(pre), Some(node));
                assert_eq!(self.parent(post), Some(node));
            }
            prev = Some(key);
            count += 1;
        }
        assert_eq!(count, self.len, "INVARIANT VIOLATED: scan count != len");
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C: Comparator<K>> fmt::Debug for PositionTree<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.debug_map().entries(self.iter()).finish();
    }
}

/// Lazy in-order scan over the set nodes of a `PositionTree`.
pub struct Scan<'a, K, V, C> {
    tree: &'a PositionTree<K, V, C>,
    cursor: Option<NodeRef>,
    until: Option<NodeRef>,
    reverse: bool,
}

impl<'a, K, V, C: Comparator<K>> Iterator for Scan<'a, K, V, C> {
    type Item = NodeRef;

    fn next(&mut self) -> Option<NodeRef> {
        while let Some(current) = self.cursor {
            if Some(current) == self.until {
                self.cursor = None;
                return None;
            }

            self.cursor = if self.reverse {
                self.tree.predecessor(current)
            } else {
                self.tree.successor(current)
            };

            if self.tree.is_set(current) {
                return Some(current);
            }
        }
        return None;
    }
}
