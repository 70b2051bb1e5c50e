//! Cascading state replay over document positions.
//!
//! Transitions are placed at positions along the document. The effective
//! state at a position is every transition at or before it, merged in
//! document order (and, at a single position, in the order they were added).
//!
//! Replaying all prior transitions for every query is O(total transitions),
//! so each touched position caches its merged state. A query then costs one
//! tree descent. Mutations repair the caches after them, but only while a
//! changed pair has not yet been overridden further down the document:
//!
//! ```text
//! position:    5            10           20
//! active:      emotion=sad  emotion=happy pace=slow
//! cached:      sad          happy         happy, slow
//!
//! add(7, emotion=angry):
//!   repair visits 10, sees emotion redefined there, and stops.
//! ```
//!
//! Touched positions are never removed. Once its last transition is removed,
//! a position simply caches the same state as its predecessor.

use std::fmt;

use smallvec::SmallVec;
use smallvec::smallvec;
use tracing::debug;
use tracing::trace;

use crate::config::ReplayConfig;
use crate::error::ReplayError;
use crate::meta::MetaState;
use crate::meta::Transition;
use crate::order::Comparator;
use crate::order::NaturalOrder;
use crate::tree::NodeRef;
use crate::tree::PositionTree;

/// Transitions active at one position and the merged state as of it.
#[derive(Clone, Debug)]
struct Entry {
    /// In the order they were added. No transition appears twice.
    active: SmallVec<[Transition; 2]>,
    /// Predecessor's state with every active transition applied.
    state: MetaState,
}

impl Entry {
    fn contains(&self, transition: &Transition) -> bool {
        return self.active.iter().any(|t| t.id() == transition.id());
    }
}

/// Handle returned by `MetaReplay::on_update`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut() + Send>;

/// Position-indexed transitions with cached cumulative state.
pub struct MetaReplay<P, C = NaturalOrder> {
    states: PositionTree<P, Entry, C>,
    /// State before any transition.
    base: MetaState,
    config: ReplayConfig,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl<P: Ord> MetaReplay<P, NaturalOrder> {
    /// Create an empty replay ordered by `P: Ord`.
    pub fn new() -> Self {
        return MetaReplay::with_comparator(NaturalOrder);
    }
}

impl<P: Ord> Default for MetaReplay<P, NaturalOrder> {
    fn default() -> Self {
        return Self::new();
    }
}

impl<P, C: Comparator<P>> MetaReplay<P, C> {
    /// Create an empty replay ordered by `cmp`.
    pub fn with_comparator(cmp: C) -> Self {
        return MetaReplay::with_config(cmp, ReplayConfig::default());
    }

    pub fn with_config(cmp: C, config: ReplayConfig) -> Self {
        return MetaReplay {
            states: PositionTree::with_comparator(cmp),
            base: MetaState::new(),
            config,
            listeners: Vec::new(),
            next_listener: 0,
        };
    }

    pub fn config(&self) -> &ReplayConfig {
        return &self.config;
    }

    /// Number of positions that have ever held a transition.
    pub fn len(&self) -> usize {
        return self.states.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.states.is_empty();
    }

    /// Apply `transition` at `position`.
    ///
    /// Adding a transition that is already active at `position` changes
    /// nothing. A transition that assigns nothing is ignored.
    pub fn add(&mut self, position: P, transition: &Transition) {
        if transition.is_empty() {
            return;
        }

        let node = self.states.locate(&position);
        match self.states.value_mut(node) {
            Some(entry) => {
                if !entry.contains(transition) {
                    entry.active.push(transition.clone());
                }
            }
            None => {
                let entry = Entry {
                    active: smallvec![transition.clone()],
                    state: MetaState::new(),
                };
                self.states.set_at(node, position, entry);
            }
        }
        self.recompute(node);

        // Values as they ended up here, which may differ from the
        // transition's own if a later add at this position overrides them.
        let pending = self.state_of(node).restrict_to(transition.meta());
        self.repair_after_add(node, pending);
        self.notify();
    }

    /// Undo an earlier `add(position, transition)`.
    ///
    /// Fails without modifying anything if the transition is not active at
    /// `position`.
    pub fn remove(&mut self, position: &P, transition: &Transition) -> Result<(), ReplayError> {
        let node = self.states.locate(position);
        let Some(entry) = self.states.value_mut(node) else {
            debug!(id = %transition.id(), "rejected removal at untouched position");
            return Err(ReplayError::UnknownPosition);
        };
        let Some(index) = entry.active.iter().position(|t| t.id() == transition.id()) else {
            debug!(id = %transition.id(), "rejected removal of inactive transition");
            return Err(ReplayError::UnknownTransition { id: transition.id() });
        };

        let removed = entry.active.remove(index);
        self.recompute(node);
        self.repair_after_remove(node, removed.meta().clone());
        self.notify();
        return Ok(());
    }

    /// The effective state at `position`.
    ///
    /// Empty if no transition lies at or before `position`.
    pub fn get(&self, position: &P) -> &MetaState {
        let node = self.states.locate(position);
        return match self.states.infimum(node) {
            Some(inf) => self.state_of(inf),
            None => &self.base,
        };
    }

    /// Transitions active exactly at `position`, in the order they were added.
    pub fn transitions_at(&self, position: &P) -> &[Transition] {
        return match self.states.get(position) {
            Some(entry) => entry.active.as_slice(),
            None => &[],
        };
    }

    /// Every touched position in document order.
    pub fn positions(&self) -> impl Iterator<Item = &P> + '_ {
        return self.states.iter().map(|(position, _)| position);
    }

    /// Call `listener` after every successful `add` or `remove`.
    pub fn on_update(&mut self, listener: impl FnMut() + Send + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        return id;
    }

    /// Stop calling a listener. Returns whether it was registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener, _)| *listener != id);
        return self.listeners.len() != before;
    }

    // --- Internals ---

    fn notify(&mut self) {
        for (_, listener) in self.listeners.iter_mut() {
            listener();
        }
    }

    /// Cached state of a set node, or the base state for anything else.
    fn state_of(&self, node: NodeRef) -> &MetaState {
        return match self.states.value(node) {
            Some(entry) => &entry.state,
            None => &self.base,
        };
    }

    /// Rebuild a node's cache from the state before it and its active set.
    fn recompute(&mut self, node: NodeRef) {
        let mut state = match self.states.prev_set(node) {
            Some(prev) => self.state_of(prev).clone(),
            None => self.base.clone(),
        };
        if let Some(entry) = self.states.value_mut(node) {
            for transition in &entry.active {
                state.assign(transition.meta());
            }
            entry.state = state;
        }
    }

    /// Push `pending` into later caches until every pair is overridden.
    fn repair_after_add(&mut self, node: NodeRef, mut pending: MetaState) {
        let early_exit = self.config.early_exit();
        let mut visited = 0usize;
        let mut cursor = self.states.next_set(node);

        while let Some(next) = cursor {
            let Some(entry) = self.states.value_mut(next) else { break };
            for transition in &entry.active {
                pending.remove_overridden(transition.meta());
            }
            if pending.is_empty() && early_exit {
                break;
            }
            entry.state.assign(&pending);
            visited += 1;
            cursor = self.states.next_set(next);
        }

        trace!(visited, remaining = pending.len(), "forward repair after add");
    }

    /// Replay later positions on top of the rebuilt state at `node` until
    /// every pair the removed transition assigned is overridden.
    fn repair_after_remove(&mut self, node: NodeRef, mut pending: MetaState) {
        let early_exit = self.config.early_exit();
        let mut visited = 0usize;
        let mut running = self.state_of(node).clone();
        let mut cursor = self.states.next_set(node);

        while let Some(next) = cursor {
            if pending.is_empty() && early_exit {
                break;
            }
            let Some(entry) = self.states.value_mut(next) else { break };
            for transition in &entry.active {
                running.assign(transition.meta());
                pending.remove_overridden(transition.meta());
            }
            entry.state = running.clone();
            visited += 1;
            cursor = self.states.next_set(next);
        }

        trace!(visited, remaining = pending.len(), "forward repair after remove");
    }

    /// Assert every cache equals a full replay from the start.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        self.states.check_invariants();
        let mut running = self.base.clone();
        for (_, entry) in self.states.iter() {
            for transition in &entry.active {
                running.assign(transition.meta());
            }
            assert_eq!(entry.state, running, "INVARIANT VIOLATED: stale cache");
        }
    }
}

impl<P: fmt::Debug, C: Comparator<P>> fmt::Debug for MetaReplay<P, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f
            .debug_struct("MetaReplay")
            .field("states", &self.states)
            .field("config", &self.config)
            .field("listeners", &self.listeners.len())
            .finish();
    }
}
