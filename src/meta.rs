//! Property assignments and the state they accumulate into.
//!
//! A `MetaState` maps a target (the subject an assignment applies to, such as
//! `character="Twilight Sparkle"`) to its properties and their values. The
//! same shape serves two roles:
//!
//! - the contents of a `Transition`, the bundle of assignments a label
//!   commits at one position, and
//! - the cumulative state at a position, i.e. every transition at or before
//!   it merged in document order.
//!
//! Merging is last-writer-wins per `(target, property)` pair.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use rustc_hash::FxHashMap;

/// Properties of a single target.
pub type Properties = FxHashMap<String, String>;

/// Cumulative or per-transition assignment state.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct MetaState {
    targets: FxHashMap<String, Properties>,
}

impl MetaState {
    /// Create an empty state.
    pub fn new() -> MetaState {
        return MetaState { targets: FxHashMap::default() };
    }

    /// Assign `prop = value` on `target`.
    pub fn set(&mut self, target: impl Into<String>, prop: impl Into<String>, value: impl Into<String>) {
        self.targets
            .entry(target.into())
            .or_default()
            .insert(prop.into(), value.into());
    }

    /// The value of `prop` on `target`, if assigned.
    pub fn get(&self, target: &str, prop: &str) -> Option<&str> {
        return self.targets.get(target)?.get(prop).map(String::as_str);
    }

    pub fn has_assignment(&self, target: &str, prop: &str) -> bool {
        return self.get(target, prop).is_some();
    }

    /// Remove the assignment of `prop` on `target`. Targets left without any
    /// property are dropped.
    pub fn delete(&mut self, target: &str, prop: &str) -> Option<String> {
        let props = self.targets.get_mut(target)?;
        let removed = props.remove(prop);
        if props.is_empty() {
            self.targets.remove(target);
        }
        return removed;
    }

    /// The properties assigned on `target`.
    pub fn target(&self, target: &str) -> Option<&Properties> {
        return self.targets.get(target);
    }

    /// Targets and their properties, in no particular order.
    pub fn targets(&self) -> impl Iterator<Item = (&str, &Properties)> + '_ {
        return self.targets.iter().map(|(t, p)| (t.as_str(), p));
    }

    /// Whether no assignment is present.
    pub fn is_empty(&self) -> bool {
        return self.targets.is_empty();
    }

    /// Number of `(target, property)` pairs.
    pub fn len(&self) -> usize {
        return self.targets.values().map(|p| p.len()).sum();
    }

    /// All `(target, property, value)` triples, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &str)> + '_ {
        return self.targets.iter().flat_map(|(target, props)| {
            props.iter().map(move |(prop, value)| (target.as_str(), prop.as_str(), value.as_str()))
        });
    }

    /// Merge `other` on top of this state, overwriting pairs both assign.
    pub fn assign(&mut self, other: &MetaState) {
        for (target, props) in &other.targets {
            let into = self.targets.entry(target.clone()).or_default();
            for (prop, value) in props {
                into.insert(prop.clone(), value.clone());
            }
        }
    }

    /// Drop every pair that `other` also assigns, whatever its value.
    pub fn remove_overridden(&mut self, other: &MetaState) {
        for (target, props) in &other.targets {
            for prop in props.keys() {
                self.delete(target, prop);
            }
        }
    }

    /// The subset of this state covering the pairs `keys` assigns.
    pub fn restrict_to(&self, keys: &MetaState) -> MetaState {
        let mut result = MetaState::new();
        for (target, prop, _) in keys.iter() {
            if let Some(value) = self.get(target, prop) {
                result.set(target, prop, value);
            }
        }
        return result;
    }
}

impl fmt::Debug for MetaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Sorted so that failing assertions are readable.
        let mut triples: Vec<_> = self.iter().collect();
        triples.sort();
        return f.debug_list().entries(triples).finish();
    }
}

impl<T, P, V> FromIterator<(T, P, V)> for MetaState
where
    T: Into<String>,
    P: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (T, P, V)>>(iter: I) -> MetaState {
        let mut state = MetaState::new();
        for (target, prop, value) in iter {
            state.set(target, prop, value);
        }
        return state;
    }
}

/// Identity of a transition, issued once when it is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionId(pub u64);

impl fmt::Display for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "#{}", self.0);
    }
}

static NEXT_TRANSITION_ID: AtomicU64 = AtomicU64::new(0);

/// An identity-bearing bundle of assignments.
///
/// Two transitions with identical assignments are still distinct. Clones
/// share the identity of the original, so a clone can be used to remove what
/// the original added.
#[derive(Clone)]
pub struct Transition {
    id: TransitionId,
    meta: Arc<MetaState>,
}

impl Transition {
    /// Wrap `meta` in a fresh identity.
    pub fn new(meta: MetaState) -> Transition {
        let id = TransitionId(NEXT_TRANSITION_ID.fetch_add(1, Ordering::Relaxed));
        return Transition { id, meta: Arc::new(meta) };
    }

    pub fn id(&self) -> TransitionId {
        return self.id;
    }

    /// The assignments this transition makes.
    pub fn meta(&self) -> &MetaState {
        return &self.meta;
    }

    /// Whether the transition touches no `(target, property)` pair.
    pub fn is_empty(&self) -> bool {
        return self.meta.is_empty();
    }
}

impl PartialEq for Transition {
    fn eq(&self, other: &Self) -> bool {
        return self.id == other.id;
    }
}

impl Eq for Transition {}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "Transition({}, {:?})", self.id, self.meta);
    }
}

impl<T, P, V> FromIterator<(T, P, V)> for Transition
where
    T: Into<String>,
    P: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (T, P, V)>>(iter: I) -> Transition {
        return Transition::new(iter.into_iter().collect());
    }
}
