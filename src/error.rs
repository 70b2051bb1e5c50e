//! Errors returned by the annotation index.

use thiserror::Error;

use crate::meta::TransitionId;

/// Invalid use of a `MetaReplay`.
///
/// Both variants are caller bugs: the removal does not match any earlier
/// `add`. The replay is left untouched when one is returned.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    /// No transition was ever added at the position.
    #[error("no transitions were added at this position")]
    UnknownPosition,

    /// The transition is not active at the position.
    #[error("transition {id} is not active at this position")]
    UnknownTransition { id: TransitionId },
}

impl ReplayError {
    /// Check if the position itself was never touched.
    pub fn is_unknown_position(&self) -> bool {
        matches!(self, ReplayError::UnknownPosition)
    }
}
