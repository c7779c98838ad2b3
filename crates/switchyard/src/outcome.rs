//! Dispatch outcomes.

use serde::Serialize;

use crate::error::DispatchError;

/// Result of resolving one request against the rule sequence.
///
/// Every call to [`Engine::dispatch`](crate::Engine::dispatch) returns
/// exactly one of these; no dispatch path panics or aborts.
#[derive(Debug)]
pub enum Outcome<T> {
    /// A rule matched and its action (or the default action) produced a value.
    Handled(T),
    /// No rule matched and no default action was configured.
    NoMatch,
    /// A predicate or the executed action failed. The request is considered
    /// not handled; nothing is retried.
    Failed(DispatchError),
}

impl<T> Outcome<T> {
    /// Data-free discriminant, used for taps and logging.
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Handled(_) => OutcomeKind::Handled,
            Self::NoMatch => OutcomeKind::NoMatch,
            Self::Failed(DispatchError::Predicate { .. }) => OutcomeKind::PredicateFailed,
            Self::Failed(DispatchError::Action { .. }) => OutcomeKind::ActionFailed,
        }
    }

    /// Whether the request was handled by a rule or the default action.
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled(_))
    }

    /// The handled value, if any.
    pub fn handled(self) -> Option<T> {
        match self {
            Self::Handled(value) => Some(value),
            _ => None,
        }
    }
}

/// What kind of outcome a dispatch produced, without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// A matching rule or the default action handled the request.
    Handled,
    /// Nothing matched and there was no fallback.
    NoMatch,
    /// A predicate failed during the walk.
    PredicateFailed,
    /// The matched action (or default action) failed.
    ActionFailed,
}
