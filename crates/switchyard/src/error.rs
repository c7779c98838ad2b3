//! Error types for registration and dispatch.
//!
//! Registration errors are returned synchronously from
//! [`Engine::register`](crate::Engine::register) and leave the registry
//! untouched. Dispatch failures are never propagated as `Err` past the
//! caller; they travel inside [`Outcome::Failed`](crate::Outcome::Failed)
//! so every dispatch call yields a terminating result.

use std::sync::Arc;

use thiserror::Error;

use crate::rule::{PRIORITY_MAX, PRIORITY_MIN};

/// Why a rule was rejected at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRule {
    /// Rule names identify rules for diagnostics and removal; an empty
    /// name could never be unregistered meaningfully.
    #[error("rule name must not be empty")]
    EmptyName,

    /// Priority outside the supported range.
    #[error("priority {0} outside supported range {PRIORITY_MIN}..={PRIORITY_MAX}")]
    PriorityOutOfRange(i32),

    /// The rule spec was built without a predicate.
    #[error("rule has no predicate")]
    MissingPredicate,

    /// The rule spec was built without an action.
    #[error("rule has no action")]
    MissingAction,
}

/// Rejected registration. The registry is unchanged when this is returned.
#[derive(Debug, Error)]
#[error("cannot register rule `{name}`: {reason}")]
pub struct RegisterError {
    /// Name the caller tried to register under.
    pub name: String,
    /// What was wrong with the rule.
    #[source]
    pub reason: InvalidRule,
}

/// A failure surfaced by a single dispatch walk.
///
/// Both variants are terminal for the walk: a failing predicate must not
/// silently hand the request to the next-ranked rule, and a failed action
/// is never retried (the action may have had partial side effects).
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A rule's predicate returned an error while being evaluated.
    /// The rule stays registered; operators remove it explicitly.
    #[error("predicate of rule `{rule}` failed")]
    Predicate {
        /// Name of the rule whose predicate failed.
        rule: Arc<str>,
        /// Underlying failure reported by the predicate.
        #[source]
        source: anyhow::Error,
    },

    /// The matched rule's action (or the default action) returned an error.
    #[error("action of rule `{rule}` failed")]
    Action {
        /// Name of the rule whose action failed, or [`DEFAULT_ACTION_LABEL`]
        /// when the fallback action failed.
        rule: Arc<str>,
        /// Underlying failure reported by the action.
        #[source]
        source: anyhow::Error,
    },
}

/// Rule label used in [`DispatchError::Action`] when the failing action was
/// the engine's default action rather than a registered rule.
pub const DEFAULT_ACTION_LABEL: &str = "(default)";

impl DispatchError {
    /// Name of the rule involved in the failure.
    pub fn rule(&self) -> &str {
        match self {
            Self::Predicate { rule, .. } | Self::Action { rule, .. } => rule,
        }
    }
}
