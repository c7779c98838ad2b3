//! Rule representation and the registration spec builder.
//!
//! A rule is a named `(predicate, action, priority)` unit. Rules are
//! immutable once registered; re-registering the same name atomically
//! replaces the old rule, and removal is the only other lifecycle event.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{InvalidRule, RegisterError};

/// Lowest accepted priority value. Lower priorities are evaluated first.
pub const PRIORITY_MIN: i32 = -10_000;
/// Highest accepted priority value.
pub const PRIORITY_MAX: i32 = 10_000;

/// Boxed predicate: pure test over a request. An `Err` is the predicate
/// equivalent of throwing and terminates the dispatch walk.
pub(crate) type PredicateFn<R> = dyn Fn(&R) -> anyhow::Result<bool> + Send + Sync;

/// Boxed action: runs once when its rule is the first match.
pub(crate) type ActionFn<R, T> = dyn Fn(&R) -> anyhow::Result<T> + Send + Sync;

/// A registered rule. Internal; callers see [`RuleInfo`] snapshots.
pub(crate) struct Rule<R, T> {
    pub(crate) name: Arc<str>,
    pub(crate) priority: i32,
    /// Registration sequence number. Monotonic, never reused; breaks
    /// priority ties in favour of earlier registration.
    pub(crate) seq: u64,
    pub(crate) predicate: Arc<PredicateFn<R>>,
    pub(crate) action: Arc<ActionFn<R, T>>,
}

impl<R, T> fmt::Debug for Rule<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}

/// Registration spec for one rule, built fluently and handed to
/// [`Engine::register`](crate::Engine::register).
///
/// # Example
///
/// ```ignore
/// engine.register(
///     RuleSpec::new("small", 1)
///         .when(|req: &i32| *req < 10)
///         .then(|_| "A".to_string()),
/// )?;
/// ```
pub struct RuleSpec<R, T> {
    name: String,
    priority: i32,
    predicate: Option<Arc<PredicateFn<R>>>,
    action: Option<Arc<ActionFn<R, T>>>,
}

impl<R, T> RuleSpec<R, T> {
    /// Start a spec for a rule with the given name and priority.
    pub fn new(name: impl Into<String>, priority: i32) -> Self {
        Self {
            name: name.into(),
            priority,
            predicate: None,
            action: None,
        }
    }

    /// Set an infallible predicate.
    pub fn when(mut self, predicate: impl Fn(&R) -> bool + Send + Sync + 'static) -> Self {
        self.predicate = Some(Arc::new(move |req: &R| Ok(predicate(req))));
        self
    }

    /// Set a fallible predicate. An `Err` surfaces as a predicate failure
    /// and terminates the dispatch walk without falling through.
    pub fn try_when(
        mut self,
        predicate: impl Fn(&R) -> anyhow::Result<bool> + Send + Sync + 'static,
    ) -> Self {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Set an infallible action.
    pub fn then(mut self, action: impl Fn(&R) -> T + Send + Sync + 'static) -> Self {
        self.action = Some(Arc::new(move |req: &R| Ok(action(req))));
        self
    }

    /// Set a fallible action. An `Err` surfaces as an action failure; the
    /// request counts as not handled and nothing is retried.
    pub fn try_then(
        mut self,
        action: impl Fn(&R) -> anyhow::Result<T> + Send + Sync + 'static,
    ) -> Self {
        self.action = Some(Arc::new(action));
        self
    }

    /// Validate and finalize with the sequence number the registry assigned.
    pub(crate) fn build(self, seq: u64) -> Result<Rule<R, T>, RegisterError> {
        let reject = |reason| RegisterError {
            name: self.name.clone(),
            reason,
        };
        if self.name.is_empty() {
            return Err(reject(InvalidRule::EmptyName));
        }
        if !(PRIORITY_MIN..=PRIORITY_MAX).contains(&self.priority) {
            return Err(reject(InvalidRule::PriorityOutOfRange(self.priority)));
        }
        let predicate = self
            .predicate
            .clone()
            .ok_or_else(|| reject(InvalidRule::MissingPredicate))?;
        let action = self
            .action
            .clone()
            .ok_or_else(|| reject(InvalidRule::MissingAction))?;
        Ok(Rule {
            name: Arc::from(self.name),
            priority: self.priority,
            seq,
            predicate,
            action,
        })
    }
}

impl<R, T> fmt::Debug for RuleSpec<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSpec")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("has_predicate", &self.predicate.is_some())
            .field("has_action", &self.action.is_some())
            .finish()
    }
}

/// Read-only view of one registered rule, as returned by
/// [`Engine::rules`](crate::Engine::rules). Ordered the way dispatch
/// evaluates: ascending `(priority, seq)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleInfo {
    /// Unique rule name.
    pub name: String,
    /// Evaluation priority; lower runs first.
    pub priority: i32,
    /// Registration sequence number (tie-breaker among equal priorities).
    pub seq: u64,
}
