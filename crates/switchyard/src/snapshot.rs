//! Immutable published rule sequence.
//!
//! Every structural mutation builds a fresh `RuleSet` and publishes it
//! atomically; a dispatch walk pins one `Arc<RuleSet>` and never observes
//! mutation mid-walk.

use std::sync::Arc;

use crate::rule::{ActionFn, Rule, RuleInfo};

/// One published generation of the rule sequence, sorted by
/// ascending `(priority, seq)`.
pub(crate) struct RuleSet<R, T> {
    pub(crate) rules: Vec<Arc<Rule<R, T>>>,
    pub(crate) default_action: Option<Arc<ActionFn<R, T>>>,
    pub(crate) generation: u64,
}

impl<R, T> RuleSet<R, T> {
    /// Build a snapshot from the canonical registry state. Sorting here is
    /// total: sequence numbers are unique, so no two rules compare equal.
    pub(crate) fn publish(
        mut rules: Vec<Arc<Rule<R, T>>>,
        default_action: Option<Arc<ActionFn<R, T>>>,
        generation: u64,
    ) -> Self {
        rules.sort_by_key(|rule| (rule.priority, rule.seq));
        Self {
            rules,
            default_action,
            generation,
        }
    }

    /// Read-only view of the sequence, in evaluation order.
    pub(crate) fn infos(&self) -> Vec<RuleInfo> {
        self.rules
            .iter()
            .map(|rule| RuleInfo {
                name: rule.name.to_string(),
                priority: rule.priority,
                seq: rule.seq,
            })
            .collect()
    }
}
