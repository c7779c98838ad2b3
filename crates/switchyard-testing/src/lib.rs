//! Testing utilities for the Switchyard dispatch engine.
//!
//! Provides the doubles the core crate's own tests use and that
//! downstream crates can reuse: a tap that records every dispatch, and a
//! probe for asserting how often a predicate or action actually ran.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use switchyard_core::{DispatchRecord, DispatchTap, OutcomeKind};

/// Owned copy of one tap record, for assertions after the fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapRecord {
    /// Matched rule name, or `None` for default-action and no-match
    /// dispatches.
    pub rule: Option<String>,
    /// How the dispatch ended.
    pub outcome: OutcomeKind,
}

/// Tap that records every dispatch it observes.
///
/// Clone it before handing it to `EngineBuilder::with_tap`; clones share
/// the same record list.
#[derive(Debug, Clone, Default)]
pub struct RecordingTap {
    records: Arc<Mutex<Vec<TapRecord>>>,
}

impl RecordingTap {
    /// Create an empty recording tap.
    pub fn new() -> Self {
        Self::default()
    }

    /// All records observed so far, in dispatch order.
    pub fn records(&self) -> Vec<TapRecord> {
        self.lock().clone()
    }

    /// Number of dispatches observed.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no dispatch has been observed yet.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<TapRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R> DispatchTap<R> for RecordingTap {
    fn on_dispatch(&self, record: DispatchRecord<'_, R>) {
        self.lock().push(TapRecord {
            rule: record.rule.map(str::to_string),
            outcome: record.outcome,
        });
    }
}

/// Invocation counter for predicates and actions.
///
/// Wrap a closure with [`Probe::observed`] before registering it, then
/// assert on [`Probe::count`] - the standard way to verify short-circuit
/// behavior ("this predicate was never asked").
#[derive(Debug, Clone, Default)]
pub struct Probe {
    hits: Arc<AtomicUsize>,
}

impl Probe {
    /// Create a probe with a zero count.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap `f` so each invocation bumps this probe's counter.
    pub fn observed<A, B>(
        &self,
        f: impl Fn(&A) -> B + Send + Sync + 'static,
    ) -> impl Fn(&A) -> B + Send + Sync + 'static {
        let hits = Arc::clone(&self.hits);
        move |input: &A| {
            hits.fetch_add(1, Ordering::Relaxed);
            f(input)
        }
    }

    /// How many times the wrapped closure ran.
    pub fn count(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }
}
