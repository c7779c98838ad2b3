//! The dispatch engine: rule registry, snapshot publication, and the
//! first-match walk.
//!
//! Writers serialize on one mutex and publish copy-on-write snapshots;
//! readers pin the current snapshot with a single lock-free load and walk
//! it without revalidating. A mutation therefore never blocks a dispatch,
//! and a dispatch never observes a half-applied mutation.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arc_swap::ArcSwap;
use tracing::{debug, warn};

use crate::error::{DispatchError, RegisterError, DEFAULT_ACTION_LABEL};
use crate::outcome::Outcome;
use crate::rule::{ActionFn, Rule, RuleInfo, RuleSpec};
use crate::snapshot::RuleSet;
use crate::tap::{DispatchRecord, DispatchTap};

/// Canonical registry state. Guarded by the engine's mutex; the published
/// snapshot is derived from it on every structural change.
struct RegistryState<R, T> {
    rules: Vec<Arc<Rule<R, T>>>,
    default_action: Option<Arc<ActionFn<R, T>>>,
    next_seq: u64,
    generation: u64,
}

struct Shared<R, T> {
    published: ArcSwap<RuleSet<R, T>>,
    registry: Mutex<RegistryState<R, T>>,
    taps: Vec<Arc<dyn DispatchTap<R>>>,
}

/// Rule-based request dispatch engine, generic over the request type `R`
/// and the handled value type `T`.
///
/// The engine is a cheaply cloneable handle; clones share one registry.
/// All methods take `&self` and may be called concurrently from any
/// number of threads.
pub struct Engine<R, T> {
    shared: Arc<Shared<R, T>>,
}

impl<R, T> Clone for Engine<R, T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<R, T> fmt::Debug for Engine<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.shared.published.load();
        f.debug_struct("Engine")
            .field("rules", &snapshot.rules.len())
            .field("generation", &snapshot.generation)
            .finish_non_exhaustive()
    }
}

impl<R, T> Default for Engine<R, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, T> Engine<R, T> {
    /// Create an engine with no rules, no default action, and no taps.
    pub fn new() -> Self {
        EngineBuilder::new().build()
    }

    /// Start building an engine with taps and a default action.
    pub fn builder() -> EngineBuilder<R, T> {
        EngineBuilder::new()
    }

    /// Add or atomically replace the rule named in `spec`.
    ///
    /// Replacement swaps predicate, action, and priority in one step and
    /// assigns a fresh sequence number; no snapshot ever carries two rules
    /// with the same name. On error the registry is unchanged.
    pub fn register(&self, spec: RuleSpec<R, T>) -> Result<(), RegisterError> {
        let mut registry = self.lock_registry();
        let rule = Arc::new(spec.build(registry.next_seq)?);
        registry.next_seq += 1;
        let name = rule.name.clone();
        let replaced = match registry.rules.iter_mut().find(|r| r.name == name) {
            Some(slot) => {
                *slot = rule;
                true
            }
            None => {
                registry.rules.push(rule);
                false
            }
        };
        self.publish(&mut registry);
        debug!(rule = %name, replaced, "registered rule");
        Ok(())
    }

    /// Remove the named rule. Returns whether a removal occurred; removing
    /// an absent name is a no-op, not an error.
    pub fn unregister(&self, name: &str) -> bool {
        let mut registry = self.lock_registry();
        let before = registry.rules.len();
        registry.rules.retain(|rule| &*rule.name != name);
        let removed = registry.rules.len() != before;
        if removed {
            self.publish(&mut registry);
            debug!(rule = name, "unregistered rule");
        }
        removed
    }

    /// Set the action invoked when no rule matches.
    pub fn set_default_action(&self, action: impl Fn(&R) -> T + Send + Sync + 'static) {
        self.install_default(Some(Arc::new(move |req: &R| Ok(action(req)))));
    }

    /// Set a fallible default action.
    pub fn set_try_default_action(
        &self,
        action: impl Fn(&R) -> anyhow::Result<T> + Send + Sync + 'static,
    ) {
        self.install_default(Some(Arc::new(action)));
    }

    /// Remove the default action; unmatched requests yield
    /// [`Outcome::NoMatch`] again.
    pub fn clear_default_action(&self) {
        self.install_default(None);
    }

    /// Read-only ordered view of the currently published rules.
    pub fn rules(&self) -> Vec<RuleInfo> {
        self.shared.published.load().infos()
    }

    /// Structural mutation counter. Bumped by every registration, removal,
    /// and default-action change; useful for diagnostics and tests.
    pub fn generation(&self) -> u64 {
        self.shared.published.load().generation
    }

    /// Resolve `request` to exactly one [`Outcome`].
    ///
    /// Pins the current snapshot, then evaluates predicates in ascending
    /// `(priority, seq)` order. The first `true` predicate runs its rule's
    /// action and the walk stops; a failing predicate stops the walk
    /// without falling through; if nothing matches, the default action
    /// runs, or [`Outcome::NoMatch`] is returned.
    ///
    /// Rules registered or removed by the action itself (or by concurrent
    /// callers) apply to future dispatches only.
    pub fn dispatch(&self, request: &R) -> Outcome<T> {
        let snapshot = self.shared.published.load_full();
        let (matched, outcome) = walk(&snapshot, request);
        let record = DispatchRecord {
            rule: matched.as_deref(),
            request,
            outcome: outcome.kind(),
        };
        for tap in &self.shared.taps {
            tap.on_dispatch(record);
        }
        outcome
    }

    fn install_default(&self, action: Option<Arc<ActionFn<R, T>>>) {
        let mut registry = self.lock_registry();
        registry.default_action = action;
        self.publish(&mut registry);
        debug!("default action changed");
    }

    /// Rebuild and atomically swap the published snapshot. Caller holds
    /// the registry lock, so publications are totally ordered.
    fn publish(&self, registry: &mut MutexGuard<'_, RegistryState<R, T>>) {
        registry.generation += 1;
        let snapshot = RuleSet::publish(
            registry.rules.clone(),
            registry.default_action.clone(),
            registry.generation,
        );
        self.shared.published.store(Arc::new(snapshot));
    }

    fn lock_registry(&self) -> MutexGuard<'_, RegistryState<R, T>> {
        // A poisoned lock only means another writer panicked between
        // mutations; the canonical state itself is still consistent
        // because every mutation completes before publish.
        self.shared
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// The first-match walk over one pinned snapshot. Returns the matched rule
/// name (for taps) alongside the outcome.
fn walk<R, T>(snapshot: &RuleSet<R, T>, request: &R) -> (Option<Arc<str>>, Outcome<T>) {
    for rule in &snapshot.rules {
        match (rule.predicate)(request) {
            Ok(false) => continue,
            Ok(true) => {
                let outcome = match (rule.action)(request) {
                    Ok(value) => Outcome::Handled(value),
                    Err(source) => {
                        warn!(rule = %rule.name, error = %source, "action failed");
                        Outcome::Failed(DispatchError::Action {
                            rule: rule.name.clone(),
                            source,
                        })
                    }
                };
                return (Some(rule.name.clone()), outcome);
            }
            Err(source) => {
                // A broken predicate must not silently reroute the request
                // to the next-ranked rule.
                warn!(rule = %rule.name, error = %source, "predicate failed");
                let outcome = Outcome::Failed(DispatchError::Predicate {
                    rule: rule.name.clone(),
                    source,
                });
                return (Some(rule.name.clone()), outcome);
            }
        }
    }

    match &snapshot.default_action {
        Some(default) => match default(request) {
            Ok(value) => (None, Outcome::Handled(value)),
            Err(source) => {
                warn!(error = %source, "default action failed");
                let outcome = Outcome::Failed(DispatchError::Action {
                    rule: Arc::from(DEFAULT_ACTION_LABEL),
                    source,
                });
                (None, outcome)
            }
        },
        None => (None, Outcome::NoMatch),
    }
}

/// Builder for an [`Engine`] with taps and a default action configured up
/// front. Rules themselves are registered on the running engine.
pub struct EngineBuilder<R, T> {
    default_action: Option<Arc<ActionFn<R, T>>>,
    taps: Vec<Arc<dyn DispatchTap<R>>>,
}

impl<R, T> Default for EngineBuilder<R, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, T> EngineBuilder<R, T> {
    /// Start with no default action and no taps.
    pub fn new() -> Self {
        Self {
            default_action: None,
            taps: Vec::new(),
        }
    }

    /// Configure the action invoked when no rule matches.
    pub fn with_default_action(
        mut self,
        action: impl Fn(&R) -> T + Send + Sync + 'static,
    ) -> Self {
        self.default_action = Some(Arc::new(move |req: &R| Ok(action(req))));
        self
    }

    /// Configure a fallible default action.
    pub fn with_try_default_action(
        mut self,
        action: impl Fn(&R) -> anyhow::Result<T> + Send + Sync + 'static,
    ) -> Self {
        self.default_action = Some(Arc::new(action));
        self
    }

    /// Attach an observation tap. Taps are fixed for the engine's lifetime.
    pub fn with_tap(mut self, tap: impl DispatchTap<R> + 'static) -> Self {
        self.taps.push(Arc::new(tap));
        self
    }

    /// Build the engine.
    pub fn build(self) -> Engine<R, T> {
        let initial = RuleSet {
            rules: Vec::new(),
            default_action: self.default_action.clone(),
            generation: 0,
        };
        Engine {
            shared: Arc::new(Shared {
                published: ArcSwap::from_pointee(initial),
                registry: Mutex::new(RegistryState {
                    rules: Vec::new(),
                    default_action: self.default_action,
                    next_seq: 0,
                    generation: 0,
                }),
                taps: self.taps,
            }),
        }
    }
}

impl<R, T> fmt::Debug for EngineBuilder<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineBuilder")
            .field("has_default_action", &self.default_action.is_some())
            .field("taps", &self.taps.len())
            .finish()
    }
}
