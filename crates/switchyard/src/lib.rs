//! # Switchyard
//!
//! A rule-based request dispatch engine: ordered rules match, the first
//! match handles, and mutation never blocks a reader.
//!
//! ## Core Concepts
//!
//! Switchyard separates **routing** from **behavior**:
//! - [`RuleSpec`] / rules = Routing (which requests a rule claims, and in
//!   what order rules are asked)
//! - Actions = Behavior (what happens once a rule claims a request)
//!
//! The key principle: **One Request = One Outcome = At-Most-One Action**.
//! A dispatch either runs exactly one action to completion, or runs none
//! and says so.
//!
//! ## Architecture
//!
//! ```text
//! Caller ──dispatch(request)──► Engine
//!                                 │ load (lock-free)
//!                                 ▼
//!                      published Arc<RuleSet>  ◄─── atomic swap ───┐
//!                                 │                                │
//!                    walk in (priority, seq) order                 │
//!                                 │                                │
//!              ┌── predicate? ────┼──────────────┐           publish new
//!              │                  │              │            snapshot
//!          Ok(true)           Ok(false)        Err(e)              │
//!              │                  │              │                 │
//!         run action          next rule   Failed(Predicate)   Mutex'd writers
//!              │                  │                                ▲
//!       Handled / Failed    ...no match?                           │
//!                                 │                 register / unregister /
//!                     default action or NoMatch      set_default_action
//! ```
//!
//! ## Key Invariants
//!
//! 1. **Names are unique** - Re-registering a name atomically replaces the
//!    old rule; no snapshot holds two rules with one name
//! 2. **Order is total** - Rules sort by `(priority, seq)`; sequence
//!    numbers are monotonic and never reused, so ties are stable
//! 3. **Match is terminal** - The first matching rule handles the request;
//!    later predicates are never evaluated
//! 4. **Snapshots are isolated** - A dispatch walks the rule set it pinned
//!    at entry; concurrent mutation targets future dispatches only
//! 5. **Failures terminate** - A failing predicate or action ends the walk
//!    with a typed [`Outcome::Failed`]; nothing falls through, nothing
//!    retries, nothing panics
//!
//! ## Example
//!
//! ```
//! use switchyard_core::{Engine, Outcome, RuleSpec};
//!
//! let engine: Engine<i32, &str> = Engine::new();
//!
//! engine.register(RuleSpec::new("small", 1).when(|x| *x < 10).then(|_| "A"))?;
//! engine.register(RuleSpec::new("medium", 2).when(|x| (10..20).contains(x)).then(|_| "B"))?;
//! engine.register(RuleSpec::new("large", 3).when(|x| *x >= 20).then(|_| "C"))?;
//!
//! assert!(matches!(engine.dispatch(&5), Outcome::Handled("A")));
//! assert!(matches!(engine.dispatch(&15), Outcome::Handled("B")));
//! assert!(matches!(engine.dispatch(&25), Outcome::Handled("C")));
//! assert!(matches!(engine.dispatch(&-1), Outcome::NoMatch));
//! # Ok::<(), switchyard_core::RegisterError>(())
//! ```
//!
//! ## What This Is Not
//!
//! Switchyard is **not**:
//! - A workflow or saga engine
//! - A pub/sub bus (exactly one handler runs, not all that match)
//! - A network router or service mesh
//! - Persistent (rules live in memory; reconfigure at startup)
//!
//! Switchyard **is**:
//! > An in-process decision pipeline where ordered rules match, the first
//! > match handles, and mutation never blocks a reader.

// Core modules
mod engine;
mod error;
mod outcome;
mod rule;
mod snapshot;
mod tap;


// Stress tests (test-only)
#[cfg(test)]
mod stress_tests;

// Re-export engine types (primary entry point)
pub use engine::{Engine, EngineBuilder};

// Re-export rule types
pub use rule::{RuleInfo, RuleSpec, PRIORITY_MAX, PRIORITY_MIN};

// Re-export outcome types
pub use outcome::{Outcome, OutcomeKind};

// Re-export error types
pub use error::{DispatchError, InvalidRule, RegisterError, DEFAULT_ACTION_LABEL};

// Re-export tap types (dispatch observation)
pub use tap::{tap_fn, DispatchRecord, DispatchTap, TapFn};
