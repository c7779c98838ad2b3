//! Dispatch observation.
//!
//! Taps see every completed dispatch exactly once. They observe; they
//! cannot influence routing, and the engine holds no lock while calling
//! them.

use crate::outcome::OutcomeKind;

/// What a tap sees after one dispatch completes.
#[derive(Debug)]
pub struct DispatchRecord<'a, R> {
    /// Name of the matched rule, or `None` when the request fell through
    /// to the default action or nothing matched.
    pub rule: Option<&'a str>,
    /// The request that was dispatched.
    pub request: &'a R,
    /// How the dispatch ended.
    pub outcome: OutcomeKind,
}

// Manual impls: the record only borrows the request, so it is copyable
// whether or not `R` is.
impl<R> Clone for DispatchRecord<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for DispatchRecord<'_, R> {}

/// Observer notified once per completed dispatch.
///
/// Implementations must not panic and should return quickly; a tap runs
/// on the dispatching caller's thread.
pub trait DispatchTap<R>: Send + Sync {
    /// Called after the outcome is decided, before it is returned.
    fn on_dispatch(&self, record: DispatchRecord<'_, R>);
}

/// Adapter turning a closure into a [`DispatchTap`].
#[derive(Debug, Clone)]
pub struct TapFn<F>(F);

/// Build a tap from a closure.
///
/// ```ignore
/// let engine = Engine::builder()
///     .with_tap(tap_fn(|record| println!("{:?}", record.outcome)))
///     .build();
/// ```
pub fn tap_fn<F>(f: F) -> TapFn<F> {
    TapFn(f)
}

impl<R, F> DispatchTap<R> for TapFn<F>
where
    F: Fn(DispatchRecord<'_, R>) + Send + Sync,
{
    fn on_dispatch(&self, record: DispatchRecord<'_, R>) {
        (self.0)(record);
    }
}
