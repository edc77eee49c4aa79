//! Deferred-readiness primitives: wait until a predicate over the page tree
//! holds, run once, stop watching.
//!
//! Two strategies are supported. The mutation watcher
//! re-checks on every tree change and disconnects itself once satisfied; the
//! fixed delay sleeps a constant interval and checks exactly once, silently
//! losing the race when the tree renders too slowly.

use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};

use crate::host::MutationEvent;

/// Resolve once `predicate` holds, re-evaluating on every mutation event.
///
/// The predicate is checked immediately, so an already-satisfied tree never
/// waits. Returns false only if the event stream closes first; dropping the
/// receiver on return is the watcher's self-disconnect.
pub async fn watch_until(
    mut events: mpsc::UnboundedReceiver<MutationEvent>,
    mut predicate: impl FnMut() -> bool,
) -> bool {
    if predicate() {
        return true;
    }
    while events.recv().await.is_some() {
        if predicate() {
            return true;
        }
    }
    false
}

/// Sleep `delay`, then evaluate `predicate` once.
pub async fn after_delay(delay: Duration, predicate: impl FnOnce() -> bool) -> bool {
    sleep(delay).await;
    predicate()
}
