//! Run status watchers.
//!
//! A watcher is a `(status, callback)` registration owned by one session.
//! Every watcher whose status matches the observed run status fires on every
//! poll that observes it -- watchers are not one-shot. Callbacks run
//! sequentially in registration order, so a slow watcher delays the rest.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use parley_types::assistant::{Run, RunStatus};

type WatcherFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type WatcherFn = dyn Fn(Run) -> WatcherFuture + Send + Sync;

#[derive(Clone)]
struct Watcher {
    status: RunStatus,
    callback: Arc<WatcherFn>,
}

/// Ordered list of status watchers for one session.
///
/// Cloning is cheap (callbacks are reference-counted); the poll task works on
/// a clone taken when the run starts.
#[derive(Clone, Default)]
pub struct EventWatchers {
    watchers: Vec<Watcher>,
}

impl EventWatchers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a watcher for `status`. No de-duplication.
    pub fn register<F, Fut>(&mut self, status: RunStatus, callback: F)
    where
        F: Fn(Run) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.watchers.push(Watcher {
            status,
            callback: Arc::new(move |run| Box::pin(callback(run))),
        });
    }

    pub fn len(&self) -> usize {
        self.watchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }

    /// Invoke every watcher registered for `run.status`, in registration order.
    ///
    /// Returns the number of watchers fired.
    pub async fn fire(&self, run: &Run) -> usize {
        let mut fired = 0;
        for watcher in self.watchers.iter().filter(|w| w.status == run.status) {
            (watcher.callback)(run.clone()).await;
            fired += 1;
        }
        fired
    }
}

impl std::fmt::Debug for EventWatchers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.watchers.iter().map(|w| w.status))
            .finish()
    }
}
