//! In-flight computation coalescing
//!
//! Concurrent requests for the same key share one computation. The first
//! caller registers a channel under the key and spawns the computation; later
//! callers clone the channel and wait on it. The key is removed when the
//! computation settles, whatever the outcome, so failures are never sticky.
//!
//! Computations run in their own task. A waiter that goes away (timeout,
//! disconnected client) only detaches itself; the computation still runs to
//! completion.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use futures::channel::oneshot;
use futures::future::{BoxFuture, FutureExt, Shared, TryFutureExt};
use parking_lot::Mutex;

use super::error::{DocumentError, DocumentResult};

type ComputationChannel<V> = Shared<oneshot::Receiver<DocumentResult<V>>>;
type ComputationMap<K, V> = Arc<Mutex<HashMap<K, ComputationChannel<V>>>>;

/// Runs a closure when dropped
struct CallOnDrop {
    f: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl CallOnDrop {
    fn new<F: FnOnce() + Send + 'static>(f: F) -> Self {
        Self {
            f: Some(Box::new(f)),
        }
    }
}

impl Drop for CallOnDrop {
    fn drop(&mut self) {
        if let Some(f) = self.f.take() {
            f();
        }
    }
}

/// Deduplicates concurrent computations by key
pub struct Coalescer<K, V> {
    name: &'static str,
    computations: ComputationMap<K, V>,
}

impl<K, V> Clone for Coalescer<K, V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            computations: Arc::clone(&self.computations),
        }
    }
}

impl<K, V> Coalescer<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create an empty coalescer; `name` only appears in logs
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            computations: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Join the computation running for `key`, or start one with `make`
    ///
    /// `make` is only invoked when no computation for `key` is in flight.
    /// Checking for and registering a computation happen under one lock, so
    /// at most one computation per key runs at any time.
    ///
    /// NOTE: This function is not `async` on purpose. The computation is
    /// spawned eagerly, even if the returned future is never polled.
    pub fn run<F, Fut>(&self, key: K, make: F) -> BoxFuture<'static, DocumentResult<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = DocumentResult<V>> + Send + 'static,
    {
        let (channel, task) = {
            let mut computations = self.computations.lock();
            if let Some(channel) = computations.get(&key) {
                tracing::debug!(computation = self.name, ?key, "Joined in-flight computation");
                (channel.clone(), None)
            } else {
                let (channel, task) = self.create_channel(key.clone(), make());
                let evicted = computations.insert(key, channel.clone());
                debug_assert!(evicted.is_none());
                (channel, Some(task))
            }
        };

        // Spawned outside the lock: dropping an unspawned task runs the
        // removal token, which takes the same lock.
        if let Some(task) = task {
            tokio::spawn(task);
        }

        let name = self.name;
        Box::pin(channel.unwrap_or_else(move |_cancelled| {
            tracing::warn!(computation = name, "Computation channel dropped");
            Err(DocumentError::Cancelled)
        }))
    }

    fn create_channel<Fut>(
        &self,
        key: K,
        computation: Fut,
    ) -> (ComputationChannel<V>, BoxFuture<'static, ()>)
    where
        Fut: Future<Output = DocumentResult<V>> + Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();

        let computations = Arc::clone(&self.computations);
        let remove_computation_token = CallOnDrop::new(move || {
            computations.lock().remove(&key);
        });

        let task = async move {
            let result = computation.await;
            // Evict before publishing: callers either get a channel that will
            // receive data, or they start a new computation.
            drop(remove_computation_token);
            sender.send(result).ok();
        };

        (receiver.shared(), Box::pin(task))
    }

    /// Whether a computation for `key` is currently running
    pub fn is_in_flight(&self, key: &K) -> bool {
        self.computations.lock().contains_key(key)
    }

    /// Number of running computations
    pub fn len(&self) -> usize {
        self.computations.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.computations.lock().is_empty()
    }
}
