//! Single-flight async resource cache.
//!
//! Interactive views render synchronously but depend on asynchronous work
//! (authenticated API calls). This module bridges the two: a producer future
//! is spawned exactly once per cache key, its handle can be polled without
//! blocking, and settled outcomes are memoized for every later poll. The
//! rendering loop decides how to wait when a poll reports
//! [`ResourceState::Pending`]; the cache itself never blocks and never
//! retries.
//!
//! Entries move Pending -> Ready or Pending -> Failed exactly once and stay
//! settled until [`ResourceCache::clear`]. There is no TTL and no per-key
//! eviction. Producers are fire-and-forget: dropping every handle does not
//! cancel the spawned task.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use tokio::sync::Notify;

use crate::core::error::Error;

/// Wrapped, shareable form of a producer failure.
///
/// The first failure is stored once; every subsequent poll of the entry
/// returns a clone pointing at the same underlying error.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ResourceError(Arc<Error>);

impl ResourceError {
    fn new(err: Error) -> Self {
        Self(Arc::new(err))
    }

    /// The original error raised by the producer.
    pub fn inner(&self) -> &Error {
        &self.0
    }
}

enum EntryState<T> {
    Pending,
    Ready(Arc<T>),
    Failed(ResourceError),
}

struct Entry<T> {
    state: Mutex<EntryState<T>>,
    notify: Notify,
}

impl<T> Entry<T> {
    fn new() -> Self {
        Self {
            state: Mutex::new(EntryState::Pending),
            notify: Notify::new(),
        }
    }

    /// Record the producer outcome. Entries settle at most once; a second
    /// call is ignored.
    fn settle(&self, outcome: Result<T, Error>) {
        {
            let mut state = self.state.lock().expect("resource entry lock poisoned");
            if !matches!(*state, EntryState::Pending) {
                return;
            }
            *state = match outcome {
                Ok(value) => EntryState::Ready(Arc::new(value)),
                Err(err) => EntryState::Failed(ResourceError::new(err)),
            };
        }
        self.notify.notify_waiters();
    }

    fn is_settled(&self) -> bool {
        !matches!(
            *self.state.lock().expect("resource entry lock poisoned"),
            EntryState::Pending
        )
    }
}

/// Completion signal for a pending resource.
///
/// Awaiting it returns once the entry settles. The signal is bound to the
/// one in-flight producer; it never triggers a second run.
pub struct Signal<T> {
    entry: Arc<Entry<T>>,
}

impl<T> Signal<T> {
    /// Wait until the entry settles. Interest is registered before the state
    /// re-check so a completion racing the poll is not missed.
    pub async fn wait(self) {
        loop {
            let notified = self.entry.notify.notified();
            if self.entry.is_settled() {
                return;
            }
            notified.await;
        }
    }
}

/// Poll outcome for a [`Resource`].
pub enum ResourceState<T> {
    /// Producer still in flight; await the signal, then poll again.
    Pending(Signal<T>),
    /// Producer resolved; the value is shared across all polls.
    Ready(Arc<T>),
    /// Producer failed; the stored error is returned on every poll.
    Failed(ResourceError),
}

/// Cloneable handle to one cache entry.
pub struct Resource<T> {
    entry: Arc<Entry<T>>,
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            entry: Arc::clone(&self.entry),
        }
    }
}

impl<T: Send + Sync + 'static> Resource<T> {
    /// Spawn `fut` on the runtime immediately and return the handle tracking
    /// it. Must be called within a tokio runtime.
    pub fn spawn<Fut>(fut: Fut) -> Self
    where
        Fut: Future<Output = Result<T, Error>> + Send + 'static,
    {
        let entry = Arc::new(Entry::new());
        let task_entry = Arc::clone(&entry);
        tokio::spawn(async move {
            let outcome = fut.await;
            task_entry.settle(outcome);
        });
        Self { entry }
    }

    /// Non-blocking state inspection.
    pub fn poll(&self) -> ResourceState<T> {
        let state = self.entry.state.lock().expect("resource entry lock poisoned");
        match &*state {
            EntryState::Pending => ResourceState::Pending(Signal {
                entry: Arc::clone(&self.entry),
            }),
            EntryState::Ready(value) => ResourceState::Ready(Arc::clone(value)),
            EntryState::Failed(err) => ResourceState::Failed(err.clone()),
        }
    }

    /// Await the terminal state, pending as long as the producer runs.
    pub async fn settled(&self) -> Result<Arc<T>, ResourceError> {
        loop {
            match self.poll() {
                ResourceState::Pending(signal) => signal.wait().await,
                ResourceState::Ready(value) => return Ok(value),
                ResourceState::Failed(err) => return Err(err),
            }
        }
    }
}

/// Cache key: operation name plus its serialized arguments.
///
/// The original design keyed by producer identity alone, which collides
/// distinct argument lists against the same producer; including the argument
/// strings gives each logical request its own entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ResourceKey {
    op: String,
    args: String,
}

impl ResourceKey {
    fn new(op: &str, args: &[&str]) -> Self {
        Self {
            op: op.to_string(),
            // Unit separator keeps ["a,b"] and ["a", "b"] distinct.
            args: args.join("\u{1f}"),
        }
    }
}

/// Process-wide store of in-flight and settled resources.
///
/// Prefer passing an instance into consumers; [`ResourceCache::global`]
/// exists for the CLI actions that share one cache across a process run.
pub struct ResourceCache {
    entries: Mutex<HashMap<ResourceKey, Box<dyn Any + Send + Sync>>>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Shared process-wide instance.
    pub fn global() -> &'static ResourceCache {
        static CACHE: Lazy<ResourceCache> = Lazy::new(ResourceCache::new);
        &CACHE
    }

    /// Return the handle for `(op, args)`, invoking `make` and spawning its
    /// future first if the key is new.
    ///
    /// The producer runs at most once per key: concurrent and repeated calls
    /// share the same entry, and `make` is not invoked on a hit. One key must
    /// always be used with one result type.
    pub fn call<T, Fut>(&self, op: &str, args: &[&str], make: impl FnOnce() -> Fut) -> Resource<T>
    where
        T: Send + Sync + 'static,
        Fut: Future<Output = Result<T, Error>> + Send + 'static,
    {
        let key = ResourceKey::new(op, args);
        let mut entries = self.entries.lock().expect("resource cache lock poisoned");
        if let Some(existing) = entries.get(&key) {
            return existing
                .downcast_ref::<Resource<T>>()
                .expect("resource cache key reused with a different result type")
                .clone();
        }
        let resource = Resource::spawn(make());
        entries.insert(key, Box::new(resource.clone()));
        resource
    }

    /// Drop every cached entry, forcing fresh producer runs on the next
    /// call. In-flight producers keep running but their entries are orphaned
    /// and never observed again.
    pub fn clear(&self) {
        self.entries
            .lock()
            .expect("resource cache lock poisoned")
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .expect("resource cache lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResourceCache {
    fn default() -> Self {
        Self::new()
    }
}
