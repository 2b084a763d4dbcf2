//! Debounced change notification.
//!
//! Mutations of one type that land within the configured window coalesce
//! into a single pair of events. The first mutation arms a per-type timer;
//! later mutations while it is pending neither reset nor duplicate it.

use crate::change_feed::{ChangeEvent, Publisher};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Callback run after a type's events were published.
pub type FlushHook = Arc<dyn Fn(&str) + Send + Sync>;

struct Inner {
    publisher: Arc<dyn Publisher>,
    window: Duration,
    pending: Mutex<HashMap<String, JoinHandle<()>>>,
    sequence: AtomicU64,
    hooks: RwLock<Vec<FlushHook>>,
}

impl Inner {
    fn emit(&self, type_name: &str) {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(type_name, sequence, "publishing change");
        self.publisher.publish(&ChangeEvent::change(sequence, type_name));
        self.publisher.publish(&ChangeEvent::typed(sequence, type_name));

        let hooks = self.hooks.read().clone();
        for hook in hooks {
            hook(type_name);
        }
    }
}

/// Per-type debounced notifier.
///
/// Cloning yields another handle to the same timers.
#[derive(Clone)]
pub struct ChangeNotifier {
    inner: Arc<Inner>,
}

impl ChangeNotifier {
    /// Creates a notifier publishing to `publisher` after `window`.
    pub fn new(publisher: Arc<dyn Publisher>, window: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                publisher,
                window,
                pending: Mutex::new(HashMap::new()),
                sequence: AtomicU64::new(0),
                hooks: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Returns the debounce window.
    pub fn window(&self) -> Duration {
        self.inner.window
    }

    /// Registers a callback run after every flush.
    pub fn on_flush<F>(&self, hook: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.inner.hooks.write().push(Arc::new(hook));
    }

    /// Records a mutation of `type_name`.
    ///
    /// Arms the type's timer unless one is already pending. Outside a Tokio
    /// runtime the events are published immediately.
    pub fn schedule(&self, type_name: &str) {
        let mut pending = self.inner.pending.lock();
        if pending.get(type_name).is_some_and(|h| !h.is_finished()) {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            drop(pending);
            self.inner.emit(type_name);
            return;
        };

        let inner = Arc::clone(&self.inner);
        let owned = type_name.to_string();
        let handle = runtime.spawn(async move {
            tokio::time::sleep(inner.window).await;
            inner.pending.lock().remove(&owned);
            inner.emit(&owned);
        });
        pending.insert(type_name.to_string(), handle);
    }

    /// Aborts the pending timer of `type_name` without publishing.
    ///
    /// Returns true if a timer was pending.
    pub fn cancel(&self, type_name: &str) -> bool {
        match self.inner.pending.lock().remove(type_name) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Aborts every pending timer.
    pub fn cancel_all(&self) {
        for (_, handle) in self.inner.pending.lock().drain() {
            handle.abort();
        }
    }

    /// Publishes the pending notification of `type_name` now.
    ///
    /// Returns false if nothing was pending.
    pub fn flush(&self, type_name: &str) -> bool {
        if self.cancel(type_name) {
            self.inner.emit(type_name);
            true
        } else {
            false
        }
    }

    /// Publishes every pending notification now.
    pub fn flush_all(&self) {
        for type_name in self.pending_types() {
            self.flush(&type_name);
        }
    }

    /// Returns the types with an armed timer, sorted.
    pub fn pending_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .inner
            .pending
            .lock()
            .iter()
            .filter(|(_, h)| !h.is_finished())
            .map(|(name, _)| name.clone())
            .collect();
        types.sort();
        types
    }

    /// Returns the sequence number of the last published pair.
    pub fn last_sequence(&self) -> u64 {
        self.inner.sequence.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("window", &self.inner.window)
            .field("pending", &self.pending_types())
            .field("sequence", &self.last_sequence())
            .finish()
    }
}
