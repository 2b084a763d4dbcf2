//! Change feed for observing store mutations.
//!
//! Each flushed notification window produces two events: a generic
//! [`CHANGE`] event carrying the type name and a type-specific
//! `change:<type>` event. Subscribers receive both, in that order.
//!
//! # Usage
//!
//! ```rust
//! use restmirror_core::{ChangeEvent, ChangeFeed, Publisher};
//!
//! let feed = ChangeFeed::new();
//! let receiver = feed.subscribe();
//!
//! feed.publish(&ChangeEvent::change(1, "tasks"));
//! assert_eq!(receiver.recv().unwrap().type_name, "tasks");
//! ```

use parking_lot::RwLock;
use std::sync::mpsc::{self, Receiver, Sender};

/// Name of the generic change event.
pub const CHANGE: &str = "change";

/// A single change event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Monotonic sequence number assigned by the notifier.
    pub sequence: u64,
    /// Event name: `change` or `change:<type>`.
    pub name: String,
    /// The type whose records changed.
    pub type_name: String,
}

impl ChangeEvent {
    /// Creates the generic `change` event.
    pub fn change(sequence: u64, type_name: impl Into<String>) -> Self {
        Self {
            sequence,
            name: CHANGE.to_string(),
            type_name: type_name.into(),
        }
    }

    /// Creates the `change:<type>` event.
    pub fn typed(sequence: u64, type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self {
            sequence,
            name: format!("{CHANGE}:{type_name}"),
            type_name,
        }
    }

    /// Returns true for the generic `change` event.
    pub fn is_generic(&self) -> bool {
        self.name == CHANGE
    }
}

/// Publish side of the notification channel.
pub trait Publisher: Send + Sync {
    /// Delivers an event to every listener.
    fn publish(&self, event: &ChangeEvent);
}

/// In-process publish/subscribe channel with a bounded history.
///
/// The feed:
/// - Delivers events in publish order
/// - Supports multiple subscribers
/// - Drops disconnected subscribers on the next publish
/// - Is thread-safe
pub struct ChangeFeed {
    subscribers: RwLock<Vec<Sender<ChangeEvent>>>,
    history: RwLock<Vec<ChangeEvent>>,
    max_history: usize,
}

impl ChangeFeed {
    /// Creates a new change feed.
    pub fn new() -> Self {
        Self::with_max_history(1024)
    }

    /// Creates a change feed with a specific history limit.
    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            history: RwLock::new(Vec::new()),
            max_history,
        }
    }

    /// Subscribes to the feed.
    ///
    /// The receiver gets every event published after this call.
    pub fn subscribe(&self) -> Receiver<ChangeEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.write().push(tx);
        rx
    }

    /// Returns events with a sequence greater than `cursor`, up to `limit`.
    pub fn poll(&self, cursor: u64, limit: usize) -> Vec<ChangeEvent> {
        self.history
            .read()
            .iter()
            .filter(|e| e.sequence > cursor)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Returns the latest sequence number in history.
    pub fn latest_sequence(&self) -> u64 {
        self.history.read().last().map_or(0, |e| e.sequence)
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Returns the number of events in history.
    pub fn history_len(&self) -> usize {
        self.history.read().len()
    }
}

impl Publisher for ChangeFeed {
    fn publish(&self, event: &ChangeEvent) {
        {
            let mut history = self.history.write();
            history.push(event.clone());
            if history.len() > self.max_history {
                let excess = history.len() - self.max_history;
                history.drain(0..excess);
            }
        }

        let mut subscribers = self.subscribers.write();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChangeFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeFeed")
            .field("subscribers", &self.subscriber_count())
            .field("history", &self.history_len())
            .field("max_history", &self.max_history)
            .finish()
    }
}
