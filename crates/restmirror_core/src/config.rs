//! Store configuration.

use std::time::Duration;

/// Reserved id of the default namespace.
pub const BASE_NAMESPACE: &str = "base";

/// Configuration shared by the store, the notifier and the namespaces.
#[derive(Debug, Clone)]
pub struct Config {
    /// Attribute holding server-assigned identities, unless a type overrides it.
    pub identity_field: String,

    /// Namespace active at startup.
    pub initial_namespace: String,

    /// Window during which mutations of one type coalesce into one notification.
    pub change_debounce: Duration,

    /// Whether to hydrate from and mirror changes to the cache backend.
    pub persist: bool,

    /// Number of change events the feed keeps for polling.
    pub feed_history: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            identity_field: "id".to_string(),
            initial_namespace: BASE_NAMESPACE.to_string(),
            change_debounce: Duration::from_millis(150),
            persist: false,
            feed_history: 1024,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the store-wide identity attribute.
    #[must_use]
    pub fn identity_field(mut self, field: impl Into<String>) -> Self {
        self.identity_field = field.into();
        self
    }

    /// Sets the namespace active at startup.
    #[must_use]
    pub fn initial_namespace(mut self, id: impl Into<String>) -> Self {
        self.initial_namespace = id.into();
        self
    }

    /// Sets the change notification window.
    #[must_use]
    pub const fn change_debounce(mut self, window: Duration) -> Self {
        self.change_debounce = window;
        self
    }

    /// Enables or disables cache hydration and mirroring.
    #[must_use]
    pub const fn persist(mut self, value: bool) -> Self {
        self.persist = value;
        self
    }

    /// Sets the change feed history size.
    #[must_use]
    pub const fn feed_history(mut self, size: usize) -> Self {
        self.feed_history = size;
        self
    }
}
