//! Configuration for the sync engine.

use restmirror_core::Config;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// A request header value.
#[derive(Clone)]
pub enum HeaderValue {
    /// Sent as-is on every request.
    Static(String),
    /// Evaluated for every request, e.g. to pick up a refreshed token.
    Dynamic(Arc<dyn Fn() -> String + Send + Sync>),
}

impl HeaderValue {
    /// Returns the value to send now.
    pub fn resolve(&self) -> String {
        match self {
            HeaderValue::Static(value) => value.clone(),
            HeaderValue::Dynamic(provider) => provider(),
        }
    }
}

impl fmt::Debug for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Static(value) => f.debug_tuple("Static").field(value).finish(),
            HeaderValue::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Configuration for a [`Mirror`](crate::Mirror).
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Prefix for every schema url and every relative record url.
    pub api_url: String,
    /// Headers sent with every request.
    pub headers: Vec<(String, HeaderValue)>,
    /// Wrap outbound bodies and unwrap create responses under the
    /// start-cased type name.
    pub entity_root: bool,
    /// Request timeout applied by the HTTP transport.
    pub timeout: Duration,
    /// Store configuration.
    pub core: Config,
}

impl SyncConfig {
    /// Creates a configuration for the API at `api_url`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            headers: Vec::new(),
            entity_root: false,
            timeout: Duration::from_secs(30),
            core: Config::default(),
        }
    }

    /// Adds a static header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .push((name.into(), HeaderValue::Static(value.into())));
        self
    }

    /// Adds a header evaluated per request.
    #[must_use]
    pub fn with_dynamic_header<F>(mut self, name: impl Into<String>, provider: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.headers
            .push((name.into(), HeaderValue::Dynamic(Arc::new(provider))));
        self
    }

    /// Enables or disables entity-root wrapping.
    #[must_use]
    pub fn with_entity_root(mut self, enabled: bool) -> Self {
        self.entity_root = enabled;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the store configuration.
    #[must_use]
    pub fn with_core(mut self, core: Config) -> Self {
        self.core = core;
        self
    }

    /// Evaluates every header.
    pub fn resolve_headers(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .map(|(name, value)| (name.clone(), value.resolve()))
            .collect()
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new("")
    }
}
