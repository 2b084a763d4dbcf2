//! Per-call options.

use restmirror_core::Record;
use serde_json::Value;
use std::collections::BTreeMap;

/// Values for scope discriminators, e.g. `team → 42`.
///
/// A scoped type's requests carry `scopeType=<scope>` and
/// `scopeId=<value>` with the value looked up here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeContext {
    values: BTreeMap<String, String>,
}

impl ScopeContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of a scope, builder style.
    #[must_use]
    pub fn with(mut self, scope: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(scope, value);
        self
    }

    /// Sets the value of a scope.
    pub fn set(&mut self, scope: impl Into<String>, value: impl Into<String>) {
        self.values.insert(scope.into(), value.into());
    }

    /// Returns the value of a scope.
    pub fn get(&self, scope: &str) -> Option<&str> {
        self.values.get(scope).map(String::as_str)
    }
}

/// Options for [`Mirror::fetch`](crate::Mirror::fetch).
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Querystring parameters. An identity parameter is sent as a path
    /// segment instead.
    pub params: Option<Record>,
    /// Url override, absolute or relative to the api url.
    pub url: Option<String>,
    /// Scope values for scoped types.
    pub scope: ScopeContext,
}

impl FetchOptions {
    /// Options for a plain full-list fetch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params
            .get_or_insert_with(Record::new)
            .insert(key.into(), value.into());
        self
    }

    /// Replaces the parameters.
    #[must_use]
    pub fn params(mut self, params: Record) -> Self {
        self.params = Some(params);
        self
    }

    /// Overrides the url.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the scope values.
    #[must_use]
    pub fn scope(mut self, scope: ScopeContext) -> Self {
        self.scope = scope;
        self
    }

    /// Returns true when neither parameters nor a url override are set.
    pub fn is_plain(&self) -> bool {
        self.params.is_none() && self.url.is_none()
    }
}

/// Options for [`Mirror::create`](crate::Mirror::create).
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// POST the record instead of only storing it locally.
    pub persist: bool,
    /// Url override for the POST.
    pub url: Option<String>,
    /// Suppress the change notification of a local create.
    pub silent: bool,
}

impl CreateOptions {
    /// Options for a local-only create.
    pub fn local() -> Self {
        Self::default()
    }

    /// Options for a persisting create.
    pub fn persist() -> Self {
        Self {
            persist: true,
            ..Self::default()
        }
    }

    /// Overrides the url.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Suppresses the change notification.
    #[must_use]
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }
}

/// Options for [`Mirror::expand`](crate::Mirror::expand).
#[derive(Debug, Clone, Default)]
pub struct ExpandOptions {
    /// Expand only these attributes.
    pub only: Option<Vec<String>>,
    /// Scope values for remote fallbacks.
    pub scope: ScopeContext,
}

impl ExpandOptions {
    /// Expands every relation attribute.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts expansion to one attribute.
    #[must_use]
    pub fn only(mut self, attr: impl Into<String>) -> Self {
        self.only.get_or_insert_with(Vec::new).push(attr.into());
        self
    }

    /// Sets the scope values.
    #[must_use]
    pub fn scope(mut self, scope: ScopeContext) -> Self {
        self.scope = scope;
        self
    }
}
