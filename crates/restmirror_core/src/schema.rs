//! Schema registry.
//!
//! The registry is static, caller-supplied data describing every entity
//! type: its endpoint, identity attribute, relations, ordering, scoping and
//! namespace behaviour. Everything else in the workspace consults it.
//!
//! Entries deserialize from JSON with camelCase keys:
//!
//! ```rust
//! use restmirror_core::Schema;
//!
//! let schema = Schema::from_json(r#"{
//!     "tasks": { "url": "/tasks", "foreignKey": { "owner": "users" }, "orderBy": "-title" },
//!     "users": { "url": "/users" }
//! }"#).unwrap();
//! assert_eq!(schema.type_names(), vec!["tasks", "users"]);
//! ```
//!
//! `parse` normalizers and validation hooks are closures and are attached
//! in code with the builder methods on [`TypeSchema`].

use crate::error::{CoreError, CoreResult};
use crate::record::Record;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Normalizes a raw response body into a record or an array of records.
pub type ParseFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Asynchronous hook run after a validated field changed.
pub type AfterUpdateFn =
    Arc<dyn Fn(HookContext) -> BoxFuture<'static, Result<(), String>> + Send + Sync>;

/// Input handed to an `after_update` hook.
#[derive(Debug, Clone)]
pub struct HookContext {
    /// Type of the mutated record.
    pub type_name: String,
    /// Identity attribute of the type.
    pub identity_field: String,
    /// The record as it is about to be merged.
    pub record: Record,
}

/// A validation rule for one (dotted) attribute path.
#[derive(Clone)]
pub struct FieldRule {
    /// Dotted attribute path, e.g. `"address.city"`.
    pub path: String,
    /// Hook invoked when the value at `path` changed.
    pub after_update: Option<AfterUpdateFn>,
}

impl FieldRule {
    /// Creates a rule without a hook.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            after_update: None,
        }
    }

    /// Attaches an asynchronous post-update hook.
    #[must_use]
    pub fn after_update<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), String>> + Send + 'static,
    {
        self.after_update = Some(Arc::new(move |ctx| Box::pin(hook(ctx))));
        self
    }
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRule")
            .field("path", &self.path)
            .field("after_update", &self.after_update.is_some())
            .finish()
    }
}

/// How a relation attribute refers to its target type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// The attribute holds an array of identities.
    OneToMany,
    /// The attribute holds a single identity.
    ForeignKey,
}

/// Parsed `orderBy` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// Attribute to sort by.
    pub field: String,
    /// Whether the order is reversed (leading `-`).
    pub descending: bool,
}

impl OrderBy {
    /// Parses `"name"` or `"-name"`.
    pub fn parse(text: &str) -> Self {
        match text.strip_prefix('-') {
            Some(field) => Self {
                field: field.to_string(),
                descending: true,
            },
            None => Self {
                field: text.to_string(),
                descending: false,
            },
        }
    }
}

/// Description of one entity type.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeSchema {
    /// Endpoint path relative to the api url. `None` for types that are
    /// only ever populated locally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Identity attribute override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_field: Option<String>,

    /// Attribute → related type, attribute holds an array of identities.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub one_to_many: BTreeMap<String, String>,

    /// Attribute → related type, attribute holds one identity.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub foreign_key: BTreeMap<String, String>,

    /// Partition discriminator sent as `scopeType`/`scopeId`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Namespace-local type: reset or refetched on namespace switch.
    #[serde(default)]
    pub segment: bool,

    /// Never hits the transport.
    #[serde(default, alias = "localDataOnly")]
    pub local_only: bool,

    /// Sort attribute for `find_all`, leading `-` for descending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,

    /// Response normalizer.
    #[serde(skip)]
    pub parse: Option<ParseFn>,

    /// Field rules, in declaration order.
    #[serde(skip)]
    pub validation: Vec<FieldRule>,
}

impl TypeSchema {
    /// Creates an empty local-state type description.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a type served from `url`.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Sets the endpoint path.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Overrides the identity attribute.
    #[must_use]
    pub fn identity_field(mut self, field: impl Into<String>) -> Self {
        self.identity_field = Some(field.into());
        self
    }

    /// Declares a one-to-many relation.
    #[must_use]
    pub fn one_to_many(mut self, attr: impl Into<String>, target: impl Into<String>) -> Self {
        self.one_to_many.insert(attr.into(), target.into());
        self
    }

    /// Declares a foreign-key relation.
    #[must_use]
    pub fn foreign_key(mut self, attr: impl Into<String>, target: impl Into<String>) -> Self {
        self.foreign_key.insert(attr.into(), target.into());
        self
    }

    /// Sets the partition discriminator.
    #[must_use]
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Marks the type as namespace-local.
    #[must_use]
    pub fn segment(mut self) -> Self {
        self.segment = true;
        self
    }

    /// Marks the type as never hitting the transport.
    #[must_use]
    pub fn local_only(mut self) -> Self {
        self.local_only = true;
        self
    }

    /// Sets the `find_all` ordering.
    #[must_use]
    pub fn order_by(mut self, order: impl Into<String>) -> Self {
        self.order_by = Some(order.into());
        self
    }

    /// Attaches a response normalizer.
    #[must_use]
    pub fn parse<F>(mut self, parse: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.parse = Some(Arc::new(parse));
        self
    }

    /// Appends a validation rule.
    #[must_use]
    pub fn rule(mut self, rule: FieldRule) -> Self {
        self.validation.push(rule);
        self
    }

    /// Returns the identity attribute, falling back to `default`.
    pub fn identity_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.identity_field.as_deref().unwrap_or(default)
    }

    /// Returns the parsed ordering, if any.
    pub fn ordering(&self) -> Option<OrderBy> {
        self.order_by.as_deref().map(OrderBy::parse)
    }

    /// Returns every relation attribute with its target type and kind.
    ///
    /// An attribute declared in both maps is treated as a foreign key.
    pub fn relations(&self) -> Vec<(&str, &str, RelationKind)> {
        let mut relations: Vec<_> = self
            .one_to_many
            .iter()
            .filter(|(attr, _)| !self.foreign_key.contains_key(*attr))
            .map(|(attr, target)| (attr.as_str(), target.as_str(), RelationKind::OneToMany))
            .collect();
        relations.extend(
            self.foreign_key
                .iter()
                .map(|(attr, target)| (attr.as_str(), target.as_str(), RelationKind::ForeignKey)),
        );
        relations
    }
}

impl fmt::Debug for TypeSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeSchema")
            .field("url", &self.url)
            .field("identity_field", &self.identity_field)
            .field("one_to_many", &self.one_to_many)
            .field("foreign_key", &self.foreign_key)
            .field("scope", &self.scope)
            .field("segment", &self.segment)
            .field("local_only", &self.local_only)
            .field("order_by", &self.order_by)
            .field("parse", &self.parse.is_some())
            .field("validation", &self.validation)
            .finish()
    }
}

/// The set of every declared entity type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    types: BTreeMap<String, TypeSchema>,
}

impl Schema {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a registry from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MalformedResponse`] if the text is not a valid
    /// schema document.
    pub fn from_json(text: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Adds a type, builder style.
    #[must_use]
    pub fn with_type(mut self, name: impl Into<String>, schema: TypeSchema) -> Self {
        self.insert(name, schema);
        self
    }

    /// Adds or replaces a type.
    pub fn insert(&mut self, name: impl Into<String>, schema: TypeSchema) {
        self.types.insert(name.into(), schema);
    }

    /// Looks up a type.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownType`] listing every valid name.
    pub fn get(&self, name: &str) -> CoreResult<&TypeSchema> {
        self.types.get(name).ok_or_else(|| CoreError::UnknownType {
            name: name.to_string(),
            valid: self.type_names(),
        })
    }

    /// Mutable lookup, used to attach hooks after loading from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownType`] listing every valid name.
    pub fn get_mut(&mut self, name: &str) -> CoreResult<&mut TypeSchema> {
        let valid = self.type_names();
        self.types
            .get_mut(name)
            .ok_or_else(|| CoreError::UnknownType {
                name: name.to_string(),
                valid,
            })
    }

    /// Returns true if `name` is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Returns every declared type name, sorted.
    pub fn type_names(&self) -> Vec<String> {
        self.types.keys().cloned().collect()
    }

    /// Iterates over `(name, schema)` pairs, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeSchema)> {
        self.types.iter().map(|(name, schema)| (name.as_str(), schema))
    }

    /// Returns the number of declared types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no type is declared.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
