//! # RestMirror Core
//!
//! Local state engine for RestMirror.
//!
//! This crate provides:
//! - Schema registry describing every entity type
//! - Entity store with merge, identity promotion and queries
//! - Relation reduce/plan/assemble helpers
//! - Debounced change notification over a publish/subscribe feed
//! - Namespaces sharing one schema
//!
//! Nothing here performs I/O against the remote API; see `restmirror_sync`
//! for the transport-driven flows.
//!
//! ## Key Invariants
//!
//! - A record lives under exactly one key: its temporary key or its identity
//! - Promotion from temporary key to identity happens in one step
//! - At most one pending notification timer per type
//! - Exactly one namespace is active

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod change_feed;
mod config;
mod error;
mod namespace;
mod notifier;
mod query;
pub mod record;
pub mod relation;
mod schema;
mod store;

pub use change_feed::{ChangeEvent, ChangeFeed, Publisher, CHANGE};
pub use config::{Config, BASE_NAMESPACE};
pub use error::{CoreError, CoreResult};
pub use namespace::{NamespaceManager, SwitchOutcome};
pub use notifier::{ChangeNotifier, FlushHook};
pub use query::Query;
pub use record::{Key, Record, LOCAL_CREATE_TIME, URL_ATTR};
pub use schema::{
    AfterUpdateFn, FieldRule, HookContext, OrderBy, ParseFn, RelationKind, Schema, TypeSchema,
};
pub use store::{Collection, EntityStore, MergeOptions, Merged, Payload};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
