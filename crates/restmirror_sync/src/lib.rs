//! # RestMirror Sync
//!
//! Transport-driven sync engine for RestMirror.
//!
//! This crate provides:
//! - [`Mirror`], the engine running fetch/create/update/remove flows
//! - Relation expansion with store-first lookup and remote fallback
//! - Post-update validation hooks
//! - Cache hydration and mirroring through a `CacheBackend`
//! - Transport abstraction with a `reqwest` implementation and a mock
//!
//! ## Example
//!
//! ```rust,no_run
//! use restmirror_core::{Schema, TypeSchema};
//! use restmirror_sync::{FetchOptions, Mirror, SyncConfig};
//!
//! # async fn run() -> restmirror_sync::SyncResult<()> {
//! let schema = Schema::new().with_type("tasks", TypeSchema::with_url("/tasks"));
//! let mirror = Mirror::builder(schema, SyncConfig::new("https://api.example.com")).build()?;
//!
//! mirror.fetch("tasks", FetchOptions::new()).await?;
//! let open = mirror.find_all("tasks", Some(&restmirror_core::Query::by("done", false)))?;
//! println!("{} open tasks", open.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Invariants
//!
//! - Store state is never locked across an `.await`
//! - Only a plain fetch prunes records missing from the response
//! - Validation hook failures never abort a mutation
//! - Nothing is retried internally

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
#[cfg(feature = "http")]
mod http;
mod mirror;
mod options;
mod transport;
pub mod url;
pub mod validation;

pub use config::{HeaderValue, SyncConfig};
pub use error::{SyncError, SyncResult};
#[cfg(feature = "http")]
pub use http::HttpTransport;
pub use mirror::{Mirror, MirrorBuilder};
pub use options::{CreateOptions, ExpandOptions, FetchOptions, ScopeContext};
pub use transport::{HttpRequest, HttpResponse, Method, MockTransport, Transport};
