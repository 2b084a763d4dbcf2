//! # RestMirror Testkit
//!
//! Test utilities for RestMirror.
//!
//! This crate provides:
//! - Mirror fixtures over a scripted transport, with or without a cache
//! - Property-based test generators using proptest
//! - A model-checking harness for the entity store
//!
//! ## Usage
//!
//! ```rust,ignore
//! use restmirror_testkit::prelude::*;
//!
//! #[tokio::test]
//! async fn fetches_tasks() {
//!     let fixture = TestMirror::memory();
//!     scenarios::serve_tasks(&fixture, 3);
//!     fixture.fetch("tasks", FetchOptions::new()).await.unwrap();
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod integration;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
    pub use restmirror_sync::{CreateOptions, ExpandOptions, FetchOptions, ScopeContext};
}

pub use fixtures::*;
pub use generators::*;
pub use integration::*;
