//! Test fixtures and mirror helpers.
//!
//! Provides a ready-made schema, mirrors wired to a [`MockTransport`] and
//! canned API scenarios.

use restmirror_core::{Config, Record, Schema, TypeSchema};
use restmirror_storage::{CacheBackend, FileCache, MemoryCache};
use restmirror_sync::{Mirror, MockTransport, SyncConfig};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Base url used by every fixture.
pub const TEST_API: &str = "http://api.test";

/// Converts a JSON object literal into a record.
///
/// # Panics
///
/// Panics if `value` is not an object.
pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Schema exercising every type option.
///
/// - `tasks`: foreign key `owner → users`, one-to-many `tags → tags`
/// - `users`: ordered by `name`
/// - `tags`: plain
/// - `boards`: segment type
/// - `members`: scoped by `team`
/// - `drafts`: local-only
pub fn sample_schema() -> Schema {
    Schema::new()
        .with_type(
            "tasks",
            TypeSchema::with_url("/tasks")
                .foreign_key("owner", "users")
                .one_to_many("tags", "tags"),
        )
        .with_type("users", TypeSchema::with_url("/users").order_by("name"))
        .with_type("tags", TypeSchema::with_url("/tags"))
        .with_type("boards", TypeSchema::with_url("/boards").segment())
        .with_type("members", TypeSchema::with_url("/members").scope("team"))
        .with_type("drafts", TypeSchema::new().local_only())
}

/// A mirror over a scripted transport, with automatic cleanup of any
/// cache directory.
pub struct TestMirror {
    /// The mirror instance.
    pub mirror: Mirror,
    /// The scripted transport behind it.
    pub transport: Arc<MockTransport>,
    /// The cache, if any.
    pub cache: Option<Arc<dyn CacheBackend>>,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestMirror {
    /// Creates a mirror of [`sample_schema`] without a cache.
    pub fn memory() -> Self {
        Self::with_schema(sample_schema())
    }

    /// Creates a mirror of `schema` without a cache.
    pub fn with_schema(schema: Schema) -> Self {
        let transport = Arc::new(MockTransport::new());
        let mirror = Mirror::new(schema, SyncConfig::new(TEST_API), transport.clone())
            .expect("Failed to build mirror");
        Self {
            mirror,
            transport,
            cache: None,
            _temp_dir: None,
        }
    }

    /// Creates a persisting mirror over an in-memory cache.
    pub fn cached(cache: Arc<MemoryCache>) -> Self {
        Self::persisting(sample_schema(), cache, None)
    }

    /// Creates a persisting mirror over a file cache in a fresh directory.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = FileCache::open(temp_dir.path()).expect("Failed to open file cache");
        Self::persisting(sample_schema(), Arc::new(cache), Some(temp_dir))
    }

    /// Reopens a persisting mirror over the same cache, as after a restart.
    pub fn reopen(self) -> Self {
        let cache = self.cache.clone().expect("Only cached mirrors can be reopened");
        let schema = self.mirror.schema().clone();
        Self::persisting(schema, cache, self._temp_dir)
    }

    fn persisting(schema: Schema, cache: Arc<dyn CacheBackend>, temp_dir: Option<TempDir>) -> Self {
        let transport = Arc::new(MockTransport::new());
        let config = SyncConfig::new(TEST_API).with_core(Config::new().persist(true));
        let mirror = Mirror::builder(schema, config)
            .transport(transport.clone())
            .cache(cache.clone())
            .build()
            .expect("Failed to build persisting mirror");
        Self {
            mirror,
            transport,
            cache: Some(cache),
            _temp_dir: temp_dir,
        }
    }

    /// Returns the cache directory if file-based.
    pub fn path(&self) -> Option<&Path> {
        self._temp_dir.as_ref().map(TempDir::path)
    }

    /// Absolute url of an api path.
    pub fn url(&self, path: &str) -> String {
        format!("{TEST_API}{path}")
    }
}

impl std::ops::Deref for TestMirror {
    type Target = Mirror;

    fn deref(&self) -> &Self::Target {
        &self.mirror
    }
}

/// Runs a test with a fresh in-memory mirror.
pub fn with_test_mirror<F, R>(f: F) -> R
where
    F: FnOnce(&TestMirror) -> R,
{
    let fixture = TestMirror::memory();
    f(&fixture)
}

/// Canned API scenarios.
pub mod scenarios {
    use super::*;
    use restmirror_core::MergeOptions;
    use restmirror_sync::Method;
    use serde_json::json;

    /// Builds `count` task records with ids `1..=count`.
    pub fn tasks(count: usize) -> Vec<Value> {
        (1..=count)
            .map(|i| json!({"id": i, "title": format!("task {i}"), "done": i % 2 == 0}))
            .collect()
    }

    /// Serves `count` tasks on `GET /tasks`.
    pub fn serve_tasks(fixture: &TestMirror, count: usize) {
        let body = Value::Array(tasks(count)).to_string();
        fixture
            .transport
            .respond(Method::Get, fixture.url("/tasks"), 200, body);
    }

    /// Serves one user on `GET /users/<id>`.
    pub fn serve_user(fixture: &TestMirror, id: u64, name: &str) {
        let body = json!({"id": id, "name": name}).to_string();
        fixture
            .transport
            .respond(Method::Get, fixture.url(&format!("/users/{id}")), 200, body);
    }

    /// Merges `count` tasks directly, without notifications.
    pub fn populated(count: usize) -> TestMirror {
        let fixture = TestMirror::memory();
        fixture
            .merge("tasks", Value::Array(tasks(count)), MergeOptions::silent())
            .expect("Failed to merge tasks");
        fixture
    }
}
