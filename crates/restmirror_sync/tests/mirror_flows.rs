//! End-to-end flows of the sync engine over a scripted transport.

use restmirror_core::{Config, CoreError, FieldRule, Key, MergeOptions, Merged, Query, Record, Schema, TypeSchema};
use restmirror_storage::{CacheBackend, FileCache, MemoryCache};
use restmirror_sync::{
    CreateOptions, ExpandOptions, FetchOptions, Method, Mirror, MockTransport, ScopeContext,
    SyncConfig, SyncError,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::oneshot;

const API: &str = "http://api";

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

fn schema() -> Schema {
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

fn mirror_with(schema: Schema, config: SyncConfig) -> (Mirror, Arc<MockTransport>) {
    let transport = Arc::new(MockTransport::new());
    let mirror = Mirror::new(schema, config, transport.clone()).unwrap();
    (mirror, transport)
}

fn mirror() -> (Mirror, Arc<MockTransport>) {
    mirror_with(schema(), SyncConfig::new(API))
}

// ── Local create and promotion ──────────────────────────────────

#[tokio::test]
async fn local_create_then_promotion() {
    let (mirror, transport) = mirror();

    let created = mirror
        .create("tasks", record(json!({"title": "a"})), CreateOptions::local())
        .await
        .unwrap();
    let temp = created["localCreateTime"].as_str().unwrap().to_string();
    assert!(created.get("id").is_none());
    assert!(transport.requests().is_empty());

    mirror
        .merge(
            "tasks",
            json!({"id": 7, "title": "a", "localCreateTime": temp}),
            MergeOptions::default(),
        )
        .unwrap();

    let all = mirror.find_all("tasks", None).unwrap();
    assert_eq!(all.len(), 1);
    assert!(mirror.find("tasks", Some(&Query::from(temp.as_str()))).unwrap().is_none());
    assert!(mirror.find("tasks", Some(&Query::from(7i64))).unwrap().is_some());
}

#[tokio::test]
async fn temporary_keys_are_unique() {
    let (mirror, _) = mirror();
    let a = mirror
        .create("drafts", Record::new(), CreateOptions::local())
        .await
        .unwrap();
    let b = mirror
        .create("drafts", Record::new(), CreateOptions::local())
        .await
        .unwrap();
    assert_ne!(a["localCreateTime"], b["localCreateTime"]);
    assert_eq!(mirror.find_all("drafts", None).unwrap().len(), 2);
}

// ── Fetch ───────────────────────────────────────────────────────

#[tokio::test]
async fn plain_fetch_prunes_missing_records() {
    let (mirror, transport) = mirror();
    mirror
        .merge("tags", json!([{"id": 1}, {"id": 2}, {"localCreateTime": "9"}]), MergeOptions::default())
        .unwrap();
    transport.respond(Method::Get, "http://api/tags", 200, r#"[{"id": 2}, {"id": 3}]"#);

    let merged = mirror.fetch("tags", FetchOptions::new()).await.unwrap();
    assert_eq!(merged.len(), 2);

    let keys: Vec<Value> = mirror
        .find_all("tags", None)
        .unwrap()
        .into_iter()
        .map(|r| r.get("id").cloned().unwrap_or(Value::Null))
        .collect();
    assert_eq!(keys, vec![json!(2), Value::Null, json!(3)]);
}

#[tokio::test]
async fn filtered_fetch_keeps_other_records() {
    let (mirror, transport) = mirror();
    mirror
        .merge("tags", json!([{"id": 1}, {"id": 2}]), MergeOptions::default())
        .unwrap();
    transport.respond(Method::Get, "http://api/tags?name=x", 200, r#"[{"id": 3, "name": "x"}]"#);

    mirror
        .fetch("tags", FetchOptions::new().param("name", "x"))
        .await
        .unwrap();
    assert_eq!(mirror.find_all("tags", None).unwrap().len(), 3);
}

#[tokio::test]
async fn identity_param_becomes_path_segment() {
    let (mirror, transport) = mirror();
    transport.respond(Method::Get, "http://api/users/4?expand=1", 200, r#"{"id": 4, "name": "ann"}"#);

    let merged = mirror
        .fetch("users", FetchOptions::new().param("id", 4).param("expand", 1))
        .await
        .unwrap();
    assert!(matches!(merged, Merged::One(_)));
    assert_eq!(transport.request_count(Method::Get, "http://api/users/4?expand=1"), 1);
}

#[tokio::test]
async fn segment_type_in_base_is_empty() {
    let (mirror, transport) = mirror();
    let merged = mirror.fetch("boards", FetchOptions::new()).await.unwrap();
    assert!(merged.is_empty());
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn scoped_fetch_requires_scope_value() {
    let (mirror, transport) = mirror();

    let err = mirror.fetch("members", FetchOptions::new()).await.unwrap_err();
    assert!(matches!(err, SyncError::MissingScope { ref scope, .. } if scope == "team"));

    transport.respond(
        Method::Get,
        "http://api/members?scopeId=42&scopeType=team",
        200,
        r#"[{"id": 1}]"#,
    );
    let merged = mirror
        .fetch(
            "members",
            FetchOptions::new().scope(ScopeContext::new().with("team", "42")),
        )
        .await
        .unwrap();
    assert_eq!(merged.len(), 1);
}

#[tokio::test]
async fn local_only_fetch_is_served_from_store() {
    let (mirror, transport) = mirror();
    let draft = mirror
        .create("drafts", record(json!({"body": "x"})), CreateOptions::local())
        .await
        .unwrap();

    let all = mirror.fetch("drafts", FetchOptions::new()).await.unwrap();
    assert_eq!(all.len(), 1);

    let one = mirror
        .fetch(
            "drafts",
            FetchOptions::new().param("localCreateTime", draft["localCreateTime"].clone()),
        )
        .await
        .unwrap();
    assert!(matches!(one, Merged::One(_)));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn unknown_type_lists_valid_types() {
    let (mirror, _) = mirror();
    let err = mirror.fetch("projects", FetchOptions::new()).await.unwrap_err();
    match err {
        SyncError::Core(CoreError::UnknownType { valid, .. }) => {
            assert!(valid.contains(&"tasks".to_string()));
            assert_eq!(valid.len(), 6);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn error_statuses_and_messages() {
    let (mirror, transport) = mirror();
    transport.respond(Method::Get, "http://api/tags", 503, r#"{"errorMessage": "maintenance"}"#);
    let err = mirror.fetch("tags", FetchOptions::new()).await.unwrap_err();
    assert!(err.is_retryable());
    assert!(err.to_string().contains("maintenance"));

    transport.respond(Method::Get, "http://api/tags", 200, r#"{"errorMessage": "quota exceeded"}"#);
    let err = mirror.fetch("tags", FetchOptions::new()).await.unwrap_err();
    assert!(matches!(err, SyncError::Remote { .. }));

    transport.set_offline(Some("connection refused"));
    let err = mirror.fetch("tags", FetchOptions::new()).await.unwrap_err();
    assert!(matches!(err, SyncError::Transport { status: None, .. }));
}

// ── Create, update, remove ──────────────────────────────────────

#[tokio::test]
async fn persisting_create_promotes_and_reduces() {
    let (mirror, transport) = mirror();
    let local = mirror
        .create("tasks", record(json!({"title": "a"})), CreateOptions::local())
        .await
        .unwrap();
    transport.respond(Method::Post, "http://api/tasks", 201, r#"{"id": 11}"#);

    let mut outgoing = local.clone();
    outgoing.insert("owner".into(), json!({"id": 3, "name": "bob"}));
    let saved = mirror
        .create("tasks", outgoing, CreateOptions::persist())
        .await
        .unwrap();

    assert_eq!(saved["id"], json!(11));
    assert_eq!(saved["owner"], json!(3));
    assert_eq!(mirror.find_all("tasks", None).unwrap().len(), 1);

    let sent: Value = serde_json::from_str(transport.requests()[0].body.as_deref().unwrap()).unwrap();
    assert_eq!(sent["owner"], json!(3));
    assert_eq!(
        transport.requests()[0].content_type.as_deref(),
        Some("application/json")
    );
}

#[tokio::test]
async fn persisting_create_with_empty_response_fails() {
    let (mirror, transport) = mirror();
    transport.respond(Method::Post, "http://api/tasks", 200, "");
    let err = mirror
        .create("tasks", record(json!({"title": "a"})), CreateOptions::persist())
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::SaveFailed { .. }));
    assert!(mirror.find_all("tasks", None).unwrap().is_empty());
}

#[tokio::test]
async fn entity_root_wraps_and_unwraps() {
    let (mirror, transport) = mirror_with(schema(), SyncConfig::new(API).with_entity_root(true));
    transport.respond(Method::Post, "http://api/tasks", 201, r#"{"Tasks": {"id": 5}}"#);

    let saved = mirror
        .create("tasks", record(json!({"title": "a"})), CreateOptions::persist())
        .await
        .unwrap();
    assert_eq!(saved["id"], json!(5));

    let sent: Value = serde_json::from_str(transport.requests()[0].body.as_deref().unwrap()).unwrap();
    assert_eq!(sent, json!({"Tasks": {"title": "a"}}));
}

#[tokio::test]
async fn update_puts_and_merges_response() {
    let (mirror, transport) = mirror();
    mirror
        .merge("tasks", json!({"id": 7, "title": "a"}), MergeOptions::default())
        .unwrap();
    transport.respond(Method::Put, "http://api/tasks/7", 200, r#"{"id": 7, "title": "b", "rev": 2}"#);

    let updated = mirror
        .update("tasks", record(json!({"id": 7, "title": "b"})))
        .await
        .unwrap();
    assert_eq!(updated["rev"], json!(2));
    let stored = mirror.find("tasks", Some(&Query::from(7i64))).unwrap().unwrap();
    assert_eq!(stored["rev"], json!(2));
}

#[tokio::test]
async fn update_with_empty_response_merges_sent_record() {
    let (mirror, transport) = mirror();
    transport.respond(Method::Put, "http://api/tasks/7", 204, "");
    mirror
        .update("tasks", record(json!({"id": 7, "title": "c"})))
        .await
        .unwrap();
    let stored = mirror.find("tasks", Some(&Query::from(7i64))).unwrap().unwrap();
    assert_eq!(stored["title"], json!("c"));
}

#[tokio::test]
async fn update_uses_record_url() {
    let (mirror, transport) = mirror();
    transport.respond(Method::Put, "http://api/custom/7", 200, "");
    mirror
        .update("tasks", record(json!({"id": 7, "url": "/custom/7"})))
        .await
        .unwrap();
    assert_eq!(transport.request_count(Method::Put, "http://api/custom/7"), 1);
}

#[tokio::test]
async fn update_without_any_key() {
    let (mirror, transport) = mirror();

    let err = mirror
        .update("tasks", record(json!({"title": "x"})))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::MissingIdentity { ref identity_field } if identity_field == "id"));

    let local = mirror
        .update("tasks", record(json!({"title": "x", "localCreateTime": "55"})))
        .await
        .unwrap();
    assert_eq!(local["title"], json!("x"));
    assert!(transport.requests().is_empty());
    assert_eq!(mirror.find_all("tasks", None).unwrap().len(), 1);
}

#[tokio::test]
async fn remove_flows() {
    let (mirror, transport) = mirror();
    mirror
        .merge("tasks", json!([{"id": 1}, {"localCreateTime": "2"}]), MergeOptions::default())
        .unwrap();

    transport.respond(Method::Delete, "http://api/tasks/1", 204, "");
    mirror.remove("tasks", &record(json!({"id": 1}))).await.unwrap();
    assert!(mirror.find("tasks", Some(&Query::from(1i64))).unwrap().is_none());

    mirror
        .remove("tasks", &record(json!({"localCreateTime": "2"})))
        .await
        .unwrap();
    assert!(mirror.find_all("tasks", None).unwrap().is_empty());
    assert_eq!(transport.requests().len(), 1);

    let err = mirror.remove("tasks", &record(json!({"title": "x"}))).await.unwrap_err();
    assert!(matches!(err, SyncError::MissingIdentity { .. }));
}

#[tokio::test]
async fn failed_remove_keeps_record() {
    let (mirror, transport) = mirror();
    mirror
        .merge("tasks", json!({"id": 1}), MergeOptions::default())
        .unwrap();
    transport.respond(Method::Delete, "http://api/tasks/1", 500, "");
    assert!(mirror.remove("tasks", &record(json!({"id": 1}))).await.is_err());
    assert!(mirror.find("tasks", Some(&Query::from(1i64))).unwrap().is_some());
}

#[tokio::test]
async fn headers_are_sent_on_every_request() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let config = SyncConfig::new(API)
        .with_header("X-App", "mirror")
        .with_dynamic_header("Authorization", move || {
            format!("Bearer t{}", counter.fetch_add(1, Ordering::SeqCst))
        });
    let (mirror, transport) = mirror_with(schema(), config);
    transport.respond(Method::Get, "http://api/tags", 200, "[]");

    mirror.fetch("tags", FetchOptions::new()).await.unwrap();
    mirror.fetch("tags", FetchOptions::new()).await.unwrap();

    let requests = transport.requests();
    assert!(requests[0].headers.contains(&("X-App".into(), "mirror".into())));
    assert!(requests[0].headers.contains(&("Authorization".into(), "Bearer t0".into())));
    assert!(requests[1].headers.contains(&("Authorization".into(), "Bearer t1".into())));
}

// ── Validation hooks ────────────────────────────────────────────

#[tokio::test]
async fn hooks_run_only_for_changed_paths() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let schema = schema().with_type(
        "tasks",
        TypeSchema::with_url("/tasks").rule(FieldRule::new("title").after_update(move |_ctx| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err("hook failures are ignored".to_string())
            }
        })),
    );
    let (mirror, transport) = mirror_with(schema, SyncConfig::new(API));
    transport.respond(Method::Put, "http://api/tasks/1", 200, "");
    mirror
        .merge("tasks", json!({"id": 1, "title": "a"}), MergeOptions::default())
        .unwrap();

    mirror
        .update("tasks", record(json!({"id": 1, "title": "b"})))
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    mirror
        .update("tasks", record(json!({"id": 1, "title": "b", "done": true})))
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

fn gated_hook_schema(gate: oneshot::Receiver<()>) -> Schema {
    let gate = Arc::new(StdMutex::new(Some(gate)));
    schema().with_type(
        "tasks",
        TypeSchema::with_url("/tasks").rule(FieldRule::new("title").after_update(move |_ctx| {
            let gate = gate.lock().unwrap().take();
            async move {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                Ok(())
            }
        })),
    )
}

#[tokio::test(start_paused = true)]
async fn merge_waits_for_pending_hooks() {
    let (release, gate) = oneshot::channel();
    let (mirror, transport) = mirror_with(gated_hook_schema(gate), SyncConfig::new(API));
    transport.respond(Method::Put, "http://api/tasks/1", 200, "");
    mirror
        .merge("tasks", json!({"id": 1, "title": "a"}), MergeOptions::default())
        .unwrap();

    let update = mirror.update("tasks", record(json!({"id": 1, "title": "b"})));
    tokio::pin!(update);
    assert!(tokio::time::timeout(Duration::from_millis(50), &mut update)
        .await
        .is_err());
    let stored = mirror.find("tasks", Some(&Query::from(1i64))).unwrap().unwrap();
    assert_eq!(stored["title"], json!("a"));

    release.send(()).unwrap();
    update.await.unwrap();
    let stored = mirror.find("tasks", Some(&Query::from(1i64))).unwrap().unwrap();
    assert_eq!(stored["title"], json!("b"));
}

#[tokio::test(start_paused = true)]
async fn triggered_hooks_run_concurrently() {
    let calls = Arc::new(AtomicUsize::new(0));
    let slow_rule = |path: &str| {
        let counter = Arc::clone(&calls);
        FieldRule::new(path).after_update(move |_ctx| {
            let counter = Arc::clone(&counter);
            async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
    };
    let schema = schema().with_type(
        "tasks",
        TypeSchema::with_url("/tasks")
            .rule(slow_rule("title"))
            .rule(slow_rule("done")),
    );
    let (mirror, transport) = mirror_with(schema, SyncConfig::new(API));
    transport.respond(Method::Put, "http://api/tasks/1", 200, "");
    mirror
        .merge("tasks", json!({"id": 1, "title": "a", "done": false}), MergeOptions::default())
        .unwrap();

    let started = tokio::time::Instant::now();
    mirror
        .update("tasks", record(json!({"id": 1, "title": "b", "done": true})))
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(started.elapsed() < Duration::from_millis(150));
}

#[tokio::test]
async fn hooks_fire_on_create_and_local_update() {
    let seen = Arc::new(StdMutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let schema = schema().with_type(
        "tasks",
        TypeSchema::with_url("/tasks").rule(FieldRule::new("status").after_update(move |ctx| {
            log.lock().unwrap().push(ctx.record["status"].clone());
            async { Ok(()) }
        })),
    );
    let (mirror, transport) = mirror_with(schema, SyncConfig::new(API));
    transport.respond(Method::Post, "http://api/tasks", 201, r#"{"id": 5, "status": "open"}"#);

    mirror
        .create("tasks", record(json!({"title": "a"})), CreateOptions::persist())
        .await
        .unwrap();
    let mut draft = mirror
        .create("tasks", record(json!({"title": "b", "status": "new"})), CreateOptions::local())
        .await
        .unwrap();
    draft.insert("status".into(), json!("draft"));
    mirror.update("tasks", draft).await.unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![json!("open"), json!("draft")]);
    assert!(transport
        .requests()
        .iter()
        .all(|request| request.method == Method::Post));
}

// ── Relations ───────────────────────────────────────────────────

#[tokio::test]
async fn expand_prefers_store_and_falls_back_to_fetch() {
    let (mirror, transport) = mirror();
    mirror
        .merge("tags", json!([{"id": "a", "label": "A"}, {"id": "c", "label": "C"}]), MergeOptions::default())
        .unwrap();
    transport.respond(Method::Get, "http://api/users/4", 200, r#"{"id": 4, "name": "ann"}"#);
    transport.respond(Method::Get, "http://api/tags/b", 200, "[]");

    let task = record(json!({"id": 1, "owner": 4, "tags": ["c", "b", "a"]}));
    let expanded = mirror
        .expand("tasks", &task, ExpandOptions::new())
        .await
        .unwrap();

    assert_eq!(expanded["owner"], json!({"id": 4, "name": "ann"}));
    assert_eq!(
        expanded["tags"],
        json!([{"id": "c", "label": "C"}, null, {"id": "a", "label": "A"}])
    );
    assert_eq!(transport.request_count(Method::Get, "http://api/users/4"), 1);
    assert_eq!(transport.requests().len(), 2);

    // the fetched user is now cached
    let again = mirror
        .expand("tasks", &task, ExpandOptions::new().only("owner"))
        .await
        .unwrap();
    assert_eq!(again["owner"]["name"], json!("ann"));
    assert_eq!(again["tags"], json!(["c", "b", "a"]));
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn expand_reports_failures_after_settling() {
    let (mirror, transport) = mirror();
    transport.respond(Method::Get, "http://api/users/4", 500, "");
    transport.respond(Method::Get, "http://api/tags/a", 200, r#"{"id": "a"}"#);

    let task = record(json!({"owner": 4, "tags": ["a"]}));
    let err = mirror
        .expand("tasks", &task, ExpandOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Transport { status: Some(500), .. }));
    // the successful lookup still landed in the store
    assert!(mirror.find("tags", Some(&Query::from("a"))).unwrap().is_some());
}

// ── Notifications ───────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn mutations_coalesce_into_one_notification() {
    let (mirror, _) = mirror();
    let rx = mirror.subscribe();

    mirror.merge("tags", json!({"id": 1}), MergeOptions::default()).unwrap();
    mirror.merge("tags", json!({"id": 2}), MergeOptions::default()).unwrap();
    mirror.merge("users", json!({"id": 1}), MergeOptions::silent()).unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    let names: Vec<String> = rx.try_iter().map(|e| e.name).collect();
    assert_eq!(names, vec!["change", "change:tags"]);
}

// ── Namespaces and persistence ──────────────────────────────────

#[tokio::test]
async fn namespace_switch_copies_and_refetches() {
    let (mirror, transport) = mirror();
    mirror
        .merge("users", json!([{"id": 1}, {"id": 2}]), MergeOptions::default())
        .unwrap();
    // marks boards as fetched even though base serves nothing
    mirror.fetch("boards", FetchOptions::new()).await.unwrap();
    transport.respond(Method::Get, "http://api/boards", 200, r#"[{"id": 9}]"#);

    let outcome = mirror
        .switch_namespace("tenant-1", &ScopeContext::new())
        .await
        .unwrap();
    assert!(outcome.first_activation);
    assert_eq!(outcome.refetch, vec!["boards".to_string()]);
    assert_eq!(mirror.active_namespace(), "tenant-1");
    assert_eq!(mirror.find_all("users", None).unwrap().len(), 2);
    assert_eq!(mirror.find_all("boards", None).unwrap().len(), 1);

    assert!(matches!(
        mirror.switch_namespace("base", &ScopeContext::new()).await,
        Err(SyncError::Core(CoreError::ReservedNamespace { .. }))
    ));
}

#[tokio::test]
async fn persistence_hydrates_and_mirrors() {
    let cache = Arc::new(MemoryCache::new());
    cache.set("base", "users", r#"[{"id": 1, "name": "zed"}]"#).unwrap();
    cache.set("tenant-1", "tags", r#"[{"id": "t"}]"#).unwrap();

    let transport = Arc::new(MockTransport::new());
    let config = SyncConfig::new(API).with_core(Config::new().persist(true));
    let mirror = Mirror::builder(schema(), config)
        .transport(transport)
        .cache(cache.clone())
        .build()
        .unwrap();

    assert_eq!(mirror.find_all("users", None).unwrap().len(), 1);

    mirror
        .merge("users", json!({"id": 2, "name": "amy"}), MergeOptions::default())
        .unwrap();
    assert!(mirror.notifier().flush("users"));
    let cached = mirror.get_cache("users").unwrap().unwrap();
    assert_eq!(cached.len(), 2);
    assert_eq!(cached[0]["name"], json!("amy"));

    mirror
        .switch_namespace("tenant-1", &ScopeContext::new())
        .await
        .unwrap();
    assert!(mirror.find("tags", Some(&Query::Key(Key::from("t")))).unwrap().is_some());
    assert_eq!(mirror.find_all("users", None).unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn switch_flushes_pending_changes_to_their_namespace() {
    let cache = Arc::new(MemoryCache::new());
    let config = SyncConfig::new(API).with_core(Config::new().persist(true));
    let mirror = Mirror::builder(schema(), config)
        .transport(Arc::new(MockTransport::new()))
        .cache(cache.clone())
        .build()
        .unwrap();

    mirror.switch_namespace("t1", &ScopeContext::new()).await.unwrap();
    mirror
        .create("drafts", record(json!({"body": "x"})), CreateOptions::local())
        .await
        .unwrap();
    mirror.switch_namespace("t2", &ScopeContext::new()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;

    let t1: Value = serde_json::from_str(&cache.get("t1", "drafts").unwrap().unwrap()).unwrap();
    assert_eq!(t1[0]["body"], json!("x"));
    assert_eq!(cache.get("t2", "drafts").unwrap(), None);
}

#[tokio::test]
async fn file_cache_survives_rebuild() {
    let dir = tempfile::tempdir().unwrap();
    let build = || {
        let cache: Arc<dyn CacheBackend> = Arc::new(FileCache::open(dir.path()).unwrap());
        Mirror::builder(schema(), SyncConfig::new(API).with_core(Config::new().persist(true)))
            .transport(Arc::new(MockTransport::new()))
            .cache(cache)
            .build()
            .unwrap()
    };

    let first = build();
    first
        .merge("tags", json!([{"id": "a"}, {"id": "b"}]), MergeOptions::default())
        .unwrap();
    assert!(first.notifier().flush("tags"));
    drop(first);

    let second = build();
    assert_eq!(second.find_all("tags", None).unwrap().len(), 2);
}

#[tokio::test]
async fn cache_access_without_backend() {
    let (mirror, _) = mirror();
    mirror.set_cache("users", &[record(json!({"id": 1}))]).unwrap();
    assert_eq!(mirror.get_cache("users").unwrap(), None);
    assert!(mirror.get_cache("nope").is_err());
}

#[tokio::test]
async fn unreadable_cache_entry_fails_hydration() {
    let cache = Arc::new(MemoryCache::new());
    cache.set("base", "users", "{not json").unwrap();
    let result = Mirror::builder(schema(), SyncConfig::new(API).with_core(Config::new().persist(true)))
        .transport(Arc::new(MockTransport::new()))
        .cache(cache)
        .build();
    assert!(matches!(
        result,
        Err(SyncError::Core(CoreError::MalformedResponse { .. }))
    ));
}
