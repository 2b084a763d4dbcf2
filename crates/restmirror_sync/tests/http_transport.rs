//! Flows against a local HTTP server through the `reqwest` transport.

#![cfg(feature = "http")]

use restmirror_core::{Query, Record, Schema, TypeSchema};
use restmirror_sync::{
    CreateOptions, FetchOptions, HttpRequest, HttpTransport, Method, Mirror, SyncConfig,
    SyncError, Transport,
};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn schema() -> Schema {
    Schema::new()
        .with_type("tasks", TypeSchema::with_url("/tasks"))
        .with_type("users", TypeSchema::with_url("/users"))
}

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

async fn mirror(server: &MockServer) -> Mirror {
    let config = SyncConfig::new(server.uri())
        .with_header("X-Client", "restmirror")
        .with_timeout(Duration::from_secs(5));
    Mirror::builder(schema(), config).build().unwrap()
}

#[tokio::test]
async fn fetch_sends_headers_and_querystring() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(query_param("done", "false"))
        .and(header("X-Client", "restmirror"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "done": false},
            {"id": 2, "done": false}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mirror = mirror(&server).await;
    let merged = mirror
        .fetch("tasks", FetchOptions::new().param("done", false))
        .await
        .unwrap();
    assert_eq!(merged.len(), 2);
    assert_eq!(
        mirror
            .find_all("tasks", Some(&Query::by("done", false)))
            .unwrap()
            .len(),
        2
    );
}

#[tokio::test]
async fn create_posts_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tasks"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"title": "write docs"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 42})))
        .expect(1)
        .mount(&server)
        .await;

    let mirror = mirror(&server).await;
    let saved = mirror
        .create(
            "tasks",
            record(json!({"title": "write docs"})),
            CreateOptions::persist(),
        )
        .await
        .unwrap();
    assert_eq!(saved["id"], json!(42));
    assert!(mirror.find("tasks", Some(&Query::from(42i64))).unwrap().is_some());
}

#[tokio::test]
async fn update_and_remove_address_the_resource() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/users/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/users/7"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mirror = mirror(&server).await;
    let user = record(json!({"id": 7, "name": "ann"}));
    mirror.update("users", user.clone()).await.unwrap();
    assert!(mirror.find("users", Some(&Query::from(7i64))).unwrap().is_some());

    mirror.remove("users", &user).await.unwrap();
    assert!(mirror.find("users", Some(&Query::from(7i64))).unwrap().is_none());
}

#[tokio::test]
async fn error_message_from_failed_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"errorMessage": "bad filter"})),
        )
        .mount(&server)
        .await;

    let mirror = mirror(&server).await;
    let err = mirror.fetch("tasks", FetchOptions::new()).await.unwrap_err();
    match err {
        SyncError::Transport { status, message } => {
            assert_eq!(status, Some(422));
            assert_eq!(message, "bad filter");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn transport_reports_raw_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/raw"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
    let response = transport
        .send(HttpRequest::new(Method::Get, format!("{}/raw", server.uri())))
        .await
        .unwrap();
    assert_eq!(response.status, 503);
    assert_eq!(response.body, "down");
    assert!(!response.is_success());
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let transport = HttpTransport::new(Duration::from_secs(2)).unwrap();
    let err = transport
        .send(HttpRequest::new(Method::Get, format!("{uri}/tasks")))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Transport { status: None, .. }));
    assert!(err.is_retryable());
}
