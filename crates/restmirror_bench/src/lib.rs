//! Benchmark utilities.

use rand::distributions::Alphanumeric;
use rand::Rng;
use restmirror_core::{Record, Schema, TypeSchema};
use serde_json::{json, Value};

/// Schema with one unordered and one ordered type.
pub fn bench_schema() -> Schema {
    Schema::new()
        .with_type("items", TypeSchema::with_url("/items"))
        .with_type("sorted", TypeSchema::with_url("/sorted").order_by("name"))
}

/// Generate a random lowercase-and-uppercase name.
pub fn random_name(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generate `count` records with identities `0..count`.
pub fn generate_records(count: usize) -> Vec<Record> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|id| {
            let value = json!({
                "id": id,
                "name": random_name(12),
                "done": rng.gen_bool(0.5),
                "rank": rng.gen_range(0..1000),
            });
            match value {
                Value::Object(map) => map,
                _ => unreachable!("object literal"),
            }
        })
        .collect()
}

/// Generate `count` records as one JSON array.
pub fn generate_payload(count: usize) -> Value {
    Value::Array(generate_records(count).into_iter().map(Value::Object).collect())
}
