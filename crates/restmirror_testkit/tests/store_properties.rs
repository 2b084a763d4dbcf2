//! Property tests for the entity store.

use proptest::prelude::*;
use restmirror_core::{EntityStore, MergeOptions, Query, Schema, TypeSchema};
use restmirror_testkit::prelude::*;
use serde_json::Value;

proptest! {
    #![proptest_config(PropTestConfig::default().to_proptest_config())]

    /// Any operation sequence leaves the store equal to the model, with
    /// every record under exactly one key.
    #[test]
    fn store_matches_model(ops in operation_sequence_strategy(1, 60)) {
        let mut harness = StoreHarness::new();
        for op in &ops {
            harness.apply(op);
        }
        harness.verify();
    }

    /// Ordered types come back sorted case-insensitively, whatever the
    /// merge order.
    #[test]
    fn ordered_find_all_is_sorted(records in prop::collection::vec(record_strategy(), 0..30)) {
        let schema = Schema::new().with_type("items", TypeSchema::with_url("/items").order_by("title"));
        let mut store = EntityStore::new("id");
        for record in records {
            store.merge(&schema, "items", record, MergeOptions::silent()).unwrap();
        }

        let titles: Vec<String> = store
            .find_all(&schema, "items", None)
            .unwrap()
            .into_iter()
            .map(|r| r["title"].as_str().unwrap_or_default().to_lowercase())
            .collect();
        let mut sorted = titles.clone();
        sorted.sort();
        prop_assert_eq!(titles, sorted);
    }

    /// A match query never returns records that disagree with it.
    #[test]
    fn match_query_filters(
        records in prop::collection::vec(record_strategy(), 0..30),
        title in "[a-z]{1,2}",
    ) {
        let schema = Schema::new().with_type("items", TypeSchema::with_url("/items"));
        let mut store = EntityStore::new("id");
        store
            .merge(&schema, "items", Value::Array(records.into_iter().map(Value::Object).collect()), MergeOptions::silent())
            .unwrap();

        let query = Query::by("title", title.clone());
        for found in store.find_all(&schema, "items", Some(&query)).unwrap() {
            prop_assert_eq!(found["title"].as_str(), Some(title.as_str()));
        }
    }
}

#[test]
fn descending_order_reverses_ties() {
    let schema = Schema::new().with_type("items", TypeSchema::with_url("/items").order_by("-title"));
    let mut store = EntityStore::new("id");
    for (id, title) in [(1, "b"), (2, "a"), (3, "B"), (4, "c")] {
        let record = record(serde_json::json!({"id": id, "title": title}));
        store.merge(&schema, "items", record, MergeOptions::silent()).unwrap();
    }
    let ids: Vec<Value> = store
        .find_all(&schema, "items", None)
        .unwrap()
        .into_iter()
        .map(|r| r["id"].clone())
        .collect();
    assert_eq!(ids, vec![Value::from(4), Value::from(3), Value::from(1), Value::from(2)]);
}
