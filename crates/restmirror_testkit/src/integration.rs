//! Cross-crate integration test helpers.
//!
//! [`StoreHarness`] applies [`StoreOperation`]s to a real
//! [`EntityStore`] and to a simple model of it, then checks that both
//! agree on contents, keys and order.

use crate::generators::StoreOperation;
use restmirror_core::record::{identity_of, local_key_of};
use restmirror_core::{EntityStore, Key, MergeOptions, Record, Schema, TypeSchema};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};

/// Type name used by the harness.
pub const HARNESS_TYPE: &str = "items";

/// Model entry: insertion sequence and record.
type ModelSlot = (u64, Record);

/// A store plus a model tracking what it should contain.
pub struct StoreHarness {
    schema: Schema,
    /// The store under test.
    pub store: EntityStore,
    model: BTreeMap<String, ModelSlot>,
    next_seq: u64,
}

impl StoreHarness {
    /// Creates a harness over an empty store.
    pub fn new() -> Self {
        Self {
            schema: Schema::new().with_type(HARNESS_TYPE, TypeSchema::with_url("/items")),
            store: EntityStore::new("id"),
            model: BTreeMap::new(),
            next_seq: 0,
        }
    }

    /// Temporary key for a suffix.
    pub fn temp_key(temp: u32) -> String {
        format!("t{temp}")
    }

    /// Applies one operation to the store and the model.
    pub fn apply(&mut self, op: &StoreOperation) {
        match op {
            StoreOperation::Upsert { record } => {
                self.merge(Value::Object(record.clone()), false);
                self.model_put(record.clone(), None);
            }
            StoreOperation::Local { temp, title } => {
                let record = object(json!({"localCreateTime": Self::temp_key(*temp), "title": title}));
                self.merge(Value::Object(record.clone()), false);
                self.model_put(record, None);
            }
            StoreOperation::Promote { temp, id } => {
                let temp_key = Self::temp_key(*temp);
                let record = object(json!({"id": id, "localCreateTime": temp_key, "title": "promoted"}));
                self.merge(Value::Object(record.clone()), false);
                let promoted = self.model.remove(&temp_key).map(|(seq, _)| seq);
                self.model_put(record, promoted);
            }
            StoreOperation::Delete { id } => {
                self.store.delete(HARNESS_TYPE, &Key::from(u64::from(*id)));
                self.model.remove(&id.to_string());
            }
            StoreOperation::FullList { ids } => {
                let items: Vec<Value> = ids.iter().map(|id| json!({"id": id})).collect();
                self.merge(Value::Array(items.clone()), true);
                for item in items {
                    self.model_put(object(item), None);
                }
                let keep: HashSet<String> = ids.iter().map(u32::to_string).collect();
                self.model.retain(|_, (_, record)| match identity_of(record, "id") {
                    Some(identity) => keep.contains(identity.as_str()),
                    None => true,
                });
            }
        }
    }

    /// Asserts that the store matches the model.
    ///
    /// # Panics
    ///
    /// Panics on the first mismatch.
    pub fn verify(&self) {
        let mut expected: Vec<&ModelSlot> = self.model.values().collect();
        expected.sort_by_key(|(seq, _)| *seq);
        let expected: Vec<&Record> = expected.into_iter().map(|(_, record)| record).collect();

        let actual = self
            .store
            .find_all(&self.schema, HARNESS_TYPE, None)
            .expect("find_all failed");
        assert_eq!(actual.len(), expected.len(), "record count mismatch");
        for (actual, expected) in actual.iter().zip(expected) {
            assert_eq!(actual, expected, "record mismatch");
        }

        if let Some(collection) = self.store.collection(HARNESS_TYPE) {
            for key in collection.keys() {
                let record = collection.get(key.as_str()).expect("listed key is stored");
                if let Some(identity) = identity_of(record, "id") {
                    assert_eq!(identity, key, "record {identity} stored under {key}");
                }
            }
        }
    }

    /// Returns the number of records the model expects.
    pub fn tracked_count(&self) -> usize {
        self.model.len()
    }

    fn merge(&mut self, payload: Value, prune_missing: bool) {
        let options = MergeOptions {
            silent: true,
            prune_missing,
        };
        self.store
            .merge(&self.schema, HARNESS_TYPE, payload, options)
            .expect("merge failed");
    }

    fn model_put(&mut self, record: Record, promoted_seq: Option<u64>) {
        let key = identity_of(&record, "id")
            .or_else(|| local_key_of(&record))
            .expect("model records always carry a key");
        let seq = promoted_seq
            .or_else(|| self.model.get(key.as_str()).map(|(seq, _)| *seq))
            .unwrap_or_else(|| {
                let seq = self.next_seq;
                self.next_seq += 1;
                seq
            });
        self.model.insert(key.as_str().to_string(), (seq, record));
    }
}

impl Default for StoreHarness {
    fn default() -> Self {
        Self::new()
    }
}

fn object(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => unreachable!("harness records are object literals"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotion_keeps_position() {
        let mut harness = StoreHarness::new();
        harness.apply(&StoreOperation::Local {
            temp: 1,
            title: "a".into(),
        });
        harness.apply(&StoreOperation::Upsert {
            record: object(json!({"id": 5, "title": "b"})),
        });
        harness.apply(&StoreOperation::Promote { temp: 1, id: 9 });
        harness.verify();

        let titles: Vec<Value> = harness
            .store
            .find_all(&harness.schema, HARNESS_TYPE, None)
            .unwrap()
            .into_iter()
            .map(|r| r["title"].clone())
            .collect();
        assert_eq!(titles, vec![json!("promoted"), json!("b")]);
    }

    #[test]
    fn full_list_spares_temporary_records() {
        let mut harness = StoreHarness::new();
        harness.apply(&StoreOperation::Local {
            temp: 2,
            title: "draft".into(),
        });
        harness.apply(&StoreOperation::FullList { ids: vec![1, 2] });
        harness.apply(&StoreOperation::FullList { ids: vec![2] });
        harness.verify();
        assert_eq!(harness.tracked_count(), 2);
    }
}
