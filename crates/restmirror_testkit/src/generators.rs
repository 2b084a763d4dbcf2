//! Property-based test generators using proptest.
//!
//! Identities and temporary keys are drawn from small ranges so that
//! generated operations collide often enough to exercise replacement,
//! promotion and pruning.

use proptest::prelude::*;
use restmirror_core::Record;
use serde_json::{json, Value};

/// Strategy for server identities, as numbers.
pub fn identity_strategy() -> impl Strategy<Value = u32> {
    1u32..16
}

/// Strategy for temporary key suffixes.
pub fn temp_strategy() -> impl Strategy<Value = u32> {
    1u32..8
}

/// Strategy for type names accepted by the schema registry and caches.
pub fn type_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,15}").expect("Invalid regex")
}

/// Strategy for scalar attribute values.
pub fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        (-1000i64..1000).prop_map(Value::from),
        "[a-zA-Z ]{0,12}".prop_map(Value::String),
        Just(Value::Null),
    ]
}

/// Strategy for records carrying an identity and a few attributes.
pub fn record_strategy() -> impl Strategy<Value = Record> {
    (
        identity_strategy(),
        "[a-z]{1,8}",
        prop::collection::btree_map("[a-z]{1,6}", scalar_strategy(), 0..4),
    )
        .prop_map(|(id, title, extra)| {
            let mut record = Record::new();
            record.extend(extra);
            record.insert("id".into(), json!(id));
            record.insert("title".into(), Value::String(title));
            record
        })
}

/// One operation against a single-type store.
#[derive(Debug, Clone)]
pub enum StoreOperation {
    /// Merge a record with an identity.
    Upsert {
        /// The record.
        record: Record,
    },
    /// Merge a record carrying only the temporary key `t<temp>`.
    Local {
        /// Temporary key suffix.
        temp: u32,
        /// Title attribute.
        title: String,
    },
    /// Merge a record carrying both `t<temp>` and an identity.
    Promote {
        /// Temporary key suffix.
        temp: u32,
        /// Assigned identity.
        id: u32,
    },
    /// Delete by identity.
    Delete {
        /// Identity.
        id: u32,
    },
    /// Merge a full list and prune everything else.
    FullList {
        /// Identities in the list.
        ids: Vec<u32>,
    },
}

/// Strategy for store operations.
pub fn store_operation_strategy() -> impl Strategy<Value = StoreOperation> {
    prop_oneof![
        4 => record_strategy().prop_map(|record| StoreOperation::Upsert { record }),
        3 => (temp_strategy(), "[a-z]{1,8}")
            .prop_map(|(temp, title)| StoreOperation::Local { temp, title }),
        2 => (temp_strategy(), identity_strategy())
            .prop_map(|(temp, id)| StoreOperation::Promote { temp, id }),
        2 => identity_strategy().prop_map(|id| StoreOperation::Delete { id }),
        1 => prop::collection::vec(identity_strategy(), 0..6)
            .prop_map(|ids| StoreOperation::FullList { ids }),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<StoreOperation>> {
    prop::collection::vec(store_operation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
