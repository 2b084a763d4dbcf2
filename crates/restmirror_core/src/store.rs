//! Entity store for merge, delete and query operations.
//!
//! One [`EntityStore`] holds every type's records for a single namespace.
//! Each type maps keys to records; a key is either the record's temporary
//! key or its identity, never both as separate entries.

use crate::error::{CoreError, CoreResult};
use crate::query::Query;
use crate::record::{
    identity_of, local_key_of, matches, sort_text, start_case, Key, Record,
};
use crate::schema::{Schema, TypeSchema};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Input accepted by [`EntityStore::merge`].
#[derive(Debug, Clone)]
pub enum Payload {
    /// Raw response text, decoded as JSON.
    Text(String),
    /// Already-decoded JSON: a record, an array or an envelope.
    Json(Value),
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<Record> for Payload {
    fn from(record: Record) -> Self {
        Self::Json(Value::Object(record))
    }
}

impl From<Vec<Record>> for Payload {
    fn from(records: Vec<Record>) -> Self {
        Self::Json(Value::Array(
            records.into_iter().map(Value::Object).collect(),
        ))
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Options for a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Suppress the change notification.
    pub silent: bool,
    /// Treat the payload as the full list and delete identities not in it.
    pub prune_missing: bool,
}

impl MergeOptions {
    /// Options for a silent merge.
    pub const fn silent() -> Self {
        Self {
            silent: true,
            prune_missing: false,
        }
    }

    /// Options for a full-list merge.
    pub const fn full_list() -> Self {
        Self {
            silent: false,
            prune_missing: true,
        }
    }
}

/// Records produced by a merge.
#[derive(Debug, Clone, PartialEq)]
pub enum Merged {
    /// Exactly one record was processed.
    One(Record),
    /// Zero or several records were processed.
    Many(Vec<Record>),
}

impl Merged {
    /// Returns the records as a vector.
    pub fn into_vec(self) -> Vec<Record> {
        match self {
            Self::One(record) => vec![record],
            Self::Many(records) => records,
        }
    }

    /// Returns the single record, or the first of many.
    pub fn into_first(self) -> Option<Record> {
        self.into_vec().into_iter().next()
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(records) => records.len(),
        }
    }

    /// Returns true if no record was processed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Converts to JSON: an object for one record, an array otherwise.
    pub fn into_value(self) -> Value {
        match self {
            Self::One(record) => Value::Object(record),
            Self::Many(records) => Value::Array(records.into_iter().map(Value::Object).collect()),
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    seq: u64,
    record: Record,
}

/// Records of one type, keyed by temporary key or identity.
///
/// Iteration follows insertion order; a promoted record keeps its slot.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    slots: HashMap<Key, Slot>,
    next_seq: u64,
}

impl Collection {
    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the collection holds nothing.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the record stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Record> {
        self.slots.get(key).map(|slot| &slot.record)
    }

    /// Returns true if `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    /// Returns the keys in insertion order.
    pub fn keys(&self) -> Vec<Key> {
        let mut keyed: Vec<_> = self.slots.iter().map(|(k, s)| (s.seq, k)).collect();
        keyed.sort_unstable_by_key(|(seq, _)| *seq);
        keyed.into_iter().map(|(_, k)| k.clone()).collect()
    }

    /// Returns the records in insertion order.
    pub fn records(&self) -> Vec<&Record> {
        let mut slots: Vec<&Slot> = self.slots.values().collect();
        slots.sort_unstable_by_key(|slot| slot.seq);
        slots.into_iter().map(|slot| &slot.record).collect()
    }

    fn put(&mut self, key: Key, record: Record, seq: Option<u64>) {
        let seq = seq.unwrap_or_else(|| {
            let seq = self.next_seq;
            self.next_seq += 1;
            seq
        });
        self.slots.insert(key, Slot { seq, record });
    }

    fn take(&mut self, key: &str) -> Option<Slot> {
        self.slots.remove(key)
    }
}

/// Per-namespace mapping from type name to records.
#[derive(Debug, Clone)]
pub struct EntityStore {
    identity_field: String,
    types: BTreeMap<String, Collection>,
}

impl EntityStore {
    /// Creates an empty store.
    ///
    /// `identity_field` is used for types whose schema does not override it.
    pub fn new(identity_field: impl Into<String>) -> Self {
        Self {
            identity_field: identity_field.into(),
            types: BTreeMap::new(),
        }
    }

    /// Returns the store-wide identity attribute.
    pub fn identity_field(&self) -> &str {
        &self.identity_field
    }

    /// Merges records into a type.
    ///
    /// Accepts a record, an array of records or a response envelope, either
    /// decoded or as raw text. A record carrying an identity replaces any
    /// entry under its temporary key in the same step.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownType`] for undeclared types and
    /// [`CoreError::MalformedResponse`] for undecodable text.
    pub fn merge(
        &mut self,
        schema: &Schema,
        type_name: &str,
        payload: impl Into<Payload>,
        options: MergeOptions,
    ) -> CoreResult<Merged> {
        let type_schema = schema.get(type_name)?;
        let identity_field = type_schema.identity_or(&self.identity_field).to_string();
        let items = normalize(type_name, type_schema, payload.into())?;

        let collection = self.types.entry(type_name.to_string()).or_default();
        let mut processed = Vec::with_capacity(items.len());
        let mut incoming: HashSet<Key> = HashSet::new();

        for item in items {
            let Value::Object(record) = item else {
                tracing::warn!(type_name, "skipping non-object element in merge payload");
                continue;
            };
            let identity = identity_of(&record, &identity_field);
            let local = local_key_of(&record);

            match (identity, local) {
                (Some(identity), local) => {
                    let promoted = local
                        .filter(|local| *local != identity)
                        .and_then(|local| collection.take(local.as_str()));
                    let seq = promoted
                        .map(|slot| slot.seq)
                        .or_else(|| collection.slots.get(identity.as_str()).map(|s| s.seq));
                    incoming.insert(identity.clone());
                    collection.put(identity, record.clone(), seq);
                }
                (None, Some(local)) => {
                    let seq = collection.slots.get(local.as_str()).map(|s| s.seq);
                    collection.put(local, record.clone(), seq);
                }
                (None, None) => {
                    tracing::warn!(
                        type_name,
                        identity_field = identity_field.as_str(),
                        "record has neither identity nor temporary key; not stored"
                    );
                }
            }
            processed.push(record);
        }

        if options.prune_missing {
            let before = collection.len();
            collection.slots.retain(|_, slot| {
                identity_of(&slot.record, &identity_field)
                    .map_or(true, |identity| incoming.contains(&identity))
            });
            let pruned = before - collection.len();
            if pruned > 0 {
                tracing::debug!(type_name, pruned, "pruned records missing from full list");
            }
        }

        Ok(if processed.len() == 1 {
            Merged::One(processed.remove(0))
        } else {
            Merged::Many(processed)
        })
    }

    /// Removes the entry stored under `key`. Idempotent.
    pub fn delete(&mut self, type_name: &str, key: &Key) -> Option<Record> {
        self.types
            .get_mut(type_name)
            .and_then(|collection| collection.take(key.as_str()))
            .map(|slot| slot.record)
    }

    /// Returns the record stored under `key`.
    pub fn get(&self, type_name: &str, key: &Key) -> Option<&Record> {
        self.types.get(type_name)?.get(key.as_str())
    }

    /// Finds one record.
    ///
    /// A key query is a direct lookup; a match query returns the first
    /// record in insertion order whose attributes are a superset.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownType`] for undeclared types.
    pub fn find(
        &self,
        schema: &Schema,
        type_name: &str,
        query: Option<&Query>,
    ) -> CoreResult<Option<Record>> {
        schema.get(type_name)?;
        let Some(query) = query else {
            return Ok(None);
        };
        let Some(collection) = self.types.get(type_name) else {
            return Ok(None);
        };
        Ok(match query {
            Query::Key(key) => collection.get(key.as_str()).cloned(),
            Query::Match(pattern) => collection
                .records()
                .into_iter()
                .find(|record| matches(record, pattern))
                .cloned(),
        })
    }

    /// Finds every matching record, ordered by the type's `order_by`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownType`] for undeclared types and
    /// [`CoreError::InvalidQuery`] for key queries.
    pub fn find_all(
        &self,
        schema: &Schema,
        type_name: &str,
        query: Option<&Query>,
    ) -> CoreResult<Vec<Record>> {
        let type_schema = schema.get(type_name)?;
        let pattern = match query {
            None => None,
            Some(Query::Match(pattern)) => Some(pattern),
            Some(Query::Key(key)) => {
                return Err(CoreError::invalid_query(format!(
                    "find_all expects an attribute match, got key {key:?}"
                )))
            }
        };
        let Some(collection) = self.types.get(type_name) else {
            return Ok(Vec::new());
        };

        let mut found: Vec<Record> = collection
            .records()
            .into_iter()
            .filter(|record| pattern.map_or(true, |p| matches(record, p)))
            .cloned()
            .collect();

        if let Some(order) = type_schema.ordering() {
            found.sort_by_cached_key(|record| sort_text(record.get(&order.field)));
            // ties reverse along with everything else
            if order.descending {
                found.reverse();
            }
        }
        Ok(found)
    }

    /// Returns the number of records of a type.
    pub fn len(&self, type_name: &str) -> usize {
        self.types.get(type_name).map_or(0, Collection::len)
    }

    /// Returns true if the type holds no records.
    pub fn is_empty(&self, type_name: &str) -> bool {
        self.len(type_name) == 0
    }

    /// Returns the names of types that hold at least one record.
    pub fn types(&self) -> Vec<String> {
        self.types
            .iter()
            .filter(|(_, c)| !c.is_empty())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Returns a type's collection.
    pub fn collection(&self, type_name: &str) -> Option<&Collection> {
        self.types.get(type_name)
    }

    /// Replaces a type's collection wholesale.
    pub fn set_collection(&mut self, type_name: &str, collection: Collection) {
        self.types.insert(type_name.to_string(), collection);
    }

    /// Empties a type.
    pub fn clear_type(&mut self, type_name: &str) {
        self.types.remove(type_name);
    }

    /// Returns a type's records in insertion order.
    pub fn snapshot_type(&self, type_name: &str) -> Vec<Record> {
        self.types
            .get(type_name)
            .map(|c| c.records().into_iter().cloned().collect())
            .unwrap_or_default()
    }
}

fn normalize(type_name: &str, type_schema: &TypeSchema, payload: Payload) -> CoreResult<Vec<Value>> {
    let value = match payload {
        Payload::Json(value) => value,
        Payload::Text(text) => serde_json::from_str(&text)?,
    };
    let value = unwrap_envelope(type_name, value);

    Ok(match value {
        Value::Array(items) => items,
        other => match &type_schema.parse {
            Some(parse) => match parse(other) {
                Value::Array(items) => items,
                single => vec![single],
            },
            None => vec![other],
        },
    })
}

fn unwrap_envelope(type_name: &str, value: Value) -> Value {
    let Value::Object(mut map) = value else {
        return value;
    };
    if let Some(inner) = map.remove(type_name) {
        return inner;
    }
    let title = start_case(type_name);
    if let Some(inner) = map.remove(&title) {
        return inner;
    }
    Value::Object(map)
}
