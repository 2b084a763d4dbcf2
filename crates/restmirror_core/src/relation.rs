//! Relation resolution.
//!
//! Outbound, [`reduce`] replaces embedded related objects by their
//! identities before a record is sent. Inbound, [`plan`] lists the
//! identities a record refers to and [`assemble`] writes the resolved
//! objects back in place. Resolution itself (store lookup, remote fallback)
//! belongs to the caller.

use crate::record::{Key, Record};
use crate::schema::{RelationKind, Schema, TypeSchema};
use serde_json::Value;

/// Replaces related objects by their identities.
///
/// `one_to_many` arrays are mapped element-wise (objects become their
/// identity, scalars are kept). A `foreign_key` array is reduced to its
/// first element's identity and a `foreign_key` object to its identity.
/// Missing, null and scalar attributes pass through unchanged.
pub fn reduce(schema: &Schema, type_schema: &TypeSchema, default_identity: &str, record: &mut Record) {
    for (attr, target) in &type_schema.one_to_many {
        let identity_field = target_identity(schema, target, default_identity);
        if let Some(Value::Array(items)) = record.get_mut(attr) {
            for item in items.iter_mut() {
                if let Value::Object(obj) = item {
                    *item = obj.get(identity_field).cloned().unwrap_or(Value::Null);
                }
            }
        }
    }

    for (attr, target) in &type_schema.foreign_key {
        let identity_field = target_identity(schema, target, default_identity);
        let Some(value) = record.get_mut(attr) else {
            continue;
        };
        let reduced = match value {
            Value::Array(items) => match items.first() {
                Some(Value::Object(obj)) => obj.get(identity_field).cloned().unwrap_or(Value::Null),
                Some(scalar) => scalar.clone(),
                None => continue,
            },
            Value::Object(obj) => obj.get(identity_field).cloned().unwrap_or(Value::Null),
            _ => continue,
        };
        *value = reduced;
    }
}

/// One relation attribute awaiting resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationRef {
    /// Attribute on the source record.
    pub attr: String,
    /// Related type name.
    pub target: String,
    /// Whether the attribute holds one identity or several.
    pub kind: RelationKind,
    /// Identities in attribute order; `None` for values that are not keys.
    pub identities: Vec<Option<Key>>,
}

/// Lists the relation attributes of `record` that need resolving.
///
/// Only attributes present and non-null are listed. With `only`, attributes
/// outside the filter are ignored. Objects contribute their identity,
/// scalars themselves.
pub fn plan(
    schema: &Schema,
    type_schema: &TypeSchema,
    default_identity: &str,
    record: &Record,
    only: Option<&[&str]>,
) -> Vec<RelationRef> {
    type_schema
        .relations()
        .into_iter()
        .filter(|(attr, _, _)| only.map_or(true, |only| only.contains(attr)))
        .filter_map(|(attr, target, kind)| {
            let value = record.get(attr).filter(|v| !v.is_null())?;
            let identity_field = target_identity(schema, target, default_identity);
            let to_key = |v: &Value| match v {
                Value::Object(obj) => obj.get(identity_field).and_then(Key::from_value),
                other => Key::from_value(other),
            };
            let identities = match value {
                Value::Array(items) => items.iter().map(to_key).collect(),
                single => vec![to_key(single)],
            };
            Some(RelationRef {
                attr: attr.to_string(),
                target: target.to_string(),
                kind,
                identities,
            })
        })
        .collect()
}

/// Writes resolved relations into a copy of `record`.
///
/// `resolved[i]` holds the results for `refs[i]`, index-aligned with its
/// identities. Foreign keys become a single object (or null), one-to-many
/// attributes an array in identity order.
pub fn assemble(record: &Record, refs: &[RelationRef], resolved: Vec<Vec<Option<Record>>>) -> Record {
    let mut expanded = record.clone();
    for (relation, results) in refs.iter().zip(resolved) {
        let value = match relation.kind {
            RelationKind::ForeignKey => results
                .into_iter()
                .next()
                .flatten()
                .map_or(Value::Null, Value::Object),
            RelationKind::OneToMany => Value::Array(
                results
                    .into_iter()
                    .map(|r| r.map_or(Value::Null, Value::Object))
                    .collect(),
            ),
        };
        expanded.insert(relation.attr.clone(), value);
    }
    expanded
}

fn target_identity<'a>(schema: &'a Schema, target: &str, default_identity: &'a str) -> &'a str {
    schema
        .get(target)
        .map_or(default_identity, |t| t.identity_or(default_identity))
}
