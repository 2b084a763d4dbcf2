//! Records, keys and attribute helpers.
//!
//! A record is an open-ended JSON object. Three attributes are reserved:
//! the identity field (server-assigned, name configurable per type),
//! [`LOCAL_CREATE_TIME`] (client-assigned temporary key) and [`URL_ATTR`]
//! (direct resource link).

use serde_json::{Map, Value};
use std::borrow::Borrow;
use std::fmt;

/// An entity record.
pub type Record = Map<String, Value>;

/// Attribute holding the client-assigned temporary key.
pub const LOCAL_CREATE_TIME: &str = "localCreateTime";

/// Attribute holding a direct resource link.
pub const URL_ATTR: &str = "url";

/// The string form of a key value.
///
/// Strings are used as-is and numbers via their decimal text, so the
/// identity `7` and the identity `"7"` address the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    /// Creates a key from its text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Converts a JSON value into a key.
    ///
    /// Returns `None` for anything other than a string or a number.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    /// Returns the key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl From<u64> for Key {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

/// Returns the record's identity key, if it carries a usable one.
pub fn identity_of(record: &Record, identity_field: &str) -> Option<Key> {
    record.get(identity_field).and_then(Key::from_value)
}

/// Returns the record's temporary key, if any.
pub fn local_key_of(record: &Record) -> Option<Key> {
    record.get(LOCAL_CREATE_TIME).and_then(Key::from_value)
}

/// Resolves a dotted attribute path such as `"address.city"`.
pub fn value_at_path<'a>(record: &'a Record, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = record.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Returns true if every attribute of `query` is present in `record` with a
/// matching value.
pub fn matches(record: &Record, query: &Record) -> bool {
    query.iter().all(|(attr, expected)| {
        record
            .get(attr)
            .is_some_and(|actual| value_matches(actual, expected))
    })
}

/// Partial-object comparison.
///
/// Objects in the pattern match recursively as subsets; everything else
/// compares for equality, with numbers compared numerically.
pub fn value_matches(actual: &Value, pattern: &Value) -> bool {
    match (actual, pattern) {
        (Value::Object(actual), Value::Object(pattern)) => matches(actual, pattern),
        (Value::Number(a), Value::Number(b)) => a == b || a.as_f64() == b.as_f64(),
        _ => actual == pattern,
    }
}

/// Text used to order records: strings without quotes, missing or null
/// values as the empty string, lowercased.
pub fn sort_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.to_lowercase(),
        Some(other) => other.to_string().to_lowercase(),
    }
}

/// Converts an identifier to space-separated capitalized words.
///
/// `"tasks"` becomes `"Tasks"`, `"taskLists"` and `"task_lists"` become
/// `"Task Lists"`.
pub fn start_case(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in name.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
