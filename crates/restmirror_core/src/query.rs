//! Query arguments for `find` and `find_all`.

use crate::error::{CoreError, CoreResult};
use crate::record::{Key, Record};
use serde_json::Value;

/// A lookup against one type's records.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Direct lookup by temporary key or identity.
    Key(Key),
    /// Superset match against record attributes.
    Match(Record),
}

impl Query {
    /// Interprets a dynamic JSON argument.
    ///
    /// `null` means "no query". Strings and numbers are key lookups, objects
    /// are attribute matches.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidQuery`] for booleans and arrays.
    pub fn from_value(value: &Value) -> CoreResult<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::String(_) | Value::Number(_) => Ok(Key::from_value(value).map(Self::Key)),
            Value::Object(map) => Ok(Some(Self::Match(map.clone()))),
            Value::Bool(_) => Err(CoreError::invalid_query("boolean is not a query")),
            Value::Array(_) => Err(CoreError::invalid_query("array is not a query")),
        }
    }

    /// Builds a single-attribute match.
    pub fn by(attr: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut map = Record::new();
        map.insert(attr.into(), value.into());
        Self::Match(map)
    }
}

impl From<Key> for Query {
    fn from(key: Key) -> Self {
        Self::Key(key)
    }
}

impl From<&str> for Query {
    fn from(key: &str) -> Self {
        Self::Key(Key::from(key))
    }
}

impl From<i64> for Query {
    fn from(key: i64) -> Self {
        Self::Key(Key::from(key))
    }
}

impl From<Record> for Query {
    fn from(map: Record) -> Self {
        Self::Match(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dynamic_shapes() {
        assert_eq!(Query::from_value(&json!(null)).unwrap(), None);
        assert_eq!(
            Query::from_value(&json!(5)).unwrap(),
            Some(Query::Key(Key::from("5")))
        );
        assert!(matches!(
            Query::from_value(&json!({"done": true})).unwrap(),
            Some(Query::Match(_))
        ));
        assert!(matches!(
            Query::from_value(&json!([1, 2])),
            Err(CoreError::InvalidQuery { .. })
        ));
        assert!(Query::from_value(&json!(true)).is_err());
    }

    #[test]
    fn by_attribute() {
        let Query::Match(map) = Query::by("done", true) else {
            panic!("expected match");
        };
        assert_eq!(map.get("done"), Some(&json!(true)));
    }
}
