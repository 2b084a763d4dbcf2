//! Resource url construction.

use crate::error::SyncResult;
use restmirror_core::{CoreError, Key, Record, Schema};
use serde_json::Value;

/// Prefixes `url` with `api_url` when it is a path.
pub fn resolve(api_url: &str, url: &str) -> String {
    if url.starts_with('/') {
        format!("{api_url}{url}")
    } else {
        url.to_string()
    }
}

/// Returns the collection url of a type.
///
/// # Errors
///
/// Returns [`CoreError::UnknownType`] when the type is undeclared or has no
/// url.
pub fn type_url(api_url: &str, schema: &Schema, type_name: &str) -> SyncResult<String> {
    match schema.get(type_name)?.url.as_deref() {
        Some(path) => Ok(resolve(api_url, path)),
        None => Err(CoreError::UnknownType {
            name: type_name.to_string(),
            valid: schema.type_names(),
        }
        .into()),
    }
}

/// Appends an identity path segment.
pub fn resource_url(base: &str, identity: &Key) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        urlencoding::encode(identity.as_str())
    )
}

/// Encodes `params` as a querystring, leaving out `skip`.
///
/// Strings are sent as-is, `null` as an empty value and everything else as
/// JSON text.
pub fn querystring(params: &Record, skip: Option<&str>) -> String {
    params
        .iter()
        .filter(|(key, _)| Some(key.as_str()) != skip)
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            format!("{}={}", urlencoding::encode(key), urlencoding::encode(&text))
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Joins a url and a querystring.
pub fn with_query(url: &str, query: &str) -> String {
    if query.is_empty() {
        url.to_string()
    } else if url.contains('?') {
        format!("{url}&{query}")
    } else {
        format!("{url}?{query}")
    }
}
