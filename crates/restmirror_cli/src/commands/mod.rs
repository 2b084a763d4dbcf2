//! CLI command implementations.

pub mod evict;
pub mod fetch;
pub mod find;
pub mod inspect;

use restmirror_core::{Config, Record, Schema};
use restmirror_storage::FileCache;
use restmirror_sync::{Mirror, SyncConfig};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while interpreting command arguments.
#[derive(Debug, Error)]
pub enum CliError {
    /// A `key=value` argument without `=`.
    #[error("expected key=value, got {arg:?}")]
    InvalidPair {
        /// The offending argument.
        arg: String,
    },

    /// Unsupported `--format` value.
    #[error("unknown output format {0:?} (expected text or json)")]
    UnknownFormat(String),
}

/// Output format of commands that print records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// One line per record.
    Text,
    /// Pretty-printed JSON array.
    Json,
}

impl Format {
    /// Parses a `--format` value.
    pub fn parse(value: &str) -> Result<Self, CliError> {
        match value {
            "text" => Ok(Format::Text),
            "json" => Ok(Format::Json),
            other => Err(CliError::UnknownFormat(other.to_string())),
        }
    }
}

/// Parses `key=value` arguments into a record.
///
/// Values that parse as JSON keep their type; anything else is a string.
pub fn parse_pairs(args: &[String]) -> Result<Record, CliError> {
    let mut record = Record::new();
    for arg in args {
        let (key, raw) = arg
            .split_once('=')
            .ok_or_else(|| CliError::InvalidPair { arg: arg.clone() })?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        record.insert(key.to_string(), value);
    }
    Ok(record)
}

/// Parses `name=value` header arguments, keeping values as text.
pub fn parse_headers(args: &[String]) -> Result<Vec<(String, String)>, CliError> {
    args.iter()
        .map(|arg| {
            arg.split_once('=')
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .ok_or_else(|| CliError::InvalidPair { arg: arg.clone() })
        })
        .collect()
}

/// Reads a schema file.
pub fn load_schema(path: &Path) -> Result<Schema, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read schema {}: {e}", path.display()))?;
    Ok(Schema::from_json(&text)?)
}

/// Opens a persisting mirror over the cache directory.
pub fn open_mirror(
    cache_dir: &Path,
    namespace: &str,
    schema: Schema,
    config: SyncConfig,
) -> Result<Mirror, Box<dyn std::error::Error>> {
    let cache = FileCache::open(cache_dir)?;
    let core = Config::new().persist(true).initial_namespace(namespace);
    let mirror = Mirror::builder(schema, config.with_core(core))
        .cache(Arc::new(cache))
        .build()?;
    Ok(mirror)
}

/// Prints records in the requested format.
pub fn print_records(records: &[Record], format: Format) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(records)?),
        Format::Text => {
            for record in records {
                println!("{}", Value::Object(record.clone()));
            }
            println!("{} record(s)", records.len());
        }
    }
    Ok(())
}
