//! Find command implementation.

use super::{load_schema, open_mirror, parse_pairs, print_records, Format};
use restmirror_core::{Query, Record};
use restmirror_sync::{Mirror, SyncConfig};
use std::path::Path;

/// Runs `find_all` against a mirror hydrated from the cache.
pub fn query(mirror: &Mirror, type_name: &str, filters: &[String]) -> Result<Vec<Record>, Box<dyn std::error::Error>> {
    let query = if filters.is_empty() {
        None
    } else {
        Some(Query::Match(parse_pairs(filters)?))
    };
    Ok(mirror.find_all(type_name, query.as_ref())?)
}

/// Runs the find command.
pub fn run(
    cache: &Path,
    namespace: &str,
    schema: &Path,
    type_name: &str,
    filters: &[String],
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = Format::parse(format)?;
    if !cache.exists() {
        return Err(format!("No cache found at {}", cache.display()).into());
    }
    let schema = load_schema(schema)?;
    let mirror = open_mirror(cache, namespace, schema, SyncConfig::default())?;
    let records = query(&mirror, type_name, filters)?;
    print_records(&records, format)
}
