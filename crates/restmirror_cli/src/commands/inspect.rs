//! Inspect command implementation.

use restmirror_storage::{CacheBackend, FileCache};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

/// Cache inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Cache directory.
    pub path: String,
    /// Total serialized size in bytes.
    pub total_size: usize,
    /// One row per cached type.
    pub entries: Vec<EntryStats>,
}

/// Statistics for a single cached type.
#[derive(Debug, Serialize)]
pub struct EntryStats {
    /// Namespace id.
    pub namespace: String,
    /// Entity type name.
    pub type_name: String,
    /// Serialized size in bytes.
    pub size: usize,
    /// Number of records, or `None` if the entry does not decode.
    pub records: Option<usize>,
}

/// Collects statistics for every cache entry.
pub fn collect(cache: &dyn CacheBackend, path: &Path) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let mut entries = Vec::new();
    for entry in cache.entries()? {
        let records = cache
            .get(&entry.namespace, &entry.type_name)?
            .and_then(|text| match serde_json::from_str::<Value>(&text) {
                Ok(Value::Array(items)) => Some(items.len()),
                _ => None,
            });
        entries.push(EntryStats {
            namespace: entry.namespace,
            type_name: entry.type_name,
            size: entry.len,
            records,
        });
    }

    Ok(InspectResult {
        path: path.display().to_string(),
        total_size: entries.iter().map(|e| e.size).sum(),
        entries,
    })
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No cache found at {}", path.display()).into());
    }
    let cache = FileCache::open(path)?;
    let result = collect(&cache, path)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print_text_output(&result),
    }
    Ok(())
}

fn print_text_output(result: &InspectResult) {
    println!("RestMirror Cache: {}", result.path);
    println!("Total size: {} bytes", result.total_size);
    println!();

    if result.entries.is_empty() {
        println!("(empty)");
        return;
    }
    println!("{:<20} {:<20} {:>10} {:>8}", "NAMESPACE", "TYPE", "BYTES", "RECORDS");
    for entry in &result.entries {
        let records = entry
            .records
            .map_or_else(|| "corrupt".to_string(), |n| n.to_string());
        println!(
            "{:<20} {:<20} {:>10} {:>8}",
            entry.namespace, entry.type_name, entry.size, records
        );
    }
}
