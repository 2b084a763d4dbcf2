//! Fetch command implementation.

use super::{load_schema, open_mirror, parse_headers, parse_pairs, print_records, Format};
use restmirror_sync::{FetchOptions, SyncConfig};
use std::path::Path;

/// Arguments of the fetch command.
#[derive(Debug)]
pub struct FetchRequest<'a> {
    /// Cache directory.
    pub cache: &'a Path,
    /// Namespace to fetch into.
    pub namespace: &'a str,
    /// Schema file.
    pub schema: &'a Path,
    /// Base url of the API.
    pub api: &'a str,
    /// Entity type.
    pub type_name: &'a str,
    /// Raw `key=value` parameters.
    pub params: &'a [String],
    /// Raw `name=value` headers.
    pub headers: &'a [String],
}

/// Runs the fetch command.
///
/// The fetched records are written through to the cache before returning.
pub async fn run(request: FetchRequest<'_>, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let format = Format::parse(format)?;
    let schema = load_schema(request.schema)?;

    let mut config = SyncConfig::new(request.api);
    for (name, value) in parse_headers(request.headers)? {
        config = config.with_header(name, value);
    }
    let mirror = open_mirror(request.cache, request.namespace, schema, config)?;

    let mut options = FetchOptions::new();
    if !request.params.is_empty() {
        options = options.params(parse_pairs(request.params)?);
    }
    let merged = mirror.fetch(request.type_name, options).await?;
    mirror.notifier().flush_all();

    tracing::info!(
        type_name = request.type_name,
        namespace = request.namespace,
        records = merged.len(),
        "fetched"
    );
    print_records(&merged.into_vec(), format)
}
