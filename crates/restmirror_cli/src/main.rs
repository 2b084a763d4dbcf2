//! RestMirror CLI
//!
//! Command-line tools for RestMirror cache directories.
//!
//! # Commands
//!
//! - `fetch` - Fetch a type from the API into the cache
//! - `inspect` - List cached namespaces and types
//! - `find` - Query cached records offline
//! - `evict` - Remove a cached type

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// RestMirror command-line cache tools.
#[derive(Parser)]
#[command(name = "restmirror")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the cache directory
    #[arg(global = true, short, long)]
    cache: Option<PathBuf>,

    /// Namespace to operate on
    #[arg(global = true, short, long, default_value = restmirror_core::BASE_NAMESPACE)]
    namespace: String,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a type from the API and store it in the cache
    Fetch {
        /// Entity type to fetch
        type_name: String,

        /// Schema file (JSON)
        #[arg(short, long)]
        schema: PathBuf,

        /// Base url of the API
        #[arg(short, long)]
        api: String,

        /// Querystring parameter, as key=value
        #[arg(short, long = "param")]
        params: Vec<String>,

        /// Request header, as name=value
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List cached namespaces and types
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Query cached records without touching the network
    Find {
        /// Entity type to query
        type_name: String,

        /// Schema file (JSON)
        #[arg(short, long)]
        schema: PathBuf,

        /// Attribute filter, as key=value
        #[arg(short = 'w', long = "where")]
        filters: Vec<String>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Remove a cached type
    Evict {
        /// Entity type to remove
        type_name: String,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Fetch {
            type_name,
            schema,
            api,
            params,
            headers,
            format,
        } => {
            let cache = cli.cache.ok_or("Cache directory required for fetch")?;
            let request = commands::fetch::FetchRequest {
                cache: &cache,
                namespace: &cli.namespace,
                schema: &schema,
                api: &api,
                type_name: &type_name,
                params: &params,
                headers: &headers,
            };
            commands::fetch::run(request, &format).await?;
        }
        Commands::Inspect { format } => {
            let cache = cli.cache.ok_or("Cache directory required for inspect")?;
            commands::inspect::run(&cache, &format)?;
        }
        Commands::Find {
            type_name,
            schema,
            filters,
            format,
        } => {
            let cache = cli.cache.ok_or("Cache directory required for find")?;
            commands::find::run(&cache, &cli.namespace, &schema, &type_name, &filters, &format)?;
        }
        Commands::Evict { type_name } => {
            let cache = cli.cache.ok_or("Cache directory required for evict")?;
            commands::evict::run(&cache, &cli.namespace, &type_name)?;
        }
        Commands::Version => {
            println!("RestMirror CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("RestMirror Core v{}", restmirror_core::VERSION);
        }
    }

    Ok(())
}
