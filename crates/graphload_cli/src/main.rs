//! graphload CLI
//!
//! Command-line tools for moving records into a triple store.
//!
//! # Commands
//!
//! - `transform` - Map a JSON record file to a statement file or JSON-LD
//! - `load` - Deliver a statement file to an update endpoint

mod commands;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use commands::load::LoadOptions;
use commands::transform::{OutputFormat, TransformOptions};
use graphload_core::{RecordKind, DEFAULT_BASE};
use graphload_delivery::Auth;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// graphload command-line tools.
#[derive(Parser)]
#[command(name = "graphload")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Map a JSON record file to a statement file
    Transform {
        /// Record kind (organizations, people, publications)
        #[arg(short, long, value_parser = parse_kind)]
        kind: RecordKind,

        /// JSON input file
        input: PathBuf,

        /// File to write (standard output if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Statements)]
        format: OutputFormat,

        /// Base URI for namespaces and graphs
        #[arg(long, env = "GRAPHLOAD_BASE", default_value = DEFAULT_BASE)]
        base: String,

        /// Validity date written to every subject (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Resolver service URL; entities are minted locally if omitted
        #[arg(long, env = "GRAPHLOAD_RESOLVER_URL")]
        resolver: Option<String>,

        /// API key for the resolver service
        #[arg(long, env = "GRAPHLOAD_RESOLVER_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Retries per lookup
        #[arg(long, default_value = "6")]
        max_retries: u32,

        /// Stop at the first record that fails to map and remove the output
        #[arg(long)]
        fail_fast: bool,
    },

    /// Deliver a statement file to an update endpoint
    Load {
        /// Statement file
        input: PathBuf,

        /// Update endpoint URL
        #[arg(short, long, env = "GRAPHLOAD_ENDPOINT")]
        endpoint: String,

        /// API key for the endpoint
        #[arg(long, env = "GRAPHLOAD_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Bearer token for the endpoint
        #[arg(long, env = "GRAPHLOAD_BEARER_TOKEN", hide_env_values = true, conflicts_with = "api_key")]
        bearer_token: Option<String>,

        /// Retries per batch
        #[arg(long, default_value = "6")]
        max_retries: u32,

        /// Seconds before the first retry
        #[arg(long, default_value = "5")]
        retry_interval: f64,

        /// Request timeout in seconds
        #[arg(long, default_value = "500")]
        timeout: u64,

        /// Delivery workers (0 for one per CPU)
        #[arg(short, long, default_value = "0")]
        workers: usize,

        /// Send every statement as its own request, in order
        #[arg(long)]
        by_statement: bool,
    },

    /// Show version information
    Version,
}

fn parse_kind(name: &str) -> Result<RecordKind, String> {
    RecordKind::from_name(name).ok_or_else(|| {
        format!("unknown record kind `{name}` (expected organizations, people or publications)")
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Transform {
            kind,
            input,
            output,
            format,
            base,
            date,
            resolver,
            api_key,
            max_retries,
            fail_fast,
        } => {
            let summary = commands::transform::run(&TransformOptions {
                kind,
                input,
                output,
                format,
                base,
                mapping_date: date,
                resolver,
                api_key,
                max_retries,
                fail_fast,
            })?;
            if summary.skipped > 0 {
                return Err(format!("{} records could not be mapped", summary.skipped).into());
            }
        }
        Commands::Load {
            input,
            endpoint,
            api_key,
            bearer_token,
            max_retries,
            retry_interval,
            timeout,
            workers,
            by_statement,
        } => {
            let auth = match (api_key, bearer_token) {
                (Some(key), _) => Some(Auth::api_key(key)),
                (None, Some(token)) => Some(Auth::bearer(token)),
                (None, None) => None,
            };
            let retry_interval = Duration::try_from_secs_f64(retry_interval)
                .map_err(|e| format!("invalid retry interval: {e}"))?;
            let report = commands::load::run(&LoadOptions {
                input,
                endpoint,
                auth,
                max_retries,
                retry_interval,
                timeout: Duration::from_secs(timeout),
                workers,
                by_statement,
            })?;
            println!(
                "✓ Delivered {} batches ({} statements)",
                report.delivered, report.statements
            );
        }
        Commands::Version => {
            println!("graphload CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
