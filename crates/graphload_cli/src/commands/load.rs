//! Load command: statement text to an update endpoint.

use graphload_codec::{Grouping, ReaderConfig, StatementReader};
use graphload_delivery::{
    Auth, BatchLoader, DeliveryClient, DeliveryConfig, HttpClient, LoadReport, RetryConfig,
};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Options for one load run.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Statement file.
    pub input: PathBuf,
    /// Update endpoint URL.
    pub endpoint: String,
    /// Authentication for the endpoint.
    pub auth: Option<Auth>,
    /// Retries per batch.
    pub max_retries: u32,
    /// First retry delay.
    pub retry_interval: Duration,
    /// Request timeout.
    pub timeout: Duration,
    /// Delivery workers; 0 picks one per CPU.
    pub workers: usize,
    /// Send each statement on its own, in order, from one worker.
    pub by_statement: bool,
}

impl LoadOptions {
    fn delivery_config(&self) -> DeliveryConfig {
        let mut config = DeliveryConfig::new(self.endpoint.clone())
            .with_timeout(self.timeout)
            .with_retry(RetryConfig::new(self.max_retries).with_base_interval(self.retry_interval));
        if let Some(auth) = &self.auth {
            config = config.with_auth(auth.clone());
        }
        config
    }

    fn reader_config(&self) -> ReaderConfig {
        let grouping = if self.by_statement {
            Grouping::ByStatement
        } else {
            Grouping::Grouped
        };
        ReaderConfig::new().with_grouping(grouping)
    }
}

/// Runs the load command against the configured endpoint.
pub fn run(options: &LoadOptions) -> Result<LoadReport, Box<dyn std::error::Error>> {
    let client = DeliveryClient::connect(&options.delivery_config())?;
    run_with(options, client)
}

/// Runs the load command over an existing delivery client.
pub fn run_with<C: HttpClient>(
    options: &LoadOptions,
    client: DeliveryClient<C>,
) -> Result<LoadReport, Box<dyn std::error::Error>> {
    let input = BufReader::new(File::open(&options.input)?);
    let batches = StatementReader::with_config(input, options.reader_config());
    // Separate delete and insert requests must not overtake each other.
    let workers = if options.by_statement { 1 } else { options.workers };
    info!(
        input = %options.input.display(),
        endpoint = %client.base_url(),
        workers,
        "loading statements"
    );

    let loader = BatchLoader::new(client).with_workers(workers);
    let report = loader.load(batches)?;

    if !report.is_success() {
        return Err(format!(
            "{} of {} batches were not delivered",
            report.failures.len(),
            report.attempted()
        )
        .into());
    }
    Ok(report)
}
