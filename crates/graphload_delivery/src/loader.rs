//! Parallel batch loading.

use crate::client::DeliveryClient;
use crate::error::{DeliveryError, DeliveryResult};
use crate::http::HttpClient;
use graphload_codec::{Batch, CodecResult};
use parking_lot::Mutex;
use rayon::iter::{ParallelBridge, ParallelIterator};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{error, info};

/// Outcome of a load.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Batches accepted by the endpoint.
    pub delivered: u64,
    /// Statements in the accepted batches.
    pub statements: u64,
    /// Batches that failed, with their errors.
    pub failures: Vec<DeliveryError>,
}

impl LoadReport {
    /// True when every batch was accepted.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Batches attempted.
    pub fn attempted(&self) -> u64 {
        self.delivered + self.failures.len() as u64
    }
}

/// Delivers a batch stream on a pool of worker threads.
///
/// Each batch is one request, so its statements are applied in order by a
/// single worker. Batches may complete in any order. A failed batch is
/// recorded and the others continue; an unreadable stream stops the load.
pub struct BatchLoader<C> {
    client: DeliveryClient<C>,
    workers: usize,
}

impl<C: HttpClient> BatchLoader<C> {
    /// Creates a loader with one worker per available CPU.
    pub fn new(client: DeliveryClient<C>) -> Self {
        Self {
            client,
            workers: 0,
        }
    }

    /// Sets the number of workers; 0 picks one per available CPU.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Returns the delivery client.
    pub fn client(&self) -> &DeliveryClient<C> {
        &self.client
    }

    /// Delivers every batch of `batches`.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Encoding`] if the stream cannot be read and
    /// [`DeliveryError::Configuration`] if the worker pool cannot start.
    /// Batch failures are reported in the [`LoadReport`].
    pub fn load<I>(&self, batches: I) -> DeliveryResult<LoadReport>
    where
        I: Iterator<Item = CodecResult<Batch>> + Send,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|index| format!("graphload-load-{index}"))
            .build()
            .map_err(|e| DeliveryError::configuration(e.to_string()))?;

        let delivered = AtomicU64::new(0);
        let statements = AtomicU64::new(0);
        let failures = Mutex::new(Vec::new());

        pool.install(|| {
            batches.par_bridge().try_for_each(|item| -> CodecResult<()> {
                let batch = item?;
                match self.client.post_batch(&batch) {
                    Ok(_) => {
                        delivered.fetch_add(1, Ordering::Relaxed);
                        statements.fetch_add(batch.len() as u64, Ordering::Relaxed);
                    }
                    Err(err) => {
                        error!(error = %err, "batch failed");
                        failures.lock().push(err);
                    }
                }
                Ok(())
            })
        })?;

        let report = LoadReport {
            delivered: delivered.into_inner(),
            statements: statements.into_inner(),
            failures: failures.into_inner(),
        };
        info!(
            delivered = report.delivered,
            statements = report.statements,
            failed = report.failures.len(),
            "load finished"
        );
        Ok(report)
    }
}
