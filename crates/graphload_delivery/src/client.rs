//! Retrying delivery client.

use crate::config::{DeliveryConfig, RetryConfig};
use crate::error::{DeliveryError, DeliveryResult};
use crate::http::{HttpClient, HttpRequest, HttpResponse, ReqwestClient};
use graphload_codec::Batch;
use reqwest::Url;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use tracing::{debug, warn};

/// Content type of a posted batch.
pub const SPARQL_UPDATE: &str = "application/sparql-update";

/// Statuses that are retried like transport failures.
pub const RETRY_STATUSES: [u16; 6] = [429, 500, 502, 503, 504, 599];

/// Returns true if a response with this status is retried.
pub fn is_retry_status(status: u16) -> bool {
    RETRY_STATUSES.contains(&status)
}

/// Request counters.
#[derive(Debug, Default)]
pub struct DeliveryStats {
    requests: AtomicU64,
    retries: AtomicU64,
    delivered: AtomicU64,
}

impl DeliveryStats {
    /// Requests sent, retries included.
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Requests sent again after a retryable failure.
    pub fn retries(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }

    /// Batches accepted by the endpoint.
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }
}

/// Sends batches and lookups to one endpoint with bounded retry.
///
/// A request is retried on transport failures and on the statuses in
/// [`RETRY_STATUSES`], up to `max_retries` times, sleeping
/// [`RetryConfig::delay_for_attempt`] between attempts. Any other response
/// ends the request.
pub struct DeliveryClient<C> {
    client: C,
    base_url: String,
    retry: RetryConfig,
    stats: DeliveryStats,
}

impl DeliveryClient<ReqwestClient> {
    /// Creates a client backed by reqwest.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Configuration`] if the HTTP client cannot be built.
    pub fn connect(config: &DeliveryConfig) -> DeliveryResult<Self> {
        Ok(Self::from_config(ReqwestClient::new(config)?, config))
    }
}

impl<C: HttpClient> DeliveryClient<C> {
    /// Creates a client.
    pub fn new(client: C, base_url: impl Into<String>, retry: RetryConfig) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            retry,
            stats: DeliveryStats::default(),
        }
    }

    /// Creates a client taking the URL and retry policy from a configuration.
    pub fn from_config(client: C, config: &DeliveryConfig) -> Self {
        Self::new(client, config.base_url.clone(), config.retry.clone())
    }

    /// Returns the endpoint URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the retry policy.
    pub fn retry(&self) -> &RetryConfig {
        &self.retry
    }

    /// Returns the request counters.
    pub fn stats(&self) -> &DeliveryStats {
        &self.stats
    }

    /// Posts one batch as a single request.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Exhausted`] when every attempt failed with a
    /// retryable failure, or [`DeliveryError::Rejected`] for any other
    /// non-success status.
    pub fn post_batch(&self, batch: &Batch) -> DeliveryResult<HttpResponse> {
        let subject = batch.subject().unwrap_or_else(|| "unknown subject".to_string());
        let request = HttpRequest::post(self.base_url.clone(), SPARQL_UPDATE, batch.text());
        let response = self.send(&request, &subject)?;
        if !response.is_success() {
            return Err(DeliveryError::Rejected {
                target: request.url,
                subject,
                status: response.status,
                body: response.body,
            });
        }

        self.stats.delivered.fetch_add(1, Ordering::Relaxed);
        debug!(subject = %subject, statements = batch.len(), "delivered batch");
        Ok(response)
    }

    /// Issues a GET for `path` below the endpoint URL.
    ///
    /// The final response is returned whatever its status, unless the status
    /// is retried and the retries ran out.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Configuration`] if the URL cannot be built and
    /// [`DeliveryError::Exhausted`] when every attempt failed.
    pub fn get(&self, path: &str, query: &[(&str, &str)]) -> DeliveryResult<HttpResponse> {
        let url = self.url(path, query)?;
        let request = HttpRequest::get(url.as_str());
        self.send(&request, url.as_str())
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> DeliveryResult<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut url = Url::parse(&joined)
            .map_err(|e| DeliveryError::configuration(format!("{joined}: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn send(&self, request: &HttpRequest, subject: &str) -> DeliveryResult<HttpResponse> {
        let attempts = self.retry.max_attempts();
        let mut attempt = 0;
        loop {
            attempt += 1;
            self.stats.requests.fetch_add(1, Ordering::Relaxed);

            let (failure, status) = match self.client.execute(request) {
                Ok(response) if !is_retry_status(response.status) => return Ok(response),
                Ok(response) => (format!("status {}", response.status), Some(response.status)),
                Err(failure) => (failure.to_string(), None),
            };

            let remaining = attempts - attempt;
            if remaining == 0 {
                return Err(DeliveryError::Exhausted {
                    target: request.url.clone(),
                    subject: subject.to_string(),
                    attempts,
                    last_failure: failure,
                });
            }

            warn!(
                attempt,
                remaining,
                target = %request.url,
                failure = %failure,
                status = ?status,
                "retrying request"
            );
            self.stats.retries.fetch_add(1, Ordering::Relaxed);
            thread::sleep(self.retry.delay_for_attempt(attempt));
        }
    }
}
