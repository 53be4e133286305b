//! Configuration for delivery.

use crate::auth::Auth;
use rand::Rng;
use std::time::Duration;

/// Configuration for one delivery endpoint.
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    /// Endpoint URL. Batches are posted here; lookups are issued below it.
    pub base_url: String,
    /// Time allowed to establish a connection.
    pub connect_timeout: Duration,
    /// Time allowed for a whole request, including reading the response.
    pub timeout: Duration,
    /// Credentials sent with every request.
    pub auth: Option<Auth>,
    /// Retry configuration.
    pub retry: RetryConfig,
}

impl DeliveryConfig {
    /// Creates a configuration with the default timeouts and retry policy.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(500),
            auth: None,
            retry: RetryConfig::default(),
        }
    }

    /// Sets the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the overall request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the credentials.
    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Sets the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_interval: Duration,
    /// Multiplier applied for each further retry.
    pub backoff_factor: f64,
    /// Upper bound of the random fraction added to each delay.
    pub jitter: f64,
    /// Cap on a single delay; `None` means unbounded.
    pub max_interval: Option<Duration>,
}

impl RetryConfig {
    /// Creates a retry configuration with the default intervals.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_interval: Duration::from_secs(5),
            backoff_factor: 2.0,
            jitter: 0.01,
            max_interval: None,
        }
    }

    /// Creates a configuration with no retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            base_interval: Duration::ZERO,
            backoff_factor: 1.0,
            jitter: 0.0,
            max_interval: None,
        }
    }

    /// Sets the base interval.
    pub fn with_base_interval(mut self, interval: Duration) -> Self {
        self.base_interval = interval;
        self
    }

    /// Sets the backoff factor.
    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor;
        self
    }

    /// Sets the jitter fraction.
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    /// Caps every delay.
    pub fn with_max_interval(mut self, interval: Duration) -> Self {
        self.max_interval = Some(interval);
        self
    }

    /// Total attempts, the first one included.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Calculates the delay before retry `retry` (1-based; 0 is the first attempt).
    pub fn delay_for_attempt(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(retry - 1).unwrap_or(i32::MAX);
        let mut delay_secs = self.base_interval.as_secs_f64() * self.backoff_factor.powi(exponent);
        if let Some(max) = self.max_interval {
            delay_secs = delay_secs.min(max.as_secs_f64());
        }

        if self.jitter > 0.0 {
            delay_secs *= 1.0 + rand::thread_rng().gen_range(0.0..=self.jitter);
        }
        Duration::try_from_secs_f64(delay_secs).unwrap_or(Duration::MAX)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(6)
    }
}
