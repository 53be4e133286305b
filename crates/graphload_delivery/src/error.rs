//! Error types for delivery.

use graphload_codec::CodecError;
use thiserror::Error;

/// Result type for delivery operations.
pub type DeliveryResult<T> = Result<T, DeliveryError>;

/// Errors that can occur while delivering batches or issuing lookups.
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// Every attempt failed with a retryable failure.
    #[error("gave up on {target} ({subject}) after {attempts} attempts: {last_failure}")]
    Exhausted {
        /// Request URL.
        target: String,
        /// What was being delivered, usually the batch subject.
        subject: String,
        /// Attempts made, the first one included.
        attempts: u32,
        /// Description of the last failure.
        last_failure: String,
    },

    /// The endpoint answered with a status that is not retried.
    #[error("{target} rejected {subject} with status {status}: {body}")]
    Rejected {
        /// Request URL.
        target: String,
        /// What was being delivered.
        subject: String,
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The client could not be built from its configuration.
    #[error("invalid delivery configuration: {0}")]
    Configuration(String),

    /// The statement stream could not be read.
    #[error("statement stream error: {0}")]
    Encoding(#[from] CodecError),
}

impl DeliveryError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Returns the request URL for request failures.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Exhausted { target, .. } | Self::Rejected { target, .. } => Some(target),
            Self::Configuration(_) | Self::Encoding(_) => None,
        }
    }

    /// Returns true when the failure concerns one request only.
    ///
    /// Configuration and stream errors affect every remaining batch.
    pub fn is_batch_failure(&self) -> bool {
        matches!(self, Self::Exhausted { .. } | Self::Rejected { .. })
    }
}
