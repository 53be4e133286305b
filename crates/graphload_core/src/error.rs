//! Error types for record mapping and entity resolution.

use thiserror::Error;

/// Result type for mapping operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for resolver operations.
pub type ResolverResult<T> = Result<T, ResolverError>;

/// Errors raised while turning one record into triples.
///
/// A transform error is fatal for the record it names and nothing else.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The record does not have the expected shape.
    #[error("malformed record {natural_key}: {message}")]
    Malformed {
        /// Natural key of the record, or a placeholder if it had none.
        natural_key: String,
        /// What was wrong.
        message: String,
    },

    /// A foreign identifier could not be resolved.
    #[error("resolving identifiers for record {natural_key} failed: {source}")]
    Resolver {
        /// Natural key of the record being mapped.
        natural_key: String,
        /// The underlying resolver failure.
        #[source]
        source: ResolverError,
    },
}

impl TransformError {
    /// Creates a malformed record error.
    pub fn malformed(natural_key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            natural_key: natural_key.into(),
            message: message.into(),
        }
    }

    /// Returns the natural key of the failed record.
    pub fn natural_key(&self) -> &str {
        match self {
            Self::Malformed { natural_key, .. } | Self::Resolver { natural_key, .. } => {
                natural_key
            }
        }
    }
}

/// Errors raised by an entity lookup.
///
/// A valid "not found" answer is not an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolverError {
    /// The lookup endpoint could not be reached or kept failing.
    #[error("lookup for {key} failed: {message}")]
    Unavailable {
        /// Canonical natural key.
        key: String,
        /// Last failure seen.
        message: String,
    },

    /// The endpoint answered with a status that is neither found nor not found.
    #[error("lookup for {key} returned unexpected status {status}")]
    UnexpectedStatus {
        /// Canonical natural key.
        key: String,
        /// HTTP status code.
        status: u16,
    },

    /// The endpoint returned a body that is not a usable URI.
    #[error("lookup for {key} returned an invalid URI: {body:?}")]
    InvalidUri {
        /// Canonical natural key.
        key: String,
        /// Response body as received.
        body: String,
    },
}

impl ResolverError {
    /// Creates an unavailable error.
    pub fn unavailable(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unavailable {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Returns the canonical key the lookup was for.
    pub fn key(&self) -> &str {
        match self {
            Self::Unavailable { key, .. }
            | Self::UnexpectedStatus { key, .. }
            | Self::InvalidUri { key, .. } => key,
        }
    }
}
