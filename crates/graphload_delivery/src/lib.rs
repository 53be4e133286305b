//! # graphload delivery
//!
//! Delivers statement batches to a SPARQL update endpoint and resolves
//! entities against a lookup service.
//!
//! This crate provides:
//! - Retry with exponential backoff and jitter ([`RetryConfig`])
//! - An [`HttpClient`] abstraction with a blocking reqwest implementation
//! - [`DeliveryClient`], posting one batch per request
//! - [`HttpLookup`], an [`EntityLookup`](graphload_core::EntityLookup) over HTTP
//! - [`BatchLoader`], delivering a batch stream on a worker pool
//!
//! ## Retry policy
//!
//! Connect failures, timeouts, other transport failures and the statuses
//! in [`RETRY_STATUSES`] are retried, POST included. With `max_retries = n`
//! a request is attempted at most `n + 1` times. Every retry is logged with
//! the attempt number, remaining retries, target and failure.
//!
//! Retrying a batch is safe because every batch is idempotent: it clears
//! each predicate it sets.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod auth;
mod client;
mod config;
mod error;
mod http;
mod loader;
mod lookup;

pub use auth::{Auth, API_KEY_HEADER};
pub use client::{is_retry_status, DeliveryClient, DeliveryStats, RETRY_STATUSES, SPARQL_UPDATE};
pub use config::{DeliveryConfig, RetryConfig};
pub use error::{DeliveryError, DeliveryResult};
pub use http::{
    FailureKind, HttpClient, HttpRequest, HttpResponse, Method, ReqwestClient, TransportFailure,
};
pub use loader::{BatchLoader, LoadReport};
pub use lookup::HttpLookup;
