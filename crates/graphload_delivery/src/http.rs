//! HTTP client abstraction.
//!
//! [`DeliveryClient`](crate::DeliveryClient) talks to the network through the
//! [`HttpClient`] trait so the retry logic can be driven by scripted clients
//! in tests. [`ReqwestClient`] is the production implementation.

use crate::config::DeliveryConfig;
use crate::error::{DeliveryError, DeliveryResult};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET.
    Get,
    /// POST.
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
        })
    }
}

/// A request as seen by an [`HttpClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Method.
    pub method: Method,
    /// Absolute URL, query included.
    pub url: String,
    /// Content type of the body.
    pub content_type: Option<&'static str>,
    /// Body text.
    pub body: Option<String>,
}

impl HttpRequest {
    /// Creates a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            content_type: None,
            body: None,
        }
    }

    /// Creates a POST request.
    pub fn post(url: impl Into<String>, content_type: &'static str, body: String) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            content_type: Some(content_type),
            body: Some(body),
        }
    }
}

/// A response with its body read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Body text.
    pub body: String,
}

impl HttpResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Kind of failure below HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The connection could not be established.
    Connect,
    /// The connect or request timeout elapsed.
    Timeout,
    /// Any other transport failure, such as a reset connection.
    Transport,
}

/// A request that produced no response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind:?} failure: {message}")]
pub struct TransportFailure {
    /// Kind of failure.
    pub kind: FailureKind,
    /// Underlying error message.
    pub message: String,
}

impl TransportFailure {
    /// Creates a transport failure.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// HTTP client abstraction.
///
/// Implement this trait to provide the actual HTTP transport. Credentials
/// and timeouts belong to the implementation.
pub trait HttpClient: Send + Sync {
    /// Sends one request and reads the whole response.
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportFailure>;
}

impl<C: HttpClient + ?Sized> HttpClient for &C {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportFailure> {
        (**self).execute(request)
    }
}

impl<C: HttpClient + ?Sized> HttpClient for Arc<C> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportFailure> {
        (**self).execute(request)
    }
}

/// Blocking reqwest client.
///
/// Certificates are always verified. Credentials from the configuration are
/// installed as default headers.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Builds a client from a delivery configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Configuration`] for invalid header names or
    /// values, or when the TLS backend cannot be initialised.
    pub fn new(config: &DeliveryConfig) -> DeliveryResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(auth) = &config.auth {
            for (name, value) in auth.headers() {
                let invalid = |e: &dyn std::error::Error| {
                    DeliveryError::configuration(format!("header {name}: {e}"))
                };
                let header = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(&e))?;
                let mut value = HeaderValue::from_str(&value).map_err(|e| invalid(&e))?;
                value.set_sensitive(true);
                headers.insert(header, value);
            }
        }

        let client = reqwest::blocking::Client::builder()
            .use_rustls_tls()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| DeliveryError::configuration(e.to_string()))?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        if let Some(content_type) = request.content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(classify)?;
        Ok(HttpResponse { status, body })
    }
}

fn classify(err: reqwest::Error) -> TransportFailure {
    let kind = if err.is_timeout() {
        FailureKind::Timeout
    } else if err.is_connect() {
        FailureKind::Connect
    } else {
        FailureKind::Transport
    };
    TransportFailure::new(kind, err.to_string())
}
