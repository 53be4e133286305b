//! Scripted collaborators: an HTTP client with canned answers and a
//! lookup with a fixed table.

use graphload_codec::Uri;
use graphload_core::{EntityLookup, LookupOutcome, NaturalKey, ResolverError, ResolverResult};
use graphload_delivery::{FailureKind, HttpClient, HttpRequest, HttpResponse, TransportFailure};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

/// One scripted answer.
#[derive(Debug, Clone)]
pub enum Step {
    /// Respond with a status and body.
    Respond(u16, String),
    /// Fail below HTTP.
    Fail(FailureKind),
}

impl Step {
    /// A response with an empty body.
    pub fn status(status: u16) -> Self {
        Self::Respond(status, String::new())
    }
}

/// HTTP client replaying a script, then repeating a fallback answer.
#[derive(Debug)]
pub struct ScriptedClient {
    script: Mutex<VecDeque<Step>>,
    fallback: Step,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedClient {
    /// Creates a client answering every request with `status`.
    pub fn always(status: u16) -> Self {
        Self::new(Vec::new(), Step::status(status))
    }

    /// Creates a client that plays `script` in order, then `fallback`.
    pub fn new(script: Vec<Step>, fallback: Step) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received, in arrival order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests received.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl HttpClient for ScriptedClient {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportFailure> {
        self.requests.lock().push(request.clone());
        let step = self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        match step {
            Step::Respond(status, body) => Ok(HttpResponse::new(status, body)),
            Step::Fail(kind) => Err(TransportFailure::new(kind, "scripted failure")),
        }
    }
}

/// Lookup answering from a fixed table keyed by canonical natural key.
///
/// Unknown keys are not found. Keys marked as failing return
/// [`ResolverError::Unavailable`].
#[derive(Debug, Default)]
pub struct StaticLookup {
    known: HashMap<String, Uri>,
    failing: Vec<String>,
    calls: AtomicUsize,
}

impl StaticLookup {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry.
    pub fn with_entry(mut self, key: &NaturalKey, uri: &str) -> Self {
        self.known.insert(key.canonical(), Uri::new(uri));
        self
    }

    /// Makes lookups of `key` fail.
    pub fn failing(mut self, key: &NaturalKey) -> Self {
        self.failing.push(key.canonical());
        self
    }

    /// Lookups performed.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl EntityLookup for StaticLookup {
    fn lookup(&self, key: &NaturalKey) -> ResolverResult<LookupOutcome> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let canonical = key.canonical();
        if self.failing.contains(&canonical) {
            return Err(ResolverError::unavailable(canonical, "scripted failure"));
        }
        Ok(match self.known.get(&canonical) {
            Some(uri) => LookupOutcome::Found(uri.clone()),
            None => LookupOutcome::NotFound,
        })
    }
}
