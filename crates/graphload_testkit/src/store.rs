//! In-memory triple store.
//!
//! Applies statement text the way an update endpoint would, so tests can
//! check what a statement stream leaves behind.

use graphload_codec::{
    parse_statement, Batch, CodecResult, Grouping, ParsedStatement, ReaderConfig,
    StatementReader, Term, Triple, Uri,
};
use graphload_delivery::{HttpClient, HttpRequest, HttpResponse, Method, TransportFailure};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::io::BufRead;

/// A set of quads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    triples: BTreeSet<Triple>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one statement.
    pub fn apply(&mut self, statement: &str) -> CodecResult<()> {
        let parsed = parse_statement(statement)?;
        self.apply_parsed(parsed);
        Ok(())
    }

    /// Applies a batch atomically: nothing changes unless every statement parses.
    pub fn apply_batch(&mut self, batch: &Batch) -> CodecResult<()> {
        let parsed = batch
            .statements()
            .iter()
            .map(|statement| parse_statement(statement.text()))
            .collect::<CodecResult<Vec<_>>>()?;
        for statement in parsed {
            self.apply_parsed(statement);
        }
        Ok(())
    }

    /// Reads a statement stream in batches and applies each one.
    ///
    /// Returns the number of batches applied. Batches before a read error
    /// stay applied.
    pub fn apply_stream<R: BufRead>(&mut self, input: R) -> CodecResult<usize> {
        let mut applied = 0;
        for batch in StatementReader::new(input) {
            self.apply_batch(&batch?)?;
            applied += 1;
        }
        Ok(applied)
    }

    fn apply_parsed(&mut self, statement: ParsedStatement) {
        match statement {
            ParsedStatement::Delete {
                graph,
                subject,
                predicate,
            } => self.triples.retain(|t| {
                !(t.graph == graph && t.subject == subject && t.predicate == predicate)
            }),
            ParsedStatement::Insert { triples } => self.triples.extend(triples),
        }
    }

    /// Objects of `(subject, predicate)` in any graph, in term order.
    pub fn objects(&self, subject: &Uri, predicate: &Uri) -> Vec<Term> {
        self.triples
            .iter()
            .filter(|t| &t.subject == subject && &t.predicate == predicate)
            .map(|t| t.object.clone())
            .collect()
    }

    /// Literal values of `(subject, predicate)`.
    pub fn literals(&self, subject: &Uri, predicate: &Uri) -> Vec<String> {
        self.objects(subject, predicate)
            .iter()
            .filter_map(|term| term.as_literal().map(str::to_string))
            .collect()
    }

    /// True if the exact quad is present.
    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Every quad whose subject is `subject`.
    pub fn about(&self, subject: &Uri) -> Vec<&Triple> {
        self.triples.iter().filter(|t| &t.subject == subject).collect()
    }

    /// Distinct subjects.
    pub fn subjects(&self) -> BTreeSet<&Uri> {
        self.triples.iter().map(|t| &t.subject).collect()
    }

    /// Every quad, in order.
    pub fn triples(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Number of quads.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// True when the store holds nothing.
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }
}

/// An update endpoint backed by a [`MemoryStore`].
///
/// POSTed bodies are applied as one batch; a body that does not parse is
/// answered with 400 and changes nothing. Every other request gets 404.
#[derive(Debug, Default)]
pub struct StoreEndpoint {
    store: Mutex<MemoryStore>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl StoreEndpoint {
    /// Creates an endpoint over an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the store contents.
    pub fn snapshot(&self) -> MemoryStore {
        self.store.lock().clone()
    }

    /// Number of requests received.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Requests received, in arrival order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    fn apply_body(&self, body: &str) -> CodecResult<()> {
        let config = ReaderConfig::new().with_grouping(Grouping::ByStatement);
        let statements = StatementReader::with_config(body.as_bytes(), config)
            .map(|batch| batch.map(|b| b.statements().to_vec()))
            .collect::<CodecResult<Vec<_>>>()?
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();
        match Batch::new(statements) {
            Some(batch) => self.store.lock().apply_batch(&batch),
            None => Ok(()),
        }
    }
}

impl HttpClient for StoreEndpoint {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportFailure> {
        self.requests.lock().push(request.clone());
        if request.method != Method::Post {
            return Ok(HttpResponse::new(404, ""));
        }
        let body = request.body.as_deref().unwrap_or_default();
        Ok(match self.apply_body(body) {
            Ok(()) => HttpResponse::new(204, ""),
            Err(err) => HttpResponse::new(400, err.to_string()),
        })
    }
}
