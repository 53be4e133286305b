//! Statement text encoder.
//!
//! Output is a subset of SPARQL 1.1 Update:
//!
//! ```text
//! DELETE WHERE { GRAPH <g> { <s> <p> ?o . } };
//! INSERT DATA { GRAPH <g> { <s> <p> "value" . } };
//! ```
//!
//! An insert with more than one object puts each triple on its own line.
//! Literals never contain a raw line break, so the `;` + newline delimiter
//! can only appear at the end of a statement.

use crate::statement::{Statement, StatementKind, STATEMENT_DELIMITER};
use crate::term::{Term, Uri};

/// Escape a literal value for use between double quotes.
///
/// [`crate::decoder::unescape_literal`] reverses this exactly.
pub fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

/// Builds statement text.
///
/// The encoder owns a buffer that holds exactly one statement at a time.
pub struct StatementEncoder {
    buffer: String,
}

impl StatementEncoder {
    /// Create a new encoder.
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    /// Encode a delete of every `(subject, predicate, ?o)` in `graph`.
    pub fn delete(&mut self, graph: &Uri, subject: &Uri, predicate: &Uri) -> Statement {
        self.buffer.clear();
        self.buffer.push_str("DELETE WHERE { GRAPH ");
        self.push_uri(graph);
        self.buffer.push_str(" { ");
        self.push_uri(subject);
        self.buffer.push(' ');
        self.push_uri(predicate);
        self.buffer.push_str(" ?o . } }");
        self.finish(StatementKind::Delete)
    }

    /// Encode an insert of `(subject, predicate, object)` for every object.
    ///
    /// Returns `None` when there is nothing to insert.
    pub fn insert(
        &mut self,
        graph: &Uri,
        subject: &Uri,
        predicate: &Uri,
        objects: &[Term],
    ) -> Option<Statement> {
        if objects.is_empty() {
            return None;
        }

        self.buffer.clear();
        self.buffer.push_str("INSERT DATA { GRAPH ");
        self.push_uri(graph);
        self.buffer.push_str(" {");

        let multiline = objects.len() > 1;
        for object in objects {
            self.buffer.push(if multiline { '\n' } else { ' ' });
            self.push_uri(subject);
            self.buffer.push(' ');
            self.push_uri(predicate);
            self.buffer.push(' ');
            self.push_term(object);
            self.buffer.push_str(" .");
        }

        self.buffer.push_str(if multiline { "\n} }" } else { " } }" });
        Some(self.finish(StatementKind::Insert))
    }

    fn push_uri(&mut self, uri: &Uri) {
        self.buffer.push('<');
        self.buffer.push_str(uri.as_str());
        self.buffer.push('>');
    }

    fn push_term(&mut self, term: &Term) {
        match term {
            Term::Uri(uri) => self.push_uri(uri),
            Term::Literal { value, datatype } => {
                self.buffer.push('"');
                self.buffer.push_str(&escape_literal(value));
                self.buffer.push('"');
                if let Some(datatype) = datatype {
                    self.buffer.push_str("^^");
                    self.push_uri(datatype);
                }
            }
        }
    }

    fn finish(&mut self, kind: StatementKind) -> Statement {
        self.buffer.push_str(STATEMENT_DELIMITER);
        Statement::new(kind, std::mem::take(&mut self.buffer))
    }
}

impl Default for StatementEncoder {
    fn default() -> Self {
        Self::new()
    }
}
