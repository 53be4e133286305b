//! Update statements and batches.

use crate::decoder::parse_statement;
use crate::term::{Triple, Uri};

/// Verb that opens a delete statement.
pub const DELETE_KEYWORD: &str = "DELETE";
/// Verb that opens an insert statement.
pub const INSERT_KEYWORD: &str = "INSERT";
/// Sequence that terminates a statement at the end of a physical line.
pub const STATEMENT_DELIMITER: &str = ";\n";

/// Kind of update statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    /// Removes every object of a (subject, predicate) pair in a graph.
    Delete,
    /// Adds one or more triples.
    Insert,
}

impl StatementKind {
    /// Classifies statement text by its leading verb.
    pub fn classify(text: &str) -> Option<Self> {
        let text = text.trim_start();
        if text.starts_with(DELETE_KEYWORD) {
            Some(StatementKind::Delete)
        } else if text.starts_with(INSERT_KEYWORD) {
            Some(StatementKind::Insert)
        } else {
            None
        }
    }
}

/// One delimited update statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    kind: StatementKind,
    text: String,
}

impl Statement {
    /// Wraps statement text whose kind is already known.
    ///
    /// The text must end with [`STATEMENT_DELIMITER`].
    pub fn new(kind: StatementKind, text: String) -> Self {
        debug_assert!(text.ends_with(STATEMENT_DELIMITER));
        Self { kind, text }
    }

    /// Returns the statement kind.
    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Returns true for delete statements.
    pub fn is_delete(&self) -> bool {
        self.kind == StatementKind::Delete
    }

    /// Returns the full statement text, delimiter included.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consumes the statement and returns its text.
    pub fn into_text(self) -> String {
        self.text
    }
}

/// A parsed statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedStatement {
    /// Delete every object of `(subject, predicate)` in `graph`.
    Delete {
        /// Graph scope.
        graph: Uri,
        /// Subject whose values are cleared.
        subject: Uri,
        /// Predicate whose values are cleared.
        predicate: Uri,
    },
    /// Insert the given triples.
    Insert {
        /// Triples to add.
        triples: Vec<Triple>,
    },
}

impl ParsedStatement {
    /// Returns the subject the statement touches.
    pub fn subject(&self) -> Option<&Uri> {
        match self {
            ParsedStatement::Delete { subject, .. } => Some(subject),
            ParsedStatement::Insert { triples } => triples.first().map(|t| &t.subject),
        }
    }
}

/// The atomic delivery unit.
///
/// Either a single insert statement, or delete statement(s) immediately
/// followed by the insert statement(s) that replace what they removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    statements: Vec<Statement>,
}

impl Batch {
    /// Creates a batch; returns `None` for an empty statement list.
    pub fn new(statements: Vec<Statement>) -> Option<Self> {
        if statements.is_empty() {
            None
        } else {
            Some(Self { statements })
        }
    }

    /// Returns the statements in application order.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Number of statements.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Always false; batches are never empty.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Number of delete statements.
    pub fn delete_count(&self) -> usize {
        self.statements.iter().filter(|s| s.is_delete()).count()
    }

    /// Number of insert statements.
    pub fn insert_count(&self) -> usize {
        self.len() - self.delete_count()
    }

    /// The concatenated statement text sent as one request.
    pub fn text(&self) -> String {
        self.statements.iter().map(Statement::text).collect()
    }

    /// Subject of the first statement, for error reporting.
    pub fn subject(&self) -> Option<String> {
        self.statements
            .iter()
            .find_map(|s| parse_statement(s.text()).ok())
            .and_then(|parsed| parsed.subject().map(|uri| uri.to_string()))
    }
}
