//! Statement generator.
//!
//! Turns a [`Mapping`] into delete/insert statements:
//!
//! | Cardinality | Statements |
//! |-------------|------------|
//! | Single | delete all, insert the value (if any) |
//! | Replace | delete all, insert the full current set (if any) |
//! | Append | insert only |
//!
//! Deletes with nothing to insert come first, so the batching reader joins
//! them to the record's first delete/insert pair instead of leaving them
//! on their own.

use crate::mapper::{Mapping, PredicateUpdate};
use graphload_codec::{Statement, StatementEncoder};
use std::io::{self, Write};
use tracing::debug;

/// Generates statement text for mappings.
pub struct StatementGenerator {
    encoder: StatementEncoder,
}

impl StatementGenerator {
    /// Creates a generator.
    pub fn new() -> Self {
        Self {
            encoder: StatementEncoder::new(),
        }
    }

    /// Generates the statements for one mapping, in application order.
    pub fn generate(&mut self, mapping: &Mapping) -> Vec<Statement> {
        let updates = mapping.updates();
        let mut statements = Vec::with_capacity(updates.len() * 2);

        for update in updates.iter().filter(|u| u.cardinality.clears() && u.objects.is_empty()) {
            statements.push(self.delete(update));
        }
        for update in updates.iter().filter(|u| u.cardinality.clears() && !u.objects.is_empty()) {
            statements.push(self.delete(update));
            statements.extend(self.insert(update));
        }
        for update in updates.iter().filter(|u| !u.cardinality.clears()) {
            statements.extend(self.insert(update));
        }

        debug!(
            natural_key = mapping.natural_key(),
            statements = statements.len(),
            "generated statements"
        );
        statements
    }

    /// Generates and writes the statements for one mapping.
    ///
    /// Returns the number of statements written.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_to<W: Write>(&mut self, mapping: &Mapping, out: &mut W) -> io::Result<usize> {
        let statements = self.generate(mapping);
        for statement in &statements {
            out.write_all(statement.text().as_bytes())?;
        }
        Ok(statements.len())
    }

    fn delete(&mut self, update: &PredicateUpdate) -> Statement {
        self.encoder
            .delete(&update.graph, &update.subject, &update.predicate)
    }

    fn insert(&mut self, update: &PredicateUpdate) -> Option<Statement> {
        self.encoder.insert(
            &update.graph,
            &update.subject,
            &update.predicate,
            &update.objects,
        )
    }
}

impl Default for StatementGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Cardinality;
    use graphload_codec::{ReaderConfig, StatementKind, StatementReader, Term, Uri};

    fn update(predicate: &str, cardinality: Cardinality, objects: &[&str]) -> PredicateUpdate {
        PredicateUpdate {
            subject: Uri::new("http://s"),
            predicate: Uri::new(predicate),
            graph: Uri::new("http://g"),
            cardinality,
            objects: objects.iter().map(|o| Term::literal(*o)).collect(),
        }
    }

    fn mapping(updates: Vec<PredicateUpdate>) -> Mapping {
        let mut mapping = Mapping::new("k");
        for update in updates {
            mapping.push(update);
        }
        mapping
    }

    #[test]
    fn statement_order() {
        let mapping = mapping(vec![
            update("http://append", Cardinality::Append, &["a"]),
            update("http://single", Cardinality::Single, &["v"]),
            update("http://cleared", Cardinality::Single, &[]),
            update("http://set", Cardinality::Replace, &["x", "y"]),
            update("http://nothing", Cardinality::Append, &[]),
        ]);
        let statements = StatementGenerator::new().generate(&mapping);
        let kinds: Vec<_> = statements.iter().map(Statement::kind).collect();
        assert_eq!(
            kinds,
            vec![
                StatementKind::Delete,
                StatementKind::Delete,
                StatementKind::Insert,
                StatementKind::Delete,
                StatementKind::Insert,
                StatementKind::Insert,
            ]
        );
        assert!(statements[0].text().contains("<http://cleared>"));
        assert!(statements[4].text().contains("\"x\""));
        assert!(statements[4].text().contains("\"y\""));
        assert!(statements[5].text().contains("<http://append>"));
    }

    #[test]
    fn output_never_yields_a_lone_delete_batch() {
        let mapping = mapping(vec![
            update("http://cleared", Cardinality::Single, &[]),
            update("http://single", Cardinality::Single, &["v"]),
            update("http://append", Cardinality::Append, &["a"]),
        ]);
        let mut text = Vec::new();
        let written = StatementGenerator::new().write_to(&mapping, &mut text).unwrap();
        assert_eq!(written, 4);

        let batches: Vec<_> = StatementReader::with_config(text.as_slice(), ReaderConfig::new())
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 4);
    }
}
