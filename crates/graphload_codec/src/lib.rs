//! # graphload codec
//!
//! Triple terms and the update statement text format.
//!
//! This crate provides:
//! - [`Term`], [`Triple`] and [`Uri`] values
//! - [`StatementEncoder`] producing delete/insert statement text
//! - [`parse_statement`] reading that text back exactly
//! - [`StatementReader`] grouping a statement stream into atomic [`Batch`]es
//!
//! ## Stream format
//!
//! - UTF-8 only; invalid bytes are a fatal error
//! - A statement is one or more physical lines ending with `;` at line end
//! - A statement starts with `DELETE` or `INSERT`
//! - Literals are escaped so a value can never end a statement early
//!
//! ## Usage
//!
//! ```
//! use graphload_codec::{parse_statement, ParsedStatement, StatementEncoder, Term, Uri};
//!
//! let mut encoder = StatementEncoder::new();
//! let graph = Uri::new("http://example.org/graph");
//! let subject = Uri::new("http://example.org/s");
//! let predicate = Uri::new("http://example.org/p");
//! let insert = encoder
//!     .insert(&graph, &subject, &predicate, &[Term::literal("line one\nline two")])
//!     .unwrap();
//!
//! let ParsedStatement::Insert { triples } = parse_statement(insert.text()).unwrap() else {
//!     unreachable!()
//! };
//! assert_eq!(triples[0].object, Term::literal("line one\nline two"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod reader;
mod statement;
mod term;

pub use decoder::{parse_statement, unescape_literal, StatementDecoder};
pub use encoder::{escape_literal, StatementEncoder};
pub use error::{CodecError, CodecResult};
pub use reader::{Grouping, ReaderConfig, StatementReader};
pub use statement::{
    Batch, ParsedStatement, Statement, StatementKind, DELETE_KEYWORD, INSERT_KEYWORD,
    STATEMENT_DELIMITER,
};
pub use term::{Term, Triple, Uri};
