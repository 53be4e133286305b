//! # graphload core
//!
//! Record mapping and statement generation.
//!
//! This crate provides:
//! - [`Record`] wrapping one source observation and its natural key
//! - Static rule tables evaluated by the [`Mapper`]
//! - [`ResolverCache`] memoizing natural key lookups for one run
//! - [`StatementGenerator`] producing idempotent delete/insert statements
//! - [`JsonLdDocument`] gathering a run's mappings into one JSON-LD document
//!
//! ## Idempotence
//!
//! Every single-valued predicate is cleared before it is set and every
//! multi-valued predicate is cleared before its full current set is
//! inserted, so applying the same statements twice leaves the store as
//! applying them once. Context subjects (names, addresses, relationships,
//! roles) are keyed from their parent's identifiers for the same reason.
//!
//! The `dcterms:valid` marker carries the mapping date and is the only value
//! that differs between runs on identical input; pin it with
//! [`MapperConfig::with_mapping_date`] when comparing output.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod generator;
mod jsonld;
mod mapper;
mod record;
mod resolver;
pub mod rules;
pub mod types;
pub mod vocab;

pub use config::{MapperConfig, DEFAULT_BASE};
pub use error::{ResolverError, ResolverResult, TransformError, TransformResult};
pub use generator::StatementGenerator;
pub use jsonld::JsonLdDocument;
pub use mapper::{Mapper, Mapping, MappingContext, PredicateUpdate, Resolved};
pub use record::{organization_records, Record, RecordKind};
pub use resolver::{
    EntityLookup, LookupKind, LookupOutcome, NaturalKey, OfflineLookup, ResolverCache,
    ResolverStats,
};
pub use rules::{Cardinality, FieldRule, ObjectKind, Shape};
pub use vocab::{Graphs, Namespace, Namespaces};
