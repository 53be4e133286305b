//! Property-based test generators using proptest.
//!
//! Provides strategies for generating terms and mappings that stress the
//! statement text format: quotes, backslashes, line breaks, the `;`
//! delimiter and keywords at line starts.

use graphload_codec::{Term, Uri};
use graphload_core::{Cardinality, Mapping, PredicateUpdate};
use proptest::prelude::*;

/// Strategy for literal values, biased towards text that could end or
/// start a statement if escaped wrongly.
pub fn literal_value_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<String>(),
        prop::collection::vec(
            prop_oneof![
                Just("\"".to_string()),
                Just("\\".to_string()),
                Just("\n".to_string()),
                Just("\r\n".to_string()),
                Just(";".to_string()),
                Just(";\n".to_string()),
                Just("\nDELETE ".to_string()),
                Just("\nINSERT ".to_string()),
                Just("\t".to_string()),
                "[a-zA-Z0-9 ]{0,8}",
            ],
            0..8,
        )
        .prop_map(|parts| parts.concat()),
    ]
}

/// Strategy for URIs under a fixed base.
pub fn uri_strategy() -> impl Strategy<Value = Uri> {
    "[a-z]{1,6}(/[a-z0-9_]{1,6}){0,2}".prop_map(|path| Uri::new(format!("http://example.org/{path}")))
}

/// Strategy for object terms.
pub fn term_strategy() -> impl Strategy<Value = Term> {
    prop_oneof![
        2 => literal_value_strategy().prop_map(Term::literal),
        1 => (literal_value_strategy(), uri_strategy()).prop_map(|(v, dt)| Term::typed(v, dt)),
        1 => uri_strategy().prop_map(Term::Uri),
    ]
}

/// Strategy for update semantics.
pub fn cardinality_strategy() -> impl Strategy<Value = Cardinality> {
    prop_oneof![
        Just(Cardinality::Single),
        Just(Cardinality::Replace),
        Just(Cardinality::Append),
    ]
}

/// Strategy for one predicate update on a small set of subjects.
pub fn predicate_update_strategy() -> impl Strategy<Value = PredicateUpdate> {
    (
        0..3u8,
        0..4u8,
        cardinality_strategy(),
        prop::collection::vec(term_strategy(), 0..4),
    )
        .prop_map(|(subject, predicate, cardinality, objects)| PredicateUpdate {
            subject: Uri::new(format!("http://example.org/s{subject}")),
            predicate: Uri::new(format!("http://example.org/p{predicate}")),
            graph: Uri::new("http://example.org/graph"),
            cardinality,
            objects,
        })
}

/// Strategy for a mapping that clears or sets at least one predicate.
///
/// Mappings that only append cannot be told apart from an empty one on a
/// second application, and mappings without any delete/insert pair cannot
/// be batched, so both are filtered out.
pub fn mapping_strategy() -> impl Strategy<Value = Mapping> {
    prop::collection::vec(predicate_update_strategy(), 1..8)
        .prop_map(|updates| {
            let mut mapping = Mapping::new("generated");
            for update in updates {
                mapping.push(update);
            }
            mapping
        })
        .prop_filter("needs a delete/insert pair", |mapping| {
            mapping
                .updates()
                .iter()
                .any(|u| u.cardinality.clears() && !u.objects.is_empty())
        })
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
