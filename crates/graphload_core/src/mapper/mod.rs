//! Entity mapper.
//!
//! Turns one [`Record`] into an ordered list of [`PredicateUpdate`]s by
//! evaluating static rule tables. Identical input (with the same mapping
//! date) always produces identical output in the same order.

mod organizations;
mod people;
mod publications;

use crate::config::MapperConfig;
use crate::error::{TransformError, TransformResult};
use crate::record::{Record, RecordKind};
use crate::resolver::{EntityLookup, LookupOutcome, NaturalKey};
use crate::rules::{check_shapes, dedup_in_order, Cardinality, FieldRule, Shape};
use crate::vocab::Namespace;
use graphload_codec::{Term, Triple, Uri};
use serde_json::Value;
use tracing::debug;

/// Per-record state handed to extractors.
pub struct MappingContext<'a> {
    config: &'a MapperConfig,
    natural_key: &'a str,
    mapped_on: String,
}

impl<'a> MappingContext<'a> {
    /// Creates a context for one record.
    pub fn new(config: &'a MapperConfig, natural_key: &'a str) -> Self {
        Self {
            config,
            natural_key,
            mapped_on: config.mapping_date().to_string(),
        }
    }

    /// Returns the mapper configuration.
    pub fn config(&self) -> &MapperConfig {
        self.config
    }

    /// Natural key of the record being mapped.
    pub fn natural_key(&self) -> &str {
        self.natural_key
    }

    /// Mapping date as `YYYY-MM-DD`.
    pub fn mapped_on(&self) -> &str {
        &self.mapped_on
    }

    /// Creates a malformed error naming the record.
    pub fn malformed(&self, message: impl Into<String>) -> TransformError {
        TransformError::malformed(self.natural_key, message)
    }

    /// Fails with a malformed error if a present field has the wrong shape.
    pub fn require(&self, view: &Value, fields: &[(&str, Shape)]) -> TransformResult<()> {
        check_shapes(view, fields).map_err(|message| self.malformed(message))
    }
}

/// The new state of one (subject, predicate) pair in one graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateUpdate {
    /// Subject.
    pub subject: Uri,
    /// Predicate.
    pub predicate: Uri,
    /// Named graph.
    pub graph: Uri,
    /// Update semantics.
    pub cardinality: Cardinality,
    /// Current values, deduplicated in first-seen order. May be empty.
    pub objects: Vec<Term>,
}

/// Mapper output for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    natural_key: String,
    updates: Vec<PredicateUpdate>,
}

impl Mapping {
    /// Creates an empty mapping.
    pub fn new(natural_key: impl Into<String>) -> Self {
        Self {
            natural_key: natural_key.into(),
            updates: Vec::new(),
        }
    }

    /// Natural key of the mapped record.
    pub fn natural_key(&self) -> &str {
        &self.natural_key
    }

    /// Updates in rule order.
    pub fn updates(&self) -> &[PredicateUpdate] {
        &self.updates
    }

    /// Flattens the updates into triples, in order.
    pub fn triples(&self) -> Vec<Triple> {
        self.updates
            .iter()
            .flat_map(|update| {
                update.objects.iter().map(|object| {
                    Triple::new(
                        update.subject.clone(),
                        update.predicate.clone(),
                        object.clone(),
                        update.graph.clone(),
                    )
                })
            })
            .collect()
    }

    /// Adds an update, merging values into an earlier update of the same
    /// subject, predicate and graph.
    ///
    /// Single-valued predicates keep their first value; the rest are dropped
    /// and logged at debug level.
    pub fn push(&mut self, mut update: PredicateUpdate) {
        let existing = self.updates.iter().position(|u| {
            u.subject == update.subject && u.predicate == update.predicate && u.graph == update.graph
        });
        let index = match existing {
            Some(index) => {
                self.updates[index].objects.append(&mut update.objects);
                index
            }
            None => {
                self.updates.push(update);
                self.updates.len() - 1
            }
        };
        let target = &mut self.updates[index];
        target.objects = dedup_in_order(std::mem::take(&mut target.objects));
        if target.cardinality == Cardinality::Single {
            keep_first(&self.natural_key, target);
        }
    }

    /// Evaluates a rule table against one subject.
    ///
    /// # Errors
    ///
    /// Propagates the first extractor error.
    pub fn apply(
        &mut self,
        ctx: &MappingContext<'_>,
        subject: &Uri,
        graph: &Uri,
        rules: &[FieldRule],
        view: &Value,
    ) -> TransformResult<()> {
        for rule in rules {
            let values = (rule.extract)(ctx, view)?;
            self.push(PredicateUpdate {
                subject: subject.clone(),
                predicate: rule.predicate.uri(),
                graph: graph.clone(),
                cardinality: rule.cardinality,
                objects: rule.terms(ctx, values),
            });
        }
        Ok(())
    }
}

/// A foreign identifier after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Canonical or minted URI.
    pub uri: Uri,
    /// True when the URI was minted locally.
    pub minted: bool,
}

/// Maps records of every kind.
pub struct Mapper<L> {
    config: MapperConfig,
    resolver: L,
}

impl<L: EntityLookup> Mapper<L> {
    /// Creates a mapper.
    ///
    /// Pass a [`crate::ResolverCache`] (or a reference to one) as the
    /// resolver to memoize lookups.
    pub fn new(config: MapperConfig, resolver: L) -> Self {
        Self { config, resolver }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Maps one record.
    ///
    /// # Errors
    ///
    /// Returns a [`TransformError`] naming the record if its shape is
    /// unexpected or a lookup keeps failing.
    pub fn map(&self, record: &Record) -> TransformResult<Mapping> {
        let ctx = MappingContext::new(&self.config, record.key());
        match record.kind() {
            RecordKind::Organization => organizations::map(&ctx, record),
            RecordKind::Person => people::map(&ctx, record),
            RecordKind::Publication => publications::map(&ctx, record, self),
        }
    }

    /// Resolves a natural key, minting a URI in `namespace` when the
    /// entity is not found.
    pub(crate) fn resolve(
        &self,
        ctx: &MappingContext<'_>,
        key: &NaturalKey,
        namespace: &Namespace,
    ) -> TransformResult<Resolved> {
        let outcome = self
            .resolver
            .lookup(key)
            .map_err(|source| TransformError::Resolver {
                natural_key: ctx.natural_key().to_string(),
                source,
            })?;
        Ok(match outcome {
            LookupOutcome::Found(uri) => Resolved { uri, minted: false },
            LookupOutcome::NotFound => Resolved {
                uri: namespace.minted(&key.canonical()),
                minted: true,
            },
        })
    }
}

/// Extractor helpers shared by the rule tables.
pub(crate) mod extract {
    use super::MappingContext;
    use crate::error::TransformResult;
    use serde_json::Value;

    /// Extractor result with no values.
    pub fn none() -> TransformResult<Vec<String>> {
        Ok(Vec::new())
    }

    /// Extractor result with at most one value.
    pub fn one(value: Option<String>) -> TransformResult<Vec<String>> {
        Ok(value.into_iter().collect())
    }

    /// The mapping date, for validity markers.
    pub fn mapping_date(ctx: &MappingContext<'_>, _: &Value) -> TransformResult<Vec<String>> {
        Ok(vec![ctx.mapped_on().to_string()])
    }

    /// Joins name parts that are present with single spaces.
    pub fn join_names(parts: &[Option<String>]) -> Option<String> {
        let joined = parts.iter().flatten().cloned().collect::<Vec<_>>().join(" ");
        (!joined.is_empty()).then_some(joined)
    }
}

/// Truncates a single-valued update to its first value, returning how many
/// values were dropped.
fn keep_first(natural_key: &str, update: &mut PredicateUpdate) -> usize {
    let dropped = update.objects.len().saturating_sub(1);
    if dropped > 0 {
        debug!(
            natural_key,
            subject = %update.subject,
            predicate = %update.predicate,
            dropped,
            "single-valued predicate kept its first value"
        );
        update.objects.truncate(1);
    }
    dropped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{LookupKind, OfflineLookup};
    use crate::vocab::{RDFS_LABEL, RDF_TYPE};

    fn update(predicate: &str, cardinality: Cardinality, objects: &[&str]) -> PredicateUpdate {
        PredicateUpdate {
            subject: Uri::new("http://s"),
            predicate: Uri::new(predicate),
            graph: Uri::new("http://g"),
            cardinality,
            objects: objects.iter().map(|o| Term::literal(*o)).collect(),
        }
    }

    #[test]
    fn push_merges_same_predicate() {
        let mut mapping = Mapping::new("k");
        mapping.push(update("http://p", Cardinality::Replace, &["a", "b"]));
        mapping.push(update("http://q", Cardinality::Single, &["x", "y"]));
        mapping.push(update("http://p", Cardinality::Replace, &["b", "c"]));

        assert_eq!(mapping.updates().len(), 2);
        assert_eq!(
            mapping.updates()[0].objects,
            vec![Term::literal("a"), Term::literal("b"), Term::literal("c")]
        );
        assert_eq!(mapping.updates()[1].objects, vec![Term::literal("x")]);
        assert_eq!(mapping.triples().len(), 4);
    }

    #[test]
    fn single_value_truncation_reports_what_it_drops() {
        let mut one = update("http://q", Cardinality::Single, &["x"]);
        assert_eq!(keep_first("k", &mut one), 0);

        let mut three = update("http://q", Cardinality::Single, &["x", "y", "z"]);
        assert_eq!(keep_first("k", &mut three), 2);
        assert_eq!(three.objects, vec![Term::literal("x")]);

        let mut mapping = Mapping::new("k");
        mapping.push(update("http://q", Cardinality::Single, &["x"]));
        mapping.push(update("http://q", Cardinality::Single, &["x", "y"]));
        assert_eq!(mapping.updates()[0].objects, vec![Term::literal("x")]);
    }

    #[test]
    fn apply_evaluates_rules_in_order() {
        fn label(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
            extract::one(crate::rules::string_at(view, "/name"))
        }
        fn kind(_: &MappingContext<'_>, _: &Value) -> TransformResult<Vec<String>> {
            Ok(vec!["http://t".to_string()])
        }
        static RULES: &[FieldRule] = &[
            FieldRule::replace(RDF_TYPE, kind).uri(),
            FieldRule::single(RDFS_LABEL, label),
        ];

        let config = MapperConfig::default();
        let ctx = MappingContext::new(&config, "k");
        let mut mapping = Mapping::new("k");
        mapping
            .apply(
                &ctx,
                &Uri::new("http://s"),
                &Uri::new("http://g"),
                RULES,
                &serde_json::json!({"name": "Label"}),
            )
            .unwrap();

        let triples = mapping.triples();
        assert_eq!(triples[0].object, Term::uri("http://t"));
        assert_eq!(triples[1].object, Term::literal("Label"));
    }

    #[test]
    fn absent_values_still_produce_an_update() {
        let mut mapping = Mapping::new("k");
        mapping.push(update("http://p", Cardinality::Single, &[]));
        assert_eq!(mapping.updates().len(), 1);
        assert!(mapping.triples().is_empty());
    }

    #[test]
    fn unresolved_keys_are_minted() {
        let mapper = Mapper::new(MapperConfig::default(), OfflineLookup);
        let ctx = MappingContext::new(mapper.config(), "k");
        let key = NaturalKey::new(LookupKind::Topic).with("name", "Biology");
        let ns = &mapper.config().namespaces.concepts;

        let first = mapper.resolve(&ctx, &key, ns).unwrap();
        let second = mapper.resolve(&ctx, &key, ns).unwrap();
        assert!(first.minted);
        assert_eq!(first, second);
        assert!(first.uri.as_str().starts_with(ns.base()));
    }

    #[test]
    fn join_names_skips_missing_parts() {
        assert_eq!(
            extract::join_names(&[Some("Bill".into()), None, Some("Chen".into())]).as_deref(),
            Some("Bill Chen")
        );
        assert_eq!(extract::join_names(&[None, None]), None);
    }
}
