//! Cross-crate integration test helpers.
//!
//! [`IntegrationHarness`] runs records through the mapper and generator
//! and applies the resulting statement text to a [`MemoryStore`].

use crate::fixtures::fixture_config;
use crate::scripted::StaticLookup;
use crate::store::MemoryStore;
use graphload_codec::CodecResult;
use graphload_core::{
    EntityLookup, Mapper, MapperConfig, Record, ResolverCache, StatementGenerator,
    TransformResult,
};

/// Mapper, generator and store wired together.
pub struct IntegrationHarness<L = StaticLookup> {
    mapper: Mapper<ResolverCache<L>>,
    generator: StatementGenerator,
    store: MemoryStore,
}

impl IntegrationHarness<StaticLookup> {
    /// Creates a harness with the fixture configuration and an empty lookup.
    pub fn new() -> Self {
        Self::with_lookup(fixture_config(), StaticLookup::new())
    }
}

impl Default for IntegrationHarness<StaticLookup> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: EntityLookup> IntegrationHarness<L> {
    /// Creates a harness over `lookup`.
    pub fn with_lookup(config: MapperConfig, lookup: L) -> Self {
        Self {
            mapper: Mapper::new(config, ResolverCache::new(lookup)),
            generator: StatementGenerator::new(),
            store: MemoryStore::new(),
        }
    }

    /// Returns the mapper.
    pub fn mapper(&self) -> &Mapper<ResolverCache<L>> {
        &self.mapper
    }

    /// Returns the store.
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Maps records and returns the statement text, records in order.
    pub fn transform(&mut self, records: &[Record]) -> TransformResult<String> {
        let mut text = Vec::new();
        for record in records {
            let mapping = self.mapper.map(record)?;
            // Writing to a Vec cannot fail.
            let _ = self.generator.write_to(&mapping, &mut text);
        }
        Ok(String::from_utf8_lossy(&text).into_owned())
    }

    /// Applies statement text to the store, returning the batch count.
    pub fn apply(&mut self, text: &str) -> CodecResult<usize> {
        self.store.apply_stream(text.as_bytes())
    }

    /// Transforms records and applies the result.
    ///
    /// # Panics
    ///
    /// Panics if mapping or reading fails; fixtures are expected to be valid.
    pub fn ingest(&mut self, records: &[Record]) -> String {
        let text = self
            .transform(records)
            .unwrap_or_else(|err| panic!("transform failed: {err}"));
        self.apply(&text)
            .unwrap_or_else(|err| panic!("apply failed: {err}"));
        text
    }
}
