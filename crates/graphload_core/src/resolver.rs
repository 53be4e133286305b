//! Entity resolution.
//!
//! A natural key is looked up through an [`EntityLookup`]; answers are
//! memoized for the run by [`ResolverCache`]. A "not found" answer makes the
//! mapper mint a URI from the key, so resolution never fails a record unless
//! the lookup itself keeps failing.

use crate::error::ResolverResult;
use graphload_codec::Uri;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// The kind of entity being looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LookupKind {
    /// A person.
    Person,
    /// An organization.
    Organization,
    /// A subject heading.
    Topic,
}

impl LookupKind {
    /// Path segment of the lookup endpoint.
    pub const fn as_str(self) -> &'static str {
        match self {
            LookupKind::Person => "person",
            LookupKind::Organization => "organization",
            LookupKind::Topic => "topic",
        }
    }
}

/// Entity-type-specific set of identifying fields.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NaturalKey {
    kind: LookupKind,
    fields: BTreeMap<String, String>,
}

impl NaturalKey {
    /// Creates an empty key.
    pub fn new(kind: LookupKind) -> Self {
        Self {
            kind,
            fields: BTreeMap::new(),
        }
    }

    /// Adds a field. Blank values are skipped.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.trim().is_empty() {
            self.fields.insert(name.to_string(), value);
        }
        self
    }

    /// Adds a field when a value is present.
    #[must_use]
    pub fn with_opt(self, name: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.with(name, value),
            None => self,
        }
    }

    /// Returns the entity kind.
    pub fn kind(&self) -> LookupKind {
        self.kind
    }

    /// Returns the fields in name order.
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// Canonical text form, `kind|name=value|...` with names sorted.
    ///
    /// Used as the cache key and as the input of minted URIs.
    pub fn canonical(&self) -> String {
        let mut out = self.kind.as_str().to_string();
        for (name, value) in &self.fields {
            out.push('|');
            out.push_str(name);
            out.push('=');
            out.push_str(value);
        }
        out
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Answer of a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The canonical URI.
    Found(Uri),
    /// The entity is not known.
    NotFound,
}

impl LookupOutcome {
    /// Returns the URI of a positive answer.
    pub fn uri(&self) -> Option<&Uri> {
        match self {
            LookupOutcome::Found(uri) => Some(uri),
            LookupOutcome::NotFound => None,
        }
    }
}

/// Source of canonical identifiers.
pub trait EntityLookup: Send + Sync {
    /// Looks up a natural key.
    ///
    /// # Errors
    ///
    /// Anything other than a found/not-found answer is an error.
    fn lookup(&self, key: &NaturalKey) -> ResolverResult<LookupOutcome>;
}

impl<L: EntityLookup + ?Sized> EntityLookup for &L {
    fn lookup(&self, key: &NaturalKey) -> ResolverResult<LookupOutcome> {
        (**self).lookup(key)
    }
}

impl<L: EntityLookup + ?Sized> EntityLookup for std::sync::Arc<L> {
    fn lookup(&self, key: &NaturalKey) -> ResolverResult<LookupOutcome> {
        (**self).lookup(key)
    }
}

/// Lookup that never finds anything; every entity gets a minted URI.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineLookup;

impl EntityLookup for OfflineLookup {
    fn lookup(&self, _key: &NaturalKey) -> ResolverResult<LookupOutcome> {
        Ok(LookupOutcome::NotFound)
    }
}

/// Cache counters.
#[derive(Debug, Default)]
pub struct ResolverStats {
    hits: AtomicU64,
    misses: AtomicU64,
    errors: AtomicU64,
}

impl ResolverStats {
    /// Number of answers served from the cache.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Number of keys sent to the lookup.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Number of lookups that failed.
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }
}

/// Read-through cache in front of an [`EntityLookup`].
///
/// Safe to share between threads. Two threads missing on the same key may
/// both call the lookup; once a positive answer is stored it is never
/// replaced by a negative one. Failures are not cached.
pub struct ResolverCache<L> {
    lookup: L,
    entries: RwLock<HashMap<String, LookupOutcome>>,
    stats: ResolverStats,
}

impl<L: EntityLookup> ResolverCache<L> {
    /// Creates an empty cache.
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            entries: RwLock::new(HashMap::new()),
            stats: ResolverStats::default(),
        }
    }

    /// Resolves a key, calling the lookup at most once per miss.
    ///
    /// # Errors
    ///
    /// Returns the lookup's error; nothing is cached in that case.
    pub fn resolve(&self, key: &NaturalKey) -> ResolverResult<LookupOutcome> {
        let canonical = key.canonical();
        if let Some(entry) = self.entries.read().get(&canonical) {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %canonical, "resolver cache hit");
            return Ok(entry.clone());
        }

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key = %canonical, "resolver cache miss");
        let outcome = match self.lookup.lookup(key) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                return Err(err);
            }
        };

        Ok(self.store(canonical, outcome))
    }

    /// Records an answer, keeping an earlier positive answer over a negative one.
    fn store(&self, canonical: String, outcome: LookupOutcome) -> LookupOutcome {
        let mut entries = self.entries.write();
        let entry = entries.entry(canonical).or_insert(LookupOutcome::NotFound);
        if let LookupOutcome::Found(_) = outcome {
            *entry = outcome;
        }
        entry.clone()
    }

    /// Returns the cached answer without calling the lookup.
    pub fn cached(&self, key: &NaturalKey) -> Option<LookupOutcome> {
        self.entries.read().get(&key.canonical()).cloned()
    }

    /// Number of cached keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns the cache counters.
    pub fn stats(&self) -> &ResolverStats {
        &self.stats
    }
}

impl<L: EntityLookup> EntityLookup for ResolverCache<L> {
    fn lookup(&self, key: &NaturalKey) -> ResolverResult<LookupOutcome> {
        self.resolve(key)
    }
}
