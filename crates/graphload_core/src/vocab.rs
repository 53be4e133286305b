//! Vocabularies and entity namespaces.
//!
//! Ontology terms are compile-time constants. Entity namespaces (where
//! subjects are minted) are runtime values carried by [`crate::MapperConfig`].

use graphload_codec::Uri;
use sha2::{Digest, Sha256};
use std::fmt;

/// A fixed ontology namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vocab(&'static str);

impl Vocab {
    /// Creates a vocabulary from its base IRI.
    pub const fn new(base: &'static str) -> Self {
        Self(base)
    }

    /// Returns a term of this vocabulary.
    pub const fn iri(self, local: &'static str) -> Iri {
        Iri {
            base: self.0,
            local,
        }
    }

    /// Returns the base IRI.
    pub const fn base(self) -> &'static str {
        self.0
    }
}

/// A term of a fixed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iri {
    base: &'static str,
    local: &'static str,
}

impl Iri {
    /// Builds the full URI.
    pub fn uri(&self) -> Uri {
        Uri::new(self.to_string())
    }

    /// Returns the local part.
    pub const fn local(&self) -> &'static str {
        self.local
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.base, self.local)
    }
}

/// RDF syntax.
pub const RDF: Vocab = Vocab::new("http://www.w3.org/1999/02/22-rdf-syntax-ns#");
/// RDF schema.
pub const RDFS: Vocab = Vocab::new("http://www.w3.org/2000/01/rdf-schema#");
/// XML schema datatypes.
pub const XSD: Vocab = Vocab::new("http://www.w3.org/2001/XMLSchema#");
/// Friend of a friend.
pub const FOAF: Vocab = Vocab::new("http://xmlns.com/foaf/0.1/");
/// VIVO core.
pub const VIVO: Vocab = Vocab::new("http://vivoweb.org/ontology/core#");
/// SKOS.
pub const SKOS: Vocab = Vocab::new("http://www.w3.org/2004/02/skos/core#");
/// Dublin Core terms.
pub const DCTERMS: Vocab = Vocab::new("http://purl.org/dc/terms/");
/// vCard.
pub const VCARD: Vocab = Vocab::new("http://www.w3.org/2006/vcard/ns#");
/// OBO relations and BFO.
pub const OBO: Vocab = Vocab::new("http://purl.obolibrary.org/obo/");
/// Bibliographic ontology.
pub const BIBO: Vocab = Vocab::new("http://purl.org/ontology/bibo/");

/// Conventional prefixes for the vocabularies above.
pub const PREFIXES: &[(&str, Vocab)] = &[
    ("rdf", RDF),
    ("rdfs", RDFS),
    ("xsd", XSD),
    ("foaf", FOAF),
    ("vivo", VIVO),
    ("skos", SKOS),
    ("dcterms", DCTERMS),
    ("vcard", VCARD),
    ("obo", OBO),
    ("bibo", BIBO),
];

/// `rdf:type`
pub const RDF_TYPE: Iri = RDF.iri("type");
/// `rdfs:label`
pub const RDFS_LABEL: Iri = RDFS.iri("label");
/// `xsd:date`
pub const XSD_DATE: Iri = XSD.iri("date");
/// `skos:prefLabel`
pub const SKOS_PREF_LABEL: Iri = SKOS.iri("prefLabel");
/// `dcterms:identifier`
pub const DCTERMS_IDENTIFIER: Iri = DCTERMS.iri("identifier");
/// `dcterms:valid`, the validity marker carrying the mapping date.
pub const DCTERMS_VALID: Iri = DCTERMS.iri("valid");
/// `obo:BFO_0000050`, part of.
pub const PART_OF: Iri = OBO.iri("BFO_0000050");
/// `obo:RO_0000052`, inheres in.
pub const INHERES_IN: Iri = OBO.iri("RO_0000052");
/// `obo:RO_0000053`, bearer of.
pub const BEARER_OF: Iri = OBO.iri("RO_0000053");

/// Geonames resource for the United States.
pub const UNITED_STATES_GEONAMES: &str = "http://sws.geonames.org/6252001/";

/// Percent-encodes characters that may not appear in an IRI.
fn encode_local(local: &str) -> String {
    let mut out = String::with_capacity(local.len());
    for c in local.chars() {
        if c.is_whitespace()
            || c.is_control()
            || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' | '%')
        {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{byte:02X}"));
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Hex digest used for minted identifiers.
///
/// The first 16 bytes of SHA-256 over the key, lowercase hex.
pub fn mint_id(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    digest[..16].iter().map(|b| format!("{b:02x}")).collect()
}

/// A namespace entity subjects are created in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    base: String,
}

impl Namespace {
    /// Creates a namespace from its base IRI.
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    /// Passthrough URI for a source identifier such as an alias.
    pub fn term(&self, local: &str) -> Uri {
        Uri::new(format!("{}{}", self.base, encode_local(local)))
    }

    /// Deterministic URI derived from a natural key.
    ///
    /// The same key always yields the same URI.
    pub fn minted(&self, key: &str) -> Uri {
        Uri::new(format!("{}{}", self.base, mint_id(key)))
    }

    /// Returns the base IRI.
    pub fn base(&self) -> &str {
        &self.base
    }
}

/// Entity and context namespaces, all under one base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
    /// Organization subjects.
    pub organizations: Namespace,
    /// Person subjects.
    pub people: Namespace,
    /// Publication subjects.
    pub publications: Namespace,
    /// Concept (topic) subjects.
    pub concepts: Namespace,
    /// Name context subjects.
    pub names: Namespace,
    /// Address context subjects.
    pub addresses: Namespace,
    /// Relationship context subjects.
    pub relationships: Namespace,
    /// Role context subjects.
    pub roles: Namespace,
    /// Identifier datatypes.
    pub identifiers: Namespace,
}

impl Namespaces {
    /// Lays out every namespace under `base`.
    pub fn under(base: &str) -> Self {
        let ns = |path: &str| Namespace::new(format!("{base}{path}"));
        Self {
            organizations: ns("agents/organizations/"),
            people: ns("agents/people/"),
            publications: ns("publications/"),
            concepts: ns("concepts/"),
            names: ns("context/names/"),
            addresses: ns("context/addresses/"),
            relationships: ns("context/relationships/"),
            roles: ns("context/roles/"),
            identifiers: ns("context/identifiers/"),
        }
    }
}

/// Named graphs, one per dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graphs {
    /// Organization hierarchy graph.
    pub organizations: Uri,
    /// People profiles graph.
    pub people: Uri,
    /// Publications graph.
    pub publications: Uri,
}

impl Graphs {
    /// Lays out every graph under `base`.
    pub fn under(base: &str) -> Self {
        Self {
            organizations: Uri::new(format!("{base}graphs/stanford_organizations")),
            people: Uri::new(format!("{base}graphs/stanford_people")),
            publications: Uri::new(format!("{base}graphs/wos")),
        }
    }
}
