//! JSON-LD documents.
//!
//! An alternative to statement text for inspecting mapped records: every
//! mapping of a run is gathered into one `{"@context", "@graph"}` document.
//! Each named graph becomes a node of the top-level `@graph` holding one
//! node per subject.

use crate::mapper::Mapping;
use crate::vocab::{PREFIXES, RDF_TYPE};
use graphload_codec::{Term, Triple, Uri};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

type Nodes = BTreeMap<Uri, BTreeMap<String, Vec<Value>>>;

/// Collects mappings into a single JSON-LD document.
#[derive(Debug, Default)]
pub struct JsonLdDocument {
    graphs: BTreeMap<Uri, Nodes>,
    records: usize,
}

impl JsonLdDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the current values of one mapping.
    pub fn put(&mut self, mapping: &Mapping) {
        for Triple {
            subject,
            predicate,
            object,
            graph,
        } in mapping.triples()
        {
            let key = if predicate == RDF_TYPE.uri() {
                "@type".to_string()
            } else {
                compact(&predicate)
            };
            let value = match (&object, key.as_str()) {
                (Term::Uri(uri), "@type") => Value::String(compact(uri)),
                _ => object_value(&object),
            };
            let values = self
                .graphs
                .entry(graph)
                .or_default()
                .entry(subject)
                .or_default()
                .entry(key)
                .or_default();
            if !values.contains(&value) {
                values.push(value);
            }
        }
        self.records += 1;
    }

    /// Number of mappings added.
    pub fn records(&self) -> usize {
        self.records
    }

    /// Builds the document.
    pub fn to_value(&self) -> Value {
        let context: Map<String, Value> = PREFIXES
            .iter()
            .map(|(prefix, vocab)| (prefix.to_string(), Value::String(vocab.base().to_string())))
            .collect();

        let graphs: Vec<Value> = self
            .graphs
            .iter()
            .map(|(graph, nodes)| {
                let nodes: Vec<Value> = nodes
                    .iter()
                    .map(|(subject, properties)| {
                        let mut node = Map::new();
                        node.insert("@id".into(), Value::String(subject.to_string()));
                        for (key, values) in properties {
                            node.insert(key.clone(), Value::Array(values.clone()));
                        }
                        Value::Object(node)
                    })
                    .collect();
                json!({ "@id": graph.as_str(), "@graph": nodes })
            })
            .collect();

        json!({ "@context": context, "@graph": graphs })
    }
}

/// Shortens a URI to `prefix:local` when a known vocabulary covers it.
fn compact(uri: &Uri) -> String {
    PREFIXES
        .iter()
        .find_map(|(prefix, vocab)| {
            uri.as_str()
                .strip_prefix(vocab.base())
                .filter(|local| !local.is_empty() && !local.contains(['/', '#']))
                .map(|local| format!("{prefix}:{local}"))
        })
        .unwrap_or_else(|| uri.to_string())
}

fn object_value(term: &Term) -> Value {
    match term {
        Term::Uri(uri) => json!({ "@id": uri.as_str() }),
        Term::Literal {
            value,
            datatype: None,
        } => Value::String(value.clone()),
        Term::Literal {
            value,
            datatype: Some(datatype),
        } => json!({ "@value": value, "@type": compact(datatype) }),
    }
}
