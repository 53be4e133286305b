//! Source records.

use crate::error::{TransformError, TransformResult};
use serde_json::{Map, Value};
use std::fmt;

/// The kind of entity a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// A unit of the organization hierarchy.
    Organization,
    /// A person profile.
    Person,
    /// A publication.
    Publication,
}

impl RecordKind {
    /// The field holding the natural key.
    pub const fn key_field(self) -> &'static str {
        match self {
            RecordKind::Organization => "alias",
            RecordKind::Person => "profileId",
            RecordKind::Publication => "UID",
        }
    }

    /// Parses a kind name as used on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "organizations" | "organization" => Some(RecordKind::Organization),
            "people" | "person" => Some(RecordKind::Person),
            "publications" | "publication" => Some(RecordKind::Publication),
            _ => None,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::Organization => "organization",
            RecordKind::Person => "person",
            RecordKind::Publication => "publication",
        })
    }
}

/// One entity observation.
///
/// The field tree is never modified after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    kind: RecordKind,
    key: String,
    value: Value,
}

impl Record {
    /// Wraps a field tree, reading its natural key.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::Malformed`] if the tree is not an object or
    /// has no usable natural key.
    pub fn new(kind: RecordKind, value: Value) -> TransformResult<Self> {
        let field = kind.key_field();
        let key = match value.get(field) {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ if !value.is_object() => {
                return Err(TransformError::malformed(
                    format!("<{kind}>"),
                    "record is not a JSON object",
                ))
            }
            _ => {
                return Err(TransformError::malformed(
                    format!("<{kind}>"),
                    format!("missing natural key `{field}`"),
                ))
            }
        };
        Ok(Self { kind, key, value })
    }

    /// Returns the record kind.
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Returns the natural key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the field tree.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Creates a malformed error naming this record.
    pub fn malformed(&self, message: impl Into<String>) -> TransformError {
        TransformError::malformed(self.key.clone(), message)
    }
}

/// Flattens an organization tree into one record per unit.
///
/// Each unit loses its `children` and gains a `parent` object holding the
/// parent's `alias` and `name`. Units are returned parents first.
///
/// # Errors
///
/// Returns [`TransformError::Malformed`] if any unit lacks an alias or
/// `children` is not an array.
pub fn organization_records(tree: &Value) -> TransformResult<Vec<Record>> {
    let mut records = Vec::new();
    let mut pending: Vec<(&Value, Option<Value>)> = vec![(tree, None)];

    while let Some((node, parent)) = pending.pop() {
        let Some(fields) = node.as_object() else {
            return Err(TransformError::malformed(
                "<organization>",
                "organization unit is not a JSON object",
            ));
        };

        let mut flat: Map<String, Value> = fields
            .iter()
            .filter(|(name, _)| name.as_str() != "children")
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        if let Some(parent) = parent {
            flat.insert("parent".to_string(), parent);
        }
        let record = Record::new(RecordKind::Organization, Value::Object(flat))?;

        match fields.get("children") {
            None | Some(Value::Null) => {}
            Some(Value::Array(children)) => {
                let link = serde_json::json!({
                    "alias": record.key(),
                    "name": fields.get("name").cloned().unwrap_or(Value::Null),
                });
                for child in children.iter().rev() {
                    pending.push((child, Some(link.clone())));
                }
            }
            Some(_) => return Err(record.malformed("`children` is not an array")),
        }
        records.push(record);
    }

    Ok(records)
}
