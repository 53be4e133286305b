//! Declarative field rules.
//!
//! A rule table is a `static` slice of [`FieldRule`]s. The mapper evaluates
//! every rule of a table against one subject, in table order.

use crate::error::TransformResult;
use crate::mapper::MappingContext;
use crate::vocab::Iri;
use graphload_codec::{Term, Uri};
use serde_json::Value;

/// How a predicate's values are updated in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// At most one value; cleared then set.
    Single,
    /// A set of values; cleared then set to the full current set.
    Replace,
    /// Values are only ever added.
    Append,
}

impl Cardinality {
    /// True when the generator emits a delete for this predicate.
    pub fn clears(self) -> bool {
        !matches!(self, Cardinality::Append)
    }
}

/// How extracted strings become object terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// Plain string literal.
    Literal,
    /// Literal with a vocabulary datatype.
    Typed(Iri),
    /// Literal whose datatype is a term of the identifiers namespace.
    Identifier(&'static str),
    /// Resource.
    Uri,
}

/// Pulls string values for one predicate out of a subject's view.
pub type Extractor = fn(&MappingContext<'_>, &Value) -> TransformResult<Vec<String>>;

/// One row of a rule table.
#[derive(Clone, Copy)]
pub struct FieldRule {
    /// Target predicate.
    pub predicate: Iri,
    /// Extractor over the subject's view.
    pub extract: Extractor,
    /// Update semantics.
    pub cardinality: Cardinality,
    /// Literal or resource.
    pub object: ObjectKind,
}

impl FieldRule {
    /// A single-valued literal rule.
    pub const fn single(predicate: Iri, extract: Extractor) -> Self {
        Self {
            predicate,
            extract,
            cardinality: Cardinality::Single,
            object: ObjectKind::Literal,
        }
    }

    /// A full-replace literal rule.
    pub const fn replace(predicate: Iri, extract: Extractor) -> Self {
        Self {
            cardinality: Cardinality::Replace,
            ..Self::single(predicate, extract)
        }
    }

    /// An append-only literal rule.
    pub const fn append(predicate: Iri, extract: Extractor) -> Self {
        Self {
            cardinality: Cardinality::Append,
            ..Self::single(predicate, extract)
        }
    }

    /// Objects are resources.
    pub const fn uri(self) -> Self {
        Self {
            object: ObjectKind::Uri,
            ..self
        }
    }

    /// Objects are literals typed with `datatype`.
    pub const fn typed(self, datatype: Iri) -> Self {
        Self {
            object: ObjectKind::Typed(datatype),
            ..self
        }
    }

    /// Objects are literals typed with an identifier scheme.
    pub const fn identifier(self, scheme: &'static str) -> Self {
        Self {
            object: ObjectKind::Identifier(scheme),
            ..self
        }
    }

    /// Turns extracted strings into terms.
    pub(crate) fn terms(&self, ctx: &MappingContext<'_>, values: Vec<String>) -> Vec<Term> {
        values
            .into_iter()
            .map(|value| match self.object {
                ObjectKind::Literal => Term::literal(value),
                ObjectKind::Typed(datatype) => Term::typed(value, datatype.uri()),
                ObjectKind::Identifier(scheme) => {
                    Term::typed(value, ctx.config().namespaces.identifiers.term(scheme))
                }
                ObjectKind::Uri => Term::Uri(Uri::new(value)),
            })
            .collect()
    }
}

impl std::fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRule")
            .field("predicate", &self.predicate.to_string())
            .field("cardinality", &self.cardinality)
            .field("object", &self.object)
            .finish_non_exhaustive()
    }
}

/// Wraps a JSON value that may be either one item or a list of items.
pub fn as_list(value: Option<&Value>) -> Vec<&Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(item) => vec![item],
    }
}

/// Renders a scalar as a string; objects, arrays and blanks yield `None`.
pub fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// JSON shape a record field must have when it is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A string, number or boolean.
    Scalar,
    /// An object.
    Object,
    /// A scalar or a list of scalars.
    Scalars,
    /// An object or a list of objects.
    Objects,
}

impl Shape {
    /// True if `value` has this shape. Null always passes.
    pub fn admits(self, value: &Value) -> bool {
        let is_scalar = |v: &Value| matches!(v, Value::String(_) | Value::Number(_) | Value::Bool(_));
        match (self, value) {
            (_, Value::Null) => true,
            (Shape::Scalar, v) => is_scalar(v),
            (Shape::Object, v) => v.is_object(),
            (Shape::Scalars, Value::Array(items)) => items.iter().all(is_scalar),
            (Shape::Scalars, v) => is_scalar(v),
            (Shape::Objects, Value::Array(items)) => items.iter().all(Value::is_object),
            (Shape::Objects, v) => v.is_object(),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Shape::Scalar => "a string, number or boolean",
            Shape::Object => "an object",
            Shape::Scalars => "a scalar or a list of scalars",
            Shape::Objects => "an object or a list of objects",
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Checks every field that is present against its expected shape.
///
/// Missing and null fields pass; they simply contribute nothing.
///
/// # Errors
///
/// Returns a message naming the first field with the wrong shape.
pub fn check_shapes(value: &Value, fields: &[(&str, Shape)]) -> Result<(), String> {
    for (pointer, shape) in fields {
        if let Some(found) = value.pointer(pointer) {
            if !shape.admits(found) {
                return Err(format!(
                    "`{pointer}` should be {}, found {}",
                    shape.describe(),
                    kind_of(found)
                ));
            }
        }
    }
    Ok(())
}

/// Every scalar at a JSON pointer, flattening one level of list.
pub fn strings_at(value: &Value, pointer: &str) -> Vec<String> {
    as_list(value.pointer(pointer))
        .into_iter()
        .filter_map(scalar)
        .collect()
}

/// The scalar at a JSON pointer.
pub fn string_at(value: &Value, pointer: &str) -> Option<String> {
    value.pointer(pointer).and_then(scalar)
}

/// Removes duplicates, keeping first-seen order.
pub fn dedup_in_order<T: PartialEq>(values: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(values.len());
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{DCTERMS_IDENTIFIER, SKOS_PREF_LABEL, XSD_DATE};
    use serde_json::json;

    fn nothing(_: &MappingContext<'_>, _: &Value) -> TransformResult<Vec<String>> {
        Ok(Vec::new())
    }

    #[test]
    fn shapes_tell_absent_from_wrong() {
        let doc = json!({"name": {"en": "x"}, "codes": ["a", 1], "type": null, "parent": {"alias": "p"}});
        assert!(check_shapes(&doc, &[("/missing", Shape::Scalar), ("/type", Shape::Scalar)]).is_ok());
        assert!(check_shapes(&doc, &[("/codes", Shape::Scalars), ("/parent", Shape::Objects)]).is_ok());

        let err = check_shapes(&doc, &[("/name", Shape::Scalar)]).unwrap_err();
        assert_eq!(err, "`/name` should be a string, number or boolean, found an object");
        assert!(check_shapes(&json!({"codes": [["a"]]}), &[("/codes", Shape::Scalars)]).is_err());
        assert!(check_shapes(&json!({"parent": "p"}), &[("/parent", Shape::Object)]).is_err());
    }

    #[test]
    fn rule_builders() {
        const RULE: FieldRule = FieldRule::replace(DCTERMS_IDENTIFIER, nothing).uri();
        assert_eq!(RULE.cardinality, Cardinality::Replace);
        assert_eq!(RULE.object, ObjectKind::Uri);

        let rule = FieldRule::single(SKOS_PREF_LABEL, nothing).typed(XSD_DATE);
        assert_eq!(rule.cardinality, Cardinality::Single);
        assert_eq!(rule.object, ObjectKind::Typed(XSD_DATE));
        assert!(!Cardinality::Append.clears());
    }

    #[test]
    fn one_or_many() {
        let doc = json!({
            "one": {"content": "a"},
            "many": [{"content": "b"}, {"content": "c"}],
            "scalars": ["x", 7, "", null]
        });
        assert_eq!(as_list(doc.get("one")).len(), 1);
        assert_eq!(as_list(doc.get("many")).len(), 2);
        assert!(as_list(doc.get("absent")).is_empty());
        assert_eq!(strings_at(&doc, "/scalars"), ["x", "7"]);
        assert_eq!(string_at(&doc, "/one/content").as_deref(), Some("a"));
    }

    #[test]
    fn dedup_keeps_first_seen_order() {
        assert_eq!(dedup_in_order(vec!["b", "a", "b", "c", "a"]), ["b", "a", "c"]);
    }
}
