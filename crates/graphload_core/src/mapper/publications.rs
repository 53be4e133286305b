//! Publications.
//!
//! Topics and authors are resolved first; the rule tables then only read
//! the record and the resolved URIs.

use super::{extract, Mapper, Mapping, MappingContext, Resolved};
use crate::error::TransformResult;
use crate::record::Record;
use crate::resolver::{EntityLookup, LookupKind, NaturalKey};
use crate::rules::{as_list, scalar, string_at, FieldRule, Shape};
use crate::vocab::{Iri, BIBO, DCTERMS, FOAF, RDF_TYPE, SKOS, SKOS_PREF_LABEL, VIVO};
use graphload_codec::Uri;
use serde_json::{json, Value};
use std::collections::BTreeMap;

const SUBJECT: Iri = DCTERMS.iri("subject");

static PUBLICATION_RULES: &[FieldRule] = &[
    FieldRule::replace(RDF_TYPE, document_type).uri(),
    FieldRule::single(DCTERMS.iri("title"), title),
    FieldRule::single(BIBO.iri("abstract"), abstract_text),
    FieldRule::single(BIBO.iri("doi"), doi),
    FieldRule::replace(BIBO.iri("identifier"), identifiers),
    FieldRule::single(DCTERMS.iri("created"), created),
    FieldRule::single(DCTERMS.iri("isPartOf"), source_title),
    FieldRule::single(VIVO.iri("publisher"), publisher),
];

static LINK_RULES: &[FieldRule] = &[
    FieldRule::replace(SUBJECT, topics).uri(),
    FieldRule::replace(VIVO.iri("relatedBy"), authorships).uri(),
];

static CONCEPT_RULES: &[FieldRule] = &[
    FieldRule::replace(RDF_TYPE, concept_type).uri(),
    FieldRule::single(SUBJECT, name),
];

static AUTHORSHIP_RULES: &[FieldRule] = &[
    FieldRule::replace(RDF_TYPE, authorship_type).uri(),
    FieldRule::single(VIVO.iri("relates"), person).uri(),
];

static AUTHOR_RULES: &[FieldRule] = &[
    FieldRule::replace(RDF_TYPE, agent_types).uri(),
    FieldRule::single(SKOS_PREF_LABEL, name),
];

/// Country and preferred organization of one numbered address.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct Affiliation {
    pub(crate) country: Option<String>,
    pub(crate) organization: Option<String>,
}

static RECORD_FIELDS: &[(&str, Shape)] = &[
    ("/static_data/summary/titles/title", Shape::Objects),
    ("/static_data/summary/names/name", Shape::Objects),
    ("/static_data/summary/pub_info", Shape::Object),
    ("/static_data/summary/pub_info/sortdate", Shape::Scalar),
    ("/static_data/fullrecord_metadata/category_info/subjects/subject", Shape::Objects),
    ("/static_data/fullrecord_metadata/abstracts/abstract", Shape::Objects),
    ("/dynamic_data/cluster_related/identifiers/identifier", Shape::Objects),
];

/// Entry lists and the fields read from each entry.
static ENTRY_FIELDS: &[(&str, &[(&str, Shape)])] = &[
    ("/static_data/summary/titles/title", &[("/content", Shape::Scalar)]),
    (
        "/static_data/summary/names/name",
        &[
            ("/full_name", Shape::Scalar),
            ("/first_name", Shape::Scalar),
            ("/last_name", Shape::Scalar),
            ("/orcid_id", Shape::Scalar),
            ("/addr_no", Shape::Scalar),
        ],
    ),
    (
        "/static_data/fullrecord_metadata/category_info/subjects/subject",
        &[("/content", Shape::Scalar)],
    ),
    (
        "/static_data/fullrecord_metadata/abstracts/abstract",
        &[("/abstract_text", Shape::Object), ("/abstract_text/p", Shape::Scalars)],
    ),
    (
        "/dynamic_data/cluster_related/identifiers/identifier",
        &[("/value", Shape::Scalar)],
    ),
];

fn check_record(ctx: &MappingContext<'_>, view: &Value) -> TransformResult<()> {
    ctx.require(view, RECORD_FIELDS)?;
    for (list, fields) in ENTRY_FIELDS {
        for entry in as_list(view.pointer(list)) {
            ctx.require(entry, fields)?;
        }
    }
    Ok(())
}

pub(super) fn map<L: EntityLookup>(
    ctx: &MappingContext<'_>,
    record: &Record,
    mapper: &Mapper<L>,
) -> TransformResult<Mapping> {
    let config = ctx.config();
    let ns = &config.namespaces;
    let graph = &config.graphs.publications;
    let uid = record.key();
    let view = record.value();
    let subject = ns.publications.minted(uid);
    check_record(ctx, view)?;

    let mut topic_uris = Vec::new();
    let mut concepts = Vec::new();
    for heading in subject_headings(view) {
        let key = NaturalKey::new(LookupKind::Topic).with("name", heading.as_str());
        let resolved = mapper.resolve(ctx, &key, &ns.concepts)?;
        topic_uris.push(resolved.uri.to_string());
        if resolved.minted {
            concepts.push((resolved.uri, heading));
        }
    }

    let affiliations = affiliations(view);
    let mut authors: Vec<(Resolved, Uri, Value)> = Vec::new();
    for author in author_entries(ctx, view)? {
        let address = string_at(author, "/addr_no")
            .and_then(|numbers| numbers.split_whitespace().next().map(str::to_string))
            .and_then(|first| affiliations.get(&first).cloned())
            .unwrap_or_default();
        let key = NaturalKey::new(LookupKind::Person)
            .with_opt("full_name", string_at(author, "/full_name"))
            .with_opt("first_name", string_at(author, "/first_name"))
            .with_opt("last_name", string_at(author, "/last_name"))
            .with_opt("orcid_id", string_at(author, "/orcid_id"))
            .with_opt("organization", address.organization)
            .with_opt("country", address.country);
        let resolved = mapper.resolve(ctx, &key, &ns.people)?;
        let authorship = ns
            .relationships
            .term(&format!("{uid}_{}", resolved.uri.local_name()));
        authors.push((resolved, authorship, author.clone()));
    }

    let mut mapping = Mapping::new(uid);
    mapping.apply(ctx, &subject, graph, PUBLICATION_RULES, view)?;
    let links = json!({
        "topics": topic_uris,
        "authorships": authors.iter().map(|(_, authorship, _)| authorship.to_string()).collect::<Vec<_>>(),
    });
    mapping.apply(ctx, &subject, graph, LINK_RULES, &links)?;

    for (uri, heading) in &concepts {
        mapping.apply(ctx, uri, graph, CONCEPT_RULES, &json!({ "name": heading }))?;
    }
    for (resolved, authorship, author) in &authors {
        let person = json!({ "person": resolved.uri.as_str() });
        mapping.apply(ctx, authorship, graph, AUTHORSHIP_RULES, &person)?;
        if resolved.minted {
            let label = extract::join_names(&[
                string_at(author, "/first_name"),
                string_at(author, "/last_name"),
            ])
            .or_else(|| string_at(author, "/full_name"));
            mapping.apply(ctx, &resolved.uri, graph, AUTHOR_RULES, &json!({ "name": label }))?;
        }
    }
    Ok(mapping)
}

/// Extended subject headings.
fn subject_headings(view: &Value) -> Vec<String> {
    as_list(view.pointer("/static_data/fullrecord_metadata/category_info/subjects/subject"))
        .into_iter()
        .filter(|subject| {
            subject.get("ascatype").and_then(Value::as_str) == Some("extended")
        })
        .filter_map(|subject| subject.get("content").and_then(scalar))
        .collect()
}

/// Name entries with the author role.
fn author_entries<'v>(ctx: &MappingContext<'_>, view: &'v Value) -> TransformResult<Vec<&'v Value>> {
    let mut authors = Vec::new();
    for name in as_list(view.pointer("/static_data/summary/names/name")) {
        if !name.is_object() {
            return Err(ctx.malformed("name entry is not an object"));
        }
        if name.get("role").and_then(Value::as_str) != Some("author") {
            continue;
        }
        if string_at(name, "/full_name").is_none() && string_at(name, "/last_name").is_none() {
            continue;
        }
        authors.push(name);
    }
    Ok(authors)
}

/// Numbered addresses, keyed by address number.
///
/// An organization marked preferred wins over the first one listed.
pub(crate) fn affiliations(view: &Value) -> BTreeMap<String, Affiliation> {
    let mut out = BTreeMap::new();
    for address in as_list(view.pointer("/static_data/fullrecord_metadata/addresses/address_name")) {
        let Some(spec) = address.get("address_spec") else {
            continue;
        };
        let Some(number) = spec.get("addr_no").and_then(scalar) else {
            continue;
        };
        let organizations = as_list(spec.pointer("/organizations/organization"));
        let preferred = organizations
            .iter()
            .find(|org| org.get("pref").and_then(Value::as_str) == Some("Y"))
            .and_then(|org| org.get("content").and_then(scalar));
        let first = organizations.iter().find_map(|org| match org {
            Value::Object(_) => org.get("content").and_then(scalar),
            other => scalar(other),
        });
        out.insert(
            number,
            Affiliation {
                country: spec.get("country").and_then(scalar),
                organization: preferred.or(first),
            },
        );
    }
    out
}

fn titles_of_type(view: &Value, kind: &str) -> Option<String> {
    as_list(view.pointer("/static_data/summary/titles/title"))
        .into_iter()
        .find(|title| title.get("type").and_then(Value::as_str) == Some(kind))
        .and_then(|title| title.get("content").and_then(scalar))
}

fn identifier_entries(view: &Value) -> Vec<&Value> {
    as_list(view.pointer("/dynamic_data/cluster_related/identifiers/identifier"))
}

fn document_type(_: &MappingContext<'_>, _: &Value) -> TransformResult<Vec<String>> {
    Ok(vec![BIBO.iri("Document").to_string()])
}

fn title(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    extract::one(titles_of_type(view, "item"))
}

fn source_title(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    extract::one(titles_of_type(view, "source"))
}

/// Paragraphs of the first abstract, joined with a blank line.
fn abstract_text(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    let abstracts = as_list(view.pointer("/static_data/fullrecord_metadata/abstracts/abstract"));
    let paragraphs: Vec<String> = abstracts
        .first()
        .map(|first| {
            as_list(first.pointer("/abstract_text/p"))
                .into_iter()
                .filter_map(scalar)
                .collect()
        })
        .unwrap_or_default();
    extract::one((!paragraphs.is_empty()).then(|| paragraphs.join("\n\n")))
}

fn doi(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    let find = |kind: &str| {
        identifier_entries(view)
            .into_iter()
            .find(|id| id.get("type").and_then(Value::as_str) == Some(kind))
            .and_then(|id| id.get("value").and_then(scalar))
    };
    extract::one(find("doi").or_else(|| find("xref_doi")))
}

fn identifiers(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    Ok(identifier_entries(view)
        .into_iter()
        .filter_map(|id| id.get("value").and_then(scalar))
        .collect())
}

fn created(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    extract::one(string_at(view, "/static_data/summary/pub_info/sortdate"))
}

fn publisher(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    let publishers = as_list(view.pointer("/static_data/summary/publishers/publisher"));
    extract::one(publishers.into_iter().find_map(|publisher| {
        as_list(publisher.pointer("/names/name"))
            .into_iter()
            .find_map(|name| string_at(name, "/full_name"))
    }))
}

fn topics(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    Ok(crate::rules::strings_at(view, "/topics"))
}

fn authorships(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    Ok(crate::rules::strings_at(view, "/authorships"))
}

fn concept_type(_: &MappingContext<'_>, _: &Value) -> TransformResult<Vec<String>> {
    Ok(vec![SKOS.iri("Concept").to_string()])
}

fn name(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    extract::one(string_at(view, "/name"))
}

fn authorship_type(_: &MappingContext<'_>, _: &Value) -> TransformResult<Vec<String>> {
    Ok(vec![VIVO.iri("Authorship").to_string()])
}

fn person(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    extract::one(string_at(view, "/person"))
}

fn agent_types(_: &MappingContext<'_>, _: &Value) -> TransformResult<Vec<String>> {
    Ok(vec![
        FOAF.iri("Person").to_string(),
        FOAF.iri("Agent").to_string(),
    ])
}
