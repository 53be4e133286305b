//! Organization units.

use super::{extract, Mapping, MappingContext};
use crate::error::TransformResult;
use crate::record::Record;
use crate::rules::{string_at, strings_at, FieldRule, Shape};
use crate::types::{organization_type, NAMES_NEEDING_CONTEXT};
use crate::vocab::{DCTERMS_IDENTIFIER, FOAF, PART_OF, RDFS_LABEL, RDF_TYPE, SKOS_PREF_LABEL};
use serde_json::Value;

static ORGANIZATION_RULES: &[FieldRule] = &[
    FieldRule::replace(RDF_TYPE, types).uri(),
    FieldRule::single(SKOS_PREF_LABEL, label),
    FieldRule::single(RDFS_LABEL, label),
    FieldRule::replace(DCTERMS_IDENTIFIER, org_codes),
    FieldRule::single(PART_OF, parent).uri(),
];

static ORGANIZATION_FIELDS: &[(&str, Shape)] = &[
    ("/name", Shape::Scalar),
    ("/type", Shape::Scalar),
    ("/orgCodes", Shape::Scalars),
    ("/parent", Shape::Object),
    ("/parent/alias", Shape::Scalar),
    ("/parent/name", Shape::Scalar),
];

pub(super) fn map(ctx: &MappingContext<'_>, record: &Record) -> TransformResult<Mapping> {
    ctx.require(record.value(), ORGANIZATION_FIELDS)?;
    let config = ctx.config();
    let subject = config.namespaces.organizations.term(record.key());
    let mut mapping = Mapping::new(record.key());
    mapping.apply(
        ctx,
        &subject,
        &config.graphs.organizations,
        ORGANIZATION_RULES,
        record.value(),
    )?;
    Ok(mapping)
}

fn types(ctx: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    let unit_type = view.get("type").and_then(Value::as_str);
    Ok(vec![
        FOAF.iri("Agent").to_string(),
        FOAF.iri("Organization").to_string(),
        organization_type(unit_type, ctx.natural_key()).to_string(),
    ])
}

/// Generic unit names are qualified with the parent's name.
fn label(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    let Some(name) = string_at(view, "/name") else {
        return extract::none();
    };
    let parent = string_at(view, "/parent/name");
    extract::one(Some(match parent {
        Some(parent) if NAMES_NEEDING_CONTEXT.iter().any(|generic| *generic == name) => {
            format!("{name} ({parent})")
        }
        _ => name,
    }))
}

fn org_codes(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    Ok(strings_at(view, "/orgCodes"))
}

fn parent(ctx: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    extract::one(
        string_at(view, "/parent/alias")
            .map(|alias| ctx.config().namespaces.organizations.term(&alias).to_string()),
    )
}

#[cfg(test)]
mod tests {
    use crate::config::MapperConfig;
    use crate::error::TransformError;
    use crate::record::{organization_records, Record, RecordKind};
    use crate::resolver::OfflineLookup;
    use crate::rules::Cardinality;
    use crate::vocab::{PART_OF, RDFS_LABEL, RDF_TYPE, SKOS_PREF_LABEL, VIVO};
    use crate::Mapper;
    use graphload_codec::Term;
    use serde_json::json;

    fn objects(mapping: &crate::Mapping, predicate: crate::vocab::Iri) -> Vec<Term> {
        let predicate = predicate.uri();
        mapping
            .updates()
            .iter()
            .filter(|u| u.predicate == predicate)
            .flat_map(|u| u.objects.clone())
            .collect()
    }

    #[test]
    fn root_unit() {
        let mapper = Mapper::new(MapperConfig::default(), OfflineLookup);
        let record = Record::new(
            RecordKind::Organization,
            json!({"alias": "stanford", "name": "Stanford University", "type": "ROOT", "orgCodes": ["AA00"]}),
        )
        .unwrap();
        let mapping = mapper.map(&record).unwrap();

        let subject = mapper.config().namespaces.organizations.term("stanford");
        assert!(mapping.updates().iter().all(|u| u.subject == subject));
        assert!(objects(&mapping, RDF_TYPE).contains(&Term::Uri(VIVO.iri("University").uri())));
        assert_eq!(
            objects(&mapping, SKOS_PREF_LABEL),
            vec![Term::literal("Stanford University")]
        );
        assert_eq!(objects(&mapping, RDFS_LABEL), vec![Term::literal("Stanford University")]);
        assert!(objects(&mapping, PART_OF).is_empty());

        let types = mapping.updates().iter().find(|u| u.predicate == RDF_TYPE.uri()).unwrap();
        assert_eq!(types.cardinality, Cardinality::Replace);
        assert_eq!(types.objects.len(), 3);
    }

    #[test]
    fn generic_names_get_parent_context() {
        let tree = json!({
            "alias": "business",
            "name": "Graduate School of Business",
            "type": "SCHOOL",
            "children": [
                {"alias": "business/financial-aid", "name": "Financial Aid", "type": "DEPARTMENT"},
                {"alias": "business/marketing", "name": "Marketing", "type": "DEPARTMENT"}
            ]
        });
        let mapper = Mapper::new(MapperConfig::default(), OfflineLookup);
        let records = organization_records(&tree).unwrap();

        let aid = mapper.map(&records[1]).unwrap();
        assert_eq!(
            objects(&aid, SKOS_PREF_LABEL),
            vec![Term::literal("Financial Aid (Graduate School of Business)")]
        );
        assert_eq!(
            objects(&aid, PART_OF),
            vec![Term::Uri(mapper.config().namespaces.organizations.term("business"))]
        );
        assert!(objects(&aid, RDF_TYPE).contains(&Term::Uri(VIVO.iri("Department").uri())));

        let marketing = mapper.map(&records[2]).unwrap();
        assert_eq!(objects(&marketing, RDFS_LABEL), vec![Term::literal("Marketing")]);
    }

    #[test]
    fn identical_input_maps_identically() {
        let mapper = Mapper::new(MapperConfig::default(), OfflineLookup);
        let record = Record::new(
            RecordKind::Organization,
            json!({"alias": "law", "name": "Law School", "type": "SCHOOL", "parent": {"alias": "stanford", "name": "Stanford University"}}),
        )
        .unwrap();
        assert_eq!(mapper.map(&record).unwrap(), mapper.map(&record).unwrap());
    }

    #[test]
    fn wrongly_shaped_name_is_malformed() {
        let mapper = Mapper::new(MapperConfig::default(), OfflineLookup);
        for value in [
            json!({"alias": "x", "type": "ROOT", "name": {"en": "Stanford University"}}),
            json!({"alias": "x", "type": "ROOT", "name": ["Stanford University"]}),
            json!({"alias": "x", "type": {"code": "ROOT"}, "name": "Stanford University"}),
            json!({"alias": "x", "name": "Law", "parent": "stanford"}),
        ] {
            let record = Record::new(RecordKind::Organization, value).unwrap();
            let err = mapper.map(&record).unwrap_err();
            assert!(
                matches!(&err, TransformError::Malformed { natural_key, .. } if natural_key == "x"),
                "{err}"
            );
        }
    }

    #[test]
    fn absent_and_null_fields_are_not_errors() {
        let mapper = Mapper::new(MapperConfig::default(), OfflineLookup);
        let record = Record::new(
            RecordKind::Organization,
            json!({"alias": "x", "type": null, "parent": {"alias": "stanford", "name": null}}),
        )
        .unwrap();
        let mapping = mapper.map(&record).unwrap();
        assert!(objects(&mapping, SKOS_PREF_LABEL).is_empty());
    }
}
