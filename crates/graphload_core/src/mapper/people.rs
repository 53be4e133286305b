//! Person profiles.
//!
//! A profile maps to the person subject plus name and address context
//! subjects keyed by the profile id. Each advisee adds the advisee's person
//! and name subjects, an advising relationship keyed `<advisee>_<advisor>`
//! and two role subjects keyed from the relationship.

use super::{extract, Mapping, MappingContext};
use crate::error::TransformResult;
use crate::record::Record;
use crate::rules::{as_list, string_at, FieldRule, Shape};
use crate::types::AFFILIATION_TYPES;
use crate::vocab::{
    Iri, BEARER_OF, DCTERMS, DCTERMS_IDENTIFIER, DCTERMS_VALID, FOAF, INHERES_IN, RDF_TYPE,
    SKOS_PREF_LABEL, UNITED_STATES_GEONAMES, VCARD, VIVO, XSD_DATE,
};
use serde_json::{json, Value};

const HAS_NAME: Iri = VCARD.iri("hasName");
const HAS_ADDRESS: Iri = VCARD.iri("hasAddress");
const RELATED_BY: Iri = VIVO.iri("relatedBy");

static PERSON_RULES: &[FieldRule] = &[
    FieldRule::replace(RDF_TYPE, person_types).uri(),
    FieldRule::single(DCTERMS_VALID, extract::mapping_date).typed(XSD_DATE),
    FieldRule::single(SKOS_PREF_LABEL, label),
    FieldRule::single(HAS_NAME, name_context).uri(),
    FieldRule::single(VIVO.iri("overview"), bio),
    FieldRule::single(HAS_ADDRESS, address_context).uri(),
    FieldRule::single(VCARD.iri("hasEmail"), email),
    FieldRule::single(DCTERMS_IDENTIFIER, sunetid).identifier("Sunetid"),
    FieldRule::append(RELATED_BY, advising_relationships).uri(),
    FieldRule::append(BEARER_OF, advisor_roles).uri(),
];

static NAME_RULES: &[FieldRule] = &[
    FieldRule::replace(RDF_TYPE, name_type).uri(),
    FieldRule::single(VCARD.iri("given-name"), given_name),
    FieldRule::single(VCARD.iri("middle-name"), middle_name),
    FieldRule::single(VCARD.iri("family-name"), family_name),
];

static ADDRESS_RULES: &[FieldRule] = &[
    FieldRule::replace(RDF_TYPE, address_type).uri(),
    FieldRule::single(VCARD.iri("street-address"), street),
    FieldRule::single(VCARD.iri("locality"), locality),
    FieldRule::single(VCARD.iri("region"), region),
    FieldRule::single(VCARD.iri("postal-code"), postal_code),
    FieldRule::single(VCARD.iri("country-name"), country_name),
    FieldRule::single(DCTERMS.iri("spatial"), country_place).uri(),
];

static ADVISEE_RULES: &[FieldRule] = &[
    FieldRule::append(RDF_TYPE, agent_types).uri(),
    FieldRule::single(SKOS_PREF_LABEL, advisee_label),
    FieldRule::single(HAS_NAME, advisee_name_context).uri(),
    FieldRule::append(RELATED_BY, relationship).uri(),
    FieldRule::append(BEARER_OF, advisee_role).uri(),
];

static ADVISEE_NAME_RULES: &[FieldRule] = &[
    FieldRule::replace(RDF_TYPE, name_type).uri(),
    FieldRule::single(VCARD.iri("given-name"), advisee_given_name),
    FieldRule::single(VCARD.iri("family-name"), advisee_family_name),
];

static RELATIONSHIP_RULES: &[FieldRule] = &[
    FieldRule::replace(RDF_TYPE, relationship_type).uri(),
    FieldRule::single(DCTERMS_VALID, extract::mapping_date).typed(XSD_DATE),
    FieldRule::replace(VIVO.iri("relates"), relationship_parties).uri(),
];

static ADVISOR_ROLE_RULES: &[FieldRule] = &[
    FieldRule::replace(RDF_TYPE, advisor_role_type).uri(),
    FieldRule::single(INHERES_IN, advisor).uri(),
];

static ADVISEE_ROLE_RULES: &[FieldRule] = &[
    FieldRule::replace(RDF_TYPE, advisee_role_type).uri(),
    FieldRule::single(INHERES_IN, advisee).uri(),
];

static PROFILE_FIELDS: &[(&str, Shape)] = &[
    ("/names", Shape::Object),
    ("/names/preferred", Shape::Object),
    ("/names/preferred/firstName", Shape::Scalar),
    ("/names/preferred/middleName", Shape::Scalar),
    ("/names/preferred/lastName", Shape::Scalar),
    ("/names/legal", Shape::Object),
    ("/names/legal/firstName", Shape::Scalar),
    ("/names/legal/middleName", Shape::Scalar),
    ("/names/legal/lastName", Shape::Scalar),
    ("/bio", Shape::Object),
    ("/bio/text", Shape::Scalar),
    ("/primaryContact", Shape::Object),
    ("/primaryContact/email", Shape::Scalar),
    ("/uid", Shape::Scalar),
    ("/affiliations", Shape::Object),
    ("/contacts", Shape::Objects),
    ("/advisees", Shape::Objects),
];

static CONTACT_FIELDS: &[(&str, Shape)] = &[
    ("/address", Shape::Scalar),
    ("/city", Shape::Scalar),
    ("/state", Shape::Scalar),
    ("/zip", Shape::Scalar),
];

static ADVISEE_FIELDS: &[(&str, Shape)] = &[
    ("/advisee", Shape::Object),
    ("/advisee/profileId", Shape::Scalar),
    ("/advisee/firstName", Shape::Scalar),
    ("/advisee/lastName", Shape::Scalar),
];

pub(super) fn map(ctx: &MappingContext<'_>, record: &Record) -> TransformResult<Mapping> {
    let config = ctx.config();
    let ns = &config.namespaces;
    let graph = &config.graphs.people;
    let id = record.key();
    let view = record.value();

    ctx.require(view, PROFILE_FIELDS)?;
    for contact in as_list(view.get("contacts")) {
        ctx.require(contact, CONTACT_FIELDS)?;
    }
    for advising in as_list(view.get("advisees")) {
        ctx.require(advising, ADVISEE_FIELDS)?;
    }

    let mut mapping = Mapping::new(id);
    mapping.apply(ctx, &ns.people.term(id), graph, PERSON_RULES, view)?;
    mapping.apply(ctx, &ns.names.term(id), graph, NAME_RULES, view)?;
    mapping.apply(ctx, &ns.addresses.term(id), graph, ADDRESS_RULES, view)?;

    for advising in advising_views(ctx, view)? {
        let advisee = field(&advising, "advisee");
        let relationship = relationship_key(&advising);
        mapping.apply(ctx, &ns.people.term(&advisee), graph, ADVISEE_RULES, &advising)?;
        mapping.apply(ctx, &ns.names.term(&advisee), graph, ADVISEE_NAME_RULES, &advising)?;
        mapping.apply(
            ctx,
            &ns.relationships.term(&relationship),
            graph,
            RELATIONSHIP_RULES,
            &advising,
        )?;
        mapping.apply(
            ctx,
            &ns.roles.term(&format!("{relationship}_AdvisorRole")),
            graph,
            ADVISOR_ROLE_RULES,
            &advising,
        )?;
        mapping.apply(
            ctx,
            &ns.roles.term(&format!("{relationship}_AdviseeRole")),
            graph,
            ADVISEE_ROLE_RULES,
            &advising,
        )?;
    }
    Ok(mapping)
}

/// One view per advisee: both profile ids plus the advisee's name.
fn advising_views(ctx: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<Value>> {
    as_list(view.get("advisees"))
        .into_iter()
        .map(|entry| {
            let advisee = entry
                .get("advisee")
                .ok_or_else(|| ctx.malformed("advisee entry without `advisee`"))?;
            let advisee_id = string_at(advisee, "/profileId")
                .ok_or_else(|| ctx.malformed("advisee without `profileId`"))?;
            Ok(json!({
                "advisor": ctx.natural_key(),
                "advisee": advisee_id,
                "firstName": advisee.get("firstName"),
                "lastName": advisee.get("lastName"),
            }))
        })
        .collect()
}

fn field(view: &Value, name: &str) -> String {
    view.get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn relationship_key(advising: &Value) -> String {
    format!("{}_{}", field(advising, "advisee"), field(advising, "advisor"))
}

fn person_types(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    let mut types = vec![
        FOAF.iri("Person").to_string(),
        FOAF.iri("Agent").to_string(),
    ];
    for (flag, class) in AFFILIATION_TYPES.iter() {
        let set = view
            .pointer(&format!("/affiliations/{flag}"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if set {
            types.push(class.to_string());
        }
    }
    Ok(types)
}

/// Preferred name parts, falling back to the legal name.
fn name_parts(view: &Value) -> [Option<String>; 3] {
    let parts = |which: &str| {
        [
            string_at(view, &format!("/names/{which}/firstName")),
            string_at(view, &format!("/names/{which}/middleName")),
            string_at(view, &format!("/names/{which}/lastName")),
        ]
    };
    let preferred = parts("preferred");
    if preferred[0].is_some() || preferred[2].is_some() {
        preferred
    } else {
        parts("legal")
    }
}

fn label(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    extract::one(extract::join_names(&name_parts(view)))
}

fn name_context(ctx: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    let has_name = name_parts(view).iter().any(Option::is_some);
    extract::one(has_name.then(|| ctx.config().namespaces.names.term(ctx.natural_key()).to_string()))
}

fn name_type(_: &MappingContext<'_>, _: &Value) -> TransformResult<Vec<String>> {
    Ok(vec![VCARD.iri("Name").to_string()])
}

fn given_name(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    let [given, _, _] = name_parts(view);
    extract::one(given)
}

fn middle_name(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    let [_, middle, _] = name_parts(view);
    extract::one(middle)
}

fn family_name(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    let [_, _, family] = name_parts(view);
    extract::one(family)
}

fn bio(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    extract::one(string_at(view, "/bio/text"))
}

fn email(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    extract::one(string_at(view, "/primaryContact/email"))
}

fn sunetid(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    extract::one(string_at(view, "/uid"))
}

/// The first contact that carries a street address.
fn postal_contact(view: &Value) -> Option<&Value> {
    as_list(view.get("contacts"))
        .into_iter()
        .find(|contact| string_at(contact, "/address").is_some())
}

fn address_field(view: &Value, name: &str) -> TransformResult<Vec<String>> {
    extract::one(postal_contact(view).and_then(|contact| string_at(contact, name)))
}

fn address_context(ctx: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    extract::one(
        postal_contact(view)
            .map(|_| ctx.config().namespaces.addresses.term(ctx.natural_key()).to_string()),
    )
}

fn address_type(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    extract::one(postal_contact(view).map(|_| VCARD.iri("Address").to_string()))
}

fn street(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    address_field(view, "/address")
}

fn locality(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    address_field(view, "/city")
}

fn region(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    address_field(view, "/state")
}

fn postal_code(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    address_field(view, "/zip")
}

/// Profiles only carry domestic addresses.
fn country_name(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    extract::one(postal_contact(view).map(|_| "United States".to_string()))
}

fn country_place(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    extract::one(postal_contact(view).map(|_| UNITED_STATES_GEONAMES.to_string()))
}

fn advising_relationships(ctx: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    let relationships = &ctx.config().namespaces.relationships;
    Ok(advising_views(ctx, view)?
        .iter()
        .map(|advising| relationships.term(&relationship_key(advising)).to_string())
        .collect())
}

fn advisor_roles(ctx: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    let roles = &ctx.config().namespaces.roles;
    Ok(advising_views(ctx, view)?
        .iter()
        .map(|advising| {
            roles
                .term(&format!("{}_AdvisorRole", relationship_key(advising)))
                .to_string()
        })
        .collect())
}

fn agent_types(_: &MappingContext<'_>, _: &Value) -> TransformResult<Vec<String>> {
    Ok(vec![
        FOAF.iri("Person").to_string(),
        FOAF.iri("Agent").to_string(),
    ])
}

fn advisee_label(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    extract::one(extract::join_names(&[
        string_at(view, "/firstName"),
        string_at(view, "/lastName"),
    ]))
}

fn advisee_name_context(ctx: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    Ok(vec![ctx
        .config()
        .namespaces
        .names
        .term(&field(view, "advisee"))
        .to_string()])
}

fn advisee_given_name(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    extract::one(string_at(view, "/firstName"))
}

fn advisee_family_name(_: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    extract::one(string_at(view, "/lastName"))
}

fn relationship(ctx: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    Ok(vec![ctx
        .config()
        .namespaces
        .relationships
        .term(&relationship_key(view))
        .to_string()])
}

fn advisee_role(ctx: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    Ok(vec![ctx
        .config()
        .namespaces
        .roles
        .term(&format!("{}_AdviseeRole", relationship_key(view)))
        .to_string()])
}

fn relationship_type(_: &MappingContext<'_>, _: &Value) -> TransformResult<Vec<String>> {
    Ok(vec![VIVO.iri("AdvisingRelationship").to_string()])
}

fn relationship_parties(ctx: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    let people = &ctx.config().namespaces.people;
    Ok(vec![
        people.term(&field(view, "advisor")).to_string(),
        people.term(&field(view, "advisee")).to_string(),
    ])
}

fn advisor_role_type(_: &MappingContext<'_>, _: &Value) -> TransformResult<Vec<String>> {
    Ok(vec![VIVO.iri("AdvisorRole").to_string()])
}

fn advisee_role_type(_: &MappingContext<'_>, _: &Value) -> TransformResult<Vec<String>> {
    Ok(vec![VIVO.iri("AdviseeRole").to_string()])
}

fn advisor(ctx: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    Ok(vec![ctx.config().namespaces.people.term(&field(view, "advisor")).to_string()])
}

fn advisee(ctx: &MappingContext<'_>, view: &Value) -> TransformResult<Vec<String>> {
    Ok(vec![ctx.config().namespaces.people.term(&field(view, "advisee")).to_string()])
}
