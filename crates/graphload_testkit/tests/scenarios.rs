//! End-to-end mapping scenarios against the in-memory store.

use graphload_codec::{Batch, CodecResult, StatementKind, StatementReader, Term, Uri};
use graphload_core::vocab::{
    DCTERMS, DCTERMS_IDENTIFIER, PART_OF, RDFS_LABEL, RDF_TYPE, SKOS_PREF_LABEL, VCARD, VIVO,
};
use graphload_core::{
    LookupKind, Namespaces, NaturalKey, Record, RecordKind, StatementGenerator, TransformError,
};
use graphload_testkit::prelude::*;
use serde_json::json;

fn organization(value: serde_json::Value) -> Record {
    Record::new(RecordKind::Organization, value).unwrap()
}

fn namespaces(harness: &IntegrationHarness) -> Namespaces {
    harness.mapper().config().namespaces.clone()
}

fn uris(terms: &[&Uri]) -> Vec<Term> {
    terms.iter().map(|uri| Term::Uri((*uri).clone())).collect()
}

fn chen_key() -> NaturalKey {
    NaturalKey::new(LookupKind::Person)
        .with("full_name", "Chen, William")
        .with("first_name", "William")
        .with("last_name", "Chen")
        .with("organization", "Stanford University")
        .with("country", "USA")
}

#[test]
fn applying_a_stream_twice_equals_applying_it_once() {
    let mut harness = IntegrationHarness::new();
    let mut records = organization_fixture_records(&organization_tree());
    records.push(person_record(person_profile()));
    records.push(publication_record(publication()));

    let text = harness.ingest(&records);
    let once = harness.store().clone();
    harness.apply(&text).unwrap();
    assert_eq!(harness.store(), &once);
}

#[test]
fn identical_input_gives_identical_text() {
    let records = [person_record(person_profile()), publication_record(publication())];
    let mut harness = IntegrationHarness::new();
    let first = harness.transform(&records).unwrap();
    let second = harness.transform(&records).unwrap();
    assert_eq!(first, second);
}

#[test]
fn every_batch_pairs_deletes_with_inserts() {
    let mut harness = IntegrationHarness::new();
    let mut records = organization_fixture_records(&organization_tree());
    records.push(person_record(person_profile()));
    let text = harness.transform(&records).unwrap();

    let batches: Vec<Batch> = StatementReader::new(text.as_bytes())
        .collect::<CodecResult<_>>()
        .unwrap();
    assert!(!batches.is_empty());
    for batch in &batches {
        assert!(batch.insert_count() >= 1);
        let kinds: Vec<_> = batch.statements().iter().map(|s| s.kind()).collect();
        let first_insert = kinds
            .iter()
            .position(|k| *k == StatementKind::Insert)
            .unwrap();
        assert!(kinds[first_insert..].iter().all(|k| *k == StatementKind::Insert));
    }

    let statements: usize = batches.iter().map(Batch::len).sum();
    assert_eq!(statements, text.matches(";\n").count());
}

#[test]
fn root_unit_becoming_a_school() {
    let mut harness = IntegrationHarness::new();
    let ns = namespaces(&harness);
    let stanford = ns.organizations.term("stanford");
    let university = VIVO.iri("University").uri();
    let school = VIVO.iri("School").uri();

    harness.ingest(&[organization(
        json!({"alias": "stanford", "type": "ROOT", "name": "Stanford University"}),
    )]);
    assert!(harness
        .store()
        .objects(&stanford, &RDF_TYPE.uri())
        .contains(&Term::Uri(university.clone())));
    assert_eq!(
        harness.store().literals(&stanford, &RDFS_LABEL.uri()),
        ["Stanford University"]
    );

    let text = harness
        .transform(&[organization(
            json!({"alias": "stanford", "type": "SCHOOL", "name": "Stanford University"}),
        )])
        .unwrap();
    let type_batch = StatementReader::new(text.as_bytes())
        .map(Result::unwrap)
        .find(|batch| batch.text().contains(&format!("<{}>", RDF_TYPE.uri())))
        .unwrap();
    let deletes_type = type_batch.statements().iter().any(|s| {
        s.is_delete() && s.text().contains(&format!("<{stanford}> <{}> ?o", RDF_TYPE.uri()))
    });
    assert!(deletes_type);
    assert!(type_batch
        .statements()
        .iter()
        .any(|s| !s.is_delete() && s.text().contains(&format!("<{school}>"))));

    harness.apply(&text).unwrap();
    let types = harness.store().objects(&stanford, &RDF_TYPE.uri());
    assert!(types.contains(&Term::Uri(school)));
    assert!(!types.contains(&Term::Uri(university)));
    assert_eq!(types.len(), 3);
    assert_eq!(
        harness.store().literals(&stanford, &RDFS_LABEL.uri()),
        ["Stanford University"]
    );
    assert_eq!(
        harness.store().literals(&stanford, &SKOS_PREF_LABEL.uri()),
        ["Stanford University"]
    );
}

#[test]
fn replace_predicate_keeps_exactly_the_current_set() {
    let mut harness = IntegrationHarness::new();
    let unit = namespaces(&harness).organizations.term("law");

    harness.ingest(&[organization(
        json!({"alias": "law", "name": "Law School", "type": "SCHOOL", "orgCodes": ["X", "Y"]}),
    )]);
    harness.ingest(&[organization(
        json!({"alias": "law", "name": "Law School", "type": "SCHOOL", "orgCodes": ["Y", "Z"]}),
    )]);
    assert_eq!(
        harness.store().literals(&unit, &DCTERMS_IDENTIFIER.uri()),
        ["Y", "Z"]
    );
}

#[test]
fn wrongly_shaped_name_leaves_the_stored_label() {
    let mut harness = IntegrationHarness::new();
    let unit = namespaces(&harness).organizations.term("x");
    harness.ingest(&[organization(json!({"alias": "x", "type": "ROOT", "name": "Stanford"}))]);

    for name in [json!({"en": "Stanford"}), json!(["Stanford", "Leland Stanford Junior University"])] {
        let err = harness
            .transform(&[organization(json!({"alias": "x", "type": "ROOT", "name": name}))])
            .unwrap_err();
        assert!(matches!(err, TransformError::Malformed { ref natural_key, .. } if natural_key == "x"));
    }
    assert_eq!(harness.store().literals(&unit, &RDFS_LABEL.uri()), ["Stanford"]);
}

#[test]
fn organization_tree_update() {
    let mut harness = IntegrationHarness::new();
    let ns = namespaces(&harness);
    harness.ingest(&organization_fixture_records(&organization_tree()));
    harness.ingest(&organization_fixture_records(&organization_tree_updated()));
    let store = harness.store();

    let aid = ns.organizations.term("business/financial-aid");
    assert_eq!(
        store.objects(&aid, &PART_OF.uri()),
        uris(&[&ns.organizations.term("law")])
    );
    assert_eq!(
        store.literals(&aid, &SKOS_PREF_LABEL.uri()),
        ["Financial Aid (Law School)"]
    );

    let business = ns.organizations.term("business");
    assert_eq!(
        store.literals(&business, &RDFS_LABEL.uri()),
        ["Stanford Graduate School of Business"]
    );
    assert_eq!(
        store.literals(&ns.organizations.term("law"), &DCTERMS_IDENTIFIER.uri()),
        ["LAAA"]
    );
}

#[test]
fn person_update_replaces_single_values() {
    let mut harness = IntegrationHarness::new();
    let ns = namespaces(&harness);
    harness.ingest(&[person_record(person_profile())]);
    harness.ingest(&[person_record(person_profile_updated())]);
    let store = harness.store();

    let person = ns.people.term("400150");
    assert_eq!(store.literals(&person, &SKOS_PREF_LABEL.uri()), ["Billy Chen"]);
    assert!(store.objects(&person, &VIVO.iri("overview").uri()).is_empty());

    let types = store.objects(&person, &RDF_TYPE.uri());
    assert!(types.contains(&Term::Uri(VIVO.iri("NonAcademic").uri())));
    assert!(!types.contains(&Term::Uri(VIVO.iri("FacultyMember").uri())));

    let address = ns.addresses.term("400150");
    assert_eq!(
        store.literals(&address, &VCARD.iri("locality").uri()),
        ["Palo Alto"]
    );
    assert_eq!(
        store.literals(&address, &VCARD.iri("street-address").uri()),
        ["1 Welch Road"]
    );

    let names = ns.names.term("400150");
    assert_eq!(store.literals(&names, &VCARD.iri("given-name").uri()), ["Billy"]);

    let relationships = store.objects(&person, &VIVO.iri("relatedBy").uri());
    assert_eq!(
        relationships,
        uris(&[
            &ns.relationships.term("188882_400150"),
            &ns.relationships.term("190001_400150"),
        ])
    );
    assert_eq!(
        store.literals(&ns.people.term("190001"), &SKOS_PREF_LABEL.uri()),
        ["Ana Ruiz"]
    );
}

#[test]
fn publication_update_replaces_links() {
    let mut harness = IntegrationHarness::new();
    let ns = namespaces(&harness);
    harness.ingest(&[publication_record(publication())]);

    let document = ns.publications.minted("WOS:000424386600014");
    let store = harness.store();
    assert_eq!(store.objects(&document, &DCTERMS.iri("subject").uri()).len(), 2);
    assert_eq!(store.objects(&document, &VIVO.iri("relatedBy").uri()).len(), 2);
    assert_eq!(
        store.literals(&document, &DCTERMS.iri("title").uri()),
        ["Quantitative perfusion \"mapping\" in practice"]
    );
    assert_eq!(
        store.literals(&document, &graphload_core::vocab::BIBO.iri("doi").uri()),
        ["10.1016/J.JCMG.2017.11.001"]
    );

    harness.ingest(&[publication_record(publication_updated())]);
    let store = harness.store();
    let cardiology = NaturalKey::new(LookupKind::Topic)
        .with("name", "Cardiovascular System & Cardiology");
    assert_eq!(
        store.objects(&document, &DCTERMS.iri("subject").uri()),
        uris(&[&ns.concepts.minted(&cardiology.canonical())])
    );
    assert_eq!(store.objects(&document, &VIVO.iri("relatedBy").uri()).len(), 1);
    assert_eq!(
        store.literals(&document, &graphload_core::vocab::BIBO.iri("abstract").uri()),
        ["Perfusion mapping is reviewed again."]
    );
}

#[test]
fn minted_uris_are_stable_across_runs() {
    let records = [publication_record(publication())];
    let first = IntegrationHarness::new().transform(&records).unwrap();
    let second = IntegrationHarness::new().transform(&records).unwrap();
    assert_eq!(first, second);

    let mut harness = IntegrationHarness::new();
    let ns = namespaces(&harness);
    harness.ingest(&records);
    let chen = ns.people.minted(&chen_key().canonical());
    assert_eq!(
        harness.store().literals(&chen, &SKOS_PREF_LABEL.uri()),
        ["William Chen"]
    );
}

#[test]
fn found_authors_are_linked_not_described() {
    let known = "http://example.org/people/chen";
    let lookup = StaticLookup::new().with_entry(&chen_key(), known);
    let mut harness = IntegrationHarness::with_lookup(fixture_config(), lookup);
    let ns = namespaces(&harness);
    harness.ingest(&[publication_record(publication())]);

    let authorship = ns.relationships.term("WOS:000424386600014_chen");
    assert_eq!(
        harness.store().objects(&authorship, &VIVO.iri("relates").uri()),
        vec![Term::uri(known)]
    );
    assert!(harness.store().about(&Uri::new(known)).is_empty());
}

#[test]
fn failing_lookup_names_the_record() {
    let heading = NaturalKey::new(LookupKind::Topic).with("name", "Cardiovascular System & Cardiology");
    let lookup = StaticLookup::new().failing(&heading);
    let mut harness = IntegrationHarness::with_lookup(fixture_config(), lookup);

    let err = harness
        .transform(&[publication_record(publication())])
        .unwrap_err();
    assert!(matches!(err, TransformError::Resolver { .. }));
    assert_eq!(err.natural_key(), "WOS:000424386600014");
    assert!(harness.store().is_empty());
}

#[test]
fn generator_counts_written_statements() {
    let harness = IntegrationHarness::new();
    let mapping = harness
        .mapper()
        .map(&person_record(person_profile()))
        .unwrap();
    let mut out = Vec::new();
    let written = StatementGenerator::new().write_to(&mapping, &mut out).unwrap();
    assert_eq!(written, String::from_utf8(out).unwrap().matches(";\n").count());
}
