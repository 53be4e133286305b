//! Source record fixtures.
//!
//! Each fixture comes in an original and an updated version so tests can
//! ingest one, then the other, and check what the store holds afterwards.

use chrono::NaiveDate;
use graphload_core::{
    organization_records, Mapper, MapperConfig, Record, RecordKind, ResolverCache,
};
use serde_json::{json, Value};

/// Mapping date pinned by every fixture mapper.
pub fn fixture_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2018, 2, 1).unwrap_or_default()
}

/// Mapper configuration with the default base and the fixture date.
pub fn fixture_config() -> MapperConfig {
    MapperConfig::default().with_mapping_date(fixture_date())
}

/// Mapper with the fixture configuration over a cached lookup.
pub fn fixture_mapper<L: graphload_core::EntityLookup>(lookup: L) -> Mapper<ResolverCache<L>> {
    Mapper::new(fixture_config(), ResolverCache::new(lookup))
}

/// Organization tree: a university with two schools, one of which has a
/// department with a generic name.
pub fn organization_tree() -> Value {
    json!({
        "alias": "stanford",
        "name": "Stanford University",
        "type": "ROOT",
        "orgCodes": ["AA00"],
        "children": [
            {
                "alias": "business",
                "name": "Graduate School of Business",
                "type": "SCHOOL",
                "orgCodes": ["BAAA"],
                "children": [
                    {
                        "alias": "business/financial-aid",
                        "name": "Financial Aid",
                        "type": "DEPARTMENT",
                        "orgCodes": ["BFAA"]
                    }
                ]
            },
            {
                "alias": "law",
                "name": "Law School",
                "type": "SCHOOL",
                "orgCodes": ["LAAA", "LBBB"]
            }
        ]
    })
}

/// The same tree after a rename, a code change and the department moving
/// to the law school.
pub fn organization_tree_updated() -> Value {
    json!({
        "alias": "stanford",
        "name": "Stanford University",
        "type": "ROOT",
        "orgCodes": ["AA00"],
        "children": [
            {
                "alias": "business",
                "name": "Stanford Graduate School of Business",
                "type": "SCHOOL",
                "orgCodes": ["BAAA"]
            },
            {
                "alias": "law",
                "name": "Law School",
                "type": "SCHOOL",
                "orgCodes": ["LAAA"],
                "children": [
                    {
                        "alias": "business/financial-aid",
                        "name": "Financial Aid",
                        "type": "DEPARTMENT",
                        "orgCodes": ["BFAA"]
                    }
                ]
            }
        ]
    })
}

/// Flattens an organization tree into records.
pub fn organization_fixture_records(tree: &Value) -> Vec<Record> {
    organization_records(tree).unwrap_or_default()
}

/// A faculty profile with a bio, an address and one advisee.
pub fn person_profile() -> Value {
    json!({
        "profileId": 400150,
        "affiliations": {"capFaculty": true, "capStaff": false},
        "names": {
            "legal": {"firstName": "William", "lastName": "Chen"},
            "preferred": {"firstName": "Bill", "lastName": "Chen"}
        },
        "bio": {"text": "Bill Chen studies cardiac imaging."},
        "contacts": [
            {"type": "academic", "email": "billchen1@stanford.edu"},
            {
                "address": "300 Pasteur Drive",
                "city": "Stanford",
                "state": "California",
                "zip": "94305"
            }
        ],
        "primaryContact": {"email": "billchen1@stanford.edu"},
        "advisees": [
            {"advisee": {"firstName": "Lyuqin", "lastName": "Cao", "profileId": 188882}, "code": "PDFS"}
        ],
        "uid": "billchen1"
    })
}

/// The same profile after the preferred name, affiliation and address
/// changed, the bio was removed and a second advisee was added.
pub fn person_profile_updated() -> Value {
    json!({
        "profileId": 400150,
        "affiliations": {"capFaculty": false, "capStaff": true},
        "names": {
            "legal": {"firstName": "William", "lastName": "Chen"},
            "preferred": {"firstName": "Billy", "lastName": "Chen"}
        },
        "contacts": [
            {
                "address": "1 Welch Road",
                "city": "Palo Alto",
                "state": "California",
                "zip": "94304"
            }
        ],
        "primaryContact": {"email": "billchen1@stanford.edu"},
        "advisees": [
            {"advisee": {"firstName": "Lyuqin", "lastName": "Cao", "profileId": 188882}, "code": "PDFS"},
            {"advisee": {"firstName": "Ana", "lastName": "Ruiz", "profileId": 190001}, "code": "PHD"}
        ],
        "uid": "billchen1"
    })
}

/// Profile record.
pub fn person_record(profile: Value) -> Record {
    Record::new(RecordKind::Person, profile).unwrap_or_else(|err| panic!("fixture profile: {err}"))
}

/// A publication with two authors at two addresses and two headings.
pub fn publication() -> Value {
    json!({
        "UID": "WOS:000424386600014",
        "static_data": {
            "summary": {
                "titles": {"title": [
                    {"type": "source", "content": "JOURNAL OF CARDIAC IMAGING"},
                    {"type": "item", "content": "Quantitative perfusion \"mapping\" in practice"}
                ]},
                "pub_info": {"sortdate": "2018-01-15"},
                "publishers": {"publisher": {"names": {"name": {"full_name": "ELSEVIER SCIENCE INC"}}}},
                "names": {"name": [
                    {
                        "role": "author",
                        "full_name": "Chen, William",
                        "first_name": "William",
                        "last_name": "Chen",
                        "addr_no": "1 2"
                    },
                    {
                        "role": "author",
                        "full_name": "Cao, Lyuqin",
                        "first_name": "Lyuqin",
                        "last_name": "Cao",
                        "addr_no": 2
                    },
                    {"role": "book_editor", "full_name": "Editor, Some"}
                ]}
            },
            "fullrecord_metadata": {
                "abstracts": {"abstract": {"abstract_text": {"p": [
                    "Perfusion mapping is reviewed.",
                    "Results; limitations and outlook."
                ]}}},
                "addresses": {"address_name": [
                    {"address_spec": {"addr_no": 1, "country": "USA", "organizations": {"organization": [
                        "Stanford Univ",
                        {"pref": "Y", "content": "Stanford University"}
                    ]}}},
                    {"address_spec": {"addr_no": 2, "country": "Peoples R China", "organizations": {"organization":
                        {"pref": "Y", "content": "Peking University"}
                    }}}
                ]},
                "category_info": {"subjects": {"subject": [
                    {"ascatype": "traditional", "content": "CARDIAC & CARDIOVASCULAR SYSTEMS"},
                    {"ascatype": "extended", "content": "Cardiovascular System & Cardiology"},
                    {"ascatype": "extended", "content": "Radiology, Nuclear Medicine & Medical Imaging"}
                ]}}
            }
        },
        "dynamic_data": {"cluster_related": {"identifiers": {"identifier": [
            {"type": "issn", "value": "1234-5678"},
            {"type": "xref_doi", "value": "10.1016/j.jcmg.2017.11.001"},
            {"type": "doi", "value": "10.1016/J.JCMG.2017.11.001"}
        ]}}}
    })
}

/// The same publication after an author and a heading were removed and
/// the abstract was revised.
pub fn publication_updated() -> Value {
    let mut value = publication();
    if let Some(names) = value.pointer_mut("/static_data/summary/names/name") {
        *names = json!([{
            "role": "author",
            "full_name": "Chen, William",
            "first_name": "William",
            "last_name": "Chen",
            "addr_no": "1 2"
        }]);
    }
    if let Some(subjects) = value.pointer_mut("/static_data/fullrecord_metadata/category_info/subjects/subject") {
        *subjects = json!([
            {"ascatype": "extended", "content": "Cardiovascular System & Cardiology"}
        ]);
    }
    if let Some(text) = value.pointer_mut("/static_data/fullrecord_metadata/abstracts/abstract/abstract_text/p") {
        *text = json!("Perfusion mapping is reviewed again.");
    }
    value
}

/// Publication record.
pub fn publication_record(value: Value) -> Record {
    Record::new(RecordKind::Publication, value)
        .unwrap_or_else(|err| panic!("fixture publication: {err}"))
}
