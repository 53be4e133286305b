//! Fuzz testing harnesses.
//!
//! These targets can be driven by cargo-fuzz or by proptest. Each one
//! must return normally for any input; an error result is fine, a panic
//! is a bug.

use crate::fixtures::fixture_config;
use graphload_codec::{parse_statement, CodecError, StatementReader};
use graphload_core::{Mapper, OfflineLookup, Record, RecordKind, StatementGenerator};

/// Fuzz target for the batching reader.
///
/// Arbitrary bytes either read as batches or stop with an error, after
/// which the reader yields nothing more.
pub fn fuzz_statement_reader(data: &[u8]) {
    let mut reader = StatementReader::new(data);
    for item in reader.by_ref() {
        match item {
            Ok(batch) => assert!(!batch.is_empty(), "empty batch"),
            Err(CodecError::InvalidEncoding { .. }) => break,
            Err(_) => {}
        }
    }
    assert!(reader.next().is_none(), "reader resumed after its end");
}

/// Fuzz target for the statement decoder.
pub fn fuzz_parse_statement(data: &[u8]) {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = parse_statement(text);
    }
}

/// Fuzz target for record mapping.
///
/// Any JSON document is mapped as each record kind; whatever maps must
/// read back as statements without error.
pub fn fuzz_record_mapping(data: &[u8]) {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let mapper = Mapper::new(fixture_config(), OfflineLookup);
    let mut generator = StatementGenerator::new();

    for kind in [RecordKind::Organization, RecordKind::Person, RecordKind::Publication] {
        let Ok(record) = Record::new(kind, value.clone()) else {
            continue;
        };
        let Ok(mapping) = mapper.map(&record) else {
            continue;
        };
        for statement in generator.generate(&mapping) {
            assert!(
                parse_statement(statement.text()).is_ok(),
                "generated statement does not parse: {}",
                statement.text()
            );
        }
    }
}
