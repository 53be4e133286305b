//! Transform command: source records to statement text.

use chrono::NaiveDate;
use graphload_core::{
    organization_records, EntityLookup, JsonLdDocument, Mapper, MapperConfig, OfflineLookup, Record,
    RecordKind, ResolverCache, StatementGenerator,
};
use graphload_delivery::{Auth, DeliveryClient, DeliveryConfig, HttpLookup, RetryConfig};
use serde_json::Value;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Output written by a transform run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Delete/insert statement text for the load command.
    #[default]
    Statements,
    /// One JSON-LD document holding every mapped record.
    Jsonld,
}

/// Options for one transform run.
#[derive(Debug, Clone)]
pub struct TransformOptions {
    /// Kind of every record in the input.
    pub kind: RecordKind,
    /// JSON input: one document, an array of documents or JSON lines.
    pub input: PathBuf,
    /// Output file; standard output when unset.
    pub output: Option<PathBuf>,
    /// Output format.
    pub format: OutputFormat,
    /// Base URI for namespaces and graphs.
    pub base: String,
    /// Validity date; today when unset.
    pub mapping_date: Option<NaiveDate>,
    /// Resolver service URL; every entity is minted when unset.
    pub resolver: Option<String>,
    /// API key sent to the resolver.
    pub api_key: Option<String>,
    /// Lookup retries before a record fails.
    pub max_retries: u32,
    /// Stop at the first record that fails to map; other failures are
    /// skipped and counted.
    pub fail_fast: bool,
}

/// Counts reported at the end of a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TransformSummary {
    /// Records mapped.
    pub mapped: usize,
    /// Records skipped after a mapping error.
    pub skipped: usize,
    /// Statements written.
    pub statements: usize,
}

/// Runs the transform command.
pub fn run(options: &TransformOptions) -> Result<TransformSummary, Box<dyn std::error::Error>> {
    let records = read_records(options.kind, &options.input)?;
    info!(
        kind = %options.kind,
        records = records.len(),
        input = %options.input.display(),
        "read records"
    );

    let mut config = MapperConfig::with_base(&options.base);
    if let Some(date) = options.mapping_date {
        config = config.with_mapping_date(date);
    }

    let out: Box<dyn Write> = match &options.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let result = match &options.resolver {
        Some(url) => {
            let mut delivery =
                DeliveryConfig::new(url.clone()).with_retry(RetryConfig::new(options.max_retries));
            if let Some(key) = &options.api_key {
                delivery = delivery.with_auth(Auth::api_key(key.clone()));
            }
            let lookup = HttpLookup::new(DeliveryClient::connect(&delivery)?);
            transform(config, lookup, &records, out, options)
        }
        None => transform(config, OfflineLookup, &records, out, options),
    };
    let summary = match result {
        Ok(summary) => summary,
        Err(err) => {
            if let Some(path) = &options.output {
                if let Err(remove) = fs::remove_file(path) {
                    warn!(output = %path.display(), error = %remove, "could not remove partial output");
                }
            }
            return Err(err);
        }
    };

    info!(
        mapped = summary.mapped,
        skipped = summary.skipped,
        statements = summary.statements,
        "transform finished"
    );
    Ok(summary)
}

fn transform<L: EntityLookup>(
    config: MapperConfig,
    lookup: L,
    records: &[Record],
    mut out: Box<dyn Write>,
    options: &TransformOptions,
) -> Result<TransformSummary, Box<dyn std::error::Error>> {
    let cache = ResolverCache::new(lookup);
    let mapper = Mapper::new(config, &cache);
    let mut generator = StatementGenerator::new();
    let mut document = JsonLdDocument::new();
    let mut summary = TransformSummary::default();

    for record in records {
        match mapper.map(record) {
            Ok(mapping) => {
                match options.format {
                    OutputFormat::Statements => {
                        summary.statements += generator.write_to(&mapping, &mut out)?;
                    }
                    OutputFormat::Jsonld => document.put(&mapping),
                }
                summary.mapped += 1;
            }
            Err(err) if options.fail_fast => return Err(err.into()),
            Err(err) => {
                error!(record = %err.natural_key(), error = %err, "skipping record");
                summary.skipped += 1;
            }
        }
    }
    if options.format == OutputFormat::Jsonld {
        serde_json::to_writer_pretty(&mut out, &document.to_value())?;
        writeln!(out)?;
    }
    out.flush()?;

    let stats = cache.stats();
    info!(
        entries = cache.len(),
        hits = stats.hits(),
        misses = stats.misses(),
        "resolver cache"
    );
    Ok(summary)
}

/// Reads every record in a JSON file.
///
/// Organization documents are hierarchy trees and are flattened into one
/// record per unit.
pub fn read_records(kind: RecordKind, path: &Path) -> Result<Vec<Record>, Box<dyn std::error::Error>> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();

    for document in serde_json::Deserializer::from_reader(reader).into_iter::<Value>() {
        let documents = match document? {
            Value::Array(items) => items,
            other => vec![other],
        };
        for value in documents {
            match kind {
                RecordKind::Organization => records.extend(organization_records(&value)?),
                _ => records.push(Record::new(kind, value)?),
            }
        }
    }

    Ok(records)
}
