use anyhow::{bail, Context, Result};
use clap::Parser;
use reclink_core::{Cluster, ClusterAssignment, Record, RecordId, RecordSet};
use reclink_model::{LinkageSettings, Linker};
use serde::Serialize;
use serde_json::Value;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Probabilistic record linkage and deduplication
#[derive(Parser, Debug)]
#[command(name = "reclink")]
#[command(about = "Probabilistic record linkage and deduplication", long_about = None)]
struct Args {
    /// Path to the linkage settings JSON (the trained model parameters)
    #[arg(short, long)]
    settings: PathBuf,

    /// CSV of records to deduplicate (or the left set when linking)
    #[arg(short, long)]
    records: PathBuf,

    /// Optional right-hand CSV for a two-dataset linking job
    #[arg(long)]
    link_with: Option<PathBuf>,

    /// Column holding the record id (row number when omitted)
    #[arg(long)]
    id_column: Option<String>,

    /// Override the settings' match threshold
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Output path for the cluster report (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Serialize)]
struct ClusterReport<'a> {
    clusters: &'a [Cluster],
    assignments: &'a [ClusterAssignment],
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting reclink v{}", env!("CARGO_PKG_VERSION"));

    let settings_file = File::open(&args.settings)
        .with_context(|| format!("failed to open settings file {:?}", args.settings))?;
    let settings = LinkageSettings::from_reader(settings_file)
        .with_context(|| format!("invalid linkage settings in {:?}", args.settings))?;
    let linker = Linker::new(settings)?;
    info!(
        comparisons = linker.settings().comparisons.len(),
        blocking_rules = linker.settings().blocking_rules.len(),
        "loaded linkage settings"
    );

    let records = read_csv_records(&args.records, args.id_column.as_deref())?;
    info!(records = records.len(), path = %args.records.display(), "loaded records");

    let threshold = args.threshold.unwrap_or(linker.settings().match_threshold);
    let output = match &args.link_with {
        Some(path) => {
            let right = read_csv_records(path, args.id_column.as_deref())?;
            info!(records = right.len(), path = %path.display(), "loaded right-hand records");
            linker.link_at(&records, &right, threshold)?
        }
        None => linker.deduplicate_at(&records, threshold)?,
    };
    info!(
        clusters = output.clusters.len(),
        threshold, "linkage complete"
    );

    let report = ClusterReport {
        clusters: output.clusters.clusters(),
        assignments: &output.assignments,
    };
    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create output file {:?}", path))?;
            serde_json::to_writer_pretty(file, &report)?;
            info!(path = %path.display(), "wrote cluster report");
        }
        None => {
            serde_json::to_writer_pretty(std::io::stdout().lock(), &report)?;
            println!();
        }
    }

    Ok(())
}

/// Read a CSV file into a record set
///
/// Every cell becomes a string field; empty cells become null so the
/// comparison model treats them as missing. The id comes from `id_column`
/// when given, otherwise from the row number.
fn read_csv_records(path: &Path, id_column: Option<&str>) -> Result<RecordSet> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open records file {:?}", path))?;
    let headers = reader.headers()?.clone();

    if let Some(id_column) = id_column {
        if !headers.iter().any(|h| h == id_column) {
            bail!("id column '{}' not present in {:?}", id_column, path);
        }
    }

    let mut set = RecordSet::new();
    for (row, result) in reader.records().enumerate() {
        let row_values =
            result.with_context(|| format!("failed to read row {} of {:?}", row + 1, path))?;

        let mut fields = serde_json::Map::new();
        let mut id: Option<RecordId> = None;
        for (header, value) in headers.iter().zip(row_values.iter()) {
            if Some(header) == id_column {
                id = Some(RecordId::String(value.to_string()));
            }
            let field_value = if value.is_empty() {
                Value::Null
            } else {
                Value::String(value.to_string())
            };
            fields.insert(header.to_string(), field_value);
        }

        let id = id.unwrap_or(RecordId::Integer(row as u64));
        set.push(Record::new(id, Value::Object(fields)))
            .with_context(|| format!("failed to ingest row {} of {:?}", row + 1, path))?;
    }

    Ok(set)
}
