use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use usc_records::logging;
use usc_records::record::{Provenance, Record};
use usc_records::runtime::{process_batch, RecordSink, SourceDocument};
use usc_records::tree::{parse_document, tag_histogram};
use usc_records::ProcessOptions;

type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;

const MAX_SHOWN: usize = 10;

struct Args {
    xml_path: String,
    kind: Option<String>,
    num: Option<String>,
    search_only: bool,
    config: Option<String>,
}

fn usage() -> ! {
    eprintln!(
        "Usage: explore <xml_file> [--type KIND] [--num N] [--search-only] [--config FILE]"
    );
    std::process::exit(2);
}

fn parse_args() -> Args {
    let mut args = std::env::args().skip(1);
    let mut parsed = Args {
        xml_path: String::new(),
        kind: None,
        num: None,
        search_only: false,
        config: None,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--type" => parsed.kind = Some(args.next().unwrap_or_else(|| usage())),
            "--num" => parsed.num = Some(args.next().unwrap_or_else(|| usage())),
            "--config" => parsed.config = Some(args.next().unwrap_or_else(|| usage())),
            "--search-only" => parsed.search_only = true,
            flag if flag.starts_with("--") => usage(),
            _ if parsed.xml_path.is_empty() => parsed.xml_path = arg.clone(),
            _ => usage(),
        }
    }

    if parsed.xml_path.is_empty() {
        usage();
    }
    parsed
}

#[tokio::main]
async fn main() -> Result<(), DynError> {
    logging::init();
    let args = parse_args();

    let options = match &args.config {
        Some(path) => ProcessOptions::load_from_file(path)?,
        None => ProcessOptions::default(),
    };
    let xml = std::fs::read_to_string(&args.xml_path)?;

    let file_source = Path::new(&args.xml_path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(&args.xml_path)
        .to_string();

    println!("tags:");
    for (tag, count) in tag_histogram(&parse_document(&xml)?) {
        println!("  {tag}: {count}");
    }

    let document = SourceDocument {
        name: file_source.clone(),
        xml,
        provenance: Some(Provenance {
            file_source: Some(file_source),
            processed_at: Some(chrono::Utc::now().to_rfc3339()),
            machine: std::env::var("HOSTNAME").ok(),
        }),
    };

    let sink = CaptureRecordSink::new();
    let report = process_batch(vec![document], &options, Arc::new(sink.clone())).await;
    if let Some(failure) = report.failed().next() {
        return Err(format!(
            "{}: {}",
            failure.name,
            failure.error.as_deref().unwrap_or_default()
        )
        .into());
    }

    let records = sink.records();
    println!("records: {}", records.len());

    if args.kind.is_none() && args.num.is_none() {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for record in &records {
            *counts.entry(record.declared.kind.as_str()).or_default() += 1;
        }
        println!("kinds:");
        for (kind, count) in counts {
            println!("  {kind}: {count}");
        }
    }

    let matched = records
        .iter()
        .filter(|r| args.kind.as_deref().map_or(true, |k| r.declared.kind == k))
        .filter(|r| args.num.as_deref().map_or(true, |n| r.search.num_numeric == n))
        .collect::<Vec<_>>();
    println!("matches: {}", matched.len());

    for record in matched.iter().take(MAX_SHOWN) {
        let value = if args.search_only {
            serde_json::to_value(&record.search)?
        } else {
            serde_json::to_value(record)?
        };
        println!("  - {}:", record.search.identifier);
        print_indented_json(&value, 4);
    }
    if matched.len() > MAX_SHOWN {
        println!("  ... and {} more", matched.len() - MAX_SHOWN);
    }

    if !report.documents.is_empty() {
        let diagnostics = &report.documents[0].diagnostics;
        println!("diagnostics: {}", diagnostics.len());
        for diagnostic in diagnostics {
            println!("  - {}", diagnostic.message());
        }
    }

    Ok(())
}

#[derive(Clone)]
struct CaptureRecordSink {
    records: Arc<Mutex<Vec<Record>>>,
}

impl CaptureRecordSink {
    fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn records(&self) -> Vec<Record> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RecordSink for CaptureRecordSink {
    async fn insert_record(&self, _document: &str, record: Record) -> Result<(), String> {
        self.records
            .lock()
            .map_err(|_| "record lock poisoned".to_string())?
            .push(record);
        Ok(())
    }

    async fn flush(&self) -> Result<(), String> {
        Ok(())
    }
}

fn print_indented_json(value: &Value, indent: usize) {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string());
    let pad = " ".repeat(indent);
    for line in pretty.lines() {
        println!("{pad}{line}");
    }
}
