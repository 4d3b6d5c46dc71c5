use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::ProcessOptions;
use crate::document::{process_xml, DocumentContext};
use crate::runtime::types::{BatchReport, DocumentReport, RecordSink, SourceDocument};

/// Process independent documents in parallel and feed their records to `sink`.
///
/// Parsing and record building run on blocking workers, at most
/// `max_concurrent_documents` at a time. A document that fails never
/// affects its siblings; reports come back in submission order.
pub async fn process_batch(
    documents: Vec<SourceDocument>,
    options: &ProcessOptions,
    sink: Arc<dyn RecordSink>,
) -> BatchReport {
    let names: Vec<String> = documents.iter().map(|d| d.name.clone()).collect();
    let semaphore = Arc::new(Semaphore::new(options.max_concurrent_documents.max(1)));

    tracing::info!(
        "[usc-records] Starting batch of {} documents ({} workers)",
        names.len(),
        options.max_concurrent_documents.max(1)
    );

    let mut tasks = JoinSet::new();
    for (index, document) in documents.into_iter().enumerate() {
        let semaphore = semaphore.clone();
        let sink = sink.clone();
        let options = options.clone();
        tasks.spawn(async move {
            let report = process_one(document, options, sink, semaphore).await;
            (index, report)
        });
    }

    let mut slots: Vec<Option<DocumentReport>> = vec![None; names.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, report)) => slots[index] = Some(report),
            Err(err) => tracing::error!("[usc-records] Worker task failed: {}", err),
        }
    }

    let documents = slots
        .into_iter()
        .zip(names)
        .map(|(slot, name)| {
            slot.unwrap_or_else(|| DocumentReport {
                name,
                error: Some("worker task failed".to_string()),
                ..Default::default()
            })
        })
        .collect();

    let mut report = BatchReport {
        documents,
        flush_error: None,
    };

    if let Err(err) = sink.flush().await {
        tracing::error!("[usc-records] Flushing records failed: {}", err);
        report.flush_error = Some(err);
    }

    tracing::info!(
        "[usc-records] Batch complete: {} records, {} failed documents",
        report.total_records(),
        report.failed().count()
    );
    report
}

async fn process_one(
    document: SourceDocument,
    options: ProcessOptions,
    sink: Arc<dyn RecordSink>,
    semaphore: Arc<Semaphore>,
) -> DocumentReport {
    let SourceDocument {
        name,
        xml,
        provenance,
    } = document;
    let mut report = DocumentReport {
        name: name.clone(),
        ..Default::default()
    };

    let _permit = match semaphore.acquire_owned().await {
        Ok(permit) => permit,
        Err(err) => {
            report.error = Some(err.to_string());
            return report;
        }
    };

    let context = DocumentContext {
        name: name.clone(),
        provenance,
    };
    let built = tokio::task::spawn_blocking(move || process_xml(&xml, &options, &context)).await;

    let output = match built {
        Ok(Ok(output)) => output,
        Ok(Err(err)) => {
            tracing::error!("[usc-records] {} failed: {}", name, err);
            report.error = Some(err.to_string());
            return report;
        }
        Err(err) => {
            tracing::error!("[usc-records] {} worker failed: {}", name, err);
            report.error = Some(err.to_string());
            return report;
        }
    };

    report.diagnostics = output.diagnostics;
    for record in output.records {
        if let Err(err) = sink.insert_record(&name, record).await {
            tracing::error!("[usc-records] {}: storing record failed: {}", name, err);
            report.error = Some(err);
            return report;
        }
        report.records += 1;
    }

    tracing::info!(
        "[usc-records] {}: {} ({} records)",
        name,
        report.status().as_str(),
        report.records
    );
    report
}
