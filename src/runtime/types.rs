use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostic;
use crate::record::{Provenance, Record};

/// Destination for finished records. Storage lives behind this seam.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn insert_record(&self, document: &str, record: Record) -> Result<(), String>;
    async fn flush(&self) -> Result<(), String>;
}

#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub name: String,
    pub xml: String,
    pub provenance: Option<Provenance>,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, xml: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            xml: xml.into(),
            provenance: None,
        }
    }
}

pub enum DocumentStatus {
    Completed,
    Failed,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            DocumentStatus::Completed => "completed",
            DocumentStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentReport {
    pub name: String,
    /// Records handed to the sink.
    pub records: usize,
    pub diagnostics: Vec<Diagnostic>,
    /// Set when the document could not be parsed or its records not stored.
    pub error: Option<String>,
}

impl DocumentReport {
    pub fn status(&self) -> DocumentStatus {
        if self.error.is_some() {
            DocumentStatus::Failed
        } else {
            DocumentStatus::Completed
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Same order as the submitted documents.
    pub documents: Vec<DocumentReport>,
    /// The sink is flushed once, after every document has been submitted.
    pub flush_error: Option<String>,
}

impl BatchReport {
    pub fn total_records(&self) -> usize {
        self.documents.iter().map(|d| d.records).sum()
    }

    pub fn failed(&self) -> impl Iterator<Item = &DocumentReport> {
        self.documents.iter().filter(|d| d.error.is_some())
    }
}
