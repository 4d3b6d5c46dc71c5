use serde::{Deserialize, Serialize};

use crate::classify::NodeClass;
use crate::config::ProcessOptions;
use crate::diagnostics::{locator, Diagnostic};
use crate::error::Result;
use crate::logging::log_diagnostic;
use crate::meta::DocumentMeta;
use crate::record::{Provenance, Record, RecordBuilder};
use crate::tree::{parse_document, Node};
use crate::walker::walk_with;

#[derive(Debug, Clone, Default)]
pub struct DocumentContext {
    /// Used in log lines only.
    pub name: String,
    pub provenance: Option<Provenance>,
}

impl DocumentContext {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provenance: None,
        }
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = Some(provenance);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentOutput {
    pub records: Vec<Record>,
    pub diagnostics: Vec<Diagnostic>,
}

/// One record per structural unit of `root`, in document order.
///
/// A unit whose record cannot be built is reported and skipped; its
/// descendants still get their own records.
pub fn process_document(
    root: &Node,
    options: &ProcessOptions,
    context: &DocumentContext,
) -> DocumentOutput {
    let meta = DocumentMeta::extract(root);
    let builder = RecordBuilder::new(&meta, context.provenance.as_ref(), options);
    let mut output = DocumentOutput::default();

    walk_with(root, |visit| {
        if visit.class != NodeClass::Structural {
            return;
        }
        let mut diagnostics = Vec::new();
        match builder.build_for(visit.node, visit.ancestors, &mut diagnostics) {
            Ok(record) => output.records.push(record),
            Err(err) => diagnostics.push(Diagnostic::SkippedRecord {
                element: locator(visit.node),
                reason: err.to_string(),
            }),
        }
        output.diagnostics.append(&mut diagnostics);
    });

    for diagnostic in &output.diagnostics {
        log_diagnostic(&context.name, diagnostic);
    }
    tracing::debug!(
        "[usc-records] {}: {} records, {} diagnostics",
        context.name,
        output.records.len(),
        output.diagnostics.len()
    );

    output
}

pub fn process_xml(
    xml: &str,
    options: &ProcessOptions,
    context: &DocumentContext,
) -> Result<DocumentOutput> {
    let root = parse_document(xml)?;
    Ok(process_document(&root, options, context))
}
