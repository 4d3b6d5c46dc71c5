use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;
use crate::references::{CoverageGap, GapSide};
use crate::tree::Node;

/// Non-fatal findings collected while building a document's records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Diagnostic {
    CoverageGap {
        element: String,
        gap: CoverageGap,
    },
    /// A malformed sub-element was left out of an otherwise complete record.
    SkippedElement {
        element: String,
        tag: String,
        missing_attribute: String,
    },
    /// No record was produced for this element.
    SkippedRecord {
        element: String,
        reason: String,
    },
}

impl Diagnostic {
    pub fn level(&self) -> LogLevel {
        match self {
            Diagnostic::CoverageGap { .. } => LogLevel::Debug,
            Diagnostic::SkippedElement { .. } | Diagnostic::SkippedRecord { .. } => LogLevel::Warn,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Diagnostic::CoverageGap { element, gap } => {
                let side = match gap.side {
                    GapSide::TextOnly => "cited in text without a link",
                    GapSide::LinkOnly => "linked without a text citation",
                };
                format!("{element}: {} {side}", gap.normalized)
            }
            Diagnostic::SkippedElement {
                element,
                tag,
                missing_attribute,
            } => format!("{element}: skipped <{tag}> without '{missing_attribute}'"),
            Diagnostic::SkippedRecord { element, reason } => {
                format!("{element}: record skipped: {reason}")
            }
        }
    }
}

/// Human-readable handle for a node: identifier, then id, then kind and num.
pub fn locator(node: &Node) -> String {
    if let Some(identifier) = node.identifier().filter(|s| !s.is_empty()) {
        return identifier.to_string();
    }
    if let Some(id) = node.attr("id").filter(|s| !s.is_empty()) {
        return id.to_string();
    }
    match node.number() {
        Some(num) => format!("{} {num}", node.kind),
        None => node.kind.clone(),
    }
}
