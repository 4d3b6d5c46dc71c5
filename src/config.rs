use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{RecordError, Result};

/// What to do with an element that lacks an attribute the schema requires,
/// such as a `<note>` without `topic`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingAttributePolicy {
    /// Drop the element, report it, and keep building the record.
    #[default]
    Skip,
    /// Fail the enclosing record; the rest of the document still processes.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessOptions {
    pub missing_attribute_policy: MissingAttributePolicy,
    pub report_coverage_gaps: bool,
    pub max_concurrent_documents: usize,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            missing_attribute_policy: MissingAttributePolicy::Skip,
            report_coverage_gaps: true,
            max_concurrent_documents: 4,
        }
    }
}

impl ProcessOptions {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| RecordError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}
