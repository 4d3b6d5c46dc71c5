use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::tree::Node;

const META_FIELDS: &[&str] = &[
    "dc:title",
    "dc:type",
    "dc:publisher",
    "dc:creator",
    "dcterms:created",
    "docNumber",
    "docPublicationName",
];

/// Document-level metadata from the `<meta>` block, shared by every record
/// of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentMeta(pub BTreeMap<String, String>);

impl DocumentMeta {
    pub const POSITIVE_LAW_KEY: &'static str = "property[@role=\"is-positive-law\"]";

    pub fn extract(root: &Node) -> Self {
        let mut fields = BTreeMap::new();
        let meta = if root.kind == "meta" {
            Some(root)
        } else {
            root.descendants().find(|n| n.kind == "meta")
        };
        let Some(meta) = meta else {
            return Self(fields);
        };

        for node in meta.descendants() {
            let text = node.text.trim();
            if text.is_empty() {
                continue;
            }
            if node.kind == "property" {
                if let Some(role) = node.attr("role") {
                    fields.insert(format!("property[@role=\"{role}\"]"), text.to_string());
                }
            } else if META_FIELDS.contains(&node.kind.as_str()) {
                fields
                    .entry(node.kind.clone())
                    .or_insert_with(|| text.to_string());
            }
        }

        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_positive_law(&self) -> Option<&str> {
        self.get(Self::POSITIVE_LAW_KEY)
    }
}
