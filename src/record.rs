//! Assembly of one output record per structural unit.
//!
//! Declared content (what the markup says) and computed fields (what this
//! crate derives) are kept in separate sub-mappings so that an attribute can
//! never shadow a derived value. The search projection is a pure function
//! of the rest of the record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::amendments::{extract_amendments, AmendmentEvent};
use crate::classify::{is_amendment_unit, is_structural};
use crate::config::ProcessOptions;
use crate::content::{NoteEntry, OwnContent, RenderedText};
use crate::diagnostics::{locator, Diagnostic};
use crate::error::Result;
use crate::meta::DocumentMeta;
use crate::references::{self, coverage_gaps, ReferenceSet, ReferenceSets};
use crate::text::{digits_only, structural_children};
use crate::tree::Node;
use crate::walker::{ancestor_summary, AncestorEntry, AncestorPath};

/// Where and when a record was produced. Always supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub file_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub processed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub machine: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildPointer {
    pub kind: String,
    pub num: Option<String>,
    pub heading: Option<String>,
    /// Opaque; empty when the unit carries no `identifier` attribute.
    pub identifier: String,
}

impl ChildPointer {
    pub fn of(node: &Node) -> Self {
        Self {
            kind: node.kind.clone(),
            num: node.number(),
            heading: node.heading(),
            identifier: node.identifier().unwrap_or_default().to_string(),
        }
    }
}

/// Pointers to the structural units whose nearest structural ancestor is `node`.
pub fn child_pointers(node: &Node) -> Vec<ChildPointer> {
    structural_children(node)
        .into_iter()
        .map(ChildPointer::of)
        .collect()
}

/// Markup of a content element, children kept in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementContent {
    pub tag: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<ElementContent>,
    /// Full text of a `p` that has inline children.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub paragraph_text: Option<String>,
    /// Only kept when the element is otherwise empty.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tail: Option<String>,
}

impl ElementContent {
    /// `None` for structural units and for elements with nothing to say.
    pub fn capture(node: &Node) -> Option<Self> {
        if is_structural(&node.kind) {
            return None;
        }

        let children: Vec<ElementContent> =
            node.children.iter().filter_map(ElementContent::capture).collect();
        let paragraph_text = if node.kind == "p" && !children.is_empty() {
            Some(node.full_text().trim().to_string()).filter(|t| !t.is_empty())
        } else {
            None
        };

        let mut content = Self {
            tag: node.kind.clone(),
            attributes: node.attributes.clone(),
            text: node.text.trim().to_string(),
            children,
            paragraph_text,
            tail: None,
        };

        if content.attributes.is_empty() && content.text.is_empty() && content.children.is_empty() {
            let tail = node.tail.trim();
            if tail.is_empty() {
                return None;
            }
            content.tail = Some(tail.to_string());
        }

        Some(content)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredContent {
    pub kind: String,
    pub num: Option<String>,
    pub heading: Option<String>,
    pub attributes: BTreeMap<String, String>,
    pub elements: Vec<ElementContent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedFields {
    pub content_hash: String,
    pub content_length: usize,
    pub tag_order: String,
    pub ancestors: String,
    pub text_local: String,
    pub text_local_length: usize,
    pub source_credit: String,
    pub notes: BTreeMap<String, Vec<NoteEntry>>,
    /// Present for sections only.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub amendment_history: Option<Vec<AmendmentEvent>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub provenance: Option<Provenance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub declared: DeclaredContent,
    pub computed: ComputedFields,
    pub ancestor_path: AncestorPath,
    pub references: ReferenceSets,
    pub child_pointers: Vec<ChildPointer>,
    pub meta: DocumentMeta,
    pub search: SearchProjection,
}

impl Record {
    pub fn identifier(&self) -> Option<&str> {
        self.declared.attributes.get("identifier").map(String::as_str)
    }

    /// True when the stored projection matches one rebuilt from scratch.
    pub fn projection_is_consistent(&self) -> bool {
        SearchProjection::derive(self) == self.search
    }
}

/// Flat view of a record for a search index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchProjection {
    pub guid: String,
    pub element_type: String,
    pub num: String,
    pub num_numeric: String,
    pub heading: String,
    pub identifier: String,
    pub status: String,
    pub is_positive_law: Option<String>,
    pub references: ReferenceSet,
    pub child_identifiers: Vec<String>,
    pub meta: DocumentMeta,
    pub text_local: String,
    pub text_local_length: usize,
    pub source_credit: String,
    pub notes: BTreeMap<String, Vec<NoteEntry>>,
}

impl SearchProjection {
    pub fn derive(record: &Record) -> Self {
        let declared = &record.declared;
        let attr = |name: &str| {
            declared
                .attributes
                .get(name)
                .cloned()
                .unwrap_or_default()
        };
        let num = declared.num.clone().unwrap_or_default();
        let status = Some(attr("status"))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "none".to_string());

        Self {
            guid: attr("id"),
            element_type: declared.kind.clone(),
            num_numeric: digits_only(&num),
            num,
            heading: declared.heading.clone().unwrap_or_default(),
            identifier: attr("identifier"),
            status,
            is_positive_law: record.meta.is_positive_law().map(str::to_string),
            references: record.references.local.clone(),
            child_identifiers: record
                .child_pointers
                .iter()
                .filter(|c| !c.identifier.is_empty())
                .map(|c| c.identifier.clone())
                .collect(),
            meta: record.meta.clone(),
            text_local: record.computed.text_local.clone(),
            text_local_length: record.computed.text_local_length,
            source_credit: record.computed.source_credit.clone(),
            notes: record.computed.notes.clone(),
        }
    }
}

/// Per-document settings shared by every record the document yields.
pub struct RecordBuilder<'d> {
    pub meta: &'d DocumentMeta,
    pub provenance: Option<&'d Provenance>,
    pub options: &'d ProcessOptions,
}

impl<'d> RecordBuilder<'d> {
    pub fn new(
        meta: &'d DocumentMeta,
        provenance: Option<&'d Provenance>,
        options: &'d ProcessOptions,
    ) -> Self {
        Self {
            meta,
            provenance,
            options,
        }
    }

    /// Merge already-extracted parts into a record.
    ///
    /// Fails only when the node holds a malformed element and the
    /// missing-attribute policy is strict.
    pub fn build(
        &self,
        node: &Node,
        ancestors: &[AncestorEntry],
        references: ReferenceSets,
        amendments: Option<Vec<AmendmentEvent>>,
        child_pointers: Vec<ChildPointer>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Record> {
        let own = OwnContent::extract(node, self.options.missing_attribute_policy, diagnostics)?;
        let rendered = RenderedText::of(node);

        let declared = DeclaredContent {
            kind: node.kind.clone(),
            num: node.number(),
            heading: node.heading(),
            attributes: node.attributes.clone(),
            elements: node
                .children
                .iter()
                .filter_map(ElementContent::capture)
                .collect(),
        };

        let computed = ComputedFields {
            content_hash: rendered.content_hash,
            content_length: rendered.content_length,
            tag_order: rendered.tag_order,
            ancestors: ancestor_summary(ancestors),
            text_local_length: own.text_local.chars().count(),
            text_local: own.text_local,
            source_credit: own.source_credit,
            notes: own.notes,
            amendment_history: amendments,
            provenance: self.provenance.cloned(),
        };

        let mut record = Record {
            declared,
            computed,
            ancestor_path: ancestors.to_vec(),
            references,
            child_pointers,
            meta: self.meta.clone(),
            search: SearchProjection::default(),
        };
        record.search = SearchProjection::derive(&record);
        Ok(record)
    }

    /// Run every extractor over `node` and build its record.
    pub fn build_for(
        &self,
        node: &Node,
        ancestors: &[AncestorEntry],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Record> {
        let amendments = is_amendment_unit(&node.kind).then(|| extract_amendments(node));
        let record = self.build(
            node,
            ancestors,
            references::extract(node),
            amendments,
            child_pointers(node),
            diagnostics,
        )?;

        if self.options.report_coverage_gaps {
            let element = locator(node);
            diagnostics.extend(
                coverage_gaps(&record.references.local)
                    .into_iter()
                    .map(|gap| Diagnostic::CoverageGap {
                        element: element.clone(),
                        gap,
                    }),
            );
        }

        Ok(record)
    }
}
