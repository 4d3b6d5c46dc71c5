//! Text a structural unit owns itself: its heading block, table of contents,
//! notes and source credit, but nothing from the units nested inside it.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::classify::is_structural;
use crate::config::MissingAttributePolicy;
use crate::diagnostics::{locator, Diagnostic};
use crate::error::{RecordError, Result};
use crate::text::collapse_whitespace;
use crate::tree::Node;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEntry {
    pub content: String,
    pub role: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnContent {
    pub text_local: String,
    pub source_credit: String,
    pub notes: BTreeMap<String, Vec<NoteEntry>>,
}

impl OwnContent {
    pub fn extract(
        node: &Node,
        policy: MissingAttributePolicy,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Self> {
        let mut own = OwnContent::default();
        let mut parts: Vec<String> = Vec::new();

        for child in &node.children {
            if is_structural(&child.kind) {
                continue;
            }
            match child.kind.as_str() {
                "toc" => parts.push(render_toc(child)),
                "notes" => {
                    for (topic, entry) in extract_notes(node, child, policy, diagnostics)? {
                        parts.push(format!("{topic}:\n{}", entry.content));
                        own.notes.entry(topic).or_default().push(entry);
                    }
                }
                "sourceCredit" => {
                    let credit = collapse_whitespace(&render_refs_with_hrefs(child));
                    if !credit.is_empty() {
                        parts.push(format!("Source Credit: {credit}"));
                    }
                    own.source_credit = credit;
                }
                _ => {
                    if let Some(heading) = child.heading() {
                        parts.push(heading);
                    }
                    let text = content_text(child);
                    if !text.is_empty() {
                        parts.push(text);
                    }
                }
            }
        }

        own.text_local = parts.join("\n\n");
        Ok(own)
    }
}

/// `<note>` children of `notes`, in document order, keyed by topic.
fn extract_notes(
    unit: &Node,
    notes: &Node,
    policy: MissingAttributePolicy,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Vec<(String, NoteEntry)>> {
    let mut entries = Vec::new();

    for note in notes.children_of_kind("note") {
        let Some(topic) = note.attr("topic") else {
            match policy {
                MissingAttributePolicy::Skip => {
                    diagnostics.push(Diagnostic::SkippedElement {
                        element: locator(unit),
                        tag: "note".to_string(),
                        missing_attribute: "topic".to_string(),
                    });
                    continue;
                }
                MissingAttributePolicy::Strict => {
                    return Err(RecordError::MissingAttribute {
                        element: "note".to_string(),
                        attribute: "topic".to_string(),
                        context: locator(unit),
                    });
                }
            }
        };

        let content = collapse_whitespace(&render_refs_with_hrefs(note));
        if content.is_empty() {
            continue;
        }
        entries.push((
            topic.to_string(),
            NoteEntry {
                content,
                role: note.attr("role").unwrap_or("none").to_string(),
            },
        ));
    }

    Ok(entries)
}

/// Inline `<ref>` children as `href, text` so link targets survive flattening.
pub fn render_refs_with_hrefs(node: &Node) -> String {
    let mut out = node.text.clone();
    for child in &node.children {
        if child.kind == "ref" {
            let href = child.attr("href").unwrap_or_default();
            let text = child.full_text();
            if !href.is_empty() && !text.is_empty() {
                out.push_str(&format!("{href}, {text}"));
            } else {
                out.push_str(&text);
            }
        } else {
            out.push_str(&child.full_text());
        }
        out.push_str(&child.tail);
    }
    out
}

/// Table of contents as `left right` lines, footnotes collected at the end.
pub fn render_toc(toc: &Node) -> String {
    let header = toc
        .descendants()
        .find(|n| n.kind == "header" && n.attr("role") == Some("tocColumnHeader"))
        .map(|n| n.full_text().trim().to_string())
        .filter(|t| !t.is_empty());

    let mut lines = Vec::new();
    let mut footnotes = Vec::new();

    for item in toc.descendants().filter(|n| n.kind == "tocItem") {
        let column = |class: &str| {
            item.descendants()
                .find(|n| n.kind == "column" && n.attr("class") == Some(class))
        };
        let (Some(left), Some(right)) = (column("twoColumnLeft"), column("twoColumnRight")) else {
            continue;
        };

        let left_text = left.full_text().trim().to_string();
        let mut right_parts = Vec::new();
        render_toc_column(right, &mut right_parts, &mut footnotes);
        let right_text = right_parts.join(" ");

        if !left_text.is_empty() && !right_text.is_empty() {
            lines.push(format!("{left_text} {right_text}"));
        }
    }

    let mut parts = vec!["Table of Contents:".to_string()];
    parts.extend(header);
    parts.extend(lines);
    let toc_text = parts.join("\n");

    if footnotes.is_empty() {
        toc_text
    } else {
        format!("{toc_text}\n\nFootnotes:\n{}", footnotes.join("\n"))
    }
}

fn render_toc_column(node: &Node, parts: &mut Vec<String>, footnotes: &mut Vec<String>) {
    push_trimmed(parts, &node.text);
    for child in &node.children {
        let is_footnote_ref =
            child.kind == "ref" && child.attr("class").is_some_and(|c| c.contains("footnoteRef"));
        if is_footnote_ref {
            let marker = child.text.trim();
            if !marker.is_empty() {
                parts.push(format!("[{marker}]"));
            }
        } else if child.kind == "note" && child.attr("type") == Some("footnote") {
            let text = child.full_text().trim().to_string();
            if !text.is_empty() {
                footnotes.push(text);
            }
        } else {
            render_toc_column(child, parts, footnotes);
        }
        push_trimmed(parts, &child.tail);
    }
}

/// Space-joined text of a content element, leaving out source credits,
/// document metadata and nested structural units.
pub fn content_text(node: &Node) -> String {
    let mut parts = Vec::new();
    push_content_text(node, &mut parts);
    parts.join(" ")
}

fn push_content_text(node: &Node, parts: &mut Vec<String>) {
    push_trimmed(parts, &node.text);
    for child in &node.children {
        let skipped = matches!(child.kind.as_str(), "sourceCredit" | "meta")
            || is_structural(&child.kind);
        if !skipped {
            push_content_text(child, parts);
        }
        push_trimmed(parts, &child.tail);
    }
}

fn push_trimmed(parts: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        parts.push(trimmed.to_string());
    }
}

/// Digest over the unit's complete rendered text, nested units included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedText {
    pub content_hash: String,
    pub content_length: usize,
    pub tag_order: String,
}

impl RenderedText {
    pub fn of(node: &Node) -> Self {
        let text = node
            .children
            .iter()
            .map(Node::full_text)
            .collect::<Vec<_>>()
            .join("\n\n");
        let tag_order = node
            .children
            .iter()
            .map(|c| c.kind.as_str())
            .collect::<Vec<_>>()
            .join(" -> ");

        Self {
            content_hash: content_hash(&text),
            content_length: text.chars().count(),
            tag_order,
        }
    }
}

pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
