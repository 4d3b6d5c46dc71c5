use serde::{Deserialize, Serialize};

/// Element kinds that open a level of the legal hierarchy.
pub const STRUCTURAL_TAGS: &[&str] = &[
    "title",
    "subtitle",
    "part",
    "subpart",
    "division",
    "subdivision",
    "chapter",
    "subchapter",
    "article",
    "appendix",
    "section",
];

/// Finer levels below a section, structural only with the `subunits` feature.
pub const SUBUNIT_TAGS: &[&str] = &[
    "subsection",
    "paragraph",
    "subparagraph",
    "clause",
    "subclause",
    "item",
    "subitem",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeClass {
    Structural,
    Content,
}

pub fn is_structural(kind: &str) -> bool {
    STRUCTURAL_TAGS.contains(&kind) || (cfg!(feature = "subunits") && SUBUNIT_TAGS.contains(&kind))
}

pub fn classify(kind: &str) -> NodeClass {
    if is_structural(kind) {
        NodeClass::Structural
    } else {
        NodeClass::Content
    }
}

/// The leaf unit that carries source credits and amendment notes.
pub fn is_amendment_unit(kind: &str) -> bool {
    kind == "section"
}
