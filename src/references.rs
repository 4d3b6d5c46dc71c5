//! Citation extraction and classification.
//!
//! Two channels feed every node's references: explicit `<ref href>` links,
//! classified by their USLM path, and citation-shaped spans in prose that
//! carry no link at all. Each channel fills a `local` bucket (the node's own
//! content) and a `descendant` bucket (content inside nested structural
//! units, which get records of their own).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::classify::is_structural;
use crate::text::{collapse_whitespace, local_text, spaced_text, structural_children};
use crate::tree::Node;

static USC_HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/us/usc/t(\d+[A-Za-z]*)/(s|ch)(\d+[A-Za-z0-9]*(?:-[A-Za-z0-9]+)*)").unwrap()
});
static USC_EXACT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+[A-Za-z]*) U\.S\.C\. (§|Ch\.) (\S+)$").unwrap());
static ACT_HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/us/act/([^/]+)/(.+)$").unwrap());
static ACT_EXACT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Act of ([^,]+), (.+)$").unwrap());
static PUBLIC_LAW_HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/us/pl/(\d+)/(\d+)").unwrap());
static STATUTE_HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/us/stat/(\d+[A-Za-z]*)/(\d+)").unwrap());

pub(crate) static PUBLIC_LAW_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Pub\. L\. (\d+)[-–](\d+)").unwrap());
pub(crate) static STATUTE_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s+Stat\.\s+(\d+)").unwrap());
static EXECUTIVE_ORDER_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:Ex\. Ord\. No\.|Executive Order) (\d+)").unwrap());
static FEDERAL_REGISTER_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+ F\.R\. \d+(?:,\s*\d+)*").unwrap());

static PUBLIC_LAW_EXACT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Pub\. L\. (\d+)[-–](\d+)$").unwrap());
static STATUTE_EXACT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+[A-Za-z]*)\s+Stat\.\s+(\d+)$").unwrap());
static EXECUTIVE_ORDER_EXACT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:Ex\. Ord\. No\.|Executive Order)\s+(\d+)$").unwrap()
});
static FEDERAL_REGISTER_EXACT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+F\.R\.\s+(\d[\d,\s]*)$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// `/us/usc/t5/s1202` or `/us/usc/t5/ch12`
    UscReference,
    /// `/us/act/1947-07-30/ch388`
    ActReference,
    /// `/us/pl/117/286`
    PublicLawLink,
    /// `/us/stat/116/926`
    StatuteLink,
    PublicLawMention,
    StatuteMention,
    ExecutiveOrder,
    FederalRegister,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 8] = [
        ReferenceKind::UscReference,
        ReferenceKind::ActReference,
        ReferenceKind::PublicLawLink,
        ReferenceKind::StatuteLink,
        ReferenceKind::PublicLawMention,
        ReferenceKind::StatuteMention,
        ReferenceKind::ExecutiveOrder,
        ReferenceKind::FederalRegister,
    ];

    /// Field name of this kind's bucket in a serialized [`ReferenceSet`].
    pub fn bucket_name(self) -> &'static str {
        match self {
            ReferenceKind::UscReference => "usc_references",
            ReferenceKind::ActReference => "act_references",
            ReferenceKind::PublicLawLink => "public_law_hrefs",
            ReferenceKind::StatuteLink => "statute_hrefs",
            ReferenceKind::PublicLawMention => "public_laws_text",
            ReferenceKind::StatuteMention => "statutes_text",
            ReferenceKind::ExecutiveOrder => "executive_orders",
            ReferenceKind::FederalRegister => "federal_register",
        }
    }

    pub fn is_link(self) -> bool {
        matches!(
            self,
            ReferenceKind::UscReference
                | ReferenceKind::ActReference
                | ReferenceKind::PublicLawLink
                | ReferenceKind::StatuteLink
        )
    }

    /// Canonical citation for `raw`. Accepts both the source form (href or
    /// prose span) and the canonical form, so normalizing twice is a no-op.
    pub fn normalize(self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        match self {
            ReferenceKind::UscReference => normalize_usc(raw),
            ReferenceKind::ActReference => normalize_act(raw),
            ReferenceKind::PublicLawLink | ReferenceKind::PublicLawMention => {
                normalize_public_law(raw)
            }
            ReferenceKind::StatuteLink | ReferenceKind::StatuteMention => normalize_statute(raw),
            ReferenceKind::ExecutiveOrder => EXECUTIVE_ORDER_EXACT_RE
                .captures(raw)
                .map(|caps| format!("Ex. Ord. No. {}", &caps[1])),
            ReferenceKind::FederalRegister => normalize_federal_register(raw),
        }
    }
}

fn normalize_usc(raw: &str) -> Option<String> {
    if let Some(caps) = USC_HREF_RE.captures(raw) {
        let marker = if &caps[2] == "s" { "§" } else { "Ch." };
        return Some(format!("{} U.S.C. {} {}", &caps[1], marker, &caps[3]));
    }
    USC_EXACT_RE
        .captures(raw)
        .map(|caps| format!("{} U.S.C. {} {}", &caps[1], &caps[2], &caps[3]))
}

fn normalize_act(raw: &str) -> Option<String> {
    ACT_HREF_RE
        .captures(raw)
        .or_else(|| ACT_EXACT_RE.captures(raw))
        .map(|caps| format!("Act of {}, {}", &caps[1], &caps[2]))
}

pub(crate) fn normalize_public_law(raw: &str) -> Option<String> {
    PUBLIC_LAW_HREF_RE
        .captures(raw)
        .or_else(|| PUBLIC_LAW_EXACT_RE.captures(raw))
        .map(|caps| format!("Pub. L. {}-{}", &caps[1], &caps[2]))
}

pub(crate) fn normalize_statute(raw: &str) -> Option<String> {
    STATUTE_HREF_RE
        .captures(raw)
        .or_else(|| STATUTE_EXACT_RE.captures(raw))
        .map(|caps| format!("{} Stat. {}", &caps[1], &caps[2]))
}

fn normalize_federal_register(raw: &str) -> Option<String> {
    let caps = FEDERAL_REGISTER_EXACT_RE.captures(raw)?;
    let pages = collapse_whitespace(&caps[2]);
    let pages = pages.trim_end_matches([',', ' ']);
    Some(format!("{} F.R. {}", &caps[1], pages))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub kind: ReferenceKind,
    pub raw: String,
    pub normalized: String,
}

impl Reference {
    pub fn new(kind: ReferenceKind, raw: &str) -> Option<Self> {
        kind.normalize(raw).map(|normalized| Self {
            kind,
            raw: raw.to_string(),
            normalized,
        })
    }

    /// Classify a link target against the USLM path grammars.
    pub fn from_href(href: &str) -> Option<Self> {
        if USC_HREF_RE.is_match(href) {
            return Self::new(ReferenceKind::UscReference, href);
        }
        if ACT_HREF_RE.is_match(href) {
            return Self::new(ReferenceKind::ActReference, href);
        }
        if PUBLIC_LAW_HREF_RE.is_match(href) {
            return Self::new(ReferenceKind::PublicLawLink, href);
        }
        if STATUTE_HREF_RE.is_match(href) {
            return Self::new(ReferenceKind::StatuteLink, href);
        }
        None
    }
}

/// Citation-shaped spans in free text, whether or not they are linked.
pub fn scan_text(text: &str) -> Vec<Reference> {
    let patterns: [(ReferenceKind, &Regex); 4] = [
        (ReferenceKind::PublicLawMention, &PUBLIC_LAW_TEXT_RE),
        (ReferenceKind::StatuteMention, &STATUTE_TEXT_RE),
        (ReferenceKind::ExecutiveOrder, &EXECUTIVE_ORDER_TEXT_RE),
        (ReferenceKind::FederalRegister, &FEDERAL_REGISTER_TEXT_RE),
    ];

    let mut found = Vec::new();
    for (kind, re) in patterns {
        for m in re.find_iter(text) {
            let raw = match kind {
                ReferenceKind::FederalRegister => federal_register_span(text, m.start(), m.end()),
                _ => m.as_str(),
            };
            if let Some(reference) = Reference::new(kind, raw) {
                found.push(reference);
            }
        }
    }
    found
}

/// Drop trailing "pages" that are really the number of the next citation,
/// as in `44 F.R. 1055, 3 CFR, 1978 Comp.`.
fn federal_register_span(text: &str, start: usize, mut end: usize) -> &str {
    while let Some(comma) = text[start..end].rfind(',') {
        let next_is_word = text[end..]
            .trim_start()
            .starts_with(|c: char| c.is_alphabetic());
        if !next_is_word {
            break;
        }
        end = start + comma;
    }
    &text[start..end]
}

/// Normalized citations of one node, one set per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSet {
    pub usc_references: BTreeSet<String>,
    pub act_references: BTreeSet<String>,
    pub public_law_hrefs: BTreeSet<String>,
    pub statute_hrefs: BTreeSet<String>,
    pub public_laws_text: BTreeSet<String>,
    pub statutes_text: BTreeSet<String>,
    pub executive_orders: BTreeSet<String>,
    pub federal_register: BTreeSet<String>,
}

impl ReferenceSet {
    pub fn bucket(&self, kind: ReferenceKind) -> &BTreeSet<String> {
        match kind {
            ReferenceKind::UscReference => &self.usc_references,
            ReferenceKind::ActReference => &self.act_references,
            ReferenceKind::PublicLawLink => &self.public_law_hrefs,
            ReferenceKind::StatuteLink => &self.statute_hrefs,
            ReferenceKind::PublicLawMention => &self.public_laws_text,
            ReferenceKind::StatuteMention => &self.statutes_text,
            ReferenceKind::ExecutiveOrder => &self.executive_orders,
            ReferenceKind::FederalRegister => &self.federal_register,
        }
    }

    fn bucket_mut(&mut self, kind: ReferenceKind) -> &mut BTreeSet<String> {
        match kind {
            ReferenceKind::UscReference => &mut self.usc_references,
            ReferenceKind::ActReference => &mut self.act_references,
            ReferenceKind::PublicLawLink => &mut self.public_law_hrefs,
            ReferenceKind::StatuteLink => &mut self.statute_hrefs,
            ReferenceKind::PublicLawMention => &mut self.public_laws_text,
            ReferenceKind::StatuteMention => &mut self.statutes_text,
            ReferenceKind::ExecutiveOrder => &mut self.executive_orders,
            ReferenceKind::FederalRegister => &mut self.federal_register,
        }
    }

    /// Returns `false` when the normalized value was already present.
    pub fn insert(&mut self, reference: &Reference) -> bool {
        self.bucket_mut(reference.kind)
            .insert(reference.normalized.clone())
    }

    pub fn contains(&self, kind: ReferenceKind, normalized: &str) -> bool {
        self.bucket(kind).contains(normalized)
    }

    pub fn len(&self) -> usize {
        ReferenceKind::ALL.iter().map(|k| self.bucket(*k).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (ReferenceKind, &str)> + '_ {
        ReferenceKind::ALL
            .into_iter()
            .flat_map(move |kind| self.bucket(kind).iter().map(move |v| (kind, v.as_str())))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSets {
    /// Owned by the node's own prose.
    pub local: ReferenceSet,
    /// Found under nested structural units; rolled up here for indexing only.
    pub descendant: ReferenceSet,
}

/// Extract and attribute every citation under `node`.
pub fn extract(node: &Node) -> ReferenceSets {
    let mut sets = ReferenceSets::default();

    collect_links(node, false, &mut sets);

    for reference in scan_text(&local_text(node)) {
        sets.local.insert(&reference);
    }
    for unit in structural_children(node) {
        for reference in scan_text(&spaced_text(unit)) {
            sets.descendant.insert(&reference);
        }
    }

    sets
}

fn collect_links(node: &Node, nested: bool, sets: &mut ReferenceSets) {
    for child in &node.children {
        let child_nested = nested || is_structural(&child.kind);
        if child.kind == "ref" {
            if let Some(reference) = child.attr("href").and_then(Reference::from_href) {
                let target = if child_nested {
                    &mut sets.descendant
                } else {
                    &mut sets.local
                };
                target.insert(&reference);
            }
        }
        collect_links(child, child_nested, sets);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapSide {
    /// Cited in prose with no matching link.
    TextOnly,
    /// Linked but never spelled out in prose.
    LinkOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageGap {
    pub side: GapSide,
    pub kind: ReferenceKind,
    pub normalized: String,
}

/// Public laws and statutes present in one channel but not the other.
pub fn coverage_gaps(set: &ReferenceSet) -> Vec<CoverageGap> {
    let pairs = [
        (ReferenceKind::PublicLawMention, ReferenceKind::PublicLawLink),
        (ReferenceKind::StatuteMention, ReferenceKind::StatuteLink),
    ];

    let mut gaps = Vec::new();
    for (text_kind, link_kind) in pairs {
        let text = set.bucket(text_kind);
        let links = set.bucket(link_kind);
        gaps.extend(text.difference(links).map(|v| CoverageGap {
            side: GapSide::TextOnly,
            kind: text_kind,
            normalized: v.clone(),
        }));
        gaps.extend(links.difference(text).map(|v| CoverageGap {
            side: GapSide::LinkOnly,
            kind: link_kind,
            normalized: v.clone(),
        }));
    }
    gaps
}
