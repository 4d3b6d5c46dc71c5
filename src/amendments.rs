//! Amendment history of a section, assembled from its source credit and its
//! amendment notes.
//!
//! Dates live in the source credit (`Pub. L. 117–286, § 4(a)(1), Dec. 27,
//! 2022, 136 Stat. 4359`) while the per-year narrative lives in the notes.
//! The two are joined on the normalized public law citation; a law's date is
//! the first `<date>` that follows the law's link in the source credit. That
//! proximity rule is an approximation and can pick the wrong date when a
//! credit lists laws and dates out of step.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::references::{
    normalize_public_law, normalize_statute, Reference, ReferenceKind, PUBLIC_LAW_TEXT_RE,
    STATUTE_TEXT_RE,
};
use crate::text::find_within_unit;
use crate::tree::Node;

static AMENDMENT_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})—").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmendmentEvent {
    pub year: String,
    pub public_law: Option<String>,
    pub date: Option<String>,
    pub statute_citation: Option<String>,
    pub raw_text: String,
}

/// Amendment events in authored order. A node without notes yields nothing.
pub fn extract_amendments(node: &Node) -> Vec<AmendmentEvent> {
    let dates = find_within_unit(node, "sourceCredit")
        .map(source_credit_dates)
        .unwrap_or_default();

    let Some(notes) = find_within_unit(node, "notes") else {
        return Vec::new();
    };

    notes
        .descendants()
        .filter(|n| n.kind == "note" && n.attr("topic") == Some("amendments"))
        .flat_map(|note| note.descendants().filter(|n| n.kind == "p"))
        .filter_map(|p| parse_amendment_paragraph(&p.full_text(), &dates))
        .collect()
}

#[derive(Default)]
struct SourceCreditScan {
    text: String,
    laws: Vec<(String, usize)>,
    dates: Vec<(usize, String)>,
}

impl SourceCreditScan {
    fn mark(&mut self, element: &Node) {
        let offset = self.text.len();
        match element.kind.as_str() {
            "ref" => {
                if let Some(reference) = element.attr("href").and_then(Reference::from_href) {
                    if reference.kind == ReferenceKind::PublicLawLink {
                        self.laws.push((reference.normalized, offset));
                    }
                }
            }
            "date" => {
                let value = element
                    .attr("date")
                    .map(str::to_string)
                    .or_else(|| {
                        let text = element.full_text().trim().to_string();
                        (!text.is_empty()).then_some(text)
                    });
                if let Some(value) = value {
                    self.dates.push((offset, value));
                }
            }
            _ => {}
        }
    }

    fn walk(&mut self, node: &Node) {
        self.text.push_str(&node.text);
        for child in &node.children {
            self.mark(child);
            self.walk(child);
            self.text.push_str(&child.tail);
        }
    }
}

/// Map each public law linked in a source credit to the date that follows it.
pub fn source_credit_dates(source_credit: &Node) -> HashMap<String, String> {
    let mut scan = SourceCreditScan::default();
    scan.walk(source_credit);

    let mut dates = HashMap::new();
    for (law, law_offset) in &scan.laws {
        if dates.contains_key(law) {
            continue;
        }
        if let Some((_, date)) = scan.dates.iter().find(|(offset, _)| offset > law_offset) {
            dates.insert(law.clone(), date.clone());
        }
    }
    dates
}

/// One event per paragraph opening with `YYYY—`.
pub fn parse_amendment_paragraph(
    text: &str,
    dates: &HashMap<String, String>,
) -> Option<AmendmentEvent> {
    let text = text.trim();
    let caps = AMENDMENT_YEAR_RE.captures(text)?;

    let public_law = PUBLIC_LAW_TEXT_RE
        .find(text)
        .and_then(|m| normalize_public_law(m.as_str()));
    let date = public_law.as_ref().and_then(|law| dates.get(law).cloned());
    let statute_citation = STATUTE_TEXT_RE
        .find(text)
        .and_then(|m| normalize_statute(m.as_str()));

    Some(AmendmentEvent {
        year: caps[1].to_string(),
        public_law,
        date,
        statute_citation,
        raw_text: text.to_string(),
    })
}
