mod common;

use common::{href, load_fixture, paragraph, three_level_tree, unit};
use pretty_assertions::assert_eq;
use usc_records::config::ProcessOptions;
use usc_records::content::{content_hash, render_toc};
use usc_records::document::{process_document, process_xml, DocumentContext};
use usc_records::meta::DocumentMeta;
use usc_records::record::{child_pointers, ElementContent, Provenance, Record, RecordBuilder, SearchProjection};
use usc_records::references::ReferenceKind;
use usc_records::tree::Node;
use usc_records::walker::walk;

fn records_of(root: &Node) -> Vec<Record> {
    process_document(root, &ProcessOptions::default(), &DocumentContext::named("test")).records
}

fn fixture_records() -> Vec<Record> {
    process_xml(
        &load_fixture("usc05_excerpt.xml"),
        &ProcessOptions::default(),
        &DocumentContext::named("usc05"),
    )
    .unwrap()
    .records
}

fn find<'a>(records: &'a [Record], identifier: &str) -> &'a Record {
    records
        .iter()
        .find(|r| r.identifier() == Some(identifier))
        .unwrap_or_else(|| panic!("no record for {identifier}"))
}

#[test]
fn three_level_tree_yields_one_record_per_unit() {
    let records = records_of(&three_level_tree());
    let kinds: Vec<&str> = records.iter().map(|r| r.declared.kind.as_str()).collect();
    assert_eq!(kinds, vec!["title", "chapter", "section"]);

    let section = &records[2];
    let path: Vec<&str> = section.ancestor_path.iter().map(|a| a.kind.as_str()).collect();
    assert_eq!(path, vec!["title", "chapter"]);
    assert!(section
        .references
        .local
        .contains(ReferenceKind::UscReference, "5 U.S.C. § 1201"));

    let chapter = &records[1];
    assert_eq!(chapter.child_pointers.len(), 1);
    assert_eq!(chapter.child_pointers[0].kind, "section");
    assert_eq!(chapter.child_pointers[0].identifier, "/us/usc/t5/s1202");
    assert!(chapter.declared.elements.iter().all(|e| e.tag != "section"));
    assert!(!chapter.computed.text_local.contains("As provided in"));
    assert!(chapter.references.local.is_empty());
    assert!(chapter
        .references
        .descendant
        .contains(ReferenceKind::UscReference, "5 U.S.C. § 1201"));
}

#[test]
fn declared_attributes_never_collide_with_computed_fields() {
    let section = unit("section", "/us/usc/t5/s1", "§ 1.", "Test")
        .with_attr("content_hash", "declared")
        .with_attr("ancestors", "declared");
    let records = records_of(&section);
    let value = serde_json::to_value(&records[0]).unwrap();

    assert_eq!(value["declared"]["attributes"]["content_hash"], "declared");
    assert_eq!(value["declared"]["attributes"]["ancestors"], "declared");
    assert_eq!(value["computed"]["content_hash"], content_hash("§ 1.\n\nTest"));
    assert_eq!(value["computed"]["ancestors"], "");
}

#[test]
fn search_projection_round_trips_for_every_record() {
    let mut records = fixture_records();
    records.extend(records_of(&three_level_tree()));
    assert!(!records.is_empty());

    for record in &records {
        assert!(record.projection_is_consistent(), "{:?}", record.identifier());
        let json = serde_json::to_string(record).unwrap();
        let restored: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(SearchProjection::derive(&restored), restored.search);
    }
}

#[test]
fn tampered_projection_is_detected() {
    let mut record = records_of(&three_level_tree()).remove(0);
    record.search.heading = "Something else".to_string();
    assert!(!record.projection_is_consistent());
}

#[test]
fn projection_fields_come_from_declared_and_computed_content() {
    let records = fixture_records();
    let section = find(&records, "/us/usc/t5/s1202");
    let search = &section.search;

    assert_eq!(search.guid, "id1202");
    assert_eq!(search.element_type, "section");
    assert_eq!(search.num, "§ 1202.");
    assert_eq!(search.num_numeric, "1202");
    assert_eq!(search.status, "amended");
    assert_eq!(search.is_positive_law.as_deref(), Some("yes"));
    assert_eq!(search.references, section.references.local);
    assert_eq!(search.text_local, section.computed.text_local);
    assert_eq!(search.text_local_length, section.computed.text_local.chars().count());

    let chapter = find(&records, "/us/usc/t5/ch12");
    assert_eq!(chapter.search.status, "none");
    assert_eq!(
        chapter.search.child_identifiers,
        vec!["/us/usc/t5/s1201", "/us/usc/t5/s1202"]
    );
}

#[cfg(not(feature = "subunits"))]
#[test]
fn fixture_records_carry_document_meta() {
    let records = fixture_records();
    assert_eq!(records.len(), 4);

    let meta = &records[0].meta;
    assert_eq!(meta.get("dc:title"), Some("Title 5"));
    assert_eq!(meta.get("docNumber"), Some("5"));
    assert_eq!(meta.get("dcterms:created"), Some("2024-08-23T09:30:12"));
    assert_eq!(meta.is_positive_law(), Some("yes"));
    assert!(records.iter().all(|r| &r.meta == meta));
}

#[cfg(not(feature = "subunits"))]
#[test]
fn section_collects_source_credit_notes_and_amendments() {
    let records = fixture_records();
    let section = find(&records, "/us/usc/t5/s1202");
    let computed = &section.computed;

    assert!(computed
        .source_credit
        .starts_with("(Added /us/pl/95/454, Pub. L. 95–454, title II"));
    assert!(computed.text_local.contains("Source Credit: (Added /us/pl/95/454"));
    assert!(computed.text_local.contains("The term of office of each member"));

    let amendments = &computed.notes["amendments"];
    assert_eq!(amendments.len(), 1);
    assert_eq!(amendments[0].role, "none");
    assert!(amendments[0]
        .content
        .starts_with("Amendments 2022—Subsec. (d). Pub. L. 117–286 substituted"));
    assert_eq!(computed.notes["effectiveDateOfAmendment"][0].role, "noteHeading");
    assert!(computed.text_local.contains("editorialNotes:\nEditorial Notes"));

    let history = computed.amendment_history.as_ref().unwrap();
    let summary: Vec<(&str, Option<&str>, Option<&str>)> = history
        .iter()
        .map(|e| (e.year.as_str(), e.public_law.as_deref(), e.date.as_deref()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("2022", Some("Pub. L. 117-286"), Some("2022-12-27")),
            ("1989", Some("Pub. L. 101-12"), Some("1989-04-10")),
        ]
    );

    let local = &section.references.local;
    assert!(local.contains(ReferenceKind::UscReference, "5 U.S.C. Ch. 75"));
    assert!(local.contains(ReferenceKind::ExecutiveOrder, "Ex. Ord. No. 12107"));
    assert_eq!(
        local.federal_register.iter().collect::<Vec<_>>(),
        vec!["44 F.R. 1055"]
    );
    assert!(local.contains(ReferenceKind::StatuteLink, "136 Stat. 4307"));
}

#[test]
fn only_sections_carry_amendment_history() {
    let records = fixture_records();
    for record in &records {
        let expected = record.declared.kind == "section";
        assert_eq!(record.computed.amendment_history.is_some(), expected);
    }
    let value = serde_json::to_value(find(&records, "/us/usc/t5/ch12")).unwrap();
    assert!(value["computed"].get("amendment_history").is_none());
}

#[test]
fn chapter_text_local_renders_its_table_of_contents() {
    let records = fixture_records();
    let chapter = find(&records, "/us/usc/t5/ch12");
    let text = &chapter.computed.text_local;

    assert!(text.starts_with("CHAPTER 12—\n\nMERIT SYSTEMS PROTECTION BOARD"));
    assert!(text.contains("Table of Contents:\n1201. Appointment of members"));
    assert!(text.contains("1202. Term of office; filling vacancies; removal. [1]"));
    assert!(text.contains("Footnotes:\nSo in original."));
    assert!(!text.contains("The Merit Systems Protection Board is composed"));
    assert_eq!(chapter.computed.text_local_length, text.chars().count());
}

#[test]
fn toc_header_row_is_kept() {
    let toc = Node::element("toc")
        .with_child(
            Node::element("header")
                .with_attr("role", "tocColumnHeader")
                .with_text("Sec."),
        )
        .with_child(
            Node::element("tocItem")
                .with_child(Node::element("column").with_attr("class", "twoColumnLeft").with_text("1."))
                .with_child(Node::element("column").with_attr("class", "twoColumnRight").with_text("Short title.")),
        )
        .with_child(Node::element("tocItem").with_child(
            Node::element("column").with_attr("class", "twoColumnLeft").with_text("2."),
        ));

    assert_eq!(render_toc(&toc), "Table of Contents:\nSec.\n1. Short title.");
}

#[test]
fn child_pointers_see_through_content_wrappers() {
    let chapter = Node::element("chapter")
        .with_child(
            Node::element("content")
                .with_child(unit("section", "/us/usc/t5/s1", "§ 1.", "One"))
                .with_child(
                    unit("section", "/us/usc/t5/s2", "§ 2.", "Two")
                        .with_child(unit("section", "/us/usc/t5/s2a", "§ 2a.", "Nested")),
                ),
        )
        .with_child(Node::element("section"));

    let pointers = child_pointers(&chapter);
    let ids: Vec<&str> = pointers.iter().map(|p| p.identifier.as_str()).collect();
    assert_eq!(ids, vec!["/us/usc/t5/s1", "/us/usc/t5/s2", ""]);
    assert_eq!(pointers[1].heading.as_deref(), Some("Two"));
    assert_eq!(pointers[2].num, None);
}

#[test]
fn element_content_keeps_document_order_and_paragraph_text() {
    let p = paragraph("See ")
        .with_child(href("/us/usc/t5/s1", "section 1").with_tail(" and "))
        .with_child(href("/us/usc/t5/s2", "section 2"));
    let captured = ElementContent::capture(&p).unwrap();

    assert_eq!(captured.text, "See");
    let tags: Vec<&str> = captured.children.iter().map(|c| c.tag.as_str()).collect();
    assert_eq!(tags, vec!["ref", "ref"]);
    assert_eq!(
        captured.paragraph_text.as_deref(),
        Some("See section 1 and section 2")
    );

    assert!(ElementContent::capture(&Node::element("section")).is_none());
    assert!(ElementContent::capture(&Node::element("br")).is_none());
    let tail_only = ElementContent::capture(&Node::element("br").with_tail(" after ")).unwrap();
    assert_eq!(tail_only.tail.as_deref(), Some("after"));
}

#[test]
fn provenance_is_attached_only_when_supplied() {
    let root = three_level_tree();
    let meta = DocumentMeta::default();
    let options = ProcessOptions::default();
    let provenance = Provenance {
        file_source: Some("usc05.xml".to_string()),
        processed_at: Some("2024-01-01T00:00:00Z".to_string()),
        machine: Some("builder".to_string()),
    };
    let mut diagnostics = Vec::new();

    let stamped = RecordBuilder::new(&meta, Some(&provenance), &options)
        .build_for(&root, &[], &mut diagnostics)
        .unwrap();
    assert_eq!(stamped.computed.provenance.as_ref(), Some(&provenance));

    let plain = RecordBuilder::new(&meta, None, &options)
        .build_for(&root, &[], &mut diagnostics)
        .unwrap();
    assert_eq!(plain.computed.provenance, None);
    assert_eq!(stamped.search, plain.search);
}

#[test]
fn content_hash_covers_nested_units_but_tag_order_lists_direct_children() {
    let root = three_level_tree();
    let entries = walk(&root);
    let title = &records_of(&root)[0];

    assert_eq!(title.computed.tag_order, "num -> heading -> chapter");
    assert_eq!(title.computed.content_hash.len(), 64);
    assert_eq!(
        title.computed.content_length,
        entries[0]
            .node
            .children
            .iter()
            .map(Node::full_text)
            .collect::<Vec<_>>()
            .join("\n\n")
            .chars()
            .count()
    );
}
