#![allow(dead_code)]
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use usc_records::record::Record;
use usc_records::runtime::RecordSink;
use usc_records::tree::Node;

pub fn fixtures_dir() -> String {
    format!("{}/tests/fixtures", env!("CARGO_MANIFEST_DIR"))
}

pub fn load_fixture(filename: &str) -> String {
    let path = Path::new(&fixtures_dir()).join(filename);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

/// Structural or content element carrying `num` and `heading` children.
pub fn unit(kind: &str, identifier: &str, num: &str, heading: &str) -> Node {
    Node::element(kind)
        .with_attr("identifier", identifier)
        .with_child(Node::element("num").with_text(num))
        .with_child(Node::element("heading").with_text(heading))
}

pub fn href(target: &str, text: &str) -> Node {
    Node::element("ref").with_attr("href", target).with_text(text)
}

pub fn paragraph(text: &str) -> Node {
    Node::element("p").with_text(text)
}

/// title 5 → chapter 12 → section 1202, where the section links to § 1201.
pub fn three_level_tree() -> Node {
    let section = unit("section", "/us/usc/t5/s1202", "§ 1202.", "Term of office").with_child(
        Node::element("content").with_child(
            Node::element("p")
                .with_text("As provided in ")
                .with_child(href("/us/usc/t5/s1201", "section 1201").with_tail(" of this title.")),
        ),
    );
    let chapter = unit("chapter", "/us/usc/t5/ch12", "CHAPTER 12—", "MERIT SYSTEMS")
        .with_child(section);
    unit("title", "/us/usc/t5", "Title 5—", "GOVERNMENT ORGANIZATION").with_child(chapter)
}

#[derive(Clone, Default)]
pub struct MockRecordSink {
    pub records: Arc<Mutex<Vec<(String, Record)>>>,
    pub flushes: Arc<Mutex<usize>>,
    pub rejected_documents: Arc<Mutex<HashSet<String>>>,
}

impl MockRecordSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject_document(&self, name: &str) {
        self.rejected_documents
            .lock()
            .unwrap()
            .insert(name.to_string());
    }

    pub fn records_for(&self, document: &str) -> Vec<Record> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == document)
            .map(|(_, record)| record.clone())
            .collect()
    }

    pub fn flush_count(&self) -> usize {
        *self.flushes.lock().unwrap()
    }
}

#[async_trait]
impl RecordSink for MockRecordSink {
    async fn insert_record(&self, document: &str, record: Record) -> Result<(), String> {
        if self.rejected_documents.lock().unwrap().contains(document) {
            return Err(format!("storage rejected {document}"));
        }
        self.records
            .lock()
            .unwrap()
            .push((document.to_string(), record));
        Ok(())
    }

    async fn flush(&self) -> Result<(), String> {
        *self.flushes.lock().unwrap() += 1;
        Ok(())
    }
}
