pub mod amendments;
pub mod classify;
pub mod config;
pub mod content;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod logging;
pub mod meta;
pub mod record;
pub mod references;
pub mod runtime;
pub mod text;
pub mod tree;
pub mod walker;

pub use config::{MissingAttributePolicy, ProcessOptions};
pub use diagnostics::Diagnostic;
pub use document::{process_document, process_xml, DocumentContext, DocumentOutput};
pub use error::{RecordError, Result};
pub use record::{Provenance, Record, SearchProjection};
pub use tree::{parse_document, Node};
