pub mod orchestrator;
pub mod types;

pub use orchestrator::process_batch;
pub use types::{BatchReport, DocumentReport, DocumentStatus, RecordSink, SourceDocument};
