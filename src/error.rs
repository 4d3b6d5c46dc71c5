//! Error types for record extraction.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    /// The XML reader rejected the document.
    #[error("XML parsing failed at byte {position}: {message}")]
    XmlParse { position: u64, message: String },

    #[error("Document has no root element")]
    EmptyDocument,

    #[error("Element <{0}> is never closed")]
    UnclosedElement(String),

    /// An element the schema requires a discriminator on came without it.
    #[error("<{element}> in {context} is missing required attribute '{attribute}'")]
    MissingAttribute {
        element: String,
        attribute: String,
        context: String,
    },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RecordError>;
