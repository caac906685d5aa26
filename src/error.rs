//! Error types for email extraction

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while extracting an email
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The message could not be parsed at all
    #[error("Failed to parse message structure: {0}")]
    Parse(String),

    /// Input was declared base64 but could not be decoded
    #[error("Failed to decode base64 envelope: {0}")]
    Envelope(String),

    /// A single part's payload or charset could not be decoded
    #[error("Failed to decode part {part_index}: {details}")]
    PartDecode { part_index: usize, details: String },

    /// A single output could not be persisted
    #[error("Failed to write '{name}': {source}")]
    Write {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The input file could not be read
    #[error("Failed to read input '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;
