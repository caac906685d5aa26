// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
#![allow(clippy::significant_drop_tightening)]

//! Email Unpacker
//!
//! Decomposes a MIME email message into its plain-text body, HTML body,
//! embedded images and attachments, writing each to a collision-free name
//! in an output directory, together with the message headers and per-image
//! metadata.
//!
//! # Features
//!
//! - Typed part tree decoupled from the underlying MIME parser
//! - Ordered, documented classification rules
//! - Deterministic, thread-safe name collision resolution
//! - Per-part failure isolation: one bad part never aborts the run
//! - Raw, base64-wrapped and JSON-wrapped input
//! - Write-free summaries
//!
//! # Example
//!
//! ```rust
//! use email_unpack::{ExtractOptions, Extractor, MemorySink};
//!
//! let raw = b"From: sender@example.com\r\n\
//!             Subject: Hello\r\n\
//!             Content-Type: multipart/mixed; boundary=\"B\"\r\n\
//!             \r\n\
//!             --B\r\n\
//!             Content-Type: text/plain\r\n\
//!             \r\n\
//!             Hello there\r\n\
//!             --B\r\n\
//!             Content-Type: application/pdf; name=\"report.pdf\"\r\n\
//!             \r\n\
//!             %PDF-\r\n\
//!             --B--\r\n";
//!
//! let extractor = Extractor::with_sink(MemorySink::new(), ExtractOptions::default());
//! let manifest = extractor.extract_raw(raw).unwrap();
//!
//! assert_eq!(manifest.text_body.as_deref().map(str::trim), Some("Hello there"));
//! assert_eq!(manifest.names(), ["report.pdf"]);
//! assert!(extractor.sink().get("headers.txt").is_some());
//! ```
//!
//! [`extract_from_raw`] and friends do the same into a directory.

mod classify;
mod envelope;
mod error;
mod extract;
mod naming;
mod options;
mod parser;
mod summary;
mod types;
mod writer;

pub use classify::classify;
pub use envelope::{LoadedInput, load_input, resolve_input, unwrap_json_envelope};
pub use error::{ExtractError, Result};
pub use extract::{Extractor, extract_auto, extract_from_base64, extract_from_raw};
pub use naming::{UsedNames, base_name, resolve, sidecar_name, split_extension};
pub use options::{BodyPolicy, ExtractOptions, InputMode};
pub use parser::parse_message;
pub use summary::*;
pub use types::*;
pub use writer::{ContentSink, ContentWriter, DirectorySink, MemorySink};
