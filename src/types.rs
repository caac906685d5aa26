//! Core types for decomposed emails

use crate::error::{ExtractError, Result};
use encoding_rs::{Encoding, UTF_8};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One node of a parsed message tree
///
/// Built once per run by the parser and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Part {
    /// Lowercased MIME type (e.g. `text/plain`)
    pub content_type: String,

    /// True for `multipart/*` nodes
    pub is_container: bool,

    /// Filename from Content-Disposition or the Content-Type `name` parameter
    pub filename: Option<String>,

    /// Raw Content-Disposition header value
    pub content_disposition: Option<String>,

    /// Raw Content-ID header value
    pub content_id: Option<String>,

    /// Explicit charset parameter, if any
    pub charset: Option<String>,

    /// Transfer-decoded payload (empty for containers)
    pub payload: Vec<u8>,

    /// Set when transfer decoding of the payload failed
    pub transfer_error: Option<String>,

    /// Headers of this node, in order, duplicates retained
    pub headers: Vec<(String, String)>,

    /// Child parts (empty for leaves)
    pub children: Vec<Self>,
}

impl Part {
    /// Create a leaf part with the given type and payload
    #[must_use]
    pub fn leaf(content_type: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type: content_type.into(),
            payload: payload.into(),
            ..Self::default()
        }
    }

    /// Create a container part with the given children
    #[must_use]
    pub fn container(content_type: impl Into<String>, children: Vec<Self>) -> Self {
        Self {
            content_type: content_type.into(),
            is_container: true,
            children,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    #[must_use]
    pub fn with_disposition(mut self, disposition: impl Into<String>) -> Self {
        self.content_disposition = Some(disposition.into());
        self
    }

    #[must_use]
    pub fn with_content_id(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = Some(content_id.into());
        self
    }

    #[must_use]
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// First value of a header, matched case-insensitively
    #[must_use]
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Subtype half of the content type, or `bin` when there is no `/`
    #[must_use]
    pub fn subtype(&self) -> &str {
        self.content_type
            .rsplit_once('/')
            .map_or("bin", |(_, sub)| sub)
    }

    /// Depth-first pre-order walk, containers included
    ///
    /// Yields `(part_index, part)` with a 1-based index; the root is 1.
    #[must_use]
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![self],
            index: 0,
        }
    }

    /// Decode the payload as text using the part charset (UTF-8 if absent)
    ///
    /// Invalid byte sequences are replaced; only an unknown charset label
    /// or a failed transfer decoding is an error.
    pub fn decoded_text(&self, part_index: usize) -> Result<String> {
        if let Some(ref err) = self.transfer_error {
            return Err(ExtractError::PartDecode {
                part_index,
                details: err.clone(),
            });
        }

        let encoding = match self.charset.as_deref() {
            Some(label) => Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
                ExtractError::PartDecode {
                    part_index,
                    details: format!("unknown charset '{label}'"),
                }
            })?,
            None => UTF_8,
        };

        let (text, had_errors) = encoding.decode_without_bom_handling(&self.payload);
        if had_errors {
            tracing::debug!(
                part_index,
                charset = encoding.name(),
                "Replaced malformed sequences while decoding text"
            );
        }
        Ok(text.into_owned())
    }
}

/// Iterator returned by [`Part::walk`]
#[derive(Debug)]
pub struct Walk<'a> {
    stack: Vec<&'a Part>,
    index: usize,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a Part);

    fn next(&mut self) -> Option<Self::Item> {
        let part = self.stack.pop()?;
        self.stack.extend(part.children.iter().rev());
        self.index += 1;
        Some((self.index, part))
    }
}

/// Classification of a leaf part
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    TextBody,
    HtmlBody,
    Image,
    Attachment,
    UnknownBinary,
    Skip,
}

impl Role {
    /// Whether parts of this role are persisted under a resolved name
    #[must_use]
    pub const fn is_named_output(self) -> bool {
        matches!(self, Self::Image | Self::Attachment | Self::UnknownBinary)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::TextBody => "text body",
            Self::HtmlBody => "html body",
            Self::Image => "image",
            Self::Attachment => "attachment",
            Self::UnknownBinary => "unknown binary",
            Self::Skip => "skip",
        };
        f.write_str(label)
    }
}

/// Sidecar metadata written next to every extracted image
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageMetadata {
    pub content_type: String,
    pub original_filename: Option<String>,
    pub content_id: Option<String>,
    pub content_disposition: Option<String>,
    pub size_bytes: usize,
    pub part_number: usize,
}

impl ImageMetadata {
    #[must_use]
    pub fn from_part(part: &Part, part_index: usize) -> Self {
        Self {
            content_type: part.content_type.clone(),
            original_filename: part.filename.clone(),
            content_id: part.content_id.clone(),
            content_disposition: part.content_disposition.clone(),
            size_bytes: part.payload.len(),
            part_number: part_index,
        }
    }

    /// Render as `key: value` lines, skipping absent fields
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("content_type: {}\n", self.content_type);
        let optional = [
            ("original_filename", &self.original_filename),
            ("content_id", &self.content_id),
            ("content_disposition", &self.content_disposition),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                out.push_str(&format!("{key}: {value}\n"));
            }
        }
        out.push_str(&format!("size_bytes: {}\n", self.size_bytes));
        out.push_str(&format!("part_number: {}\n", self.part_number));
        out
    }
}

/// A resolved name paired with the payload it will hold
///
/// Borrows the payload from the source [`Part`]. Images also carry the
/// [`ImageMetadata`] written to their `<stem>_metadata.txt` sidecar.
///
/// ```
/// use email_unpack::{ContentWriter, MemorySink, NamedOutput};
///
/// let writer = ContentWriter::new(MemorySink::new());
/// writer.write_output(&NamedOutput::new("notes.txt", b"hello")).unwrap();
///
/// assert_eq!(writer.sink().get("notes.txt").as_deref(), Some(&b"hello"[..]));
/// ```
#[derive(Debug, Clone)]
pub struct NamedOutput<'a> {
    /// Run-unique output name
    pub name: String,

    pub bytes: &'a [u8],

    /// Sidecar content, present for images only
    pub metadata: Option<ImageMetadata>,
}

impl<'a> NamedOutput<'a> {
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: &'a [u8]) -> Self {
        Self {
            name: name.into(),
            bytes,
            metadata: None,
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: ImageMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// One output written during a run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Resolved, run-unique output name
    pub name: String,

    /// Role the part was classified as
    pub role: Role,

    /// 1-based pre-order index of the source part
    pub part_index: usize,

    pub content_type: String,

    pub size_bytes: usize,

    /// Name of the metadata sidecar, for images
    pub metadata_name: Option<String>,
}

/// Kind of a recovered per-part failure
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Decode,
    Write,
}

/// A part that could not be extracted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartFailure {
    /// Source part index, `None` for run-level outputs such as `headers.txt`
    pub part_index: Option<usize>,
    pub content_type: Option<String>,
    pub kind: FailureKind,
    pub message: String,
}

/// Result of one extraction run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionManifest {
    /// Selected plain-text body
    pub text_body: Option<String>,

    /// Selected HTML body
    pub html_body: Option<String>,

    /// Top-level headers in order, duplicates retained
    pub headers: Vec<(String, String)>,

    /// Outputs actually written, in traversal order
    pub entries: Vec<ManifestEntry>,

    /// Parts that were downgraded to "not extracted"
    pub failures: Vec<PartFailure>,
}

impl ExtractionManifest {
    /// Names of all written part outputs, in order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// The `(text, html)` pair
    #[must_use]
    pub fn bodies(&self) -> (Option<&str>, Option<&str>) {
        (self.text_body.as_deref(), self.html_body.as_deref())
    }

    /// True when nothing at all was recovered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text_body.is_none()
            && self.html_body.is_none()
            && self.headers.is_empty()
            && self.entries.is_empty()
    }

    /// Entries of a given role
    pub fn by_role(&self, role: Role) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.iter().filter(move |e| e.role == role)
    }
}
