//! Leaf part classification
//!
//! Rules are evaluated top to bottom and the first match wins. Order
//! matters: a part can satisfy several heuristics at once, e.g. a PDF
//! with a Content-ID is an [`Role::Image`] because the image rule comes
//! before the attachment rule.

use crate::types::{Part, Role};

/// Payloads above this size are kept even when nothing else identifies them
pub const UNKNOWN_PAYLOAD_THRESHOLD: usize = 100;

const IMAGE_EXTENSIONS: [&str; 7] = [".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".webp"];

struct Rule {
    role: Role,
    matches: fn(&Part) -> bool,
}

const RULES: &[Rule] = &[
    Rule {
        role: Role::TextBody,
        matches: |p| p.content_type == "text/plain",
    },
    Rule {
        role: Role::HtmlBody,
        matches: |p| p.content_type == "text/html",
    },
    Rule {
        role: Role::Image,
        matches: looks_like_image,
    },
    Rule {
        role: Role::Attachment,
        matches: |p| p.filename.is_some() || is_attachment_disposition(p),
    },
    Rule {
        role: Role::UnknownBinary,
        matches: |p| p.payload.len() > UNKNOWN_PAYLOAD_THRESHOLD,
    },
];

/// Decide the [`Role`] of a part
///
/// Pure function of the part's own fields. Containers are never extracted
/// and always yield [`Role::Skip`].
#[must_use]
pub fn classify(part: &Part) -> Role {
    if part.is_container {
        return Role::Skip;
    }

    RULES
        .iter()
        .find(|rule| (rule.matches)(part))
        .map_or(Role::Skip, |rule| rule.role)
}

fn looks_like_image(part: &Part) -> bool {
    part.content_type.starts_with("image/")
        || part.filename.as_deref().is_some_and(has_image_extension)
        || is_attachment_disposition(part)
        || part.content_id.is_some()
}

fn has_image_extension(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

fn is_attachment_disposition(part: &Part) -> bool {
    part.content_disposition
        .as_deref()
        .is_some_and(|d| d.to_lowercase().contains("attachment"))
}
