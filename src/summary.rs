//! Write-free message summaries

use crate::classify::classify;
use crate::envelope::resolve_input;
use crate::error::Result;
use crate::options::ExtractOptions;
use crate::parser::parse_message;
use crate::types::{Part, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Overview of a message without writing anything
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Summary {
    pub headers: HeaderSnapshot,
    pub body: BodyInfo,
    pub attachments: AttachmentInventory,
}

/// The headers most callers look at first
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeaderSnapshot {
    pub from: Option<String>,
    pub to: Option<String>,
    pub subject: Option<String>,
    pub date: Option<String>,
    pub message_id: Option<String>,

    /// `date` parsed as RFC 2822, when it is well formed
    pub date_parsed: Option<DateTime<Utc>>,
}

impl HeaderSnapshot {
    #[must_use]
    pub fn from_part(root: &Part) -> Self {
        let get = |key: &str| root.header(key).map(str::to_string);
        let date = get("Date");
        let date_parsed = date
            .as_deref()
            .and_then(|d| DateTime::parse_from_rfc2822(d.trim()).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Self {
            from: get("From"),
            to: get("To"),
            subject: get("Subject"),
            message_id: get("Message-ID"),
            date,
            date_parsed,
        }
    }
}

/// Body presence and bounded previews
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BodyInfo {
    pub has_text: bool,
    pub has_html: bool,
    pub text_preview: Option<String>,
    pub html_preview: Option<String>,
}

/// Images and attachments found in the message
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachmentInventory {
    /// Images plus other attachments
    pub count: usize,
    pub images: usize,
    pub files: Vec<AttachmentInfo>,
}

/// One inventory entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachmentInfo {
    /// `Image` or `Attachment`
    pub kind: Role,
    pub content_type: String,
    pub filename: Option<String>,
    pub content_id: Option<String>,
}

impl Summary {
    /// Summarize an already parsed tree
    #[must_use]
    pub fn build(tree: &Part, options: &ExtractOptions) -> Self {
        let mut summary = Self {
            headers: HeaderSnapshot::from_part(tree),
            ..Self::default()
        };

        for (part_index, part) in tree.walk() {
            if part.is_container {
                continue;
            }

            match classify(part) {
                Role::TextBody => {
                    summary.body.has_text = true;
                    if let Ok(text) = part.decoded_text(part_index) {
                        let preview = preview(&text, options.preview_chars);
                        options
                            .body_policy
                            .apply(&mut summary.body.text_preview, preview);
                    }
                }
                Role::HtmlBody => {
                    summary.body.has_html = true;
                    if let Ok(html) = part.decoded_text(part_index) {
                        let preview = preview(&html, options.preview_chars);
                        options
                            .body_policy
                            .apply(&mut summary.body.html_preview, preview);
                    }
                }
                role @ (Role::Image | Role::Attachment) => {
                    if role == Role::Image {
                        summary.attachments.images += 1;
                    }
                    summary.attachments.count += 1;
                    summary.attachments.files.push(AttachmentInfo {
                        kind: role,
                        content_type: part.content_type.clone(),
                        filename: part.filename.clone(),
                        content_id: part.content_id.clone(),
                    });
                }
                Role::UnknownBinary | Role::Skip => {}
            }
        }

        summary
    }
}

/// Summarize raw, base64 or auto-detected input per `options.input_mode`
pub fn summarize(input: &[u8], options: &ExtractOptions) -> Result<Summary> {
    let raw = resolve_input(input, options.input_mode)?;
    let tree = parse_message(&raw)?;
    Ok(Summary::build(&tree, options))
}

fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.char_indices();
    match chars.nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
