//! Adapter from `mailparse` into the typed part tree

use crate::error::{ExtractError, Result};
use crate::types::Part;
use mailparse::{MailHeader, MailHeaderMap, ParsedMail};
use regex::Regex;
use tracing::debug;

/// Maximum depth of embedded `message/rfc822` messages that are unpacked
const MAX_DEPTH: usize = 10;

// RFC 5322 field-name: printable ASCII except ':'
static FIELD_NAME_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"^[!-9;-~]+$").unwrap());

/// Parse raw message bytes into a [`Part`] tree
///
/// Fails only when the input is not recognisable as a message at all.
/// Transfer-decoding problems inside individual parts are kept on the
/// part and reported later by the extractor.
pub fn parse_message(raw: &[u8]) -> Result<Part> {
    let raw = skip_envelope_line(raw);
    let parsed = mailparse::parse_mail(raw).map_err(|e| ExtractError::Parse(e.to_string()))?;

    if parsed.headers.is_empty() {
        return Err(ExtractError::Parse("message has no header block".into()));
    }

    if let Some(bad) = parsed
        .headers
        .iter()
        .map(MailHeader::get_key)
        .find(|key| !FIELD_NAME_REGEX.is_match(key))
    {
        return Err(ExtractError::Parse(format!("invalid header name: {bad:?}")));
    }

    let tree = convert(&parsed, 0);
    debug!(
        content_type = %tree.content_type,
        parts = tree.walk().count(),
        "Parsed message tree"
    );
    Ok(tree)
}

/// Drop a UTF-8 BOM and a leading mbox `From ` separator line
fn skip_envelope_line(data: &[u8]) -> &[u8] {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);

    if data.starts_with(b"From ")
        && let Some(pos) = data.iter().position(|&b| b == b'\n')
    {
        return &data[pos + 1..];
    }
    data
}

fn convert(parsed: &ParsedMail, depth: usize) -> Part {
    let content_type = parsed.ctype.mimetype.to_lowercase();
    let headers: Vec<(String, String)> = parsed
        .headers
        .iter()
        .map(|h| (h.get_key(), h.get_value()))
        .collect();

    let non_blank = |v: &&String| !v.trim().is_empty();
    let filename = parsed
        .get_content_disposition()
        .params
        .get("filename")
        .filter(non_blank)
        .or_else(|| parsed.ctype.params.get("name").filter(non_blank))
        .cloned();

    // Only an explicit parameter counts; `ctype.charset` falls back to us-ascii
    let charset = parsed
        .ctype
        .params
        .get("charset")
        .filter(non_blank)
        .cloned();

    let mut part = Part {
        is_container: content_type.starts_with("multipart/"),
        filename,
        content_disposition: parsed.headers.get_first_value("Content-Disposition"),
        content_id: parsed.headers.get_first_value("Content-ID"),
        charset,
        headers,
        content_type,
        ..Part::default()
    };

    if part.is_container {
        part.children = parsed
            .subparts
            .iter()
            .map(|sub| convert(sub, depth + 1))
            .collect();
        return part;
    }

    match parsed.get_body_raw() {
        Ok(body) => part.payload = body,
        Err(e) => part.transfer_error = Some(e.to_string()),
    }

    if part.content_type == "message/rfc822" && part.transfer_error.is_none() {
        if depth >= MAX_DEPTH {
            debug!(depth, "Embedded message too deeply nested, keeping as leaf");
        } else if let Some(inner) = embedded_message(&part.payload, depth) {
            part.is_container = true;
            part.payload = Vec::new();
            part.children = vec![inner];
        }
    }

    part
}

fn embedded_message(raw: &[u8], depth: usize) -> Option<Part> {
    match mailparse::parse_mail(raw) {
        Ok(inner) if !inner.headers.is_empty() => Some(convert(&inner, depth + 1)),
        Ok(_) => None,
        Err(e) => {
            debug!(error = %e, "Embedded message could not be parsed, keeping as leaf");
            None
        }
    }
}
