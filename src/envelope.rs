//! Outer envelopes around the message: base64 and JSON wrappers

use crate::error::{ExtractError, Result};
use crate::options::InputMode;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::debug;

static BASE64_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"^[A-Za-z0-9+/]+={0,2}$").unwrap());

const HEADER_MARKERS: [&str; 3] = ["From:", "To:", "Subject:"];

/// Produce the raw message bytes for the given input mode
///
/// `Auto` treats the input as base64 only when it decodes cleanly and the
/// decoded text contains `From:`, `To:` or `Subject:`.
pub fn resolve_input(input: &[u8], mode: InputMode) -> Result<Cow<'_, [u8]>> {
    match mode {
        InputMode::Raw => Ok(Cow::Borrowed(input)),
        InputMode::Base64 => decode_base64(input).map(Cow::Owned),
        InputMode::Auto => match decode_base64(input) {
            Ok(decoded) if looks_like_message(&decoded) => {
                debug!(
                    encoded = input.len(),
                    decoded = decoded.len(),
                    "Detected base64 envelope"
                );
                Ok(Cow::Owned(decoded))
            }
            _ => Ok(Cow::Borrowed(input)),
        },
    }
}

fn decode_base64(input: &[u8]) -> Result<Vec<u8>> {
    let compact: String = String::from_utf8_lossy(input)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    if !BASE64_REGEX.is_match(&compact) {
        return Err(ExtractError::Envelope(
            "input contains characters outside the base64 alphabet".into(),
        ));
    }

    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ExtractError::Envelope(e.to_string()))
}

fn looks_like_message(decoded: &[u8]) -> bool {
    let text = String::from_utf8_lossy(decoded);
    HEADER_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Pull the message out of a JSON wrapper
///
/// Accepts `{"raw_email": "..."}` and `{"payload": {"raw_email": "..."}}`.
/// Returns `None` when the text is not such a wrapper.
#[must_use]
pub fn unwrap_json_envelope(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if !trimmed.starts_with('{') || !trimmed.contains("\"raw_email\"") {
        return None;
    }

    let value: serde_json::Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "JSON envelope did not parse, treating input as a message");
            return None;
        }
    };

    value
        .get("raw_email")
        .or_else(|| value.get("payload").and_then(|p| p.get("raw_email")))
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
}

/// Message content loaded from a file
#[derive(Debug, Clone)]
pub struct LoadedInput {
    pub path: PathBuf,
    pub content: Vec<u8>,
    /// Mode dictated by the wrapper, if any (JSON-wrapped mail is raw)
    pub forced_mode: Option<InputMode>,
}

impl LoadedInput {
    /// Forced mode if the wrapper dictated one, else `requested`
    #[must_use]
    pub fn mode(&self, requested: InputMode) -> InputMode {
        self.forced_mode.unwrap_or(requested)
    }
}

/// Read an input file, trimming it and unwrapping a JSON envelope
pub fn load_input(path: impl AsRef<Path>) -> Result<LoadedInput> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| ExtractError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let text = String::from_utf8_lossy(&bytes);
    if let Some(raw) = unwrap_json_envelope(&text) {
        debug!(path = %path.display(), "Detected JSON envelope with raw_email");
        return Ok(LoadedInput {
            path: path.to_path_buf(),
            content: raw.into_bytes(),
            forced_mode: Some(InputMode::Raw),
        });
    }

    Ok(LoadedInput {
        path: path.to_path_buf(),
        content: text.trim().as_bytes().to_vec(),
        forced_mode: None,
    })
}
