//! Extraction engine: walks the part tree and persists every leaf

use crate::classify::classify;
use crate::envelope::resolve_input;
use crate::error::{ExtractError, Result};
use crate::naming::{UsedNames, resolve};
use crate::options::{ExtractOptions, InputMode};
use crate::parser::parse_message;
use crate::types::{
    ExtractionManifest, FailureKind, ImageMetadata, ManifestEntry, NamedOutput, Part, PartFailure,
    Role,
};
use crate::writer::{
    ContentSink, ContentWriter, DirectorySink, FIXED_OUTPUTS, HTML_BODY_FILE, TEXT_BODY_FILE,
};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Drives classification, naming and writing for one output destination
///
/// Each call to [`Extractor::extract`] is an independent run with its own
/// set of used names.
#[derive(Debug)]
pub struct Extractor<S = DirectorySink> {
    writer: ContentWriter<S>,
    options: ExtractOptions,
}

impl Extractor<DirectorySink> {
    /// Extract into a directory with default options
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::with_sink(DirectorySink::new(output_dir), ExtractOptions::default())
    }
}

impl<S: ContentSink> Extractor<S> {
    pub const fn with_sink(sink: S, options: ExtractOptions) -> Self {
        Self {
            writer: ContentWriter::new(sink),
            options,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    pub const fn options(&self) -> &ExtractOptions {
        &self.options
    }

    pub const fn sink(&self) -> &S {
        self.writer.sink()
    }

    /// Extract from input interpreted per the configured [`InputMode`]
    pub fn extract_input(&self, input: &[u8]) -> Result<ExtractionManifest> {
        self.extract_with_mode(input, self.options.input_mode)
    }

    /// Extract from an RFC 5322 message
    pub fn extract_raw(&self, raw: &[u8]) -> Result<ExtractionManifest> {
        self.extract_with_mode(raw, InputMode::Raw)
    }

    /// Extract from a base64-encoded RFC 5322 message
    pub fn extract_base64(&self, encoded: &[u8]) -> Result<ExtractionManifest> {
        self.extract_with_mode(encoded, InputMode::Base64)
    }

    /// Extract, detecting a base64 envelope automatically
    pub fn extract_auto(&self, input: &[u8]) -> Result<ExtractionManifest> {
        self.extract_with_mode(input, InputMode::Auto)
    }

    fn extract_with_mode(&self, input: &[u8], mode: InputMode) -> Result<ExtractionManifest> {
        let raw = resolve_input(input, mode)?;
        let tree = parse_message(&raw).inspect_err(|e| warn!(error = %e, "Message not parsed"))?;
        Ok(self.extract(&tree))
    }

    /// Extract every leaf of an already parsed tree
    ///
    /// Never fails as a whole: decode and write problems are recorded in
    /// [`ExtractionManifest::failures`] and the walk continues.
    pub fn extract(&self, tree: &Part) -> ExtractionManifest {
        let mut manifest = ExtractionManifest::default();
        let used = UsedNames::with_reserved(FIXED_OUTPUTS);

        if let Err(e) = self.writer.prepare() {
            warn!(error = %e, "Output destination could not be prepared");
        }

        for (part_index, part) in tree.walk() {
            if part.is_container {
                debug!(part_index, content_type = %part.content_type, "Skipping container");
                continue;
            }

            if let Some(ref details) = part.transfer_error {
                let err = ExtractError::PartDecode {
                    part_index,
                    details: details.clone(),
                };
                record_failure(&mut manifest, part, part_index, FailureKind::Decode, &err);
                continue;
            }

            let role = classify(part);
            debug!(
                part_index,
                content_type = %part.content_type,
                filename = ?part.filename,
                %role,
                size = part.payload.len(),
                "Classified part"
            );

            match role {
                Role::TextBody | Role::HtmlBody => {
                    self.take_body(part, part_index, role, &mut manifest);
                }
                Role::Image | Role::Attachment | Role::UnknownBinary => {
                    self.extract_leaf(part, part_index, role, &used, &mut manifest);
                }
                Role::Skip => {}
            }
        }

        manifest.headers.clone_from(&tree.headers);
        self.write_run_outputs(&mut manifest);

        info!(
            written = manifest.entries.len(),
            failures = manifest.failures.len(),
            has_text = manifest.text_body.is_some(),
            has_html = manifest.html_body.is_some(),
            "Extraction complete"
        );
        manifest
    }

    fn take_body(
        &self,
        part: &Part,
        part_index: usize,
        role: Role,
        manifest: &mut ExtractionManifest,
    ) {
        let text = match part.decoded_text(part_index) {
            Ok(text) => text,
            Err(e) => {
                record_failure(manifest, part, part_index, FailureKind::Decode, &e);
                return;
            }
        };

        let slot = if role == Role::TextBody {
            &mut manifest.text_body
        } else {
            &mut manifest.html_body
        };
        self.options.body_policy.apply(slot, text);
    }

    fn extract_leaf(
        &self,
        part: &Part,
        part_index: usize,
        role: Role,
        used: &UsedNames,
        manifest: &mut ExtractionManifest,
    ) {
        if part.payload.is_empty() {
            debug!(part_index, %role, "Skipping empty payload");
            return;
        }

        let Some(name) = resolve(part, role, part_index, used) else {
            return;
        };

        let mut output = NamedOutput::new(name, &part.payload);
        if role == Role::Image {
            output = output.with_metadata(ImageMetadata::from_part(part, part_index));
        }

        if let Err(e) = self.writer.write_output(&output) {
            record_failure(manifest, part, part_index, FailureKind::Write, &e);
            return;
        }
        debug!(part_index, name = %output.name, size = output.bytes.len(), "Wrote part");

        // Payload is written: a sidecar failure is recorded but the entry stays
        let metadata_name = match self.writer.write_metadata(&output) {
            Ok(name) => name,
            Err(e) => {
                record_failure(manifest, part, part_index, FailureKind::Write, &e);
                None
            }
        };

        manifest.entries.push(ManifestEntry {
            name: output.name,
            role,
            part_index,
            content_type: part.content_type.clone(),
            size_bytes: part.payload.len(),
            metadata_name,
        });
    }

    fn write_run_outputs(&self, manifest: &mut ExtractionManifest) {
        let mut results = vec![self.writer.write_headers(&manifest.headers)];
        if let Some(ref text) = manifest.text_body {
            results.push(self.writer.write_body(TEXT_BODY_FILE, text));
        }
        if let Some(ref html) = manifest.html_body {
            results.push(self.writer.write_body(HTML_BODY_FILE, html));
        }

        for err in results.into_iter().filter_map(std::result::Result::err) {
            warn!(error = %err, "Failed to write run output");
            manifest.failures.push(PartFailure {
                part_index: None,
                content_type: None,
                kind: FailureKind::Write,
                message: err.to_string(),
            });
        }
    }
}

fn record_failure(
    manifest: &mut ExtractionManifest,
    part: &Part,
    part_index: usize,
    kind: FailureKind,
    err: &ExtractError,
) {
    warn!(
        part_index,
        content_type = %part.content_type,
        ?kind,
        error = %err,
        "Part not extracted"
    );
    manifest.failures.push(PartFailure {
        part_index: Some(part_index),
        content_type: Some(part.content_type.clone()),
        kind,
        message: err.to_string(),
    });
}

/// Extract a raw message into `output_dir`
pub fn extract_from_raw(raw: &[u8], output_dir: impl Into<PathBuf>) -> Result<ExtractionManifest> {
    Extractor::new(output_dir).extract_raw(raw)
}

/// Extract a base64-encoded message into `output_dir`
pub fn extract_from_base64(
    encoded: &[u8],
    output_dir: impl Into<PathBuf>,
) -> Result<ExtractionManifest> {
    Extractor::new(output_dir).extract_base64(encoded)
}

/// Extract a raw or base64-encoded message into `output_dir`
pub fn extract_auto(input: &[u8], output_dir: impl Into<PathBuf>) -> Result<ExtractionManifest> {
    Extractor::new(output_dir).extract_auto(input)
}
