//! Persistence of extracted outputs

use crate::error::{ExtractError, Result};
use crate::naming::sidecar_name;
use crate::types::NamedOutput;
use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, PoisonError};

pub const HEADERS_FILE: &str = "headers.txt";
pub const TEXT_BODY_FILE: &str = "body.txt";
pub const HTML_BODY_FILE: &str = "body.html";

/// Names written by every run, reserved before any part is named
pub const FIXED_OUTPUTS: [&str; 3] = [HEADERS_FILE, TEXT_BODY_FILE, HTML_BODY_FILE];

/// Destination for named outputs
///
/// Takes `&self` so one sink can be shared by concurrent writers.
pub trait ContentSink: Send + Sync {
    /// Called once before the first write of a run
    fn prepare(&self) -> io::Result<()> {
        Ok(())
    }

    /// Persist `bytes` under `name`, replacing any previous content
    fn write(&self, name: &str, bytes: &[u8]) -> io::Result<()>;
}

/// Writes every output as a file directly under one directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ContentSink for DirectorySink {
    fn prepare(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }

    fn write(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        let mut components = Path::new(name).components();
        let is_plain = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) && !name.contains(['/', '\\']);

        if !is_plain {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("refusing to write outside the output directory: {name:?}"),
            ));
        }

        std::fs::write(self.root.join(name), bytes)
    }
}

/// Keeps outputs in memory, keyed by name
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.lock().get(name).cloned()
    }

    /// Names written so far, sorted
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ContentSink for MemorySink {
    fn write(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        self.lock().insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}

/// Formats and persists outputs through a [`ContentSink`]
#[derive(Debug)]
pub struct ContentWriter<S> {
    sink: S,
}

impl<S: ContentSink> ContentWriter<S> {
    pub const fn new(sink: S) -> Self {
        Self { sink }
    }

    pub const fn sink(&self) -> &S {
        &self.sink
    }

    pub fn prepare(&self) -> Result<()> {
        self.sink.prepare().map_err(|source| ExtractError::Write {
            name: ".".into(),
            source,
        })
    }

    /// Write a part payload under its resolved name
    pub fn write_output(&self, output: &NamedOutput<'_>) -> Result<()> {
        self.write_raw(&output.name, output.bytes)
    }

    /// Write the metadata sidecar of an image output
    ///
    /// Returns the sidecar name, or `None` when the output carries no
    /// metadata.
    pub fn write_metadata(&self, output: &NamedOutput<'_>) -> Result<Option<String>> {
        let Some(ref metadata) = output.metadata else {
            return Ok(None);
        };
        let name = sidecar_name(&output.name);
        self.write_raw(&name, metadata.render().as_bytes())?;
        Ok(Some(name))
    }

    /// Write `headers.txt`
    pub fn write_headers(&self, headers: &[(String, String)]) -> Result<()> {
        let mut out = String::from("Email Headers:\n");
        out.push_str(&"=".repeat(50));
        out.push('\n');
        for (key, value) in headers {
            out.push_str(key);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
        self.write_raw(HEADERS_FILE, out.as_bytes())
    }

    /// Write a decoded body as UTF-8
    pub fn write_body(&self, name: &str, body: &str) -> Result<()> {
        self.write_raw(name, body.as_bytes())
    }

    fn write_raw(&self, name: &str, bytes: &[u8]) -> Result<()> {
        self.sink
            .write(name, bytes)
            .map_err(|source| ExtractError::Write {
                name: name.to_string(),
                source,
            })
    }
}
