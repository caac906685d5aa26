//! Output name resolution
//!
//! Names are unique within one run. Reservation is a single
//! check-and-insert under one lock, so parts resolved from several
//! threads can never land on the same name.

use crate::types::{Part, Role};
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Set of names already taken in the current run
#[derive(Debug, Default)]
pub struct UsedNames {
    names: Mutex<HashSet<String>>,
}

impl UsedNames {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the given names already taken
    #[must_use]
    pub fn with_reserved<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: Mutex::new(names.into_iter().map(Into::into).collect()),
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Reserve `base`, or the first free `stem_N.ext` variant
    ///
    /// With `with_sidecar`, the matching `<stem>_metadata.txt` must be free
    /// too and is reserved alongside the name.
    pub fn reserve(&self, base: &str, with_sidecar: bool) -> String {
        let mut names = self.lock();
        let (stem, ext) = split_extension(base);

        let is_free = |candidate: &str, names: &HashSet<String>| {
            !names.contains(candidate)
                && (!with_sidecar || !names.contains(&sidecar_name(candidate)))
        };

        let mut candidate = base.to_string();
        let mut counter = 1;
        while !is_free(&candidate, &*names) {
            candidate = format!("{stem}_{counter}{ext}");
            counter += 1;
        }

        if with_sidecar {
            names.insert(sidecar_name(&candidate));
        }
        names.insert(candidate.clone());
        candidate
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.names.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Split a name into stem and extension (extension keeps its dot)
///
/// Leading dots belong to the stem, so `.profile` has no extension.
#[must_use]
pub fn split_extension(name: &str) -> (&str, &str) {
    let leading = name.len() - name.trim_start_matches('.').len();
    match name[leading..].rfind('.') {
        Some(pos) => name.split_at(leading + pos),
        None => (name, ""),
    }
}

/// Name of the metadata sidecar for an image output
#[must_use]
pub fn sidecar_name(name: &str) -> String {
    let (stem, _) = split_extension(name);
    format!("{stem}_metadata.txt")
}

/// Base name for a part before collision handling
///
/// Returns `None` for roles that are not persisted under their own name.
#[must_use]
pub fn base_name(part: &Part, role: Role, part_index: usize) -> Option<String> {
    let filename = part
        .filename
        .as_deref()
        .filter(|f| !f.trim().is_empty())
        .map(str::to_string);

    match role {
        Role::Image => Some(filename.unwrap_or_else(|| {
            part.content_id.as_deref().map_or_else(
                || format!("image_{part_index}.{}", part.subtype()),
                |cid| format!("{}.{}", clean_content_id(cid), part.subtype()),
            )
        })),
        Role::Attachment => {
            Some(filename.unwrap_or_else(|| format!("attachment_{part_index}")))
        }
        Role::UnknownBinary => Some(format!("unknown_part_{part_index}.bin")),
        Role::TextBody | Role::HtmlBody | Role::Skip => None,
    }
}

/// Resolve and reserve a unique output name for a part
pub fn resolve(part: &Part, role: Role, part_index: usize, used: &UsedNames) -> Option<String> {
    let base = base_name(part, role, part_index)?;
    Some(used.reserve(&base, role == Role::Image))
}

fn clean_content_id(cid: &str) -> String {
    cid.trim()
        .trim_matches(|c| c == '<' || c == '>')
        .replace('@', "_at_")
        .replace(['.', '/'], "_")
}
