//! Canonical document locations.
//!
//! Every document source (in-memory value, file path, URL) is reduced to one
//! comparable identity before anything is loaded:
//! - file paths become absolute and normalized (`.` / `..` segments removed)
//! - URLs are normalized by the `url` crate (scheme/host case, dot segments)
//! - an in-memory root is anchored at a working directory, so sibling
//!   relative references resolve against that directory
//!
//! Two locations are equal iff their canonical string forms (`key()`) are
//! equal. Locations are immutable once created.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use url::Url;

use crate::error::Error;

/// The kind of a location, used to filter registry enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    /// An in-memory root document.
    Memory,
    /// A local file.
    File,
    /// A remote URL.
    Url,
}

/// A canonical, comparable identity for a document source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    /// An in-memory root, anchored at the directory relative references
    /// resolve against (normally the process working directory).
    Memory(PathBuf),
    /// An absolute, normalized file path.
    File(PathBuf),
    /// An absolute URL.
    Url(Url),
}

impl Location {
    /// Canonicalize a source string against an optional base location.
    ///
    /// Rules:
    /// - absolute URLs (and `file://` URLs) replace the base entirely
    /// - absolute paths replace the base entirely
    /// - relative paths resolve against the base's directory
    /// - without a base, relative paths resolve against the process
    ///   working directory
    pub fn canonicalize(source: &str, base: Option<&Location>) -> Result<Location, Error> {
        // A scheme followed by "://" is the unambiguous URL form. Anything
        // else (including "a:b" relative oddities) is treated as a path.
        if looks_like_url(source) {
            let url = Url::parse(source).map_err(|e| Error::InvalidLocation {
                location: source.to_string(),
                reason: e.to_string(),
            })?;
            if url.scheme() == "file" {
                let path = url.to_file_path().map_err(|_| Error::InvalidLocation {
                    location: source.to_string(),
                    reason: "file URL has no usable path".to_string(),
                })?;
                return Ok(Location::File(normalize_path(&path)));
            }
            return Ok(Location::Url(url));
        }

        // Resolving a relative reference against a URL base stays in URL
        // space regardless of what the reference looks like.
        if let Some(Location::Url(base_url)) = base {
            let joined = base_url.join(source).map_err(|e| Error::InvalidLocation {
                location: source.to_string(),
                reason: e.to_string(),
            })?;
            return Ok(Location::Url(joined));
        }

        let path = Path::new(source);
        if path.is_absolute() {
            return Ok(Location::File(normalize_path(path)));
        }

        let dir = match base {
            Some(Location::Memory(dir)) => dir.clone(),
            Some(Location::File(file)) => file
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("/")),
            Some(Location::Url(_)) => unreachable!("URL bases are handled above"),
            None => std::env::current_dir().map_err(|e| Error::InvalidLocation {
                location: source.to_string(),
                reason: e.to_string(),
            })?,
        };
        Ok(Location::File(normalize_path(&dir.join(path))))
    }

    /// Derive a target location from this location plus a relative
    /// reference string.
    ///
    /// Fragment-only references (`#/a/b`) resolve to this location
    /// unchanged; any fragment on the reference is ignored here (fragments
    /// are the pointer resolver's concern).
    pub fn resolve_relative(&self, reference: &str) -> Result<Location, Error> {
        let (loc_part, _fragment) = split_fragment(reference);
        if loc_part.is_empty() {
            return Ok(self.clone());
        }
        Location::canonicalize(loc_part, Some(self))
    }

    /// The canonical string form. Locations are equal iff their keys are.
    pub fn key(&self) -> String {
        match self {
            Location::Memory(dir) => dir.display().to_string(),
            Location::File(path) => path.display().to_string(),
            Location::Url(url) => url.as_str().to_string(),
        }
    }

    pub fn kind(&self) -> LocationKind {
        match self {
            Location::Memory(_) => LocationKind::Memory,
            Location::File(_) => LocationKind::File,
            Location::Url(_) => LocationKind::Url,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Split a reference string into its location part and its `#...` fragment.
///
/// `"b.json#/x"` → `("b.json", "#/x")`; `"#/x"` → `("", "#/x")`;
/// `"b.json"` → `("b.json", "")`.
pub fn split_fragment(reference: &str) -> (&str, &str) {
    match reference.find('#') {
        Some(idx) => (&reference[..idx], &reference[idx..]),
        None => (reference, ""),
    }
}

fn looks_like_url(source: &str) -> bool {
    source
        .find("://")
        .map(|idx| {
            let scheme = &source[..idx];
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
        })
        .unwrap_or(false)
}

/// Remove `.` and `..` segments without touching the filesystem.
fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Popping past the root keeps the root.
                if !out.pop() {
                    out.push(Component::RootDir);
                }
            }
            other => out.push(other),
        }
    }
    out
}
