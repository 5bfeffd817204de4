//! Pointer fragments (`#/a/b/c`) and token escaping.
//!
//! Escaping rules:
//! - `~1` unescapes to `/`, `~0` unescapes to `~` (in that order)
//! - percent-escapes are decoded on parse, not re-encoded on display
//!
//! `#` alone designates the document root (an empty token list).

use std::fmt;

use percent_encoding::percent_decode_str;

use crate::error::Error;

/// A parsed pointer: an ordered list of unescaped path tokens.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pointer {
    tokens: Vec<String>,
}

impl Pointer {
    /// Parse a `#...` fragment (or the empty string) into a pointer.
    ///
    /// Rules:
    /// - `""` and `"#"` designate the document root
    /// - anything else must begin with `#/`
    /// - empty tokens (`#//a`, trailing `/`) are rejected
    pub fn parse(fragment: &str) -> Result<Pointer, Error> {
        if fragment.is_empty() || fragment == "#" {
            return Ok(Pointer::default());
        }
        let rest = fragment.strip_prefix("#/").ok_or_else(|| Error::InvalidPointer {
            pointer: fragment.to_string(),
        })?;
        let mut tokens = Vec::new();
        for raw in rest.split('/') {
            if raw.is_empty() {
                return Err(Error::InvalidPointer {
                    pointer: fragment.to_string(),
                });
            }
            tokens.push(unescape(raw));
        }
        Ok(Pointer { tokens })
    }

    pub fn root() -> Pointer {
        Pointer::default()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The slash-joined, re-escaped path: `""` for the root, `/a/b`
    /// otherwise. Prefix with `#` to get the fragment form back.
    pub fn path(&self) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            out.push('/');
            out.push_str(&escape(token));
        }
        out
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.path())
    }
}

/// Unescape one pointer token (`~1` → `/`, `~0` → `~`, percent-escapes
/// decoded first).
pub fn unescape(token: &str) -> String {
    let decoded = percent_decode_str(token).decode_utf8_lossy();
    untilde(&decoded)
}

fn untilde(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

/// Escape one pointer token (`~` → `~0` first, then `/` → `~1`).
pub fn escape(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Append an escaped token to a slash-joined path string.
pub fn join(path: &str, token: &str) -> String {
    format!("{path}/{}", escape(token))
}

/// Split a slash-joined path string (as produced by [`join`]) back into
/// unescaped tokens. Percent-escapes are left alone here: only parse-time
/// fragments carry them.
pub fn path_tokens(path: &str) -> Vec<String> {
    if path.is_empty() {
        return Vec::new();
    }
    path.trim_start_matches('/')
        .split('/')
        .map(untilde)
        .collect()
}
