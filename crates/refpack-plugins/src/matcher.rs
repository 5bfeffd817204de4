//! Match-predicate normalization.
//!
//! A plugin's capability can be declared as a boolean, a list of file
//! extensions, or an arbitrary predicate over the canonical location
//! string (which subsumes pattern matching). All forms normalize to one
//! `matches` call at registration time, not at every call site.

use std::fmt;

/// A normalized capability predicate.
pub enum Matcher {
    /// Match everything (or nothing).
    Always(bool),
    /// Match by lowercased file extension, with or without the leading dot.
    Extensions(Vec<String>),
    /// An arbitrary predicate over the canonical location string.
    Predicate(Box<dyn Fn(&str) -> bool + Send + Sync>),
}

impl Matcher {
    /// Build an extension matcher; entries are normalized to `.ext`
    /// lowercase form.
    pub fn extensions<I, S>(extensions: I) -> Matcher
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalized = extensions
            .into_iter()
            .map(|ext| {
                let ext = ext.as_ref().to_ascii_lowercase();
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{ext}")
                }
            })
            .collect();
        Matcher::Extensions(normalized)
    }

    pub fn predicate(f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Matcher {
        Matcher::Predicate(Box::new(f))
    }

    pub fn matches(&self, url: &str) -> bool {
        match self {
            Matcher::Always(yes) => *yes,
            Matcher::Extensions(extensions) => {
                let lower = url.to_ascii_lowercase();
                extensions.iter().any(|ext| lower.ends_with(ext.as_str()))
            }
            Matcher::Predicate(f) => f(url),
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Always(yes) => f.debug_tuple("Always").field(yes).finish(),
            Matcher::Extensions(extensions) => {
                f.debug_tuple("Extensions").field(extensions).finish()
            }
            Matcher::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}
