//! Run configuration.
//!
//! An `Options` value is built once per top-level call by cloning the
//! built-in plugin defaults plus caller overrides; nothing here is
//! process-global, so a running resolution never observes someone else's
//! mutations.

use refpack_plugins::{ParserSet, ReaderSet};

/// What to do when a circular reference is found while dereferencing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CircularPolicy {
    /// Link the cycle into the output graph.
    #[default]
    Allow,
    /// Fail the call (recorded cycle metadata stays valid).
    Forbid,
    /// Record the cycle but leave the pointer unresolved.
    Ignore,
}

#[derive(Debug, Clone)]
pub struct Options {
    /// Collect errors and raise them together at the end instead of
    /// aborting on the first one.
    pub continue_on_error: bool,
    /// Discover and load documents outside the root document.
    pub resolve_external: bool,
    pub circular: CircularPolicy,
    pub readers: ReaderSet,
    pub parsers: ParserSet,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            continue_on_error: false,
            resolve_external: true,
            circular: CircularPolicy::default(),
            readers: ReaderSet::defaults(),
            parsers: ParserSet::defaults(),
        }
    }
}

impl Options {
    pub fn new() -> Options {
        Options::default()
    }

    pub fn continue_on_error(mut self, yes: bool) -> Options {
        self.continue_on_error = yes;
        self
    }

    pub fn resolve_external(mut self, yes: bool) -> Options {
        self.resolve_external = yes;
        self
    }

    pub fn circular(mut self, policy: CircularPolicy) -> Options {
        self.circular = policy;
        self
    }
}
