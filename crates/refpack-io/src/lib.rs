//! `refpack-io` is the single supported public entrypoint for reading,
//! resolving, dereferencing, and bundling `$ref`-linked document trees
//! (JSON, YAML, or anything a registered parser understands).
//!
//! This crate intentionally contains **no** schema validation or document
//! mutation logic. Those belong in higher layers. `refpack-io` focuses on:
//! - canonical locations and the loaded-document registry
//! - pointer resolution across documents
//! - the dereferenced value graph
//! - single-document bundling

// -----------------------------------------------------------------------------
// Public API contract
// -----------------------------------------------------------------------------
//
// Consumers SHOULD import from `refpack_io::prelude::*`.
// Anything not re-exported via the prelude is considered internal and may
// change without notice.

/// The four top-level operations plus their input/output types.
pub mod api;

// Re-export the canonical document model.
#[doc(hidden)]
pub mod core {
    pub use refpack_core::graph::{Node, NodeId, ValueGraph};
    pub use refpack_core::location::{Location, LocationKind, split_fragment};
    pub use refpack_core::pointer::{self, Pointer};
    pub use refpack_core::refs::{RefEntry, Refs};
    pub use refpack_core::{Error, ErrorCode, ErrorGroup, ErrorRecord};
}

// Re-export the plugin surface for callers registering their own readers
// and parsers.
#[doc(hidden)]
pub mod plugins {
    pub use refpack_plugins::matcher::Matcher;
    pub use refpack_plugins::parsers::{BinaryParser, JsonParser, TextParser, YamlParser};
    pub use refpack_plugins::plugin::{FileInfo, Parser, PluginError, Reader};
    pub use refpack_plugins::readers::{FileReader, HttpReader};
    pub use refpack_plugins::set::{ParserSet, ReaderSet, SelectionError};
}

// Re-export run configuration.
#[doc(hidden)]
pub mod options {
    pub use refpack_resolve::options::{CircularPolicy, Options};
}

/// Convenience prelude for consumers.
///
/// This is the **only supported** import surface for external users.
pub mod prelude {
    pub use crate::api::{Bundled, Dereferenced, Source, bundle, dereference, parse, resolve};
    pub use crate::core::{Error, ErrorCode, ErrorGroup, ErrorRecord};
    pub use crate::core::{Location, LocationKind, Node, NodeId, Pointer, RefEntry, Refs, ValueGraph};
    pub use crate::options::{CircularPolicy, Options};
    pub use crate::plugins::{
        FileInfo, Matcher, Parser, ParserSet, PluginError, Reader, ReaderSet,
    };
}
