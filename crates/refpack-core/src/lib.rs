#![doc = r#"
⚠️ INTERNAL CRATE – NOT A STABLE API

This crate is an internal implementation detail of the refpack project.

Do NOT depend on this crate directly.
Use `refpack-io` instead.
"#]

pub mod error;
pub mod graph;
pub mod location;
pub mod pointer;
pub mod refs;

pub use error::{Error, ErrorCode, ErrorGroup, ErrorRecord};
pub use graph::{Node, NodeId, ValueGraph};
pub use location::{Location, LocationKind};
pub use pointer::Pointer;
pub use refs::{RefEntry, Refs};
