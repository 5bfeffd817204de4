#![doc = r#"
⚠️ INTERNAL CRATE – NOT A STABLE API

This crate is an internal implementation detail of the refpack project.

Do NOT depend on this crate directly.
Use `refpack-io` instead.
"#]

pub mod matcher;
pub mod parsers;
pub mod plugin;
pub mod readers;
pub mod set;

pub use matcher::Matcher;
pub use plugin::{FileInfo, Parser, PluginError, Reader};
pub use set::{ParserSet, ReaderSet, SelectionError};
