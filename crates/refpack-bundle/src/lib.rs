#![doc = r#"
⚠️ INTERNAL CRATE – NOT A STABLE API

This crate is an internal implementation detail of the refpack project.

Do NOT depend on this crate directly.
Use `refpack-io` instead.
"#]

pub mod bundle;
pub mod dereference;

pub use bundle::bundle;
pub use dereference::dereference;
