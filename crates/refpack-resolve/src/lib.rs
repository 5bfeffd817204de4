#![doc = r#"
⚠️ INTERNAL CRATE – NOT A STABLE API

This crate is an internal implementation detail of the refpack project.

Do NOT depend on this crate directly.
Use `refpack-io` instead.
"#]

pub mod aggregate;
pub mod crawl;
pub mod loader;
pub mod options;
pub mod resolver;

pub use aggregate::Aggregator;
pub use options::{CircularPolicy, Options};
pub use resolver::{CycleTracker, Resolution, Target, ref_target, resolve_ref};
