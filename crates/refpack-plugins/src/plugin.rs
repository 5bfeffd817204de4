//! The reader and parser capability contracts.
//!
//! Both plugin kinds follow the same shape: a name (for add/remove/replace
//! by name), a numeric order (lower is tried first), a match predicate, and
//! one asynchronous execute method. Synchronous plugins simply return
//! immediately; anything deferred awaits inside `read`/`parse`. That single
//! async method is the uniform invocation contract, so call sites never
//! normalize separate callback or future variants.

use async_trait::async_trait;
use serde_json::Value;

use refpack_core::Location;

/// The raw content handed from a reader to the parsers.
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub location: Location,
    pub data: Vec<u8>,
}

impl FileInfo {
    /// Canonical location string, the value match predicates run against.
    pub fn url(&self) -> String {
        self.location.key()
    }
}

/// A plugin-level failure. Selection treats any failure as "try the next
/// matching plugin".
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("{0}")]
    Failed(String),
    /// The plugin ran but produced nothing ("no value produced").
    #[error("no value produced")]
    Empty,
}

impl PluginError {
    pub fn failed(message: impl Into<String>) -> PluginError {
        PluginError::Failed(message.into())
    }
}

/// Fetches raw content for locations it claims.
#[async_trait]
pub trait Reader: Send + Sync {
    fn name(&self) -> &str;

    /// Lower orders are tried first; ties keep registration order.
    fn order(&self) -> i32;

    fn can_read(&self, location: &Location) -> bool;

    async fn read(&self, location: &Location) -> Result<Vec<u8>, PluginError>;
}

/// Decodes raw content into a structured value.
#[async_trait]
pub trait Parser: Send + Sync {
    fn name(&self) -> &str;

    /// Lower orders are tried first; ties keep registration order.
    fn order(&self) -> i32;

    fn can_parse(&self, file: &FileInfo) -> bool;

    async fn parse(&self, file: &FileInfo) -> Result<Value, PluginError>;
}
