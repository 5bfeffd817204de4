//! Ordered plugin sets and the selection algorithm.
//!
//! Selection rules:
//! - plugins are tried in ascending `order`; the sort is stable, so ties
//!   keep registration order
//! - the first plugin whose match predicate accepts the candidate runs
//! - if it fails, the *next matching* plugin is tried, not the next plugin
//!   overall
//! - no match at all → [`SelectionError::Unmatched`]; every matching
//!   plugin failed → [`SelectionError::AllFailed`] wrapping the last
//!   failure

use std::sync::Arc;

use serde_json::Value;

use refpack_core::Location;

use crate::parsers::{BinaryParser, JsonParser, TextParser, YamlParser};
use crate::plugin::{FileInfo, Parser, PluginError, Reader};
use crate::readers::{FileReader, HttpReader};

/// Why selection over a plugin set came up empty.
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("no plugin matched")]
    Unmatched,
    #[error("{plugin}: {error}")]
    AllFailed { plugin: String, error: PluginError },
}

/// The ordered set of readers for one run.
#[derive(Clone, Default)]
pub struct ReaderSet {
    plugins: Vec<Arc<dyn Reader>>,
}

impl ReaderSet {
    pub fn empty() -> ReaderSet {
        ReaderSet::default()
    }

    /// The built-in defaults: local filesystem and HTTP(S).
    pub fn defaults() -> ReaderSet {
        let mut set = ReaderSet::empty();
        set.register(Arc::new(FileReader::new()));
        set.register(Arc::new(HttpReader::new()));
        set
    }

    /// Add a reader. A plugin with the same name replaces the existing one
    /// in place (same registration position, possibly different order).
    pub fn register(&mut self, plugin: Arc<dyn Reader>) {
        match self.plugins.iter().position(|p| p.name() == plugin.name()) {
            Some(idx) => self.plugins[idx] = plugin,
            None => self.plugins.push(plugin),
        }
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.plugins.len();
        self.plugins.retain(|p| p.name() != name);
        self.plugins.len() != before
    }

    pub fn names(&self) -> Vec<String> {
        self.ordered().iter().map(|p| p.name().to_string()).collect()
    }

    fn ordered(&self) -> Vec<Arc<dyn Reader>> {
        let mut plugins = self.plugins.clone();
        plugins.sort_by_key(|p| p.order());
        plugins
    }

    /// Fetch raw content, returning it with the matched plugin's name.
    pub async fn read(&self, location: &Location) -> Result<(Vec<u8>, String), SelectionError> {
        let mut last: Option<(String, PluginError)> = None;
        for plugin in self.ordered() {
            if !plugin.can_read(location) {
                continue;
            }
            tracing::debug!(reader = plugin.name(), location = %location, "trying reader");
            match plugin.read(location).await {
                Ok(data) => return Ok((data, plugin.name().to_string())),
                Err(error) => {
                    tracing::debug!(reader = plugin.name(), %error, "reader failed; trying next match");
                    last = Some((plugin.name().to_string(), error));
                }
            }
        }
        match last {
            Some((plugin, error)) => Err(SelectionError::AllFailed { plugin, error }),
            None => Err(SelectionError::Unmatched),
        }
    }
}

impl std::fmt::Debug for ReaderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ReaderSet").field(&self.names()).finish()
    }
}

/// The ordered set of parsers for one run.
#[derive(Clone, Default)]
pub struct ParserSet {
    plugins: Vec<Arc<dyn Parser>>,
}

impl ParserSet {
    pub fn empty() -> ParserSet {
        ParserSet::default()
    }

    /// The built-in defaults: JSON, YAML, plain text, and binary.
    pub fn defaults() -> ParserSet {
        let mut set = ParserSet::empty();
        set.register(Arc::new(JsonParser::new()));
        set.register(Arc::new(YamlParser::new()));
        set.register(Arc::new(TextParser::new()));
        set.register(Arc::new(BinaryParser::new()));
        set
    }

    /// Add a parser. A plugin with the same name replaces the existing one
    /// in place.
    pub fn register(&mut self, plugin: Arc<dyn Parser>) {
        match self.plugins.iter().position(|p| p.name() == plugin.name()) {
            Some(idx) => self.plugins[idx] = plugin,
            None => self.plugins.push(plugin),
        }
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.plugins.len();
        self.plugins.retain(|p| p.name() != name);
        self.plugins.len() != before
    }

    pub fn names(&self) -> Vec<String> {
        self.ordered().iter().map(|p| p.name().to_string()).collect()
    }

    fn ordered(&self) -> Vec<Arc<dyn Parser>> {
        let mut plugins = self.plugins.clone();
        plugins.sort_by_key(|p| p.order());
        plugins
    }

    /// Decode raw content, returning the value with the matched plugin's
    /// name.
    pub async fn parse(&self, file: &FileInfo) -> Result<(Value, String), SelectionError> {
        let mut last: Option<(String, PluginError)> = None;
        for plugin in self.ordered() {
            if !plugin.can_parse(file) {
                continue;
            }
            tracing::debug!(parser = plugin.name(), location = %file.location, "trying parser");
            match plugin.parse(file).await {
                Ok(value) => return Ok((value, plugin.name().to_string())),
                Err(error) => {
                    tracing::debug!(parser = plugin.name(), %error, "parser failed; trying next match");
                    last = Some((plugin.name().to_string(), error));
                }
            }
        }
        match last {
            Some((plugin, error)) => Err(SelectionError::AllFailed { plugin, error }),
            None => Err(SelectionError::Unmatched),
        }
    }
}

impl std::fmt::Debug for ParserSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ParserSet").field(&self.names()).finish()
    }
}
