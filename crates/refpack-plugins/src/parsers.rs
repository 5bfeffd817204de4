//! Built-in parsers: JSON, YAML, plain text, and binary.
//!
//! All four share the empty-input rule: a blank payload is "no value
//! produced" and fails unless the parser instance was configured with
//! `allow_empty`, in which case it decodes to an empty value (JSON/YAML:
//! null, text: empty string, binary: empty payload).

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value;

use crate::matcher::Matcher;
use crate::plugin::{FileInfo, Parser, PluginError};

fn is_blank(data: &[u8]) -> bool {
    data.iter().all(u8::is_ascii_whitespace)
}

/// Parses `.json` files. Order 100.
#[derive(Debug)]
pub struct JsonParser {
    order: i32,
    allow_empty: bool,
    matcher: Matcher,
}

impl JsonParser {
    pub fn new() -> JsonParser {
        JsonParser {
            order: 100,
            allow_empty: false,
            matcher: Matcher::extensions([".json"]),
        }
    }

    pub fn allow_empty(mut self, yes: bool) -> JsonParser {
        self.allow_empty = yes;
        self
    }

    pub fn with_matcher(mut self, matcher: Matcher) -> JsonParser {
        self.matcher = matcher;
        self
    }

    pub fn with_order(mut self, order: i32) -> JsonParser {
        self.order = order;
        self
    }
}

impl Default for JsonParser {
    fn default() -> JsonParser {
        JsonParser::new()
    }
}

#[async_trait]
impl Parser for JsonParser {
    fn name(&self) -> &str {
        "json"
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn can_parse(&self, file: &FileInfo) -> bool {
        self.matcher.matches(&file.url())
    }

    async fn parse(&self, file: &FileInfo) -> Result<Value, PluginError> {
        if is_blank(&file.data) {
            return if self.allow_empty {
                Ok(Value::Null)
            } else {
                Err(PluginError::Empty)
            };
        }
        serde_json::from_slice(&file.data).map_err(|e| PluginError::failed(e.to_string()))
    }
}

/// Parses `.yaml` / `.yml` (and, being a superset, `.json`) files.
/// Order 200.
#[derive(Debug)]
pub struct YamlParser {
    order: i32,
    allow_empty: bool,
    matcher: Matcher,
}

impl YamlParser {
    pub fn new() -> YamlParser {
        YamlParser {
            order: 200,
            allow_empty: false,
            matcher: Matcher::extensions([".yaml", ".yml", ".json"]),
        }
    }

    pub fn allow_empty(mut self, yes: bool) -> YamlParser {
        self.allow_empty = yes;
        self
    }

    pub fn with_matcher(mut self, matcher: Matcher) -> YamlParser {
        self.matcher = matcher;
        self
    }

    pub fn with_order(mut self, order: i32) -> YamlParser {
        self.order = order;
        self
    }
}

impl Default for YamlParser {
    fn default() -> YamlParser {
        YamlParser::new()
    }
}

#[async_trait]
impl Parser for YamlParser {
    fn name(&self) -> &str {
        "yaml"
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn can_parse(&self, file: &FileInfo) -> bool {
        self.matcher.matches(&file.url())
    }

    async fn parse(&self, file: &FileInfo) -> Result<Value, PluginError> {
        if is_blank(&file.data) {
            return if self.allow_empty {
                Ok(Value::Null)
            } else {
                Err(PluginError::Empty)
            };
        }
        serde_yaml::from_slice(&file.data).map_err(|e| PluginError::failed(e.to_string()))
    }
}

/// Decodes common text formats to a string value. Order 300.
#[derive(Debug)]
pub struct TextParser {
    order: i32,
    allow_empty: bool,
    matcher: Matcher,
}

impl TextParser {
    pub fn new() -> TextParser {
        TextParser {
            order: 300,
            allow_empty: false,
            matcher: Matcher::extensions([
                ".txt", ".htm", ".html", ".md", ".xml", ".js", ".css", ".csv",
            ]),
        }
    }

    pub fn allow_empty(mut self, yes: bool) -> TextParser {
        self.allow_empty = yes;
        self
    }

    pub fn with_matcher(mut self, matcher: Matcher) -> TextParser {
        self.matcher = matcher;
        self
    }

    pub fn with_order(mut self, order: i32) -> TextParser {
        self.order = order;
        self
    }
}

impl Default for TextParser {
    fn default() -> TextParser {
        TextParser::new()
    }
}

#[async_trait]
impl Parser for TextParser {
    fn name(&self) -> &str {
        "text"
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn can_parse(&self, file: &FileInfo) -> bool {
        self.matcher.matches(&file.url())
    }

    async fn parse(&self, file: &FileInfo) -> Result<Value, PluginError> {
        if file.data.is_empty() {
            return if self.allow_empty {
                Ok(Value::String(String::new()))
            } else {
                Err(PluginError::Empty)
            };
        }
        String::from_utf8(file.data.clone())
            .map(Value::String)
            .map_err(|_| PluginError::failed("content is not valid UTF-8"))
    }
}

/// Fallback parser for anything else: base64-encodes the payload into a
/// string value. Order 400, matches everything.
#[derive(Debug)]
pub struct BinaryParser {
    order: i32,
    allow_empty: bool,
    matcher: Matcher,
}

impl BinaryParser {
    pub fn new() -> BinaryParser {
        BinaryParser {
            order: 400,
            allow_empty: false,
            matcher: Matcher::Always(true),
        }
    }

    pub fn allow_empty(mut self, yes: bool) -> BinaryParser {
        self.allow_empty = yes;
        self
    }

    pub fn with_matcher(mut self, matcher: Matcher) -> BinaryParser {
        self.matcher = matcher;
        self
    }

    pub fn with_order(mut self, order: i32) -> BinaryParser {
        self.order = order;
        self
    }
}

impl Default for BinaryParser {
    fn default() -> BinaryParser {
        BinaryParser::new()
    }
}

#[async_trait]
impl Parser for BinaryParser {
    fn name(&self) -> &str {
        "binary"
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn can_parse(&self, file: &FileInfo) -> bool {
        self.matcher.matches(&file.url())
    }

    async fn parse(&self, file: &FileInfo) -> Result<Value, PluginError> {
        if file.data.is_empty() && !self.allow_empty {
            return Err(PluginError::Empty);
        }
        Ok(Value::String(BASE64.encode(&file.data)))
    }
}
