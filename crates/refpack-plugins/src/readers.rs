//! Built-in readers: local filesystem and HTTP(S).

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use refpack_core::Location;

use crate::plugin::{PluginError, Reader};

/// Reads local files. Order 100, so it wins over the HTTP reader for the
/// locations it claims.
#[derive(Debug, Clone)]
pub struct FileReader {
    order: i32,
}

impl FileReader {
    pub fn new() -> FileReader {
        FileReader { order: 100 }
    }

    pub fn with_order(mut self, order: i32) -> FileReader {
        self.order = order;
        self
    }
}

impl Default for FileReader {
    fn default() -> FileReader {
        FileReader::new()
    }
}

#[async_trait]
impl Reader for FileReader {
    fn name(&self) -> &str {
        "file"
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn can_read(&self, location: &Location) -> bool {
        matches!(location, Location::File(_))
    }

    async fn read(&self, location: &Location) -> Result<Vec<u8>, PluginError> {
        let path: &Path = match location {
            Location::File(path) => path,
            _ => return Err(PluginError::failed("not a file location")),
        };
        tokio::fs::read(path).await.map_err(|e| {
            PluginError::failed(format!("Error opening file \"{}\": {e}", path.display()))
        })
    }
}

/// Reads `http://` and `https://` URLs. Order 200.
#[derive(Debug, Clone)]
pub struct HttpReader {
    order: i32,
    timeout: Duration,
}

impl HttpReader {
    pub fn new() -> HttpReader {
        HttpReader {
            order: 200,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_order(mut self, order: i32) -> HttpReader {
        self.order = order;
        self
    }

    /// Per-request timeout. Timeouts are a reader concern, not an engine
    /// one.
    pub fn with_timeout(mut self, timeout: Duration) -> HttpReader {
        self.timeout = timeout;
        self
    }
}

impl Default for HttpReader {
    fn default() -> HttpReader {
        HttpReader::new()
    }
}

#[async_trait]
impl Reader for HttpReader {
    fn name(&self) -> &str {
        "http"
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn can_read(&self, location: &Location) -> bool {
        matches!(location, Location::Url(url) if matches!(url.scheme(), "http" | "https"))
    }

    async fn read(&self, location: &Location) -> Result<Vec<u8>, PluginError> {
        let url = match location {
            Location::Url(url) => url.clone(),
            _ => return Err(PluginError::failed("not a URL location")),
        };
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| PluginError::failed(e.to_string()))?;
        let response = client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| PluginError::failed(format!("Error downloading \"{url}\": {e}")))?;
        if !response.status().is_success() {
            return Err(PluginError::failed(format!(
                "HTTP {} while downloading \"{url}\"",
                response.status().as_u16()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| PluginError::failed(format!("Error downloading \"{url}\": {e}")))?;
        Ok(bytes.to_vec())
    }
}
