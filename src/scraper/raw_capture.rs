//! Single-slot dump of the last unparseable page

use std::path::{Path, PathBuf};

/// Written in place of an empty response body
pub const EMPTY_BODY_MARKER: &str = "<!-- empty response body -->";

/// File that holds the most recent page body no count could be extracted
/// from. Overwritten on every failure, never read by the pipeline itself.
#[derive(Debug, Clone)]
pub struct RawCapture {
    path: PathBuf,
}

impl RawCapture {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the capture with `body`
    pub async fn write(&self, body: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = if body.is_empty() { EMPTY_BODY_MARKER } else { body };
        tokio::fs::write(&self.path, content).await
    }

    /// Current capture, if one was ever written
    #[cfg(test)]
    pub async fn read(&self) -> std::io::Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}
