use crate::harvest::foreign::ForeignProject;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to parse content: {0}")]
    InvalidContent(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[async_trait]
pub trait ResolutionSource: Send + Sync {
    /// Returns the build tool this source reads results of (e.g., "gradle").
    fn tool_id(&self) -> &str;

    /// Decodes raw exporter output into a [`ForeignProject`].
    async fn load(&self, content: &[u8]) -> Result<ForeignProject, SourceError>;
}
