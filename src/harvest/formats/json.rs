use async_trait::async_trait;
use tracing::debug;

use crate::harvest::curation::CurationSet;
use crate::harvest::foreign::ForeignProject;
use crate::traits::{ResolutionSource, SourceError};

/// Reads resolution results serialized as JSON.
#[derive(Debug, Clone)]
pub struct JsonResolutionSource {
    tool_id: String,
}

impl JsonResolutionSource {
    pub fn new(tool_id: impl Into<String>) -> Self {
        Self {
            tool_id: tool_id.into(),
        }
    }
}

impl Default for JsonResolutionSource {
    fn default() -> Self {
        Self::new("gradle")
    }
}

#[async_trait]
impl ResolutionSource for JsonResolutionSource {
    fn tool_id(&self) -> &str {
        &self.tool_id
    }

    async fn load(&self, content: &[u8]) -> Result<ForeignProject, SourceError> {
        if content.iter().all(u8::is_ascii_whitespace) {
            return Err(SourceError::InvalidContent("empty document".to_string()));
        }

        let project: ForeignProject = serde_json::from_slice(content)?;
        debug!(tool = %self.tool_id, project = %project.name, "Decoded resolution result");
        Ok(project)
    }
}

/// Decodes a JSON array of curations, keeping the array order as priority.
pub fn parse_curations(content: &[u8]) -> Result<CurationSet, SourceError> {
    Ok(serde_json::from_slice(content)?)
}
