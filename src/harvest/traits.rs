//! Core traits and error types of the harvest stages.

use thiserror::Error;

use crate::traits::SourceError;

// ============================================================================
// Pipeline Trait
// ============================================================================

/// Generic pipeline stage that transforms Input → Output.
///
/// Stages are pure with respect to their input: executing the same input
/// twice yields the same output, so a failed run can be retried safely.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so that independent inputs can
/// be processed concurrently on the blocking pool.
pub trait HarvestStage: Send + Sync {
    /// Input type consumed by this stage
    type Input;

    /// Output type produced by this stage
    type Output;

    /// Error type for stage failures
    type Error: std::error::Error + Send + Sync + 'static;

    /// Executes the stage.
    ///
    /// # Errors
    ///
    /// Returns `Err` only if the input cannot be processed as a whole.
    fn execute(&self, input: Self::Input) -> Result<Self::Output, Self::Error>;

    /// Returns a human-readable name for this stage.
    ///
    /// Used for logging.
    fn stage_name(&self) -> &'static str;
}

// ============================================================================
// Error Types
// ============================================================================

/// Structural failures that make a resolution result unusable.
///
/// Problems local to one dependency are never reported this way; they end up
/// as diagnostics inside the snapshot.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The serialized model is newer than this extractor understands
    #[error("Unsupported model version {found} (supported up to {supported})")]
    UnsupportedModelVersion { found: u32, supported: u32 },

    /// The build tool version cannot be interpreted
    #[error("Invalid build tool version: '{0}'")]
    InvalidToolVersion(String),

    /// A part of the result every dialect requires is absent
    #[error("Resolution result lacks required API surface: {0}")]
    MissingApiSurface(&'static str),

    /// Loading the result from its source failed
    #[error("Failed to load resolution result: {0}")]
    Source(#[from] SourceError),

    /// The executor could not run the extraction
    #[error("Executor error: {0}")]
    Executor(String),
}
