use crate::harvest::extractor::GraphExtractor;
use crate::harvest::snapshot::ProjectSnapshot;
use crate::harvest::traits::{ExtractionError, HarvestStage};
use crate::traits::ResolutionSource;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, instrument};

/// Runs extractions of independent projects concurrently.
///
/// A single resolution result is never shared between tasks; every input is
/// moved into exactly one blocking task.
pub struct SnapshotExecutor {
    semaphore: Arc<Semaphore>,
}

impl SnapshotExecutor {
    pub fn new(concurrency_limit: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(concurrency_limit.max(1))),
        }
    }

    #[instrument(skip(self, stage, input), fields(stage = stage.stage_name()))]
    pub async fn execute<S>(
        &self,
        stage: Arc<S>,
        input: S::Input,
    ) -> Result<S::Output, ExtractionError>
    where
        S: HarvestStage<Error = ExtractionError> + 'static,
        S::Input: Send + 'static,
        S::Output: Send + 'static,
    {
        run_stage(Arc::clone(&self.semaphore), stage, input).await
    }

    /// Executes `stage` for every input, returning results in input order.
    pub async fn execute_all<S>(
        &self,
        stage: Arc<S>,
        inputs: Vec<S::Input>,
    ) -> Vec<Result<S::Output, ExtractionError>>
    where
        S: HarvestStage<Error = ExtractionError> + 'static,
        S::Input: Send + 'static,
        S::Output: Send + 'static,
    {
        let handles: Vec<_> = inputs
            .into_iter()
            .map(|input| {
                tokio::spawn(run_stage(
                    Arc::clone(&self.semaphore),
                    Arc::clone(&stage),
                    input,
                ))
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            let result = handle
                .await
                .map_err(|e| ExtractionError::Executor(format!("Task join error: {}", e)))
                .and_then(|r| r);
            results.push(result);
        }
        results
    }

    /// Loads a resolution result from `source` and extracts it.
    #[instrument(skip(self, source, extractor, content), fields(tool = source.tool_id()))]
    pub async fn harvest<R>(
        &self,
        source: Arc<R>,
        extractor: Arc<GraphExtractor>,
        content: Vec<u8>,
    ) -> Result<ProjectSnapshot, ExtractionError>
    where
        R: ResolutionSource + 'static,
    {
        let project = source.load(&content).await?;
        run_stage(Arc::clone(&self.semaphore), extractor, project).await
    }
}

async fn run_stage<S>(
    semaphore: Arc<Semaphore>,
    stage: Arc<S>,
    input: S::Input,
) -> Result<S::Output, ExtractionError>
where
    S: HarvestStage<Error = ExtractionError> + 'static,
    S::Input: Send + 'static,
    S::Output: Send + 'static,
{
    let _permit = semaphore
        .acquire_owned()
        .await
        .map_err(|e| ExtractionError::Executor(format!("Semaphore error: {}", e)))?;

    let name = stage.stage_name();
    info!("Starting stage: {}", name);

    let result = tokio::task::spawn_blocking(move || stage.execute(input))
        .await
        .map_err(|e| ExtractionError::Executor(format!("Task join error: {}", e)))?;

    info!("Finished stage: {}", name);
    result
}
