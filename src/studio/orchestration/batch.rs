use tokio_util::sync::CancellationToken;

use crate::error::StudioError;
use crate::studio::orchestration::operation_context::ExecutionMode;
use crate::studio::orchestration::sequencer::{OperationSequencer, RunOutcome};
use crate::studio::services::{ActiveViewSelector, ArtifactStore};
use crate::studio::types::{ImageId, Settings, SourceImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    Completed { processed: usize },
    Cancelled { processed: usize },
}

/// Drives the pipeline across a list of images, strictly one at a time:
/// an image's full three-stage run completes before the next image
/// starts. The first failure halts the whole batch.
pub struct BatchRunner<'a> {
    sequencer: &'a OperationSequencer,
}

impl<'a> BatchRunner<'a> {
    pub fn new(sequencer: &'a OperationSequencer) -> Self {
        Self { sequencer }
    }

    /// Processes `images` in order, moving the current-image cursor along
    /// so progress is observable. On full success the cursor returns to
    /// the first image; on failure or cancellation it stays where the
    /// batch stopped.
    pub async fn run(
        &self,
        images: &[SourceImage],
        settings: &Settings,
        store: &mut ArtifactStore,
        selector: &mut ActiveViewSelector,
        current: &mut Option<ImageId>,
        cancel: &CancellationToken,
    ) -> Result<BatchOutcome, StudioError> {
        let mut processed = 0;
        for source in images {
            *current = Some(source.id);
            selector.reset();
            if cancel.is_cancelled() {
                tracing::info!("Batch cancelled after {} of {} images", processed, images.len());
                return Ok(BatchOutcome::Cancelled { processed });
            }

            match self
                .sequencer
                .run(
                    source,
                    settings,
                    ExecutionMode::Batch,
                    store,
                    selector,
                    cancel,
                )
                .await
            {
                Ok(RunOutcome::Completed(_)) => processed += 1,
                Ok(RunOutcome::Cancelled) => {
                    tracing::info!(
                        "Batch cancelled after {} of {} images",
                        processed,
                        images.len()
                    );
                    return Ok(BatchOutcome::Cancelled { processed });
                }
                Err(error) => {
                    tracing::error!(
                        "Batch halted at image {} ({}): {}",
                        source.id,
                        source.file_name,
                        error
                    );
                    return Err(error);
                }
            }
        }

        if let Some(first) = images.first() {
            *current = Some(first.id);
            selector.reset();
        }
        tracing::info!("Batch finished: {} images processed", processed);
        Ok(BatchOutcome::Completed { processed })
    }
}
