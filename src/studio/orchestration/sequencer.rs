use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::collaborator::StudioCollaborator;
use crate::error::StudioError;
use crate::studio::services::{ActiveViewSelector, ArtifactStore};
use crate::studio::orchestration::operation_context::{
    ExecutionMode, OperationContext, PipelineStage,
};
use crate::studio::types::{
    ArtifactPatch, AspectRatio, CropProposal, CropWrite, EditMode, Settings, SourceImage,
    SubjectReport,
};

/// Result of one pipeline invocation. Cancellation is cooperative and not
/// an error: a cancelled run writes nothing past the cancellation point
/// and surfaces nothing.
#[derive(Debug)]
pub enum RunOutcome {
    Completed(OperationContext),
    Cancelled,
}

/// Runs the ordered edit -> report -> crop pipeline for a single image.
///
/// Stage order is fixed. The edit and report stages share the input
/// resolved once up front; the crop stage works on the edit stage's
/// output. Any stage failure aborts the stages that remain, leaving
/// whatever earlier stages already committed.
pub struct OperationSequencer {
    collaborator: Arc<dyn StudioCollaborator>,
}

impl OperationSequencer {
    pub fn new(collaborator: Arc<dyn StudioCollaborator>) -> Self {
        Self { collaborator }
    }

    pub async fn run(
        &self,
        source: &SourceImage,
        settings: &Settings,
        mode: ExecutionMode,
        store: &mut ArtifactStore,
        selector: &mut ActiveViewSelector,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome, StudioError> {
        if cancel.is_cancelled() {
            return Ok(RunOutcome::Cancelled);
        }

        let input = match mode {
            ExecutionMode::Chained => selector.resolve_input(source, store.get(source.id)),
            ExecutionMode::Batch => source.handle(),
        };
        let mut context =
            OperationContext::new(source.id, mode, settings.clone(), input);
        tracing::debug!(
            "Running {:?} pipeline for image {} ({})",
            mode,
            source.id,
            source.file_name
        );

        // Edit stage
        let stage_start = Instant::now();
        let edited = self.collaborator.edit(&context.input, settings).await?;
        context
            .metrics
            .record_duration(PipelineStage::Edit, stage_start.elapsed().as_micros() as u64);
        if cancel.is_cancelled() {
            tracing::info!("Edit result for image {} discarded after cancel", source.id);
            return Ok(RunOutcome::Cancelled);
        }
        let mut patch = ArtifactPatch::default();
        match settings.mode {
            EditMode::CleanupOnly => patch.cleaned = Some(edited.image.clone()),
            EditMode::RemoveBg => patch.removed_bg = Some(edited.image.clone()),
            EditMode::ThemedBg => {
                patch.themed_bg = Some(edited.image.clone());
                patch.enhanced_theme = edited.enhanced_theme.clone();
            }
        }
        let diff = store.upsert(source, patch);
        selector.auto_advance(&diff);
        context.edited = Some(edited.clone());

        // Report stage, on the same resolved input as the edit stage
        let stage_start = Instant::now();
        let subject_description = self.collaborator.report(&context.input, settings).await?;
        context.metrics.record_duration(
            PipelineStage::Report,
            stage_start.elapsed().as_micros() as u64,
        );
        if cancel.is_cancelled() {
            tracing::info!(
                "Report result for image {} discarded after cancel",
                source.id
            );
            return Ok(RunOutcome::Cancelled);
        }
        let report = SubjectReport {
            subject_description,
            settings: settings.clone(),
            created_at: Utc::now(),
        };
        store.upsert(
            source,
            ArtifactPatch {
                report: Some(report.clone()),
                ..ArtifactPatch::default()
            },
        );
        context.report = Some(report);

        // Crop stage, on the edit stage's output
        if settings.auto_crop && !settings.aspect_ratios.is_empty() {
            let ratios = settings
                .aspect_ratios
                .iter()
                .copied()
                .collect::<Vec<AspectRatio>>();
            let stage_start = Instant::now();
            let candidates = self.collaborator.auto_crop(&edited.image, &ratios).await?;
            context
                .metrics
                .record_duration(PipelineStage::Crop, stage_start.elapsed().as_micros() as u64);
            if cancel.is_cancelled() {
                tracing::info!(
                    "Crop proposals for image {} discarded after cancel",
                    source.id
                );
                return Ok(RunOutcome::Cancelled);
            }
            let proposals = candidates
                .into_iter()
                .map(|candidate| CropProposal {
                    image: candidate.image,
                    aspect_ratio: candidate.aspect_ratio,
                    composition_score: candidate.composition_score.min(100),
                    rationale: candidate.rationale,
                })
                .collect::<Vec<CropProposal>>();
            let diff = store.upsert(
                source,
                ArtifactPatch {
                    crops: Some(CropWrite::Replace(proposals.clone())),
                    ..ArtifactPatch::default()
                },
            );
            selector.auto_advance(&diff);
            context.crops = Some(proposals);
        }

        context.metrics.finalize(context.started);
        tracing::info!(
            "Pipeline for image {} finished in {}us",
            source.id,
            context.metrics.total_duration_us
        );
        Ok(RunOutcome::Completed(context))
    }
}
