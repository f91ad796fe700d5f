use std::time::Instant;

use crate::collaborator::EditOutcome;
use crate::studio::types::{CropProposal, ImageHandle, ImageId, Settings, SubjectReport};

/// How the pipeline resolves its stage-1 input: a chained run continues
/// from the image's active artifact, a batch run always starts from the
/// untouched source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Chained,
    Batch,
}

/// Context object that flows through one pipeline invocation for one
/// image. Carries the input resolved up front, the stage outputs, and the
/// timings collected along the way.
#[derive(Debug, Clone)]
pub struct OperationContext {
    pub image_id: ImageId,
    pub mode: ExecutionMode,
    /// Settings captured when the run was invoked.
    pub settings: Settings,
    /// Resolved stage input; the report stage reuses it as-is.
    pub input: ImageHandle,
    pub edited: Option<EditOutcome>,
    pub report: Option<SubjectReport>,
    pub crops: Option<Vec<CropProposal>>,
    pub metrics: OperationMetrics,
    pub started: Instant,
}

impl OperationContext {
    pub fn new(
        image_id: ImageId,
        mode: ExecutionMode,
        settings: Settings,
        input: ImageHandle,
    ) -> Self {
        Self {
            image_id,
            mode,
            settings,
            input,
            edited: None,
            report: None,
            crops: None,
            metrics: OperationMetrics::default(),
            started: Instant::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Edit,
    Report,
    Crop,
}

/// Per-stage timings for one pipeline invocation.
#[derive(Debug, Clone, Default)]
pub struct OperationMetrics {
    pub edit_duration_us: u64,
    pub report_duration_us: u64,
    pub crop_duration_us: u64,
    pub total_duration_us: u64,
}

impl OperationMetrics {
    pub fn record_duration(&mut self, stage: PipelineStage, duration_us: u64) {
        match stage {
            PipelineStage::Edit => self.edit_duration_us = duration_us,
            PipelineStage::Report => self.report_duration_us = duration_us,
            PipelineStage::Crop => self.crop_duration_us = duration_us,
        }
    }

    pub fn finalize(&mut self, start_time: Instant) {
        self.total_duration_us = start_time.elapsed().as_micros() as u64;
    }
}
