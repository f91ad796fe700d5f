pub mod batch;
pub mod operation_context;
pub mod sequencer;

pub use batch::{BatchOutcome, BatchRunner};
pub use operation_context::{ExecutionMode, OperationContext, OperationMetrics, PipelineStage};
pub use sequencer::{OperationSequencer, RunOutcome};
