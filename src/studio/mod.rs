pub mod orchestration;
pub mod services;
pub mod session;
pub mod types;

pub use orchestration::{BatchRunner, OperationSequencer};
pub use session::{CapabilityTier, FlowOutcome, StudioSession, StudioSessionBuilder};
