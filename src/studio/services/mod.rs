pub mod active_view;
pub mod history;
pub mod registry;
pub mod store;

pub use active_view::{best_available, ActiveViewSelector, AUTO_ADVANCE_PRIORITY};
pub use history::{HistoryEntry, HistorySnapshotter};
pub use registry::{OperationKind, OperationRegistry};
pub use store::ArtifactStore;
