use std::collections::HashMap;
use std::fmt;

use tokio_util::sync::CancellationToken;

use crate::error::SessionError;

/// Kinds of user-triggered flows the session tracks. Pipeline kinds mutate
/// the image-edit chain and exclude each other; side flows touch disjoint
/// state and only exclude a second start of themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Edit,
    Batch,
    Filter,
    Collage,
    SocialPosts,
    MakerWorldPost,
}

impl OperationKind {
    fn is_pipeline(&self) -> bool {
        matches!(
            self,
            OperationKind::Edit | OperationKind::Batch | OperationKind::Filter
        )
    }

    fn conflicts_with(&self, other: OperationKind) -> bool {
        if self.is_pipeline() && other.is_pipeline() {
            return true;
        }
        *self == other
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Edit => "edit",
            OperationKind::Batch => "batch",
            OperationKind::Filter => "filter",
            OperationKind::Collage => "collage",
            OperationKind::SocialPosts => "social-posts",
            OperationKind::MakerWorldPost => "makerworld-post",
        };
        f.write_str(name)
    }
}

/// Registry of in-flight flows. Each start gets its own cancellation
/// token; cancellation is cooperative, checked by the flow at its stage
/// boundaries.
#[derive(Debug, Default)]
pub struct OperationRegistry {
    in_flight: HashMap<OperationKind, CancellationToken>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `kind` as in flight and returns its cancellation token,
    /// or rejects the start when a conflicting flow is already running.
    pub fn begin(&mut self, kind: OperationKind) -> Result<CancellationToken, SessionError> {
        if let Some(active) = self
            .in_flight
            .keys()
            .find(|active| active.conflicts_with(kind))
        {
            return Err(SessionError::OperationInFlight(active.to_string()));
        }
        let token = CancellationToken::new();
        self.in_flight.insert(kind, token.clone());
        Ok(token)
    }

    pub fn finish(&mut self, kind: OperationKind) {
        self.in_flight.remove(&kind);
    }

    /// Raises the cancellation flag for an in-flight flow. The flow stays
    /// registered until it observes the flag and calls `finish`.
    pub fn cancel(&mut self, kind: OperationKind) {
        if let Some(token) = self.in_flight.get(&kind) {
            tracing::info!("Cancellation requested for {} flow", kind);
            token.cancel();
        }
    }

    pub fn is_in_flight(&self, kind: OperationKind) -> bool {
        self.in_flight.contains_key(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_kinds_exclude_each_other() {
        let mut registry = OperationRegistry::new();
        let _token = registry.begin(OperationKind::Edit).unwrap();

        assert!(registry.begin(OperationKind::Batch).is_err());
        assert!(registry.begin(OperationKind::Filter).is_err());
        assert!(registry.begin(OperationKind::Edit).is_err());
    }

    #[test]
    fn test_side_flows_run_alongside_the_pipeline() {
        let mut registry = OperationRegistry::new();
        let _edit = registry.begin(OperationKind::Edit).unwrap();
        let _collage = registry.begin(OperationKind::Collage).unwrap();
        let _social = registry.begin(OperationKind::SocialPosts).unwrap();

        // But a side flow cannot overlap itself.
        assert!(registry.begin(OperationKind::Collage).is_err());
    }

    #[test]
    fn test_finish_releases_the_kind() {
        let mut registry = OperationRegistry::new();
        let _token = registry.begin(OperationKind::Edit).unwrap();
        registry.finish(OperationKind::Edit);

        assert!(!registry.is_in_flight(OperationKind::Edit));
        assert!(registry.begin(OperationKind::Filter).is_ok());
    }

    #[test]
    fn test_cancel_flags_the_token_but_keeps_the_entry() {
        let mut registry = OperationRegistry::new();
        let token = registry.begin(OperationKind::Batch).unwrap();
        registry.cancel(OperationKind::Batch);

        assert!(token.is_cancelled());
        assert!(registry.is_in_flight(OperationKind::Batch));
    }
}
