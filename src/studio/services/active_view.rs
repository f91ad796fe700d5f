use crate::studio::types::{ActiveView, ArtifactDiff, ArtifactSet, ImageHandle, SourceImage};

/// Fixed precedence for the auto-advance rule, as a (slot, rank) table so
/// the order is inspectable and testable. Higher rank wins; slots missing
/// from the table never trigger an advance.
pub const AUTO_ADVANCE_PRIORITY: [(ActiveView, u8); 4] = [
    (ActiveView::Filtered, 3),
    (ActiveView::ThemedBg, 2),
    (ActiveView::Cleaned, 1),
    (ActiveView::RemovedBg, 0),
];

fn rank(view: ActiveView) -> Option<u8> {
    AUTO_ADVANCE_PRIORITY
        .iter()
        .find(|(slot, _)| *slot == view)
        .map(|(_, rank)| *rank)
}

/// Tracks which artifact slot is the working view for the currently
/// selected image, and resolves that tag to the concrete input of the next
/// chained operation.
#[derive(Debug, Clone, Default)]
pub struct ActiveViewSelector {
    active: ActiveView,
}

impl ActiveViewSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> ActiveView {
        self.active
    }

    pub fn set_active(&mut self, view: ActiveView) {
        self.active = view;
    }

    /// Back to `Original`; used when the selected image changes or its
    /// artifact set disappears.
    pub fn reset(&mut self) {
        self.active = ActiveView::Original;
    }

    /// Applies the auto-advance rule after an artifact write for the
    /// currently viewed image: of the slots that just transitioned from
    /// empty to non-empty, the highest-ranked one becomes the active view.
    /// Returns true when the view changed.
    pub fn auto_advance(&mut self, diff: &ArtifactDiff) -> bool {
        let advanced = diff
            .newly_filled
            .iter()
            .filter_map(|view| rank(*view).map(|rank| (rank, *view)))
            .max_by_key(|(rank, _)| *rank)
            .map(|(_, view)| view);

        match advanced {
            Some(view) if view != self.active => {
                tracing::debug!("Active view advanced to {:?}", view);
                self.active = view;
                true
            }
            _ => false,
        }
    }

    /// The concrete image the active tag points at. Falls back to the
    /// source's renderable form when the tagged slot is empty; it never
    /// substitutes a different non-empty slot.
    pub fn resolve_input(&self, source: &SourceImage, set: Option<&ArtifactSet>) -> ImageHandle {
        set.and_then(|set| set.slot(self.active))
            .or_else(|| set.and_then(|set| set.original.as_ref()))
            .cloned()
            .unwrap_or_else(|| source.handle())
    }
}

/// The richest artifact available for an image under the same precedence
/// as the auto-advance table, falling back to the source. Used where a
/// flow needs a working image for a non-current image (collage inputs).
pub fn best_available(source: &SourceImage, set: Option<&ArtifactSet>) -> ImageHandle {
    let Some(set) = set else {
        return source.handle();
    };
    AUTO_ADVANCE_PRIORITY
        .iter()
        .filter_map(|(view, _)| set.slot(*view))
        .next()
        .or(set.original.as_ref())
        .cloned()
        .unwrap_or_else(|| source.handle())
}
