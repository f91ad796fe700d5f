use indexmap::IndexMap;

use crate::studio::types::{
    ArtifactDiff, ArtifactPatch, ArtifactSet, CropWrite, ImageId, SourceImage,
};

/// Per-image map of derived results, keyed by the opaque upload id and kept
/// in upload order.
///
/// Writes are merges: fields present in the patch replace prior values,
/// absent fields are left alone. The only deletion is a whole-store reset.
#[derive(Debug, Clone, Default)]
pub struct ArtifactStore {
    sets: IndexMap<ImageId, ArtifactSet>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ImageId) -> Option<&ArtifactSet> {
        self.sets.get(&id)
    }

    pub fn sets(&self) -> &IndexMap<ImageId, ArtifactSet> {
        &self.sets
    }

    /// Merges `patch` into the image's artifact set, creating the set on
    /// first write. Seeding happens here: the first artifact written for an
    /// image also caches the renderable form of its source as `original`,
    /// exactly once.
    ///
    /// Returns which slots went from empty to non-empty, for the
    /// active-view auto-advance rule.
    pub fn upsert(&mut self, source: &SourceImage, patch: ArtifactPatch) -> ArtifactDiff {
        let set = self.sets.entry(source.id).or_default();
        let before = set.clone();

        if set.original.is_none() {
            set.original = Some(source.handle());
        }
        if let Some(cleaned) = patch.cleaned {
            set.cleaned = Some(cleaned);
        }
        if let Some(removed_bg) = patch.removed_bg {
            set.removed_bg = Some(removed_bg);
        }
        if let Some(themed_bg) = patch.themed_bg {
            set.themed_bg = Some(themed_bg);
        }
        if let Some(filtered) = patch.filtered {
            set.filtered = Some(filtered);
        }
        if let Some(enhanced_theme) = patch.enhanced_theme {
            set.enhanced_theme = Some(enhanced_theme);
        }
        if let Some(enhanced_filter_prompt) = patch.enhanced_filter_prompt {
            set.enhanced_filter_prompt = Some(enhanced_filter_prompt);
        }
        match patch.crops {
            Some(CropWrite::Replace(proposals)) => set.crop_proposals = proposals,
            Some(CropWrite::Prepend(proposal)) => set.crop_proposals.insert(0, proposal),
            None => {}
        }
        if let Some(report) = patch.report {
            set.report = Some(report);
        }

        let diff = set.diff_from(&before);
        tracing::debug!(
            "Artifact write for image {}: newly filled {:?}",
            source.id,
            diff.newly_filled
        );
        diff
    }

    /// Replaces every artifact set wholesale, used when undo restores a
    /// history snapshot.
    pub fn restore(&mut self, sets: IndexMap<ImageId, ArtifactSet>) {
        self.sets = sets;
    }

    pub fn reset(&mut self) {
        self.sets.clear();
    }
}
