use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::studio::types::settings::{AspectRatio, Settings};
use crate::studio::types::source_image::ImageHandle;

/// Score attached to proposals created by the local manual-crop action.
pub const MANUAL_CROP_SCORE: u8 = 100;
/// Rationale tag attached to proposals created by the local manual-crop action.
pub const MANUAL_CROP_RATIONALE: &str = "Manual crop";

/// Named artifact slot currently selected as the image's working view.
/// Whatever the tag resolves to feeds the next chained operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActiveView {
    #[default]
    Original,
    Cleaned,
    RemovedBg,
    ThemedBg,
    Filtered,
    Crops,
    Report,
}

/// A crop suggestion, either proposed by the remote collaborator or created
/// locally by the user. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropProposal {
    pub image: ImageHandle,
    pub aspect_ratio: AspectRatio,
    pub composition_score: u8,
    pub rationale: String,
}

impl CropProposal {
    pub fn manual(image: ImageHandle, aspect_ratio: AspectRatio) -> Self {
        Self {
            image,
            aspect_ratio,
            composition_score: MANUAL_CROP_SCORE,
            rationale: MANUAL_CROP_RATIONALE.to_string(),
        }
    }
}

/// Most recent processing summary for an image. Overwritten by each run,
/// never accumulated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectReport {
    pub subject_description: String,
    /// Settings captured when the producing run was invoked.
    pub settings: Settings,
    pub created_at: DateTime<Utc>,
}

/// All derived results for one source image.
///
/// `original` is seeded exactly once, lazily, the first time any artifact
/// is written for the image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSet {
    pub original: Option<ImageHandle>,
    pub cleaned: Option<ImageHandle>,
    pub removed_bg: Option<ImageHandle>,
    pub themed_bg: Option<ImageHandle>,
    pub filtered: Option<ImageHandle>,
    pub enhanced_theme: Option<String>,
    pub enhanced_filter_prompt: Option<String>,
    pub crop_proposals: Vec<CropProposal>,
    pub report: Option<SubjectReport>,
}

impl ArtifactSet {
    /// The concrete image stored under `view`, if any. `Crops` and `Report`
    /// carry no single renderable image and always return `None`.
    pub fn slot(&self, view: ActiveView) -> Option<&ImageHandle> {
        match view {
            ActiveView::Original => self.original.as_ref(),
            ActiveView::Cleaned => self.cleaned.as_ref(),
            ActiveView::RemovedBg => self.removed_bg.as_ref(),
            ActiveView::ThemedBg => self.themed_bg.as_ref(),
            ActiveView::Filtered => self.filtered.as_ref(),
            ActiveView::Crops | ActiveView::Report => None,
        }
    }

    fn is_filled(&self, view: ActiveView) -> bool {
        match view {
            ActiveView::Crops => !self.crop_proposals.is_empty(),
            ActiveView::Report => self.report.is_some(),
            other => self.slot(other).is_some(),
        }
    }

    /// Slots that went from empty to non-empty between `before` and `self`.
    pub fn diff_from(&self, before: &ArtifactSet) -> ArtifactDiff {
        const ALL: [ActiveView; 7] = [
            ActiveView::Original,
            ActiveView::Cleaned,
            ActiveView::RemovedBg,
            ActiveView::ThemedBg,
            ActiveView::Filtered,
            ActiveView::Crops,
            ActiveView::Report,
        ];
        ArtifactDiff {
            newly_filled: ALL
                .into_iter()
                .filter(|view| self.is_filled(*view) && !before.is_filled(*view))
                .collect(),
        }
    }
}

/// Before/after comparison of one image's artifact set. The active-view
/// auto-advance rule fires on these transitions only, so re-running the
/// same operation does not re-trigger a view switch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtifactDiff {
    pub newly_filled: Vec<ActiveView>,
}

/// Partial artifact write merged into an image's set by the store. Provided
/// fields fully replace prior values; crop proposals carry their own write
/// mode.
#[derive(Debug, Clone, Default)]
pub struct ArtifactPatch {
    pub cleaned: Option<ImageHandle>,
    pub removed_bg: Option<ImageHandle>,
    pub themed_bg: Option<ImageHandle>,
    pub filtered: Option<ImageHandle>,
    pub enhanced_theme: Option<String>,
    pub enhanced_filter_prompt: Option<String>,
    pub crops: Option<CropWrite>,
    pub report: Option<SubjectReport>,
}

/// The two write modes for crop proposals: an auto-crop run replaces the
/// whole sequence, a manual crop prepends one entry in front of it.
#[derive(Debug, Clone)]
pub enum CropWrite {
    Replace(Vec<CropProposal>),
    Prepend(CropProposal),
}
