mod artifact;
mod settings;
mod source_image;

pub use artifact::{
    ActiveView, ArtifactDiff, ArtifactPatch, ArtifactSet, CropProposal, CropWrite, SubjectReport,
    MANUAL_CROP_RATIONALE, MANUAL_CROP_SCORE,
};
pub use settings::{AspectRatio, EditMode, Settings};
pub use source_image::{ImageHandle, ImageId, SourceImage};
