pub mod contract;
pub mod dryrun;
#[cfg(test)]
pub(crate) mod scripted;

pub use contract::{
    CollaboratorResult, CollageOutcome, CropCandidate, EditOutcome, FilterOutcome, MakerWorldPost,
    SocialPost, StudioCollaborator,
};
pub use dryrun::DryrunCollaborator;
