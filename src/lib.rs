pub mod collaborator;
pub mod config;
pub mod error;
pub mod prefs;
pub mod studio;

pub use error::{CollaboratorError, PreferenceError, SessionError, StudioError};

pub use collaborator::{DryrunCollaborator, StudioCollaborator};
pub use config::Configuration;
pub use prefs::PreferenceStore;
pub use studio::session::{CapabilityTier, FlowOutcome, StudioSession, StudioSessionBuilder};
pub use studio::types::{
    ActiveView, ArtifactSet, AspectRatio, CropProposal, EditMode, ImageHandle, ImageId, Settings,
    SourceImage,
};
