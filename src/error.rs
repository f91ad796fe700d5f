use thiserror::Error;

use crate::studio::types::ImageId;

// Main application error type

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StudioError {
    #[error("Collaborator Error: {0}")]
    Collaborator(#[from] CollaboratorError),
    #[error("Session Error: {0}")]
    Session(#[from] SessionError),
    #[error("Preference Error: {0}")]
    Preference(#[from] PreferenceError),
    #[error("Configuration Error: {0}")]
    Configuration(String),
}

impl StudioError {
    /// True when the underlying cause is a credential rejection from the
    /// remote provider. The session reacts to this kind by downgrading its
    /// capability tier.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, StudioError::Collaborator(CollaboratorError::Auth(_)))
    }
}

/// Failure taxonomy for calls into the remote generative-AI collaborator.
/// The four kinds the session reacts to differently; everything else lands
/// in `Provider`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollaboratorError {
    #[error("Request blocked by the provider's safety policy: {0}")]
    PolicyBlocked(String),
    #[error("Provider returned no usable output: {0}")]
    NoOutputProduced(String),
    #[error("Could not reach the provider: {0}. Check your connection and try again.")]
    Transport(String),
    #[error("Provider rejected the credentials: {0}")]
    Auth(String),
    #[error("Provider Error: {0}")]
    Provider(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Unknown image: {0}")]
    UnknownImage(ImageId),
    #[error("No image selected")]
    NoImageSelected,
    #[error("Unsupported image data: {0}")]
    InvalidImage(String),
    #[error("Operation already in flight: {0}")]
    OperationInFlight(String),
    #[error("A collage needs at least {0} images")]
    NotEnoughImages(usize),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreferenceError {
    #[error("Failed to write preferences: {0}")]
    Write(String),
}
