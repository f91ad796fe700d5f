use async_trait::async_trait;

use crate::error::CollaboratorError;
use crate::studio::types::{AspectRatio, ImageHandle, Settings};

pub type CollaboratorResult<T> = Result<T, CollaboratorError>;

/// Output of a remote edit call. `enhanced_theme` is only present for
/// themed-background edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    pub image: ImageHandle,
    pub enhanced_theme: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    pub image: ImageHandle,
    pub enhanced_prompt: String,
}

/// One auto-crop suggestion as returned by the collaborator. Candidates
/// whose local post-processing failed are already dropped from the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropCandidate {
    pub image: ImageHandle,
    pub aspect_ratio: AspectRatio,
    pub composition_score: u8,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollageOutcome {
    pub image: ImageHandle,
    pub enhanced_theme: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialPost {
    pub platform: String,
    pub content: String,
    pub music_suggestions: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MakerWorldPost {
    pub model_name: String,
    pub category: String,
    pub tags: Vec<String>,
    pub description: String,
    pub community_post: String,
}

/// The narrow request/response contract to the remote generative-AI
/// service. Transport, prompt construction, and response parsing live
/// behind this trait; the studio core only sequences the calls and stores
/// their outputs.
#[async_trait]
pub trait StudioCollaborator: Send + Sync {
    async fn edit(
        &self,
        image: &ImageHandle,
        settings: &Settings,
    ) -> CollaboratorResult<EditOutcome>;

    /// Returns a short description of the image's subject.
    async fn report(&self, image: &ImageHandle, settings: &Settings)
        -> CollaboratorResult<String>;

    /// An empty `ratios` slice yields an empty list, not an error.
    async fn auto_crop(
        &self,
        image: &ImageHandle,
        ratios: &[AspectRatio],
    ) -> CollaboratorResult<Vec<CropCandidate>>;

    async fn filter(&self, image: &ImageHandle, prompt: &str)
        -> CollaboratorResult<FilterOutcome>;

    async fn collage(
        &self,
        images: &[ImageHandle],
        theme: &str,
    ) -> CollaboratorResult<CollageOutcome>;

    async fn social_posts(
        &self,
        image: &ImageHandle,
        context: &str,
        language: &str,
    ) -> CollaboratorResult<Vec<SocialPost>>;

    async fn maker_world_post(
        &self,
        image: &ImageHandle,
        context: &str,
        language: &str,
    ) -> CollaboratorResult<MakerWorldPost>;
}
