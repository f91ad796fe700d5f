use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;

use crate::collaborator::contract::{
    CollaboratorResult, CollageOutcome, CropCandidate, EditOutcome, FilterOutcome, MakerWorldPost,
    SocialPost, StudioCollaborator,
};
use crate::studio::types::{AspectRatio, EditMode, ImageHandle, Settings};

/// Offline stand-in for the remote generative-AI service. Fabricates
/// deterministic placeholder outputs so the full pipeline can run without
/// network access; used by the demo binary and the test suite.
#[derive(Debug, Clone, Default)]
pub struct DryrunCollaborator;

impl DryrunCollaborator {
    pub fn new() -> Self {
        Self
    }

    fn fingerprint(input: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        input.hash(&mut hasher);
        hasher.finish()
    }

    fn result_url(kind: &str, detail: &str, input: &ImageHandle) -> ImageHandle {
        ImageHandle::new(format!(
            "dryrun://{}/{}/{:016x}",
            kind,
            detail,
            Self::fingerprint(input.as_str())
        ))
    }

    fn mode_slug(mode: EditMode) -> &'static str {
        match mode {
            EditMode::CleanupOnly => "cleanup",
            EditMode::RemoveBg => "remove-bg",
            EditMode::ThemedBg => "themed-bg",
        }
    }
}

#[async_trait]
impl StudioCollaborator for DryrunCollaborator {
    async fn edit(
        &self,
        image: &ImageHandle,
        settings: &Settings,
    ) -> CollaboratorResult<EditOutcome> {
        let enhanced_theme = match settings.mode {
            EditMode::ThemedBg => {
                let theme = if settings.theme.is_empty() {
                    "neutral studio"
                } else {
                    settings.theme.as_str()
                };
                Some(format!("{theme} with soft, even lighting"))
            }
            _ => None,
        };
        Ok(EditOutcome {
            image: Self::result_url("edit", Self::mode_slug(settings.mode), image),
            enhanced_theme,
        })
    }

    async fn report(
        &self,
        image: &ImageHandle,
        _settings: &Settings,
    ) -> CollaboratorResult<String> {
        Ok(format!(
            "Placeholder subject ({:08x})",
            Self::fingerprint(image.as_str()) as u32
        ))
    }

    async fn auto_crop(
        &self,
        image: &ImageHandle,
        ratios: &[AspectRatio],
    ) -> CollaboratorResult<Vec<CropCandidate>> {
        Ok(ratios
            .iter()
            .enumerate()
            .map(|(index, ratio)| CropCandidate {
                image: Self::result_url("crop", ratio.label(), image),
                aspect_ratio: *ratio,
                composition_score: 92u8.saturating_sub(7 * index as u8),
                rationale: format!("Balanced framing at {}", ratio.label()),
            })
            .collect())
    }

    async fn filter(
        &self,
        image: &ImageHandle,
        prompt: &str,
    ) -> CollaboratorResult<FilterOutcome> {
        Ok(FilterOutcome {
            image: Self::result_url("filter", "custom", image),
            enhanced_prompt: format!("{prompt}, high detail, balanced tones"),
        })
    }

    async fn collage(
        &self,
        images: &[ImageHandle],
        theme: &str,
    ) -> CollaboratorResult<CollageOutcome> {
        let combined = images
            .iter()
            .map(|handle| handle.as_str())
            .collect::<Vec<&str>>()
            .join("|");
        Ok(CollageOutcome {
            image: Self::result_url("collage", "grid", &ImageHandle::new(combined)),
            enhanced_theme: format!("{theme} collage"),
        })
    }

    async fn social_posts(
        &self,
        _image: &ImageHandle,
        context: &str,
        language: &str,
    ) -> CollaboratorResult<Vec<SocialPost>> {
        Ok(vec![
            SocialPost {
                platform: "instagram".to_string(),
                content: format!("[{language}] {context}"),
                music_suggestions: Some(vec!["Lo-fi morning".to_string()]),
            },
            SocialPost {
                platform: "x".to_string(),
                content: format!("[{language}] {context}"),
                music_suggestions: None,
            },
        ])
    }

    async fn maker_world_post(
        &self,
        _image: &ImageHandle,
        context: &str,
        language: &str,
    ) -> CollaboratorResult<MakerWorldPost> {
        Ok(MakerWorldPost {
            model_name: format!("[{language}] {context}"),
            category: "3D Printing".to_string(),
            tags: vec!["studio".to_string(), "photo".to_string()],
            description: context.to_string(),
            community_post: format!("[{language}] Sharing a new make: {context}"),
        })
    }
}
