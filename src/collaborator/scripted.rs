//! Scripted collaborator double shared by the orchestration and session
//! tests: records every call, fails on scripted call indexes, and can
//! trigger a cancellation token while a call is "in flight".

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::collaborator::contract::{
    CollaboratorResult, CollageOutcome, CropCandidate, EditOutcome, FilterOutcome, MakerWorldPost,
    SocialPost, StudioCollaborator,
};
use crate::collaborator::dryrun::DryrunCollaborator;
use crate::error::CollaboratorError;
use crate::studio::types::{AspectRatio, ImageHandle, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum CallKind {
    Edit,
    Report,
    AutoCrop,
    Filter,
    Collage,
    SocialPosts,
    MakerWorldPost,
}

#[derive(Default)]
struct ScriptState {
    errors: HashMap<(CallKind, usize), CollaboratorError>,
    inputs: HashMap<CallKind, Vec<String>>,
    cancel_on: Option<(CallKind, CancellationToken)>,
}

#[derive(Default)]
pub(crate) struct ScriptedCollaborator {
    inner: DryrunCollaborator,
    state: Mutex<ScriptState>,
}

impl ScriptedCollaborator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fail the `index`-th call (0-based) of `kind` with `error`.
    pub(crate) fn fail_call(&self, kind: CallKind, index: usize, error: CollaboratorError) {
        self.state
            .lock()
            .unwrap()
            .errors
            .insert((kind, index), error);
    }

    /// Cancel `token` while the next call of `kind` is in flight.
    pub(crate) fn cancel_during(&self, kind: CallKind, token: CancellationToken) {
        self.state.lock().unwrap().cancel_on = Some((kind, token));
    }

    /// Input handles recorded for `kind`, in call order.
    pub(crate) fn inputs(&self, kind: CallKind) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .inputs
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn call_count(&self, kind: CallKind) -> usize {
        self.inputs(kind).len()
    }

    /// Records the call, fires any scripted cancellation, and returns the
    /// scripted error for this call index if one was set.
    fn enter(&self, kind: CallKind, input: String) -> Option<CollaboratorError> {
        let mut state = self.state.lock().unwrap();
        let calls = state.inputs.entry(kind).or_default();
        calls.push(input);
        let index = calls.len() - 1;
        if let Some((cancel_kind, token)) = &state.cancel_on {
            if *cancel_kind == kind {
                token.cancel();
            }
        }
        state.errors.remove(&(kind, index))
    }
}

#[async_trait]
impl StudioCollaborator for ScriptedCollaborator {
    async fn edit(
        &self,
        image: &ImageHandle,
        settings: &Settings,
    ) -> CollaboratorResult<EditOutcome> {
        if let Some(error) = self.enter(CallKind::Edit, image.as_str().to_string()) {
            return Err(error);
        }
        self.inner.edit(image, settings).await
    }

    async fn report(
        &self,
        image: &ImageHandle,
        settings: &Settings,
    ) -> CollaboratorResult<String> {
        if let Some(error) = self.enter(CallKind::Report, image.as_str().to_string()) {
            return Err(error);
        }
        self.inner.report(image, settings).await
    }

    async fn auto_crop(
        &self,
        image: &ImageHandle,
        ratios: &[AspectRatio],
    ) -> CollaboratorResult<Vec<CropCandidate>> {
        if let Some(error) = self.enter(CallKind::AutoCrop, image.as_str().to_string()) {
            return Err(error);
        }
        self.inner.auto_crop(image, ratios).await
    }

    async fn filter(
        &self,
        image: &ImageHandle,
        prompt: &str,
    ) -> CollaboratorResult<FilterOutcome> {
        if let Some(error) = self.enter(CallKind::Filter, image.as_str().to_string()) {
            return Err(error);
        }
        self.inner.filter(image, prompt).await
    }

    async fn collage(
        &self,
        images: &[ImageHandle],
        theme: &str,
    ) -> CollaboratorResult<CollageOutcome> {
        let joined = images
            .iter()
            .map(|handle| handle.as_str())
            .collect::<Vec<&str>>()
            .join("|");
        if let Some(error) = self.enter(CallKind::Collage, joined) {
            return Err(error);
        }
        self.inner.collage(images, theme).await
    }

    async fn social_posts(
        &self,
        image: &ImageHandle,
        context: &str,
        language: &str,
    ) -> CollaboratorResult<Vec<SocialPost>> {
        if let Some(error) = self.enter(CallKind::SocialPosts, language.to_string()) {
            return Err(error);
        }
        self.inner.social_posts(image, context, language).await
    }

    async fn maker_world_post(
        &self,
        image: &ImageHandle,
        context: &str,
        language: &str,
    ) -> CollaboratorResult<MakerWorldPost> {
        if let Some(error) = self.enter(CallKind::MakerWorldPost, language.to_string()) {
            return Err(error);
        }
        self.inner.maker_world_post(image, context, language).await
    }
}
