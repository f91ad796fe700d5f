use std::sync::Arc;

use image::GenericImageView;
use indexmap::IndexMap;
use tokio_util::sync::CancellationToken;

use crate::collaborator::{CollageOutcome, MakerWorldPost, SocialPost, StudioCollaborator};
use crate::config::Configuration;
use crate::error::{SessionError, StudioError};
use crate::prefs::{PreferenceStore, MAKER_WORLD_LANGUAGE, SOCIAL_LANGUAGE};
use crate::studio::orchestration::{
    BatchOutcome, BatchRunner, ExecutionMode, OperationSequencer, RunOutcome,
};
use crate::studio::services::{
    best_available, ActiveViewSelector, ArtifactStore, HistoryEntry, HistorySnapshotter,
    OperationKind, OperationRegistry,
};
use crate::studio::types::{
    ActiveView, ArtifactPatch, ArtifactSet, AspectRatio, CropProposal, CropWrite, ImageHandle,
    ImageId, Settings, SourceImage,
};

/// Which provider tier the session currently operates on. A rejected
/// credential downgrades to `Free` for the rest of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityTier {
    Free,
    Premium,
}

/// Completed-or-cancelled result of a user-triggered flow. Cancellation is
/// cooperative and never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
    Completed,
    Cancelled,
}

pub struct StudioSessionBuilder {
    configuration: Configuration,
    collaborator: Option<Arc<dyn StudioCollaborator>>,
    preferences: Option<PreferenceStore>,
    tier: CapabilityTier,
}

impl StudioSessionBuilder {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            collaborator: None,
            preferences: None,
            tier: CapabilityTier::Premium,
        }
    }

    pub fn collaborator(mut self, collaborator: Arc<dyn StudioCollaborator>) -> Self {
        self.collaborator = Some(collaborator);
        self
    }

    pub fn preferences(mut self, preferences: PreferenceStore) -> Self {
        self.preferences = Some(preferences);
        self
    }

    pub fn tier(mut self, tier: CapabilityTier) -> Self {
        self.tier = tier;
        self
    }

    pub fn build(self) -> Result<StudioSession, StudioError> {
        let collaborator = self
            .collaborator
            .ok_or_else(|| StudioError::Configuration("Collaborator not set".to_string()))?;
        let preferences = self.preferences.unwrap_or_else(|| {
            match &self.configuration.preferences_path {
                Some(path) => PreferenceStore::load(path.clone()),
                None => PreferenceStore::in_memory(),
            }
        });
        Ok(StudioSession::new(
            self.configuration,
            collaborator,
            preferences,
            self.tier,
        ))
    }
}

/// Owns the whole per-session state of the studio: uploaded sources, the
/// artifact store, the active-view selector, the undo history, operation
/// settings, and the in-flight registry. All mutations funnel through
/// here so the history push and the active-view re-evaluation cannot be
/// skipped by a call site.
pub struct StudioSession {
    configuration: Configuration,
    collaborator: Arc<dyn StudioCollaborator>,
    sequencer: OperationSequencer,
    images: IndexMap<ImageId, SourceImage>,
    store: ArtifactStore,
    selector: ActiveViewSelector,
    history: HistorySnapshotter,
    registry: OperationRegistry,
    settings: Settings,
    filter_selection: Option<String>,
    current: Option<ImageId>,
    surfaced_error: Option<StudioError>,
    initial_tier: CapabilityTier,
    tier: CapabilityTier,
    preferences: PreferenceStore,
    collage: Option<CollageOutcome>,
    social_posts: Vec<SocialPost>,
    maker_world_post: Option<MakerWorldPost>,
}

impl StudioSession {
    fn new(
        configuration: Configuration,
        collaborator: Arc<dyn StudioCollaborator>,
        preferences: PreferenceStore,
        tier: CapabilityTier,
    ) -> Self {
        let history = HistorySnapshotter::new(configuration.history_limit);
        Self {
            sequencer: OperationSequencer::new(collaborator.clone()),
            configuration,
            collaborator,
            images: IndexMap::new(),
            store: ArtifactStore::new(),
            selector: ActiveViewSelector::new(),
            history,
            registry: OperationRegistry::new(),
            settings: Settings::default(),
            filter_selection: None,
            current: None,
            surfaced_error: None,
            initial_tier: tier,
            tier,
            preferences,
            collage: None,
            social_posts: Vec::new(),
            maker_world_post: None,
        }
    }

    // ---- uploads and selection ----

    /// Registers an uploaded binary. The returned id, not the file name,
    /// identifies the image everywhere; duplicate file names are fine.
    pub fn upload(&mut self, file_name: &str, bytes: Vec<u8>) -> Result<ImageId, StudioError> {
        let format =
            image::guess_format(&bytes).map_err(|e| SessionError::InvalidImage(e.to_string()))?;
        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| SessionError::InvalidImage(e.to_string()))?;
        let (width, height) = decoded.dimensions();

        let source = SourceImage::new(file_name, format.to_mime_type(), bytes, width, height);
        let id = source.id;
        tracing::info!("Uploaded {} as image {} ({}x{})", file_name, id, width, height);
        self.images.insert(id, source);
        if self.current.is_none() {
            self.current = Some(id);
        }
        Ok(id)
    }

    /// Moves the current-image cursor. Switching images drops the view
    /// back to `Original`; only undo restores a different tag.
    pub fn select_image(&mut self, id: ImageId) -> Result<(), StudioError> {
        if !self.images.contains_key(&id) {
            return Err(SessionError::UnknownImage(id).into());
        }
        if self.current != Some(id) {
            self.current = Some(id);
            self.selector.reset();
        }
        Ok(())
    }

    pub fn images(&self) -> impl Iterator<Item = &SourceImage> {
        self.images.values()
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn current_image(&self) -> Option<&SourceImage> {
        self.current.and_then(|id| self.images.get(&id))
    }

    pub fn artifacts(&self, id: ImageId) -> Option<&ArtifactSet> {
        self.store.get(id)
    }

    // ---- view, settings, preferences ----

    pub fn active_view(&self) -> ActiveView {
        self.selector.active()
    }

    pub fn set_active_view(&mut self, view: ActiveView) {
        self.selector.set_active(view);
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn filter_selection(&self) -> Option<&str> {
        self.filter_selection.as_deref()
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    pub fn preferences_mut(&mut self) -> &mut PreferenceStore {
        &mut self.preferences
    }

    pub fn tier(&self) -> CapabilityTier {
        self.tier
    }

    // ---- error surface ----

    /// The most recent surfaced failure, if the user has not dismissed it.
    pub fn surfaced_error(&self) -> Option<&StudioError> {
        self.surfaced_error.as_ref()
    }

    pub fn dismiss_error(&mut self) {
        self.surfaced_error = None;
    }

    fn surface(&mut self, error: StudioError) {
        if error.is_auth_failure() && self.tier == CapabilityTier::Premium {
            tracing::warn!("Credential rejected; session falls back to the free tier");
            self.tier = CapabilityTier::Free;
        }
        tracing::error!("{}", error);
        self.surfaced_error = Some(error);
    }

    // ---- history ----

    fn snapshot(&self) -> HistoryEntry {
        HistoryEntry {
            artifacts: self.store.sets().clone(),
            active_view: self.selector.active(),
            settings: self.settings.clone(),
            filter_selection: self.filter_selection.clone(),
        }
    }

    /// Single entry point for undoable flows: gates on the in-flight
    /// registry, then records the pre-mutation snapshot exactly once.
    fn begin_undoable(&mut self, kind: OperationKind) -> Result<CancellationToken, StudioError> {
        let token = self.registry.begin(kind)?;
        self.history.push(self.snapshot());
        Ok(token)
    }

    /// Restores the previous snapshot wholesale. Returns false when there
    /// is nothing to undo; that is a no-op, not an error.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(entry) => {
                self.store.restore(entry.artifacts);
                self.selector.set_active(entry.active_view);
                self.settings = entry.settings;
                self.filter_selection = entry.filter_selection;
                tracing::info!("Restored previous studio state");
                true
            }
            None => false,
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.history.len()
    }

    // ---- pipeline flows ----

    /// Chained single-image run: the active artifact feeds the pipeline,
    /// and the pre-run state becomes an undo point even if a stage fails.
    pub async fn run_current(&mut self) -> Result<FlowOutcome, StudioError> {
        let source = self.current_source()?.clone();
        let token = self.begin_undoable(OperationKind::Edit)?;
        let settings = self.settings.clone();

        let result = self
            .sequencer
            .run(
                &source,
                &settings,
                ExecutionMode::Chained,
                &mut self.store,
                &mut self.selector,
                &token,
            )
            .await;
        self.registry.finish(OperationKind::Edit);

        match result {
            Ok(RunOutcome::Completed(_)) => Ok(FlowOutcome::Completed),
            Ok(RunOutcome::Cancelled) => Ok(FlowOutcome::Cancelled),
            Err(_) if token.is_cancelled() => Ok(FlowOutcome::Cancelled),
            Err(error) => {
                self.surface(error.clone());
                Err(error)
            }
        }
    }

    /// Batch run over every image in upload order. Records no history and
    /// always feeds each image's untouched source; the first failure halts
    /// the whole batch.
    pub async fn run_batch(&mut self) -> Result<FlowOutcome, StudioError> {
        if self.images.is_empty() {
            return Err(SessionError::NoImageSelected.into());
        }
        let token = self.registry.begin(OperationKind::Batch)?;
        let settings = self.settings.clone();
        let images = self.images.values().cloned().collect::<Vec<SourceImage>>();

        let runner = BatchRunner::new(&self.sequencer);
        let result = runner
            .run(
                &images,
                &settings,
                &mut self.store,
                &mut self.selector,
                &mut self.current,
                &token,
            )
            .await;
        self.registry.finish(OperationKind::Batch);

        match result {
            Ok(BatchOutcome::Completed { .. }) => Ok(FlowOutcome::Completed),
            Ok(BatchOutcome::Cancelled { .. }) => Ok(FlowOutcome::Cancelled),
            Err(_) if token.is_cancelled() => Ok(FlowOutcome::Cancelled),
            Err(error) => {
                self.surface(error.clone());
                Err(error)
            }
        }
    }

    /// Applies a custom filter to the active artifact. Undoable like a
    /// chained run; independent of the edit mode.
    pub async fn apply_filter(&mut self, prompt: &str) -> Result<FlowOutcome, StudioError> {
        let source = self.current_source()?.clone();
        let token = self.begin_undoable(OperationKind::Filter)?;
        let input = self.selector.resolve_input(&source, self.store.get(source.id));

        let result = self.collaborator.filter(&input, prompt).await;
        self.registry.finish(OperationKind::Filter);
        if token.is_cancelled() {
            tracing::info!("Filter result discarded after cancel");
            return Ok(FlowOutcome::Cancelled);
        }

        match result {
            Ok(outcome) => {
                self.filter_selection = Some(prompt.to_string());
                let diff = self.store.upsert(
                    &source,
                    ArtifactPatch {
                        filtered: Some(outcome.image),
                        enhanced_filter_prompt: Some(outcome.enhanced_prompt),
                        ..ArtifactPatch::default()
                    },
                );
                self.selector.auto_advance(&diff);
                Ok(FlowOutcome::Completed)
            }
            Err(error) => {
                let error = StudioError::from(error);
                self.surface(error.clone());
                Err(error)
            }
        }
    }

    /// Local crop action: prepends one proposal in front of whatever the
    /// last auto-crop run left, without clearing it.
    pub fn add_manual_crop(
        &mut self,
        aspect_ratio: AspectRatio,
        image: ImageHandle,
    ) -> Result<(), StudioError> {
        let source = self.current_source()?.clone();
        let diff = self.store.upsert(
            &source,
            ArtifactPatch {
                crops: Some(CropWrite::Prepend(CropProposal::manual(
                    image,
                    aspect_ratio,
                ))),
                ..ArtifactPatch::default()
            },
        );
        self.selector.auto_advance(&diff);
        Ok(())
    }

    /// Raises the cancellation flag for an in-flight flow.
    pub fn cancel(&mut self, kind: OperationKind) {
        self.registry.cancel(kind);
    }

    pub fn is_in_flight(&self, kind: OperationKind) -> bool {
        self.registry.is_in_flight(kind)
    }

    // ---- side flows ----

    /// Builds a collage from every uploaded image. The current image
    /// contributes its active artifact, the others their richest one. The
    /// result lives on the session, outside the image-edit chain, so no
    /// history is recorded.
    pub async fn create_collage(&mut self, theme: &str) -> Result<FlowOutcome, StudioError> {
        if self.images.len() < self.configuration.collage_min_images {
            return Err(
                SessionError::NotEnoughImages(self.configuration.collage_min_images).into(),
            );
        }
        let token = self.registry.begin(OperationKind::Collage)?;
        let inputs = self
            .images
            .values()
            .map(|source| {
                if Some(source.id) == self.current {
                    self.selector.resolve_input(source, self.store.get(source.id))
                } else {
                    best_available(source, self.store.get(source.id))
                }
            })
            .collect::<Vec<ImageHandle>>();

        let result = self.collaborator.collage(&inputs, theme).await;
        self.registry.finish(OperationKind::Collage);
        if token.is_cancelled() {
            return Ok(FlowOutcome::Cancelled);
        }

        match result {
            Ok(outcome) => {
                self.collage = Some(outcome);
                Ok(FlowOutcome::Completed)
            }
            Err(error) => {
                let error = StudioError::from(error);
                self.surface(error.clone());
                Err(error)
            }
        }
    }

    pub async fn generate_social_posts(
        &mut self,
        context: &str,
    ) -> Result<FlowOutcome, StudioError> {
        let source = self.current_source()?.clone();
        let token = self.registry.begin(OperationKind::SocialPosts)?;
        let input = self.selector.resolve_input(&source, self.store.get(source.id));
        let language = self.preferences.language(SOCIAL_LANGUAGE).to_string();

        let result = self.collaborator.social_posts(&input, context, &language).await;
        self.registry.finish(OperationKind::SocialPosts);
        if token.is_cancelled() {
            return Ok(FlowOutcome::Cancelled);
        }

        match result {
            Ok(posts) => {
                self.social_posts = posts;
                Ok(FlowOutcome::Completed)
            }
            Err(error) => {
                let error = StudioError::from(error);
                self.surface(error.clone());
                Err(error)
            }
        }
    }

    pub async fn generate_maker_world_post(
        &mut self,
        context: &str,
    ) -> Result<FlowOutcome, StudioError> {
        let source = self.current_source()?.clone();
        let token = self.registry.begin(OperationKind::MakerWorldPost)?;
        let input = self.selector.resolve_input(&source, self.store.get(source.id));
        let language = self.preferences.language(MAKER_WORLD_LANGUAGE).to_string();

        let result = self
            .collaborator
            .maker_world_post(&input, context, &language)
            .await;
        self.registry.finish(OperationKind::MakerWorldPost);
        if token.is_cancelled() {
            return Ok(FlowOutcome::Cancelled);
        }

        match result {
            Ok(post) => {
                self.maker_world_post = Some(post);
                Ok(FlowOutcome::Completed)
            }
            Err(error) => {
                let error = StudioError::from(error);
                self.surface(error.clone());
                Err(error)
            }
        }
    }

    pub fn collage(&self) -> Option<&CollageOutcome> {
        self.collage.as_ref()
    }

    pub fn social_posts(&self) -> &[SocialPost] {
        &self.social_posts
    }

    pub fn maker_world_post(&self) -> Option<&MakerWorldPost> {
        self.maker_world_post.as_ref()
    }

    // ---- lifecycle ----

    /// Full session reset: the only way sources and artifacts are ever
    /// deleted.
    pub fn reset(&mut self) {
        self.images.clear();
        self.store.reset();
        self.selector.reset();
        self.history.clear();
        self.settings = Settings::default();
        self.filter_selection = None;
        self.current = None;
        self.surfaced_error = None;
        self.collage = None;
        self.social_posts.clear();
        self.maker_world_post = None;
        self.tier = self.initial_tier;
        tracing::info!("Session reset");
    }

    fn current_source(&self) -> Result<&SourceImage, StudioError> {
        let id = self.current.ok_or(SessionError::NoImageSelected)?;
        self.images
            .get(&id)
            .ok_or_else(|| SessionError::UnknownImage(id).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::scripted::{CallKind, ScriptedCollaborator};
    use crate::error::CollaboratorError;
    use crate::studio::types::EditMode;
    use indexmap::IndexSet;
    use serde_json::Value;

    fn png_bytes() -> Vec<u8> {
        let pixels = image::RgbImage::from_pixel(4, 4, image::Rgb([120, 90, 60]));
        let mut out = Vec::new();
        image::DynamicImage::ImageRgb8(pixels)
            .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
            .expect("Failed to encode test image");
        out
    }

    fn session_with(collaborator: Arc<ScriptedCollaborator>) -> StudioSession {
        StudioSessionBuilder::new(Configuration::default())
            .collaborator(collaborator)
            .preferences(PreferenceStore::in_memory())
            .build()
            .expect("Failed to build session")
    }

    fn scripted_session() -> (Arc<ScriptedCollaborator>, StudioSession) {
        let collaborator = Arc::new(ScriptedCollaborator::new());
        let session = session_with(collaborator.clone());
        (collaborator, session)
    }

    #[test]
    fn test_builder_requires_a_collaborator() {
        let result = StudioSessionBuilder::new(Configuration::default()).build();
        assert!(matches!(result, Err(StudioError::Configuration(_))));
    }

    #[test]
    fn test_duplicate_file_names_stay_distinct() {
        let (_, mut session) = scripted_session();
        let first = session.upload("cat.jpg", png_bytes()).unwrap();
        let second = session.upload("cat.jpg", png_bytes()).unwrap();

        assert_ne!(first, second);
        assert_eq!(session.image_count(), 2);
        assert_eq!(session.current_image().unwrap().id, first);
    }

    #[test]
    fn test_upload_rejects_non_image_data() {
        let (_, mut session) = scripted_session();
        let result = session.upload("notes.txt", b"plain text".to_vec());
        assert!(matches!(
            result,
            Err(StudioError::Session(SessionError::InvalidImage(_)))
        ));
    }

    #[tokio::test]
    async fn test_single_image_scenario_with_filter_and_undo() {
        let (_, mut session) = scripted_session();
        let id = session.upload("cat.jpg", png_bytes()).unwrap();
        {
            let settings = session.settings_mut();
            settings.mode = EditMode::RemoveBg;
            settings.auto_crop = true;
            settings.aspect_ratios = IndexSet::from([AspectRatio::Square]);
        }

        let outcome = session.run_current().await.unwrap();
        assert_eq!(outcome, FlowOutcome::Completed);

        let set = session.artifacts(id).unwrap();
        assert!(set.removed_bg.is_some());
        assert!(set.report.is_some());
        assert_eq!(set.crop_proposals.len(), 1);
        assert_eq!(set.crop_proposals[0].aspect_ratio, AspectRatio::Square);
        assert_eq!(session.active_view(), ActiveView::RemovedBg);

        session.apply_filter("sepia tone").await.unwrap();
        let set = session.artifacts(id).unwrap();
        assert!(set.filtered.is_some());
        assert!(set
            .enhanced_filter_prompt
            .as_deref()
            .unwrap()
            .contains("sepia tone"));
        assert_eq!(session.active_view(), ActiveView::Filtered);
        assert_eq!(session.filter_selection(), Some("sepia tone"));

        assert!(session.undo());
        let set = session.artifacts(id).unwrap();
        assert!(set.filtered.is_none());
        assert!(set.removed_bg.is_some());
        assert_eq!(session.active_view(), ActiveView::RemovedBg);
        assert_eq!(session.filter_selection(), None);
    }

    #[tokio::test]
    async fn test_chained_runs_feed_the_previous_output() {
        let (collaborator, mut session) = scripted_session();
        session.upload("cat.jpg", png_bytes()).unwrap();

        session.run_current().await.unwrap();
        session.settings_mut().mode = EditMode::ThemedBg;
        session.run_current().await.unwrap();

        let edit_inputs = collaborator.inputs(CallKind::Edit);
        assert_eq!(edit_inputs.len(), 2);
        // The second edit consumed the first one's output, not the source.
        assert!(edit_inputs[1].starts_with("dryrun://edit/cleanup/"));
    }

    #[tokio::test]
    async fn test_undo_restores_settings_captured_before_the_run() {
        let (_, mut session) = scripted_session();
        let id = session.upload("cat.jpg", png_bytes()).unwrap();

        session.run_current().await.unwrap();
        session.settings_mut().mode = EditMode::RemoveBg;

        assert!(session.undo());
        assert_eq!(session.settings().mode, EditMode::CleanupOnly);
        assert!(session.artifacts(id).is_none());
        assert_eq!(session.active_view(), ActiveView::Original);
        assert!(!session.undo());
    }

    #[tokio::test]
    async fn test_failed_run_still_leaves_an_undo_point() {
        let (collaborator, mut session) = scripted_session();
        let id = session.upload("cat.jpg", png_bytes()).unwrap();
        collaborator.fail_call(
            CallKind::Edit,
            0,
            CollaboratorError::PolicyBlocked("safety".to_string()),
        );

        assert!(session.run_current().await.is_err());
        assert_eq!(session.undo_depth(), 1);
        assert!(session.undo());
        assert!(session.artifacts(id).is_none());
    }

    #[tokio::test]
    async fn test_new_errors_replace_the_surfaced_one_until_dismissed() {
        let (collaborator, mut session) = scripted_session();
        session.upload("cat.jpg", png_bytes()).unwrap();
        collaborator.fail_call(
            CallKind::Edit,
            0,
            CollaboratorError::PolicyBlocked("safety".to_string()),
        );
        collaborator.fail_call(
            CallKind::Edit,
            1,
            CollaboratorError::Transport("timed out".to_string()),
        );

        let _ = session.run_current().await;
        assert!(matches!(
            session.surfaced_error(),
            Some(StudioError::Collaborator(CollaboratorError::PolicyBlocked(_)))
        ));

        let _ = session.run_current().await;
        assert!(matches!(
            session.surfaced_error(),
            Some(StudioError::Collaborator(CollaboratorError::Transport(_)))
        ));

        session.dismiss_error();
        assert!(session.surfaced_error().is_none());
    }

    #[tokio::test]
    async fn test_auth_failure_downgrades_the_tier() {
        let (collaborator, mut session) = scripted_session();
        session.upload("cat.jpg", png_bytes()).unwrap();
        assert_eq!(session.tier(), CapabilityTier::Premium);
        collaborator.fail_call(
            CallKind::Edit,
            0,
            CollaboratorError::Auth("invalid key".to_string()),
        );

        let _ = session.run_current().await;
        assert_eq!(session.tier(), CapabilityTier::Free);
    }

    #[tokio::test]
    async fn test_batch_records_no_history() {
        let (_, mut session) = scripted_session();
        let first = session.upload("a.jpg", png_bytes()).unwrap();
        let second = session.upload("b.jpg", png_bytes()).unwrap();

        session.run_batch().await.unwrap();

        assert_eq!(session.undo_depth(), 0);
        assert!(!session.undo());
        assert!(session.artifacts(first).unwrap().cleaned.is_some());
        assert!(session.artifacts(second).unwrap().cleaned.is_some());
        // Cursor rewound to the first image after a full pass.
        assert_eq!(session.current_image().unwrap().id, first);
    }

    #[tokio::test]
    async fn test_select_image_resets_the_view() {
        let (_, mut session) = scripted_session();
        session.upload("a.jpg", png_bytes()).unwrap();
        let second = session.upload("b.jpg", png_bytes()).unwrap();

        session.run_current().await.unwrap();
        assert_eq!(session.active_view(), ActiveView::Cleaned);

        session.select_image(second).unwrap();
        assert_eq!(session.active_view(), ActiveView::Original);
    }

    #[tokio::test]
    async fn test_manual_crop_prepends_and_records_no_history() {
        let (_, mut session) = scripted_session();
        let id = session.upload("cat.jpg", png_bytes()).unwrap();
        {
            let settings = session.settings_mut();
            settings.auto_crop = true;
            settings.aspect_ratios = IndexSet::from([AspectRatio::Square]);
        }
        session.run_current().await.unwrap();
        assert_eq!(session.undo_depth(), 1);

        session
            .add_manual_crop(AspectRatio::Portrait, ImageHandle::new("local://crop/1"))
            .unwrap();

        let set = session.artifacts(id).unwrap();
        assert_eq!(set.crop_proposals.len(), 2);
        assert_eq!(set.crop_proposals[0].rationale, "Manual crop");
        assert_eq!(session.undo_depth(), 1);
    }

    #[tokio::test]
    async fn test_collage_needs_enough_images() {
        let (_, mut session) = scripted_session();
        session.upload("a.jpg", png_bytes()).unwrap();

        let result = session.create_collage("summer").await;
        assert!(matches!(
            result,
            Err(StudioError::Session(SessionError::NotEnoughImages(2)))
        ));
    }

    #[tokio::test]
    async fn test_collage_feeds_derived_artifacts_and_skips_history() {
        let (collaborator, mut session) = scripted_session();
        session.upload("a.jpg", png_bytes()).unwrap();
        session.upload("b.jpg", png_bytes()).unwrap();
        session.run_current().await.unwrap();
        let depth_before = session.undo_depth();

        session.create_collage("summer").await.unwrap();

        assert!(session.collage().is_some());
        assert_eq!(session.undo_depth(), depth_before);
        let collage_inputs = collaborator.inputs(CallKind::Collage);
        // The current image contributed its cleaned artifact.
        assert!(collage_inputs[0].contains("dryrun://edit/cleanup/"));
    }

    #[tokio::test]
    async fn test_social_posts_use_the_preferred_language() {
        let (collaborator, mut session) = scripted_session();
        session.upload("cat.jpg", png_bytes()).unwrap();
        session
            .preferences_mut()
            .set(SOCIAL_LANGUAGE, Value::String("ja".to_string()))
            .unwrap();

        session.generate_social_posts("new studio shot").await.unwrap();

        assert_eq!(collaborator.inputs(CallKind::SocialPosts), vec!["ja"]);
        assert!(!session.social_posts().is_empty());
    }

    #[tokio::test]
    async fn test_maker_world_post_is_stored_on_the_session() {
        let (_, mut session) = scripted_session();
        session.upload("cat.jpg", png_bytes()).unwrap();

        session
            .generate_maker_world_post("articulated dragon")
            .await
            .unwrap();

        let post = session.maker_world_post().unwrap();
        assert!(post.model_name.contains("articulated dragon"));
    }

    #[tokio::test]
    async fn test_run_without_images_is_rejected() {
        let (_, mut session) = scripted_session();
        assert!(matches!(
            session.run_current().await,
            Err(StudioError::Session(SessionError::NoImageSelected))
        ));
        assert!(matches!(
            session.run_batch().await,
            Err(StudioError::Session(SessionError::NoImageSelected))
        ));
    }

    #[tokio::test]
    async fn test_reset_clears_everything_and_restores_the_tier() {
        let (collaborator, mut session) = scripted_session();
        let id = session.upload("cat.jpg", png_bytes()).unwrap();
        session.run_current().await.unwrap();
        collaborator.fail_call(
            CallKind::Edit,
            1,
            CollaboratorError::Auth("expired".to_string()),
        );
        let _ = session.run_current().await;
        assert_eq!(session.tier(), CapabilityTier::Free);

        session.reset();

        assert_eq!(session.image_count(), 0);
        assert!(session.artifacts(id).is_none());
        assert!(session.surfaced_error().is_none());
        assert_eq!(session.undo_depth(), 0);
        assert_eq!(session.tier(), CapabilityTier::Premium);
        assert_eq!(session.active_view(), ActiveView::Original);
    }
}
