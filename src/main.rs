use std::sync::Arc;

use photostudio_rust::{
    AspectRatio, Configuration, DryrunCollaborator, EditMode, StudioError, StudioSessionBuilder,
};
use tracing::Level;

fn init_logging() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();
}

fn sample_image() -> Vec<u8> {
    let pixels = image::RgbImage::from_pixel(64, 64, image::Rgb([52, 120, 180]));
    let mut out = Vec::new();
    image::DynamicImage::ImageRgb8(pixels)
        .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .expect("Failed to encode sample image");
    out
}

// Offline walkthrough of the full edit chain against the dry-run
// collaborator: upload, remove-bg run with auto-crop, filter, undo.
#[tokio::main]
async fn main() -> Result<(), StudioError> {
    init_logging();
    let configuration = Configuration::load()?;

    let mut session = StudioSessionBuilder::new(configuration)
        .collaborator(Arc::new(DryrunCollaborator::new()))
        .build()?;

    let id = session.upload("sample.png", sample_image())?;
    {
        let settings = session.settings_mut();
        settings.mode = EditMode::RemoveBg;
        settings.auto_crop = true;
        settings.aspect_ratios.insert(AspectRatio::Square);
    }

    session.run_current().await?;
    session.apply_filter("sepia tone").await?;

    if let Some(set) = session.artifacts(id) {
        tracing::info!(
            "Artifacts for sample.png: removed_bg={}, filtered={}, crops={}, report={}",
            set.removed_bg.is_some(),
            set.filtered.is_some(),
            set.crop_proposals.len(),
            set.report.is_some()
        );
    }
    tracing::info!("Active view after the chain: {:?}", session.active_view());

    session.undo();
    tracing::info!("Active view after undo: {:?}", session.active_view());
    Ok(())
}
