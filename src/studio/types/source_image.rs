use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier assigned at upload time. File names are display
/// metadata only; two uploads with the same name never collide in the
/// artifact store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImageId(Uuid);

impl ImageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ImageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A renderable reference to image data: either a URL returned by the
/// remote collaborator or a locally encoded data URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageHandle(String);

impl ImageHandle {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An uploaded image. The binary is immutable for the lifetime of the
/// session and is removed only by a full reset.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub id: ImageId,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Arc<Vec<u8>>,
    pub width: u32,
    pub height: u32,
    pub uploaded_at: DateTime<Utc>,
}

impl SourceImage {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            id: ImageId::new(),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes: Arc::new(bytes),
            width,
            height,
            uploaded_at: Utc::now(),
        }
    }

    /// Renderable form of the raw upload, encoded as a data URL.
    pub fn handle(&self) -> ImageHandle {
        ImageHandle::new(format!(
            "data:{};base64,{}",
            self.mime_type,
            BASE64.encode(self.bytes.as_slice())
        ))
    }
}
