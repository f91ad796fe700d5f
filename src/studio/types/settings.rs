use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Which remote edit the pipeline's first stage requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditMode {
    #[default]
    CleanupOnly,
    RemoveBg,
    ThemedBg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    Square,
    Landscape,
    Portrait,
    Widescreen,
    Vertical,
}

impl AspectRatio {
    pub fn label(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Landscape => "4:3",
            AspectRatio::Portrait => "3:4",
            AspectRatio::Widescreen => "16:9",
            AspectRatio::Vertical => "9:16",
        }
    }
}

/// User-facing operation settings. Mutated freely between runs; each
/// pipeline invocation captures the value in effect at call time so the
/// report reflects what was actually requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub mode: EditMode,
    pub theme: String,
    pub harmonize_style: bool,
    pub light_cleanup: bool,
    pub background_blur: bool,
    pub auto_crop: bool,
    pub aspect_ratios: IndexSet<AspectRatio>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: EditMode::CleanupOnly,
            theme: String::new(),
            harmonize_style: false,
            light_cleanup: false,
            background_blur: false,
            auto_crop: false,
            aspect_ratios: IndexSet::new(),
        }
    }
}
