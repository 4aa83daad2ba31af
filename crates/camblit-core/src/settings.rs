use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::ColorRange;
use crate::plane::PlaneOrder;
use crate::transform::{OverlayStyle, Rotation};

/// File name looked up by [`FrameSettings::from_dir`].
pub const SETTINGS_FILE: &str = "camblit.json";

/// Per-process frame pipeline configuration. Loaded once, then shared
/// read-only with every frame call.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FrameSettings {
    #[serde(default)]
    pub plane_order: PlaneOrder,
    #[serde(default)]
    pub color_range: ColorRange,
    #[serde(default)]
    pub rotation: Rotation,
    #[serde(default)]
    pub mirror: bool,
    #[serde(default = "default_overlay")]
    pub overlay: Option<OverlayStyle>,
}

fn default_overlay() -> Option<OverlayStyle> {
    Some(OverlayStyle::default())
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self {
            plane_order: PlaneOrder::default(),
            color_range: ColorRange::default(),
            rotation: Rotation::default(),
            mirror: false,
            overlay: default_overlay(),
        }
    }
}

impl FrameSettings {
    /// Load `<data_dir>/camblit.json`.
    pub fn from_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::load(data_dir.as_ref().join(SETTINGS_FILE))
    }

    /// Load settings from `path`, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), "invalid settings, using defaults: {e}");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }
}
