use serde::{Deserialize, Serialize};
use std::path::Path;

/// Camera source selection configuration.
///
/// Read fresh at each selection — the selector never caches it — so a
/// changed flag takes effect on the next call without a restart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectorConfig {
    /// Route the preview through the virtual background device instead of a
    /// physical camera.
    pub use_virtual_camera: bool,
}

impl SelectorConfig {
    /// Load configuration from a JSON file, returning default on missing file.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        serde_json::from_str(&contents).map_err(|e| e.to_string())
    }

    /// Load configuration with the `VIRTUAL_CAMERA` environment variable
    /// taking precedence over the file when set.
    pub fn resolve(path: &Path) -> Result<Self, String> {
        let mut config = Self::load(path)?;
        if let Ok(v) = std::env::var("VIRTUAL_CAMERA") {
            config.use_virtual_camera = v == "1" || v == "true";
        }
        Ok(config)
    }
}
