//! Editor configuration, read from a JSON file

use std::path::{Path, PathBuf};

use glam::UVec3;
use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use super::scene::DEFAULT_SCENE_SIZE;

/// Configuration for new scenes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Extent given to newly created scenes
    pub scene_size: [u32; 3],
    /// Material list loaded at startup
    pub materials: Option<PathBuf>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            scene_size: DEFAULT_SCENE_SIZE.to_array(),
            materials: None,
        }
    }
}

impl SceneConfig {
    /// Parse a JSON config; missing fields keep their defaults
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load a JSON config file.
    ///
    /// A relative `materials` path is resolved against the config file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut config = Self::from_json(&text)?;

        if let (Some(materials), Some(dir)) = (config.materials.as_mut(), path.parent()) {
            if materials.is_relative() {
                *materials = dir.join(&*materials);
            }
        }

        log::debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn scene_size(&self) -> UVec3 {
        UVec3::from_array(self.scene_size)
    }
}
