use std::path::PathBuf;

use serde::Deserialize;

use crate::entities::GameplayVariant;
use crate::error::MapImagesError;

// ── MapImagesConfig ──────────────────────────────────────────────────────────

/// Resource locations and limits for map image loading.
///
/// Paths are relative to the graphics backend's storage root.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapImagesConfig {
    /// Label size in percent of a full 64 px cell.
    pub texture_scale: u32,
    /// Directory holding `<variant>.png` entity images.
    pub entities_dir: PathBuf,
    /// Directory holding external map images.
    pub mapres_dir: PathBuf,
    /// Image drawn on speed-up tiles.
    pub speedup_arrow_path: PathBuf,
    /// Largest number of images a map may declare.
    pub max_map_images: usize,
}

impl Default for MapImagesConfig {
    fn default() -> Self {
        Self {
            texture_scale: 100,
            entities_dir: PathBuf::from("editor/entities_clear"),
            mapres_dir: PathBuf::from("mapres"),
            speedup_arrow_path: PathBuf::from("editor/speed_arrow.png"),
            max_map_images: 64,
        }
    }
}

impl MapImagesConfig {
    /// Parse a config from JSON.  Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, MapImagesError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Path of the entity image for `variant`.
    pub fn entities_path(&self, variant: GameplayVariant) -> PathBuf {
        self.entities_dir.join(format!("{}.png", variant.image_name()))
    }

    /// Path of an external map image called `name`.
    pub fn mapres_path(&self, name: &str) -> PathBuf {
        self.mapres_dir.join(format!("{name}.png"))
    }
}
