use log::{info, warn};

use crate::config::MapImagesConfig;
use crate::entities::{EntityAtlases, EntityLayer, GameplayVariant, enabled_layers};
use crate::error::MapImagesError;
use crate::game_info::GameInfo;
use crate::graphics::{Graphics, TextureFlags, TextureHandle};
use crate::map::{MapData, MapImageSet};
use crate::overlay::{LabelOverlays, OverlayPlacement};
use crate::text::GlyphRasterizer;

/// Owner of every texture derived from the current map and game mode.
///
/// Holds the map's image textures, the entity overlay atlases per gameplay
/// variant, the number label atlases and the speed-up arrow.  All of them are
/// released through the wrapped [`Graphics`] backend before being replaced
/// and on [`shutdown`](Self::shutdown).
pub struct MapImages<G: Graphics, R: GlyphRasterizer> {
    graphics: G,
    rasterizer: R,
    config: MapImagesConfig,
    game_info: GameInfo,
    images: MapImageSet,
    entities: EntityAtlases,
    overlays: LabelOverlays,
    speedup_arrow: Option<TextureHandle>,
    speedup_arrow_loaded: bool,
}

impl<G: Graphics, R: GlyphRasterizer> MapImages<G, R> {
    pub fn new(graphics: G, rasterizer: R, config: MapImagesConfig) -> Self {
        let overlays = LabelOverlays::new(config.texture_scale);
        Self {
            graphics,
            rasterizer,
            config,
            game_info: GameInfo::default(),
            images: MapImageSet::new(),
            entities: EntityAtlases::new(),
            overlays,
            speedup_arrow: None,
            speedup_arrow_loaded: false,
        }
    }

    /// Builds the label atlases.  Call once after the backend is ready.
    pub fn init(&mut self) {
        self.overlays.build(&mut self.graphics, &self.rasterizer);
    }

    pub fn graphics(&self) -> &G {
        &self.graphics
    }

    pub fn graphics_mut(&mut self) -> &mut G {
        &mut self.graphics
    }

    pub fn config(&self) -> &MapImagesConfig {
        &self.config
    }

    pub fn game_info(&self) -> &GameInfo {
        &self.game_info
    }

    /// Game mode flags of the current server.  Variants that were already
    /// built stay cached.
    pub fn set_game_info(&mut self, info: GameInfo) {
        self.game_info = info;
    }

    // ── Map images ───────────────────────────────────────────────────────

    /// Reloads every image of `map`, releasing the previous map's textures.
    pub fn on_map_load<M: MapData + ?Sized>(&mut self, map: &mut M) -> Result<(), MapImagesError> {
        self.images.load(&mut self.graphics, map, &self.config)
    }

    /// Loads the images of a menu background map.
    pub fn load_background<M: MapData + ?Sized>(&mut self, map: &mut M) -> Result<(), MapImagesError> {
        self.on_map_load(map)
    }

    pub fn map_images(&self) -> &MapImageSet {
        &self.images
    }

    /// Texture of map image `index`.
    pub fn texture(&self, index: usize) -> Option<TextureHandle> {
        self.images.get(index)
    }

    // ── Entities ─────────────────────────────────────────────────────────

    /// Variant selected by the current game info.
    pub fn entities_variant(&self) -> GameplayVariant {
        self.game_info.entities_variant()
    }

    /// Entity overlay for `layer` under the current game mode.
    pub fn entities(&mut self, layer: EntityLayer) -> Option<TextureHandle> {
        self.entities_for(self.entities_variant(), layer)
    }

    /// Entity overlay for `layer` under `variant`.
    ///
    /// The first request for a variant decodes its image and uploads all six
    /// layers; later requests are lookups.  When decoding fails nothing is
    /// cached and the next request tries again.
    pub fn entities_for(&mut self, variant: GameplayVariant, layer: EntityLayer) -> Option<TextureHandle> {
        if !self.entities.is_built(variant) {
            let path = self.config.entities_path(variant);
            let source = match self.graphics.load_png(&path) {
                Ok(source) => source,
                Err(e) => {
                    warn!("entities: cannot load {}: {e}", path.display());
                    return None;
                }
            };
            let enabled = enabled_layers(variant, &self.game_info);
            let name = path.display().to_string();
            if !self.entities.build(&mut self.graphics, variant, &source, enabled, &name) {
                return None;
            }
        }
        self.entities.get(variant, layer)
    }

    /// Shared texture used for layers a variant does not draw.
    pub fn transparent_placeholder(&self) -> Option<TextureHandle> {
        self.entities.placeholder()
    }

    /// Drops every cached entity atlas so the next request rebuilds it.
    pub fn reset_entities(&mut self) {
        self.entities.clear(&mut self.graphics);
    }

    /// Arrow drawn on speed-up tiles.  Loaded on first use; a failed load is
    /// not retried.
    pub fn speedup_arrow(&mut self) -> Option<TextureHandle> {
        if !self.speedup_arrow_loaded {
            self.speedup_arrow_loaded = true;
            let single = if self.graphics.has_texture_arrays() {
                TextureFlags::TO_2D_ARRAY_TEXTURE_SINGLE_LAYER
            } else {
                TextureFlags::TO_3D_TEXTURE_SINGLE_LAYER
            };
            let path = self.config.speedup_arrow_path.clone();
            match self.graphics.load_texture(&path, single | TextureFlags::NO_2D_TEXTURE) {
                Ok(handle) => self.speedup_arrow = Some(handle),
                Err(e) => warn!("speedup arrow: cannot load {}: {e}", path.display()),
            }
        }
        self.speedup_arrow
    }

    // ── Label overlays ───────────────────────────────────────────────────

    pub fn overlay(&self, placement: OverlayPlacement) -> Option<TextureHandle> {
        self.overlays.get(placement)
    }

    pub fn overlay_bottom(&self) -> Option<TextureHandle> {
        self.overlay(OverlayPlacement::Bottom)
    }

    pub fn overlay_top(&self) -> Option<TextureHandle> {
        self.overlay(OverlayPlacement::Top)
    }

    pub fn overlay_center(&self) -> Option<TextureHandle> {
        self.overlay(OverlayPlacement::Center)
    }

    pub fn texture_scale(&self) -> u32 {
        self.overlays.scale()
    }

    /// Sets the label scale in percent.  Built label atlases are rebuilt
    /// right away.
    pub fn set_texture_scale(&mut self, scale: u32) {
        if self.overlays.set_scale(&mut self.graphics, &self.rasterizer, scale) {
            self.config.texture_scale = scale;
            info!("overlay: texture scale is now {}", scale);
        }
    }

    // ── Teardown ─────────────────────────────────────────────────────────

    /// Releases every texture this instance created.
    pub fn shutdown(&mut self) {
        self.images.release(&mut self.graphics);
        self.entities.release_all(&mut self.graphics);
        self.overlays.release(&mut self.graphics);
        if let Some(handle) = self.speedup_arrow.take() {
            self.graphics.unload_texture(handle);
        }
        self.speedup_arrow_loaded = false;
    }
}
