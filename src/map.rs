//! Images declared by a map and the textures loaded for them.

use std::ops::{BitOr, BitOrAssign};

use log::{debug, info, warn};

use crate::config::MapImagesConfig;
use crate::error::MapImagesError;
use crate::graphics::{Graphics, ImageFormat, TextureFlags, TextureHandle};

// ── Map items ────────────────────────────────────────────────────────────────

/// An image item of a map file.
#[derive(Clone, Debug, PartialEq)]
pub enum MapImage {
    /// Loaded from the mapres directory by name.
    External { name: String },
    /// RGBA pixels stored inside the map file.  `data` is `None` once the
    /// map has released its copy.
    Embedded { name: String, width: u32, height: u32, data: Option<Vec<u8>> },
}

impl MapImage {
    pub fn name(&self) -> &str {
        match self {
            MapImage::External { name } | MapImage::Embedded { name, .. } => name,
        }
    }
}

/// A map layer, reduced to what image loading needs.
#[derive(Clone, Debug, PartialEq)]
pub enum MapLayer {
    /// Tile layer drawing from image `image`, if any.
    Tiles { image: Option<usize> },
    /// Quad layer drawing from image `image`, if any.
    Quads { image: Option<usize> },
    /// Sound or other layer without an image.
    Other,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayerGroup {
    pub layers: Vec<MapLayer>,
}

/// Read access to a loaded map's image items and layers.
pub trait MapData {
    fn images(&self) -> &[MapImage];

    fn groups(&self) -> &[LayerGroup];

    /// Drop the map's inline pixel copy of embedded image `index`.
    fn unload_image_data(&mut self, index: usize);
}

/// In-memory map content.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapItems {
    pub images: Vec<MapImage>,
    pub groups: Vec<LayerGroup>,
}

impl MapData for MapItems {
    fn images(&self) -> &[MapImage] {
        &self.images
    }

    fn groups(&self) -> &[LayerGroup] {
        &self.groups
    }

    fn unload_image_data(&mut self, index: usize) {
        if let Some(MapImage::Embedded { data, .. }) = self.images.get_mut(index) {
            *data = None;
        }
    }
}

// ── ImageUsage ───────────────────────────────────────────────────────────────

/// Which kinds of layer reference an image.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageUsage(u8);

impl ImageUsage {
    pub const NONE: Self = Self(0);
    pub const TILES: Self = Self(1);
    pub const QUADS: Self = Self(2);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ImageUsage {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ImageUsage {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Usage of each of `image_count` images across all layers.
///
/// References past the declared images are ignored.
pub fn scan_image_usage(groups: &[LayerGroup], image_count: usize) -> Vec<ImageUsage> {
    let mut usage = vec![ImageUsage::NONE; image_count];
    for layer in groups.iter().flat_map(|g| &g.layers) {
        let (image, bit) = match *layer {
            MapLayer::Tiles { image: Some(i) } => (i, ImageUsage::TILES),
            MapLayer::Quads { image: Some(i) } => (i, ImageUsage::QUADS),
            _ => continue,
        };
        match usage.get_mut(image) {
            Some(slot) => *slot |= bit,
            None => debug!("map: layer references image {} of {}", image, image_count),
        }
    }
    usage
}

/// Upload flags for an image with the given usage.
///
/// Tile layers need the layered texture.  Images no quad layer uses can skip
/// the flat texture when tile layers are drawn from the layered one.
pub fn image_load_flags(
    usage: ImageUsage,
    layered: TextureFlags,
    tile_buffering: bool,
) -> TextureFlags {
    let mut flags = TextureFlags::NONE;
    if usage.contains(ImageUsage::TILES) {
        flags |= layered;
    }
    if !usage.contains(ImageUsage::QUADS) && tile_buffering {
        flags |= TextureFlags::NO_2D_TEXTURE;
    }
    flags
}

// ── MapImageSet ──────────────────────────────────────────────────────────────

/// Textures of the current map's images, by image index.
#[derive(Debug, Default)]
pub struct MapImageSet {
    textures: Vec<Option<TextureHandle>>,
    usage: Vec<ImageUsage>,
}

impl MapImageSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Texture of image `index`; `None` when out of range or when loading failed.
    pub fn get(&self, index: usize) -> Option<TextureHandle> {
        self.textures.get(index).copied().flatten()
    }

    pub fn usage(&self, index: usize) -> Option<ImageUsage> {
        self.usage.get(index).copied()
    }

    pub fn textures(&self) -> &[Option<TextureHandle>] {
        &self.textures
    }

    pub fn release<G: Graphics + ?Sized>(&mut self, graphics: &mut G) {
        for handle in self.textures.drain(..).flatten() {
            graphics.unload_texture(handle);
        }
        self.usage.clear();
    }

    /// Replaces the set with the images of `map`.
    ///
    /// The previous textures are released first.  A map declaring more than
    /// `config.max_map_images` images leaves the set empty.  Individual
    /// images that fail to load leave an empty slot.
    pub fn load<G, M>(
        &mut self,
        graphics: &mut G,
        map: &mut M,
        config: &MapImagesConfig,
    ) -> Result<(), MapImagesError>
    where
        G: Graphics + ?Sized,
        M: MapData + ?Sized,
    {
        self.release(graphics);

        let declared = map.images().len();
        if declared > config.max_map_images {
            return Err(MapImagesError::TooManyImages { declared, max: config.max_map_images });
        }

        self.usage = scan_image_usage(map.groups(), declared);
        let layered = graphics.layered_flag();
        let tile_buffering = graphics.is_tile_buffering_enabled();

        for index in 0..declared {
            let flags = image_load_flags(self.usage[index], layered, tile_buffering);
            let (loaded, embedded) = match &map.images()[index] {
                MapImage::External { name } => {
                    (graphics.load_texture(&config.mapres_path(name), flags), false)
                }
                MapImage::Embedded { name, width, height, data } => {
                    let pixels = data.as_deref().unwrap_or(&[]);
                    let label = format!("embedded: {name}");
                    (graphics.load_texture_raw(*width, *height, ImageFormat::Rgba, pixels, flags, &label), true)
                }
            };
            if embedded {
                map.unload_image_data(index);
            }
            let handle = match loaded {
                Ok(handle) => Some(handle),
                Err(e) => {
                    warn!("map: image {} '{}' failed to load: {e}", index, map.images()[index].name());
                    None
                }
            };
            self.textures.push(handle);
        }

        info!(
            "map: loaded {} of {} images",
            self.textures.iter().filter(|t| t.is_some()).count(),
            declared
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(layers: Vec<MapLayer>) -> LayerGroup {
        LayerGroup { layers }
    }

    #[test]
    fn usage_combines_tile_and_quad_bits() {
        let groups = vec![
            group(vec![MapLayer::Tiles { image: Some(0) }, MapLayer::Quads { image: Some(1) }]),
            group(vec![MapLayer::Quads { image: Some(0) }, MapLayer::Other, MapLayer::Tiles { image: None }]),
        ];
        let usage = scan_image_usage(&groups, 3);
        assert_eq!(usage[0].bits(), 3);
        assert_eq!(usage[1], ImageUsage::QUADS);
        assert_eq!(usage[2], ImageUsage::NONE);
    }

    #[test]
    fn usage_ignores_out_of_range_references() {
        let groups = vec![group(vec![MapLayer::Tiles { image: Some(7) }])];
        assert_eq!(scan_image_usage(&groups, 2), vec![ImageUsage::NONE; 2]);
    }

    #[test]
    fn flags_for_tile_only_image() {
        let layered = TextureFlags::TO_2D_ARRAY_TEXTURE;
        assert_eq!(
            image_load_flags(ImageUsage::TILES, layered, true),
            TextureFlags::TO_2D_ARRAY_TEXTURE | TextureFlags::NO_2D_TEXTURE
        );
        assert_eq!(image_load_flags(ImageUsage::TILES, layered, false), layered);
    }

    #[test]
    fn flags_for_quad_image_keep_flat_texture() {
        let layered = TextureFlags::TO_3D_TEXTURE;
        assert_eq!(image_load_flags(ImageUsage::QUADS, layered, true), TextureFlags::NONE);
        assert_eq!(image_load_flags(ImageUsage::TILES | ImageUsage::QUADS, layered, true), layered);
    }

    #[test]
    fn unused_image_skips_flat_texture_with_tile_buffering() {
        assert_eq!(
            image_load_flags(ImageUsage::NONE, TextureFlags::TO_3D_TEXTURE, true),
            TextureFlags::NO_2D_TEXTURE
        );
    }

    #[test]
    fn unload_image_data_drops_embedded_pixels() {
        let mut map = MapItems {
            images: vec![MapImage::Embedded { name: "a".into(), width: 1, height: 1, data: Some(vec![0; 4]) }],
            groups: Vec::new(),
        };
        map.unload_image_data(0);
        map.unload_image_data(5);
        assert!(matches!(&map.images[0], MapImage::Embedded { data: None, .. }));
    }
}
