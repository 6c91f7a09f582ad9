pub mod gpu;
pub mod headless;

use std::ops::{BitOr, BitOrAssign};
use std::path::Path;

use serde::Deserialize;

use crate::error::GraphicsError;

// ── TextureHandle ────────────────────────────────────────────────────────────

/// Opaque token for a texture owned by a [`Graphics`] backend.
///
/// The core never looks inside a handle; it only hands it back for release
/// or for drawing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub(crate) u32);

impl TextureHandle {
    /// Raw id, useful for logging and for backends keyed by integer.
    pub fn id(self) -> u32 {
        self.0
    }
}

// ── TextureFlags ─────────────────────────────────────────────────────────────

/// Upload hints passed alongside pixel data.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextureFlags(u32);

impl TextureFlags {
    pub const NONE: Self = Self(0);
    /// Also build a 2D-array texture with one layer per 16×16 grid cell.
    pub const TO_2D_ARRAY_TEXTURE: Self = Self(1 << 0);
    /// Also build a 3D texture with one slice per 16×16 grid cell.
    pub const TO_3D_TEXTURE: Self = Self(1 << 1);
    /// Skip the flat 2D texture; only the layered one is created.
    pub const NO_2D_TEXTURE: Self = Self(1 << 2);
    /// Like `TO_2D_ARRAY_TEXTURE`, but the whole image becomes one layer.
    pub const TO_2D_ARRAY_TEXTURE_SINGLE_LAYER: Self = Self(1 << 3);
    /// Like `TO_3D_TEXTURE`, but the whole image becomes one slice.
    pub const TO_3D_TEXTURE_SINGLE_LAYER: Self = Self(1 << 4);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for TextureFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for TextureFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

// ── ImageFormat / ImageInfo ──────────────────────────────────────────────────

/// Channel layout of a decoded image.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Alpha,
    Rgb,
    Rgba,
}

impl ImageFormat {
    pub fn channel_count(self) -> usize {
        match self {
            ImageFormat::Alpha => 1,
            ImageFormat::Rgb => 3,
            ImageFormat::Rgba => 4,
        }
    }
}

/// A decoded image held in CPU memory, rows top to bottom, tightly packed.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub data: Vec<u8>,
}

impl ImageInfo {
    /// Zero-filled (fully transparent) image.
    pub fn transparent(width: u32, height: u32, format: ImageFormat) -> Self {
        let len = width as usize * height as usize * format.channel_count();
        Self { width, height, format, data: vec![0; len] }
    }

    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * self.format.channel_count()
    }

    /// Converts an [`image::DynamicImage`], keeping one-channel and
    /// three-channel images in their native layout.
    pub fn from_dynamic(img: image::DynamicImage) -> Self {
        let (width, height) = (img.width(), img.height());
        match img {
            image::DynamicImage::ImageLuma8(buf) => {
                Self { width, height, format: ImageFormat::Alpha, data: buf.into_raw() }
            }
            image::DynamicImage::ImageRgb8(buf) => {
                Self { width, height, format: ImageFormat::Rgb, data: buf.into_raw() }
            }
            other => Self {
                width,
                height,
                format: ImageFormat::Rgba,
                data: other.to_rgba8().into_raw(),
            },
        }
    }

    /// Expands the pixels to RGBA8.  Single-channel images become white
    /// with the channel as alpha.
    pub fn to_rgba(&self) -> Vec<u8> {
        match self.format {
            ImageFormat::Rgba => self.data.clone(),
            ImageFormat::Rgb => self
                .data
                .chunks_exact(3)
                .flat_map(|p| [p[0], p[1], p[2], 255])
                .collect(),
            ImageFormat::Alpha => self.data.iter().flat_map(|&a| [255, 255, 255, a]).collect(),
        }
    }
}

/// Rectangle of pixels to copy between two buffers of identical layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CellCopy {
    pub src_x: u32,
    pub src_y: u32,
    pub dst_x: u32,
    pub dst_y: u32,
    pub width: u32,
    pub height: u32,
}

/// Copies a `width`×`height` block from `src` to `dst`.
///
/// Both buffers are `image_w` pixels wide with `channels` bytes per pixel.
/// Rows that would fall outside either buffer are skipped.
pub fn copy_cell(dst: &mut [u8], src: &[u8], image_w: u32, channels: usize, copy: CellCopy) {
    let stride = image_w as usize * channels;
    let row_len = copy.width as usize * channels;
    for row in 0..copy.height as usize {
        let src_off = (copy.src_y as usize + row) * stride + copy.src_x as usize * channels;
        let dst_off = (copy.dst_y as usize + row) * stride + copy.dst_x as usize * channels;
        if src_off + row_len > src.len() || dst_off + row_len > dst.len() {
            break;
        }
        dst[dst_off..dst_off + row_len].copy_from_slice(&src[src_off..src_off + row_len]);
    }
}

// ── GraphicsConfig ───────────────────────────────────────────────────────────

/// Capabilities a backend reports to the texture-loading code.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GraphicsConfig {
    /// Backend can build 2D-array textures (otherwise 3D textures are used).
    pub texture_arrays: bool,
    /// Tile layers are drawn from the layered texture only.
    pub tile_buffering: bool,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self { texture_arrays: true, tile_buffering: true }
    }
}

// ── Graphics trait ───────────────────────────────────────────────────────────

/// Texture upload and image decode services used by the map image code.
pub trait Graphics {
    /// Decode a PNG from backend storage without uploading it.
    fn load_png(&mut self, path: &Path) -> Result<ImageInfo, GraphicsError>;

    /// Decode and upload an image file.
    fn load_texture(&mut self, path: &Path, flags: TextureFlags)
        -> Result<TextureHandle, GraphicsError>;

    /// Upload raw pixels.  `data` must hold `width * height` pixels of `format`.
    fn load_texture_raw(
        &mut self,
        width: u32,
        height: u32,
        format: ImageFormat,
        data: &[u8],
        flags: TextureFlags,
        name: &str,
    ) -> Result<TextureHandle, GraphicsError>;

    /// Release a texture.  Unknown handles are ignored.
    fn unload_texture(&mut self, handle: TextureHandle);

    fn has_texture_arrays(&self) -> bool;

    fn is_tile_buffering_enabled(&self) -> bool;

    /// The array/3D flag matching this backend's capabilities.
    fn layered_flag(&self) -> TextureFlags {
        if self.has_texture_arrays() {
            TextureFlags::TO_2D_ARRAY_TEXTURE
        } else {
            TextureFlags::TO_3D_TEXTURE
        }
    }
}

/// Check that `data` matches the declared dimensions before an upload.
pub(crate) fn check_raw(
    width: u32,
    height: u32,
    format: ImageFormat,
    data: &[u8],
) -> Result<(), GraphicsError> {
    if width == 0 || height == 0 {
        return Err(GraphicsError::InvalidDimensions { width, height });
    }
    let expected = width as usize * height as usize * format.channel_count();
    if data.len() != expected {
        return Err(GraphicsError::BufferSize { expected, actual: data.len() });
    }
    Ok(())
}

// ── Tests ────────────────────────────────────────────────────────────────────
