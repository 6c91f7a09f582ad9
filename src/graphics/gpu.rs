use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use wgpu::util::DeviceExt;

use super::{GraphicsConfig, Graphics, ImageFormat, ImageInfo, TextureFlags, TextureHandle, check_raw};
use crate::error::GraphicsError;
use crate::tiles::{TILE_COUNT, TILES_PER_ROW};

/// GPU resources behind one [`TextureHandle`].
pub struct GpuTexture {
    /// Plain 2D texture of the whole image, absent with `NO_2D_TEXTURE`.
    pub flat: Option<wgpu::TextureView>,
    /// One layer (or depth slice) per grid cell, or a single layer for the
    /// `*_SINGLE_LAYER` flags.
    pub layered: Option<wgpu::TextureView>,
    pub width: u32,
    pub height: u32,
}

/// wgpu-backed [`Graphics`] implementation.
///
/// Images are decoded with the `image` crate from files below `root`.
pub struct WgpuGraphics {
    device: wgpu::Device,
    queue: wgpu::Queue,
    root: PathBuf,
    config: GraphicsConfig,
    textures: HashMap<TextureHandle, GpuTexture>,
    sampler: wgpu::Sampler,
    next_id: u32,
}

impl WgpuGraphics {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, root: impl Into<PathBuf>, config: GraphicsConfig) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        Self {
            device,
            queue,
            root: root.into(),
            config,
            textures: HashMap::new(),
            sampler,
            next_id: 1,
        }
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&GpuTexture> {
        self.textures.get(&handle)
    }

    /// Shared nearest-neighbour sampler for every tileset texture.
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    fn upload(&mut self, image: &ImageInfo, flags: TextureFlags, name: &str) -> TextureHandle {
        let (format, pixels) = match image.format {
            ImageFormat::Alpha => (wgpu::TextureFormat::R8Unorm, image.data.clone()),
            ImageFormat::Rgb => (wgpu::TextureFormat::Rgba8Unorm, image.to_rgba()),
            ImageFormat::Rgba => (wgpu::TextureFormat::Rgba8Unorm, image.data.clone()),
        };
        let bpp = if format == wgpu::TextureFormat::R8Unorm { 1 } else { 4 };

        let flat = (!flags.contains(TextureFlags::NO_2D_TEXTURE)).then(|| {
            self.create(name, image.width, image.height, 1, wgpu::TextureDimension::D2, format, &pixels)
                .create_view(&wgpu::TextureViewDescriptor::default())
        });

        let layered = self.upload_layered(image, flags, name, format, bpp, &pixels);

        let handle = TextureHandle(self.next_id);
        self.next_id += 1;
        debug!("wgpu: uploaded '{}' as #{} ({}x{})", name, handle.0, image.width, image.height);
        self.textures.insert(handle, GpuTexture { flat, layered, width: image.width, height: image.height });
        handle
    }

    fn upload_layered(
        &self,
        image: &ImageInfo,
        flags: TextureFlags,
        name: &str,
        format: wgpu::TextureFormat,
        bpp: usize,
        pixels: &[u8],
    ) -> Option<wgpu::TextureView> {
        let single = flags.contains(TextureFlags::TO_2D_ARRAY_TEXTURE_SINGLE_LAYER)
            || flags.contains(TextureFlags::TO_3D_TEXTURE_SINGLE_LAYER);
        let to_3d = flags.contains(TextureFlags::TO_3D_TEXTURE)
            || flags.contains(TextureFlags::TO_3D_TEXTURE_SINGLE_LAYER);
        let to_array = flags.contains(TextureFlags::TO_2D_ARRAY_TEXTURE)
            || flags.contains(TextureFlags::TO_2D_ARRAY_TEXTURE_SINGLE_LAYER);
        if !to_3d && !to_array {
            return None;
        }

        let (dimension, view_dimension) = if to_3d {
            (wgpu::TextureDimension::D3, wgpu::TextureViewDimension::D3)
        } else {
            (wgpu::TextureDimension::D2, wgpu::TextureViewDimension::D2Array)
        };

        let texture = if single {
            self.create(name, image.width, image.height, 1, dimension, format, pixels)
        } else {
            if image.width % TILES_PER_ROW != 0 || image.height % TILES_PER_ROW != 0 {
                warn!(
                    "wgpu: '{}' is {}x{}, not divisible into 16x16 tiles; skipping layered texture",
                    name, image.width, image.height
                );
                return None;
            }
            let tile_w = image.width / TILES_PER_ROW;
            let tile_h = image.height / TILES_PER_ROW;
            let layers = split_into_layers(pixels, image.width, tile_w, tile_h, bpp);
            self.create(name, tile_w, tile_h, TILE_COUNT as u32, dimension, format, &layers)
        };

        Some(texture.create_view(&wgpu::TextureViewDescriptor {
            dimension: Some(view_dimension),
            ..Default::default()
        }))
    }

    #[allow(clippy::too_many_arguments)]
    fn create(
        &self,
        name: &str,
        width: u32,
        height: u32,
        layers: u32,
        dimension: wgpu::TextureDimension,
        format: wgpu::TextureFormat,
        data: &[u8],
    ) -> wgpu::Texture {
        self.device.create_texture_with_data(
            &self.queue,
            &wgpu::TextureDescriptor {
                label: Some(name),
                size: wgpu::Extent3d { width, height, depth_or_array_layers: layers },
                mip_level_count: 1,
                sample_count: 1,
                dimension,
                format,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        )
    }
}

/// Rearranges a 16×16 tile image into 256 consecutive tile images,
/// row-major by tile index.
pub(crate) fn split_into_layers(pixels: &[u8], image_w: u32, tile_w: u32, tile_h: u32, bpp: usize) -> Vec<u8> {
    let stride = image_w as usize * bpp;
    let row_len = tile_w as usize * bpp;
    let mut out = Vec::with_capacity(pixels.len());
    for index in 0..TILE_COUNT as u32 {
        let x0 = (index % TILES_PER_ROW * tile_w) as usize * bpp;
        let y0 = (index / TILES_PER_ROW * tile_h) as usize;
        for row in 0..tile_h as usize {
            let off = (y0 + row) * stride + x0;
            out.extend_from_slice(&pixels[off..off + row_len]);
        }
    }
    out
}

impl Graphics for WgpuGraphics {
    fn load_png(&mut self, path: &Path) -> Result<ImageInfo, GraphicsError> {
        let full = self.root.join(path);
        let bytes = std::fs::read(&full).map_err(|source| GraphicsError::Io { path: full, source })?;
        Ok(ImageInfo::from_dynamic(image::load_from_memory(&bytes)?))
    }

    fn load_texture(
        &mut self,
        path: &Path,
        flags: TextureFlags,
    ) -> Result<TextureHandle, GraphicsError> {
        let image = self.load_png(path)?;
        check_raw(image.width, image.height, image.format, &image.data)?;
        Ok(self.upload(&image, flags, &path.display().to_string()))
    }

    fn load_texture_raw(
        &mut self,
        width: u32,
        height: u32,
        format: ImageFormat,
        data: &[u8],
        flags: TextureFlags,
        name: &str,
    ) -> Result<TextureHandle, GraphicsError> {
        check_raw(width, height, format, data)?;
        let image = ImageInfo { width, height, format, data: data.to_vec() };
        Ok(self.upload(&image, flags, name))
    }

    fn unload_texture(&mut self, handle: TextureHandle) {
        // Dropping the views releases the GPU memory once wgpu is done with it.
        self.textures.remove(&handle);
    }

    fn has_texture_arrays(&self) -> bool {
        self.config.texture_arrays
    }

    fn is_tile_buffering_enabled(&self) -> bool {
        self.config.tile_buffering
    }
}
