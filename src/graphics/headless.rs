use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use log::debug;

use super::{GraphicsConfig, Graphics, ImageFormat, ImageInfo, TextureFlags, TextureHandle, check_raw};
use crate::error::GraphicsError;

/// A texture kept in CPU memory by [`HeadlessGraphics`].
#[derive(Clone, Debug)]
pub struct StoredTexture {
    pub image: ImageInfo,
    pub flags: TextureFlags,
    pub name: String,
}

impl StoredTexture {
    /// True when every byte of the pixel data is zero.
    pub fn is_transparent(&self) -> bool {
        self.image.data.iter().all(|&b| b == 0)
    }
}

/// Graphics backend without a GPU.
///
/// Uploaded textures stay in memory so they can be inspected or written to
/// disk.  Files are read from `root`, unless a virtual file registered with
/// [`insert_file`](Self::insert_file) shadows the path.  Upload and release
/// calls are counted.
pub struct HeadlessGraphics {
    root: PathBuf,
    config: GraphicsConfig,
    files: HashMap<PathBuf, ImageInfo>,
    textures: BTreeMap<TextureHandle, StoredTexture>,
    next_id: u32,
    uploads: usize,
    releases: usize,
    decodes: usize,
}

impl HeadlessGraphics {
    pub fn new(root: impl Into<PathBuf>, config: GraphicsConfig) -> Self {
        Self {
            root: root.into(),
            config,
            files: HashMap::new(),
            textures: BTreeMap::new(),
            next_id: 1,
            uploads: 0,
            releases: 0,
            decodes: 0,
        }
    }

    /// Register an in-memory image that `load_png`/`load_texture` return for `path`.
    pub fn insert_file(&mut self, path: impl Into<PathBuf>, image: ImageInfo) {
        self.files.insert(path.into(), image);
    }

    pub fn remove_file(&mut self, path: &Path) {
        self.files.remove(path);
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&StoredTexture> {
        self.textures.get(&handle)
    }

    /// Handles that were uploaded and not yet released.
    pub fn live_handles(&self) -> Vec<TextureHandle> {
        self.textures.keys().copied().collect()
    }

    pub fn live_count(&self) -> usize {
        self.textures.len()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads
    }

    pub fn release_count(&self) -> usize {
        self.releases
    }

    pub fn decode_count(&self) -> usize {
        self.decodes
    }

    fn read(&mut self, path: &Path) -> Result<ImageInfo, GraphicsError> {
        self.decodes += 1;
        if let Some(img) = self.files.get(path) {
            return Ok(img.clone());
        }
        let full = self.root.join(path);
        let bytes = std::fs::read(&full).map_err(|source| GraphicsError::Io { path: full, source })?;
        let img = image::load_from_memory(&bytes)?;
        Ok(ImageInfo::from_dynamic(img))
    }

    fn store(&mut self, image: ImageInfo, flags: TextureFlags, name: &str) -> TextureHandle {
        let handle = TextureHandle(self.next_id);
        self.next_id += 1;
        self.uploads += 1;
        debug!("headless: upload #{} '{}' {}x{}", handle.0, name, image.width, image.height);
        self.textures.insert(handle, StoredTexture { image, flags, name: name.to_string() });
        handle
    }
}

impl Graphics for HeadlessGraphics {
    fn load_png(&mut self, path: &Path) -> Result<ImageInfo, GraphicsError> {
        self.read(path)
    }

    fn load_texture(
        &mut self,
        path: &Path,
        flags: TextureFlags,
    ) -> Result<TextureHandle, GraphicsError> {
        let image = self.read(path)?;
        check_raw(image.width, image.height, image.format, &image.data)?;
        let name = path.display().to_string();
        Ok(self.store(image, flags, &name))
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
        Ok(self.store(image, flags, name))
    }

    fn unload_texture(&mut self, handle: TextureHandle) {
        if self.textures.remove(&handle).is_some() {
            self.releases += 1;
        }
    }

    fn has_texture_arrays(&self) -> bool {
        self.config.texture_arrays
    }

    fn is_tile_buffering_enabled(&self) -> bool {
        self.config.tile_buffering
    }
}
