use std::path::Path;

use image::RgbaImage;

use crate::error::GraphicsError;

// ── GlyphRasterizer ──────────────────────────────────────────────────────────

/// Text measuring and rasterisation used to draw tile number labels.
///
/// Sizes are pixel heights of the font's em square.
pub trait GlyphRasterizer {
    /// Horizontal advance of `text` at `size`, rounded up to whole pixels.
    fn text_width(&self, text: &str, size: u32) -> u32;

    /// Draws `text` in white with its top-left at `(x, y)`.
    ///
    /// Glyph coverage is written to the alpha channel; pixels outside the
    /// canvas are clipped.
    fn rasterize_into(&self, canvas: &mut RgbaImage, text: &str, x: i32, y: i32, size: u32);

    /// Largest size not above `max_size` at which `text` fits in `max_width`.
    ///
    /// Never returns less than 1.
    fn fit_font_size(&self, text: &str, max_size: u32, max_width: u32) -> u32 {
        let mut size = max_size.max(1);
        loop {
            let width = self.text_width(text, size);
            if width <= max_width || size == 1 {
                return size;
            }
            let scaled = (size as u64 * max_width as u64 / width as u64) as u32;
            size = scaled.min(size - 1).max(1);
        }
    }
}

// ── FontdueRasterizer ────────────────────────────────────────────────────────

/// TrueType rasteriser backed by `fontdue`.
pub struct FontdueRasterizer {
    font: fontdue::Font,
}

impl FontdueRasterizer {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GraphicsError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| GraphicsError::Font(e.to_string()))?;
        Ok(Self { font })
    }

    pub fn from_file(path: &Path) -> Result<Self, GraphicsError> {
        let bytes = std::fs::read(path)
            .map_err(|source| GraphicsError::Io { path: path.to_path_buf(), source })?;
        Self::from_bytes(&bytes)
    }
}

impl GlyphRasterizer for FontdueRasterizer {
    fn text_width(&self, text: &str, size: u32) -> u32 {
        let px = size as f32;
        let width: f32 = text.chars().map(|ch| self.font.metrics(ch, px).advance_width).sum();
        width.ceil() as u32
    }

    fn rasterize_into(&self, canvas: &mut RgbaImage, text: &str, x: i32, y: i32, size: u32) {
        let px = size as f32;
        let ascent = self
            .font
            .horizontal_line_metrics(px)
            .map(|m| m.ascent)
            .unwrap_or(px);
        let (canvas_w, canvas_h) = canvas.dimensions();
        let mut pen_x = x as f32;

        for ch in text.chars() {
            let (metrics, coverage) = self.font.rasterize(ch, px);
            let left = pen_x.round() as i64 + metrics.xmin as i64;
            // fontdue's ymin is the bottom edge relative to the baseline.
            let top = y as i64 + (ascent - metrics.height as f32 - metrics.ymin as f32).round() as i64;

            for row in 0..metrics.height {
                for col in 0..metrics.width {
                    let alpha = coverage[row * metrics.width + col];
                    if alpha == 0 {
                        continue;
                    }
                    let px = left + col as i64;
                    let py = top + row as i64;
                    if px < 0 || py < 0 || px >= canvas_w as i64 || py >= canvas_h as i64 {
                        continue;
                    }
                    let dst = canvas.get_pixel_mut(px as u32, py as u32);
                    dst.0 = [255, 255, 255, dst.0[3].max(alpha)];
                }
            }
            pen_x += metrics.advance_width;
        }
    }
}
