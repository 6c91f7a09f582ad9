//! Number label overlays.
//!
//! Speed-up, switch and teleporter tiles carry a number.  The renderer draws
//! it from a 1024×1024 label atlas laid out like a tileset: the label for
//! value `n` sits in 64×64 cell `(n % 16, n / 16)`.  Three atlases exist,
//! differing only in where the label sits vertically inside its cell.

use std::ops::RangeInclusive;

use image::RgbaImage;
use log::{debug, warn};

use crate::graphics::{Graphics, ImageFormat, TextureFlags, TextureHandle};
use crate::text::GlyphRasterizer;

/// Side length of every label atlas.
pub const LABEL_CANVAS_SIZE: u32 = 1024;
/// Side length of one label cell.
pub const LABEL_CELL_SIZE: u32 = 64;
/// Largest value with a label.
pub const MAX_LABEL_VALUE: u32 = 255;
/// Applied to the size fitted for a tier's widest label so narrower digit
/// combinations with wider glyphs still fit.
pub const FONT_SAFETY_FACTOR: f32 = 0.95;

// ── LabelTier ────────────────────────────────────────────────────────────────

/// Labels grouped by digit count; each group shares one font size.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LabelTier {
    OneDigit,
    TwoDigits,
    ThreeDigits,
}

impl LabelTier {
    pub const ALL: [Self; 3] = [Self::OneDigit, Self::TwoDigits, Self::ThreeDigits];

    pub fn values(self) -> RangeInclusive<u32> {
        match self {
            Self::OneDigit => 1..=9,
            Self::TwoDigits => 10..=99,
            Self::ThreeDigits => 100..=MAX_LABEL_VALUE,
        }
    }

    /// The label used to fit the tier's font size.
    pub fn widest_label(self) -> String {
        self.values().end().to_string()
    }
}

// ── OverlayPlacement ─────────────────────────────────────────────────────────

/// Vertical placement of labels inside their cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OverlayPlacement {
    /// Half-size labels in the lower half of the cell.
    Bottom,
    /// Half-size labels in the upper half of the cell.
    Top,
    /// Full-size labels centered in the cell.
    Center,
}

/// Layout inputs for one label atlas.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LabelLayout {
    /// Font size budget before fitting.
    pub glyph_size: u32,
    /// Horizontal budget for the widest label.
    pub max_width: u32,
    /// Top of the label box relative to the cell's top edge.
    pub y_offset: i32,
}

impl OverlayPlacement {
    pub const ALL: [Self; 3] = [Self::Bottom, Self::Top, Self::Center];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Layout at `texture_scale` percent of a full cell.  Scales above 100
    /// lay out like 100; the label box never outgrows its cell.
    pub fn layout(self, texture_scale: u32) -> LabelLayout {
        let cell = u64::from(LABEL_CELL_SIZE);
        let texture_size = (cell * u64::from(texture_scale) / 100).min(cell) as i32;
        let center_offset = (LABEL_CELL_SIZE as i32 - texture_size) / 2;
        let (glyph_size, y_offset) = match self {
            Self::Bottom => (texture_size / 2, LABEL_CELL_SIZE as i32 / 2 + center_offset / 2),
            Self::Top => (texture_size / 2, center_offset / 2),
            Self::Center => (texture_size, center_offset),
        };
        LabelLayout { glyph_size: glyph_size.max(0) as u32, max_width: LABEL_CELL_SIZE, y_offset }
    }
}

// ── Rendering ────────────────────────────────────────────────────────────────

/// Font size every label of `tier` is drawn with.
pub fn tier_font_size<R: GlyphRasterizer + ?Sized>(rasterizer: &R, tier: LabelTier, layout: LabelLayout) -> u32 {
    let reference = rasterizer.fit_font_size(&tier.widest_label(), layout.glyph_size, layout.max_width);
    (reference as f32 * FONT_SAFETY_FACTOR) as u32
}

/// Cell origin of the label for `value` on the atlas.
pub fn label_cell_origin(value: u32) -> (u32, u32) {
    (value % 16 * LABEL_CELL_SIZE, value / 16 * LABEL_CELL_SIZE)
}

/// Draws every label of `tier` into `canvas`.
pub fn draw_label_tier<R: GlyphRasterizer + ?Sized>(
    rasterizer: &R,
    canvas: &mut RgbaImage,
    tier: LabelTier,
    layout: LabelLayout,
) {
    let font_size = tier_font_size(rasterizer, tier, layout);
    if font_size == 0 {
        return;
    }
    let y_offset = layout.y_offset + (layout.glyph_size as i32 - font_size as i32) / 2;

    for value in tier.values() {
        let label = value.to_string();
        let width = rasterizer.text_width(&label, font_size) as i32;
        let (cell_x, cell_y) = label_cell_origin(value);
        let x = cell_x as i32 + (LABEL_CELL_SIZE as i32 - width) / 2;
        let y = cell_y as i32 + y_offset;
        rasterizer.rasterize_into(canvas, &label, x, y, font_size);
    }
}

/// Renders a full label atlas: all three tiers on one transparent canvas.
pub fn render_label_canvas<R: GlyphRasterizer + ?Sized>(rasterizer: &R, layout: LabelLayout) -> RgbaImage {
    let mut canvas = RgbaImage::new(LABEL_CANVAS_SIZE, LABEL_CANVAS_SIZE);
    for tier in LabelTier::ALL {
        draw_label_tier(rasterizer, &mut canvas, tier, layout);
    }
    canvas
}

// ── LabelOverlays ────────────────────────────────────────────────────────────

/// The three uploaded label atlases and the scale they were built at.
#[derive(Debug)]
pub struct LabelOverlays {
    scale: u32,
    textures: [Option<TextureHandle>; 3],
}

impl LabelOverlays {
    pub fn new(scale: u32) -> Self {
        Self { scale, textures: [None; 3] }
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn get(&self, placement: OverlayPlacement) -> Option<TextureHandle> {
        self.textures[placement.index()]
    }

    pub fn is_built(&self) -> bool {
        self.textures.iter().any(Option::is_some)
    }

    /// Builds and uploads every atlas that is not uploaded yet.
    pub fn build<G, R>(&mut self, graphics: &mut G, rasterizer: &R)
    where
        G: Graphics + ?Sized,
        R: GlyphRasterizer + ?Sized,
    {
        let flags = graphics.layered_flag() | TextureFlags::NO_2D_TEXTURE;
        for placement in OverlayPlacement::ALL {
            let slot = &mut self.textures[placement.index()];
            if slot.is_some() {
                continue;
            }
            let canvas = render_label_canvas(rasterizer, placement.layout(self.scale));
            match graphics.load_texture_raw(
                LABEL_CANVAS_SIZE,
                LABEL_CANVAS_SIZE,
                ImageFormat::Rgba,
                canvas.as_raw(),
                flags,
                "entity-labels",
            ) {
                Ok(handle) => {
                    debug!("overlay: {:?} labels at scale {} are #{}", placement, self.scale, handle.id());
                    *slot = Some(handle);
                }
                Err(e) => warn!("overlay: upload of {:?} labels failed: {e}", placement),
            }
        }
    }

    pub fn release<G: Graphics + ?Sized>(&mut self, graphics: &mut G) {
        for handle in self.textures.iter_mut().filter_map(Option::take) {
            graphics.unload_texture(handle);
        }
    }

    /// Changes the label scale.  Atlases that were already built are
    /// released and rebuilt immediately.  Returns `false` when unchanged.
    pub fn set_scale<G, R>(&mut self, graphics: &mut G, rasterizer: &R, scale: u32) -> bool
    where
        G: Graphics + ?Sized,
        R: GlyphRasterizer + ?Sized,
    {
        if self.scale == scale {
            return false;
        }
        self.scale = scale;
        if self.is_built() {
            self.release(graphics);
            self.build(graphics, rasterizer);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_cover_one_to_max() {
        let all: Vec<u32> = LabelTier::ALL.iter().flat_map(|t| t.values()).collect();
        assert_eq!(all, (1..=MAX_LABEL_VALUE).collect::<Vec<_>>());
    }

    #[test]
    fn widest_labels() {
        assert_eq!(LabelTier::OneDigit.widest_label(), "9");
        assert_eq!(LabelTier::TwoDigits.widest_label(), "99");
        assert_eq!(LabelTier::ThreeDigits.widest_label(), "255");
    }

    #[test]
    fn layout_at_full_scale() {
        assert_eq!(
            OverlayPlacement::Bottom.layout(100),
            LabelLayout { glyph_size: 32, max_width: 64, y_offset: 32 }
        );
        assert_eq!(
            OverlayPlacement::Top.layout(100),
            LabelLayout { glyph_size: 32, max_width: 64, y_offset: 0 }
        );
        assert_eq!(
            OverlayPlacement::Center.layout(100),
            LabelLayout { glyph_size: 64, max_width: 64, y_offset: 0 }
        );
    }

    #[test]
    fn layout_at_half_scale_centers_the_box() {
        // texture size 32, center offset 16.
        assert_eq!(OverlayPlacement::Center.layout(50).y_offset, 16);
        assert_eq!(OverlayPlacement::Top.layout(50), LabelLayout { glyph_size: 16, max_width: 64, y_offset: 8 });
        assert_eq!(OverlayPlacement::Bottom.layout(50).y_offset, 40);
    }

    #[test]
    fn oversized_scale_lays_out_like_full_scale() {
        for placement in OverlayPlacement::ALL {
            assert_eq!(placement.layout(u32::MAX), placement.layout(100));
            assert_eq!(placement.layout(250), placement.layout(100));
        }
    }

    #[test]
    fn label_cells_match_tile_grid() {
        assert_eq!(label_cell_origin(1), (64, 0));
        assert_eq!(label_cell_origin(16), (0, 64));
        assert_eq!(label_cell_origin(255), (960, 960));
    }
}
