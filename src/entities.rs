//! Entity overlay atlases.
//!
//! A gameplay mod ships one 16×16-tile entity image.  From it six derived
//! images are built, one per overlay layer, each keeping only the tiles that
//! mean something on that layer for the active mod.  Everything else is left
//! transparent.

use log::{debug, info, warn};

use crate::graphics::{CellCopy, Graphics, ImageFormat, ImageInfo, TextureFlags, TextureHandle, copy_cell};
use crate::game_info::GameInfo;
use crate::tiles::{self, TILE_BOOST, TILE_COUNT, TILE_SWITCHTIMEDOPEN, TILES_PER_ROW};

/// Source cell drawn for a timed-open switch.
const SWITCHTIMEDOPEN_SOURCE: u8 = 8;

// ── GameplayVariant ──────────────────────────────────────────────────────────

/// Gameplay mod family selecting the entity image and its masking rules.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GameplayVariant {
    /// Mod could not be identified; every layer is built unmasked.
    Unknown,
    DDNet,
    DDRace,
    Race,
    BlockWorlds,
    FNG,
    Vanilla,
}

impl GameplayVariant {
    pub const COUNT: usize = 7;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Unknown,
        Self::DDNet,
        Self::DDRace,
        Self::Race,
        Self::BlockWorlds,
        Self::FNG,
        Self::Vanilla,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// File stem of the entity image for this variant.
    pub fn image_name(self) -> &'static str {
        match self {
            Self::Unknown | Self::DDNet => "ddnet",
            Self::DDRace => "ddrace",
            Self::Race => "race",
            Self::BlockWorlds => "blockworlds",
            Self::FNG => "fng",
            Self::Vanilla => "vanilla",
        }
    }

    fn mask_rule(self) -> MaskRule {
        MASK_RULES[self.index()]
    }
}

// ── EntityLayer ──────────────────────────────────────────────────────────────

/// Map layer an entity overlay is drawn over.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntityLayer {
    Game,
    Front,
    Speedup,
    Switch,
    Tele,
    Tune,
}

impl EntityLayer {
    pub const COUNT: usize = 6;

    pub const ALL: [Self; Self::COUNT] =
        [Self::Game, Self::Front, Self::Speedup, Self::Switch, Self::Tele, Self::Tune];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether `index` is a meaningful tile on this layer.
    pub fn is_valid(self, index: u8) -> bool {
        if index == 0 {
            return false;
        }
        match self {
            Self::Game => tiles::is_valid_game_tile(index),
            Self::Front => tiles::is_valid_front_tile(index),
            Self::Speedup => tiles::is_valid_speedup_tile(index),
            Self::Switch => tiles::is_valid_switch_tile(index),
            Self::Tele => tiles::is_valid_tele_tile(index),
            Self::Tune => tiles::is_valid_tune_tile(index),
        }
    }

    /// Source cell to draw for a valid `index`.  Only the switch layer remaps.
    pub fn source_cell(self, index: u8) -> u8 {
        if self == Self::Switch && index == TILE_SWITCHTIMEDOPEN {
            SWITCHTIMEDOPEN_SOURCE
        } else {
            index
        }
    }
}

// ── Masking rules ────────────────────────────────────────────────────────────

/// Returns the source cell to copy for a tile, or `None` to leave it empty.
pub type MaskRule = fn(EntityLayer, u8) -> Option<u8>;

/// Indexed by [`GameplayVariant::index`].
const MASK_RULES: [MaskRule; GameplayVariant::COUNT] = [
    unmasked,         // Unknown
    strict,           // DDNet
    strict_but_boost, // DDRace
    hide_credits,     // Race
    unmasked,         // BlockWorlds
    hide_credits,     // FNG
    hide_credits,     // Vanilla
];

fn unmasked(_layer: EntityLayer, index: u8) -> Option<u8> {
    (index != 0).then_some(index)
}

fn strict(layer: EntityLayer, index: u8) -> Option<u8> {
    layer.is_valid(index).then(|| layer.source_cell(index))
}

// The ddrace image draws the boost arrow on every layer.
fn strict_but_boost(layer: EntityLayer, index: u8) -> Option<u8> {
    if index == TILE_BOOST {
        return Some(index);
    }
    strict(layer, index)
}

fn hide_credits(_layer: EntityLayer, index: u8) -> Option<u8> {
    (index != 0 && !tiles::is_credits_tile(index)).then_some(index)
}

/// Source cell copied for `index` on `layer` under `variant`'s rules.
pub fn masked_source(variant: GameplayVariant, layer: EntityLayer, index: u8) -> Option<u8> {
    (variant.mask_rule())(layer, index)
}

// ── Pure composition ─────────────────────────────────────────────────────────

/// Layers the active game mode actually draws.  The unknown variant gets all.
pub fn enabled_layers(variant: GameplayVariant, info: &GameInfo) -> [bool; EntityLayer::COUNT] {
    if variant == GameplayVariant::Unknown {
        return [true; EntityLayer::COUNT];
    }
    [
        true,
        info.has_front_layer(),
        info.has_speedup_layer(),
        info.has_switch_layer(),
        info.has_tele_layer(),
        info.has_tune_layer(),
    ]
}

/// A source image can be split into a 16×16 grid of equal cells.
pub fn is_tileable(source: &ImageInfo) -> bool {
    source.width > 0
        && source.height > 0
        && source.width % TILES_PER_ROW == 0
        && source.height % TILES_PER_ROW == 0
        && source.data.len() == source.byte_len()
}

/// Builds the pixels of one derived layer.
///
/// The result has the dimensions and format of `source`.  Each kept tile is
/// copied from its (possibly remapped) source cell into the cell of its own
/// index.  `source` must satisfy [`is_tileable`].
pub fn compose_entity_layer(source: &ImageInfo, variant: GameplayVariant, layer: EntityLayer) -> Vec<u8> {
    let mut out = vec![0u8; source.byte_len()];
    let cell_w = source.width / TILES_PER_ROW;
    let cell_h = source.height / TILES_PER_ROW;
    let channels = source.format.channel_count();

    for index in 0..TILE_COUNT {
        let index = index as u8;
        let Some(from) = masked_source(variant, layer, index) else { continue };
        let (src_col, src_row) = tiles::tile_cell(from);
        let (dst_col, dst_row) = tiles::tile_cell(index);
        copy_cell(&mut out, &source.data, source.width, channels, CellCopy {
            src_x: src_col * cell_w,
            src_y: src_row * cell_h,
            dst_x: dst_col * cell_w,
            dst_y: dst_row * cell_h,
            width: cell_w,
            height: cell_h,
        });
    }
    out
}

/// Builds every enabled layer; disabled layers come back as `None`.
pub fn build_entity_layers(
    source: &ImageInfo,
    variant: GameplayVariant,
    enabled: [bool; EntityLayer::COUNT],
) -> [Option<Vec<u8>>; EntityLayer::COUNT] {
    std::array::from_fn(|i| enabled[i].then(|| compose_entity_layer(source, variant, EntityLayer::ALL[i])))
}

// ── EntityAtlases ────────────────────────────────────────────────────────────

/// Uploaded entity textures, one row per variant.
///
/// A row is either fully populated or empty.  Disabled layers point at the
/// shared transparent placeholder, which is uploaded at most once with the
/// size and format of the first source that needed it.
#[derive(Debug, Default)]
pub struct EntityAtlases {
    slots: [[Option<TextureHandle>; EntityLayer::COUNT]; GameplayVariant::COUNT],
    placeholder: Option<TextureHandle>,
    placeholder_shape: Option<(u32, u32, ImageFormat)>,
}

impl EntityAtlases {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, variant: GameplayVariant, layer: EntityLayer) -> Option<TextureHandle> {
        self.slots[variant.index()][layer.index()]
    }

    pub fn is_built(&self, variant: GameplayVariant) -> bool {
        self.slots[variant.index()].iter().all(Option::is_some)
    }

    pub fn placeholder(&self) -> Option<TextureHandle> {
        self.placeholder
    }

    /// Uploads the six layers of `variant` from an already decoded source.
    ///
    /// Returns `false` and leaves the row empty when the source cannot be
    /// tiled or an upload fails.
    pub fn build<G: Graphics + ?Sized>(
        &mut self,
        graphics: &mut G,
        variant: GameplayVariant,
        source: &ImageInfo,
        enabled: [bool; EntityLayer::COUNT],
        name: &str,
    ) -> bool {
        debug_assert!(!self.is_built(variant), "entity row built twice");
        if !is_tileable(source) {
            warn!(
                "entities: '{}' is {}x{} ({} bytes), not a 16x16 tile grid",
                name,
                source.width,
                source.height,
                source.data.len()
            );
            return false;
        }

        let flags = graphics.layered_flag();
        let layers = build_entity_layers(source, variant, enabled);
        let mut row = [None; EntityLayer::COUNT];

        for (slot, pixels) in row.iter_mut().zip(layers) {
            let uploaded = match pixels {
                Some(pixels) => graphics.load_texture_raw(
                    source.width,
                    source.height,
                    source.format,
                    &pixels,
                    flags,
                    name,
                ),
                None => self.placeholder_for(graphics, source, flags, name),
            };
            match uploaded {
                Ok(handle) => *slot = Some(handle),
                Err(e) => {
                    warn!("entities: upload of '{}' failed: {e}", name);
                    self.release_row(graphics, &row);
                    return false;
                }
            }
        }

        info!("entities: built {:?} layers from '{}'", variant, name);
        self.slots[variant.index()] = row;
        true
    }

    fn placeholder_for<G: Graphics + ?Sized>(
        &mut self,
        graphics: &mut G,
        source: &ImageInfo,
        flags: TextureFlags,
        name: &str,
    ) -> Result<TextureHandle, crate::error::GraphicsError> {
        if let Some((handle, (width, height, format))) = self.placeholder.zip(self.placeholder_shape) {
            if (width, height, format) != (source.width, source.height, source.format) {
                warn!(
                    "entities: '{}' is {}x{} {:?}, transparent placeholder stays {}x{} {:?}",
                    name, source.width, source.height, source.format, width, height, format
                );
            }
            return Ok(handle);
        }
        let empty = ImageInfo::transparent(source.width, source.height, source.format);
        let handle =
            graphics.load_texture_raw(empty.width, empty.height, empty.format, &empty.data, flags, name)?;
        debug!("entities: transparent placeholder is #{}", handle.id());
        self.placeholder = Some(handle);
        self.placeholder_shape = Some((empty.width, empty.height, empty.format));
        Ok(handle)
    }

    fn release_row<G: Graphics + ?Sized>(&self, graphics: &mut G, row: &[Option<TextureHandle>]) {
        for handle in row.iter().flatten() {
            if Some(*handle) != self.placeholder {
                graphics.unload_texture(*handle);
            }
        }
    }

    /// Releases every built row.  The placeholder survives so later builds
    /// keep sharing it.
    pub fn clear<G: Graphics + ?Sized>(&mut self, graphics: &mut G) {
        for row in self.slots {
            self.release_row(graphics, &row);
        }
        self.slots = Default::default();
    }

    /// Releases every row and the placeholder.
    pub fn release_all<G: Graphics + ?Sized>(&mut self, graphics: &mut G) {
        self.clear(graphics);
        if let Some(handle) = self.placeholder.take() {
            graphics.unload_texture(handle);
        }
        self.placeholder_shape = None;
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
