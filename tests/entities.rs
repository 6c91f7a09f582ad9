use image::RgbaImage;

use mapimages::config::MapImagesConfig;
use mapimages::entities::{EntityLayer, GameplayVariant};
use mapimages::game_info::GameInfo;
use mapimages::graphics::headless::HeadlessGraphics;
use mapimages::graphics::{GraphicsConfig, ImageFormat, ImageInfo, TextureFlags};
use mapimages::map_images::MapImages;
use mapimages::text::GlyphRasterizer;
use mapimages::tiles::{TILE_COUNT, is_valid_game_tile};

// ── helpers ───────────────────────────────────────────────────────────────

struct NoText;

impl GlyphRasterizer for NoText {
    fn text_width(&self, text: &str, size: u32) -> u32 {
        text.len() as u32 * size / 2
    }

    fn rasterize_into(&self, _canvas: &mut RgbaImage, _text: &str, _x: i32, _y: i32, _size: u32) {}
}

/// Opaque 32×32 RGBA source with 2×2 cells; red channel = tile index.
fn opaque_source() -> ImageInfo {
    let mut data = Vec::with_capacity(32 * 32 * 4);
    for y in 0..32u32 {
        for x in 0..32u32 {
            let index = (y / 2) * 16 + x / 2;
            data.extend_from_slice(&[index as u8, 10, 20, 255]);
        }
    }
    ImageInfo { width: 32, height: 32, format: ImageFormat::Rgba, data }
}

fn core_with(variants: &[GameplayVariant]) -> MapImages<HeadlessGraphics, NoText> {
    let config = MapImagesConfig::default();
    let mut graphics = HeadlessGraphics::new("/nonexistent", GraphicsConfig::default());
    for &variant in variants {
        graphics.insert_file(config.entities_path(variant), opaque_source());
    }
    MapImages::new(graphics, NoText, config)
}

/// Tile indices whose 2×2 cell is not fully transparent.
fn opaque_cells(image: &ImageInfo) -> Vec<usize> {
    (0..TILE_COUNT)
        .filter(|&i| {
            let (cx, cy) = ((i % 16) as u32 * 2, (i / 16) as u32 * 2);
            (0..2).any(|dy| {
                (0..2).any(|dx| {
                    let off = (((cy + dy) * 32 + cx + dx) * 4) as usize;
                    image.data[off + 3] != 0
                })
            })
        })
        .collect()
}

// ── Lazy build and caching ────────────────────────────────────────────────

#[test]
fn nothing_is_built_before_the_first_request() {
    let core = core_with(&[GameplayVariant::DDNet]);
    assert_eq!(core.graphics().upload_count(), 0);
    assert_eq!(core.graphics().decode_count(), 0);
}

#[test]
fn second_request_reuses_the_built_set() {
    let mut core = core_with(&[GameplayVariant::DDNet]);
    core.set_game_info(GameInfo { entities_ddnet: true, ..Default::default() });

    let first: Vec<_> = EntityLayer::ALL.iter().map(|&l| core.entities(l)).collect();
    let uploads = core.graphics().upload_count();
    assert_eq!(uploads, EntityLayer::COUNT);
    assert_eq!(core.graphics().decode_count(), 1);

    let second: Vec<_> = EntityLayer::ALL.iter().map(|&l| core.entities(l)).collect();
    assert_eq!(first, second);
    assert_eq!(core.graphics().upload_count(), uploads);
    assert_eq!(core.graphics().decode_count(), 1);
}

#[test]
fn ddnet_layers_are_all_distinct() {
    let mut core = core_with(&[GameplayVariant::DDNet]);
    core.set_game_info(GameInfo { entities_ddnet: true, ..Default::default() });
    let mut handles: Vec<_> = EntityLayer::ALL.iter().map(|&l| core.entities(l).unwrap()).collect();
    handles.sort();
    handles.dedup();
    assert_eq!(handles.len(), EntityLayer::COUNT);
    assert_eq!(core.transparent_placeholder(), None);
}

#[test]
fn entity_textures_use_layered_upload_flag() {
    let mut core = core_with(&[GameplayVariant::DDNet]);
    let handle = core.entities_for(GameplayVariant::DDNet, EntityLayer::Game).unwrap();
    let texture = core.graphics().texture(handle).unwrap();
    assert_eq!(texture.flags, TextureFlags::TO_2D_ARRAY_TEXTURE);
    assert_eq!(texture.name, "editor/entities_clear/ddnet.png");
}

// ── Placeholder sharing ───────────────────────────────────────────────────

#[test]
fn disabled_layers_share_one_transparent_texture() {
    let mut core = core_with(&[GameplayVariant::Race, GameplayVariant::Vanilla]);

    core.set_game_info(GameInfo { entities_race: true, ..Default::default() });
    let front = core.entities(EntityLayer::Front).unwrap();
    let tune = core.entities(EntityLayer::Tune).unwrap();
    assert_eq!(front, tune);
    assert_eq!(core.transparent_placeholder(), Some(front));
    assert_ne!(core.entities(EntityLayer::Game).unwrap(), front);

    core.set_game_info(GameInfo { entities_vanilla: true, ..Default::default() });
    assert_eq!(core.entities(EntityLayer::Switch), Some(front));

    // Race game + Vanilla game + one placeholder.
    assert_eq!(core.graphics().upload_count(), 3);
    let transparent = core
        .graphics()
        .live_handles()
        .into_iter()
        .filter(|&h| core.graphics().texture(h).unwrap().is_transparent())
        .count();
    assert_eq!(transparent, 1);
}

#[test]
fn separate_instances_do_not_share_placeholders() {
    let info = GameInfo { entities_fng: true, ..Default::default() };
    let mut a = core_with(&[GameplayVariant::FNG]);
    let mut b = core_with(&[GameplayVariant::FNG]);
    a.set_game_info(info);
    b.set_game_info(info);
    a.entities(EntityLayer::Tele);
    b.entities(EntityLayer::Tele);
    assert_eq!(a.graphics().upload_count(), 2);
    assert_eq!(b.graphics().upload_count(), 2);
}

#[test]
fn placeholder_keeps_the_shape_of_the_first_source() {
    let mut core = core_with(&[GameplayVariant::Race]);
    let path = core.config().entities_path(GameplayVariant::FNG);
    core.graphics_mut().insert_file(path, ImageInfo::transparent(16, 16, ImageFormat::Alpha));

    core.set_game_info(GameInfo { entities_race: true, ..Default::default() });
    let placeholder = core.entities(EntityLayer::Front).unwrap();

    core.set_game_info(GameInfo { entities_fng: true, ..Default::default() });
    let game = core.entities(EntityLayer::Game).unwrap();
    assert_eq!(core.entities(EntityLayer::Front), Some(placeholder));

    let game = &core.graphics().texture(game).unwrap().image;
    assert_eq!((game.width, game.format), (16, ImageFormat::Alpha));
    let shared = &core.graphics().texture(placeholder).unwrap().image;
    assert_eq!((shared.width, shared.height, shared.format), (32, 32, ImageFormat::Rgba));
}

// ── Masking ───────────────────────────────────────────────────────────────

#[test]
fn game_layer_copies_exactly_the_valid_game_tiles() {
    let mut core = core_with(&[GameplayVariant::DDNet]);
    let handle = core.entities_for(GameplayVariant::DDNet, EntityLayer::Game).unwrap();
    let image = &core.graphics().texture(handle).unwrap().image;

    let expected: Vec<usize> = (1..TILE_COUNT).filter(|&i| is_valid_game_tile(i as u8)).collect();
    assert_eq!(opaque_cells(image), expected);
}

#[test]
fn unknown_variant_copies_every_nonzero_tile_on_every_layer() {
    let mut core = core_with(&[GameplayVariant::Unknown]);
    for layer in EntityLayer::ALL {
        let handle = core.entities_for(GameplayVariant::Unknown, layer).unwrap();
        let image = &core.graphics().texture(handle).unwrap().image;
        assert_eq!(opaque_cells(image), (1..TILE_COUNT).collect::<Vec<_>>(), "{layer:?}");
    }
}

#[test]
fn copied_cells_keep_source_pixels() {
    let mut core = core_with(&[GameplayVariant::DDNet]);
    core.set_game_info(GameInfo { entities_ddnet: true, ..Default::default() });
    let handle = core.entities(EntityLayer::Speedup).unwrap();
    let image = &core.graphics().texture(handle).unwrap().image;
    // Boost (28) sits at cell (12, 1); pixel (24, 2).
    let off = (2 * 32 + 24) * 4;
    assert_eq!(&image.data[off..off + 4], &[28, 10, 20, 255]);
    assert_eq!(opaque_cells(image), vec![28]);
}

#[test]
fn switch_layer_draws_cell_eight_at_timed_open() {
    let mut core = core_with(&[GameplayVariant::DDNet]);
    core.set_game_info(GameInfo { entities_ddnet: true, ..Default::default() });
    let handle = core.entities(EntityLayer::Switch).unwrap();
    let image = &core.graphics().texture(handle).unwrap().image;
    // Tile 22 is cell (6, 1): pixel (12, 2).
    let off = (2 * 32 + 12) * 4;
    assert_eq!(image.data[off], 8);
    assert!(!opaque_cells(image).contains(&8));
}

// ── Failures ──────────────────────────────────────────────────────────────

#[test]
fn missing_source_builds_nothing_and_retries_later() {
    let mut core = core_with(&[]);
    assert_eq!(core.entities_for(GameplayVariant::FNG, EntityLayer::Game), None);
    assert_eq!(core.graphics().upload_count(), 0);

    let path = core.config().entities_path(GameplayVariant::FNG);
    core.graphics_mut().insert_file(path, opaque_source());
    assert!(core.entities_for(GameplayVariant::FNG, EntityLayer::Game).is_some());
    assert_eq!(core.graphics().decode_count(), 2);
}

#[test]
fn untileable_source_is_treated_as_decode_failure() {
    let mut core = core_with(&[]);
    let path = core.config().entities_path(GameplayVariant::DDNet);
    core.graphics_mut().insert_file(path, ImageInfo::transparent(24, 16, ImageFormat::Rgba));
    assert_eq!(core.entities_for(GameplayVariant::DDNet, EntityLayer::Game), None);
    assert_eq!(core.graphics().upload_count(), 0);
}

#[test]
fn rgb_and_alpha_sources_keep_their_format() {
    for format in [ImageFormat::Rgb, ImageFormat::Alpha] {
        let mut core = core_with(&[]);
        let path = core.config().entities_path(GameplayVariant::Vanilla);
        core.graphics_mut().insert_file(path, ImageInfo::transparent(16, 16, format));
        let handle = core.entities_for(GameplayVariant::Vanilla, EntityLayer::Game).unwrap();
        assert_eq!(core.graphics().texture(handle).unwrap().image.format, format);
    }
}

// ── Reset ─────────────────────────────────────────────────────────────────

#[test]
fn reset_entities_rebuilds_but_keeps_placeholder() {
    let mut core = core_with(&[GameplayVariant::Race]);
    core.set_game_info(GameInfo { entities_race: true, ..Default::default() });
    let placeholder = core.entities(EntityLayer::Front).unwrap();
    let game = core.entities(EntityLayer::Game).unwrap();

    core.reset_entities();
    assert!(core.graphics().texture(game).is_none());
    assert!(core.graphics().texture(placeholder).is_some());

    assert_eq!(core.entities(EntityLayer::Front), Some(placeholder));
    assert_eq!(core.graphics().upload_count(), 3);
}
