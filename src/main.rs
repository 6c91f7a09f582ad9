//! Bakes the entity overlay and number label atlases of one gameplay variant
//! into PNG files, using the same code path the client uses at runtime.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use serde::Deserialize;

use mapimages::config::MapImagesConfig;
use mapimages::entities::EntityLayer;
use mapimages::game_info::GameInfo;
use mapimages::graphics::headless::HeadlessGraphics;
use mapimages::graphics::{GraphicsConfig, ImageFormat, TextureHandle};
use mapimages::map_images::MapImages;
use mapimages::overlay::OverlayPlacement;
use mapimages::text::FontdueRasterizer;
use mapimages::DEFAULT_LABEL_FONT;

#[derive(Parser)]
#[command(author, version, about = "Bake entity overlay atlases to PNG")]
struct Arguments {
    /// Data directory containing the entity images.
    data_dir: PathBuf,
    /// TrueType font used for the number labels; the bundled font if omitted.
    #[arg(long, short = 'f')]
    font: Option<PathBuf>,
    /// Gameplay variant to build.
    #[arg(long, value_enum, default_value = "ddnet")]
    variant: Variant,
    /// Output directory.
    #[arg(long, short = 'o', default_value = "baked")]
    output: PathBuf,
    /// JSON config overriding resource paths, backend capabilities or the
    /// server's game flags.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Label scale in percent; overrides the config.
    #[arg(long)]
    scale: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum Variant {
    Unknown,
    Ddnet,
    Ddrace,
    Race,
    Blockworlds,
    Fng,
    Vanilla,
}

impl Variant {
    /// Server flags that select this variant.
    fn game_info(self) -> GameInfo {
        let mut info = GameInfo::default();
        match self {
            Variant::Unknown => {}
            Variant::Ddnet => info.entities_ddnet = true,
            Variant::Ddrace => info.entities_ddrace = true,
            Variant::Race => info.entities_race = true,
            Variant::Blockworlds => info.entities_blockworlds = true,
            Variant::Fng => info.entities_fng = true,
            Variant::Vanilla => info.entities_vanilla = true,
        }
        info
    }
}

/// Layout of the `--config` file.  Every section is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BakeConfig {
    map_images: MapImagesConfig,
    graphics: GraphicsConfig,
    /// Replaces the flags derived from `--variant`.
    game_info: Option<GameInfo>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let arguments = Arguments::parse();

    let mut config = match &arguments.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("read config {}", path.display()))?;
            serde_json::from_str::<BakeConfig>(&json)
                .with_context(|| format!("parse config {}", path.display()))?
        }
        None => BakeConfig::default(),
    };
    if let Some(scale) = arguments.scale {
        config.map_images.texture_scale = scale;
    }

    let rasterizer = match &arguments.font {
        Some(path) => FontdueRasterizer::from_file(path)?,
        None => FontdueRasterizer::from_bytes(DEFAULT_LABEL_FONT)?,
    };
    let graphics = HeadlessGraphics::new(&arguments.data_dir, config.graphics);
    let mut map_images = MapImages::new(graphics, rasterizer, config.map_images);
    map_images.set_game_info(config.game_info.unwrap_or_else(|| arguments.variant.game_info()));
    map_images.init();

    fs::create_dir_all(&arguments.output)
        .with_context(|| format!("create output directory {}", arguments.output.display()))?;

    let variant = map_images.entities_variant();
    info!("baking {:?} entities", variant);
    for layer in EntityLayer::ALL {
        let handle = map_images
            .entities(layer)
            .with_context(|| format!("build {variant:?} entities"))?;
        let file = arguments.output.join(format!("{}_{:?}.png", variant.image_name(), layer).to_lowercase());
        save_texture(map_images.graphics(), handle, &file)?;
    }

    for placement in OverlayPlacement::ALL {
        let handle = map_images
            .overlay(placement)
            .with_context(|| format!("build {placement:?} labels"))?;
        let file = arguments.output.join(format!("labels_{placement:?}.png").to_lowercase());
        save_texture(map_images.graphics(), handle, &file)?;
    }

    map_images.shutdown();
    Ok(())
}

fn save_texture(graphics: &HeadlessGraphics, handle: TextureHandle, path: &Path) -> Result<()> {
    let texture = graphics
        .texture(handle)
        .with_context(|| format!("texture #{} was released", handle.id()))?;
    let color = match texture.image.format {
        ImageFormat::Alpha => image::ColorType::L8,
        ImageFormat::Rgb => image::ColorType::Rgb8,
        ImageFormat::Rgba => image::ColorType::Rgba8,
    };
    image::save_buffer(path, &texture.image.data, texture.image.width, texture.image.height, color)
        .with_context(|| format!("write {}", path.display()))?;
    info!("wrote {}", path.display());
    Ok(())
}
