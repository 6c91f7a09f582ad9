pub mod config;
pub mod entities;
pub mod error;
pub mod game_info;
pub mod graphics;
pub mod map;
pub mod map_images;
pub mod overlay;
pub mod text;
pub mod tiles;

/// DejaVu Sans, used for the number labels when no other font is given.
pub const DEFAULT_LABEL_FONT: &[u8] = include_bytes!("../resources/DejaVuSans.ttf");

pub use entities::{EntityLayer, GameplayVariant};
pub use error::{GraphicsError, MapImagesError};
pub use graphics::{Graphics, TextureHandle};
pub use map_images::MapImages;
