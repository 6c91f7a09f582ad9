use std::path::PathBuf;

/// Failures reported by a [`Graphics`](crate::graphics::Graphics) backend.
#[derive(Debug, thiserror::Error)]
pub enum GraphicsError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
    #[error("font error: {0}")]
    Font(String),
}

/// Failures surfaced by [`MapImages`](crate::map_images::MapImages).
#[derive(Debug, thiserror::Error)]
pub enum MapImagesError {
    #[error("map declares {declared} images, at most {max} are supported")]
    TooManyImages { declared: usize, max: usize },
    #[error(transparent)]
    Graphics(#[from] GraphicsError),
    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),
}
