//! Error types for instalock-capture.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Screenshot failed: {0}")]
    ScreenshotFailed(String),

    #[error("Unsupported pixel format {0} in KWin reply")]
    UnsupportedFormat(u32),

    #[error("Failed to load image {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
