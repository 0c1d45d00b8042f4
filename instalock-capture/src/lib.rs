//! instalock-capture: screen capture for instalock
//!
//! - Workspace screenshots through KWin's ScreenShot2 D-Bus interface
//! - Replay of screenshots saved on disk
//! - Conversion of raw QImage buffers to RGBA

pub mod error;
mod file;
mod kwin;
pub mod pixels;

pub use error::{Error, Result};
pub use file::ImageFileSource;
pub use kwin::KwinCapture;

use image::{ImageFormat, RgbaImage};
use std::path::Path;

/// Anything that can produce full-screen frames
pub trait FrameSource {
    /// Capture the current screen contents
    fn capture(&mut self) -> Result<RgbaImage>;

    /// Screen size in pixels, taken from a fresh frame
    fn resolution(&mut self) -> Result<(u32, u32)> {
        Ok(self.capture()?.dimensions())
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn capture(&mut self) -> Result<RgbaImage> {
        (**self).capture()
    }

    fn resolution(&mut self) -> Result<(u32, u32)> {
        (**self).resolution()
    }
}

/// Save a frame as PNG
pub fn save_png(frame: &RgbaImage, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    frame
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| Error::ScreenshotFailed(format!("Failed to save {}: {}", path.display(), e)))
}
