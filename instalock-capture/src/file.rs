use crate::error::{Error, Result};
use crate::FrameSource;
use image::RgbaImage;
use std::path::{Path, PathBuf};

/// Replays a screenshot saved on disk
///
/// The file is re-read on every capture, so it can be swapped while a
/// search is running.
pub struct ImageFileSource {
    path: PathBuf,
}

impl ImageFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSource for ImageFileSource {
    fn capture(&mut self) -> Result<RgbaImage> {
        let img = image::open(&self.path).map_err(|source| Error::Image {
            path: self.path.display().to_string(),
            source,
        })?;
        Ok(img.to_rgba8())
    }
}
