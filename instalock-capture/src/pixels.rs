//! Conversion of raw QImage buffers into RGBA images.

use crate::error::{Error, Result};
use image::{ImageBuffer, RgbaImage};

/// Byte order of a 32-bit pixel as it sits in memory
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelLayout {
    /// QImage RGB32/ARGB32 family: 0xAARRGGBB words, stored little-endian
    Bgra,
    /// QImage RGBX8888/RGBA8888 family: bytes in R, G, B, A order
    Rgba,
}

impl PixelLayout {
    /// Map a `QImage::Format` value to a layout
    pub fn from_qimage_format(format: u32) -> Result<Self> {
        match format {
            // Format_RGB32, Format_ARGB32, Format_ARGB32_Premultiplied
            4..=6 => Ok(PixelLayout::Bgra),
            // Format_RGBX8888, Format_RGBA8888, Format_RGBA8888_Premultiplied
            16..=18 => Ok(PixelLayout::Rgba),
            other => Err(Error::UnsupportedFormat(other)),
        }
    }
}

/// Copy a strided 32-bit buffer into a tightly packed RGBA image
pub fn to_rgba_image(
    raw: &[u8],
    width: u32,
    height: u32,
    stride: u32,
    layout: PixelLayout,
) -> Result<RgbaImage> {
    let row_bytes = width as usize * 4;
    let stride = stride as usize;
    if stride < row_bytes {
        return Err(Error::ScreenshotFailed(format!(
            "Stride {} smaller than row bytes {}",
            stride, row_bytes
        )));
    }
    let needed = stride * height.saturating_sub(1) as usize + row_bytes;
    if height > 0 && raw.len() < needed {
        return Err(Error::ScreenshotFailed(format!(
            "Image data truncated: got {} bytes, need {}",
            raw.len(),
            needed
        )));
    }

    let mut rgba = Vec::with_capacity(row_bytes * height as usize);
    for y in 0..height as usize {
        let row = &raw[y * stride..y * stride + row_bytes];
        for px in row.chunks_exact(4) {
            match layout {
                PixelLayout::Bgra => rgba.extend_from_slice(&[px[2], px[1], px[0], px[3]]),
                PixelLayout::Rgba => rgba.extend_from_slice(px),
            }
        }
    }

    ImageBuffer::from_raw(width, height, rgba)
        .ok_or_else(|| Error::ScreenshotFailed("Failed to create image buffer".into()))
}
