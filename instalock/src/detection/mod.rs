//! Grayscale template matching using zero-mean Normalized Cross-Correlation.
//!
//! Scores are the same measure as OpenCV's `TM_CCOEFF_NORMED`, so a
//! confidence of 0.8 means what it means there.

mod integral;

use crate::error::{Error, Result};
use image::{imageops, DynamicImage, GrayImage};
use integral::Integral;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::trace;

/// Shorter template side (in coarse pixels) we aim for in the coarse pass
const COARSE_TARGET_SIDE: u32 = 12;
/// Largest downsampling factor for the coarse pass
const MAX_COARSE_FACTOR: u32 = 4;
/// Coarse peaks refined at full resolution
const MAX_CANDIDATES: usize = 8;

/// A rectangular region on the screen
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center point, rounded down
    pub fn center(&self) -> (i32, i32) {
        (
            self.x + (self.width / 2) as i32,
            self.y + (self.height / 2) as i32,
        )
    }

    /// Check if a point is within the region
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x
            && x < self.x + self.width as i32
            && y >= self.y
            && y < self.y + self.height as i32
    }
}

/// Best location of a template on screen
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub region: Region,
    /// Normalized cross-correlation (-1.0 to 1.0)
    pub confidence: f32,
}

/// Template pixels at one scale, mean-subtracted
struct Level {
    width: u32,
    height: u32,
    pixels: Vec<f32>,
    norm: f64,
}

impl Level {
    fn new(img: &GrayImage) -> Self {
        let n = (img.width() * img.height()).max(1) as f64;
        let mean = img.pixels().map(|p| p.0[0] as f64).sum::<f64>() / n;
        let pixels: Vec<f32> = img.pixels().map(|p| (p.0[0] as f64 - mean) as f32).collect();
        let norm = pixels
            .iter()
            .map(|&p| (p as f64) * (p as f64))
            .sum::<f64>()
            .sqrt();
        Self {
            width: img.width(),
            height: img.height(),
            pixels,
            norm,
        }
    }

    fn is_flat(&self) -> bool {
        self.norm < 1e-6
    }

    fn fits(&self, img: &GrayImage) -> bool {
        self.width > 0
            && self.height > 0
            && self.width <= img.width()
            && self.height <= img.height()
    }

    /// NCC of this level against the window at (`x`, `y`)
    fn score(&self, img: &GrayImage, integral: &Integral, x: usize, y: usize) -> f32 {
        let (w, h) = (self.width as usize, self.height as usize);
        let n = (w * h) as f64;
        let (sum, sq) = integral.window(x, y, w, h);
        let sum = sum as f64;
        let var_n = sq as f64 - sum * sum / n;
        if var_n < 1e-6 {
            return 0.0;
        }

        // The template is zero-mean, so the window mean drops out of the cross term
        let stride = img.width() as usize;
        let raw = img.as_raw();
        let mut cross = 0.0f64;
        for (ty, tmpl_row) in self.pixels.chunks_exact(w).enumerate() {
            let start = (y + ty) * stride + x;
            let img_row = &raw[start..start + w];
            let row: f32 = img_row
                .iter()
                .zip(tmpl_row)
                .map(|(&p, &t)| p as f32 * t)
                .sum();
            cross += row as f64;
        }

        (cross / (var_n.sqrt() * self.norm)).clamp(-1.0, 1.0) as f32
    }
}

/// A preprocessed template image
pub struct Template {
    name: String,
    full: Level,
    coarse: Option<(u32, Level)>,
}

impl Template {
    /// Load a template from an image file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| Error::Image {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("template")
            .to_string();
        Ok(Self::from_image(name, &img))
    }

    pub fn from_image(name: impl Into<String>, img: &DynamicImage) -> Self {
        Self::from_gray(name, img.to_luma8())
    }

    pub fn from_gray(name: impl Into<String>, gray: GrayImage) -> Self {
        let factor = (gray.width().min(gray.height()) / COARSE_TARGET_SIDE).min(MAX_COARSE_FACTOR);
        let coarse = (factor >= 2).then(|| {
            // Whole coarse pixels only, so coarse and full positions line up exactly
            let (w, h) = (gray.width() / factor * factor, gray.height() / factor * factor);
            let aligned = imageops::crop_imm(&gray, 0, 0, w, h).to_image();
            let small = imageops::resize(
                &aligned,
                w / factor,
                h / factor,
                imageops::FilterType::Triangle,
            );
            (factor, Level::new(&small))
        });
        Self {
            name: name.into(),
            full: Level::new(&gray),
            coarse,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.full.width
    }

    pub fn height(&self) -> u32 {
        self.full.height
    }

    /// A template without any variation can never match
    pub fn is_flat(&self) -> bool {
        self.full.is_flat()
    }
}

/// Find the best match of `template` in `haystack` scoring at least `confidence`
pub fn find(haystack: &GrayImage, template: &Template, confidence: f32) -> Option<Match> {
    let full = &template.full;
    if full.is_flat() || !full.fits(haystack) {
        return None;
    }

    let best = match &template.coarse {
        Some((factor, coarse)) => coarse_to_fine(haystack, full, *factor, coarse),
        None => exhaustive(haystack, full),
    };

    trace!(
        template = %template.name,
        x = best.0,
        y = best.1,
        score = best.2,
        "Best template score"
    );

    (best.2 >= confidence).then(|| Match {
        region: Region::new(best.0 as i32, best.1 as i32, full.width, full.height),
        confidence: best.2,
    })
}

/// Find a template in an RGBA frame (converted to grayscale first)
pub fn find_in_frame(
    frame: &image::RgbaImage,
    template: &Template,
    confidence: f32,
) -> Option<Match> {
    let gray = imageops::grayscale(frame);
    find(&gray, template, confidence)
}

fn exhaustive(img: &GrayImage, level: &Level) -> (usize, usize, f32) {
    let integral = Integral::new(img);
    let max_x = (img.width() - level.width) as usize;
    let max_y = (img.height() - level.height) as usize;

    let mut best = (0, 0, f32::MIN);
    for y in 0..=max_y {
        for x in 0..=max_x {
            let score = level.score(img, &integral, x, y);
            if score > best.2 {
                best = (x, y, score);
            }
        }
    }
    best
}

/// Score every position at reduced scale, then refine the strongest peaks
///
/// Downsampling decorrelates sharp content that sits between coarse pixels,
/// so the screen is reduced at several sub-pixel phases. The strongest peaks
/// are kept regardless of score; only the full-resolution score decides.
fn coarse_to_fine(
    img: &GrayImage,
    full: &Level,
    factor: u32,
    coarse: &Level,
) -> (usize, usize, f32) {
    let step = (factor / 2).max(1);
    let radius = (coarse.width.max(coarse.height) / 2).max(1) as usize * factor as usize;

    let mut candidates = Vec::new();
    for py in (0..factor).step_by(step as usize) {
        for px in (0..factor).step_by(step as usize) {
            candidates.extend(phase_peaks(img, coarse, factor, px, py, radius));
        }
    }
    if candidates.is_empty() {
        return exhaustive(img, full);
    }
    let candidates = strongest(candidates, radius);

    let integral = Integral::new(img);
    let max_x = (img.width() - full.width) as i64;
    let max_y = (img.height() - full.height) as i64;
    let reach = factor as i64 + 1;

    let mut best = (0, 0, f32::MIN);
    for (fx, fy, _) in candidates {
        let (fx, fy) = (fx as i64, fy as i64);
        for y in (fy - reach).max(0)..=(fy + reach).min(max_y) {
            for x in (fx - reach).max(0)..=(fx + reach).min(max_x) {
                let score = full.score(img, &integral, x as usize, y as usize);
                if score > best.2 {
                    best = (x as usize, y as usize, score);
                }
            }
        }
    }
    best
}

/// Strongest coarse peaks for the screen shifted by (`px`, `py`), in full-resolution coordinates
fn phase_peaks(
    img: &GrayImage,
    coarse: &Level,
    factor: u32,
    px: u32,
    py: u32,
    radius: usize,
) -> Vec<(usize, usize, f32)> {
    let w = img.width().saturating_sub(px) / factor * factor;
    let h = img.height().saturating_sub(py) / factor * factor;
    if w / factor < coarse.width || h / factor < coarse.height {
        return Vec::new();
    }

    let shifted = imageops::crop_imm(img, px, py, w, h).to_image();
    let small = imageops::resize(&shifted, w / factor, h / factor, imageops::FilterType::Triangle);
    let integral = Integral::new(&small);

    let (f, px, py) = (factor as usize, px as usize, py as usize);
    let mut peaks = Vec::new();
    for y in 0..=(small.height() - coarse.height) as usize {
        for x in 0..=(small.width() - coarse.width) as usize {
            let score = coarse.score(&small, &integral, x, y);
            peaks.push((px + x * f, py + y * f, score));
        }
    }
    strongest(peaks, radius)
}

/// Non-maximum suppression: the best `MAX_CANDIDATES` peaks at least `radius` apart
fn strongest(mut peaks: Vec<(usize, usize, f32)>, radius: usize) -> Vec<(usize, usize, f32)> {
    peaks.sort_by(|a, b| b.2.total_cmp(&a.2));
    let mut kept: Vec<(usize, usize, f32)> = Vec::with_capacity(MAX_CANDIDATES);
    for (x, y, score) in peaks {
        let dominated = kept
            .iter()
            .any(|&(kx, ky, _)| kx.abs_diff(x) < radius && ky.abs_diff(y) < radius);
        if !dominated {
            kept.push((x, y, score));
            if kept.len() == MAX_CANDIDATES {
                break;
            }
        }
    }
    kept
}
