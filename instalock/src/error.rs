//! Error types and Result alias for instalock.

use crate::resolution::Resolution;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported resolution {resolution}: no templates under {}. Available: {available}", .dir.display())]
    UnsupportedResolution {
        resolution: Resolution,
        dir: PathBuf,
        available: String,
    },

    #[error("Template file {} does not exist", .0.display())]
    TemplateMissing(PathBuf),

    #[error("No agent avatars found in {}", .0.display())]
    NoAgents(PathBuf),

    #[error("Invalid agent name '{0}'")]
    InvalidAgent(String),

    #[error("Invalid resolution '{0}': expected WxH, e.g. 1920x1080")]
    InvalidResolution(String),

    #[error("Failed to load template {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Capture error: {0}")]
    Capture(#[from] instalock_capture::Error),

    #[error("Input error: {0}")]
    Input(#[from] instalock_input::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
