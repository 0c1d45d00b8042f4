//! `instalock` watches a game's agent-select screen and locks in an agent
//! the moment it becomes pickable.
//!
//! # Core Components
//! - [`assets`]: resolution-keyed template images (avatars and the lock-in button).
//! - [`detection`]: grayscale template matching by normalized cross-correlation.
//! - [`lock`]: one pass of the find-click-confirm sequence, and the retry loop.
//! - [`worker`]: a background worker gated by an enabled flag and a stop flag.
//!
//! Screen capture lives in `instalock-capture` and pointer input in
//! `instalock-input`.

pub mod assets;
pub mod config;
pub mod detection;
mod error;
pub mod lock;
mod resolution;
pub mod worker;

pub use error::{Error, Result};

pub use assets::AssetSet;
pub use config::Config;
pub use detection::{Match, Region, Template};
pub use lock::{
    attempt_lock, run_until_locked, Attempt, LockOptions, LockPhase, LockTemplates, LockedAt,
    PhaseCell, Pointer, Target,
};
pub use resolution::Resolution;
pub use worker::{Instalocker, WorkerEvent};

pub use instalock_capture::{FrameSource, ImageFileSource, KwinCapture};
pub use instalock_input::VirtualPointer;
