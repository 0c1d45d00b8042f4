//! Fake screens and pointers for driving the lock sequence without hardware.

#![allow(dead_code)]

use image::{imageops, DynamicImage, GrayImage, Luma, RgbaImage};
use instalock::{FrameSource, LockOptions, LockTemplates, Pointer, Template};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const AVATAR_AT: (u32, u32) = (50, 60);
pub const LOCK_IN_AT: (u32, u32) = (200, 130);
/// Centers of the avatar (40x40) and lock-in button (60x30)
pub const AVATAR_CENTER: (i32, i32) = (70, 80);
pub const LOCK_IN_CENTER: (i32, i32) = (230, 145);

/// Smooth random texture: coarse noise upscaled with linear filtering
pub fn texture(width: u32, height: u32, seed: u64) -> GrayImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = GrayImage::from_fn(width / 8 + 2, height / 8 + 2, |_, _| {
        Luma([rng.gen_range(0..=255u8)])
    });
    imageops::resize(&noise, width, height, imageops::FilterType::Triangle)
}

/// A synthetic agent-select screen
pub struct Scene {
    pub avatar: GrayImage,
    pub lock_in: GrayImage,
    /// Avatar and lock-in button both visible
    pub select: RgbaImage,
    /// Avatar visible, lock-in button not yet drawn
    pub avatar_only: RgbaImage,
    /// Loading screen: nothing to find
    pub blank: RgbaImage,
}

pub fn scene() -> Scene {
    let background = texture(320, 180, 10);
    let avatar = texture(40, 40, 11);
    let lock_in = texture(60, 30, 12);

    let mut avatar_only = background.clone();
    imageops::overlay(&mut avatar_only, &avatar, AVATAR_AT.0 as i64, AVATAR_AT.1 as i64);
    let mut select = avatar_only.clone();
    imageops::overlay(&mut select, &lock_in, LOCK_IN_AT.0 as i64, LOCK_IN_AT.1 as i64);

    Scene {
        avatar,
        lock_in,
        select: rgba(select),
        avatar_only: rgba(avatar_only),
        blank: rgba(GrayImage::from_pixel(320, 180, Luma([90]))),
    }
}

fn rgba(gray: GrayImage) -> RgbaImage {
    DynamicImage::ImageLuma8(gray).to_rgba8()
}

pub fn templates(scene: &Scene) -> LockTemplates {
    LockTemplates::new(
        "jett",
        Template::from_gray("jett", scene.avatar.clone()),
        Template::from_gray("lock_in", scene.lock_in.clone()),
    )
}

pub fn fast_options() -> LockOptions {
    LockOptions {
        confidence: 0.8,
        poll_interval: Duration::from_millis(1),
        input_pause: Duration::ZERO,
    }
}

/// Plays back queued frames, then repeats a fallback frame forever
pub struct ScriptedScreen {
    frames: VecDeque<RgbaImage>,
    fallback: RgbaImage,
    captures: Arc<AtomicUsize>,
}

impl ScriptedScreen {
    pub fn new(fallback: RgbaImage) -> Self {
        Self {
            frames: VecDeque::new(),
            fallback,
            captures: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn then(mut self, frame: RgbaImage, times: usize) -> Self {
        for _ in 0..times {
            self.frames.push_back(frame.clone());
        }
        self
    }

    /// Capture counter that stays readable after the screen moves to a worker
    pub fn captures(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.captures)
    }
}

impl FrameSource for ScriptedScreen {
    fn capture(&mut self) -> instalock_capture::Result<RgbaImage> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .frames
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone()))
    }
}

/// A screen whose capture always fails
pub struct BrokenScreen;

impl FrameSource for BrokenScreen {
    fn capture(&mut self) -> instalock_capture::Result<RgbaImage> {
        Err(instalock_capture::Error::ScreenshotFailed(
            "display gone".to_string(),
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move(i32, i32),
    Press,
    Release,
}

/// Records pointer actions instead of performing them
#[derive(Clone, Default)]
pub struct RecordingPointer {
    log: Arc<Mutex<Vec<Action>>>,
}

impl RecordingPointer {
    pub fn actions(&self) -> Vec<Action> {
        self.log.lock().unwrap().clone()
    }

    pub fn presses(&self) -> usize {
        self.actions().iter().filter(|a| **a == Action::Press).count()
    }
}

impl Pointer for RecordingPointer {
    fn move_to(&mut self, x: i32, y: i32) -> instalock::Result<()> {
        self.log.lock().unwrap().push(Action::Move(x, y));
        Ok(())
    }

    fn press(&mut self) -> instalock::Result<()> {
        self.log.lock().unwrap().push(Action::Press);
        Ok(())
    }

    fn release(&mut self) -> instalock::Result<()> {
        self.log.lock().unwrap().push(Action::Release);
        Ok(())
    }
}

/// The full click pattern of one successful lock
pub fn lock_sequence() -> Vec<Action> {
    vec![
        Action::Move(AVATAR_CENTER.0, AVATAR_CENTER.1),
        Action::Press,
        Action::Release,
        Action::Move(LOCK_IN_CENTER.0, LOCK_IN_CENTER.1),
        Action::Press,
        Action::Release,
    ]
}
