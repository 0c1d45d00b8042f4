//! The lock sequence: find the avatar, click it, find lock-in, click it.

use crate::assets::display_name;
use crate::detection::{self, Match, Template};
use crate::error::Result;
use instalock_capture::FrameSource;
use instalock_input::{MouseButton, VirtualPointer};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{debug, trace};

/// Anything that can point and click at absolute screen coordinates
pub trait Pointer {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()>;
    fn press(&mut self) -> Result<()>;
    fn release(&mut self) -> Result<()>;
}

impl Pointer for VirtualPointer {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        Ok(VirtualPointer::move_to(self, x, y)?)
    }

    fn press(&mut self) -> Result<()> {
        Ok(self.mouse_down(MouseButton::Left)?)
    }

    fn release(&mut self) -> Result<()> {
        Ok(self.mouse_up(MouseButton::Left)?)
    }
}

impl<P: Pointer + ?Sized> Pointer for Box<P> {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        (**self).move_to(x, y)
    }

    fn press(&mut self) -> Result<()> {
        (**self).press()
    }

    fn release(&mut self) -> Result<()> {
        (**self).release()
    }
}

/// Thresholds and pacing for the lock sequence
#[derive(Debug, Clone, PartialEq)]
pub struct LockOptions {
    /// Minimum match score (0.0 to 1.0)
    pub confidence: f32,
    /// Delay between search attempts
    pub poll_interval: Duration,
    /// Pause after every pointer action
    pub input_pause: Duration,
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            confidence: 0.8,
            poll_interval: Duration::from_millis(10),
            input_pause: Duration::from_millis(10),
        }
    }
}

/// The avatar and lock-in templates for one agent
pub struct LockTemplates {
    agent: String,
    pub avatar: Template,
    pub lock_in: Template,
}

impl LockTemplates {
    pub fn new(agent: impl AsRef<str>, avatar: Template, lock_in: Template) -> Self {
        Self {
            agent: display_name(agent.as_ref()),
            avatar,
            lock_in,
        }
    }

    /// Title-cased agent name
    pub fn agent(&self) -> &str {
        &self.agent
    }
}

/// Where the sequence currently stands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum LockPhase {
    Idle = 0,
    Searching = 1,
    Matched = 2,
    Locked = 3,
}

impl LockPhase {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => LockPhase::Searching,
            2 => LockPhase::Matched,
            3 => LockPhase::Locked,
            _ => LockPhase::Idle,
        }
    }
}

impl fmt::Display for LockPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LockPhase::Idle => "idle",
            LockPhase::Searching => "searching",
            LockPhase::Matched => "matched",
            LockPhase::Locked => "locked",
        };
        f.write_str(name)
    }
}

/// Lock phase readable from other threads
#[derive(Debug, Default)]
pub struct PhaseCell(AtomicU8);

impl PhaseCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> LockPhase {
        LockPhase::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, phase: LockPhase) {
        let old = LockPhase::from_u8(self.0.swap(phase as u8, Ordering::AcqRel));
        if old != phase {
            debug!(from = %old, to = %phase, "Lock phase");
        }
    }
}

/// Which template an attempt failed to find
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Avatar,
    LockIn,
}

/// Both matches of a completed lock
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LockedAt {
    pub avatar: Match,
    pub lock_in: Match,
}

/// Outcome of one pass through the sequence
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Attempt {
    NotFound(Target),
    Locked(LockedAt),
}

/// Run the sequence once
///
/// "Not found" is an ordinary outcome, not an error. Errors mean capture or
/// input failed.
pub fn attempt_lock<S, P>(
    screen: &mut S,
    pointer: &mut P,
    templates: &LockTemplates,
    options: &LockOptions,
    phase: &PhaseCell,
) -> Result<Attempt>
where
    S: FrameSource + ?Sized,
    P: Pointer + ?Sized,
{
    phase.set(LockPhase::Searching);

    let frame = screen.capture()?;
    let Some(avatar) = detection::find_in_frame(&frame, &templates.avatar, options.confidence)
    else {
        trace!(agent = %templates.agent, "Avatar not on screen");
        return Ok(Attempt::NotFound(Target::Avatar));
    };

    phase.set(LockPhase::Matched);
    let (x, y) = avatar.region.center();
    debug!(x, y, confidence = avatar.confidence, "Clicking avatar");
    pointer.move_to(x, y)?;
    pause(options);
    pointer.press()?;
    pointer.release()?;
    pause(options);

    let frame = screen.capture()?;
    let Some(lock_in) = detection::find_in_frame(&frame, &templates.lock_in, options.confidence)
    else {
        trace!("Lock-in button not on screen");
        phase.set(LockPhase::Searching);
        return Ok(Attempt::NotFound(Target::LockIn));
    };

    // Separate down/up: some clients ignore a synthetic single click here
    let (x, y) = lock_in.region.center();
    debug!(x, y, confidence = lock_in.confidence, "Clicking lock in");
    pointer.move_to(x, y)?;
    pause(options);
    pointer.press()?;
    pause(options);
    pointer.release()?;

    phase.set(LockPhase::Locked);
    Ok(Attempt::Locked(LockedAt { avatar, lock_in }))
}

/// Retry the sequence every `poll_interval` until the agent is locked
///
/// There is no timeout and no retry cap; only errors end the loop early.
pub fn run_until_locked<S, P>(
    screen: &mut S,
    pointer: &mut P,
    templates: &LockTemplates,
    options: &LockOptions,
) -> Result<LockedAt>
where
    S: FrameSource + ?Sized,
    P: Pointer + ?Sized,
{
    let phase = PhaseCell::new();
    let mut attempts: u64 = 0;
    loop {
        attempts += 1;
        match attempt_lock(screen, pointer, templates, options, &phase)? {
            Attempt::Locked(at) => {
                debug!(attempts, "Locked");
                return Ok(at);
            }
            Attempt::NotFound(_) => thread::sleep(options.poll_interval),
        }
    }
}

fn pause(options: &LockOptions) {
    if !options.input_pause.is_zero() {
        thread::sleep(options.input_pause);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_round_trips_through_cell() {
        let cell = PhaseCell::new();
        assert_eq!(cell.get(), LockPhase::Idle);
        for phase in [LockPhase::Searching, LockPhase::Matched, LockPhase::Locked] {
            cell.set(phase);
            assert_eq!(cell.get(), phase);
        }
    }

    #[test]
    fn default_options() {
        let options = LockOptions::default();
        assert_eq!(options.confidence, 0.8);
        assert_eq!(options.poll_interval, Duration::from_millis(10));
    }
}
