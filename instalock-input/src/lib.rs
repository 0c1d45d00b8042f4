//! Virtual pointer for clicking at absolute screen coordinates.
//!
//! Backed by a uinput device with absolute X/Y axes, so moves do not depend
//! on the current cursor position or on pointer acceleration.
//! Requires access to /dev/uinput (typically root or input group membership).

mod device;
pub mod error;
pub mod mouse;

use evdev::uinput::VirtualDevice;
use evdev::{AbsoluteAxisType, EventType, InputEvent};
use std::collections::HashSet;
use tracing::{debug, trace};

pub use error::{Error, Result};
pub use mouse::MouseButton;

/// Virtual absolute pointer bound to one screen size
pub struct VirtualPointer {
    device: VirtualDevice,
    width: u32,
    height: u32,
    held_buttons: HashSet<MouseButton>,
}

impl VirtualPointer {
    /// Create a new virtual pointer covering a `width` x `height` screen
    ///
    /// Note: This takes ~1 second as the kernel needs time to recognize the device.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyArea { width, height });
        }
        let device = device::create_pointer_device(width, height)?;
        debug!(width, height, "Virtual pointer created");
        Ok(Self {
            device,
            width,
            height,
            held_buttons: HashSet::new(),
        })
    }

    /// Screen size the pointer axes were created for
    pub fn area(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Move the cursor to an absolute position, clamped to the screen
    pub fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        let (x, y) = clamp_to_area(x, y, self.width, self.height);
        trace!(x, y, "Pointer move");
        let events = [
            InputEvent::new_now(EventType::ABSOLUTE, AbsoluteAxisType::ABS_X.0, x),
            InputEvent::new_now(EventType::ABSOLUTE, AbsoluteAxisType::ABS_Y.0, y),
        ];
        self.device.emit(&events).map_err(Error::EmitFailed)
    }

    /// Click a mouse button (press and release)
    pub fn click(&mut self, button: MouseButton) -> Result<()> {
        self.mouse_down(button)?;
        self.mouse_up(button)
    }

    /// Press a mouse button down
    pub fn mouse_down(&mut self, button: MouseButton) -> Result<()> {
        self.held_buttons.insert(button);
        self.emit_button(button, 1)
    }

    /// Release a mouse button
    pub fn mouse_up(&mut self, button: MouseButton) -> Result<()> {
        self.held_buttons.remove(&button);
        self.emit_button(button, 0)
    }

    /// Check if a mouse button is currently held down
    pub fn is_held(&self, button: MouseButton) -> bool {
        self.held_buttons.contains(&button)
    }

    /// Release every held mouse button
    ///
    /// This is called automatically when the pointer is dropped.
    pub fn release_all(&mut self) -> Result<()> {
        let buttons: Vec<MouseButton> = self.held_buttons.iter().copied().collect();
        for button in buttons {
            self.mouse_up(button)?;
        }
        Ok(())
    }

    fn emit_button(&mut self, button: MouseButton, value: i32) -> Result<()> {
        let event = InputEvent::new_now(EventType::KEY, button.to_key().code(), value);
        self.device.emit(&[event]).map_err(Error::EmitFailed)
    }
}

impl Drop for VirtualPointer {
    fn drop(&mut self) {
        // Best-effort cleanup - swallow errors since Drop can't return Result
        let _ = self.release_all();
    }
}

/// Clamp a point into `[0, width) x [0, height)`
pub fn clamp_to_area(x: i32, y: i32, width: u32, height: u32) -> (i32, i32) {
    let max_x = width.saturating_sub(1).min(i32::MAX as u32) as i32;
    let max_y = height.saturating_sub(1).min(i32::MAX as u32) as i32;
    (x.clamp(0, max_x), y.clamp(0, max_y))
}
