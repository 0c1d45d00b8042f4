use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AbsInfo, AbsoluteAxisType, AttributeSet, Key, UinputAbsSetup};
use std::thread;
use std::time::Duration;

use crate::error::Result;
use crate::mouse::MouseButton;

/// Creates an absolute pointing device covering a `width` x `height` screen.
///
/// Absolute axes plus mouse buttons make libinput treat the device like a
/// tablet-style pointer, so a single event pair lands the cursor exactly on
/// the target regardless of pointer acceleration.
pub fn create_pointer_device(width: u32, height: u32) -> Result<VirtualDevice> {
    let mut keys = AttributeSet::<Key>::new();
    for button in MouseButton::ALL {
        keys.insert(button.to_key());
    }

    let abs_x = UinputAbsSetup::new(AbsoluteAxisType::ABS_X, axis_info(width));
    let abs_y = UinputAbsSetup::new(AbsoluteAxisType::ABS_Y, axis_info(height));

    let device = VirtualDeviceBuilder::new()?
        .name("instalock virtual pointer")
        .with_keys(&keys)?
        .with_absolute_axis(&abs_x)?
        .with_absolute_axis(&abs_y)?
        .build()?;

    // Without this delay the compositor can miss the first events
    thread::sleep(Duration::from_secs(1));

    Ok(device)
}

fn axis_info(extent: u32) -> AbsInfo {
    let max = extent.saturating_sub(1).min(i32::MAX as u32) as i32;
    AbsInfo::new(0, 0, max, 0, 0, 1)
}
