//! Integration tests for instalock-input
//!
//! These tests require access to /dev/uinput and are marked #[ignore].
//! Run with: sudo cargo test -- --ignored

use instalock_input::{Error, MouseButton, VirtualPointer};

#[test]
fn rejects_empty_area() {
    let result = VirtualPointer::new(0, 1080);
    assert!(matches!(
        result,
        Err(Error::EmptyArea {
            width: 0,
            height: 1080
        })
    ));
}

#[test]
#[ignore = "requires /dev/uinput access (run with sudo)"]
fn create_device() {
    let pointer = VirtualPointer::new(1920, 1080);
    assert!(pointer.is_ok(), "should create device: {:?}", pointer.err());
}

#[test]
#[ignore = "requires /dev/uinput access (run with sudo)"]
fn move_and_click() {
    let mut pointer = VirtualPointer::new(1920, 1080).expect("failed to create device");
    pointer.move_to(960, 540).expect("should move");
    pointer.click(MouseButton::Left).expect("should click");
    assert!(!pointer.is_held(MouseButton::Left));
}

#[test]
#[ignore = "requires /dev/uinput access (run with sudo)"]
fn held_buttons_are_tracked() {
    let mut pointer = VirtualPointer::new(1920, 1080).expect("failed to create device");
    pointer.mouse_down(MouseButton::Left).expect("should press");
    assert!(pointer.is_held(MouseButton::Left));
    pointer.release_all().expect("should release");
    assert!(!pointer.is_held(MouseButton::Left));
}

#[test]
#[ignore = "requires /dev/uinput access (run with sudo)"]
fn move_outside_screen_is_clamped() {
    let mut pointer = VirtualPointer::new(1920, 1080).expect("failed to create device");
    let result = pointer.move_to(-100, 99_999);
    assert!(result.is_ok(), "clamped move should succeed: {:?}", result.err());
}
