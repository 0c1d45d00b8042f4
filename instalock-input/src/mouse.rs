use evdev::Key;

/// Mouse buttons exposed by the virtual pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub const ALL: [MouseButton; 3] = [MouseButton::Left, MouseButton::Right, MouseButton::Middle];

    /// Convert to evdev Key code
    pub fn to_key(self) -> Key {
        match self {
            MouseButton::Left => Key::BTN_LEFT,
            MouseButton::Right => Key::BTN_RIGHT,
            MouseButton::Middle => Key::BTN_MIDDLE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_to_key_mapping() {
        assert_eq!(MouseButton::Left.to_key(), Key::BTN_LEFT);
        assert_eq!(MouseButton::Right.to_key(), Key::BTN_RIGHT);
        assert_eq!(MouseButton::Middle.to_key(), Key::BTN_MIDDLE);
    }

    #[test]
    fn buttons_are_distinct() {
        for (i, a) in MouseButton::ALL.iter().enumerate() {
            for (j, b) in MouseButton::ALL.iter().enumerate() {
                if i != j {
                    assert_ne!(a.to_key(), b.to_key());
                }
            }
        }
    }
}
