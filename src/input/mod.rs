mod backend;
mod device;
mod gilrs_backend;
mod system;

#[cfg(test)]
pub mod mock;

pub use backend::*;
pub use device::DeviceHandle;
pub use gilrs_backend::GilrsBackend;
pub use system::InputSys;

use std::fmt;

/// Platform-assigned identifier of an open device. Stable until the device is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceId(pub usize);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of a UI object in the caller's object table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Half-open containment: the right and bottom edges are outside
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.w && p.y >= self.y && p.y < self.y + self.h
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Other(u8),
}

/// Already-decoded keyboard key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    /// Right GUI/meta key, bound to "next device"
    RightGui,
    /// Main row digit 0-9
    Num(u8),
    /// Numeric keypad digit 0-9
    Keypad(u8),
    Return,
    KeypadEnter,
    Escape,
    Backspace,
    Delete,
    Home,
    End,
    Other,
}

impl Key {
    /// Device ordinal for a digit key: "1" is the first device, "0" the tenth
    pub fn device_ordinal(&self) -> Option<usize> {
        match *self {
            Key::Num(d) | Key::Keypad(d) if d <= 9 => Some((usize::from(d) + 9) % 10),
            _ => None,
        }
    }
}

/// Raw events the coordinator knows how to translate
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    MouseMotion(Point),
    MouseButtonDown { button: MouseButton, pos: Point },
    MouseButtonUp { button: MouseButton },
    /// Vertical wheel delta, positive is away from the user
    MouseWheel(f32),
    KeyDown { key: Key, repeat: bool },
    Text(String),
    /// Platform device index that just appeared
    ControllerAdded(usize),
    ControllerRemoved(DeviceId),
}

/// Notifications for the application layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramEvent {
    ControllersChanged { selection_changed: bool },
    TestStopped,
    Enter,
    Escape,
    OpenNextJoystick,
    OpenPrevJoystick,
    OpenJoystick(usize),
}

/// Standard controller layout buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamepadButton {
    South,
    East,
    West,
    North,
    Back,
    Guide,
    Start,
    LeftStick,
    RightStick,
    LeftShoulder,
    RightShoulder,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
}

impl GamepadButton {
    pub const ALL: [GamepadButton; 15] = [
        GamepadButton::South,
        GamepadButton::East,
        GamepadButton::West,
        GamepadButton::North,
        GamepadButton::Back,
        GamepadButton::Guide,
        GamepadButton::Start,
        GamepadButton::LeftStick,
        GamepadButton::RightStick,
        GamepadButton::LeftShoulder,
        GamepadButton::RightShoulder,
        GamepadButton::DPadUp,
        GamepadButton::DPadDown,
        GamepadButton::DPadLeft,
        GamepadButton::DPadRight,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::South => "South (A)",
            Self::East => "East (B)",
            Self::West => "West (X)",
            Self::North => "North (Y)",
            Self::Back => "Back",
            Self::Guide => "Guide",
            Self::Start => "Start",
            Self::LeftStick => "Left Stick",
            Self::RightStick => "Right Stick",
            Self::LeftShoulder => "Left Shoulder",
            Self::RightShoulder => "Right Shoulder",
            Self::DPadUp => "DPad Up",
            Self::DPadDown => "DPad Down",
            Self::DPadLeft => "DPad Left",
            Self::DPadRight => "DPad Right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamepadAxis {
    LeftX,
    LeftY,
    RightX,
    RightY,
    TriggerLeft,
    TriggerRight,
}

impl GamepadAxis {
    pub const ALL: [GamepadAxis; 6] = [
        GamepadAxis::LeftX,
        GamepadAxis::LeftY,
        GamepadAxis::RightX,
        GamepadAxis::RightY,
        GamepadAxis::TriggerLeft,
        GamepadAxis::TriggerRight,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::LeftX => "Left X",
            Self::LeftY => "Left Y",
            Self::RightX => "Right X",
            Self::RightY => "Right Y",
            Self::TriggerLeft => "Left Trigger",
            Self::TriggerRight => "Right Trigger",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("No input device is selected")]
    NoCurrentDevice,

    #[error("Device {0} has no gamepad mapping")]
    NotGamepad(DeviceId),

    #[error("Failed to open input device at index {0}")]
    OpenFailed(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_is_half_open() {
        let r = Rect::new(10, 10, 5, 5);
        assert!(r.contains(Point::new(10, 10)));
        assert!(r.contains(Point::new(14, 14)));
        assert!(!r.contains(Point::new(15, 12)));
        assert!(!r.contains(Point::new(12, 15)));
        assert!(!r.contains(Point::new(9, 12)));
    }

    #[test]
    fn digit_keys_map_one_to_first_and_zero_to_tenth() {
        assert_eq!(Key::Num(1).device_ordinal(), Some(0));
        assert_eq!(Key::Num(9).device_ordinal(), Some(8));
        assert_eq!(Key::Num(0).device_ordinal(), Some(9));
        assert_eq!(Key::Keypad(1).device_ordinal(), Some(0));
        assert_eq!(Key::Keypad(0).device_ordinal(), Some(9));
        assert_eq!(Key::Left.device_ordinal(), None);
    }
}
