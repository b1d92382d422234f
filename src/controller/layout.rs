//! # Standard Layout Module
//!
//! Fixed index table for the standard gamepad mapping.
//!
//! ## Buttons
//!
//! | Index | Button | Index | Button |
//! |-------|--------|-------|--------|
//! | 0 | Cross (×) | 9 | Options |
//! | 1 | Circle (○) | 10 | L3 (left stick press) |
//! | 2 | Square (□) | 11 | R3 (right stick press) |
//! | 3 | Triangle (△) | 12 | D-Pad Up |
//! | 4 | L1 | 13 | D-Pad Down |
//! | 5 | R1 | 14 | D-Pad Left |
//! | 6 | L2 | 15 | D-Pad Right |
//! | 7 | R2 | 16 | PS |
//! | 8 | Create | 17 | Touchpad |
//!
//! ## Axes
//!
//! | Index | Axis |
//! |-------|------|
//! | 0 | Left Stick X |
//! | 1 | Left Stick Y |
//! | 2 | Right Stick X |
//! | 3 | Right Stick Y |

/// Number of buttons in the standard layout.
pub const BUTTON_COUNT: usize = 18;

/// Number of axes in the standard layout.
pub const AXIS_COUNT: usize = 4;

/// Buttons of the standard layout, discriminant = array position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Button {
    Cross = 0,
    Circle = 1,
    Square = 2,
    Triangle = 3,
    L1 = 4,
    R1 = 5,
    L2 = 6,
    R2 = 7,
    Create = 8,
    Options = 9,
    LeftStickPress = 10,
    RightStickPress = 11,
    DpadUp = 12,
    DpadDown = 13,
    DpadLeft = 14,
    DpadRight = 15,
    Ps = 16,
    Touchpad = 17,
}

/// Axes of the standard layout, discriminant = array position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Axis {
    LeftStickX = 0,
    LeftStickY = 1,
    RightStickX = 2,
    RightStickY = 3,
}

/// All buttons in index order.
pub const BUTTONS: [Button; BUTTON_COUNT] = [
    Button::Cross,
    Button::Circle,
    Button::Square,
    Button::Triangle,
    Button::L1,
    Button::R1,
    Button::L2,
    Button::R2,
    Button::Create,
    Button::Options,
    Button::LeftStickPress,
    Button::RightStickPress,
    Button::DpadUp,
    Button::DpadDown,
    Button::DpadLeft,
    Button::DpadRight,
    Button::Ps,
    Button::Touchpad,
];

/// All axes in index order.
pub const AXES: [Axis; AXIS_COUNT] = [
    Axis::LeftStickX,
    Axis::LeftStickY,
    Axis::RightStickX,
    Axis::RightStickY,
];

impl Button {
    /// Position of this button in a raw button array.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Looks up the button at a raw array position.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        BUTTONS.get(index).copied()
    }

    /// Short display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Button::Cross => "cross",
            Button::Circle => "circle",
            Button::Square => "square",
            Button::Triangle => "triangle",
            Button::L1 => "l1",
            Button::R1 => "r1",
            Button::L2 => "l2",
            Button::R2 => "r2",
            Button::Create => "create",
            Button::Options => "options",
            Button::LeftStickPress => "l3",
            Button::RightStickPress => "r3",
            Button::DpadUp => "up",
            Button::DpadDown => "down",
            Button::DpadLeft => "left",
            Button::DpadRight => "right",
            Button::Ps => "ps",
            Button::Touchpad => "touchpad",
        }
    }
}

impl Axis {
    /// Position of this axis in a raw axis array.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}
