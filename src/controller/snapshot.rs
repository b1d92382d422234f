//! # Controller Snapshot Module
//!
//! The normalized, named reading of every DualSense input at one instant.
//!
//! A [`ControllerSnapshot`] is built from a [`RawFrame`] by reading buttons and
//! axes through the fixed [standard layout](super::layout) and filtering the
//! four stick axes through a [`Deadzone`]. Snapshots are plain values: the
//! poller replaces the published one wholesale and never mutates it in place.
//!
//! ## Usage
//!
//! ```
//! use dualsense_overlay::controller::calibration::Deadzone;
//! use dualsense_overlay::controller::frame::{RawButton, RawFrame};
//! use dualsense_overlay::controller::snapshot::ControllerSnapshot;
//!
//! let mut frame = RawFrame::new("DualSense Wireless Controller");
//! frame.buttons = vec![RawButton { pressed: true, value: 1.0 }];
//! frame.axes = vec![0.05, -0.5, 0.0, 0.0];
//!
//! let snapshot = ControllerSnapshot::from_frame(&frame, Deadzone::default());
//! assert!(snapshot.connected);
//! assert!(snapshot.cross);
//! assert_eq!(snapshot.left_stick.x, 0.0);
//! assert_eq!(snapshot.left_stick.y, -0.5);
//! ```

use serde::Serialize;

use super::calibration::Deadzone;
use super::frame::RawFrame;
use super::layout::{Axis, Button, BUTTONS};

/// One analog stick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StickState {
    /// Horizontal deflection. -1.0 = full left, 1.0 = full right.
    pub x: f32,
    /// Vertical deflection. -1.0 = full up, 1.0 = full down.
    pub y: f32,
    /// Stick click (L3 / R3).
    pub pressed: bool,
}

/// Complete normalized state of the DualSense controller.
///
/// `Default` is the disconnected snapshot: no id, every button released,
/// triggers at 0.0 and sticks centered.
///
/// # Examples
///
/// ```
/// use dualsense_overlay::controller::snapshot::ControllerSnapshot;
///
/// let state = ControllerSnapshot::disconnected();
/// assert!(!state.connected);
/// assert!(state.id.is_empty());
/// assert!(!state.any_button_pressed());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ControllerSnapshot {
    /// Whether a controller occupies slot 0.
    pub connected: bool,
    /// Device-reported name. Empty when disconnected.
    pub id: String,

    // Face buttons
    /// Cross button (×).
    pub cross: bool,
    /// Circle button (○).
    pub circle: bool,
    /// Square button (□).
    pub square: bool,
    /// Triangle button (△).
    pub triangle: bool,

    // Shoulder buttons
    pub l1: bool,
    pub r1: bool,
    /// L2 analog depression (0.0 to 1.0).
    pub l2: f32,
    /// R2 analog depression (0.0 to 1.0).
    pub r2: f32,
    /// L2 digital press as reported by the device.
    pub l2_pressed: bool,
    /// R2 digital press as reported by the device.
    pub r2_pressed: bool,

    // D-Pad
    pub dpad_up: bool,
    pub dpad_down: bool,
    pub dpad_left: bool,
    pub dpad_right: bool,

    // Sticks
    pub left_stick: StickState,
    pub right_stick: StickState,

    // Special buttons
    pub create: bool,
    pub options: bool,
    pub ps: bool,
    pub touchpad: bool,
}

impl ControllerSnapshot {
    /// The all-default snapshot published while no controller is present.
    #[must_use]
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Normalizes a raw frame into a connected snapshot.
    ///
    /// Buttons and axes the frame does not report read as released / 0.0.
    /// Triggers keep the device's own digital press and analog value
    /// independently. Stick axes are filtered by `deadzone`.
    #[must_use]
    pub fn from_frame(frame: &RawFrame, deadzone: Deadzone) -> Self {
        let pressed = |button: Button| frame.button(button).pressed;
        let stick = |x: Axis, y: Axis, click: Button| StickState {
            x: deadzone.apply(frame.axis(x)),
            y: deadzone.apply(frame.axis(y)),
            pressed: pressed(click),
        };

        let l2 = frame.button(Button::L2);
        let r2 = frame.button(Button::R2);

        Self {
            connected: true,
            id: frame.id.clone(),

            cross: pressed(Button::Cross),
            circle: pressed(Button::Circle),
            square: pressed(Button::Square),
            triangle: pressed(Button::Triangle),

            l1: pressed(Button::L1),
            r1: pressed(Button::R1),
            l2: l2.value,
            r2: r2.value,
            l2_pressed: l2.pressed,
            r2_pressed: r2.pressed,

            dpad_up: pressed(Button::DpadUp),
            dpad_down: pressed(Button::DpadDown),
            dpad_left: pressed(Button::DpadLeft),
            dpad_right: pressed(Button::DpadRight),

            left_stick: stick(Axis::LeftStickX, Axis::LeftStickY, Button::LeftStickPress),
            right_stick: stick(Axis::RightStickX, Axis::RightStickY, Button::RightStickPress),

            create: pressed(Button::Create),
            options: pressed(Button::Options),
            ps: pressed(Button::Ps),
            touchpad: pressed(Button::Touchpad),
        }
    }

    /// Digital state of a layout button.
    ///
    /// For L2/R2 this is the device's digital press, not the analog value.
    #[must_use]
    pub fn is_pressed(&self, button: Button) -> bool {
        match button {
            Button::Cross => self.cross,
            Button::Circle => self.circle,
            Button::Square => self.square,
            Button::Triangle => self.triangle,
            Button::L1 => self.l1,
            Button::R1 => self.r1,
            Button::L2 => self.l2_pressed,
            Button::R2 => self.r2_pressed,
            Button::Create => self.create,
            Button::Options => self.options,
            Button::LeftStickPress => self.left_stick.pressed,
            Button::RightStickPress => self.right_stick.pressed,
            Button::DpadUp => self.dpad_up,
            Button::DpadDown => self.dpad_down,
            Button::DpadLeft => self.dpad_left,
            Button::DpadRight => self.dpad_right,
            Button::Ps => self.ps,
            Button::Touchpad => self.touchpad,
        }
    }

    /// Checks if any button is currently pressed.
    ///
    /// # Examples
    ///
    /// ```
    /// use dualsense_overlay::controller::snapshot::ControllerSnapshot;
    ///
    /// let mut state = ControllerSnapshot::disconnected();
    /// assert!(!state.any_button_pressed());
    ///
    /// state.l1 = true;
    /// assert!(state.any_button_pressed());
    /// ```
    #[must_use]
    pub fn any_button_pressed(&self) -> bool {
        BUTTONS.iter().any(|&b| self.is_pressed(b))
    }

    /// Checks if any stick axis deviates from center by more than `threshold`.
    #[must_use]
    pub fn any_stick_moved(&self, threshold: f32) -> bool {
        [
            self.left_stick.x,
            self.left_stick.y,
            self.right_stick.x,
            self.right_stick.y,
        ]
        .iter()
        .any(|v| v.abs() > threshold)
    }

    /// Pressed buttons in layout order.
    #[must_use]
    pub fn pressed_buttons(&self) -> Vec<Button> {
        BUTTONS.iter().copied().filter(|&b| self.is_pressed(b)).collect()
    }
}
