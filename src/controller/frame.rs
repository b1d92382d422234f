//! # Raw Frame Module
//!
//! The raw, unnormalized reading a source reports for one slot: a button list
//! of `{pressed, value}` pairs and an axis list, both in standard layout order.
//! Frames may be shorter than the layout; lookups past the end read as neutral.

use super::layout::{Axis, Button};

/// One button entry of a raw frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawButton {
    /// Device's own digital determination.
    pub pressed: bool,
    /// Analog depression amount (0.0 to 1.0).
    pub value: f32,
}

impl RawButton {
    /// A digital button, fully pressed or released.
    #[must_use]
    pub fn digital(pressed: bool) -> Self {
        Self {
            pressed,
            value: if pressed { 1.0 } else { 0.0 },
        }
    }
}

/// Raw controller frame for a single slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFrame {
    /// Device-reported name.
    pub id: String,
    pub buttons: Vec<RawButton>,
    pub axes: Vec<f32>,
}

impl RawFrame {
    /// Creates an empty frame for the named device.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            buttons: Vec::new(),
            axes: Vec::new(),
        }
    }

    /// Returns the button entry, or a released button if the frame has none.
    ///
    /// A non-finite analog value reads as 0.
    #[must_use]
    pub fn button(&self, button: Button) -> RawButton {
        self.buttons
            .get(button.index())
            .map(|b| RawButton {
                pressed: b.pressed,
                value: finite_or_zero(b.value),
            })
            .unwrap_or_default()
    }

    /// Returns the axis reading, or 0 if the frame has none.
    #[must_use]
    pub fn axis(&self, axis: Axis) -> f32 {
        self.axes
            .get(axis.index())
            .copied()
            .map(finite_or_zero)
            .unwrap_or(0.0)
    }

    /// Sets a button entry, growing the button list as needed.
    pub fn set_button(&mut self, button: Button, state: RawButton) {
        let index = button.index();
        if self.buttons.len() <= index {
            self.buttons.resize(index + 1, RawButton::default());
        }
        self.buttons[index] = state;
    }

    /// Sets an axis reading, growing the axis list as needed.
    pub fn set_axis(&mut self, axis: Axis, value: f32) {
        let index = axis.index();
        if self.axes.len() <= index {
            self.axes.resize(index + 1, 0.0);
        }
        self.axes[index] = value;
    }
}

/// Connection notification emitted by a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    Connected,
    Disconnected,
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
