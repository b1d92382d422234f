//! Visual attributes of the controller illustration.
//!
//! A pure 1:1 mapping from a snapshot: stick axes become offsets, buttons
//! become active flags and trigger values become bar fill widths.

use serde::Serialize;

use crate::controller::layout::{Button, BUTTONS, BUTTON_COUNT};
use crate::controller::snapshot::ControllerSnapshot;

/// Maximum stick cap travel from center at scale 1.0.
pub const STICK_TRAVEL: f32 = 12.0;

/// Trigger bar width at scale 1.0.
pub const TRIGGER_BAR_WIDTH: f32 = 40.0;

/// Position offset of a stick cap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StickOffset {
    pub dx: f32,
    pub dy: f32,
}

/// Everything the illustration needs to draw one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayAttributes {
    /// Whether the illustration is drawn as live or dimmed.
    pub live: bool,
    pub left_stick: StickOffset,
    pub right_stick: StickOffset,
    pub l2_fill: f32,
    pub r2_fill: f32,
    /// Active flag per layout button, in index order.
    pub active: [bool; BUTTON_COUNT],
}

impl OverlayAttributes {
    /// Maps a snapshot at the given illustration scale.
    ///
    /// # Examples
    ///
    /// ```
    /// use dualsense_overlay::controller::snapshot::ControllerSnapshot;
    /// use dualsense_overlay::display::overlay::OverlayAttributes;
    ///
    /// let mut state = ControllerSnapshot::disconnected();
    /// state.connected = true;
    /// state.left_stick.x = 1.0;
    /// state.r2 = 0.5;
    ///
    /// let attrs = OverlayAttributes::from_snapshot(&state, 1.0);
    /// assert_eq!(attrs.left_stick.dx, 12.0);
    /// assert_eq!(attrs.r2_fill, 20.0);
    /// ```
    #[must_use]
    pub fn from_snapshot(snapshot: &ControllerSnapshot, scale: f32) -> Self {
        let travel = STICK_TRAVEL * scale;
        let bar = TRIGGER_BAR_WIDTH * scale;

        let mut active = [false; BUTTON_COUNT];
        for button in BUTTONS {
            active[button.index()] = snapshot.is_pressed(button);
        }

        Self {
            live: snapshot.connected,
            left_stick: StickOffset {
                dx: snapshot.left_stick.x * travel,
                dy: snapshot.left_stick.y * travel,
            },
            right_stick: StickOffset {
                dx: snapshot.right_stick.x * travel,
                dy: snapshot.right_stick.y * travel,
            },
            l2_fill: snapshot.l2 * bar,
            r2_fill: snapshot.r2 * bar,
            active,
        }
    }

    pub fn is_active(&self, button: Button) -> bool {
        self.active[button.index()]
    }
}
