//! # Calibration Module
//!
//! Deadzone filtering for stick axes and conversion of raw evdev axis values
//! into the normalized ranges of the standard layout.
//!
//! ## Deadzone
//!
//! A deadzone eliminates small stick movements near center to suppress drift.
//! Values whose magnitude is below the threshold become exactly 0.0. Values at
//! or beyond it pass through unchanged: the remaining range is not rescaled.
//!
//! ## Usage
//!
//! ```
//! use dualsense_overlay::controller::calibration::Deadzone;
//!
//! let deadzone = Deadzone::default(); // 0.1
//!
//! assert_eq!(deadzone.apply(0.05), 0.0);
//! assert_eq!(deadzone.apply(-0.5), -0.5);
//! ```

/// Stick deadzone threshold.
pub const STICK_DEADZONE: f32 = 0.1;

/// Threshold filter for a single stick axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deadzone {
    threshold: f32,
}

impl Default for Deadzone {
    fn default() -> Self {
        Self {
            threshold: STICK_DEADZONE,
        }
    }
}

impl Deadzone {
    /// Creates a deadzone with the given threshold, clamped to 0.0..=1.0.
    ///
    /// # Examples
    ///
    /// ```
    /// use dualsense_overlay::controller::calibration::Deadzone;
    ///
    /// let deadzone = Deadzone::new(0.2);
    /// assert_eq!(deadzone.apply(0.15), 0.0);
    /// ```
    #[must_use]
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    /// A deadzone that passes every value through.
    #[must_use]
    pub fn none() -> Self {
        Self { threshold: 0.0 }
    }

    /// Returns the configured threshold.
    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Applies the deadzone to an axis reading.
    ///
    /// `|input| < threshold` yields 0.0, anything else is returned unchanged.
    #[inline]
    #[must_use]
    pub fn apply(&self, input: f32) -> f32 {
        if input.abs() < self.threshold {
            0.0
        } else {
            input
        }
    }
}

/// Converts a raw axis value to -1.0..=1.0 using the axis' reported range.
///
/// The midpoint of `min..=max` maps to 0.0. A degenerate range yields 0.0.
///
/// # Examples
///
/// ```
/// use dualsense_overlay::controller::calibration::normalize_axis;
///
/// assert!((normalize_axis(0, 0, 255) - (-1.0)).abs() < 0.01);
/// assert!((normalize_axis(128, 0, 255) - 0.0).abs() < 0.01);
/// assert!((normalize_axis(255, 0, 255) - 1.0).abs() < 0.01);
/// ```
#[must_use]
pub fn normalize_axis(raw: i32, min: i32, max: i32) -> f32 {
    if max <= min {
        return 0.0;
    }
    let span = (max - min) as f32;
    let offset = (raw - min) as f32;
    ((offset / span) * 2.0 - 1.0).clamp(-1.0, 1.0)
}

/// Converts a raw trigger value to 0.0..=1.0 using the axis' reported range.
///
/// # Examples
///
/// ```
/// use dualsense_overlay::controller::calibration::normalize_trigger;
///
/// assert_eq!(normalize_trigger(0, 0, 255), 0.0);
/// assert_eq!(normalize_trigger(255, 0, 255), 1.0);
/// ```
#[must_use]
pub fn normalize_trigger(raw: i32, min: i32, max: i32) -> f32 {
    if max <= min {
        return 0.0;
    }
    ((raw - min) as f32 / (max - min) as f32).clamp(0.0, 1.0)
}
