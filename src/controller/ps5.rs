//! # PS5 DualSense Controller Module
//!
//! This module handles PS5 DualSense controller detection and state reading
//! using the Linux evdev interface, and exposes the controller as a
//! [`GamepadSource`](super::source::GamepadSource).
//!
//! ## Controller Detection
//!
//! The DualSense controller is identified by:
//! - Vendor ID: 0x054c (Sony)
//! - Product ID: 0x0ce6 (DualSense, both wired and Bluetooth)
//!
//! One controller shows up as several event nodes sharing these IDs. The
//! gamepad node is the one with face buttons. The touchpad node reports its
//! click as BTN_LEFT and is paired with the gamepad by physical path.
//!
//! ## Input Axes (hid-playstation)
//!
//! - Left stick: ABS_X, ABS_Y
//! - Right stick: ABS_RX, ABS_RY
//! - Triggers: ABS_Z (L2), ABS_RZ (R2)
//! - D-Pad: ABS_HAT0X, ABS_HAT0Y (-1/0/1)
//!
//! State is read with the evdev state ioctls rather than by draining the event
//! queue, so every read returns the latest values without blocking.

use evdev::{AbsoluteAxisType, Device, Key};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use super::calibration::{normalize_axis, normalize_trigger};
use super::frame::{RawButton, RawFrame};
use super::hotplug::{DeviceOpener, HotplugSource, InputDevice};
use super::layout::{Axis, Button};
use crate::config::ControllerConfig;
use crate::error::{OverlayError, Result};

/// PS5 DualSense vendor ID (Sony)
const DUALSENSE_VENDOR_ID: u16 = 0x054c;

/// PS5 DualSense product ID (wired and Bluetooth)
const DUALSENSE_PRODUCT_ID: u16 = 0x0ce6;

/// Name reported when the device has none.
const FALLBACK_NAME: &str = "DualSense Wireless Controller";

/// Key on the touchpad node that reports the touchpad click.
const TOUCHPAD_CLICK: Key = Key::BTN_LEFT;

/// Digital buttons read straight from the gamepad node's key state.
const KEY_MAP: [(Button, Key); 11] = [
    (Button::Cross, Key::BTN_SOUTH),
    (Button::Circle, Key::BTN_EAST),
    (Button::Square, Key::BTN_WEST),
    (Button::Triangle, Key::BTN_NORTH),
    (Button::L1, Key::BTN_TL),
    (Button::R1, Key::BTN_TR),
    (Button::Create, Key::BTN_SELECT),
    (Button::Options, Key::BTN_START),
    (Button::LeftStickPress, Key::BTN_THUMBL),
    (Button::RightStickPress, Key::BTN_THUMBR),
    (Button::Ps, Key::BTN_MODE),
];

/// Current value and reported range of one absolute axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisReading {
    pub value: i32,
    pub minimum: i32,
    pub maximum: i32,
}

/// Builds a standard-layout raw frame from key and axis state.
///
/// `key` reports whether a gamepad-node key is held, `abs` the state of an
/// axis. Axes the device lacks report a zero range and read as
/// centered/released. `touchpad_click` comes from the separate touchpad node.
pub fn build_frame(
    name: &str,
    key: impl Fn(Key) -> bool,
    abs: impl Fn(AbsoluteAxisType) -> AxisReading,
    touchpad_click: bool,
) -> RawFrame {
    let mut frame = RawFrame::new(name);

    for (button, code) in KEY_MAP {
        frame.set_button(button, RawButton::digital(key(code)));
    }
    frame.set_button(Button::Touchpad, RawButton::digital(touchpad_click));

    let trigger = |axis, code| {
        let reading = abs(axis);
        RawButton {
            pressed: key(code),
            value: normalize_trigger(reading.value, reading.minimum, reading.maximum),
        }
    };
    frame.set_button(Button::L2, trigger(AbsoluteAxisType::ABS_Z, Key::BTN_TL2));
    frame.set_button(Button::R2, trigger(AbsoluteAxisType::ABS_RZ, Key::BTN_TR2));

    let hat_x = abs(AbsoluteAxisType::ABS_HAT0X).value;
    let hat_y = abs(AbsoluteAxisType::ABS_HAT0Y).value;
    // Some drivers report the d-pad as keys instead of a hat
    let dpad = [
        (Button::DpadUp, hat_y < 0, Key::BTN_DPAD_UP),
        (Button::DpadDown, hat_y > 0, Key::BTN_DPAD_DOWN),
        (Button::DpadLeft, hat_x < 0, Key::BTN_DPAD_LEFT),
        (Button::DpadRight, hat_x > 0, Key::BTN_DPAD_RIGHT),
    ];
    for (button, from_hat, code) in dpad {
        frame.set_button(button, RawButton::digital(from_hat || key(code)));
    }

    for (axis, code) in [
        (Axis::LeftStickX, AbsoluteAxisType::ABS_X),
        (Axis::LeftStickY, AbsoluteAxisType::ABS_Y),
        (Axis::RightStickX, AbsoluteAxisType::ABS_RX),
        (Axis::RightStickY, AbsoluteAxisType::ABS_RY),
    ] {
        let reading = abs(code);
        frame.set_axis(axis, normalize_axis(reading.value, reading.minimum, reading.maximum));
    }

    frame
}

/// Role of a DualSense event node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Gamepad,
    Touchpad,
    Other,
}

fn node_kind(device: &Device) -> NodeKind {
    let id = device.input_id();
    if id.vendor() != DUALSENSE_VENDOR_ID || id.product() != DUALSENSE_PRODUCT_ID {
        return NodeKind::Other;
    }

    match device.supported_keys() {
        Some(keys) if keys.contains(Key::BTN_SOUTH) => NodeKind::Gamepad,
        Some(keys) if keys.contains(TOUCHPAD_CLICK) => NodeKind::Touchpad,
        // Motion sensor node
        _ => NodeKind::Other,
    }
}

/// Opens every readable DualSense event node under `/dev/input`, in path order.
fn scan_nodes() -> Result<Vec<(PathBuf, Device, NodeKind)>> {
    let input_dir = Path::new("/dev/input");

    if !input_dir.exists() {
        return Err(OverlayError::Controller(
            "/dev/input directory not found".to_string(),
        ));
    }

    let mut entries: Vec<_> = std::fs::read_dir(input_dir)
        .map_err(|e| OverlayError::Controller(format!("Failed to read /dev/input: {}", e)))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| {
            OverlayError::Controller(format!("Failed to read directory entry: {}", e))
        })?;

    // Deterministic slot 0 when several controllers are attached
    entries.sort_by_key(|entry| entry.path());

    let mut nodes = Vec::new();
    for entry in entries {
        let path = entry.path();

        let is_event_node = path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().starts_with("event"));
        if !is_event_node {
            continue;
        }

        match Device::open(&path) {
            Ok(device) => {
                let id = device.input_id();
                debug!(
                    "Found input device: {} (vendor: 0x{:04x}, product: 0x{:04x})",
                    path.display(),
                    id.vendor(),
                    id.product()
                );

                let kind = node_kind(&device);
                if kind != NodeKind::Other {
                    nodes.push((path, device, kind));
                }
            }
            Err(e) => {
                // Permission denied or other errors - skip device
                debug!("Could not open {}: {}", path.display(), e);
            }
        }
    }

    Ok(nodes)
}

/// Takes the touchpad node belonging to the same physical controller.
fn take_sibling_touchpad(
    nodes: &mut Vec<(PathBuf, Device, NodeKind)>,
    phys: Option<&str>,
) -> Option<Device> {
    let phys = phys?;
    let index = nodes.iter().position(|(_, device, kind)| {
        *kind == NodeKind::Touchpad && device.physical_path() == Some(phys)
    })?;
    let (path, device, _) = nodes.swap_remove(index);
    debug!("Paired touchpad node: {}", path.display());
    Some(device)
}

/// PS5 DualSense controller handle
///
/// Represents an open DualSense gamepad event node and, when found, its
/// touchpad node.
pub struct DualSenseController {
    device: Device,
    touchpad: Option<Device>,
    device_path: String,
}

impl std::fmt::Debug for DualSenseController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DualSenseController")
            .field("device_path", &self.device_path)
            .field("touchpad", &self.touchpad.is_some())
            .finish_non_exhaustive()
    }
}

impl DualSenseController {
    /// Detect and open the first available PS5 DualSense controller
    ///
    /// Scans all `/dev/input/event*` devices in path order and matches vendor
    /// and product IDs.
    ///
    /// # Errors
    ///
    /// - `ControllerNotFound`: No DualSense controller found on the system
    /// - `Controller`: `/dev/input` is missing or unreadable
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dualsense_overlay::controller::ps5::DualSenseController;
    ///
    /// let controller = DualSenseController::open()?;
    /// println!("Connected to controller at: {}", controller.device_path());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open() -> Result<Self> {
        let mut nodes = scan_nodes()?;

        let index = nodes
            .iter()
            .position(|(_, _, kind)| *kind == NodeKind::Gamepad)
            .ok_or(OverlayError::ControllerNotFound)?;
        let (path, device, _) = nodes.remove(index);

        let touchpad = take_sibling_touchpad(&mut nodes, device.physical_path());
        let device_path = path.to_string_lossy().to_string();
        info!("Found PS5 DualSense controller at: {}", device_path);

        Ok(Self {
            device,
            touchpad,
            device_path,
        })
    }

    /// Open a specific event device without checking its IDs.
    ///
    /// The touchpad node is still looked up by physical path.
    ///
    /// # Errors
    ///
    /// Returns `Controller` if the device cannot be opened.
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let device = Device::open(path).map_err(|e| {
            OverlayError::Controller(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let touchpad = match scan_nodes() {
            Ok(mut nodes) => take_sibling_touchpad(&mut nodes, device.physical_path()),
            Err(e) => {
                debug!("Touchpad lookup skipped: {}", e);
                None
            }
        };

        Ok(Self {
            device,
            touchpad,
            device_path: path.to_string_lossy().to_string(),
        })
    }

    /// Get the device path of this controller
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Get controller name from evdev
    ///
    /// Typically "DualSense Wireless Controller".
    pub fn name(&self) -> Option<&str> {
        self.device.name()
    }

    /// Whether the touchpad node was found.
    pub fn has_touchpad(&self) -> bool {
        self.touchpad.is_some()
    }

    fn touchpad_clicked(&mut self) -> bool {
        let Some(touchpad) = self.touchpad.as_ref() else {
            return false;
        };

        match touchpad.get_key_state() {
            Ok(keys) => keys.contains(TOUCHPAD_CLICK),
            Err(e) => {
                debug!("Touchpad node unreadable, dropping it: {}", e);
                self.touchpad = None;
                false
            }
        }
    }
}

impl InputDevice for DualSenseController {
    /// Read the current controller state as a standard-layout raw frame.
    ///
    /// A failing gamepad node is an error, which is how a removed device
    /// shows up. A failing touchpad node only loses the touchpad click.
    fn read_frame(&mut self) -> Result<RawFrame> {
        let keys = self
            .device
            .get_key_state()
            .map_err(|e| OverlayError::Controller(format!("Failed to read key state: {}", e)))?;
        let abs = self
            .device
            .get_abs_state()
            .map_err(|e| OverlayError::Controller(format!("Failed to read axis state: {}", e)))?;
        let touchpad_click = self.touchpad_clicked();

        let name = self.name().unwrap_or(FALLBACK_NAME);
        Ok(build_frame(
            name,
            |key| keys.contains(key),
            |axis| {
                abs.get(axis.0 as usize)
                    .map(|info| AxisReading {
                        value: info.value,
                        minimum: info.minimum,
                        maximum: info.maximum,
                    })
                    .unwrap_or_default()
            },
            touchpad_click,
        ))
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.name().unwrap_or(FALLBACK_NAME), self.device_path)
    }
}

/// Opens a DualSense from `/dev/input`, either by scanning or by a fixed path.
#[derive(Debug, Clone, Default)]
pub struct EvdevOpener {
    device_path: Option<PathBuf>,
}

impl EvdevOpener {
    pub fn new(device_path: Option<PathBuf>) -> Self {
        Self { device_path }
    }

    pub fn device_path(&self) -> Option<&Path> {
        self.device_path.as_deref()
    }
}

impl DeviceOpener for EvdevOpener {
    type Device = DualSenseController;

    fn open(&self) -> Result<DualSenseController> {
        match &self.device_path {
            Some(path) => DualSenseController::open_path(path),
            None => DualSenseController::open(),
        }
    }
}

/// Hot-pluggable DualSense source.
pub type DualSenseSource = HotplugSource<EvdevOpener>;

impl HotplugSource<EvdevOpener> {
    /// Creates a detached DualSense source. An empty `device_path` means
    /// auto-detect.
    pub fn from_config(config: &ControllerConfig) -> Self {
        let device_path = if config.device_path.is_empty() {
            None
        } else {
            Some(PathBuf::from(&config.device_path))
        };
        Self::with_opener(
            EvdevOpener::new(device_path),
            Duration::from_millis(config.rescan_interval_ms),
        )
    }
}
