//! # Controller Module
//!
//! PS5 DualSense controller input handling.
//!
//! This module handles:
//! - The fixed standard button/axis layout
//! - Raw per-slot frames and connection notifications
//! - Deadzone filtering and normalization into a [`snapshot::ControllerSnapshot`]
//! - Hot-plug attach/detach with device scans off the poll task
//! - PS5 controller detection and state reading via evdev

pub mod calibration;
pub mod frame;
pub mod hotplug;
pub mod layout;
pub mod ps5;
pub mod snapshot;
pub mod source;
