//! # DualSense Overlay Library
//!
//! Live view of a PS5 DualSense controller's input state.
//!
//! This library polls the first connected controller at a bounded rate,
//! normalizes its raw button and axis arrays into a typed, immutable
//! [`ControllerSnapshot`](controller::snapshot::ControllerSnapshot) and
//! publishes it for a purely declarative presenter.

pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod poller;
