//! # Hot-plug Source
//!
//! A [`GamepadSource`] for a single hot-pluggable device.
//!
//! Slot 0 holds the attached device, if any. A failed read detaches it and
//! queues [`ConnectionEvent::Disconnected`]. While detached, the source looks
//! for a device at most once per `rescan_interval`. The scan itself runs on
//! tokio's blocking pool and hands its result back over a oneshot channel, so
//! neither [`frames`](GamepadSource::frames) nor
//! [`poll_event`](GamepadSource::poll_event) ever waits on it. A successful
//! scan queues [`ConnectionEvent::Connected`].

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::{debug, info, warn};

use super::frame::{ConnectionEvent, RawFrame};
use super::source::GamepadSource;
use crate::error::{OverlayError, Result};

/// An attached input device that can report its current state.
pub trait InputDevice: Send + 'static {
    /// Reads the current state as a standard-layout raw frame.
    ///
    /// An error means the device is gone.
    fn read_frame(&mut self) -> Result<RawFrame>;

    /// Human-readable description for logs.
    fn describe(&self) -> String;
}

/// Finds and opens a device. May block; always called off the poll task.
pub trait DeviceOpener: Send + Sync + 'static {
    type Device: InputDevice;

    fn open(&self) -> Result<Self::Device>;
}

/// Hot-pluggable single-device source.
pub struct HotplugSource<O: DeviceOpener> {
    opener: Arc<O>,
    device: Option<O::Device>,
    rescan_interval: Duration,
    last_scan: Option<Instant>,
    pending: Option<oneshot::Receiver<Result<O::Device>>>,
    events: VecDeque<ConnectionEvent>,
}

impl<O: DeviceOpener> std::fmt::Debug for HotplugSource<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HotplugSource")
            .field("attached", &self.device.is_some())
            .field("scanning", &self.pending.is_some())
            .field("rescan_interval", &self.rescan_interval)
            .finish_non_exhaustive()
    }
}

impl<O: DeviceOpener> HotplugSource<O> {
    /// Creates a detached source. The first [`poll_event`](GamepadSource::poll_event)
    /// call starts a scan.
    pub fn with_opener(opener: O, rescan_interval: Duration) -> Self {
        Self {
            opener: Arc::new(opener),
            device: None,
            rescan_interval,
            last_scan: None,
            pending: None,
            events: VecDeque::new(),
        }
    }

    pub fn opener(&self) -> &O {
        &self.opener
    }

    pub fn rescan_interval(&self) -> Duration {
        self.rescan_interval
    }

    /// Whether a device is currently attached.
    pub fn is_attached(&self) -> bool {
        self.device.is_some()
    }

    /// Whether a scan is running in the background.
    pub fn is_scanning(&self) -> bool {
        self.pending.is_some()
    }

    fn scan_due(&self, now: Instant) -> bool {
        self.last_scan
            .map_or(true, |last| now.duration_since(last) >= self.rescan_interval)
    }

    fn start_scan(&mut self, now: Instant) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No tokio runtime, skipping device scan");
            return;
        };

        self.last_scan = Some(now);
        let (tx, rx) = oneshot::channel();
        let opener = Arc::clone(&self.opener);
        runtime.spawn_blocking(move || {
            // Receiver gone means the source was dropped mid-scan
            let _ = tx.send(opener.open());
        });
        self.pending = Some(rx);
    }

    fn collect_scan(&mut self) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };

        match pending.try_recv() {
            Ok(Ok(device)) => {
                info!("Controller attached: {}", device.describe());
                self.device = Some(device);
                self.events.push_back(ConnectionEvent::Connected);
            }
            Ok(Err(e)) => debug!("No controller attached: {}", e),
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Closed) => warn!("Device scan ended without a result"),
        }
        self.pending = None;
    }

    fn detach(&mut self, reason: &OverlayError) {
        if let Some(device) = self.device.take() {
            warn!("Controller {} detached: {}", device.describe(), reason);
            self.events.push_back(ConnectionEvent::Disconnected);
        }
    }
}

impl<O: DeviceOpener> GamepadSource for HotplugSource<O> {
    fn frames(&mut self) -> Vec<Option<RawFrame>> {
        let result = match self.device.as_mut() {
            Some(device) => device.read_frame(),
            None => return vec![None],
        };

        match result {
            Ok(frame) => vec![Some(frame)],
            Err(e) => {
                self.detach(&e);
                vec![None]
            }
        }
    }

    fn poll_event(&mut self) -> Option<ConnectionEvent> {
        if self.device.is_none() {
            self.collect_scan();

            let now = Instant::now();
            if self.device.is_none() && self.pending.is_none() && self.scan_due(now) {
                self.start_scan(now);
            }
        }
        self.events.pop_front()
    }
}
