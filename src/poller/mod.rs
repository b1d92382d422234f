//! # Poller Module
//!
//! Rate-limited normalization of slot 0 into the published [`ControllerSnapshot`].
//!
//! The poller is driven by frame ticks. Every tick is checked against the poll
//! interval: ticks closer than `poll_interval` to the last accepted one are
//! skipped, so a 144 Hz frame clock still polls at ~60 Hz with the default
//! 16 ms interval. Connection notifications bypass the limiter.
//!
//! The current snapshot lives in a [`tokio::sync::watch`] channel owned by the
//! poller. It is only ever replaced whole, so a reader never observes a mix of
//! two ticks.
//!
//! ## Usage
//!
//! ```
//! use std::time::Duration;
//! use dualsense_overlay::controller::frame::{ConnectionEvent, RawFrame};
//! use dualsense_overlay::controller::source::GamepadSource;
//! use dualsense_overlay::poller::Poller;
//!
//! struct OnePad;
//!
//! impl GamepadSource for OnePad {
//!     fn frames(&mut self) -> Vec<Option<RawFrame>> {
//!         vec![Some(RawFrame::new("pad"))]
//!     }
//!     fn poll_event(&mut self) -> Option<ConnectionEvent> {
//!         None
//!     }
//! }
//!
//! let mut poller = Poller::new(OnePad);
//! let state = poller.subscribe();
//!
//! assert!(poller.on_frame(Duration::from_millis(0)));
//! assert!(!poller.on_frame(Duration::from_millis(5)));
//! assert!(state.borrow().connected);
//! ```

pub mod clock;
pub mod run;

use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, trace};

use crate::controller::calibration::Deadzone;
use crate::controller::frame::ConnectionEvent;
use crate::controller::snapshot::ControllerSnapshot;
use crate::controller::source::GamepadSource;

/// Default minimum spacing between two normalization passes (~60 Hz).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Polls slot 0 of a [`GamepadSource`] and publishes normalized snapshots.
pub struct Poller<S> {
    source: S,
    poll_interval: Duration,
    deadzone: Deadzone,
    last_tick: Option<Duration>,
    state: watch::Sender<ControllerSnapshot>,
    emissions: u64,
}

impl<S> std::fmt::Debug for Poller<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("poll_interval", &self.poll_interval)
            .field("last_tick", &self.last_tick)
            .field("emissions", &self.emissions)
            .finish_non_exhaustive()
    }
}

impl<S: GamepadSource> Poller<S> {
    /// Creates a poller with the default 16 ms interval.
    ///
    /// The initial snapshot is the disconnected default.
    pub fn new(source: S) -> Self {
        Self::with_interval(source, DEFAULT_POLL_INTERVAL)
    }

    /// Creates a poller with a custom poll interval.
    pub fn with_interval(source: S, poll_interval: Duration) -> Self {
        let (state, _) = watch::channel(ControllerSnapshot::disconnected());
        Self {
            source,
            poll_interval,
            deadzone: Deadzone::default(),
            last_tick: None,
            state,
            emissions: 0,
        }
    }

    /// Returns a new reader of the published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<ControllerSnapshot> {
        self.state.subscribe()
    }

    /// Returns a copy of the current snapshot.
    pub fn snapshot(&self) -> ControllerSnapshot {
        self.state.borrow().clone()
    }

    /// Number of snapshots published so far.
    pub fn emissions(&self) -> u64 {
        self.emissions
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Handles one frame tick at `timestamp`.
    ///
    /// Runs [`update_state`](Self::update_state) if at least `poll_interval`
    /// has elapsed since the last accepted tick (the first tick is always
    /// accepted). Returns whether the tick was accepted.
    pub fn on_frame(&mut self, timestamp: Duration) -> bool {
        if let Some(last) = self.last_tick {
            if timestamp.saturating_sub(last) < self.poll_interval {
                trace!("Skipping frame at {:?}", timestamp);
                return false;
            }
        }

        self.update_state();
        self.last_tick = Some(timestamp);
        true
    }

    /// Reads slot 0 and publishes the resulting snapshot.
    ///
    /// An empty slot publishes the disconnected default only if the current
    /// snapshot is connected. Every other slot is ignored.
    pub fn update_state(&mut self) {
        let slot0 = self.source.frames().into_iter().next().flatten();
        let was_connected = self.state.borrow().connected;

        match slot0 {
            Some(frame) => {
                let snapshot = ControllerSnapshot::from_frame(&frame, self.deadzone);
                if !was_connected {
                    info!("Controller connected: {}", snapshot.id);
                }
                self.publish(snapshot);
            }
            None if was_connected => {
                info!("Controller no longer present");
                self.publish(ControllerSnapshot::disconnected());
            }
            None => {}
        }
    }

    /// Applies a connection notification, bypassing the rate limiter.
    ///
    /// `Connected` forces one normalization pass. `Disconnected` publishes the
    /// disconnected default unless it is already the current snapshot.
    pub fn handle_event(&mut self, event: ConnectionEvent) {
        debug!("Connection event: {:?}", event);
        match event {
            ConnectionEvent::Connected => self.update_state(),
            ConnectionEvent::Disconnected => {
                let already_default = *self.state.borrow() == ControllerSnapshot::disconnected();
                if !already_default {
                    info!("Controller disconnected");
                    self.publish(ControllerSnapshot::disconnected());
                }
            }
        }
    }

    /// Drains and applies every pending notification from the source.
    ///
    /// Returns the number of notifications handled.
    pub fn dispatch_events(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.source.poll_event() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    fn publish(&mut self, snapshot: ControllerSnapshot) {
        self.state.send_replace(snapshot);
        self.emissions += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::frame::{RawButton, RawFrame};
    use crate::controller::snapshot::StickState;
    use crate::controller::source::mocks::MockSource;
    use crate::controller::source::MockGamepadSource;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn cross_frame() -> RawFrame {
        let mut frame = RawFrame::new("DualSense Wireless Controller");
        frame.buttons = vec![RawButton { pressed: true, value: 1.0 }];
        frame.axes = vec![0.05, -0.5, 0.0, 0.0];
        frame
    }

    // ==================== Rate Limiting Tests ====================

    #[test]
    fn test_rate_limit_skips_close_ticks() {
        let source = MockSource::new();
        source.set_slot(0, Some(cross_frame()));
        let mut poller = Poller::new(source.clone());

        let t0 = ms(1000);
        assert!(poller.on_frame(t0));
        assert!(!poller.on_frame(t0 + ms(5)));
        assert!(poller.on_frame(t0 + ms(20)));

        assert_eq!(source.frame_reads(), 2);
    }

    #[test]
    fn test_first_tick_always_accepted() {
        let mut poller = Poller::new(MockSource::new());
        assert!(poller.on_frame(ms(0)));
    }

    #[test]
    fn test_interval_boundary_is_accepted() {
        let mut poller = Poller::new(MockSource::new());
        assert!(poller.on_frame(ms(100)));
        assert!(!poller.on_frame(ms(115)));
        assert!(poller.on_frame(ms(116)));
    }

    #[test]
    fn test_skipped_tick_does_not_move_window() {
        let mut poller = Poller::with_interval(MockSource::new(), ms(10));
        assert!(poller.on_frame(ms(0)));
        assert!(!poller.on_frame(ms(6)));
        // Measured from the accepted tick at 0, not the skipped one at 6
        assert!(poller.on_frame(ms(10)));
    }

    #[test]
    fn test_non_monotonic_timestamp_is_skipped() {
        let mut poller = Poller::new(MockSource::new());
        assert!(poller.on_frame(ms(100)));
        assert!(!poller.on_frame(ms(50)));
    }

    #[test]
    fn test_high_refresh_clock_polls_at_interval() {
        let source = MockSource::new();
        source.set_slot(0, Some(cross_frame()));
        let mut poller = Poller::new(source.clone());

        // ~144 Hz for one second
        let accepted = (0..144u64)
            .filter(|frame| poller.on_frame(Duration::from_micros(frame * 6944)))
            .count();

        // Every third frame clears 16 ms
        assert_eq!(accepted, 48);
        assert_eq!(source.frame_reads(), accepted);
    }

    // ==================== Normalization Tests ====================

    #[test]
    fn test_initial_snapshot_is_disconnected() {
        let poller = Poller::new(MockSource::new());
        assert_eq!(poller.snapshot(), ControllerSnapshot::disconnected());
        assert_eq!(poller.emissions(), 0);
    }

    #[test]
    fn test_update_state_scenario() {
        let source = MockSource::new();
        source.set_slot(0, Some(cross_frame()));
        let mut poller = Poller::new(source);

        poller.update_state();

        let state = poller.snapshot();
        assert!(state.connected);
        assert!(state.cross);
        assert_eq!(state.left_stick, StickState { x: 0.0, y: -0.5, pressed: false });
        assert_eq!(state.id, "DualSense Wireless Controller");
    }

    #[test]
    fn test_only_slot_zero_is_read() {
        let source = MockSource::new();
        source.set_slot(1, Some(cross_frame()));
        let mut poller = Poller::new(source);

        poller.update_state();
        assert!(!poller.snapshot().connected);
        assert_eq!(poller.emissions(), 0);
    }

    #[test]
    fn test_each_tick_replaces_snapshot_whole() {
        let source = MockSource::new();
        source.set_slot(0, Some(cross_frame()));
        let mut poller = Poller::new(source.clone());
        poller.update_state();

        let mut next = RawFrame::new("DualSense Wireless Controller");
        next.buttons = vec![RawButton::default(), RawButton::digital(true)];
        source.set_slot(0, Some(next));
        poller.update_state();

        let state = poller.snapshot();
        assert!(!state.cross, "stale field from previous tick");
        assert!(state.circle);
        assert_eq!(state.left_stick, StickState::default());
    }

    #[test]
    fn test_disconnected_polling_emits_once() {
        let source = MockSource::new();
        source.set_slot(0, Some(cross_frame()));
        let mut poller = Poller::new(source.clone());
        poller.update_state();
        assert_eq!(poller.emissions(), 1);

        source.set_slot(0, None);
        for _ in 0..10 {
            poller.update_state();
        }

        assert_eq!(poller.emissions(), 2);
        assert_eq!(poller.snapshot(), ControllerSnapshot::disconnected());
    }

    #[test]
    fn test_never_connected_polling_emits_nothing() {
        let mut poller = Poller::new(MockSource::new());
        let mut state = poller.subscribe();

        for tick in 0..5 {
            poller.on_frame(ms(tick * 20));
        }

        assert_eq!(poller.emissions(), 0);
        assert!(!state.has_changed().unwrap());
        assert!(!state.borrow_and_update().connected);
    }

    // ==================== Connection Event Tests ====================

    #[test]
    fn test_disconnect_bypasses_rate_limiter() {
        let source = MockSource::new();
        source.set_slot(0, Some(cross_frame()));
        let mut poller = Poller::new(source.clone());
        assert!(poller.on_frame(ms(0)));
        assert!(poller.snapshot().cross);

        // Inside the rate-limit window
        source.disconnect();
        assert_eq!(poller.dispatch_events(), 1);

        assert_eq!(poller.snapshot(), ControllerSnapshot::disconnected());
        assert_eq!(poller.emissions(), 2);
    }

    #[test]
    fn test_connect_forces_pass() {
        let source = MockSource::new();
        let mut poller = Poller::new(source.clone());
        assert!(poller.on_frame(ms(0)));
        assert!(!poller.snapshot().connected);

        source.connect(cross_frame());
        poller.dispatch_events();

        assert!(poller.snapshot().connected);
        assert!(poller.snapshot().cross);
        // The rate-limit window is untouched
        assert!(!poller.on_frame(ms(5)));
    }

    #[test]
    fn test_repeated_disconnect_is_idempotent() {
        let source = MockSource::new();
        source.set_slot(0, Some(cross_frame()));
        let mut poller = Poller::new(source.clone());
        poller.update_state();

        poller.handle_event(ConnectionEvent::Disconnected);
        poller.handle_event(ConnectionEvent::Disconnected);
        poller.handle_event(ConnectionEvent::Disconnected);

        assert_eq!(poller.emissions(), 2);
        assert_eq!(poller.snapshot(), ControllerSnapshot::disconnected());
    }

    #[test]
    fn test_connect_disconnect_churn_leaves_no_stale_state() {
        let source = MockSource::new();
        let mut poller = Poller::new(source.clone());

        for _ in 0..3 {
            source.connect(cross_frame());
            source.disconnect();
        }
        source.connect(RawFrame::new("fresh"));
        poller.dispatch_events();

        let expected = ControllerSnapshot {
            connected: true,
            id: "fresh".to_string(),
            ..ControllerSnapshot::default()
        };
        assert_eq!(poller.snapshot(), expected);
    }

    #[test]
    fn test_connect_event_with_empty_slot_is_noop() {
        let mut source = MockGamepadSource::new();
        source.expect_frames().times(1).returning(|| vec![None]);

        let mut poller = Poller::new(source);
        poller.handle_event(ConnectionEvent::Connected);

        assert_eq!(poller.emissions(), 0);
    }

    #[test]
    fn test_dispatch_drains_all_events() {
        let mut source = MockGamepadSource::new();
        // Popped from the back: Disconnected first, then Connected
        let mut queue = vec![ConnectionEvent::Connected, ConnectionEvent::Disconnected];
        source.expect_poll_event().times(3).returning(move || queue.pop());
        source
            .expect_frames()
            .times(1)
            .returning(|| vec![Some(RawFrame::new("pad"))]);

        let mut poller = Poller::new(source);
        assert_eq!(poller.dispatch_events(), 2);
        assert!(poller.snapshot().connected);
    }

    #[test]
    fn test_subscribers_see_latest_snapshot() {
        let source = MockSource::new();
        let mut poller = Poller::new(source.clone());
        let mut reader = poller.subscribe();

        source.connect(cross_frame());
        poller.dispatch_events();

        assert!(reader.has_changed().unwrap());
        assert!(reader.borrow_and_update().cross);
    }
}
