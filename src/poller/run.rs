//! # Poll Loop
//!
//! Runs a [`Poller`] on its own task, one frame at a time.
//!
//! Every frame the loop first applies pending connection notifications, then
//! offers the frame timestamp to the rate limiter. Frame waits, notifications
//! and normalization passes all happen on the one task, so they never overlap.
//!
//! The loop keeps rescheduling itself until [`PollLoopHandle::teardown`] is
//! called or the handle is dropped.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::clock::FrameClock;
use super::Poller;
use crate::controller::snapshot::ControllerSnapshot;
use crate::controller::source::GamepadSource;

/// Owner of a running poll loop.
#[derive(Debug)]
pub struct PollLoopHandle<S> {
    state: watch::Receiver<ControllerSnapshot>,
    cancel: CancellationToken,
    task: Option<JoinHandle<Poller<S>>>,
}

/// Spawns the poll loop onto the current tokio runtime.
///
/// # Examples
///
/// ```no_run
/// use dualsense_overlay::controller::ps5::DualSenseSource;
/// use dualsense_overlay::config::ControllerConfig;
/// use dualsense_overlay::poller::{clock::IntervalClock, run::spawn, Poller};
///
/// # async fn example() {
/// let source = DualSenseSource::from_config(&ControllerConfig::default());
/// let handle = spawn(Poller::new(source), IntervalClock::new(60));
///
/// let state = handle.subscribe();
/// println!("connected: {}", state.borrow().connected);
///
/// handle.teardown().await;
/// # }
/// ```
pub fn spawn<S, C>(mut poller: Poller<S>, mut clock: C) -> PollLoopHandle<S>
where
    S: GamepadSource + 'static,
    C: FrameClock + 'static,
{
    let cancel = CancellationToken::new();
    let state = poller.subscribe();
    let token = cancel.clone();

    let task = tokio::spawn(async move {
        info!(
            "Starting poll loop ({}ms poll interval)",
            poller.poll_interval().as_millis()
        );

        loop {
            tokio::select! {
                biased;

                _ = token.cancelled() => {
                    debug!("Poll loop cancelled");
                    break;
                }

                timestamp = clock.next_frame() => {
                    poller.dispatch_events();
                    poller.on_frame(timestamp);
                }
            }
        }

        info!("Poll loop stopped after {} snapshots", poller.emissions());
        poller
    });

    PollLoopHandle {
        state,
        cancel,
        task: Some(task),
    }
}

impl<S> PollLoopHandle<S> {
    /// Returns a new reader of the published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<ControllerSnapshot> {
        self.state.clone()
    }

    /// Whether the loop task is still running.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stops the loop and waits for it to exit.
    ///
    /// Cancels the pending frame wait; no further frames or connection
    /// notifications are handled afterwards. Returns the poller, or `None`
    /// if the loop task panicked.
    pub async fn teardown(mut self) -> Option<Poller<S>> {
        self.cancel.cancel();

        let task = self.task.take()?;
        match task.await {
            Ok(poller) => Some(poller),
            Err(e) => {
                warn!("Poll loop task failed: {}", e);
                None
            }
        }
    }
}

impl<S> Drop for PollLoopHandle<S> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::frame::{RawButton, RawFrame};
    use crate::controller::source::mocks::MockSource;
    use crate::poller::clock::ScriptedClock;
    use std::time::Duration;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn cross_frame() -> RawFrame {
        let mut frame = RawFrame::new("DualSense Wireless Controller");
        frame.buttons = vec![RawButton::digital(true)];
        frame
    }

    /// Yields to the loop task until `cond` holds.
    async fn wait_until(cond: impl Fn() -> bool) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while !cond() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("condition not reached");
    }

    #[tokio::test]
    async fn test_loop_rate_limits_scripted_frames() {
        let source = MockSource::new();
        source.set_slot(0, Some(cross_frame()));

        let handle = spawn(
            Poller::new(source.clone()),
            ScriptedClock::new([ms(1000), ms(1005), ms(1020)]),
        );
        let state = handle.subscribe();

        wait_until(|| source.frame_reads() == 2).await;
        assert!(state.borrow().cross);

        let poller = handle.teardown().await.unwrap();
        assert_eq!(poller.emissions(), 2);
        assert_eq!(source.frame_reads(), 2);
    }

    #[tokio::test]
    async fn test_connect_event_is_handled_on_next_frame() {
        let source = MockSource::new();
        source.connect(cross_frame());

        let handle = spawn(Poller::new(source.clone()), ScriptedClock::new([ms(0)]));
        let mut state = handle.subscribe();

        state.wait_for(|s| s.connected).await.unwrap();
        wait_until(|| source.frame_reads() == 2).await;

        let poller = handle.teardown().await.unwrap();
        // Forced pass from the notification, then the frame tick itself
        assert_eq!(poller.emissions(), 2);
        assert!(poller.snapshot().cross);
    }

    #[tokio::test]
    async fn test_disconnect_event_bypasses_rate_limit() {
        let source = MockSource::new();
        source.set_slot(0, Some(cross_frame()));

        let handle = spawn(Poller::new(source.clone()), ScriptedClock::new([ms(0)]));
        let mut state = handle.subscribe();
        state.wait_for(|s| s.cross).await.unwrap();
        let poller = handle.teardown().await.unwrap();

        // Next frame is 1ms later and rate-limited, but its notification still applies
        source.disconnect();
        let handle = spawn(poller, ScriptedClock::new([ms(1)]));
        let mut state = handle.subscribe();
        state.wait_for(|s| !s.connected).await.unwrap();
        assert_eq!(*state.borrow(), ControllerSnapshot::disconnected());

        wait_until(|| source.events.lock().unwrap().is_empty()).await;
        let poller = handle.teardown().await.unwrap();
        assert_eq!(source.frame_reads(), 1);
        assert_eq!(poller.emissions(), 2);
    }

    #[tokio::test]
    async fn test_teardown_stops_loop_and_listeners() {
        let source = MockSource::new();
        let handle = spawn(Poller::new(source.clone()), ScriptedClock::default());
        assert!(handle.is_running());

        let poller = handle.teardown().await;
        assert!(poller.is_some());

        // Notifications after teardown are never consumed
        source.connect(cross_frame());
        tokio::task::yield_now().await;
        assert_eq!(source.events.lock().unwrap().len(), 1);
        assert_eq!(source.frame_reads(), 0);
    }

    #[tokio::test]
    async fn test_drop_cancels_loop() {
        let source = MockSource::new();
        let handle = spawn(Poller::new(source.clone()), ScriptedClock::default());
        let mut state = handle.subscribe();
        drop(handle);

        // The poller, and with it the sender, is dropped once the task exits
        assert!(state.changed().await.is_err());
    }
}
