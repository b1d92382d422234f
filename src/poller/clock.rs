//! Frame clock abstraction driving the poll loop

use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::{interval, Instant, Interval, MissedTickBehavior};

/// Source of frame ticks.
///
/// Each call waits for the next frame and returns its timestamp, measured from
/// the clock's origin. Timestamps never decrease.
#[async_trait]
pub trait FrameClock: Send {
    async fn next_frame(&mut self) -> Duration;
}

/// Fixed-rate frame clock backed by a tokio interval.
///
/// Frames missed while the loop was busy are dropped rather than bursted,
/// so the loop never runs faster than `frame_rate_hz`.
#[derive(Debug)]
pub struct IntervalClock {
    interval: Interval,
    origin: Instant,
}

impl IntervalClock {
    /// Creates a clock ticking `frame_rate_hz` times per second.
    ///
    /// The first frame fires immediately.
    pub fn new(frame_rate_hz: u32) -> Self {
        let period = Duration::from_secs_f64(1.0 / f64::from(frame_rate_hz.max(1)));
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            interval,
            origin: Instant::now(),
        }
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }
}

#[async_trait]
impl FrameClock for IntervalClock {
    async fn next_frame(&mut self) -> Duration {
        let tick = self.interval.tick().await;
        tick.saturating_duration_since(self.origin)
    }
}

/// Replays a fixed list of timestamps, then never ticks again.
///
/// Lets tests drive the loop with exact frame times.
#[derive(Debug, Clone, Default)]
pub struct ScriptedClock {
    timestamps: VecDeque<Duration>,
}

impl ScriptedClock {
    pub fn new(timestamps: impl IntoIterator<Item = Duration>) -> Self {
        Self {
            timestamps: timestamps.into_iter().collect(),
        }
    }

    /// Frames not yet delivered.
    pub fn remaining(&self) -> usize {
        self.timestamps.len()
    }
}

#[async_trait]
impl FrameClock for ScriptedClock {
    async fn next_frame(&mut self) -> Duration {
        match self.timestamps.pop_front() {
            Some(timestamp) => timestamp,
            None => std::future::pending().await,
        }
    }
}
