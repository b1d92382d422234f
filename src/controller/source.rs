//! Trait abstraction for the platform gamepad service to enable testing

use super::frame::{ConnectionEvent, RawFrame};

/// Platform service reporting raw controller frames and connection changes.
///
/// Both calls read already-buffered state and must not block.
#[cfg_attr(test, mockall::automock)]
pub trait GamepadSource: Send {
    /// Current raw frames indexed by slot. `None` marks an empty slot.
    fn frames(&mut self) -> Vec<Option<RawFrame>>;

    /// Next pending connection notification, if any.
    fn poll_event(&mut self) -> Option<ConnectionEvent>;
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Scriptable in-memory source for testing
    #[derive(Clone, Default)]
    pub struct MockSource {
        pub slots: Arc<Mutex<Vec<Option<RawFrame>>>>,
        pub events: Arc<Mutex<VecDeque<ConnectionEvent>>>,
        pub frame_reads: Arc<Mutex<usize>>,
    }

    impl MockSource {
        pub fn new() -> Self {
            Self::default()
        }

        /// Places a frame in slot 0 and queues a connect notification.
        pub fn connect(&self, frame: RawFrame) {
            self.set_slot(0, Some(frame));
            self.events.lock().unwrap().push_back(ConnectionEvent::Connected);
        }

        /// Empties slot 0 and queues a disconnect notification.
        pub fn disconnect(&self) {
            self.set_slot(0, None);
            self.events.lock().unwrap().push_back(ConnectionEvent::Disconnected);
        }

        pub fn set_slot(&self, slot: usize, frame: Option<RawFrame>) {
            let mut slots = self.slots.lock().unwrap();
            if slots.len() <= slot {
                slots.resize(slot + 1, None);
            }
            slots[slot] = frame;
        }

        pub fn frame_reads(&self) -> usize {
            *self.frame_reads.lock().unwrap()
        }
    }

    impl GamepadSource for MockSource {
        fn frames(&mut self) -> Vec<Option<RawFrame>> {
            *self.frame_reads.lock().unwrap() += 1;
            self.slots.lock().unwrap().clone()
        }

        fn poll_event(&mut self) -> Option<ConnectionEvent> {
            self.events.lock().unwrap().pop_front()
        }
    }
}
