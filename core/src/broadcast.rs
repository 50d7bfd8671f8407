//! Change-event distribution for the cycle store.
//!
//! The store publishes one [`CycleEvent`] per successful mutation through a
//! [`CycleBroadcaster`]. The countdown driver and any presentation layer
//! subscribe to it instead of polling the store for changes.
//!
//! # Example
//!
//! ```rust
//! use focus_timer_core::broadcast::CycleBroadcaster;
//!
//! let broadcaster = CycleBroadcaster::new();
//! let _rx = broadcaster.subscribe();
//! assert_eq!(broadcaster.subscriber_count(), 1);
//! ```

use tokio::sync::broadcast::{self, Receiver, Sender};
use tracing::{debug, trace};

use crate::types::CycleEvent;

/// Default channel capacity.
///
/// A 1-second driver tick produces at most one event per second, so slow
/// subscribers have a wide margin before they see `RecvError::Lagged`.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Fan-out hub for [`CycleEvent`]s.
///
/// Cheap to clone; all clones feed the same channel.
#[derive(Debug, Clone)]
pub struct CycleBroadcaster {
    sender: Sender<CycleEvent>,
}

impl CycleBroadcaster {
    /// Creates a broadcaster with [`DEFAULT_CHANNEL_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a broadcaster with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        debug!(capacity, "Created cycle broadcaster");
        Self { sender }
    }

    /// Subscribes to events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<CycleEvent> {
        let rx = self.sender.subscribe();
        debug!(
            subscriber_count = self.subscriber_count(),
            "New cycle subscriber added"
        );
        rx
    }

    /// Publishes an event to all current subscribers.
    ///
    /// Returns the number of subscribers reached. Having no subscribers is
    /// normal (a headless store with no driver attached) and returns 0.
    pub fn broadcast(&self, event: CycleEvent) -> usize {
        trace!(cycle_id = %event.cycle_id(), event = ?event, "Broadcasting cycle event");
        self.sender.send(event).unwrap_or(0)
    }

    /// Number of live receivers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for CycleBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CycleId;
    use tokio::sync::broadcast::error::RecvError;

    fn elapsed_event(seconds: u64) -> CycleEvent {
        CycleEvent::Elapsed {
            cycle_id: CycleId::from_generation(1),
            seconds,
        }
    }

    #[test]
    fn new_broadcaster_has_no_subscribers() {
        let broadcaster = CycleBroadcaster::new();
        assert_eq!(broadcaster.subscriber_count(), 0);
    }

    #[test]
    fn broadcast_without_subscribers_returns_zero() {
        let broadcaster = CycleBroadcaster::default();
        assert_eq!(broadcaster.broadcast(elapsed_event(1)), 0);
    }

    #[test]
    fn subscriber_count_tracks_drops() {
        let broadcaster = CycleBroadcaster::new();
        let rx1 = broadcaster.subscribe();
        let _rx2 = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 2);

        drop(rx1);
        assert_eq!(broadcaster.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn every_subscriber_receives_events_in_order() {
        let broadcaster = CycleBroadcaster::new();
        let mut rx1 = broadcaster.subscribe();
        let mut rx2 = broadcaster.subscribe();

        assert_eq!(broadcaster.broadcast(elapsed_event(1)), 2);
        assert_eq!(broadcaster.broadcast(elapsed_event(2)), 2);

        for rx in [&mut rx1, &mut rx2] {
            assert_eq!(rx.recv().await.unwrap(), elapsed_event(1));
            assert_eq!(rx.recv().await.unwrap(), elapsed_event(2));
        }
    }

    #[tokio::test]
    async fn late_subscriber_misses_earlier_events() {
        let broadcaster = CycleBroadcaster::new();
        let _early = broadcaster.subscribe();
        broadcaster.broadcast(elapsed_event(1));

        let mut late = broadcaster.subscribe();
        broadcaster.broadcast(elapsed_event(2));

        assert_eq!(late.recv().await.unwrap(), elapsed_event(2));
    }

    #[test]
    fn recv_stays_pending_until_an_event_is_sent() {
        let broadcaster = CycleBroadcaster::new();
        let mut rx = broadcaster.subscribe();
        let mut recv = tokio_test::task::spawn(rx.recv());

        tokio_test::assert_pending!(recv.poll());

        broadcaster.broadcast(elapsed_event(7));
        assert!(recv.is_woken());
        let event = tokio_test::assert_ready_ok!(recv.poll());
        assert_eq!(event, elapsed_event(7));
    }

    #[tokio::test]
    async fn slow_subscriber_is_told_it_lagged() {
        let broadcaster = CycleBroadcaster::with_capacity(2);
        let mut rx = broadcaster.subscribe();

        for seconds in 0..5 {
            broadcaster.broadcast(elapsed_event(seconds));
        }

        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(3))));
        assert_eq!(rx.recv().await.unwrap(), elapsed_event(3));
    }
}
