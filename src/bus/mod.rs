//! Process-wide event bus.
//!
//! [`EventBus`] is a thin wrapper around a `tokio::sync::broadcast` channel
//! carrying the four notification kinds the UI layer consumes:
//!
//! * [`BusEvent::Log`] — one append-only log line (pipeline output, system
//!   messages, failure banners).
//! * [`BusEvent::DownloadProgress`] — model download percentage (0–100).
//! * [`BusEvent::DownloadStatus`] — free-text model download status.
//! * [`BusEvent::DownloadDone`] — terminal success signal for a download.
//!
//! Publishing never blocks: a subscriber that falls behind lags and skips
//! old events instead of stalling the producer, and publishing with no
//! subscribers at all is a silent no-op. Subscriptions are plain
//! `broadcast::Receiver`s — dropping one unsubscribes, and both operations
//! are safe at any time, including mid-delivery.

use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// BusEvent
// ---------------------------------------------------------------------------

/// One notification delivered over the [`EventBus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    /// A single line of the user-visible log stream.
    Log(String),

    /// Model download progress as an integer percentage (0–100).
    DownloadProgress(u8),

    /// Free-text model download status (e.g. which artifact is in flight).
    DownloadStatus(String),

    /// The model download finished successfully.
    DownloadDone,
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer depth per subscriber.
///
/// Pipeline stages can be chatty; 1024 lines of slack keeps a briefly busy
/// subscriber from lagging during normal runs.
const DEFAULT_CAPACITY: usize = 1024;

/// Broadcast channel shared by the orchestrator, the model coordinator and
/// any number of observers.
///
/// Cheap to clone — all clones publish into the same channel.
///
/// ```
/// use subtitle_studio::bus::{BusEvent, EventBus};
///
/// let bus = EventBus::new();
/// let mut rx = bus.subscribe();
/// bus.log("hello");
/// assert_eq!(rx.try_recv().unwrap(), BusEvent::Log("hello".into()));
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<BusEvent>,
}

impl EventBus {
    /// Create a bus with the default per-subscriber buffer.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a bus with an explicit per-subscriber buffer depth.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Open a new subscription.
    ///
    /// The receiver only observes events published after this call. Drop it
    /// to unsubscribe.
    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.tx.subscribe()
    }

    /// Publish an event to all current subscribers.
    ///
    /// Never blocks; an event published with zero subscribers is dropped.
    pub fn publish(&self, event: BusEvent) {
        // send() only errors when there are no receivers, which is fine.
        let _ = self.tx.send(event);
    }

    /// Publish one log line.
    pub fn log(&self, message: impl Into<String>) {
        self.publish(BusEvent::Log(message.into()));
    }

    /// Number of currently attached subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_without_subscribers_is_a_noop() {
        let bus = EventBus::new();
        // Must not panic or block.
        bus.log("nobody is listening");
        bus.publish(BusEvent::DownloadDone);
    }

    #[test]
    fn subscriber_receives_published_events_in_order() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.log("first");
        bus.publish(BusEvent::DownloadProgress(40));
        bus.publish(BusEvent::DownloadStatus("fetching".into()));
        bus.publish(BusEvent::DownloadDone);

        assert_eq!(rx.try_recv().unwrap(), BusEvent::Log("first".into()));
        assert_eq!(rx.try_recv().unwrap(), BusEvent::DownloadProgress(40));
        assert_eq!(
            rx.try_recv().unwrap(),
            BusEvent::DownloadStatus("fetching".into())
        );
        assert_eq!(rx.try_recv().unwrap(), BusEvent::DownloadDone);
    }

    #[test]
    fn each_subscriber_gets_its_own_copy() {
        let bus = EventBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.log("fan-out");

        assert_eq!(a.try_recv().unwrap(), BusEvent::Log("fan-out".into()));
        assert_eq!(b.try_recv().unwrap(), BusEvent::Log("fan-out".into()));
    }

    #[test]
    fn dropping_a_receiver_unsubscribes() {
        let bus = EventBus::new();
        let rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);
        drop(rx);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn late_subscriber_misses_earlier_events() {
        let bus = EventBus::new();
        bus.log("before subscribe");

        let mut rx = bus.subscribe();
        bus.log("after subscribe");

        assert_eq!(
            rx.try_recv().unwrap(),
            BusEvent::Log("after subscribe".into())
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn slow_subscriber_lags_instead_of_blocking_producer() {
        let bus = EventBus::with_capacity(4);
        let mut rx = bus.subscribe();

        for i in 0..32 {
            bus.log(format!("line {i}"));
        }

        // The first recv reports the lag; subsequent ones deliver the most
        // recent buffered events.
        use tokio::sync::broadcast::error::TryRecvError;
        match rx.try_recv() {
            Err(TryRecvError::Lagged(skipped)) => assert!(skipped > 0),
            other => panic!("expected Lagged, got {other:?}"),
        }
        assert!(matches!(rx.try_recv(), Ok(BusEvent::Log(_))));
    }
}
