//! Model readiness coordination.
//!
//! The coordinator gates pipeline usability on artifact presence. It is the
//! single writer of [`ModelCheckState`]; everything else observes snapshots
//! or bus events.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::bus::{BusEvent, EventBus};

use super::fetcher::{FetchEvent, ModelFetcher};
use super::inventory::{InventoryReport, ModelInventory};

// ---------------------------------------------------------------------------
// ModelCheckState
// ---------------------------------------------------------------------------

/// Readiness of the required model artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelCheckState {
    /// No check has run yet.
    Idle,
    /// An inventory scan is in flight.
    Checking,
    /// These artifacts (by display name) are absent.
    Missing(Vec<String>),
    /// A download is in flight. `progress` follows the latest event from
    /// the fetch stream — last-write-wins, not clamped to monotonic.
    Downloading { progress: u8, status: String },
    /// Everything the pipeline needs is on disk.
    Ready,
}

impl ModelCheckState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ModelCheckState::Ready)
    }
}

// ---------------------------------------------------------------------------
// ModelCoordinator
// ---------------------------------------------------------------------------

/// Checks artifact presence and mediates the download.
///
/// `download()` is only valid from `Missing`; from any other state it is a
/// no-op, matching the other UI-race preconditions in the application. A
/// failed download returns to a freshly re-checked `Missing` — partial
/// progress counts — and is never retried without an explicit new
/// `download()` call.
pub struct ModelCoordinator {
    inventory: Arc<dyn ModelInventory>,
    fetcher: Arc<dyn ModelFetcher>,
    bus: EventBus,
    state: Mutex<ModelCheckState>,
}

impl ModelCoordinator {
    pub fn new(
        inventory: Arc<dyn ModelInventory>,
        fetcher: Arc<dyn ModelFetcher>,
        bus: EventBus,
    ) -> Self {
        Self {
            inventory,
            fetcher,
            bus,
            state: Mutex::new(ModelCheckState::Idle),
        }
    }

    /// Snapshot of the current readiness state.
    pub fn state(&self) -> ModelCheckState {
        self.state.lock().unwrap().clone()
    }

    /// Scan the inventory and settle on `Ready` or `Missing`.
    ///
    /// Emits no download events — a fully populated environment goes
    /// straight to `Ready` silently.
    pub fn check(&self) -> ModelCheckState {
        *self.state.lock().unwrap() = ModelCheckState::Checking;

        let next = match self.inventory.check() {
            InventoryReport::Ready => ModelCheckState::Ready,
            InventoryReport::Missing(names) => {
                self.bus
                    .log(format!("[System] Missing models: {}", names.join(", ")));
                ModelCheckState::Missing(names)
            }
        };

        *self.state.lock().unwrap() = next.clone();
        next
    }

    /// Re-run the inventory scan, for users who placed artifacts by hand.
    pub fn manual_recheck(&self) -> ModelCheckState {
        self.check()
    }

    /// Run the fetcher and track its event stream until a terminal event.
    ///
    /// No-op (returns `false`) unless the current state is `Missing`. On
    /// success the state becomes `Ready` and a `DownloadDone` bus event is
    /// published; on failure the state returns to a re-checked `Missing`
    /// and the reason is logged.
    pub async fn download(&self) -> bool {
        {
            let mut state = self.state.lock().unwrap();
            if !matches!(*state, ModelCheckState::Missing(_)) {
                return false;
            }
            *state = ModelCheckState::Downloading {
                progress: 0,
                status: String::new(),
            };
        }

        let (tx, mut rx) = mpsc::channel(32);
        let fetch = self.fetcher.fetch(tx);

        let consume = async {
            let mut outcome = None;
            while let Some(event) = rx.recv().await {
                match event {
                    FetchEvent::Status(text) => {
                        self.update_download(|_, status| *status = text.clone());
                        self.bus.publish(BusEvent::DownloadStatus(text));
                    }
                    FetchEvent::Progress(percent) => {
                        self.update_download(|progress, _| *progress = percent);
                        self.bus.publish(BusEvent::DownloadProgress(percent));
                    }
                    FetchEvent::Done => outcome = Some(Ok(())),
                    FetchEvent::Failed(reason) => outcome = Some(Err(reason)),
                }
            }
            outcome
        };

        let ((), outcome) = tokio::join!(fetch, consume);

        match outcome {
            Some(Ok(())) => {
                *self.state.lock().unwrap() = ModelCheckState::Ready;
                self.bus.publish(BusEvent::DownloadDone);
                self.bus.log("[System] Model download complete.");
            }
            Some(Err(reason)) => {
                self.bus
                    .log(format!("[System] Model download failed: {reason}"));
                self.check();
            }
            None => {
                // The fetcher hung up without a terminal event. Treat it as
                // a failure.
                self.bus
                    .log("[System] Model download ended unexpectedly.");
                self.check();
            }
        }
        true
    }

    fn update_download(&self, apply: impl FnOnce(&mut u8, &mut String)) {
        let mut state = self.state.lock().unwrap();
        if let ModelCheckState::Downloading { progress, status } = &mut *state {
            apply(progress, status);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::broadcast::error::TryRecvError;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    struct FixedInventory {
        report: Mutex<InventoryReport>,
    }

    impl FixedInventory {
        fn ready() -> Arc<Self> {
            Arc::new(Self {
                report: Mutex::new(InventoryReport::Ready),
            })
        }

        fn missing(names: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                report: Mutex::new(InventoryReport::Missing(
                    names.iter().map(|s| s.to_string()).collect(),
                )),
            })
        }

        fn set(&self, report: InventoryReport) {
            *self.report.lock().unwrap() = report;
        }
    }

    impl ModelInventory for FixedInventory {
        fn check(&self) -> InventoryReport {
            self.report.lock().unwrap().clone()
        }
    }

    /// Fetcher that replays a scripted event sequence.
    struct ScriptedFetcher {
        events: Vec<FetchEvent>,
    }

    impl ScriptedFetcher {
        fn with(events: Vec<FetchEvent>) -> Arc<Self> {
            Arc::new(Self { events })
        }
    }

    #[async_trait]
    impl ModelFetcher for ScriptedFetcher {
        async fn fetch(&self, events: mpsc::Sender<FetchEvent>) {
            for event in &self.events {
                let _ = events.send(event.clone()).await;
            }
        }
    }

    fn drain_bus(rx: &mut tokio::sync::broadcast::Receiver<BusEvent>) -> Vec<BusEvent> {
        let mut out = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(ev) => out.push(ev),
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
                Err(TryRecvError::Lagged(_)) => continue,
            }
        }
        out
    }

    // -----------------------------------------------------------------------
    // check / manual_recheck
    // -----------------------------------------------------------------------

    #[test]
    fn check_with_everything_present_is_silently_ready() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let coordinator = ModelCoordinator::new(
            FixedInventory::ready(),
            ScriptedFetcher::with(vec![]),
            bus,
        );

        assert_eq!(coordinator.check(), ModelCheckState::Ready);
        assert!(coordinator.state().is_ready());
        // No download event of any kind was published.
        assert!(drain_bus(&mut rx)
            .iter()
            .all(|ev| matches!(ev, BusEvent::Log(_))));
        assert!(drain_bus(&mut rx).is_empty());
    }

    #[test]
    fn check_reports_and_logs_the_missing_artifacts() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let coordinator = ModelCoordinator::new(
            FixedInventory::missing(&["Context AI (Qwen)"]),
            ScriptedFetcher::with(vec![]),
            bus,
        );

        assert_eq!(
            coordinator.check(),
            ModelCheckState::Missing(vec!["Context AI (Qwen)".into()])
        );
        assert!(drain_bus(&mut rx).iter().any(|ev| matches!(
            ev,
            BusEvent::Log(line) if line.contains("Missing models: Context AI (Qwen)")
        )));
    }

    #[test]
    fn manual_recheck_picks_up_hand_placed_artifacts() {
        let inventory = FixedInventory::missing(&["Translator AI (Sakura)"]);
        let coordinator = ModelCoordinator::new(
            Arc::clone(&inventory) as Arc<dyn ModelInventory>,
            ScriptedFetcher::with(vec![]),
            EventBus::new(),
        );

        assert!(matches!(
            coordinator.check(),
            ModelCheckState::Missing(_)
        ));

        inventory.set(InventoryReport::Ready);
        assert_eq!(coordinator.manual_recheck(), ModelCheckState::Ready);
    }

    // -----------------------------------------------------------------------
    // download
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn download_is_a_noop_unless_missing() {
        let coordinator = ModelCoordinator::new(
            FixedInventory::ready(),
            ScriptedFetcher::with(vec![FetchEvent::Done]),
            EventBus::new(),
        );

        // Idle: never checked.
        assert!(!coordinator.download().await);

        coordinator.check();
        // Ready: nothing to fetch.
        assert!(!coordinator.download().await);
        assert!(coordinator.state().is_ready());
    }

    #[tokio::test]
    async fn successful_download_forwards_events_and_settles_ready() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let coordinator = ModelCoordinator::new(
            FixedInventory::missing(&["Context AI (Qwen)"]),
            ScriptedFetcher::with(vec![
                FetchEvent::Status("Downloading Context AI (Qwen)...".into()),
                FetchEvent::Progress(10),
                FetchEvent::Progress(100),
                FetchEvent::Done,
            ]),
            bus,
        );

        coordinator.check();
        assert!(coordinator.download().await);
        assert!(coordinator.state().is_ready());

        let events = drain_bus(&mut rx);
        assert!(events.contains(&BusEvent::DownloadStatus(
            "Downloading Context AI (Qwen)...".into()
        )));
        assert!(events.contains(&BusEvent::DownloadProgress(10)));
        assert!(events.contains(&BusEvent::DownloadProgress(100)));
        assert!(events.contains(&BusEvent::DownloadDone));
    }

    #[tokio::test]
    async fn progress_is_last_write_wins_not_clamped() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let coordinator = ModelCoordinator::new(
            FixedInventory::missing(&["Context AI (Qwen)"]),
            ScriptedFetcher::with(vec![
                FetchEvent::Progress(40),
                FetchEvent::Progress(30),
                FetchEvent::Done,
            ]),
            bus,
        );

        coordinator.check();
        coordinator.download().await;

        // Both values went out, in stream order, no clamping.
        let progress: Vec<u8> = drain_bus(&mut rx)
            .into_iter()
            .filter_map(|ev| match ev {
                BusEvent::DownloadProgress(p) => Some(p),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![40, 30]);
    }

    #[tokio::test]
    async fn failed_download_returns_to_a_rechecked_missing() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let inventory = FixedInventory::missing(&["Context AI (Qwen)", "Translator AI (Sakura)"]);
        let coordinator = ModelCoordinator::new(
            Arc::clone(&inventory) as Arc<dyn ModelInventory>,
            ScriptedFetcher::with(vec![
                FetchEvent::Progress(55),
                FetchEvent::Failed("Translator AI (Sakura): request failed".into()),
            ]),
            bus,
        );

        coordinator.check();
        // Partial progress counts: the first artifact landed before the
        // failure, so the recheck sees only one missing.
        inventory.set(InventoryReport::Missing(vec![
            "Translator AI (Sakura)".into(),
        ]));

        assert!(coordinator.download().await);
        assert_eq!(
            coordinator.state(),
            ModelCheckState::Missing(vec!["Translator AI (Sakura)".into()])
        );

        let events = drain_bus(&mut rx);
        assert!(!events.contains(&BusEvent::DownloadDone));
        assert!(events.iter().any(|ev| matches!(
            ev,
            BusEvent::Log(line) if line.contains("Model download failed")
        )));
    }

    #[tokio::test]
    async fn a_fetcher_that_hangs_up_early_counts_as_failure() {
        let coordinator = ModelCoordinator::new(
            FixedInventory::missing(&["Context AI (Qwen)"]),
            ScriptedFetcher::with(vec![FetchEvent::Progress(5)]),
            EventBus::new(),
        );

        coordinator.check();
        assert!(coordinator.download().await);
        assert!(matches!(
            coordinator.state(),
            ModelCheckState::Missing(_)
        ));
    }

    #[tokio::test]
    async fn downloading_state_tracks_the_latest_progress_and_status() {
        // Fetcher that parks so we can observe the mid-download state.
        struct ParkedFetcher;

        #[async_trait]
        impl ModelFetcher for ParkedFetcher {
            async fn fetch(&self, events: mpsc::Sender<FetchEvent>) {
                let _ = events.send(FetchEvent::Status("warming up".into())).await;
                let _ = events.send(FetchEvent::Progress(15)).await;
                // Yield until the consumer has drained the two events.
                for _ in 0..8 {
                    tokio::task::yield_now().await;
                }
                let _ = events.send(FetchEvent::Done).await;
            }
        }

        let coordinator = Arc::new(ModelCoordinator::new(
            FixedInventory::missing(&["Context AI (Qwen)"]),
            Arc::new(ParkedFetcher),
            EventBus::new(),
        ));
        coordinator.check();

        let download = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move { coordinator.download().await })
        };

        // Spin until the coordinator reflects the first two events.
        let mut observed_mid_state = false;
        for _ in 0..64 {
            if let ModelCheckState::Downloading { progress, status } = coordinator.state() {
                if progress == 15 && status == "warming up" {
                    observed_mid_state = true;
                    break;
                }
            }
            tokio::task::yield_now().await;
        }
        assert!(observed_mid_state);

        assert!(download.await.unwrap());
        assert!(coordinator.state().is_ready());
    }
}
