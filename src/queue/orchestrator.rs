//! Queue orchestrator — owns the queue and drives the run loop.
//!
//! [`QueueOrchestrator`] holds the ordered item list, the active
//! [`RunSession`] and the append-only log behind one mutex, and exposes the
//! queue operations as methods. Item executions are strictly sequential:
//! the run loop awaits one [`PipelineRunner`] invocation at a time and two
//! items never overlap.
//!
//! Log lines flow in over the event bus while an invocation is in flight;
//! [`QueueOrchestrator::run_status_mapper`] consumes them and drives the
//! stage state machine for whichever item is currently executing. The run
//! loop itself never reads pipeline output.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast::error::RecvError;

use crate::bus::{BusEvent, EventBus};
use crate::cache::CacheAccountant;
use crate::media::PathResolver;
use crate::pipeline::PipelineRunner;

use super::item::QueueItem;
use super::status::{ItemStatus, StageMap};

// ---------------------------------------------------------------------------
// RunSession
// ---------------------------------------------------------------------------

/// Ephemeral context for "the queue is being drained".
///
/// At most one exists per orchestrator; `current_index` is only meaningful
/// while the session is alive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSession {
    /// Index of the item presently executing.
    pub current_index: usize,
}

// ---------------------------------------------------------------------------
// QueueState
// ---------------------------------------------------------------------------

/// Everything the orchestrator mutates, behind one lock.
#[derive(Debug, Default)]
struct QueueState {
    items: Vec<QueueItem>,
    session: Option<RunSession>,
    /// Append-only, UI-visible log. Clearing it is cosmetic.
    log: Vec<String>,
}

// ---------------------------------------------------------------------------
// QueueOrchestrator
// ---------------------------------------------------------------------------

/// Sequentially executes queued media items through the external pipeline.
///
/// External callers observe the queue through snapshot reads
/// ([`snapshot`](Self::snapshot), [`log_snapshot`](Self::log_snapshot));
/// nothing outside this type holds a mutable reference to the state.
pub struct QueueOrchestrator {
    state: Mutex<QueueState>,
    resolver: Arc<dyn PathResolver>,
    runner: Arc<dyn PipelineRunner>,
    cache: Arc<CacheAccountant>,
    bus: EventBus,
    stages: StageMap,
    stop_requested: AtomicBool,
}

impl QueueOrchestrator {
    pub fn new(
        resolver: Arc<dyn PathResolver>,
        runner: Arc<dyn PipelineRunner>,
        cache: Arc<CacheAccountant>,
        bus: EventBus,
    ) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            resolver,
            runner,
            cache,
            bus,
            stages: StageMap::new(),
            stop_requested: AtomicBool::new(false),
        }
    }

    /// Handle to the event bus this orchestrator publishes on.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    // -----------------------------------------------------------------------
    // Queue operations
    // -----------------------------------------------------------------------

    /// Resolve `paths` and append the accepted items.
    ///
    /// Items whose path is already queued are dropped; the rest are appended
    /// in input order with status `pending`. Returns the count actually
    /// added — zero is valid and logged, not an error.
    pub fn enqueue(&self, paths: &[PathBuf]) -> usize {
        let resolved = self.resolver.resolve(paths);
        if resolved.is_empty() {
            self.bus.log("[System] No valid media files found.");
            return 0;
        }

        let added = {
            let mut st = self.state.lock().unwrap();
            let mut added = 0;
            for media in resolved {
                if st.items.iter().any(|item| item.path == media.path) {
                    continue;
                }
                st.items.push(QueueItem::pending(media));
                added += 1;
            }
            added
        };

        self.bus.log(format!("[System] Added {added} files."));
        added
    }

    /// Remove one item by id.
    ///
    /// Rejected (no-op, returns `false`) while a run session is active —
    /// that situation is a UI race, not a fault.
    pub fn remove(&self, id: &str) -> bool {
        let mut st = self.state.lock().unwrap();
        if st.session.is_some() {
            return false;
        }
        let before = st.items.len();
        st.items.retain(|item| item.id != id);
        st.items.len() != before
    }

    /// Empty the queue. Rejected (no-op) while a run session is active.
    pub fn clear(&self) -> bool {
        {
            let mut st = self.state.lock().unwrap();
            if st.session.is_some() {
                return false;
            }
            st.items.clear();
        }
        self.bus.log("[System] List cleared.");
        true
    }

    /// Ask the run loop to stop after the item currently executing.
    ///
    /// There is no mid-item cancellation: an invocation that has started
    /// always runs to completion or failure.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    /// Drain the queue, one pipeline invocation at a time.
    ///
    /// No-op (returns `false`) when a session is already active or the
    /// queue is empty. Items already `done` or `error` are skipped at
    /// selection time. A failing item is marked `error` and the loop moves
    /// on — one failure never aborts the run. After the last item the
    /// session is torn down and a cache-size refresh is triggered.
    pub async fn start(&self) -> bool {
        // Check-and-set under one lock so a concurrent second start() can
        // never create an overlapping session.
        let total = {
            let mut st = self.state.lock().unwrap();
            if st.session.is_some() || st.items.is_empty() {
                return false;
            }
            st.session = Some(RunSession { current_index: 0 });
            st.items.len()
        };
        self.stop_requested.store(false, Ordering::SeqCst);

        for index in 0..total {
            let selected = {
                let mut guard = self.state.lock().unwrap();
                let st = &mut *guard;
                let item = &mut st.items[index];
                if item.status.is_terminal() {
                    None
                } else {
                    if let Some(session) = st.session.as_mut() {
                        session.current_index = index;
                    }
                    item.status = ItemStatus::Preparing;
                    Some((item.path.clone(), item.name.clone()))
                }
            };

            let Some((path, name)) = selected else {
                continue;
            };

            self.bus.log(format!(
                "=== Processing [{}/{}]: {} ===",
                index + 1,
                total,
                name
            ));

            match self.runner.run(&path).await {
                Ok(()) => {
                    // Forced terminal override: the pipeline may not emit a
                    // final marker.
                    self.force_status(index, ItemStatus::Done);
                }
                Err(e) => {
                    self.force_status(index, ItemStatus::Error);
                    self.bus.log(format!("=== Error: {e} ==="));
                }
            }

            self.cache.after_item(&path);

            if self.stop_requested.swap(false, Ordering::SeqCst) {
                self.bus.log("=== Queue Stopped ===");
                break;
            }
        }

        {
            let mut st = self.state.lock().unwrap();
            st.session = None;
        }

        let size = self.cache.refresh();
        log::debug!("queue: cache size after run: {size} bytes");
        self.bus.log("=== Queue Finished ===");
        true
    }

    // -----------------------------------------------------------------------
    // Status mapping
    // -----------------------------------------------------------------------

    /// Record one log line and apply its stage marker, if any, to the item
    /// currently executing.
    ///
    /// Status only moves forward along the stage order within a run;
    /// markers that would regress it, markers observed with no active
    /// session, and markers for an item already terminal are all ignored.
    /// Re-asserting the current stage is an idempotent no-op.
    pub fn apply_log_line(&self, line: &str) {
        let mut guard = self.state.lock().unwrap();
        let st = &mut *guard;
        st.log.push(line.to_string());

        let Some(next) = self.stages.match_line(line) else {
            return;
        };
        let Some(session) = st.session.as_ref() else {
            return;
        };
        let Some(item) = st.items.get_mut(session.current_index) else {
            return;
        };
        if item.status.is_terminal() {
            return;
        }

        if let (Some(current), Some(new)) = (item.status.rank(), next.rank()) {
            if new >= current {
                item.status = next;
            }
        }
    }

    /// Consume bus events and feed log lines through
    /// [`apply_log_line`](Self::apply_log_line).
    ///
    /// Spawn this as a task alongside the orchestrator; it returns when the
    /// bus closes. Lagging never blocks the publisher — skipped lines only
    /// cost status granularity, never correctness, because completion
    /// status is forced by the run loop.
    pub async fn run_status_mapper(self: Arc<Self>) {
        let mut rx = self.bus.subscribe();
        loop {
            match rx.recv().await {
                Ok(BusEvent::Log(line)) => self.apply_log_line(&line),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("status mapper lagged, skipped {skipped} events");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    // -----------------------------------------------------------------------
    // Snapshot reads
    // -----------------------------------------------------------------------

    /// Copy of the queue as it stands.
    pub fn snapshot(&self) -> Vec<QueueItem> {
        self.state.lock().unwrap().items.clone()
    }

    /// `true` while a run session is active.
    pub fn is_running(&self) -> bool {
        self.state.lock().unwrap().session.is_some()
    }

    /// Index of the item currently executing, if any.
    pub fn current_index(&self) -> Option<usize> {
        self.state
            .lock()
            .unwrap()
            .session
            .as_ref()
            .map(|s| s.current_index)
    }

    /// Copy of the append-only log.
    pub fn log_snapshot(&self) -> Vec<String> {
        self.state.lock().unwrap().log.clone()
    }

    /// Discard the collected log lines. Purely cosmetic — orchestration is
    /// unaffected.
    pub fn clear_log(&self) {
        self.state.lock().unwrap().log.clear();
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn force_status(&self, index: usize, status: ItemStatus) {
        let mut st = self.state.lock().unwrap();
        if let Some(item) = st.items.get_mut(index) {
            item.status = status;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
