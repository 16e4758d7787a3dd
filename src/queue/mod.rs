//! The processing queue.
//!
//! Media items accepted by the resolver land here as [`QueueItem`]s and move
//! through the [`ItemStatus`] lifecycle as the [`QueueOrchestrator`] drains
//! the queue, one pipeline invocation at a time. Per-stage progress is
//! inferred from pipeline log output through the [`StageMap`].

pub mod item;
pub mod orchestrator;
pub mod status;

pub use item::QueueItem;
pub use orchestrator::{QueueOrchestrator, RunSession};
pub use status::{ItemStatus, StageMap};
