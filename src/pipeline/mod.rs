//! External pipeline execution.
//!
//! The multi-stage processing pipeline (prepare → speech recognition →
//! correction → translation → export) lives outside this process as a set
//! of interpreter scripts. This module owns the seam to it:
//!
//! * [`PipelineRunner`] — async trait the orchestrator invokes once per
//!   queue item, never concurrently.
//! * [`ProcessPipelineRunner`] — production implementation that spawns the
//!   bundled interpreter and streams its output onto the event bus.
//! * [`PipelineError`] — failure taxonomy for a single invocation.

pub mod runner;

pub use runner::{PipelineError, PipelineRunner, ProcessPipelineRunner};
