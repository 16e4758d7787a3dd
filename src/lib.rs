//! Subtitle Studio core — batch subtitle generation for local media files.
//!
//! The application drains an in-memory queue of imported media files
//! through an external multi-stage pipeline (speech recognition,
//! correction, translation, export), one file at a time, while a broadcast
//! event bus carries log output and model-download progress to whatever
//! front end is attached.
//!
//! # Module map
//!
//! * [`bus`] — the process-wide broadcast event bus.
//! * [`media`] — media classification and path-to-item resolution.
//! * [`queue`] — queue items, the status state machine, and the
//!   orchestrator that drains the queue.
//! * [`pipeline`] — the seam to the external processing engine.
//! * [`models`] — model artifact readiness and download.
//! * [`cache`] — pipeline working-cache accounting and cleanup policy.
//! * [`config`] — settings persistence and platform paths.

pub mod bus;
pub mod cache;
pub mod config;
pub mod media;
pub mod models;
pub mod pipeline;
pub mod queue;
