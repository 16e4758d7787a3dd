//! Pipeline cache accounting.
//!
//! The external pipeline keeps one working directory per media item under a
//! cache root. This module owns the seam to that storage:
//!
//! * [`CacheStore`] — size accounting, full clear, per-entry eviction and
//!   age-based sweeping.
//! * [`FsCacheStore`] — production store over the real cache directory.
//! * [`CacheAccountant`] — the façade the orchestrator and UI layer talk
//!   to: refresh/clear plus strategy persistence through the settings
//!   store. Policy *decisions* stay here; policy *enforcement* (deleting
//!   bytes) stays in the store.

pub mod facade;
pub mod store;

pub use facade::{format_size, CacheAccountant};
pub use store::{CacheStore, FsCacheStore};
