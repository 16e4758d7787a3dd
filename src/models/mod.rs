//! Model artifact readiness and download.
//!
//! The pipeline depends on large LLM weights that do not ship with the
//! application. This module owns that gate:
//!
//! * [`REQUIRED_ARTIFACTS`] — the closed set of artifacts and their sources.
//! * [`ModelInventory`] / [`FsModelInventory`] — presence scanning.
//! * [`ModelFetcher`] / [`HttpModelFetcher`] — streaming download with
//!   in-band progress events.
//! * [`ModelCoordinator`] — the state machine tying the two together and
//!   publishing progress to the event bus.

pub mod coordinator;
pub mod fetcher;
pub mod inventory;
pub mod registry;

pub use coordinator::{ModelCheckState, ModelCoordinator};
pub use fetcher::{FetchError, FetchEvent, HttpModelFetcher, ModelFetcher};
pub use inventory::{FsModelInventory, InventoryReport, ModelInventory};
pub use registry::{ArtifactInfo, REQUIRED_ARTIFACTS};
