//! Media item types and path-to-item resolution.
//!
//! Importing is a two-step affair: raw filesystem paths (from the CLI, a
//! file dialog, or drag-and-drop) are handed to a [`PathResolver`], which
//! expands directories, classifies files by extension and produces
//! [`ResolvedMedia`] records; the queue orchestrator then turns accepted
//! records into queue items, dropping paths it already holds.
//!
//! [`FsPathResolver`] is the production resolver. Tests that only care about
//! the orchestrator use a mock resolver instead.

pub mod item;
pub mod resolver;

pub use item::{MediaType, ResolvedMedia};
pub use resolver::{FsPathResolver, PathResolver};
