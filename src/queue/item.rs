//! The queue item record.

use std::path::PathBuf;

use crate::media::{MediaType, ResolvedMedia};

use super::status::ItemStatus;

// ---------------------------------------------------------------------------
// QueueItem
// ---------------------------------------------------------------------------

/// One imported media file awaiting or undergoing pipeline processing.
///
/// Everything except `status` is fixed at creation. `path` is the identity
/// key — the orchestrator guarantees it is unique across the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    /// Stable unique identifier, assigned at resolution time.
    pub id: String,

    /// Absolute filesystem path.
    pub path: PathBuf,

    /// Display path relative to the import root.
    pub relative_path: PathBuf,

    /// Display basename.
    pub name: String,

    /// Video or audio.
    pub media_type: MediaType,

    /// Current lifecycle status — the only mutable field.
    pub status: ItemStatus,
}

impl QueueItem {
    /// Turn a resolved media record into a pending queue item.
    pub fn pending(media: ResolvedMedia) -> Self {
        Self {
            id: media.id,
            path: media.path,
            relative_path: media.relative_path,
            name: media.name,
            media_type: media.media_type,
            status: ItemStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn pending_item_carries_resolution_fields() {
        let media =
            ResolvedMedia::from_path(Path::new("/m/clip.mkv"), PathBuf::from("clip.mkv")).unwrap();
        let id = media.id.clone();

        let item = QueueItem::pending(media);
        assert_eq!(item.id, id);
        assert_eq!(item.status, ItemStatus::Pending);
        assert_eq!(item.name, "clip.mkv");
        assert_eq!(item.media_type, MediaType::Video);
    }
}
