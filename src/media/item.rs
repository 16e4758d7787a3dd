//! Media classification and the resolved-item record.

use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// MediaType
// ---------------------------------------------------------------------------

/// Coarse media classification derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Video,
    Audio,
}

/// Extension table for accepted media files.
///
/// This is a closed set: anything not listed here is silently dropped during
/// import.
const MEDIA_EXTENSIONS: &[(&str, MediaType)] = &[
    ("mp4", MediaType::Video),
    ("mkv", MediaType::Video),
    ("avi", MediaType::Video),
    ("mov", MediaType::Video),
    ("mp3", MediaType::Audio),
    ("wav", MediaType::Audio),
    ("flac", MediaType::Audio),
    ("m4a", MediaType::Audio),
    ("aac", MediaType::Audio),
];

impl MediaType {
    /// Classify a path by its extension (case-insensitive).
    ///
    /// Returns `None` for non-media files.
    ///
    /// ```
    /// use std::path::Path;
    /// use subtitle_studio::media::MediaType;
    ///
    /// assert_eq!(MediaType::from_path(Path::new("a.MP4")), Some(MediaType::Video));
    /// assert_eq!(MediaType::from_path(Path::new("a.flac")), Some(MediaType::Audio));
    /// assert_eq!(MediaType::from_path(Path::new("a.txt")), None);
    /// ```
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        MEDIA_EXTENSIONS
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, t)| *t)
    }

    /// Short label for display.
    pub fn label(&self) -> &'static str {
        match self {
            MediaType::Video => "video",
            MediaType::Audio => "audio",
        }
    }
}

// ---------------------------------------------------------------------------
// ResolvedMedia
// ---------------------------------------------------------------------------

/// One accepted media file, before it becomes a queue item.
///
/// All fields except the queue-owned status are fixed here at resolution
/// time and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMedia {
    /// Stable unique identifier, generated at resolution time.
    pub id: String,

    /// Absolute filesystem path — the identity key for de-duplication.
    pub path: PathBuf,

    /// Path relative to the import root, for display only.
    pub relative_path: PathBuf,

    /// Basename, for display only.
    pub name: String,

    /// Video or audio.
    pub media_type: MediaType,
}

impl ResolvedMedia {
    /// Build a record for `path`, deriving the display fields.
    ///
    /// `relative_path` is the path relative to `import_root`'s parent when
    /// the file was found by expanding a directory, or just the basename for
    /// a directly imported file.
    ///
    /// Returns `None` when the extension is not a known media type.
    pub fn from_path(path: &Path, relative_path: PathBuf) -> Option<Self> {
        let media_type = MediaType::from_path(path)?;
        let name = path.file_name()?.to_string_lossy().into_owned();

        Some(Self {
            id: uuid::Uuid::new_v4().to_string(),
            path: path.to_path_buf(),
            relative_path,
            name,
            media_type,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
