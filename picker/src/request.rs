//! Pick request model.

use serde::{Deserialize, Serialize};

use crate::asset::MediaClass;

/// Item count used when the caller does not supply one.
pub const DEFAULT_MAX_ITEMS: u32 = 10;

/// Video size limit (MB) used when the caller does not supply one.
pub const DEFAULT_MAX_VIDEO_SIZE_MB: u64 = 100;

/// Bytes in one MB as the size limit counts them.
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Which kinds of media a request admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaKind {
    /// Images only.
    ImagesOnly,
    /// Videos only.
    VideosOnly,
    /// Images and videos.
    ImagesAndVideos,
}

impl MediaKind {
    /// Whether an asset of the given class passes this filter.
    #[must_use]
    pub const fn admits(self, class: MediaClass) -> bool {
        match self {
            Self::ImagesOnly => matches!(class, MediaClass::Image),
            Self::VideosOnly => matches!(class, MediaClass::Video),
            Self::ImagesAndVideos => matches!(class, MediaClass::Image | MediaClass::Video),
        }
    }

    /// Whether videos can appear in the outcome at all.
    #[must_use]
    pub const fn admits_video(self) -> bool {
        !matches!(self, Self::ImagesOnly)
    }
}

/// Parameters of a single pick. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickRequest {
    kind: MediaKind,
    max_items: u32,
    max_video_size_mb: u64,
}

impl PickRequest {
    /// A request with default limits.
    #[must_use]
    pub const fn new(kind: MediaKind) -> Self {
        Self {
            kind,
            max_items: DEFAULT_MAX_ITEMS,
            max_video_size_mb: if kind.admits_video() {
                DEFAULT_MAX_VIDEO_SIZE_MB
            } else {
                0
            },
        }
    }

    /// Images only.
    #[must_use]
    pub const fn images() -> Self {
        Self::new(MediaKind::ImagesOnly)
    }

    /// Videos only.
    #[must_use]
    pub const fn videos() -> Self {
        Self::new(MediaKind::VideosOnly)
    }

    /// Images and videos.
    #[must_use]
    pub const fn images_and_videos() -> Self {
        Self::new(MediaKind::ImagesAndVideos)
    }

    /// Set the maximum number of items. Zero keeps the default.
    #[must_use]
    pub const fn with_max_items(mut self, max_items: u32) -> Self {
        if max_items > 0 {
            self.max_items = max_items;
        }
        self
    }

    /// Set the per-video size limit in MB. Ignored for image-only requests.
    #[must_use]
    pub const fn with_max_video_size_mb(mut self, mb: u64) -> Self {
        if self.kind.admits_video() {
            self.max_video_size_mb = mb;
        }
        self
    }

    /// The media filter.
    #[must_use]
    pub const fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Maximum number of items in the outcome.
    #[must_use]
    pub const fn max_items(&self) -> u32 {
        self.max_items
    }

    /// Per-video size limit in MB.
    #[must_use]
    pub const fn max_video_size_mb(&self) -> u64 {
        self.max_video_size_mb
    }

    /// Per-video size limit in bytes.
    #[must_use]
    pub const fn max_video_size_bytes(&self) -> u64 {
        self.max_video_size_mb.saturating_mul(BYTES_PER_MB)
    }
}
