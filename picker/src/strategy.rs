//! Picker launch strategies.
//!
//! The system photo picker (`MediaStore.ACTION_PICK_IMAGES`) only exists from
//! Android 13. Older releases fall back to `ACTION_GET_CONTENT` with a MIME
//! filter and multiple selection. The strategy is picked once per host and
//! turns a [`PickRequest`] into a declarative [`LaunchSpec`] that the platform
//! layer maps onto an intent.

use crate::request::{MediaKind, PickRequest};

/// Android 11, first release where the multi-select content flow is usable.
pub const SDK_R: i32 = 30;

/// Android 13, first release with the built-in photo picker.
pub const SDK_TIRAMISU: i32 = 33;

/// `MediaStore.ACTION_PICK_IMAGES`
pub const ACTION_PICK_IMAGES: &str = "android.provider.action.PICK_IMAGES";

/// `Intent.ACTION_GET_CONTENT`
pub const ACTION_GET_CONTENT: &str = "android.intent.action.GET_CONTENT";

const IMAGE_MIME: &str = "image/*";
const VIDEO_MIME: &str = "video/*";
const ANY_MIME: &str = "*/*";

/// How the native selection surface is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickerStrategy {
    /// Built-in system photo/video picker.
    ModernSurface,
    /// Generic "get content" document surface.
    LegacySurface,
}

impl PickerStrategy {
    /// Selects the strategy for an Android SDK level.
    #[must_use]
    pub const fn for_sdk(sdk_int: i32) -> Self {
        if sdk_int >= SDK_TIRAMISU {
            Self::ModernSurface
        } else {
            Self::LegacySurface
        }
    }

    /// Describes the intent for a request.
    #[must_use]
    pub fn launch_spec(self, request: &PickRequest) -> LaunchSpec {
        match self {
            Self::ModernSurface => LaunchSpec {
                action: ACTION_PICK_IMAGES,
                mime_type: match request.kind() {
                    MediaKind::ImagesOnly => Some(IMAGE_MIME),
                    MediaKind::VideosOnly => Some(VIDEO_MIME),
                    MediaKind::ImagesAndVideos => None,
                },
                extra_mime_types: Vec::new(),
                // The photo picker rejects EXTRA_PICK_IMAGES_MAX <= 1.
                max_items: (request.max_items() > 1).then_some(request.max_items()),
                allow_multiple: false,
                openable: false,
                persistable: true,
            },
            Self::LegacySurface => {
                let (mime_type, extra_mime_types) = match request.kind() {
                    MediaKind::ImagesOnly => (IMAGE_MIME, Vec::new()),
                    MediaKind::VideosOnly => (VIDEO_MIME, Vec::new()),
                    MediaKind::ImagesAndVideos => (ANY_MIME, vec![IMAGE_MIME, VIDEO_MIME]),
                };
                LaunchSpec {
                    action: ACTION_GET_CONTENT,
                    mime_type: Some(mime_type),
                    extra_mime_types,
                    max_items: None,
                    allow_multiple: true,
                    openable: true,
                    persistable: true,
                }
            }
        }
    }
}

/// Platform-neutral description of the picker intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    /// Intent action.
    pub action: &'static str,
    /// Intent type, if any.
    pub mime_type: Option<&'static str>,
    /// `EXTRA_MIME_TYPES`, empty when unused.
    pub extra_mime_types: Vec<&'static str>,
    /// `EXTRA_PICK_IMAGES_MAX`, when the surface honours it.
    pub max_items: Option<u32>,
    /// `EXTRA_ALLOW_MULTIPLE`.
    pub allow_multiple: bool,
    /// Adds `CATEGORY_OPENABLE`.
    pub openable: bool,
    /// Adds `FLAG_GRANT_PERSISTABLE_URI_PERMISSION` next to the read grant.
    pub persistable: bool,
}

/// Whether the device supports multi-select picking at all.
#[must_use]
pub const fn is_picker_available(sdk_int: i32) -> bool {
    sdk_int >= SDK_R
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_follows_sdk_level() {
        assert_eq!(PickerStrategy::for_sdk(32), PickerStrategy::LegacySurface);
        assert_eq!(PickerStrategy::for_sdk(33), PickerStrategy::ModernSurface);
        assert_eq!(PickerStrategy::for_sdk(35), PickerStrategy::ModernSurface);
    }

    #[test]
    fn availability_starts_at_android_11() {
        assert!(!is_picker_available(29));
        assert!(is_picker_available(30));
    }

    #[test]
    fn modern_surface_filters_by_type() {
        let spec = PickerStrategy::ModernSurface.launch_spec(&PickRequest::videos().with_max_items(5));
        assert_eq!(spec.action, ACTION_PICK_IMAGES);
        assert_eq!(spec.mime_type, Some("video/*"));
        assert_eq!(spec.max_items, Some(5));
        assert!(spec.persistable);

        let both = PickerStrategy::ModernSurface.launch_spec(&PickRequest::images_and_videos());
        assert_eq!(both.mime_type, None);
    }

    #[test]
    fn modern_surface_single_item_omits_max() {
        let spec = PickerStrategy::ModernSurface.launch_spec(&PickRequest::images().with_max_items(1));
        assert_eq!(spec.max_items, None);
    }

    #[test]
    fn legacy_surface_uses_mime_list_for_mixed_media() {
        let spec = PickerStrategy::LegacySurface.launch_spec(&PickRequest::images_and_videos());
        assert_eq!(spec.action, ACTION_GET_CONTENT);
        assert_eq!(spec.mime_type, Some("*/*"));
        assert_eq!(spec.extra_mime_types, vec!["image/*", "video/*"]);
        assert!(spec.allow_multiple);
        assert!(spec.openable);

        let images = PickerStrategy::LegacySurface.launch_spec(&PickRequest::images());
        assert_eq!(images.mime_type, Some("image/*"));
        assert!(images.extra_mime_types.is_empty());
    }
}
