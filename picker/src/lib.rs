//! Native photo and video picker bridge.
//!
//! The bridge presents the operating system's own selection surface, applies
//! an item count and a per-video size limit to what comes back, copies every
//! accepted asset into the app's private cache, and resolves with the local
//! file paths.
//!
//! Platform code lives under [`sys`]. Android drives the system photo picker
//! (or the `GET_CONTENT` document surface below Android 13) through JNI,
//! desktop uses a native file dialog, and iOS only reports its version.
//! Apps that embed the bridge behind a method channel use [`channel`].

#![warn(missing_docs)]

mod asset;
mod bridge;
mod cache;
pub mod channel;
mod config;
mod error;
mod pending;
mod request;
mod selection;
mod strategy;

/// Platform-specific implementations.
pub mod sys;

pub use asset::{AssetLocator, AssetMetadata, AssetSource, MediaClass, resolve_size};
pub use bridge::{Completion, MediaPickerBridge, PickerHost};
pub use cache::{CacheDir, copy_to_cache, extension_for_mime};
pub use config::PickerConfig;
pub use error::{ErrorReply, PickerError};
pub use pending::{PendingRequest, PendingRequests, PickReply, RequestId};
pub use request::{
    BYTES_PER_MB, DEFAULT_MAX_ITEMS, DEFAULT_MAX_VIDEO_SIZE_MB, MediaKind, PickRequest,
};
pub use selection::{
    ANDROID_RESULT_OK, LogNotifier, Notifier, Payload, PickResult, ResultCode, SelectionOutcome,
    complete_pick, oversized_notice, process_selection,
};
pub use strategy::{
    ACTION_GET_CONTENT, ACTION_PICK_IMAGES, LaunchSpec, PickerStrategy, SDK_R, SDK_TIRAMISU,
    is_picker_available,
};
