//! # assetkit
//!
//! Native media selection for cross-platform apps.
//!
//! assetkit presents the operating system's own photo/video picker, enforces an
//! item count and a per-video size limit, copies the chosen assets into the
//! application's private cache and hands back plain filesystem paths.
//!
//! ## Features
//!
//! - `picker`: the media picker bridge and its method-channel surface (default).
//! - `fs`: cache directory resolution across Android, iOS and desktop.
//!
//! Use the `full` feature to enable everything.
//!
//! ## Example
//!
//! ```toml
//! [dependencies]
//! assetkit = { version = "0.1", features = ["picker"] }
//! ```
//!
//! ```rust,ignore
//! use assetkit::picker::{MediaPickerBridge, PickRequest};
//! use assetkit::picker::sys::DesktopHost;
//!
//! async fn choose() {
//!     let bridge = MediaPickerBridge::new(DesktopHost::new());
//!     if let Ok(outcome) = bridge.request_pick(PickRequest::images().with_max_items(3)).await {
//!         for path in outcome.paths {
//!             println!("{}", path.display());
//!         }
//!     }
//! }
//! ```

#[cfg(feature = "picker")]
pub use assetkit_picker as picker;

#[cfg(feature = "fs")]
pub use assetkit_fs as fs;
