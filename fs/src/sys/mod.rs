#[cfg(target_os = "ios")]
mod apple;
#[cfg(target_os = "ios")]
pub use apple::*;

#[cfg(target_os = "android")]
pub mod android;
#[cfg(target_os = "android")]
pub use android::{cache_dir, media_cache_dir_with_context};

// Desktop platforms resolve through `dirs` directly in lib.rs.
