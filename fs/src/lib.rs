//! Application cache directory resolution.
//!
//! Picked media is copied into a private cache area that belongs to the app:
//! `Context.getCacheDir()` on Android, the sandbox `Caches` folder on iOS, and
//! the user cache directory on desktop platforms.

/// Platform-specific implementations.
pub mod sys;

use std::io;
use std::path::{Path, PathBuf};

/// Cross-platform cache directory lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppFs;

impl AppFs {
    /// Gets the application's cache directory.
    ///
    /// Android needs a `Context`; use
    /// [`sys::android::cache_dir_with_context`](crate::sys) there instead.
    #[must_use]
    pub fn cache_dir() -> Option<PathBuf> {
        #[cfg(any(target_os = "macos", target_os = "windows", target_os = "linux"))]
        {
            dirs::cache_dir()
        }
        #[cfg(any(target_os = "ios", target_os = "android"))]
        {
            sys::cache_dir()
        }
        #[cfg(not(any(
            target_os = "macos",
            target_os = "windows",
            target_os = "linux",
            target_os = "ios",
            target_os = "android"
        )))]
        {
            None
        }
    }

    /// Gets (and creates) a named subdirectory of the application cache.
    ///
    /// # Errors
    /// Returns `NotFound` when the platform exposes no cache directory, or the
    /// underlying error when the subdirectory cannot be created.
    pub fn media_cache_dir(subdir: &str) -> io::Result<PathBuf> {
        let root = Self::cache_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "no cache directory on this platform")
        })?;
        ensure_subdir(&root, subdir)
    }
}

/// Creates `root/subdir` if needed and returns it.
///
/// An empty `subdir` resolves to `root` itself.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn ensure_subdir(root: &Path, subdir: &str) -> io::Result<PathBuf> {
    let dir = if subdir.is_empty() {
        root.to_path_buf()
    } else {
        root.join(subdir)
    };
    std::fs::create_dir_all(&dir)?;
    log::debug!("media cache directory: {}", dir.display());
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_subdir_creates_nested_directory() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = ensure_subdir(root.path(), "picked").expect("create subdir");

        assert_eq!(dir, root.path().join("picked"));
        assert!(dir.is_dir());

        // Second call is a no-op on an existing directory.
        assert_eq!(ensure_subdir(root.path(), "picked").expect("reuse"), dir);
    }

    #[test]
    fn empty_subdir_is_root() {
        let root = tempfile::tempdir().expect("tempdir");
        assert_eq!(ensure_subdir(root.path(), "").expect("root"), root.path());
    }
}
