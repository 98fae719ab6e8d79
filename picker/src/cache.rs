//! Copying selected assets into the private cache.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::PickerConfig;
use crate::asset::{AssetLocator, AssetSource};

/// Disambiguates copies made within the same millisecond.
static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Destination directory and naming scheme for copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheDir {
    root: PathBuf,
    prefix: String,
    fallback_extension: String,
}

impl CacheDir {
    /// A cache rooted at `root` with default naming.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_config(root, &PickerConfig::default())
    }

    /// A cache rooted at `root` named per `config`.
    pub fn with_config(root: impl Into<PathBuf>, config: &PickerConfig) -> Self {
        Self {
            root: root.into(),
            prefix: config.file_prefix.clone(),
            fallback_extension: config.fallback_extension.clone(),
        }
    }

    /// The directory copies are written to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// A fresh `prefix_<millis>_<seq>.<ext>` file name.
    #[must_use]
    pub fn next_file_name(&self, mime: Option<&str>) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let extension = extension_for_mime(mime, &self.fallback_extension);
        format!("{}_{millis}_{seq}.{extension}", self.prefix)
    }

    /// Streams `reader` into a new cache file and returns its absolute path.
    ///
    /// A partially written file is removed on failure.
    ///
    /// # Errors
    /// Returns the underlying IO error.
    pub fn write_from(&self, reader: &mut dyn Read, mime: Option<&str>) -> io::Result<PathBuf> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.root.join(self.next_file_name(mime));

        let result = File::create(&path).and_then(|file| {
            let mut writer = BufWriter::new(file);
            io::copy(reader, &mut writer)?;
            writer.flush()
        });

        if let Err(e) = result {
            let _ = std::fs::remove_file(&path);
            return Err(e);
        }

        Ok(std::path::absolute(&path).unwrap_or(path))
    }
}

/// File extension for a MIME type: the subtype of `image/*` and `video/*`,
/// `fallback` otherwise.
#[must_use]
pub fn extension_for_mime(mime: Option<&str>, fallback: &str) -> String {
    mime.and_then(|m| {
        m.strip_prefix("image/")
            .or_else(|| m.strip_prefix("video/"))
    })
    .map(|subtype| subtype.split(';').next().unwrap_or_default().trim())
    .filter(|subtype| {
        !subtype.is_empty()
            && subtype
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '.'))
    })
    .map_or_else(|| fallback.to_string(), str::to_ascii_lowercase)
}

/// Copies one asset into the cache.
///
/// Returns `None` (after logging) on any failure; the caller drops the item
/// and carries on with the batch.
pub fn copy_to_cache<S: AssetSource + ?Sized>(
    source: &mut S,
    locator: &AssetLocator,
    mime: Option<&str>,
    cache: &CacheDir,
) -> Option<PathBuf> {
    let mut reader = match source.open(locator) {
        Ok(reader) => reader,
        Err(e) => {
            log::warn!("could not open {locator}: {e}");
            return None;
        }
    };

    match cache.write_from(&mut reader, mime) {
        Ok(path) => {
            log::debug!("copied {locator} to {}", path.display());
            Some(path)
        }
        Err(e) => {
            log::warn!("error copying {locator}: {e}");
            None
        }
    }
}
