//! Selected assets and how their metadata and bytes are reached.

use std::fmt;
use std::io::Read;

use crate::PickerError;

/// Opaque OS handle to a selected item (a `content://` URI on Android,
/// a file path on desktop). Not a filesystem path in general.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetLocator(String);

impl AssetLocator {
    /// Wraps a raw locator string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw locator string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetLocator {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for AssetLocator {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Coarse classification by MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaClass {
    /// `image/*`
    Image,
    /// `video/*`
    Video,
    /// Anything else, or unknown.
    Other,
}

impl MediaClass {
    /// Classifies a MIME type.
    #[must_use]
    pub fn from_mime(mime: Option<&str>) -> Self {
        match mime {
            Some(m) if m.starts_with("image/") => Self::Image,
            Some(m) if m.starts_with("video/") => Self::Video,
            _ => Self::Other,
        }
    }
}

/// What is known about an asset before it is copied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetMetadata {
    /// MIME type reported by the provider.
    pub mime_type: Option<String>,
    /// Size in bytes; `None` when no strategy could determine it.
    pub size_bytes: Option<u64>,
}

impl AssetMetadata {
    /// Reads the MIME type. The size stays unknown until
    /// [`Self::resolve_size`] is called, since only videos need it.
    pub fn read<S: AssetSource + ?Sized>(source: &mut S, locator: &AssetLocator) -> Self {
        Self {
            mime_type: source.mime_type(locator),
            size_bytes: None,
        }
    }

    /// Classification of [`Self::mime_type`].
    #[must_use]
    pub fn class(&self) -> MediaClass {
        MediaClass::from_mime(self.mime_type.as_deref())
    }

    /// Fills in [`Self::size_bytes`] with [`resolve_size`] and returns it.
    pub fn resolve_size<S: AssetSource + ?Sized>(&mut self, source: &mut S, locator: &AssetLocator) -> Option<u64> {
        self.size_bytes = resolve_size(source, locator);
        self.size_bytes
    }
}

/// Read access to selected assets.
///
/// Android implements this over `ContentResolver`, desktop over the file
/// system. Methods take `&mut self` because JNI calls need a mutable env.
pub trait AssetSource {
    /// MIME type of the asset, if the provider knows it.
    fn mime_type(&mut self, locator: &AssetLocator) -> Option<String>;

    /// Size from the provider's descriptor table (`OpenableColumns.SIZE`).
    ///
    /// `Ok(None)` means the table has no usable size column.
    ///
    /// # Errors
    /// Returns an error if the query itself fails.
    fn query_size(&mut self, locator: &AssetLocator) -> Result<Option<u64>, PickerError>;

    /// Size from an opened file descriptor.
    ///
    /// # Errors
    /// Returns an error if the descriptor cannot be opened.
    fn descriptor_size(&mut self, locator: &AssetLocator) -> Result<Option<u64>, PickerError>;

    /// Opens a byte stream over the asset.
    ///
    /// # Errors
    /// Returns an error if the stream cannot be opened.
    fn open(&mut self, locator: &AssetLocator) -> Result<Box<dyn Read + '_>, PickerError>;

    /// Asks the OS to keep read access to the asset across restarts.
    ///
    /// # Errors
    /// Returns an error if the grant is refused. Callers treat this as non-fatal.
    fn take_persistable_grant(&mut self, _locator: &AssetLocator) -> Result<(), PickerError> {
        Ok(())
    }
}

/// Determines an asset's size: descriptor-table query first, then the file
/// descriptor length. The first strategy that yields a value wins.
pub fn resolve_size<S: AssetSource + ?Sized>(source: &mut S, locator: &AssetLocator) -> Option<u64> {
    match source.query_size(locator) {
        Ok(Some(size)) => {
            log::debug!("size from descriptor table: {size} ({locator})");
            return Some(size);
        }
        Ok(None) => {}
        Err(e) => log::warn!("size query failed for {locator}: {e}"),
    }

    match source.descriptor_size(locator) {
        Ok(Some(size)) => {
            log::debug!("size from file descriptor: {size} ({locator})");
            Some(size)
        }
        Ok(None) => {
            log::debug!("could not determine size of {locator}");
            None
        }
        Err(e) => {
            log::warn!("descriptor size failed for {locator}: {e}");
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory asset source shared by the crate's tests.

    use super::*;
    use std::collections::HashMap;
    use std::io::Cursor;

    #[derive(Debug, Clone, Default)]
    pub struct FakeAsset {
        pub mime: Option<String>,
        pub query_size: Option<Result<Option<u64>, ()>>,
        pub descriptor_size: Option<u64>,
        pub bytes: Vec<u8>,
        pub unreadable: bool,
        pub refuse_grant: bool,
    }

    impl FakeAsset {
        pub fn image(bytes: &[u8]) -> Self {
            Self {
                mime: Some("image/jpeg".into()),
                bytes: bytes.to_vec(),
                ..Self::default()
            }
        }

        pub fn video(size: u64) -> Self {
            Self {
                mime: Some("video/mp4".into()),
                query_size: Some(Ok(Some(size))),
                bytes: b"video".to_vec(),
                ..Self::default()
            }
        }
    }

    #[derive(Debug, Default)]
    pub struct FakeSource {
        pub assets: HashMap<String, FakeAsset>,
        pub grants: Vec<String>,
        pub opened: Vec<String>,
    }

    impl FakeSource {
        pub fn with(mut self, locator: &str, asset: FakeAsset) -> Self {
            self.assets.insert(locator.to_string(), asset);
            self
        }

        fn get(&self, locator: &AssetLocator) -> Result<&FakeAsset, PickerError> {
            self.assets
                .get(locator.as_str())
                .ok_or_else(|| PickerError::Platform(format!("no such asset: {locator}")))
        }
    }

    impl AssetSource for FakeSource {
        fn mime_type(&mut self, locator: &AssetLocator) -> Option<String> {
            self.get(locator).ok().and_then(|a| a.mime.clone())
        }

        fn query_size(&mut self, locator: &AssetLocator) -> Result<Option<u64>, PickerError> {
            match self.get(locator)?.query_size {
                Some(Ok(size)) => Ok(size),
                Some(Err(())) => Err(PickerError::Platform("query failed".into())),
                None => Ok(None),
            }
        }

        fn descriptor_size(&mut self, locator: &AssetLocator) -> Result<Option<u64>, PickerError> {
            Ok(self.get(locator)?.descriptor_size)
        }

        fn open(&mut self, locator: &AssetLocator) -> Result<Box<dyn Read + '_>, PickerError> {
            let asset = self.get(locator)?.clone();
            if asset.unreadable {
                return Err(PickerError::Platform("permission denied".into()));
            }
            self.opened.push(locator.to_string());
            Ok(Box::new(Cursor::new(asset.bytes)))
        }

        fn take_persistable_grant(&mut self, locator: &AssetLocator) -> Result<(), PickerError> {
            if self.get(locator)?.refuse_grant {
                return Err(PickerError::Platform("no persistable grant".into()));
            }
            self.grants.push(locator.to_string());
            Ok(())
        }
    }
}
