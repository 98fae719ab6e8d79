//! Bridge configuration.

use serde::{Deserialize, Serialize};

use crate::PickerError;

/// Tunables for a [`MediaPickerBridge`](crate::MediaPickerBridge).
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use assetkit_picker::PickerConfig;
///
/// let config = PickerConfig::from_json(r#"{ "defaultMaxItems": 4 }"#).unwrap();
/// assert_eq!(config.default_max_items, 4);
/// assert_eq!(config.default_max_video_size_mb, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PickerConfig {
    /// Item count used when the caller sends none or a non-positive one.
    pub default_max_items: u32,
    /// Upper clamp for caller-supplied item counts.
    pub max_items_cap: u32,
    /// Video size limit used when the caller sends none or a negative one.
    pub default_max_video_size_mb: u64,
    /// Subdirectory of the platform cache that receives copies.
    pub cache_subdir: String,
    /// Prefix of generated cache file names.
    pub file_prefix: String,
    /// Extension used when the MIME type is unknown.
    pub fallback_extension: String,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            default_max_items: crate::request::DEFAULT_MAX_ITEMS,
            max_items_cap: 100,
            default_max_video_size_mb: crate::request::DEFAULT_MAX_VIDEO_SIZE_MB,
            cache_subdir: "assetkit_media".to_string(),
            file_prefix: "media".to_string(),
            fallback_extension: "tmp".to_string(),
        }
    }
}

impl PickerConfig {
    /// Parses a JSON config document.
    ///
    /// # Errors
    /// Returns [`PickerError::InvalidArguments`] if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, PickerError> {
        serde_json::from_str(json).map_err(|e| PickerError::InvalidArguments(e.to_string()))
    }

    /// Set the default item count.
    #[must_use]
    pub const fn with_default_max_items(mut self, max_items: u32) -> Self {
        self.default_max_items = max_items;
        self
    }

    /// Set the item count ceiling.
    #[must_use]
    pub const fn with_max_items_cap(mut self, cap: u32) -> Self {
        self.max_items_cap = cap;
        self
    }

    /// Set the default video size limit in MB.
    #[must_use]
    pub const fn with_default_max_video_size_mb(mut self, mb: u64) -> Self {
        self.default_max_video_size_mb = mb;
        self
    }

    /// Set the cache subdirectory.
    #[must_use]
    pub fn with_cache_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.cache_subdir = subdir.into();
        self
    }

    /// Set the cache file name prefix.
    #[must_use]
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    /// Resolves a caller-supplied item count against the defaults and cap.
    #[must_use]
    pub fn resolve_max_items(&self, requested: Option<i64>) -> u32 {
        let cap = self.max_items_cap.max(1);
        match requested {
            Some(n) if n > 0 => u32::try_from(n).unwrap_or(u32::MAX).min(cap),
            _ => self.default_max_items.clamp(1, cap),
        }
    }

    /// Resolves a caller-supplied video size limit (MB).
    #[must_use]
    pub fn resolve_max_video_size_mb(&self, requested: Option<i64>) -> u64 {
        match requested {
            Some(mb) if mb >= 0 => mb.unsigned_abs(),
            _ => self.default_max_video_size_mb,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_invalid_item_count_falls_back_to_default() {
        let config = PickerConfig::default();
        assert_eq!(config.resolve_max_items(None), 10);
        assert_eq!(config.resolve_max_items(Some(0)), 10);
        assert_eq!(config.resolve_max_items(Some(-3)), 10);
        assert_eq!(config.resolve_max_items(Some(7)), 7);
    }

    #[test]
    fn item_count_is_capped() {
        let config = PickerConfig::default().with_max_items_cap(20);
        assert_eq!(config.resolve_max_items(Some(500)), 20);
        assert_eq!(config.resolve_max_items(Some(i64::MAX)), 20);
    }

    #[test]
    fn video_size_defaults() {
        let config = PickerConfig::default();
        assert_eq!(config.resolve_max_video_size_mb(None), 100);
        assert_eq!(config.resolve_max_video_size_mb(Some(-1)), 100);
        assert_eq!(config.resolve_max_video_size_mb(Some(0)), 0);
        assert_eq!(config.resolve_max_video_size_mb(Some(50)), 50);
    }

    #[test]
    fn json_overrides_are_partial() {
        let config = PickerConfig::from_json(r#"{ "cacheSubdir": "picked", "maxItemsCap": 30 }"#)
            .expect("valid config");
        assert_eq!(config.cache_subdir, "picked");
        assert_eq!(config.max_items_cap, 30);
        assert_eq!(config.file_prefix, "media");

        assert!(PickerConfig::from_json("{ nope").is_err());
    }
}
