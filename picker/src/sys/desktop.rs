use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use futures::executor::block_on;

use crate::asset::{AssetLocator, AssetSource};
use crate::PickerError;
use crate::bridge::{Completion, PickerHost};
use crate::request::{MediaKind, PickRequest};
use crate::selection::{LogNotifier, PickResult};
use crate::strategy::{LaunchSpec, PickerStrategy};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "heic", "heif", "tif", "tiff"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "m4v", "mov", "avi", "mkv", "webm", "3gp"];

/// Picker host using the native file dialog.
///
/// The dialog runs on its own thread and finishes the pick through the
/// [`Completion`] the bridge hands to `launch`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopHost;

impl DesktopHost {
    /// Creates the host.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PickerHost for DesktopHost {
    fn strategy(&self) -> PickerStrategy {
        PickerStrategy::ModernSurface
    }

    fn is_picker_available(&self) -> bool {
        true
    }

    fn platform_version(&self) -> String {
        format!("{} {}", std::env::consts::OS, std::env::consts::ARCH)
    }

    fn launch(&self, completion: Completion, request: &PickRequest, _spec: &LaunchSpec) -> Result<(), PickerError> {
        let request = *request;

        std::thread::Builder::new()
            .name("assetkit-picker".into())
            .spawn(move || {
                let result = show_dialog(&request);
                let cache_root = assetkit_fs::AppFs::media_cache_dir(&completion.config().cache_subdir);
                deliver(&completion, result, cache_root);
            })
            .map(drop)
            .map_err(|e| PickerError::LaunchFailure(e.to_string()))
    }
}

/// Finishes a dialog pick into `cache_root`, or fails it if the cache
/// directory could not be resolved.
fn deliver(completion: &Completion, result: PickResult, cache_root: io::Result<PathBuf>) -> bool {
    match cache_root {
        Ok(root) => completion.complete(result, &mut FsAssetSource, &mut LogNotifier, &root),
        Err(e) => completion.fail(e.into()),
    }
}

fn show_dialog(request: &PickRequest) -> PickResult {
    let (name, extensions) = dialog_filter(request.kind());
    let builder = rfd::AsyncFileDialog::new()
        .set_title("Select media")
        .add_filter(name, &extensions);

    if request.max_items() == 1 {
        block_on(builder.pick_file()).map_or_else(PickResult::cancelled, |file| {
            PickResult::single(file.path().display().to_string())
        })
    } else {
        block_on(builder.pick_files()).map_or_else(PickResult::cancelled, |files| {
            PickResult::multiple(files.iter().map(|f| f.path().display().to_string()))
        })
    }
}

fn dialog_filter(kind: MediaKind) -> (&'static str, Vec<&'static str>) {
    match kind {
        MediaKind::ImagesOnly => ("Images", IMAGE_EXTENSIONS.to_vec()),
        MediaKind::VideosOnly => ("Videos", VIDEO_EXTENSIONS.to_vec()),
        MediaKind::ImagesAndVideos => (
            "Images and videos",
            IMAGE_EXTENSIONS.iter().chain(VIDEO_EXTENSIONS).copied().collect(),
        ),
    }
}

/// MIME type for a file name, by extension.
#[must_use]
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "tif" | "tiff" => "image/tiff",
        "mp4" => "video/mp4",
        "m4v" => "video/x-m4v",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "3gp" => "video/3gpp",
        _ => return None,
    };
    Some(mime)
}

/// Asset access for plain file paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsAssetSource;

impl AssetSource for FsAssetSource {
    fn mime_type(&mut self, locator: &AssetLocator) -> Option<String> {
        mime_for_path(Path::new(locator.as_str())).map(str::to_string)
    }

    fn query_size(&mut self, locator: &AssetLocator) -> Result<Option<u64>, PickerError> {
        Ok(Some(std::fs::metadata(locator.as_str())?.len()))
    }

    fn descriptor_size(&mut self, locator: &AssetLocator) -> Result<Option<u64>, PickerError> {
        Ok(Some(File::open(locator.as_str())?.metadata()?.len()))
    }

    fn open(&mut self, locator: &AssetLocator) -> Result<Box<dyn Read + '_>, PickerError> {
        Ok(Box::new(BufReader::new(File::open(locator.as_str())?)))
    }
}
