//! Turning an OS pick result into local paths.

use std::path::PathBuf;

use crate::asset::{AssetLocator, AssetMetadata, AssetSource, MediaClass};
use crate::cache::{CacheDir, copy_to_cache};
use crate::pending::{PendingRequests, RequestId};
use crate::request::PickRequest;

/// `Activity.RESULT_OK`
pub const ANDROID_RESULT_OK: i32 = -1;

/// Status reported by the picker surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    /// The user confirmed a selection.
    Ok,
    /// The user dismissed the surface, or it failed.
    Cancelled,
}

impl ResultCode {
    /// Maps an Android activity result code.
    #[must_use]
    pub const fn from_android(code: i32) -> Self {
        if code == ANDROID_RESULT_OK {
            Self::Ok
        } else {
            Self::Cancelled
        }
    }
}

/// Locators returned by the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// A multi-item selection set (`ClipData`).
    Multiple(Vec<AssetLocator>),
    /// A single item (`Intent.getData()`).
    Single(AssetLocator),
}

/// Raw result of one picker round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickResult {
    /// Status code.
    pub code: ResultCode,
    /// Returned locators, absent on cancellation.
    pub payload: Option<Payload>,
}

impl PickResult {
    /// The user backed out.
    #[must_use]
    pub const fn cancelled() -> Self {
        Self {
            code: ResultCode::Cancelled,
            payload: None,
        }
    }

    /// A confirmed multi-item selection.
    pub fn multiple<I, L>(locators: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<AssetLocator>,
    {
        Self {
            code: ResultCode::Ok,
            payload: Some(Payload::Multiple(locators.into_iter().map(Into::into).collect())),
        }
    }

    /// A confirmed single selection.
    pub fn single(locator: impl Into<AssetLocator>) -> Self {
        Self {
            code: ResultCode::Ok,
            payload: Some(Payload::Single(locator.into())),
        }
    }

    /// The locators to process, in OS order, truncated to `max_items`.
    /// Empty unless the result is `Ok` with a payload.
    #[must_use]
    pub fn into_locators(self, max_items: u32) -> Vec<AssetLocator> {
        let max = usize::try_from(max_items).unwrap_or(usize::MAX);
        match (self.code, self.payload) {
            (ResultCode::Ok, Some(Payload::Multiple(locators))) => {
                locators.into_iter().take(max).collect()
            }
            (ResultCode::Ok, Some(Payload::Single(locator))) if max > 0 => vec![locator],
            _ => Vec::new(),
        }
    }
}

/// Local paths produced by a pick, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionOutcome {
    /// Absolute paths of the cache copies.
    pub paths: Vec<PathBuf>,
    /// Videos rejected for exceeding the size limit.
    pub oversized_videos: usize,
}

impl SelectionOutcome {
    /// Paths as strings, the shape sent over the method channel.
    #[must_use]
    pub fn path_strings(&self) -> Vec<String> {
        self.paths
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect()
    }
}

/// Receives user-visible, advisory messages (a Toast on Android).
pub trait Notifier {
    /// Shows a transient message.
    fn notify(&mut self, message: &str);
}

/// Notifier that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, message: &str) {
        log::warn!("{message}");
    }
}

/// Text of the oversized-video notice.
#[must_use]
pub fn oversized_notice(max_video_size_mb: u64) -> String {
    format!("You can't select videos over {max_video_size_mb} MB in size.")
}

/// Filters, size-checks and copies the selected assets.
///
/// Per-item failures only shrink the outcome. If any video exceeded the
/// size limit, `notifier` receives one notice for the whole batch.
pub fn process_selection<S, N>(
    request: &PickRequest,
    result: PickResult,
    source: &mut S,
    notifier: &mut N,
    cache: &CacheDir,
) -> SelectionOutcome
where
    S: AssetSource + ?Sized,
    N: Notifier + ?Sized,
{
    let locators = result.into_locators(request.max_items());
    log::debug!("processing {} picked item(s)", locators.len());

    for locator in &locators {
        if let Err(e) = source.take_persistable_grant(locator) {
            log::warn!("could not take persistable permission for {locator}: {e}");
        }
    }

    let max_video_bytes = request.max_video_size_bytes();
    let mut outcome = SelectionOutcome::default();

    for locator in &locators {
        let mut metadata = AssetMetadata::read(source, locator);
        let class = metadata.class();
        log::debug!("{locator}: mime {:?}, {class:?}", metadata.mime_type);

        if !request.kind().admits(class) {
            log::debug!("skipping {locator}: doesn't match {:?}", request.kind());
            continue;
        }

        if class == MediaClass::Video {
            match metadata.resolve_size(source, locator) {
                Some(size) if size > max_video_bytes => {
                    log::debug!(
                        "video rejected: {size} bytes exceeds {} MB",
                        request.max_video_size_mb()
                    );
                    outcome.oversized_videos += 1;
                    continue;
                }
                Some(size) if size > 0 => {
                    log::debug!("video accepted: {size} bytes");
                }
                _ => {
                    log::warn!("video size could not be determined, skipping {locator}");
                    continue;
                }
            }
        }

        if let Some(path) = copy_to_cache(source, locator, metadata.mime_type.as_deref(), cache) {
            outcome.paths.push(path);
        }
    }

    if outcome.oversized_videos > 0 {
        notifier.notify(&oversized_notice(request.max_video_size_mb()));
    }

    log::info!("pick produced {} path(s)", outcome.paths.len());
    outcome
}

/// Completes the pending request `id` with a processed result.
///
/// Returns `false` if no such request is pending (already completed, or
/// never issued by this process).
pub fn complete_pick<S, N>(
    pending: &PendingRequests,
    id: RequestId,
    result: PickResult,
    source: &mut S,
    notifier: &mut N,
    cache: &CacheDir,
) -> bool
where
    S: AssetSource + ?Sized,
    N: Notifier + ?Sized,
{
    let Some(entry) = pending.take(id) else {
        log::warn!("no pending pick for {id}");
        return false;
    };

    let outcome = process_selection(&entry.request, result, source, notifier, cache);
    entry.complete(Ok(outcome));
    true
}
