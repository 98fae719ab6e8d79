//! The picker bridge: request in, local paths out.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::asset::AssetSource;
use crate::cache::CacheDir;
use crate::pending::{PendingRequests, RequestId};
use crate::request::PickRequest;
use crate::selection::{Notifier, PickResult, SelectionOutcome, complete_pick};
use crate::strategy::{LaunchSpec, PickerStrategy};
use crate::{PickerConfig, PickerError};

/// A platform that can present the native selection surface.
///
/// `launch` only starts the surface. The platform later reports the result
/// through the [`Completion`] it was handed, or through
/// [`MediaPickerBridge::on_pick_result`] for the same [`RequestId`].
pub trait PickerHost {
    /// Launch strategy chosen for this device.
    fn strategy(&self) -> PickerStrategy;

    /// Whether multi-select picking is available.
    fn is_picker_available(&self) -> bool;

    /// Human-readable OS name and version, e.g. `"iOS 17.2"`.
    fn platform_version(&self) -> String;

    /// Presents the surface described by `spec` for `completion.id()`.
    ///
    /// # Errors
    /// [`PickerError::NoHostSurface`] when no foreground UI is available,
    /// [`PickerError::LaunchFailure`] when the OS refuses the launch.
    fn launch(&self, completion: Completion, request: &PickRequest, spec: &LaunchSpec)
    -> Result<(), PickerError>;
}

/// Handle for finishing one launched pick.
///
/// Carries the bridge's own registry and configuration, so a host never
/// keeps copies of either.
#[derive(Debug, Clone)]
pub struct Completion {
    id: RequestId,
    pending: Arc<PendingRequests>,
    config: PickerConfig,
}

impl Completion {
    /// The request being completed.
    #[must_use]
    pub const fn id(&self) -> RequestId {
        self.id
    }

    /// The bridge configuration at launch time.
    #[must_use]
    pub const fn config(&self) -> &PickerConfig {
        &self.config
    }

    /// Processes `result` and resolves the request.
    ///
    /// Returns `false` if the request is no longer pending.
    pub fn complete<S, N>(&self, result: PickResult, source: &mut S, notifier: &mut N, cache_root: &Path) -> bool
    where
        S: AssetSource + ?Sized,
        N: Notifier + ?Sized,
    {
        let cache = CacheDir::with_config(cache_root, &self.config);
        complete_pick(&self.pending, self.id, result, source, notifier, &cache)
    }

    /// Resolves the request with `error`.
    ///
    /// Returns `false` if the request is no longer pending.
    pub fn fail(&self, error: PickerError) -> bool {
        fail_pending(&self.pending, self.id, error)
    }
}

fn fail_pending(pending: &PendingRequests, id: RequestId, error: PickerError) -> bool {
    let Some(entry) = pending.take(id) else {
        return false;
    };
    log::error!("picker {id} failed: {error}");
    entry.complete(Err(error));
    true
}

/// Entry point for picking media.
pub struct MediaPickerBridge<H> {
    host: H,
    pending: Arc<PendingRequests>,
    config: PickerConfig,
}

impl<H: fmt::Debug> fmt::Debug for MediaPickerBridge<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaPickerBridge")
            .field("host", &self.host)
            .field("pending", &self.pending.len())
            .field("config", &self.config)
            .finish()
    }
}

impl<H: PickerHost> MediaPickerBridge<H> {
    /// A bridge over `host` using the process-wide pending registry.
    pub fn new(host: H) -> Self {
        Self::with_parts(host, PendingRequests::shared(), PickerConfig::default())
    }

    /// A bridge with explicit registry and configuration.
    pub const fn with_parts(host: H, pending: Arc<PendingRequests>, config: PickerConfig) -> Self {
        Self {
            host,
            pending,
            config,
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: PickerConfig) -> Self {
        self.config = config;
        self
    }

    /// The platform host.
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// The active configuration.
    pub const fn config(&self) -> &PickerConfig {
        &self.config
    }

    /// The registry results are matched against.
    pub fn pending(&self) -> &Arc<PendingRequests> {
        &self.pending
    }

    /// A completion handle for request `id` on this bridge.
    pub fn completion(&self, id: RequestId) -> Completion {
        Completion {
            id,
            pending: Arc::clone(&self.pending),
            config: self.config.clone(),
        }
    }

    /// Whether the device supports multi-select picking.
    pub fn is_picker_available(&self) -> bool {
        self.host.is_picker_available()
    }

    /// Presents the native picker and resolves once the user is done.
    ///
    /// Cancelling the surface yields an empty outcome, not an error.
    ///
    /// # Errors
    /// Returns [`PickerError::NoHostSurface`] or [`PickerError::LaunchFailure`]
    /// if the surface cannot be shown, and [`PickerError::Channel`] if the
    /// platform drops the request without answering.
    pub async fn request_pick(&self, request: PickRequest) -> Result<SelectionOutcome, PickerError> {
        let (id, receiver) = self.pending.register(request);
        let spec = self.host.strategy().launch_spec(&request);
        log::info!(
            "launching {:?} picker {id}: {:?}, max {} item(s)",
            self.host.strategy(),
            request.kind(),
            request.max_items()
        );

        if let Err(e) = self.host.launch(self.completion(id), &request, &spec) {
            log::error!("error launching picker {id}: {e}");
            drop(self.pending.take(id));
            return Err(e);
        }

        receiver.await.map_err(|_| PickerError::Channel)?
    }

    /// Handles the OS result for request `id`.
    ///
    /// Returns `false` if `id` is not pending.
    pub fn on_pick_result<S, N>(
        &self,
        id: RequestId,
        result: PickResult,
        source: &mut S,
        notifier: &mut N,
        cache_root: &Path,
    ) -> bool
    where
        S: AssetSource + ?Sized,
        N: Notifier + ?Sized,
    {
        let cache = CacheDir::with_config(cache_root, &self.config);
        complete_pick(&self.pending, id, result, source, notifier, &cache)
    }

    /// Fails request `id` with an environment error.
    ///
    /// Returns `false` if `id` is not pending.
    pub fn fail(&self, id: RequestId, error: PickerError) -> bool {
        fail_pending(&self.pending, id, error)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording host for tests.

    use super::*;
    use std::sync::Mutex;

    #[derive(Debug)]
    pub struct FakeHost {
        pub sdk_int: i32,
        pub surface: bool,
        pub refuse_with: Option<String>,
        pub launches: Mutex<Vec<(RequestId, PickRequest, LaunchSpec)>>,
    }

    impl FakeHost {
        pub fn new(sdk_int: i32) -> Self {
            Self {
                sdk_int,
                surface: true,
                refuse_with: None,
                launches: Mutex::new(Vec::new()),
            }
        }

        pub fn last_launch(&self) -> Option<(RequestId, PickRequest, LaunchSpec)> {
            self.launches.lock().ok()?.last().cloned()
        }
    }

    impl PickerHost for FakeHost {
        fn strategy(&self) -> PickerStrategy {
            PickerStrategy::for_sdk(self.sdk_int)
        }

        fn is_picker_available(&self) -> bool {
            crate::strategy::is_picker_available(self.sdk_int)
        }

        fn platform_version(&self) -> String {
            format!("Android {}", self.sdk_int)
        }

        fn launch(
            &self,
            completion: Completion,
            request: &PickRequest,
            spec: &LaunchSpec,
        ) -> Result<(), PickerError> {
            if !self.surface {
                return Err(PickerError::NoHostSurface);
            }
            if let Some(message) = &self.refuse_with {
                return Err(PickerError::LaunchFailure(message.clone()));
            }
            if let Ok(mut launches) = self.launches.lock() {
                launches.push((completion.id(), *request, spec.clone()));
            }
            Ok(())
        }
    }
}
