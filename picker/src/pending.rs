//! In-flight requests, keyed by id.
//!
//! Each launch gets a fresh [`RequestId`] that travels through the OS call
//! and back. The result callback removes exactly the matching entry, so two
//! overlapping requests never clobber each other's completion handle.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use futures::channel::oneshot;

use crate::request::PickRequest;
use crate::selection::SelectionOutcome;
use crate::PickerError;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one pick across the asynchronous OS round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value, e.g. to pass through JNI.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Rebuilds an id received back from the platform.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result delivered to the waiting caller.
pub type PickReply = Result<SelectionOutcome, PickerError>;

/// A pick waiting for its OS result.
#[derive(Debug)]
pub struct PendingRequest {
    /// Snapshot of the request parameters.
    pub request: PickRequest,
    sender: oneshot::Sender<PickReply>,
}

impl PendingRequest {
    /// Delivers the reply. Consumes the entry so it completes once.
    pub fn complete(self, reply: PickReply) {
        if self.sender.send(reply).is_err() {
            log::debug!("pick caller went away before the result arrived");
        }
    }
}

/// Registry of in-flight picks.
#[derive(Debug, Default)]
pub struct PendingRequests {
    entries: Mutex<HashMap<RequestId, PendingRequest>>,
}

impl PendingRequests {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry used by platform callbacks.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        static SHARED: OnceLock<Arc<PendingRequests>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| Arc::new(Self::new())))
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RequestId, PendingRequest>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a request and returns its id and the receiving end.
    pub fn register(&self, request: PickRequest) -> (RequestId, oneshot::Receiver<PickReply>) {
        let (sender, receiver) = oneshot::channel();
        let id = RequestId::next();
        self.lock().insert(id, PendingRequest { request, sender });
        (id, receiver)
    }

    /// Removes and returns the entry for `id`.
    pub fn take(&self, id: RequestId) -> Option<PendingRequest> {
        self.lock().remove(&id)
    }

    /// Parameters of a pending request, without removing it.
    pub fn request(&self, id: RequestId) -> Option<PickRequest> {
        self.lock().get(&id).map(|pending| pending.request)
    }

    /// Number of in-flight requests.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is in flight.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Maps the 16-bit request codes an activity result carries back to ids.
///
/// Codes live in `[base, base + span)`. A code is held only while its launch
/// succeeded and the result has not been taken.
#[derive(Debug)]
#[cfg_attr(not(target_os = "android"), allow(dead_code))]
pub(crate) struct RequestCodes {
    base: i32,
    span: u16,
    codes: Mutex<HashMap<i32, RequestId>>,
}

#[cfg_attr(not(target_os = "android"), allow(dead_code))]
impl RequestCodes {
    pub(crate) fn new(base: i32, span: u16) -> Self {
        Self {
            base,
            span: span.max(1),
            codes: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<i32, RequestId>> {
        self.codes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn code_for(&self, id: RequestId) -> i32 {
        let offset = id.get() % u64::from(self.span);
        self.base + i32::try_from(offset).unwrap_or_default()
    }

    /// Holds the code for `id` while `launch` runs. The code is released
    /// again if `launch` fails.
    pub(crate) fn launch<E>(&self, id: RequestId, launch: impl FnOnce(i32) -> Result<(), E>) -> Result<(), E> {
        let code = self.code_for(id);
        if let Some(stale) = self.lock().insert(code, id) {
            log::warn!("request code {code} reused while {stale} was pending");
        }
        let launched = launch(code);
        if launched.is_err() {
            self.lock().remove(&code);
        }
        launched
    }

    /// Releases `code` and returns the id it belonged to.
    pub(crate) fn take(&self, code: i32) -> Option<RequestId> {
        self.lock().remove(&code)
    }
}
