use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by the picker bridge.
///
/// Only environment-level failures reach the caller. Per-item problems
/// (grant refused, unknown size, copy failure) are logged and the item is
/// dropped from the outcome instead.
#[derive(Error, Debug)]
pub enum PickerError {
    /// No foreground UI context is available to host the native picker.
    #[error("Activity is not available")]
    NoHostSurface,

    /// The OS refused to launch the picker surface.
    #[error("Failed to launch picker: {0}")]
    LaunchFailure(String),

    /// The method-channel arguments could not be decoded.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The method-channel call names a method this bridge does not handle.
    #[error("Method not implemented: {0}")]
    NotImplemented(String),

    /// The operation exists but this platform has no implementation.
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// An error occurred in the underlying platform implementation.
    #[error("Platform error: {0}")]
    Platform(String),

    /// An IO error occurred (e.g. while preparing the cache directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The pending request was dropped before a result was delivered.
    #[error("Picker result channel closed")]
    Channel,
}

impl PickerError {
    /// Wire code reported across the method channel.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NoHostSurface => "NO_ACTIVITY",
            Self::InvalidArguments(_) => "INVALID_ARGUMENTS",
            Self::NotImplemented(_) => "NOT_IMPLEMENTED",
            Self::NotSupported(_) => "NOT_SUPPORTED",
            Self::LaunchFailure(_) | Self::Platform(_) | Self::Io(_) | Self::Channel => {
                "PICKER_ERROR"
            }
        }
    }

    /// Converts into the serializable channel reply.
    #[must_use]
    pub fn to_reply(&self) -> ErrorReply {
        let message = match self {
            Self::LaunchFailure(message) => message.clone(),
            other => other.to_string(),
        };
        ErrorReply {
            code: self.code().to_string(),
            message,
        }
    }
}

/// Structured error sent back over the method channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    /// Machine-readable code such as `NO_ACTIVITY`.
    pub code: String,
    /// Human-readable detail; for launch failures, the OS message.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_codes() {
        assert_eq!(PickerError::NoHostSurface.code(), "NO_ACTIVITY");
        assert_eq!(PickerError::LaunchFailure("x".into()).code(), "PICKER_ERROR");
        assert_eq!(PickerError::Channel.code(), "PICKER_ERROR");
        assert_eq!(PickerError::NotImplemented("m".into()).code(), "NOT_IMPLEMENTED");
    }

    #[test]
    fn launch_failure_reply_carries_os_message() {
        let reply = PickerError::LaunchFailure("No Activity found to handle Intent".into()).to_reply();
        assert_eq!(reply.code, "PICKER_ERROR");
        assert_eq!(reply.message, "No Activity found to handle Intent");
    }
}
