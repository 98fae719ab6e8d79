//! iOS host. Multi-select picking is not wired up on iOS; only the platform
//! version is reported.

use crate::bridge::{Completion, PickerHost};
use crate::request::PickRequest;
use crate::strategy::{LaunchSpec, PickerStrategy};
use crate::PickerError;

#[swift_bridge::bridge]
mod ffi {
    extern "Swift" {
        fn system_version() -> String;
    }
}

/// Picker host for iOS.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppleHost;

impl AppleHost {
    /// Creates the host.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PickerHost for AppleHost {
    fn strategy(&self) -> PickerStrategy {
        PickerStrategy::ModernSurface
    }

    fn is_picker_available(&self) -> bool {
        false
    }

    fn platform_version(&self) -> String {
        format!("iOS {}", ffi::system_version())
    }

    fn launch(&self, _completion: Completion, _request: &PickRequest, _spec: &LaunchSpec) -> Result<(), PickerError> {
        Err(PickerError::NotSupported("media picking on iOS".into()))
    }
}
