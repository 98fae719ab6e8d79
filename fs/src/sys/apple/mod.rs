use std::path::PathBuf;

#[swift_bridge::bridge]
mod ffi {
    extern "Swift" {
        fn caches_dir() -> Option<String>;
    }
}

/// The sandbox `Library/Caches` directory.
pub fn cache_dir() -> Option<PathBuf> {
    ffi::caches_dir().map(PathBuf::from)
}
