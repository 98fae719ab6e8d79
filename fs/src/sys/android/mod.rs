//! Android cache directory lookup through `Context.getCacheDir()`.

use jni::JNIEnv;
use jni::objects::JObject;
use std::io;
use std::path::PathBuf;

/// Resolves `context.getCacheDir().getAbsolutePath()`.
///
/// # Errors
/// Returns the JNI error if any of the calls fail.
pub fn cache_dir_with_context(env: &mut JNIEnv, context: &JObject) -> jni::errors::Result<PathBuf> {
    let cache_dir = env
        .call_method(context, "getCacheDir", "()Ljava/io/File;", &[])?
        .l()?;

    let cache_path = env
        .call_method(&cache_dir, "getAbsolutePath", "()Ljava/lang/String;", &[])?
        .l()?;

    let path: String = env.get_string((&cache_path).into())?.into();

    env.delete_local_ref(cache_path)?;
    env.delete_local_ref(cache_dir)?;

    Ok(PathBuf::from(path))
}

/// Resolves and creates `cacheDir/subdir` for the given context.
///
/// # Errors
/// Returns an error if the cache directory cannot be resolved or created.
pub fn media_cache_dir_with_context(
    env: &mut JNIEnv,
    context: &JObject,
    subdir: &str,
) -> io::Result<PathBuf> {
    let root = cache_dir_with_context(env, context).map_err(|e| {
        if env.exception_check().unwrap_or(false) {
            let _ = env.exception_clear();
        }
        io::Error::other(format!("getCacheDir failed: {e}"))
    })?;
    crate::ensure_subdir(&root, subdir)
}

/// Android has no context-free cache directory.
pub fn cache_dir() -> Option<PathBuf> {
    log::warn!("Android: cache_dir requires a Context, use cache_dir_with_context()");
    None
}
