//! Android picker through JNI.
//!
//! `PickerHelper` (Kotlin, compiled to DEX at build time and loaded with an
//! `InMemoryDexClassLoader`) builds and starts the picker intent. The host
//! activity forwards `onActivityResult` to [`on_activity_result`], which reads
//! the returned URIs and finishes the pick on a worker thread so large copies
//! never block the UI thread.
//!
//! ```rust,ignore
//! // JNI_OnLoad / Activity.onCreate
//! assetkit_picker::sys::android::install(&mut env, &activity)?;
//!
//! // Activity.onActivityResult
//! if assetkit_picker::sys::android::on_activity_result(&mut env, request_code, result_code, &data) {
//!     return;
//! }
//! ```

use std::io::{self, Read};
use std::sync::{Mutex, OnceLock, PoisonError};

use jni::objects::{GlobalRef, JByteArray, JClass, JObject, JObjectArray, JString, JValue};
use jni::sys::{jbyte, jint};
use jni::{JNIEnv, JavaVM};

use crate::asset::{AssetLocator, AssetSource};
use crate::bridge::{Completion, MediaPickerBridge, PickerHost};
use crate::pending::{RequestCodes, RequestId};
use crate::request::PickRequest;
use crate::selection::{Notifier, PickResult, ResultCode};
use crate::strategy::{self, LaunchSpec, PickerStrategy};
use crate::{PickerConfig, PickerError};

/// Embedded DEX bytecode containing the `PickerHelper` class.
/// Generated at build time by kotlinc + D8.
static DEX_BYTES: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/classes.dex"));

static CLASS_LOADER: OnceLock<GlobalRef> = OnceLock::new();

static BRIDGE: OnceLock<MediaPickerBridge<AndroidHost>> = OnceLock::new();

const HELPER_CLASS: &str = "assetkit.picker.PickerHelper";

/// Request codes live in `[BASE, BASE + SPAN)`, clear of typical app codes
/// and within the 16 bits `FragmentActivity` allows.
const REQUEST_CODE_BASE: jint = 0x4150;
const REQUEST_CODE_SPAN: u16 = 0x100;

const LOCAL_FRAME: i32 = 16;
const READ_CHUNK: usize = 64 * 1024;

/// `Intent.FLAG_GRANT_READ_URI_PERMISSION`
const FLAG_GRANT_READ_URI_PERMISSION: jint = 1;

/// Picker host backed by an Android activity.
pub struct AndroidHost {
    vm: JavaVM,
    activity: Mutex<Option<GlobalRef>>,
    sdk_int: i32,
    release: String,
    request_codes: RequestCodes,
}

impl std::fmt::Debug for AndroidHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AndroidHost")
            .field("sdk_int", &self.sdk_int)
            .field("release", &self.release)
            .field("attached", &self.activity().is_some())
            .finish_non_exhaustive()
    }
}

impl AndroidHost {
    /// Builds a host for `activity`, reading the OS version once.
    ///
    /// # Errors
    /// Returns an error if the VM or `Build.VERSION` cannot be read, or the
    /// helper DEX cannot be loaded.
    pub fn new(env: &mut JNIEnv, activity: &JObject) -> Result<Self, PickerError> {
        let vm = env
            .get_java_vm()
            .map_err(|e| PickerError::Platform(format!("get_java_vm: {e}")))?;
        let (sdk_int, release) = build_version(env)?;
        class_loader(env, activity)?;
        let activity = env
            .new_global_ref(activity)
            .map_err(|e| PickerError::Platform(format!("new_global_ref: {e}")))?;

        log::info!("Android {release} (SDK {sdk_int}), {:?}", PickerStrategy::for_sdk(sdk_int));

        Ok(Self {
            vm,
            activity: Mutex::new(Some(activity)),
            sdk_int,
            release,
            request_codes: RequestCodes::new(REQUEST_CODE_BASE, REQUEST_CODE_SPAN),
        })
    }

    /// `Build.VERSION.SDK_INT`
    #[must_use]
    pub const fn sdk_int(&self) -> i32 {
        self.sdk_int
    }

    /// The current foreground activity, if attached.
    #[must_use]
    pub fn activity(&self) -> Option<GlobalRef> {
        self.activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_activity(&self, activity: Option<GlobalRef>) {
        *self.activity.lock().unwrap_or_else(PoisonError::into_inner) = activity;
    }
}

impl PickerHost for AndroidHost {
    fn strategy(&self) -> PickerStrategy {
        PickerStrategy::for_sdk(self.sdk_int)
    }

    fn is_picker_available(&self) -> bool {
        strategy::is_picker_available(self.sdk_int)
    }

    fn platform_version(&self) -> String {
        format!("Android {}", self.release)
    }

    fn launch(&self, completion: Completion, _request: &PickRequest, spec: &LaunchSpec) -> Result<(), PickerError> {
        let activity = self.activity().ok_or(PickerError::NoHostSurface)?;
        let loader = CLASS_LOADER
            .get()
            .ok_or_else(|| PickerError::Platform("class loader not initialized".into()))?;

        // The code is held before the intent starts, since the result may
        // arrive before `launch` returns.
        self.request_codes.launch(completion.id(), |request_code| {
            let mut env = self
                .vm
                .attach_current_thread()
                .map_err(|e| PickerError::Platform(format!("attach_current_thread: {e}")))?;
            call_java(&mut env, |env| {
                start_picker(env, loader, activity.as_obj(), spec, request_code)
            })?
            .map_or(Ok(()), |message| Err(PickerError::LaunchFailure(message)))
        })
    }
}

/// Calls `PickerHelper.launch`; `Some(message)` if the OS refused.
fn start_picker(
    env: &mut JNIEnv,
    loader: &GlobalRef,
    activity: &JObject,
    spec: &LaunchSpec,
    request_code: jint,
) -> jni::errors::Result<Option<String>> {
    let helper = load_helper(env, loader)?;

    let action = env.new_string(spec.action)?;
    let mime_type = match spec.mime_type {
        Some(mime) => JObject::from(env.new_string(mime)?),
        None => JObject::null(),
    };

    let extra_len = jint::try_from(spec.extra_mime_types.len()).unwrap_or_default();
    let extra_mime_types = env.new_object_array(extra_len, "java/lang/String", JObject::null())?;
    for (index, mime) in (0..extra_len).zip(&spec.extra_mime_types) {
        let value = env.new_string(mime)?;
        env.set_object_array_element(&extra_mime_types, index, value)?;
    }

    let max_items = spec
        .max_items
        .and_then(|n| jint::try_from(n).ok())
        .unwrap_or(0);

    let refusal = env
        .call_static_method(
            &helper,
            "launch",
            "(Landroid/app/Activity;Ljava/lang/String;Ljava/lang/String;[Ljava/lang/String;IZZZI)Ljava/lang/String;",
            &[
                JValue::Object(activity),
                JValue::Object(&action),
                JValue::Object(&mime_type),
                JValue::Object(&extra_mime_types),
                JValue::Int(max_items),
                JValue::Bool(spec.allow_multiple.into()),
                JValue::Bool(spec.openable.into()),
                JValue::Bool(spec.persistable.into()),
                JValue::Int(request_code),
            ],
        )?
        .l()?;

    optional_string(env, &refusal)
}

/// Installs the process-wide bridge for `activity`.
///
/// Calling it again only re-attaches the activity.
///
/// # Errors
/// Returns an error if the host cannot be created.
pub fn install(
    env: &mut JNIEnv,
    activity: &JObject,
) -> Result<&'static MediaPickerBridge<AndroidHost>, PickerError> {
    install_with_config(env, activity, PickerConfig::default())
}

/// [`install`] with an explicit configuration. The configuration of an
/// already installed bridge is left as is.
///
/// # Errors
/// Returns an error if the host cannot be created.
pub fn install_with_config(
    env: &mut JNIEnv,
    activity: &JObject,
    config: PickerConfig,
) -> Result<&'static MediaPickerBridge<AndroidHost>, PickerError> {
    if let Some(bridge) = BRIDGE.get() {
        attach_activity(env, activity)?;
        return Ok(bridge);
    }

    let host = AndroidHost::new(env, activity)?;
    Ok(BRIDGE.get_or_init(|| MediaPickerBridge::new(host).with_config(config)))
}

/// The installed bridge, if any.
pub fn bridge() -> Option<&'static MediaPickerBridge<AndroidHost>> {
    BRIDGE.get()
}

/// Points the bridge at a new foreground activity (e.g. after recreation).
///
/// # Errors
/// Returns an error if the global reference cannot be created.
pub fn attach_activity(env: &mut JNIEnv, activity: &JObject) -> Result<(), PickerError> {
    let Some(bridge) = BRIDGE.get() else {
        return Ok(());
    };
    let activity = env
        .new_global_ref(activity)
        .map_err(|e| PickerError::Platform(format!("new_global_ref: {e}")))?;
    bridge.host().set_activity(Some(activity));
    Ok(())
}

/// Forgets the foreground activity. Launches fail with `NO_ACTIVITY` until
/// [`attach_activity`] is called again; picks already in flight still
/// complete.
pub fn detach_activity() {
    if let Some(bridge) = BRIDGE.get() {
        bridge.host().set_activity(None);
    }
}

/// Handles a forwarded `Activity.onActivityResult`.
///
/// Returns `true` if the result belonged to a pick issued by this bridge.
pub fn on_activity_result(
    env: &mut JNIEnv,
    request_code: jint,
    result_code: jint,
    data: &JObject,
) -> bool {
    let Some(bridge) = BRIDGE.get() else {
        return false;
    };
    let Some(id) = bridge.host().request_codes.take(request_code) else {
        return false;
    };

    let result = match read_pick_result(env, result_code, data) {
        Ok(result) => result,
        Err(e) => {
            bridge.fail(id, e);
            return true;
        }
    };

    let spawned = std::thread::Builder::new()
        .name("assetkit-picker".into())
        .spawn(move || finish_pick(bridge, id, result));
    if let Err(e) = spawned {
        log::error!("could not spawn picker worker: {e}");
        bridge.fail(id, PickerError::Io(e));
    }
    true
}

fn finish_pick(bridge: &'static MediaPickerBridge<AndroidHost>, id: RequestId, result: PickResult) {
    let host = bridge.host();
    let Some(activity) = host.activity() else {
        bridge.fail(id, PickerError::NoHostSurface);
        return;
    };

    let mut env = match host.vm.attach_current_thread() {
        Ok(env) => env,
        Err(e) => {
            bridge.fail(id, PickerError::Platform(format!("attach_current_thread: {e}")));
            return;
        }
    };

    let cache_root = match assetkit_fs::sys::android::media_cache_dir_with_context(
        &mut env,
        activity.as_obj(),
        &bridge.config().cache_subdir,
    ) {
        Ok(dir) => dir,
        Err(e) => {
            bridge.fail(id, PickerError::Io(e));
            return;
        }
    };

    let mut notifier = ToastNotifier {
        vm: &host.vm,
        activity: activity.clone(),
    };

    match ContentResolverSource::new(&mut env, activity.as_obj()) {
        Ok(mut source) => {
            bridge.on_pick_result(id, result, &mut source, &mut notifier, &cache_root);
        }
        Err(e) => {
            bridge.fail(id, e);
        }
    }
}

fn read_pick_result(env: &mut JNIEnv, result_code: jint, data: &JObject) -> Result<PickResult, PickerError> {
    if ResultCode::from_android(result_code) != ResultCode::Ok || data.is_null() {
        log::debug!("picker dismissed (result code {result_code})");
        return Ok(PickResult::cancelled());
    }

    let loader = CLASS_LOADER
        .get()
        .ok_or_else(|| PickerError::Platform("class loader not initialized".into()))?;

    call_java(env, |env| {
        let helper = load_helper(env, loader)?;

        let clip = env
            .call_static_method(
                &helper,
                "clipUris",
                "(Landroid/content/Intent;)[Ljava/lang/String;",
                &[JValue::Object(data)],
            )?
            .l()?;
        if !clip.is_null() {
            let clip = JObjectArray::from(clip);
            let len = env.get_array_length(&clip)?;
            let mut locators = Vec::with_capacity(usize::try_from(len).unwrap_or_default());
            for index in 0..len {
                let item = env.get_object_array_element(&clip, index)?;
                if let Some(uri) = optional_string(env, &item)? {
                    locators.push(uri);
                }
                env.delete_local_ref(item)?;
            }
            return Ok(PickResult::multiple(locators));
        }

        let uri = env
            .call_static_method(
                &helper,
                "dataUri",
                "(Landroid/content/Intent;)Ljava/lang/String;",
                &[JValue::Object(data)],
            )?
            .l()?;
        Ok(match optional_string(env, &uri)? {
            Some(uri) => PickResult::single(uri),
            None => PickResult {
                code: ResultCode::Ok,
                payload: None,
            },
        })
    })
}

/// Asset access through the activity's `ContentResolver`.
pub struct ContentResolverSource<'a, 'local> {
    env: &'a mut JNIEnv<'local>,
    context: &'a JObject<'a>,
    resolver: JObject<'local>,
    loader: &'static GlobalRef,
}

impl std::fmt::Debug for ContentResolverSource<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentResolverSource").finish_non_exhaustive()
    }
}

impl<'a, 'local> ContentResolverSource<'a, 'local> {
    /// Resolves `context.getContentResolver()`.
    ///
    /// # Errors
    /// Returns an error if the resolver or the helper class is unavailable.
    pub fn new(env: &'a mut JNIEnv<'local>, context: &'a JObject<'a>) -> Result<Self, PickerError> {
        let loader = class_loader(env, context)?;
        let resolver = env
            .call_method(context, "getContentResolver", "()Landroid/content/ContentResolver;", &[])
            .and_then(|value| value.l())
            .map_err(|e| java_error(env, &e))?;
        Ok(Self {
            env,
            context,
            resolver,
            loader,
        })
    }

    /// Calls a `(Context, String) -> J` helper; negative means unknown.
    fn helper_size(&mut self, method: &str, locator: &AssetLocator) -> Result<Option<u64>, PickerError> {
        let (loader, context) = (self.loader, self.context);
        let size = call_java(self.env, |env| {
            let helper = load_helper(env, loader)?;
            let uri = env.new_string(locator.as_str())?;
            env.call_static_method(
                &helper,
                method,
                "(Landroid/content/Context;Ljava/lang/String;)J",
                &[JValue::Object(context), JValue::Object(&uri)],
            )?
            .j()
        })?;
        Ok(u64::try_from(size).ok())
    }
}

impl AssetSource for ContentResolverSource<'_, '_> {
    fn mime_type(&mut self, locator: &AssetLocator) -> Option<String> {
        let resolver = &self.resolver;
        call_java(self.env, |env| {
            let uri = parse_uri(env, locator)?;
            let mime = env
                .call_method(resolver, "getType", "(Landroid/net/Uri;)Ljava/lang/String;", &[JValue::Object(&uri)])?
                .l()?;
            optional_string(env, &mime)
        })
        .unwrap_or_else(|e| {
            log::warn!("getType failed for {locator}: {e}");
            None
        })
    }

    fn query_size(&mut self, locator: &AssetLocator) -> Result<Option<u64>, PickerError> {
        self.helper_size("querySize", locator)
    }

    fn descriptor_size(&mut self, locator: &AssetLocator) -> Result<Option<u64>, PickerError> {
        self.helper_size("descriptorSize", locator)
    }

    fn open(&mut self, locator: &AssetLocator) -> Result<Box<dyn Read + '_>, PickerError> {
        let uri = parse_uri(self.env, locator).map_err(|e| java_error(self.env, &e))?;
        let stream = self
            .env
            .call_method(
                &self.resolver,
                "openInputStream",
                "(Landroid/net/Uri;)Ljava/io/InputStream;",
                &[JValue::Object(&uri)],
            )
            .and_then(|value| value.l())
            .map_err(|e| java_error(self.env, &e));
        let _ = self.env.delete_local_ref(uri);
        let stream = stream?;

        if stream.is_null() {
            return Err(PickerError::Platform(format!("no input stream for {locator}")));
        }

        let buffer = match self.env.new_byte_array(jint::try_from(READ_CHUNK).unwrap_or(jint::MAX)) {
            Ok(buffer) => buffer,
            Err(e) => {
                let error = java_error(self.env, &e);
                close_stream(self.env, stream);
                return Err(error);
            }
        };

        Ok(Box::new(JavaInputStream {
            env: &mut *self.env,
            stream,
            buffer,
            scratch: vec![0; READ_CHUNK],
        }))
    }

    fn take_persistable_grant(&mut self, locator: &AssetLocator) -> Result<(), PickerError> {
        let resolver = &self.resolver;
        call_java(self.env, |env| {
            let uri = parse_uri(env, locator)?;
            env.call_method(
                resolver,
                "takePersistableUriPermission",
                "(Landroid/net/Uri;I)V",
                &[JValue::Object(&uri), JValue::Int(FLAG_GRANT_READ_URI_PERMISSION)],
            )?;
            Ok(())
        })
    }
}

/// `java.io.InputStream` as a [`Read`], pulled in fixed-size chunks.
struct JavaInputStream<'a, 'local> {
    env: &'a mut JNIEnv<'local>,
    stream: JObject<'local>,
    buffer: JByteArray<'local>,
    scratch: Vec<jbyte>,
}

impl Read for JavaInputStream<'_, '_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let want = buf.len().min(self.scratch.len());
        let want_j = jint::try_from(want).map_err(io::Error::other)?;

        let read = self
            .env
            .call_method(
                &self.stream,
                "read",
                "([BII)I",
                &[JValue::Object(&self.buffer), JValue::Int(0), JValue::Int(want_j)],
            )
            .and_then(|value| value.i())
            .map_err(|e| io::Error::other(java_error(self.env, &e)))?;

        // -1 is end of stream.
        let Ok(read) = usize::try_from(read) else {
            return Ok(0);
        };

        let chunk = &mut self.scratch[..read];
        self.env
            .get_byte_array_region(&self.buffer, 0, chunk)
            .map_err(|e| io::Error::other(java_error(self.env, &e)))?;
        for (dst, src) in buf.iter_mut().zip(chunk.iter()) {
            *dst = src.to_ne_bytes()[0];
        }
        Ok(read)
    }
}

impl Drop for JavaInputStream<'_, '_> {
    fn drop(&mut self) {
        let stream = std::mem::replace(&mut self.stream, JObject::null());
        let buffer = std::mem::replace(&mut self.buffer, JByteArray::from(JObject::null()));
        close_stream(self.env, stream);
        let _ = self.env.delete_local_ref(buffer);
    }
}

/// Closes a `java.io.InputStream` and drops its local reference.
fn close_stream(env: &mut JNIEnv, stream: JObject) {
    if env.call_method(&stream, "close", "()V", &[]).is_err() {
        let _ = env.exception_clear();
    }
    let _ = env.delete_local_ref(stream);
}

/// Shows advisory messages as a long Toast.
struct ToastNotifier<'a> {
    vm: &'a JavaVM,
    activity: GlobalRef,
}

impl Notifier for ToastNotifier<'_> {
    fn notify(&mut self, message: &str) {
        let Some(loader) = CLASS_LOADER.get() else {
            return;
        };
        let mut env = match self.vm.attach_current_thread() {
            Ok(env) => env,
            Err(e) => {
                log::warn!("toast skipped: {e}");
                return;
            }
        };
        let activity = self.activity.as_obj();
        let shown = call_java(&mut env, |env| {
            let helper = load_helper(env, loader)?;
            let text = env.new_string(message)?;
            env.call_static_method(
                &helper,
                "showToast",
                "(Landroid/app/Activity;Ljava/lang/String;)V",
                &[JValue::Object(activity), JValue::Object(&text)],
            )?;
            Ok(())
        });
        if let Err(e) = shown {
            log::warn!("toast failed: {e}");
        }
    }
}

fn build_version(env: &mut JNIEnv) -> Result<(i32, String), PickerError> {
    call_java(env, |env| {
        let sdk_int = env
            .get_static_field("android/os/Build$VERSION", "SDK_INT", "I")?
            .i()?;
        let release = env
            .get_static_field("android/os/Build$VERSION", "RELEASE", "Ljava/lang/String;")?
            .l()?;
        let release = optional_string(env, &release)?.unwrap_or_default();
        Ok((sdk_int, release))
    })
}

/// Loads the embedded DEX once, parented to the app's class loader.
fn class_loader(env: &mut JNIEnv, context: &JObject) -> Result<&'static GlobalRef, PickerError> {
    if let Some(loader) = CLASS_LOADER.get() {
        return Ok(loader);
    }

    let loader = call_java(env, |env| {
        let bytes = env.byte_array_from_slice(DEX_BYTES)?;
        let buffer = env
            .call_static_method(
                "java/nio/ByteBuffer",
                "wrap",
                "([B)Ljava/nio/ByteBuffer;",
                &[JValue::Object(&bytes)],
            )?
            .l()?;
        let parent = env
            .call_method(context, "getClassLoader", "()Ljava/lang/ClassLoader;", &[])?
            .l()?;
        let loader = env.new_object(
            "dalvik/system/InMemoryDexClassLoader",
            "(Ljava/nio/ByteBuffer;Ljava/lang/ClassLoader;)V",
            &[JValue::Object(&buffer), JValue::Object(&parent)],
        )?;
        env.new_global_ref(loader)
    })?;

    log::debug!("loaded {HELPER_CLASS} ({} bytes of DEX)", DEX_BYTES.len());
    Ok(CLASS_LOADER.get_or_init(|| loader))
}

fn load_helper<'local>(env: &mut JNIEnv<'local>, loader: &GlobalRef) -> jni::errors::Result<JClass<'local>> {
    let name = env.new_string(HELPER_CLASS)?;
    let class = env
        .call_method(
            loader.as_obj(),
            "loadClass",
            "(Ljava/lang/String;)Ljava/lang/Class;",
            &[JValue::Object(&name)],
        )?
        .l()?;
    Ok(JClass::from(class))
}

fn parse_uri<'local>(env: &mut JNIEnv<'local>, locator: &AssetLocator) -> jni::errors::Result<JObject<'local>> {
    let raw = env.new_string(locator.as_str())?;
    let uri = env
        .call_static_method(
            "android/net/Uri",
            "parse",
            "(Ljava/lang/String;)Landroid/net/Uri;",
            &[JValue::Object(&raw)],
        )?
        .l()?;
    env.delete_local_ref(raw)?;
    Ok(uri)
}

fn optional_string(env: &mut JNIEnv, value: &JObject) -> jni::errors::Result<Option<String>> {
    if value.is_null() {
        return Ok(None);
    }
    let value: &JString = value.into();
    Ok(Some(env.get_string(value)?.into()))
}

/// Runs `f` in a local reference frame, turning a pending Java exception
/// into [`PickerError::Platform`].
fn call_java<T, F>(env: &mut JNIEnv, f: F) -> Result<T, PickerError>
where
    F: FnOnce(&mut JNIEnv) -> jni::errors::Result<T>,
{
    env.with_local_frame(LOCAL_FRAME, f)
        .map_err(|e| java_error(env, &e))
}

/// Clears a pending exception and describes it.
fn java_error(env: &mut JNIEnv, error: &jni::errors::Error) -> PickerError {
    PickerError::Platform(exception_message(env).unwrap_or_else(|| error.to_string()))
}

fn exception_message(env: &mut JNIEnv) -> Option<String> {
    if !env.exception_check().unwrap_or(false) {
        return None;
    }
    let throwable = env.exception_occurred().ok();
    let _ = env.exception_clear();
    let throwable = throwable?;

    let message = env
        .call_method(&throwable, "toString", "()Ljava/lang/String;", &[])
        .and_then(|value| value.l())
        .ok()?;
    let text = optional_string(env, &message).ok().flatten();
    let _ = env.delete_local_ref(message);
    let _ = env.delete_local_ref(throwable);
    text
}
