//! Method-channel surface.
//!
//! The embedding framework talks to the bridge through a single named
//! channel carrying `{ method, arguments }` calls and JSON replies.
//!
//! | Method                   | Arguments                       | Reply              |
//! |--------------------------|---------------------------------|--------------------|
//! | `pickImagesAndVideos`    | `maxItems`, `maxVideoSizeMB`    | list of paths      |
//! | `pickImages`             | `maxItems`                      | list of paths      |
//! | `pickVideos`             | `maxItems`, `maxVideoSizeMB`    | list of paths      |
//! | `isPhotoPickerAvailable` | none                            | boolean            |
//! | `getPlatformVersion`     | none                            | string             |

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bridge::{MediaPickerBridge, PickerHost};
use crate::request::{MediaKind, PickRequest};
use crate::{ErrorReply, PickerError};

/// Channel name used by the iOS embedding.
pub const CHANNEL_NAME: &str = "system_asset_picker";

/// Channel name the Android embedding registers the pick methods on.
pub const ANDROID_CHANNEL_NAME: &str = "com.example.system_asset_picker/photo_picker";

/// Whether calls arriving on channel `name` belong to the bridge.
#[must_use]
pub fn is_picker_channel(name: &str) -> bool {
    name == CHANNEL_NAME || name == ANDROID_CHANNEL_NAME
}

/// One incoming call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    /// Method name.
    pub method: String,
    /// Argument map; `null` when the method takes none.
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    /// A call with arguments.
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }
}

/// Methods understood by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `pickImagesAndVideos`
    PickImagesAndVideos,
    /// `pickImages`
    PickImages,
    /// `pickVideos`
    PickVideos,
    /// `isPhotoPickerAvailable`
    IsPhotoPickerAvailable,
    /// `getPlatformVersion`
    GetPlatformVersion,
}

impl Method {
    /// Media kind for the pick methods.
    #[must_use]
    pub const fn media_kind(self) -> Option<MediaKind> {
        match self {
            Self::PickImagesAndVideos => Some(MediaKind::ImagesAndVideos),
            Self::PickImages => Some(MediaKind::ImagesOnly),
            Self::PickVideos => Some(MediaKind::VideosOnly),
            Self::IsPhotoPickerAvailable | Self::GetPlatformVersion => None,
        }
    }
}

impl FromStr for Method {
    type Err = PickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pickImagesAndVideos" => Ok(Self::PickImagesAndVideos),
            "pickImages" => Ok(Self::PickImages),
            "pickVideos" => Ok(Self::PickVideos),
            "isPhotoPickerAvailable" => Ok(Self::IsPhotoPickerAvailable),
            "getPlatformVersion" => Ok(Self::GetPlatformVersion),
            other => Err(PickerError::NotImplemented(other.to_string())),
        }
    }
}

/// Arguments of the pick methods. Both are optional on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PickArgs {
    /// `maxItems`
    #[serde(rename = "maxItems")]
    pub max_items: Option<i64>,
    /// `maxVideoSizeMB`
    #[serde(rename = "maxVideoSizeMB")]
    pub max_video_size_mb: Option<i64>,
}

impl PickArgs {
    /// Decodes the argument map. `null` means "all defaults".
    ///
    /// # Errors
    /// Returns [`PickerError::InvalidArguments`] for non-integer values.
    pub fn from_value(arguments: &Value) -> Result<Self, PickerError> {
        if arguments.is_null() {
            return Ok(Self::default());
        }
        Self::deserialize(arguments).map_err(|e| PickerError::InvalidArguments(e.to_string()))
    }
}

/// Builds the request for a pick method, applying the bridge's defaults.
///
/// # Errors
/// Returns [`PickerError::InvalidArguments`] if the arguments do not decode.
pub fn pick_request_for(
    kind: MediaKind,
    arguments: &Value,
    config: &crate::PickerConfig,
) -> Result<PickRequest, PickerError> {
    let args = PickArgs::from_value(arguments)?;
    Ok(PickRequest::new(kind)
        .with_max_items(config.resolve_max_items(args.max_items))
        .with_max_video_size_mb(config.resolve_max_video_size_mb(args.max_video_size_mb)))
}

/// Dispatches one call and produces its JSON reply.
///
/// # Errors
/// Propagates the bridge's error, or reports an unknown method or bad
/// arguments.
pub async fn handle_method_call<H: PickerHost>(
    bridge: &MediaPickerBridge<H>,
    call: &MethodCall,
) -> Result<Value, PickerError> {
    let method = call.method.parse::<Method>()?;
    log::debug!("method call {}", call.method);

    if let Some(kind) = method.media_kind() {
        let request = pick_request_for(kind, &call.arguments, bridge.config())?;
        let outcome = bridge.request_pick(request).await?;
        return Ok(Value::from(outcome.path_strings()));
    }

    match method {
        Method::IsPhotoPickerAvailable => Ok(Value::Bool(bridge.is_picker_available())),
        Method::GetPlatformVersion => Ok(Value::String(bridge.host().platform_version())),
        _ => Err(PickerError::NotImplemented(call.method.clone())),
    }
}

/// Reply envelope: either `{ "ok": ... }` or `{ "error": { code, message } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Reply {
    /// Success value.
    Ok(Value),
    /// Structured error.
    Error(ErrorReply),
}

impl From<Result<Value, PickerError>> for Reply {
    fn from(result: Result<Value, PickerError>) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(e) => Self::Error(e.to_reply()),
        }
    }
}

/// Dispatches a JSON-encoded call and returns the JSON-encoded [`Reply`].
pub async fn handle_json<H: PickerHost>(bridge: &MediaPickerBridge<H>, call_json: &str) -> String {
    let reply: Reply = match serde_json::from_str::<MethodCall>(call_json) {
        Ok(call) => handle_method_call(bridge, &call).await.into(),
        Err(e) => Reply::Error(PickerError::InvalidArguments(e.to_string()).to_reply()),
    };
    serde_json::to_string(&reply).unwrap_or_else(|e| {
        format!(r#"{{"error":{{"code":"PICKER_ERROR","message":"{e}"}}}}"#)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::testing::{FakeAsset, FakeSource};
    use crate::bridge::testing::FakeHost;
    use crate::pending::PendingRequests;
    use crate::request::BYTES_PER_MB;
    use crate::selection::{LogNotifier, PickResult};
    use crate::PickerConfig;
    use futures::executor::block_on;
    use futures::future::{self, Either};
    use futures::pin_mut;
    use serde_json::json;
    use std::sync::Arc;

    fn bridge(sdk_int: i32) -> MediaPickerBridge<FakeHost> {
        MediaPickerBridge::with_parts(
            FakeHost::new(sdk_int),
            Arc::new(PendingRequests::new()),
            PickerConfig::default(),
        )
    }

    #[test]
    fn channel_names() {
        assert!(is_picker_channel("system_asset_picker"));
        assert!(is_picker_channel("com.example.system_asset_picker/photo_picker"));
        assert!(!is_picker_channel("system_asset_picker/other"));
    }

    #[test]
    fn method_names() {
        assert_eq!("pickImages".parse::<Method>().ok(), Some(Method::PickImages));
        assert_eq!(
            "isPhotoPickerAvailable".parse::<Method>().ok(),
            Some(Method::IsPhotoPickerAvailable)
        );
        assert!(matches!(
            "pickAudio".parse::<Method>(),
            Err(PickerError::NotImplemented(_))
        ));
    }

    #[test]
    fn pick_args_defaults() {
        let config = PickerConfig::default();
        let request = pick_request_for(MediaKind::VideosOnly, &Value::Null, &config).expect("defaults");
        assert_eq!(request.max_items(), 10);
        assert_eq!(request.max_video_size_mb(), 100);

        let request = pick_request_for(
            MediaKind::VideosOnly,
            &json!({ "maxItems": 5, "maxVideoSizeMB": 50 }),
            &config,
        )
        .expect("explicit");
        assert_eq!(request.max_items(), 5);
        assert_eq!(request.max_video_size_mb(), 50);
    }

    #[test]
    fn pick_images_ignores_video_limit() {
        let request = pick_request_for(
            MediaKind::ImagesOnly,
            &json!({ "maxItems": 3, "maxVideoSizeMB": 50 }),
            &PickerConfig::default(),
        )
        .expect("decoded");
        assert_eq!(request.max_items(), 3);
        assert_eq!(request.max_video_size_mb(), 0);
    }

    #[test]
    fn invalid_max_items_uses_default() {
        let request = pick_request_for(
            MediaKind::ImagesOnly,
            &json!({ "maxItems": -2 }),
            &PickerConfig::default(),
        )
        .expect("decoded");
        assert_eq!(request.max_items(), 10);
    }

    #[test]
    fn non_integer_arguments_are_rejected() {
        let err = pick_request_for(
            MediaKind::ImagesOnly,
            &json!({ "maxItems": "three" }),
            &PickerConfig::default(),
        )
        .expect_err("string is not an int");
        assert_eq!(err.code(), "INVALID_ARGUMENTS");
    }

    #[test]
    fn availability_and_version() {
        let bridge = bridge(29);
        let call = MethodCall::new("isPhotoPickerAvailable", Value::Null);
        assert_eq!(block_on(handle_method_call(&bridge, &call)).ok(), Some(json!(false)));

        let call = MethodCall::new("getPlatformVersion", Value::Null);
        assert_eq!(
            block_on(handle_method_call(&bridge, &call)).ok(),
            Some(json!("Android 29"))
        );
    }

    #[test]
    fn no_activity_reply() {
        let mut host = FakeHost::new(34);
        host.surface = false;
        let bridge = MediaPickerBridge::with_parts(host, Arc::new(PendingRequests::new()), PickerConfig::default());

        let reply = block_on(handle_json(&bridge, r#"{ "method": "pickImages", "arguments": { "maxItems": 2 } }"#));
        let reply: Reply = serde_json::from_str(&reply).expect("reply json");
        assert_eq!(
            reply,
            Reply::Error(ErrorReply {
                code: "NO_ACTIVITY".into(),
                message: "Activity is not available".into(),
            })
        );
    }

    #[test]
    fn unknown_method_reply() {
        let bridge = bridge(34);
        let reply = block_on(handle_json(&bridge, r#"{ "method": "getBatteryLevel" }"#));
        assert!(reply.contains("NOT_IMPLEMENTED"));
    }

    #[test]
    fn malformed_call_reply() {
        let bridge = bridge(34);
        let reply = block_on(handle_json(&bridge, "not json"));
        assert!(reply.contains("INVALID_ARGUMENTS"));
    }

    #[test]
    fn pick_videos_replies_with_paths() {
        let bridge = bridge(34);
        let dir = tempfile::tempdir().expect("tempdir");
        let mut source = FakeSource::default()
            .with("content://v40", FakeAsset::video(40 * BYTES_PER_MB))
            .with("content://v60", FakeAsset::video(60 * BYTES_PER_MB));

        let call = MethodCall::new("pickVideos", json!({ "maxItems": 5, "maxVideoSizeMB": 50 }));
        let reply = handle_method_call(&bridge, &call);
        pin_mut!(reply);

        let reply = match block_on(future::select(reply, future::ready(()))) {
            Either::Left((done, _)) => panic!("answered before the picker returned: {done:?}"),
            Either::Right(((), reply)) => reply,
        };

        let (id, request, _) = bridge.host().last_launch().expect("launched");
        assert_eq!(request.max_video_size_mb(), 50);
        assert!(bridge.on_pick_result(
            id,
            PickResult::multiple(["content://v40", "content://v60"]),
            &mut source,
            &mut LogNotifier,
            dir.path(),
        ));

        let paths = match block_on(reply).expect("picked") {
            Value::Array(paths) => paths,
            other => panic!("expected a list of paths, got {other}"),
        };
        assert_eq!(paths.len(), 1);
        let path = paths[0].as_str().expect("path string");
        assert!(path.starts_with(&dir.path().display().to_string()));
        assert!(path.ends_with(".mp4"));
        assert_eq!(source.opened, vec!["content://v40"]);
    }
}
