use assetkit_picker::channel::{self, MethodCall};
use assetkit_picker::sys::DesktopHost;
use assetkit_picker::{MediaPickerBridge, PickerConfig};
use serde_json::json;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path).map(|raw| PickerConfig::from_json(&raw)) {
            Ok(Ok(config)) => config,
            Ok(Err(e)) => {
                log::error!("bad config {path}: {e}");
                return;
            }
            Err(e) => {
                log::error!("could not read {path}: {e}");
                return;
            }
        },
        None => PickerConfig::default(),
    };
    let bridge = MediaPickerBridge::new(DesktopHost::new()).with_config(config);

    println!("Channel: {}", channel::CHANNEL_NAME);

    for call in [
        MethodCall::new("getPlatformVersion", serde_json::Value::Null),
        MethodCall::new("isPhotoPickerAvailable", serde_json::Value::Null),
    ] {
        match channel::handle_method_call(&bridge, &call).await {
            Ok(value) => println!("{}: {value}", call.method),
            Err(e) => println!("{}: {} ({})", call.method, e, e.code()),
        }
    }

    println!("Pick up to 3 images and videos (videos over 50 MB are rejected)...");
    let call = MethodCall::new(
        "pickImagesAndVideos",
        json!({ "maxItems": 3, "maxVideoSizeMB": 50 }),
    );
    match channel::handle_method_call(&bridge, &call).await {
        Ok(paths) => println!("Copied: {paths}"),
        Err(e) => println!("Pick failed: {e} ({})", e.code()),
    }

    let reply = channel::handle_json(&bridge, r#"{ "method": "pickAudio" }"#).await;
    println!("Unknown method reply: {reply}");
}
