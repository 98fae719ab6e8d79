//! Android JNI harness for the picker bridge.
//!
//! To build: cargo ndk -t arm64-v8a build -p assetkit-picker-android-demo
//!
//! `MainActivity` declares the matching `native` methods and implements
//! `onPickerReply(long, String)`, which receives the JSON reply of each call.

#![cfg(target_os = "android")]
#![allow(non_snake_case)]

use std::sync::OnceLock;

use assetkit_picker::channel;
use jni::objects::{GlobalRef, JObject, JString, JValue};
use jni::sys::{jboolean, jint, jlong, JNI_FALSE, JNI_TRUE};
use jni::{JNIEnv, JavaVM};
use tokio::runtime::Runtime;

fn runtime() -> Option<&'static Runtime> {
    static RUNTIME: OnceLock<Option<Runtime>> = OnceLock::new();
    RUNTIME
        .get_or_init(|| {
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .thread_name("assetkit-demo")
                .build()
                .map_err(|e| log::error!("tokio runtime: {e}"))
                .ok()
        })
        .as_ref()
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_assetkit_demo_MainActivity_nativeInstall(
    mut env: JNIEnv,
    activity: JObject,
) -> jboolean {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Debug)
            .with_tag("assetkit"),
    );

    match assetkit_picker::sys::android::install(&mut env, &activity) {
        Ok(bridge) => {
            log::info!("picker installed: {}", channel::ANDROID_CHANNEL_NAME);
            log::debug!("{bridge:?}");
            JNI_TRUE
        }
        Err(e) => {
            log::error!("picker install failed: {e}");
            JNI_FALSE
        }
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_assetkit_demo_MainActivity_nativeOnDestroy(_env: JNIEnv, _activity: JObject) {
    assetkit_picker::sys::android::detach_activity();
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_assetkit_demo_MainActivity_nativeOnActivityResult(
    mut env: JNIEnv,
    _activity: JObject,
    request_code: jint,
    result_code: jint,
    data: JObject,
) -> jboolean {
    if assetkit_picker::sys::android::on_activity_result(&mut env, request_code, result_code, &data) {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

/// Dispatches a JSON method call; the reply arrives on `onPickerReply`.
#[unsafe(no_mangle)]
pub extern "system" fn Java_assetkit_demo_MainActivity_nativeMethodCall(
    mut env: JNIEnv,
    activity: JObject,
    call_id: jlong,
    call: JString,
) {
    let (Some(bridge), Some(runtime)) = (assetkit_picker::sys::android::bridge(), runtime()) else {
        log::error!("nativeMethodCall before nativeInstall");
        return;
    };

    let call: String = match env.get_string(&call) {
        Ok(call) => call.into(),
        Err(e) => {
            log::error!("call {call_id}: {e}");
            return;
        }
    };
    let (vm, activity) = match (env.get_java_vm(), env.new_global_ref(activity)) {
        (Ok(vm), Ok(activity)) => (vm, activity),
        _ => {
            log::error!("call {call_id}: could not capture the activity");
            return;
        }
    };

    runtime.spawn(async move {
        let reply = channel::handle_json(bridge, &call).await;
        deliver_reply(&vm, &activity, call_id, &reply);
    });
}

fn deliver_reply(vm: &JavaVM, activity: &GlobalRef, call_id: jlong, reply: &str) {
    let result = vm.attach_current_thread().and_then(|mut env| {
        let reply = env.new_string(reply)?;
        env.call_method(
            activity.as_obj(),
            "onPickerReply",
            "(JLjava/lang/String;)V",
            &[JValue::Long(call_id), JValue::Object(&reply)],
        )?;
        Ok(())
    });
    if let Err(e) = result {
        log::error!("reply {call_id} not delivered: {e}");
    }
}
