//! Build script for assetkit-picker.
//!
//! Handles platform-specific code generation:
//! - iOS: Swift bridge generation
//! - Android: Kotlin → DEX compilation of `PickerHelper`

use std::{env, path::PathBuf, process::Command};

const KOTLIN_FILE_RELATIVE_PATH: &str = "src/sys/android/PickerHelper.kt";

fn main() {
    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();

    if target_os == "ios" {
        build_apple();
    }

    if target_os == "android" {
        build_android();
    }
}

fn out_dir() -> PathBuf {
    PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"))
}

fn build_apple() {
    let bridges = vec!["src/sys/apple/mod.rs"];
    for bridge in &bridges {
        println!("cargo:rerun-if-changed={bridge}");
    }

    swift_bridge_build::parse_bridges(bridges)
        .write_all_concatenated(out_dir(), env!("CARGO_PKG_NAME"));
}

fn build_android() {
    println!("cargo:rerun-if-changed={KOTLIN_FILE_RELATIVE_PATH}");

    let out_dir = out_dir();
    let kotlin_file = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("manifest dir"))
        .join(KOTLIN_FILE_RELATIVE_PATH);

    let android_jar_path = android_build::android_jar(None).expect("Failed to find android.jar");

    // .kt -> .class
    let classes_dir = out_dir.join("classes");
    std::fs::create_dir_all(&classes_dir).expect("Failed to create classes directory");

    let kotlinc_status = Command::new("kotlinc")
        .arg("-classpath")
        .arg(&android_jar_path)
        .arg("-d")
        .arg(&classes_dir)
        .arg(&kotlin_file)
        .status()
        .expect("Failed to run kotlinc - is Kotlin compiler installed?");

    assert!(kotlinc_status.success(), "kotlinc compilation failed");

    let package_dir = classes_dir.join("assetkit").join("picker");
    let class_files: Vec<PathBuf> = std::fs::read_dir(&package_dir)
        .expect("kotlinc produced no assetkit/picker package")
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "class"))
        .collect();

    let d8_jar_path = android_build::android_d8_jar(None).expect("Failed to find d8.jar");

    // .class -> classes.dex (the helper plus any synthetic lambda classes)
    let mut d8 = android_build::JavaRun::new();
    d8.class_path(d8_jar_path)
        .main_class("com.android.tools.r8.D8")
        .arg("--classpath")
        .arg(&android_jar_path)
        .arg("--output")
        .arg(&out_dir);
    for class_file in &class_files {
        d8.arg(class_file);
    }

    assert!(
        d8.run()
            .expect("failed to acquire exit status for java d8.jar invocation")
            .success(),
        "D8 dexing failed"
    );
}
