//! Build script for assetkit-fs.
//!
//! iOS targets get the swift-bridge glue for `src/sys/apple/mod.rs`.

use std::{env, path::PathBuf};

fn main() {
    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();

    if target_os == "ios" {
        let Ok(out_dir) = env::var("OUT_DIR").map(PathBuf::from) else {
            return;
        };

        let bridges = vec!["src/sys/apple/mod.rs"];
        for bridge in &bridges {
            println!("cargo:rerun-if-changed={bridge}");
        }

        swift_bridge_build::parse_bridges(bridges)
            .write_all_concatenated(out_dir, env!("CARGO_PKG_NAME"));
    }
}
