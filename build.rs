//! Build script for Grocery Ledger
//!
//! Increments build number on each recompilation and embeds build metadata.

use std::fs;
use std::path::Path;

fn main() {
    // Rebuild metadata only when sources change
    println!("cargo:rerun-if-changed=src");

    // Counter lives next to Cargo.toml
    let build_number_path = Path::new("build_number.txt");

    // Missing or unreadable counter starts from 0
    let current_build: u64 = if build_number_path.exists() {
        fs::read_to_string(build_number_path)
            .unwrap_or_else(|_| "0".to_string())
            .trim()
            .parse()
            .unwrap_or(0)
    } else {
        0
    };

    let new_build = current_build + 1;

    // Persist the bumped counter for the next build
    fs::write(build_number_path, new_build.to_string())
        .expect("Failed to write build number file");

    // UTC, second precision
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    // Read back through option_env! in build_info.rs
    println!("cargo:rustc-env=GROCERY_BUILD_NUMBER={}", new_build);
    println!("cargo:rustc-env=GROCERY_BUILD_TIMESTAMP={}", timestamp);
}
