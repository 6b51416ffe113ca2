//! Build script for the Concentrator
//!
//! Stamps the binaries with their compile time and cargo profile. Nothing is
//! written back into the source tree.

fn main() {
    println!("cargo:rerun-if-changed=src");

    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=CONCENTRATOR_BUILD_TIMESTAMP={}", timestamp);
    println!("cargo:rustc-env=CONCENTRATOR_BUILD_PROFILE={}", profile);
}
