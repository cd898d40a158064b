//! Build script for build metadata.
//!
//! Sets environment variables consumed by `src/build_info.rs`:
//! - `SEDB_GIT_HASH` - Short git commit hash
//! - `SEDB_BUILD_TIMESTAMP` - Build timestamp (RFC 3339)

use std::process::Command;

fn main() {
    let git_hash = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    let git_dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| !o.stdout.is_empty())
        .unwrap_or(false);

    let git_hash_full = if git_dirty {
        format!("{}-dirty", git_hash)
    } else {
        git_hash
    };

    let build_timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

    println!("cargo:rustc-env=SEDB_GIT_HASH={}", git_hash_full);
    println!("cargo:rustc-env=SEDB_BUILD_TIMESTAMP={}", build_timestamp);

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
}
