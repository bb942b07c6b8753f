//! Build identification for widget-ap
//!
//! Exposes to the binary: `GIT_HASH` (with a `-dirty` suffix for
//! uncommitted changes), `BUILD_TIMESTAMP`, `BUILD_PROFILE` and
//! `BUILD_TARGET`. The startup log line carries all four so a capture from
//! a widget test bench can be matched to the exact player build.

use std::env;
use std::process::Command;

/// Run git in the package directory; `None` when git is absent or fails
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}

fn describe_revision() -> String {
    let Some(hash) = git(&["rev-parse", "--short=8", "HEAD"]) else {
        return "unknown".to_string();
    };
    let dirty = git(&["status", "--porcelain", "--untracked-files=no"])
        .map(|status| !status.is_empty())
        .unwrap_or(false);

    if dirty {
        format!("{}-dirty", hash)
    } else {
        hash
    }
}

fn main() {
    let env_or_unknown = |key: &str| env::var(key).unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=GIT_HASH={}", describe_revision());
    println!(
        "cargo:rustc-env=BUILD_TIMESTAMP={}",
        chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    );
    println!("cargo:rustc-env=BUILD_PROFILE={}", env_or_unknown("PROFILE"));
    println!("cargo:rustc-env=BUILD_TARGET={}", env_or_unknown("TARGET"));

    // Re-run when the checked-out commit moves, not on every build
    if let Some(head) = git(&["rev-parse", "--git-path", "HEAD"]) {
        println!("cargo:rerun-if-changed={}", head);
    }
    if let Some(index) = git(&["rev-parse", "--git-path", "index"]) {
        println!("cargo:rerun-if-changed={}", index);
    }
    println!("cargo:rerun-if-changed=build.rs");
}
