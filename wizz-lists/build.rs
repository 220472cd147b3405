//! Stamps the binary with its source revision and build time
//!
//! Emits `WIZZ_GIT_REV`, `WIZZ_BUILD_TIME` and `WIZZ_BUILD_PROFILE`, read by
//! `wizz_lists::build_info`. Builds outside a checkout (release tarballs,
//! container images) may pass `WIZZ_GIT_REV` in the environment instead.

use std::process::Command;

const REV_OVERRIDE: &str = "WIZZ_GIT_REV";

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn main() {
    println!("cargo:rerun-if-env-changed={}", REV_OVERRIDE);

    let rev = std::env::var(REV_OVERRIDE)
        .ok()
        .filter(|rev| !rev.trim().is_empty())
        .or_else(|| git(&["describe", "--always", "--dirty", "--abbrev=8"]))
        .unwrap_or_else(|| "unknown".to_string());

    // Re-stamp when HEAD, the index or the sources change
    if let Some(git_dir) = git(&["rev-parse", "--git-dir"]) {
        println!("cargo:rerun-if-changed={}/HEAD", git_dir);
        println!("cargo:rerun-if-changed={}/index", git_dir);
    }
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=Cargo.toml");

    let built_at = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=WIZZ_GIT_REV={}", rev);
    println!("cargo:rustc-env=WIZZ_BUILD_TIME={}", built_at);
    println!("cargo:rustc-env=WIZZ_BUILD_PROFILE={}", profile);
}
