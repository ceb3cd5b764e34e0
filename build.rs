use std::process::Command;

const FALLBACK_VERSION: &str = "dev";

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
    println!("cargo:rerun-if-env-changed=GIT_VERSION");

    println!("cargo:rustc-env=GIT_VERSION={}", git_version());
}

/// `GIT_VERSION` from the environment (container and CI builds), then
/// `git describe`, then "dev".
fn git_version() -> String {
    std::env::var("GIT_VERSION")
        .ok()
        .filter(|version| !version.is_empty() && version != FALLBACK_VERSION)
        .or_else(describe)
        .unwrap_or_else(|| FALLBACK_VERSION.to_string())
}

fn describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!version.is_empty()).then_some(version)
}
