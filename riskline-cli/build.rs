// Build script to inject version information from git tags
//
// Falls back to CARGO_PKG_VERSION when git is unavailable.

use std::process::Command;

fn main() {
    let version = get_git_version().unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=RISKLINE_VERSION={}", version);
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads");
    println!("cargo:rerun-if-changed=.git/refs/tags");
}

fn get_git_version() -> Option<String> {
    // Prefer tags: returns "v0.1.0", "v0.1.0-5-gabc123", or "abc123-dirty"
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let version = String::from_utf8(output.stdout).ok()?;
    let version = version.trim();

    if let Some(stripped) = version.strip_prefix('v') {
        // Clean tag or tag with suffix: keep the version part only
        match stripped.find('-') {
            Some(dash) => Some(stripped[..dash].to_string()),
            None => Some(stripped.to_string()),
        }
    } else {
        // Untagged: base version plus commit info
        Some(format!("{}-{}", env!("CARGO_PKG_VERSION"), version))
    }
}
