// Injects CONTRUST_VERSION from `git describe`, falling back to the package version
// when git or tags are unavailable.

use std::process::Command;

fn main() {
    let pkg_version = env!("CARGO_PKG_VERSION");
    let version = describe_head()
        .map(|described| version_from_describe(pkg_version, &described))
        .unwrap_or_else(|| pkg_version.to_string());

    println!("cargo:rustc-env=CONTRUST_VERSION={}", version);
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/tags");
}

fn describe_head() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let described = String::from_utf8(output.stdout).ok()?;
    Some(described.trim().to_string())
}

/// "v1.2.0" -> "1.2.0", "v1.2.0-3-gabc" -> "1.2.0", "abc123" -> "<pkg>-abc123"
fn version_from_describe(pkg_version: &str, described: &str) -> String {
    match described.strip_prefix('v') {
        Some(tagged) => tagged.split('-').next().unwrap_or(tagged).to_string(),
        None => format!("{}-{}", pkg_version, described),
    }
}
