//! Dependency audit collaborator
//!
//! Counts declared dependencies across the manifests present in a project.
//! Staleness and vulnerability counts require a registry query, which the
//! default offline auditor cannot perform; those fields are `None` and the
//! corresponding factors fall back to their documented defaults.

use serde_json::Value;
use std::path::{Path, PathBuf};

/// Result of one dependency audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyAudit {
    pub total: u64,
    pub outdated: Option<u64>,
    pub vulnerable: Option<u64>,
}

/// Dependency queries consumed by the collectors. Returns `None` when no
/// manifest can be found at all.
pub trait DependencyAuditor: Sync {
    fn audit(&self) -> Option<DependencyAudit>;
}

/// Offline auditor that counts declared dependencies in package.json,
/// Cargo.toml, and requirements.txt.
#[derive(Debug, Clone)]
pub struct ManifestAuditor {
    root: PathBuf,
}

impl ManifestAuditor {
    pub fn new(root: &Path) -> Self {
        ManifestAuditor {
            root: root.to_path_buf(),
        }
    }
}

impl DependencyAuditor for ManifestAuditor {
    fn audit(&self) -> Option<DependencyAudit> {
        let mut total: u64 = 0;
        let mut found_manifest = false;

        if let Some(count) = count_package_json(&self.root.join("package.json")) {
            found_manifest = true;
            total += count;
        }
        if let Some(count) = count_cargo_toml(&self.root.join("Cargo.toml")) {
            found_manifest = true;
            total += count;
        }
        if let Some(count) = count_requirements_txt(&self.root.join("requirements.txt")) {
            found_manifest = true;
            total += count;
        }

        if !found_manifest {
            return None;
        }

        Some(DependencyAudit {
            total,
            outdated: None,
            vulnerable: None,
        })
    }
}

/// Count entries under "dependencies" and "devDependencies".
fn count_package_json(path: &Path) -> Option<u64> {
    let content = std::fs::read_to_string(path).ok()?;
    let pkg: Value = serde_json::from_str(&content).ok()?;

    let mut count = 0u64;
    for key in ["dependencies", "devDependencies"] {
        if let Some(Value::Object(map)) = pkg.get(key) {
            count += map.len() as u64;
        }
    }
    Some(count)
}

/// Count `name = ...` entries inside dependency tables. Intentionally a line
/// parser, not a TOML parser: it only needs table membership, and dependency
/// tables in practice hold one entry per line.
fn count_cargo_toml(path: &Path) -> Option<u64> {
    let content = std::fs::read_to_string(path).ok()?;

    let mut count = 0u64;
    let mut in_deps_table = false;
    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            in_deps_table = line == "[dependencies]"
                || line == "[dev-dependencies]"
                || line == "[build-dependencies]"
                || line.starts_with("[dependencies.")
                || line.starts_with("[dev-dependencies.")
                || line.starts_with("[build-dependencies.");
            // A `[dependencies.foo]` header is itself one dependency
            if line.starts_with("[dependencies.")
                || line.starts_with("[dev-dependencies.")
                || line.starts_with("[build-dependencies.")
            {
                count += 1;
                in_deps_table = false;
            }
            continue;
        }
        if in_deps_table && !line.is_empty() && !line.starts_with('#') && line.contains('=') {
            count += 1;
        }
    }
    Some(count)
}

/// Count non-empty, non-comment requirement lines.
fn count_requirements_txt(path: &Path) -> Option<u64> {
    let content = std::fs::read_to_string(path).ok()?;
    Some(
        content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with('-'))
            .count() as u64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_no_manifest_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let auditor = ManifestAuditor::new(dir.path());
        assert_eq!(auditor.audit(), None);
    }

    #[test]
    fn test_package_json_counts_dev_and_runtime() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{
                "name": "demo",
                "dependencies": {"express": "^4.0.0", "pg": "^8.0.0"},
                "devDependencies": {"vitest": "^1.0.0"}
            }"#,
        )
        .unwrap();

        let audit = ManifestAuditor::new(dir.path()).audit().unwrap();
        assert_eq!(audit.total, 3);
        assert_eq!(audit.outdated, None);
        assert_eq!(audit.vulnerable, None);
    }

    #[test]
    fn test_cargo_toml_dependency_tables() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Cargo.toml"),
            "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n\n\
             [dependencies]\nserde = \"1\"\nanyhow = \"1\"\n\n\
             [dependencies.tokio]\nversion = \"1\"\nfeatures = [\"full\"]\n\n\
             [dev-dependencies]\ntempfile = \"3\"\n",
        )
        .unwrap();

        let audit = ManifestAuditor::new(dir.path()).audit().unwrap();
        assert_eq!(audit.total, 4);
    }

    #[test]
    fn test_requirements_txt_skips_comments_and_flags() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("requirements.txt"),
            "# pinned\nrequests==2.31.0\nflask>=2\n\n-r dev.txt\n",
        )
        .unwrap();

        let audit = ManifestAuditor::new(dir.path()).audit().unwrap();
        assert_eq!(audit.total, 2);
    }

    #[test]
    fn test_manifests_are_summed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"dependencies": {"a": "1"}}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("requirements.txt"),
            "b==1.0\n",
        )
        .unwrap();

        let audit = ManifestAuditor::new(dir.path()).audit().unwrap();
        assert_eq!(audit.total, 2);
    }
}
