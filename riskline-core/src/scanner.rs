//! Source scanning collaborator
//!
//! Walks project files and exposes read-only access for the collectors.
//! The walk excludes VCS and build directories and honors the configured
//! include/exclude globs.
//!
//! Global invariants enforced:
//! - Deterministic file ordering (sorted paths)
//! - Read-only: the scanner never writes to the project

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Read-only view of a project's source files.
///
/// `read_file` failures are surfaced as `io::Error`; collectors catch them
/// and treat the affected factor as absent rather than failing the run.
/// Include/exclude globs from the configuration are applied by the
/// collectors, so they hold for stub scanners too.
pub trait SourceScanner: Sync {
    fn list_source_files(&self, root: &Path) -> Result<Vec<PathBuf>>;
    fn read_file(&self, path: &Path) -> std::io::Result<String>;
}

/// Filesystem-backed scanner.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsScanner;

impl SourceScanner for FsScanner {
    fn list_source_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        if root.is_file() {
            if is_supported_source_file(root) {
                files.push(root.to_path_buf());
            }
        } else if root.is_dir() {
            collect_recursive(root, &mut files)?;
        }

        // Sort files for deterministic order
        files.sort();
        Ok(files)
    }

    fn read_file(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Extensions the scanner considers source code.
const SOURCE_EXTENSIONS: &[&str] = &[
    "rs", "ts", "tsx", "js", "jsx", "go", "java", "py", "rb", "cs", "c", "h", "cpp", "hpp", "kt",
    "swift", "php", "ps1", "psm1", "sh",
];

/// Check if a file has a supported source extension
pub fn is_supported_source_file(path: &Path) -> bool {
    // Skip TypeScript declaration files (.d.ts)
    if path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".d.ts"))
    {
        return false;
    }

    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Heuristic test-file detection used by the coverage proxy.
pub fn is_test_file(path: &Path) -> bool {
    let path_str = path.to_string_lossy().replace('\\', "/");
    let lower = path_str.to_lowercase();
    lower.contains("/tests/")
        || lower.contains("/test/")
        || lower.contains("/__tests__/")
        || lower.contains(".test.")
        || lower.contains(".spec.")
        || path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|s| {
                let s = s.to_lowercase();
                s.starts_with("test_") || s.ends_with("_test") || s.ends_with("_tests")
            })
}

/// Returns true for directory names that should not be traversed
fn is_skipped_dir(name: &str) -> bool {
    name.starts_with('.')
        || name == "node_modules"
        || name == "dist"
        || name == "build"
        || name == "out"
        || name == "coverage"
        || name == "target"
        || name == "vendor"
}

/// Recursively collect supported source files from a directory
fn collect_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry_result in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry_result?;
        let path = entry.path();
        let metadata = std::fs::symlink_metadata(&path)
            .with_context(|| format!("failed to read metadata: {}", path.display()))?;

        if metadata.is_symlink() {
            continue;
        }

        if metadata.is_dir() {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if is_skipped_dir(name) {
                    continue;
                }
            }
            collect_recursive(&path, files)?;
        } else if metadata.is_file() && is_supported_source_file(&path) {
            files.push(path);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported_source_file(Path::new("src/main.rs")));
        assert!(is_supported_source_file(Path::new("lib/api.ts")));
        assert!(is_supported_source_file(Path::new("scripts/deploy.ps1")));
        assert!(!is_supported_source_file(Path::new("types.d.ts")));
        assert!(!is_supported_source_file(Path::new("README.md")));
        assert!(!is_supported_source_file(Path::new("Makefile")));
    }

    #[test]
    fn test_test_file_detection() {
        assert!(is_test_file(Path::new("src/api.test.ts")));
        assert!(is_test_file(Path::new("tests/integration.rs")));
        assert!(is_test_file(Path::new("pkg/__tests__/util.js")));
        assert!(is_test_file(Path::new("src/test_config.py")));
        assert!(is_test_file(Path::new("core/config_test.go")));
        assert!(!is_test_file(Path::new("src/api.rs")));
        assert!(!is_test_file(Path::new("src/contest.rs")));
    }

    #[test]
    fn test_walk_skips_build_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::create_dir_all(dir.path().join("target/debug")).unwrap();
        fs::write(dir.path().join("src/main.rs"), "fn main() {}\n").unwrap();
        fs::write(dir.path().join("node_modules/pkg/index.js"), "x\n").unwrap();
        fs::write(dir.path().join("target/debug/gen.rs"), "x\n").unwrap();

        let scanner = FsScanner;
        let files = scanner.list_source_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("src/main.rs"));
    }

    #[test]
    fn test_walk_is_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.rs"), "x\n").unwrap();
        fs::write(dir.path().join("a.rs"), "x\n").unwrap();
        fs::write(dir.path().join("c.py"), "x\n").unwrap();

        let scanner = FsScanner::default();
        let files = scanner.list_source_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.rs", "b.rs", "c.py"]);
    }

    #[test]
    fn test_single_file_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("only.rs");
        fs::write(&file, "fn only() {}\n").unwrap();

        let scanner = FsScanner::default();
        let files = scanner.list_source_files(&file).unwrap();
        assert_eq!(files, vec![file]);
    }
}
