//! VCS history collaborator
//!
//! Reads commit activity over the analysis window using the git CLI directly
//! (no libgit2) for portability.
//!
//! Global invariants enforced:
//! - Read-only queries; no repository mutation
//! - A missing or broken repository yields `None`, never an error — the
//!   affected factors degrade to their documented defaults

use std::path::{Path, PathBuf};
use std::process::Command;

/// One contributor observed in the analysis window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contributor {
    pub name: String,
    pub email: String,
}

/// Commit-history queries consumed by the collectors. Every query returns
/// `None` when no VCS is present.
pub trait VcsHistory: Sync {
    fn commit_count(&self, since_days: u32) -> Option<u64>;
    fn fix_commit_count(&self, since_days: u32) -> Option<u64>;
    fn revert_commit_count(&self, since_days: u32) -> Option<u64>;
    fn contributors(&self, since_days: u32) -> Option<Vec<Contributor>>;
}

/// Git-CLI-backed history reader rooted at a repository path.
#[derive(Debug, Clone)]
pub struct GitCli {
    repo_path: PathBuf,
}

impl GitCli {
    pub fn new(repo_path: &Path) -> Self {
        GitCli {
            repo_path: repo_path.to_path_buf(),
        }
    }

    /// Execute a git command in the repository and return the trimmed stdout.
    /// Any failure (git missing, not a repository, bad revision) is `None`.
    fn git(&self, args: &[&str]) -> Option<String> {
        let output = Command::new("git")
            .current_dir(&self.repo_path)
            .args(args)
            .output()
            .ok()?;

        if !output.status.success() {
            return None;
        }

        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn since(days: u32) -> String {
        format!("--since={days} days ago")
    }

    /// Count commits matching `git rev-list` with the given extra args.
    fn count_commits(&self, since_days: u32, extra: &[&str]) -> Option<u64> {
        let since = Self::since(since_days);
        let mut args = vec!["rev-list", "--count", "HEAD", since.as_str()];
        args.extend_from_slice(extra);
        self.git(&args)?.parse::<u64>().ok()
    }
}

impl VcsHistory for GitCli {
    fn commit_count(&self, since_days: u32) -> Option<u64> {
        self.count_commits(since_days, &[])
    }

    fn fix_commit_count(&self, since_days: u32) -> Option<u64> {
        self.count_commits(
            since_days,
            &[
                "--regexp-ignore-case",
                "--grep=fix",
                "--grep=bug",
                "--grep=patch",
            ],
        )
    }

    fn revert_commit_count(&self, since_days: u32) -> Option<u64> {
        self.count_commits(since_days, &["--regexp-ignore-case", "--grep=revert"])
    }

    fn contributors(&self, since_days: u32) -> Option<Vec<Contributor>> {
        let since = Self::since(since_days);
        let raw = self.git(&["log", since.as_str(), "--format=%aN|%aE"])?;

        // Deduplicate by email, preserving first-seen order
        let mut seen = std::collections::HashSet::new();
        let mut contributors = Vec::new();
        for line in raw.lines() {
            let (name, email) = line.split_once('|')?;
            if seen.insert(email.to_string()) {
                contributors.push(Contributor {
                    name: name.to_string(),
                    email: email.to_string(),
                });
            }
        }
        Some(contributors)
    }
}
