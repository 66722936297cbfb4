//! Signal collectors - one per risk category
//!
//! Each collector queries the collaborators read-only and normalizes the
//! results into named factors on a 0-100 scale.
//!
//! Global invariants enforced:
//! - Collectors never raise: a missing collaborator yields the factor's
//!   documented neutral default; an I/O failure leaves the factor absent
//! - Collectors for different categories are independent and run in parallel
//! - Each collector writes only its own category's factor set

use crate::cancel::CancelToken;
use crate::category::Category;
use crate::config::ResolvedConfig;
use crate::deps::DependencyAuditor;
use crate::factor::FactorSet;
use crate::git::VcsHistory;
use crate::scanner::{is_test_file, SourceScanner};
use rayon::prelude::*;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Fixed linear scale turning commits-per-day into the velocity factor:
/// ten commits a day saturates the scale.
const VELOCITY_SCALE: f64 = 10.0;

/// Markers-per-file multiplier for the technical debt factor.
const DEBT_SCALE: f64 = 10.0;

/// Documented neutral defaults, per factor. Used when the signal's
/// collaborator is absent or the probe has no offline implementation;
/// recorded as `Defaulted` so reports can surface data-quality gaps.
const NEUTRAL_DEFAULTS: &[(&str, f64)] = &[
    ("complexity", 50.0),
    ("dependencies", 50.0),
    ("technical_debt", 50.0),
    ("architecture", 50.0),
    ("velocity", 50.0),
    ("deadlines", 50.0),
    ("scope_creep", 50.0),
    ("cost_variance", 50.0),
    ("timeline_overrun", 50.0),
    ("bug_density", 50.0),
    ("test_coverage", 50.0),
    ("code_review", 50.0),
    ("vulnerabilities", 50.0),
    ("access_control", 50.0),
    ("data_exposure", 50.0),
    ("deployment_frequency", 50.0),
    ("rollback_rate", 50.0),
    ("incident_count", 50.0),
    ("team_size", 50.0),
    ("knowledge_distribution", 50.0),
    ("turnover", 50.0),
];

/// The documented neutral default for a factor.
pub fn neutral_default(factor: &str) -> f64 {
    NEUTRAL_DEFAULTS
        .iter()
        .find(|(name, _)| *name == factor)
        .map(|(_, value)| *value)
        .unwrap_or(50.0)
}

fn default_factor(set: &mut FactorSet, factor: &str) {
    set.default_to(factor, neutral_default(factor));
}

/// Read-only collaborators the collectors query.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub scanner: &'a dyn SourceScanner,
    pub vcs: &'a dyn VcsHistory,
    pub deps: &'a dyn DependencyAuditor,
}

/// Branching/loop/exception keywords plus short-circuit operators: the
/// cyclomatic proxy counted per file.
fn branch_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\b(if|elif|elsif|for|foreach|while|until|match|switch|case|when|catch|except|rescue|loop)\b|&&|\|\|",
        )
        .unwrap()
    })
}

fn debt_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(TODO|FIXME|HACK|XXX)\b").unwrap())
}

/// Assignments of long quoted literals to secret-shaped names.
fn secret_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)(api[_-]?key|secret|password|passwd|token)\s*[:=]\s*["'][^"']{8,}["']"#)
            .unwrap()
    })
}

/// Run the collectors for all enabled categories in parallel and gather the
/// results keyed by category. Each collector owns its slot; the map is built
/// only after every collector has finished (or was abandoned by `cancel`).
pub fn collect_all(
    config: &ResolvedConfig,
    collab: &Collaborators<'_>,
    cancel: &CancelToken,
) -> BTreeMap<Category, FactorSet> {
    let pairs: Vec<(Category, FactorSet)> = config
        .categories
        .par_iter()
        .map(|&category| (category, collect_category(category, config, collab, cancel)))
        .collect();
    pairs.into_iter().collect()
}

/// Collect the factor set for one category. A cancelled run returns an empty
/// set, which the scorer degrades to `unknown`.
pub fn collect_category(
    category: Category,
    config: &ResolvedConfig,
    collab: &Collaborators<'_>,
    cancel: &CancelToken,
) -> FactorSet {
    if cancel.is_cancelled() {
        return FactorSet::new();
    }
    match category {
        Category::Technical => collect_technical(config, collab, cancel),
        Category::Schedule => collect_schedule(config, collab),
        Category::Budget => collect_budget(),
        Category::Quality => collect_quality(config, collab, cancel),
        Category::Security => collect_security(config, collab, cancel),
        Category::Operational => collect_operational(config, collab),
        Category::Resource => collect_resource(config, collab),
    }
}

/// List source files honoring the configured include/exclude globs.
/// `None` means the scan itself failed; scan-derived factors stay absent.
fn scan_files(config: &ResolvedConfig, collab: &Collaborators<'_>) -> Option<Vec<PathBuf>> {
    let files = collab
        .scanner
        .list_source_files(&config.project_path)
        .ok()?;
    Some(
        files
            .into_iter()
            .filter(|p| config.should_include(p))
            .collect(),
    )
}

/// Mean regex matches per readable file. `None` when no file could be read.
fn mean_matches_per_file(
    files: &[PathBuf],
    collab: &Collaborators<'_>,
    pattern: &Regex,
) -> Option<f64> {
    let mut total = 0usize;
    let mut readable = 0usize;
    for path in files {
        // Unreadable files are skipped, not fatal
        if let Ok(text) = collab.scanner.read_file(path) {
            total += pattern.find_iter(&text).count();
            readable += 1;
        }
    }
    (readable > 0).then(|| total as f64 / readable as f64)
}

fn collect_technical(
    config: &ResolvedConfig,
    collab: &Collaborators<'_>,
    cancel: &CancelToken,
) -> FactorSet {
    let mut set = FactorSet::new();

    if let Some(files) = scan_files(config, collab) {
        if let Some(mean) = mean_matches_per_file(&files, collab, branch_pattern()) {
            set.measure("complexity", mean);
        }
        if cancel.is_cancelled() {
            return set;
        }
        if let Some(mean) = mean_matches_per_file(&files, collab, debt_pattern()) {
            set.measure("technical_debt", mean * DEBT_SCALE);
        }
    }

    if cancel.is_cancelled() {
        return set;
    }

    match collab.deps.audit() {
        Some(audit) => match audit.outdated {
            Some(outdated) => {
                set.measure("dependencies", ratio(outdated, audit.total));
            }
            None => default_factor(&mut set, "dependencies"),
        },
        None => default_factor(&mut set, "dependencies"),
    }

    default_factor(&mut set, "architecture");
    set
}

fn collect_schedule(config: &ResolvedConfig, collab: &Collaborators<'_>) -> FactorSet {
    let mut set = FactorSet::new();
    let days = config.analysis_period_days;

    match collab.vcs.commit_count(days) {
        Some(commits) => {
            let per_day = commits as f64 / days as f64;
            set.measure("velocity", per_day * VELOCITY_SCALE);
        }
        None => default_factor(&mut set, "velocity"),
    }

    default_factor(&mut set, "deadlines");
    default_factor(&mut set, "scope_creep");
    set
}

fn collect_budget() -> FactorSet {
    // No offline probes exist for budget signals; both factors carry their
    // documented defaults so the category reports a data-quality gap rather
    // than a fabricated measurement.
    let mut set = FactorSet::new();
    default_factor(&mut set, "cost_variance");
    default_factor(&mut set, "timeline_overrun");
    set
}

fn collect_quality(
    config: &ResolvedConfig,
    collab: &Collaborators<'_>,
    cancel: &CancelToken,
) -> FactorSet {
    let mut set = FactorSet::new();
    let days = config.analysis_period_days;

    match (
        collab.vcs.commit_count(days),
        collab.vcs.fix_commit_count(days),
    ) {
        (Some(0), _) => set.measure("bug_density", 0.0),
        (Some(total), Some(fixes)) => set.measure("bug_density", ratio(fixes, total)),
        _ => default_factor(&mut set, "bug_density"),
    }

    if cancel.is_cancelled() {
        return set;
    }

    if let Some(files) = scan_files(config, collab) {
        if !files.is_empty() {
            let tests = files.iter().filter(|p| is_test_file(p)).count();
            let share = tests as f64 / files.len() as f64;
            // One test file per two source files counts as full coverage
            let coverage = (share * 2.0 * 100.0).min(100.0);
            set.measure("test_coverage", 100.0 - coverage);
        }
    }

    default_factor(&mut set, "code_review");
    set
}

fn collect_security(
    config: &ResolvedConfig,
    collab: &Collaborators<'_>,
    cancel: &CancelToken,
) -> FactorSet {
    let mut set = FactorSet::new();

    match collab.deps.audit() {
        Some(audit) => match audit.vulnerable {
            Some(vulnerable) => {
                set.measure("vulnerabilities", ratio(vulnerable, audit.total));
            }
            None => default_factor(&mut set, "vulnerabilities"),
        },
        None => default_factor(&mut set, "vulnerabilities"),
    }

    if cancel.is_cancelled() {
        return set;
    }

    if let Some(files) = scan_files(config, collab) {
        let mut flagged = 0usize;
        let mut readable = 0usize;
        for path in &files {
            if let Ok(text) = collab.scanner.read_file(path) {
                readable += 1;
                if secret_pattern().is_match(&text) {
                    flagged += 1;
                }
            }
        }
        if readable > 0 {
            set.measure("data_exposure", flagged as f64 / readable as f64 * 100.0);
        }
    }

    default_factor(&mut set, "access_control");
    set
}

fn collect_operational(config: &ResolvedConfig, collab: &Collaborators<'_>) -> FactorSet {
    let mut set = FactorSet::new();
    let days = config.analysis_period_days;

    match (
        collab.vcs.commit_count(days),
        collab.vcs.revert_commit_count(days),
    ) {
        (Some(0), _) => set.measure("rollback_rate", 0.0),
        (Some(total), Some(reverts)) => set.measure("rollback_rate", ratio(reverts, total)),
        _ => default_factor(&mut set, "rollback_rate"),
    }

    default_factor(&mut set, "deployment_frequency");
    default_factor(&mut set, "incident_count");
    set
}

fn collect_resource(config: &ResolvedConfig, collab: &Collaborators<'_>) -> FactorSet {
    let mut set = FactorSet::new();

    match collab.vcs.contributors(config.analysis_period_days) {
        Some(contributors) => {
            // Bus-factor risk: one contributor scores 75, four or more score 0
            let risk = 100.0 - 25.0 * contributors.len() as f64;
            set.measure("team_size", risk);
        }
        None => default_factor(&mut set, "team_size"),
    }

    default_factor(&mut set, "knowledge_distribution");
    default_factor(&mut set, "turnover");
    set
}

fn ratio(part: u64, total: u64) -> f64 {
    part as f64 / total.max(1) as f64 * 100.0
}
