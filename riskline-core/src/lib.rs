//! Riskline core library - multi-factor project risk scoring and prediction
//!
//! The engine collects normalized 0-100 risk factors per category, scores
//! each category, aggregates a weighted overall score, extrapolates
//! short/medium/long-term predictions, and plans mitigations. The result is
//! one immutable report per run.

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Data flows strictly downstream: collect -> score -> aggregate ->
//   predict/mitigate -> assemble; no stage reaches back upstream
// - No cross-run shared mutable state: every run builds a fresh report
// - Deterministic output: identical inputs yield identical reports except
//   for the timestamp field
// - Collector failure degrades the affected category only; a run either
//   produces a complete report or fails with a configuration or
//   persistence error

pub mod aggregate;
pub mod cancel;
pub mod category;
pub mod collect;
pub mod config;
pub mod deps;
pub mod error;
pub mod factor;
pub mod git;
pub mod mitigate;
pub mod predict;
pub mod report;
pub mod scanner;
pub mod score;

pub use cancel::CancelToken;
pub use category::Category;
pub use collect::Collaborators;
pub use config::{load_and_resolve, EngineConfig, ResolvedConfig, Thresholds};
pub use error::EngineError;
pub use report::{render_text, RiskReport, RunParameters};
pub use score::{CategoryRisk, RiskLevel};

use crate::deps::ManifestAuditor;
use crate::git::GitCli;
use crate::scanner::FsScanner;
use std::collections::BTreeMap;

/// Run one assessment: collect, score, aggregate, predict, advise, assemble.
///
/// Collectors for the enabled categories run in parallel; a failing or
/// cancelled collector degrades its own category to `unknown` without
/// affecting siblings. The returned report is complete and immutable;
/// persisting it is the caller's separate step (see [`RiskReport::write`]),
/// so a persistence failure never loses the computed report.
pub fn assess(
    config: &ResolvedConfig,
    collab: &Collaborators<'_>,
    cancel: &CancelToken,
) -> Result<RiskReport, EngineError> {
    if config.categories.is_empty() {
        return Err(EngineError::configuration(
            "categories",
            "no categories enabled",
        ));
    }

    let factor_sets = collect::collect_all(config, collab, cancel);

    let categories: BTreeMap<Category, CategoryRisk> = factor_sets
        .iter()
        .map(|(category, factors)| {
            (
                *category,
                score::score_category(*category, factors, &config.thresholds),
            )
        })
        .collect();

    let overall = aggregate::aggregate(&categories, &config.thresholds);
    let predictions = predict::predict_all(&categories);
    let mitigations = mitigate::advise(&categories);

    Ok(RiskReport::assemble(
        RunParameters::from_config(config),
        categories,
        overall,
        predictions,
        mitigations,
    ))
}

/// Owning bundle of the default collaborators for a local project: a
/// filesystem scanner, a git-CLI history reader, and an offline manifest
/// auditor.
pub struct LocalCollaborators {
    scanner: FsScanner,
    vcs: GitCli,
    deps: ManifestAuditor,
}

impl LocalCollaborators {
    pub fn new(config: &ResolvedConfig) -> Self {
        LocalCollaborators {
            scanner: FsScanner,
            vcs: GitCli::new(&config.project_path),
            deps: ManifestAuditor::new(&config.project_path),
        }
    }

    pub fn as_collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            scanner: &self.scanner,
            vcs: &self.vcs,
            deps: &self.deps,
        }
    }
}

/// Assess a local project with the default collaborators.
pub fn assess_local(
    config: &ResolvedConfig,
    cancel: &CancelToken,
) -> Result<RiskReport, EngineError> {
    let local = LocalCollaborators::new(config);
    assess(config, &local.as_collaborators(), cancel)
}
