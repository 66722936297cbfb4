//! Report assembly and output generation
//!
//! Composes the scored categories, overall risk, predictions, and mitigation
//! plan into one immutable report, serializes it, and persists it.
//!
//! Global invariants enforced:
//! - The report is constructed once per run and never mutated afterwards
//! - Serialized output is deterministic except for the timestamp field
//!   (BTreeMap-keyed sections, stable orderings everywhere)

use crate::aggregate::OverallRisk;
use crate::category::Category;
use crate::config::{ResolvedConfig, Thresholds};
use crate::error::EngineError;
use crate::mitigate::MitigationStrategy;
use crate::predict::{Prediction, Timeframe, Trend};
use crate::score::CategoryRisk;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Input parameters the run was invoked with, echoed into the report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct RunParameters {
    pub project_path: String,
    pub analysis_period_days: u32,
    pub enabled_categories: Vec<Category>,
    pub thresholds: Thresholds,
}

impl RunParameters {
    pub fn from_config(config: &ResolvedConfig) -> Self {
        RunParameters {
            project_path: config.project_path.display().to_string(),
            analysis_period_days: config.analysis_period_days,
            enabled_categories: config.categories.clone(),
            thresholds: config.thresholds,
        }
    }
}

/// The root aggregate: everything one assessment run produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct RiskReport {
    pub generated_at: DateTime<Utc>,
    pub parameters: RunParameters,
    pub categories: BTreeMap<Category, CategoryRisk>,
    pub overall: OverallRisk,
    pub predictions: BTreeMap<Timeframe, BTreeMap<Category, Prediction>>,
    pub mitigations: Vec<MitigationStrategy>,
}

impl RiskReport {
    /// Compose a report from the pipeline outputs. Pure construction: no
    /// business logic beyond stamping the generation time.
    pub fn assemble(
        parameters: RunParameters,
        categories: BTreeMap<Category, CategoryRisk>,
        overall: OverallRisk,
        predictions: BTreeMap<Timeframe, BTreeMap<Category, Prediction>>,
        mitigations: Vec<MitigationStrategy>,
    ) -> Self {
        RiskReport {
            generated_at: Utc::now(),
            parameters,
            categories,
            overall,
            predictions,
            mitigations,
        }
    }

    /// Serialize to pretty JSON with a trailing newline.
    pub fn to_json(&self) -> Result<String, EngineError> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// The date-stamped filename this report persists under.
    pub fn file_name(&self) -> String {
        format!("risk-report-{}.json", self.generated_at.format("%Y-%m-%d"))
    }

    /// Write the report JSON into `output_dir`, creating the directory if
    /// needed. On failure the in-memory report is untouched and callers may
    /// retry persistence separately.
    pub fn write(&self, output_dir: &Path) -> Result<PathBuf, EngineError> {
        let json = self.to_json()?;

        std::fs::create_dir_all(output_dir).map_err(|source| EngineError::Persistence {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let path = output_dir.join(self.file_name());
        std::fs::write(&path, json).map_err(|source| EngineError::Persistence {
            path: path.clone(),
            source,
        })?;

        Ok(path)
    }
}

/// Render a report as fixed-width text for terminal display. Presentation
/// only; the JSON artifact is the machine contract.
pub fn render_text(report: &RiskReport) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Risk assessment for {} ({}-day window)\n\n",
        report.parameters.project_path, report.parameters.analysis_period_days
    ));

    out.push_str(&format!(
        "{:<14} {:<8} {:<10} {:<12} {:<8} {}\n",
        "CATEGORY", "SCORE", "LEVEL", "PROBABILITY", "IMPACT", "INDICATORS"
    ));
    for (category, risk) in &report.categories {
        out.push_str(&format!(
            "{:<14} {:<8.2} {:<10} {:<12.2} {:<8.2} {}\n",
            category.as_str(),
            risk.score,
            risk.level.as_str(),
            risk.probability,
            risk.impact,
            risk.indicators.len()
        ));
    }
    out.push_str(&format!(
        "\n{:<14} {:<8.2} {}\n",
        "OVERALL", report.overall.score, report.overall.level
    ));

    out.push_str(&format!(
        "\n{:<14} {:<18} {:<18} {}\n",
        "PREDICTIONS", "SHORT", "MEDIUM", "LONG"
    ));
    for category in report.categories.keys() {
        let mut row = format!("{:<14}", category.as_str());
        for timeframe in Timeframe::ALL {
            if let Some(p) = report
                .predictions
                .get(&timeframe)
                .and_then(|m| m.get(category))
            {
                let arrow = match p.trend {
                    Trend::Increasing => "up",
                    Trend::Stable => "steady",
                };
                row.push_str(&format!(
                    " {:<17}",
                    format!("{:.1} {} c{:.0}", p.score, arrow, p.confidence)
                ));
            }
        }
        row.push('\n');
        out.push_str(&row);
    }

    if !report.mitigations.is_empty() {
        out.push_str("\nMITIGATIONS\n");
        for strategy in &report.mitigations {
            out.push_str(&format!(
                "[{:?}] {}: {} (effort: {:?})\n",
                strategy.priority, strategy.category, strategy.text, strategy.effort
            ));
        }
    }

    out
}
