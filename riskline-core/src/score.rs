//! Category risk scoring
//!
//! Turns one category's factor set into a `CategoryRisk`: score, level,
//! probability, impact, and the indicators that fired.
//!
//! Global invariants enforced:
//! - Scores stay in [0,100]
//! - Level assignment is monotonic in the score
//! - An empty factor set degrades to `unknown`, never aborts the run

use crate::category::{definition, Category, CRITICAL_FACTORS};
use crate::config::Thresholds;
use crate::factor::FactorSet;
use serde::{Deserialize, Serialize};

/// Discrete risk tier derived from a score via thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskLevel {
    VeryLow,
    Low,
    Medium,
    High,
    /// Every factor for the category was absent; the score carries no signal.
    Unknown,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::VeryLow => "very-low",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assign a level from a score using the configured thresholds.
pub fn assign_level(score: f64, thresholds: &Thresholds) -> RiskLevel {
    if score >= thresholds.high {
        RiskLevel::High
    } else if score >= thresholds.medium {
        RiskLevel::Medium
    } else if score >= thresholds.low {
        RiskLevel::Low
    } else {
        RiskLevel::VeryLow
    }
}

/// Scored risk for one category. Created once per run, immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct CategoryRisk {
    pub category: Category,
    pub score: f64,
    pub level: RiskLevel,
    pub probability: f64,
    pub impact: f64,
    pub indicators: Vec<String>,
    /// Factors that carried their documented neutral default instead of a
    /// measurement; surfaces data-quality gaps to the report reader.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub defaulted_factors: Vec<String>,
}

/// Per-factor indicator rules: (factor, trigger threshold, message).
/// Rules fire on `value > threshold`; all firing rules are retained in the
/// category's declared factor order.
const INDICATOR_RULES: &[(&str, f64, &str)] = &[
    ("complexity", 15.0, "High code complexity detected"),
    ("dependencies", 40.0, "Outdated dependencies accumulating"),
    ("technical_debt", 60.0, "Technical debt markers accumulating"),
    ("velocity", 70.0, "High commit churn in analysis window"),
    ("bug_density", 30.0, "High share of fix commits"),
    ("test_coverage", 70.0, "Low test coverage"),
    ("vulnerabilities", 20.0, "Vulnerable dependencies present"),
    ("data_exposure", 30.0, "Possible hardcoded secrets detected"),
    ("rollback_rate", 20.0, "Frequent revert commits"),
    ("team_size", 60.0, "Low contributor count"),
];

fn indicators_for(category: Category, factors: &FactorSet) -> Vec<String> {
    let def = definition(category);
    let mut fired = Vec::new();
    // Evaluate in declared factor order so indicator order is deterministic
    for factor in def.factors {
        let Some(value) = factors.get(factor) else {
            continue;
        };
        for (name, threshold, message) in INDICATOR_RULES {
            if name == factor && value.value() > *threshold {
                fired.push((*message).to_string());
            }
        }
    }
    fired
}

/// Score one category from its collected factors.
///
/// The score is the mean of the factor values present; factors absent from
/// the set (collector failure) are excluded from the mean rather than
/// treated as zero. When every factor is absent the category degrades to
/// `score = 0, level = unknown`.
pub fn score_category(
    category: Category,
    factors: &FactorSet,
    thresholds: &Thresholds,
) -> CategoryRisk {
    let def = definition(category);

    let Some(score) = factors.mean_of(def.factors) else {
        return CategoryRisk {
            category,
            score: 0.0,
            level: RiskLevel::Unknown,
            probability: 0.0,
            impact: 0.0,
            indicators: Vec::new(),
            defaulted_factors: Vec::new(),
        };
    };

    // Probability is the mean of everything present; identical to the score
    // unless a collector produced factors outside the declared list.
    let probability = factors.mean().unwrap_or(score);

    // Impact is the mean of the critical factors present for this category;
    // categories without any critical factor inherit the score.
    let impact = factors.mean_of(CRITICAL_FACTORS).unwrap_or(score);

    CategoryRisk {
        category,
        score,
        level: assign_level(score, thresholds),
        probability,
        impact,
        indicators: indicators_for(category, factors),
        defaulted_factors: factors.defaulted_factors(),
    }
}
