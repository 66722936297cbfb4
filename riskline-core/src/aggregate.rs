//! Overall risk aggregation
//!
//! Combines all category scores into one weighted overall score.
//!
//! Global invariants enforced:
//! - The overall score stays in [0,100]
//! - Normalization is by the total weight of the enabled categories only

use crate::category::{definition, Category};
use crate::config::Thresholds;
use crate::score::{assign_level, CategoryRisk, RiskLevel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Weighted overall project risk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct OverallRisk {
    pub score: f64,
    pub level: RiskLevel,
}

/// Aggregate category risks into the overall score.
///
/// `unknown`-level categories still contribute their (zero) score and their
/// weight: missing data pulls the overall score down instead of being
/// ignored, which surfaces data-quality gaps in the headline number.
pub fn aggregate(
    categories: &BTreeMap<Category, CategoryRisk>,
    thresholds: &Thresholds,
) -> OverallRisk {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for (category, risk) in categories {
        let weight = definition(*category).weight;
        weighted_sum += risk.score * weight;
        total_weight += weight;
    }

    let score = if total_weight > 0.0 {
        weighted_sum / total_weight
    } else {
        0.0
    };

    OverallRisk {
        score,
        level: assign_level(score, thresholds),
    }
}
