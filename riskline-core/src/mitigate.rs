//! Mitigation planning
//!
//! Maps (category, level) pairs to ranked, effort-tagged recommendations.
//! Strategy texts live in the category registry; this module only decides
//! when to emit them and how to tag them.

use crate::category::{definition, Category};
use crate::score::{CategoryRisk, RiskLevel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effort {
    Low,
    Medium,
    High,
}

/// One recommended action for a category at elevated risk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct MitigationStrategy {
    pub category: Category,
    pub text: String,
    pub priority: Priority,
    pub effort: Effort,
}

/// Keyword rules for effort tagging, checked in order; the first match wins.
/// Deliberately crude: the tags describe the flavor of work, not a real
/// estimate, and tests assert the rule rather than second-guess it.
const EFFORT_RULES: &[(&[&str], Effort)] = &[
    (&["hire", "training", "cross-training"], Effort::High),
    (&["implement", "establish"], Effort::Medium),
];

/// Derive the effort tag for a strategy text.
pub fn effort_for(text: &str) -> Effort {
    let lower = text.to_lowercase();
    for (keywords, effort) in EFFORT_RULES {
        if keywords.iter().any(|k| lower.contains(k)) {
            return *effort;
        }
    }
    Effort::Low
}

/// Emit strategies for every category at medium or high level.
///
/// Ordering: high-priority strategies first, then category registry order,
/// then the registry's strategy order within a category.
pub fn advise(categories: &BTreeMap<Category, CategoryRisk>) -> Vec<MitigationStrategy> {
    let mut strategies = Vec::new();

    // Walk in registry order for a deterministic base ordering
    for category in Category::ALL {
        let Some(risk) = categories.get(&category) else {
            continue;
        };
        let priority = match risk.level {
            RiskLevel::High => Priority::High,
            RiskLevel::Medium => Priority::Medium,
            _ => continue,
        };

        for text in definition(category).mitigations {
            strategies.push(MitigationStrategy {
                category,
                text: (*text).to_string(),
                priority,
                effort: effort_for(text),
            });
        }
    }

    // Stable sort keeps category/registry order within each priority band
    strategies.sort_by_key(|s| match s.priority {
        Priority::High => 0,
        Priority::Medium => 1,
    });

    strategies
}
