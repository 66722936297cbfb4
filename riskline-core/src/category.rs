//! Static risk category registry
//!
//! Global invariants enforced:
//! - The registry is immutable and process-wide
//! - Category is a closed enum, exhaustively matchable
//! - Registry order is the canonical category order everywhere

use serde::{Deserialize, Serialize};

/// Risk categories tracked by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Technical,
    Schedule,
    Budget,
    Quality,
    Security,
    Operational,
    Resource,
}

impl Category {
    /// All categories in registry order
    pub const ALL: [Category; 7] = [
        Category::Technical,
        Category::Schedule,
        Category::Budget,
        Category::Quality,
        Category::Security,
        Category::Operational,
        Category::Resource,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Technical => "technical",
            Category::Schedule => "schedule",
            Category::Budget => "budget",
            Category::Quality => "quality",
            Category::Security => "security",
            Category::Operational => "operational",
            Category::Resource => "resource",
        }
    }

    /// Parse a category name as written in config files and CLI flags
    pub fn from_name(name: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.as_str() == name)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable definition of one category: weight, declared factors, and the
/// mitigation strategy texts emitted when the category scores medium or high.
#[derive(Debug, Clone, Copy)]
pub struct CategoryDefinition {
    pub category: Category,
    /// Relative contribution to the overall score. Weights across enabled
    /// categories need not sum to 1; the aggregator normalizes.
    pub weight: f64,
    /// Factor names in collection and evaluation order.
    pub factors: &'static [&'static str],
    /// Mitigation strategies in emission order.
    pub mitigations: &'static [&'static str],
}

/// Factors whose mean forms the impact component of a category score.
pub const CRITICAL_FACTORS: &[&str] = &["complexity", "dependencies", "vulnerabilities", "team_size"];

/// The process-wide registry. Resolved once at compile time; the engine never
/// dispatches on category names at runtime.
pub const REGISTRY: [CategoryDefinition; 7] = [
    CategoryDefinition {
        category: Category::Technical,
        weight: 0.25,
        factors: &["complexity", "dependencies", "technical_debt", "architecture"],
        mitigations: &[
            "Refactor the most complex modules into smaller units",
            "Implement a dependency update cadence",
            "Establish an architecture review for new components",
        ],
    },
    CategoryDefinition {
        category: Category::Schedule,
        weight: 0.20,
        factors: &["velocity", "deadlines", "scope_creep"],
        mitigations: &[
            "Re-baseline the delivery plan against current velocity",
            "Establish a change-control gate for new scope",
        ],
    },
    CategoryDefinition {
        category: Category::Budget,
        weight: 0.15,
        factors: &["cost_variance", "timeline_overrun"],
        mitigations: &[
            "Review cost variance drivers with stakeholders",
            "Implement monthly budget checkpoints",
        ],
    },
    CategoryDefinition {
        category: Category::Quality,
        weight: 0.15,
        factors: &["bug_density", "test_coverage", "code_review"],
        mitigations: &[
            "Implement coverage gates in continuous integration",
            "Establish mandatory code review for all changes",
            "Schedule training on testing practices",
        ],
    },
    CategoryDefinition {
        category: Category::Security,
        weight: 0.10,
        factors: &["vulnerabilities", "access_control", "data_exposure"],
        mitigations: &[
            "Patch or replace vulnerable dependencies",
            "Implement secret scanning in the commit pipeline",
            "Establish periodic access reviews",
        ],
    },
    CategoryDefinition {
        category: Category::Operational,
        weight: 0.10,
        factors: &["deployment_frequency", "rollback_rate", "incident_count"],
        mitigations: &[
            "Implement automated rollback verification",
            "Establish an incident postmortem process",
        ],
    },
    CategoryDefinition {
        category: Category::Resource,
        weight: 0.05,
        factors: &["team_size", "knowledge_distribution", "turnover"],
        mitigations: &[
            "Hire to reduce single-owner modules",
            "Establish pairing rotations to spread knowledge",
            "Schedule cross-training on critical components",
        ],
    },
];

/// Look up the definition for a category. Infallible: the registry covers the
/// whole enum.
pub fn definition(category: Category) -> &'static CategoryDefinition {
    // REGISTRY is in Category::ALL order
    &REGISTRY[category as usize]
}
