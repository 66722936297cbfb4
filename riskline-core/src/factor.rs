//! Factor sets - normalized 0-100 signals produced by collectors
//!
//! Global invariants enforced:
//! - Every stored value lies in [0,100] (clamped at insertion)
//! - Measured and defaulted values are distinguishable
//! - Iteration order is deterministic (sorted by factor name)

use std::collections::BTreeMap;

/// A single factor value. `Defaulted` carries the documented neutral value
/// used when the signal could not be measured (collaborator absent or the
/// probe is not implemented for this environment). A factor missing from the
/// set entirely means the collector failed; such factors are excluded from
/// means rather than treated as zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FactorValue {
    Measured(f64),
    Defaulted(f64),
}

impl FactorValue {
    pub fn value(&self) -> f64 {
        match self {
            FactorValue::Measured(v) | FactorValue::Defaulted(v) => *v,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, FactorValue::Defaulted(_))
    }
}

/// Mapping from factor name to value for one category, produced fresh per
/// analysis run and owned by its collector until handed to the scorer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactorSet {
    values: BTreeMap<String, FactorValue>,
}

fn clamp(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

impl FactorSet {
    pub fn new() -> Self {
        FactorSet::default()
    }

    /// Record a measured value, clamped to [0,100].
    pub fn measure(&mut self, factor: &str, value: f64) {
        self.values
            .insert(factor.to_string(), FactorValue::Measured(clamp(value)));
    }

    /// Record the documented neutral default for a factor that could not be
    /// measured, clamped to [0,100].
    pub fn default_to(&mut self, factor: &str, value: f64) {
        self.values
            .insert(factor.to_string(), FactorValue::Defaulted(clamp(value)));
    }

    pub fn get(&self, factor: &str) -> Option<FactorValue> {
        self.values.get(factor).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Factor names that carry a defaulted value, in sorted order.
    pub fn defaulted_factors(&self) -> Vec<String> {
        self.values
            .iter()
            .filter(|(_, v)| v.is_defaulted())
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Mean of all values present in the set. Returns `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        let sum: f64 = self.values.values().map(|v| v.value()).sum();
        Some(sum / self.values.len() as f64)
    }

    /// Mean of the values present for the given factor names. Absent factors
    /// are excluded from the mean, not treated as zero. Returns `None` when
    /// no named factor is present.
    pub fn mean_of(&self, factors: &[&str]) -> Option<f64> {
        let present: Vec<f64> = factors
            .iter()
            .filter_map(|f| self.values.get(*f))
            .map(|v| v.value())
            .collect();
        if present.is_empty() {
            None
        } else {
            Some(present.iter().sum::<f64>() / present.len() as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_are_clamped() {
        let mut set = FactorSet::new();
        set.measure("complexity", 250.0);
        set.measure("dependencies", -10.0);
        assert_eq!(set.get("complexity").unwrap().value(), 100.0);
        assert_eq!(set.get("dependencies").unwrap().value(), 0.0);
    }

    #[test]
    fn test_defaulted_is_distinguishable() {
        let mut set = FactorSet::new();
        set.measure("complexity", 40.0);
        set.default_to("architecture", 50.0);
        assert!(!set.get("complexity").unwrap().is_defaulted());
        assert!(set.get("architecture").unwrap().is_defaulted());
        assert_eq!(set.defaulted_factors(), vec!["architecture".to_string()]);
    }

    #[test]
    fn test_mean_excludes_absent_factors() {
        let mut set = FactorSet::new();
        set.measure("complexity", 90.0);
        set.measure("dependencies", 10.0);
        // Two of four declared factors present
        let mean = set
            .mean_of(&["complexity", "dependencies", "technical_debt", "architecture"])
            .unwrap();
        assert_eq!(mean, 50.0);
    }

    #[test]
    fn test_mean_of_empty_set_is_none() {
        let set = FactorSet::new();
        assert_eq!(set.mean_of(&["complexity"]), None);
    }

    #[test]
    fn test_defaulted_values_count_toward_mean() {
        let mut set = FactorSet::new();
        set.measure("bug_density", 20.0);
        set.default_to("code_review", 50.0);
        let mean = set.mean_of(&["bug_density", "code_review"]).unwrap();
        assert_eq!(mean, 35.0);
    }
}
