//! Trend prediction
//!
//! Extrapolates each category's current score into short/medium/long-term
//! forecasts. This is a closed-form heuristic, not a statistical model:
//! identical inputs always produce identical predictions, and tests pin
//! exact values.

use crate::category::Category;
use crate::score::CategoryRisk;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prediction horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Short,
    Medium,
    Long,
}

impl Timeframe {
    pub const ALL: [Timeframe; 3] = [Timeframe::Short, Timeframe::Medium, Timeframe::Long];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Short => "short",
            Timeframe::Medium => "medium",
            Timeframe::Long => "long",
        }
    }

    /// Extrapolation multiplier applied to the current score.
    fn multiplier(&self) -> f64 {
        match self {
            Timeframe::Short => 1.1,
            Timeframe::Medium => 1.2,
            Timeframe::Long => 1.3,
        }
    }

    /// Score above which the trend reads `increasing` for this horizon.
    fn activation(&self) -> f64 {
        match self {
            Timeframe::Short => 70.0,
            Timeframe::Medium => 60.0,
            Timeframe::Long => 50.0,
        }
    }

    /// Confidence bonus: nearer horizons are more certain.
    fn confidence_bonus(&self) -> f64 {
        match self {
            Timeframe::Short => 20.0,
            Timeframe::Medium => 10.0,
            Timeframe::Long => 0.0,
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of the forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Stable,
}

/// Forecast for one category at one horizon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Prediction {
    pub score: f64,
    pub trend: Trend,
    pub confidence: f64,
}

/// Predict one category at one horizon.
pub fn predict(risk: &CategoryRisk, timeframe: Timeframe) -> Prediction {
    let score = (risk.score * timeframe.multiplier()).min(100.0);

    let trend = if risk.score > timeframe.activation() {
        Trend::Increasing
    } else {
        Trend::Stable
    };

    let indicator_count = risk.indicators.len();
    let mut confidence = 50.0 + timeframe.confidence_bonus();
    if indicator_count > 3 {
        confidence += 20.0;
    }
    if indicator_count > 5 {
        confidence += 10.0;
    }

    Prediction {
        score,
        trend,
        confidence: confidence.clamp(0.0, 95.0),
    }
}

/// Predict every category at every horizon, keyed timeframe-first to match
/// the report shape.
pub fn predict_all(
    categories: &BTreeMap<Category, CategoryRisk>,
) -> BTreeMap<Timeframe, BTreeMap<Category, Prediction>> {
    let mut out = BTreeMap::new();
    for timeframe in Timeframe::ALL {
        let per_category: BTreeMap<Category, Prediction> = categories
            .iter()
            .map(|(category, risk)| (*category, predict(risk, timeframe)))
            .collect();
        out.insert(timeframe, per_category);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::RiskLevel;

    fn risk_with(score: f64, indicator_count: usize) -> CategoryRisk {
        CategoryRisk {
            category: Category::Technical,
            score,
            level: RiskLevel::Medium,
            probability: score,
            impact: score,
            indicators: (0..indicator_count).map(|i| format!("indicator {i}")).collect(),
            defaulted_factors: Vec::new(),
        }
    }

    #[test]
    fn test_score_85_short_horizon() {
        let prediction = predict(&risk_with(85.0, 0), Timeframe::Short);
        assert_eq!(prediction.score, 93.5); // min(85 * 1.1, 100)
        assert_eq!(prediction.trend, Trend::Increasing); // 85 > 70
        assert_eq!(prediction.confidence, 70.0); // 50 + 20
    }

    #[test]
    fn test_prediction_is_capped_at_100() {
        let prediction = predict(&risk_with(95.0, 0), Timeframe::Long);
        assert_eq!(prediction.score, 100.0);
    }

    #[test]
    fn test_long_horizon_not_below_short() {
        for score in [0.0, 10.0, 42.5, 76.0, 100.0] {
            let risk = risk_with(score, 2);
            let short = predict(&risk, Timeframe::Short);
            let long = predict(&risk, Timeframe::Long);
            assert!(
                long.score >= short.score,
                "long < short at score {score}"
            );
        }
    }

    #[test]
    fn test_trend_activation_per_horizon() {
        let risk = risk_with(65.0, 0);
        assert_eq!(predict(&risk, Timeframe::Short).trend, Trend::Stable); // 65 <= 70
        assert_eq!(predict(&risk, Timeframe::Medium).trend, Trend::Increasing); // 65 > 60
        assert_eq!(predict(&risk, Timeframe::Long).trend, Trend::Increasing); // 65 > 50
    }

    #[test]
    fn test_activation_is_strict() {
        let risk = risk_with(70.0, 0);
        assert_eq!(predict(&risk, Timeframe::Short).trend, Trend::Stable);
    }

    #[test]
    fn test_confidence_steps_on_indicator_count() {
        // Long horizon has no bonus, isolating the indicator terms
        assert_eq!(predict(&risk_with(50.0, 0), Timeframe::Long).confidence, 50.0);
        assert_eq!(predict(&risk_with(50.0, 3), Timeframe::Long).confidence, 50.0);
        assert_eq!(predict(&risk_with(50.0, 4), Timeframe::Long).confidence, 70.0);
        assert_eq!(predict(&risk_with(50.0, 6), Timeframe::Long).confidence, 80.0);
    }

    #[test]
    fn test_confidence_is_clamped_to_95() {
        // 50 + 20 (indicators) + 10 (indicators) + 20 (short bonus) = 100
        let prediction = predict(&risk_with(50.0, 6), Timeframe::Short);
        assert_eq!(prediction.confidence, 95.0);
    }

    #[test]
    fn test_confidence_always_in_range() {
        for count in 0..10 {
            for timeframe in Timeframe::ALL {
                let c = predict(&risk_with(30.0, count), timeframe).confidence;
                assert!((0.0..=95.0).contains(&c));
            }
        }
    }

    #[test]
    fn test_unknown_category_predicts_zero_stable() {
        let risk = CategoryRisk {
            category: Category::Budget,
            score: 0.0,
            level: RiskLevel::Unknown,
            probability: 0.0,
            impact: 0.0,
            indicators: Vec::new(),
            defaulted_factors: Vec::new(),
        };
        let prediction = predict(&risk, Timeframe::Medium);
        assert_eq!(prediction.score, 0.0);
        assert_eq!(prediction.trend, Trend::Stable);
    }

    #[test]
    fn test_predict_all_covers_every_pair() {
        let mut categories = BTreeMap::new();
        categories.insert(Category::Technical, risk_with(40.0, 0));
        categories.insert(Category::Quality, risk_with(70.0, 1));

        let all = predict_all(&categories);
        assert_eq!(all.len(), 3);
        for timeframe in Timeframe::ALL {
            assert_eq!(all[&timeframe].len(), 2);
        }
    }
}
