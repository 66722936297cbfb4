//! Configuration file support for Riskline
//!
//! Loads project-specific configuration from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.risklinerc.json` in project root
//! 3. `riskline.config.json` in project root
//!
//! All fields are optional. CLI flags take precedence over config file values.
//! Validation runs before any collection begins; an invalid configuration is
//! fatal (`EngineError::Configuration`).

use crate::category::Category;
use crate::error::EngineError;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Default analysis window in days.
pub const DEFAULT_PERIOD_DAYS: u32 = 30;

/// Default risk level thresholds against a 0-100 category score.
pub const DEFAULT_HIGH_THRESHOLD: f64 = 80.0;
pub const DEFAULT_MEDIUM_THRESHOLD: f64 = 60.0;
pub const DEFAULT_LOW_THRESHOLD: f64 = 40.0;

/// Default output directory for written reports, relative to the project root.
pub const DEFAULT_OUTPUT_DIR: &str = ".riskline";

/// Riskline configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Analysis window in days (default: 30, must be positive)
    #[serde(default)]
    pub analysis_period_days: Option<u32>,

    /// Category names to assess (default: all seven)
    #[serde(default)]
    pub categories: Vec<String>,

    /// Custom risk level thresholds
    #[serde(default)]
    pub thresholds: Option<ThresholdConfig>,

    /// Glob patterns for files the scanner should include (default: all
    /// supported extensions)
    #[serde(default)]
    pub include: Vec<String>,

    /// Glob patterns for files the scanner should exclude
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Directory reports are written to (default: `.riskline`)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

/// Custom risk level thresholds against a 0-100 score
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdConfig {
    /// Score threshold for high risk (default: 80)
    pub high: Option<f64>,
    /// Score threshold for medium risk (default: 60)
    pub medium: Option<f64>,
    /// Score threshold for low risk (default: 40)
    pub low: Option<f64>,
}

/// Resolved risk level thresholds, validated and ready for use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            high: DEFAULT_HIGH_THRESHOLD,
            medium: DEFAULT_MEDIUM_THRESHOLD,
            low: DEFAULT_LOW_THRESHOLD,
        }
    }
}

/// Resolved configuration with compiled glob patterns
#[derive(Debug)]
pub struct ResolvedConfig {
    /// Root of the project under assessment
    pub project_path: PathBuf,
    pub analysis_period_days: u32,
    /// Enabled categories, in registry order
    pub categories: Vec<Category>,
    pub thresholds: Thresholds,
    /// Compiled include patterns (empty means include all)
    pub include: Option<GlobSet>,
    /// Compiled exclude patterns
    pub exclude: GlobSet,
    pub output_dir: PathBuf,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl EngineConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<(), EngineError> {
        if let Some(days) = self.analysis_period_days {
            if days == 0 {
                return Err(EngineError::configuration(
                    "analysis_period_days",
                    "must be positive",
                ));
            }
        }

        for name in &self.categories {
            if Category::from_name(name).is_none() {
                return Err(EngineError::configuration(
                    "categories",
                    format!("unknown category name: {name}"),
                ));
            }
        }

        if let Some(ref t) = self.thresholds {
            let high = t.high.unwrap_or(DEFAULT_HIGH_THRESHOLD);
            let medium = t.medium.unwrap_or(DEFAULT_MEDIUM_THRESHOLD);
            let low = t.low.unwrap_or(DEFAULT_LOW_THRESHOLD);

            for (name, value) in [("high", high), ("medium", medium), ("low", low)] {
                if !(0.0..=100.0).contains(&value) {
                    return Err(EngineError::configuration(
                        "thresholds",
                        format!("{name} must be within [0,100] (got {value})"),
                    ));
                }
            }
            if low >= medium {
                return Err(EngineError::configuration(
                    "thresholds",
                    format!("low ({low}) must be less than medium ({medium})"),
                ));
            }
            if medium >= high {
                return Err(EngineError::configuration(
                    "thresholds",
                    format!("medium ({medium}) must be less than high ({high})"),
                ));
            }
        }

        for pattern in self.include.iter().chain(self.exclude.iter()) {
            if Glob::new(pattern).is_err() {
                return Err(EngineError::configuration(
                    "include/exclude",
                    format!("invalid glob pattern: {pattern}"),
                ));
            }
        }

        Ok(())
    }

    /// Resolve config into compiled form ready for use
    pub fn resolve(&self, project_path: &Path) -> Result<ResolvedConfig, EngineError> {
        self.validate()?;

        let categories = if self.categories.is_empty() {
            Category::ALL.to_vec()
        } else {
            // Deduplicate, then restore registry order
            let named: BTreeSet<Category> = self
                .categories
                .iter()
                .filter_map(|n| Category::from_name(n))
                .collect();
            Category::ALL
                .iter()
                .copied()
                .filter(|c| named.contains(c))
                .collect()
        };

        let include = if self.include.is_empty() {
            None
        } else {
            Some(compile_globs(&self.include)?)
        };
        let exclude = compile_globs(&self.exclude)?;

        let thresholds = match &self.thresholds {
            Some(t) => Thresholds {
                high: t.high.unwrap_or(DEFAULT_HIGH_THRESHOLD),
                medium: t.medium.unwrap_or(DEFAULT_MEDIUM_THRESHOLD),
                low: t.low.unwrap_or(DEFAULT_LOW_THRESHOLD),
            },
            None => Thresholds::default(),
        };

        Ok(ResolvedConfig {
            project_path: project_path.to_path_buf(),
            analysis_period_days: self.analysis_period_days.unwrap_or(DEFAULT_PERIOD_DAYS),
            categories,
            thresholds,
            include,
            exclude,
            output_dir: self
                .output_dir
                .clone()
                .unwrap_or_else(|| project_path.join(DEFAULT_OUTPUT_DIR)),
            config_path: None,
        })
    }
}

fn compile_globs(patterns: &[String]) -> Result<GlobSet, EngineError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| {
            EngineError::configuration("include/exclude", format!("invalid glob {pattern}: {e}"))
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| EngineError::configuration("include/exclude", e.to_string()))
}

impl ResolvedConfig {
    /// Check if a file path should be scanned based on include/exclude patterns
    pub fn should_include(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        if self.exclude.is_match(path_str.as_ref()) {
            return false;
        }

        if let Some(ref include) = self.include {
            return include.is_match(path_str.as_ref());
        }

        true
    }

    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults(project_path: &Path) -> Result<Self, EngineError> {
        EngineConfig::default().resolve(project_path)
    }
}

/// Discover and load a config file from the project root
///
/// Search order:
/// 1. `.risklinerc.json`
/// 2. `riskline.config.json`
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(project_root: &Path) -> Result<Option<(EngineConfig, PathBuf)>, EngineError> {
    for name in [".risklinerc.json", "riskline.config.json"] {
        let path = project_root.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }
    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<EngineConfig, EngineError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        EngineError::configuration("config", format!("failed to read {}: {e}", path.display()))
    })?;

    let config: EngineConfig = serde_json::from_str(&content).map_err(|e| {
        EngineError::configuration("config", format!("failed to parse {}: {e}", path.display()))
    })?;

    config.validate()?;
    Ok(config)
}

/// Load and resolve config for a project
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config from the project root.
/// Returns default config if nothing is found.
pub fn load_and_resolve(
    project_root: &Path,
    config_path: Option<&Path>,
) -> Result<ResolvedConfig, EngineError> {
    let (config, source_path) = if let Some(path) = config_path {
        (load_config_file(path)?, Some(path.to_path_buf()))
    } else {
        match discover_config(project_root)? {
            Some((config, path)) => (config, Some(path)),
            None => (EngineConfig::default(), None),
        }
    };

    let mut resolved = config.resolve(project_root)?;
    resolved.config_path = source_path;
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        config.validate().expect("default config should be valid");
        let resolved = config.resolve(Path::new("/tmp/project")).unwrap();
        assert_eq!(resolved.analysis_period_days, 30);
        assert_eq!(resolved.categories, Category::ALL.to_vec());
        assert_eq!(resolved.thresholds, Thresholds::default());
        assert!(resolved.include.is_none());
        assert_eq!(resolved.output_dir, Path::new("/tmp/project/.riskline"));
    }

    #[test]
    fn test_parse_minimal_config() {
        let json = r#"{}"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "analysis_period_days": 14,
            "categories": ["technical", "quality"],
            "thresholds": {"high": 85.0, "medium": 55.0, "low": 25.0},
            "include": ["src/**/*.rs"],
            "exclude": ["**/generated/**"],
            "output_dir": "reports"
        }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        config.validate().unwrap();
        let resolved = config.resolve(Path::new("/p")).unwrap();
        assert_eq!(resolved.analysis_period_days, 14);
        assert_eq!(
            resolved.categories,
            vec![Category::Technical, Category::Quality]
        );
        assert_eq!(resolved.thresholds.high, 85.0);
        assert_eq!(resolved.thresholds.low, 25.0);
        assert!(resolved.include.is_some());
        assert_eq!(resolved.output_dir, Path::new("reports"));
    }

    #[test]
    fn test_reject_unknown_fields() {
        let json = r#"{"unknown_field": true}"#;
        let result: Result<EngineConfig, _> = serde_json::from_str(json);
        assert!(result.is_err(), "unknown fields should be rejected");
    }

    #[test]
    fn test_reject_zero_period() {
        let json = r#"{"analysis_period_days": 0}"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_unknown_category() {
        let json = r#"{"categories": ["technical", "cosmic"]}"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_unordered_thresholds() {
        let json = r#"{"thresholds": {"high": 50.0, "medium": 60.0, "low": 40.0}}"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_threshold_out_of_range() {
        let json = r#"{"thresholds": {"high": 120.0}}"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_invalid_glob_pattern() {
        let json = r#"{"include": ["[invalid"]}"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_thresholds_use_defaults_for_rest() {
        let json = r#"{"thresholds": {"high": 90.0}}"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        let resolved = config.resolve(Path::new("/p")).unwrap();
        assert_eq!(resolved.thresholds.high, 90.0);
        assert_eq!(resolved.thresholds.medium, 60.0); // default
        assert_eq!(resolved.thresholds.low, 40.0); // default
    }

    #[test]
    fn test_categories_deduplicated_in_registry_order() {
        let json = r#"{"categories": ["quality", "technical", "quality"]}"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        let resolved = config.resolve(Path::new("/p")).unwrap();
        assert_eq!(
            resolved.categories,
            vec![Category::Technical, Category::Quality]
        );
    }

    #[test]
    fn test_should_include_custom_patterns() {
        let config: EngineConfig = serde_json::from_str(
            r#"{
            "include": ["src/**/*.rs"],
            "exclude": ["src/generated/**"]
        }"#,
        )
        .unwrap();
        let resolved = config.resolve(Path::new("/p")).unwrap();
        assert!(resolved.should_include(Path::new("src/api.rs")));
        assert!(!resolved.should_include(Path::new("lib/util.rs")));
        assert!(!resolved.should_include(Path::new("src/generated/types.rs")));
    }

    #[test]
    fn test_discover_risklinerc() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(".risklinerc.json");
        fs::write(&config_path, r#"{"analysis_period_days": 7}"#).unwrap();

        let result = discover_config(dir.path()).unwrap();
        let (config, path) = result.unwrap();
        assert_eq!(config.analysis_period_days, Some(7));
        assert_eq!(path, config_path);
    }

    #[test]
    fn test_discover_priority_order() {
        let dir = tempfile::tempdir().unwrap();

        // Create both config files - .risklinerc.json should win
        fs::write(
            dir.path().join(".risklinerc.json"),
            r#"{"analysis_period_days": 1}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("riskline.config.json"),
            r#"{"analysis_period_days": 2}"#,
        )
        .unwrap();

        let (config, _) = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(
            config.analysis_period_days,
            Some(1),
            ".risklinerc.json should take priority"
        );
    }

    #[test]
    fn test_no_config_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let result = discover_config(dir.path()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_load_and_resolve_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("custom.json");
        fs::write(&config_path, r#"{"analysis_period_days": 90}"#).unwrap();

        let resolved = load_and_resolve(dir.path(), Some(&config_path)).unwrap();
        assert_eq!(resolved.analysis_period_days, 90);
        assert_eq!(resolved.config_path, Some(config_path));
    }
}
