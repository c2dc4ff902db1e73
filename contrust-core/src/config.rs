//! Configuration file support for Contrust
//!
//! Loads analysis thresholds and category filters from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.contrustrc.json` in project root
//! 3. `contrust.config.json` in project root
//! 4. `"contrust"` key in `package.json`
//!
//! All fields are optional. CLI flags take precedence over config file values.

use crate::alerts::{AlertSeverity, AlertThresholds};
use crate::recommendations::RecommendationThresholds;
use crate::success::SuccessThresholds;
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Contrust configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContrustConfig {
    /// Glob patterns over category names to leave out of the analysis
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Lowest alert severity to report (default: low)
    #[serde(default)]
    pub min_severity: Option<AlertSeverity>,

    /// Fraud alert thresholds
    #[serde(default)]
    pub alerts: Option<AlertConfig>,

    /// Recommendation rule ratios
    #[serde(default)]
    pub recommendations: Option<RecommendationConfig>,

    /// Success estimator pace bands
    #[serde(default)]
    pub success: Option<SuccessConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlertConfig {
    /// Raised funds above which low utilization is flagged (default: 10000)
    pub under_utilization_min_raised: Option<f64>,
    /// Utilization percentage below which the rule fires (default: 20)
    pub under_utilization_percent: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecommendationConfig {
    /// Raised / budget ratio for "performing well" (default: 0.8)
    pub performing_well_ratio: Option<f64>,
    /// Spent / raised ratio for an underutilized category (default: 0.3)
    pub underutilized_ratio: Option<f64>,
    /// Spent / raised ratio for accumulating funds (default: 0.5)
    pub accumulation_ratio: Option<f64>,
    /// Total raised required before accumulation is reported (default: 50000)
    pub accumulation_min_raised: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuccessConfig {
    /// Pace above which the bonus applies (default: 1.2)
    pub ahead_pace: Option<f64>,
    /// Pace below which the penalty applies (default: 0.8)
    pub behind_pace: Option<f64>,
    /// Fraction of target days counted as early (default: 0.25)
    pub early_window: Option<f64>,
    /// Funding percent needed for the early bonus (default: 50)
    pub early_min_progress: Option<f64>,
}

/// Resolved configuration with compiled glob patterns
#[derive(Debug)]
pub struct ResolvedConfig {
    /// Compiled category exclusions (None means keep every category)
    pub exclude: Option<GlobSet>,
    pub exclude_patterns: Vec<String>,
    pub min_severity: AlertSeverity,
    pub alerts: AlertThresholds,
    pub recommendations: RecommendationThresholds,
    pub success: SuccessThresholds,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

fn require_non_negative(name: &str, value: Option<f64>) -> Result<()> {
    if let Some(v) = value {
        if !v.is_finite() || v < 0.0 {
            anyhow::bail!("{} must be non-negative (got {})", name, v);
        }
    }
    Ok(())
}

fn require_fraction(name: &str, value: Option<f64>) -> Result<()> {
    if let Some(v) = value {
        if !(v > 0.0 && v <= 1.0) {
            anyhow::bail!("{} must be in (0, 1] (got {})", name, v);
        }
    }
    Ok(())
}

fn require_percent(name: &str, value: Option<f64>) -> Result<()> {
    if let Some(v) = value {
        if !(0.0..=100.0).contains(&v) {
            anyhow::bail!("{} must be between 0 and 100 (got {})", name, v);
        }
    }
    Ok(())
}

impl ContrustConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if let Some(ref a) = self.alerts {
            require_non_negative(
                "alerts.under_utilization_min_raised",
                a.under_utilization_min_raised,
            )?;
            require_percent(
                "alerts.under_utilization_percent",
                a.under_utilization_percent,
            )?;
        }

        if let Some(ref r) = self.recommendations {
            require_fraction(
                "recommendations.performing_well_ratio",
                r.performing_well_ratio,
            )?;
            require_fraction("recommendations.underutilized_ratio", r.underutilized_ratio)?;
            require_fraction("recommendations.accumulation_ratio", r.accumulation_ratio)?;
            require_non_negative(
                "recommendations.accumulation_min_raised",
                r.accumulation_min_raised,
            )?;
        }

        if let Some(ref s) = self.success {
            require_non_negative("success.ahead_pace", s.ahead_pace)?;
            require_non_negative("success.behind_pace", s.behind_pace)?;
            require_fraction("success.early_window", s.early_window)?;
            require_percent("success.early_min_progress", s.early_min_progress)?;

            let defaults = SuccessThresholds::default();
            let ahead = s.ahead_pace.unwrap_or(defaults.ahead_pace);
            let behind = s.behind_pace.unwrap_or(defaults.behind_pace);
            if behind >= ahead {
                anyhow::bail!(
                    "success.behind_pace ({}) must be less than success.ahead_pace ({})",
                    behind,
                    ahead
                );
            }
        }

        for pattern in &self.exclude {
            Glob::new(pattern).with_context(|| format!("invalid exclude pattern: {}", pattern))?;
        }

        Ok(())
    }

    /// Resolve config into compiled form ready for use
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let exclude = if self.exclude.is_empty() {
            None
        } else {
            let mut builder = GlobSetBuilder::new();
            for pattern in &self.exclude {
                builder.add(Glob::new(pattern)?);
            }
            Some(builder.build()?)
        };

        let alerts = {
            let d = AlertThresholds::default();
            match &self.alerts {
                Some(a) => AlertThresholds {
                    under_utilization_min_raised: a
                        .under_utilization_min_raised
                        .unwrap_or(d.under_utilization_min_raised),
                    under_utilization_percent: a
                        .under_utilization_percent
                        .unwrap_or(d.under_utilization_percent),
                },
                None => d,
            }
        };

        let recommendations = {
            let d = RecommendationThresholds::default();
            match &self.recommendations {
                Some(r) => RecommendationThresholds {
                    performing_well_ratio: r.performing_well_ratio.unwrap_or(d.performing_well_ratio),
                    underutilized_ratio: r.underutilized_ratio.unwrap_or(d.underutilized_ratio),
                    accumulation_ratio: r.accumulation_ratio.unwrap_or(d.accumulation_ratio),
                    accumulation_min_raised: r
                        .accumulation_min_raised
                        .unwrap_or(d.accumulation_min_raised),
                },
                None => d,
            }
        };

        let success = {
            let d = SuccessThresholds::default();
            match &self.success {
                Some(s) => SuccessThresholds {
                    ahead_pace: s.ahead_pace.unwrap_or(d.ahead_pace),
                    behind_pace: s.behind_pace.unwrap_or(d.behind_pace),
                    early_window: s.early_window.unwrap_or(d.early_window),
                    early_min_progress: s.early_min_progress.unwrap_or(d.early_min_progress),
                },
                None => d,
            }
        };

        Ok(ResolvedConfig {
            exclude,
            exclude_patterns: self.exclude.clone(),
            min_severity: self.min_severity.unwrap_or(AlertSeverity::Low),
            alerts,
            recommendations,
            success,
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Check if a category should be analyzed based on the exclude patterns
    pub fn should_include(&self, category_name: &str) -> bool {
        match self.exclude {
            Some(ref exclude) => !exclude.is_match(category_name),
            None => true,
        }
    }

    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        ContrustConfig::default().resolve()
    }
}

/// Dedicated config files, in lookup order
const CONFIG_FILE_NAMES: [&str; 2] = [".contrustrc.json", "contrust.config.json"];

/// Key that embeds Contrust settings in a `package.json`
const PACKAGE_JSON_KEY: &str = "contrust";

/// Discover and load a config file from the project root
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(project_root: &Path) -> Result<Option<(ContrustConfig, PathBuf)>> {
    let dedicated = CONFIG_FILE_NAMES
        .iter()
        .map(|name| project_root.join(name))
        .find(|path| path.exists());
    if let Some(path) = dedicated {
        return load_config_file(&path).map(|config| Some((config, path)));
    }

    let pkg_path = project_root.join("package.json");
    if !pkg_path.exists() {
        return Ok(None);
    }
    Ok(load_from_package_json(&pkg_path)?.map(|config| (config, pkg_path)))
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<ContrustConfig> {
    config_from_value(read_json(path)?, path)
}

/// Embedded settings under the `"contrust"` key, if the package declares any
fn load_from_package_json(path: &Path) -> Result<Option<ContrustConfig>> {
    let mut pkg = read_json(path)?;
    pkg.get_mut(PACKAGE_JSON_KEY)
        .map(serde_json::Value::take)
        .map(|value| config_from_value(value, path))
        .transpose()
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))
}

/// Deserialize and validate settings; `origin` names the file in errors
fn config_from_value(value: serde_json::Value, origin: &Path) -> Result<ContrustConfig> {
    let config: ContrustConfig = serde_json::from_value(value)
        .with_context(|| format!("invalid config in: {}", origin.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config in: {}", origin.display()))?;
    Ok(config)
}

/// Load and resolve config for a project
///
/// An explicit `config_path` wins over discovery; with neither, defaults apply.
pub fn load_and_resolve(project_root: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let loaded = match config_path {
        Some(path) => Some((load_config_file(path)?, path.to_path_buf())),
        None => discover_config(project_root)?,
    };

    let Some((config, source)) = loaded else {
        tracing::debug!("no config file found, using defaults");
        return ResolvedConfig::defaults();
    };

    let mut resolved = config
        .resolve()
        .with_context(|| format!("invalid config in: {}", source.display()))?;
    tracing::info!(path = %source.display(), "using configuration");
    resolved.config_path = Some(source);
    Ok(resolved)
}
