//! Fraud alert heuristics over category records
//!
//! Global invariants enforced:
//! - Rules are evaluated independently per category (not mutually exclusive)
//! - Alerts are emitted in category scan order, then rule order
//! - No IO, no randomness; malformed numbers are evaluated, never rejected
//! - Messages never contain non-finite numbers

use crate::category::{format_amount, CategoryRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rule identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertRule {
    Overdraw,
    OverBudget,
    UnderUtilization,
}

impl AlertRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertRule::Overdraw => "overdraw",
            AlertRule::OverBudget => "over-budget",
            AlertRule::UnderUtilization => "under-utilization",
        }
    }

    pub fn severity(&self) -> AlertSeverity {
        match self {
            AlertRule::Overdraw => AlertSeverity::High,
            AlertRule::OverBudget => AlertSeverity::Medium,
            AlertRule::UnderUtilization => AlertSeverity::Low,
        }
    }

    pub fn confidence(&self) -> u8 {
        match self {
            AlertRule::Overdraw => 95,
            AlertRule::OverBudget => 88,
            AlertRule::UnderUtilization => 72,
        }
    }
}

/// Alert severity, ordered Low < Medium < High
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Low => "low",
            AlertSeverity::Medium => "medium",
            AlertSeverity::High => "high",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertSeverity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(AlertSeverity::Low),
            "medium" => Ok(AlertSeverity::Medium),
            "high" => Ok(AlertSeverity::High),
            other => anyhow::bail!("unknown severity: {} (expected low, medium or high)", other),
        }
    }
}

/// A triggered rule for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudAlert {
    pub category: String,
    pub rule: AlertRule,
    pub severity: AlertSeverity,
    pub message: String,
    pub confidence: u8,
}

impl FraudAlert {
    fn new(category: &CategoryRecord, rule: AlertRule, message: String) -> Self {
        FraudAlert {
            category: category.name.clone(),
            rule,
            severity: rule.severity(),
            message,
            confidence: rule.confidence(),
        }
    }
}

/// Configurable limits for the under-utilization rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertThresholds {
    /// Raised funds must exceed this before low utilization is flagged
    pub under_utilization_min_raised: f64,
    /// Utilization percentage (spent / raised) below which the rule fires
    pub under_utilization_percent: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        AlertThresholds {
            under_utilization_min_raised: 10_000.0,
            under_utilization_percent: 20.0,
        }
    }
}

/// Detect alerts with default thresholds
pub fn detect_fraud_alerts(categories: &[CategoryRecord]) -> Vec<FraudAlert> {
    detect_fraud_alerts_with_thresholds(categories, &AlertThresholds::default())
}

/// Detect alerts with custom thresholds
pub fn detect_fraud_alerts_with_thresholds(
    categories: &[CategoryRecord],
    thresholds: &AlertThresholds,
) -> Vec<FraudAlert> {
    let mut alerts = Vec::new();

    for cat in categories {
        if let Some(alert) = evaluate_overdraw(cat) {
            alerts.push(alert);
        }
        if let Some(alert) = evaluate_over_budget(cat) {
            alerts.push(alert);
        }
        if let Some(alert) = evaluate_under_utilization(cat, thresholds) {
            alerts.push(alert);
        }
    }

    tracing::debug!(
        categories = categories.len(),
        alerts = alerts.len(),
        "fraud heuristics evaluated"
    );

    alerts
}

/// Triggers when `spent > raised`
fn evaluate_overdraw(cat: &CategoryRecord) -> Option<FraudAlert> {
    let triggered = cat.spent > cat.raised;
    triggered.then(|| {
        let message = format!(
            "Spending ({}) exceeds funds raised ({})",
            format_amount(cat.spent),
            format_amount(cat.raised)
        );
        FraudAlert::new(cat, AlertRule::Overdraw, message)
    })
}

/// Triggers when `spent > amount`
///
/// With no positive budget the overage percentage is undefined; the alert still
/// fires and says so instead of reporting a percentage.
fn evaluate_over_budget(cat: &CategoryRecord) -> Option<FraudAlert> {
    let triggered = cat.spent > cat.amount;
    triggered.then(|| {
        // a subnormal budget overflows the ratio; report it like a missing budget
        let overage = (cat.spent / cat.amount - 1.0) * 100.0;
        let message = if cat.amount > 0.0 && overage.is_finite() {
            format!("Spending exceeds allocated budget by {:.1}%", overage)
        } else {
            format!(
                "Spending ({}) recorded against a category with no allocated budget",
                format_amount(cat.spent)
            )
        };
        FraudAlert::new(cat, AlertRule::OverBudget, message)
    })
}

/// Triggers when `raised > min_raised` and `spent / raised * 100 < percent`
fn evaluate_under_utilization(
    cat: &CategoryRecord,
    thresholds: &AlertThresholds,
) -> Option<FraudAlert> {
    // raised must be positive before the ratio is taken, whatever the minimum
    let triggered = cat.raised > 0.0
        && cat.raised > thresholds.under_utilization_min_raised
        && cat.spent / cat.raised * 100.0 < thresholds.under_utilization_percent;
    triggered.then(|| {
        let message =
            "Low fund utilization detected - consider reallocating resources".to_string();
        FraudAlert::new(cat, AlertRule::UnderUtilization, message)
    })
}

/// Keep alerts at or above `min_severity`, preserving order
pub fn filter_by_severity(alerts: Vec<FraudAlert>, min_severity: AlertSeverity) -> Vec<FraudAlert> {
    alerts
        .into_iter()
        .filter(|a| a.severity >= min_severity)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overdraw_alert() {
        let cats = vec![CategoryRecord::new("medical", 1000.0, 500.0, 600.0)];
        let alerts = detect_fraud_alerts(&cats);
        let overdraw = alerts
            .iter()
            .find(|a| a.rule == AlertRule::Overdraw)
            .expect("overdraw should fire");
        assert_eq!(overdraw.severity, AlertSeverity::High);
        assert_eq!(overdraw.confidence, 95);
        assert!(overdraw.message.contains("600"));
        assert!(overdraw.message.contains("500"));
        assert_eq!(overdraw.category, "medical");
    }

    #[test]
    fn test_over_budget_alert() {
        let cats = vec![CategoryRecord::new("food", 1000.0, 1000.0, 1200.0)];
        let alerts = detect_fraud_alerts(&cats);
        // spent > raised as well, so overdraw comes first
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].rule, AlertRule::Overdraw);
        let over = &alerts[1];
        assert_eq!(over.rule, AlertRule::OverBudget);
        assert_eq!(over.severity, AlertSeverity::Medium);
        assert_eq!(over.confidence, 88);
        assert!(over.message.contains("20.0%"), "got: {}", over.message);
    }

    #[test]
    fn test_under_utilization_alert() {
        let cats = vec![CategoryRecord::new("shelter", 50000.0, 15000.0, 1000.0)];
        let alerts = detect_fraud_alerts(&cats);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].rule, AlertRule::UnderUtilization);
        assert_eq!(alerts[0].severity, AlertSeverity::Low);
        assert_eq!(alerts[0].confidence, 72);
    }

    #[test]
    fn test_under_utilization_requires_raised_above_minimum() {
        let cats = vec![CategoryRecord::new("shelter", 50000.0, 5000.0, 100.0)];
        assert!(detect_fraud_alerts(&cats).is_empty());

        let at_limit = vec![CategoryRecord::new("shelter", 50000.0, 10000.0, 100.0)];
        assert!(detect_fraud_alerts(&at_limit).is_empty(), "threshold is exclusive");
    }

    #[test]
    fn test_rules_fire_independently() {
        let cats = vec![CategoryRecord::new("odd", -10.0, 20000.0, -5.0)];
        // spent (-5) <= raised, so only over-budget and under-utilization
        let alerts = detect_fraud_alerts(&cats);
        let rules: Vec<AlertRule> = alerts.iter().map(|a| a.rule).collect();
        assert_eq!(rules, vec![AlertRule::OverBudget, AlertRule::UnderUtilization]);
    }

    #[test]
    fn test_alerts_follow_scan_order() {
        let cats = vec![
            CategoryRecord::new("a", 100.0, 100.0, 50.0),
            CategoryRecord::new("b", 100.0, 50.0, 80.0),
            CategoryRecord::new("c", 100.0, 100.0, 150.0),
        ];
        let alerts = detect_fraud_alerts(&cats);
        let seq: Vec<(&str, AlertRule)> =
            alerts.iter().map(|a| (a.category.as_str(), a.rule)).collect();
        assert_eq!(
            seq,
            vec![
                ("b", AlertRule::Overdraw),
                ("c", AlertRule::Overdraw),
                ("c", AlertRule::OverBudget),
            ]
        );
    }

    #[test]
    fn test_zero_budget_overspend_has_finite_message() {
        let cats = vec![CategoryRecord::new("misc", 0.0, 100.0, 50.0)];
        let alerts = detect_fraud_alerts(&cats);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].rule, AlertRule::OverBudget);
        assert!(!alerts[0].message.contains("inf"));
        assert!(!alerts[0].message.contains("NaN"));
        assert!(alerts[0].message.contains("no allocated budget"));
    }

    #[test]
    fn test_subnormal_budget_overspend_has_finite_message() {
        let cats = vec![CategoryRecord::new("tiny", 1e-310, 2.0, 1.0)];
        let alerts = detect_fraud_alerts(&cats);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].rule, AlertRule::OverBudget);
        assert!(!alerts[0].message.contains("inf"), "{}", alerts[0].message);
        assert!(alerts[0].message.contains("no allocated budget"));
    }

    #[test]
    fn test_all_zero_category_is_quiet() {
        let cats = vec![CategoryRecord::new("empty", 0.0, 0.0, 0.0)];
        assert!(detect_fraud_alerts(&cats).is_empty());
    }

    #[test]
    fn test_custom_under_utilization_thresholds() {
        let thresholds = AlertThresholds {
            under_utilization_min_raised: 1000.0,
            under_utilization_percent: 50.0,
        };
        let cats = vec![CategoryRecord::new("water", 5000.0, 4000.0, 1500.0)];
        let alerts = detect_fraud_alerts_with_thresholds(&cats, &thresholds);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].rule, AlertRule::UnderUtilization);
        assert!(detect_fraud_alerts(&cats).is_empty());
    }

    #[test]
    fn test_filter_by_severity() {
        let cats = vec![
            CategoryRecord::new("a", 1000.0, 1000.0, 1200.0),
            CategoryRecord::new("b", 50000.0, 15000.0, 1000.0),
        ];
        let alerts = detect_fraud_alerts(&cats);
        assert_eq!(alerts.len(), 3);
        let medium_up = filter_by_severity(alerts.clone(), AlertSeverity::Medium);
        assert_eq!(medium_up.len(), 2);
        let high_only = filter_by_severity(alerts, AlertSeverity::High);
        assert_eq!(high_only.len(), 1);
        assert_eq!(high_only[0].rule, AlertRule::Overdraw);
    }

    #[test]
    fn test_severity_parse_and_order() {
        assert_eq!("HIGH".parse::<AlertSeverity>().unwrap(), AlertSeverity::High);
        assert!("urgent".parse::<AlertSeverity>().is_err());
        assert!(AlertSeverity::Low < AlertSeverity::Medium);
        assert!(AlertSeverity::Medium < AlertSeverity::High);
    }

    #[test]
    fn test_alert_serializes_with_lowercase_severity() {
        let cats = vec![CategoryRecord::new("medical", 1000.0, 500.0, 600.0)];
        let json = serde_json::to_value(&detect_fraud_alerts(&cats)[0]).unwrap();
        assert_eq!(json["severity"], "high");
        assert_eq!(json["rule"], "overdraw");
        assert_eq!(json["confidence"], 95);
    }
}
