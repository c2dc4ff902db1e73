//! Campaign reports and output rendering
//!
//! Global invariants enforced:
//! - Deterministic output ordering
//! - Byte-for-byte identical output across runs

use crate::alerts::{AlertSeverity, FraudAlert};
use crate::category::{format_amount, CampaignTotals};
use crate::compliance::CategoryCompliance;
use crate::spending::SpendingPattern;
use serde::{Deserialize, Serialize};

/// Full analysis of one campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignReport {
    pub campaign: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub totals: CampaignTotals,
    pub patterns: Vec<SpendingPattern>,
    pub alerts: Vec<FraudAlert>,
    pub recommendations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_probability: Option<u32>,
    pub compliance: Vec<CategoryCompliance>,
    pub compliance_rate: f64,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub excluded_categories: Vec<String>,
}

impl CampaignReport {
    pub fn highest_severity(&self) -> Option<AlertSeverity> {
        self.alerts.iter().map(|a| a.severity).max()
    }
}

/// Sort reports deterministically
pub fn sort_reports(mut reports: Vec<CampaignReport>) -> Vec<CampaignReport> {
    reports.sort_by(|a, b| {
        // 1. Campaign name ascending
        a.campaign
            .cmp(&b.campaign)
            // 2. Source path ascending
            .then_with(|| a.source.cmp(&b.source))
    });
    reports
}

/// Render reports as text output
pub fn render_text(reports: &[CampaignReport]) -> String {
    let mut output = String::new();

    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        render_campaign_text(report, &mut output);
    }

    output
}

fn render_campaign_text(report: &CampaignReport, output: &mut String) {
    output.push_str(&format!("Campaign: {}\n", report.campaign));
    output.push_str(&format!(
        "  Budget: {}  Raised: {}  Spent: {}\n",
        format_amount(report.totals.budget),
        format_amount(report.totals.raised),
        format_amount(report.totals.spent)
    ));
    if let Some(p) = report.success_probability {
        output.push_str(&format!("  Success probability: {}%\n", p));
    }
    output.push_str(&format!("  Compliance: {:.1}%\n", report.compliance_rate));
    if !report.excluded_categories.is_empty() {
        output.push_str(&format!(
            "  Excluded: {}\n",
            report.excluded_categories.join(", ")
        ));
    }

    output.push('\n');
    output.push_str(&format!(
        "  {:<20} {:>12} {:>12} {:>10}\n",
        "CATEGORY", "BUDGET", "SPENT", "EFFICIENCY"
    ));
    for p in &report.patterns {
        output.push_str(&format!(
            "  {:<20} {:>12} {:>12} {:>9.1}%\n",
            truncate_or_pad(&p.category, 20),
            format_amount(p.budget),
            format_amount(p.spent),
            p.efficiency
        ));
    }

    output.push('\n');
    if report.alerts.is_empty() {
        output.push_str("  Alerts: none\n");
    } else {
        output.push_str("  Alerts:\n");
        for a in &report.alerts {
            output.push_str(&format!(
                "  - [{:<6}] {} ({}%): {}\n",
                a.severity.as_str(),
                a.category,
                a.confidence,
                a.message
            ));
        }
    }

    output.push_str("  Recommendations:\n");
    for r in &report.recommendations {
        output.push_str(&format!("  - {}\n", r));
    }
}

/// Render reports as JSON output
pub fn render_json(reports: &[CampaignReport]) -> String {
    serde_json::to_string_pretty(reports).unwrap_or_else(|_| "[]".to_string())
}

/// Truncate or pad string to fixed width
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        format!("{:<width$}", s, width = width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(name: &str, source: Option<&str>) -> CampaignReport {
        CampaignReport {
            campaign: name.to_string(),
            source: source.map(str::to_string),
            totals: CampaignTotals::default(),
            patterns: Vec::new(),
            alerts: Vec::new(),
            recommendations: vec!["ok".to_string()],
            success_probability: None,
            compliance: Vec::new(),
            compliance_rate: 100.0,
            excluded_categories: Vec::new(),
        }
    }

    #[test]
    fn test_sort_by_name_then_source() {
        let sorted = sort_reports(vec![
            report("b", Some("z.json")),
            report("a", Some("y.json")),
            report("b", Some("a.json")),
        ]);
        let keys: Vec<(&str, Option<&str>)> = sorted
            .iter()
            .map(|r| (r.campaign.as_str(), r.source.as_deref()))
            .collect();
        assert_eq!(
            keys,
            vec![("a", Some("y.json")), ("b", Some("a.json")), ("b", Some("z.json"))]
        );
    }

    #[test]
    fn test_truncate_or_pad() {
        assert_eq!(truncate_or_pad("food", 6), "food  ");
        assert_eq!(truncate_or_pad("emergency-shelter", 10), "emergen...");
        assert_eq!(truncate_or_pad("médicaments", 8), "médic...");
    }

    #[test]
    fn test_json_omits_empty_optionals() {
        let json = render_json(&[report("a", None)]);
        assert!(!json.contains("success_probability"));
        assert!(!json.contains("excluded_categories"));
        assert!(!json.contains("source"));
    }

    #[test]
    fn test_text_mentions_no_alerts() {
        let text = render_text(&[report("Winter Appeal", None)]);
        assert!(text.starts_with("Campaign: Winter Appeal\n"));
        assert!(text.contains("Alerts: none"));
        assert!(text.contains("  - ok\n"));
    }
}
