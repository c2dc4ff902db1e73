//! Category records and campaign input documents
//!
//! Global invariants enforced:
//! - Records are read-only snapshots; nothing in this crate mutates them
//! - Non-negativity is expected but never enforced here

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One spending bucket of a campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub name: String,
    /// Allocated budget
    pub amount: f64,
    /// Funds donors have contributed
    pub raised: f64,
    /// Funds the NGO has disbursed
    pub spent: f64,
}

impl CategoryRecord {
    pub fn new(name: impl Into<String>, amount: f64, raised: f64, spent: f64) -> Self {
        CategoryRecord {
            name: name.into(),
            amount,
            raised,
            spent,
        }
    }
}

/// Aggregate sums over a category set
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignTotals {
    pub budget: f64,
    pub raised: f64,
    pub spent: f64,
}

impl CampaignTotals {
    pub fn from_categories(categories: &[CategoryRecord]) -> Self {
        categories
            .iter()
            .fold(CampaignTotals::default(), |acc, cat| CampaignTotals {
                budget: saturating_sum(acc.budget, cat.amount),
                raised: saturating_sum(acc.raised, cat.raised),
                spent: saturating_sum(acc.spent, cat.spent),
            })
    }
}

/// Running sum pinned to the finite f64 range; NaN terms are skipped
fn saturating_sum(acc: f64, value: f64) -> f64 {
    let sum = acc + value;
    if sum.is_nan() {
        acc
    } else {
        sum.clamp(-f64::MAX, f64::MAX)
    }
}

/// Campaign document as supplied by the data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub name: String,
    #[serde(default)]
    pub categories: Vec<CategoryRecord>,
    #[serde(default, alias = "daysElapsed", skip_serializing_if = "Option::is_none")]
    pub days_elapsed: Option<f64>,
    #[serde(default, alias = "targetDays", skip_serializing_if = "Option::is_none")]
    pub target_days: Option<f64>,
}

impl Campaign {
    pub fn totals(&self) -> CampaignTotals {
        CampaignTotals::from_categories(&self.categories)
    }
}

/// Load a campaign document from a JSON file
pub fn load_campaign(path: &Path) -> Result<Campaign> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read campaign file: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse campaign file: {}", path.display()))
}

/// Format an amount the way donors read it: thousands separators, at most three
/// fraction digits, trailing zeros dropped.
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }

    let fixed = format!("{:.3}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && (int_part != "0" || !frac_part.is_empty());
    let sign = if negative { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}
