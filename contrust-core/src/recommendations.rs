//! Rule-based spending recommendations
//!
//! Global invariants enforced:
//! - Rules run in a fixed priority order, each contributing at most one message
//! - The result is never empty (a fallback message is appended last)
//! - Category-specific rules name only the first matching category

use crate::category::{CampaignTotals, CategoryRecord};

pub const PERFORMING_WELL: &str =
    "Campaign is performing well! Consider increasing target goals or expanding impact areas.";
pub const ACCELERATE_IMPLEMENTATION: &str =
    "Funds are accumulating. Consider accelerating program implementation to maximize impact.";
pub const WELL_BALANCED: &str =
    "Campaign spending is well-balanced. Continue monitoring for optimal impact.";

/// Configurable ratios for the recommendation rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationThresholds {
    /// total raised above this share of total budget counts as performing well
    pub performing_well_ratio: f64,
    /// spent / raised below this marks a category as underutilized
    pub underutilized_ratio: f64,
    /// total spent / total raised below this means funds are accumulating
    pub accumulation_ratio: f64,
    /// accumulation is only reported once total raised exceeds this
    pub accumulation_min_raised: f64,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        RecommendationThresholds {
            performing_well_ratio: 0.8,
            underutilized_ratio: 0.3,
            accumulation_ratio: 0.5,
            accumulation_min_raised: 50_000.0,
        }
    }
}

/// Generate recommendations with default thresholds
pub fn generate_spending_recommendations(categories: &[CategoryRecord]) -> Vec<String> {
    generate_spending_recommendations_with_thresholds(
        categories,
        &RecommendationThresholds::default(),
    )
}

/// Generate recommendations with custom thresholds
pub fn generate_spending_recommendations_with_thresholds(
    categories: &[CategoryRecord],
    thresholds: &RecommendationThresholds,
) -> Vec<String> {
    let totals = CampaignTotals::from_categories(categories);
    let mut recommendations = Vec::new();

    // 1. Funding ahead of budget
    if totals.raised > totals.budget * thresholds.performing_well_ratio {
        recommendations.push(PERFORMING_WELL.to_string());
    }

    // 2. First underutilized category
    if let Some(cat) = categories
        .iter()
        .find(|cat| cat.raised > 0.0 && cat.spent / cat.raised < thresholds.underutilized_ratio)
    {
        recommendations.push(format!(
            "Low spending detected in {}. Review if funds can be better allocated.",
            cat.name
        ));
    }

    // 3. First overspent category
    if let Some(cat) = categories.iter().find(|cat| cat.spent > cat.amount) {
        recommendations.push(format!(
            "Consider rebalancing budget for {} to prevent overspending.",
            cat.name
        ));
    }

    // 4. Funds accumulating; the raised guard also rules out a zero denominator
    if totals.raised > thresholds.accumulation_min_raised
        && totals.raised > 0.0
        && totals.spent / totals.raised < thresholds.accumulation_ratio
    {
        recommendations.push(ACCELERATE_IMPLEMENTATION.to_string());
    }

    // 5. Fallback
    if recommendations.is_empty() {
        recommendations.push(WELL_BALANCED.to_string());
    }

    tracing::debug!(
        count = recommendations.len(),
        "spending recommendations generated"
    );

    recommendations
}
