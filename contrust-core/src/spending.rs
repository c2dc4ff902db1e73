//! Spending pattern analysis
//!
//! One pattern per category, same order, no filtering.

use crate::category::CategoryRecord;
use serde::{Deserialize, Serialize};

/// Budget utilization for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingPattern {
    pub category: String,
    pub budget: f64,
    pub spent: f64,
    /// Spent over budget as a percentage, in [0, 100]
    pub efficiency: f64,
}

/// Efficiency = spent / amount * 100, clamped to [0, 100]; 0 when there is no budget
pub fn efficiency(category: &CategoryRecord) -> f64 {
    if category.amount > 0.0 {
        let ratio = category.spent / category.amount * 100.0;
        if ratio.is_finite() {
            ratio.clamp(0.0, 100.0)
        } else {
            0.0
        }
    } else {
        0.0
    }
}

pub fn analyze_spending_patterns(categories: &[CategoryRecord]) -> Vec<SpendingPattern> {
    categories
        .iter()
        .map(|cat| SpendingPattern {
            category: cat.name.clone(),
            budget: cat.amount,
            spent: cat.spent,
            efficiency: efficiency(cat),
        })
        .collect()
}
