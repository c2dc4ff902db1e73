//! Rule-based category compliance
//!
//! A category is compliant when spending stays within both its allocation and
//! the funds actually raised for it.

use crate::category::CategoryRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCompliance {
    pub category: String,
    pub compliant: bool,
    pub within_budget: bool,
    pub within_funds: bool,
}

pub fn check_category(category: &CategoryRecord) -> CategoryCompliance {
    let within_budget = category.spent <= category.amount;
    let within_funds = category.spent <= category.raised;
    CategoryCompliance {
        category: category.name.clone(),
        compliant: within_budget && within_funds,
        within_budget,
        within_funds,
    }
}

pub fn check_compliance(categories: &[CategoryRecord]) -> Vec<CategoryCompliance> {
    categories.iter().map(check_category).collect()
}

/// Share of compliant categories as a percentage; 100 for an empty set
pub fn compliance_rate(results: &[CategoryCompliance]) -> f64 {
    if results.is_empty() {
        return 100.0;
    }
    let compliant = results.iter().filter(|r| r.compliant).count();
    compliant as f64 / results.len() as f64 * 100.0
}
