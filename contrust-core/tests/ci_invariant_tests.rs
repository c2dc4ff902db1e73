//! CI Invariant Tests
//!
//! These tests explicitly validate invariants that must always hold for the
//! analysis engine, whatever the input.

use contrust_core::recommendations::generate_spending_recommendations;
use contrust_core::success::{MAX_PROBABILITY, MIN_PROBABILITY};
use contrust_core::{
    analyze_campaign, analyze_path, analyze_spending_patterns, calculate_success_probability,
    detect_fraud_alerts, render_json, Campaign, CategoryRecord, ResolvedConfig, SuccessInput,
};
use std::path::PathBuf;

/// A spread of ordinary and degenerate category records
fn sample_categories() -> Vec<CategoryRecord> {
    let values = [0.0, 1.0, 999.5, 10_000.0, 15_000.0, 1e9];
    let mut cats = Vec::new();
    for &amount in &values {
        for &raised in &values {
            for &spent in &values {
                cats.push(CategoryRecord::new(
                    format!("{}-{}-{}", amount, raised, spent),
                    amount,
                    raised,
                    spent,
                ));
            }
        }
    }
    cats
}

#[test]
fn test_analyzer_totality() {
    let cats = sample_categories();
    let patterns = analyze_spending_patterns(&cats);
    assert_eq!(patterns.len(), cats.len());
    for (cat, pattern) in cats.iter().zip(&patterns) {
        assert_eq!(cat.name, pattern.category, "order must be preserved");
        assert!((0.0..=100.0).contains(&pattern.efficiency));
        if cat.amount == 0.0 {
            assert_eq!(pattern.efficiency, 0.0);
        }
    }
}

#[test]
fn test_zero_record_is_safe_everywhere() {
    let cats = vec![CategoryRecord::new("zero", 0.0, 0.0, 0.0)];

    let patterns = analyze_spending_patterns(&cats);
    assert!(patterns[0].efficiency.is_finite());

    assert!(detect_fraud_alerts(&cats).is_empty());

    let recs = generate_spending_recommendations(&cats);
    assert_eq!(recs.len(), 1);

    let p = calculate_success_probability(&SuccessInput {
        total_budget: 0.0,
        total_raised: 0.0,
        days_elapsed: 0.0,
        target_days: 0.0,
    });
    assert!((MIN_PROBABILITY..=MAX_PROBABILITY).contains(&p));

    let report = analyze_campaign(
        &Campaign {
            name: "zero".to_string(),
            categories: cats,
            days_elapsed: Some(0.0),
            target_days: Some(0.0),
        },
        &ResolvedConfig::defaults().unwrap(),
    );
    let json = render_json(&[report]);
    assert!(!json.contains("NaN"));
    assert!(!json.contains("inf"));
    assert!(!json.contains("null"), "non-finite floats serialize as null");
}

#[test]
fn test_overflowing_totals_serialize_as_numbers() {
    let report = analyze_campaign(
        &Campaign {
            name: "huge".to_string(),
            categories: vec![
                CategoryRecord::new("a", 1.5e308, 1.0, 1.0),
                CategoryRecord::new("b", 1.5e308, 1.0, 1.0),
            ],
            days_elapsed: Some(10.0),
            target_days: Some(100.0),
        },
        &ResolvedConfig::defaults().unwrap(),
    );
    assert_eq!(report.totals.budget, f64::MAX);
    let json = render_json(&[report]);
    assert!(!json.contains("null"), "non-finite floats serialize as null");
}

#[test]
fn test_alert_messages_are_finite() {
    for alert in detect_fraud_alerts(&sample_categories()) {
        assert!(!alert.message.contains("NaN"), "{}", alert.message);
        assert!(!alert.message.contains("inf"), "{}", alert.message);
        assert!(alert.confidence <= 100);
    }
}

#[test]
fn test_recommendations_never_empty() {
    let cats = sample_categories();
    for window in cats.chunks(7) {
        assert!(!generate_spending_recommendations(window).is_empty());
    }
}

#[test]
fn test_success_probability_bounds() {
    let values = [0.0, 0.5, 10.0, 25.0, 100.0, 1e6];
    for &budget in &values {
        for &raised in &values {
            for &elapsed in &values {
                for &target in &values {
                    let p = calculate_success_probability(&SuccessInput {
                        total_budget: budget,
                        total_raised: raised,
                        days_elapsed: elapsed,
                        target_days: target,
                    });
                    assert!((MIN_PROBABILITY..=MAX_PROBABILITY).contains(&p));
                }
            }
        }
    }
}

#[test]
fn test_output_is_byte_for_byte_deterministic() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join("campaigns");
    let config = ResolvedConfig::defaults().unwrap();

    let first = render_json(&analyze_path(&path, &config).unwrap());
    let second = render_json(&analyze_path(&path, &config).unwrap());
    assert_eq!(first, second);
}
