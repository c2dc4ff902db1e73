//! Campaign success probability
//!
//! Projects completion likelihood from funding pace against elapsed time.
//!
//! Global invariants enforced:
//! - Result is always an integer in [MIN_PROBABILITY, MAX_PROBABILITY]
//! - Zero denominators never reach the caller as NaN or infinity

use serde::{Deserialize, Serialize};

pub const MIN_PROBABILITY: u32 = 10;
pub const MAX_PROBABILITY: u32 = 95;

/// Campaign figures the estimator works from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuccessInput {
    pub total_budget: f64,
    pub total_raised: f64,
    pub days_elapsed: f64,
    pub target_days: f64,
}

/// Pace multipliers and windows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuccessThresholds {
    /// Pace above this earns the ahead-of-pace bonus (x1.2)
    pub ahead_pace: f64,
    /// Pace below this takes the behind-pace penalty (x0.8)
    pub behind_pace: f64,
    /// Fraction of target days counted as the early window
    pub early_window: f64,
    /// Funding progress (percent) required for the early-momentum bonus (x1.15)
    pub early_min_progress: f64,
}

impl Default for SuccessThresholds {
    fn default() -> Self {
        SuccessThresholds {
            ahead_pace: 1.2,
            behind_pace: 0.8,
            early_window: 0.25,
            early_min_progress: 50.0,
        }
    }
}

const AHEAD_BONUS: f64 = 1.2;
const BEHIND_PENALTY: f64 = 0.8;
const EARLY_BONUS: f64 = 1.15;

/// Estimate with default thresholds
pub fn calculate_success_probability(input: &SuccessInput) -> u32 {
    calculate_success_probability_with_thresholds(input, &SuccessThresholds::default())
}

/// Estimate with custom thresholds
pub fn calculate_success_probability_with_thresholds(
    input: &SuccessInput,
    thresholds: &SuccessThresholds,
) -> u32 {
    let cap = f64::from(MAX_PROBABILITY);

    let funding_progress = percent(input.total_raised, input.total_budget).unwrap_or(0.0);
    let time_progress = percent(input.days_elapsed, input.target_days);

    let mut base = funding_progress;

    // Pace is undefined before any time has elapsed
    match time_progress {
        Some(time) if time > 0.0 => {
            let pace = funding_progress / time;
            if pace > thresholds.ahead_pace {
                base = (base * AHEAD_BONUS).min(cap);
            } else if pace < thresholds.behind_pace {
                base *= BEHIND_PENALTY;
            }
        }
        _ => tracing::debug!(
            days_elapsed = input.days_elapsed,
            target_days = input.target_days,
            "pace undefined, skipping pace adjustment"
        ),
    }

    if input.days_elapsed < input.target_days * thresholds.early_window
        && funding_progress > thresholds.early_min_progress
    {
        base = (base * EARLY_BONUS).min(cap);
    }

    clamp_probability(base)
}

/// `numerator / denominator * 100`, or None when the denominator is not positive
/// or the result is not finite
fn percent(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator > 0.0 {
        let value = numerator / denominator * 100.0;
        value.is_finite().then_some(value)
    } else {
        None
    }
}

fn clamp_probability(value: f64) -> u32 {
    let value = if value.is_finite() { value } else { 0.0 };
    let clamped = value.clamp(f64::from(MIN_PROBABILITY), f64::from(MAX_PROBABILITY));
    clamped.round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(budget: f64, raised: f64, elapsed: f64, target: f64) -> SuccessInput {
        SuccessInput {
            total_budget: budget,
            total_raised: raised,
            days_elapsed: elapsed,
            target_days: target,
        }
    }

    #[test]
    fn test_ahead_and_early_clamps_at_95() {
        assert_eq!(calculate_success_probability(&input(1000.0, 900.0, 10.0, 100.0)), 95);
    }

    #[test]
    fn test_on_pace_returns_funding_progress() {
        // funding 50%, time 50%, pace 1.0
        assert_eq!(calculate_success_probability(&input(1000.0, 500.0, 50.0, 100.0)), 50);
    }

    #[test]
    fn test_behind_pace_penalty() {
        // funding 40%, time 80%, pace 0.5 -> 32
        assert_eq!(calculate_success_probability(&input(1000.0, 400.0, 80.0, 100.0)), 32);
    }

    #[test]
    fn test_ahead_pace_bonus() {
        // funding 60%, time 40%, pace 1.5 -> 72
        assert_eq!(calculate_success_probability(&input(1000.0, 600.0, 40.0, 100.0)), 72);
    }

    #[test]
    fn test_early_momentum_without_pace_bonus() {
        // funding 55%, time 20%, pace 2.75 -> 66, early -> 75.9
        assert_eq!(calculate_success_probability(&input(1000.0, 550.0, 20.0, 100.0)), 76);
    }

    #[test]
    fn test_floor_at_10() {
        assert_eq!(calculate_success_probability(&input(1000.0, 10.0, 90.0, 100.0)), 10);
    }

    #[test]
    fn test_zero_budget_is_zero_progress() {
        assert_eq!(calculate_success_probability(&input(0.0, 500.0, 10.0, 100.0)), 10);
    }

    #[test]
    fn test_zero_days_elapsed_skips_pace() {
        // funding 60%, no pace adjustment, early window applies -> 69
        assert_eq!(calculate_success_probability(&input(1000.0, 600.0, 0.0, 100.0)), 69);
        assert_eq!(calculate_success_probability(&input(0.0, 0.0, 0.0, 100.0)), 10);
    }

    #[test]
    fn test_zero_target_days_skips_pace() {
        assert_eq!(calculate_success_probability(&input(1000.0, 300.0, 5.0, 0.0)), 30);
    }

    #[test]
    fn test_result_always_in_bounds() {
        let budgets = [0.0, 1.0, 1000.0, 1e9];
        let raised = [0.0, 1.0, 500.0, 5000.0, 1e12];
        let days = [0.0, 1.0, 25.0, 99.0, 1000.0];
        for &b in &budgets {
            for &r in &raised {
                for &d in &days {
                    let p = calculate_success_probability(&input(b, r, d, 100.0));
                    assert!((MIN_PROBABILITY..=MAX_PROBABILITY).contains(&p), "{} {} {} -> {}", b, r, d, p);
                }
            }
        }
    }

    #[test]
    fn test_custom_thresholds_shift_pace_bands() {
        let strict = SuccessThresholds {
            ahead_pace: 2.0,
            behind_pace: 1.0,
            ..SuccessThresholds::default()
        };
        // pace 1.5 is no longer ahead; not behind either
        assert_eq!(
            calculate_success_probability_with_thresholds(&input(1000.0, 600.0, 40.0, 100.0), &strict),
            60
        );
    }
}
