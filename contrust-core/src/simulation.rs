//! Simulated display metrics for live dashboards
//!
//! Nothing here feeds the alert heuristics. Trust scores and live metrics are
//! randomized presentation values; the deterministic analysis lives in
//! `alerts`, `recommendations` and `success`.

use crate::category::CategoryRecord;
use crate::compliance::check_category;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Randomized display values for one category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayScores {
    /// 90..=99
    pub trust_score: u32,
    /// 95..=99 for compliant categories, 70 otherwise
    pub compliance_rate: u32,
}

impl DisplayScores {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R, compliant: bool) -> Self {
        DisplayScores {
            trust_score: rng.random_range(90..=99),
            compliance_rate: if compliant {
                rng.random_range(95..=99)
            } else {
                70
            },
        }
    }

    pub fn for_category<R: Rng + ?Sized>(rng: &mut R, category: &CategoryRecord) -> Self {
        Self::sample(rng, check_category(category).compliant)
    }
}

/// Dashboard counters refreshed on every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveMetrics {
    pub total_donations: u64,
    pub average_trust_score: u32,
    pub compliance_rate: u32,
    pub active_alerts: u32,
}

impl Default for LiveMetrics {
    fn default() -> Self {
        LiveMetrics {
            total_donations: 0,
            average_trust_score: 95,
            compliance_rate: 98,
            active_alerts: 0,
        }
    }
}

impl LiveMetrics {
    /// Random-walk step: donations only grow, the rest are resampled
    pub fn advance<R: Rng + ?Sized>(&self, rng: &mut R) -> LiveMetrics {
        LiveMetrics {
            total_donations: self.total_donations + rng.random_range(0..=2u64),
            average_trust_score: (95 + rng.random_range(0..=4u32)).min(100),
            compliance_rate: (96 + rng.random_range(0..=3u32)).min(100),
            active_alerts: rng.random_range(0..=1u32),
        }
    }
}

/// Owns the RNG and the current metrics; the caller decides when to tick
#[derive(Debug)]
pub struct MetricsSimulator {
    rng: StdRng,
    current: LiveMetrics,
}

impl MetricsSimulator {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Reproducible simulator
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        MetricsSimulator {
            rng,
            current: LiveMetrics::default(),
        }
    }

    pub fn current(&self) -> LiveMetrics {
        self.current
    }

    pub fn tick(&mut self) -> LiveMetrics {
        self.current = self.current.advance(&mut self.rng);
        self.current
    }

    pub fn display_scores(&mut self, categories: &[CategoryRecord]) -> Vec<DisplayScores> {
        categories
            .iter()
            .map(|cat| DisplayScores::for_category(&mut self.rng, cat))
            .collect()
    }
}

impl Default for MetricsSimulator {
    fn default() -> Self {
        Self::new()
    }
}
