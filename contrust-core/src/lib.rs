//! Contrust core library - spending analysis and fraud heuristics for donation campaigns

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Analysis functions are pure: no IO, no clocks, no randomness
// - Randomized display values live only in `simulation`
// - No analysis output carries NaN or infinity
// - Identical input yields byte-for-byte identical output

pub mod alerts;
pub mod category;
pub mod compliance;
pub mod config;
pub mod explain;
pub mod recommendations;
pub mod report;
pub mod simulation;
pub mod spending;
pub mod success;

pub use alerts::{detect_fraud_alerts, AlertRule, AlertSeverity, FraudAlert};
pub use category::{Campaign, CampaignTotals, CategoryRecord};
pub use config::ResolvedConfig;
pub use recommendations::generate_spending_recommendations;
pub use report::{render_json, render_text, sort_reports, CampaignReport};
pub use spending::{analyze_spending_patterns, SpendingPattern};
pub use success::{calculate_success_probability, SuccessInput};

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Run every analysis over one campaign
pub fn analyze_campaign(campaign: &Campaign, config: &ResolvedConfig) -> CampaignReport {
    let (categories, excluded): (Vec<CategoryRecord>, Vec<CategoryRecord>) = campaign
        .categories
        .iter()
        .cloned()
        .partition(|cat| config.should_include(&cat.name));

    for cat in &excluded {
        tracing::debug!(campaign = %campaign.name, category = %cat.name, "category excluded by config");
    }

    let totals = CampaignTotals::from_categories(&categories);
    let alerts = alerts::filter_by_severity(
        alerts::detect_fraud_alerts_with_thresholds(&categories, &config.alerts),
        config.min_severity,
    );
    let compliance = compliance::check_compliance(&categories);

    let success_probability = match (campaign.days_elapsed, campaign.target_days) {
        (Some(days_elapsed), Some(target_days)) => {
            Some(success::calculate_success_probability_with_thresholds(
                &SuccessInput {
                    total_budget: totals.budget,
                    total_raised: totals.raised,
                    days_elapsed,
                    target_days,
                },
                &config.success,
            ))
        }
        _ => None,
    };

    CampaignReport {
        campaign: campaign.name.clone(),
        source: None,
        totals,
        patterns: analyze_spending_patterns(&categories),
        alerts,
        recommendations: recommendations::generate_spending_recommendations_with_thresholds(
            &categories,
            &config.recommendations,
        ),
        success_probability,
        compliance_rate: compliance::compliance_rate(&compliance),
        compliance,
        excluded_categories: excluded.into_iter().map(|cat| cat.name).collect(),
    }
}

/// Analyze one campaign file, or every campaign file under a directory
///
/// Files that fail to load are skipped with a warning.
pub fn analyze_path(path: &Path, config: &ResolvedConfig) -> Result<Vec<CampaignReport>> {
    let files = collect_campaign_files(path)?;

    let outcomes: Vec<(PathBuf, Result<CampaignReport>)> = files
        .into_par_iter()
        .map(|file| {
            let outcome = category::load_campaign(&file).map(|campaign| {
                let mut report = analyze_campaign(&campaign, config);
                report.source = Some(file.display().to_string());
                report
            });
            (file, outcome)
        })
        .collect();

    let mut reports = Vec::with_capacity(outcomes.len());
    let mut skipped_files: usize = 0;
    for (file, outcome) in outcomes {
        match outcome {
            Ok(report) => reports.push(report),
            Err(e) => {
                tracing::warn!(file = %file.display(), error = %format!("{:#}", e), "skipping campaign file");
                skipped_files += 1;
            }
        }
    }
    if skipped_files > 0 {
        tracing::warn!(skipped = skipped_files, "some campaign files could not be analyzed");
    }
    tracing::info!(campaigns = reports.len(), "analysis complete");

    Ok(sort_reports(reports))
}

/// Check if a file looks like a campaign document
fn is_campaign_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}

/// Collect campaign files from a path (file or directory), sorted
fn collect_campaign_files(path: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    if path.is_file() {
        files.push(path.to_path_buf());
    } else if path.is_dir() {
        collect_campaign_files_recursive(path, &mut files)?;
    } else {
        anyhow::bail!("Path does not exist: {}", path.display());
    }

    files.sort();
    Ok(files)
}

fn collect_campaign_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry_result in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let entry = entry_result?;
        let path = entry.path();
        let metadata = std::fs::symlink_metadata(&path)
            .with_context(|| format!("Failed to read metadata: {}", path.display()))?;

        if metadata.is_symlink() {
            continue;
        }
        if metadata.is_dir() {
            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with('.'));
            if !hidden {
                collect_campaign_files_recursive(&path, files)?;
            }
        } else if metadata.is_file() && is_campaign_file(&path) {
            files.push(path);
        }
    }

    Ok(())
}
