//! Contrust CLI - campaign spending analysis and fraud heuristics

#![deny(warnings)]

// Global invariants enforced:
// - Deterministic output ordering
// - Identical input yields byte-for-byte identical output (except `simulate` without a seed)

use anyhow::Context;
use clap::{Parser, Subcommand};
use contrust_core::explain::{self, ExplainRequest};
use contrust_core::simulation::MetricsSimulator;
use contrust_core::success::SuccessInput;
use contrust_core::{
    analyze_path, calculate_success_probability, config, render_json, render_text, AlertSeverity,
    CampaignReport,
};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "contrust")]
#[command(about = "Spending analysis and fraud heuristics for donation campaigns")]
#[command(version = env!("CONTRUST_VERSION"))]
struct Cli {
    /// Log filter directive (e.g. "info", "contrust_core=debug")
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a campaign file or a directory of campaign files
    Analyze {
        /// Path to campaign JSON file or directory
        path: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Lowest alert severity to report (overrides config file)
        #[arg(long)]
        min_severity: Option<AlertSeverity>,

        /// Exit with status 1 when any reported alert is at or above this severity
        #[arg(long)]
        fail_on: Option<AlertSeverity>,
    },
    /// Estimate campaign success probability from totals
    Success {
        #[arg(long)]
        budget: f64,

        #[arg(long)]
        raised: f64,

        #[arg(long)]
        days_elapsed: f64,

        #[arg(long)]
        target_days: f64,
    },
    /// Answer a donor question with the built-in explanations
    Explain {
        /// The question
        #[arg(long)]
        query: String,

        /// Conversation context (e.g. "donation")
        #[arg(long)]
        context: Option<String>,

        /// Extra JSON data about the donation or campaign
        #[arg(long)]
        data: Option<String>,

        /// Print the upstream prompt instead of answering
        #[arg(long)]
        prompt: bool,
    },
    /// Print simulated live dashboard metrics, one JSON line per tick
    Simulate {
        /// Number of ticks to run
        #[arg(long, default_value = "10")]
        ticks: usize,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Validate or show configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without running analysis
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn init_logging(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::Analyze {
            path,
            format,
            config: config_path,
            min_severity,
            fail_on,
        } => {
            let normalized_path = if path.is_relative() {
                std::env::current_dir()?.join(&path)
            } else {
                path
            };

            if !normalized_path.exists() {
                anyhow::bail!("Path does not exist: {}", normalized_path.display());
            }

            let project_root = std::env::current_dir()?;
            let mut resolved_config =
                config::load_and_resolve(&project_root, config_path.as_deref())
                    .context("failed to load configuration")?;

            // CLI flags override config file values
            if let Some(severity) = min_severity {
                resolved_config.min_severity = severity;
            }

            tracing::info!(path = %normalized_path.display(), "analyzing campaigns");
            let reports = analyze_path(&normalized_path, &resolved_config)?;

            match format {
                OutputFormat::Text => print!("{}", render_text(&reports)),
                OutputFormat::Json => println!("{}", render_json(&reports)),
            }

            if let Some(threshold) = fail_on {
                let failing = count_failing(&reports, threshold);
                if failing > 0 {
                    eprintln!(
                        "{} campaign(s) have alerts at or above {} severity",
                        failing, threshold
                    );
                    std::process::exit(1);
                }
            }
        }
        Commands::Success {
            budget,
            raised,
            days_elapsed,
            target_days,
        } => {
            let probability = calculate_success_probability(&SuccessInput {
                total_budget: budget,
                total_raised: raised,
                days_elapsed,
                target_days,
            });
            println!("{}", probability);
        }
        Commands::Explain {
            query,
            context,
            data,
            prompt,
        } => {
            let data = data
                .map(|raw| serde_json::from_str(&raw).context("--data must be valid JSON"))
                .transpose()?;
            let request = ExplainRequest {
                query,
                context,
                data,
            };

            if prompt {
                request.validate()?;
                println!("{}", explain::build_prompt(&request));
            } else {
                tracing::debug!(
                    prompt = %explain::build_prompt(&request),
                    "no text-generation upstream configured"
                );
                let response = explain::explain(&request, None)?;
                let json = serde_json::to_string_pretty(&response)
                    .context("failed to serialize explanation")?;
                println!("{}", json);
            }
        }
        Commands::Simulate { ticks, seed } => {
            let mut simulator = match seed {
                Some(seed) => MetricsSimulator::seeded(seed),
                None => MetricsSimulator::new(),
            };
            for _ in 0..ticks {
                let metrics = simulator.tick();
                let line =
                    serde_json::to_string(&metrics).context("failed to serialize metrics")?;
                println!("{}", line);
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let project_root = std::env::current_dir()?;
                match config::load_and_resolve(&project_root, path.as_deref()) {
                    Ok(resolved) => match resolved.config_path {
                        Some(ref p) => println!("Config valid: {}", p.display()),
                        None => println!("No config file found. Using defaults."),
                    },
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let project_root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&project_root, path.as_deref())
                    .context("failed to load configuration")?;
                print_config(&resolved);
            }
        },
    }

    Ok(())
}

/// Number of campaigns whose worst reported alert reaches `threshold`
fn count_failing(reports: &[CampaignReport], threshold: AlertSeverity) -> usize {
    reports
        .iter()
        .filter(|r| r.highest_severity().is_some_and(|s| s >= threshold))
        .count()
}

fn print_config(resolved: &config::ResolvedConfig) {
    println!("Configuration:");
    match resolved.config_path {
        Some(ref p) => println!("  Source: {}", p.display()),
        None => println!("  Source: defaults (no config file found)"),
    }
    println!();
    println!("Alerts:");
    println!(
        "  under_utilization_min_raised: {}",
        resolved.alerts.under_utilization_min_raised
    );
    println!(
        "  under_utilization_percent: {}",
        resolved.alerts.under_utilization_percent
    );
    println!("  min_severity: {}", resolved.min_severity);
    println!();
    println!("Recommendations:");
    println!(
        "  performing_well_ratio: {}",
        resolved.recommendations.performing_well_ratio
    );
    println!(
        "  underutilized_ratio: {}",
        resolved.recommendations.underutilized_ratio
    );
    println!(
        "  accumulation_ratio: {}",
        resolved.recommendations.accumulation_ratio
    );
    println!(
        "  accumulation_min_raised: {}",
        resolved.recommendations.accumulation_min_raised
    );
    println!();
    println!("Success:");
    println!("  ahead_pace: {}", resolved.success.ahead_pace);
    println!("  behind_pace: {}", resolved.success.behind_pace);
    println!("  early_window: {}", resolved.success.early_window);
    println!("  early_min_progress: {}", resolved.success.early_min_progress);
    println!();
    println!("Filters:");
    if resolved.exclude_patterns.is_empty() {
        println!("  exclude: none");
    } else {
        println!("  exclude: {}", resolved.exclude_patterns.join(", "));
    }
}
