//! Riskline CLI - project risk assessment tool

#![deny(warnings)]

// Global invariants enforced:
// - Deterministic output ordering
// - A run either prints a complete report or fails fast with a
//   configuration/persistence error

use anyhow::Context;
use clap::{Parser, Subcommand};
use riskline_core::cancel::CancelToken;
use riskline_core::{assess_local, config, render_text};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "riskline")]
#[command(about = "Multi-factor project risk scoring, prediction, and mitigation planning")]
#[command(version = env!("RISKLINE_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess a project and produce a risk report
    Assess {
        /// Path to the project root
        path: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Analysis window in days (overrides config file)
        #[arg(long)]
        period: Option<u32>,

        /// Restrict assessment to these categories (repeatable; overrides
        /// config file)
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory the JSON report is written to (overrides config file)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Abandon collection after this many seconds; unfinished categories
        /// degrade to unknown
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Print the report without writing the JSON artifact
        #[arg(long)]
        no_write: bool,
    },
    /// Validate or inspect a configuration file
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without running an assessment
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

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Assess {
            path,
            format,
            period,
            categories,
            config: config_path,
            output,
            timeout_secs,
            no_write,
        } => {
            // Normalize path to absolute
            let project_root = if path.is_relative() {
                std::env::current_dir()?.join(&path)
            } else {
                path
            };

            if !project_root.exists() {
                anyhow::bail!("path does not exist: {}", project_root.display());
            }

            let mut resolved = config::load_and_resolve(&project_root, config_path.as_deref())
                .context("failed to load configuration")?;

            if let Some(config_path) = &resolved.config_path {
                eprintln!("Using config: {}", config_path.display());
            }

            // CLI flags override config file values
            if let Some(days) = period {
                if days == 0 {
                    anyhow::bail!("--period must be positive");
                }
                resolved.analysis_period_days = days;
            }
            if !categories.is_empty() {
                let overrides = riskline_core::EngineConfig {
                    categories,
                    ..Default::default()
                };
                resolved.categories = overrides
                    .resolve(&project_root)
                    .context("invalid --category")?
                    .categories;
            }
            if let Some(dir) = output {
                resolved.output_dir = dir;
            }

            let cancel = match timeout_secs {
                Some(secs) => CancelToken::with_timeout(Duration::from_secs(secs)),
                None => CancelToken::new(),
            };

            let report = assess_local(&resolved, &cancel).context("assessment failed")?;

            match format {
                OutputFormat::Text => print!("{}", render_text(&report)),
                OutputFormat::Json => print!("{}", report.to_json()?),
            }

            if !no_write {
                let written = report
                    .write(&resolved.output_dir)
                    .context("failed to persist report")?;
                eprintln!("Report written to {}", written.display());
            }

            Ok(())
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let cwd = std::env::current_dir()?;
                match path {
                    Some(path) => {
                        config::load_config_file(&path)
                            .with_context(|| format!("invalid config: {}", path.display()))?;
                        println!("Config is valid: {}", path.display());
                    }
                    None => match config::discover_config(&cwd)? {
                        Some((_, path)) => println!("Config is valid: {}", path.display()),
                        None => println!("No config file found (defaults apply)"),
                    },
                }
                Ok(())
            }
            ConfigAction::Show { path } => {
                let cwd = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&cwd, path.as_deref())?;
                match &resolved.config_path {
                    Some(path) => println!("Config source: {}", path.display()),
                    None => println!("Config source: defaults"),
                }
                println!("analysis_period_days: {}", resolved.analysis_period_days);
                println!(
                    "categories: {}",
                    resolved
                        .categories
                        .iter()
                        .map(|c| c.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                println!(
                    "thresholds: high={} medium={} low={}",
                    resolved.thresholds.high, resolved.thresholds.medium, resolved.thresholds.low
                );
                println!("output_dir: {}", resolved.output_dir.display());
                Ok(())
            }
        },
    }
}
