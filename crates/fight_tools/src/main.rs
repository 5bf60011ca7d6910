//! Duel Core - Development Tools

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use fight_tools::scenario::{self, Scenario};
use fight_tools::{error::read_file, validate};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "fight-tools")]
#[command(about = "Development tools for the duel combat core")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate duel configuration files
    Validate {
        /// Config file, or directory of `.ron` configs
        #[arg(default_value = "assets/duels")]
        path: PathBuf,
    },
    /// Run a scripted duel and print events as JSON lines
    Scenario {
        /// Duel configuration file
        config: PathBuf,
        /// Scenario script file
        script: PathBuf,
    },
}

fn run_scenario(config: &Path, script: &Path) -> fight_tools::error::Result<()> {
    let config = validate::validate_config_file(config)?;
    let scenario = Scenario::from_ron_str(&read_file(script)?)?;
    tracing::info!("Running {} steps", scenario.steps.len());

    let outcome = scenario::run(&config, &scenario)?;
    for line in outcome.to_json_lines()? {
        println!("{line}");
    }
    if !outcome.rejected.is_empty() {
        tracing::warn!("{} steps were rejected", outcome.rejected.len());
    }
    Ok(())
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path } => {
            tracing::info!("Validating duel configs in: {}", path.display());
            match validate::validate_path(&path) {
                Ok(report) if report.is_ok() => {
                    tracing::info!("Validation passed ({} files)", report.checked());
                }
                Ok(report) => {
                    for (file, reason) in &report.failed {
                        tracing::error!("{}: {reason}", file.display());
                    }
                    tracing::error!(
                        "Validation failed: {} of {} files",
                        report.failed.len(),
                        report.checked()
                    );
                    std::process::exit(1);
                }
                Err(e) => {
                    tracing::error!("Validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Scenario { config, script } => {
            if let Err(e) = run_scenario(&config, &script) {
                tracing::error!("Scenario failed: {e}");
                std::process::exit(1);
            }
        }
    }
}
