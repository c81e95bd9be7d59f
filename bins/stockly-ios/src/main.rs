//! Stockly iOS CLI
//!
//! Build hardening for iOS is a manual Xcode configuration; this CLI
//! reports the required steps instead of editing anything.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use stockly_cli::output::Status;
use stockly_core::config::Config;
use stockly_core::error::exit_codes;
use stockly_hardening::{Dispatcher, PlatformOutcome};
use stockly_ios::HardeningSupport;

#[derive(Parser)]
#[command(name = "stockly-ios")]
#[command(about = "Build hardening tools for the Stockly iOS app")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the manual hardening steps for Release builds
    Harden,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    let config = match Config::load(cli.config.as_deref().and_then(|p| p.to_str())) {
        Ok(config) => config,
        Err(err) => {
            Status::error(&err.to_string());
            std::process::exit(exit_codes::CONFIG_ERROR);
        }
    };

    let code = match cli.command {
        Commands::Harden => run_harden(&config),
    };

    std::process::exit(code);
}

fn run_harden(config: &Config) -> i32 {
    let dispatcher = Dispatcher::new(config.schema.hardening.clone());

    match dispatcher.apply_ios() {
        PlatformOutcome::Disabled => {
            Status::info("iOS hardening disabled in config");
            exit_codes::SUCCESS
        }
        PlatformOutcome::Manual(HardeningSupport::Manual { reason, steps }) => {
            Status::warning(&reason);
            Status::subheader("Configure in Xcode:");
            for step in steps {
                Status::change(&step);
            }
            exit_codes::SUCCESS
        }
        _ => unreachable!("ios dispatch is never automated"),
    }
}
