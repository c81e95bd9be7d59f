//! Stockly Android CLI
//!
//! Build hardening tools for the Stockly Android app.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use stockly_cli::output::{format_count, format_duration, Status};
use stockly_cli::progress;
use stockly_core::config::Config;
use stockly_core::error::exit_codes;
use stockly_core::validation::validate_config;
use stockly_hardening::{Dispatcher, PlatformOutcome};

#[derive(Parser)]
#[command(name = "stockly-android")]
#[command(about = "Build hardening tools for the Stockly Android app")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Repository root containing the Android project
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply release-build obfuscation settings to the Gradle project
    Harden {
        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Verify the project is hardened; exits non-zero if changes are pending
    Check,

    /// Diagnose configuration and project layout
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
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

    let validation = validate_config(&config.schema);
    if !cli.quiet {
        for warning in validation.warnings() {
            Status::warning(&warning.to_string());
        }
    }
    if !validation.is_valid() {
        for error in validation.errors() {
            Status::error(&error.to_string());
        }
        std::process::exit(exit_codes::VALIDATION_ERROR);
    }

    let code = match &cli.command {
        Commands::Harden { dry_run } => run_harden(&cli, &config, *dry_run, false),
        Commands::Check => run_harden(&cli, &config, true, true),
        Commands::Doctor { json } => run_doctor(&cli, &config, *json),
    };

    std::process::exit(code);
}

/// Run the hardening pass; in check mode pending changes fail the command
fn run_harden(cli: &Cli, config: &Config, dry_run: bool, check: bool) -> i32 {
    let started = Instant::now();
    let dispatcher = Dispatcher::new(config.schema.hardening.clone());

    let spinner = (!cli.quiet).then(|| progress::spinner("Hardening Android build configuration"));

    let outcome = dispatcher.apply_android(&cli.root, &config.schema.general.android_dir, dry_run);

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(err) => {
            if let Some(pb) = &spinner {
                progress::finish_error(pb, "Hardening failed");
            }
            Status::error(&err.to_string());
            return exit_codes::FAILURE;
        }
    };

    match outcome {
        PlatformOutcome::Disabled => {
            if let Some(pb) = &spinner {
                progress::finish_success(pb, "Android hardening disabled in config");
            }
            exit_codes::SUCCESS
        }
        PlatformOutcome::Manual(_) => unreachable!("android dispatch is never manual"),
        PlatformOutcome::Applied(report) => {
            if let Some(pb) = &spinner {
                pb.finish_and_clear();
            }

            for warning in &report.warnings {
                Status::warning(warning);
            }

            if report.is_clean() {
                if !cli.quiet {
                    Status::success("Android build configuration already hardened");
                }
                return exit_codes::SUCCESS;
            }

            let total = report.changes().count();
            if check {
                Status::error(&format!(
                    "{} pending; run 'stockly-android harden'",
                    format_count(total, "hardening change", "hardening changes")
                ));
                for change in report.changes() {
                    Status::change(change);
                }
                return exit_codes::CHANGES_PENDING;
            }

            if !cli.quiet {
                let verb = if dry_run { "would apply" } else { "applied" };
                Status::success(&format!(
                    "Hardening {} {} in {}",
                    verb,
                    format_count(total, "change", "changes"),
                    format_duration(started.elapsed())
                ));
                if cli.verbose > 0 || dry_run {
                    for change in report.changes() {
                        Status::change(change);
                    }
                }
                for file in &report.modified_files {
                    if cli.verbose > 0 {
                        Status::info(&format!("Wrote {}", file.display()));
                    }
                }
            }
            exit_codes::SUCCESS
        }
    }
}

fn run_doctor(cli: &Cli, config: &Config, json: bool) -> i32 {
    let android_dir = cli.root.join(&config.schema.general.android_dir);
    let build_gradle = [
        android_dir.join("app").join("build.gradle"),
        android_dir.join("build.gradle"),
    ]
    .into_iter()
    .find(|p| p.is_file());
    let properties = android_dir.join("gradle.properties");

    if json {
        let report = serde_json::json!({
            "config_path": config.path,
            "project_name": config.schema.general.project_name,
            "android_dir": android_dir,
            "android_dir_found": android_dir.is_dir(),
            "build_gradle": build_gradle,
            "gradle_properties_found": properties.is_file(),
            "android_enabled": config.schema.hardening.android.is_enabled(),
        });
        println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
        return exit_codes::SUCCESS;
    }

    Status::header("Stockly Android doctor");
    match &config.path {
        Some(path) => Status::info(&format!("Config loaded from {}", path)),
        None => Status::info("No config file found; using defaults"),
    }

    if android_dir.is_dir() {
        Status::success(&format!("Android project at {}", android_dir.display()));
    } else {
        Status::error(&format!(
            "Android project directory missing: {}",
            android_dir.display()
        ));
        return exit_codes::FAILURE;
    }

    match build_gradle {
        Some(path) => Status::success(&format!("Build descriptor: {}", path.display())),
        None => {
            Status::error("No build.gradle found under the Android project");
            return exit_codes::FAILURE;
        }
    }

    if properties.is_file() {
        Status::success("gradle.properties present");
    } else {
        Status::warning("gradle.properties missing; harden will create it");
    }

    if !config.schema.hardening.android.is_enabled() {
        Status::warning("Android hardening is disabled in config");
    }

    exit_codes::SUCCESS
}
