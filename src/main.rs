//! Binary entry point for ctx-journal.
//!
//! Thin CLI over the library: generates the journal site or vault and
//! records processing stages in the journal state sidecar.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use clap::{Parser, Subcommand};
use ctx_journal::config::JournalConfig;
use ctx_journal::observability;
use std::path::PathBuf;
use std::process::ExitCode;

/// ctx-journal - Publish exported AI session journals as a site or vault.
#[derive(Parser)]
#[command(name = "ctx-journal")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Generate a zensical site from the journal.
    Site {
        /// Output directory (default: <context_dir>/journal-site).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Run `zensical build` after generating.
        #[arg(long, conflicts_with = "serve")]
        build: bool,

        /// Run `zensical serve` after generating.
        #[arg(long)]
        serve: bool,
    },

    /// Generate an Obsidian vault from the journal.
    Obsidian {
        /// Output directory (default: <context_dir>/journal-obsidian).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Mark a processing stage for a journal file.
    Mark {
        /// Journal file name, e.g. 2026-01-21-fix-cache-abc12345.md.
        filename: String,

        /// Stage: exported, enriched, normalized or fences_verified.
        stage: String,

        /// Print the recorded date instead of marking; fails when unset.
        #[arg(long)]
        check: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match JournalConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init_from_settings(&config.logging, cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(cli: Cli, config: &JournalConfig) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Site {
            output,
            build,
            serve,
        } => commands::cmd_site(config, output, build, serve),

        Commands::Obsidian { output } => commands::cmd_obsidian(config, output),

        Commands::Mark {
            filename,
            stage,
            check,
        } => commands::cmd_mark(config, &filename, &stage, check),
    }
}
