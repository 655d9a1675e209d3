//! tapsync: keep a Homebrew tap's formulas pinned to upstream releases.
//!
//! # Usage
//!
//! ```text
//! tapsync run   [--root <dir>] [--config <file>] [--repository owner/repo]
//!               [--gpg-key <armored> | --gpg-key-file <path>] [--dry-run] [--json]
//! tapsync check [--root <dir>] [--config <file>] [--json]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{check::CheckArgs, run::RunArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "tapsync",
    version,
    about = "Update Homebrew formulas to their latest upstream releases",
    long_about = None,
)]
struct Cli {
    /// Log at debug level (RUST_LOG still takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Update formulas, commit and push the work branch, and open or reuse a pull request.
    Run(RunArgs),

    /// Report each formula's pinned and latest release without changing anything.
    Check(CheckArgs),
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Run(args) => args.run(),
        Commands::Check(args) => args.run(),
    }
}
