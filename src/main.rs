//! @dose
//! purpose: This is the CLI entry point for northstar-docgen. It parses command-line arguments
//!     using clap, installs the tracing subscriber, determines the project root directory, and
//!     dispatches to the appropriate command handler (info, generate, or watch).
//!
//! when-editing:
//!     - !All command handlers are imported from the northstar_docgen crate
//!     - !The root directory defaults to current working directory if not specified
//!     - Error messages are printed to stderr and exit with code 1
//!
//! invariants:
//!     - One and only one subcommand is always executed per invocation
//!     - The process exits with 0 on success, 1 on any error
//!     - Logs go to stderr so `info` output on stdout stays valid JSON
//!
//! do-not:
//!     - Never add business logic here - delegate to command modules
//!     - Never panic - always use proper error handling
//!
//! gotchas:
//!     - The --root flag can be placed before or after the subcommand due to global flag
//!     - DOCGEN_LOG (EnvFilter syntax) overrides the level chosen by --verbose

use anyhow::Context;
use clap::Parser;
use northstar_docgen::cli::{Cli, Commands};
use northstar_docgen::commands::{run_generate, run_info, run_watch};
use std::env;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("DOCGEN_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Determine root directory
    let root = match cli.root {
        Some(root) => root,
        None => env::current_dir().context("Failed to get current directory")?,
    };

    match cli.command {
        Commands::Info(args) => run_info(&args, &root, cli.verbose),
        Commands::Generate(args) => run_generate(&args, &root, cli.verbose),
        Commands::Watch(args) => run_watch(&args, &root, cli.verbose),
    }
}
