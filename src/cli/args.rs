//! @dose
//! purpose: This module defines the command-line interface for northstar-docgen using the clap
//!     derive macros. It specifies all commands (info, generate, watch) and their arguments.
//!
//! when-editing:
//!     - !Each command struct must derive Args and be added to the Commands enum
//!     - !Global flags (root, verbose) are defined on Cli and propagate to all subcommands
//!     - Options shared by generate and watch live in CommonOptions
//!
//! invariants:
//!     - The Cli struct is the root parser that clap uses to parse command-line arguments
//!     - PathBuf is used for all file/directory path arguments to ensure proper path handling
//!
//! do-not:
//!     - Never add positional arguments that could conflict with subcommands
//!
//! gotchas:
//!     - --ignore-parent-interface and --exclude extend the docgen.toml lists, they never replace them
//!     - The --root flag is global but optional; defaults to current directory in main.rs

use crate::config::Config;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "northstar-docgen")]
#[command(author, version, about = "Component prop table generator for TypeScript UI libraries")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to project root (defaults to current directory)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the component info of a single component file as JSON
    Info(InfoArgs),

    /// Generate .info.json files for every component file
    Generate(GenerateArgs),

    /// Watch for file changes and regenerate affected .info.json files
    Watch(WatchArgs),
}

/// Type resolution options shared by all commands
#[derive(Args, Clone, Default)]
pub struct ResolveOptions {
    /// tsconfig used for module resolution (default: docgen.toml, then <root>/tsconfig.json)
    #[arg(long, value_name = "FILE")]
    pub tsconfig: Option<PathBuf>,

    /// Drop props inherited from this interface (can be repeated)
    #[arg(long = "ignore-parent-interface", value_name = "NAME")]
    pub ignored_parent_interfaces: Vec<String>,
}

impl ResolveOptions {
    /// tsconfig from the flag, else from config
    pub fn tsconfig_path(&self, config: &Config, root: &std::path::Path) -> Option<PathBuf> {
        match &self.tsconfig {
            Some(path) => Some(root.join(path)),
            None => config.tsconfig_path(root),
        }
    }

    /// Config interfaces followed by the ones given on the command line
    pub fn ignored_parent_interfaces(&self, config: &Config) -> Vec<String> {
        let mut names = config.ignored_parent_interfaces.clone();
        for name in &self.ignored_parent_interfaces {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }
}

/// Common options shared between generate and watch commands
#[derive(Args, Clone, Default)]
pub struct CommonOptions {
    /// Output directory for .info.json files (default: docgen.toml, then componentInfo)
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Don't write componentMenu.json
    #[arg(long)]
    pub no_menu: bool,

    /// Exclude files/directories matching glob pattern (can be repeated)
    #[arg(long, value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Don't respect .gitignore files
    #[arg(long)]
    pub no_gitignore: bool,

    #[command(flatten)]
    pub resolve: ResolveOptions,
}

impl CommonOptions {
    /// Config exclude patterns followed by the ones given on the command line
    pub fn exclude_patterns(&self, config: &Config) -> Vec<String> {
        let mut patterns = config.exclude.clone();
        patterns.extend(self.exclude.iter().cloned());
        patterns
    }

    /// Output directory from the flag, else from config
    pub fn output_dir(&self, config: &Config, root: &std::path::Path) -> PathBuf {
        match &self.out_dir {
            Some(dir) => root.join(dir),
            None => config.output_dir(root),
        }
    }

    pub fn write_menu(&self, config: &Config) -> bool {
        config.output.menu && !self.no_menu
    }
}

#[derive(Args, Default)]
pub struct InfoArgs {
    /// Component file to document
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print JSON on a single line
    #[arg(long)]
    pub compact: bool,

    #[command(flatten)]
    pub resolve: ResolveOptions,
}

#[derive(Args, Default)]
pub struct GenerateArgs {
    /// Specific files or directories to process
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Dry run - show what would be generated without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Clean the output directory before generating (removes stale files)
    #[arg(long)]
    pub clean: bool,

    #[command(flatten)]
    pub common: CommonOptions,
}

#[derive(Args, Default)]
pub struct WatchArgs {
    /// Specific files or directories to watch
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Debounce delay in milliseconds
    #[arg(long, default_value_t = 100)]
    pub debounce: u64,

    /// Clear screen before each update
    #[arg(long)]
    pub clear: bool,

    #[command(flatten)]
    pub common: CommonOptions,
}
