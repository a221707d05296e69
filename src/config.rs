//! @dose
//! purpose: Configuration file parsing for docgen.toml. Holds which component files to
//!     document, the tsconfig used for type resolution, ignored parent interfaces and
//!     where the generated .info.json files go.
//!
//! when-editing:
//!     - !Config is loaded once at startup and passed through the call chain
//!     - !Include/exclude globs are matched against paths relative to the project root
//!     - CLI flags extend (exclude, ignored interfaces) or override (tsconfig, out dir)
//!
//! invariants:
//!     - Config::load returns the default config if docgen.toml doesn't exist
//!     - An unreadable or invalid docgen.toml warns and falls back to defaults
//!
//! gotchas:
//!     - A file must match an include pattern AND no exclude pattern (see discovery)
//!     - Relative `tsconfig` and `output.dir` values are resolved against the root

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// File name of the project configuration
pub const CONFIG_FILE: &str = "docgen.toml";

/// Main configuration structure matching docgen.toml
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Globs selecting component files
    pub include: Vec<String>,

    /// Globs of files never documented (gitignore-style)
    pub exclude: Vec<String>,

    /// tsconfig used to build the program (default: <root>/tsconfig.json if present)
    pub tsconfig: Option<PathBuf>,

    /// Props inherited from these interfaces are dropped
    pub ignored_parent_interfaces: Vec<String>,

    /// Always clean the output directory before generating (removes stale files)
    pub clean: bool,

    /// Output configuration
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            include: vec!["**/*.tsx".to_string()],
            exclude: Vec::new(),
            tsconfig: None,
            ignored_parent_interfaces: Vec::new(),
            clean: false,
            output: OutputConfig::default(),
        }
    }
}

/// Where and what to write
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving <DisplayName>.info.json files
    pub dir: PathBuf,

    /// Also write componentMenu.json
    pub menu: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("componentInfo"),
            menu: true,
        }
    }
}

impl Config {
    /// Load configuration from docgen.toml in the given root directory
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);

        if !config_path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&config_path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Failed to parse {}: {}", CONFIG_FILE, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read {}: {}", CONFIG_FILE, e);
                Self::default()
            }
        }
    }

    /// Configured tsconfig, else <root>/tsconfig.json when it exists
    pub fn tsconfig_path(&self, root: &Path) -> Option<PathBuf> {
        match &self.tsconfig {
            Some(path) => Some(root.join(path)),
            None => {
                let default = root.join("tsconfig.json");
                default.is_file().then_some(default)
            }
        }
    }

    /// Absolute output directory
    pub fn output_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.output.dir)
    }
}
