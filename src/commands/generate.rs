//! @dose
//! purpose: This module implements the generate command that writes one <DisplayName>.info.json
//!     file per component file plus the componentMenu.json index. All component files share
//!     one Program, so interface files are parsed once for the whole batch.
//!
//! when-editing:
//!     - !Extraction runs in parallel (rayon), writing runs sequentially in file order
//!     - !Files whose content did not change are never rewritten (keeps mtimes stable for bundlers)
//!     - GenerateContext is shared with watch mode; keep its helpers free of CLI concerns
//!
//! invariants:
//!     - Files without a component are skipped, every other extraction error is counted
//!     - Two files with the same display name are an error (they would share an output file)
//!     - The output directory is never collected as input
//!
//! do-not:
//!     - Never write anything when --dry-run is set
//!     - Never delete files that are not .info.json files when cleaning
//!
//! gotchas:
//!     - componentMenu.json is built from the info files on disk, so it also lists
//!       components generated by earlier runs over other paths
//!     - Relative input paths are resolved against the root, not the current directory
//!
//! flows:
//!     - Collect: Walk the input paths, keep files matching the include/exclude globs
//!     - Build program: Parse every component file and its import closure once
//!     - Extract: get_component_info for every file in parallel
//!     - Write: Changed .info.json files, stale-file cleanup, then the menu

use crate::cli::{CommonOptions, GenerateArgs};
use crate::config::Config;
use crate::dependency::absolutize;
use crate::discovery::ComponentFiles;
use crate::error::DocgenError;
use crate::formatter::{
    build_component_menu, format_info, info_file_name, is_info_file, parse_info, MENU_FILE_NAME,
};
use crate::info::{find_repo_root, get_component_info, GetComponentInfoOptions};
use crate::program::tsconfig::TsConfig;
use crate::program::Program;
use crate::types::ComponentInfo;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Result of writing one output file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Unchanged,
    DryRun,
}

/// Counters and outputs of one documentation pass
#[derive(Debug, Default)]
pub struct GenerateReport {
    pub generated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub errors: usize,
    /// Component file -> info file written for it
    pub outputs: BTreeMap<PathBuf, PathBuf>,
}

impl GenerateReport {
    pub fn summary(&self) -> String {
        format!(
            "Generated: {}, Unchanged: {}, Skipped: {}, Errors: {}",
            self.generated, self.unchanged, self.skipped, self.errors
        )
    }
}

/// Settings resolved once per run from docgen.toml and the command line
pub struct GenerateContext {
    pub root: PathBuf,
    pub config: Config,
    pub out_dir: PathBuf,
    pub tsconfig: Option<PathBuf>,
    pub ignored_parent_interfaces: Vec<String>,
    pub repo_root: PathBuf,
    pub write_menu: bool,
    common: CommonOptions,
    component_files: ComponentFiles,
}

impl GenerateContext {
    pub fn new(root: &Path, common: &CommonOptions) -> Result<Self> {
        let root = absolutize(root).context("Failed to resolve project root")?;
        let config = Config::load(&root);
        let out_dir = common.output_dir(&config, &root);
        let tsconfig = common.resolve.tsconfig_path(&config, &root);
        let ignored_parent_interfaces = common.resolve.ignored_parent_interfaces(&config);
        let repo_root = find_repo_root(&root).unwrap_or_else(|| root.clone());
        let write_menu = common.write_menu(&config);
        let component_files = ComponentFiles::new(
            &root,
            &out_dir,
            &config.include,
            &common.exclude_patterns(&config),
        )
        .respect_gitignore(!common.no_gitignore);

        Ok(Self {
            root,
            config,
            out_dir,
            tsconfig,
            ignored_parent_interfaces,
            repo_root,
            write_menu,
            common: common.clone(),
            component_files,
        })
    }

    /// Command-line options this context was built from
    pub fn common(&self) -> &CommonOptions {
        &self.common
    }

    /// Whether a path is a component file this project documents
    pub fn is_component_file(&self, path: &Path) -> bool {
        self.component_files.is_component_file(path)
    }

    /// Collect component files under the given paths (the root when empty)
    pub fn collect_component_files(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        self.component_files.collect(paths)
    }

    /// One Program over all given files, resolved with the project's tsconfig
    pub fn build_program(&self, files: &[PathBuf]) -> Result<Program> {
        let mut builder = Program::builder().add_roots(files);
        if let Some(tsconfig) = &self.tsconfig {
            let config = TsConfig::load(tsconfig)
                .with_context(|| format!("Failed to load {}", tsconfig.display()))?;
            builder = builder.compiler_options(config.compiler_options);
        }
        builder.build().context("Failed to build program")
    }

    /// Extract every file's ComponentInfo in parallel, keeping input order
    pub fn extract(
        &self,
        program: &Program,
        files: &[PathBuf],
    ) -> Vec<(PathBuf, crate::error::Result<ComponentInfo>)> {
        files
            .par_iter()
            .map(|path| {
                let options = GetComponentInfoOptions::new(path)
                    .with_program(program)
                    .ignore_parent_interfaces(self.ignored_parent_interfaces.iter().cloned())
                    .with_repo_root(&self.repo_root);
                (path.clone(), get_component_info(&options))
            })
            .collect()
    }

    /// Extract and write the info files of the given component files
    pub fn document(
        &self,
        program: &Program,
        files: &[PathBuf],
        dry_run: bool,
        verbose: bool,
    ) -> GenerateReport {
        let mut report = GenerateReport::default();
        let mut owners: HashMap<String, PathBuf> = HashMap::new();

        for (path, result) in self.extract(program, files) {
            let info = match result {
                Ok(info) => info,
                Err(DocgenError::NoComponent { .. }) => {
                    debug!("Skipping {} (no component)", path.display());
                    report.skipped += 1;
                    continue;
                }
                Err(e) => {
                    error!("Error processing {}: {}", path.display(), e);
                    report.errors += 1;
                    continue;
                }
            };

            if let Some(owner) = owners.get(&info.display_name) {
                error!(
                    "Error processing {}: display name \"{}\" is already used by {}",
                    path.display(),
                    info.display_name,
                    owner.display()
                );
                report.errors += 1;
                continue;
            }
            owners.insert(info.display_name.clone(), path.clone());

            let info_path = self.out_dir.join(info_file_name(&info.display_name));
            let written = format_info(&info, false)
                .context("Failed to serialize component info")
                .and_then(|content| write_if_changed(&info_path, &content, dry_run));

            match written {
                Ok(WriteOutcome::Unchanged) => report.unchanged += 1,
                Ok(outcome) => {
                    report.generated += 1;
                    if outcome == WriteOutcome::DryRun {
                        println!("Would write to: {}", info_path.display());
                    } else if verbose {
                        println!("Generated: {}", info_path.display());
                    }
                }
                Err(e) => {
                    error!("Error writing {}: {:#}", info_path.display(), e);
                    report.errors += 1;
                    continue;
                }
            }
            report.outputs.insert(path, info_path);
        }

        report
    }

    /// Delete .info.json files in the output directory not listed in `keep`
    pub fn clean_stale(&self, keep: &HashSet<PathBuf>, dry_run: bool) -> Result<usize> {
        let mut removed = 0;
        for path in self.info_files()? {
            if keep.contains(&path) {
                continue;
            }
            if dry_run {
                println!("Would remove: {}", path.display());
            } else {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
                debug!("Removed stale {}", path.display());
            }
            removed += 1;
        }
        Ok(removed)
    }

    /// Rebuild componentMenu.json from the info files on disk
    pub fn write_component_menu(&self, dry_run: bool) -> Result<WriteOutcome> {
        let mut infos = Vec::new();
        for path in self.info_files()? {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let info = parse_info(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            infos.push(info);
        }

        let menu = build_component_menu(&infos);
        let content = format_info(&menu, false).context("Failed to serialize component menu")?;
        write_if_changed(&self.out_dir.join(MENU_FILE_NAME), &content, dry_run)
    }

    /// Existing .info.json files in the output directory, sorted
    fn info_files(&self) -> Result<Vec<PathBuf>> {
        if !self.out_dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        let entries = fs::read_dir(&self.out_dir)
            .with_context(|| format!("Failed to read {}", self.out_dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && is_info_file(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Write `content` unless the file already holds exactly that
pub fn write_if_changed(path: &Path, content: &str, dry_run: bool) -> Result<WriteOutcome> {
    if let Ok(existing) = fs::read_to_string(path) {
        if existing == content {
            return Ok(WriteOutcome::Unchanged);
        }
    }
    if dry_run {
        return Ok(WriteOutcome::DryRun);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create output directory")?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(WriteOutcome::Written)
}

pub fn run_generate(args: &GenerateArgs, root: &Path, verbose: bool) -> Result<()> {
    let ctx = GenerateContext::new(root, &args.common)?;

    let files = ctx.collect_component_files(&args.paths);
    if verbose {
        println!("Building program for {} component files...", files.len());
    }
    let program = ctx.build_program(&files)?;
    info!(
        "Loaded {} modules for {} component files",
        program.len(),
        files.len()
    );

    let report = ctx.document(&program, &files, args.dry_run, verbose);

    if args.clean || ctx.config.clean {
        let keep: HashSet<PathBuf> = report.outputs.values().cloned().collect();
        let removed = ctx.clean_stale(&keep, args.dry_run)?;
        if removed > 0 && verbose {
            println!("Removed {} stale file(s)", removed);
        }
    }

    if ctx.write_menu {
        if args.dry_run {
            println!(
                "Would write to: {}",
                ctx.out_dir.join(MENU_FILE_NAME).display()
            );
        } else if ctx.write_component_menu(false)? == WriteOutcome::Written && verbose {
            println!("Generated: {}", ctx.out_dir.join(MENU_FILE_NAME).display());
        }
    }

    println!("{}", report.summary());

    if report.errors > 0 {
        anyhow::bail!("{} files failed to process", report.errors);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::INFO_FILE_SUFFIX;
    use tempfile::TempDir;

    const PROPS_FILE: &str = r#"
export interface UIComponentProps {
  /** Additional CSS class name(s) to apply. */
  className?: string;
}
"#;

    const BUTTON: &str = r#"
import * as React from 'react';
import { UIComponentProps } from '../../utils';

export interface ButtonProps extends UIComponentProps {
  /** The button content. */
  content?: string;
  /** A button can be disabled. */
  disabled?: boolean;
}

/**
 * A Button enables users to take an action.
 */
export const Button: React.FC<ButtonProps> = props => <button>{props.content}</button>;

export default Button;
"#;

    const BUTTON_GROUP: &str = r#"
import * as React from 'react';

export interface ButtonGroupProps {
  /** Render buttons vertically. */
  vertical?: boolean;
}

export const ButtonGroup = (props: ButtonGroupProps) => <div />;

export default ButtonGroup;
"#;

    fn setup_project() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src/utils")).unwrap();
        fs::create_dir_all(root.join("src/components/Button")).unwrap();
        fs::write(root.join("src/utils/index.ts"), PROPS_FILE).unwrap();
        fs::write(root.join("src/components/Button/Button.tsx"), BUTTON).unwrap();
        fs::write(
            root.join("src/components/Button/ButtonGroup.tsx"),
            BUTTON_GROUP,
        )
        .unwrap();
        fs::write(
            root.join("src/components/Button/styles.tsx"),
            "export const color = 'red';\n",
        )
        .unwrap();
        temp_dir
    }

    fn generate_args() -> GenerateArgs {
        GenerateArgs::default()
    }

    #[test]
    fn test_generate_writes_info_files_and_menu() {
        let temp_dir = setup_project();
        let root = temp_dir.path();

        run_generate(&generate_args(), root, false).unwrap();

        let out_dir = root.join("componentInfo");
        let button = parse_info(&fs::read_to_string(out_dir.join("Button.info.json")).unwrap())
            .unwrap();
        assert_eq!(button.display_name, "Button");
        assert!(button.file.is_parent);
        let names: Vec<_> = button.props.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["className", "content", "disabled"]);

        let group =
            parse_info(&fs::read_to_string(out_dir.join("ButtonGroup.info.json")).unwrap())
                .unwrap();
        assert!(group.file.is_child);
        assert_eq!(group.file.parent_display_name.as_deref(), Some("Button"));

        let menu = fs::read_to_string(out_dir.join(MENU_FILE_NAME)).unwrap();
        assert!(menu.contains("\"displayName\": \"Button\""));
        assert!(!menu.contains("ButtonGroup"));

        // styles.tsx has no component and produces nothing
        assert!(!out_dir.join("styles.info.json").exists());
    }

    #[test]
    fn test_generate_ignored_parent_interface_from_config() {
        let temp_dir = setup_project();
        let root = temp_dir.path();
        fs::write(
            root.join("docgen.toml"),
            "ignored_parent_interfaces = [\"UIComponentProps\"]\n",
        )
        .unwrap();

        run_generate(&generate_args(), root, false).unwrap();

        let content =
            fs::read_to_string(root.join("componentInfo/Button.info.json")).unwrap();
        let button = parse_info(&content).unwrap();
        assert!(button.prop("className").is_none());
        assert!(button.prop("content").is_some());
    }

    #[test]
    fn test_generate_skips_unchanged_files() {
        let temp_dir = setup_project();
        let root = temp_dir.path();
        let ctx = GenerateContext::new(root, &CommonOptions::default()).unwrap();

        let files = ctx.collect_component_files(&[]);
        let program = ctx.build_program(&files).unwrap();
        let first = ctx.document(&program, &files, false, false);
        assert_eq!(first.generated, 2);
        assert_eq!(first.skipped, 1);
        assert_eq!(first.errors, 0);

        let second = ctx.document(&program, &files, false, false);
        assert_eq!(second.generated, 0);
        assert_eq!(second.unchanged, 2);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let temp_dir = setup_project();
        let root = temp_dir.path();
        let args = GenerateArgs {
            dry_run: true,
            ..Default::default()
        };

        run_generate(&args, root, false).unwrap();
        assert!(!root.join("componentInfo").exists());
    }

    #[test]
    fn test_clean_removes_stale_info_files() {
        let temp_dir = setup_project();
        let root = temp_dir.path();
        let out_dir = root.join("componentInfo");
        fs::create_dir_all(&out_dir).unwrap();
        fs::write(out_dir.join(format!("Removed{INFO_FILE_SUFFIX}")), "{}").unwrap();
        fs::write(out_dir.join("README.md"), "keep me").unwrap();

        let args = GenerateArgs {
            clean: true,
            ..Default::default()
        };
        run_generate(&args, root, false).unwrap();

        assert!(!out_dir.join("Removed.info.json").exists());
        assert!(out_dir.join("README.md").exists());
        assert!(out_dir.join("Button.info.json").exists());
    }

    #[test]
    fn test_errors_fail_the_run() {
        let temp_dir = setup_project();
        let root = temp_dir.path();
        fs::write(
            root.join("src/components/Button/Pair.tsx"),
            "export const A = () => <a />;\nexport const B = () => <b />;\nexport default A;\n",
        )
        .unwrap();

        let result = run_generate(&generate_args(), root, false);
        assert!(result.is_err());
        // The other components are still written
        assert!(root.join("componentInfo/Button.info.json").exists());
    }

    #[test]
    fn test_duplicate_display_name_is_an_error() {
        let temp_dir = setup_project();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src/legacy")).unwrap();
        fs::write(root.join("src/legacy/Button.tsx"), BUTTON).unwrap();

        let ctx = GenerateContext::new(root, &CommonOptions::default()).unwrap();
        let files = ctx.collect_component_files(&[]);
        let program = ctx.build_program(&files).unwrap();
        let report = ctx.document(&program, &files, false, false);

        assert_eq!(report.errors, 1);
        assert_eq!(report.generated, 2);
    }

    #[test]
    fn test_collect_respects_paths_and_output_dir() {
        let temp_dir = setup_project();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("componentInfo")).unwrap();
        fs::write(root.join("componentInfo/Stray.tsx"), BUTTON).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::write(root.join("node_modules/pkg/Dep.tsx"), BUTTON).unwrap();

        let ctx = GenerateContext::new(root, &CommonOptions::default()).unwrap();
        let all = ctx.collect_component_files(&[]);
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|p| p.starts_with(root.join("src"))));

        let single = ctx.collect_component_files(&[PathBuf::from(
            "src/components/Button/Button.tsx",
        )]);
        assert_eq!(single.len(), 1);

        let options = CommonOptions {
            exclude: vec!["**/ButtonGroup.tsx".to_string()],
            ..Default::default()
        };
        let ctx = GenerateContext::new(root, &options).unwrap();
        assert_eq!(ctx.collect_component_files(&[]).len(), 2);
        // Watch events go through the same --exclude patterns as the walk
        assert!(!ctx.is_component_file(&root.join("src/components/Button/ButtonGroup.tsx")));
        assert!(ctx.is_component_file(&root.join("src/components/Button/Button.tsx")));
    }

    #[test]
    fn test_write_if_changed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/out.json");

        assert_eq!(
            write_if_changed(&path, "{}\n", true).unwrap(),
            WriteOutcome::DryRun
        );
        assert!(!path.exists());
        assert_eq!(
            write_if_changed(&path, "{}\n", false).unwrap(),
            WriteOutcome::Written
        );
        assert_eq!(
            write_if_changed(&path, "{}\n", false).unwrap(),
            WriteOutcome::Unchanged
        );
    }
}
