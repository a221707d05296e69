//! @dose
//! purpose: Implements the watch command that monitors component and interface files for
//!     changes and incrementally regenerates the affected .info.json files using the
//!     reverse import graph.
//!
//! when-editing:
//!     - !The dependency graph must be kept in sync with the last program that was built
//!     - !Debouncing is critical for handling rapid file changes (IDE saves)
//!     - Uses notify crate for cross-platform file system watching
//!
//! invariants:
//!     - Initial full generation must complete before watching starts
//!     - docgen.toml changes trigger full regeneration
//!     - Deleted component files result in deleted .info.json files
//!     - Editing an interface file regenerates every component that imports it, directly or not
//!
//! gotchas:
//!     - A newly created interface file has no importers in the graph until an importer is
//!       saved again; imports that failed to resolve were never recorded as edges
//!     - Events inside the output directory are ignored, otherwise every write would loop
//!
//! flows:
//!     - Initial: Run full generation, build the dependency graph from its program
//!     - Watch: Receive notify events, debounce, determine affected component files
//!     - Update: Rebuild a program over the affected files, rewrite their info files and the menu

use crate::cli::WatchArgs;
use crate::commands::{GenerateContext, GenerateReport};
use crate::config::CONFIG_FILE;
use crate::dependency::{normalize_path, DependencyGraph};
use crate::parser::TypeScriptParser;
use crate::program::Program;
use anyhow::Result;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// The kind of change detected for a file
#[derive(Clone, Copy, PartialEq, Debug)]
enum ChangeKind {
    Create,
    Modify,
    Delete,
}

/// Everything watch mode remembers between batches of changes
struct WatchState {
    ctx: GenerateContext,
    paths: Vec<PathBuf>,
    graph: DependencyGraph,
    /// Known component files
    components: BTreeSet<PathBuf>,
    /// Component file -> info file last written for it
    outputs: BTreeMap<PathBuf, PathBuf>,
    verbose: bool,
}

impl WatchState {
    /// Full generation over the watched paths
    fn generate_all(ctx: GenerateContext, paths: &[PathBuf], verbose: bool) -> Result<Self> {
        let files = ctx.collect_component_files(paths);
        let program = ctx.build_program(&files)?;
        let report = ctx.document(&program, &files, false, verbose);

        let keep: HashSet<PathBuf> = report.outputs.values().cloned().collect();
        ctx.clean_stale(&keep, false)?;
        if ctx.write_menu {
            ctx.write_component_menu(false)?;
        }
        println!("{}", report.summary());

        Ok(Self {
            graph: DependencyGraph::from_program(&program),
            components: files.into_iter().collect(),
            outputs: report.outputs,
            ctx,
            paths: paths.to_vec(),
            verbose,
        })
    }

    /// Rewrite the info files of the given component files
    fn regenerate(&mut self, files: &[PathBuf]) -> Result<GenerateReport> {
        let program = self.ctx.build_program(files)?;
        let report = self.ctx.document(&program, files, false, self.verbose);
        self.refresh_graph(&program);

        for file in files {
            let previous = self.outputs.remove(file);
            match report.outputs.get(file) {
                Some(current) => {
                    // A renamed component leaves its old info file behind
                    if let Some(previous) = previous.filter(|p| p != current) {
                        self.delete_output(&previous);
                    }
                    self.outputs.insert(file.clone(), current.clone());
                }
                None => {
                    if let Some(previous) = previous {
                        self.delete_output(&previous);
                    }
                }
            }
        }

        Ok(report)
    }

    fn refresh_graph(&mut self, program: &Program) {
        for module in program.modules() {
            self.graph
                .update_file(module.path(), module.dependencies().to_vec());
        }
    }

    fn delete_output(&self, info_path: &Path) {
        if !info_path.exists() {
            return;
        }
        match fs::remove_file(info_path) {
            Ok(()) => debug!("Deleted {}", info_path.display()),
            Err(e) => warn!("Failed to delete {}: {}", info_path.display(), e),
        }
    }

    fn is_watched(&self, path: &Path) -> bool {
        self.paths.is_empty()
            || self
                .paths
                .iter()
                .any(|p| path.starts_with(self.ctx.root.join(p)))
    }
}

pub fn run_watch(args: &WatchArgs, root: &Path, verbose: bool) -> Result<()> {
    // Initial full generation
    println!("Running initial generation...");
    let ctx = GenerateContext::new(root, &args.common)?;
    let mut state = WatchState::generate_all(ctx, &args.paths, verbose)?;

    // Set up file watcher
    let (tx, rx) = mpsc::channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                let _ = tx.send(event);
            }
        },
        notify::Config::default(),
    )?;

    // The whole root is watched so edits to shared interface files are seen
    watcher.watch(&state.ctx.root, RecursiveMode::Recursive)?;
    if verbose {
        println!("Watching: {}", state.ctx.root.display());
    }

    println!("Watching for changes... (press Ctrl+C to stop)");

    // Event loop with debouncing
    let mut pending: HashMap<PathBuf, ChangeKind> = HashMap::new();
    let mut last_event = Instant::now();
    let debounce = Duration::from_millis(args.debounce);
    let poll_interval = Duration::from_millis(50);

    loop {
        match rx.recv_timeout(poll_interval) {
            Ok(event) => {
                process_event(&event, &mut pending, &state.ctx.root, &state.ctx.out_dir);
                last_event = Instant::now();
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                // Check if debounce period has elapsed and we have pending changes
                if !pending.is_empty() && last_event.elapsed() >= debounce {
                    if args.clear {
                        // Clear terminal (ANSI escape code)
                        print!("\x1B[2J\x1B[1;1H");
                    }
                    if let Err(e) = process_pending_changes(&mut pending, &mut state) {
                        error!("Regeneration failed: {:#}", e);
                    }
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                println!("Watcher disconnected");
                break;
            }
        }
    }

    Ok(())
}

/// Process a notify event and add to pending changes
fn process_event(
    event: &Event,
    pending: &mut HashMap<PathBuf, ChangeKind>,
    root: &Path,
    out_dir: &Path,
) {
    let kind = match &event.kind {
        EventKind::Create(_) => ChangeKind::Create,
        EventKind::Modify(_) => ChangeKind::Modify,
        EventKind::Remove(_) => ChangeKind::Delete,
        _ => return, // Ignore other events
    };

    let parser = TypeScriptParser::new();
    for path in &event.paths {
        let path = normalize_path(path);

        // Skip non-source files (but include docgen.toml for config changes)
        let is_config = path == root.join(CONFIG_FILE);
        if !is_config && !parser.is_supported(&path) {
            continue;
        }
        if path.starts_with(out_dir) {
            continue;
        }

        // Coalesce events: Create + Modify = Create, Modify + Delete = Delete
        pending
            .entry(path)
            .and_modify(|existing| *existing = coalesce(*existing, kind))
            .or_insert(kind);
    }
}

fn coalesce(existing: ChangeKind, new: ChangeKind) -> ChangeKind {
    match (existing, new) {
        (ChangeKind::Create, ChangeKind::Modify) => ChangeKind::Create,
        (ChangeKind::Create, ChangeKind::Delete) => ChangeKind::Delete,
        (ChangeKind::Modify, ChangeKind::Delete) => ChangeKind::Delete,
        (_, new) => new,
    }
}

/// Process all pending file changes
fn process_pending_changes(
    pending: &mut HashMap<PathBuf, ChangeKind>,
    state: &mut WatchState,
) -> Result<()> {
    let timestamp = chrono_lite_timestamp();

    // Check for config file change -> full regen
    if pending.contains_key(&state.ctx.root.join(CONFIG_FILE)) {
        println!("[{}] Config changed, running full regeneration...", timestamp);
        pending.clear();
        let ctx = GenerateContext::new(&state.ctx.root, state.ctx.common())?;
        let paths = state.paths.clone();
        *state = WatchState::generate_all(ctx, &paths, state.verbose)?;
        return Ok(());
    }

    // Calculate all affected component files
    let mut affected: BTreeSet<PathBuf> = BTreeSet::new();
    let mut deleted = 0;

    let mut changes: Vec<_> = pending.drain().collect();
    changes.sort_by(|a, b| a.0.cmp(&b.0));

    for (path, kind) in changes {
        let rel_path = path.strip_prefix(&state.ctx.root).unwrap_or(&path);

        match kind {
            ChangeKind::Delete => {
                // Collect importers before the file leaves the graph
                affected.extend(state.graph.transitive_importers(&path));
                state.graph.remove_file(&path);

                if state.components.remove(&path) {
                    if let Some(info_path) = state.outputs.remove(&path) {
                        state.delete_output(&info_path);
                        deleted += 1;
                    }
                }

                println!("[{}] Deleted: {}", timestamp, rel_path.display());
            }
            ChangeKind::Create | ChangeKind::Modify => {
                if state.is_watched(&path) && state.ctx.is_component_file(&path) {
                    state.components.insert(path.clone());
                }
                affected.extend(state.graph.transitive_importers(&path));

                let action = if kind == ChangeKind::Create {
                    "Created"
                } else {
                    "Modified"
                };
                println!("[{}] {}: {}", timestamp, action, rel_path.display());
            }
        }
    }

    let to_regenerate: Vec<PathBuf> = affected
        .into_iter()
        .filter(|p| state.components.contains(p) && p.exists())
        .collect();

    let report = if to_regenerate.is_empty() {
        GenerateReport::default()
    } else {
        state.regenerate(&to_regenerate)?
    };

    if state.ctx.write_menu && (report.generated > 0 || deleted > 0) {
        state.ctx.write_component_menu(false)?;
    }

    if report.generated > 0 || deleted > 0 {
        println!(
            "[{}] Regenerated {} file(s), deleted {} file(s)",
            timestamp, report.generated, deleted
        );
    }
    if report.errors > 0 {
        println!("[{}] {} file(s) failed to process", timestamp, report.errors);
    }

    Ok(())
}

/// Simple timestamp without external crate
fn chrono_lite_timestamp() -> String {
    use std::time::SystemTime;
    let duration = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = duration.as_secs();
    let hours = (secs / 3600) % 24;
    let mins = (secs / 60) % 60;
    let secs = secs % 60;
    format!("{:02}:{:02}:{:02}", hours, mins, secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CommonOptions;
    use crate::formatter::parse_info;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};
    use tempfile::TempDir;

    const SHARED: &str = r#"
export interface ColorProps {
  /** Color of the component. */
  color?: string;
}
"#;

    const BADGE: &str = r#"
import * as React from 'react';
import { ColorProps } from '../shared';

export interface BadgeProps extends ColorProps {
  /** Badge text. */
  label?: string;
}

export const Badge = (props: BadgeProps) => <span />;

export default Badge;
"#;

    fn setup() -> (TempDir, WatchState) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src/Badge")).unwrap();
        fs::write(root.join("src/shared.ts"), SHARED).unwrap();
        fs::write(root.join("src/Badge/Badge.tsx"), BADGE).unwrap();

        let ctx = GenerateContext::new(root, &CommonOptions::default()).unwrap();
        let state = WatchState::generate_all(ctx, &[], false).unwrap();
        (temp_dir, state)
    }

    fn event(kind: EventKind, path: PathBuf) -> Event {
        Event::new(kind).add_path(path)
    }

    #[test]
    fn test_coalesce_events() {
        use ChangeKind::*;
        assert_eq!(coalesce(Create, Modify), Create);
        assert_eq!(coalesce(Create, Delete), Delete);
        assert_eq!(coalesce(Modify, Delete), Delete);
        assert_eq!(coalesce(Delete, Create), Create);
        assert_eq!(coalesce(Modify, Modify), Modify);
    }

    #[test]
    fn test_process_event_filters_paths() {
        let root = PathBuf::from("/project");
        let out_dir = root.join("componentInfo");
        let mut pending = HashMap::new();

        process_event(
            &event(EventKind::Create(CreateKind::File), root.join("src/A.tsx")),
            &mut pending,
            &root,
            &out_dir,
        );
        process_event(
            &event(EventKind::Modify(ModifyKind::Any), root.join("src/A.tsx")),
            &mut pending,
            &root,
            &out_dir,
        );
        process_event(
            &event(EventKind::Modify(ModifyKind::Any), root.join("README.md")),
            &mut pending,
            &root,
            &out_dir,
        );
        process_event(
            &event(
                EventKind::Modify(ModifyKind::Any),
                out_dir.join("A.info.json"),
            ),
            &mut pending,
            &root,
            &out_dir,
        );
        process_event(
            &event(EventKind::Modify(ModifyKind::Any), root.join(CONFIG_FILE)),
            &mut pending,
            &root,
            &out_dir,
        );
        process_event(
            &event(EventKind::Remove(RemoveKind::File), root.join("src/B.ts")),
            &mut pending,
            &root,
            &out_dir,
        );

        assert_eq!(pending.len(), 3);
        assert_eq!(pending[&root.join("src/A.tsx")], ChangeKind::Create);
        assert_eq!(pending[&root.join("src/B.ts")], ChangeKind::Delete);
        assert!(pending.contains_key(&root.join(CONFIG_FILE)));
    }

    #[test]
    fn test_interface_change_regenerates_importers() {
        let (temp_dir, mut state) = setup();
        let root = temp_dir.path();
        let info_path = state.ctx.out_dir.join("Badge.info.json");
        assert!(parse_info(&fs::read_to_string(&info_path).unwrap())
            .unwrap()
            .prop("size")
            .is_none());

        fs::write(
            root.join("src/shared.ts"),
            SHARED.replace("color?: string;", "color?: string;\n  /** Size. */\n  size?: number;"),
        )
        .unwrap();

        let mut pending = HashMap::new();
        pending.insert(root.join("src/shared.ts"), ChangeKind::Modify);
        process_pending_changes(&mut pending, &mut state).unwrap();

        assert!(pending.is_empty());
        let badge = parse_info(&fs::read_to_string(&info_path).unwrap()).unwrap();
        assert!(badge.prop("size").is_some());
        assert!(badge.prop("color").is_some());
    }

    #[test]
    fn test_deleted_component_removes_info_file() {
        let (temp_dir, mut state) = setup();
        let root = temp_dir.path();
        let info_path = state.ctx.out_dir.join("Badge.info.json");
        assert!(info_path.exists());

        fs::remove_file(root.join("src/Badge/Badge.tsx")).unwrap();
        let mut pending = HashMap::new();
        pending.insert(root.join("src/Badge/Badge.tsx"), ChangeKind::Delete);
        process_pending_changes(&mut pending, &mut state).unwrap();

        assert!(!info_path.exists());
        assert!(state.components.is_empty());
        let menu = fs::read_to_string(state.ctx.out_dir.join("componentMenu.json")).unwrap();
        assert_eq!(menu.trim(), "[]");
    }

    #[test]
    fn test_created_component_is_generated() {
        let (temp_dir, mut state) = setup();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src/Chip")).unwrap();
        fs::write(
            root.join("src/Chip/Chip.tsx"),
            BADGE.replace("Badge", "Chip"),
        )
        .unwrap();

        let mut pending = HashMap::new();
        pending.insert(root.join("src/Chip/Chip.tsx"), ChangeKind::Create);
        process_pending_changes(&mut pending, &mut state).unwrap();

        assert!(state.ctx.out_dir.join("Chip.info.json").exists());
        assert_eq!(state.outputs.len(), 2);
    }

    #[test]
    fn test_renamed_component_replaces_info_file() {
        let (temp_dir, mut state) = setup();
        let root = temp_dir.path();
        fs::write(
            root.join("src/Badge/Badge.tsx"),
            format!("{BADGE}\nBadge.displayName = 'Tag';\n"),
        )
        .unwrap();

        let mut pending = HashMap::new();
        pending.insert(root.join("src/Badge/Badge.tsx"), ChangeKind::Modify);
        process_pending_changes(&mut pending, &mut state).unwrap();

        assert!(state.ctx.out_dir.join("Tag.info.json").exists());
        assert!(!state.ctx.out_dir.join("Badge.info.json").exists());
    }

    #[test]
    fn test_config_change_runs_full_regeneration() {
        let (temp_dir, mut state) = setup();
        let root = temp_dir.path();
        fs::write(root.join(CONFIG_FILE), "[output]\ndir = \"docs\"\n").unwrap();

        let mut pending = HashMap::new();
        pending.insert(root.join(CONFIG_FILE), ChangeKind::Modify);
        process_pending_changes(&mut pending, &mut state).unwrap();

        assert_eq!(state.ctx.out_dir, root.join("docs"));
        assert!(root.join("docs/Badge.info.json").exists());
    }

    #[test]
    fn test_timestamp_format() {
        let ts = chrono_lite_timestamp();
        assert_eq!(ts.len(), 8);
        assert_eq!(ts.matches(':').count(), 2);
    }
}
