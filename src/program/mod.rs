//! @dose
//! purpose: The shared type-resolution context. A Program is a set of parsed modules: the
//!     root files plus everything they transitively import that resolves to a file on
//!     disk. Prop resolution walks imports through it, and batch generation builds one
//!     Program for all component files instead of one per file.
//!
//! when-editing:
//!     - !Modules are keyed by absolute, lexically normalized path
//!     - !A Program is immutable once built; only the default-props cache mutates (Mutex)
//!     - Resolution order: relative, then tsconfig `paths`, then `baseUrl`
//!
//! invariants:
//!     - Every path in SourceModule::dependencies is a key of Program::modules,
//!       unless that file failed to parse (warned and skipped)
//!     - Failing to load a root file fails the build; failing to load a dependency does not
//!
//! gotchas:
//!     - Extensions are appended, not replaced: './Box.styles' must find 'Box.styles.ts'
//!     - Bare specifiers ('react', '@fluentui/styles') are external unless `paths` or
//!       `baseUrl` map them to a file
//!
//! flows:
//!     - for_file: one root, optional tsconfig for compiler options
//!     - from_tsconfig: roots from files/include/exclude
//!     - builder: many roots (generate, watch)

pub mod tsconfig;

use crate::dependency::{absolutize, normalize_path};
use crate::error::{DocgenError, Result};
use crate::parser::declarations::{extract_declarations, ModuleDeclarations};
use crate::parser::defaults::{DefaultProps, DefaultPropsCache};
use crate::parser::{ParsedFile, TypeScriptParser};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};
use tsconfig::{CompilerOptions, TsConfig};

/// Extensions tried when resolving an import, in priority order
pub const RESOLVE_EXTENSIONS: &[&str] = &["tsx", "ts", "d.ts", "jsx", "js"];

/// One parsed file of a program
#[derive(Debug)]
pub struct SourceModule {
    file: ParsedFile,
    declarations: ModuleDeclarations,
    /// Specifier -> resolved file, for specifiers that resolved
    resolved: HashMap<String, PathBuf>,
    dependencies: Vec<PathBuf>,
}

impl SourceModule {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn file(&self) -> &ParsedFile {
        &self.file
    }

    pub fn declarations(&self) -> &ModuleDeclarations {
        &self.declarations
    }

    /// Resolved files this module imports or re-exports from, sorted
    pub fn dependencies(&self) -> &[PathBuf] {
        &self.dependencies
    }

    /// File a specifier of this module resolved to
    pub fn resolved(&self, specifier: &str) -> Option<&Path> {
        self.resolved.get(specifier).map(PathBuf::as_path)
    }
}

/// Parsed modules plus the compiler options used to resolve between them
#[derive(Debug)]
pub struct Program {
    options: CompilerOptions,
    modules: HashMap<PathBuf, SourceModule>,
    roots: Vec<PathBuf>,
    defaults: DefaultPropsCache,
}

impl Program {
    pub fn builder() -> ProgramBuilder {
        ProgramBuilder::default()
    }

    /// Program for a single file, with compiler options from an optional tsconfig
    pub fn for_file(path: &Path, tsconfig: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder();
        if let Some(tsconfig) = tsconfig {
            builder = builder.compiler_options(TsConfig::load(tsconfig)?.compiler_options);
        }
        builder.add_root(path).build()
    }

    /// Program for every root file a tsconfig names
    pub fn from_tsconfig(path: &Path) -> Result<Self> {
        let config = TsConfig::load(path)?;
        Self::builder()
            .add_roots(config.root_files(RESOLVE_EXTENSIONS))
            .compiler_options(config.compiler_options)
            .build()
    }

    pub fn compiler_options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn module(&self, path: &Path) -> Option<&SourceModule> {
        self.modules.get(path)
    }

    /// All modules, in no particular order
    pub fn modules(&self) -> impl Iterator<Item = &SourceModule> {
        self.modules.values()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.modules.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Module a specifier of `from` resolves to, if it is part of the program
    pub fn resolve_import(&self, from: &SourceModule, specifier: &str) -> Option<&SourceModule> {
        from.resolved(specifier).and_then(|p| self.module(p))
    }

    /// Statically resolved defaults of a component binding, cached by content
    pub fn default_props(&self, file: &ParsedFile, binding: &str) -> Arc<DefaultProps> {
        self.defaults.get_or_resolve(file, binding)
    }
}

/// Builds a Program from root files and their import closure
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    options: CompilerOptions,
    roots: Vec<PathBuf>,
}

impl ProgramBuilder {
    pub fn compiler_options(mut self, options: CompilerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn add_root(mut self, path: impl AsRef<Path>) -> Self {
        self.roots.push(path.as_ref().to_path_buf());
        self
    }

    pub fn add_roots<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.roots
            .extend(paths.into_iter().map(|p| p.as_ref().to_path_buf()));
        self
    }

    /// Parse the roots, then follow imports breadth-first, parsing each level in parallel
    pub fn build(self) -> Result<Program> {
        let parser = TypeScriptParser::new();
        let mut roots = Vec::with_capacity(self.roots.len());
        for root in &self.roots {
            let abs = absolutize(root).map_err(|source| DocgenError::Io {
                path: root.clone(),
                source,
            })?;
            roots.push(abs);
        }
        roots.sort();
        roots.dedup();

        let root_set: HashSet<PathBuf> = roots.iter().cloned().collect();
        let mut seen: HashSet<PathBuf> = root_set.clone();
        let mut frontier = roots.clone();
        let mut modules = HashMap::new();

        while !frontier.is_empty() {
            let loaded: Vec<(PathBuf, Result<SourceModule>)> = frontier
                .par_iter()
                .map(|path| (path.clone(), load_module(&parser, path, &self.options)))
                .collect();

            let mut next = Vec::new();
            for (path, result) in loaded {
                match result {
                    Ok(module) => {
                        for dep in &module.dependencies {
                            if seen.insert(dep.clone()) {
                                next.push(dep.clone());
                            }
                        }
                        modules.insert(path, module);
                    }
                    Err(e) if root_set.contains(&path) => return Err(e),
                    Err(e) => warn!("Skipping unreadable dependency {}: {}", path.display(), e),
                }
            }
            frontier = next;
        }

        debug!(
            "Built program: {} roots, {} modules",
            roots.len(),
            modules.len()
        );

        Ok(Program {
            options: self.options,
            modules,
            roots,
            defaults: DefaultPropsCache::new(),
        })
    }
}

fn load_module(
    parser: &TypeScriptParser,
    path: &Path,
    options: &CompilerOptions,
) -> Result<SourceModule> {
    let file = parser.parse_file(path)?;
    let declarations = extract_declarations(&file);
    let from_dir = path.parent().unwrap_or(Path::new("/"));

    let mut resolved = HashMap::new();
    for specifier in declarations.specifiers() {
        if let Some(target) = resolve_module(from_dir, &specifier, options) {
            resolved.insert(specifier, target);
        }
    }

    let mut dependencies: Vec<PathBuf> = resolved.values().cloned().collect();
    dependencies.sort();
    dependencies.dedup();

    Ok(SourceModule {
        file,
        declarations,
        resolved,
        dependencies,
    })
}

/// Resolve an import specifier to a file on disk
pub fn resolve_module(from_dir: &Path, specifier: &str, options: &CompilerOptions) -> Option<PathBuf> {
    if specifier.starts_with("./") || specifier.starts_with("../") || specifier == "." || specifier == ".." {
        return with_extensions(&normalize_path(&from_dir.join(specifier)));
    }
    if Path::new(specifier).is_absolute() {
        return with_extensions(&normalize_path(Path::new(specifier)));
    }

    for target in options.map_path(specifier) {
        if let Some(found) = with_extensions(&normalize_path(&target)) {
            return Some(found);
        }
    }

    options
        .base_url
        .as_ref()
        .and_then(|base| with_extensions(&normalize_path(&base.join(specifier))))
}

/// Try `base` as a file, with each extension appended, then as a directory index
fn with_extensions(base: &Path) -> Option<PathBuf> {
    let has_supported_ext = base
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| RESOLVE_EXTENSIONS.contains(&e))
        .unwrap_or(false);
    if has_supported_ext && base.is_file() {
        return Some(base.to_path_buf());
    }

    let with_ext = |b: &Path, ext: &str| PathBuf::from(format!("{}.{}", b.display(), ext));

    RESOLVE_EXTENSIONS
        .iter()
        .map(|ext| with_ext(base, ext))
        .chain(RESOLVE_EXTENSIONS.iter().map(|ext| base.join(format!("index.{ext}"))))
        .find(|candidate| candidate.is_file())
}
