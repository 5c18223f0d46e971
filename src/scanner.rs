//! Component discovery
//!
//! [`Discovery`] is the pluggable strategy that turns a root namespace into
//! the set of component types to register. [`DirectoryScanner`] walks the
//! source directories on a [`LoadPath`], reconstructs a module path for every
//! `.rs` file it finds, and loads the types declared in each module from the
//! [`TypeCatalog`]. [`CatalogScanner`] skips the filesystem entirely.
//!
//! Only directory-backed source trees are scanned. A load path entry that is
//! not a directory (for example a packaged `.crate` archive) contributes
//! nothing, and inline `mod name { ... }` blocks have no file to be found by.

use crate::catalog::TypeCatalog;
use crate::metadata::ComponentType;
use crate::{DiError, Result};
use ahash::RandomState;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(feature = "logging")]
use tracing::{debug, trace, warn};

/// Environment variable read by [`LoadPath::from_env`]
pub const LOAD_PATH_ENV: &str = "SIMPLE_IOC_LOAD_PATH";

/// Discovered component types: deduplicated and unordered
pub type ComponentSet = HashSet<ComponentType, RandomState>;

/// A strategy for finding the components under a namespace
pub trait Discovery: Send + Sync {
    fn discover(&self, namespace: &str, catalog: &TypeCatalog) -> Result<ComponentSet>;
}

/// Enclosing module path of a type name, ignoring generic arguments.
///
/// `app::services::UserComponent` → `app::services`
pub fn namespace_of(type_name: &str) -> &str {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rsplit_once("::").map(|(module, _)| module).unwrap_or("")
}

/// Root namespace for a root type `T`
pub fn root_namespace<T: ?Sized + 'static>() -> &'static str {
    namespace_of(std::any::type_name::<T>())
}

// =============================================================================
// LoadPath
// =============================================================================

/// A directory holding the sources of one crate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRoot {
    crate_name: String,
    dir: PathBuf,
}

impl SourceRoot {
    /// `crate_name` is normalized to its Rust identifier form (`-` → `_`)
    pub fn new(crate_name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            crate_name: crate_name.into().replace('-', "_"),
            dir: dir.into(),
        }
    }

    /// Source root for the crate whose root file is `root_file`.
    ///
    /// `root_file` is what `file!()` expands to: relative to the manifest
    /// directory for a standalone package, but relative to the workspace root
    /// for a workspace member. It is resolved against `manifest_dir` first,
    /// then against each ancestor, and the first existing file wins.
    ///
    /// Backs the [`source_root!`](crate::source_root) macro.
    pub fn from_root_file(crate_name: &str, manifest_dir: &str, root_file: &str) -> Self {
        let manifest_dir = Path::new(manifest_dir);
        let file = manifest_dir
            .ancestors()
            .map(|base| base.join(root_file))
            .find(|candidate| candidate.is_file())
            .unwrap_or_else(|| manifest_dir.join(root_file));
        let dir = file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| manifest_dir.to_path_buf());
        Self::new(crate_name, dir)
    }

    pub fn crate_name(&self) -> &str {
        &self.crate_name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether `stem.rs` in this root directory is the crate root file
    fn is_crate_root_file(&self, stem: &str) -> bool {
        stem == "lib" || stem == "main" || stem == self.crate_name
    }
}

/// Source root of the calling crate.
///
/// Must be invoked from the crate root file (`lib.rs`, `main.rs`, or the
/// root file of an example or integration test).
#[macro_export]
macro_rules! source_root {
    () => {
        $crate::SourceRoot::from_root_file(
            ::std::env!("CARGO_CRATE_NAME"),
            ::std::env!("CARGO_MANIFEST_DIR"),
            ::std::file!(),
        )
    };
}

/// Ordered list of source roots searched by [`DirectoryScanner`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadPath {
    roots: Vec<SourceRoot>,
}

impl LoadPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, root: SourceRoot) {
        self.roots.push(root);
    }

    /// Builder-style [`push`](Self::push)
    pub fn with(mut self, root: SourceRoot) -> Self {
        self.push(root);
        self
    }

    /// Parse `crate=dir` entries separated by the platform path separator
    pub fn parse(value: &str) -> Result<Self> {
        let mut load_path = Self::new();
        for entry in std::env::split_paths(value) {
            let entry = entry.to_string_lossy().into_owned();
            if entry.is_empty() {
                continue;
            }
            match entry.split_once('=') {
                Some((crate_name, dir)) if !crate_name.is_empty() && !dir.is_empty() => {
                    load_path.push(SourceRoot::new(crate_name, dir));
                }
                _ => return Err(DiError::InvalidLoadPath { entry }),
            }
        }
        Ok(load_path)
    }

    /// Read [`LOAD_PATH_ENV`]; an unset variable gives an empty load path
    pub fn from_env() -> Result<Self> {
        match std::env::var(LOAD_PATH_ENV) {
            Ok(value) => Self::parse(&value),
            Err(_) => Ok(Self::new()),
        }
    }

    pub fn roots(&self) -> &[SourceRoot] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

// =============================================================================
// DirectoryScanner
// =============================================================================

/// Discovers components by walking source directories
#[derive(Debug, Clone, Default)]
pub struct DirectoryScanner {
    load_path: LoadPath,
}

impl DirectoryScanner {
    pub fn new(load_path: LoadPath) -> Self {
        Self { load_path }
    }

    pub fn load_path(&self) -> &LoadPath {
        &self.load_path
    }

    /// Module paths of every source file under `namespace`
    pub fn scan_namespace(&self, namespace: &str) -> Result<BTreeSet<String>> {
        let mut modules = BTreeSet::new();

        let mut segments = namespace.split("::");
        let crate_name = match segments.next() {
            Some(name) if !name.is_empty() => name,
            _ => return Ok(modules),
        };
        let nested: Vec<&str> = segments.collect();

        for root in self
            .load_path
            .roots()
            .iter()
            .filter(|root| root.crate_name() == crate_name)
        {
            if !root.dir().is_dir() {
                #[cfg(feature = "logging")]
                debug!(
                    target: "simple_ioc",
                    path = %root.dir().display(),
                    "Source root is not a directory, skipping"
                );
                continue;
            }

            let module_dir = nested
                .iter()
                .fold(root.dir().to_path_buf(), |dir, segment| dir.join(segment));

            // The file that declares the namespace module itself
            let declares_namespace = if nested.is_empty() {
                ["lib", "main", root.crate_name()]
                    .iter()
                    .any(|stem| root.dir().join(format!("{stem}.rs")).is_file())
            } else {
                module_dir.with_extension("rs").is_file()
            };
            if declares_namespace {
                modules.insert(namespace.to_string());
            }

            if module_dir.is_dir() {
                let mut visited = HashSet::default();
                scan_directory(
                    root,
                    &module_dir,
                    namespace,
                    nested.is_empty(),
                    &mut visited,
                    &mut modules,
                );
            }
        }

        Ok(modules)
    }
}

/// Recursively collect module paths under `dir`, which backs `module`.
///
/// Directories that cannot be read are logged and skipped; their siblings are
/// still scanned. Symlinked directories are followed, each real directory at
/// most once.
fn scan_directory(
    root: &SourceRoot,
    dir: &Path,
    module: &str,
    is_crate_root: bool,
    visited: &mut HashSet<PathBuf, RandomState>,
    modules: &mut BTreeSet<String>,
) {
    let real_dir = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
    if !visited.insert(real_dir) {
        return;
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            skip_unreadable(dir, &e);
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                skip_unreadable(dir, &e);
                continue;
            }
        };
        let path = entry.path();
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };

        // Follows symlinks
        if path.is_dir() {
            let nested = format!("{module}::{file_name}");
            scan_directory(root, &path, &nested, false, visited, modules);
        } else if let Some(stem) = file_name.strip_suffix(".rs") {
            let name = if stem == "mod" || (is_crate_root && root.is_crate_root_file(stem)) {
                module.to_string()
            } else {
                format!("{module}::{stem}")
            };

            #[cfg(feature = "logging")]
            trace!(
                target: "simple_ioc",
                file = %path.display(),
                module = %name,
                "Found source file"
            );

            modules.insert(name);
        }
    }
}

fn skip_unreadable(path: &Path, err: &std::io::Error) {
    let err = DiError::scan(path, err);

    #[cfg(feature = "logging")]
    warn!(
        target: "simple_ioc",
        path = %path.display(),
        error = %err,
        "Cannot read source directory, skipping"
    );
    #[cfg(not(feature = "logging"))]
    let _ = err;
}

impl Discovery for DirectoryScanner {
    fn discover(&self, namespace: &str, catalog: &TypeCatalog) -> Result<ComponentSet> {
        let mut components = ComponentSet::default();

        for module in self.scan_namespace(namespace)? {
            match catalog.load_module(&module) {
                Ok(types) => {
                    components.extend(types.into_iter().filter(ComponentType::is_component));
                }
                Err(e) => {
                    // Not every file declares components
                    #[cfg(feature = "logging")]
                    debug!(
                        target: "simple_ioc",
                        module = %module,
                        error = %e,
                        "No loadable types in module, skipping"
                    );
                    #[cfg(not(feature = "logging"))]
                    let _ = e;
                }
            }
        }

        Ok(components)
    }
}

// =============================================================================
// CatalogScanner
// =============================================================================

/// Discovers components straight from the catalog by module prefix.
///
/// Unlike [`DirectoryScanner`] it also finds types in inline modules and in
/// crates whose sources are not on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogScanner;

impl Discovery for CatalogScanner {
    fn discover(&self, namespace: &str, catalog: &TypeCatalog) -> Result<ComponentSet> {
        let prefix = format!("{namespace}::");
        Ok(catalog
            .types()
            .filter(|ty| ty.is_component())
            .filter(|ty| ty.module_path() == namespace || ty.module_path().starts_with(&prefix))
            .cloned()
            .collect())
    }
}
