//! Module resolution for executed scripts.
//!
//! The resolver is consulted whenever a script references an external
//! package name. It activates only for names carrying the recognized
//! external-package prefix; everything else belongs to the engine's own
//! resolution order. For a matching name it maps the reference to an entry
//! file inside the package store.
//!
//! A resolver instance caches its successes for its own lifetime and is
//! constructed fresh per run, so a cache never masks a package installed
//! after the previous run. Nothing is cached before the package is
//! confirmed present on disk.

use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::name::PackageName;
use crate::runtime::Runtime;
use crate::store::PackageStore;

/// Names with this prefix are external-package references.
pub const PACKAGE_PREFIX: &str = "pyra";

/// Conventional package root file, preferred as the entry point.
pub const PACKAGE_ROOT_FILE: &str = "__init__.py";

/// Extension of candidate entry files.
pub const MODULE_EXTENSION: &str = "py";

/// A package resolved to a loadable unit of code.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedModule {
    pub name: PackageName,
    pub dir: PathBuf,
    pub entry_file: PathBuf,
}

/// Name-resolution hook consulted by the script runner.
pub trait Resolver {
    /// Whether the name matches the external-package naming convention.
    fn matches(&self, name: &str) -> bool;

    /// Resolve a referenced name to an installed package's entry file.
    fn resolve(&mut self, name: &str) -> Result<ResolvedModule, Error>;
}

/// Resolver backed by the package store.
pub struct StoreResolver<'a, R: Runtime> {
    runtime: &'a R,
    store: PackageStore<'a, R>,
    cache: HashMap<String, ResolvedModule>,
}

impl<'a, R: Runtime> StoreResolver<'a, R> {
    pub fn new(runtime: &'a R, root: PathBuf) -> Self {
        Self {
            runtime,
            store: PackageStore::new(runtime, root),
            cache: HashMap::new(),
        }
    }

    /// Entry point of an installed package: the conventional root file when
    /// present, otherwise the single candidate source file. Zero or several
    /// candidates with no root file is an error, not a guess.
    fn entry_file(&self, name: &PackageName, dir: &Path) -> Result<PathBuf, Error> {
        let root_file = dir.join(PACKAGE_ROOT_FILE);
        if self.runtime.exists(&root_file) {
            return Ok(root_file);
        }

        let entries = self.runtime.read_dir(dir).map_err(|e| Error::AmbiguousEntry {
            name: name.display().to_string(),
            reason: format!("cannot read package directory: {e:#}"),
        })?;

        let mut candidates: Vec<PathBuf> = entries
            .into_iter()
            .filter(|p| !self.runtime.is_dir(p))
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(MODULE_EXTENSION))
            .collect();

        match candidates.len() {
            1 => Ok(candidates.remove(0)),
            0 => Err(Error::AmbiguousEntry {
                name: name.display().to_string(),
                reason: "no candidate entry files".to_string(),
            }),
            n => Err(Error::AmbiguousEntry {
                name: name.display().to_string(),
                reason: format!("{} candidate entry files and no {}", n, PACKAGE_ROOT_FILE),
            }),
        }
    }
}

impl<R: Runtime> Resolver for StoreResolver<'_, R> {
    fn matches(&self, name: &str) -> bool {
        PackageName::new(name).display().starts_with(PACKAGE_PREFIX)
    }

    #[tracing::instrument(skip(self))]
    fn resolve(&mut self, name: &str) -> Result<ResolvedModule, Error> {
        let canonical = PackageName::new(name);
        let storage = canonical.storage();

        if let Some(cached) = self.cache.get(&storage) {
            debug!("Resolution cache hit for {}", canonical);
            return Ok(cached.clone());
        }

        if !self.store.exists(&storage) {
            return Err(Error::Unresolved(canonical.display().to_string()));
        }

        let dir = self.store.package_dir(&storage);
        let entry_file = self.entry_file(&canonical, &dir)?;
        debug!("Resolved {} to {:?}", canonical, entry_file);

        let module = ResolvedModule {
            name: canonical,
            dir,
            entry_file,
        };
        self.cache.insert(storage, module.clone());
        Ok(module)
    }
}
