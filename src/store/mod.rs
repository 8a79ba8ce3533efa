//! Package store: the directory tree holding installed packages.
//!
//! Every installed package occupies exactly one directory directly under
//! the store root, named by the package's canonical storage form. The store
//! owns the layout and the existence checks; extraction is its single
//! mutating surface.

use anyhow::Result;
use log::debug;
use std::path::{Path, PathBuf};

use crate::archive::Extractor;
use crate::error::Error;
use crate::name::PackageName;
use crate::runtime::Runtime;

/// An installed package: one subdirectory of the store root.
///
/// The entry file is deliberately not recorded here; it is discovered
/// lazily at first resolution. A package with no discoverable entry file is
/// listable but fails resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct InstalledPackage {
    pub storage_name: String,
    pub dir: PathBuf,
}

pub struct PackageStore<'a, R: Runtime> {
    runtime: &'a R,
    root: PathBuf,
}

impl<'a, R: Runtime> PackageStore<'a, R> {
    /// Create a store rooted at the given directory. The directory does not
    /// need to exist yet; it is created by the first extraction.
    pub fn new(runtime: &'a R, root: PathBuf) -> Self {
        Self { runtime, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for a package, derived purely from root + storage name.
    pub fn package_dir(&self, storage_name: &str) -> PathBuf {
        self.root.join(storage_name)
    }

    /// Whether a package is installed.
    pub fn exists(&self, storage_name: &str) -> bool {
        self.runtime.is_dir(&self.package_dir(storage_name))
    }

    /// Extract an archive into the package's directory, replacing any
    /// existing install. A failed extraction removes the target directory
    /// before returning, so a partial install never passes [`exists`].
    ///
    /// [`exists`]: PackageStore::exists
    #[tracing::instrument(skip(self, archive_path, extractor))]
    pub fn extract_into<E: Extractor>(
        &self,
        storage_name: &str,
        archive_path: &Path,
        extractor: &E,
    ) -> Result<InstalledPackage, Error>
    where
        R: 'static,
    {
        let dir = self.package_dir(storage_name);
        let name = PackageName::from_storage(storage_name);

        if self.runtime.exists(&dir) {
            debug!("Replacing existing install at {:?}", dir);
            self.runtime
                .remove_dir_all(&dir)
                .map_err(|e| extraction_error(&name, &e))?;
        }
        self.runtime
            .create_dir_all(&dir)
            .map_err(|e| extraction_error(&name, &e))?;

        if let Err(e) = extractor.extract(self.runtime, archive_path, &dir) {
            let _ = self.runtime.remove_dir_all(&dir);
            return Err(extraction_error(&name, &e));
        }

        Ok(InstalledPackage {
            storage_name: storage_name.to_string(),
            dir,
        })
    }

    /// Enumerate installed packages: the store root's immediate
    /// subdirectories, in directory-enumeration order.
    pub fn list_all(&self) -> Result<Vec<InstalledPackage>> {
        if !self.runtime.exists(&self.root) {
            return Ok(vec![]);
        }

        let mut packages = Vec::new();
        for entry in self.runtime.read_dir(&self.root)? {
            if !self.runtime.is_dir(&entry) {
                continue;
            }
            let Some(dir_name) = entry.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            // Dot-prefixed directories are transient extraction staging.
            if dir_name.starts_with('.') {
                continue;
            }
            packages.push(InstalledPackage {
                storage_name: dir_name.to_string(),
                dir: entry.clone(),
            });
        }
        Ok(packages)
    }
}

fn extraction_error(name: &PackageName, e: &anyhow::Error) -> Error {
    Error::Extraction {
        name: name.display().to_string(),
        reason: format!("{e:#}"),
    }
}
