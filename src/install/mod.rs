//! Installer: the catalog → fetcher → store pipeline.

use anyhow::Result;
use log::{debug, info};
use std::path::PathBuf;

use crate::archive::Extractor;
use crate::catalog::Catalog;
use crate::cleanup::TempArtifact;
use crate::error::Error;
use crate::fetch::Fetch;
use crate::name::PackageName;
use crate::runtime::Runtime;
use crate::store::{InstalledPackage, PackageStore};

/// Description shown for packages installed out-of-band of the registry.
pub const NO_DESCRIPTION: &str = "No description";

pub struct Installer<'a, R: Runtime, F: Fetch, E: Extractor> {
    runtime: &'a R,
    fetcher: F,
    extractor: E,
    catalog: &'a Catalog,
    store: PackageStore<'a, R>,
}

impl<'a, R: Runtime + 'static, F: Fetch, E: Extractor> Installer<'a, R, F, E> {
    pub fn new(
        runtime: &'a R,
        fetcher: F,
        extractor: E,
        catalog: &'a Catalog,
        root: PathBuf,
    ) -> Self {
        Self {
            runtime,
            fetcher,
            extractor,
            catalog,
            store: PackageStore::new(runtime, root),
        }
    }

    pub fn store(&self) -> &PackageStore<'a, R> {
        &self.store
    }

    /// Install a package by name: catalog lookup, download, extraction.
    ///
    /// An unknown name fails before any network or store activity. The
    /// downloaded artifact is removed on every exit path, and a failure at
    /// any later stage leaves no partial install behind; retrying the whole
    /// call is idempotent because the target directory name is
    /// deterministic.
    #[tracing::instrument(skip(self))]
    pub async fn install(&self, name: &PackageName) -> Result<InstalledPackage, Error> {
        let entry = self
            .catalog
            .lookup(name.display())
            .ok_or_else(|| Error::UnknownPackage(name.display().to_string()))?;
        let storage = name.storage();

        info!("Installing {} from {}...", name, entry.url);

        self.runtime
            .create_dir_all(self.store.root())
            .map_err(|e| Error::Fetch {
                url: entry.url.clone(),
                reason: format!("cannot stage download: {e:#}"),
            })?;

        let temp = TempArtifact::new(self.store.root().join(artifact_name(&storage, &entry.url)));
        self.fetcher.fetch(&entry.url, temp.path()).await?;

        debug!("Extracting into {:?}", self.store.package_dir(&storage));
        let installed = self
            .store
            .extract_into(&storage, temp.path(), &self.extractor)?;

        info!("Installed {}", name);
        Ok(installed)
    }
}

/// Installed packages in display form, joined with catalog descriptions.
/// Out-of-band installs are legal and get the [`NO_DESCRIPTION`] sentinel.
#[tracing::instrument(skip(runtime, catalog))]
pub fn list_installed<R: Runtime>(
    runtime: &R,
    catalog: &Catalog,
    root: PathBuf,
) -> Result<Vec<(String, String)>> {
    let store = PackageStore::new(runtime, root);
    let mut rows = Vec::new();
    for package in store.list_all()? {
        let name = PackageName::from_storage(&package.storage_name);
        let description = catalog
            .lookup(name.display())
            .map(|entry| entry.description.clone())
            .unwrap_or_else(|| NO_DESCRIPTION.to_string());
        rows.push((name.display().to_string(), description));
    }
    Ok(rows)
}

/// Dot-prefixed temporary file name for the downloaded archive, keeping the
/// URL's file name so the extractor can dispatch on the extension.
fn artifact_name(storage_name: &str, url: &str) -> String {
    let segment = url
        .rsplit('/')
        .next()
        .unwrap_or("")
        .split('?')
        .next()
        .unwrap_or("");
    if segment.is_empty() {
        format!(".{}.zip", storage_name)
    } else {
        format!(".{}.{}", storage_name, segment)
    }
}
