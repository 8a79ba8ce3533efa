//! Archive extraction for downloaded packages.

mod tar_gz;
mod zip;

use anyhow::{Context, Result, anyhow};
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

pub use tar_gz::TarGzExtractor;
pub use zip::ZipExtractor;

/// Trait for format-specific archive extractors
#[cfg_attr(test, mockall::automock)]
pub trait Extractor: Send + Sync {
    /// Check if this extractor can handle the given archive format
    fn can_handle(&self, archive_path: &Path) -> bool;

    /// Extract the archive contents into the target directory
    fn extract<R: Runtime + 'static>(
        &self,
        runtime: &R,
        archive_path: &Path,
        extract_to: &Path,
    ) -> Result<()>;
}

/// Dispatcher that selects the appropriate extractor based on archive format.
pub struct ArchiveExtractor {
    tar_gz: TarGzExtractor,
    zip: ZipExtractor,
}

impl Default for ArchiveExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveExtractor {
    pub fn new() -> Self {
        Self {
            tar_gz: TarGzExtractor,
            zip: ZipExtractor,
        }
    }
}

impl Extractor for ArchiveExtractor {
    fn can_handle(&self, archive_path: &Path) -> bool {
        self.tar_gz.can_handle(archive_path) || self.zip.can_handle(archive_path)
    }

    #[tracing::instrument(skip(self, runtime, archive_path, extract_to))]
    fn extract<R: Runtime + 'static>(
        &self,
        runtime: &R,
        archive_path: &Path,
        extract_to: &Path,
    ) -> Result<()> {
        if self.tar_gz.can_handle(archive_path) {
            return self.tar_gz.extract(runtime, archive_path, extract_to);
        }
        if self.zip.can_handle(archive_path) {
            return self.zip.extract(runtime, archive_path, extract_to);
        }
        Err(anyhow!(
            "Unsupported archive format: {}",
            archive_path.display()
        ))
    }
}

/// Staging directory for an extraction, a dot-prefixed sibling of the
/// target so a crashed extraction never looks like an installed package.
pub(crate) fn staging_dir(extract_to: &Path) -> PathBuf {
    let name = extract_to
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    extract_to.with_file_name(format!(".{}.staging", name))
}

/// Move staged contents into the target directory, flattening a single
/// top-level directory when the archive wraps everything in one. The
/// staging directory is removed on every path out of here.
pub(crate) fn promote_staging<R: Runtime>(
    runtime: &R,
    staging: &Path,
    extract_to: &Path,
) -> Result<()> {
    let result = promote_staging_inner(runtime, staging, extract_to);
    if result.is_err() {
        let _ = runtime.remove_dir_all(staging);
    }
    result
}

fn promote_staging_inner<R: Runtime>(
    runtime: &R,
    staging: &Path,
    extract_to: &Path,
) -> Result<()> {
    let entries = runtime
        .read_dir(staging)
        .context("Failed to read staging directory")?;

    if entries.is_empty() {
        return Err(anyhow!("Archive appears to be empty."));
    }

    let source_dir = if entries.len() == 1 && runtime.is_dir(&entries[0]) {
        entries[0].clone()
    } else {
        staging.to_path_buf()
    };

    for item in runtime.read_dir(&source_dir)? {
        let Some(file_name) = item.file_name() else {
            continue;
        };
        runtime.rename(&item, &extract_to.join(file_name))?;
    }

    runtime.remove_dir_all(staging)?;
    Ok(())
}
