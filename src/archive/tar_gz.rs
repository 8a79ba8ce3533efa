use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use log::{debug, info};
use std::path::{Component, Path};
use tar::Archive;

use super::{Extractor, promote_staging, staging_dir};
use crate::runtime::Runtime;

/// Extractor for .tar.gz / .tgz archives
pub struct TarGzExtractor;

impl Extractor for TarGzExtractor {
    fn can_handle(&self, archive_path: &Path) -> bool {
        let name = archive_path.to_string_lossy().to_lowercase();
        name.ends_with(".tar.gz") || name.ends_with(".tgz")
    }

    fn extract<R: Runtime + 'static>(
        &self,
        runtime: &R,
        archive_path: &Path,
        extract_to: &Path,
    ) -> Result<()> {
        debug!("Extracting tar.gz archive to {:?}...", extract_to);
        let reader = runtime
            .open(archive_path)
            .with_context(|| format!("Failed to open archive at {:?}", archive_path))?;
        let mut archive = Archive::new(GzDecoder::new(reader));

        let staging = staging_dir(extract_to);
        if runtime.exists(&staging) {
            runtime.remove_dir_all(&staging)?;
        }
        runtime.create_dir_all(&staging)?;
        debug!("Unpacking to staging dir: {:?}", staging);

        if let Err(e) = unpack_entries(runtime, &mut archive, &staging) {
            let _ = runtime.remove_dir_all(&staging);
            return Err(e);
        }

        promote_staging(runtime, &staging, extract_to)?;
        info!("Extraction complete.");
        Ok(())
    }
}

fn unpack_entries<R: Runtime, T: std::io::Read>(
    runtime: &R,
    archive: &mut Archive<T>,
    staging: &Path,
) -> Result<()> {
    for entry in archive.entries().context("Failed to read tar archive")? {
        let mut entry = entry.context("Failed to read tar entry")?;
        let entry_path = entry
            .path()
            .context("Failed to read tar entry path")?
            .to_path_buf();

        // Refuse entries that would escape the staging directory.
        if entry_path.is_absolute()
            || entry_path
                .components()
                .any(|c| matches!(c, Component::ParentDir))
        {
            debug!("Skipping entry with invalid path");
            continue;
        }

        let full_path = staging.join(&entry_path);
        let header_type = entry.header().entry_type();

        if header_type.is_dir() {
            runtime.create_dir_all(&full_path)?;
        } else if header_type.is_file() {
            if let Some(parent) = full_path.parent() {
                runtime.create_dir_all(parent)?;
            }
            let mut dest_file = runtime.create_file(&full_path)?;
            std::io::copy(&mut entry, &mut dest_file)
                .with_context(|| format!("Failed to extract file {:?}", full_path))?;
        } else {
            debug!("Skipping non-file entry {:?}", entry_path);
        }
    }
    Ok(())
}
