use anyhow::{Context, Result};
use log::{debug, info};
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

use super::{Extractor, promote_staging, staging_dir};
use crate::runtime::Runtime;

/// Extractor for .zip archives
pub struct ZipExtractor;

impl Extractor for ZipExtractor {
    fn can_handle(&self, archive_path: &Path) -> bool {
        let name = archive_path.to_string_lossy().to_lowercase();
        name.ends_with(".zip")
    }

    fn extract<R: Runtime + 'static>(
        &self,
        runtime: &R,
        archive_path: &Path,
        extract_to: &Path,
    ) -> Result<()> {
        debug!("Extracting zip archive to {:?}...", extract_to);
        let mut reader = runtime
            .open(archive_path)
            .with_context(|| format!("Failed to open archive at {:?}", archive_path))?;

        // zip requires Read + Seek, but Runtime::open returns a plain reader;
        // read the whole archive into memory for seeking capability
        let mut buffer = Vec::new();
        reader
            .read_to_end(&mut buffer)
            .with_context(|| format!("Failed to read archive {:?}", archive_path))?;
        let cursor = Cursor::new(buffer);

        let mut archive = ZipArchive::new(cursor).context("Failed to parse ZIP archive")?;

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

fn unpack_entries<R: Runtime>(
    runtime: &R,
    archive: &mut ZipArchive<Cursor<Vec<u8>>>,
    staging: &Path,
) -> Result<()> {
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("Failed to read ZIP entry {}", i))?;

        let entry_path = match entry.enclosed_name() {
            Some(path) => path.to_path_buf(),
            None => {
                debug!("Skipping entry with invalid path");
                continue;
            }
        };

        let full_path = staging.join(&entry_path);

        if entry.is_dir() {
            runtime.create_dir_all(&full_path)?;
        } else {
            if let Some(parent) = full_path.parent() {
                runtime.create_dir_all(parent)?;
            }
            let mut dest_file = runtime.create_file(&full_path)?;
            std::io::copy(&mut entry, &mut dest_file)
                .with_context(|| format!("Failed to extract file {:?}", full_path))?;
        }
    }
    Ok(())
}
