pub mod archive;
pub mod catalog;
pub mod cleanup;
pub mod error;
pub mod fetch;
pub mod http;
pub mod install;
pub mod name;
pub mod resolve;
pub mod runner;
pub mod runtime;
pub mod store;

/// Test utilities: cross-platform paths and hand-built archives.
#[cfg(test)]
pub mod test_utils {
    use anyhow::Result;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::collections::HashMap;
    use std::fs::File;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use tar::Builder;

    /// Returns the test store root path based on the platform.
    /// - Unix: `/home/user/PyraRunner/packages`
    /// - Windows: `C:\Users\user\PyraRunner\packages`
    pub fn test_root() -> PathBuf {
        #[cfg(not(windows))]
        {
            PathBuf::from("/home/user/PyraRunner/packages")
        }
        #[cfg(windows)]
        {
            PathBuf::from(r"C:\Users\user\PyraRunner\packages")
        }
    }

    /// Returns a test home directory path based on the platform.
    pub fn test_home() -> PathBuf {
        #[cfg(not(windows))]
        {
            PathBuf::from("/home/user")
        }
        #[cfg(windows)]
        {
            PathBuf::from(r"C:\Users\user")
        }
    }

    /// Write a zip archive containing the given files.
    pub fn create_test_zip(path: &Path, files: HashMap<&str, &str>) -> Result<()> {
        use zip::CompressionMethod;
        use zip::ZipWriter;
        use zip::write::FileOptions;

        let file = File::create(path)?;
        let mut zip = ZipWriter::new(file);
        let options: FileOptions<()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, content) in files.iter() {
            zip.start_file(*name, options)?;
            zip.write_all(content.as_bytes())?;
        }

        zip.finish()?;
        Ok(())
    }

    /// Write a tar.gz archive containing the given files.
    pub fn create_test_tar_gz(path: &Path, files: HashMap<&str, &str>) -> Result<()> {
        let file = File::create(path)?;
        let enc = GzEncoder::new(file, Compression::default());
        let mut tar = Builder::new(enc);

        let mut header = tar::Header::new_gnu();
        for (f, content) in files.iter() {
            header.set_path(f)?;
            header.set_size(content.len() as u64);
            header.set_cksum();
            tar.append(&header, content.as_bytes())?;
        }

        tar.finish()?;
        Ok(())
    }
}
