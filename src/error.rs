//! Failure kinds for package installation and resolution.
//!
//! Every variant carries the identifier the caller needs to act on the
//! failure: the package name, the URL, or the script path. The CLI prints
//! these as one-line messages; no variant wraps another variant.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The requested name is not in the registry index. Reported before any
    /// network or filesystem work happens.
    #[error("unknown package '{0}': not in the registry index")]
    UnknownPackage(String),

    /// Downloading the archive failed: transport error, timeout, or a
    /// non-success HTTP status.
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The downloaded archive could not be extracted. The store removes the
    /// target directory before this is returned.
    #[error("failed to extract archive for '{name}': {reason}")]
    Extraction { name: String, reason: String },

    /// A script referenced a package that is not present in the store.
    #[error("package '{0}' is not installed")]
    Unresolved(String),

    /// The package directory exists but has no usable entry file.
    #[error("no unambiguous entry file for package '{name}': {reason}")]
    AmbiguousEntry { name: String, reason: String },

    /// The script path handed to the runner does not exist.
    #[error("script not found: {}", .0.display())]
    ScriptNotFound(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_cause() {
        let e = Error::UnknownPackage("not-a-real-package".into());
        assert!(e.to_string().contains("not-a-real-package"));

        let e = Error::Fetch {
            url: "https://example.com/pkg.zip".into(),
            reason: "connection refused".into(),
        };
        assert!(e.to_string().contains("https://example.com/pkg.zip"));
        assert!(e.to_string().contains("connection refused"));

        let e = Error::Unresolved("pyra-json".into());
        assert!(e.to_string().contains("pyra-json"));

        let e = Error::ScriptNotFound(PathBuf::from("missing.pyra"));
        assert!(e.to_string().contains("missing.pyra"));
    }
}
