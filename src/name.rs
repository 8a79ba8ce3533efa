//! Package name canonicalization.
//!
//! A package has two equivalent spellings: the display form used in the
//! registry and on the command line (`pyra-json`) and the storage form used
//! for its directory in the package store (`pyra_json`). Construction
//! normalizes either spelling to the display form, so the mapping is
//! idempotent in both directions.

use anyhow::{Result, anyhow};
use std::str::FromStr;

#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct PackageName(String);

impl PackageName {
    /// Canonicalize a name given in either spelling.
    pub fn new(name: &str) -> Self {
        PackageName(name.replace('_', "-"))
    }

    /// Canonical display form (`-` separators).
    pub fn display(&self) -> &str {
        &self.0
    }

    /// Storage form (`_` separators) used for the store directory.
    pub fn storage(&self) -> String {
        self.0.replace('-', "_")
    }

    /// Recover the display form from a store directory name.
    pub fn from_storage(storage: &str) -> Self {
        Self::new(storage)
    }
}

impl std::fmt::Display for PackageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PackageName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(anyhow!("package name cannot be empty"));
        }
        if s.chars()
            .any(|c| !c.is_ascii_alphanumeric() && c != '-' && c != '_')
        {
            return Err(anyhow!(
                "invalid package name '{}': only letters, digits, '-' and '_' are allowed",
                s
            ));
        }
        Ok(PackageName::new(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_to_storage() {
        assert_eq!(PackageName::new("pyra-json").storage(), "pyra_json");
        assert_eq!(PackageName::new("pyramath").storage(), "pyramath");
    }

    #[test]
    fn test_storage_to_display() {
        assert_eq!(PackageName::from_storage("pyra_json").display(), "pyra-json");
        assert_eq!(PackageName::from_storage("pyramath").display(), "pyramath");
    }

    #[test]
    fn test_canonicalization_is_idempotent() {
        let once = PackageName::new("pyra-json");
        let twice = PackageName::new(once.display());
        assert_eq!(once, twice);

        let storage_once = PackageName::new("pyra_json").storage();
        let storage_twice = PackageName::from_storage(&storage_once).storage();
        assert_eq!(storage_once, storage_twice);
    }

    #[test]
    fn test_round_trip_recovers_display_form() {
        for name in ["pyramath", "pyra-json", "pyra-http"] {
            let storage = PackageName::new(name).storage();
            assert_eq!(PackageName::from_storage(&storage).display(), name);
        }
    }

    #[test]
    fn test_either_spelling_is_equivalent() {
        assert_eq!(PackageName::new("pyra_json"), PackageName::new("pyra-json"));
    }

    #[test]
    fn test_from_str_rejects_invalid() {
        assert!("".parse::<PackageName>().is_err());
        assert!("pyra json".parse::<PackageName>().is_err());
        assert!("pyra/json".parse::<PackageName>().is_err());
        assert!("pyra-json".parse::<PackageName>().is_ok());
    }
}
