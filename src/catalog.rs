//! Registry catalog: the static index of known packages.
//!
//! The index is a JSON table compiled into the binary; `--index` can point
//! at an alternative file, which is what the integration tests use to
//! redirect download URLs at a local server. Lookups canonicalize the
//! queried name first, so both spellings of a name hit the same entry.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::name::PackageName;
use crate::runtime::Runtime;

const EMBEDDED_INDEX: &str = include_str!("index.json");

/// One known package in the registry index.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub name: String,
    pub url: String,
    pub description: String,
    pub example: String,
}

/// Immutable name → entry table, loaded once at startup.
pub struct Catalog {
    entries: HashMap<String, CatalogEntry>,
}

impl Catalog {
    /// Load the index compiled into the binary.
    pub fn load_embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_INDEX).context("Failed to parse the built-in registry index")
    }

    /// Load an index from a file on disk.
    #[tracing::instrument(skip(runtime))]
    pub fn load_from<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let content = runtime
            .read_to_string(path)
            .with_context(|| format!("Failed to read registry index {:?}", path))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse registry index {:?}", path))
    }

    fn from_json(json: &str) -> Result<Self> {
        let raw: Vec<CatalogEntry> = serde_json::from_str(json)?;
        let mut entries = HashMap::with_capacity(raw.len());
        for entry in raw {
            let key = PackageName::new(&entry.name).display().to_string();
            entries.insert(key, entry);
        }
        Ok(Catalog { entries })
    }

    /// Look up a package by name in either spelling. Unknown names return
    /// `None`; whether that is fatal is the caller's call.
    pub fn lookup(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(PackageName::new(name).display())
    }

    /// All entries, sorted by name for stable output.
    pub fn entries(&self) -> Vec<&CatalogEntry> {
        let mut all: Vec<&CatalogEntry> = self.entries.values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }
}
