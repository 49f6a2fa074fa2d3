//! Embedded pack manifest
//!
//! The artifact records which top-level folders are essential as a small
//! JSON document stored inside the archive itself, so the unpacking side
//! can reconstruct the classification without access to the original
//! source tree.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Reserved archive entry name for the manifest.
///
/// Contains no `/`, so it can never collide with a real member path
/// (`<folder>/<subpath>`).
pub const MANIFEST_ENTRY: &str = "modpack.manifest.json";

/// Pack manifest embedded in the artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackManifest {
    /// Version of the manifest format
    pub version: u32,
    /// Top-level folders that are always installed
    pub essential: BTreeSet<String>,
}

impl PackManifest {
    /// Current manifest version
    const VERSION: u32 = 1;

    /// Create a manifest recording the given essential folder names
    pub fn new(essential: BTreeSet<String>) -> Self {
        Self {
            version: Self::VERSION,
            essential,
        }
    }

    /// Serialize for embedding into the archive
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::Manifest(format!("failed to serialize manifest: {}", e)))
    }

    /// Parse a manifest read back from the archive
    pub fn from_json(data: &str) -> Result<Self> {
        let manifest: Self = serde_json::from_str(data)
            .map_err(|e| Error::Manifest(format!("failed to parse manifest: {}", e)))?;

        if manifest.version != Self::VERSION {
            return Err(Error::Manifest(format!(
                "unsupported manifest version: {} (expected {})",
                manifest.version,
                Self::VERSION
            )));
        }

        Ok(manifest)
    }
}
