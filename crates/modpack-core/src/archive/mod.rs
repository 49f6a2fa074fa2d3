//! Archive operations module
//!
//! The packing side turns a source tree into a single ZIP artifact with an
//! embedded essential-folder manifest; the reading side enumerates the
//! artifact's top-level folders and selectively installs them.

pub mod reader;
pub mod writer;

use crate::classify::FolderClassification;
use crate::manifest::PackManifest;
use crate::progress::ProgressCallback;
use crate::{Error, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::info;
use zip::CompressionMethod;

/// Compression applied to archive members
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMode {
    /// Store files without compression
    Store,
    /// Deflate compression
    Deflate,
    /// Zstandard at a maximal level
    Zstd,
}

impl CompressionMode {
    pub(crate) fn method(&self) -> CompressionMethod {
        match self {
            CompressionMode::Store => CompressionMethod::Stored,
            CompressionMode::Deflate => CompressionMethod::Deflated,
            CompressionMode::Zstd => CompressionMethod::Zstd,
        }
    }

    pub(crate) fn level(&self) -> Option<i64> {
        match self {
            CompressionMode::Store => None,
            CompressionMode::Deflate => None,
            CompressionMode::Zstd => Some(19),
        }
    }
}

impl std::str::FromStr for CompressionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "store" | "none" => Ok(CompressionMode::Store),
            "deflate" | "deflated" => Ok(CompressionMode::Deflate),
            "zstd" | "zst" | "max" => Ok(CompressionMode::Zstd),
            _ => Err(Error::UnsupportedMode(s.to_string())),
        }
    }
}

impl std::fmt::Display for CompressionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompressionMode::Store => write!(f, "store"),
            CompressionMode::Deflate => write!(f, "deflate"),
            CompressionMode::Zstd => write!(f, "zstd"),
        }
    }
}

/// A packaged mod pack: the archive file plus its embedded essential-folder
/// record. The two are never separated; the record travels inside the
/// archive.
#[derive(Debug, Clone)]
pub struct Artifact {
    path: PathBuf,
    manifest: PackManifest,
}

/// Pack a source tree into an artifact.
///
/// Every regular file under `source_root` becomes one archive member at its
/// `/`-separated relative path, compressed per `mode`. Top-level folders
/// named in `essential_names` are recorded as essential in the embedded
/// manifest; names that match no observed folder are ignored. `progress`
/// receives a percentage after each file. The output is written atomically;
/// a failed pack leaves nothing behind.
pub fn pack<P: AsRef<Path>, Q: AsRef<Path>>(
    source_root: P,
    output: Q,
    essential_names: &BTreeSet<String>,
    mode: CompressionMode,
    progress: &mut dyn ProgressCallback,
) -> Result<Artifact> {
    let source_root = source_root.as_ref();
    let output = output.as_ref();

    info!(
        "Packing {:?} into {:?} (mode: {})",
        source_root, output, mode
    );

    let classification = writer::write_archive(source_root, output, essential_names, mode, progress)?;

    info!(
        "Packed {} essential and {} optional folders",
        classification.essential.len(),
        classification.optional.len()
    );

    Ok(Artifact {
        path: output.to_path_buf(),
        manifest: PackManifest::new(classification.essential),
    })
}

impl Artifact {
    /// Open an existing artifact, reading its embedded manifest
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let manifest = reader::read_manifest(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            manifest,
        })
    }

    /// Path of the archive file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Essential folder names recorded at pack time
    pub fn essential(&self) -> &BTreeSet<String> {
        &self.manifest.essential
    }

    /// Enumerate the top-level folders present in the archive, partitioned
    /// into the essential set recorded at pack time and the remaining
    /// optional set.
    pub fn folders(&self) -> Result<FolderClassification> {
        let observed = reader::observed_folders(&self.path)?;
        Ok(FolderClassification::partition(
            observed,
            &self.manifest.essential,
        ))
    }

    /// Install the artifact under `destination_root`.
    ///
    /// The effective selection is the essential set plus `selected_optional`.
    /// Members of deselected folders are skipped entirely; for every other
    /// member the top-level folder name is stripped and the remainder written
    /// below `destination_root`, overwriting existing files.
    pub fn unpack<P: AsRef<Path>>(
        &self,
        selected_optional: &BTreeSet<String>,
        destination_root: P,
    ) -> Result<()> {
        let destination_root = destination_root.as_ref();
        let classification = self.folders()?;
        let selection = classification.selection(selected_optional);

        info!(
            "Unpacking {:?} to {:?} ({} of {} folders selected)",
            self.path,
            destination_root,
            selection.len(),
            classification.essential.len() + classification.optional.len()
        );

        reader::extract_selected(&self.path, &selection, destination_root)
    }
}
