//! Archive reader and selective extractor

use crate::classify::split_top_level;
use crate::manifest::{PackManifest, MANIFEST_ENTRY};
use crate::{Error, Result};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::result::ZipError;
use zip::ZipArchive;

/// Read and validate the embedded manifest
pub(crate) fn read_manifest(archive_path: &Path) -> Result<PackManifest> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;

    let mut entry = match archive.by_name(MANIFEST_ENTRY) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => {
            return Err(Error::Manifest(format!(
                "{:?} has no {} entry",
                archive_path, MANIFEST_ENTRY
            )))
        }
        Err(e) => return Err(e.into()),
    };

    let mut contents = String::new();
    entry.read_to_string(&mut contents)?;

    PackManifest::from_json(&contents)
}

/// Distinct top-level folder names across all archive members.
///
/// The manifest entry and pure-directory records (written by other tools;
/// this writer never emits them) are skipped.
pub(crate) fn observed_folders(archive_path: &Path) -> Result<BTreeSet<String>> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;

    let mut observed = BTreeSet::new();

    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        if entry.name() == MANIFEST_ENTRY || entry.is_dir() {
            continue;
        }

        let (top, _) = member_segments(entry.name())?;
        observed.insert(top.to_string());
    }

    Ok(observed)
}

/// Extract the members of the selected top-level folders under
/// `destination_root`, stripping the top-level segment from each path.
///
/// Members are processed in archive order; existing destination files are
/// overwritten. The first failing member aborts the run with its path in
/// the error.
pub(crate) fn extract_selected(
    archive_path: &Path,
    selection: &BTreeSet<String>,
    destination_root: &Path,
) -> Result<()> {
    fs::create_dir_all(destination_root).map_err(|e| Error::Destination {
        path: destination_root.to_path_buf(),
        source: e,
    })?;

    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;

    let mut extracted = 0usize;
    let mut skipped = 0usize;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.name() == MANIFEST_ENTRY || entry.is_dir() {
            continue;
        }
        if entry.enclosed_name().is_none() {
            return Err(Error::Structural(format!(
                "unsafe member path: {}",
                entry.name()
            )));
        }

        let name = entry.name().to_string();
        let (top, rest) = member_segments(&name)?;

        if !selection.contains(top) {
            debug!("Skipping deselected member: {}", name);
            skipped += 1;
            continue;
        }

        let dest_path = destination_path(destination_root, rest);
        debug!("Extracting {} to {:?}", name, dest_path);

        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::Destination {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut output = File::create(&dest_path).map_err(|e| Error::Destination {
            path: dest_path.clone(),
            source: e,
        })?;
        io::copy(&mut entry, &mut output).map_err(|e| Error::Destination {
            path: dest_path.clone(),
            source: e,
        })?;

        extracted += 1;
    }

    info!(
        "Extraction complete: {} extracted, {} skipped",
        extracted, skipped
    );

    Ok(())
}

/// Split a member path into its top-level folder and the remainder below it.
///
/// A member with no remainder cannot be mapped to a destination path and is
/// rejected rather than written into the destination root.
fn member_segments(name: &str) -> Result<(&str, &str)> {
    match split_top_level(name) {
        Some((top, rest)) if !rest.is_empty() => Ok((top, rest)),
        _ => Err(Error::Structural(format!(
            "member outside any top-level folder: {}",
            name
        ))),
    }
}

/// Join the stripped member path onto the destination root using native
/// separators
fn destination_path(destination_root: &Path, rest: &str) -> PathBuf {
    let mut path = destination_root.to_path_buf();
    for segment in rest.split('/') {
        path.push(segment);
    }
    path
}
