//! Archive writer

use super::CompressionMode;
use crate::classify::{split_top_level, FolderClassification};
use crate::manifest::{PackManifest, MANIFEST_ENTRY};
use crate::progress::{PercentTracker, ProgressCallback};
use crate::walk::{scan_source, SourceFile};
use crate::{Error, Result};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Build the archive at `output` from the files under `source_root`.
///
/// The archive is assembled in a temporary file next to `output` and renamed
/// into place only after every member and the manifest have been written, so
/// no partial archive survives a failure.
pub(crate) fn write_archive(
    source_root: &Path,
    output: &Path,
    essential_names: &BTreeSet<String>,
    mode: CompressionMode,
    progress: &mut dyn ProgressCallback,
) -> Result<FolderClassification> {
    let files = scan_source(source_root)?;
    let classification = classify_files(&files, essential_names)?;

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    let temp_dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let temp = NamedTempFile::new_in(temp_dir)?;
    let mut zip = ZipWriter::new(temp);

    write_manifest(&mut zip, &classification.essential)?;

    let mut tracker = PercentTracker::new(files.len() as u64);
    for file in &files {
        write_member(&mut zip, file, mode)?;
        progress.on_progress(tracker.advance());
    }

    let temp = zip.finish()?;
    temp.persist(output).map_err(|e| Error::Io(e.error))?;

    info!("Wrote {} members to {:?}", files.len(), output);

    Ok(classification)
}

/// Derive the folder partition from the scanned files.
///
/// Every file must live below a top-level folder; a file sitting directly at
/// the source root cannot be represented in the artifact layout and aborts
/// the pack.
fn classify_files(
    files: &[SourceFile],
    essential_names: &BTreeSet<String>,
) -> Result<FolderClassification> {
    let mut observed = BTreeSet::new();

    for file in files {
        match split_top_level(&file.rel_path) {
            Some((top, _)) => {
                observed.insert(top.to_string());
            }
            None => {
                return Err(Error::Structural(format!(
                    "file outside any top-level folder: {}",
                    file.rel_path
                )))
            }
        }
    }

    Ok(FolderClassification::partition(observed, essential_names))
}

/// Write the manifest as the archive's reserved entry, stored uncompressed
fn write_manifest<W: io::Write + io::Seek>(
    zip: &mut ZipWriter<W>,
    essential: &BTreeSet<String>,
) -> Result<()> {
    let manifest = PackManifest::new(essential.clone());
    let options =
        FileOptions::<'static, ()>::default().compression_method(CompressionMethod::Stored);

    zip.start_file(MANIFEST_ENTRY, options)?;
    zip.write_all(manifest.to_json()?.as_bytes())?;

    Ok(())
}

/// Write a single source file as an archive member
fn write_member<W: io::Write + io::Seek>(
    zip: &mut ZipWriter<W>,
    file: &SourceFile,
    mode: CompressionMode,
) -> Result<()> {
    debug!("Adding member: {} ({} bytes)", file.rel_path, file.size);

    let mut source = File::open(&file.path).map_err(|e| Error::Source {
        path: file.path.clone(),
        source: e,
    })?;

    let options = FileOptions::<'static, ()>::default()
        .compression_method(mode.method())
        .compression_level(mode.level());

    #[cfg(unix)]
    let options = {
        use std::os::unix::fs::PermissionsExt;
        match source.metadata() {
            Ok(metadata) => options.unix_permissions(metadata.permissions().mode()),
            Err(_) => options,
        }
    };

    zip.start_file(file.rel_path.as_str(), options)?;
    io::copy(&mut source, zip).map_err(|e| Error::Source {
        path: file.path.clone(),
        source: e,
    })?;

    Ok(())
}
