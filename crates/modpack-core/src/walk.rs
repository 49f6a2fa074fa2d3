//! Source tree traversal

use crate::{Error, Result};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A regular file discovered under the source root
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Absolute path on disk
    pub path: PathBuf,
    /// Path relative to the source root, `/`-separated
    pub rel_path: String,
    /// File size in bytes
    pub size: u64,
}

/// Recursively enumerate every regular file under `root`.
///
/// Directories contribute nothing; symlinks are not followed. The result is
/// sorted lexically by relative path so repeated scans of an unchanged tree
/// produce the same ordering.
pub fn scan_source(root: &Path) -> Result<Vec<SourceFile>> {
    if !root.is_dir() {
        return Err(Error::Source {
            path: root.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "source root is not a directory"),
        });
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf());
            Error::Source {
                path,
                source: e.into(),
            }
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let metadata = path.metadata().map_err(|e| Error::Source {
            path: path.to_path_buf(),
            source: e,
        })?;

        let relative = path
            .strip_prefix(root)
            .map_err(|_| Error::InvalidPath(format!("{:?} is outside {:?}", path, root)))?;
        let rel_path = match relative.to_str() {
            Some(s) => s.replace('\\', "/"),
            None => {
                return Err(Error::InvalidPath(format!(
                    "non-UTF-8 path under source root: {:?}",
                    relative
                )))
            }
        };

        debug!("Discovered source file: {}", rel_path);

        files.push(SourceFile {
            path: path.to_path_buf(),
            rel_path,
            size: metadata.len(),
        });
    }

    files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));

    Ok(files)
}
