//! Common assertions for modpack testing

use anyhow::Result;
use std::path::Path;
use walkdir::WalkDir;

/// Asserts that every file under `expected_dir` exists under `actual_dir`
/// at the same relative path with identical bytes.
///
/// `actual_dir` may contain additional files; this compares one installed
/// folder against a destination holding the union of several.
pub fn assert_tree_contains(actual_dir: &Path, expected_dir: &Path) -> Result<()> {
    for entry in WalkDir::new(expected_dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(expected_dir)?;
        let actual_path = actual_dir.join(relative);

        assert!(
            actual_path.is_file(),
            "Missing file {:?} under {:?}",
            relative,
            actual_dir
        );

        let expected_content = std::fs::read(entry.path())?;
        let actual_content = std::fs::read(&actual_path)?;
        assert_eq!(
            expected_content, actual_content,
            "Content mismatch for {:?}",
            relative
        );
    }

    Ok(())
}

/// Asserts that nothing under `dir` refers to `name` as a path component.
///
/// Used to check that a deselected folder contributed neither files nor an
/// empty directory.
pub fn assert_no_component_named(dir: &Path, name: &str) -> Result<()> {
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        let has_component = entry
            .path()
            .strip_prefix(dir)?
            .components()
            .any(|c| c.as_os_str() == name);
        assert!(
            !has_component,
            "Unexpected entry {:?} under {:?}",
            entry.path(),
            dir
        );
    }

    Ok(())
}

/// Collects the sorted relative file paths under a directory
pub fn collect_relative_files(dir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(dir)?;
        files.push(relative.to_string_lossy().replace('\\', "/"));
    }

    files.sort();
    Ok(files)
}
