//! Testing utilities and fixtures for modpack
//!
//! This crate provides common testing utilities, fixtures, and helpers
//! for testing modpack-based applications and libraries.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub mod assertions;
pub mod fixtures;

/// Creates a temporary test directory with cleanup on drop
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    /// Creates a new temporary test directory
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    /// Returns the path to the temporary directory
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Creates a file at the given `/`-separated relative path, creating
    /// intermediate directories as needed
    pub fn create_file(&self, name: &str, content: &[u8]) -> Result<PathBuf> {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Creates a directory at the given relative path
    pub fn create_dir(&self, name: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Creates a whole tree of files in one call
    pub fn create_tree(&self, files: &[(&str, &[u8])]) -> Result<()> {
        for (name, content) in files {
            self.create_file(name, content)?;
        }
        Ok(())
    }
}
