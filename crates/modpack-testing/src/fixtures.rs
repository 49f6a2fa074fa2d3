//! Common test fixtures for modpack testing

use crate::TestDir;
use anyhow::Result;

/// Creates a typical mod pack source tree.
///
/// Top-level folders: `Core` (meant to be essential), `CoreExtras` (a prefix
/// collision partner for `Core`), `Maps` and `Voices` (optional content).
pub fn create_mod_tree(test_dir: &TestDir) -> Result<()> {
    test_dir.create_tree(&[
        ("Core/engine.cfg", b"renderer=vulkan\n"),
        ("Core/textures/a.png", &[0x89, 0x50, 0x4E, 0x47]),
        ("Core/textures/detail/b.png", &[0x89, 0x50, 0x4E, 0x47, 0x01]),
        ("CoreExtras/bonus.cfg", b"bonus=true\n"),
        ("Maps/ruins.map", b"map ruins v2"),
        ("Maps/meadow.map", b"map meadow v1"),
        ("Voices/intro.ogg", &[0x4F, 0x67, 0x67, 0x53]),
    ])
}

/// Creates a minimal single-folder tree
pub fn create_single_folder_tree(test_dir: &TestDir) -> Result<()> {
    test_dir.create_file("Core/readme.txt", b"core only")?;
    Ok(())
}

/// Creates a tree with an empty directory alongside real content.
///
/// Empty directories cannot be represented in the artifact and must vanish
/// on round trip.
pub fn create_tree_with_empty_dir(test_dir: &TestDir) -> Result<()> {
    test_dir.create_file("Core/data.bin", &[0x00, 0x01, 0x02])?;
    test_dir.create_dir("Core/empty")?;
    test_dir.create_dir("Hollow")?;
    Ok(())
}
