//! End-to-end tests for packing, enumeration and selective extraction

use modpack_core::{pack, Artifact, CompressionMode, Error, NoProgress, ProgressCallback};
use modpack_testing::assertions::{
    assert_no_component_named, assert_tree_contains, collect_relative_files,
};
use modpack_testing::fixtures;
use modpack_testing::TestDir;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Write;

fn names(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Records every reported percentage
#[derive(Default)]
struct CollectProgress {
    percents: Vec<u32>,
}

impl ProgressCallback for CollectProgress {
    fn on_progress(&mut self, percent: u32) {
        self.percents.push(percent);
    }
}

#[test]
fn test_round_trip_all_modes() {
    for mode in [
        CompressionMode::Store,
        CompressionMode::Deflate,
        CompressionMode::Zstd,
    ] {
        let source = TestDir::new().unwrap();
        fixtures::create_mod_tree(&source).unwrap();
        let work = TestDir::new().unwrap();
        let archive = work.path().join("pack.zip");
        let dest = work.path().join("install");

        let artifact = pack(
            source.path(),
            &archive,
            &names(&["Core"]),
            mode,
            &mut NoProgress,
        )
        .unwrap();

        let folders = artifact.folders().unwrap();
        artifact.unpack(&folders.optional, &dest).unwrap();

        // Every folder's content appears under dest with the folder name
        // stripped
        for folder in ["Core", "CoreExtras", "Maps", "Voices"] {
            assert_tree_contains(&dest, &source.path().join(folder)).unwrap();
        }
    }
}

#[test]
fn test_folder_enumeration() {
    let source = TestDir::new().unwrap();
    fixtures::create_mod_tree(&source).unwrap();
    let work = TestDir::new().unwrap();
    let archive = work.path().join("pack.zip");

    pack(
        source.path(),
        &archive,
        &names(&["Core", "Voices"]),
        CompressionMode::Deflate,
        &mut NoProgress,
    )
    .unwrap();

    // Re-open from disk: the classification must come from the artifact
    // alone
    let artifact = Artifact::open(&archive).unwrap();
    let folders = artifact.folders().unwrap();

    assert_eq!(folders.essential, names(&["Core", "Voices"]));
    assert_eq!(folders.optional, names(&["CoreExtras", "Maps"]));
}

#[test]
fn test_selective_exclusion() {
    let source = TestDir::new().unwrap();
    fixtures::create_mod_tree(&source).unwrap();
    let work = TestDir::new().unwrap();
    let archive = work.path().join("pack.zip");
    let dest = work.path().join("install");

    let artifact = pack(
        source.path(),
        &archive,
        &names(&["Core"]),
        CompressionMode::Deflate,
        &mut NoProgress,
    )
    .unwrap();

    artifact.unpack(&names(&["Voices"]), &dest).unwrap();

    assert_tree_contains(&dest, &source.path().join("Core")).unwrap();
    assert_tree_contains(&dest, &source.path().join("Voices")).unwrap();
    // Maps was deselected: no file and no directory may originate from it
    assert_no_component_named(&dest, "Maps").unwrap();
    assert!(!dest.join("ruins.map").exists());
    assert!(!dest.join("meadow.map").exists());
}

#[test]
fn test_essential_included_with_empty_selection() {
    let source = TestDir::new().unwrap();
    fixtures::create_mod_tree(&source).unwrap();
    let work = TestDir::new().unwrap();
    let archive = work.path().join("pack.zip");
    let dest = work.path().join("install");

    let artifact = pack(
        source.path(),
        &archive,
        &names(&["Core"]),
        CompressionMode::Deflate,
        &mut NoProgress,
    )
    .unwrap();

    artifact.unpack(&BTreeSet::new(), &dest).unwrap();

    assert_tree_contains(&dest, &source.path().join("Core")).unwrap();
    assert!(!dest.join("bonus.cfg").exists());
    assert!(!dest.join("intro.ogg").exists());
}

#[test]
fn test_exact_segment_classification() {
    // "Core" essential must not drag in "CoreExtras" members
    let source = TestDir::new().unwrap();
    fixtures::create_mod_tree(&source).unwrap();
    let work = TestDir::new().unwrap();
    let archive = work.path().join("pack.zip");
    let dest = work.path().join("install");

    let artifact = pack(
        source.path(),
        &archive,
        &names(&["Core"]),
        CompressionMode::Store,
        &mut NoProgress,
    )
    .unwrap();

    let folders = artifact.folders().unwrap();
    assert!(folders.optional.contains("CoreExtras"));

    artifact.unpack(&BTreeSet::new(), &dest).unwrap();
    assert!(dest.join("engine.cfg").exists());
    assert!(!dest.join("bonus.cfg").exists());
}

#[test]
fn test_top_level_stripping() {
    let source = TestDir::new().unwrap();
    fixtures::create_mod_tree(&source).unwrap();
    let work = TestDir::new().unwrap();
    let archive = work.path().join("pack.zip");
    let dest = work.path().join("install");

    let artifact = pack(
        source.path(),
        &archive,
        &names(&["Core"]),
        CompressionMode::Deflate,
        &mut NoProgress,
    )
    .unwrap();

    artifact.unpack(&BTreeSet::new(), &dest).unwrap();

    assert!(dest.join("textures/a.png").exists());
    assert!(dest.join("textures/detail/b.png").exists());
    assert!(!dest.join("Core").exists());
}

#[test]
fn test_idempotent_overwrite() {
    let source = TestDir::new().unwrap();
    fixtures::create_mod_tree(&source).unwrap();
    let work = TestDir::new().unwrap();
    let archive = work.path().join("pack.zip");
    let dest = work.path().join("install");

    let artifact = pack(
        source.path(),
        &archive,
        &names(&["Core"]),
        CompressionMode::Deflate,
        &mut NoProgress,
    )
    .unwrap();

    let selected = names(&["Maps"]);
    artifact.unpack(&selected, &dest).unwrap();
    let first = collect_relative_files(&dest).unwrap();

    artifact.unpack(&selected, &dest).unwrap();
    let second = collect_relative_files(&dest).unwrap();

    assert_eq!(first, second);
    assert_tree_contains(&dest, &source.path().join("Core")).unwrap();
    assert_tree_contains(&dest, &source.path().join("Maps")).unwrap();
}

#[test]
fn test_unknown_essential_name_is_ignored() {
    let source = TestDir::new().unwrap();
    fixtures::create_single_folder_tree(&source).unwrap();
    let work = TestDir::new().unwrap();
    let archive = work.path().join("pack.zip");

    let artifact = pack(
        source.path(),
        &archive,
        &names(&["DoesNotExist"]),
        CompressionMode::Deflate,
        &mut NoProgress,
    )
    .unwrap();

    let folders = artifact.folders().unwrap();
    assert!(folders.essential.is_empty());
    assert_eq!(folders.optional, names(&["Core"]));
}

#[test]
fn test_progress_sequence() {
    let source = TestDir::new().unwrap();
    fixtures::create_mod_tree(&source).unwrap();
    let work = TestDir::new().unwrap();
    let archive = work.path().join("pack.zip");

    let mut progress = CollectProgress::default();

    pack(
        source.path(),
        &archive,
        &names(&["Core"]),
        CompressionMode::Store,
        &mut progress,
    )
    .unwrap();

    // One callback per file, non-decreasing, ending at exactly 100
    let percents = &progress.percents;
    assert_eq!(percents.len(), 7);
    assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*percents.last().unwrap(), 100);
    assert!(percents.iter().all(|p| *p <= 100));
}

#[test]
fn test_empty_source_tree() {
    let source = TestDir::new().unwrap();
    let work = TestDir::new().unwrap();
    let archive = work.path().join("pack.zip");
    let dest = work.path().join("install");

    let mut progress = CollectProgress::default();

    let artifact = pack(
        source.path(),
        &archive,
        &BTreeSet::new(),
        CompressionMode::Deflate,
        &mut progress,
    )
    .unwrap();

    assert!(progress.percents.is_empty());
    assert!(archive.exists());

    let folders = artifact.folders().unwrap();
    assert!(folders.essential.is_empty());
    assert!(folders.optional.is_empty());

    artifact.unpack(&BTreeSet::new(), &dest).unwrap();
    assert!(collect_relative_files(&dest).unwrap().is_empty());
}

#[test]
fn test_empty_directories_not_represented() {
    let source = TestDir::new().unwrap();
    fixtures::create_tree_with_empty_dir(&source).unwrap();
    let work = TestDir::new().unwrap();
    let archive = work.path().join("pack.zip");
    let dest = work.path().join("install");

    let artifact = pack(
        source.path(),
        &archive,
        &names(&["Core"]),
        CompressionMode::Deflate,
        &mut NoProgress,
    )
    .unwrap();

    // "Hollow" contains no files, so it is not a folder of the artifact
    let folders = artifact.folders().unwrap();
    assert_eq!(folders.essential, names(&["Core"]));
    assert!(folders.optional.is_empty());

    artifact.unpack(&BTreeSet::new(), &dest).unwrap();
    assert!(dest.join("data.bin").exists());
    assert!(!dest.join("empty").exists());
    assert_no_component_named(&dest, "Hollow").unwrap();
}

#[test]
fn test_pack_missing_source_leaves_no_output() {
    let work = TestDir::new().unwrap();
    let missing = work.path().join("no-such-tree");
    let archive = work.path().join("pack.zip");

    let err = pack(
        &missing,
        &archive,
        &BTreeSet::new(),
        CompressionMode::Deflate,
        &mut NoProgress,
    )
    .unwrap_err();

    assert!(matches!(err, Error::Source { .. }));
    assert!(!archive.exists());
}

#[test]
fn test_pack_rejects_root_level_file() {
    let source = TestDir::new().unwrap();
    fixtures::create_single_folder_tree(&source).unwrap();
    source.create_file("loose.txt", b"not in a folder").unwrap();
    let work = TestDir::new().unwrap();
    let archive = work.path().join("pack.zip");

    let err = pack(
        source.path(),
        &archive,
        &BTreeSet::new(),
        CompressionMode::Deflate,
        &mut NoProgress,
    )
    .unwrap_err();

    assert!(matches!(err, Error::Structural(_)));
    assert!(!archive.exists());
}

#[test]
fn test_open_rejects_archive_without_manifest() {
    let work = TestDir::new().unwrap();
    let archive = work.path().join("foreign.zip");

    // A ZIP produced by some other tool, with no manifest entry
    let file = File::create(&archive).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file("Core/a.txt", zip::write::FileOptions::<'static, ()>::default())
        .unwrap();
    zip.write_all(b"a").unwrap();
    zip.finish().unwrap();

    let err = Artifact::open(&archive).unwrap_err();
    assert!(matches!(err, Error::Manifest(_)));
}

#[test]
fn test_unpack_rejects_structural_violation() {
    let work = TestDir::new().unwrap();
    let archive = work.path().join("bad.zip");
    let dest = work.path().join("install");

    // Hand-built archive with a valid manifest but a member sitting outside
    // any top-level folder
    let file = File::create(&archive).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file(
        "modpack.manifest.json",
        zip::write::FileOptions::<'static, ()>::default(),
    )
    .unwrap();
    zip.write_all(br#"{"version": 1, "essential": []}"#).unwrap();
    zip.start_file("loose.txt", zip::write::FileOptions::<'static, ()>::default())
        .unwrap();
    zip.write_all(b"stray").unwrap();
    zip.finish().unwrap();

    let artifact = Artifact::open(&archive).unwrap();
    let err = artifact.unpack(&BTreeSet::new(), &dest).unwrap_err();

    assert!(matches!(err, Error::Structural(_)));
    assert!(!dest.join("loose.txt").exists());
}

#[test]
fn test_unpack_overwrites_existing_files() {
    let source = TestDir::new().unwrap();
    fixtures::create_single_folder_tree(&source).unwrap();
    let work = TestDir::new().unwrap();
    let archive = work.path().join("pack.zip");
    let dest = work.path().join("install");

    let artifact = pack(
        source.path(),
        &archive,
        &names(&["Core"]),
        CompressionMode::Deflate,
        &mut NoProgress,
    )
    .unwrap();

    fs::create_dir_all(&dest).unwrap();
    fs::write(dest.join("readme.txt"), b"stale local edit").unwrap();

    artifact.unpack(&BTreeSet::new(), &dest).unwrap();

    assert_eq!(fs::read(dest.join("readme.txt")).unwrap(), b"core only");
}

#[test]
fn test_repacking_is_deterministic() {
    let source = TestDir::new().unwrap();
    fixtures::create_mod_tree(&source).unwrap();
    let work = TestDir::new().unwrap();
    let first = work.path().join("first.zip");
    let second = work.path().join("second.zip");

    for output in [&first, &second] {
        pack(
            source.path(),
            output,
            &names(&["Core"]),
            CompressionMode::Store,
            &mut NoProgress,
        )
        .unwrap();
    }

    // Same member names in the same order
    let list = |path: &std::path::Path| {
        let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect::<Vec<_>>()
    };
    assert_eq!(list(&first), list(&second));
}
