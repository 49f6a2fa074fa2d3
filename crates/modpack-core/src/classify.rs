//! Top-level folder classification

use serde::Serialize;
use std::collections::BTreeSet;

/// Partition of the top-level folders of an archive into essential and
/// optional sets.
///
/// Essential folders are always installed; optional folders are an
/// inclusion choice made by the caller at unpack time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderClassification {
    /// Folders always included during extraction
    pub essential: BTreeSet<String>,
    /// Folders included only when selected
    pub optional: BTreeSet<String>,
}

impl FolderClassification {
    /// Partition the observed top-level folder names.
    ///
    /// An essential name that was never observed is silently dropped; it
    /// simply does not appear in either set.
    pub fn partition(
        observed: impl IntoIterator<Item = String>,
        essential_names: &BTreeSet<String>,
    ) -> Self {
        let mut essential = BTreeSet::new();
        let mut optional = BTreeSet::new();

        for name in observed {
            if essential_names.contains(&name) {
                essential.insert(name);
            } else {
                optional.insert(name);
            }
        }

        Self {
            essential,
            optional,
        }
    }

    /// Effective selection for an extraction run: essential folders plus the
    /// caller-chosen optional ones. Names outside the optional set are
    /// harmless; they never match any archive member.
    pub fn selection(&self, selected_optional: &BTreeSet<String>) -> BTreeSet<String> {
        self.essential.union(selected_optional).cloned().collect()
    }
}

/// Split an archive member path into its top-level folder and the remainder.
///
/// Matching is exact segment equality on the first `/`-separated component;
/// a folder name that is a prefix of another (`Core` vs `CoreExtras`) never
/// matches the longer one. Returns `None` for a path with no separator.
pub fn split_top_level(rel_path: &str) -> Option<(&str, &str)> {
    let (top, rest) = rel_path.split_once('/')?;
    if top.is_empty() {
        return None;
    }
    Some((top, rest))
}
