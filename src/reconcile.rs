//! Per-document local asset reconciliation.
//!
//! For one document, moves the submitted asset files from its inbox folder
//! into the published target folder under bumped version names, then works
//! out which previously published files are now superseded. Deleting the
//! superseded files is the caller's job — the publish stage does it only
//! after the rewritten document is on disk, so an interrupted run leaves old
//! and new assets coexisting rather than a document referencing a deleted
//! file.

use crate::naming::{self, UnvName};
use crate::store;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of reconciling one document's local assets.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct LocalFiles {
    /// Current file name per asset identity.
    pub versions: BTreeMap<UnvName, String>,
    /// Superseded files awaiting deletion once the document is rewritten.
    /// Every entry's family either has a strictly newer current version in
    /// `versions`, or no surviving member at all.
    pub files_to_delete: Vec<String>,
}

impl LocalFiles {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The current file name for whatever version of an asset `name` refers
    /// to: `current("img.png")` and `current("img-2.png")` resolve alike.
    pub fn current(&self, name: &str) -> Option<&str> {
        self.versions.get(&UnvName::new(name)).map(String::as_str)
    }
}

/// Move a document's inbox assets into its target folder and compute the
/// resulting version state.
///
/// Each inbox file is moved under a name bumped relative to the files
/// already present in the target folder before any of this batch's moves —
/// one inbox file is one new version of one family, never a version of
/// another inbox file. The index document must not be in `inbox_files`.
///
/// With zero inbox files this still reports the target folder's current
/// versions, so an unrelated rebuild can resolve its asset references.
pub fn reconcile(
    source_dir: &Path,
    inbox_files: &[String],
    target_dir: &Path,
    index_file: &str,
) -> Result<LocalFiles, ReconcileError> {
    let existing = store::list_files(target_dir)?;
    for name in inbox_files {
        let bumped = naming::bumped_name(&UnvName::new(name), &existing);
        store::move_file_with_rename(source_dir, name, target_dir, &bumped)?;
    }

    // Re-list and group by identity; the highest version in each family is
    // current, everything else is garbage (possibly from interrupted runs).
    let mut families: BTreeMap<UnvName, Vec<String>> = BTreeMap::new();
    for name in store::list_files(target_dir)? {
        if name == index_file {
            continue;
        }
        families.entry(UnvName::new(&name)).or_default().push(name);
    }

    let mut result = LocalFiles::default();
    for (identity, mut members) in families {
        // Highest version wins; equal versions (an illegal state the engine
        // tolerates) resolve to the lexicographically first name.
        members.sort_by_key(|m| (std::cmp::Reverse(naming::version_of(m)), m.clone()));
        let mut members = members.into_iter();
        let current = members.next().expect("family has at least one member");
        result.versions.insert(identity, current);
        result.files_to_delete.extend(members);
    }
    result.files_to_delete.sort();
    Ok(result)
}
