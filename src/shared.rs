//! Shared asset ingestion and the per-run version table.
//!
//! Shared assets — the core script, the stylesheet, the favicon, anything
//! referenced by many documents — are the immediate files of the inbox root.
//! Each is moved into the published root under a bumped version name, and
//! the resulting table of current versions is threaded by value through the
//! rest of the run; nothing here outlives a single invocation.
//!
//! Superseded shared files are only deleted after every document has been
//! rewritten (the publish stage does this last), so a crash mid-run leaves
//! old and new versions coexisting instead of documents referencing a
//! deleted script.

use crate::config::CONFIG_FILENAME;
use crate::naming::{self, UnvName};
use crate::store;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Current file name per shared asset identity, built once per run.
#[derive(Debug, Clone, Default)]
pub struct SharedAssetVersions {
    versions: BTreeMap<UnvName, String>,
}

impl SharedAssetVersions {
    /// The current file name for whatever version of an asset `name` refers
    /// to, or `None` when the site has no such shared asset.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.versions.get(&UnvName::new(name)).map(String::as_str)
    }

    #[cfg(test)]
    pub fn of(entries: &[(&str, &str)]) -> Self {
        let versions = entries
            .iter()
            .map(|(id, current)| (UnvName::new(id), current.to_string()))
            .collect();
        SharedAssetVersions { versions }
    }
}

/// Outcome of the shared-asset pass.
#[derive(Debug, Default)]
pub struct SharedIngest {
    /// Current version per identity, after this run's moves.
    pub table: SharedAssetVersions,
    /// Whether any shared asset was submitted this run. When true, every
    /// published document must be rewritten so its head references the new
    /// versions.
    pub changed: bool,
    /// (submitted name, published name) pairs for the run report.
    pub bumped: Vec<(String, String)>,
    /// Superseded shared files, deleted at the very end of the run.
    pub files_to_delete: Vec<String>,
}

/// Move this run's shared asset submissions into the published root and
/// rebuild the version table from what survives there.
///
/// `config.toml` is configuration, not an asset, and is left in place.
pub fn ingest_shared(inbox_root: &Path, published_root: &Path) -> Result<SharedIngest, SharedError> {
    let submitted: Vec<String> = store::list_files(inbox_root)?
        .into_iter()
        .filter(|name| name != CONFIG_FILENAME)
        .collect();

    let existing = store::list_files(published_root)?;
    let mut ingest = SharedIngest::default();
    for name in &submitted {
        let bumped = naming::bumped_name(&UnvName::new(name), &existing);
        store::move_file_with_rename(inbox_root, name, published_root, &bumped)?;
        ingest.bumped.push((name.clone(), bumped));
    }
    ingest.changed = !ingest.bumped.is_empty();

    let mut families: BTreeMap<UnvName, Vec<String>> = BTreeMap::new();
    for name in store::list_files(published_root)? {
        families.entry(UnvName::new(&name)).or_default().push(name);
    }
    for (identity, mut members) in families {
        members.sort_by_key(|m| (std::cmp::Reverse(naming::version_of(m)), m.clone()));
        let mut members = members.into_iter();
        let current = members.next().expect("family has at least one member");
        ingest.table.versions.insert(identity, current);
        ingest.files_to_delete.extend(members);
    }
    ingest.files_to_delete.sort();
    Ok(ingest)
}
