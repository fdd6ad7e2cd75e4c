//! Inbox classification: turning submissions into an ingestion plan.
//!
//! Walks the inbox and the published tree and partitions inbox entries into
//! create / update / delete operations. Inbox subfolders use `.` as the
//! hierarchy separator — `news.2024.launch` publishes to `news/2024/launch`.
//! An index document of one byte or less is a delete marker for its target,
//! regardless of whether the target currently exists.
//!
//! Classification runs the asset reconciler for each entry, so building a
//! plan *moves* the submitted asset files into their target folders; the
//! plan then carries the resulting version maps. The read-only [`preview`]
//! exists for the CLI's dry-run commands.
//!
//! The navigation snapshot is built here, once, from the final published
//! path set (after creates and deletes) — every document written in one run
//! embeds the same snapshot.

use crate::config::SiteConfig;
use crate::nav::NavTree;
use crate::reconcile::{self, LocalFiles};
use crate::store;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One create or update operation of a plan.
#[derive(Debug, Serialize)]
pub struct DocOp {
    /// Inbox subfolder the submission came from; `None` for updates
    /// synthesized by a shared asset change.
    pub source: Option<String>,
    /// Published target path, `a/b/c` form.
    pub target: String,
    /// Reconciled local asset versions for this document.
    pub local: LocalFiles,
    /// Newly submitted index content; empty for asset-only refreshes.
    #[serde(skip)]
    pub new_content: String,
    /// False when only asset references change, so the document's own
    /// "updated" date must not move.
    pub bump_date: bool,
}

/// A delete operation: the marker folder in the inbox and its target.
#[derive(Debug, Serialize)]
pub struct DeleteOp {
    pub source: String,
    pub target: String,
}

/// An inbox entry the classifier refused, with the reason for the report.
#[derive(Debug, Serialize)]
pub struct SkippedEntry {
    pub source: String,
    pub reason: String,
}

/// Everything one run will do to the published tree.
#[derive(Debug, Serialize)]
pub struct IngestionPlan {
    pub create: Vec<DocOp>,
    pub update: Vec<DocOp>,
    pub delete: Vec<DeleteOp>,
    pub skipped: Vec<SkippedEntry>,
    /// The published path set after creates and deletes.
    pub all_paths: BTreeSet<String>,
    /// Serialized navigation snapshot shared by every document of this run.
    pub nav_json: String,
}

/// Map an inbox subfolder name to its published target path: dots become
/// slashes and whitespace is stripped.
pub fn target_path_of(subfolder: &str) -> String {
    subfolder
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '.' { '/' } else { c })
        .collect()
}

/// Classify every inbox entry and reconcile its assets into the published
/// tree, producing the plan for this run.
///
/// `shared_changed` synthesizes an asset-only update for every published
/// document that received no explicit submission — each document's head
/// references the shared assets' latest filenames, so all of them must be
/// rewritten when one changes.
pub fn build_plan(
    inbox_root: &Path,
    published_root: &Path,
    shared_changed: bool,
    config: &SiteConfig,
) -> Result<IngestionPlan, ScanError> {
    let mut published: BTreeSet<String> =
        store::list_dirs_containing(published_root, &config.index_file)?
            .into_iter()
            .collect();

    let mut plan = IngestionPlan {
        create: Vec::new(),
        update: Vec::new(),
        delete: Vec::new(),
        skipped: Vec::new(),
        all_paths: BTreeSet::new(),
        nav_json: String::new(),
    };
    let mut touched: BTreeSet<String> = BTreeSet::new();

    for subfolder in store::list_subfolders(inbox_root)? {
        let target = target_path_of(&subfolder);
        let source_dir = inbox_root.join(&subfolder);
        let target_dir = published_root.join(&target);

        let index_present = store::file_exists(&source_dir, &config.index_file);
        let content = store::read_text_file(&source_dir, &config.index_file)?;

        if index_present && content.len() <= 1 {
            published.remove(&target);
            touched.insert(target.clone());
            plan.delete.push(DeleteOp {
                source: subfolder,
                target,
            });
            continue;
        }

        let assets: Vec<String> = store::list_files(&source_dir)?
            .into_iter()
            .filter(|name| name != &config.index_file)
            .collect();
        let local = match reconcile::reconcile(&source_dir, &assets, &target_dir, &config.index_file)
        {
            Ok(local) => local,
            Err(err) => {
                // Abandon this document for the run; the inbox entry stays
                // in place and is retried next time.
                plan.skipped.push(SkippedEntry {
                    source: subfolder,
                    reason: err.to_string(),
                });
                continue;
            }
        };

        if published.contains(&target) {
            touched.insert(target.clone());
            plan.update.push(DocOp {
                source: Some(subfolder),
                bump_date: !content.is_empty(),
                target,
                local,
                new_content: content,
            });
        } else if !content.is_empty() {
            published.insert(target.clone());
            touched.insert(target.clone());
            plan.create.push(DocOp {
                source: Some(subfolder),
                target,
                local,
                new_content: content,
                bump_date: true,
            });
        } else {
            plan.skipped.push(SkippedEntry {
                source: subfolder,
                reason: "no index content for a new document".to_string(),
            });
        }
    }

    if shared_changed {
        for target in &published {
            if touched.contains(target) {
                continue;
            }
            plan.update.push(DocOp {
                source: None,
                target: target.clone(),
                local: LocalFiles::empty(),
                new_content: String::new(),
                bump_date: false,
            });
        }
    }

    let paths: Vec<String> = published.iter().cloned().collect();
    plan.nav_json = NavTree::from_paths(&paths).to_json();
    plan.all_paths = published;
    Ok(plan)
}

/// Read-only classification of one inbox entry, for dry-run output.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum EntryKind {
    Create,
    Update,
    RefreshAssets,
    Delete,
    Invalid,
}

#[derive(Debug, Serialize)]
pub struct PreviewEntry {
    pub source: String,
    pub target: String,
    pub kind: EntryKind,
}

/// What a run would do, without touching anything.
#[derive(Debug, Serialize)]
pub struct PlanPreview {
    pub docs: Vec<PreviewEntry>,
    /// Shared asset submissions waiting in the inbox root.
    pub shared: Vec<String>,
}

/// Classify the inbox without moving any file. Used by `plan` and `check`.
pub fn preview(
    inbox_root: &Path,
    published_root: &Path,
    config: &SiteConfig,
) -> Result<PlanPreview, ScanError> {
    let published: BTreeSet<String> =
        store::list_dirs_containing(published_root, &config.index_file)?
            .into_iter()
            .collect();

    let mut docs = Vec::new();
    let mut seen: BTreeSet<String> = published.clone();
    for subfolder in store::list_subfolders(inbox_root)? {
        let target = target_path_of(&subfolder);
        let source_dir = inbox_root.join(&subfolder);
        let index_present = store::file_exists(&source_dir, &config.index_file);
        let content = store::read_text_file(&source_dir, &config.index_file)?;

        let kind = if index_present && content.len() <= 1 {
            EntryKind::Delete
        } else if seen.contains(&target) {
            if content.is_empty() {
                EntryKind::RefreshAssets
            } else {
                EntryKind::Update
            }
        } else if !content.is_empty() {
            seen.insert(target.clone());
            EntryKind::Create
        } else {
            EntryKind::Invalid
        };
        docs.push(PreviewEntry {
            source: subfolder,
            target,
            kind,
        });
    }

    let shared = store::list_files(inbox_root)?
        .into_iter()
        .filter(|name| name != crate::config::CONFIG_FILENAME)
        .collect();
    Ok(PlanPreview { docs, shared })
}
