//! Plan execution against the published tree.
//!
//! Persist order is the crash-safety story: a document's new `i.html` is
//! written before its superseded assets are deleted, document deletions run
//! after all rewrites, and superseded shared assets are removed last of all.
//! An interrupted run therefore leaves old and new files coexisting — never
//! a published page referencing a file that is already gone — and re-running
//! converges on the same final state.
//!
//! Failures are isolated per document: a configuration error (bad script
//! reference, missing anchors, garbled date stamp) or an I/O failure is
//! recorded in the run report and that document's inbox entry is left in
//! place, so the next run retries it. The rest of the run proceeds.

use crate::config::SiteConfig;
use crate::rebuild::{self, RebuildInput};
use crate::scan::{self, DocOp, IngestionPlan};
use crate::shared::{self, SharedIngest};
use crate::store;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Rebuild(#[from] rebuild::RebuildError),
}

/// Errors that abort a whole run before any document work starts.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Shared(#[from] shared::SharedError),
    #[error(transparent)]
    Scan(#[from] scan::ScanError),
}

/// A document the run could not process.
#[derive(Debug)]
pub struct DocFailure {
    pub target: String,
    pub reason: String,
}

/// What one run actually did.
#[derive(Debug, Default)]
pub struct RunReport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub deleted: Vec<String>,
    pub failed: Vec<DocFailure>,
    /// Inbox entries the classifier refused, with reasons.
    pub skipped: Vec<(String, String)>,
    /// Shared assets bumped this run: (submitted name, published name).
    pub shared_bumped: Vec<(String, String)>,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }
}

/// One full ingestion pass: shared assets, classification, execution.
pub fn run_once(
    inbox_root: &Path,
    published_root: &Path,
    config: &SiteConfig,
    today: &str,
) -> Result<RunReport, RunError> {
    let shared = shared::ingest_shared(inbox_root, published_root)?;
    let plan = scan::build_plan(inbox_root, published_root, shared.changed, config)?;
    Ok(execute(
        &plan,
        &shared,
        inbox_root,
        published_root,
        config,
        today,
    ))
}

/// Execute a plan. Deletions come last; see the module docs for why.
pub fn execute(
    plan: &IngestionPlan,
    shared: &SharedIngest,
    inbox_root: &Path,
    published_root: &Path,
    config: &SiteConfig,
    today: &str,
) -> RunReport {
    let mut report = RunReport {
        shared_bumped: shared.bumped.clone(),
        skipped: plan
            .skipped
            .iter()
            .map(|s| (s.source.clone(), s.reason.clone()))
            .collect(),
        ..RunReport::default()
    };

    for op in &plan.create {
        match apply_doc(op, plan, shared, inbox_root, published_root, config, today) {
            Ok(()) => report.created.push(op.target.clone()),
            Err(err) => report.failed.push(DocFailure {
                target: op.target.clone(),
                reason: err.to_string(),
            }),
        }
    }
    for op in &plan.update {
        match apply_doc(op, plan, shared, inbox_root, published_root, config, today) {
            Ok(()) => report.updated.push(op.target.clone()),
            Err(err) => report.failed.push(DocFailure {
                target: op.target.clone(),
                reason: err.to_string(),
            }),
        }
    }

    for del in &plan.delete {
        let result = store::delete_dir_if_exists(&published_root.join(&del.target))
            .and_then(|_| store::delete_dir_if_exists(&inbox_root.join(&del.source)));
        match result {
            Ok(_) => report.deleted.push(del.target.clone()),
            Err(err) => report.failed.push(DocFailure {
                target: del.target.clone(),
                reason: err.to_string(),
            }),
        }
    }

    for name in &shared.files_to_delete {
        if let Err(err) = store::delete_if_exists(published_root, name) {
            report.failed.push(DocFailure {
                target: name.clone(),
                reason: err.to_string(),
            });
        }
    }

    report
}

/// Rebuild and persist one document, then clean up after it: superseded
/// assets first, the consumed inbox folder last.
fn apply_doc(
    op: &DocOp,
    plan: &IngestionPlan,
    shared: &SharedIngest,
    inbox_root: &Path,
    published_root: &Path,
    config: &SiteConfig,
    today: &str,
) -> Result<(), PublishError> {
    let target_dir = published_root.join(&op.target);
    let existing = store::read_text_file(&target_dir, &config.index_file)?;
    let target_files = store::list_files(&target_dir)?;

    let html = rebuild::rebuild(
        &RebuildInput {
            existing: &existing,
            submitted: &op.new_content,
            local: &op.local,
            shared: &shared.table,
            nav_json: &plan.nav_json,
            today,
            bump_date: op.bump_date,
            target_files: &target_files,
        },
        config,
    )?;

    store::save_overwrite(&target_dir, &config.index_file, &html)?;
    for name in &op.local.files_to_delete {
        store::delete_if_exists(&target_dir, name)?;
    }
    if let Some(source) = &op.source {
        store::delete_dir_if_exists(&inbox_root.join(source))?;
    }
    Ok(())
}
