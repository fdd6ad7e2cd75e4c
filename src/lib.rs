//! # Inkpress
//!
//! A batch publisher for hand-authored HTML document trees. Your filesystem
//! is the submission queue: authors drop document folders into an inbox,
//! a periodic run moves their assets into the published tree under immutable
//! version-numbered names, rewrites each document to reference the right
//! versions, stamps creation/update dates, and embeds a navigation index of
//! the whole tree into every page.
//!
//! # Architecture: One Pass, Three Stages
//!
//! ```text
//! 1. Shared    inbox root files     →  published root   (bump shared asset versions)
//! 2. Scan      inbox subfolders     →  IngestionPlan    (create/update/delete + nav)
//! 3. Publish   plan                 →  published tree   (rebuild docs, delete last)
//! ```
//!
//! A run is single-threaded, synchronous, and run-to-completion. Nothing is
//! cached between runs — the published tree on disk is the only durable
//! state, and every step is safe to redo against whatever a previous
//! interrupted run left behind. There is deliberately no inter-run locking;
//! one invocation at a time is the operating assumption.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`naming`] | `name-N.ext` version suffix parsing — asset identity and bumped names |
//! | [`store`] | filesystem adapter: sorted listings, atomic overwrite, move-rename |
//! | [`config`] | `config.toml` loading and validation |
//! | [`shared`] | shared asset ingestion and the per-run version table |
//! | [`reconcile`] | per-document local asset reconciliation |
//! | [`scan`] | inbox classification into an [`scan::IngestionPlan`] |
//! | [`nav`] | navigation tree build and iterative JSON serialization |
//! | [`rebuild`] | marker scanning, substitution lists, document assembly |
//! | [`template`] | fixed page chrome and the byte-exact marker contract |
//! | [`publish`] | plan execution with crash-safe persist ordering |
//! | [`output`] | CLI report formatting |
//!
//! # Design Decisions
//!
//! ## String-Offset Scanning Over an HTML Parser
//!
//! Documents are rebuilt by locating fixed marker strings and splicing a
//! sorted substitution list over the content region. Inputs are either
//! hand-authored submissions or pages this crate emitted itself, so a real
//! HTML parser would add a dependency and an error surface for no benefit.
//! The scanning primitives live behind narrow functions in [`rebuild`] so a
//! parser could replace them without touching the pipeline.
//!
//! ## Versioned Filenames Over Cache Headers
//!
//! Published assets are immutable: a changed image is a *new file* with a
//! bumped `-N` suffix, and documents are rewritten to reference it. Any
//! http server in front of the tree can then serve assets with unbounded
//! cache lifetimes. The version math lives in [`naming`]; reconciliation
//! against prior versions in [`reconcile`].
//!
//! ## Deletions Happen Last
//!
//! Within a document: write the new `i.html`, then delete superseded
//! assets. Across the run: rewrite everything, then delete removed
//! documents and superseded shared assets. A crash at any point leaves old
//! and new files coexisting — never a page referencing a deleted file — and
//! the next run converges. See [`publish`].
//!
//! ## Maud Over Template Engines
//!
//! The fixed page chrome is generated with [Maud](https://maud.lambda.xyz/):
//! compile-time checked, auto-escaped, no runtime template files. The
//! byte-exact markers the rebuilder scans for are injected pre-escaped in
//! one place, [`template`], which both the emitter and the scanner import.

pub mod config;
pub mod naming;
pub mod nav;
pub mod output;
pub mod publish;
pub mod rebuild;
pub mod reconcile;
pub mod scan;
pub mod shared;
pub mod store;
pub mod template;

#[cfg(test)]
pub(crate) mod test_helpers;
