//! End-to-end ingestion scenarios against real temp directories.
//!
//! Each test builds an inbox and a published tree, drives full runs through
//! `publish::run_once`, and asserts on the resulting files.

use inkpress::config::SiteConfig;
use inkpress::publish::run_once;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Site {
    tmp: TempDir,
}

impl Site {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("inbox")).unwrap();
        fs::create_dir_all(tmp.path().join("site")).unwrap();
        Site { tmp }
    }

    fn inbox(&self) -> PathBuf {
        self.tmp.path().join("inbox")
    }

    fn site(&self) -> PathBuf {
        self.tmp.path().join("site")
    }

    fn submit(&self, subfolder: &str, name: &str, content: &str) {
        let dir = self.inbox().join(subfolder);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
    }

    fn run(&self, today: &str) -> inkpress::publish::RunReport {
        run_once(&self.inbox(), &self.site(), &SiteConfig::default(), today).unwrap()
    }

    fn published(&self, target: &str) -> String {
        let path = self.site().join(target).join("i.html");
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("missing published doc {}: {e}", path.display()))
    }
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

const BODY: &str = "<div>Hello world!</div>";

fn submission(body: &str) -> String {
    format!("<html>\n<head>\n</head>\n<body>\n{body}\n</body>\n</html>")
}

// =========================================================================
// Creation
// =========================================================================

#[test]
fn create_publishes_doc_and_consumes_inbox() {
    let site = Site::new();
    let doc = submission(BODY); // ~50 bytes of i.html
    site.submit("a.b.c", "i.html", &doc);

    let report = site.run("2024-06-01");

    assert_eq!(report.created, vec!["a/b/c".to_string()]);
    assert!(!site.inbox().join("a.b.c").exists());
    let page = site.published("a/b/c");
    // created == updated shows as the one-field stamp
    assert!(page.contains(
        "<!-- Dates --><div id=\"_dtSt\">Created: 2024-06-01</div><!-- / -->"
    ));
    assert!(page.contains(BODY));
}

#[test]
fn created_doc_embeds_nav_snapshot() {
    let site = Site::new();
    site.submit("news.2024.launch", "i.html", &submission(BODY));
    site.submit("about", "i.html", &submission("<p>about</p>"));

    site.run("2024-06-01");

    let page = site.published("about");
    let nav_at = page.find("id=\"_nav\">").unwrap();
    let nav = &page[nav_at..];
    assert!(nav.contains("[\"news\",[[\"2024\",[[\"news/2024/launch\",[]]]]]]"));
    assert!(nav.contains("[\"about\",[]]"));
    // both documents of one run share the same snapshot
    assert_eq!(
        page_nav(&site.published("news/2024/launch")),
        page_nav(&page)
    );
}

fn page_nav(page: &str) -> String {
    let start = page.find("id=\"_nav\">").unwrap() + "id=\"_nav\">".len();
    let end = start + page[start..].find("</script>").unwrap();
    page[start..end].to_string()
}

// =========================================================================
// Deletion
// =========================================================================

#[test]
fn zero_byte_index_deletes_published_doc() {
    let site = Site::new();
    site.submit("a.b.c", "i.html", &submission(BODY));
    site.run("2024-06-01");
    assert!(site.site().join("a/b/c").exists());

    site.submit("a.b.c", "i.html", "");
    let report = site.run("2024-06-02");

    assert_eq!(report.deleted, vec!["a/b/c".to_string()]);
    assert!(!site.site().join("a/b/c").exists());
    assert!(!site.inbox().join("a.b.c").exists());
}

#[test]
fn docs_rewritten_alongside_a_delete_drop_it_from_nav() {
    let site = Site::new();
    site.submit("keep", "i.html", &submission(BODY));
    site.submit("drop", "i.html", &submission(BODY));
    site.run("2024-06-01");
    assert!(page_nav(&site.published("keep")).contains("drop"));

    // same run: delete one doc, update the other
    site.submit("drop", "i.html", "x"); // one byte is still a delete marker
    site.submit("keep", "i.html", &submission("<p>fresh</p>"));
    site.run("2024-06-02");

    let page = site.published("keep");
    assert!(page_nav(&page).contains("keep"));
    assert!(!page_nav(&page).contains("drop"));
}

#[test]
fn untouched_docs_keep_their_run_snapshot() {
    // Nav snapshots are per-run: a document that isn't rewritten keeps the
    // snapshot of the run that last produced it.
    let site = Site::new();
    site.submit("keep", "i.html", &submission(BODY));
    site.submit("drop", "i.html", &submission(BODY));
    site.run("2024-06-01");

    site.submit("drop", "i.html", "");
    site.run("2024-06-02");

    assert!(page_nav(&site.published("keep")).contains("drop"));
}

// =========================================================================
// Asset versioning across updates
// =========================================================================

#[test]
fn resubmitted_image_gets_bumped_and_rewritten() {
    let site = Site::new();
    let doc = submission("<div>pic:</div><img src=\"img.png\">");
    site.submit("x.y", "i.html", &doc);
    site.submit("x.y", "img.png", "v1 pixels");
    site.run("2024-06-01");
    assert!(site.site().join("x/y/img.png").exists());

    site.submit("x.y", "i.html", &doc);
    site.submit("x.y", "img.png", "v2 pixels");
    site.run("2024-06-05");

    let names = files_in(&site.site().join("x/y"));
    assert_eq!(names, vec!["i.html".to_string(), "img-2.png".to_string()]);
    assert!(site.published("x/y").contains("<img src=\"img-2.png\">"));
}

#[test]
fn asset_only_resubmission_keeps_update_date() {
    let site = Site::new();
    let doc = submission("<img src=\"img.png\">");
    site.submit("x.y", "i.html", &doc);
    site.submit("x.y", "img.png", "v1");
    site.run("2024-06-01");

    // image only, no i.html: references refresh but the stamp stays
    site.submit("x.y", "img.png", "v2");
    let report = site.run("2024-07-20");

    assert_eq!(report.updated, vec!["x/y".to_string()]);
    let page = site.published("x/y");
    assert!(page.contains("Created: 2024-06-01</div>"));
    assert!(!page.contains("2024-07-20"));
    assert!(page.contains("<img src=\"img-2.png\">"));
}

#[test]
fn update_stamps_both_dates() {
    let site = Site::new();
    site.submit("d", "i.html", &submission("<p>one</p>"));
    site.run("2024-06-01");

    site.submit("d", "i.html", &submission("<p>two</p>"));
    site.run("2024-06-09");

    let page = site.published("d");
    assert!(page.contains(
        "<div id=\"_dtSt\">Created: 2024-06-01, updated: 2024-06-09</div>"
    ));
    assert!(page.contains("<p>two</p>"));
    assert!(!page.contains("<p>one</p>"));
}

// =========================================================================
// Local scripts
// =========================================================================

#[test]
fn local_script_versions_follow_the_document() {
    let site = Site::new();
    let doc = "<html><head>\
        <script type=\"text/javascript\" src=\"local.js\"></script>\
        </head><body><p>scripted</p></body></html>";
    site.submit("app", "i.html", doc);
    site.submit("app", "local.js", "v1");
    site.run("2024-06-01");
    assert!(site.published("app").contains("src=\"local.js\""));

    site.submit("app", "i.html", doc);
    site.submit("app", "local.js", "v2");
    site.run("2024-06-02");

    let page = site.published("app");
    assert!(page.contains("src=\"local-2.js\""));
    let names = files_in(&site.site().join("app"));
    assert_eq!(names, vec!["i.html".to_string(), "local-2.js".to_string()]);
}

// =========================================================================
// Shared assets
// =========================================================================

#[test]
fn shared_asset_update_rewrites_all_documents() {
    let site = Site::new();
    site.submit("one", "i.html", &submission("<p>1</p>"));
    site.submit("two", "i.html", &submission("<p>2</p>"));
    fs::write(site.inbox().join("style.css"), "v1").unwrap();
    fs::write(site.inbox().join("script.js"), "v1").unwrap();
    site.run("2024-06-01");

    assert!(site.published("one").contains("href=\"/blog/style.css\""));
    assert!(site.published("one").contains("src=\"/blog/script.js\""));

    fs::write(site.inbox().join("script.js"), "v2").unwrap();
    let report = site.run("2024-06-20");

    assert_eq!(report.updated.len(), 2);
    for target in ["one", "two"] {
        let page = site.published(target);
        assert!(page.contains("src=\"/blog/script-2.js\""));
        // synthesized updates never move the document's own dates
        assert!(page.contains("Created: 2024-06-01</div>"));
    }
    assert!(site.site().join("script-2.js").exists());
    assert!(!site.site().join("script.js").exists());
}

// =========================================================================
// Idempotence
// =========================================================================

#[test]
fn rerun_of_consumed_inbox_is_a_noop() {
    let site = Site::new();
    site.submit("a.b", "i.html", &submission(BODY));
    site.run("2024-06-01");
    let first = site.published("a/b");

    let report = site.run("2024-06-02");

    assert!(report.created.is_empty());
    assert!(report.updated.is_empty());
    assert!(report.deleted.is_empty());
    assert_eq!(site.published("a/b"), first);
}

#[test]
fn failed_entry_is_retried_after_the_author_fixes_it() {
    let site = Site::new();
    let bad = "<html><head>\
        <script src=\"https://cdn.example.com/x.js\"></script>\
        </head><body>x</body></html>";
    site.submit("doc", "i.html", bad);

    let report = site.run("2024-06-01");
    assert_eq!(report.failed.len(), 1);
    assert!(site.inbox().join("doc/i.html").exists());

    site.submit("doc", "i.html", &submission(BODY));
    let report = site.run("2024-06-02");
    assert_eq!(report.created, vec!["doc".to_string()]);
    assert!(!site.inbox().join("doc").exists());
}
