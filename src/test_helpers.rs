//! Shared test utilities for the inkpress test suite.
//!
//! Builds inbox and published-tree fixtures inside a `TempDir` so each test
//! gets an isolated filesystem it can mutate freely.

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// An isolated inbox + published-tree pair.
pub struct SiteFixture {
    pub tmp: TempDir,
}

impl SiteFixture {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("inbox")).unwrap();
        fs::create_dir_all(tmp.path().join("site")).unwrap();
        SiteFixture { tmp }
    }

    pub fn inbox(&self) -> PathBuf {
        self.tmp.path().join("inbox")
    }

    pub fn site(&self) -> PathBuf {
        self.tmp.path().join("site")
    }

    /// Drop a file into an inbox subfolder (created on demand).
    pub fn submit(&self, subfolder: &str, name: &str, content: &str) {
        let dir = self.inbox().join(subfolder);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
    }

    /// Drop a shared asset into the inbox root.
    pub fn submit_shared(&self, name: &str, content: &str) {
        fs::write(self.inbox().join(name), content).unwrap();
    }

    /// Read a published file, panicking with a useful path on absence.
    pub fn published(&self, target: &str, name: &str) -> String {
        let path = self.site().join(target).join(name);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("missing published file {}: {e}", path.display()))
    }
}

/// A minimal raw submission: a head referencing the local script and a body
/// with one image.
pub fn submission(body: &str) -> String {
    format!(
        "<html>\n<head>\n    <script type=\"text/javascript\" src=\"local.js\"></script>\n\
         </head>\n<body>\n{body}\n</body>\n</html>"
    )
}

/// A raw submission with no script references and a plain body.
pub fn bare_submission(body: &str) -> String {
    format!("<html>\n<head>\n</head>\n<body>\n{body}\n</body>\n</html>")
}
