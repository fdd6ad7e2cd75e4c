//! Fixed page chrome and document markers.
//!
//! Every published document is assembled from the same chrome: a head with
//! the shared stylesheet, script tags and the embedded navigation snapshot,
//! then the content region bracketed by literal markers. The rebuild stage
//! finds those markers again on the next update, so the byte shapes here are
//! a contract — the emitter and the scanner must agree exactly.
//!
//! HTML generation uses [maud](https://maud.lambda.xyz/): templates are
//! type-safe Rust with automatic escaping, and the marker comments are
//! injected pre-escaped so they come out byte-identical.

use maud::{DOCTYPE, PreEscaped, html};

/// Opens the date stamp region inside the content.
pub const DATES_OPEN: &str = "<!-- Dates -->";
/// Closes the date stamp region.
pub const DATES_CLOSE: &str = "<!-- / -->";
/// Fixed prefix of the stamp `<div>`; the created date is the 10 bytes that
/// follow it.
pub const STAMP_PREFIX: &str = "<div id=\"_dtSt\">Created: ";
/// Separates the created date from the optional updated date.
pub const STAMP_UPDATED_SEP: &str = ", updated: ";
/// Closes the stamp `<div>`.
pub const STAMP_SUFFIX: &str = "</div>";
/// Byte length of a `YYYY-MM-DD` date.
pub const DATE_LEN: usize = 10;

/// Opens the content region of a published document.
pub const CONTENT_OPEN: &str = "<div id=\"_content\">";
/// Closes the content region of a published document.
pub const CONTENT_CLOSE: &str = "<!-- _contentEnd -->";

/// Identity of the shared core script emitted into every head.
pub const CORE_SCRIPT: &str = "script.js";
/// Identity of the shared stylesheet.
pub const CORE_STYLE: &str = "style.css";
/// Identity of the shared favicon.
pub const FAVICON: &str = "favicon.ico";

/// Render the full marker-wrapped date stamp.
///
/// With no updated date this is the short one-field form used when a
/// document is created and updated on the same day.
pub fn date_stamp(created: &str, updated: Option<&str>) -> String {
    match updated {
        Some(up) => format!(
            "{DATES_OPEN}{STAMP_PREFIX}{created}{STAMP_UPDATED_SEP}{up}{STAMP_SUFFIX}{DATES_CLOSE}"
        ),
        None => format!("{DATES_OPEN}{STAMP_PREFIX}{created}{STAMP_SUFFIX}{DATES_CLOSE}"),
    }
}

/// Resolved head references for one document.
pub struct PageChrome {
    /// `href` of the shared stylesheet, if the site has one.
    pub style_href: Option<String>,
    /// `href` of the favicon, if the site has one.
    pub favicon_href: Option<String>,
    /// Resolved `src` values in emit order: core script first, then any
    /// shared scripts the document references, then its local script.
    pub script_srcs: Vec<String>,
    /// The serialized navigation snapshot for this run.
    pub nav_json: String,
}

/// Assemble the final document bytes: chrome around a content region whose
/// substitutions (date stamp, asset references) have already been applied.
pub fn render_page(chrome: &PageChrome, content: &str) -> String {
    html! {
        (DOCTYPE)
        html {
            head {
                meta http-equiv="Content-Security-Policy"
                    content="default-src 'self'; script-src 'self'; base-uri 'self';";
                meta name="viewport" content="width=device-width,initial-scale=1";
                @if let Some(href) = &chrome.style_href {
                    link rel="stylesheet" href=(href);
                }
                @if let Some(href) = &chrome.favicon_href {
                    link rel="icon" href=(href);
                }
                @for src in &chrome.script_srcs {
                    script type="text/javascript" src=(src) {}
                }
                script type="application/json" id="_nav" {
                    (PreEscaped(&chrome.nav_json))
                }
            }
            body {
                div id="_content" {
                    (PreEscaped(content))
                    (PreEscaped(CONTENT_CLOSE))
                }
            }
        }
    }
    .into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_stamp_shape() {
        assert_eq!(
            date_stamp("2023-04-05", None),
            "<!-- Dates --><div id=\"_dtSt\">Created: 2023-04-05</div><!-- / -->"
        );
    }

    #[test]
    fn full_stamp_shape() {
        assert_eq!(
            date_stamp("2023-04-05", Some("2023-04-06")),
            "<!-- Dates --><div id=\"_dtSt\">Created: 2023-04-05, updated: 2023-04-06</div><!-- / -->"
        );
    }

    #[test]
    fn created_date_sits_at_fixed_offset() {
        let stamp = date_stamp("2023-04-05", Some("2023-04-06"));
        let at = DATES_OPEN.len() + STAMP_PREFIX.len();
        assert_eq!(&stamp[at..at + DATE_LEN], "2023-04-05");
    }

    #[test]
    fn rendered_page_contains_markers_and_refs() {
        let chrome = PageChrome {
            style_href: Some("/blog/style-2.css".into()),
            favicon_href: None,
            script_srcs: vec!["/blog/script.js".into(), "local-3.js".into()],
            nav_json: "[[\"a\",[]]]".into(),
        };
        let page = render_page(&chrome, "hello");

        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains(CONTENT_OPEN));
        assert!(page.contains(CONTENT_CLOSE));
        assert!(page.contains("<link rel=\"stylesheet\" href=\"/blog/style-2.css\">"));
        assert!(page.contains("<script type=\"text/javascript\" src=\"/blog/script.js\"></script>"));
        assert!(page.contains("<script type=\"text/javascript\" src=\"local-3.js\"></script>"));
        assert!(page.contains("<script type=\"application/json\" id=\"_nav\">[[\"a\",[]]]</script>"));
    }

    #[test]
    fn content_sits_between_markers() {
        let chrome = PageChrome {
            style_href: None,
            favicon_href: None,
            script_srcs: vec![],
            nav_json: "[]".into(),
        };
        let page = render_page(&chrome, "THE CONTENT");
        let start = page.find(CONTENT_OPEN).unwrap() + CONTENT_OPEN.len();
        let end = page.find(CONTENT_CLOSE).unwrap();
        assert_eq!(&page[start..end], "THE CONTENT");
    }
}
