//! Document rebuilding: marker scanning, substitutions, assembly.
//!
//! A rebuild merges an existing published document (if any) with newly
//! submitted content (if any) into the full replacement bytes for `i.html`.
//! There is no HTML parser here and that is deliberate: inputs are either
//! hand-authored submissions or pages this crate emitted itself, so fixed
//! anchor strings are located by byte offset and a list of substitutions is
//! spliced over the content region. The scanning primitives
//! ([`find_marker_span`], [`extract_content`], [`head_script_refs`]) are
//! narrow, separately testable functions; a real parser could replace them
//! without touching the pipeline.
//!
//! The substitution list for a buffer is built sorted and non-overlapping —
//! the date stamp region precedes any body image for real inputs — and
//! [`apply_substitutions`] consumes every byte of the source exactly once.

use crate::config::SiteConfig;
use crate::naming::{self, UnvName};
use crate::reconcile::LocalFiles;
use crate::shared::SharedAssetVersions;
use crate::template::{
    self, CONTENT_CLOSE, CONTENT_OPEN, CORE_SCRIPT, CORE_STYLE, DATE_LEN, DATES_CLOSE, DATES_OPEN,
    FAVICON, PageChrome, STAMP_PREFIX, STAMP_UPDATED_SEP,
};
use std::ops::Range;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RebuildError {
    #[error("document has neither existing nor submitted content")]
    NoInput,
    #[error("missing {0} anchor")]
    MissingAnchor(&'static str),
    #[error("date stamp is missing or malformed")]
    BadDateStamp,
    #[error("unresolvable script reference \"{0}\"")]
    BadScriptRef(String),
}

/// Replace the bytes `[start, end)` of a buffer with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Apply a sorted, non-overlapping substitution list to `src`.
///
/// The producer guarantees ordering; this only re-checks it in debug builds.
pub fn apply_substitutions(src: &str, subs: &[Substitution]) -> String {
    let mut out = String::with_capacity(src.len() + 64);
    let mut pos = 0;
    for sub in subs {
        debug_assert!(sub.start >= pos, "substitutions overlap or are unsorted");
        debug_assert!(sub.start <= sub.end && sub.end <= src.len());
        out.push_str(&src[pos..sub.start]);
        out.push_str(&sub.text);
        pos = sub.end;
    }
    out.push_str(&src[pos..]);
    out
}

/// Byte spans of a marker pair within a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSpan {
    /// From the first byte of the open marker to one past the close marker.
    pub outer: Range<usize>,
    /// The region between the markers.
    pub inner: Range<usize>,
}

/// Locate the first `open`…`close` marker pair in `buf`.
pub fn find_marker_span(buf: &str, open: &str, close: &str) -> Option<MarkerSpan> {
    let start = buf.find(open)?;
    let inner_start = start + open.len();
    let close_rel = buf[inner_start..].find(close)?;
    let inner_end = inner_start + close_rel;
    Some(MarkerSpan {
        outer: start..inner_end + close.len(),
        inner: inner_start..inner_end,
    })
}

/// The parsed fields of a date stamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateStamp {
    pub created: String,
    pub updated: Option<String>,
}

/// Parse the date stamp out of a published document. The created date is a
/// fixed-width field at a fixed offset after the opening marker.
pub fn parse_date_stamp(buf: &str) -> Result<DateStamp, RebuildError> {
    let span = find_marker_span(buf, DATES_OPEN, DATES_CLOSE).ok_or(RebuildError::BadDateStamp)?;
    let inner = &buf[span.inner];
    let rest = inner
        .strip_prefix(STAMP_PREFIX)
        .ok_or(RebuildError::BadDateStamp)?;
    let created = take_date(rest)?;
    let rest = &rest[DATE_LEN..];
    let updated = match rest.strip_prefix(STAMP_UPDATED_SEP) {
        Some(tail) => Some(take_date(tail)?),
        None => None,
    };
    Ok(DateStamp { created, updated })
}

fn take_date(s: &str) -> Result<String, RebuildError> {
    if s.len() < DATE_LEN {
        return Err(RebuildError::BadDateStamp);
    }
    let date = &s[..DATE_LEN];
    if !date.bytes().all(|b| b.is_ascii_digit() || b == b'-') {
        return Err(RebuildError::BadDateStamp);
    }
    Ok(date.to_string())
}

/// Locate the content region: the explicit marker pair in published
/// documents, the outermost `<body>` tags in raw submissions.
pub fn extract_content(buf: &str, published: bool) -> Result<Range<usize>, RebuildError> {
    if published {
        let span = find_marker_span(buf, CONTENT_OPEN, CONTENT_CLOSE)
            .ok_or(RebuildError::MissingAnchor("content"))?;
        Ok(span.inner)
    } else {
        let start = buf
            .find("<body>")
            .ok_or(RebuildError::MissingAnchor("<body>"))?
            + "<body>".len();
        let end = buf
            .rfind("</body>")
            .filter(|&end| end >= start)
            .ok_or(RebuildError::MissingAnchor("</body>"))?;
        Ok(start..end)
    }
}

/// Collect the `src` of every `<script>` tag inside `<head>`…`</head>`.
/// Script tags without a `src` attribute (the embedded nav snapshot) are
/// skipped.
pub fn head_script_refs(buf: &str) -> Result<Vec<String>, RebuildError> {
    let head = find_marker_span(buf, "<head>", "</head>")
        .ok_or(RebuildError::MissingAnchor("<head>"))?;
    let head = &buf[head.inner];

    let mut refs = Vec::new();
    let mut at = 0;
    while let Some(rel) = head[at..].find("<script") {
        let tag_start = at + rel + "<script".len();
        let Some(tag_len) = head[tag_start..].find('>') else {
            break;
        };
        let tag = &head[tag_start..tag_start + tag_len];
        if let Some(src_at) = tag.find("src=\"") {
            let value = &tag[src_at + "src=\"".len()..];
            if let Some(quote) = value.find('"') {
                refs.push(value[..quote].to_string());
            }
        }
        at = tag_start + tag_len;
    }
    Ok(refs)
}

/// Everything a single document rebuild needs, resolved by the caller and
/// passed by value — there is no ambient state.
pub struct RebuildInput<'a> {
    /// Current published bytes, empty when the document is new.
    pub existing: &'a str,
    /// Newly submitted bytes, empty for asset-only or synthesized updates.
    pub submitted: &'a str,
    /// This document's reconciled local asset versions.
    pub local: &'a LocalFiles,
    /// The run's shared asset version table.
    pub shared: &'a SharedAssetVersions,
    /// The run's serialized navigation snapshot.
    pub nav_json: &'a str,
    /// Today, as `YYYY-MM-DD`.
    pub today: &'a str,
    /// False only when the update is triggered purely by asset changes, so
    /// the document's own "updated" field must not move.
    pub bump_date: bool,
    /// Current target folder listing, for resolving the local script when
    /// `local` is empty (synthesized updates).
    pub target_files: &'a [String],
}

/// Produce the full replacement document bytes.
pub fn rebuild(input: &RebuildInput<'_>, config: &SiteConfig) -> Result<String, RebuildError> {
    if input.existing.is_empty() && input.submitted.is_empty() {
        return Err(RebuildError::NoInput);
    }
    let from_submission = !input.submitted.is_empty();
    let main = if from_submission {
        input.submitted
    } else {
        input.existing
    };

    let old_stamp = if input.existing.is_empty() {
        None
    } else {
        Some(parse_date_stamp(input.existing)?)
    };

    let content_range = extract_content(main, !from_submission)?;
    let content = &main[content_range];

    let mut subs = Vec::new();
    subs.push(date_substitution(content, old_stamp, input.today, input.bump_date));
    collect_image_substitutions(content, input.local, &mut subs);
    subs.sort_by_key(|s| s.start);

    let new_content = apply_substitutions(content, &subs);

    let refs = head_script_refs(main)?;
    let script_srcs = resolve_script_refs(&refs, input, config)?;
    let chrome = PageChrome {
        style_href: input
            .shared
            .resolve(CORE_STYLE)
            .map(|name| format!("{}{}", config.url_prefix, name)),
        favicon_href: input
            .shared
            .resolve(FAVICON)
            .map(|name| format!("{}{}", config.url_prefix, name)),
        script_srcs,
        nav_json: input.nav_json.to_string(),
    };
    Ok(template::render_page(&chrome, &new_content))
}

/// The date stamp substitution: over the old stamp's exact byte span when
/// one is present in the content, otherwise a zero-width insertion at the
/// content start.
fn date_substitution(
    content: &str,
    old_stamp: Option<DateStamp>,
    today: &str,
    bump_date: bool,
) -> Substitution {
    let span = find_marker_span(content, DATES_OPEN, DATES_CLOSE)
        .map(|s| s.outer)
        .unwrap_or(0..0);

    let stamp = if bump_date {
        let created = old_stamp
            .map(|s| s.created)
            .unwrap_or_else(|| today.to_string());
        if created == today {
            template::date_stamp(&created, None)
        } else {
            template::date_stamp(&created, Some(today))
        }
    } else {
        // No-op rewrite: re-emit the parsed stamp in canonical shape.
        let stamp = old_stamp.unwrap_or(DateStamp {
            created: today.to_string(),
            updated: None,
        });
        template::date_stamp(&stamp.created, stamp.updated.as_deref())
    };

    Substitution {
        start: span.start,
        end: span.end,
        text: stamp,
    }
}

/// One substitution per `<img src="…">` whose identity resolves in the
/// local version map. Unresolvable references (external URLs, assets of
/// other documents) are left untouched.
fn collect_image_substitutions(content: &str, local: &LocalFiles, subs: &mut Vec<Substitution>) {
    let mut at = 0;
    while let Some(rel) = content[at..].find("<img") {
        let tag_start = at + rel + "<img".len();
        let Some(tag_len) = content[tag_start..].find('>') else {
            break;
        };
        let tag = &content[tag_start..tag_start + tag_len];
        if let Some(src_at) = tag.find("src=\"") {
            let value_start = tag_start + src_at + "src=\"".len();
            if let Some(quote) = content[value_start..tag_start + tag_len].find('"') {
                let value = &content[value_start..value_start + quote];
                if let Some(current) = local.current(value) {
                    subs.push(Substitution {
                        start: value_start,
                        end: value_start + quote,
                        text: current.to_string(),
                    });
                }
            }
        }
        at = tag_start + tag_len;
    }
}

/// Resolve head script references against the shared table and the local
/// version map. Any reference that is neither the local script (by
/// identity) nor under the shared URL prefix is a configuration error.
fn resolve_script_refs(
    refs: &[String],
    input: &RebuildInput<'_>,
    config: &SiteConfig,
) -> Result<Vec<String>, RebuildError> {
    let mut srcs = Vec::new();
    if let Some(core) = input.shared.resolve(CORE_SCRIPT) {
        srcs.push(format!("{}{}", config.url_prefix, core));
    }

    let core_identity = UnvName::new(CORE_SCRIPT);
    let local_identity = UnvName::new(&config.local_script);
    for r in refs {
        if let Some(name) = r.strip_prefix(&config.url_prefix) {
            let resolved = input
                .shared
                .resolve(name)
                .ok_or_else(|| RebuildError::BadScriptRef(r.clone()))?;
            if UnvName::new(name) == core_identity {
                continue; // already emitted first
            }
            srcs.push(format!("{}{}", config.url_prefix, resolved));
        } else if UnvName::new(r) == local_identity {
            let current = input
                .local
                .current(r)
                .map(str::to_string)
                .or_else(|| newest_in_listing(input.target_files, &local_identity))
                .ok_or_else(|| RebuildError::BadScriptRef(r.clone()))?;
            srcs.push(current);
        } else {
            return Err(RebuildError::BadScriptRef(r.clone()));
        }
    }
    Ok(srcs)
}

/// The highest-versioned member of `identity`'s family in a folder listing.
fn newest_in_listing(files: &[String], identity: &UnvName) -> Option<String> {
    files
        .iter()
        .filter(|f| UnvName::new(f) == *identity)
        .min_by_key(|f| (std::cmp::Reverse(naming::version_of(f)), (*f).clone()))
        .cloned()
}
