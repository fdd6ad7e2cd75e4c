//! Centralized filename parsing for the `name-N.ext` version convention.
//!
//! Published asset files carry an immutable version suffix before the
//! extension: `img.png` is version 1, `img-2.png` version 2, and so on.
//! Stripping the suffix yields the file's *identity* — the part of the name
//! that is stable across version bumps. Two filenames refer to the same asset
//! exactly when their identities are equal.
//!
//! A dash inside the stem is only a version marker when what follows it is
//! numeric: `my-file.png` and `archive-final.png` are plain identities,
//! while `archive-12.png` is version 12 of `archive.png`.

use std::fmt;

/// An unversioned filename: `asdf-11.jpg` becomes `asdf.jpg`.
///
/// Equality and hashing are by the normalized string, so a `UnvName` can key
/// a version family regardless of which concrete version it was built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnvName(String);

impl UnvName {
    /// Strip any trailing `-N` version suffix from a filename.
    ///
    /// - `"img-3.png"` → `img.png`
    /// - `"img.png"` → `img.png`
    /// - `"my-file.png"` → `my-file.png` (suffix is not numeric)
    /// - `"img-.png"` → `img-.png` (dash at end of stem is not a marker)
    pub fn new(file_name: &str) -> Self {
        let (stem, ext) = split_extension(file_name);
        match version_suffix(stem) {
            Some((dash, _)) => UnvName(format!("{}{}", &stem[..dash], ext)),
            None => UnvName(file_name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The concrete filename for version `n` of this identity.
    ///
    /// Version 1 is the bare name; higher versions get a `-N` suffix.
    pub fn with_version(&self, n: u32) -> String {
        if n <= 1 {
            return self.0.clone();
        }
        let (stem, ext) = split_extension(&self.0);
        format!("{stem}-{n}{ext}")
    }
}

impl fmt::Display for UnvName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for UnvName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Parse the version number from a filename. Absent or unparsable suffix
/// means version 1.
pub fn version_of(file_name: &str) -> u32 {
    let (stem, _) = split_extension(file_name);
    version_suffix(stem).map(|(_, n)| n).unwrap_or(1)
}

/// The next free versioned name for `identity` given the files already
/// present in the target folder.
///
/// Files whose identity differs are ignored. With no existing family member
/// the bare (version-1) name is returned; otherwise the maximum version is
/// bumped by one. Integer versions are totally ordered so ties cannot occur
/// here; duplicate version numbers on disk are resolved by the reconciler.
pub fn bumped_name(identity: &UnvName, existing: &[String]) -> String {
    let max = existing
        .iter()
        .filter(|f| UnvName::new(f) == *identity)
        .map(|f| version_of(f))
        .max();
    match max {
        Some(n) => identity.with_version(n + 1),
        None => identity.as_str().to_string(),
    }
}

/// Split `name.ext` into (`name`, `.ext`) at the last dot. Names without a
/// dot have an empty extension.
fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(dot) => (&file_name[..dot], &file_name[dot..]),
        None => (file_name, ""),
    }
}

/// Locate a `-N` version suffix in a stem: the last dash not in final
/// position, followed by digits only. Returns (dash index, parsed version).
fn version_suffix(stem: &str) -> Option<(usize, u32)> {
    let dash = stem.rfind('-')?;
    if dash + 1 >= stem.len() {
        return None;
    }
    stem[dash + 1..].parse::<u32>().ok().map(|n| (dash, n))
}
