//! Filesystem adapter for the ingestion pipeline.
//!
//! Every directory access of the pipeline goes through this module so the
//! on-disk contract stays in one place: immediate listings are sorted and
//! skip dot-files, reads of absent files yield an empty string, overwrites
//! go through a temp file + rename, and moves never report success after a
//! partial failure.
//!
//! Paths handed back to callers are plain `String`s relative to the queried
//! root, with `/` separators — the same form used for published target paths
//! throughout the pipeline.

use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// True when `dir` exists and is a directory.
pub fn dir_exists(dir: &Path) -> bool {
    dir.is_dir()
}

/// Immediate regular files of `dir`, sorted by name. Dot-files are skipped.
/// A missing directory lists as empty.
pub fn list_files(dir: &Path) -> io::Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        if entry.file_type()?.is_file() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Immediate subdirectories of `dir`, sorted by name. Dot-directories are
/// skipped. A missing directory lists as empty.
pub fn list_subfolders(dir: &Path) -> io::Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        if entry.file_type()?.is_dir() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// All directories under `root` (at any depth, excluding `root` itself) that
/// contain a file named `marker`, as sorted root-relative `/` paths.
pub fn list_dirs_containing(root: &Path, marker: &str) -> io::Result<Vec<String>> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }
    let mut paths = Vec::new();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.map_err(io::Error::other)?;
        if !entry.file_type().is_dir() {
            continue;
        }
        if !entry.path().join(marker).is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(root)
            .map_err(io::Error::other)?
            .to_string_lossy()
            .replace('\\', "/");
        paths.push(rel);
    }
    paths.sort();
    Ok(paths)
}

/// True when `dir/name` exists as a regular file.
pub fn file_exists(dir: &Path, name: &str) -> bool {
    dir.join(name).is_file()
}

/// Read `dir/name` fully as UTF-8 text. An absent file reads as the empty
/// string; only genuine I/O failures surface as errors.
pub fn read_text_file(dir: &Path, name: &str) -> io::Result<String> {
    let path = dir.join(name);
    if !path.is_file() {
        return Ok(String::new());
    }
    fs::read_to_string(path)
}

/// Atomically overwrite-or-create `dir/name`: the content is written to a
/// temp file in the same directory and renamed into place, so readers never
/// observe a half-written document.
pub fn save_overwrite(dir: &Path, name: &str, content: &str) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    let tmp = dir.join(format!(".{name}.tmp"));
    fs::write(&tmp, content)?;
    fs::rename(&tmp, dir.join(name))
}

/// Move `dir/name` into `target_dir` as `new_name`, creating the target
/// directory if needed and replacing any existing file of that name.
pub fn move_file_with_rename(
    dir: &Path,
    name: &str,
    target_dir: &Path,
    new_name: &str,
) -> io::Result<()> {
    fs::create_dir_all(target_dir)?;
    let from = dir.join(name);
    let to = target_dir.join(new_name);
    // rename does not cross filesystems; fall back to copy + remove
    match fs::rename(&from, &to) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(&from, &to)?;
            fs::remove_file(&from)
        }
    }
}

/// Delete `dir/name` if it exists. Returns whether a file was removed.
pub fn delete_if_exists(dir: &Path, name: &str) -> io::Result<bool> {
    let path = dir.join(name);
    if !path.is_file() {
        return Ok(false);
    }
    fs::remove_file(path)?;
    Ok(true)
}

/// Recursively delete `dir` if it exists. Returns whether anything was
/// removed.
pub fn delete_dir_if_exists(dir: &Path) -> io::Result<bool> {
    if !dir.is_dir() {
        return Ok(false);
    }
    fs::remove_dir_all(dir)?;
    Ok(true)
}
