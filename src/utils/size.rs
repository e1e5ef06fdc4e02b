//! Directory size measurement.
//!
//! This module walks a bag and adds up the sizes of every file it can reach.
//! Entries that cannot be read do not stop the walk; they are collected as
//! [`SkippedEntry`] values so callers can warn about them.

use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::{DirEntry, WalkDir};

use crate::config::SizeUnit;

/// A path the size walk could not read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    /// The directory or file that could not be accessed
    pub path: PathBuf,

    /// Why it was skipped
    pub reason: String,
}

/// Size of a directory tree in bytes, plus everything that was skipped.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DirSize {
    /// Total size of all reachable files, in bytes
    pub bytes: u64,

    /// Entries that could not be read
    pub skipped: Vec<SkippedEntry>,
}

/// Size of a directory tree converted to a display unit.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SizeReport {
    /// Total size in bytes
    pub bytes: u64,

    /// `bytes` expressed in `unit`
    pub value: f64,

    /// Unit of `value`
    pub unit: SizeUnit,

    /// Entries that could not be read
    pub skipped: Vec<SkippedEntry>,
}

/// Calculate the total size of a directory and all its contents, in bytes.
///
/// Recursively traverses the directory tree using `walkdir` and sums the sizes
/// of every entry that is not a directory. Symbolic links are not followed, so
/// a link counts for its own size.
///
/// Errors for individual entries (permission denied, entries vanishing during
/// the walk, etc.) are recorded in [`DirSize::skipped`] and the walk carries on
/// with the rest of the tree. An unreadable or missing root yields a size of
/// `0` with a single skipped entry.
#[must_use]
pub fn calculate_dir_size(path: &Path) -> DirSize {
    accumulate(
        WalkDir::new(path)
            .into_iter()
            .filter_map(|entry| measure_entry(path, entry)),
    )
}

/// Sum the readable sizes and keep going past every skipped entry.
fn accumulate<I>(entries: I) -> DirSize
where
    I: IntoIterator<Item = Result<u64, SkippedEntry>>,
{
    let mut size = DirSize::default();

    for entry in entries {
        match entry {
            Ok(len) => size.bytes += len,
            Err(skipped) => size.skipped.push(skipped),
        }
    }

    size
}

/// Size of a single walk entry; `None` for directories.
fn measure_entry(
    root: &Path,
    entry: walkdir::Result<DirEntry>,
) -> Option<Result<u64, SkippedEntry>> {
    let entry = match entry {
        Ok(entry) => entry,
        Err(e) => {
            return Some(Err(SkippedEntry {
                path: e.path().unwrap_or(root).to_path_buf(),
                reason: io_reason(&e),
            }));
        }
    };

    if entry.file_type().is_dir() {
        return None;
    }

    Some(
        entry
            .metadata()
            .map(|metadata| metadata.len())
            .map_err(|e| SkippedEntry {
                path: entry.path().to_path_buf(),
                reason: io_reason(&e),
            }),
    )
}

/// Measure a directory tree and convert the total to `unit`.
///
/// See [`calculate_dir_size`] for how unreadable entries are handled.
#[must_use]
pub fn compute_size(path: &Path, unit: SizeUnit) -> SizeReport {
    let DirSize { bytes, skipped } = calculate_dir_size(path);

    SizeReport {
        bytes,
        value: unit.convert(bytes),
        unit,
        skipped,
    }
}

/// Prefer the underlying I/O error text over walkdir's path-prefixed message.
fn io_reason(e: &walkdir::Error) -> String {
    e.io_error()
        .map_or_else(|| e.to_string(), std::string::ToString::to_string)
}
