//! Bag layout normalization.
//!
//! Every bag must end up with the same shape:
//!
//! ```text
//! <bag>/
//! └── data/
//!     ├── meta/
//!     ├── originals/
//!     └── dips/
//! ```
//!
//! [`normalize`] moves existing `meta/`, `originals/` and `dips/` folders under
//! `data/`, creates whichever of them are missing, and sweeps every other
//! entry of the bag root and of `data/` into `data/originals/`. Running it on a
//! bag that is already in shape changes nothing.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::Serialize;
use thiserror::Error;

/// Name of the payload directory at the root of every bag.
pub const DATA_DIR: &str = "data";

/// Directory receiving original files and anything that does not belong elsewhere.
pub const ORIGINALS_DIR: &str = "originals";

/// The three directories that must exist inside `data/`.
pub const CANONICAL_DIRS: [&str; 3] = ["meta", ORIGINALS_DIR, "dips"];

/// How entry names are compared against the canonical directory names.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// An entry is left in place when its name *contains* a canonical name.
    ///
    /// A folder called `metadata_old` is therefore never swept into
    /// `originals/`. This mirrors how existing accession workflows behave.
    #[default]
    Substring,

    /// Only entries named exactly `data`, `meta`, `originals` or `dips` are
    /// left in place.
    Exact,
}

impl MatchMode {
    /// Whether an entry directly under the bag root is left where it is.
    #[must_use]
    pub fn keeps_in_bag_root(self, name: &str) -> bool {
        self.matches(name, DATA_DIR) || self.keeps_in_data(name)
    }

    /// Whether an entry directly under `data/` is left where it is.
    #[must_use]
    pub fn keeps_in_data(self, name: &str) -> bool {
        CANONICAL_DIRS.iter().any(|dir| self.matches(name, dir))
    }

    fn matches(self, name: &str, canonical: &str) -> bool {
        match self {
            Self::Substring => name.contains(canonical),
            Self::Exact => name == canonical,
        }
    }
}

/// Errors that abort the normalization of a bag.
///
/// No rollback is attempted: moves that succeeded before the error stay done.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// A directory could not be created.
    #[error("failed to create directory {}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A path that should be a directory exists as something else.
    #[error("{} exists but is not a directory", .path.display())]
    NotADirectory { path: PathBuf },

    /// A directory listing failed.
    #[error("failed to list {}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A rename failed.
    #[error("failed to move {} to {}", .from.display(), .to.display())]
    Relocate {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The target of a move is already taken; nothing is overwritten.
    #[error("cannot move {} to {}: destination already exists", .from.display(), .to.display())]
    DestinationExists { from: PathBuf, to: PathBuf },
}

/// A single entry moved during normalization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Relocation {
    /// Where the entry was
    pub from: PathBuf,

    /// Where the entry is now
    pub to: PathBuf,
}

/// Everything [`normalize`] changed on disk, in the order it happened.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LayoutReport {
    /// Directories that did not exist and were created
    pub created: Vec<PathBuf>,

    /// Entries that were moved
    pub moved: Vec<Relocation>,
}

impl LayoutReport {
    /// `true` when the bag was already in canonical shape.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.created.is_empty() && self.moved.is_empty()
    }
}

/// Force a bag directory into the canonical `data/{meta,originals,dips}` layout.
///
/// The steps are:
/// 1. Create `data/` unless it already exists.
/// 2. For each of `meta`, `originals` and `dips`: move a same-named folder from
///    the bag root into `data/`, or create an empty one there. When the folder
///    exists in both places, the contents of the root one are merged into
///    `data/<name>` and the emptied root folder is removed.
/// 3. Move every other entry of the bag root into `data/originals/`.
/// 4. Move every other entry of `data/` into `data/originals/`.
///
/// Which entries count as "other" is decided by `mode`.
///
/// # Errors
///
/// Returns a [`LayoutError`] if a directory cannot be created or listed, or if
/// an entry cannot be moved. The bag may be left partially normalized.
pub fn normalize(bag: &Path, mode: MatchMode) -> Result<LayoutReport, LayoutError> {
    let mut report = LayoutReport::default();

    let data = bag.join(DATA_DIR);
    ensure_dir(&data, &mut report)?;

    for name in CANONICAL_DIRS {
        let outside = bag.join(name);
        let inside = data.join(name);

        if outside.is_dir() {
            adopt_dir(&outside, &inside, &mut report)?;
        } else {
            ensure_dir(&inside, &mut report)?;
        }
    }

    let originals = data.join(ORIGINALS_DIR);

    for (path, name) in list_entries(bag)? {
        if !mode.keeps_in_bag_root(&name.to_string_lossy()) {
            relocate(&path, &originals.join(&name), &mut report)?;
        }
    }

    for (path, name) in list_entries(&data)? {
        if !mode.keeps_in_data(&name.to_string_lossy()) {
            relocate(&path, &originals.join(&name), &mut report)?;
        }
    }

    Ok(report)
}

/// Create `path` as a directory, treating an existing directory as success.
fn ensure_dir(path: &Path, report: &mut LayoutReport) -> Result<(), LayoutError> {
    match fs::create_dir(path) {
        Ok(()) => {
            report.created.push(path.to_path_buf());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            if path.is_dir() {
                Ok(())
            } else {
                Err(LayoutError::NotADirectory {
                    path: path.to_path_buf(),
                })
            }
        }
        Err(source) => Err(LayoutError::CreateDir {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Move a canonical folder from the bag root to its place under `data/`.
fn adopt_dir(outside: &Path, inside: &Path, report: &mut LayoutReport) -> Result<(), LayoutError> {
    if fs::symlink_metadata(inside).is_err() {
        return relocate(outside, inside, report);
    }

    if !inside.is_dir() {
        return Err(LayoutError::NotADirectory {
            path: inside.to_path_buf(),
        });
    }

    for (path, name) in list_entries(outside)? {
        relocate(&path, &inside.join(name), report)?;
    }

    fs::remove_dir(outside).map_err(|source| LayoutError::Relocate {
        from: outside.to_path_buf(),
        to: inside.to_path_buf(),
        source,
    })
}

/// Rename `from` to `to`, refusing to replace anything already at `to`.
fn relocate(from: &Path, to: &Path, report: &mut LayoutReport) -> Result<(), LayoutError> {
    if fs::symlink_metadata(to).is_ok() {
        return Err(LayoutError::DestinationExists {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        });
    }

    fs::rename(from, to).map_err(|source| LayoutError::Relocate {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })?;

    report.moved.push(Relocation {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
    });
    Ok(())
}

/// Direct children of `dir` as `(path, file name)` pairs, sorted by name.
fn list_entries(dir: &Path) -> Result<Vec<(PathBuf, std::ffi::OsString)>, LayoutError> {
    let read_err = |source| LayoutError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        entries.push((entry.path(), entry.file_name()));
    }
    entries.sort_by(|a, b| a.1.cmp(&b.1));

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_match_mode_substring() {
        let mode = MatchMode::Substring;

        assert!(mode.keeps_in_bag_root("data"));
        assert!(mode.keeps_in_bag_root("metadata_old"));
        assert!(mode.keeps_in_bag_root("my_dips"));
        assert!(!mode.keeps_in_bag_root("photo.jpg"));

        assert!(mode.keeps_in_data("meta"));
        assert!(mode.keeps_in_data("originals_2"));
        assert!(!mode.keeps_in_data("data_extra"));
    }

    #[test]
    fn test_match_mode_exact() {
        let mode = MatchMode::Exact;

        assert!(mode.keeps_in_bag_root("data"));
        assert!(mode.keeps_in_bag_root("meta"));
        assert!(!mode.keeps_in_bag_root("metadata_old"));

        assert!(mode.keeps_in_data("dips"));
        assert!(!mode.keeps_in_data("data"));
        assert!(!mode.keeps_in_data("my_dips"));
    }

    #[test]
    fn test_normalize_empty_bag() {
        let tmp = TempDir::new().unwrap();
        let bag = tmp.path();

        let report = normalize(bag, MatchMode::Substring).unwrap();

        assert!(bag.join("data/meta").is_dir());
        assert!(bag.join("data/originals").is_dir());
        assert!(bag.join("data/dips").is_dir());
        assert_eq!(report.created.len(), 4);
        assert!(report.moved.is_empty());
    }

    #[test]
    fn test_normalize_twice_is_noop() {
        let tmp = TempDir::new().unwrap();
        let bag = tmp.path();
        write(&bag.join("file.txt"), "x");

        normalize(bag, MatchMode::Substring).unwrap();
        let second = normalize(bag, MatchMode::Substring).unwrap();

        assert!(second.is_unchanged());
        assert!(bag.join("data/originals/file.txt").is_file());
    }

    #[test]
    fn test_merges_when_both_locations_exist() {
        let tmp = TempDir::new().unwrap();
        let bag = tmp.path();
        write(&bag.join("meta/a.xml"), "a");
        write(&bag.join("data/meta/b.xml"), "b");

        normalize(bag, MatchMode::Substring).unwrap();

        assert!(!bag.join("meta").exists());
        assert!(bag.join("data/meta/a.xml").is_file());
        assert!(bag.join("data/meta/b.xml").is_file());
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let tmp = TempDir::new().unwrap();
        let bag = tmp.path();
        write(&bag.join("report.pdf"), "new");
        write(&bag.join("data/originals/report.pdf"), "old");

        let err = normalize(bag, MatchMode::Substring).unwrap_err();

        assert!(matches!(err, LayoutError::DestinationExists { .. }));
        assert_eq!(
            fs::read_to_string(bag.join("data/originals/report.pdf")).unwrap(),
            "old"
        );
    }

    #[test]
    fn test_data_as_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let bag = tmp.path();
        write(&bag.join("data"), "not a dir");

        let err = normalize(bag, MatchMode::Substring).unwrap_err();
        assert!(matches!(err, LayoutError::NotADirectory { .. }));
    }

    #[test]
    fn test_missing_bag_is_a_create_error() {
        let tmp = TempDir::new().unwrap();
        let bag = tmp.path().join("does-not-exist");

        let err = normalize(&bag, MatchMode::Substring).unwrap_err();
        assert!(matches!(err, LayoutError::CreateDir { .. }));
    }

    #[test]
    fn test_substring_mode_keeps_lookalikes() {
        let tmp = TempDir::new().unwrap();
        let bag = tmp.path();
        write(&bag.join("metadata_old/notes.txt"), "n");

        normalize(bag, MatchMode::Substring).unwrap();

        assert!(bag.join("metadata_old/notes.txt").is_file());
    }

    #[test]
    fn test_exact_mode_sweeps_lookalikes() {
        let tmp = TempDir::new().unwrap();
        let bag = tmp.path();
        write(&bag.join("metadata_old/notes.txt"), "n");
        write(&bag.join("data/dips_extra.txt"), "d");

        normalize(bag, MatchMode::Exact).unwrap();

        assert!(!bag.join("metadata_old").exists());
        assert!(bag.join("data/originals/metadata_old/notes.txt").is_file());
        assert!(bag.join("data/originals/dips_extra.txt").is_file());
    }

    #[test]
    fn test_report_records_moves() {
        let tmp = TempDir::new().unwrap();
        let bag = tmp.path();
        write(&bag.join("dips/x.mp4"), "x");

        let report = normalize(bag, MatchMode::Substring).unwrap();

        assert!(report.moved.contains(&Relocation {
            from: bag.join("dips"),
            to: bag.join("data/dips"),
        }));
    }
}
