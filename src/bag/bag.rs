//! The `Bag` type.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::layout::{CANONICAL_DIRS, DATA_DIR};

/// A bag directory found under the accession root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Bag {
    /// Folder name, used as the manifest title
    pub name: String,

    /// Full path to the bag directory
    pub path: PathBuf,
}

impl Bag {
    /// Build a bag from its directory path.
    ///
    /// Returns `None` when the path has no final component (e.g. `/` or `..`).
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().into_owned();
        Some(Self {
            name,
            path: path.to_path_buf(),
        })
    }

    /// Path of the bag's `data/` directory.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.path.join(DATA_DIR)
    }

    /// Whether the bag is exactly in canonical shape.
    ///
    /// The bag root must hold nothing but `data/`, and `data/` nothing but the
    /// `meta/`, `originals/` and `dips/` directories. Unreadable directories
    /// count as not normalized.
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        let data = self.data_dir();

        has_exactly_dirs(&self.path, &[DATA_DIR]) && has_exactly_dirs(&data, &CANONICAL_DIRS)
    }
}

/// `true` when `dir` contains exactly the named subdirectories and nothing else.
fn has_exactly_dirs(dir: &Path, names: &[&str]) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };

    let mut seen = 0;
    for entry in entries {
        let Ok(entry) = entry else {
            return false;
        };
        let name = entry.file_name();
        let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());

        if !is_dir || !names.iter().any(|n| name == *n) {
            return false;
        }
        seen += 1;
    }

    seen == names.len()
}
