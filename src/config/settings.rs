//! Settings file support.
//!
//! Settings live in a small plain-text file, `bagger_settings.txt`, made of
//! labelled blocks. Each label sits on its own line and is followed by one
//! value per line until a blank line or the next label:
//!
//! ```text
//! LOCATION:
//! Archives Network Drive
//!
//! UNIT:
//! Megabytes
//!
//! FILE_NAME:
//! AccessionImport
//!
//! EXCLUDES:
//! $RECYCLE.BIN
//! System Volume Information
//! ```
//!
//! Every block is optional. For `LOCATION`, `UNIT` and `FILE_NAME` the last
//! value wins; `EXCLUDES` collects every line.
//!
//! # Layering
//!
//! The precedence order is: **CLI argument > settings file > hardcoded default**.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Serialize;

use super::{SettingsError, SizeUnit};

/// Name of the settings file looked up in the working directory.
pub const SETTINGS_FILE_NAME: &str = "bagger_settings.txt";

/// Location label used when the settings file does not provide one.
pub const DEFAULT_LOCATION: &str = "Archives Network Drive";

/// Manifest base name used when the settings file does not provide one.
pub const DEFAULT_FILE_NAME: &str = "AccessionImport";

/// Template written by `proto-bagger settings init`.
pub const SETTINGS_TEMPLATE: &str = "\
LOCATION:
Archives Network Drive

UNIT:
Gigabytes

FILE_NAME:
AccessionImport

EXCLUDES:
";

/// Block currently being read by [`SettingsFile::parse`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Block {
    None,
    Location,
    Unit,
    FileName,
    Excludes,
}

impl Block {
    fn from_label(line: &str) -> Option<Self> {
        match line {
            "LOCATION:" => Some(Self::Location),
            "UNIT:" => Some(Self::Unit),
            "FILE_NAME:" => Some(Self::FileName),
            "EXCLUDES:" => Some(Self::Excludes),
            _ => None,
        }
    }
}

/// Expand a leading `~` in a path to the user's home directory.
///
/// Paths that don't start with `~` are returned unchanged.
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

/// Raw contents of a settings file.
///
/// All fields are `Option<T>` (or empty) so we can tell which values the file
/// actually sets and layer them under CLI arguments. The unit is kept as the
/// raw string; validating it is up to the caller.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct SettingsFile {
    /// Value of the `LOCATION:` block
    pub location: Option<String>,

    /// Value of the `UNIT:` block, unvalidated
    pub unit: Option<String>,

    /// Value of the `FILE_NAME:` block
    pub file_name: Option<String>,

    /// Lines of the `EXCLUDES:` block
    pub excludes: Vec<String>,
}

impl SettingsFile {
    /// Parse settings from the text of a settings file.
    ///
    /// Lines are right-trimmed before they are interpreted. Lines that appear
    /// outside of any block are ignored.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut settings = Self::default();
        let mut block = Block::None;

        for line in content.lines().map(str::trim_end) {
            if let Some(next) = Block::from_label(line) {
                block = next;
                continue;
            }

            if line.is_empty() {
                block = Block::None;
                continue;
            }

            match block {
                Block::None => {}
                Block::Location => settings.location = Some(line.to_string()),
                Block::Unit => settings.unit = Some(line.to_string()),
                Block::FileName => settings.file_name = Some(line.to_string()),
                Block::Excludes => settings.excludes.push(line.to_string()),
            }
        }

        settings
    }

    /// Path of the settings file inside the user's configuration directory.
    ///
    /// This is `<config_dir>/proto-bagger/bagger_settings.txt`, where
    /// `<config_dir>` is platform specific (`~/.config` on Linux).
    #[must_use]
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("proto-bagger").join(SETTINGS_FILE_NAME))
    }

    /// Find the settings file that would be used, if any.
    ///
    /// An explicit path always wins. Otherwise `./bagger_settings.txt` is
    /// preferred over the per-user file.
    #[must_use]
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(expand_tilde(path));
        }

        let local = PathBuf::from(SETTINGS_FILE_NAME);
        if local.is_file() {
            return Some(local);
        }

        Self::user_config_path().filter(|p| p.is_file())
    }

    /// Load the settings file.
    ///
    /// When no explicit path is given and no settings file is found, an empty
    /// [`SettingsFile`] is returned so that defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit path does not exist, or if the file
    /// exists but cannot be read.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = Self::locate(explicit) else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings file at {}", path.display()))?;

        Ok(Self::parse(&content))
    }
}

/// Effective, immutable settings for a single run.
///
/// Built once at startup and passed by reference to every component that
/// needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    /// Value for the manifest's `Location` column
    pub location: String,

    /// Unit used for every extent column
    pub unit: SizeUnit,

    /// Base name of the manifest file; also excludes matching folders
    pub file_name_base: String,

    /// Folder names that are never treated as bags
    pub excludes: BTreeSet<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            location: DEFAULT_LOCATION.to_string(),
            unit: SizeUnit::default(),
            file_name_base: DEFAULT_FILE_NAME.to_string(),
            excludes: BTreeSet::new(),
        }
    }
}

impl Settings {
    /// Whether a folder with this name should be skipped as a bag candidate.
    ///
    /// Folders are skipped when they are listed in the excludes, or when their
    /// name contains the manifest base name (so earlier import files and
    /// folders derived from them are left alone).
    #[must_use]
    pub fn is_excluded(&self, name: &str) -> bool {
        self.excludes.contains(name)
            || (!self.file_name_base.is_empty() && name.contains(&self.file_name_base))
    }
}

/// Values given on the command line, layered over the settings file.
#[derive(Default, Debug, Clone)]
pub struct SettingsOverrides {
    /// `--location`
    pub location: Option<String>,

    /// `--unit`
    pub unit: Option<SizeUnit>,

    /// `--file-name`
    pub file_name: Option<String>,

    /// `--exclude`, merged with the excludes from the file
    pub excludes: Vec<String>,
}

impl Settings {
    /// Layer CLI overrides over the settings file and the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidUnit`] when the file names a unit that
    /// is not one of the five supported units and no `--unit` override is
    /// given. Callers decide whether to ask the user again or fall back to
    /// the default unit.
    pub fn layered(
        file: &SettingsFile,
        overrides: &SettingsOverrides,
    ) -> Result<Self, SettingsError> {
        let unit = match (overrides.unit, file.unit.as_deref()) {
            (Some(unit), _) => unit,
            (None, Some(raw)) => raw.parse()?,
            (None, None) => SizeUnit::default(),
        };

        let excludes = file
            .excludes
            .iter()
            .chain(&overrides.excludes)
            .cloned()
            .collect();

        Ok(Self {
            location: overrides
                .location
                .clone()
                .or_else(|| file.location.clone())
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            unit,
            file_name_base: overrides
                .file_name
                .clone()
                .or_else(|| file.file_name.clone())
                .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string()),
            excludes,
        })
    }
}
