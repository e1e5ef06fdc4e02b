//! Bag discovery.
//!
//! Only the direct children of the accession root are considered. A child is
//! a bag candidate when it is a directory, is not listed in the excludes, and
//! does not contain the manifest base name in its own name.

use std::{fs, path::Path};

use anyhow::{Context, Result};

use crate::{bag::Bag, config::Settings};

/// Lists the bag directories under an accession root.
#[derive(Debug)]
pub struct Scanner<'a> {
    settings: &'a Settings,
}

impl<'a> Scanner<'a> {
    /// Create a scanner that applies the exclusion rules from `settings`.
    #[must_use]
    pub const fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Find every bag directly under `root`, sorted by folder name.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` cannot be listed.
    pub fn scan(&self, root: &Path) -> Result<Vec<Bag>> {
        let entries = fs::read_dir(root)
            .with_context(|| format!("Failed to list bag directory {}", root.display()))?;

        let mut bags = Vec::new();
        for entry in entries {
            let entry =
                entry.with_context(|| format!("Failed to list bag directory {}", root.display()))?;
            let path = entry.path();

            if !path.is_dir() {
                continue;
            }

            let Some(bag) = Bag::from_path(&path) else {
                continue;
            };

            if self.settings.is_excluded(&bag.name) {
                continue;
            }

            bags.push(bag);
        }

        bags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(bags)
    }
}
