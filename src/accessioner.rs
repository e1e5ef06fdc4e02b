//! Accession run orchestration.
//!
//! This module ties the pieces together: it lists the bags under the root,
//! normalizes each one, measures it, and appends its row to the import file.
//! Bags are handled one at a time, in folder-name order, each completely
//! before the next one starts.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use colored::Colorize;
use humansize::{DECIMAL, format_size};
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    bag::{Bag, LayoutReport, normalize},
    config::{RunOptions, Settings},
    manifest::{ManifestRow, ManifestWriter, format_extent},
    scanner::Scanner,
    utils::{SizeReport, compute_size},
};

/// What happened to a single bag.
#[derive(Clone, Debug)]
pub struct BagOutcome {
    /// The bag that was processed
    pub bag: Bag,

    /// Whether the bag was already in canonical shape before the run touched it
    pub normalized_before: bool,

    /// Changes made by normalization; `None` in dry-run mode
    pub layout: Option<LayoutReport>,

    /// Size of the bag after normalization
    pub size: SizeReport,

    /// Row appended to the import file; `None` in dry-run mode
    pub row: Option<ManifestRow>,
}

/// Structured result of a whole run.
#[derive(Clone, Debug)]
pub struct AccessionResult {
    /// Path of the import file, or `None` for a dry run
    pub manifest: Option<PathBuf>,

    /// Per-bag outcomes, in processing order
    pub bags: Vec<BagOutcome>,
}

impl AccessionResult {
    /// Total size of every processed bag, in bytes.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.bags.iter().map(|b| b.size.bytes).sum()
    }

    /// Number of paths that could not be read while measuring bags.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.bags.iter().map(|b| b.size.skipped.len()).sum()
    }
}

/// Runs the normalize → measure → record pipeline over an accession root.
#[derive(Debug)]
pub struct Accessioner<'a> {
    settings: &'a Settings,
    options: RunOptions,
    started: NaiveDateTime,
}

impl<'a> Accessioner<'a> {
    /// Create an accessioner stamped with the current local time.
    ///
    /// The timestamp is taken once and used for the import file name and for
    /// the date columns of every row.
    #[must_use]
    pub fn new(settings: &'a Settings, options: RunOptions) -> Self {
        Self {
            settings,
            options,
            started: Local::now().naive_local(),
        }
    }

    /// Use a fixed timestamp instead of the current time.
    #[must_use]
    pub const fn with_timestamp(mut self, started: NaiveDateTime) -> Self {
        self.started = started;
        self
    }

    /// Normalize and measure every bag under `root`, writing the import file.
    ///
    /// The import file is created before the first bag is touched and is
    /// closed on every exit path. Rows for bags processed before a failure
    /// stay in the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be listed, the import file cannot
    /// be created or written, or a bag cannot be normalized. Unreadable files
    /// inside a bag are not errors; they are reported in the bag's
    /// [`SizeReport::skipped`].
    pub fn run(&self, root: &Path) -> Result<AccessionResult> {
        let bags = Scanner::new(self.settings).scan(root)?;
        let mut writer = ManifestWriter::create(root, &self.settings.file_name_base, self.started)?;

        let progress = self.progress_bar(bags.len());
        let mut outcomes = Vec::with_capacity(bags.len());

        for bag in bags {
            progress.set_message(bag.name.clone());

            let outcome = self
                .process_bag(&bag, &mut writer)
                .with_context(|| {
                    format!(
                        "Failed to process bag {} (rows written so far are kept in {})",
                        bag.path.display(),
                        writer.path().display()
                    )
                })?;

            progress.suspend(|| self.report_bag(&outcome));
            outcomes.push(outcome);
            progress.inc(1);
        }

        progress.finish_with_message("✅ Accession complete");

        Ok(AccessionResult {
            manifest: Some(writer.finish()?),
            bags: outcomes,
        })
    }

    /// List and measure the bags under `root` without changing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be listed.
    pub fn survey(&self, root: &Path) -> Result<AccessionResult> {
        let bags = Scanner::new(self.settings).scan(root)?;

        let outcomes = bags
            .into_iter()
            .map(|bag| {
                let size = compute_size(&bag.path, self.settings.unit);
                let outcome = BagOutcome {
                    normalized_before: bag.is_normalized(),
                    bag,
                    layout: None,
                    size,
                    row: None,
                };
                self.report_bag(&outcome);
                outcome
            })
            .collect();

        Ok(AccessionResult {
            manifest: None,
            bags: outcomes,
        })
    }

    /// Normalize, measure and record a single bag.
    ///
    /// # Errors
    ///
    /// Returns an error if normalization fails or the row cannot be written.
    pub fn process_bag(&self, bag: &Bag, writer: &mut ManifestWriter) -> Result<BagOutcome> {
        let normalized_before = bag.is_normalized();
        let layout = normalize(&bag.path, self.options.match_mode)?;
        let size = compute_size(&bag.path, self.settings.unit);

        let row = ManifestRow::for_bag(&bag.name, size.value, self.settings, self.started);
        writer.append(&row)?;

        Ok(BagOutcome {
            bag: bag.clone(),
            normalized_before,
            layout: Some(layout),
            size,
            row: Some(row),
        })
    }

    /// Print a human-readable summary of a finished run.
    pub fn print_summary(&self, result: &AccessionResult) {
        if self.options.quiet {
            return;
        }

        let total = format_size(result.total_bytes(), DECIMAL);

        match &result.manifest {
            Some(path) => {
                println!(
                    "\n{} {}",
                    format!("✅ Processed {} bags ({total})", result.bags.len()).green(),
                    format!("→ {}", path.display()).bright_white()
                );
            }
            None => {
                println!("\n{}", "🧪 Dry run complete!".yellow());
                for outcome in &result.bags {
                    let state = if outcome.normalized_before {
                        "normalized".green()
                    } else {
                        "needs normalization".yellow()
                    };
                    println!(
                        "  {} {} {} ({state})",
                        outcome.bag.name.bold(),
                        format_extent(outcome.size.value),
                        self.settings.unit,
                    );
                }
                println!("Would record {} bags ({total})", result.bags.len());
            }
        }

        let skipped = result.skipped_count();
        if skipped > 0 {
            eprintln!(
                "{}",
                format!("⚠️  {skipped} paths could not be read and were left out of the sizes")
                    .yellow()
            );
        }
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if self.options.quiet {
            return ProgressBar::hidden();
        }

        println!("\n{}", "📦 Processing bags...".cyan());

        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        pb
    }

    /// Print verbose layout actions and any unreadable paths for a bag.
    fn report_bag(&self, outcome: &BagOutcome) {
        if self.options.quiet {
            return;
        }

        if self.options.verbose
            && let Some(layout) = &outcome.layout
        {
            for dir in &layout.created {
                println!("  {} {}", "created".dimmed(), dir.display());
            }
            for relocation in &layout.moved {
                println!(
                    "  {} {} → {}",
                    "moved".dimmed(),
                    relocation.from.display(),
                    relocation.to.display()
                );
            }
        }

        for skipped in &outcome.size.skipped {
            eprintln!(
                "{} could not access {}: {}",
                "Warning:".yellow(),
                skipped.path.display(),
                skipped.reason
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SizeUnit;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn quiet() -> RunOptions {
        RunOptions {
            quiet: true,
            ..RunOptions::default()
        }
    }

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 58)
            .unwrap()
    }

    #[test]
    fn test_run_writes_manifest_and_normalizes() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir(root.join("BagA")).unwrap();
        fs::write(root.join("BagA/file.bin"), vec![0u8; 1024]).unwrap();

        let settings = Settings {
            unit: SizeUnit::Kilobytes,
            ..Settings::default()
        };
        let result = Accessioner::new(&settings, quiet())
            .with_timestamp(at())
            .run(root)
            .unwrap();

        let manifest = result.manifest.clone().unwrap();
        assert_eq!(
            manifest,
            root.join("AccessionImport_2025-12-31_23-59-58.csv")
        );
        assert!(manifest.is_file());

        assert_eq!(result.bags.len(), 1);
        let outcome = &result.bags[0];
        assert!(!outcome.normalized_before);
        assert!(outcome.bag.is_normalized());
        assert_eq!(outcome.size.bytes, 1024);
        assert_eq!(outcome.row.as_ref().unwrap().extent, "1.00");
        assert_eq!(result.total_bytes(), 1024);
        assert_eq!(result.skipped_count(), 0);
    }

    #[test]
    fn test_survey_changes_nothing() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir(root.join("BagA")).unwrap();
        fs::write(root.join("BagA/file.bin"), b"abc").unwrap();

        let settings = Settings::default();
        let result = Accessioner::new(&settings, quiet()).survey(root).unwrap();

        assert!(result.manifest.is_none());
        assert_eq!(result.bags.len(), 1);
        assert_eq!(result.bags[0].size.bytes, 3);
        assert!(result.bags[0].layout.is_none());
        assert!(root.join("BagA/file.bin").is_file());
        assert!(!root.join("BagA/data").exists());
        assert_eq!(fs::read_dir(root).unwrap().count(), 1);
    }

    #[test]
    fn test_failed_bag_aborts_run_and_keeps_manifest() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir(root.join("Broken")).unwrap();
        fs::write(root.join("Broken/data"), "a file where data/ should be").unwrap();

        let settings = Settings::default();
        let err = Accessioner::new(&settings, quiet())
            .with_timestamp(at())
            .run(root)
            .unwrap_err();

        let message = format!("{err:#}");
        let manifest = root.join("AccessionImport_2025-12-31_23-59-58.csv");
        assert!(message.contains("Broken"));
        assert!(message.contains(&manifest.display().to_string()));
        assert!(manifest.is_file());
        assert_eq!(fs::read_to_string(manifest).unwrap().lines().count(), 1);
    }
}
