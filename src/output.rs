//! Structured JSON output for scripting and piping.
//!
//! When the `--json` flag is passed, the whole run is described by a single
//! JSON document on stdout instead of the usual human-readable output.

use humansize::{DECIMAL, format_size};
use serde::Serialize;

use crate::{
    accessioner::{AccessionResult, BagOutcome},
    config::Settings,
    manifest::format_extent,
    utils::SkippedEntry,
};

/// Top-level JSON output emitted when `--json` is active.
#[derive(Serialize, Debug)]
pub struct JsonOutput {
    /// The execution mode: `"dry_run"` or `"accession"`.
    pub mode: String,

    /// Effective settings used for the run.
    pub settings: Settings,

    /// Path of the import file, absent for a dry run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,

    /// One entry per bag, in processing order.
    pub bags: Vec<JsonBagEntry>,

    /// Aggregated summary statistics.
    pub summary: JsonSummary,

    /// Settings problems that were worked around, such as an invalid unit.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// A single bag entry in the JSON output.
#[derive(Serialize, Debug)]
pub struct JsonBagEntry {
    /// Bag folder name.
    pub name: String,

    /// Absolute or root-relative path to the bag.
    pub path: String,

    /// Whether the bag was already in canonical shape.
    pub normalized_before: bool,

    /// Number of directories created during normalization.
    pub created: usize,

    /// Number of entries moved during normalization.
    pub moved: usize,

    /// Size in bytes.
    pub size: u64,

    /// Extent as written to the import file (e.g. `"2.00"`).
    pub extent: String,

    /// Paths left out of the size because they could not be read.
    pub warnings: Vec<SkippedEntry>,
}

/// Aggregated summary across all bags.
#[derive(Serialize, Debug)]
pub struct JsonSummary {
    /// Number of bags processed.
    pub total_bags: usize,

    /// Total size in bytes.
    pub total_size: u64,

    /// Human-readable formatted total size.
    pub total_size_formatted: String,

    /// Number of unreadable paths across all bags.
    pub skipped_paths: usize,
}

impl JsonOutput {
    /// Build a `JsonOutput` from a finished run or a dry run.
    #[must_use]
    pub fn from_result(result: &AccessionResult, settings: &Settings) -> Self {
        let mode = if result.manifest.is_some() {
            "accession"
        } else {
            "dry_run"
        };

        Self {
            mode: mode.to_string(),
            settings: settings.clone(),
            manifest: result.manifest.as_ref().map(|p| p.display().to_string()),
            bags: result.bags.iter().map(JsonBagEntry::from_outcome).collect(),
            summary: JsonSummary::from_result(result),
            warnings: Vec::new(),
        }
    }

    /// Attach settings warnings to the document.
    #[must_use]
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

impl JsonBagEntry {
    /// Convert a `BagOutcome` into a `JsonBagEntry`.
    #[must_use]
    pub fn from_outcome(outcome: &BagOutcome) -> Self {
        let (created, moved) = outcome
            .layout
            .as_ref()
            .map_or((0, 0), |l| (l.created.len(), l.moved.len()));

        Self {
            name: outcome.bag.name.clone(),
            path: outcome.bag.path.display().to_string(),
            normalized_before: outcome.normalized_before,
            created,
            moved,
            size: outcome.size.bytes,
            extent: format_extent(outcome.size.value),
            warnings: outcome.size.skipped.clone(),
        }
    }
}

impl JsonSummary {
    /// Compute summary statistics from a run result.
    #[must_use]
    pub fn from_result(result: &AccessionResult) -> Self {
        let total_size = result.total_bytes();

        Self {
            total_bags: result.bags.len(),
            total_size,
            total_size_formatted: format_size(total_size, DECIMAL),
            skipped_paths: result.skipped_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bag::{Bag, LayoutReport},
        config::SizeUnit,
        utils::SizeReport,
    };
    use std::path::{Path, PathBuf};

    fn outcome(name: &str, bytes: u64, layout: Option<LayoutReport>) -> BagOutcome {
        BagOutcome {
            bag: Bag::from_path(&Path::new("/root").join(name)).unwrap(),
            normalized_before: layout.is_none(),
            layout,
            size: SizeReport {
                bytes,
                value: SizeUnit::Kilobytes.convert(bytes),
                unit: SizeUnit::Kilobytes,
                skipped: vec![SkippedEntry {
                    path: PathBuf::from("/root/x"),
                    reason: "denied".to_string(),
                }],
            },
            row: None,
        }
    }

    #[test]
    fn test_dry_run_output() {
        let result = AccessionResult {
            manifest: None,
            bags: vec![outcome("A", 2048, None), outcome("B", 1024, None)],
        };
        let output = JsonOutput::from_result(&result, &Settings::default());

        assert_eq!(output.mode, "dry_run");
        assert!(output.manifest.is_none());
        assert_eq!(output.summary.total_bags, 2);
        assert_eq!(output.summary.total_size, 3072);
        assert_eq!(output.summary.skipped_paths, 2);
        assert_eq!(output.bags[0].extent, "2.00");

        let json = serde_json::to_value(&output).unwrap();
        assert!(json.get("manifest").is_none());
        assert_eq!(json["settings"]["unit"], "Gigabytes");
        assert_eq!(json["bags"][1]["warnings"][0]["reason"], "denied");
    }

    #[test]
    fn test_accession_output() {
        let layout = LayoutReport {
            created: vec![PathBuf::from("/root/A/data")],
            moved: vec![],
        };
        let result = AccessionResult {
            manifest: Some(PathBuf::from("/root/Import.csv")),
            bags: vec![outcome("A", 10, Some(layout))],
        };
        let output = JsonOutput::from_result(&result, &Settings::default());

        assert_eq!(output.mode, "accession");
        assert_eq!(output.manifest.as_deref(), Some("/root/Import.csv"));
        assert_eq!(output.bags[0].created, 1);
        assert_eq!(output.bags[0].moved, 0);
        assert_eq!(output.bags[0].extent, "0.01");

        let json = serde_json::to_value(&output).unwrap();
        assert!(json.get("warnings").is_none());
    }

    #[test]
    fn test_settings_warnings_are_serialized() {
        let result = AccessionResult {
            manifest: None,
            bags: vec![],
        };
        let output = JsonOutput::from_result(&result, &Settings::default())
            .with_warnings(vec!["unit 'Parsecs' is not valid; using Gigabytes".to_string()]);

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["warnings"][0], "unit 'Parsecs' is not valid; using Gigabytes");
    }
}
