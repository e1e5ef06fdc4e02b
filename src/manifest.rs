//! Accession import file ("manifest") generation.
//!
//! Each run writes one CSV file into the accession root, named
//! `<base>_<YYYY-MM-DD>_<HH-MM-SS>.csv`. The header is fixed and every field is
//! quoted; one row is appended per processed bag.

use std::{
    fs::{File, OpenOptions},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDateTime};
use csv::{QuoteStyle, Writer, WriterBuilder};
use serde::Serialize;

use crate::config::Settings;

/// Column names of the import file, in order.
///
/// `Extent Unit` appears twice; both columns carry the configured unit.
pub const HEADER: [&str; 30] = [
    "Month",
    "Day",
    "Year",
    "Title",
    "Identifier",
    "Inclusive Dates",
    "Received Extent",
    "Extent Unit",
    "Processed Extent",
    "Extent Unit",
    "Material Type",
    "Processing Priority",
    "Ex. Comp. Mont",
    "Ex. Comp. Day",
    "Ex. Comp. Year",
    "Record Series",
    "Content",
    "Location",
    "Range",
    "Section",
    "Shelf",
    "Extent",
    "ExtentUnit",
    "CreatorName",
    "Donor",
    "Donor Contact Info",
    "Donor Notes",
    "Physical Description",
    "Scope Content",
    "Comments",
];

/// Smallest extent ever written for a bag that is not empty.
const MIN_EXTENT: f64 = 0.01;

/// Format an extent with two decimals.
///
/// Non-zero values too small to show up at two decimals are written as
/// `"0.01"` so that a bag with content never reads as empty.
#[must_use]
pub fn format_extent(value: f64) -> String {
    if value > 0.0 && value < MIN_EXTENT {
        "0.01".to_string()
    } else {
        format!("{value:.2}")
    }
}

/// File name of the import file for a run started at `at`.
#[must_use]
pub fn manifest_file_name(base: &str, at: NaiveDateTime) -> String {
    format!("{base}_{}.csv", at.format("%Y-%m-%d_%H-%M-%S"))
}

/// One row of the import file.
///
/// Rows are built fresh for each bag; only the columns below are filled, the
/// rest of the header is written empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ManifestRow {
    /// Two-digit month of the run
    pub month: String,

    /// Two-digit day of the run
    pub day: String,

    /// Four-digit year of the run
    pub year: String,

    /// Bag folder name
    pub title: String,

    /// Run date as `YYYY-MM-DD`
    pub identifier: String,

    /// Formatted size, used for all three extent columns
    pub extent: String,

    /// Unit label, used for all three unit columns
    pub extent_unit: String,

    /// Storage location label
    pub location: String,
}

impl ManifestRow {
    /// Build the row for one bag.
    #[must_use]
    pub fn for_bag(name: &str, extent: f64, settings: &Settings, at: NaiveDateTime) -> Self {
        Self {
            month: format!("{:02}", at.month()),
            day: format!("{:02}", at.day()),
            year: format!("{:04}", at.year()),
            title: name.to_string(),
            identifier: at.format("%Y-%m-%d").to_string(),
            extent: format_extent(extent),
            extent_unit: settings.unit.to_string(),
            location: settings.location.clone(),
        }
    }

    /// Value for a header column; columns the tool does not fill are empty.
    #[must_use]
    pub fn value_for(&self, column: &str) -> String {
        match column {
            "Month" => self.month.clone(),
            "Day" => self.day.clone(),
            "Year" => self.year.clone(),
            "Title" | "Content" => self.title.clone(),
            "Scope Content" => format!("{}SCOPE", self.title),
            "Identifier" => self.identifier.clone(),
            "Received Extent" | "Processed Extent" | "Extent" => self.extent.clone(),
            "Extent Unit" | "ExtentUnit" => self.extent_unit.clone(),
            "Location" => self.location.clone(),
            _ => String::new(),
        }
    }

    /// The row's values in header order.
    #[must_use]
    pub fn to_record(&self) -> Vec<String> {
        HEADER.iter().map(|column| self.value_for(column)).collect()
    }
}

/// Open import file that rows are appended to.
///
/// The file is created when the writer is built and closed when it is dropped,
/// so it is released on every exit path. Each row is flushed as soon as it is
/// written.
#[derive(Debug)]
pub struct ManifestWriter {
    path: PathBuf,
    writer: Writer<File>,
    rows: usize,
}

impl ManifestWriter {
    /// Create the import file in `root` and write the header.
    ///
    /// # Errors
    ///
    /// Returns an error if a file with the same name already exists, or if the
    /// file cannot be created or written.
    pub fn create(root: &Path, base: &str, at: NaiveDateTime) -> Result<Self> {
        let path = root.join(manifest_file_name(base, at));

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .with_context(|| format!("Failed to create import file {}", path.display()))?;

        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .from_writer(file);

        writer
            .write_record(HEADER)
            .with_context(|| format!("Failed to write header to {}", path.display()))?;
        writer.flush()?;

        Ok(Self {
            path,
            writer,
            rows: 0,
        })
    }

    /// Append one row and flush it to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be written.
    pub fn append(&mut self, row: &ManifestRow) -> Result<()> {
        self.writer
            .write_record(row.to_record())
            .with_context(|| format!("Failed to write row to {}", self.path.display()))?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    /// Path of the import file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of data rows written so far.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Flush and close the file, returning its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the final flush fails.
    pub fn finish(mut self) -> Result<PathBuf> {
        self.writer.flush()?;
        Ok(self.path)
    }
}
