//! # proto-bagger
//!
//! Normalize a directory of archival bags into a canonical folder layout and
//! write an accession import file (CSV) describing each bag.
//!
//! Every bag ends up shaped as `data/{meta,originals,dips}`; loose files and
//! folders are swept into `data/originals/`. Each bag is then measured and
//! recorded as one row of `<base>_<YYYY-MM-DD>_<HH-MM-SS>.csv` in the root.
//!
//! ## Modules
//!
//! - [`bag`] - Bag type and layout normalization
//! - [`utils`] - Directory size measurement
//! - [`manifest`] - Import file header, rows and writer
//! - [`scanner`] - Bag discovery under the accession root
//! - [`accessioner`] - The per-bag normalize → measure → record pipeline
//! - [`config`] - Settings file, CLI layering and run options
//! - [`output`] - JSON output for `--json`

pub mod accessioner;
pub mod bag;
pub mod config;
pub mod manifest;
pub mod output;
pub mod scanner;
pub mod utils;

pub use accessioner::{AccessionResult, Accessioner, BagOutcome};
pub use config::{RunOptions, Settings, SizeUnit};
