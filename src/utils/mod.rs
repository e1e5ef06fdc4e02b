//! Utility functions and helpers.
//!
//! This module contains the directory-size walk shared by the accession run
//! and the dry-run listing.

pub mod size;

pub use size::{DirSize, SizeReport, SkippedEntry, calculate_dir_size, compute_size};
