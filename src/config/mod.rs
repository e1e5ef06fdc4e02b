//! Configuration for a proto-bagger run.
//!
//! This module groups the user-facing settings (loaded from
//! `bagger_settings.txt` and layered under CLI arguments) and the options that
//! control how a run behaves.
//!
//! ## Main Parts
//!
//! - [`Settings`] - Immutable location, unit, manifest name and excludes
//! - [`SettingsFile`] - Raw values parsed from the settings file
//! - [`SizeUnit`] - The five supported extent units
//! - [`RunOptions`] - Dry-run, verbosity and name-matching behaviour

pub mod run;
pub mod settings;
pub mod unit;

use thiserror::Error;

pub use run::RunOptions;
pub use settings::{Settings, SettingsFile, SettingsOverrides};
pub use unit::SizeUnit;

/// Errors raised while turning raw settings into [`Settings`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// The unit is not one of Bytes, Kilobytes, Megabytes, Gigabytes, Terabytes.
    #[error(
        "unit '{0}' is not valid; valid units are Bytes, Kilobytes, Megabytes, Gigabytes, and Terabytes"
    )]
    InvalidUnit(String),
}
