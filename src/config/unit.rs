//! Display units for bag extents.
//!
//! Sizes are always accumulated in bytes and converted to one of these units
//! right before they are written to the manifest.

use std::{fmt, str::FromStr};

use clap::ValueEnum;
use serde::Serialize;

use super::SettingsError;

/// Unit used for the extent columns of the import file.
///
/// Every unit is a power of 1024 of the one before it.
#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum, Serialize, Default)]
#[value(rename_all = "PascalCase")]
pub enum SizeUnit {
    /// Raw byte count
    Bytes,

    /// 1024 bytes
    Kilobytes,

    /// 1024² bytes
    Megabytes,

    /// 1024³ bytes
    #[default]
    Gigabytes,

    /// 1024⁴ bytes
    Terabytes,
}

impl SizeUnit {
    /// All units, in ascending order of magnitude.
    pub const ALL: [Self; 5] = [
        Self::Bytes,
        Self::Kilobytes,
        Self::Megabytes,
        Self::Gigabytes,
        Self::Terabytes,
    ];

    /// Number of bytes in one of this unit.
    #[must_use]
    pub const fn divisor(self) -> f64 {
        match self {
            Self::Bytes => 1.0,
            Self::Kilobytes => 1_024.0,
            Self::Megabytes => 1_048_576.0,
            Self::Gigabytes => 1_073_741_824.0,
            Self::Terabytes => 1_099_511_627_776.0,
        }
    }

    /// Convert a byte count to this unit.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn convert(self, bytes: u64) -> f64 {
        bytes as f64 / self.divisor()
    }

    /// The label written into the manifest's unit columns.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bytes => "Bytes",
            Self::Kilobytes => "Kilobytes",
            Self::Megabytes => "Megabytes",
            Self::Gigabytes => "Gigabytes",
            Self::Terabytes => "Terabytes",
        }
    }
}

impl fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeUnit {
    type Err = SettingsError;

    /// Parse a unit label exactly as it appears in the settings file.
    ///
    /// Matching is case-sensitive; `"gigabytes"` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|unit| unit.as_str() == s)
            .ok_or_else(|| SettingsError::InvalidUnit(s.to_string()))
    }
}
