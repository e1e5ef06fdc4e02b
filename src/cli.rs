//! Command-line interface definition and argument parsing.
//!
//! This module defines all command-line arguments, options, and their
//! validation using the [clap](https://docs.rs/clap/) library.
//!
//! Settings-related flags are turned into [`SettingsOverrides`] so that they
//! take priority over `bagger_settings.txt` (layered config).

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use proto_bagger::bag::MatchMode;
use proto_bagger::config::{RunOptions, SettingsOverrides, SizeUnit};

/// Command-line arguments overriding values from the settings file.
#[derive(Parser)]
struct SettingsArgs {
    /// Path to the settings file
    ///
    /// Defaults to ./bagger_settings.txt, then to
    /// <config dir>/proto-bagger/bagger_settings.txt. When neither exists,
    /// built-in defaults are used.
    #[arg(long = "settings")]
    settings_file: Option<PathBuf>,

    /// Location label written to the import file
    #[arg(short = 'l', long)]
    location: Option<String>,

    /// Unit for the extent columns
    #[arg(short = 'u', long, value_enum)]
    unit: Option<SizeUnit>,

    /// Base name of the import file
    ///
    /// Folders whose name contains this base name are never treated as bags.
    #[arg(short = 'n', long)]
    file_name: Option<String>,

    /// Folder names to leave out of the run
    ///
    /// Can be specified multiple times; merged with the EXCLUDES block of the
    /// settings file.
    #[arg(short = 'e', long, action = clap::ArgAction::Append)]
    exclude: Vec<String>,
}

/// Command-line arguments controlling how the run behaves.
#[derive(Parser)]
#[allow(clippy::struct_excessive_bools)]
struct ExecutionArgs {
    /// List the bags and their sizes without moving anything or writing a file
    #[arg(long)]
    dry_run: bool,

    /// Never prompt; fail on an invalid directory and fall back on an invalid unit
    #[arg(short = 'y', long)]
    yes: bool,

    /// Print every directory created and every entry moved
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Only treat folders named exactly data, meta, originals or dips as canonical
    ///
    /// By default any entry whose name contains one of these words is left in
    /// place, so a folder like `metadata_old` is not swept into originals/.
    #[arg(long)]
    exact_names: bool,
}

/// Top-level subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Inspect or initialise the settings file
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
}

/// Subcommands for `settings`.
#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Print the effective settings (file values + defaults for unset keys)
    Show,
    /// Write a template bagger_settings.txt into the current directory
    Init,
    /// Print the path of the settings file in use
    Path,
}

/// Main command-line interface structure.
#[derive(Parser)]
#[command(name = "proto-bagger")]
#[command(
    about = "Normalize a directory of bags into data/{meta,originals,dips} and write an accession import file"
)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand (e.g. `settings`)
    #[command(subcommand)]
    pub subcommand: Option<Commands>,

    /// Directory containing the bags
    ///
    /// When missing or not a directory, the path is asked for interactively.
    dir: Option<PathBuf>,

    /// Output results as a single JSON object for scripting/piping
    ///
    /// Suppresses all human-readable output and never prompts.
    #[arg(long)]
    json: bool,

    /// Settings options
    #[command(flatten)]
    settings: SettingsArgs,

    /// Execution options
    #[command(flatten)]
    execution: ExecutionArgs,
}

impl Cli {
    /// Whether `--json` structured output mode is enabled.
    #[must_use]
    pub const fn json(&self) -> bool {
        self.json
    }

    /// Whether the user may be prompted for input.
    #[must_use]
    pub const fn interactive(&self) -> bool {
        !self.json && !self.execution.yes
    }

    /// The bag directory given on the command line, if any.
    #[must_use]
    pub fn directory(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Explicit settings file path, if any.
    #[must_use]
    pub fn settings_path(&self) -> Option<&Path> {
        self.settings.settings_file.as_deref()
    }

    /// Settings values given on the command line.
    #[must_use]
    pub fn settings_overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            location: self.settings.location.clone(),
            unit: self.settings.unit,
            file_name: self.settings.file_name.clone(),
            excludes: self.settings.exclude.clone(),
        }
    }

    /// Behavioural options for the run.
    #[must_use]
    pub const fn run_options(&self) -> RunOptions {
        RunOptions {
            dry_run: self.execution.dry_run,
            verbose: self.execution.verbose,
            quiet: self.json,
            match_mode: if self.execution.exact_names {
                MatchMode::Exact
            } else {
                MatchMode::Substring
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let args = Cli::parse_from(["proto-bagger"]);

        assert!(args.directory().is_none());
        assert!(args.settings_path().is_none());
        assert!(!args.json());
        assert!(args.interactive());

        let overrides = args.settings_overrides();
        assert!(overrides.location.is_none());
        assert!(overrides.unit.is_none());
        assert!(overrides.file_name.is_none());
        assert!(overrides.excludes.is_empty());

        let opts = args.run_options();
        assert!(!opts.dry_run);
        assert!(!opts.verbose);
        assert!(!opts.quiet);
        assert_eq!(opts.match_mode, MatchMode::Substring);
    }

    #[test]
    fn test_directory_and_settings_path() {
        let args = Cli::parse_from([
            "proto-bagger",
            "/archive/incoming",
            "--settings",
            "/etc/bagger.txt",
        ]);

        assert_eq!(args.directory(), Some(Path::new("/archive/incoming")));
        assert_eq!(args.settings_path(), Some(Path::new("/etc/bagger.txt")));
    }

    #[test]
    fn test_settings_overrides() {
        let args = Cli::parse_from([
            "proto-bagger",
            "--location",
            "Vault",
            "--unit",
            "Megabytes",
            "--file-name",
            "Import",
            "--exclude",
            "a",
            "-e",
            "b",
        ]);
        let overrides = args.settings_overrides();

        assert_eq!(overrides.location.as_deref(), Some("Vault"));
        assert_eq!(overrides.unit, Some(SizeUnit::Megabytes));
        assert_eq!(overrides.file_name.as_deref(), Some("Import"));
        assert_eq!(overrides.excludes, vec!["a", "b"]);
    }

    #[test]
    fn test_invalid_unit_rejected() {
        assert!(Cli::try_parse_from(["proto-bagger", "--unit", "Parsecs"]).is_err());
    }

    #[test]
    fn test_execution_flags() {
        let args = Cli::parse_from([
            "proto-bagger",
            "--dry-run",
            "--verbose",
            "--exact-names",
            "--yes",
        ]);
        let opts = args.run_options();

        assert!(opts.dry_run);
        assert!(opts.verbose);
        assert_eq!(opts.match_mode, MatchMode::Exact);
        assert!(!args.interactive());
    }

    #[test]
    fn test_json_is_quiet_and_non_interactive() {
        let args = Cli::parse_from(["proto-bagger", "--json"]);

        assert!(args.json());
        assert!(args.run_options().quiet);
        assert!(!args.interactive());
    }

    #[test]
    fn test_settings_subcommand() {
        let args = Cli::parse_from(["proto-bagger", "settings", "show"]);
        assert!(matches!(
            args.subcommand,
            Some(Commands::Settings {
                command: SettingsCommand::Show
            })
        ));

        let args = Cli::parse_from(["proto-bagger", "settings", "init"]);
        assert!(matches!(
            args.subcommand,
            Some(Commands::Settings {
                command: SettingsCommand::Init
            })
        ));
    }
}
