//! # proto-bagger
//!
//! A CLI tool that takes a directory of bags, makes sure each bag has the
//! canonical `data/{meta,originals,dips}` structure, and writes an accession
//! import file describing every bag.
//!
//! ## Usage
//!
//! ```bash
//! # Process every bag under a directory
//! proto-bagger /archive/incoming
//!
//! # Preview sizes without touching anything
//! proto-bagger /archive/incoming --dry-run
//!
//! # Override the settings file
//! proto-bagger /archive/incoming --unit Megabytes --location "Vault B"
//! ```

mod cli;

use std::{
    path::{Path, PathBuf},
    process::exit,
};

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Commands, SettingsCommand};
use colored::Colorize;
use inquire::{Confirm, Select, Text};
use proto_bagger::{
    Accessioner,
    config::{
        Settings, SettingsFile, SizeUnit,
        settings::{SETTINGS_FILE_NAME, SETTINGS_TEMPLATE, expand_tilde},
    },
    output::JsonOutput,
};

/// Entry point for the proto-bagger application.
///
/// This function handles all errors gracefully by calling [`inner_main`] and
/// printing any errors to stderr before exiting with a non-zero status code.
fn main() {
    if let Err(err) = inner_main() {
        eprintln!("{} {err:#}", "Error:".red());

        exit(1);
    }
}

/// Main application logic that can return errors.
///
/// Loads the settings, resolves the bag directory, then either surveys the
/// bags (dry run) or runs the full accession.
///
/// # Errors
///
/// Returns errors from settings loading, interactive prompts, bag discovery,
/// normalization, import file writing, or JSON serialization.
fn inner_main() -> Result<()> {
    let args = Cli::parse();

    if let Some(Commands::Settings { command }) = &args.subcommand {
        return handle_settings_command(command, &args);
    }

    let (settings, warnings) = load_settings(&args)?;
    let root = resolve_directory(args.directory(), args.interactive())?;
    let options = args.run_options();

    let accessioner = Accessioner::new(&settings, options);

    let result = if options.dry_run {
        accessioner.survey(&root)?
    } else {
        accessioner.run(&root)?
    };

    if args.json() {
        let output = JsonOutput::from_result(&result, &settings).with_warnings(warnings);
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        accessioner.print_summary(&result);
    }

    Ok(())
}

// ── Settings ────────────────────────────────────────────────────────────

/// Load the settings file and layer the CLI overrides on top.
///
/// An invalid unit in the settings file is either re-asked interactively or
/// replaced by the default unit. The warning goes to stderr in every mode and
/// is also returned so `--json` can include it in the document.
fn load_settings(args: &Cli) -> Result<(Settings, Vec<String>)> {
    let file = SettingsFile::load(args.settings_path())?;
    let mut overrides = args.settings_overrides();

    match Settings::layered(&file, &overrides) {
        Ok(settings) => Ok((settings, Vec::new())),
        Err(err) => {
            eprintln!("{} {err}", "Warning:".yellow());
            overrides.unit = Some(ask_for_unit(args.interactive())?);
            let settings = Settings::layered(&file, &overrides)?;
            let warning = format!("{err}; using {}", settings.unit);
            Ok((settings, vec![warning]))
        }
    }
}

/// Ask the user for a replacement unit, or fall back to the default.
fn ask_for_unit(interactive: bool) -> Result<SizeUnit> {
    if interactive
        && Confirm::new("Would you like to re-enter the unit?")
            .with_default(true)
            .prompt()?
    {
        return Ok(Select::new(
            "Please choose the unit you would like to use:",
            SizeUnit::ALL.to_vec(),
        )
        .with_starting_cursor(3)
        .prompt()?);
    }

    if interactive {
        println!("{}", "Running with default unit".yellow());
    }
    Ok(SizeUnit::default())
}

/// Handle `proto-bagger settings <command>`.
fn handle_settings_command(command: &SettingsCommand, args: &Cli) -> Result<()> {
    match command {
        SettingsCommand::Path => {
            match SettingsFile::locate(args.settings_path()) {
                Some(path) => println!("{}", path.display()),
                None => {
                    println!("No settings file found; built-in defaults are used.");
                    println!("Looked for ./{SETTINGS_FILE_NAME}");
                    if let Some(user) = SettingsFile::user_config_path() {
                        println!("       and {}", user.display());
                    }
                }
            }
            Ok(())
        }
        SettingsCommand::Show => {
            let (settings, _) = load_settings(args)?;
            println!("{}", format_settings(&settings));
            Ok(())
        }
        SettingsCommand::Init => init_settings(Path::new(SETTINGS_FILE_NAME)),
    }
}

/// Render the effective settings in the settings-file format.
fn format_settings(settings: &Settings) -> String {
    let mut out = format!(
        "LOCATION:\n{}\n\nUNIT:\n{}\n\nFILE_NAME:\n{}\n\nEXCLUDES:\n",
        settings.location, settings.unit, settings.file_name_base
    );
    for exclude in &settings.excludes {
        out.push_str(exclude);
        out.push('\n');
    }
    out
}

/// Write the settings template to `path` if it does not exist yet.
fn init_settings(path: &Path) -> Result<()> {
    if path.exists() {
        println!("Settings file already exists at: {}", path.display());
        println!("Remove it first if you want to regenerate it.");
        return Ok(());
    }

    std::fs::write(path, SETTINGS_TEMPLATE)
        .with_context(|| format!("Failed to write settings file {}", path.display()))?;

    println!("Settings file written to: {}", path.display());
    Ok(())
}

// ── Directory ───────────────────────────────────────────────────────────

/// Use the directory from the command line, or keep asking until a valid one is given.
fn resolve_directory(dir: Option<&Path>, interactive: bool) -> Result<PathBuf> {
    if let Some(dir) = dir {
        let dir = expand_tilde(dir);
        if dir.is_dir() {
            return Ok(dir);
        }
        if !interactive {
            bail!("Not a valid path: {}", dir.display());
        }
        eprintln!("{}", "Not a valid path".red());
    } else if !interactive {
        bail!("No bag directory given");
    }

    loop {
        let input = Text::new("Please enter your directory:").prompt()?;
        let dir = expand_tilde(Path::new(clean_path_input(&input)));

        if dir.is_dir() {
            return Ok(dir);
        }
        eprintln!("{}", "Not a valid path".red());
    }
}

/// Strip whitespace and surrounding quotes left by drag-and-drop or copy-paste.
fn clean_path_input(input: &str) -> &str {
    input.trim().trim_matches('"').trim_matches('\'')
}
