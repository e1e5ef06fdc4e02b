//! Options controlling how a run behaves.
//!
//! These do not change what ends up in the manifest; they decide whether the
//! bags are touched at all, how much is printed, and how strictly folder
//! names are matched during normalization.

use crate::bag::MatchMode;

/// Behavioural options for a single run.
#[derive(Clone, Copy, Debug, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunOptions {
    /// List candidate bags and their sizes without changing anything
    pub dry_run: bool,

    /// Print every directory created and every entry relocated
    pub verbose: bool,

    /// Suppress human-readable output (used by `--json`)
    pub quiet: bool,

    /// How canonical folder names are recognised
    pub match_mode: MatchMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_options_default() {
        let opts = RunOptions::default();

        assert!(!opts.dry_run);
        assert!(!opts.verbose);
        assert!(!opts.quiet);
        assert_eq!(opts.match_mode, MatchMode::Substring);
    }

    #[test]
    fn test_run_options_copy() {
        let original = RunOptions {
            dry_run: true,
            verbose: false,
            quiet: true,
            match_mode: MatchMode::Exact,
        };
        let copied = original;

        assert_eq!(original.dry_run, copied.dry_run);
        assert_eq!(original.quiet, copied.quiet);
        assert_eq!(original.match_mode, copied.match_mode);
    }
}
