//! Logging setup for the CLI.
//!
//! `--verbose` enables debug output, `--quiet` limits output to errors, and
//! otherwise `RUST_LOG` applies with an info default.

use fob_rsc::logging::{LogLevel, LogOptions, init_logging_with};

fn options_for(verbose: bool, quiet: bool, ansi: bool) -> LogOptions {
    let level = if verbose {
        Some(LogLevel::Debug)
    } else if quiet {
        Some(LogLevel::Error)
    } else {
        None
    };
    LogOptions { level, ansi }
}

/// Install the global subscriber. Call once, before any logging.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let ansi = !no_color && crate::ui::should_use_color();
    init_logging_with(options_for(verbose, quiet, ansi));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_levels() {
        assert_eq!(options_for(true, false, true).level, Some(LogLevel::Debug));
        assert_eq!(options_for(false, true, true).level, Some(LogLevel::Error));
        assert_eq!(options_for(false, false, false), LogOptions { level: None, ansi: false });
    }
}
