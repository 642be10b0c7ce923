//! Command-line argument definition.

use std::path::PathBuf;

use clap::Parser;

/// obsiver - pick an Obsidian release that has a container image
#[derive(Parser, Debug)]
#[command(name = "obsiver")]
#[command(version)]
#[command(
    about = "Browse Obsidian releases with their Electron/Chromium versions and pick one that has a container image",
    long_about = None
)]
pub struct Args {
    /// Ignore local snapshots and refetch every source
    #[arg(short, long)]
    pub refresh: bool,

    /// Delete the local source snapshots and exit
    #[arg(long)]
    pub clear_cache: bool,

    /// Print the confirmed selection as a JSON object
    #[arg(long)]
    pub json: bool,

    /// Set the logging level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Enable verbose output (equivalent to --log-level debug)
    #[arg(short, long)]
    pub verbose: bool,

    /// Read settings from this file instead of ~/.config/obsiver/settings.conf
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// What: Determine the log level from the command line.
///
/// Output:
/// - Log level string (trace, debug, info, warn, error).
///
/// Details:
/// - `--verbose` overrides `--log-level`.
pub fn determine_log_level(args: &Args) -> String {
    if args.verbose {
        "debug".to_string()
    } else {
        args.log_level.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Flags parse and verbose wins over an explicit log level
    ///
    /// - Input: `-r --json -v --log-level warn --config /tmp/s.conf`
    /// - Output: Fields set; effective level is `debug`
    fn parses_flags_and_log_level() {
        let args = Args::parse_from([
            "obsiver",
            "-r",
            "--json",
            "-v",
            "--log-level",
            "warn",
            "--config",
            "/tmp/s.conf",
        ]);
        assert!(args.refresh);
        assert!(args.json);
        assert!(!args.clear_cache);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/s.conf")));
        assert_eq!(determine_log_level(&args), "debug");

        let quiet = Args::parse_from(["obsiver", "--log-level", "warn"]);
        assert_eq!(determine_log_level(&quiet), "warn");
    }
}
