use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use monotime::Duration;
use std::path::{Path, PathBuf};

/// mtime: monotonic timing from the command line
///
/// Measures how long commands take, sleeps with a drift report, and
/// normalises duration strings, all on the OS monotonic clock.
#[derive(Debug, Parser, Clone)]
#[command(about, long_about, version)]
pub struct Cli {
    /// Path to configuration file.
    ///
    /// Without one, defaults and `MTIME_*` environment variables apply.
    #[arg(short, long, value_parser = validate_file)]
    pub conffile: Option<PathBuf>,

    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone, PartialEq)]
pub enum Command {
    /// Run a program and report how long it took.
    Measure {
        /// Number of runs (overrides `measure.runs`).
        #[arg(short, long, value_parser = validate_runs)]
        runs: Option<u32>,

        /// Fractional digits to print (overrides `format.precision`).
        #[arg(short, long)]
        precision: Option<usize>,

        /// Program to run, followed by its arguments.
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Sleep for a duration and report how far the wake-up drifted.
    Sleep {
        /// How long to sleep, e.g. `250ms` or `1.5s`.
        #[arg(allow_hyphen_values = true)]
        duration: Duration,

        /// Fractional digits to print (overrides `format.precision`).
        #[arg(short, long)]
        precision: Option<usize>,
    },

    /// Parse a duration and print it in its natural unit.
    Format {
        /// Duration to render, e.g. `1500ms`.
        #[arg(allow_hyphen_values = true)]
        duration: Duration,

        /// Fractional digits to print (overrides `format.precision`).
        #[arg(short, long)]
        precision: Option<usize>,
    },

    /// Print the effective configuration as TOML.
    Config,
}

/// Check if the file exists.
#[inline(always)]
fn validate_file(file: &str) -> Result<PathBuf, String> {
    let path = Path::new(file);
    if path.exists() {
        Ok(path.to_owned())
    } else {
        Err(format!("File not found: {:?}", path))
    }
}

/// Validate run count
#[inline(always)]
fn validate_runs(runs: &str) -> Result<u32, String> {
    let runs: u32 = runs
        .parse()
        .map_err(|_| format!("`{runs}` is not a valid run count"))?;
    if runs >= 1 {
        Ok(runs)
    } else {
        Err("Run count must be at least 1".to_string())
    }
}
