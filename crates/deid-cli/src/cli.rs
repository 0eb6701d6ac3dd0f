//! CLI argument definitions for the deid anonymizer.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use deid_core::TagPropagation;

#[derive(Parser)]
#[command(
    name = "deid",
    version,
    about = "k-anonymize CSV tables by generalization and suppression",
    long_about = "Generalize quasi-identifier columns of a CSV table until every \
                  combination of values is shared by at least k records.\n\n\
                  Searches the generalization lattice with OLA and releases the \
                  lowest-loss k-anonymous table."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow record values in trace logs (they are redacted otherwise).
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Search for the lowest-loss k-anonymous generalization and write it out.
    Anonymize(AnonymizeArgs),

    /// Search the lattice and print the tag of every node.
    Lattice(LatticeArgs),
}

/// Inputs shared by every search command.
#[derive(Args)]
pub struct SearchArgs {
    /// CSV file with a header row.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// JSON hierarchy file with per-column generalization rules.
    #[arg(long = "hierarchy", value_name = "FILE")]
    pub hierarchy: Option<PathBuf>,

    /// Levels for numeric columns without an explicit rule.
    #[arg(long = "interval-levels", value_name = "N")]
    pub interval_levels: Option<usize>,

    /// Minimum equivalence class size.
    #[arg(short = 'k', value_name = "N")]
    pub k: Option<usize>,

    /// Largest acceptable share of suppressed rows (0.0 to 1.0).
    #[arg(long = "max-suppression", value_name = "RATE")]
    pub max_suppression: Option<f64>,

    /// Which verdicts spread through the lattice.
    #[arg(long = "propagation", value_enum)]
    pub propagation: Option<PropagationArg>,

    /// Do not draw a progress bar.
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

#[derive(Args)]
pub struct AnonymizeArgs {
    #[command(flatten)]
    pub search: SearchArgs,

    /// Destination CSV file.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Keep rows of small classes with every column suppressed.
    #[arg(long = "keep-suppressed")]
    pub keep_suppressed: bool,

    /// Run the search and report without writing the output file.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct LatticeArgs {
    #[command(flatten)]
    pub search: SearchArgs,

    /// Only print nodes up to this level.
    #[arg(long = "max-level", value_name = "LEVEL")]
    pub max_level: Option<usize>,
}

/// CLI tag propagation choices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PropagationArg {
    /// Only k-anonymous verdicts spread, to ancestors.
    Upward,
    /// Failures also spread to descendants.
    Bidirectional,
}

impl From<PropagationArg> for TagPropagation {
    fn from(arg: PropagationArg) -> Self {
        match arg {
            PropagationArg::Upward => Self::UpwardOnly,
            PropagationArg::Bidirectional => Self::Bidirectional,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
