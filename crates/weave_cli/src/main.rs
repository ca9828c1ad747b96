//! Weave CLI, the command-line front end of the router.
//!
//! `weave route` loads a device, a placed design, and a timing calibration,
//! routes the design, and writes the routed design back out.

#![warn(missing_docs)]

mod route;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Weave, a negotiated-congestion FPGA router.
#[derive(Parser, Debug)]
#[command(name = "weave", version, about = "Weave FPGA Router")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Also show notes such as per-iteration congestion summaries.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a `weave.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Route a placed design.
    Route(RouteArgs),
}

/// Arguments for the `weave route` subcommand.
#[derive(Parser, Debug)]
pub struct RouteArgs {
    /// Device description (JSON).
    #[arg(long)]
    pub device: PathBuf,

    /// Placed input design (JSON).
    pub design: PathBuf,

    /// Timing calibration (TOML).
    pub calibration: PathBuf,

    /// Where to write the routed design.
    pub output: PathBuf,

    /// Write per-net routing times as JSON lines. Overrides `log.timing_log`.
    #[arg(long)]
    pub timing_log: Option<PathBuf>,

    /// Clear existing PIPs and route every net.
    #[arg(long)]
    pub discard_existing: bool,

    /// Output format for diagnostics.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Color when stderr is a terminal.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Diagnostic output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// One JSON object per line.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to show note diagnostics.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a configuration file.
    pub config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::io::stderr().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Route(ref args) => route::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
