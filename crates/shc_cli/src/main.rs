//! The `shc` command-line driver: compile HLSL shaders with DXC and report what the compiler said.
//!
//! Provides `shc compile` for running one compile with the settings from
//! `shc.toml` and the command line, and `shc toolchain list` for listing the
//! compiler installations in a directory.

#![warn(missing_docs)]

mod compile;
mod report;
mod settings;
mod toolchain;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// A driver for DXC-family shader compilers.
#[derive(Parser, Debug)]
#[command(name = "shc", version, about = "Shader compiler driver")]
pub struct Cli {
    /// Suppress all output except errors and compiler messages.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `shc.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile one shader.
    Compile(CompileArgs),
    /// Inspect installed compiler toolchains.
    Toolchain {
        /// The toolchain subcommand to run.
        #[command(subcommand)]
        command: ToolchainCommand,
    },
}

/// Arguments for the `shc compile` subcommand.
#[derive(Parser, Debug)]
pub struct CompileArgs {
    /// The shader source file.
    pub file: String,

    /// Target profile (e.g. `ps_6_0`), overriding `shader.profile`.
    #[arg(short = 'T', long)]
    pub profile: Option<String>,

    /// Entry point, overriding `shader.entry`.
    #[arg(short = 'E', long)]
    pub entry: Option<String>,

    /// Name diagnostics should use for the source instead of its path.
    #[arg(long)]
    pub name: Option<String>,

    /// Artifact destination as `kind=path` or `kind=memory`; repeatable.
    #[arg(long = "artifact", value_name = "KIND=DEST")]
    pub artifacts: Vec<String>,

    /// Keep staged temporary files.
    #[arg(long)]
    pub keep_temps: bool,

    /// Output format for messages and the summary.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Extra arguments passed to the compiler verbatim.
    #[arg(last = true)]
    pub extra: Vec<String>,
}

/// Toolchain subcommands.
#[derive(Subcommand, Debug)]
pub enum ToolchainCommand {
    /// List installed compiler versions, newest first.
    List(ListArgs),
}

/// Arguments for the `shc toolchain list` subcommand.
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Directory holding `dxc-<version>` installations, overriding
    /// `compiler.toolchain_dir`.
    #[arg(long)]
    pub dir: Option<String>,
}

/// Output format for compile reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.quiet, cli.verbose);

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Compile(ref args) => compile::run(args, &global),
        Command::Toolchain {
            command: ToolchainCommand::List(ref args),
        } => toolchain::list(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the logger. `RUST_LOG` overrides the level chosen by the flags.
fn init_logging(quiet: bool, verbose: bool) {
    env_logger::Builder::new()
        .filter_level(log_level(quiet, verbose))
        .parse_default_env()
        .init();
}

fn log_level(quiet: bool, verbose: bool) -> log::LevelFilter {
    if quiet {
        log::LevelFilter::Error
    } else if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    }
}
