// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `buildgen`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "buildgen",
    version,
    about = "Generate ninja-style build files from a BUILD.toml description tree.",
    long_about = None
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

impl CliArgs {
    pub fn log_level(&self) -> Option<LogLevel> {
        match &self.command {
            Command::Gen(args) => args.log_level,
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Generate build files into the given output directory.
    Gen(GenArgs),
}

#[derive(Debug, Clone, clap::Args)]
pub struct GenArgs {
    /// Output directory: source-absolute (`//out/debug`) or relative to the
    /// source root (`out/debug`).
    pub out_dir: String,

    /// Source root directory. Defaults to the current directory.
    #[arg(long, value_name = "PATH")]
    pub root: Option<String>,

    /// Enable the public-header check; `--check=system` additionally
    /// validates system include dirs.
    #[arg(long, value_name = "MODE", num_args = 0..=1, require_equals = true, default_missing_value = "")]
    pub check: Option<String>,

    /// Semicolon-separated label patterns restricting auxiliary projections.
    #[arg(long, value_name = "PATTERNS")]
    pub filters: Option<String>,

    /// Generate files for an IDE. Supported: eclipse, vs, vs2013, vs2015,
    /// vs2017, vs2019, xcode, qtcreator, json.
    #[arg(long, value_name = "NAME")]
    pub ide: Option<String>,

    /// Override the Visual Studio solution base name ("all").
    #[arg(long, value_name = "FILE")]
    pub sln: Option<String>,

    /// Exclude the dependency closure from the Visual Studio projection.
    #[arg(long)]
    pub no_deps: bool,

    /// Windows SDK version for the Visual Studio projection.
    #[arg(long, value_name = "VERSION")]
    pub winsdk: Option<String>,

    /// Executor binary for IDEs that invoke the downstream executor.
    #[arg(long, value_name = "PATH")]
    pub ninja_executable: Option<String>,

    /// Extra arguments forwarded verbatim to the executor invocation.
    #[arg(long, value_name = "ARGS")]
    pub ninja_extra_args: Option<String>,

    /// Override the Xcode project base name ("all").
    #[arg(long, value_name = "NAME")]
    pub xcode_project: Option<String>,

    /// Xcode build system: "legacy" or "new".
    #[arg(long, value_name = "SYSTEM")]
    pub xcode_build_system: Option<String>,

    /// Root target for Xcode/QtCreator scoping.
    #[arg(long, value_name = "LABEL")]
    pub root_target: Option<String>,

    /// Override the default JSON projection file name ("project.json").
    #[arg(long, value_name = "NAME")]
    pub json_file_name: Option<String>,

    /// Script invoked with the generated JSON file as first argument.
    #[arg(long, value_name = "PATH")]
    pub json_ide_script: Option<String>,

    /// Second argument passed to the JSON IDE script.
    #[arg(long, value_name = "ARGS")]
    pub json_ide_script_args: Option<String>,

    /// Emit compile_commands.json. An optional comma-separated label list
    /// restricts the output to those targets and their dependencies.
    #[arg(long, value_name = "LABELS", num_args = 0..=1, require_equals = true, default_missing_value = "")]
    pub export_compile_commands: Option<String>,

    /// Emit rust-project.json.
    #[arg(long)]
    pub export_rust_project: bool,

    /// Build arguments override. When absent, an empty defaults file is
    /// generated if none exists.
    #[arg(long, value_name = "ARGS")]
    pub args: Option<String>,

    /// Suppress progress and timing output.
    #[arg(long)]
    pub quiet: bool,

    /// Print unity-build configuration statistics.
    #[arg(long)]
    pub unity_stats: bool,

    /// Worker thread count; defaults to the available hardware parallelism.
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BUILDGEN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// The equivalent `tracing` filter directive.
    pub fn as_directive(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Parse the command line, exiting with code 1 on misuse (0 for `--help`
/// and `--version`).
pub fn parse() -> CliArgs {
    match CliArgs::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    }
}
