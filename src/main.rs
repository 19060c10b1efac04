//! Command-line interface for the `ci-matrix` binary.
//!
//! The CLI exposes a `generate` subcommand producing a matrix for a CI
//! platform, a `lookup` subcommand translating a CI node index back into a
//! matrix value, and a `show` subcommand for inspecting an expansion locally.

use std::{
    io,
    path::{Path, PathBuf},
    process,
};

use ci_matrix::{
    Error, GITHUB_OUTPUT_ENV, GITLAB_MATRIX_PATH_ENV, Matrix, Platform, SinkPaths, generate,
    io_error, load_config, lookup,
};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Command line interface for generating and reading CI build matrices.
#[derive(Debug, Parser,)]
#[command(name = "ci-matrix", version, about = "Generate build matrices for CI platforms")]
/// Top-level CLI options parsed from user input.
struct Cli
{
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand,)]
/// Supported commands exposed by the CLI.
enum Command
{
    /// Generate the matrix for a CI platform from a configuration file.
    Generate(GenerateArgs,),
    /// Print one field of a persisted matrix entry selected by CI node index.
    Lookup(LookupArgs,),
    /// Print the expanded matrix for a configuration file.
    Show(ShowArgs,),
}

#[derive(Debug, Args,)]
/// Arguments accepted by the `generate` subcommand.
struct GenerateArgs
{
    /// CI platform whose output convention is used.
    #[arg(value_enum)]
    mode: Platform,

    /// Path to the JSON (or YAML) configuration with build types and devices.
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// GitHub Actions step output file.
    #[arg(long = "github-output", env = GITHUB_OUTPUT_ENV, value_name = "PATH")]
    github_output: Option<PathBuf,>,

    /// Destination of the expanded GitLab matrix.
    #[arg(long = "gitlab-matrix-path", env = GITLAB_MATRIX_PATH_ENV, value_name = "PATH")]
    gitlab_matrix_path: Option<PathBuf,>,
}

#[derive(Debug, Args,)]
/// Arguments accepted by the `lookup` subcommand.
struct LookupArgs
{
    /// 1-based index of the parallel job (for example `CI_NODE_INDEX`).
    #[arg(allow_negative_numbers = true)]
    ci_node_index: i64,

    /// Field to print: `build_type` or `device`.
    variable: String,

    /// Persisted matrix written by `generate gitlab`.
    #[arg(long = "matrix", env = GITLAB_MATRIX_PATH_ENV, value_name = "PATH")]
    matrix: Option<PathBuf,>,
}

#[derive(Debug, Args,)]
/// Arguments accepted by the `show` subcommand.
struct ShowArgs
{
    /// Path to the JSON (or YAML) configuration with build types and devices.
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Output formatted JSON for easier inspection.
    #[arg(long = "pretty", action = ArgAction::SetTrue)]
    pretty: bool,
}

/// Entry point that reports errors and sets the appropriate exit status.
fn main()
{
    init_tracing();

    if let Err(error,) = run() {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

/// Installs a stderr subscriber so stdout only carries command output.
fn init_tracing()
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn",),);
    tracing_subscriber::fmt()
        .with_env_filter(filter,)
        .with_writer(io::stderr,)
        .with_target(false,)
        .compact()
        .init();
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates errors from configuration loading, delivery, and lookup.
fn run() -> Result<(), Error,>
{
    let cli = Cli::parse();

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match cli.command {
        Command::Generate(args,) => run_generate(args,),
        Command::Lookup(args,) => run_lookup(args, &mut handle,),
        Command::Show(args,) => run_show(args, &mut handle,),
    }
}

fn run_generate(args: GenerateArgs,) -> Result<(), Error,>
{
    let paths = SinkPaths {
        github_output:      args.github_output,
        gitlab_matrix_path: args.gitlab_matrix_path,
    };

    generate(args.mode, &args.config, &paths,)
}

fn run_lookup<W: io::Write,>(args: LookupArgs, writer: &mut W,) -> Result<(), Error,>
{
    let path = args
        .matrix
        .as_deref()
        .ok_or_else(|| Error::missing_environment(Platform::Gitlab.environment_variable(),),)?;
    let value = lookup(path, args.ci_node_index, &args.variable,)?;

    write_value(writer, &value,)
}

fn write_value<W: io::Write,>(writer: &mut W, value: &str,) -> Result<(), Error,>
{
    writeln!(writer, "{value}")
        .map_err(|source| io_error(Path::new("<stdout>",), source,),)
}

fn run_show<W: io::Write,>(args: ShowArgs, writer: &mut W,) -> Result<(), Error,>
{
    let matrix = load_config(&args.config,)?.expand();

    write_matrix(writer, &matrix, args.pretty,)
}

fn write_matrix<W: io::Write,>(writer: &mut W, matrix: &Matrix, pretty: bool,) -> Result<(), Error,>
{
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, matrix,)?;
    } else {
        serde_json::to_writer(&mut *writer, matrix,)?;
    }
    writeln!(writer).map_err(|source| io_error(Path::new("<stdout>",), source,),)
}
