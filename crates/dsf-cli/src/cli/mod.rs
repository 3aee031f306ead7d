mod commands;
mod helpers;

use clap::Parser;
use dsf_core::domain::DsfError;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let dsf_error = error.as_dsf_error();
            eprintln!("{}", dsf_error.diagnostic_line());
            if let Some(summary_line) = dsf_error.fatal_exit_line() {
                eprintln!("{}", summary_line);
            }
            dsf_error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("dsfinterp".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            helpers::init_tracing(cli.verbose);
            dispatch_parsed(cli.command)
        }
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "dsfinterp",
    version,
    about = "Interpolate dynamic structure factors for quasi-elastic fitting"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Evaluate a fit function described by a JSON job file
    Evaluate(commands::EvaluateArgs),
    /// List registered fit functions and their categories
    Functions,
    /// Rebin a workspace onto [start, width, end] bins
    Rebin(commands::RebinArgs),
    /// Rebin a workspace to the bin width found at a given X
    #[command(name = "rebin-at-x")]
    RebinAtX(commands::RebinAtXArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Evaluate(args) => commands::run_evaluate_command(args),
        CliCommand::Functions => commands::run_functions_command(),
        CliCommand::Rebin(args) => commands::run_rebin_command(args),
        CliCommand::RebinAtX(args) => commands::run_rebin_at_x_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(DsfError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_dsf_error(&self) -> DsfError {
        match self {
            Self::Usage(message) => DsfError::input_validation("INPUT.CLI_USAGE", message.clone()),
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => DsfError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}

impl From<DsfError> for CliError {
    fn from(error: DsfError) -> Self {
        Self::Compute(error)
    }
}
