#![warn(clippy::uninlined_format_args)]

mod bootstrap;
mod commands;

use bootstrap::{AppConfig, RoundingArg};
use clap::{Parser, Subcommand};
use commands::calc::CalcCommand;
use std::{borrow::Cow, path::PathBuf, process};

type CliResult<T> = Result<T, Cow<'static, str>>;

#[derive(Debug, Parser)]
#[command(name = "tallyup", version, about = "Expense settlement and everyday calculators")]
struct Cli {
    /// Decimal places of the settlement currency (overrides TALLYUP_CURRENCY_SCALE).
    #[arg(long, global = true)]
    scale: Option<u32>,
    /// Rounding rule for settlement balances (overrides TALLYUP_ROUNDING_MODE).
    #[arg(long, global = true, value_enum)]
    rounding: Option<RoundingArg>,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Evaluate an expense sheet and print who pays whom.
    Settle { file: PathBuf },
    #[command(flatten)]
    Calc(CalcCommand),
}

fn main() {
    bootstrap::init_logging();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        CliCommand::Settle { file } => {
            let config = AppConfig::from_env()
                .and_then(|config| config.with_overrides(cli.scale, cli.rounding))
                .map_err(|err| err.to_string())?;
            tracing::debug!(?config, path = %file.display(), "Settling sheet");
            commands::settle::run(&file, config.settlement)
        }
        CliCommand::Calc(command) => {
            print!("{}", command.run()?);
            Ok(())
        }
    }
}
