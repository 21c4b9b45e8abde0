//! ProXPL language server and command-line entry point.

mod cli;
mod logging;
mod lsp;

use std::process::ExitCode;

use clap::Parser;
use cli::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Command::Serve { client_log } = cli.command {
        if let Err(e) = lsp::serve(&cli.log_level, client_log) {
            eprintln!("LSP server error: {e}");
            return ExitCode::FAILURE;
        }
        return ExitCode::SUCCESS;
    }

    if let Err(e) = logging::init(&cli.log_level, None) {
        eprintln!("Invalid log level: {e}");
        return ExitCode::FAILURE;
    }

    let result = match &cli.command {
        Command::Serve { .. } => Ok(()),
        Command::Symbols { file, json } => cli::symbols(file, *json),
        Command::Definition { file, offset } => cli::definition(file, *offset),
        Command::Format { file, check } => cli::format(file, *check),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
