//! Command-line interface for the ProXPL tools.

use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use derive_more::{Display, Error, From};
use proxpl_index::{IndexError, format_source};
use proxpl_lsp::report;

#[derive(Parser)]
#[command(name = "proxpl-lsp")]
#[command(about = "ProXPL language server and source inspection tools", long_about = None)]
pub struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the Language Server Protocol (LSP) server
    #[command(alias = "lsp")]
    Serve {
        /// Also forward logs to the editor as window/logMessage notifications
        #[arg(long)]
        client_log: bool,
    },
    /// List the functions and classes declared in a file
    Symbols {
        file: PathBuf,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show the declarations of the identifier at a byte offset
    Definition { file: PathBuf, offset: usize },
    /// Normalise whitespace in a file
    Format {
        file: PathBuf,
        /// Report unformatted files instead of rewriting them
        #[arg(long)]
        check: bool,
    },
}

#[derive(Debug, Display, Error, From)]
pub enum CliError {
    #[display("cannot access {}: {}", path.display(), source)]
    #[from(skip)]
    Io { path: PathBuf, source: io::Error },
    Index(IndexError),
    Json(serde_json::Error),
    #[display("{} is not formatted", path.display())]
    #[from(skip)]
    Unformatted { path: PathBuf },
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Print the declarations of `file` as a table or as JSON.
pub fn symbols(file: &Path, json: bool) -> Result<(), CliError> {
    let text = read(file)?;
    tracing::debug!(path = %file.display(), bytes = text.len(), "Listing symbols");
    let output = if json {
        report::symbols_json(&text)?
    } else {
        report::render_symbols(&text)
    };
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

/// Print the declarations of the identifier under `offset`.
pub fn definition(file: &Path, offset: usize) -> Result<(), CliError> {
    let text = read(file)?;
    println!("{}", report::render_definitions(&text, offset)?);
    Ok(())
}

/// Rewrite `file` with normalised whitespace, or only check it with `check`.
pub fn format(file: &Path, check: bool) -> Result<(), CliError> {
    let text = read(file)?;
    let formatted = format_source(&text);
    if formatted == text {
        tracing::info!(path = %file.display(), "Already formatted");
        return Ok(());
    }
    if check {
        return Err(CliError::Unformatted { path: file.to_path_buf() });
    }
    std::fs::write(file, formatted).map_err(|source| CliError::Io {
        path: file.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %file.display(), "Formatted");
    Ok(())
}
