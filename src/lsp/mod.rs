//! Language Server Protocol implementation for ProXPL.
//!
//! This module provides LSP support with features like:
//! - Hover: keyword descriptions and declarations of user-defined names
//! - Go to definition: `func` and `class` declarations in the same document
//! - Completion: keywords, built-ins and names declared in the document
//! - Document symbols and whitespace formatting

mod server;
mod tracing_layer;

use std::error::Error;

use lsp_server::Connection;

use crate::logging;
pub(crate) use tracing_layer::LspLayer;

/// Start the LSP server on stdio.
///
/// Logs go to stderr; with `client_log` they are also forwarded to the client
/// as `window/logMessage` notifications.
pub fn serve(log_level: &str, client_log: bool) -> Result<(), Box<dyn Error + Send + Sync>> {
    let (connection, io_threads) = Connection::stdio();

    let (layer, handle) = if client_log {
        let (layer, handle) = LspLayer::new(&connection);
        (Some(layer), Some(handle))
    } else {
        (None, None)
    };
    logging::init(log_level, layer)?;

    server::run_connection(connection, handle)?;

    io_threads.join()?;
    tracing::info!("ProXPL language server stopped");
    Ok(())
}
