//! Logging setup.
//!
//! Everything is written to stderr: stdout carries the LSP stream when the
//! server is running. `RUST_LOG` overrides the level given on the command line.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::lsp::LspLayer;

/// Install the global subscriber.
///
/// `client` forwards INFO and above to the editor once the handshake is done.
pub fn init(
    level: &str,
    client: Option<LspLayer>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_filter(filter);

    let client_layer = client.map(|layer| layer.with_filter(LevelFilter::INFO));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(client_layer)
        .try_init()?;
    Ok(())
}
