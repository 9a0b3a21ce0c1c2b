pub mod commands;
pub mod core;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::core::logging::{LogBuffer, LogBufferLayer};

/// Install the global subscriber: stderr output plus a copy of every event
/// in `buffer` for the console panel.
///
/// Returns `false` if a subscriber was already installed.
pub fn init_logging(buffer: LogBuffer) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,historion_lib=debug"));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(LogBufferLayer::new(buffer))
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("Historion launcher starting...");
    }
    installed
}
