//! Tracing subscriber setup

use crate::config::GlobalConfig;
use snapvault_core::{SnapVaultError, SnapVaultResult};
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level is `debug` for the
/// workspace crates when `debug_logging` is on and `info` when it is off.
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: &GlobalConfig) -> SnapVaultResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(config)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| SnapVaultError::Initialization {
            reason: format!("Failed to install tracing subscriber: {}", e),
        })
}

fn default_directives(config: &GlobalConfig) -> &'static str {
    if config.debug_logging {
        "info,snapvault=debug,snapvault_core=debug,snapvault_media=debug,snapvault_api=debug"
    } else {
        "info"
    }
}
