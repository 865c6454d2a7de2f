//! Stream follower binary for the dagviz tangle visualizer.
//!
//! Connects to a node's visualizer WebSocket, keeps the most recent part of
//! the tangle in memory, and writes render commands to stdout as JSON
//! lines. Operator commands (`select <id>`, `limit <n>`, `stats`, ...) are
//! read from stdin, one per line. Logs go to stderr.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `$DAGVIZ_CONFIG` or `dagviz-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the tangle state
//! 4. Follow the stream until Ctrl-C

mod error;
mod follower;

use std::path::PathBuf;

use dagviz_core::config::LoggingConfig;
use dagviz_core::{DagvizConfig, TangleState};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::StreamError;
use crate::follower::Follower;

/// Environment variable naming the configuration file.
const ENV_CONFIG_PATH: &str = "DAGVIZ_CONFIG";

/// Configuration file used when `DAGVIZ_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "dagviz-config.yaml";

/// Application entry point.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, path, from_file) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("dagviz-stream starting");
    if from_file {
        info!(path = %path.display(), "configuration loaded");
    } else {
        info!(path = %path.display(), "config file not found, using defaults");
    }
    info!(
        url = config.stream.url,
        max_vertices = config.graph.max_vertices,
        live_draw = config.graph.live_draw,
        resolve_late_parents = config.graph.resolve_late_parents,
        reconnect_delay_ms = config.stream.reconnect_delay_ms,
        "stream configuration"
    );

    // 3. Build the tangle state.
    let state = TangleState::from_config(&config).map_err(StreamError::from)?;

    // 4. Follow the stream.
    Follower::new(config, state, tokio::io::stdout()).run().await?;

    info!("dagviz-stream stopped");
    Ok(())
}

/// Load configuration from disk, or defaults when the file is missing.
///
/// Environment overrides apply either way.
fn load_config() -> Result<(DagvizConfig, PathBuf, bool), StreamError> {
    let path = std::env::var_os(ENV_CONFIG_PATH)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if path.exists() {
        let config = DagvizConfig::from_file(&path)?;
        Ok((config, path, true))
    } else {
        let config = DagvizConfig::parse("")?;
        Ok((config, path, false))
    }
}

/// Install the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
