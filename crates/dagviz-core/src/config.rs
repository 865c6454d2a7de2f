//! Configuration loading and typed config structures for dagviz.
//!
//! The configuration lives in `dagviz-config.yaml`. Every field has a serde
//! default, so an empty or partial file is valid and a missing file means
//! "all defaults" (the binary decides that).

use std::num::NonZeroUsize;
use std::path::Path;

use serde::Deserialize;

/// Environment variable overriding `stream.url`.
pub const ENV_STREAM_URL: &str = "DAGVIZ_STREAM_URL";

/// Environment variable overriding `graph.max_vertices`.
pub const ENV_MAX_VERTICES: &str = "DAGVIZ_MAX_VERTICES";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is out of range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level visualizer configuration.
///
/// Mirrors the structure of `dagviz-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DagvizConfig {
    /// Event stream connection.
    #[serde(default)]
    pub stream: StreamConfig,

    /// Graph bounds and drawing.
    #[serde(default)]
    pub graph: GraphConfig,

    /// Block explorer links.
    #[serde(default)]
    pub explorer: ExplorerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Render command output.
    #[serde(default)]
    pub render: RenderConfig,
}

impl DagvizConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `DAGVIZ_STREAM_URL` overrides `stream.url`
    /// - `DAGVIZ_MAX_VERTICES` overrides `graph.max_vertices`
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides and validate.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config = Self::parse_yaml(yaml)?;
        config.stream.apply_env_overrides();
        config.graph.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate without looking at the environment.
    pub fn parse_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to an empty mapping.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.graph.max_vertices == 0 {
            return Err(ConfigError::Invalid {
                field: "graph.max_vertices",
                reason: "must be a positive integer".to_owned(),
            });
        }
        if self.stream.reconnect_delay_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "stream.reconnect_delay_ms",
                reason: "must be greater than zero".to_owned(),
            });
        }
        if self.stream.url.is_empty() {
            return Err(ConfigError::Invalid {
                field: "stream.url",
                reason: "must not be empty".to_owned(),
            });
        }
        Ok(())
    }
}

/// Event stream connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StreamConfig {
    /// WebSocket URL of the node's visualizer endpoint.
    #[serde(default = "default_stream_url")]
    pub url: String,

    /// Fixed delay between reconnection attempts.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Interval between stats log lines. Zero disables them.
    #[serde(default = "default_stats_interval_ms")]
    pub stats_interval_ms: u64,
}

impl StreamConfig {
    /// Override the stream URL with `DAGVIZ_STREAM_URL` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(ENV_STREAM_URL) {
            self.url = val;
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: default_stream_url(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            stats_interval_ms: default_stats_interval_ms(),
        }
    }
}

/// Graph bounds and drawing settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GraphConfig {
    /// Number of most recent vertices kept.
    #[serde(default = "default_max_vertices")]
    pub max_vertices: usize,

    /// Whether new vertices are drawn as they arrive.
    #[serde(default = "default_true")]
    pub live_draw: bool,

    /// Link children to parents that arrive after them.
    #[serde(default)]
    pub resolve_late_parents: bool,
}

impl GraphConfig {
    /// Override the vertex limit with `DAGVIZ_MAX_VERTICES` when set.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var(ENV_MAX_VERTICES) {
            self.max_vertices = val.trim().parse().map_err(|e| ConfigError::Invalid {
                field: "graph.max_vertices",
                reason: format!("{ENV_MAX_VERTICES}={val}: {e}"),
            })?;
        }
        Ok(())
    }

    /// The vertex limit, or the default when configured as zero.
    pub fn limit(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.max_vertices).unwrap_or(DEFAULT_MAX_VERTICES)
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_vertices: default_max_vertices(),
            live_draw: true,
            resolve_late_parents: false,
        }
    }
}

/// Block explorer settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExplorerConfig {
    /// `host:port` of the explorer.
    #[serde(default = "default_explorer_address")]
    pub address: String,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            address: default_explorer_address(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit logs as JSON objects instead of text.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Render command output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RenderConfig {
    /// Write render commands to stdout as JSON lines.
    #[serde(default = "default_true")]
    pub emit_commands: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            emit_commands: true,
        }
    }
}

/// Vertex limit used when none is configured.
pub const DEFAULT_MAX_VERTICES: NonZeroUsize = match NonZeroUsize::new(100) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

fn default_stream_url() -> String {
    "ws://localhost:8061/ws".to_owned()
}

const fn default_reconnect_delay_ms() -> u64 {
    1000
}

const fn default_stats_interval_ms() -> u64 {
    10_000
}

const fn default_max_vertices() -> usize {
    DEFAULT_MAX_VERTICES.get()
}

fn default_explorer_address() -> String {
    "localhost:8081".to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}
