//! Error types for the stream follower binary.
//!
//! [`StreamError`] wraps every failure that ends the process. Transport
//! failures are not in here: they are logged and retried.

/// Top-level error for the stream follower binary.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: dagviz_core::ConfigError,
    },

    /// The built-in style tables could not be resolved.
    #[error("style error: {source}")]
    Style {
        /// The underlying graph error.
        #[from]
        source: dagviz_graph::GraphError,
    },

    /// A render command could not be encoded.
    #[error("failed to encode render command: {source}")]
    Encode {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// Writing render output failed.
    #[error("output error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
