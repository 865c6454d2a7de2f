//! Error types for the `dagviz-graph` crate.
//!
//! Nothing in the graph itself fails: mutations referencing unknown
//! vertices degrade to no-ops. The only fallible step is resolving color
//! specifications, which is a configuration error and is surfaced once at
//! startup through [`GraphError`].

/// A color specification could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    /// The value is not `#rgb`, `#rrggbb`, or `#rrggbbaa`.
    #[error("color expected in hex format with preceding \"#\", e.g. #00ff00; got value: {0}")]
    Format(String),

    /// The value has the right shape but contains a non-hex digit.
    #[error("invalid hex digit in color {0}")]
    InvalidDigit(String),
}

/// Errors that can occur while building the graph's visual palette.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A style table entry carries a malformed color.
    #[error("style {style}: {source}")]
    Color {
        /// Name of the offending style.
        style: &'static str,
        /// The underlying parse error.
        source: ColorError,
    },

    /// A style name is not present in the vertex style table.
    #[error("unknown vertex style: {0}")]
    UnknownVertexStyle(String),

    /// A style name is not present in the link style table.
    #[error("unknown link style: {0}")]
    UnknownLinkStyle(String),
}
