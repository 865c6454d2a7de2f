//! Incremental tangle state engine for the dagviz visualizer.
//!
//! Consumes decoded tangle events, keeps the most recent vertices in a
//! bounded FIFO store, mirrors them into the visual graph from
//! `dagviz-graph`, and answers selection queries with cone highlighting.
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration with serde defaults and env overrides.
//! - [`dispatch`] -- Frame decoding and per-type handler registration.
//! - [`operator`] -- Text operator commands and their parser.
//! - [`selection`] -- Single-vertex selection and cone highlighting.
//! - [`state`] -- [`TangleState`], the facade that owns everything.
//! - [`store`] -- [`VertexStore`], the bounded vertex collection.

pub mod config;
pub mod dispatch;
pub mod operator;
pub mod selection;
pub mod state;
pub mod store;

// Re-export primary types at crate root.
pub use config::{ConfigError, DagvizConfig};
pub use dispatch::{DecodeError, EventDispatcher};
pub use operator::{OperatorCommand, OperatorParseError};
pub use selection::{SelectionController, SelectionOrigin};
pub use state::{TangleState, TangleStats};
pub use store::VertexStore;
