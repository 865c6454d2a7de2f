//! Visual graph state for the dagviz tangle visualizer.
//!
//! This crate holds everything the renderer sees: which vertices are drawn,
//! which parent references are drawn as links, and the color and size of
//! each. It knows nothing about the event stream; the store in `dagviz-core`
//! drives it.
//!
//! # Modules
//!
//! - [`color`] -- Hex color parsing into packed `0xRRGGBBAA` values.
//! - [`cone`] -- Breadth-first past and future cone walks.
//! - [`error`] -- Error types for color and style resolution.
//! - [`graph`] -- [`GraphIndex`]: nodes, links, visual attributes, the
//!   marker index, and the render outbox.
//! - [`render`] -- Serializable commands for the renderer.
//! - [`style`] -- Immutable vertex and link style tables and the resolved
//!   [`Palette`].

pub mod color;
pub mod cone;
pub mod error;
pub mod graph;
pub mod render;
pub mod style;

// Re-export primary types at crate root.
pub use color::{ColorSpec, Rgba, parse_color};
pub use cone::{ConeDirection, ConeWalk};
pub use error::{ColorError, GraphError};
pub use graph::{GraphIndex, Link, Node};
pub use render::{LinkId, LinkUi, NodeUi, RenderCommand};
pub use style::Palette;
