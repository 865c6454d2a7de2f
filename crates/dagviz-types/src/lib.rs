//! Shared type definitions for the dagviz tangle visualizer.
//!
//! This crate is the single source of truth for the payloads exchanged with
//! the node's visualizer WebSocket. Types flow downstream to `TypeScript`
//! via `ts-rs` for the dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- String newtypes for vertex and branch identifiers
//! - [`enums`] -- Parent reference kinds and wire message types
//! - [`structs`] -- Vertex record, update payloads, and the frame envelope

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{MsgType, ParentRefType};
pub use ids::{BranchId, VertexId};
pub use structs::{
    FutureMarkerUpdated, TangleEvent, Vertex, VertexBooked, VertexConfirmed, WsEnvelope,
};
