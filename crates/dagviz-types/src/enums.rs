//! Enumeration types for the tangle event stream.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Parent references
// ---------------------------------------------------------------------------

/// The kind of reference a message holds to one of its parents.
///
/// Every edge in the visual graph carries exactly one of these tags. The
/// set is closed: styling and materialization match on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ParentRefType {
    /// Strong approval: the parent's whole past cone is approved.
    Strong,
    /// Weak approval: only the parent message itself is approved.
    Weak,
    /// Like reference: votes for the branch of the parent.
    Liked,
}

impl ParentRefType {
    /// All reference kinds in materialization order.
    pub const ALL: [Self; 3] = [Self::Strong, Self::Weak, Self::Liked];

    /// Stable lowercase name used in logs and render output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Weak => "weak",
            Self::Liked => "liked",
        }
    }
}

// ---------------------------------------------------------------------------
// Wire message types
// ---------------------------------------------------------------------------

/// Numeric `type` tag of a frame on the visualizer WebSocket.
///
/// The node multiplexes several DAG views over one socket. Only the tangle
/// view is consumed here; the UTXO and branch DAG tags (4 and above) are
/// deliberately absent and decode as unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum MsgType {
    /// A new message vertex was attached.
    Vertex,
    /// A message was booked into a branch.
    VertexBooked,
    /// A message reached a grade of finality.
    VertexConfirmed,
    /// A message learned about a new future marker.
    FutureMarkerUpdated,
}

impl MsgType {
    /// All tangle message types.
    pub const ALL: [Self; 4] = [
        Self::Vertex,
        Self::VertexBooked,
        Self::VertexConfirmed,
        Self::FutureMarkerUpdated,
    ];

    /// Wire tag of this message type.
    pub const fn tag(self) -> u8 {
        match self {
            Self::Vertex => 0,
            Self::VertexBooked => 1,
            Self::VertexConfirmed => 2,
            Self::FutureMarkerUpdated => 3,
        }
    }

    /// Resolve a wire tag, returning `None` for types this crate does not model.
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Vertex),
            1 => Some(Self::VertexBooked),
            2 => Some(Self::VertexConfirmed),
            3 => Some(Self::FutureMarkerUpdated),
            _ => None,
        }
    }
}
