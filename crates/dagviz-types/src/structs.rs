//! Payload structs carried by the visualizer WebSocket.
//!
//! Field names follow the node's JSON encoding (`ID`, `strongParentIDs`,
//! ...), so every field carries an explicit `serde` rename.

use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::enums::{MsgType, ParentRefType};
use crate::ids::{BranchId, VertexId};

// ---------------------------------------------------------------------------
// Vertex
// ---------------------------------------------------------------------------

/// A message vertex of the tangle.
///
/// Parent lists are fixed at creation. Only the booking, confirmation, and
/// future-marker fields change afterwards, each through a dedicated update
/// event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Vertex {
    /// Message identifier.
    #[serde(rename = "ID")]
    pub id: VertexId,
    /// Strongly referenced parents, in message order.
    #[serde(rename = "strongParentIDs", default, deserialize_with = "null_as_empty")]
    pub strong_parents: Vec<VertexId>,
    /// Weakly referenced parents, in message order.
    #[serde(rename = "weakParentIDs", default, deserialize_with = "null_as_empty")]
    pub weak_parents: Vec<VertexId>,
    /// Like-referenced parents, in message order.
    #[serde(rename = "likedParentIDs", default, deserialize_with = "null_as_empty")]
    pub liked_parents: Vec<VertexId>,
    /// Branch the message is booked into.
    #[serde(rename = "branchID", default)]
    pub branch_id: BranchId,
    /// Whether the message carries a marker.
    #[serde(rename = "isMarker", default)]
    pub is_marker: bool,
    /// Whether the message payload is a transaction.
    #[serde(rename = "isTx", default)]
    pub is_tx: bool,
    /// Whether the message reached a grade of finality.
    #[serde(rename = "isConfirmed", default)]
    pub is_confirmed: bool,
    /// Grade-of-finality tag, e.g. `GoF(High)`.
    #[serde(default)]
    pub gof: String,
    /// Confirmation time in Unix nanoseconds, zero while unconfirmed.
    #[serde(rename = "confirmedTime", default)]
    pub confirmed_time: i64,
    /// Future markers learned after creation. Duplicates are kept.
    #[serde(rename = "futureMarkers", default, deserialize_with = "null_as_empty")]
    pub future_markers: Vec<VertexId>,
}

impl Vertex {
    /// Create an unbooked, unconfirmed vertex without parents.
    pub fn new(id: impl Into<VertexId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Parents referenced with the given kind.
    pub fn parents(&self, kind: ParentRefType) -> &[VertexId] {
        match kind {
            ParentRefType::Strong => &self.strong_parents,
            ParentRefType::Weak => &self.weak_parents,
            ParentRefType::Liked => &self.liked_parents,
        }
    }
}

/// The node encodes an empty ID list as `null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<VertexId>, D::Error>
where
    D: Deserializer<'de>,
{
    let ids = Option::<Vec<VertexId>>::deserialize(deserializer)?;
    Ok(ids.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Update payloads
// ---------------------------------------------------------------------------

/// A message was booked into a branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct VertexBooked {
    /// Message identifier.
    #[serde(rename = "ID")]
    pub id: VertexId,
    /// Whether booking assigned a marker to the message.
    #[serde(rename = "isMarker", default)]
    pub is_marker: bool,
    /// Branch the message is booked into.
    #[serde(rename = "branchID", default)]
    pub branch_id: BranchId,
}

/// A message reached a grade of finality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct VertexConfirmed {
    /// Message identifier.
    #[serde(rename = "ID")]
    pub id: VertexId,
    /// Grade-of-finality tag.
    #[serde(default)]
    pub gof: String,
    /// Confirmation time in Unix nanoseconds.
    #[serde(rename = "confirmedTime", default)]
    pub confirmed_time: i64,
}

/// A message learned about a new future marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FutureMarkerUpdated {
    /// Message identifier.
    #[serde(rename = "ID")]
    pub id: VertexId,
    /// The marker that now has this message in its past cone.
    #[serde(rename = "futureMarkerID")]
    pub future_marker_id: VertexId,
}

// ---------------------------------------------------------------------------
// Envelope and decoded events
// ---------------------------------------------------------------------------

/// Raw `{"type": .., "data": ..}` frame as sent by the node.
///
/// `data` stays untyped until the tag has been checked against the
/// registered handlers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WsEnvelope {
    /// Numeric message type tag, see [`MsgType`].
    #[serde(rename = "type")]
    pub msg_type: u8,
    /// Type-specific payload.
    #[serde(default)]
    pub data: serde_json::Value,
}

/// A decoded graph-mutation event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TangleEvent {
    /// A new vertex arrived.
    VertexCreated(Box<Vertex>),
    /// Branch booking changed.
    VertexBooked(VertexBooked),
    /// The vertex was confirmed.
    VertexConfirmed(VertexConfirmed),
    /// A future marker was added to the vertex.
    FutureMarkerUpdated(FutureMarkerUpdated),
}

impl TangleEvent {
    /// The wire type this event was decoded from.
    pub const fn msg_type(&self) -> MsgType {
        match self {
            Self::VertexCreated(_) => MsgType::Vertex,
            Self::VertexBooked(_) => MsgType::VertexBooked,
            Self::VertexConfirmed(_) => MsgType::VertexConfirmed,
            Self::FutureMarkerUpdated(_) => MsgType::FutureMarkerUpdated,
        }
    }

    /// The vertex the event refers to.
    pub fn vertex_id(&self) -> &VertexId {
        match self {
            Self::VertexCreated(vertex) => &vertex.id,
            Self::VertexBooked(booked) => &booked.id,
            Self::VertexConfirmed(confirmed) => &confirmed.id,
            Self::FutureMarkerUpdated(update) => &update.id,
        }
    }
}
