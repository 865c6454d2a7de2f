//! Decoding of WebSocket frames into tangle events.
//!
//! The node multiplexes several views over one socket, tagging each frame
//! with a numeric type. [`EventDispatcher`] keeps the set of types that have
//! a registered handler; frames of any other type are skipped without
//! decoding their payload.

use std::collections::BTreeSet;

use dagviz_types::{
    FutureMarkerUpdated, MsgType, TangleEvent, Vertex, VertexBooked, VertexConfirmed, WsEnvelope,
};
use serde::de::DeserializeOwned;
use tracing::trace;

/// A frame could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The frame is not a `{"type": .., "data": ..}` envelope.
    #[error("malformed frame: {source}")]
    Envelope {
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// The payload does not match its declared type.
    #[error("malformed {msg_type:?} payload: {source}")]
    Payload {
        /// Declared message type.
        msg_type: MsgType,
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}

/// Routes frames to the message types that have a handler.
#[derive(Debug, Clone, Default)]
pub struct EventDispatcher {
    handlers: BTreeSet<MsgType>,
}

impl EventDispatcher {
    /// A dispatcher with no handlers; every frame is skipped.
    pub const fn new() -> Self {
        Self {
            handlers: BTreeSet::new(),
        }
    }

    /// A dispatcher with handlers for all four tangle message types.
    pub fn with_tangle_handlers() -> Self {
        let mut dispatcher = Self::new();
        for msg_type in MsgType::ALL {
            dispatcher.register(msg_type);
        }
        dispatcher
    }

    /// Start handling a message type. Returns `false` if already handled.
    pub fn register(&mut self, msg_type: MsgType) -> bool {
        self.handlers.insert(msg_type)
    }

    /// Stop handling a message type. Returns `false` if it was not handled.
    pub fn unregister(&mut self, msg_type: MsgType) -> bool {
        self.handlers.remove(&msg_type)
    }

    /// Whether a message type has a handler.
    pub fn handles(&self, msg_type: MsgType) -> bool {
        self.handlers.contains(&msg_type)
    }

    /// Decode a text frame.
    ///
    /// Returns `Ok(None)` for frames whose type is unknown or has no
    /// handler.
    pub fn decode(&self, frame: &str) -> Result<Option<TangleEvent>, DecodeError> {
        let envelope: WsEnvelope =
            serde_json::from_str(frame).map_err(|source| DecodeError::Envelope { source })?;
        self.decode_envelope(envelope)
    }

    /// Decode an already parsed envelope.
    pub fn decode_envelope(&self, envelope: WsEnvelope) -> Result<Option<TangleEvent>, DecodeError> {
        let Some(msg_type) = MsgType::from_tag(envelope.msg_type) else {
            trace!(tag = envelope.msg_type, "frame of unmodelled type skipped");
            return Ok(None);
        };
        if !self.handles(msg_type) {
            trace!(?msg_type, "frame without handler skipped");
            return Ok(None);
        }

        let data = envelope.data;
        let event = match msg_type {
            MsgType::Vertex => {
                TangleEvent::VertexCreated(Box::new(payload::<Vertex>(msg_type, data)?))
            }
            MsgType::VertexBooked => {
                TangleEvent::VertexBooked(payload::<VertexBooked>(msg_type, data)?)
            }
            MsgType::VertexConfirmed => {
                TangleEvent::VertexConfirmed(payload::<VertexConfirmed>(msg_type, data)?)
            }
            MsgType::FutureMarkerUpdated => {
                TangleEvent::FutureMarkerUpdated(payload::<FutureMarkerUpdated>(msg_type, data)?)
            }
        };
        Ok(Some(event))
    }
}

fn payload<T: DeserializeOwned>(msg_type: MsgType, data: serde_json::Value) -> Result<T, DecodeError> {
    serde_json::from_value(data).map_err(|source| DecodeError::Payload { msg_type, source })
}

#[cfg(test)]
mod tests {
    use dagviz_types::VertexId;

    use super::*;

    fn decode(frame: &str) -> Option<TangleEvent> {
        EventDispatcher::with_tangle_handlers().decode(frame).ok().flatten()
    }

    #[test]
    fn decodes_vertex() {
        let event = decode(
            r#"{"type":0,"data":{"ID":"m1","strongParentIDs":["p"],"weakParentIDs":[],"likedParentIDs":[],"isTx":true}}"#,
        );
        assert!(matches!(event, Some(TangleEvent::VertexCreated(_))), "{event:?}");
        if let Some(TangleEvent::VertexCreated(vertex)) = event {
            assert_eq!(vertex.id, VertexId::from("m1"));
            assert_eq!(vertex.strong_parents, [VertexId::from("p")]);
            assert!(vertex.is_tx);
        }
    }

    #[test]
    fn decodes_vertex_with_null_parent_lists() {
        let event = decode(
            r#"{"type":0,"data":{"ID":"a","strongParentIDs":["p"],"weakParentIDs":null,"likedParentIDs":null}}"#,
        );
        assert!(matches!(event, Some(TangleEvent::VertexCreated(_))), "{event:?}");
        if let Some(TangleEvent::VertexCreated(vertex)) = event {
            assert_eq!(vertex.strong_parents, [VertexId::from("p")]);
            assert!(vertex.weak_parents.is_empty());
            assert!(vertex.liked_parents.is_empty());
        }
    }

    #[test]
    fn decodes_booking() {
        let event = decode(r#"{"type":1,"data":{"ID":"m1","isMarker":true,"branchID":"br"}}"#);
        assert!(matches!(
            event,
            Some(TangleEvent::VertexBooked(VertexBooked { is_marker: true, .. }))
        ));
    }

    #[test]
    fn decodes_confirmation() {
        let event =
            decode(r#"{"type":2,"data":{"ID":"m1","gof":"GoF(High)","confirmedTime":99}}"#);
        assert!(matches!(event, Some(TangleEvent::VertexConfirmed(_))), "{event:?}");
        if let Some(TangleEvent::VertexConfirmed(confirmed)) = event {
            assert_eq!(confirmed.gof, "GoF(High)");
            assert_eq!(confirmed.confirmed_time, 99);
        }
    }

    #[test]
    fn decodes_future_marker_update() {
        let event = decode(r#"{"type":3,"data":{"ID":"m1","futureMarkerID":"mk"}}"#);
        assert_eq!(event.map(|e| e.msg_type()), Some(MsgType::FutureMarkerUpdated));
    }

    #[test]
    fn unknown_types_are_skipped() {
        let dispatcher = EventDispatcher::with_tangle_handlers();
        let result = dispatcher.decode(r#"{"type":4,"data":{"anything":1}}"#);
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn unregistered_types_are_skipped() {
        let mut dispatcher = EventDispatcher::with_tangle_handlers();
        assert!(dispatcher.unregister(MsgType::VertexBooked));
        assert!(!dispatcher.unregister(MsgType::VertexBooked));
        let result = dispatcher.decode(r#"{"type":1,"data":{"ID":"m1"}}"#);
        assert!(matches!(result, Ok(None)));
        assert!(dispatcher.register(MsgType::VertexBooked));
        assert!(matches!(
            dispatcher.decode(r#"{"type":1,"data":{"ID":"m1"}}"#),
            Ok(Some(_))
        ));
    }

    #[test]
    fn malformed_frames_are_errors() {
        let dispatcher = EventDispatcher::with_tangle_handlers();
        assert!(matches!(
            dispatcher.decode("not json"),
            Err(DecodeError::Envelope { .. })
        ));
        assert!(matches!(
            dispatcher.decode(r#"{"type":3,"data":{"ID":"m1"}}"#),
            Err(DecodeError::Payload {
                msg_type: MsgType::FutureMarkerUpdated,
                ..
            })
        ));
    }

    #[test]
    fn empty_dispatcher_skips_everything() {
        let dispatcher = EventDispatcher::new();
        assert!(matches!(
            dispatcher.decode(r#"{"type":0,"data":{"ID":"m1"}}"#),
            Ok(None)
        ));
    }
}
