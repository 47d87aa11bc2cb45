//! Codec trait and implementations for serializing/deserializing events.
//!
//! The rest of the server never calls `serde_json` directly; it goes
//! through a [`Codec`] so the wire format can be swapped without touching
//! the router or the connection handler.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or
    /// don't match the expected type, and `ProtocolError::InvalidMessage`
    /// for an empty frame.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Browsers speak JSON natively, so this is what the chat client uses.
///
/// ## Example
///
/// ```rust
/// use roomcast_protocol::{ClientEvent, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let frame = br#"{"event":"activity","data":"Alice"}"#;
///
/// let event: ClientEvent = codec.decode(frame).unwrap();
/// assert_eq!(event, ClientEvent::Activity("Alice".into()));
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        if data.iter().all(u8::is_ascii_whitespace) {
            return Err(ProtocolError::InvalidMessage("empty frame".into()));
        }
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ChatMessage, ClientEvent, ServerEvent};

    #[test]
    fn test_encode_server_event_is_utf8_json() {
        let event = ServerEvent::Message(ChatMessage::new("Admin", "hi", "3:45 PM"));
        let bytes = JsonCodec.encode(&event).unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.starts_with(r#"{"event":"message""#));
    }

    #[test]
    fn test_decode_client_event() {
        let event: ClientEvent = JsonCodec
            .decode(br#"{"event":"enterRoom","data":{"name":"Alice","room":"lobby"}}"#)
            .unwrap();
        assert_eq!(
            event,
            ClientEvent::EnterRoom {
                name: "Alice".into(),
                room: "lobby".into()
            }
        );
    }

    #[test]
    fn test_decode_empty_frame_is_invalid() {
        let result: Result<ClientEvent, _> = JsonCodec.decode(b"  ");
        assert!(matches!(result, Err(ProtocolError::InvalidMessage(_))));
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let result: Result<ClientEvent, _> = JsonCodec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
