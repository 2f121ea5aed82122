//! Codec trait and implementations for snapshot and view bytes.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The store decodes game documents with it and the server encodes views
//! with it; neither cares which format sits underneath.

use serde::{de::DeserializeOwned, Serialize};

use crate::ModelError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` lets one codec value live in shared server
/// state and be used from any Tokio worker thread.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ModelError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ModelError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ModelError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ModelError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`, the format the game bot exports.
///
/// Behind the `json` feature flag (enabled by default).
///
/// ```rust
/// use chasemap_model::{Codec, GameDocument, JsonCodec};
///
/// let raw = br#"{"game": {"id": 1, "name": "Test", "status": "created"}, "players": []}"#;
/// let doc: GameDocument = JsonCodec.decode(raw).unwrap();
/// assert_eq!(doc.game.name, "Test");
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ModelError> {
        serde_json::to_vec(value).map_err(ModelError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ModelError> {
        serde_json::from_slice(data).map_err(ModelError::Decode)
    }
}
