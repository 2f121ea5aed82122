//! Error types for the model layer.
//!
//! Each crate in Chasemap defines its own error enum. A `ModelError`
//! always means the snapshot itself is the problem: bytes that are not a
//! game document, a timestamp we can't read, or a document that parses
//! but breaks a structural rule.

/// Errors that can occur while encoding, decoding, or checking a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Serialization failed (turning a Rust value into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust value).
    ///
    /// Common causes: truncated files or missing required fields such as
    /// `players` or `game.name`.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A timestamp string matched none of the accepted layouts.
    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    /// The document parsed but violates a structural rule
    /// (duplicate user ids, negative POI range, ...).
    #[error("invalid document: {0}")]
    Invalid(String),
}
