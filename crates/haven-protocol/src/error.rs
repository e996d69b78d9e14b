//! Error types for the protocol layer.

/// Errors that can occur while encoding, decoding, or interpreting a frame.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serializing an outbound message failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The frame is not valid JSON or does not match any known message.
    ///
    /// Common causes: unknown `type` tag, missing required fields, wrong
    /// field types.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame decoded but one of its values is out of range, e.g. a
    /// player slot other than 1 or 2.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
