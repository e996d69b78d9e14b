//! Unified error type for the Haven server.

use std::path::PathBuf;

use haven_protocol::ProtocolError;
use haven_room::RoomError;
use haven_session::GameError;
use haven_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// Only the binary and the accept loop see this; per-request failures are
/// turned into `error` frames long before they get here.
#[derive(Debug, thiserror::Error)]
pub enum HavenError {
    /// A transport-level error (connection, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A rejected gameplay request.
    #[error(transparent)]
    Game(#[from] GameError),

    /// A room-level error (not found, full, not seated).
    #[error(transparent)]
    Room(#[from] RoomError),

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
