//! Wire protocol for the Haven game server.
//!
//! This crate defines the "language" clients and the server speak:
//!
//! - **Messages** ([`ClientMessage`], [`ServerMessage`]): the full
//!   catalogue of frames in each direction.
//! - **Types** ([`PlayerSlot`], [`RoomCode`], [`Phase`], [`PawnView`], ...):
//!   identities and value types those frames carry.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how frames become bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! The protocol layer knows nothing about sockets or rooms.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientMessage) → Room → Game session
//! ```

mod codec;
mod error;
mod messages;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use messages::{ClientMessage, ServerMessage};
pub use types::{
    ActionKind, ActionReport, ActionRequest, BoardInfo, CardId, CardSpec, CardTotals,
    DamageReport, GameOverReason, PawnId, PawnStatus, PawnView, Phase, PlayerSlot, Position,
    Recipient, RevealTotals, RoomCode, RpsChoice,
};
