//! # Haven
//!
//! Authoritative server for Haven, a two-player grid combat game played
//! over WebSocket.
//!
//! Clients only send intentions (`defineCards`, `linkCard`, `gameAction`,
//! ...). Each room owns its [`GameSession`](haven_session::GameSession),
//! validates every request against the rules, and broadcasts the
//! resulting events.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use haven::prelude::*;
//!
//! # async fn start() -> Result<(), HavenError> {
//! let server = HavenServer::<JsonCodec>::builder()
//!     .config(ServerConfig::from_env()?)
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{BIND_ENV, CONFIG_ENV, ServerConfig};
pub use error::HavenError;
pub use server::{HavenServer, HavenServerBuilder};

/// Everything a binary or integration test usually needs.
pub mod prelude {
    pub use crate::{HavenError, HavenServer, HavenServerBuilder, ServerConfig};
    pub use haven_protocol::{
        ClientMessage, Codec, JsonCodec, Phase, PlayerSlot, RoomCode, ServerMessage,
    };
    pub use haven_room::RoomConfig;
    pub use haven_session::GameConfig;
}
