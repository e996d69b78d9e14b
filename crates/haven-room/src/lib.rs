//! Room lifecycle management for Haven.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns one
//! [`GameSession`](haven_session::GameSession). The [`RoomManager`] is the
//! registry in front of them.
//!
//! # Key types
//!
//! - [`RoomManager`]: creates rooms, seats connections, sweeps idle rooms
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`RoomConfig`]: timeouts and channel sizing
//! - [`PlayerSender`]: a connection's outbound queue

mod code;
mod config;
mod error;
mod manager;
mod room;

pub use code::{CODE_ALPHABET, CODE_LEN, MAX_NAME_LEN, display_name, generate_code};
pub use config::{RoomConfig, secs};
pub use error::RoomError;
pub use manager::{INACTIVITY_REASON, RoomManager, sweep_idle};
pub use room::{PlayerSender, RoomHandle, RoomInfo};
