//! Room registry: creates rooms, seats connections, routes messages,
//! and evicts idle rooms.

use std::collections::HashMap;

use haven_protocol::{ClientMessage, PlayerSlot, RoomCode};
use haven_session::{GameConfig, GameSession};
use haven_transport::ConnectionId;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::code::{display_name, generate_code};
use crate::room::spawn_room;
use crate::{PlayerSender, RoomConfig, RoomError, RoomHandle, RoomInfo};

/// Reason sent with `roomClosed` when the sweep evicts a room.
pub const INACTIVITY_REASON: &str = "closed after inactivity";

/// Tracks every live room and which connection sits where.
///
/// A connection is seated in at most one room at a time.
pub struct RoomManager {
    config: RoomConfig,
    game_config: GameConfig,
    /// Live rooms, keyed by code.
    rooms: HashMap<RoomCode, RoomHandle>,
    /// Where each seated connection sits.
    seats: HashMap<ConnectionId, (RoomCode, PlayerSlot)>,
}

impl RoomManager {
    pub fn new(config: RoomConfig, game_config: GameConfig) -> Self {
        Self {
            config: config.validated(),
            game_config: game_config.validated(),
            rooms: HashMap::new(),
            seats: HashMap::new(),
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Opens a room with `conn` in slot 1. The room greets the host with
    /// `roomCreated`.
    pub fn create_room(
        &mut self,
        conn: ConnectionId,
        name: &str,
        sender: PlayerSender,
    ) -> Result<RoomCode, RoomError> {
        if let Some((code, _)) = self.seats.get(&conn) {
            return Err(RoomError::AlreadyInRoom(conn, code.clone()));
        }

        let code = self.unique_code();
        let session = GameSession::new(
            self.game_config.clone(),
            display_name(name, PlayerSlot::One),
        );
        let handle = spawn_room(code.clone(), session, conn, sender, self.config.channel_size);
        self.rooms.insert(code.clone(), handle);
        self.seats.insert(conn, (code.clone(), PlayerSlot::One));

        tracing::info!(%code, %conn, rooms = self.rooms.len(), "room created");
        Ok(code)
    }

    /// Seats `conn` in slot 2 of the room with `code` (normalized first).
    pub async fn join_room(
        &mut self,
        conn: ConnectionId,
        code: &RoomCode,
        name: &str,
        sender: PlayerSender,
    ) -> Result<PlayerSlot, RoomError> {
        if let Some((current, _)) = self.seats.get(&conn) {
            return Err(RoomError::AlreadyInRoom(conn, current.clone()));
        }

        let code = code.normalized();
        let handle = self
            .rooms
            .get(&code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        let slot = handle
            .join(conn, display_name(name, PlayerSlot::Two), sender)
            .await?;
        self.seats.insert(conn, (code, slot));
        Ok(slot)
    }

    /// Forwards a message from `conn` to the room it sits in. The message
    /// must address that room.
    pub async fn route(&self, conn: ConnectionId, msg: ClientMessage) -> Result<(), RoomError> {
        let addressed = msg
            .room_code()
            .map(RoomCode::normalized)
            .unwrap_or_else(|| RoomCode::new(""));
        let (code, slot) = self
            .seats
            .get(&conn)
            .filter(|(code, _)| *code == addressed)
            .ok_or_else(|| RoomError::NotInRoom(conn, addressed.clone()))?;

        let handle = self
            .rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        handle.send_message(*slot, msg).await
    }

    /// Handles a dropped connection. The whole room goes away: the
    /// remaining player is told (and wins by forfeit if the game was on),
    /// then unseated.
    pub async fn disconnect(&mut self, conn: ConnectionId) -> Option<RoomCode> {
        let (code, slot) = self.seats.remove(&conn)?;
        self.seats.retain(|_, (c, _)| *c != code);

        if let Some(handle) = self.rooms.remove(&code) {
            if let Err(e) = handle.leave(slot).await {
                tracing::debug!(%code, error = %e, "room already gone on disconnect");
            }
        }
        tracing::info!(%code, %conn, %slot, rooms = self.rooms.len(), "room torn down");
        Some(code)
    }

    pub fn room_handles(&self) -> Vec<RoomHandle> {
        self.rooms.values().cloned().collect()
    }

    /// Drops the rooms in `codes` from the registry and unseats their
    /// players. Returns the handles that were still registered.
    fn evict(&mut self, codes: &[RoomCode]) -> Vec<RoomHandle> {
        let evicted: Vec<RoomHandle> = codes
            .iter()
            .filter_map(|code| self.rooms.remove(code))
            .collect();
        self.seats.retain(|_, (c, _)| !evicted.iter().any(|h| *h.code() == *c));
        evicted
    }

    pub async fn get_room_info(&self, code: &RoomCode) -> Result<RoomInfo, RoomError> {
        let code = code.normalized();
        let handle = self
            .rooms
            .get(&code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        handle.get_info().await
    }

    /// The room and slot `conn` sits in, if any.
    pub fn seat_of(&self, conn: ConnectionId) -> Option<(RoomCode, PlayerSlot)> {
        self.seats.get(&conn).cloned()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn room_codes(&self) -> Vec<RoomCode> {
        self.rooms.keys().cloned().collect()
    }

    fn unique_code(&self) -> RoomCode {
        let mut rng = rand::rng();
        loop {
            let code = generate_code(&mut rng);
            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
    }
}

impl Default for RoomManager {
    fn default() -> Self {
        Self::new(RoomConfig::default(), GameConfig::default())
    }
}

/// Closes every room idle for longer than the configured timeout and
/// returns their codes.
///
/// The registry is locked only to snapshot the handles and to evict;
/// rooms are queried with the lock released.
pub async fn sweep_idle(rooms: &Mutex<RoomManager>) -> Vec<RoomCode> {
    let (handles, timeout) = {
        let mgr = rooms.lock().await;
        (mgr.room_handles(), mgr.config.inactivity_timeout)
    };

    let now = Instant::now();
    let mut stale = Vec::new();
    for handle in &handles {
        match handle.get_info().await {
            Ok(info) if now.duration_since(info.last_activity) < timeout => {}
            _ => stale.push(handle.code().clone()),
        }
    }
    if stale.is_empty() {
        return stale;
    }

    let evicted = rooms.lock().await.evict(&stale);
    let mut closed = Vec::with_capacity(evicted.len());
    for handle in evicted {
        let code = handle.code().clone();
        if let Err(e) = handle.close(INACTIVITY_REASON).await {
            tracing::debug!(%code, error = %e, "room already gone on sweep");
        }
        tracing::info!(%code, "idle room closed");
        closed.push(code);
    }
    closed
}
