//! Room actor: an isolated Tokio task that owns one game session.
//!
//! Every request for a room goes through its command channel, so the
//! session only ever sees one request at a time.

use std::time::{SystemTime, UNIX_EPOCH};

use haven_protocol::{
    ActionRequest, ClientMessage, Phase, PlayerSlot, Recipient, RoomCode, ServerMessage,
};
use haven_session::{GameError, GameSession, Outbound};
use haven_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::RoomError;

/// Channel sender for delivering outbound messages to a player's
/// connection writer.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    /// Seat a second player.
    Join {
        conn: ConnectionId,
        name: String,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<PlayerSlot, RoomError>>,
    },

    /// A game or chat message from a seated player.
    Message { slot: PlayerSlot, msg: ClientMessage },

    /// A seated player disconnected. The room forfeits if needed and stops.
    Leave {
        slot: PlayerSlot,
        reply: oneshot::Sender<()>,
    },

    /// Request a metadata snapshot.
    GetInfo { reply: oneshot::Sender<RoomInfo> },

    /// Notify everyone with `roomClosed` and stop.
    Close { reason: String },
}

/// A snapshot of room metadata.
#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub code: RoomCode,
    pub phase: Phase,
    pub cycle: u32,
    /// Seated connections, slot 1 first.
    pub players: Vec<(PlayerSlot, ConnectionId)>,
    pub last_activity: Instant,
}

impl RoomInfo {
    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}

/// Handle to a running room actor. Cheap to clone.
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub(crate) fn new(code: RoomCode, sender: mpsc::Sender<RoomCommand>) -> Self {
        Self { code, sender }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.code.clone())
    }

    /// Seats `conn` in slot 2.
    pub async fn join(
        &self,
        conn: ConnectionId,
        name: String,
        sender: PlayerSender,
    ) -> Result<PlayerSlot, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                conn,
                name,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Forwards a message from `slot` (fire-and-forget; errors go back to
    /// the player as `error` frames).
    pub async fn send_message(
        &self,
        slot: PlayerSlot,
        msg: ClientMessage,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Message { slot, msg })
            .await
            .map_err(|_| self.unavailable())
    }

    /// Tells the room `slot` is gone and waits for it to wind down.
    pub async fn leave(&self, slot: PlayerSlot) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Leave {
                slot,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    pub async fn get_info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::GetInfo { reply: reply_tx })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Closes the room, telling seated players why.
    pub async fn close(&self, reason: impl Into<String>) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Close {
                reason: reason.into(),
            })
            .await
            .map_err(|_| self.unavailable())
    }
}

struct Seat {
    conn: ConnectionId,
    sender: PlayerSender,
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    code: RoomCode,
    session: GameSession,
    seats: [Option<Seat>; 2],
    last_activity: Instant,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(code = %self.code, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    conn,
                    name,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(conn, name, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Message { slot, msg } => {
                    self.last_activity = Instant::now();
                    self.handle_message(slot, msg);
                }
                RoomCommand::Leave { slot, reply } => {
                    self.handle_leave(slot);
                    let _ = reply.send(());
                    break;
                }
                RoomCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::Close { reason } => {
                    tracing::info!(code = %self.code, %reason, "room closing");
                    self.dispatch(vec![(Recipient::All, ServerMessage::RoomClosed { reason })]);
                    break;
                }
            }
        }

        tracing::info!(code = %self.code, "room actor stopped");
    }

    fn handle_join(
        &mut self,
        conn: ConnectionId,
        name: String,
        sender: PlayerSender,
    ) -> Result<PlayerSlot, RoomError> {
        let slot = self.session.add_opponent(name.clone()).map_err(|e| match e {
            GameError::RoomFull => RoomError::RoomFull(self.code.clone()),
            other => {
                tracing::warn!(code = %self.code, error = %other, "unexpected join failure");
                RoomError::RoomFull(self.code.clone())
            }
        })?;
        self.seats[slot.index()] = Some(Seat { conn, sender });
        self.last_activity = Instant::now();

        let host = self.session.player(PlayerSlot::One).name.clone();
        tracing::info!(code = %self.code, %conn, %slot, "player joined");
        self.dispatch(vec![
            (
                Recipient::Player(slot),
                ServerMessage::RoomJoined {
                    code: self.code.clone(),
                    slot,
                    opponent_name: host,
                },
            ),
            (
                Recipient::AllExcept(slot),
                ServerMessage::OpponentJoined { name },
            ),
        ]);
        Ok(slot)
    }

    fn handle_message(&mut self, slot: PlayerSlot, msg: ClientMessage) {
        let result = match msg {
            ClientMessage::PlayerReady { .. } => self.session.ready(slot),
            ClientMessage::DefineCards { cards, .. } => self.session.define_cards(slot, cards),
            ClientMessage::LinkCard {
                card_id, pawn_id, ..
            } => self.session.link_card(slot, &card_id, pawn_id),
            ClientMessage::PlayerCannotLink { .. } => self.session.cannot_link(slot),
            ClientMessage::SubmitRpsChoice { choice, .. } => {
                self.session.submit_rps_choice(slot, &choice)
            }
            ClientMessage::GameAction {
                action_type,
                pawn_id,
                target_x,
                target_y,
                target_pawn_id,
                ..
            } => {
                let req = ActionRequest {
                    action_type,
                    pawn_id,
                    target_x,
                    target_y,
                    target_pawn_id,
                };
                self.session.perform_action(slot, &req)
            }
            ClientMessage::PlayerCannotAct { .. } => self.session.cannot_act(slot),
            ClientMessage::SendMessage { text, .. } => Ok(vec![(
                Recipient::All,
                ServerMessage::NewMessage {
                    slot,
                    text,
                    timestamp: unix_millis(),
                },
            )]),
            ClientMessage::GameWon { winner, .. } => {
                self.session.claim_win(slot, winner);
                Ok(Outbound::new())
            }
            ClientMessage::CreateRoom { .. } | ClientMessage::JoinRoom { .. } => {
                self.send_to(slot, ServerMessage::error("already in a room"));
                return;
            }
        };

        match result {
            Ok(msgs) => self.dispatch(msgs),
            Err(e) => {
                tracing::debug!(code = %self.code, %slot, error = %e, "request rejected");
                self.send_to(slot, ServerMessage::error(e.to_string()));
            }
        }
    }

    fn handle_leave(&mut self, slot: PlayerSlot) {
        if let Some(seat) = self.seats[slot.index()].take() {
            tracing::info!(code = %self.code, conn = %seat.conn, %slot, "player left");
        }
        let mut msgs = self.session.forfeit(slot);
        msgs.push((
            Recipient::AllExcept(slot),
            ServerMessage::OpponentDisconnected { slot },
        ));
        self.dispatch(msgs);
    }

    /// Dispatches outbound messages to the correct seats.
    fn dispatch(&self, msgs: Outbound) {
        for (recipient, msg) in msgs {
            for slot in PlayerSlot::ALL {
                if recipient.includes(slot) {
                    self.send_to(slot, msg.clone());
                }
            }
        }
    }

    /// Sends to one seat. Silently drops if the seat is empty or its
    /// writer is gone.
    fn send_to(&self, slot: PlayerSlot, msg: ServerMessage) {
        if let Some(seat) = &self.seats[slot.index()] {
            let _ = seat.sender.send(msg);
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            code: self.code.clone(),
            phase: self.session.phase(),
            cycle: self.session.state().cycle_number,
            players: PlayerSlot::ALL
                .into_iter()
                .filter_map(|slot| self.seats[slot.index()].as_ref().map(|s| (slot, s.conn)))
                .collect(),
            last_activity: self.last_activity,
        }
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Spawns a room actor with `host` already in slot 1.
pub(crate) fn spawn_room(
    code: RoomCode,
    session: GameSession,
    host: ConnectionId,
    host_sender: PlayerSender,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        code: code.clone(),
        session,
        seats: [
            Some(Seat {
                conn: host,
                sender: host_sender,
            }),
            None,
        ],
        last_activity: Instant::now(),
        receiver: rx,
    };
    actor.send_to(
        PlayerSlot::One,
        ServerMessage::RoomCreated {
            code: code.clone(),
            slot: PlayerSlot::One,
        },
    );

    tokio::spawn(actor.run());

    RoomHandle::new(code, tx)
}
