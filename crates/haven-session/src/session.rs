//! The game session: one room's rules, state, and message fan-out.
//!
//! Every mutating method validates first and mutates second, so an `Err`
//! always means the request had no effect. On success it returns the
//! messages to deliver, each paired with a [`Recipient`].

use haven_protocol::{Phase, PlayerSlot, Recipient, ServerMessage};

use crate::board::Board;
use crate::state::{GameState, PlayerState, Verdict, pawn_views};
use crate::{GameConfig, GameError};

/// Messages produced by one request, in delivery order.
pub type Outbound = Vec<(Recipient, ServerMessage)>;

/// Authoritative state for one room.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub(crate) config: GameConfig,
    pub(crate) board: Board,
    pub(crate) state: GameState,
    pub(crate) players: [PlayerState; 2],
}

impl GameSession {
    /// A room with its host in slot 1, waiting for an opponent.
    pub fn new(config: GameConfig, host_name: impl Into<String>) -> Self {
        let config = config.validated();
        let board = Board::new(&config);
        Self {
            config,
            board,
            state: GameState::default(),
            players: [PlayerState::new(host_name), PlayerState::new("")],
        }
    }

    /// Seats the opponent in slot 2.
    pub fn add_opponent(&mut self, name: impl Into<String>) -> Result<PlayerSlot, GameError> {
        if self.state.phase != Phase::WaitingForOpponent {
            return Err(GameError::RoomFull);
        }
        self.players[PlayerSlot::Two.index()].name = name.into();
        self.state.phase = Phase::PreGame;
        Ok(PlayerSlot::Two)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn player(&self, slot: PlayerSlot) -> &PlayerState {
        &self.players[slot.index()]
    }

    pub fn players(&self) -> &[PlayerState; 2] {
        &self.players
    }

    pub fn is_finished(&self) -> bool {
        self.state.phase == Phase::GameOver
    }

    /// Marks `slot` ready. The second ready starts the game.
    pub fn ready(&mut self, slot: PlayerSlot) -> Result<Outbound, GameError> {
        self.expect_phase(matches!(self.state.phase, Phase::PreGame))?;

        let mut out = vec![(Recipient::All, ServerMessage::PlayerReadyAck { slot })];
        let player = &mut self.players[slot.index()];
        if player.ready {
            return Ok(out);
        }
        player.ready = true;

        if self.players.iter().all(|p| p.ready) {
            self.start(&mut out);
        }
        Ok(out)
    }

    fn start(&mut self, out: &mut Outbound) {
        for slot in PlayerSlot::ALL {
            self.players[slot.index()].deploy(slot, &self.board);
        }
        self.state.cycle_number = 1;
        self.state.round_number = 1;
        self.state.phase = Phase::Define { round: 1 };
        self.state.current_player = definer(1);

        tracing::info!(
            p1 = %self.players[0].name,
            p2 = %self.players[1].name,
            "game started"
        );
        out.push((
            Recipient::All,
            ServerMessage::GameStarted {
                phase: self.state.phase,
                cycle: self.state.cycle_number,
                round: self.state.round_number,
                current_player: self.state.current_player,
                board: self.board.info(),
                pawns: pawn_views(&self.players),
            },
        ));
    }

    /// Ends an in-play game because `leaver` disconnected. Returns the
    /// `gameOver` for the remaining player, or nothing outside play.
    pub fn forfeit(&mut self, leaver: PlayerSlot) -> Outbound {
        if !self.state.phase.is_in_play() {
            return Vec::new();
        }
        let winner = leaver.other();
        let verdict = Verdict {
            winner: Some(winner),
            reason: haven_protocol::GameOverReason::Forfeit,
        };
        self.finish(verdict);
        vec![(
            Recipient::Player(winner),
            ServerMessage::GameOver {
                winner: verdict.winner,
                reason: verdict.reason,
            },
        )]
    }

    /// A client's own win claim. Compared with the server's verdict and
    /// logged; never changes state.
    pub fn claim_win(&self, sender: PlayerSlot, winner: PlayerSlot) {
        match self.state.verdict {
            Some(verdict) if verdict.winner == Some(winner) => {
                tracing::info!(%sender, %winner, "client win claim matches verdict");
            }
            Some(verdict) => {
                tracing::warn!(
                    %sender,
                    claimed = %winner,
                    actual = ?verdict.winner,
                    "client win claim contradicts verdict"
                );
            }
            None => {
                tracing::warn!(
                    %sender,
                    claimed = %winner,
                    phase = %self.state.phase,
                    "client claims a win but the game is not over"
                );
            }
        }
    }

    pub(crate) fn finish(&mut self, verdict: Verdict) {
        tracing::info!(
            winner = ?verdict.winner,
            reason = ?verdict.reason,
            cycle = self.state.cycle_number,
            "game over"
        );
        self.state.phase = Phase::GameOver;
        self.state.verdict = Some(verdict);
    }

    pub(crate) fn expect_phase(&self, ok: bool) -> Result<(), GameError> {
        if ok {
            Ok(())
        } else {
            Err(GameError::WrongPhase {
                phase: self.state.phase,
            })
        }
    }

    pub(crate) fn expect_turn(&self, slot: PlayerSlot) -> Result<(), GameError> {
        if self.state.current_player == slot {
            Ok(())
        } else {
            Err(GameError::NotYourTurn {
                current: self.state.current_player,
            })
        }
    }
}

/// Who defines first in `round`: player 1 in odd rounds, player 2 in even.
pub fn definer(round: u8) -> PlayerSlot {
    if round % 2 == 1 {
        PlayerSlot::One
    } else {
        PlayerSlot::Two
    }
}
