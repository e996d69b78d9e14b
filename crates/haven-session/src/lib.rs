//! Authoritative game rules for one Haven room.
//!
//! A [`GameSession`] owns the board, both players' rosters and cards, and
//! the phase machine. It is plain synchronous code: the room actor feeds
//! it one request at a time and delivers whatever messages it returns.
//!
//! # Key types
//!
//! - [`GameSession`]: the state machine and its request handlers
//! - [`Board`]: geometry, starting zones, havens
//! - [`Pawn`], [`Card`]: the pieces and this round's cards
//! - [`TurnOutcome`] / [`next_turn`]: who acts next in the action phase
//! - [`GameConfig`]: tunable rules
//! - [`GameError`]: why a request was rejected

mod action;
mod board;
mod config;
mod error;
mod session;
mod setup;
mod state;
mod turn;
mod unit;

pub use action::victory;
pub use board::Board;
pub use config::GameConfig;
pub use error::GameError;
pub use session::{GameSession, Outbound, definer};
pub use setup::decide_initiative;
pub use state::{GameState, PAWN_ID_STRIDE, PlayerState, RpsState, Verdict, pawn_views};
pub use turn::{TurnOutcome, attack_targets, can_act, next_turn, occupant, valid_moves};
pub use unit::{Card, Pawn, totals, validate_card_set};
