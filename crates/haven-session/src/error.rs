//! Error types for the game session.

use haven_protocol::{CardId, PawnId, Phase, PlayerSlot};

/// Why a player's request was rejected.
///
/// Every variant is recoverable: the request has had no effect on the game
/// and the message text goes back to the sender as an `error` frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// Both seats are already taken.
    #[error("room is full")]
    RoomFull,

    /// It is the other player's turn.
    #[error("not your turn (waiting for {current})")]
    NotYourTurn { current: PlayerSlot },

    /// The request does not belong to the current phase.
    #[error("cannot do that during {phase}")]
    WrongPhase { phase: Phase },

    /// Off-board, occupied, non-adjacent, or otherwise unusable target.
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// No such pawn in the sender's roster (or the opponent's, for attack
    /// targets).
    #[error("{0} not found")]
    PawnNotFound(PawnId),

    /// The pawn has no card linked this cycle.
    #[error("{0} is not active")]
    PawnNotActive(PawnId),

    /// The pawn already carries a card this cycle.
    #[error("{0} is already active")]
    PawnAlreadyActive(PawnId),

    /// The pawn cannot pay for this action.
    #[error("{pawn} needs {needed} stamina but has {remaining}")]
    InsufficientStamina {
        pawn: PawnId,
        needed: u32,
        remaining: u32,
    },

    /// No card with this id in the sender's current round.
    #[error("card {0} not found")]
    CardNotFound(CardId),

    /// The card was linked earlier this round.
    #[error("card {0} is already linked")]
    CardAlreadyLinked(CardId),

    /// A submitted card set breaks the count, budget, or uniqueness rules.
    #[error("invalid card set: {0}")]
    InvalidCardSet(String),

    /// Not rock, paper, or scissors.
    #[error("invalid rps choice {0:?}")]
    InvalidRpsChoice(String),

    /// The sender already threw in this tiebreaker attempt.
    #[error("you already chose")]
    AlreadyChose,

    /// A "cannot link" claim from a player who still has a legal pair.
    #[error("you still have a card and a pawn to link")]
    LegalOptionAvailable,
}
