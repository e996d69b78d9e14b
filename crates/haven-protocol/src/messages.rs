//! The message catalogue: every frame a client may send and every frame
//! the server may send back.
//!
//! Both directions are internally tagged by `"type"` with camelCase names
//! and camelCase fields, e.g.
//! `{"type":"linkCard","code":"K7QM2X","cardId":"a","pawnId":3}`.

use serde::{Deserialize, Serialize};

use crate::types::{
    ActionKind, ActionReport, ActionRequest, BoardInfo, CardId, CardSpec, GameOverReason, PawnId,
    PawnView, Phase, PlayerSlot, RevealTotals, RoomCode, RpsChoice,
};

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// Frames a client can send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Open a new room and take slot 1.
    CreateRoom { name: String },

    /// Take slot 2 of an existing room.
    JoinRoom { code: RoomCode, name: String },

    /// Signal readiness; the game starts once both slots are ready.
    PlayerReady { code: RoomCode },

    /// Submit this round's three cards.
    DefineCards { code: RoomCode, cards: Vec<CardSpec> },

    /// Attach one of this round's cards to an inactive pawn.
    LinkCard {
        code: RoomCode,
        card_id: CardId,
        pawn_id: PawnId,
    },

    /// Claim there is no legal (card, pawn) pair left to link.
    PlayerCannotLink { code: RoomCode },

    /// Throw rock, paper, or scissors. Kept as a string so an unknown
    /// throw is a gameplay error rather than an undecodable frame.
    SubmitRpsChoice { code: RoomCode, choice: String },

    /// Move or attack with one pawn.
    GameAction {
        code: RoomCode,
        action_type: ActionKind,
        pawn_id: PawnId,
        #[serde(default)]
        target_x: Option<i32>,
        #[serde(default)]
        target_y: Option<i32>,
        #[serde(default)]
        target_pawn_id: Option<PawnId>,
    },

    /// Claim no pawn of this side can act; re-runs turn advancement.
    PlayerCannotAct { code: RoomCode },

    /// Chat.
    SendMessage { code: RoomCode, text: String },

    /// A client's own win detection. Logged and cross-checked only.
    GameWon { code: RoomCode, winner: PlayerSlot },
}

impl ClientMessage {
    /// The room a message addresses, or `None` for `createRoom`.
    pub fn room_code(&self) -> Option<&RoomCode> {
        match self {
            Self::CreateRoom { .. } => None,
            Self::JoinRoom { code, .. }
            | Self::PlayerReady { code }
            | Self::DefineCards { code, .. }
            | Self::LinkCard { code, .. }
            | Self::PlayerCannotLink { code }
            | Self::SubmitRpsChoice { code, .. }
            | Self::GameAction { code, .. }
            | Self::PlayerCannotAct { code }
            | Self::SendMessage { code, .. }
            | Self::GameWon { code, .. } => Some(code),
        }
    }

    /// Extracts the action fields of a `gameAction` frame.
    pub fn action_request(&self) -> Option<ActionRequest> {
        match self {
            Self::GameAction {
                action_type,
                pawn_id,
                target_x,
                target_y,
                target_pawn_id,
                ..
            } => Some(ActionRequest {
                action_type: *action_type,
                pawn_id: *pawn_id,
                target_x: *target_x,
                target_y: *target_y,
                target_pawn_id: *target_pawn_id,
            }),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// Frames the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    // -- Room lifecycle --
    RoomCreated {
        code: RoomCode,
        slot: PlayerSlot,
    },
    RoomJoined {
        code: RoomCode,
        slot: PlayerSlot,
        opponent_name: String,
    },
    OpponentJoined {
        name: String,
    },
    PlayerReadyAck {
        slot: PlayerSlot,
    },
    GameStarted {
        phase: Phase,
        cycle: u32,
        round: u8,
        current_player: PlayerSlot,
        board: BoardInfo,
        pawns: Vec<PawnView>,
    },
    OpponentDisconnected {
        slot: PlayerSlot,
    },
    RoomClosed {
        reason: String,
    },

    // -- Setup --
    OpponentCardsReady {
        slot: PlayerSlot,
        current_player: PlayerSlot,
    },
    CardsRevealed {
        player1_cards: Vec<CardSpec>,
        player2_cards: Vec<CardSpec>,
        initiative: Option<PlayerSlot>,
        totals: RevealTotals,
    },
    StartRpsTiebreaker {
        round: u8,
    },
    RpsChoiceConfirmed {
        choice: RpsChoice,
    },
    WaitingForOpponentRpsChoice,
    RpsTie {
        round: u8,
        choice: RpsChoice,
    },
    RpsRoundResult {
        player1_choice: RpsChoice,
        player2_choice: RpsChoice,
        winner: PlayerSlot,
    },
    StartLinking {
        round: u8,
        current_player: PlayerSlot,
        initiative_player: PlayerSlot,
    },
    CardLinked {
        card_id: CardId,
        pawn_id: PawnId,
        slot: PlayerSlot,
        pawn: PawnView,
    },
    NextLinkTurn {
        current_player: PlayerSlot,
    },
    NextRound {
        round: u8,
        phase: Phase,
        current_player: PlayerSlot,
    },

    // -- Action phase --
    StartActionPhase {
        cycle: u32,
        current_player: PlayerSlot,
        cycle_initiative_player: PlayerSlot,
        pawns: Vec<PawnView>,
    },
    ActionPerformed(ActionReport),
    NextTurn {
        current_player: PlayerSlot,
    },
    NewCycle {
        cycle: u32,
        round: u8,
        phase: Phase,
        current_player: PlayerSlot,
    },
    GameOver {
        winner: Option<PlayerSlot>,
        reason: GameOverReason,
    },

    // -- Misc --
    NewMessage {
        slot: PlayerSlot,
        text: String,
        timestamp: u64,
    },
    Error {
        message: String,
    },
}

impl ServerMessage {
    /// Shorthand for an `error` frame.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}
