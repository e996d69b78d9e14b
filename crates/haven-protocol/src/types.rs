//! Value types shared by the wire messages and the game session.
//!
//! Everything here is plain data: identities, coordinates, the phase enum,
//! and the views of pawns and cards that clients render.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// One of the two seats in a room.
///
/// Serialized as the bare integers `1` and `2`, which is what clients use
/// for `slot`, `currentPlayer`, `winner`, and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PlayerSlot {
    One,
    Two,
}

impl PlayerSlot {
    /// Both slots in seat order.
    pub const ALL: [PlayerSlot; 2] = [PlayerSlot::One, PlayerSlot::Two];

    /// The opposing seat.
    pub fn other(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    /// Zero-based index, for `[T; 2]` per-player storage.
    pub fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }
}

impl TryFrom<u8> for PlayerSlot {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(ProtocolError::InvalidMessage(format!(
                "player slot must be 1 or 2, got {other}"
            ))),
        }
    }
}

impl From<PlayerSlot> for u8 {
    fn from(slot: PlayerSlot) -> u8 {
        match slot {
            PlayerSlot::One => 1,
            PlayerSlot::Two => 2,
        }
    }
}

impl fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", u8::from(*self))
    }
}

/// Short human-shareable room code, e.g. `"K7QM2X"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Wraps a code verbatim.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Trims whitespace and upper-cases, so `" k7qm2x"` finds `"K7QM2X"`.
    pub fn normalized(&self) -> Self {
        Self(self.0.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-assigned pawn identity, unique within a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PawnId(pub u32);

impl fmt::Display for PawnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pawn-{}", self.0)
    }
}

/// Client-chosen card identity, unique within one player's submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub String);

impl CardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A board cell. Signed so off-board requests can be represented and
/// rejected instead of failing to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to `other`.
    pub fn distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The four orthogonal neighbours (possibly off-board).
    pub fn neighbors(self) -> [Position; 4] {
        [
            Position::new(self.x + 1, self.y),
            Position::new(self.x - 1, self.y),
            Position::new(self.x, self.y + 1),
            Position::new(self.x, self.y - 1),
        ]
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where a room is in its lifecycle.
///
/// ```text
/// WaitingForOpponent → PreGame → { Define(r) → Linking(r) [← RpsTiebreaker(r)] } × 3
///                                 → Action → (Define(1) of the next cycle) | GameOver
/// ```
///
/// JSON: `{"kind":"linking","round":2}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Phase {
    WaitingForOpponent,
    PreGame,
    Define { round: u8 },
    RpsTiebreaker { round: u8 },
    Linking { round: u8 },
    Action,
    GameOver,
}

impl Phase {
    /// The setup round this phase belongs to, if any.
    pub fn round(self) -> Option<u8> {
        match self {
            Self::Define { round } | Self::RpsTiebreaker { round } | Self::Linking { round } => {
                Some(round)
            }
            _ => None,
        }
    }

    /// `true` once both players readied up and until the game ends.
    pub fn is_in_play(self) -> bool {
        !matches!(self, Self::WaitingForOpponent | Self::PreGame | Self::GameOver)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WaitingForOpponent => write!(f, "WaitingForOpponent"),
            Self::PreGame => write!(f, "PreGame"),
            Self::Define { round } => write!(f, "Define({round})"),
            Self::RpsTiebreaker { round } => write!(f, "RpsTiebreaker({round})"),
            Self::Linking { round } => write!(f, "Linking({round})"),
            Self::Action => write!(f, "Action"),
            Self::GameOver => write!(f, "GameOver"),
        }
    }
}

// ---------------------------------------------------------------------------
// Rock-paper-scissors
// ---------------------------------------------------------------------------

/// A tiebreaker throw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RpsChoice {
    Rock,
    Paper,
    Scissors,
}

impl RpsChoice {
    /// Standard beats-relation.
    pub fn beats(self, other: RpsChoice) -> bool {
        matches!(
            (self, other),
            (Self::Rock, Self::Scissors) | (Self::Paper, Self::Rock) | (Self::Scissors, Self::Paper)
        )
    }
}

impl FromStr for RpsChoice {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rock" => Ok(Self::Rock),
            "paper" => Ok(Self::Paper),
            "scissors" => Ok(Self::Scissors),
            _ => Err(ProtocolError::InvalidMessage(format!("unknown rps choice {s:?}"))),
        }
    }
}

impl fmt::Display for RpsChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rock => write!(f, "rock"),
            Self::Paper => write!(f, "paper"),
            Self::Scissors => write!(f, "scissors"),
        }
    }
}

// ---------------------------------------------------------------------------
// Cards and pawns as seen on the wire
// ---------------------------------------------------------------------------

/// A card as defined by a player: three stats that must sum to the budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSpec {
    pub id: CardId,
    pub hp: u32,
    pub stamina: u32,
    pub attack: u32,
}

/// Sum of a player's three cards for the initiative check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardTotals {
    pub total_attack: u32,
    pub total_stamina: u32,
}

/// Both sides' totals, sent with `cardsRevealed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealTotals {
    pub player1: CardTotals,
    pub player2: CardTotals,
}

/// Client-facing snapshot of a pawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PawnView {
    pub id: PawnId,
    pub owner: PlayerSlot,
    pub x: i32,
    pub y: i32,
    pub is_active: bool,
    pub current_hp: Option<i32>,
    pub remaining_stamina: Option<u32>,
    pub linked_card: Option<CardSpec>,
}

/// Static board geometry, sent once with `gameStarted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardInfo {
    pub width: i32,
    pub height: i32,
    /// Goal cells player 1 must reach.
    pub player1_haven: Vec<Position>,
    /// Goal cells player 2 must reach.
    pub player2_haven: Vec<Position>,
    pub haven_threshold: usize,
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// The two things a pawn can do on its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Move,
    Attack,
}

/// An inbound action request, as flat as the wire format it comes from.
///
/// Moves need `target_x`/`target_y`. Attacks need `target_pawn_id` and may
/// carry `target_x`/`target_y` as a reposition destination beyond the cell
/// the defender vacates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub action_type: ActionKind,
    pub pawn_id: PawnId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_y: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_pawn_id: Option<PawnId>,
}

/// Damage exchanged by one attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageReport {
    pub attacker_id: PawnId,
    pub defender_id: PawnId,
    pub dmg_to_attacker: u32,
    pub dmg_to_defender: u32,
}

/// The acting pawn's numbers after the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PawnStatus {
    pub current_hp: Option<i32>,
    pub remaining_stamina: Option<u32>,
}

/// Payload of `actionPerformed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionReport {
    pub action_type: ActionKind,
    pub pawn_id: PawnId,
    pub acting_player: PlayerSlot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_y: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_pawn_id: Option<PawnId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_dealt: Option<DamageReport>,
    pub eliminated_pawn_ids: Vec<PawnId>,
    pub updated_pawn: PawnStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attacker_moved_to: Option<Position>,
}

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameOverReason {
    /// The losing side has no pawns left (or neither side does: a draw).
    Elimination,
    /// The winner occupied enough of its haven cells.
    Haven,
    /// The opponent disconnected mid-game.
    Forfeit,
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who should receive an outbound message produced by a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Both seated players.
    All,
    /// One seat only.
    Player(PlayerSlot),
    /// Everyone except this seat.
    AllExcept(PlayerSlot),
}

impl Recipient {
    /// Returns `true` if a message addressed this way reaches `slot`.
    pub fn includes(self, slot: PlayerSlot) -> bool {
        match self {
            Self::All => true,
            Self::Player(target) => target == slot,
            Self::AllExcept(excluded) => excluded != slot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_slot_serializes_as_plain_number() {
        assert_eq!(serde_json::to_string(&PlayerSlot::Two).unwrap(), "2");
        let slot: PlayerSlot = serde_json::from_str("1").unwrap();
        assert_eq!(slot, PlayerSlot::One);
    }

    #[test]
    fn test_player_slot_rejects_out_of_range() {
        let result: Result<PlayerSlot, _> = serde_json::from_str("3");
        assert!(result.is_err());
    }

    #[test]
    fn test_player_slot_other_and_index() {
        assert_eq!(PlayerSlot::One.other(), PlayerSlot::Two);
        assert_eq!(PlayerSlot::Two.other(), PlayerSlot::One);
        assert_eq!(PlayerSlot::Two.index(), 1);
        assert_eq!(PlayerSlot::One.to_string(), "P1");
    }

    #[test]
    fn test_room_code_normalized() {
        let code = RoomCode::new("  k7qm2x ");
        assert_eq!(code.normalized(), RoomCode::new("K7QM2X"));
    }

    #[test]
    fn test_position_distance_and_neighbors() {
        let a = Position::new(1, 1);
        assert_eq!(a.distance(Position::new(4, 3)), 5);
        assert!(a.neighbors().iter().all(|n| n.distance(a) == 1));
    }

    #[test]
    fn test_phase_json_shape() {
        let json = serde_json::to_value(Phase::Linking { round: 2 }).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "linking", "round": 2}));

        let json = serde_json::to_value(Phase::WaitingForOpponent).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "waitingForOpponent"}));
    }

    #[test]
    fn test_phase_round_and_in_play() {
        assert_eq!(Phase::RpsTiebreaker { round: 3 }.round(), Some(3));
        assert_eq!(Phase::Action.round(), None);
        assert!(Phase::Define { round: 1 }.is_in_play());
        assert!(!Phase::PreGame.is_in_play());
        assert!(!Phase::GameOver.is_in_play());
    }

    #[test]
    fn test_rps_beats_relation() {
        use RpsChoice::*;
        assert!(Rock.beats(Scissors));
        assert!(Paper.beats(Rock));
        assert!(Scissors.beats(Paper));
        assert!(!Rock.beats(Rock));
        assert!(!Scissors.beats(Rock));
    }

    #[test]
    fn test_rps_from_str_is_case_insensitive() {
        assert_eq!("ROCK".parse::<RpsChoice>().unwrap(), RpsChoice::Rock);
        assert_eq!(" paper ".parse::<RpsChoice>().unwrap(), RpsChoice::Paper);
        assert!("lizard".parse::<RpsChoice>().is_err());
    }

    #[test]
    fn test_action_report_omits_absent_fields() {
        let report = ActionReport {
            action_type: ActionKind::Move,
            pawn_id: PawnId(3),
            acting_player: PlayerSlot::One,
            target_x: Some(2),
            target_y: Some(4),
            target_pawn_id: None,
            damage_dealt: None,
            eliminated_pawn_ids: vec![],
            updated_pawn: PawnStatus {
                current_hp: Some(2),
                remaining_stamina: Some(1),
            },
            attacker_moved_to: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["actionType"], "move");
        assert_eq!(json["targetX"], 2);
        assert!(json.get("damageDealt").is_none());
        assert!(json.get("attackerMovedTo").is_none());
        assert_eq!(json["updatedPawn"]["remainingStamina"], 1);
    }

    #[test]
    fn test_recipient_includes() {
        assert!(Recipient::All.includes(PlayerSlot::Two));
        assert!(Recipient::Player(PlayerSlot::One).includes(PlayerSlot::One));
        assert!(!Recipient::Player(PlayerSlot::One).includes(PlayerSlot::Two));
        assert!(!Recipient::AllExcept(PlayerSlot::Two).includes(PlayerSlot::Two));
    }
}
