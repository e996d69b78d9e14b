//! Per-player and per-game mutable state.

use std::collections::BTreeSet;

use haven_protocol::{
    CardSpec, GameOverReason, PawnId, PawnView, Phase, PlayerSlot, Position, RpsChoice,
};

use crate::board::Board;
use crate::unit::{Card, Pawn};

/// Offset between the two sides' pawn ids: slot 1 owns `1..=N`, slot 2
/// owns `101..=100+N`.
pub const PAWN_ID_STRIDE: u32 = 100;

/// Everything one seat owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    pub name: String,
    pub ready: bool,
    /// This round's cards. Empty until the player defines, cleared when
    /// the round's linking ends.
    pub cards: Vec<Card>,
    /// Surviving pawns. Fixed at game start, shrinks only by elimination.
    pub pawns: Vec<Pawn>,
    /// Pawns linked during the current cycle.
    pub activated: BTreeSet<PawnId>,
}

impl PlayerState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ready: false,
            cards: Vec::new(),
            pawns: Vec::new(),
            activated: BTreeSet::new(),
        }
    }

    /// Places a fresh roster on `slot`'s starting rows.
    pub fn deploy(&mut self, slot: PlayerSlot, board: &Board) {
        let base = match slot {
            PlayerSlot::One => 1,
            PlayerSlot::Two => PAWN_ID_STRIDE + 1,
        };
        self.pawns = board
            .starting_positions(slot)
            .into_iter()
            .zip(base..)
            .map(|(pos, id)| Pawn::new(PawnId(id), slot, pos))
            .collect();
    }

    pub fn pawn(&self, id: PawnId) -> Option<&Pawn> {
        self.pawns.iter().find(|p| p.id == id)
    }

    pub fn pawn_mut(&mut self, id: PawnId) -> Option<&mut Pawn> {
        self.pawns.iter_mut().find(|p| p.id == id)
    }

    pub fn pawn_at(&self, pos: Position) -> Option<&Pawn> {
        self.pawns.iter().find(|p| p.position == pos)
    }

    pub fn card(&self, id: &haven_protocol::CardId) -> Option<&Card> {
        self.cards.iter().find(|c| &c.spec.id == id)
    }

    pub fn has_defined(&self) -> bool {
        !self.cards.is_empty()
    }

    /// `true` while an unlinked card and an inactive pawn both remain.
    pub fn can_link(&self) -> bool {
        self.cards.iter().any(|c| !c.is_linked) && self.pawns.iter().any(|p| !p.is_active)
    }

    pub fn card_specs(&self) -> Vec<CardSpec> {
        self.cards.iter().map(|c| c.spec.clone()).collect()
    }

    /// Drops an eliminated pawn from the roster and the cycle bookkeeping.
    pub fn remove_pawn(&mut self, id: PawnId) {
        self.pawns.retain(|p| p.id != id);
        self.activated.remove(&id);
    }

    /// Cycle rollover: every survivor back to unlinked, cards discarded.
    pub fn reset_cycle(&mut self) {
        for pawn in &mut self.pawns {
            pawn.reset();
        }
        self.activated.clear();
        self.cards.clear();
    }
}

/// Both throws of the current tiebreaker attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RpsState {
    pub choices: [Option<RpsChoice>; 2],
    /// Completed attempts, ties included.
    pub attempts: u32,
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// `None` for a draw.
    pub winner: Option<PlayerSlot>,
    pub reason: GameOverReason,
}

/// Phase, counters, and turn bookkeeping for one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub phase: Phase,
    /// Setup round within the cycle, from 1.
    pub round_number: u8,
    /// From 1, never decreases.
    pub cycle_number: u32,
    pub current_player: PlayerSlot,
    /// Initiative for the current setup round.
    pub initiative_player: Option<PlayerSlot>,
    /// Initiative carried into the action phase (the last round's winner).
    pub cycle_initiative_player: Option<PlayerSlot>,
    pub rps: RpsState,
    /// Active pawns when the action phase began.
    pub initial_active_pawn_ids: BTreeSet<PawnId>,
    pub acted_pawn_ids_this_cycle: BTreeSet<PawnId>,
    pub verdict: Option<Verdict>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            phase: Phase::WaitingForOpponent,
            round_number: 1,
            cycle_number: 1,
            current_player: PlayerSlot::One,
            initiative_player: None,
            cycle_initiative_player: None,
            rps: RpsState::default(),
            initial_active_pawn_ids: BTreeSet::new(),
            acted_pawn_ids_this_cycle: BTreeSet::new(),
            verdict: None,
        }
    }
}

impl GameState {
    /// Forgets an eliminated pawn everywhere it is tracked.
    pub fn forget_pawn(&mut self, id: PawnId) {
        self.initial_active_pawn_ids.remove(&id);
        self.acted_pawn_ids_this_cycle.remove(&id);
    }
}

/// Views of every pawn on the board, slot 1 first.
pub fn pawn_views(players: &[PlayerState; 2]) -> Vec<PawnView> {
    players
        .iter()
        .flat_map(|p| p.pawns.iter().map(Pawn::view))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameConfig;
    use haven_protocol::CardId;

    #[test]
    fn test_deploy_assigns_disjoint_id_ranges() {
        let board = Board::new(&GameConfig::default());
        let mut p1 = PlayerState::new("Ada");
        let mut p2 = PlayerState::new("Bob");
        p1.deploy(PlayerSlot::One, &board);
        p2.deploy(PlayerSlot::Two, &board);

        let ids1: Vec<u32> = p1.pawns.iter().map(|p| p.id.0).collect();
        let ids2: Vec<u32> = p2.pawns.iter().map(|p| p.id.0).collect();
        assert_eq!(ids1, (1..=8).collect::<Vec<_>>());
        assert_eq!(ids2, (101..=108).collect::<Vec<_>>());
        assert!(p2.pawns.iter().all(|p| p.owner == PlayerSlot::Two));
    }

    #[test]
    fn test_can_link_needs_both_card_and_pawn() {
        let board = Board::new(&GameConfig::default());
        let mut p = PlayerState::new("Ada");
        assert!(!p.can_link());

        p.deploy(PlayerSlot::One, &board);
        p.cards.push(Card::new(CardSpec {
            id: CardId::new("a"),
            hp: 2,
            stamina: 2,
            attack: 3,
        }));
        assert!(p.can_link());

        p.cards[0].is_linked = true;
        assert!(!p.can_link());
    }

    #[test]
    fn test_remove_pawn_clears_activation() {
        let board = Board::new(&GameConfig::default());
        let mut p = PlayerState::new("Ada");
        p.deploy(PlayerSlot::One, &board);
        p.activated.insert(PawnId(3));

        p.remove_pawn(PawnId(3));
        assert!(p.pawn(PawnId(3)).is_none());
        assert!(p.activated.is_empty());
        assert_eq!(p.pawns.len(), 7);
    }
}
