//! Turn advancement.
//!
//! A side "can act" when one of its active pawns with stamina left has a
//! legal move or attack. After every action the engine asks
//! [`next_turn`] who goes next; the answer depends only on the board.

use haven_protocol::{PlayerSlot, Position};

use crate::board::Board;
use crate::state::PlayerState;
use crate::unit::Pawn;

/// Who acts after `acting` finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Only the acting side can still act.
    SameTurn,
    /// The opponent can act (whether or not the actor still can).
    PassTurn(PlayerSlot),
    /// Nobody can act; the cycle rolls over.
    NewCycle,
}

/// The pawn standing on `pos`, on either side.
pub fn occupant(players: &[PlayerState; 2], pos: Position) -> Option<&Pawn> {
    players.iter().find_map(|p| p.pawn_at(pos))
}

/// Cells `pawn` could move to right now.
pub fn valid_moves<'a>(
    board: &'a Board,
    players: &'a [PlayerState; 2],
    pawn: &'a Pawn,
) -> impl Iterator<Item = Position> + 'a {
    pawn.can_spend()
        .then(|| board.cells_within(pawn.position, pawn.stamina()))
        .into_iter()
        .flatten()
        .filter(move |&to| occupant(players, to).is_none())
}

/// Opponent pawns `pawn` could attack right now.
pub fn attack_targets<'a>(
    players: &'a [PlayerState; 2],
    pawn: &'a Pawn,
) -> impl Iterator<Item = &'a Pawn> + 'a {
    let enemy = &players[pawn.owner.other().index()];
    pawn.can_spend()
        .then(|| pawn.position.neighbors())
        .into_iter()
        .flatten()
        .filter_map(move |pos| enemy.pawn_at(pos))
}

pub fn can_act(board: &Board, players: &[PlayerState; 2], slot: PlayerSlot) -> bool {
    players[slot.index()].pawns.iter().any(|pawn| {
        attack_targets(players, pawn).next().is_some()
            || valid_moves(board, players, pawn).next().is_some()
    })
}

/// Decide the next turn after `acting` has acted (or declared it cannot).
pub fn next_turn(board: &Board, players: &[PlayerState; 2], acting: PlayerSlot) -> TurnOutcome {
    let opponent = acting.other();
    if can_act(board, players, opponent) {
        TurnOutcome::PassTurn(opponent)
    } else if can_act(board, players, acting) {
        TurnOutcome::SameTurn
    } else {
        TurnOutcome::NewCycle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameConfig;
    use haven_protocol::{CardId, CardSpec, PawnId};

    fn linked(id: u32, owner: PlayerSlot, x: i32, y: i32, stamina: u32) -> Pawn {
        let mut pawn = Pawn::new(PawnId(id), owner, Position::new(x, y));
        pawn.link(&CardSpec {
            id: CardId::new(format!("c{id}")),
            hp: 2,
            stamina: stamina.max(1),
            attack: 7 - 2 - stamina.max(1),
        });
        pawn.remaining_stamina = Some(stamina);
        pawn
    }

    fn players(one: Vec<Pawn>, two: Vec<Pawn>) -> [PlayerState; 2] {
        let mut p1 = PlayerState::new("Ada");
        let mut p2 = PlayerState::new("Bob");
        p1.pawns = one;
        p2.pawns = two;
        [p1, p2]
    }

    fn board() -> Board {
        Board::new(&GameConfig::default())
    }

    #[test]
    fn test_zero_stamina_pawns_cannot_act() {
        let ps = players(
            vec![linked(1, PlayerSlot::One, 0, 0, 0)],
            vec![linked(101, PlayerSlot::Two, 0, 1, 0)],
        );
        assert!(!can_act(&board(), &ps, PlayerSlot::One));
        assert!(!can_act(&board(), &ps, PlayerSlot::Two));
        assert_eq!(next_turn(&board(), &ps, PlayerSlot::One), TurnOutcome::NewCycle);
    }

    #[test]
    fn test_inactive_pawns_never_act() {
        let ps = players(
            vec![Pawn::new(PawnId(1), PlayerSlot::One, Position::new(0, 0))],
            vec![linked(101, PlayerSlot::Two, 5, 7, 2)],
        );
        assert!(!can_act(&board(), &ps, PlayerSlot::One));
        assert!(can_act(&board(), &ps, PlayerSlot::Two));
    }

    #[test]
    fn test_pass_turn_when_opponent_can_act() {
        let ps = players(
            vec![linked(1, PlayerSlot::One, 0, 0, 3)],
            vec![linked(101, PlayerSlot::Two, 5, 7, 1)],
        );
        assert_eq!(
            next_turn(&board(), &ps, PlayerSlot::One),
            TurnOutcome::PassTurn(PlayerSlot::Two)
        );
    }

    #[test]
    fn test_same_turn_when_only_actor_can_act() {
        let ps = players(
            vec![linked(1, PlayerSlot::One, 0, 0, 3)],
            vec![linked(101, PlayerSlot::Two, 5, 7, 0)],
        );
        assert_eq!(next_turn(&board(), &ps, PlayerSlot::One), TurnOutcome::SameTurn);
    }

    #[test]
    fn test_boxed_in_pawn_can_still_attack() {
        // (0,0) with stamina 1: (1,0) is friendly, (0,1) is an enemy.
        let ps = players(
            vec![
                linked(1, PlayerSlot::One, 0, 0, 1),
                Pawn::new(PawnId(2), PlayerSlot::One, Position::new(1, 0)),
            ],
            vec![Pawn::new(PawnId(101), PlayerSlot::Two, Position::new(0, 1))],
        );
        let pawn = &ps[0].pawns[0];
        assert_eq!(valid_moves(&board(), &ps, pawn).count(), 0);
        let targets: Vec<_> = attack_targets(&ps, pawn).map(|p| p.id).collect();
        assert_eq!(targets, vec![PawnId(101)]);
        assert!(can_act(&board(), &ps, PlayerSlot::One));
    }

    #[test]
    fn test_valid_moves_skip_occupied_cells() {
        let ps = players(
            vec![
                linked(1, PlayerSlot::One, 0, 0, 1),
                Pawn::new(PawnId(2), PlayerSlot::One, Position::new(1, 0)),
            ],
            vec![],
        );
        let moves: Vec<_> = valid_moves(&board(), &ps, &ps[0].pawns[0]).collect();
        assert_eq!(moves, vec![Position::new(0, 1)]);
    }
}
