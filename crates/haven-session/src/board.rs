//! Static board geometry: size, starting zones, and haven cells.

use haven_protocol::{BoardInfo, PlayerSlot, Position};

use crate::GameConfig;

/// The grid both sides play on. Immutable for the life of a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: i32,
    height: i32,
    pawns_per_row: i32,
    /// Goal cells per side, indexed by `PlayerSlot::index`.
    havens: [Vec<Position>; 2],
    haven_threshold: usize,
}

impl Board {
    pub fn new(config: &GameConfig) -> Self {
        let width = config.board_width;
        let height = config.board_height;
        let offset = (width - config.haven_width) / 2;
        let row = |y: i32| -> Vec<Position> {
            (offset..offset + config.haven_width)
                .map(|x| Position::new(x, y))
                .collect()
        };
        // Each side aims for the middle of the opponent's back row.
        let havens = [row(height - 1), row(0)];

        Self {
            width,
            height,
            pawns_per_row: config.pawns_per_row,
            havens,
            haven_threshold: config.haven_threshold,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Returns `true` if `pos` is on the board.
    pub fn contains(&self, pos: Position) -> bool {
        (0..self.width).contains(&pos.x) && (0..self.height).contains(&pos.y)
    }

    /// The cells `slot` must occupy to win.
    pub fn haven(&self, slot: PlayerSlot) -> &[Position] {
        &self.havens[slot.index()]
    }

    pub fn haven_threshold(&self) -> usize {
        self.haven_threshold
    }

    /// Starting cells for `slot`: two full rows at that side's edge,
    /// back row first, centred horizontally.
    pub fn starting_positions(&self, slot: PlayerSlot) -> Vec<Position> {
        let offset = (self.width - self.pawns_per_row) / 2;
        let rows = match slot {
            PlayerSlot::One => [0, 1],
            PlayerSlot::Two => [self.height - 1, self.height - 2],
        };
        rows.iter()
            .flat_map(|&y| (offset..offset + self.pawns_per_row).map(move |x| Position::new(x, y)))
            .collect()
    }

    /// Cells reachable by a single move costing at most `budget` stamina,
    /// ignoring occupancy.
    pub fn cells_within(&self, from: Position, budget: u32) -> impl Iterator<Item = Position> + '_ {
        let reach = budget.min((self.width + self.height) as u32) as i32;
        (-reach..=reach).flat_map(move |dx| {
            let rest = reach - dx.abs();
            (-rest..=rest).filter_map(move |dy| {
                let to = Position::new(from.x + dx, from.y + dy);
                (to != from && self.contains(to)).then_some(to)
            })
        })
    }

    pub fn info(&self) -> BoardInfo {
        BoardInfo {
            width: self.width,
            height: self.height,
            player1_haven: self.havens[0].clone(),
            player2_haven: self.havens[1].clone(),
            haven_threshold: self.haven_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Board {
        Board::new(&GameConfig::default())
    }

    #[test]
    fn test_contains_edges() {
        let b = board();
        assert!(b.contains(Position::new(0, 0)));
        assert!(b.contains(Position::new(5, 7)));
        assert!(!b.contains(Position::new(6, 0)));
        assert!(!b.contains(Position::new(0, -1)));
    }

    #[test]
    fn test_starting_positions_are_opposite_edges() {
        let b = board();
        let p1 = b.starting_positions(PlayerSlot::One);
        let p2 = b.starting_positions(PlayerSlot::Two);
        assert_eq!(p1.len(), 8);
        assert_eq!(p2.len(), 8);
        assert!(p1.iter().all(|p| p.y <= 1 && (1..=4).contains(&p.x)));
        assert!(p2.iter().all(|p| p.y >= 6));
    }

    #[test]
    fn test_havens_sit_on_opponent_back_row() {
        let b = board();
        assert_eq!(
            b.haven(PlayerSlot::One),
            &[Position::new(2, 7), Position::new(3, 7)]
        );
        assert_eq!(
            b.haven(PlayerSlot::Two),
            &[Position::new(2, 0), Position::new(3, 0)]
        );
    }

    #[test]
    fn test_cells_within_is_a_clipped_diamond() {
        let b = board();
        let corner: Vec<_> = b.cells_within(Position::new(0, 0), 1).collect();
        assert_eq!(corner.len(), 2);

        let centre: Vec<_> = b.cells_within(Position::new(2, 3), 2).collect();
        assert_eq!(centre.len(), 12);
        assert!(centre.iter().all(|p| p.distance(Position::new(2, 3)) <= 2));
    }
}
