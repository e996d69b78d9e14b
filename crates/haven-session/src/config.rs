//! Game rule configuration.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Tunable rules for one game.
///
/// The defaults are the standard ruleset: a 6×8 board, eight pawns per
/// side in two rows, three cards of budget 7 per round, three rounds per
/// cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Columns on the board.
    pub board_width: i32,
    /// Rows on the board. Player 1 starts on rows `0..2`, player 2 on the
    /// last two rows.
    pub board_height: i32,
    /// Pawns per starting row. Each side gets `2 * pawns_per_row` pawns.
    pub pawns_per_row: i32,
    /// Required `hp + stamina + attack` of every card.
    pub card_budget: u32,
    /// Cards each player defines per round.
    pub cards_per_round: usize,
    /// Setup rounds before the action phase.
    pub rounds_per_cycle: u8,
    /// Subtracted from a defender's attack when it strikes back.
    pub counter_penalty: u32,
    /// Number of goal cells centred on the opponent's back row.
    pub haven_width: i32,
    /// Goal cells a side must occupy at once to win.
    pub haven_threshold: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_width: 6,
            board_height: 8,
            pawns_per_row: 4,
            card_budget: 7,
            cards_per_round: 3,
            rounds_per_cycle: 3,
            counter_penalty: 1,
            haven_width: 2,
            haven_threshold: 1,
        }
    }
}

impl GameConfig {
    /// Clamp out-of-range values so the config is safe to build a board
    /// from. Rules:
    /// - at least 5 rows, so the two starting zones never touch;
    /// - `pawns_per_row` in `1..=board_width`;
    /// - `card_budget >= 3` (every stat must be at least 1);
    /// - at least one card per round and one round per cycle;
    /// - `haven_width` in `1..=board_width`, threshold in `1..=haven_width`.
    pub fn validated(mut self) -> Self {
        if self.board_width < 1 {
            warn!(width = self.board_width, "board_width below 1, clamping");
            self.board_width = 1;
        }
        if self.board_height < 5 {
            warn!(height = self.board_height, "board_height below 5, clamping");
            self.board_height = 5;
        }
        if !(1..=self.board_width).contains(&self.pawns_per_row) {
            warn!(
                pawns_per_row = self.pawns_per_row,
                width = self.board_width,
                "pawns_per_row out of range, clamping"
            );
            self.pawns_per_row = self.pawns_per_row.clamp(1, self.board_width);
        }
        if self.card_budget < 3 {
            warn!(budget = self.card_budget, "card_budget below 3, clamping");
            self.card_budget = 3;
        }
        self.cards_per_round = self.cards_per_round.max(1);
        self.rounds_per_cycle = self.rounds_per_cycle.max(1);
        self.haven_width = self.haven_width.clamp(1, self.board_width);
        self.haven_threshold = self.haven_threshold.clamp(1, self.haven_width as usize);
        self
    }

    /// Pawns each side starts with.
    pub fn pawns_per_side(&self) -> usize {
        (self.pawns_per_row * 2) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_already_valid() {
        assert_eq!(GameConfig::default().validated(), GameConfig::default());
        assert_eq!(GameConfig::default().pawns_per_side(), 8);
    }

    #[test]
    fn test_validated_clamps_pawns_to_width() {
        let config = GameConfig {
            board_width: 3,
            pawns_per_row: 9,
            ..GameConfig::default()
        }
        .validated();
        assert_eq!(config.pawns_per_row, 3);
        assert_eq!(config.haven_width, 2);
    }

    #[test]
    fn test_validated_clamps_threshold_to_haven_width() {
        let config = GameConfig {
            haven_width: 2,
            haven_threshold: 5,
            card_budget: 1,
            ..GameConfig::default()
        }
        .validated();
        assert_eq!(config.haven_threshold, 2);
        assert_eq!(config.card_budget, 3);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{"board_width": 8}"#).unwrap();
        assert_eq!(config.board_width, 8);
        assert_eq!(config.card_budget, 7);
    }
}
