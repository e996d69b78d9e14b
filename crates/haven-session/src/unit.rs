//! Pawns and cards.

use std::collections::HashSet;

use haven_protocol::{CardSpec, CardTotals, PawnId, PawnStatus, PawnView, PlayerSlot, Position};

use crate::{GameConfig, GameError};

/// A card defined for the current round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub spec: CardSpec,
    pub is_linked: bool,
}

impl Card {
    pub fn new(spec: CardSpec) -> Self {
        Self {
            spec,
            is_linked: false,
        }
    }
}

/// A board piece. Inactive until a card is linked to it; then it carries
/// that card's HP, stamina, and attack for the rest of the cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pawn {
    pub id: PawnId,
    pub owner: PlayerSlot,
    pub position: Position,
    pub is_active: bool,
    pub current_hp: Option<i32>,
    pub linked_card: Option<CardSpec>,
    pub remaining_stamina: Option<u32>,
}

impl Pawn {
    pub fn new(id: PawnId, owner: PlayerSlot, position: Position) -> Self {
        Self {
            id,
            owner,
            position,
            is_active: false,
            current_hp: None,
            linked_card: None,
            remaining_stamina: None,
        }
    }

    /// Activates the pawn with `card`'s stats.
    pub fn link(&mut self, card: &CardSpec) {
        self.is_active = true;
        self.current_hp = Some(i32::try_from(card.hp).unwrap_or(i32::MAX));
        self.remaining_stamina = Some(card.stamina);
        self.linked_card = Some(card.clone());
    }

    /// Back to the unlinked state (cycle rollover).
    pub fn reset(&mut self) {
        self.is_active = false;
        self.current_hp = None;
        self.linked_card = None;
        self.remaining_stamina = None;
    }

    /// Refill stamina from the linked card; no-op when unlinked.
    pub fn refresh_stamina(&mut self) {
        if let Some(card) = &self.linked_card {
            self.remaining_stamina = Some(card.stamina);
        }
    }

    pub fn attack(&self) -> u32 {
        self.linked_card.as_ref().map_or(0, |c| c.attack)
    }

    pub fn stamina(&self) -> u32 {
        self.remaining_stamina.unwrap_or(0)
    }

    /// Active, linked, and with stamina left: the precondition for acting.
    pub fn can_spend(&self) -> bool {
        self.is_active && self.linked_card.is_some() && self.stamina() > 0
    }

    pub fn view(&self) -> PawnView {
        PawnView {
            id: self.id,
            owner: self.owner,
            x: self.position.x,
            y: self.position.y,
            is_active: self.is_active,
            current_hp: self.current_hp,
            remaining_stamina: self.remaining_stamina,
            linked_card: self.linked_card.clone(),
        }
    }

    pub fn status(&self) -> PawnStatus {
        PawnStatus {
            current_hp: self.current_hp,
            remaining_stamina: self.remaining_stamina,
        }
    }
}

/// Checks a round's submission: the right number of cards, every stat at
/// least 1, every card summing to the budget, no repeated ids.
pub fn validate_card_set(cards: &[CardSpec], config: &GameConfig) -> Result<(), GameError> {
    if cards.len() != config.cards_per_round {
        return Err(GameError::InvalidCardSet(format!(
            "expected {} cards, got {}",
            config.cards_per_round,
            cards.len()
        )));
    }

    let mut seen = HashSet::new();
    for card in cards {
        if card.id.0.is_empty() {
            return Err(GameError::InvalidCardSet("card id is empty".into()));
        }
        if !seen.insert(&card.id) {
            return Err(GameError::InvalidCardSet(format!(
                "duplicate card id {}",
                card.id
            )));
        }
        if card.hp == 0 || card.stamina == 0 || card.attack == 0 {
            return Err(GameError::InvalidCardSet(format!(
                "card {} has a stat below 1",
                card.id
            )));
        }
        let sum = card
            .hp
            .checked_add(card.stamina)
            .and_then(|s| s.checked_add(card.attack));
        match sum {
            Some(sum) if sum == config.card_budget => {}
            Some(sum) => {
                return Err(GameError::InvalidCardSet(format!(
                    "card {} sums to {sum}, budget is {}",
                    card.id, config.card_budget
                )));
            }
            None => {
                return Err(GameError::InvalidCardSet(format!(
                    "card {} has a stat out of range",
                    card.id
                )));
            }
        }
    }
    Ok(())
}

/// Attack and stamina totals for the initiative check.
pub fn totals<'a>(cards: impl IntoIterator<Item = &'a CardSpec>) -> CardTotals {
    cards.into_iter().fold(CardTotals::default(), |acc, c| CardTotals {
        total_attack: acc.total_attack.saturating_add(c.attack),
        total_stamina: acc.total_stamina.saturating_add(c.stamina),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use haven_protocol::CardId;

    fn card(id: &str, hp: u32, stamina: u32, attack: u32) -> CardSpec {
        CardSpec {
            id: CardId::new(id),
            hp,
            stamina,
            attack,
        }
    }

    #[test]
    fn test_valid_card_set_is_accepted() {
        let cards = [card("a", 2, 2, 3), card("b", 2, 3, 2), card("c", 3, 2, 2)];
        assert_eq!(validate_card_set(&cards, &GameConfig::default()), Ok(()));
    }

    #[test]
    fn test_card_set_wrong_count() {
        let cards = [card("a", 2, 2, 3), card("b", 2, 3, 2)];
        assert!(matches!(
            validate_card_set(&cards, &GameConfig::default()),
            Err(GameError::InvalidCardSet(_))
        ));
    }

    #[test]
    fn test_card_set_zero_stat_rejected_even_if_sum_matches() {
        let cards = [card("a", 0, 4, 3), card("b", 2, 3, 2), card("c", 3, 2, 2)];
        let err = validate_card_set(&cards, &GameConfig::default()).unwrap_err();
        assert!(err.to_string().contains("below 1"));
    }

    #[test]
    fn test_card_set_over_budget_rejected() {
        let cards = [card("a", 3, 3, 3), card("b", 2, 3, 2), card("c", 3, 2, 2)];
        let err = validate_card_set(&cards, &GameConfig::default()).unwrap_err();
        assert!(err.to_string().contains("sums to 9"));
    }

    #[test]
    fn test_card_set_overflowing_stat_rejected() {
        // 4 + 4 + u32::MAX wraps to 7 in unchecked arithmetic.
        let cards = [
            card("a", 4, 4, u32::MAX),
            card("b", 2, 3, 2),
            card("c", 3, 2, 2),
        ];
        let err = validate_card_set(&cards, &GameConfig::default()).unwrap_err();
        assert!(matches!(err, GameError::InvalidCardSet(_)));
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_totals_saturate_instead_of_wrapping() {
        let cards = [card("a", 1, 1, u32::MAX), card("b", 1, 1, 5)];
        assert_eq!(totals(&cards).total_attack, u32::MAX);
    }

    #[test]
    fn test_card_set_duplicate_ids_rejected() {
        let cards = [card("a", 2, 2, 3), card("a", 2, 3, 2), card("c", 3, 2, 2)];
        let err = validate_card_set(&cards, &GameConfig::default()).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_totals_sum_attack_and_stamina() {
        let cards = [card("a", 1, 1, 5), card("b", 1, 5, 1), card("c", 5, 1, 1)];
        let t = totals(&cards);
        assert_eq!(t.total_attack, 7);
        assert_eq!(t.total_stamina, 7);
    }

    #[test]
    fn test_link_then_reset_restores_inactive_invariant() {
        let mut pawn = Pawn::new(PawnId(1), PlayerSlot::One, Position::new(0, 0));
        assert!(!pawn.can_spend());

        pawn.link(&card("a", 2, 2, 3));
        assert!(pawn.can_spend());
        assert_eq!(pawn.current_hp, Some(2));
        assert_eq!(pawn.attack(), 3);

        pawn.reset();
        assert_eq!(pawn, Pawn::new(PawnId(1), PlayerSlot::One, Position::new(0, 0)));
    }
}
