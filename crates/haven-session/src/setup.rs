//! Setup rounds: define, reveal, tiebreak, link.

use haven_protocol::{
    CardId, CardSpec, CardTotals, PawnId, Phase, PlayerSlot, Recipient, RevealTotals, RpsChoice,
    ServerMessage,
};

use crate::session::{GameSession, Outbound, definer};
use crate::unit::{Card, totals, validate_card_set};
use crate::GameError;

/// Initiative from the revealed totals: strictly higher attack, then
/// strictly higher stamina. `None` means a rock-paper-scissors tiebreak.
pub fn decide_initiative(p1: CardTotals, p2: CardTotals) -> Option<PlayerSlot> {
    use std::cmp::Ordering::*;
    match (
        p1.total_attack.cmp(&p2.total_attack),
        p1.total_stamina.cmp(&p2.total_stamina),
    ) {
        (Greater, _) | (Equal, Greater) => Some(PlayerSlot::One),
        (Less, _) | (Equal, Less) => Some(PlayerSlot::Two),
        (Equal, Equal) => None,
    }
}

impl GameSession {
    /// Stores `slot`'s cards for this round. The second submission
    /// triggers the reveal.
    pub fn define_cards(
        &mut self,
        slot: PlayerSlot,
        cards: Vec<CardSpec>,
    ) -> Result<Outbound, GameError> {
        self.expect_phase(matches!(self.state.phase, Phase::Define { .. }))?;
        self.expect_turn(slot)?;
        validate_card_set(&cards, &self.config)?;

        self.players[slot.index()].cards = cards.into_iter().map(Card::new).collect();
        tracing::debug!(%slot, round = self.state.round_number, "cards defined");

        let mut out = Outbound::new();
        let other = slot.other();
        if self.players[other.index()].has_defined() {
            self.reveal(&mut out);
        } else {
            self.state.current_player = other;
            out.push((
                Recipient::All,
                ServerMessage::OpponentCardsReady {
                    slot,
                    current_player: other,
                },
            ));
        }
        Ok(out)
    }

    fn reveal(&mut self, out: &mut Outbound) {
        let [p1, p2] = &self.players;
        let sums = RevealTotals {
            player1: totals(p1.cards.iter().map(|c| &c.spec)),
            player2: totals(p2.cards.iter().map(|c| &c.spec)),
        };
        let initiative = decide_initiative(sums.player1, sums.player2);

        out.push((
            Recipient::All,
            ServerMessage::CardsRevealed {
                player1_cards: p1.card_specs(),
                player2_cards: p2.card_specs(),
                initiative,
                totals: sums,
            },
        ));

        match initiative {
            Some(winner) => self.begin_linking(winner, out),
            None => {
                let round = self.state.round_number;
                self.state.phase = Phase::RpsTiebreaker { round };
                self.state.rps = Default::default();
                tracing::debug!(round, "totals tied, starting tiebreaker");
                out.push((Recipient::All, ServerMessage::StartRpsTiebreaker { round }));
            }
        }
    }

    /// Records one tiebreaker throw. Once both sides threw, a tie restarts
    /// the attempt and a decisive result starts linking.
    pub fn submit_rps_choice(
        &mut self,
        slot: PlayerSlot,
        choice: &str,
    ) -> Result<Outbound, GameError> {
        let Phase::RpsTiebreaker { round } = self.state.phase else {
            return Err(GameError::WrongPhase {
                phase: self.state.phase,
            });
        };
        let choice: RpsChoice = choice
            .parse()
            .map_err(|_| GameError::InvalidRpsChoice(choice.to_owned()))?;
        if self.state.rps.choices[slot.index()].is_some() {
            return Err(GameError::AlreadyChose);
        }

        self.state.rps.choices[slot.index()] = Some(choice);
        let mut out = vec![(
            Recipient::Player(slot),
            ServerMessage::RpsChoiceConfirmed { choice },
        )];

        let [Some(c1), Some(c2)] = self.state.rps.choices else {
            out.push((
                Recipient::Player(slot),
                ServerMessage::WaitingForOpponentRpsChoice,
            ));
            return Ok(out);
        };

        self.state.rps.attempts += 1;
        if c1 == c2 {
            self.state.rps.choices = [None, None];
            out.push((Recipient::All, ServerMessage::RpsTie { round, choice: c1 }));
            return Ok(out);
        }

        let winner = if c1.beats(c2) {
            PlayerSlot::One
        } else {
            PlayerSlot::Two
        };
        tracing::debug!(
            %winner,
            attempts = self.state.rps.attempts,
            "tiebreaker decided"
        );
        out.push((
            Recipient::All,
            ServerMessage::RpsRoundResult {
                player1_choice: c1,
                player2_choice: c2,
                winner,
            },
        ));
        self.state.rps = Default::default();
        self.begin_linking(winner, &mut out);
        Ok(out)
    }

    fn begin_linking(&mut self, initiative: PlayerSlot, out: &mut Outbound) {
        let round = self.state.round_number;
        self.state.phase = Phase::Linking { round };
        self.state.initiative_player = Some(initiative);

        let first = [initiative, initiative.other()]
            .into_iter()
            .find(|s| self.players[s.index()].can_link());
        self.state.current_player = first.unwrap_or(initiative);

        out.push((
            Recipient::All,
            ServerMessage::StartLinking {
                round,
                current_player: self.state.current_player,
                initiative_player: initiative,
            },
        ));
        if first.is_none() {
            self.finish_linking_round(out);
        }
    }

    /// Attaches one of `slot`'s unlinked cards to one of its inactive pawns.
    pub fn link_card(
        &mut self,
        slot: PlayerSlot,
        card_id: &CardId,
        pawn_id: PawnId,
    ) -> Result<Outbound, GameError> {
        self.expect_phase(matches!(self.state.phase, Phase::Linking { .. }))?;
        self.expect_turn(slot)?;

        let player = &self.players[slot.index()];
        let card = player
            .card(card_id)
            .ok_or_else(|| GameError::CardNotFound(card_id.clone()))?;
        if card.is_linked {
            return Err(GameError::CardAlreadyLinked(card_id.clone()));
        }
        let pawn = player.pawn(pawn_id).ok_or(GameError::PawnNotFound(pawn_id))?;
        if pawn.is_active {
            return Err(GameError::PawnAlreadyActive(pawn_id));
        }
        let spec = card.spec.clone();

        let player = &mut self.players[slot.index()];
        if let Some(card) = player.cards.iter_mut().find(|c| &c.spec.id == card_id) {
            card.is_linked = true;
        }
        let Some(pawn) = player.pawn_mut(pawn_id) else {
            return Err(GameError::PawnNotFound(pawn_id));
        };
        pawn.link(&spec);
        let view = pawn.view();
        player.activated.insert(pawn_id);

        let mut out = vec![(
            Recipient::All,
            ServerMessage::CardLinked {
                card_id: card_id.clone(),
                pawn_id,
                slot,
                pawn: view,
            },
        )];
        self.advance_linking(slot, &mut out);
        Ok(out)
    }

    /// `slot` declares it has no legal (card, pawn) pair.
    pub fn cannot_link(&mut self, slot: PlayerSlot) -> Result<Outbound, GameError> {
        self.expect_phase(matches!(self.state.phase, Phase::Linking { .. }))?;
        self.expect_turn(slot)?;
        if self.players[slot.index()].can_link() {
            return Err(GameError::LegalOptionAvailable);
        }

        let mut out = Outbound::new();
        self.advance_linking(slot, &mut out);
        Ok(out)
    }

    fn advance_linking(&mut self, acting: PlayerSlot, out: &mut Outbound) {
        let next = [acting.other(), acting]
            .into_iter()
            .find(|s| self.players[s.index()].can_link());
        match next {
            Some(current_player) => {
                self.state.current_player = current_player;
                out.push((Recipient::All, ServerMessage::NextLinkTurn { current_player }));
            }
            None => self.finish_linking_round(out),
        }
    }

    fn finish_linking_round(&mut self, out: &mut Outbound) {
        for player in &mut self.players {
            player.cards.clear();
        }

        if self.state.round_number < self.config.rounds_per_cycle {
            let round = self.state.round_number + 1;
            self.state.round_number = round;
            self.state.phase = Phase::Define { round };
            self.state.current_player = definer(round);
            self.state.initiative_player = None;
            out.push((
                Recipient::All,
                ServerMessage::NextRound {
                    round,
                    phase: self.state.phase,
                    current_player: self.state.current_player,
                },
            ));
        } else {
            self.state.cycle_initiative_player = self.state.initiative_player;
            self.begin_action_phase(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameConfig;

    fn sums(total_attack: u32, total_stamina: u32) -> CardTotals {
        CardTotals {
            total_attack,
            total_stamina,
        }
    }

    fn card(id: &str, hp: u32, stamina: u32, attack: u32) -> CardSpec {
        CardSpec {
            id: CardId::new(id),
            hp,
            stamina,
            attack,
        }
    }

    fn balanced() -> Vec<CardSpec> {
        vec![card("a", 2, 2, 3), card("b", 2, 3, 2), card("c", 3, 2, 2)]
    }

    /// Nine attack against `balanced`'s seven: wins initiative outright.
    fn strong() -> Vec<CardSpec> {
        vec![card("a", 1, 1, 5), card("b", 2, 3, 2), card("c", 3, 2, 2)]
    }

    fn in_define() -> GameSession {
        let mut s = GameSession::new(GameConfig::default(), "Ada");
        s.add_opponent("Bob").unwrap();
        s.ready(PlayerSlot::One).unwrap();
        s.ready(PlayerSlot::Two).unwrap();
        s
    }

    #[test]
    fn test_initiative_prefers_attack_then_stamina() {
        assert_eq!(decide_initiative(sums(8, 1), sums(7, 9)), Some(PlayerSlot::One));
        assert_eq!(decide_initiative(sums(7, 5), sums(7, 6)), Some(PlayerSlot::Two));
        assert_eq!(decide_initiative(sums(7, 7), sums(7, 7)), None);
    }

    #[test]
    fn test_define_out_of_turn_is_rejected() {
        let mut s = in_define();
        assert_eq!(
            s.define_cards(PlayerSlot::Two, balanced()),
            Err(GameError::NotYourTurn {
                current: PlayerSlot::One
            })
        );
    }

    #[test]
    fn test_invalid_card_set_leaves_state_unchanged() {
        let mut s = in_define();
        let before = s.state().clone();
        let bad = vec![card("a", 5, 1, 1), card("b", 2, 3, 2), card("c", 3, 3, 3)];
        assert!(matches!(
            s.define_cards(PlayerSlot::One, bad),
            Err(GameError::InvalidCardSet(_))
        ));
        assert_eq!(s.state(), &before);
        assert!(!s.player(PlayerSlot::One).has_defined());
    }

    #[test]
    fn test_overflowing_card_is_rejected_without_state_change() {
        let mut s = in_define();
        let before = s.state().clone();
        let bad = vec![card("a", 4, 4, u32::MAX), card("b", 2, 3, 2), card("c", 3, 2, 2)];
        assert!(matches!(
            s.define_cards(PlayerSlot::One, bad),
            Err(GameError::InvalidCardSet(_))
        ));
        assert_eq!(s.state(), &before);
        assert!(!s.player(PlayerSlot::One).has_defined());
    }

    #[test]
    fn test_first_definition_passes_turn() {
        let mut s = in_define();
        let out = s.define_cards(PlayerSlot::One, balanced()).unwrap();
        assert_eq!(
            out,
            vec![(
                Recipient::All,
                ServerMessage::OpponentCardsReady {
                    slot: PlayerSlot::One,
                    current_player: PlayerSlot::Two
                }
            )]
        );
        assert_eq!(s.state().current_player, PlayerSlot::Two);
    }

    #[test]
    fn test_equal_totals_start_tiebreaker() {
        let mut s = in_define();
        s.define_cards(PlayerSlot::One, balanced()).unwrap();
        let out = s.define_cards(PlayerSlot::Two, balanced()).unwrap();

        assert!(matches!(
            out[0].1,
            ServerMessage::CardsRevealed {
                initiative: None,
                ..
            }
        ));
        assert_eq!(
            out[1].1,
            ServerMessage::StartRpsTiebreaker { round: 1 }
        );
        assert_eq!(s.phase(), Phase::RpsTiebreaker { round: 1 });
    }

    #[test]
    fn test_rps_flow_tie_then_win() {
        let mut s = in_define();
        s.define_cards(PlayerSlot::One, balanced()).unwrap();
        s.define_cards(PlayerSlot::Two, balanced()).unwrap();

        let out = s.submit_rps_choice(PlayerSlot::One, "rock").unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].1, ServerMessage::WaitingForOpponentRpsChoice);
        assert_eq!(
            s.submit_rps_choice(PlayerSlot::One, "paper"),
            Err(GameError::AlreadyChose)
        );

        let out = s.submit_rps_choice(PlayerSlot::Two, "rock").unwrap();
        assert_eq!(
            out[1],
            (
                Recipient::All,
                ServerMessage::RpsTie {
                    round: 1,
                    choice: RpsChoice::Rock
                }
            )
        );
        assert_eq!(s.phase(), Phase::RpsTiebreaker { round: 1 });

        s.submit_rps_choice(PlayerSlot::One, "scissors").unwrap();
        let out = s.submit_rps_choice(PlayerSlot::Two, "rock").unwrap();
        assert!(matches!(
            out[1].1,
            ServerMessage::RpsRoundResult {
                winner: PlayerSlot::Two,
                ..
            }
        ));
        assert_eq!(s.phase(), Phase::Linking { round: 1 });
        assert_eq!(s.state().current_player, PlayerSlot::Two);
        assert_eq!(s.state().initiative_player, Some(PlayerSlot::Two));
    }

    #[test]
    fn test_unknown_rps_choice_is_rejected() {
        let mut s = in_define();
        s.define_cards(PlayerSlot::One, balanced()).unwrap();
        s.define_cards(PlayerSlot::Two, balanced()).unwrap();
        assert_eq!(
            s.submit_rps_choice(PlayerSlot::One, "lizard"),
            Err(GameError::InvalidRpsChoice("lizard".into()))
        );
    }

    #[test]
    fn test_link_errors() {
        let mut s = in_define();
        s.define_cards(PlayerSlot::One, strong()).unwrap();
        s.define_cards(PlayerSlot::Two, balanced()).unwrap();
        // P1 has 9 attack against 7: P1 links first.
        assert_eq!(s.state().current_player, PlayerSlot::One);

        assert_eq!(
            s.link_card(PlayerSlot::One, &CardId::new("zz"), PawnId(1)),
            Err(GameError::CardNotFound(CardId::new("zz")))
        );
        assert_eq!(
            s.link_card(PlayerSlot::One, &CardId::new("a"), PawnId(101)),
            Err(GameError::PawnNotFound(PawnId(101)))
        );
        assert_eq!(
            s.cannot_link(PlayerSlot::One),
            Err(GameError::LegalOptionAvailable)
        );

        s.link_card(PlayerSlot::One, &CardId::new("a"), PawnId(1)).unwrap();
        assert_eq!(s.state().current_player, PlayerSlot::Two);
        s.link_card(PlayerSlot::Two, &CardId::new("a"), PawnId(101)).unwrap();

        assert_eq!(
            s.link_card(PlayerSlot::One, &CardId::new("a"), PawnId(2)),
            Err(GameError::CardAlreadyLinked(CardId::new("a")))
        );
        assert_eq!(
            s.link_card(PlayerSlot::One, &CardId::new("b"), PawnId(1)),
            Err(GameError::PawnAlreadyActive(PawnId(1)))
        );
    }

    #[test]
    fn test_linking_sets_stats_immediately() {
        let mut s = in_define();
        s.define_cards(PlayerSlot::One, strong()).unwrap();
        s.define_cards(PlayerSlot::Two, balanced()).unwrap();

        let out = s.link_card(PlayerSlot::One, &CardId::new("b"), PawnId(4)).unwrap();
        match &out[0].1 {
            ServerMessage::CardLinked { pawn, slot, .. } => {
                assert_eq!(*slot, PlayerSlot::One);
                assert!(pawn.is_active);
                assert_eq!(pawn.current_hp, Some(2));
                assert_eq!(pawn.remaining_stamina, Some(3));
            }
            other => panic!("expected CardLinked, got {other:?}"),
        }
        assert_eq!(
            out[1].1,
            ServerMessage::NextLinkTurn {
                current_player: PlayerSlot::Two
            }
        );
    }

    #[test]
    fn test_side_without_cards_yields_linking_turn() {
        let mut s = in_define();
        s.define_cards(PlayerSlot::One, strong()).unwrap();
        s.define_cards(PlayerSlot::Two, balanced()).unwrap();
        for card in &mut s.players[0].cards {
            card.is_linked = true;
        }

        let out = s.cannot_link(PlayerSlot::One).unwrap();
        assert_eq!(
            out,
            vec![(
                Recipient::All,
                ServerMessage::NextLinkTurn {
                    current_player: PlayerSlot::Two
                }
            )]
        );

        // P1 still has nothing, so P2 keeps the turn.
        let out = s.link_card(PlayerSlot::Two, &CardId::new("a"), PawnId(101)).unwrap();
        assert_eq!(
            out[1].1,
            ServerMessage::NextLinkTurn {
                current_player: PlayerSlot::Two
            }
        );
    }

    #[test]
    fn test_linking_ends_at_once_when_nobody_can_link() {
        let config = GameConfig {
            pawns_per_row: 1,
            ..GameConfig::default()
        };
        let mut s = GameSession::new(config, "Ada");
        s.add_opponent("Bob").unwrap();
        s.ready(PlayerSlot::One).unwrap();
        s.ready(PlayerSlot::Two).unwrap();

        // Round 1 fills both sides' two pawns.
        s.define_cards(PlayerSlot::One, strong()).unwrap();
        s.define_cards(PlayerSlot::Two, balanced()).unwrap();
        s.link_card(PlayerSlot::One, &CardId::new("a"), PawnId(1)).unwrap();
        s.link_card(PlayerSlot::Two, &CardId::new("a"), PawnId(101)).unwrap();
        s.link_card(PlayerSlot::One, &CardId::new("b"), PawnId(2)).unwrap();
        let out = s.link_card(PlayerSlot::Two, &CardId::new("b"), PawnId(102)).unwrap();
        assert_eq!(
            out.last().map(|(_, m)| m),
            Some(&ServerMessage::NextRound {
                round: 2,
                phase: Phase::Define { round: 2 },
                current_player: PlayerSlot::Two,
            })
        );

        // Round 2: no inactive pawn on either side, so the round closes
        // right after linking is announced.
        s.define_cards(PlayerSlot::Two, balanced()).unwrap();
        let out = s.define_cards(PlayerSlot::One, strong()).unwrap();
        let kinds: Vec<_> = out.iter().map(|(_, m)| m).collect();
        assert_eq!(kinds.len(), 3);
        assert!(matches!(
            kinds[0],
            ServerMessage::CardsRevealed {
                initiative: Some(PlayerSlot::One),
                ..
            }
        ));
        assert_eq!(
            kinds[1],
            &ServerMessage::StartLinking {
                round: 2,
                current_player: PlayerSlot::One,
                initiative_player: PlayerSlot::One,
            }
        );
        assert_eq!(
            kinds[2],
            &ServerMessage::NextRound {
                round: 3,
                phase: Phase::Define { round: 3 },
                current_player: PlayerSlot::One,
            }
        );
        assert_eq!(s.phase(), Phase::Define { round: 3 });
        assert!(!s.player(PlayerSlot::One).has_defined());
        assert!(!s.player(PlayerSlot::Two).has_defined());
    }
}
