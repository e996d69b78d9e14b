//! Action phase: moves, attacks, win detection, and cycle rollover.

use haven_protocol::{
    ActionKind, ActionReport, ActionRequest, DamageReport, GameOverReason, PawnId, Phase,
    PlayerSlot, Position, Recipient, ServerMessage,
};

use crate::board::Board;
use crate::session::{GameSession, Outbound, definer};
use crate::state::{PlayerState, Verdict, pawn_views};
use crate::turn::{TurnOutcome, can_act, next_turn, occupant};
use crate::GameError;

/// A validated action, computed without touching state.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Plan {
    Move {
        to: Position,
        cost: u32,
    },
    Attack {
        defender: PawnId,
        dmg_to_defender: u32,
        dmg_to_attacker: u32,
        defender_hp: Option<i32>,
        attacker_hp: i32,
        defender_eliminated: bool,
        attacker_eliminated: bool,
        relocate_to: Option<Position>,
        cost: u32,
    },
}

/// Checks for a decided game after `acting` resolved an action.
///
/// Elimination is checked first (both sides empty is a draw), then whether
/// the acting side holds enough of its haven cells.
pub fn victory(board: &Board, players: &[PlayerState; 2], acting: PlayerSlot) -> Option<Verdict> {
    let alive = |slot: PlayerSlot| !players[slot.index()].pawns.is_empty();
    match (alive(PlayerSlot::One), alive(PlayerSlot::Two)) {
        (false, false) => {
            return Some(Verdict {
                winner: None,
                reason: GameOverReason::Elimination,
            });
        }
        (true, false) => {
            return Some(Verdict {
                winner: Some(PlayerSlot::One),
                reason: GameOverReason::Elimination,
            });
        }
        (false, true) => {
            return Some(Verdict {
                winner: Some(PlayerSlot::Two),
                reason: GameOverReason::Elimination,
            });
        }
        (true, true) => {}
    }

    let held = board
        .haven(acting)
        .iter()
        .filter(|&&cell| players[acting.index()].pawn_at(cell).is_some())
        .count();
    (held >= board.haven_threshold()).then_some(Verdict {
        winner: Some(acting),
        reason: GameOverReason::Haven,
    })
}

impl GameSession {
    /// Resolves one move or attack by `slot`.
    pub fn perform_action(
        &mut self,
        slot: PlayerSlot,
        req: &ActionRequest,
    ) -> Result<Outbound, GameError> {
        self.expect_phase(self.state.phase == Phase::Action)?;
        self.expect_turn(slot)?;

        let pawn = self.players[slot.index()]
            .pawn(req.pawn_id)
            .ok_or(GameError::PawnNotFound(req.pawn_id))?;
        if !pawn.is_active || pawn.linked_card.is_none() {
            return Err(GameError::PawnNotActive(req.pawn_id));
        }
        if pawn.stamina() == 0 {
            return Err(GameError::InsufficientStamina {
                pawn: req.pawn_id,
                needed: 1,
                remaining: 0,
            });
        }

        let plan = match req.action_type {
            ActionKind::Move => self.plan_move(slot, req)?,
            ActionKind::Attack => self.plan_attack(slot, req)?,
        };
        let report = self.apply(slot, req, plan);
        self.state.acted_pawn_ids_this_cycle.insert(req.pawn_id);
        if report.eliminated_pawn_ids.contains(&req.pawn_id) {
            self.state.forget_pawn(req.pawn_id);
        }

        let mut out = vec![(Recipient::All, ServerMessage::ActionPerformed(report))];
        if let Some(verdict) = victory(&self.board, &self.players, slot) {
            self.finish(verdict);
            out.push((
                Recipient::All,
                ServerMessage::GameOver {
                    winner: verdict.winner,
                    reason: verdict.reason,
                },
            ));
            return Ok(out);
        }
        self.advance_turn(slot, &mut out);
        Ok(out)
    }

    /// `slot` declares it cannot act. Re-runs turn advancement; the board
    /// is left as it is.
    pub fn cannot_act(&mut self, slot: PlayerSlot) -> Result<Outbound, GameError> {
        self.expect_phase(self.state.phase == Phase::Action)?;
        self.expect_turn(slot)?;

        let mut out = Outbound::new();
        self.advance_turn(slot, &mut out);
        Ok(out)
    }

    fn plan_move(&self, slot: PlayerSlot, req: &ActionRequest) -> Result<Plan, GameError> {
        let (Some(x), Some(y)) = (req.target_x, req.target_y) else {
            return Err(GameError::InvalidTarget(
                "move needs targetX and targetY".into(),
            ));
        };
        let to = Position::new(x, y);
        let pawn = self.own_pawn(slot, req.pawn_id)?;

        if !self.board.contains(to) {
            return Err(GameError::InvalidTarget(format!("{to} is off the board")));
        }
        if to == pawn.position {
            return Err(GameError::InvalidTarget(format!("{} is already at {to}", pawn.id)));
        }
        if occupant(&self.players, to).is_some() {
            return Err(GameError::InvalidTarget(format!("{to} is occupied")));
        }
        let cost = pawn.position.distance(to);
        if cost > pawn.stamina() {
            return Err(GameError::InsufficientStamina {
                pawn: pawn.id,
                needed: cost,
                remaining: pawn.stamina(),
            });
        }
        Ok(Plan::Move { to, cost })
    }

    fn plan_attack(&self, slot: PlayerSlot, req: &ActionRequest) -> Result<Plan, GameError> {
        let Some(target) = req.target_pawn_id else {
            return Err(GameError::InvalidTarget("attack needs targetPawnId".into()));
        };
        let attacker = self.own_pawn(slot, req.pawn_id)?;
        if self.players[slot.index()].pawn(target).is_some() {
            return Err(GameError::InvalidTarget(format!(
                "{target} is one of your own pawns"
            )));
        }
        let defender = self.players[slot.other().index()]
            .pawn(target)
            .ok_or(GameError::PawnNotFound(target))?;
        if attacker.position.distance(defender.position) != 1 {
            return Err(GameError::InvalidTarget(format!(
                "{target} is not adjacent to {}",
                attacker.id
            )));
        }

        let dmg_to_defender = attacker.attack();
        let dmg_to_attacker = if defender.is_active {
            defender.attack().saturating_sub(self.config.counter_penalty)
        } else {
            0
        };
        let defender_hp = defender.current_hp.map(|hp| hp - dmg_to_defender as i32);
        let defender_eliminated = match defender_hp {
            Some(hp) => hp <= 0,
            None => dmg_to_defender > 0,
        };
        let attacker_hp = attacker.current_hp.unwrap_or(0) - dmg_to_attacker as i32;
        let attacker_eliminated = attacker_hp <= 0;

        let vacated = defender.position;
        let third_party = |cell: Position| {
            occupant(&self.players, cell)
                .is_some_and(|p| p.id != attacker.id && p.id != defender.id)
        };
        let relocates = defender_eliminated && !attacker_eliminated && !third_party(vacated);

        let mut cost = 1;
        let mut relocate_to = None;
        if relocates {
            let dest = match (req.target_x, req.target_y) {
                (Some(x), Some(y)) => Position::new(x, y),
                (None, None) => vacated,
                _ => {
                    return Err(GameError::InvalidTarget(
                        "reposition needs both targetX and targetY".into(),
                    ));
                }
            };
            if dest != vacated {
                if !self.board.contains(dest) {
                    return Err(GameError::InvalidTarget(format!("{dest} is off the board")));
                }
                if third_party(dest) {
                    return Err(GameError::InvalidTarget(format!("{dest} is occupied")));
                }
                cost += vacated.distance(dest);
            }
            relocate_to = Some(dest);
        }

        if cost > attacker.stamina() {
            return Err(GameError::InsufficientStamina {
                pawn: attacker.id,
                needed: cost,
                remaining: attacker.stamina(),
            });
        }

        Ok(Plan::Attack {
            defender: target,
            dmg_to_defender,
            dmg_to_attacker,
            defender_hp,
            attacker_hp,
            defender_eliminated,
            attacker_eliminated,
            relocate_to,
            cost,
        })
    }

    fn apply(&mut self, slot: PlayerSlot, req: &ActionRequest, plan: Plan) -> ActionReport {
        let mut report = ActionReport {
            action_type: req.action_type,
            pawn_id: req.pawn_id,
            acting_player: slot,
            target_x: req.target_x,
            target_y: req.target_y,
            target_pawn_id: req.target_pawn_id,
            damage_dealt: None,
            eliminated_pawn_ids: Vec::new(),
            updated_pawn: Default::default(),
            attacker_moved_to: None,
        };

        match plan {
            Plan::Move { to, cost } => {
                if let Some(pawn) = self.players[slot.index()].pawn_mut(req.pawn_id) {
                    pawn.position = to;
                    pawn.remaining_stamina = Some(pawn.stamina().saturating_sub(cost));
                    report.updated_pawn = pawn.status();
                }
                tracing::debug!(%slot, pawn = %req.pawn_id, %to, cost, "pawn moved");
            }
            Plan::Attack {
                defender,
                dmg_to_defender,
                dmg_to_attacker,
                defender_hp,
                attacker_hp,
                defender_eliminated,
                attacker_eliminated,
                relocate_to,
                cost,
            } => {
                let enemy = &mut self.players[slot.other().index()];
                if let Some(pawn) = enemy.pawn_mut(defender) {
                    pawn.current_hp = defender_hp;
                }
                if defender_eliminated {
                    enemy.remove_pawn(defender);
                    self.state.forget_pawn(defender);
                    report.eliminated_pawn_ids.push(defender);
                }

                let own = &mut self.players[slot.index()];
                if let Some(pawn) = own.pawn_mut(req.pawn_id) {
                    pawn.current_hp = Some(attacker_hp);
                    pawn.remaining_stamina = Some(pawn.stamina().saturating_sub(cost));
                    if let Some(dest) = relocate_to {
                        pawn.position = dest;
                    }
                    report.updated_pawn = pawn.status();
                }
                if attacker_eliminated {
                    own.remove_pawn(req.pawn_id);
                    report.eliminated_pawn_ids.push(req.pawn_id);
                }

                report.attacker_moved_to = relocate_to;
                report.damage_dealt = Some(DamageReport {
                    attacker_id: req.pawn_id,
                    defender_id: defender,
                    dmg_to_attacker,
                    dmg_to_defender,
                });
                tracing::debug!(
                    %slot,
                    attacker = %req.pawn_id,
                    %defender,
                    dmg_to_defender,
                    dmg_to_attacker,
                    eliminated = ?report.eliminated_pawn_ids,
                    "attack resolved"
                );
            }
        }
        report
    }

    fn own_pawn(&self, slot: PlayerSlot, id: PawnId) -> Result<&crate::Pawn, GameError> {
        self.players[slot.index()]
            .pawn(id)
            .ok_or(GameError::PawnNotFound(id))
    }

    fn advance_turn(&mut self, acting: PlayerSlot, out: &mut Outbound) {
        match next_turn(&self.board, &self.players, acting) {
            TurnOutcome::PassTurn(current_player) => {
                self.state.current_player = current_player;
                out.push((Recipient::All, ServerMessage::NextTurn { current_player }));
            }
            TurnOutcome::SameTurn => {
                self.state.current_player = acting;
                out.push((
                    Recipient::All,
                    ServerMessage::NextTurn {
                        current_player: acting,
                    },
                ));
            }
            TurnOutcome::NewCycle => self.roll_cycle(out),
        }
    }

    /// Refills stamina and picks the first actor. An action phase where
    /// nobody can act rolls straight into the next cycle.
    pub(crate) fn begin_action_phase(&mut self, out: &mut Outbound) {
        self.state.phase = Phase::Action;
        self.state.acted_pawn_ids_this_cycle.clear();
        self.state.initial_active_pawn_ids.clear();
        for player in &mut self.players {
            for pawn in player.pawns.iter_mut().filter(|p| p.is_active) {
                pawn.refresh_stamina();
                self.state.initial_active_pawn_ids.insert(pawn.id);
            }
        }

        let initiative = self.state.cycle_initiative_player.unwrap_or(PlayerSlot::One);
        let first = [initiative, initiative.other()]
            .into_iter()
            .find(|&s| can_act(&self.board, &self.players, s));
        self.state.current_player = first.unwrap_or(initiative);

        tracing::info!(
            cycle = self.state.cycle_number,
            active = self.state.initial_active_pawn_ids.len(),
            first = ?first,
            "action phase started"
        );
        out.push((
            Recipient::All,
            ServerMessage::StartActionPhase {
                cycle: self.state.cycle_number,
                current_player: self.state.current_player,
                cycle_initiative_player: initiative,
                pawns: pawn_views(&self.players),
            },
        ));

        if self.state.initial_active_pawn_ids.is_empty() || first.is_none() {
            self.roll_cycle(out);
        }
    }

    fn roll_cycle(&mut self, out: &mut Outbound) {
        for player in &mut self.players {
            player.reset_cycle();
        }
        let state = &mut self.state;
        state.cycle_number += 1;
        state.round_number = 1;
        state.phase = Phase::Define { round: 1 };
        state.current_player = definer(1);
        state.initiative_player = None;
        state.cycle_initiative_player = None;
        state.rps = Default::default();
        state.initial_active_pawn_ids.clear();
        state.acted_pawn_ids_this_cycle.clear();

        tracing::info!(cycle = state.cycle_number, "new cycle");
        out.push((
            Recipient::All,
            ServerMessage::NewCycle {
                cycle: state.cycle_number,
                round: state.round_number,
                phase: state.phase,
                current_player: state.current_player,
            },
        ));
    }
}
