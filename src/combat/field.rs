//! The battlefield
//!
//! Owns the teams, the tuning config and the roller. Skills act on the
//! field by id; every lookup and target is validated here so a stale id
//! becomes an error instead of a panic.

use std::collections::VecDeque;

use super::buff::Buff;
use super::combatant::{Combatant, CombatantId};
use super::damage::{DamageKind, Hit};
use super::events::ActionEvent;
use super::roll::Roller;
use super::team::{Team, TeamId};
use crate::config::CombatConfig;
use crate::error::{CombatError, Result};

/// Teams and shared encounter state
#[derive(Debug)]
pub struct Battlefield {
    teams: Vec<Team>,
    config: CombatConfig,
    roller: Roller,
}

fn member(teams: &[Team], id: CombatantId) -> Option<&Combatant> {
    teams.get(id.team.0).and_then(|t| t.combatant(id.slot))
}

fn member_mut(teams: &mut [Team], id: CombatantId) -> Option<&mut Combatant> {
    teams.get_mut(id.team.0).and_then(|t| t.combatant_mut(id.slot))
}

impl Battlefield {
    pub fn new(config: CombatConfig, roller: Roller) -> Self {
        Self {
            teams: Vec::new(),
            config,
            roller,
        }
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub(crate) fn push_team(&mut self, mut team: Team) -> TeamId {
        let id = TeamId(self.teams.len());
        team.assign_id(id);
        self.teams.push(team);
        id
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn team(&self, id: TeamId) -> Result<&Team> {
        self.teams.get(id.0).ok_or(CombatError::UnknownTeam(id))
    }

    pub fn team_mut(&mut self, id: TeamId) -> Result<&mut Team> {
        self.teams.get_mut(id.0).ok_or(CombatError::UnknownTeam(id))
    }

    pub fn combatant(&self, id: CombatantId) -> Result<&Combatant> {
        member(&self.teams, id).ok_or(CombatError::UnknownCombatant(id))
    }

    pub fn combatant_mut(&mut self, id: CombatantId) -> Result<&mut Combatant> {
        member_mut(&mut self.teams, id).ok_or(CombatError::UnknownCombatant(id))
    }

    /// Every combatant in registration order
    pub fn combatants(&self) -> impl Iterator<Item = &Combatant> {
        self.teams.iter().flat_map(|t| t.combatants().iter())
    }

    /// Selectable teams other than `team`
    pub fn opposing_teams(&self, team: TeamId) -> Vec<TeamId> {
        self.teams
            .iter()
            .filter(|t| t.id() != team && t.is_selectable())
            .map(Team::id)
            .collect()
    }

    /// Members of `team` that can still be hit
    pub fn living_members(&self, team: TeamId) -> Vec<CombatantId> {
        self.teams
            .get(team.0)
            .map(|t| {
                t.combatants()
                    .iter()
                    .filter(|c| c.is_alive())
                    .map(Combatant::id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Living members of every team opposing `actor`
    pub fn enemies_of(&self, actor: CombatantId) -> Vec<CombatantId> {
        self.opposing_teams(actor.team)
            .into_iter()
            .flat_map(|t| self.living_members(t))
            .collect()
    }

    /// Living members on the same roster as `actor`, including it
    pub fn allies_of(&self, actor: CombatantId) -> Vec<CombatantId> {
        self.living_members(actor.team)
    }

    /// Living slot neighbours of `target`
    pub fn neighbours(&self, target: CombatantId) -> Vec<CombatantId> {
        let mut found = Vec::new();
        let candidates = [
            target.slot.checked_sub(1),
            target.slot.checked_add(1),
        ];
        for slot in candidates.into_iter().flatten() {
            let id = CombatantId::new(target.team, slot);
            if member(&self.teams, id).is_some_and(Combatant::is_alive) {
                found.push(id);
            }
        }
        found
    }

    /// Target must be alive and on a selectable opposing team
    pub fn validate_enemy(&self, actor: CombatantId, target: CombatantId) -> Result<CombatantId> {
        let selectable = self.team(target.team).map(Team::is_selectable).unwrap_or(false);
        let alive = member(&self.teams, target).is_some_and(Combatant::is_alive);
        if target.team == actor.team || !selectable || !alive {
            return Err(CombatError::InvalidTarget(target));
        }
        Ok(target)
    }

    /// Target must be alive and on the actor's team
    pub fn validate_ally(&self, actor: CombatantId, target: CombatantId) -> Result<CombatantId> {
        let alive = member(&self.teams, target).is_some_and(Combatant::is_alive);
        if target.team != actor.team || !alive {
            return Err(CombatError::InvalidTarget(target));
        }
        Ok(target)
    }

    /// Random living enemy, preferring the first opposing team
    pub fn random_enemy(&mut self, actor: CombatantId) -> Option<CombatantId> {
        for team in self.opposing_teams(actor.team) {
            let living = self.living_members(team);
            if let Some(id) = self.roller.pick(&living) {
                return Some(*id);
            }
        }
        None
    }

    /// Resolve one hit: attacker rolls, defender mitigates, events go out
    pub fn strike(
        &mut self,
        attacker: CombatantId,
        target: CombatantId,
        kind: DamageKind,
        base: f64,
    ) -> Result<Hit> {
        let source = member(&self.teams, attacker).ok_or(CombatError::UnknownCombatant(attacker))?;
        let defender = member(&self.teams, target).ok_or(CombatError::InvalidTarget(target))?;
        if !defender.is_alive() {
            return Err(CombatError::InvalidTarget(target));
        }
        let profile = source.profile();
        let roll = source.on_attack(base, defender, &mut self.roller, &self.config);

        let defender = member_mut(&mut self.teams, target).ok_or(CombatError::InvalidTarget(target))?;
        let damage = defender.attacked(kind, roll.amount, &profile, roll.missed, &self.config);
        let defeated = !defender.is_alive();

        if attacker.team != target.team {
            self.record(ActionEvent::Attack {
                origin: attacker,
                target,
                amount: damage,
                kind,
                missed: roll.missed,
                critical: roll.critical,
            });
            if defeated {
                tracing::info!(%attacker, defender = %target, "combatant defeated");
                self.record(ActionEvent::Defeated { combatant: target });
            }
        }

        Ok(Hit {
            damage,
            critical: roll.critical,
            missed: roll.missed,
        })
    }

    /// Deliver an event to every team, then any follow-ups it caused
    pub fn record(&mut self, event: ActionEvent) {
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            for team in &mut self.teams {
                queue.extend(team.record_event(&event, &self.config));
            }
        }
    }

    /// Attach a buff; false when a stack limit refused it
    pub fn attach_buff(&mut self, target: CombatantId, buff: Buff) -> Result<bool> {
        Ok(self.combatant_mut(target)?.add_buff(buff, false))
    }

    /// Remove matching buffs, reporting each as expired
    pub fn pop_buffs<F>(&mut self, target: CombatantId, pred: F) -> Result<Vec<Buff>>
    where
        F: FnMut(&Buff) -> bool,
    {
        let popped = self.combatant_mut(target)?.pop_buffs(pred);
        self.report_expired(target, &popped);
        Ok(popped)
    }

    /// Add final meter charge, announcing a fill
    pub fn charge_meter(&mut self, id: CombatantId, amount: f64) -> Result<()> {
        if self.combatant_mut(id)?.charge_meter(amount) {
            self.record(ActionEvent::MeterFilled { combatant: id });
        }
        Ok(())
    }

    pub fn begin_turn(&mut self, id: CombatantId) -> Result<()> {
        let expired = self.combatant_mut(id)?.begin_turn();
        self.report_expired(id, &expired);
        Ok(())
    }

    pub fn end_turn(&mut self, id: CombatantId) -> Result<()> {
        self.combatant_mut(id)?.end_turn();
        Ok(())
    }

    fn report_expired(&mut self, target: CombatantId, buffs: &[Buff]) {
        for buff in buffs {
            self.record(ActionEvent::BuffExpired {
                target,
                buff: buff.label(),
            });
        }
    }
}
