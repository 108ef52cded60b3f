//! Encounter scheduler
//!
//! Runs a turn-based encounter between at most two teams:
//! - Registration and one-time setup
//! - Speed-based turn order (lowest scheduling value acts next)
//! - Automatic turns for built-in logic, prompted turns for controlled teams
//! - Termination when at most one team can act or the deadline passes

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::combatant::{Combatant, CombatantId, Control};
use super::control::{ActionPrompt, ChoiceOutcome, Controller, TargetOption};
use super::events::ActionEvent;
use super::field::Battlefield;
use super::roll::Roller;
use super::team::{Team, TeamId};
use crate::config::CombatConfig;
use crate::error::{CombatError, Result};
use crate::roster;

/// Maximum number of teams in one encounter
pub const MAX_TEAMS: usize = 2;

/// Lifecycle of an encounter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterState {
    /// Teams may still be registered
    Setup,
    Running,
    Won(TeamId),
    /// Nobody is left standing
    Draw,
    /// The deadline passed or a controller forfeited
    TimedOut,
}

impl EncounterState {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            EncounterState::Won(_) | EncounterState::Draw | EncounterState::TimedOut
        )
    }
}

/// How a single turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnEnd {
    Completed,
    Forfeit,
}

/// Drives one encounter from setup to a result
#[derive(Debug)]
pub struct Scheduler {
    id: Uuid,
    field: Battlefield,
    deadline: DateTime<Utc>,
    state: EncounterState,
    actions: u64,
}

impl Scheduler {
    /// New encounter with an entropy-seeded roller
    pub fn new(config: CombatConfig) -> Self {
        Self::with_roller(config, Roller::from_entropy())
    }

    /// New encounter with the given roller; the deadline starts now
    pub fn with_roller(config: CombatConfig, roller: Roller) -> Self {
        let deadline = Duration::from_std(config.time_limit())
            .ok()
            .and_then(|limit| Utc::now().checked_add_signed(limit))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            id: Uuid::new_v4(),
            field: Battlefield::new(config, roller),
            deadline,
            state: EncounterState::Setup,
            actions: 0,
        }
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> EncounterState {
        self.state
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// Actions taken so far
    pub fn actions(&self) -> u64 {
        self.actions
    }

    pub fn config(&self) -> &CombatConfig {
        self.field.config()
    }

    pub fn field(&self) -> &Battlefield {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut Battlefield {
        &mut self.field
    }

    pub fn teams(&self) -> &[Team] {
        self.field.teams()
    }

    pub fn team(&self, id: TeamId) -> Result<&Team> {
        self.field.team(id)
    }

    pub fn combatant(&self, id: CombatantId) -> Result<&Combatant> {
        self.field.combatant(id)
    }

    /// Add a team; at most two are accepted
    pub fn register_team(&mut self, team: Team) -> Result<TeamId> {
        if self.state != EncounterState::Setup {
            return Err(CombatError::AlreadySetUp);
        }
        if self.field.teams().len() >= MAX_TEAMS {
            return Err(CombatError::TooManyTeams);
        }
        let id = self.field.push_team(team);
        debug!(encounter = %self.id, team = %id, "team registered");
        Ok(id)
    }

    /// One-time setup: requires a controlled team, then lets every
    /// combatant prepare against its opponents
    pub fn setup(&mut self) -> Result<()> {
        if self.state != EncounterState::Setup {
            return Err(CombatError::AlreadySetUp);
        }
        if !self.field.teams().iter().any(Team::is_controlled) {
            return Err(CombatError::NoControllableTeam);
        }

        let ids: Vec<CombatantId> = self.field.combatants().map(Combatant::id).collect();
        for id in ids {
            let opponents = self.get_opposing_teams(id.team);
            roster::on_setup(&mut self.field, id, &opponents)?;
        }

        self.state = EncounterState::Running;
        info!(
            encounter = %self.id,
            teams = self.field.teams().len(),
            combatants = self.field.combatants().count(),
            "encounter set up"
        );
        Ok(())
    }

    /// Selectable teams other than `team`
    pub fn get_opposing_teams(&self, team: TeamId) -> Vec<TeamId> {
        self.field.opposing_teams(team)
    }

    /// Teams with at least one actionable member
    pub fn actionable_teams(&self) -> Vec<TeamId> {
        self.field
            .teams()
            .iter()
            .filter(|t| t.has_actionable_member())
            .map(Team::id)
            .collect()
    }

    /// More than one team can still act
    pub fn is_continuable(&self) -> bool {
        self.actionable_teams().len() > 1
    }

    /// Pick the next actor and advance everyone else's clock by its wait.
    ///
    /// Ties go to the combatant registered first.
    pub fn get_action_combatant(&mut self) -> Option<CombatantId> {
        let base_ticks = self.field.config().base_ticks;
        let mut candidates: Vec<(CombatantId, f64)> = self
            .field
            .combatants()
            .filter(|c| c.is_actionable())
            .map(|c| (c.id(), c.scheduling_value(base_ticks)))
            .collect();
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

        let (chosen, wait) = *candidates.first()?;
        for (id, _) in candidates.iter().skip(1) {
            if let Ok(c) = self.field.combatant_mut(*id) {
                c.reduce_scheduling_value(wait);
            }
        }
        if let Ok(c) = self.field.combatant_mut(chosen) {
            c.reset_scheduling_value();
        }
        debug!(encounter = %self.id, actor = %chosen, wait, "next actor");
        Some(chosen)
    }

    /// Run the encounter to completion. Returns the winning team, or `None`
    /// for a draw, a timeout or a forfeit.
    pub async fn run(&mut self) -> Result<Option<TeamId>> {
        match self.state {
            EncounterState::Setup => return Err(CombatError::NotSetUp),
            EncounterState::Running => {}
            _ => return Ok(self.winner()),
        }

        while self.is_continuable() {
            let Some(actor) = self.get_action_combatant() else {
                break;
            };
            let end = self.action(actor).await?;
            self.actions += 1;

            if end == TurnEnd::Forfeit {
                warn!(encounter = %self.id, %actor, "controller forfeited");
                self.abort();
                return Ok(None);
            }
            if Utc::now() > self.deadline {
                warn!(encounter = %self.id, actions = self.actions, "encounter timed out");
                self.state = EncounterState::TimedOut;
                return Ok(None);
            }
        }

        let standing = self.actionable_teams();
        self.state = match standing.as_slice() {
            [winner] => EncounterState::Won(*winner),
            _ => EncounterState::Draw,
        };
        info!(encounter = %self.id, state = ?self.state, actions = self.actions, "encounter finished");
        Ok(self.winner())
    }

    /// Stop the encounter without a winner
    pub fn abort(&mut self) {
        self.state = EncounterState::TimedOut;
    }

    pub fn winner(&self) -> Option<TeamId> {
        match self.state {
            EncounterState::Won(team) => Some(team),
            _ => None,
        }
    }

    /// Take a controlled team's event log
    pub fn drain_events(&mut self, team: TeamId) -> Result<Vec<ActionEvent>> {
        Ok(self.field.team_mut(team)?.drain_events())
    }

    /// One full turn of `actor`
    async fn action(&mut self, actor: CombatantId) -> Result<TurnEnd> {
        self.field.begin_turn(actor)?;

        let controller = match self.field.combatant(actor)?.control() {
            Control::External => {
                let controller = self.field.team(actor.team)?.controller().cloned();
                if controller.is_none() {
                    warn!(%actor, "no controller for external combatant, playing automatically");
                }
                controller
            }
            Control::Automatic => None,
        };

        let end = match controller {
            Some(controller) => self.controlled_turn(actor, controller).await?,
            None => {
                self.automatic_turn(actor)?;
                TurnEnd::Completed
            }
        };

        if end == TurnEnd::Completed {
            roster::after_action(&mut self.field, actor)?;
        }
        self.field.end_turn(actor)?;
        Ok(end)
    }

    fn automatic_turn(&mut self, actor: CombatantId) -> Result<()> {
        let max_chain = self.field.config().max_instant_chain;
        let mut chained = 0;
        loop {
            let Some(choice) = roster::auto_choice(&mut self.field, actor)? else {
                debug!(%actor, "nothing to do");
                return Ok(());
            };
            match roster::execute_skill(&mut self.field, actor, choice) {
                Ok(outcome) if outcome.consumes_turn || chained >= max_chain => return Ok(()),
                Ok(_) => chained += 1,
                Err(e) if e.is_recoverable() => {
                    warn!(%actor, error = %e, "automatic action failed");
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn controlled_turn(
        &mut self,
        actor: CombatantId,
        controller: Arc<dyn Controller>,
    ) -> Result<TurnEnd> {
        let max_reprompts = self.field.config().max_reprompts;
        let max_chain = self.field.config().max_instant_chain;
        let mut failures = 0;
        let mut chained = 0;

        loop {
            let prompt = self.prompt(actor, failures)?;
            match controller.choose(&prompt).await {
                ChoiceOutcome::Chosen(choice) => {
                    match roster::execute_skill(&mut self.field, actor, choice) {
                        Ok(outcome) if outcome.consumes_turn || chained >= max_chain => {
                            return Ok(TurnEnd::Completed)
                        }
                        Ok(_) => chained += 1,
                        Err(e) if e.is_recoverable() => {
                            warn!(%actor, error = %e, attempt = failures, "invalid choice");
                            self.field.record(ActionEvent::Message { text: e.to_string() });
                            failures += 1;
                            if failures > max_reprompts {
                                self.pass_turn(actor)?;
                                return Ok(TurnEnd::Completed);
                            }
                        }
                        Err(e) => return Err(e),
                    }
                }
                ChoiceOutcome::Pass => {
                    debug!(%actor, "turn passed");
                    self.pass_turn(actor)?;
                    return Ok(TurnEnd::Completed);
                }
                ChoiceOutcome::TimedOut => {
                    warn!(%actor, "input timed out, passing");
                    self.pass_turn(actor)?;
                    return Ok(TurnEnd::Completed);
                }
                ChoiceOutcome::Forfeit => return Ok(TurnEnd::Forfeit),
            }
        }
    }

    fn pass_turn(&mut self, actor: CombatantId) -> Result<()> {
        self.field.team_mut(actor.team)?.add_skill_points(1);
        Ok(())
    }

    fn prompt(&mut self, actor: CombatantId, attempt: u32) -> Result<ActionPrompt> {
        let option = |field: &Battlefield, id: CombatantId| -> Result<TargetOption> {
            let c = field.combatant(id)?;
            Ok(TargetOption {
                id,
                name: c.name().to_string(),
                health: c.health(),
                max_health: c.max_health(),
                balance: c.balance(),
            })
        };
        let enemies = self
            .field
            .enemies_of(actor)
            .into_iter()
            .map(|id| option(&self.field, id))
            .collect::<Result<Vec<_>>>()?;
        let allies = self
            .field
            .allies_of(actor)
            .into_iter()
            .map(|id| option(&self.field, id))
            .collect::<Result<Vec<_>>>()?;

        let combatant = self.field.combatant(actor)?;
        let actor_name = combatant.name().to_string();
        let skills = roster::catalog(combatant);
        let final_meter = combatant.stats().final_meter;

        let team = self.field.team_mut(actor.team)?;
        Ok(ActionPrompt {
            actor,
            actor_name,
            skills,
            enemies,
            allies,
            skill_points: team.skill_points(),
            max_skill_points: team.max_skill_points(),
            final_meter,
            events: team.drain_events(),
            attempt,
        })
    }
}
