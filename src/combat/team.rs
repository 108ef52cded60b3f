//! Teams
//!
//! A team owns its combatants, a shared skill point pool and, when a human
//! drives it, a controller plus an event log to narrate from.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::combatant::{Combatant, CombatantId};
use super::control::Controller;
use super::events::ActionEvent;
use crate::config::CombatConfig;
use crate::error::{CombatError, Result};

/// Index of a team within its scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(pub usize);

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One side of an encounter
pub struct Team {
    id: TeamId,
    name: String,
    combatants: Vec<Combatant>,
    skill_points: u32,
    max_skill_points: u32,
    selectable: bool,
    controller: Option<Arc<dyn Controller>>,
    events: Vec<ActionEvent>,
}

impl std::fmt::Debug for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Team")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("combatants", &self.combatants)
            .field("skill_points", &self.skill_points)
            .field("max_skill_points", &self.max_skill_points)
            .field("selectable", &self.selectable)
            .field("controlled", &self.controller.is_some())
            .field("events", &self.events.len())
            .finish()
    }
}

impl Team {
    /// An uncontrolled team with the configured skill point pool
    pub fn new(name: impl Into<String>, config: &CombatConfig) -> Self {
        Self {
            id: TeamId(0),
            name: name.into(),
            combatants: Vec::new(),
            skill_points: config.skill_points.min(config.max_skill_points),
            max_skill_points: config.max_skill_points,
            selectable: true,
            controller: None,
            events: Vec::new(),
        }
    }

    /// A team driven by an external controller
    pub fn controlled(
        name: impl Into<String>,
        config: &CombatConfig,
        controller: Arc<dyn Controller>,
    ) -> Self {
        let mut team = Self::new(name, config);
        team.controller = Some(controller);
        team
    }

    pub fn with_combatant(mut self, combatant: Combatant) -> Self {
        self.register_combatant(combatant);
        self
    }

    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    /// Append a combatant, assigning it the next slot
    pub fn register_combatant(&mut self, mut combatant: Combatant) -> &mut Self {
        combatant.assign_id(CombatantId::new(self.id, self.combatants.len()));
        self.combatants.push(combatant);
        self
    }

    /// Renumber the team and its members once the scheduler accepts it
    pub(crate) fn assign_id(&mut self, id: TeamId) {
        self.id = id;
        for (slot, combatant) in self.combatants.iter_mut().enumerate() {
            combatant.assign_id(CombatantId::new(id, slot));
        }
    }

    pub fn id(&self) -> TeamId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn combatants(&self) -> &[Combatant] {
        &self.combatants
    }

    pub fn combatants_mut(&mut self) -> &mut [Combatant] {
        &mut self.combatants
    }

    pub fn combatant(&self, slot: usize) -> Option<&Combatant> {
        self.combatants.get(slot)
    }

    pub fn combatant_mut(&mut self, slot: usize) -> Option<&mut Combatant> {
        self.combatants.get_mut(slot)
    }

    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }

    pub fn skill_points(&self) -> u32 {
        self.skill_points
    }

    pub fn max_skill_points(&self) -> u32 {
        self.max_skill_points
    }

    /// Spend skill points; nothing changes when the pool is too small
    pub fn reduce_skill_points(&mut self, amount: u32) -> Result<u32> {
        if amount > self.skill_points {
            return Err(CombatError::InsufficientSkillPoints {
                required: amount,
                available: self.skill_points,
            });
        }
        self.skill_points -= amount;
        Ok(self.skill_points)
    }

    /// Gain skill points up to the maximum
    pub fn add_skill_points(&mut self, amount: u32) -> u32 {
        self.skill_points = self
            .skill_points
            .saturating_add(amount)
            .min(self.max_skill_points);
        self.skill_points
    }

    pub fn is_selectable(&self) -> bool {
        self.selectable
    }

    pub fn set_selectable(&mut self, selectable: bool) {
        self.selectable = selectable;
    }

    pub fn is_controlled(&self) -> bool {
        self.controller.is_some()
    }

    pub fn controller(&self) -> Option<&Arc<dyn Controller>> {
        self.controller.as_ref()
    }

    /// Any member still able to act
    pub fn has_actionable_member(&self) -> bool {
        self.combatants.iter().any(Combatant::is_actionable)
    }

    /// Log an event (controlled teams only) and let every member react.
    /// Returns follow-up events raised by the members.
    pub fn record_event(&mut self, event: &ActionEvent, config: &CombatConfig) -> Vec<ActionEvent> {
        if self.is_controlled() {
            self.events.push(event.clone());
        }
        self.combatants
            .iter_mut()
            .filter_map(|c| c.on_event(event, config))
            .collect()
    }

    pub fn events(&self) -> &[ActionEvent] {
        &self.events
    }

    /// Take the accumulated log
    pub fn drain_events(&mut self) -> Vec<ActionEvent> {
        std::mem::take(&mut self.events)
    }
}
