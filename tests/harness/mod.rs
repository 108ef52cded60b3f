//! Integration Test Harness
//!
//! Builds ready-to-run encounters:
//! - `Arena` - one controlled hero team against a team of target bots
//! - Deterministic rolls through a fixed seed
//!
//! # Example
//!
//! ```rust,ignore
//! let arena = Arena::new().scripted([ChoiceOutcome::Forfeit]);
//! let mut scheduler = arena.build();
//! assert_eq!(scheduler.run().await.unwrap(), None);
//! ```

#![allow(dead_code)]

use std::sync::Arc;

use skirmish::combat::{
    AutoPilot, ChoiceOutcome, Combatant, CombatantId, Controller, Roller, Scheduler,
    ScriptedController, Team, TeamId,
};
use skirmish::config::CombatConfig;
use skirmish::roster::{CharacterSheet, HeroKind, SimpleMonster};

pub const HEROES: TeamId = TeamId(0);
pub const BOTS: TeamId = TeamId(1);

pub fn hero() -> CombatantId {
    CombatantId::new(HEROES, 0)
}

pub fn bot(slot: usize) -> CombatantId {
    CombatantId::new(BOTS, slot)
}

/// Encounter builder
pub struct Arena {
    pub config: CombatConfig,
    pub seed: u64,
    heroes: Vec<Combatant>,
    bots: Vec<Combatant>,
    controller: Arc<dyn Controller>,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena {
    pub fn new() -> Self {
        Self {
            config: CombatConfig::default(),
            seed: 42,
            heroes: Vec::new(),
            bots: Vec::new(),
            controller: Arc::new(AutoPilot),
        }
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Add a fresh hero with no experience
    pub fn hero(self, kind: HeroKind) -> Self {
        let combatant = CharacterSheet::new(kind).into_combatant(&self.config);
        self.hero_combatant(combatant)
    }

    pub fn hero_combatant(mut self, combatant: Combatant) -> Self {
        self.heroes.push(combatant);
        self
    }

    /// Add target bots of the given level
    pub fn bots(mut self, level: u32, count: usize) -> Self {
        for _ in 0..count {
            self.bots.push(SimpleMonster::target_bot(level, &self.config));
        }
        self
    }

    pub fn bot_combatant(mut self, combatant: Combatant) -> Self {
        self.bots.push(combatant);
        self
    }

    pub fn controller(mut self, controller: Arc<dyn Controller>) -> Self {
        self.controller = controller;
        self
    }

    /// Drive the heroes with a script; returns the script handle too
    pub fn scripted(
        self,
        script: impl IntoIterator<Item = ChoiceOutcome>,
    ) -> (Self, Arc<ScriptedController>) {
        let scripted = Arc::new(ScriptedController::new(script));
        (self.controller(scripted.clone()), scripted)
    }

    /// Register both teams and run setup
    pub fn build(self) -> Scheduler {
        let mut scheduler = Scheduler::with_roller(self.config.clone(), Roller::seeded(self.seed));
        let mut heroes = Team::controlled("heroes", &self.config, self.controller);
        for combatant in self.heroes {
            heroes.register_combatant(combatant);
        }
        let mut bots = Team::new("bots", &self.config);
        for combatant in self.bots {
            bots.register_combatant(combatant);
        }
        scheduler.register_team(heroes).expect("heroes register");
        scheduler.register_team(bots).expect("bots register");
        scheduler.setup().expect("setup");
        scheduler
    }
}

/// A Delta that never misses and never crits
pub fn steady_delta(config: &CombatConfig) -> Combatant {
    let mut delta = CharacterSheet::new(HeroKind::Delta).into_combatant(config);
    delta.stats_mut().focus = -5000.0;
    delta.stats_mut().critical_chance = 0.0;
    delta
}
