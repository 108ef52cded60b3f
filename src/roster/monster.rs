//! Monsters and fixtures
//!
//! Simple monsters scale with level through the monster curves and attack a
//! random living member of the first opposing team. The training dummy is a
//! fixed-stat punching bag for sandboxes and tests.

use super::curves;
use super::Role;
use crate::combat::{Battlefield, Combatant, CombatantId, DamageKind, Hit, StatBlock};
use crate::config::CombatConfig;
use crate::error::Result;

/// Level-scaled monster with a single attack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleMonster {
    level: u32,
    damage_kind: DamageKind,
}

impl SimpleMonster {
    pub fn new(level: u32, damage_kind: DamageKind) -> Self {
        Self { level, damage_kind }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn damage_kind(&self) -> DamageKind {
        self.damage_kind
    }

    /// Curve stats, starting at full health
    pub fn stats(&self, config: &CombatConfig) -> StatBlock {
        let mut stats = StatBlock::new(config);
        stats.max_health = curves::monster_max_health(self.level);
        stats.health = stats.max_health;
        stats.attack = curves::monster_attack(self.level);
        stats
    }

    pub fn into_combatant(self, name: impl Into<String>, config: &CombatConfig) -> Combatant {
        let stats = self.stats(config);
        Combatant::new(name, Role::Monster(self), stats)
    }

    /// Physical target bot of the given level
    pub fn target_bot(level: u32, config: &CombatConfig) -> Combatant {
        Self::new(level, DamageKind::Physical)
            .into_combatant(format!("Target Bot Lv.{}", level), config)
    }
}

/// Fixed-stat fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrainingDummy;

impl TrainingDummy {
    pub const MAX_HEALTH: f64 = 1000.0;
    /// Base damage of the dummy's physical swing
    pub const STRIKE: f64 = 15.0;

    pub fn spawn(name: impl Into<String>, config: &CombatConfig) -> Combatant {
        let mut stats = StatBlock::new(config);
        stats.max_health = Self::MAX_HEALTH;
        stats.health = Self::MAX_HEALTH;
        Combatant::new(name, Role::Dummy(TrainingDummy), stats)
    }
}

/// Basic attack of a monster or dummy
pub(super) fn strike(
    field: &mut Battlefield,
    actor: CombatantId,
    target: CombatantId,
) -> Result<Hit> {
    let attacker = field.combatant(actor)?;
    let (kind, base) = match attacker.role() {
        Role::Monster(monster) => (monster.damage_kind(), attacker.attack_value()),
        _ => (DamageKind::Physical, TrainingDummy::STRIKE),
    };
    field.strike(actor, target, kind, base)
}
