//! Combatant roster
//!
//! Concrete combatant kinds and their skill kits:
//! - Characters built from saved sheets (Delta, Moonlark)
//! - Level-scaled simple monsters (target bots)
//! - The training dummy fixture
//!
//! Plus the stat and experience curves they are built from.

pub mod curves;

mod character;
mod delta;
mod monster;
mod moonlark;
mod skills;

pub use character::{
    Character, CharacterSheet, Equipment, EquipmentGain, Hero, HeroKind, WeaponState,
    HERO_BASE_ATTACK, HERO_METER_THRESHOLD,
};
pub use curves::{CurrentLevel, ExperienceCurve};
pub use monster::{SimpleMonster, TrainingDummy};
pub use moonlark::MoonPhase;
pub use skills::{
    auto_choice, catalog, execute_skill, preferred_skill, SkillCost, SkillInfo, SkillOutcome,
    TargetKind, BASIC, FINAL, SKILL,
};

use tracing::debug;

use crate::combat::{Battlefield, CombatantId, TeamId};
use crate::error::Result;

/// What a combatant is
#[derive(Debug, Clone, PartialEq)]
pub enum Role {
    Character(Character),
    Monster(SimpleMonster),
    Dummy(TrainingDummy),
}

/// One-time preparation before the first turn: sheet buffs attach and
/// Moonlark enters its starting phase
pub fn on_setup(field: &mut Battlefield, actor: CombatantId, opponents: &[TeamId]) -> Result<()> {
    let combatant = field.combatant_mut(actor)?;
    let (buffs, phase) = match combatant.role_mut() {
        Role::Character(character) => (character.take_pending_buffs(), character.moon_phase()),
        Role::Monster(_) | Role::Dummy(_) => (Vec::new(), None),
    };
    for buff in buffs {
        combatant.add_buff(buff, false);
    }
    if let Some(phase) = phase {
        moonlark::enter_phase(field, actor, phase)?;
    }
    debug!(%actor, opponents = opponents.len(), "combatant ready");
    Ok(())
}

/// Bookkeeping after a completed action
pub fn after_action(field: &mut Battlefield, actor: CombatantId) -> Result<()> {
    let phase = match field.combatant(actor)?.role() {
        Role::Character(character) => character.moon_phase(),
        Role::Monster(_) | Role::Dummy(_) => None,
    };
    if let Some(phase) = phase {
        moonlark::enter_phase(field, actor, phase.next())?;
    }
    Ok(())
}
