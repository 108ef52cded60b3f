//! Moonlark: mental caster cycling through moon phases
//!
//! The phase advances `New -> Quarter -> Full -> New` after every completed
//! action, and entering a phase grants a one-round buff:
//! - New: speed +1.5
//! - Quarter: critical multiplier +0.5
//! - Full: attack x1.2 and +5% outgoing damage
//!
//! Skills place and consume moon seals on enemies; the final changes shape
//! with the phase.

use serde::{Deserialize, Serialize};

use super::skills::{SkillCost, SkillInfo, TargetKind, BASIC, FINAL, SKILL};
use super::Role;
use crate::combat::{Battlefield, Buff, CombatantId, DamageKind, Marker, Stat};
use crate::error::{CombatError, Result};

const KIND: DamageKind = DamageKind::Mental;

const BASIC_RATIO: f64 = 0.52;
const NEW_SKILL_RATIO: f64 = 0.8;
const QUARTER_SKILL_RATIO: f64 = 0.7;
const QUARTER_SEAL_BONUS: f64 = 0.10;
const FULL_SKILL_RATIO: f64 = 1.0;
const FULL_SKILL_SEALS: usize = 2;
const NEW_FINAL_ALLY_BONUS: f64 = 0.20;
const QUARTER_FINAL_RATIO: f64 = 0.97;
const QUARTER_FINAL_SEAL_BONUS: f64 = 0.15;
const FULL_FINAL_RATIO: f64 = 1.05;
const FULL_FINAL_SEALS: usize = 4;
const FULL_FINAL_SLOW: f64 = 0.8;
const ECLIPSE_ROUNDS: i32 = 2;

/// Phase of Moonlark's cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoonPhase {
    #[default]
    New,
    Quarter,
    Full,
}

impl MoonPhase {
    pub fn next(self) -> Self {
        match self {
            MoonPhase::New => MoonPhase::Quarter,
            MoonPhase::Quarter => MoonPhase::Full,
            MoonPhase::Full => MoonPhase::New,
        }
    }

    /// One-round buffs granted on entering the phase
    pub fn buffs(self) -> Vec<Buff> {
        match self {
            MoonPhase::New => vec![Buff::flat(Stat::Speed, 1.5, 1)],
            MoonPhase::Quarter => vec![Buff::flat(Stat::CriticalMultiplier, 0.5, 1)],
            MoonPhase::Full => vec![Buff::percent(Stat::Attack, 1.2, 1), Buff::outgoing(0.05, 1)],
        }
    }
}

impl std::fmt::Display for MoonPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MoonPhase::New => "new moon",
            MoonPhase::Quarter => "quarter moon",
            MoonPhase::Full => "full moon",
        };
        write!(f, "{}", s)
    }
}

pub(super) fn catalog(phase: MoonPhase) -> Vec<SkillInfo> {
    let (skill_name, skill_target) = match phase {
        MoonPhase::New => ("Crescent Mark", TargetKind::Enemy),
        MoonPhase::Quarter => ("Waning Cut", TargetKind::Enemy),
        MoonPhase::Full => ("Moonflood", TargetKind::None),
    };
    let (final_name, final_target) = match phase {
        MoonPhase::New => ("Moonrise", TargetKind::None),
        MoonPhase::Quarter => ("Half-Light Verdict", TargetKind::Enemy),
        MoonPhase::Full => ("Lunar Eclipse", TargetKind::None),
    };
    vec![
        SkillInfo {
            index: BASIC,
            name: "Pale Touch",
            cost: SkillCost::Grants(1),
            consumes_turn: true,
            target: TargetKind::Enemy,
        },
        SkillInfo {
            index: SKILL,
            name: skill_name,
            cost: SkillCost::SkillPoints(1),
            consumes_turn: true,
            target: skill_target,
        },
        SkillInfo {
            index: FINAL,
            name: final_name,
            cost: SkillCost::FinalMeter,
            consumes_turn: false,
            target: final_target,
        },
    ]
}

/// Switch phase and grant the phase buffs
pub(super) fn enter_phase(field: &mut Battlefield, actor: CombatantId, phase: MoonPhase) -> Result<()> {
    let combatant = field.combatant_mut(actor)?;
    if let Role::Character(character) = combatant.role_mut() {
        character.set_moon_phase(phase);
    }
    for buff in phase.buffs() {
        combatant.add_buff(buff, false);
    }
    tracing::debug!(%actor, %phase, "moon phase");
    Ok(())
}

fn seals_on(field: &Battlefield, target: CombatantId) -> Result<usize> {
    Ok(field.combatant(target)?.buffs().count_marker(Marker::MoonSeal))
}

fn place_seals(field: &mut Battlefield, target: CombatantId, count: usize) -> Result<()> {
    for _ in 0..count {
        field.attach_buff(target, Buff::moon_seal())?;
    }
    Ok(())
}

/// One-shot damage bonus for the rest of this action
fn empower(field: &mut Battlefield, actor: CombatantId, bonus: f64) -> Result<()> {
    if bonus > 0.0 {
        field.attach_buff(actor, Buff::outgoing(bonus, 0))?;
    }
    Ok(())
}

pub(super) fn execute(
    field: &mut Battlefield,
    actor: CombatantId,
    index: usize,
    target: Option<CombatantId>,
    phase: MoonPhase,
) -> Result<()> {
    let attack = field.combatant(actor)?.attack_value();
    let required = || target.ok_or(CombatError::MissingTarget);

    match (index, phase) {
        (BASIC, _) => {
            field.strike(actor, required()?, KIND, attack * BASIC_RATIO)?;
        }
        (SKILL, MoonPhase::New) => {
            let target = required()?;
            field.strike(actor, target, KIND, attack * NEW_SKILL_RATIO)?;
            if field.combatant(target)?.is_alive() {
                place_seals(field, target, 1)?;
            }
        }
        (SKILL, MoonPhase::Quarter) => {
            let target = required()?;
            let seals = field.pop_buffs(target, |b| b.is_marker(Marker::MoonSeal))?;
            empower(field, actor, QUARTER_SEAL_BONUS * seals.len() as f64)?;
            field.strike(actor, target, KIND, attack * QUARTER_SKILL_RATIO)?;
        }
        (SKILL, MoonPhase::Full) => {
            for enemy in field.enemies_of(actor) {
                field.strike(actor, enemy, KIND, attack * FULL_SKILL_RATIO)?;
                if field.combatant(enemy)?.is_alive() {
                    place_seals(field, enemy, FULL_SKILL_SEALS)?;
                }
            }
        }
        (FINAL, MoonPhase::New) => {
            enter_phase(field, actor, MoonPhase::Full)?;
            for ally in field.allies_of(actor) {
                field.attach_buff(ally, Buff::outgoing(NEW_FINAL_ALLY_BONUS, 1))?;
            }
        }
        (FINAL, MoonPhase::Quarter) => {
            let target = required()?;
            let seals = seals_on(field, target)?;
            empower(field, actor, QUARTER_FINAL_SEAL_BONUS * seals as f64)?;
            field.strike(actor, target, KIND, attack * QUARTER_FINAL_RATIO)?;
        }
        (FINAL, MoonPhase::Full) => {
            for enemy in field.enemies_of(actor) {
                field.strike(actor, enemy, KIND, attack * FULL_FINAL_RATIO)?;
                if field.combatant(enemy)?.is_alive() {
                    place_seals(field, enemy, FULL_FINAL_SEALS)?;
                    field.attach_buff(enemy, Buff::percent(Stat::Speed, FULL_FINAL_SLOW, 1))?;
                    field.attach_buff(enemy, Buff::lunar_eclipse(ECLIPSE_ROUNDS))?;
                }
            }
        }
        (other, _) => return Err(CombatError::UnknownSkill(other)),
    }
    Ok(())
}
