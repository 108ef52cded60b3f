//! Delta: electricity striker
//!
//! - Basic: 0.8x attack on one enemy
//! - Skill: 1.0x on one enemy; a landed hit arcs to its slot neighbours for
//!   30% of the damage (50% on a crit) while Delta's focus is lowered by 20
//! - Final (instant): five 0.5x hits on random living enemies, focus -5 per
//!   hit, restored afterwards

use super::skills::{SkillCost, SkillInfo, TargetKind, BASIC, FINAL, SKILL};
use crate::combat::{Battlefield, CombatantId, DamageKind};
use crate::error::{CombatError, Result};

const KIND: DamageKind = DamageKind::Electricity;

const BASIC_RATIO: f64 = 0.8;
const SKILL_RATIO: f64 = 1.0;
const SPLASH_RATIO: f64 = 0.3;
const SPLASH_CRIT_RATIO: f64 = 0.5;
const SPLASH_FOCUS_PENALTY: f64 = 20.0;
const FINAL_HITS: u32 = 5;
const FINAL_RATIO: f64 = 0.5;
const FINAL_FOCUS_STEP: f64 = 5.0;

pub(super) fn catalog() -> Vec<SkillInfo> {
    vec![
        SkillInfo {
            index: BASIC,
            name: "Static Jab",
            cost: SkillCost::Grants(1),
            consumes_turn: true,
            target: TargetKind::Enemy,
        },
        SkillInfo {
            index: SKILL,
            name: "Arc Discharge",
            cost: SkillCost::SkillPoints(1),
            consumes_turn: true,
            target: TargetKind::Enemy,
        },
        SkillInfo {
            index: FINAL,
            name: "Thunderstorm",
            cost: SkillCost::FinalMeter,
            consumes_turn: false,
            target: TargetKind::None,
        },
    ]
}

fn adjust_focus(field: &mut Battlefield, actor: CombatantId, delta: f64) -> Result<()> {
    field.combatant_mut(actor)?.stats_mut().focus += delta;
    Ok(())
}

pub(super) fn execute(
    field: &mut Battlefield,
    actor: CombatantId,
    index: usize,
    target: Option<CombatantId>,
) -> Result<()> {
    let attack = field.combatant(actor)?.attack_value();
    match index {
        BASIC => {
            let target = target.ok_or(CombatError::MissingTarget)?;
            field.strike(actor, target, KIND, attack * BASIC_RATIO)?;
        }
        SKILL => {
            let target = target.ok_or(CombatError::MissingTarget)?;
            let hit = field.strike(actor, target, KIND, attack * SKILL_RATIO)?;
            if !hit.missed {
                let ratio = if hit.critical {
                    SPLASH_CRIT_RATIO
                } else {
                    SPLASH_RATIO
                };
                let splash = hit.damage as f64 * ratio;
                adjust_focus(field, actor, -SPLASH_FOCUS_PENALTY)?;
                for neighbour in field.neighbours(target) {
                    if field.validate_enemy(actor, neighbour).is_ok() {
                        field.strike(actor, neighbour, KIND, splash)?;
                    }
                }
                adjust_focus(field, actor, SPLASH_FOCUS_PENALTY)?;
            }
        }
        FINAL => {
            let mut lowered = 0.0;
            for _ in 0..FINAL_HITS {
                let Some(target) = field.random_enemy(actor) else {
                    break;
                };
                field.strike(actor, target, KIND, attack * FINAL_RATIO)?;
                adjust_focus(field, actor, -FINAL_FOCUS_STEP)?;
                lowered += FINAL_FOCUS_STEP;
            }
            adjust_focus(field, actor, lowered)?;
        }
        other => return Err(CombatError::UnknownSkill(other)),
    }
    Ok(())
}
