//! Skill catalogs and execution
//!
//! Every combatant exposes an indexed catalog. Executing a skill validates
//! the choice, pays its cost, announces it and dispatches to the role's
//! implementation. Resource and targeting failures happen before anything
//! is paid.

use serde::Serialize;
use tracing::debug;

use super::monster;
use super::{delta, moonlark, Hero, Role};
use crate::combat::{ActionEvent, Battlefield, Combatant, CombatantId, SkillChoice};
use crate::error::{CombatError, Result};

pub const BASIC: usize = 0;
pub const SKILL: usize = 1;
pub const FINAL: usize = 2;

/// What a skill needs as its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Enemy,
    Ally,
    Caster,
    None,
}

/// What using a skill costs or earns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "amount", rename_all = "snake_case")]
pub enum SkillCost {
    Free,
    /// Earns team skill points
    Grants(u32),
    /// Spends team skill points
    SkillPoints(u32),
    /// Requires and empties a full final meter
    FinalMeter,
}

/// Catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkillInfo {
    pub index: usize,
    pub name: &'static str,
    pub cost: SkillCost,
    /// False for instant skills that leave the turn open
    pub consumes_turn: bool,
    pub target: TargetKind,
}

/// Result of a successful skill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillOutcome {
    pub consumes_turn: bool,
}

fn full_catalog(role: &Role) -> Vec<SkillInfo> {
    match role {
        Role::Character(character) => match character.hero() {
            Hero::Delta => delta::catalog(),
            Hero::Moonlark { phase } => moonlark::catalog(phase),
        },
        Role::Monster(_) | Role::Dummy(_) => vec![SkillInfo {
            index: BASIC,
            name: "Strike",
            cost: SkillCost::Free,
            consumes_turn: true,
            target: TargetKind::Enemy,
        }],
    }
}

/// Skills usable right now; finals only while the meter is full
pub fn catalog(combatant: &Combatant) -> Vec<SkillInfo> {
    full_catalog(combatant.role())
        .into_iter()
        .filter(|s| s.cost != SkillCost::FinalMeter || combatant.final_ready())
        .collect()
}

/// Final if ready, else an affordable skill, else a basic attack
pub fn preferred_skill(skills: &[SkillInfo], skill_points: u32) -> Option<&SkillInfo> {
    skills
        .iter()
        .find(|s| s.cost == SkillCost::FinalMeter)
        .or_else(|| {
            skills
                .iter()
                .find(|s| matches!(s.cost, SkillCost::SkillPoints(n) if n <= skill_points))
        })
        .or_else(|| {
            skills
                .iter()
                .find(|s| matches!(s.cost, SkillCost::Free | SkillCost::Grants(_)))
        })
}

/// Choice made by a combatant's built-in logic
pub fn auto_choice(field: &mut Battlefield, actor: CombatantId) -> Result<Option<SkillChoice>> {
    let skills = catalog(field.combatant(actor)?);
    let skill_points = field.team(actor.team)?.skill_points();
    let Some(skill) = preferred_skill(&skills, skill_points).copied() else {
        return Ok(None);
    };
    let target = match skill.target {
        TargetKind::Enemy => match field.random_enemy(actor) {
            Some(target) => Some(target),
            None => return Ok(None),
        },
        TargetKind::Ally => field.allies_of(actor).first().copied(),
        TargetKind::Caster => Some(actor),
        TargetKind::None => None,
    };
    Ok(Some(SkillChoice::new(skill.index, target)))
}

fn resolve_target(
    field: &Battlefield,
    actor: CombatantId,
    kind: TargetKind,
    requested: Option<CombatantId>,
) -> Result<Option<CombatantId>> {
    match kind {
        TargetKind::Enemy => {
            let target = requested.ok_or(CombatError::MissingTarget)?;
            field.validate_enemy(actor, target).map(Some)
        }
        TargetKind::Ally => {
            let target = requested.ok_or(CombatError::MissingTarget)?;
            field.validate_ally(actor, target).map(Some)
        }
        TargetKind::Caster => Ok(Some(actor)),
        TargetKind::None => Ok(None),
    }
}

/// Validate, pay for and perform a skill
pub fn execute_skill(
    field: &mut Battlefield,
    actor: CombatantId,
    choice: SkillChoice,
) -> Result<SkillOutcome> {
    let combatant = field.combatant(actor)?;
    let info = full_catalog(combatant.role())
        .into_iter()
        .find(|s| s.index == choice.skill)
        .ok_or(CombatError::UnknownSkill(choice.skill))?;
    if info.cost == SkillCost::FinalMeter && !combatant.final_ready() {
        return Err(CombatError::SkillUnavailable(choice.skill));
    }
    let kit = match combatant.role() {
        Role::Character(character) => Some(character.hero()),
        Role::Monster(_) | Role::Dummy(_) => None,
    };
    let target = resolve_target(field, actor, info.target, choice.target)?;

    match info.cost {
        SkillCost::SkillPoints(n) => {
            field.team_mut(actor.team)?.reduce_skill_points(n)?;
        }
        SkillCost::FinalMeter => field.combatant_mut(actor)?.reset_meter(),
        SkillCost::Free | SkillCost::Grants(_) => {}
    }

    debug!(%actor, skill = info.name, chosen_target = ?target, "executing skill");
    field.record(ActionEvent::Skill {
        origin: actor,
        name: info.name.to_string(),
    });

    match kit {
        Some(Hero::Delta) => delta::execute(field, actor, info.index, target)?,
        Some(Hero::Moonlark { phase }) => moonlark::execute(field, actor, info.index, target, phase)?,
        None => {
            let target = target.ok_or(CombatError::MissingTarget)?;
            monster::strike(field, actor, target)?;
        }
    }

    if let SkillCost::Grants(n) = info.cost {
        field.team_mut(actor.team)?.add_skill_points(n);
    }
    let meter_gain = match info.index {
        BASIC => field.config().meter_gain_basic,
        SKILL => field.config().meter_gain_skill,
        _ => 0.0,
    };
    if meter_gain > 0.0 {
        field.charge_meter(actor, meter_gain)?;
    }

    Ok(SkillOutcome {
        consumes_turn: info.consumes_turn,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{Roller, Team, TeamId};
    use crate::config::CombatConfig;
    use crate::roster::{CharacterSheet, HeroKind, TrainingDummy};

    fn field(hero: HeroKind) -> Battlefield {
        let config = CombatConfig::default();
        let mut field = Battlefield::new(config.clone(), Roller::seeded(4));
        field.push_team(
            Team::new("heroes", &config)
                .with_combatant(CharacterSheet::new(hero).into_combatant(&config)),
        );
        field.push_team(
            Team::new("dummies", &config)
                .with_combatant(TrainingDummy::spawn("d0", &config))
                .with_combatant(TrainingDummy::spawn("d1", &config)),
        );
        field
    }

    fn hero() -> CombatantId {
        CombatantId::new(TeamId(0), 0)
    }

    fn dummy(slot: usize) -> CombatantId {
        CombatantId::new(TeamId(1), slot)
    }

    #[test]
    fn test_final_hidden_until_meter_full() {
        let mut field = field(HeroKind::Delta);
        let names: Vec<_> = catalog(field.combatant(hero()).unwrap())
            .iter()
            .map(|s| s.index)
            .collect();
        assert_eq!(names, vec![BASIC, SKILL]);

        field.combatant_mut(hero()).unwrap().charge_meter(1000.0);
        assert_eq!(catalog(field.combatant(hero()).unwrap()).len(), 3);
    }

    #[test]
    fn test_unknown_and_unavailable_skills() {
        let mut field = field(HeroKind::Delta);
        assert_eq!(
            execute_skill(&mut field, hero(), SkillChoice::new(9, Some(dummy(0)))),
            Err(CombatError::UnknownSkill(9))
        );
        assert_eq!(
            execute_skill(&mut field, hero(), SkillChoice::new(FINAL, None)),
            Err(CombatError::SkillUnavailable(FINAL))
        );
    }

    #[test]
    fn test_missing_and_invalid_targets() {
        let mut field = field(HeroKind::Delta);
        assert_eq!(
            execute_skill(&mut field, hero(), SkillChoice::new(BASIC, None)),
            Err(CombatError::MissingTarget)
        );
        assert_eq!(
            execute_skill(&mut field, hero(), SkillChoice::new(BASIC, Some(hero()))),
            Err(CombatError::InvalidTarget(hero()))
        );
    }

    #[test]
    fn test_skill_points_economy() {
        let mut field = field(HeroKind::Delta);
        assert_eq!(field.team(TeamId(0)).unwrap().skill_points(), 3);

        execute_skill(&mut field, hero(), SkillChoice::new(BASIC, Some(dummy(0)))).unwrap();
        assert_eq!(field.team(TeamId(0)).unwrap().skill_points(), 4);

        execute_skill(&mut field, hero(), SkillChoice::new(SKILL, Some(dummy(0)))).unwrap();
        assert_eq!(field.team(TeamId(0)).unwrap().skill_points(), 3);
    }

    #[test]
    fn test_insufficient_skill_points_changes_nothing() {
        let mut field = field(HeroKind::Delta);
        field.team_mut(TeamId(0)).unwrap().reduce_skill_points(3).unwrap();
        let before = field.combatant(dummy(0)).unwrap().health();

        assert_eq!(
            execute_skill(&mut field, hero(), SkillChoice::new(SKILL, Some(dummy(0)))),
            Err(CombatError::InsufficientSkillPoints {
                required: 1,
                available: 0
            })
        );
        assert_eq!(field.combatant(dummy(0)).unwrap().health(), before);
        assert_eq!(field.team(TeamId(0)).unwrap().skill_points(), 0);
    }

    #[test]
    fn test_final_resets_meter() {
        let mut field = field(HeroKind::Delta);
        field.combatant_mut(hero()).unwrap().charge_meter(1000.0);
        let outcome = execute_skill(&mut field, hero(), SkillChoice::new(FINAL, None)).unwrap();
        assert!(!outcome.consumes_turn);
        let meter = field.combatant(hero()).unwrap().stats().final_meter.unwrap();
        assert!(meter.current < meter.threshold);
        assert_eq!(catalog(field.combatant(hero()).unwrap()).len(), 2);
    }

    #[test]
    fn test_basic_charges_meter() {
        let mut field = field(HeroKind::Delta);
        execute_skill(&mut field, hero(), SkillChoice::new(BASIC, Some(dummy(1)))).unwrap();
        let meter = field.combatant(hero()).unwrap().stats().final_meter.unwrap();
        // basic 20 + landing a hit 5
        assert_eq!(meter.current, 25.0);
    }

    #[test]
    fn test_preferred_skill_order() {
        let mut field = field(HeroKind::Delta);
        let skills = catalog(field.combatant(hero()).unwrap());
        assert_eq!(preferred_skill(&skills, 0).map(|s| s.index), Some(BASIC));
        assert_eq!(preferred_skill(&skills, 1).map(|s| s.index), Some(SKILL));

        field.combatant_mut(hero()).unwrap().charge_meter(1000.0);
        let skills = catalog(field.combatant(hero()).unwrap());
        assert_eq!(preferred_skill(&skills, 0).map(|s| s.index), Some(FINAL));
    }

    #[test]
    fn test_auto_choice_for_dummy() {
        let mut field = field(HeroKind::Delta);
        let choice = auto_choice(&mut field, dummy(0)).unwrap().unwrap();
        assert_eq!(choice.skill, BASIC);
        assert_eq!(choice.target, Some(hero()));

        let hit = execute_skill(&mut field, dummy(0), choice).unwrap();
        assert!(hit.consumes_turn);
    }
}
