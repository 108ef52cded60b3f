//! Player characters
//!
//! A `CharacterSheet` is the persisted description of a hero (experience,
//! weapon, equipment, lingering buffs). Building a combatant from it runs
//! the stat curves and applies equipment in order.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::curves::{self, ExperienceCurve};
use super::moonlark::MoonPhase;
use super::Role;
use crate::combat::{Buff, Combatant, Control, DamageKind, FinalMeter, Stat, StatBlock};
use crate::config::CombatConfig;

/// Base attack every hero is normalized against
pub const HERO_BASE_ATTACK: f64 = 76.0;
/// Final meter charge needed to unlock a hero's final
pub const HERO_METER_THRESHOLD: f64 = 150.0;

/// Playable heroes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeroKind {
    Delta,
    Moonlark,
}

impl HeroKind {
    pub fn all() -> &'static [HeroKind] {
        &[HeroKind::Delta, HeroKind::Moonlark]
    }

    /// Numeric id used by saved rosters
    pub fn id(&self) -> u32 {
        match self {
            HeroKind::Delta => 1,
            HeroKind::Moonlark => 2,
        }
    }

    pub fn from_id(id: u32) -> Option<Self> {
        Self::all().iter().copied().find(|h| h.id() == id)
    }

    pub fn damage_kind(&self) -> DamageKind {
        match self {
            HeroKind::Delta => DamageKind::Electricity,
            HeroKind::Moonlark => DamageKind::Mental,
        }
    }

    pub fn base_attack(&self) -> f64 {
        HERO_BASE_ATTACK
    }
}

impl FromStr for HeroKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "delta" | "1" => Ok(HeroKind::Delta),
            "moonlark" | "2" => Ok(HeroKind::Moonlark),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for HeroKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HeroKind::Delta => "Delta",
            HeroKind::Moonlark => "Moonlark",
        };
        write!(f, "{}", s)
    }
}

/// Hero with its per-encounter state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hero {
    Delta,
    Moonlark { phase: MoonPhase },
}

impl Hero {
    pub fn new(kind: HeroKind) -> Self {
        match kind {
            HeroKind::Delta => Hero::Delta,
            HeroKind::Moonlark => Hero::Moonlark {
                phase: MoonPhase::default(),
            },
        }
    }

    pub fn kind(&self) -> HeroKind {
        match self {
            Hero::Delta => HeroKind::Delta,
            Hero::Moonlark { .. } => HeroKind::Moonlark,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeaponState {
    #[serde(default)]
    pub experience: u64,
    #[serde(default)]
    pub damage_level: u32,
}

impl WeaponState {
    /// Weapon level earned through use; damage comes from `damage_level`
    pub fn level(&self) -> u32 {
        ExperienceCurve::default().level_for(self.experience)
    }
}

/// A single equipment modifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EquipmentGain {
    /// `stat += value`
    Flat { stat: Stat, value: f64 },
    /// `stat *= percent`
    Percent { stat: Stat, percent: f64 },
}

impl EquipmentGain {
    pub fn apply(&self, stats: &mut StatBlock) {
        match *self {
            EquipmentGain::Flat { stat, value } => {
                stats.adjust(stat, value);
            }
            EquipmentGain::Percent { stat, percent } => {
                let delta = stats.get(stat) * (percent - 1.0);
                stats.adjust(stat, delta);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub name: String,
    #[serde(default)]
    pub gains: Vec<EquipmentGain>,
}

fn default_hp_percent() -> f64 {
    100.0
}

/// Persisted description of a hero
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSheet {
    pub hero: HeroKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub experience: u64,
    /// Health carried over from the last fight, as a percentage of max
    #[serde(default = "default_hp_percent")]
    pub hp_percent: f64,
    #[serde(default)]
    pub weapon: WeaponState,
    #[serde(default)]
    pub equipment: Vec<Equipment>,
    /// Buffs still running when the sheet was saved
    #[serde(default)]
    pub buffs: Vec<Buff>,
}

impl CharacterSheet {
    /// Fresh level-0 sheet
    pub fn new(hero: HeroKind) -> Self {
        Self {
            hero,
            name: None,
            experience: 0,
            hp_percent: default_hp_percent(),
            weapon: WeaponState::default(),
            equipment: Vec::new(),
            buffs: Vec::new(),
        }
    }

    pub fn with_experience(mut self, experience: u64) -> Self {
        self.experience = experience;
        self
    }

    pub fn level(&self) -> u32 {
        ExperienceCurve::default().level_for(self.experience)
    }

    /// Stats before buffs: curves, then equipment in order
    pub fn stats(&self, config: &CombatConfig) -> StatBlock {
        let level = self.level();
        let mut stats = StatBlock::new(config);
        stats.max_health = curves::character_max_health(level);
        stats.attack = curves::character_attack(
            level,
            self.weapon.damage_level,
            self.hero.base_attack(),
        );
        for gain in self.equipment.iter().flat_map(|e| e.gains.iter()) {
            gain.apply(&mut stats);
        }
        stats.health = stats.max_health * self.hp_percent.clamp(0.0, 100.0) / 100.0;
        stats.final_meter = Some(FinalMeter::new(HERO_METER_THRESHOLD));
        stats
    }

    /// Externally controlled combatant; sheet buffs attach at setup
    pub fn into_combatant(self, config: &CombatConfig) -> Combatant {
        let stats = self.stats(config);
        let name = self.name.clone().unwrap_or_else(|| self.hero.to_string());
        let character = Character {
            hero: Hero::new(self.hero),
            level: self.level(),
            pending_buffs: self.buffs,
        };
        Combatant::new(name, Role::Character(character), stats).with_control(Control::External)
    }
}

/// Character role data
#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    hero: Hero,
    level: u32,
    pending_buffs: Vec<Buff>,
}

impl Character {
    pub fn hero(&self) -> Hero {
        self.hero
    }

    pub fn kind(&self) -> HeroKind {
        self.hero.kind()
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn moon_phase(&self) -> Option<MoonPhase> {
        match self.hero {
            Hero::Moonlark { phase } => Some(phase),
            Hero::Delta => None,
        }
    }

    pub(crate) fn set_moon_phase(&mut self, phase: MoonPhase) {
        if let Hero::Moonlark { phase: current } = &mut self.hero {
            *current = phase;
        }
    }

    pub(crate) fn take_pending_buffs(&mut self) -> Vec<Buff> {
        std::mem::take(&mut self.pending_buffs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hero_ids() {
        assert_eq!(HeroKind::from_id(1), Some(HeroKind::Delta));
        assert_eq!(HeroKind::from_id(2), Some(HeroKind::Moonlark));
        assert_eq!(HeroKind::from_id(3), None);
        assert_eq!("MOONLARK".parse::<HeroKind>(), Ok(HeroKind::Moonlark));
        assert_eq!("2".parse::<HeroKind>(), Ok(HeroKind::Moonlark));
    }

    #[test]
    fn test_sheet_stats() {
        let config = CombatConfig::default();
        let sheet = CharacterSheet::new(HeroKind::Delta);
        assert_eq!(sheet.level(), 0);
        let stats = sheet.stats(&config);
        assert_eq!(stats.max_health, 900.0);
        assert_eq!(stats.health, 900.0);
        assert!(stats.attack > 0.0);
        assert_eq!(stats.final_meter, Some(FinalMeter::new(HERO_METER_THRESHOLD)));
    }

    #[test]
    fn test_equipment_applies_in_order() {
        let config = CombatConfig::default();
        let mut sheet = CharacterSheet::new(HeroKind::Delta);
        let base = sheet.stats(&config).attack;
        sheet.equipment.push(Equipment {
            name: "ring".into(),
            gains: vec![
                EquipmentGain::Flat {
                    stat: Stat::Attack,
                    value: 10.0,
                },
                EquipmentGain::Percent {
                    stat: Stat::Attack,
                    percent: 2.0,
                },
            ],
        });
        let attack = sheet.stats(&config).attack;
        assert!((attack - (base + 10.0) * 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_hp_percent() {
        let config = CombatConfig::default();
        let mut sheet = CharacterSheet::new(HeroKind::Moonlark);
        sheet.hp_percent = 50.0;
        assert_eq!(sheet.stats(&config).health, 450.0);
        sheet.hp_percent = 180.0;
        assert_eq!(sheet.stats(&config).health, 900.0);
    }

    #[test]
    fn test_sheet_from_json() {
        let sheet: CharacterSheet = serde_json::from_str(
            r#"{
                "hero": "moonlark",
                "experience": 8000,
                "weapon": { "experience": 1500, "damage_level": 3 },
                "equipment": [
                    { "name": "boots", "gains": [ { "type": "flat", "stat": "speed", "value": 5 } ] }
                ],
                "buffs": [
                    { "kind": { "kind": "outgoing_damage", "bonus": 0.1 }, "remaining_rounds": 1 }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(sheet.level(), 2);
        assert_eq!(sheet.hp_percent, 100.0);
        assert_eq!(sheet.weapon.damage_level, 3);
        assert_eq!(sheet.weapon.level(), 1);
        assert_eq!(sheet.buffs.len(), 1);

        let config = CombatConfig::default();
        let combatant = sheet.into_combatant(&config);
        assert_eq!(combatant.name(), "Moonlark");
        assert_eq!(combatant.control(), Control::External);
        assert_eq!(combatant.stats().speed, 102.0);
    }
}
