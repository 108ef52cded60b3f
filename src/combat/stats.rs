//! Stat blocks
//!
//! Plain numeric state of a combatant. Buffs address individual stats through
//! the `Stat` enum instead of looking fields up by name.

use serde::{Deserialize, Serialize};

use crate::config::CombatConfig;

/// Balance value at which defuse is fully effective
pub const FULL_BALANCE: f64 = 100.0;

/// A stat that buffs and equipment may modify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    MaxHealth,
    Attack,
    CriticalChance,
    CriticalMultiplier,
    Speed,
    Focus,
    Defuse,
    Shield,
}

impl std::fmt::Display for Stat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stat::MaxHealth => "max_health",
            Stat::Attack => "attack",
            Stat::CriticalChance => "critical_chance",
            Stat::CriticalMultiplier => "critical_multiplier",
            Stat::Speed => "speed",
            Stat::Focus => "focus",
            Stat::Defuse => "defuse",
            Stat::Shield => "shield",
        };
        write!(f, "{}", s)
    }
}

/// Charge gauge that unlocks a final skill
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinalMeter {
    pub current: f64,
    pub threshold: f64,
}

impl FinalMeter {
    /// Create an empty meter
    pub fn new(threshold: f64) -> Self {
        Self {
            current: 0.0,
            threshold,
        }
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.threshold
    }

    /// Add charge, returning true when this call filled the meter
    pub fn charge(&mut self, amount: f64) -> bool {
        let was_full = self.is_full();
        self.current += amount.max(0.0);
        !was_full && self.is_full()
    }

    pub fn reset(&mut self) {
        self.current = 0.0;
    }
}

/// Current numeric attributes of a combatant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatBlock {
    /// Stored health; read it through the combatant to get the clamped value
    pub health: f64,
    pub max_health: f64,
    pub attack: f64,
    pub critical_chance: f64,
    pub critical_multiplier: f64,
    /// Effective speed, may be altered for the duration of one action
    pub speed: f64,
    /// Speed restored after every completed action
    pub unset_speed: f64,
    /// Scheduling ticks already consumed while others acted
    pub reduced_value: f64,
    pub balance: f64,
    pub focus: f64,
    pub defuse: f64,
    pub shield: f64,
    pub final_meter: Option<FinalMeter>,
}

impl StatBlock {
    /// Stat block with the configured defaults
    pub fn new(config: &CombatConfig) -> Self {
        Self {
            health: config.default_health,
            max_health: config.default_health,
            attack: config.default_attack,
            critical_chance: config.default_critical_chance,
            critical_multiplier: config.default_critical_multiplier,
            speed: config.default_speed,
            unset_speed: config.default_speed,
            reduced_value: 0.0,
            balance: config.initial_balance,
            focus: config.default_focus,
            defuse: config.default_defuse,
            shield: 0.0,
            final_meter: None,
        }
    }

    /// Read a stat
    pub fn get(&self, stat: Stat) -> f64 {
        match stat {
            Stat::MaxHealth => self.max_health,
            Stat::Attack => self.attack,
            Stat::CriticalChance => self.critical_chance,
            Stat::CriticalMultiplier => self.critical_multiplier,
            Stat::Speed => self.speed,
            Stat::Focus => self.focus,
            Stat::Defuse => self.defuse,
            Stat::Shield => self.shield,
        }
    }

    /// Add `delta` to a stat and return the change actually made.
    ///
    /// Speed changes also move `unset_speed`, so they outlive the end-of-action
    /// speed reset. Shield never drops below zero.
    pub fn adjust(&mut self, stat: Stat, delta: f64) -> f64 {
        let field = match stat {
            Stat::MaxHealth => &mut self.max_health,
            Stat::Attack => &mut self.attack,
            Stat::CriticalChance => &mut self.critical_chance,
            Stat::CriticalMultiplier => &mut self.critical_multiplier,
            Stat::Speed => {
                self.unset_speed += delta;
                &mut self.speed
            }
            Stat::Focus => &mut self.focus,
            Stat::Defuse => &mut self.defuse,
            Stat::Shield => {
                let applied = delta.max(-self.shield);
                self.shield += applied;
                return applied;
            }
        };
        *field += delta;
        delta
    }

    /// Defuse scaled by the current balance fraction
    pub fn effective_defuse(&self) -> f64 {
        self.defuse * (self.balance / FULL_BALANCE)
    }

    /// Lower balance, never below zero; returns the new balance
    pub fn reduce_balance(&mut self, value: f64) -> f64 {
        self.balance = (self.balance - value).max(0.0);
        self.balance
    }
}
