//! Combat tuning configuration
//!
//! Every balance constant the engine uses lives here so that tuning never
//! touches algorithmic code. Values are layered with figment: built-in
//! defaults, then an optional TOML file, then `SKIRMISH_*` environment
//! variables.

use std::path::Path;
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "SKIRMISH_";

/// Tuning constants for one encounter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Scheduling numerator: a combatant's base wait is `base_ticks / speed`
    pub base_ticks: f64,
    /// Miss chance when both sides have equal focus
    pub miss_baseline: f64,
    /// Focus difference that shifts the miss chance by 1.0
    pub miss_focus_scale: f64,
    /// Damage factor applied to a missed attack
    pub miss_damage_factor: f64,
    /// Starting health for variants without a stat curve
    pub default_health: f64,
    /// Starting attack for variants without a stat curve
    pub default_attack: f64,
    pub default_critical_chance: f64,
    pub default_critical_multiplier: f64,
    pub default_speed: f64,
    pub default_focus: f64,
    pub default_defuse: f64,
    /// Balance (posture) every combatant starts with
    pub initial_balance: f64,
    /// Balance lost when hit by an ally
    pub friendly_fire_balance: f64,
    /// Skill points a team starts with
    pub skill_points: u32,
    pub max_skill_points: u32,
    /// Final meter charge for landing a hit
    pub meter_gain_on_hit: f64,
    /// Final meter charge for being hit
    pub meter_gain_on_hurt: f64,
    /// Final meter charge for a basic attack
    pub meter_gain_basic: f64,
    /// Final meter charge for a skill
    pub meter_gain_skill: f64,
    /// Failed choices a controlled combatant may make before its turn is passed
    pub max_reprompts: u32,
    /// Instant (non turn-consuming) skills allowed within one turn
    pub max_instant_chain: u32,
    /// Wall-clock limit for a whole encounter
    pub time_limit_secs: u64,
    /// How long a controller waits for a human choice
    pub input_timeout_secs: u64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            base_ticks: 100_000.0,
            miss_baseline: 0.05,
            miss_focus_scale: 1000.0,
            miss_damage_factor: 0.4,
            default_health: 100.0,
            default_attack: 20.0,
            default_critical_chance: 0.05,
            default_critical_multiplier: 1.5,
            default_speed: 97.0,
            default_focus: 0.0,
            default_defuse: 20.0,
            initial_balance: 100.0,
            friendly_fire_balance: 15.0,
            skill_points: 3,
            max_skill_points: 5,
            meter_gain_on_hit: 5.0,
            meter_gain_on_hurt: 10.0,
            meter_gain_basic: 20.0,
            meter_gain_skill: 30.0,
            max_reprompts: 3,
            max_instant_chain: 3,
            time_limit_secs: 180,
            input_timeout_secs: 60,
        }
    }
}

impl CombatConfig {
    /// Figment with defaults, an optional TOML file and env overrides
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(CombatConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load the configuration
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        Self::figment(path).extract()
    }

    /// Encounter wall-clock limit
    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.time_limit_secs)
    }

    /// Human input timeout
    pub fn input_timeout(&self) -> Duration {
        Duration::from_secs(self.input_timeout_secs)
    }
}
