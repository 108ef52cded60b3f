//! Combat system module
//!
//! Implements a speed-scheduled, turn-based combat engine with:
//! - Stat blocks with balance (posture), focus and shields
//! - Damage kinds and the two-sided attack pipeline
//! - Timed buffs and markers
//! - Teams with shared skill points and event logs
//! - Action scheduling and the encounter loop
//! - Controllers for externally driven teams

mod buff;
mod combatant;
mod control;
mod damage;
mod events;
mod field;
mod roll;
mod scheduler;
mod stats;
mod team;

pub use buff::{Buff, BuffKind, BuffList, BuffPhase, Marker, PERSISTENT_ROUNDS};
pub use combatant::{miss_probability, AttackerProfile, Combatant, CombatantId, Control};
pub use control::{
    ActionPrompt, AutoPilot, ChannelController, ChannelHandle, ChoiceOutcome, Controller,
    ScriptedController, SkillChoice, TargetOption, Ticketed,
};
pub use damage::{AttackRoll, DamageKind, Hit};
pub use events::ActionEvent;
pub use field::Battlefield;
pub use roll::Roller;
pub use scheduler::{EncounterState, Scheduler, MAX_TEAMS};
pub use stats::{FinalMeter, Stat, StatBlock, FULL_BALANCE};
pub use team::{Team, TeamId};
