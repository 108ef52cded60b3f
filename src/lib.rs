//! skirmish - turn-based combat engine
//!
//! Speed-scheduled encounters between two teams, with a two-sided attack
//! pipeline, timed buffs and asynchronous controllers for human-driven teams.

pub mod combat;
pub mod config;
pub mod error;
pub mod roster;

pub use combat::{Scheduler, Team, TeamId};
pub use config::CombatConfig;
pub use error::{CombatError, Result};
