//! Action events
//!
//! Immutable records of what happened during an encounter, in the order it
//! happened. Both teams receive every event; only controlled teams keep them
//! in their log for narration.

use serde::Serialize;

use super::combatant::CombatantId;
use super::damage::DamageKind;

/// Something that happened during an encounter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionEvent {
    /// A single-target hit
    Attack {
        origin: CombatantId,
        target: CombatantId,
        amount: i64,
        kind: DamageKind,
        missed: bool,
        critical: bool,
    },
    /// A catalog skill was used
    Skill { origin: CombatantId, name: String },
    /// A buff ran out or was consumed
    BuffExpired { target: CombatantId, buff: String },
    /// A final meter reached its threshold
    MeterFilled { combatant: CombatantId },
    /// Health reached zero
    Defeated { combatant: CombatantId },
    /// Free-form narration
    Message { text: String },
}
