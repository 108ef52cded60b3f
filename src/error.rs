//! Combat error taxonomy
//!
//! Structural errors abort an encounter, resource and targeting errors only
//! abort the current action.

use thiserror::Error;

use crate::combat::{CombatantId, TeamId};

/// Errors raised by the combat engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CombatError {
    #[error("a scheduler accepts at most two teams")]
    TooManyTeams,

    #[error("no registered team is controlled by an external actor")]
    NoControllableTeam,

    #[error("encounter has not been set up")]
    NotSetUp,

    #[error("encounter was already set up")]
    AlreadySetUp,

    #[error("insufficient skill points ({available} < {required})")]
    InsufficientSkillPoints { required: u32, available: u32 },

    #[error("unknown combatant {0}")]
    UnknownCombatant(CombatantId),

    #[error("unknown team {0}")]
    UnknownTeam(TeamId),

    #[error("invalid target {0}")]
    InvalidTarget(CombatantId),

    #[error("skill requires a target")]
    MissingTarget,

    #[error("unknown skill index {0}")]
    UnknownSkill(usize),

    #[error("skill {0} is not available yet")]
    SkillUnavailable(usize),
}

impl CombatError {
    /// Whether the current action can be retried after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CombatError::InsufficientSkillPoints { .. }
                | CombatError::InvalidTarget(_)
                | CombatError::MissingTarget
                | CombatError::UnknownSkill(_)
                | CombatError::SkillUnavailable(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CombatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(!CombatError::TooManyTeams.is_recoverable());
        assert!(!CombatError::NoControllableTeam.is_recoverable());
        assert!(!CombatError::NotSetUp.is_recoverable());
        assert!(CombatError::InsufficientSkillPoints { required: 1, available: 0 }.is_recoverable());
        assert!(CombatError::MissingTarget.is_recoverable());
        assert!(CombatError::SkillUnavailable(2).is_recoverable());
    }

    #[test]
    fn test_error_messages() {
        let err = CombatError::InsufficientSkillPoints { required: 2, available: 1 };
        assert_eq!(err.to_string(), "insufficient skill points (1 < 2)");
        assert_eq!(
            CombatError::TooManyTeams.to_string(),
            "a scheduler accepts at most two teams"
        );
    }
}
