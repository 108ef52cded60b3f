//! Damage kinds and hit results
//!
//! Every attack carries a kind:
//! - Physical and the elemental kinds (wind, fire, electricity, ice)
//! - Mental, which some debuffs amplify
//! - Real, which bypasses defense mitigation entirely

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kinds of damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageKind {
    /// Weapons, claws, fists
    Physical,
    Wind,
    Fire,
    Electricity,
    Ice,
    /// Mind and spirit damage
    Mental,
    /// Unmitigated damage for execute-style follow-ups
    Real,
}

impl DamageKind {
    /// Get all damage kinds
    pub fn all() -> &'static [DamageKind] {
        &[
            DamageKind::Physical,
            DamageKind::Wind,
            DamageKind::Fire,
            DamageKind::Electricity,
            DamageKind::Ice,
            DamageKind::Mental,
            DamageKind::Real,
        ]
    }

    /// Whether defense mitigation applies to this kind
    pub fn is_mitigated(&self) -> bool {
        !matches!(self, DamageKind::Real)
    }
}

impl FromStr for DamageKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "physical" => Ok(DamageKind::Physical),
            "wind" => Ok(DamageKind::Wind),
            "fire" => Ok(DamageKind::Fire),
            "electricity" | "electric" | "lightning" => Ok(DamageKind::Electricity),
            "ice" | "cold" => Ok(DamageKind::Ice),
            "mental" | "me" => Ok(DamageKind::Mental),
            "real" | "true" => Ok(DamageKind::Real),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for DamageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DamageKind::Physical => "physical",
            DamageKind::Wind => "wind",
            DamageKind::Fire => "fire",
            DamageKind::Electricity => "electricity",
            DamageKind::Ice => "ice",
            DamageKind::Mental => "mental",
            DamageKind::Real => "real",
        };
        write!(f, "{}", s)
    }
}

/// Outcome of the attacker-side rolls, before the defender resolves it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackRoll {
    /// Amount handed to the defender, rounded to an integer
    pub amount: i64,
    pub critical: bool,
    pub missed: bool,
}

/// A fully resolved hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    /// Damage that reached health (after shield absorption)
    pub damage: i64,
    pub critical: bool,
    pub missed: bool,
}
