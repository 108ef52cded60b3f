//! Buffs and debuffs
//!
//! Timed modifiers attached to a combatant:
//! - Flat and percentage stat gains
//! - Outgoing and incoming damage scaling
//! - Immunity to a damage kind
//! - Regeneration each round
//! - Markers that skills count and consume (moon seals)
//!
//! A buff moves through `Pending -> Active -> Expired`. Attaching applies its
//! stat change, detaching reverses exactly that change, once.

use serde::{Deserialize, Serialize};

use super::damage::DamageKind;
use super::stats::{Stat, StatBlock};

/// Rounds used for markers that only leave when consumed
pub const PERSISTENT_ROUNDS: i32 = 114_514;

/// Stackable tags with no stat effect of their own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    /// Placed by Moonlark, consumed for bonus damage
    MoonSeal,
}

/// What a buff does
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuffKind {
    /// `stat += value` while active; remembers the delta the stat accepted
    FlatGain {
        stat: Stat,
        value: f64,
        #[serde(skip)]
        applied: f64,
    },
    /// `stat *= percent` while active; remembers the absolute delta applied
    PercentGain {
        stat: Stat,
        percent: f64,
        #[serde(skip)]
        applied: f64,
    },
    /// Outgoing damage multiplied by `1 + bonus`
    OutgoingDamage { bonus: f64 },
    /// Incoming damage of the filtered kind multiplied by `1 + bonus`
    IncomingDamage {
        filter: Option<DamageKind>,
        bonus: f64,
    },
    /// Incoming damage of the filtered kind is vetoed
    Immunity { filter: Option<DamageKind> },
    /// Heals every round while active
    Regeneration { per_round: f64 },
    Marker { marker: Marker },
}

/// Lifecycle phase of a buff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuffPhase {
    #[default]
    Pending,
    Active,
    Expired,
}

/// A buff instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Buff {
    pub kind: BuffKind,
    /// Rounds left; the buff is removed once this drops below zero
    pub remaining_rounds: i32,
    #[serde(skip)]
    phase: BuffPhase,
}

impl Buff {
    /// Create a pending buff
    pub fn new(kind: BuffKind, remaining_rounds: i32) -> Self {
        Self {
            kind,
            remaining_rounds,
            phase: BuffPhase::Pending,
        }
    }

    pub fn flat(stat: Stat, value: f64, rounds: i32) -> Self {
        Self::new(
            BuffKind::FlatGain {
                stat,
                value,
                applied: 0.0,
            },
            rounds,
        )
    }

    pub fn percent(stat: Stat, percent: f64, rounds: i32) -> Self {
        Self::new(
            BuffKind::PercentGain {
                stat,
                percent,
                applied: 0.0,
            },
            rounds,
        )
    }

    pub fn outgoing(bonus: f64, rounds: i32) -> Self {
        Self::new(BuffKind::OutgoingDamage { bonus }, rounds)
    }

    pub fn incoming(filter: Option<DamageKind>, bonus: f64, rounds: i32) -> Self {
        Self::new(BuffKind::IncomingDamage { filter, bonus }, rounds)
    }

    /// Debuff: +15% incoming mental damage
    pub fn lunar_eclipse(rounds: i32) -> Self {
        Self::incoming(Some(DamageKind::Mental), 0.15, rounds)
    }

    pub fn immunity(filter: Option<DamageKind>, rounds: i32) -> Self {
        Self::new(BuffKind::Immunity { filter }, rounds)
    }

    pub fn regeneration(per_round: f64, rounds: i32) -> Self {
        Self::new(BuffKind::Regeneration { per_round }, rounds)
    }

    pub fn moon_seal() -> Self {
        Self::new(
            BuffKind::Marker {
                marker: Marker::MoonSeal,
            },
            PERSISTENT_ROUNDS,
        )
    }

    pub fn phase(&self) -> BuffPhase {
        self.phase
    }

    /// Short label for event logs
    pub fn label(&self) -> String {
        match &self.kind {
            BuffKind::FlatGain { stat, value, .. } => format!("{} {:+}", stat, value),
            BuffKind::PercentGain { stat, percent, .. } => format!("{} x{}", stat, percent),
            BuffKind::OutgoingDamage { bonus } => format!("damage {:+}%", bonus * 100.0),
            BuffKind::IncomingDamage { filter, bonus } => match filter {
                Some(kind) => format!("{} taken {:+}%", kind, bonus * 100.0),
                None => format!("damage taken {:+}%", bonus * 100.0),
            },
            BuffKind::Immunity { filter } => match filter {
                Some(kind) => format!("{} immunity", kind),
                None => "immunity".to_string(),
            },
            BuffKind::Regeneration { per_round } => format!("regeneration {}", per_round),
            BuffKind::Marker { marker } => match marker {
                Marker::MoonSeal => "moon seal".to_string(),
            },
        }
    }

    /// Maximum copies a host may carry without forcing
    pub fn stack_limit(&self) -> Option<usize> {
        match self.kind {
            BuffKind::IncomingDamage { .. } | BuffKind::Immunity { .. } => Some(1),
            _ => None,
        }
    }

    /// Whether two buffs count against the same stack limit
    pub fn stacks_with(&self, other: &Buff) -> bool {
        match (&self.kind, &other.kind) {
            (
                BuffKind::IncomingDamage { filter: a, .. },
                BuffKind::IncomingDamage { filter: b, .. },
            ) => a == b,
            (BuffKind::Immunity { filter: a }, BuffKind::Immunity { filter: b }) => a == b,
            (BuffKind::Marker { marker: a }, BuffKind::Marker { marker: b }) => a == b,
            _ => false,
        }
    }

    pub fn is_marker(&self, marker: Marker) -> bool {
        matches!(self.kind, BuffKind::Marker { marker: m } if m == marker)
    }

    /// Apply the stat change. Returns false if the buff was not pending.
    pub fn on_attach(&mut self, stats: &mut StatBlock) -> bool {
        if self.phase != BuffPhase::Pending {
            return false;
        }
        match &mut self.kind {
            BuffKind::FlatGain {
                stat,
                value,
                applied,
            } => *applied = stats.adjust(*stat, *value),
            BuffKind::PercentGain {
                stat,
                percent,
                applied,
            } => {
                let delta = stats.get(*stat) * (*percent - 1.0);
                *applied = stats.adjust(*stat, delta);
            }
            _ => {}
        }
        self.phase = BuffPhase::Active;
        true
    }

    /// Per-round effect while active
    pub fn on_round(&mut self, stats: &mut StatBlock) {
        if self.phase != BuffPhase::Active {
            return;
        }
        if let BuffKind::Regeneration { per_round } = self.kind {
            stats.health = (stats.health + per_round).clamp(0.0, stats.max_health.max(0.0));
        }
    }

    /// Reverse the stat change. Returns false if the buff was not active.
    pub fn on_detach(&mut self, stats: &mut StatBlock) -> bool {
        if self.phase != BuffPhase::Active {
            return false;
        }
        match &self.kind {
            BuffKind::FlatGain { stat, applied, .. }
            | BuffKind::PercentGain { stat, applied, .. } => {
                stats.adjust(*stat, -*applied);
            }
            _ => {}
        }
        self.phase = BuffPhase::Expired;
        true
    }

    /// Count down one round
    pub fn tick(&mut self) {
        self.remaining_rounds -= 1;
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_rounds < 0
    }

    /// Multiplier this buff applies to the host's outgoing damage
    pub fn outgoing_multiplier(&self) -> f64 {
        match self.kind {
            BuffKind::OutgoingDamage { bonus } => 1.0 + bonus,
            _ => 1.0,
        }
    }

    /// Multiplier this buff applies to incoming damage of `kind`
    pub fn incoming_multiplier(&self, kind: DamageKind) -> f64 {
        let matches = |filter: &Option<DamageKind>| filter.map_or(true, |f| f == kind);
        match &self.kind {
            BuffKind::IncomingDamage { filter, bonus } if matches(filter) => 1.0 + bonus,
            BuffKind::Immunity { filter } if matches(filter) => 0.0,
            _ => 1.0,
        }
    }
}

/// Ordered buffs on one combatant
#[derive(Debug, Clone, Default)]
pub struct BuffList {
    buffs: Vec<Buff>,
}

impl BuffList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach and append a buff.
    ///
    /// Refused only when the buff declares a stack limit that is already
    /// reached and `force` is false.
    pub fn push(&mut self, mut buff: Buff, stats: &mut StatBlock, force: bool) -> bool {
        if !force {
            if let Some(limit) = buff.stack_limit() {
                let stacked = self.buffs.iter().filter(|b| b.stacks_with(&buff)).count();
                if stacked >= limit {
                    return false;
                }
            }
        }
        buff.on_attach(stats);
        self.buffs.push(buff);
        true
    }

    /// Decrement every buff, detach and remove the expired ones, then run the
    /// per-round effect of the survivors. Returns the removed buffs.
    pub fn tick(&mut self, stats: &mut StatBlock) -> Vec<Buff> {
        for buff in &mut self.buffs {
            buff.tick();
        }
        let expired = self.pop_where(|b| b.is_expired(), stats);
        for buff in &mut self.buffs {
            buff.on_round(stats);
        }
        expired
    }

    /// Remove matching buffs in order, detaching each
    pub fn pop_where<F>(&mut self, mut pred: F, stats: &mut StatBlock) -> Vec<Buff>
    where
        F: FnMut(&Buff) -> bool,
    {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.buffs.len());
        for mut buff in self.buffs.drain(..) {
            if pred(&buff) {
                buff.on_detach(stats);
                removed.push(buff);
            } else {
                kept.push(buff);
            }
        }
        self.buffs = kept;
        removed
    }

    /// Detach everything
    pub fn clear(&mut self, stats: &mut StatBlock) -> Vec<Buff> {
        self.pop_where(|_| true, stats)
    }

    pub fn count_marker(&self, marker: Marker) -> usize {
        self.buffs.iter().filter(|b| b.is_marker(marker)).count()
    }

    pub fn outgoing_multiplier(&self) -> f64 {
        self.buffs.iter().map(Buff::outgoing_multiplier).product()
    }

    pub fn incoming_multiplier(&self, kind: DamageKind) -> f64 {
        self.buffs
            .iter()
            .map(|b| b.incoming_multiplier(kind))
            .product()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Buff> {
        self.buffs.iter()
    }

    pub fn len(&self) -> usize {
        self.buffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffs.is_empty()
    }
}
