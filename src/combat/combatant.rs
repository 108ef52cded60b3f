//! Combatants
//!
//! A combatant owns its stat block and buffs and exposes the two halves of
//! the attack pipeline: `on_attack` (attacker-side rolls) and `attacked`
//! (defender-side mitigation, balance, shield and health).

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::buff::{Buff, BuffList};
use super::damage::{AttackRoll, DamageKind};
use super::events::ActionEvent;
use super::roll::Roller;
use super::stats::StatBlock;
use super::team::TeamId;
use crate::config::CombatConfig;
use crate::roster::Role;

/// Position of a combatant: its team and slot within the team roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CombatantId {
    pub team: TeamId,
    pub slot: usize,
}

impl CombatantId {
    pub fn new(team: TeamId, slot: usize) -> Self {
        Self { team, slot }
    }
}

impl std::fmt::Display for CombatantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.team, self.slot)
    }
}

/// Who picks a combatant's actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    /// Built-in logic of the combatant's role
    #[default]
    Automatic,
    /// The owning team's controller (a human behind some input channel)
    External,
}

/// Attacker stats captured before the defender is borrowed mutably
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackerProfile {
    pub id: CombatantId,
    pub team: TeamId,
    pub focus: f64,
    pub critical_chance: f64,
    pub critical_multiplier: f64,
    pub attack: f64,
    pub effective_defuse: f64,
    pub outgoing_multiplier: f64,
}

/// A participant in an encounter
#[derive(Debug, Clone)]
pub struct Combatant {
    id: CombatantId,
    name: String,
    role: Role,
    control: Control,
    stats: StatBlock,
    buffs: BuffList,
}

impl Combatant {
    /// Create an unregistered combatant; its id is assigned by its team
    pub fn new(name: impl Into<String>, role: Role, stats: StatBlock) -> Self {
        Self {
            id: CombatantId::new(TeamId(0), 0),
            name: name.into(),
            role,
            control: Control::Automatic,
            stats,
            buffs: BuffList::new(),
        }
    }

    pub fn with_control(mut self, control: Control) -> Self {
        self.control = control;
        self
    }

    pub fn id(&self) -> CombatantId {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: CombatantId) {
        self.id = id;
    }

    pub fn team(&self) -> TeamId {
        self.id.team
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn role_mut(&mut self) -> &mut Role {
        &mut self.role
    }

    pub fn control(&self) -> Control {
        self.control
    }

    pub fn stats(&self) -> &StatBlock {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut StatBlock {
        &mut self.stats
    }

    pub fn buffs(&self) -> &BuffList {
        &self.buffs
    }

    pub fn max_health(&self) -> f64 {
        self.stats.max_health
    }

    /// Stored health clamped into `[0, max_health]`
    pub fn health(&self) -> f64 {
        self.stats.health.clamp(0.0, self.max_health().max(0.0))
    }

    /// Write the clamped health back, e.g. after max health shrank
    pub fn clamp_health(&mut self) -> f64 {
        self.stats.health = self.health();
        self.stats.health
    }

    pub fn is_alive(&self) -> bool {
        self.health() > 0.0
    }

    pub fn balance(&self) -> f64 {
        self.stats.balance
    }

    /// Alive, not staggered, and with a defined scheduling value
    pub fn is_actionable(&self) -> bool {
        self.is_alive() && self.stats.balance > 0.0 && self.stats.speed > 0.0
    }

    pub fn attack_value(&self) -> f64 {
        self.stats.attack
    }

    pub fn effective_defuse(&self) -> f64 {
        self.stats.effective_defuse()
    }

    /// `base_ticks / speed - reduced_value`; lower acts sooner
    pub fn scheduling_value(&self, base_ticks: f64) -> f64 {
        base_ticks / self.stats.speed - self.stats.reduced_value
    }

    pub fn reduce_scheduling_value(&mut self, delta: f64) {
        self.stats.reduced_value += delta;
    }

    pub fn reset_scheduling_value(&mut self) {
        self.stats.reduced_value = 0.0;
    }

    /// Attach a buff. Returns whether it was added.
    pub fn add_buff(&mut self, buff: Buff, force: bool) -> bool {
        let added = self.buffs.push(buff, &mut self.stats, force);
        self.clamp_health();
        added
    }

    /// Remove matching buffs, reversing their effects
    pub fn pop_buffs<F>(&mut self, pred: F) -> Vec<Buff>
    where
        F: FnMut(&Buff) -> bool,
    {
        let popped = self.buffs.pop_where(pred, &mut self.stats);
        self.clamp_health();
        popped
    }

    /// Start of this combatant's turn: count buffs down, detach the expired
    /// ones and run per-round effects. Returns the expired buffs.
    pub fn begin_turn(&mut self) -> Vec<Buff> {
        let expired = self.buffs.tick(&mut self.stats);
        self.clamp_health();
        expired
    }

    /// End of this combatant's turn: undo action-local speed changes
    pub fn end_turn(&mut self) {
        self.stats.speed = self.stats.unset_speed;
    }

    /// Snapshot of the stats the defender needs
    pub fn profile(&self) -> AttackerProfile {
        AttackerProfile {
            id: self.id,
            team: self.team(),
            focus: self.stats.focus,
            critical_chance: self.stats.critical_chance,
            critical_multiplier: self.stats.critical_multiplier,
            attack: self.attack_value(),
            effective_defuse: self.effective_defuse(),
            outgoing_multiplier: self.buffs.outgoing_multiplier(),
        }
    }

    /// Attacker-side rolls: outgoing buffs, miss, crit, rounding
    pub fn on_attack(
        &self,
        base: f64,
        defender: &Combatant,
        roller: &mut Roller,
        config: &CombatConfig,
    ) -> AttackRoll {
        let mut amount = base.max(0.0) * self.buffs.outgoing_multiplier();

        let miss_probability = miss_probability(self.stats.focus, defender.stats.focus, config);
        let missed = roller.chance(miss_probability);
        let mut critical = false;
        if missed {
            amount *= config.miss_damage_factor;
        } else if roller.chance(self.stats.critical_chance) {
            amount *= self.stats.critical_multiplier;
            critical = true;
        }

        AttackRoll {
            amount: amount.round().max(0.0) as i64,
            critical,
            missed,
        }
    }

    /// Defender-side resolution. Returns the damage that reached health.
    pub fn attacked(
        &mut self,
        kind: DamageKind,
        raw: i64,
        source: &AttackerProfile,
        missed: bool,
        config: &CombatConfig,
    ) -> i64 {
        if source.team == self.team() {
            self.stats.reduce_balance(config.friendly_fire_balance);
            return 0;
        }

        let amount = raw.max(0) as f64 * self.buffs.incoming_multiplier(kind);

        let mut effective = if kind.is_mitigated() {
            (amount * self.effective_defuse() / source.effective_defuse.max(1.0)).round()
        } else {
            amount.round()
        }
        .max(0.0);

        let balance_loss =
            (effective / 2.0 * source.attack / self.attack_value().max(1.0)).round();
        self.stats.reduce_balance(balance_loss.max(0.0));

        let absorbed = effective.min(self.stats.shield);
        self.stats.shield = (self.stats.shield - absorbed).max(0.0);
        effective -= absorbed;

        self.stats.health = (self.health() - effective).max(0.0);

        debug!(
            target_id = %self.id,
            source = %source.id,
            %kind,
            raw,
            effective,
            absorbed,
            missed,
            "attacked"
        );
        effective as i64
    }

    /// React to an event recorded on this combatant's team.
    /// Returns a follow-up event when the final meter fills.
    pub fn on_event(&mut self, event: &ActionEvent, config: &CombatConfig) -> Option<ActionEvent> {
        let ActionEvent::Attack { origin, target, .. } = event else {
            return None;
        };
        let mut gain = 0.0;
        if *origin == self.id {
            gain += config.meter_gain_on_hit;
        }
        if *target == self.id {
            gain += config.meter_gain_on_hurt;
        }
        if gain > 0.0 && self.charge_meter(gain) {
            Some(ActionEvent::MeterFilled { combatant: self.id })
        } else {
            None
        }
    }

    /// Add final meter charge; true when this filled the meter
    pub fn charge_meter(&mut self, amount: f64) -> bool {
        match self.stats.final_meter.as_mut() {
            Some(meter) => meter.charge(amount),
            None => false,
        }
    }

    pub fn final_ready(&self) -> bool {
        self.stats.final_meter.is_some_and(|m| m.is_full())
    }

    pub fn reset_meter(&mut self) {
        if let Some(meter) = self.stats.final_meter.as_mut() {
            meter.reset();
        }
    }
}

/// `clamp((attacker_focus - defender_focus) / scale + baseline, 0, 1)`
pub fn miss_probability(attacker_focus: f64, defender_focus: f64, config: &CombatConfig) -> f64 {
    let scale = config.miss_focus_scale.max(1.0);
    ((attacker_focus - defender_focus) / scale + config.miss_baseline).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::buff::Marker;
    use crate::combat::stats::Stat;
    use crate::roster::TrainingDummy;

    fn config() -> CombatConfig {
        CombatConfig::default()
    }

    fn fighter(team: usize, slot: usize) -> Combatant {
        let mut c = TrainingDummy::spawn("dummy", &config());
        c.assign_id(CombatantId::new(TeamId(team), slot));
        c.stats_mut().critical_chance = 0.0;
        c.stats_mut().focus = 0.0;
        c
    }

    #[test]
    fn test_mitigation_scenario() {
        let config = config();
        let mut attacker = fighter(0, 0);
        attacker.stats_mut().attack = 100.0;
        attacker.stats_mut().defuse = 50.0;
        let mut defender = fighter(1, 0);
        defender.stats_mut().defuse = 100.0;
        defender.stats_mut().attack = 100.0;
        defender.stats_mut().max_health = 1000.0;
        defender.stats_mut().health = 1000.0;

        let damage = defender.attacked(DamageKind::Physical, 60, &attacker.profile(), false, &config);
        assert_eq!(damage, 120);
        assert_eq!(defender.health(), 880.0);
        // round(120 / 2 * 100 / 100) = 60
        assert_eq!(defender.balance(), 40.0);
    }

    #[test]
    fn test_real_damage_skips_mitigation() {
        let config = config();
        let attacker = fighter(0, 0);
        let mut defender = fighter(1, 0);
        defender.stats_mut().defuse = 500.0;
        let damage = defender.attacked(DamageKind::Real, 37, &attacker.profile(), false, &config);
        assert_eq!(damage, 37);
    }

    #[test]
    fn test_friendly_fire() {
        let config = config();
        let ally = fighter(0, 0);
        let mut target = fighter(0, 1);
        target.stats_mut().shield = 50.0;
        let before = target.stats().clone();

        let damage = target.attacked(DamageKind::Fire, 999, &ally.profile(), false, &config);
        assert_eq!(damage, 0);
        assert_eq!(target.balance(), before.balance - 15.0);
        assert_eq!(target.health(), before.health);
        assert_eq!(target.stats().shield, before.shield);
    }

    #[test]
    fn test_shield_absorbs_first() {
        let config = config();
        let attacker = fighter(0, 0);
        let mut defender = fighter(1, 0);
        defender.stats_mut().shield = 30.0;
        let before = defender.health();

        // Equal defuse and attack: effective == raw
        let damage = defender.attacked(DamageKind::Physical, 50, &attacker.profile(), false, &config);
        assert_eq!(damage, 20);
        assert_eq!(defender.stats().shield, 0.0);
        assert_eq!(defender.health(), before - 20.0);
    }

    #[test]
    fn test_non_negative_after_huge_hit() {
        let config = config();
        let attacker = fighter(0, 0);
        let mut defender = fighter(1, 0);
        defender.stats_mut().shield = 10.0;
        defender.attacked(DamageKind::Physical, 1_000_000, &attacker.profile(), false, &config);
        assert_eq!(defender.health(), 0.0);
        assert_eq!(defender.stats().shield, 0.0);
        assert_eq!(defender.balance(), 0.0);
        assert!(!defender.is_actionable());

        let damage = defender.attacked(DamageKind::Physical, -40, &attacker.profile(), false, &config);
        assert_eq!(damage, 0, "negative raw amounts never heal");
    }

    #[test]
    fn test_degenerate_stats_do_not_divide_by_zero() {
        let config = config();
        let mut attacker = fighter(0, 0);
        attacker.stats_mut().defuse = 0.0;
        attacker.stats_mut().attack = 0.0;
        let mut defender = fighter(1, 0);
        defender.stats_mut().attack = 0.0;
        defender.stats_mut().defuse = 10.0;

        let damage = defender.attacked(DamageKind::Ice, 5, &attacker.profile(), false, &config);
        assert_eq!(damage, 50, "attacker defuse is floored at 1");
        assert!(defender.health().is_finite());
        assert!(defender.balance().is_finite());
    }

    #[test]
    fn test_lunar_eclipse_scales_mental_before_mitigation() {
        let config = config();
        let attacker = fighter(0, 0);
        let mut defender = fighter(1, 0);
        defender.stats_mut().max_health = 1000.0;
        defender.stats_mut().health = 1000.0;
        defender.add_buff(Buff::lunar_eclipse(2), false);

        assert_eq!(defender.attacked(DamageKind::Mental, 100, &attacker.profile(), false, &config), 115);
        // The first hit cost balance, which would shrink defuse for the next one
        assert!(defender.balance() < config.initial_balance);
        defender.stats_mut().balance = config.initial_balance;
        assert_eq!(defender.attacked(DamageKind::Fire, 100, &attacker.profile(), false, &config), 100);
    }

    #[test]
    fn test_miss_probability_floor() {
        let config = config();
        assert_eq!(miss_probability(0.0, 1000.0, &config), 0.0);
        assert!((miss_probability(0.0, 0.0, &config) - 0.05).abs() < 1e-12);
        assert_eq!(miss_probability(5000.0, 0.0, &config), 1.0);
    }

    #[test]
    fn test_on_attack_miss_and_crit() {
        let config = config();
        let mut roller = Roller::seeded(11);
        let mut attacker = fighter(0, 0);
        let defender = fighter(1, 0);

        // Guaranteed miss
        attacker.stats_mut().focus = 2000.0;
        let roll = attacker.on_attack(100.0, &defender, &mut roller, &config);
        assert!(roll.missed);
        assert!(!roll.critical);
        assert_eq!(roll.amount, 40);

        // Never miss, always crit
        attacker.stats_mut().focus = -2000.0;
        attacker.stats_mut().critical_chance = 1.0;
        attacker.stats_mut().critical_multiplier = 2.0;
        let roll = attacker.on_attack(100.0, &defender, &mut roller, &config);
        assert!(!roll.missed);
        assert!(roll.critical);
        assert_eq!(roll.amount, 200);
    }

    #[test]
    fn test_on_attack_applies_outgoing_buffs() {
        let config = config();
        let mut roller = Roller::seeded(5);
        let mut attacker = fighter(0, 0);
        attacker.stats_mut().focus = -2000.0;
        attacker.add_buff(Buff::outgoing(0.25, 1), false);
        let defender = fighter(1, 0);
        let roll = attacker.on_attack(80.0, &defender, &mut roller, &config);
        assert_eq!(roll.amount, 100);
    }

    #[test]
    fn test_scheduling_value() {
        let mut c = fighter(0, 0);
        c.stats_mut().speed = 100.0;
        c.stats_mut().unset_speed = 100.0;
        assert_eq!(c.scheduling_value(100_000.0), 1000.0);
        c.reduce_scheduling_value(250.0);
        assert_eq!(c.scheduling_value(100_000.0), 750.0);
        c.reset_scheduling_value();
        assert_eq!(c.scheduling_value(100_000.0), 1000.0);
    }

    #[test]
    fn test_actionability() {
        let mut c = fighter(0, 0);
        assert!(c.is_actionable());
        c.stats_mut().balance = 0.0;
        assert!(!c.is_actionable(), "staggered combatants sit out");
        c.stats_mut().balance = 10.0;
        c.stats_mut().health = 0.0;
        assert!(!c.is_actionable());
    }

    #[test]
    fn test_lazy_health_clamp() {
        let mut c = fighter(0, 0);
        c.stats_mut().health = 1000.0;
        c.add_buff(Buff::flat(Stat::MaxHealth, -400.0, 1), false);
        assert_eq!(c.health(), 600.0);
        assert_eq!(c.stats().health, 600.0);
    }

    #[test]
    fn test_turn_resets_speed() {
        let mut c = fighter(0, 0);
        c.add_buff(Buff::flat(Stat::Speed, 3.0, 0), false);
        c.stats_mut().speed -= 50.0;
        c.end_turn();
        assert_eq!(c.stats().speed, 100.0, "buffed speed survives, local change does not");

        let expired = c.begin_turn();
        assert_eq!(expired.len(), 1);
        assert_eq!(c.stats().speed, 97.0);
        assert_eq!(c.stats().unset_speed, 97.0);
    }

    #[test]
    fn test_pop_buffs() {
        let mut c = fighter(0, 0);
        c.add_buff(Buff::moon_seal(), false);
        c.add_buff(Buff::moon_seal(), false);
        assert_eq!(c.buffs().count_marker(Marker::MoonSeal), 2);
        let popped = c.pop_buffs(|b| b.is_marker(Marker::MoonSeal));
        assert_eq!(popped.len(), 2);
        assert!(c.buffs().is_empty());
    }

    #[test]
    fn test_meter_charges_from_events() {
        let config = config();
        let mut c = fighter(0, 0);
        c.stats_mut().final_meter = Some(crate::combat::FinalMeter::new(15.0));
        let other = CombatantId::new(TeamId(1), 0);
        let hit = ActionEvent::Attack {
            origin: c.id(),
            target: other,
            amount: 10,
            kind: DamageKind::Physical,
            missed: false,
            critical: false,
        };
        assert_eq!(c.on_event(&hit, &config), None);
        assert!(!c.final_ready());
        let hurt = ActionEvent::Attack {
            origin: other,
            target: c.id(),
            amount: 10,
            kind: DamageKind::Physical,
            missed: false,
            critical: false,
        };
        assert_eq!(
            c.on_event(&hurt, &config),
            Some(ActionEvent::MeterFilled { combatant: c.id() })
        );
        assert!(c.final_ready());
    }
}
