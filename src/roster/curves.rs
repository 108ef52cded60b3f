//! Stat and experience curves
//!
//! Closed-form growth formulas for characters and monsters, plus the
//! experience table that maps accumulated experience to a level.

use serde::Serialize;

pub const CHARACTER_HEALTH_BASE: f64 = 900.0;
pub const CHARACTER_HEALTH_PER_DECADE: f64 = 350.0;
pub const WEAPON_LEVEL_ATTACK: f64 = 3.0;
/// Normalizes heroes with different base attack onto one scale
pub const ATTACK_NORMALIZER: f64 = 92.0;
pub const LEVEL_ATTACK_SCALE: f64 = 1.03;
pub const LEVEL_ATTACK_OFFSET: f64 = 10.0;

pub const MONSTER_HEALTH_BASE: f64 = 850.0;
pub const MONSTER_HEALTH_PER_DECADE: f64 = 380.0;
pub const MONSTER_HEALTH_LEVEL_OFFSET: f64 = 5.0;
pub const MONSTER_HEALTH_GROWTH: f64 = 0.0125;
pub const MONSTER_ATTACK_BASE: f64 = 40.0;
pub const MONSTER_ATTACK_PER_LEVEL: f64 = 4.6;
pub const MONSTER_ATTACK_LEVEL_OFFSET: f64 = 8.0;

pub const MAX_LEVEL: u32 = 100;
pub const EXP_CUBIC: u64 = 500;
pub const EXP_QUADRATIC: u64 = 1000;

/// `900 + 350 * log10(level)`
pub fn character_max_health(level: u32) -> f64 {
    CHARACTER_HEALTH_BASE + CHARACTER_HEALTH_PER_DECADE * f64::from(level.max(1)).log10()
}

/// `(3 * weapon_level + base) * (92 / base) * 1.03 * log10(level + 10)`
pub fn character_attack(level: u32, weapon_level: u32, base_attack: f64) -> f64 {
    let base = base_attack.max(1.0);
    (WEAPON_LEVEL_ATTACK * f64::from(weapon_level) + base)
        * (ATTACK_NORMALIZER / base)
        * LEVEL_ATTACK_SCALE
        * (f64::from(level) + LEVEL_ATTACK_OFFSET).log10()
}

/// `round((850 + 380 * log10(level + 5)) * (1 + 0.0125 * level))`
pub fn monster_max_health(level: u32) -> f64 {
    let level = f64::from(level);
    ((MONSTER_HEALTH_BASE
        + MONSTER_HEALTH_PER_DECADE * (level + MONSTER_HEALTH_LEVEL_OFFSET).log10())
        * (1.0 + MONSTER_HEALTH_GROWTH * level))
        .round()
}

/// `round((40 + 4.6 * level) * log10(level + 8))`
pub fn monster_attack(level: u32) -> f64 {
    let level = f64::from(level);
    ((MONSTER_ATTACK_BASE + MONSTER_ATTACK_PER_LEVEL * level)
        * (level + MONSTER_ATTACK_LEVEL_OFFSET).log10())
    .round()
}

/// Where a given amount of experience lands on the curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurrentLevel {
    pub level: u32,
    /// Experience earned past the start of `level`
    pub current_exp: u64,
    /// Experience between `level` and the next one; 0 at the cap
    pub exp_to_next: u64,
    /// Percent of the way to the next level, two decimals
    pub progress: f64,
}

/// Experience curve over levels `0..=max_level`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExperienceCurve {
    max_level: u32,
}

impl Default for ExperienceCurve {
    fn default() -> Self {
        Self::new(MAX_LEVEL)
    }
}

impl ExperienceCurve {
    pub const fn new(max_level: u32) -> Self {
        Self { max_level }
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    /// Total experience needed to reach `level`: `500 * L^3 + 1000 * L^2`
    pub fn total_exp(&self, level: u32) -> u64 {
        let level = u64::from(level.min(self.max_level));
        EXP_CUBIC * level.pow(3) + EXP_QUADRATIC * level.pow(2)
    }

    /// Experience from `level` to `level + 1`
    pub fn exp_to_next_level(&self, level: u32) -> u64 {
        if level >= self.max_level {
            return 0;
        }
        self.total_exp(level + 1) - self.total_exp(level)
    }

    pub fn level_for(&self, exp: u64) -> u32 {
        self.current_level(exp).level
    }

    /// Locate `exp` on the curve
    pub fn current_level(&self, exp: u64) -> CurrentLevel {
        // The cube root overshoots by at most two levels
        let approx = (exp as f64 / EXP_CUBIC as f64).cbrt() as u32;
        let mut level = approx.saturating_sub(2).min(self.max_level);
        while level < self.max_level && exp >= self.total_exp(level + 1) {
            level += 1;
        }

        let current_exp = exp - self.total_exp(level);
        let exp_to_next = self.exp_to_next_level(level);
        let progress = if exp_to_next == 0 {
            100.0
        } else {
            (current_exp as f64 / exp_to_next as f64 * 10_000.0).round() / 100.0
        };
        CurrentLevel {
            level,
            current_exp,
            exp_to_next,
            progress,
        }
    }

    /// Printable table of levels `0..=upto`
    pub fn level_table(&self, upto: u32) -> String {
        let mut out = format!("{:>5}  {:>12}  {:>12}\n", "level", "total", "to next");
        for level in 0..=upto.min(self.max_level) {
            out.push_str(&format!(
                "{:>5}  {:>12}  {:>12}\n",
                level,
                self.total_exp(level),
                self.exp_to_next_level(level)
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_curves() {
        assert_eq!(character_max_health(1), 900.0);
        assert!((character_max_health(10) - 1250.0).abs() < 1e-9);
        assert_eq!(character_max_health(0), 900.0, "level 0 is treated as 1");

        // log10(90 + 10) = 2
        let attack = character_attack(90, 0, 92.0);
        assert!((attack - 92.0 * 1.03 * 2.0).abs() < 1e-9);
        assert!(character_attack(90, 10, 92.0) > attack);
    }

    #[test]
    fn test_monster_curves() {
        // (850 + 380) * 1.0625 = 1306.875
        assert_eq!(monster_max_health(5), 1307.0);
        // 40 * log10(8)
        assert_eq!(monster_attack(0), 36.0);
        assert!(monster_attack(50) > monster_attack(10));
    }

    #[test]
    fn test_total_exp() {
        let curve = ExperienceCurve::default();
        assert_eq!(curve.total_exp(0), 0);
        assert_eq!(curve.total_exp(1), 1500);
        assert_eq!(curve.total_exp(2), 8000);
        assert_eq!(curve.total_exp(3), 22_500);
        assert_eq!(curve.total_exp(100), 510_000_000);
        assert_eq!(curve.exp_to_next_level(0), 1500);
        assert_eq!(curve.exp_to_next_level(1), 6500);
        assert_eq!(curve.exp_to_next_level(100), 0);
    }

    #[test]
    fn test_current_level_boundaries() {
        let curve = ExperienceCurve::default();
        assert_eq!(curve.level_for(0), 0);
        assert_eq!(curve.level_for(1499), 0);
        assert_eq!(curve.level_for(1500), 1);
        assert_eq!(curve.level_for(5000), 1);
        assert_eq!(curve.level_for(7999), 1);
        assert_eq!(curve.level_for(8000), 2);
        assert_eq!(curve.level_for(u64::MAX / 2), 100);

        for level in 0..=100 {
            let exp = curve.total_exp(level);
            assert_eq!(curve.level_for(exp), level);
            if level > 0 {
                assert_eq!(curve.level_for(exp - 1), level - 1);
            }
        }
    }

    #[test]
    fn test_progress() {
        let curve = ExperienceCurve::default();
        let at = curve.current_level(2800);
        assert_eq!(at.level, 1);
        assert_eq!(at.current_exp, 1300);
        assert_eq!(at.exp_to_next, 6500);
        assert_eq!(at.progress, 20.0);

        let capped = curve.current_level(curve.total_exp(100) + 5);
        assert_eq!(capped.level, 100);
        assert_eq!(capped.progress, 100.0);
    }

    #[test]
    fn test_level_table() {
        let table = ExperienceCurve::default().level_table(3);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[1].contains("1500"));
        assert!(lines[2].contains("6500"));
    }
}
