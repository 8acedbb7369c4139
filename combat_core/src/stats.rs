//! StatTable - layered per-entity attributes with a buff overlay
//!
//! Three intrinsic layers (base, additive bonus, multiplier) plus an
//! overlay contributed by whatever buffs are active at the query time.
//! The overlay is supplied by the caller so reads stay pure with respect
//! to the table itself.

use crate::types::StatKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attack speed is clamped to this many attacks per second
pub const ATTACK_SPEED_CAP: f64 = 5.0;

/// Stat bonuses and multipliers summed from a unit's active buffs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuffOverlay {
    pub bonuses: BTreeMap<StatKind, f64>,
    pub multipliers: BTreeMap<StatKind, f64>,
}

impl BuffOverlay {
    pub fn bonus(&self, stat: StatKind) -> f64 {
        self.bonuses.get(&stat).copied().unwrap_or(0.0)
    }

    pub fn multiplier(&self, stat: StatKind) -> f64 {
        self.multipliers.get(&stat).copied().unwrap_or(0.0)
    }
}

/// Layered stat container
///
/// Resolution rule: `(base + bonus) × multiplier`, where a zero multiplier
/// is treated as identity. Attack damage and attack speed instead resolve
/// as `base × (1 + bonus)` (bonuses are percentages of base), and attack
/// speed is capped at [`ATTACK_SPEED_CAP`].
///
/// Unknown stat kinds resolve to zero. The accumulators are monotone:
/// equipment and augments grant stats for the lifetime of the unit, so
/// there is no removal API. Temporary effects go through buffs instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatTable {
    base: BTreeMap<StatKind, f64>,
    bonus: BTreeMap<StatKind, f64>,
    multiplier: BTreeMap<StatKind, f64>,
}

impl StatTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_base(&mut self, stat: StatKind, value: f64) {
        self.base.insert(stat, value);
    }

    pub fn add_bonus(&mut self, stat: StatKind, value: f64) {
        *self.bonus.entry(stat).or_insert(0.0) += value;
    }

    pub fn add_multiplier(&mut self, stat: StatKind, value: f64) {
        *self.multiplier.entry(stat).or_insert(0.0) += value;
    }

    pub fn base(&self, stat: StatKind) -> f64 {
        self.base.get(&stat).copied().unwrap_or(0.0)
    }

    /// The bonus layer alone, without base or multipliers
    ///
    /// Needed by formulas that scale off bonus-only values, e.g. bonus
    /// attack damage.
    pub fn bonus(&self, stat: StatKind) -> f64 {
        self.bonus.get(&stat).copied().unwrap_or(0.0)
    }

    /// Bonus layer folded with a buff overlay's bonuses
    pub fn bonus_with(&self, stat: StatKind, overlay: &BuffOverlay) -> f64 {
        self.bonus(stat) + overlay.bonus(stat)
    }

    /// Resolved value from the intrinsic layers only
    pub fn get(&self, stat: StatKind) -> f64 {
        self.get_with(stat, &BuffOverlay::default())
    }

    /// Resolved value with a buff overlay folded in
    pub fn get_with(&self, stat: StatKind, overlay: &BuffOverlay) -> f64 {
        let base = self.base(stat);
        let mut bonus = self.bonus(stat);
        let mut multiplier = self.multiplier.get(&stat).copied().unwrap_or(0.0);

        // Zero intrinsic multiplier means "never set", not "times zero".
        if multiplier == 0.0 {
            multiplier = 1.0;
        }

        bonus += overlay.bonus(stat);
        multiplier += overlay.multiplier(stat);

        if stat == StatKind::AttackSpeed || stat == StatKind::AttackDamage {
            let result = base * (1.0 + bonus);
            if stat == StatKind::AttackSpeed && result > ATTACK_SPEED_CAP {
                return ATTACK_SPEED_CAP;
            }
            return result;
        }

        (base + bonus) * multiplier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_stat_resolves_to_zero() {
        let stats = StatTable::new();
        assert!((stats.get(StatKind::Armor) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_general_resolution_rule() {
        let mut stats = StatTable::new();
        stats.set_base(StatKind::Armor, 50.0);
        stats.add_bonus(StatKind::Armor, 20.0);
        stats.add_multiplier(StatKind::Armor, 2.0);
        // (50 + 20) * 2
        assert!((stats.get(StatKind::Armor) - 140.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_multiplier_is_identity() {
        let mut stats = StatTable::new();
        stats.set_base(StatKind::Health, 1000.0);
        assert!((stats.get(StatKind::Health) - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_attack_damage_uses_percent_of_base() {
        let mut stats = StatTable::new();
        stats.set_base(StatKind::AttackDamage, 100.0);
        stats.add_bonus(StatKind::AttackDamage, 0.55);
        // base * (1 + bonus), not (base + bonus)
        assert!((stats.get(StatKind::AttackDamage) - 155.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_attack_speed_cap() {
        let mut stats = StatTable::new();
        stats.set_base(StatKind::AttackSpeed, 0.8);
        stats.add_bonus(StatKind::AttackSpeed, 100.0);
        assert!((stats.get(StatKind::AttackSpeed) - ATTACK_SPEED_CAP).abs() < f64::EPSILON);
    }

    #[test]
    fn test_overlay_folds_into_bonus_layer() {
        let mut stats = StatTable::new();
        stats.set_base(StatKind::AttackDamage, 100.0);
        stats.add_bonus(StatKind::AttackDamage, 0.10);

        let mut overlay = BuffOverlay::default();
        overlay.bonuses.insert(StatKind::AttackDamage, 0.25);

        assert!((stats.get_with(StatKind::AttackDamage, &overlay) - 135.0).abs() < f64::EPSILON);
        assert!((stats.bonus_with(StatKind::AttackDamage, &overlay) - 0.35).abs() < f64::EPSILON);
    }

    #[test]
    fn test_overlay_multiplier_adds_to_identity() {
        let mut stats = StatTable::new();
        stats.set_base(StatKind::DamageAmp, 0.0);
        stats.add_bonus(StatKind::DamageAmp, 0.10);

        let mut overlay = BuffOverlay::default();
        overlay.multipliers.insert(StatKind::DamageAmp, 0.10);

        // (0 + 0.10) * (1.0 + 0.10)
        assert!((stats.get_with(StatKind::DamageAmp, &overlay) - 0.11).abs() < 1e-12);
    }

    #[test]
    fn test_reads_are_idempotent() {
        let mut stats = StatTable::new();
        stats.set_base(StatKind::AttackSpeed, 0.8);
        stats.add_bonus(StatKind::AttackSpeed, 0.4);
        let first = stats.get(StatKind::AttackSpeed);
        let second = stats.get(StatKind::AttackSpeed);
        assert!((first - second).abs() < f64::EPSILON);
    }
}
