//! Damage pipeline - pure physical/magic/true calculations
//!
//! Fixed order of operations: base total → crit multiplier → global damage
//! amplification → flat damage reduction → diminishing-returns resistance.
//! This order is load-bearing; changing it changes outcomes.
//!
//! Resistance rule: the damage multiplier is `100 / (100 + r)` for
//! non-negative resistance and `2 - 100 / (100 - r)` for negative
//! resistance. The curve is continuous at zero, reduction grows with
//! diminishing returns for positive values, and negative values amplify
//! damage toward (but never reaching) double.

use crate::crit::CritRoller;
use crate::types::DamageType;

/// Attacker-side stat snapshot for one calculation
#[derive(Debug, Clone, Copy, Default)]
pub struct AttackerSnapshot {
    pub attack_damage: f64,
    pub ability_power: f64,
    pub crit_chance: f64,
    pub crit_damage: f64,
    pub damage_amp: f64,
}

/// Target-side defenses for one calculation
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetSnapshot {
    pub armor: f64,
    pub magic_resist: f64,
    /// Flat percentage reduction (0..1), applied before resistance
    pub flat_reduction: f64,
}

/// Result of one pipeline calculation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    pub amount: f64,
    pub is_crit: bool,
}

/// Damage multiplier implied by a resistance value
pub fn resistance_multiplier(resistance: f64) -> f64 {
    if resistance >= 0.0 {
        100.0 / (100.0 + resistance)
    } else {
        2.0 - 100.0 / (100.0 - resistance)
    }
}

/// Fraction of damage removed by a resistance value (negative = amplified)
pub fn resistance_fraction(resistance: f64) -> f64 {
    1.0 - resistance_multiplier(resistance)
}

/// Physical damage: `base + attacker AD`, mitigated by armor
pub fn physical_damage(
    attacker: &AttackerSnapshot,
    target: &TargetSnapshot,
    base_damage: f64,
    can_crit: bool,
    crits: &mut CritRoller,
) -> DamageOutcome {
    let total = base_damage + attacker.attack_damage;
    resolve(total, DamageType::Physical, attacker, target, can_crit, crits)
}

/// Magic damage: `base + AP × ratio`, mitigated by magic resist
///
/// Abilities crit only when the attacker has an explicit ability-crit
/// grant; the caller decides via `can_crit`.
pub fn magic_damage(
    attacker: &AttackerSnapshot,
    target: &TargetSnapshot,
    base_damage: f64,
    ap_ratio: f64,
    can_crit: bool,
    crits: &mut CritRoller,
) -> DamageOutcome {
    let total = base_damage + attacker.ability_power * ap_ratio;
    resolve(total, DamageType::Magic, attacker, target, can_crit, crits)
}

/// True damage: bypasses flat reduction and resistance entirely
pub fn true_damage(
    attacker: &AttackerSnapshot,
    base_damage: f64,
    can_crit: bool,
    crits: &mut CritRoller,
) -> DamageOutcome {
    resolve(
        base_damage,
        DamageType::True,
        attacker,
        &TargetSnapshot::default(),
        can_crit,
        crits,
    )
}

/// Run an already-summed base total through the shared pipeline steps
///
/// Used directly for buff auto-attack overrides, which substitute their
/// own pre-mitigation amount instead of the `base + AD` default.
pub fn resolve(
    total: f64,
    damage_type: DamageType,
    attacker: &AttackerSnapshot,
    target: &TargetSnapshot,
    can_crit: bool,
    crits: &mut CritRoller,
) -> DamageOutcome {
    let mut amount = total;

    // The roll happens even when the source cannot crit so the attack
    // counter and streak stay consistent across damage sources.
    let is_crit = crits.roll(attacker.crit_chance);
    if is_crit && can_crit {
        amount *= 1.0 + attacker.crit_damage;
    }

    amount *= 1.0 + attacker.damage_amp;

    if damage_type != DamageType::True {
        amount *= 1.0 - target.flat_reduction;
        let resistance = match damage_type {
            DamageType::Physical => target.armor,
            DamageType::Magic => target.magic_resist,
            DamageType::True => 0.0,
        };
        amount *= resistance_multiplier(resistance);
    }

    DamageOutcome { amount, is_crit }
}

/// Mitigation-only step for supplementary damage whose crit was already
/// decided by its source (no roll, no amplification re-applied)
pub fn mitigate_only(amount: f64, damage_type: DamageType, target: &TargetSnapshot) -> f64 {
    if damage_type == DamageType::True {
        return amount;
    }
    let resistance = match damage_type {
        DamageType::Physical => target.armor,
        DamageType::Magic => target.magic_resist,
        DamageType::True => 0.0,
    };
    amount * (1.0 - target.flat_reduction) * resistance_multiplier(resistance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn attacker(ad: f64, crit_chance: f64, crit_damage: f64) -> AttackerSnapshot {
        AttackerSnapshot {
            attack_damage: ad,
            ability_power: 0.0,
            crit_chance,
            crit_damage,
            damage_amp: 0.0,
        }
    }

    #[test]
    fn test_no_resistance_passes_damage_through() {
        let mut crits = CritRoller::with_seed(1);
        let out = physical_damage(
            &attacker(100.0, 0.0, 0.0),
            &TargetSnapshot::default(),
            0.0,
            true,
            &mut crits,
        );
        assert!(!out.is_crit);
        assert!((out.amount - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hundred_armor_halves_damage() {
        let mut crits = CritRoller::with_seed(1);
        let target = TargetSnapshot {
            armor: 100.0,
            ..Default::default()
        };
        let out = physical_damage(&attacker(100.0, 0.0, 0.0), &target, 0.0, true, &mut crits);
        assert!((out.amount - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_guaranteed_crit_multiplies_by_one_plus_crit_damage() {
        let mut crits = CritRoller::with_seed(1);
        let out = physical_damage(
            &attacker(100.0, 1.0, 0.5),
            &TargetSnapshot::default(),
            0.0,
            true,
            &mut crits,
        );
        assert!(out.is_crit);
        assert!((out.amount - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ability_without_crit_grant_never_crits() {
        let mut crits = CritRoller::with_seed(1);
        let out = magic_damage(
            &attacker(0.0, 1.0, 0.5),
            &TargetSnapshot::default(),
            100.0,
            0.0,
            false,
            &mut crits,
        );
        // The roll still happened and counted as an attack.
        assert!(out.is_crit);
        assert_eq!(crits.total_attacks(), 1);
        assert!((out.amount - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_magic_scales_off_ap_ratio() {
        let mut crits = CritRoller::with_seed(1);
        let atk = AttackerSnapshot {
            ability_power: 200.0,
            ..Default::default()
        };
        let out = magic_damage(&atk, &TargetSnapshot::default(), 50.0, 0.5, false, &mut crits);
        assert!((out.amount - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_true_damage_ignores_everything_target_side() {
        let mut crits = CritRoller::with_seed(1);
        let atk = attacker(0.0, 0.0, 0.0);
        let out = true_damage(&atk, 100.0, true, &mut crits);
        assert!((out.amount - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_flat_reduction_applies_before_resistance() {
        let mut crits = CritRoller::with_seed(1);
        let target = TargetSnapshot {
            armor: 100.0,
            flat_reduction: 0.2,
            ..Default::default()
        };
        let out = physical_damage(&attacker(100.0, 0.0, 0.0), &target, 0.0, true, &mut crits);
        // 100 * 0.8 * 0.5
        assert!((out.amount - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_damage_amp_is_independent_of_crit() {
        let mut crits = CritRoller::with_seed(1);
        let atk = AttackerSnapshot {
            attack_damage: 100.0,
            damage_amp: 0.10,
            ..Default::default()
        };
        let out = physical_damage(&atk, &TargetSnapshot::default(), 0.0, true, &mut crits);
        assert!((out.amount - 110.0).abs() < 1e-9);
    }

    // Resolved rule for the negative-resistance branch: the continuous
    // amplification curve, not the discontinuous literal variant found in
    // one of the observed pipelines. Negative resistance amplifies toward
    // 2x and the multiplier is continuous at zero.
    #[test]
    fn test_negative_resistance_amplifies_continuously() {
        assert!((resistance_multiplier(0.0) - 1.0).abs() < f64::EPSILON);
        assert!((resistance_multiplier(-1e-9) - 1.0).abs() < 1e-9);
        assert!(resistance_multiplier(-50.0) > 1.0);
        assert!(resistance_multiplier(-1e9) < 2.0);
        // -100 resistance: 2 - 100/200 = 1.5x
        assert!((resistance_multiplier(-100.0) - 1.5).abs() < f64::EPSILON);
    }

    proptest! {
        #[test]
        fn prop_reduction_increases_with_positive_resistance(r in 0.0f64..5000.0) {
            let lower = resistance_fraction(r);
            let higher = resistance_fraction(r + 1.0);
            prop_assert!(higher > lower);
            prop_assert!(lower >= 0.0 && lower < 1.0);
        }

        #[test]
        fn prop_negative_resistance_multiplier_bounded(r in -5000.0f64..0.0) {
            let mult = resistance_multiplier(r);
            prop_assert!(mult >= 1.0);
            prop_assert!(mult < 2.0);
        }

        #[test]
        fn prop_mitigated_damage_never_negative(
            base in 0.0f64..10_000.0,
            armor in -500.0f64..5000.0,
        ) {
            let mut crits = CritRoller::with_seed(9);
            let target = TargetSnapshot { armor, ..Default::default() };
            let out = physical_damage(
                &attacker(0.0, 0.0, 0.0),
                &target,
                base,
                true,
                &mut crits,
            );
            prop_assert!(out.amount >= 0.0);
        }
    }
}
