//! Built-in unit factories and augments

use crate::buff::{Buff, BuffOrigin, OverrideAttack, SupplementalDamage};
use crate::item::Augment;
use crate::registry::{ContentRegistry, UnitFactory};
use crate::types::{DamageType, Role, StatKind};
use crate::unit::{Ability, Unit, UnitDescriptor};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

pub fn register_defaults(registry: &mut ContentRegistry) {
    registry.register_unit("Yunara", yunara());
    registry.register_augment(combat_training());
    registry.register_augment(magic_wand());
}

pub fn combat_training() -> Augment {
    Augment::new("Combat Training", "Your team gains 10% Attack Damage")
        .with_stat(StatKind::AttackDamage, 0.10)
}

pub fn magic_wand() -> Augment {
    Augment::new("Magic Wand", "Your team gains 10% Ability Power")
        .with_stat(StatKind::AbilityPower, 0.10)
}

/// Yunara: a crit-leaning marksman whose ability replaces auto-attacks
/// with lasers for its duration instead of dealing burst damage.
pub fn yunara() -> UnitFactory {
    Arc::new(|star_level| {
        let star = star_level.clamp(1, 3) as usize - 1;
        let health = [800.0, 1440.0, 2592.0][star];
        let attack_damage = [60.0, 90.0, 135.0][star];
        let laser_damage = [85.0, 130.0, 450.0][star];
        let falloff = [0.7, 0.7, 0.3][star];
        let speed_bonus = [0.75, 0.75, 3.0][star];

        let base_stats: BTreeMap<StatKind, f64> = [
            (StatKind::Health, health),
            (StatKind::AttackDamage, attack_damage),
            (StatKind::AbilityPower, 0.0),
            (StatKind::AttackSpeed, 0.8),
            (StatKind::Armor, 30.0),
            (StatKind::MagicResist, 30.0),
            (StatKind::Mana, 50.0),
            (StatKind::CritChance, 0.25),
            (StatKind::CritDamage, 0.4),
        ]
        .into_iter()
        .collect();

        let ability = Ability::new("Transcendent State", DamageType::Physical)
            .with_cast_time(Duration::from_secs(4))
            .aoe()
            .with_falloff(falloff)
            .allow_auto_attacks_during_cast()
            .on_cast_start(Arc::new(move |unit: &mut Unit| {
                apply_transcendent_state(unit, laser_damage, speed_bonus);
            }));

        Unit::new(UnitDescriptor {
            name: "Yunara".to_string(),
            role: Role::Marksman,
            star_level,
            starting_mana: 0.0,
            attack_windup: Duration::from_millis(20),
            base_stats,
            ability,
        })
    })
}

/// For the buff's duration, auto-attacks become lasers scaling off bonus
/// AD, crits burn for 30% extra true damage, and attack speed surges
/// (the surge itself scales with AP).
fn apply_transcendent_state(unit: &mut Unit, laser_damage: f64, speed_bonus: f64) {
    let ap = unit.stat(StatKind::AbilityPower);
    let actual_speed_bonus = speed_bonus * (1.0 + ap);

    let buff = Buff::new("Transcendent State", Duration::from_secs(4))
        .with_origin(BuffOrigin::Ability("Transcendent State".to_string()))
        .with_bonus(StatKind::AttackSpeed, actual_speed_bonus)
        .with_auto_attack_override(Arc::new(move |attacker: &Unit, _target| {
            let bonus_ad = attacker.bonus(StatKind::AttackDamage);
            OverrideAttack {
                base_damage: laser_damage * (1.0 + bonus_ad),
                damage_type: DamageType::Physical,
            }
        }))
        .with_on_hit(Arc::new(|_unit, _target, damage, is_crit| {
            if !is_crit {
                return None;
            }
            Some(SupplementalDamage {
                amount: damage * 0.3,
                damage_type: DamageType::True,
            })
        }))
        .with_on_apply(Arc::new(move |unit: &mut Unit| {
            tracing::debug!(unit = %unit.name, bonus = actual_speed_bonus, "transcendent state begins");
        }))
        .with_on_expire(Arc::new(|unit: &mut Unit| {
            tracing::debug!(unit = %unit.name, "transcendent state ends");
        }));

    unit.apply_buff(buff);
}
