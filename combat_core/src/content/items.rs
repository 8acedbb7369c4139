//! Built-in item definitions

use crate::buff::{Buff, BuffOrigin};
use crate::item::{InstanceId, ItemDef};
use crate::registry::ContentRegistry;
use crate::types::{StackPolicy, StatKind};
use crate::unit::Unit;
use std::sync::Arc;
use std::time::Duration;

pub fn register_defaults(registry: &mut ContentRegistry) {
    registry.register_item(deathblade());
    registry.register_item(rageblade());
    registry.register_item(infinity_edge());
    registry.register_item(jeweled_gauntlet());
    registry.register_item(krakens_fury());
    registry.register_item(titans_resolve());
    registry.register_item(strikers_flail());
    registry.register_item(red_buff());
    registry.register_item(mittens());
}

pub fn deathblade() -> ItemDef {
    ItemDef::new("Deathblade", "+55% Attack Damage, +10% Damage Amp")
        .with_stat(StatKind::AttackDamage, 0.55)
        .with_stat(StatKind::DamageAmp, 0.10)
}

pub fn rageblade() -> ItemDef {
    ItemDef::new(
        "Guinsoo's Rageblade",
        "+10% Attack Speed, +10% Ability Power. Every second, gain 7% stacking Attack Speed for the rest of combat.",
    )
    .with_stat(StatKind::AttackSpeed, 0.10)
    .with_stat(StatKind::AbilityPower, 0.10)
    .stacking(10_000)
    .on_second(Arc::new(|unit: &mut Unit, _id: InstanceId| {
        unit.stats.add_bonus(StatKind::AttackSpeed, 0.07);
    }))
}

pub fn infinity_edge() -> ItemDef {
    ItemDef::new(
        "Infinity Edge",
        "+35% Attack Damage, +35% Crit Chance. Abilities can critically strike.",
    )
    .with_stat(StatKind::CritChance, 0.35)
    .with_stat(StatKind::AttackDamage, 0.35)
    .unique()
    .grants_ability_crit()
}

pub fn jeweled_gauntlet() -> ItemDef {
    ItemDef::new(
        "Jeweled Gauntlet",
        "+35% Ability Power, +35% Crit Chance. Abilities can critically strike.",
    )
    .with_stat(StatKind::CritChance, 0.35)
    .with_stat(StatKind::AbilityPower, 0.35)
    .unique()
    .grants_ability_crit()
}

/// Attacks grant stacking AD; the stack that fills the bar also grants a
/// flat attack-speed bonus for the rest of combat.
pub fn krakens_fury() -> ItemDef {
    const MAX_STACKS: u32 = 15;

    ItemDef::new(
        "Kraken's Fury",
        "+10% Attack Damage, +10% Attack Speed, +20 Magic Resist. Attacks grant 3.5% stacking Attack Damage, up to 15 times. At 15 stacks gain 15% Attack Speed.",
    )
    .with_stat(StatKind::AttackDamage, 0.10)
    .with_stat(StatKind::AttackSpeed, 0.10)
    .with_stat(StatKind::MagicResist, 20.0)
    .stacking(MAX_STACKS)
    .on_attack(Arc::new(move |unit: &mut Unit, id: InstanceId| {
        let name = format!("krakens-fury-{id}");
        let current = unit.buffs.stacks(&name, unit.now);
        if current >= MAX_STACKS {
            return;
        }

        let mut stack = Buff::permanent(&name)
            .with_origin(BuffOrigin::Item(id))
            .with_bonus(StatKind::AttackDamage, 0.035)
            .with_stacking(MAX_STACKS, StackPolicy::Additive);

        // The transition onto the final stack carries the speed bonus.
        if current == MAX_STACKS - 1 {
            stack = stack.with_bonus(StatKind::AttackSpeed, 0.15);
        }

        unit.apply_buff(stack);

        let stacks = unit.buffs.stacks(&name, unit.now);
        if let Some(instance) = unit.item_mut(id) {
            instance.stacks = stacks;
        }
    }))
}

/// Landed hits grant stacking AD/AP; a full bar adds a damage-amp
/// multiplier on top.
pub fn titans_resolve() -> ItemDef {
    const MAX_STACKS: u32 = 25;

    ItemDef::new(
        "Titan's Resolve",
        "+10% Attack Speed, +20 Armor. Dealing damage grants a stack, up to 25. Each stack gives 2% Attack Damage and 2% Ability Power; at 25 stacks also gain 10% damage amp.",
    )
    .with_stat(StatKind::AttackSpeed, 0.10)
    .with_stat(StatKind::Armor, 20.0)
    .stacking(MAX_STACKS)
    .on_hit(Arc::new(move |unit: &mut Unit, id: InstanceId, _target, _damage| {
        let name = format!("titans-resolve-{id}");

        unit.apply_buff(
            Buff::permanent(&name)
                .with_origin(BuffOrigin::Item(id))
                .with_bonus(StatKind::AttackDamage, 0.02)
                .with_bonus(StatKind::AbilityPower, 0.02)
                .with_stacking(MAX_STACKS, StackPolicy::Additive),
        );

        let stacks = unit.buffs.stacks(&name, unit.now);
        if stacks >= MAX_STACKS {
            if let Some(buff) = unit.buffs.find_mut(&name) {
                let amp = buff
                    .stat_multipliers
                    .entry(StatKind::DamageAmp)
                    .or_insert(0.0);
                if *amp < 0.10 {
                    *amp = 0.10;
                }
            }
        }

        if let Some(instance) = unit.item_mut(id) {
            instance.stacks = stacks;
        }
    }))
}

/// Critical strikes grant a short stacking damage-amp window.
pub fn strikers_flail() -> ItemDef {
    ItemDef::new(
        "Striker's Flail",
        "+10% Attack Speed, +150 Health, +20% Crit Chance, +10% Damage Amp. Critical strikes grant 5% Damage Amp for 5 seconds, stacking up to 4 times.",
    )
    .with_stat(StatKind::AttackSpeed, 0.10)
    .with_stat(StatKind::Health, 150.0)
    .with_stat(StatKind::CritChance, 0.20)
    .with_stat(StatKind::DamageAmp, 0.10)
    .on_hit(Arc::new(|unit: &mut Unit, id: InstanceId, _target, _damage| {
        if !unit.crits.last_was_crit() {
            return;
        }
        let name = format!("strikers-flail-{id}");
        unit.apply_buff(
            Buff::new(name, Duration::from_secs(5))
                .with_origin(BuffOrigin::Item(id))
                .with_bonus(StatKind::DamageAmp, 0.05)
                .with_stacking(4, StackPolicy::Additive),
        );
    }))
}

pub fn red_buff() -> ItemDef {
    ItemDef::new("Red Buff", "+45% Attack Speed, +6% Damage Amp")
        .with_stat(StatKind::AttackSpeed, 0.45)
        .with_stat(StatKind::DamageAmp, 0.06)
}

pub fn mittens() -> ItemDef {
    ItemDef::new("Mittens", "+65% Attack Speed, +15% Damage Amp")
        .with_stat(StatKind::AttackSpeed, 0.65)
        .with_stat(StatKind::DamageAmp, 0.15)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DamageType, Role};
    use crate::unit::{Ability, UnitDescriptor};
    use std::collections::BTreeMap;

    fn bare_unit() -> Unit {
        let base_stats: BTreeMap<StatKind, f64> =
            [(StatKind::AttackDamage, 100.0), (StatKind::AttackSpeed, 1.0)]
                .into_iter()
                .collect();
        Unit::new(UnitDescriptor {
            name: "holder".to_string(),
            role: Role::Marksman,
            star_level: 1,
            starting_mana: 0.0,
            attack_windup: Duration::ZERO,
            base_stats,
            ability: Ability::new("noop", DamageType::Physical),
        })
    }

    fn fire_on_attack(unit: &mut Unit, id: InstanceId, times: usize) {
        let hook = unit
            .item(id)
            .and_then(|i| i.def.hooks.on_attack.clone())
            .expect("hook bound");
        for _ in 0..times {
            hook(unit, id);
        }
    }

    #[test]
    fn test_krakens_stacks_cap_and_grant_speed() {
        let mut unit = bare_unit();
        let id = unit.equip(krakens_fury()).expect("equips");

        fire_on_attack(&mut unit, id, 20);

        let name = format!("krakens-fury-{id}");
        assert_eq!(unit.buffs.stacks(&name, unit.now), 15);
        assert_eq!(unit.item(id).map(|i| i.stacks), Some(15));

        // 15 stacks of 3.5% AD on top of the 10% equip bonus.
        let ad_bonus = unit.bonus(StatKind::AttackDamage);
        assert!((ad_bonus - (0.10 + 15.0 * 0.035)).abs() < 1e-9);

        // The final stack carried the flat speed bonus.
        let buff = unit.buffs.get_active(&name, unit.now).expect("active");
        assert!((buff.stat_bonuses[&StatKind::AttackSpeed] - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_two_krakens_stack_independently() {
        let mut unit = bare_unit();
        let first = unit.equip(krakens_fury()).expect("equips");
        let second = unit.equip(krakens_fury()).expect("not unique");

        fire_on_attack(&mut unit, first, 3);
        fire_on_attack(&mut unit, second, 1);

        assert_eq!(unit.buffs.stacks(&format!("krakens-fury-{first}"), unit.now), 3);
        assert_eq!(unit.buffs.stacks(&format!("krakens-fury-{second}"), unit.now), 1);
    }

    #[test]
    fn test_titans_full_bar_adds_damage_amp() {
        let mut unit = bare_unit();
        let id = unit.equip(titans_resolve()).expect("equips");
        let hook = unit
            .item(id)
            .and_then(|i| i.def.hooks.on_hit.clone())
            .expect("hook bound");

        let mut target = crate::target::Target::new("dummy", 1000.0, 0.0, 0.0);
        for _ in 0..30 {
            hook(&mut unit, id, &mut target, 50.0);
        }

        let name = format!("titans-resolve-{id}");
        assert_eq!(unit.buffs.stacks(&name, unit.now), 25);
        let buff = unit.buffs.get_active(&name, unit.now).expect("active");
        assert!((buff.stat_multipliers[&StatKind::DamageAmp] - 0.10).abs() < 1e-9);
        // 25 stacks of 2% each.
        assert!((buff.stat_bonuses[&StatKind::AttackDamage] - 0.50).abs() < 1e-9);
    }

    #[test]
    fn test_strikers_only_procs_on_crit() {
        let mut unit = bare_unit();
        unit.crits = crate::crit::CritRoller::with_seed(3);
        let id = unit.equip(strikers_flail()).expect("equips");
        let hook = unit
            .item(id)
            .and_then(|i| i.def.hooks.on_hit.clone())
            .expect("hook bound");
        let mut target = crate::target::Target::new("dummy", 1000.0, 0.0, 0.0);
        let name = format!("strikers-flail-{id}");

        // No roll has happened yet, so no crit streak and no proc.
        hook(&mut unit, id, &mut target, 50.0);
        assert!(!unit.buffs.has_buff(&name, unit.now));

        // Force a guaranteed crit, then the proc lands.
        unit.crits.roll(1.0);
        hook(&mut unit, id, &mut target, 50.0);
        assert_eq!(unit.buffs.stacks(&name, unit.now), 1);
    }

    #[test]
    fn test_rageblade_ramps_every_second() {
        let mut unit = bare_unit();
        let id = unit.equip(rageblade()).expect("equips");
        let hook = unit
            .item(id)
            .and_then(|i| i.def.hooks.on_second.clone())
            .expect("hook bound");

        for _ in 0..5 {
            hook(&mut unit, id);
        }
        // 10% equip bonus plus five 7% ramps.
        assert!((unit.stats.bonus(StatKind::AttackSpeed) - 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_registry_carries_all_defaults() {
        let mut registry = ContentRegistry::new();
        register_defaults(&mut registry);
        for name in [
            "Deathblade",
            "Guinsoo's Rageblade",
            "Infinity Edge",
            "Jeweled Gauntlet",
            "Kraken's Fury",
            "Titan's Resolve",
            "Striker's Flail",
            "Red Buff",
            "Mittens",
        ] {
            assert!(registry.item(name).is_some(), "missing {name}");
        }
    }
}
