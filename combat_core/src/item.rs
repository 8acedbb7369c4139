//! Item and augment definitions with hook bindings
//!
//! An [`ItemDef`] is static content: stat grants plus closures bound to the
//! closed [`Trigger`] set. An [`ItemInstance`] is the live per-unit binding,
//! carrying a stable instance id assigned at equip time so multiple copies
//! of the same item keep distinct buff identities regardless of list
//! position.

use crate::target::Target;
use crate::types::{StatKind, Trigger};
use crate::unit::Unit;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Stable identity of one equipped item copy
pub type InstanceId = u32;

/// Hook receiving the owning unit and the firing instance's id
pub type ItemHook = Arc<dyn Fn(&mut Unit, InstanceId) + Send + Sync>;

/// On-hit hook, additionally receiving the target and the mitigated damage
pub type ItemHitHook = Arc<dyn Fn(&mut Unit, InstanceId, &mut Target, f64) + Send + Sync>;

/// Trigger-point bindings for one item definition
#[derive(Clone, Default)]
pub struct ItemHooks {
    /// Pre-mitigation bookkeeping, fires once per auto-attack
    pub on_attack: Option<ItemHook>,
    /// Reactive effect, fires after damage lands with the mitigated amount
    pub on_hit: Option<ItemHitHook>,
    /// Fires on each whole-second boundary
    pub on_second: Option<ItemHook>,
    /// Fires when the owner starts casting its ability
    pub on_cast: Option<ItemHook>,
    /// Fires once when the item is equipped
    pub on_equip: Option<ItemHook>,
}

impl ItemHooks {
    /// Whether a hook is bound for the given trigger
    pub fn binds(&self, trigger: Trigger) -> bool {
        match trigger {
            Trigger::OnAttack => self.on_attack.is_some(),
            Trigger::OnHit => self.on_hit.is_some(),
            Trigger::OnSecond => self.on_second.is_some(),
            Trigger::OnCast => self.on_cast.is_some(),
            Trigger::OnEquip => self.on_equip.is_some(),
            _ => false,
        }
    }

    /// The item-side triggers with a bound hook, in invocation order
    pub fn bound_triggers(&self) -> Vec<Trigger> {
        [
            Trigger::OnAttack,
            Trigger::OnHit,
            Trigger::OnSecond,
            Trigger::OnCast,
            Trigger::OnEquip,
        ]
        .into_iter()
        .filter(|t| self.binds(*t))
        .collect()
    }
}

impl fmt::Debug for ItemHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ItemHooks").field(&self.bound_triggers()).finish()
    }
}

/// Static item definition
#[derive(Clone)]
pub struct ItemDef {
    pub name: String,
    pub description: String,
    pub stats: BTreeMap<StatKind, f64>,
    pub hooks: ItemHooks,
    /// Only one copy per unit has effect
    pub unique: bool,
    /// Equipping lets the owner's ability critically strike
    pub grants_ability_crit: bool,
    pub stacking: bool,
    pub max_stacks: u32,
}

impl ItemDef {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        ItemDef {
            name: name.into(),
            description: description.into(),
            stats: BTreeMap::new(),
            hooks: ItemHooks::default(),
            unique: false,
            grants_ability_crit: false,
            stacking: false,
            max_stacks: 1,
        }
    }

    pub fn with_stat(mut self, stat: StatKind, value: f64) -> Self {
        self.stats.insert(stat, value);
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn grants_ability_crit(mut self) -> Self {
        self.grants_ability_crit = true;
        self
    }

    pub fn stacking(mut self, max_stacks: u32) -> Self {
        self.stacking = true;
        self.max_stacks = max_stacks;
        self
    }

    pub fn on_attack(mut self, hook: ItemHook) -> Self {
        self.hooks.on_attack = Some(hook);
        self
    }

    pub fn on_hit(mut self, hook: ItemHitHook) -> Self {
        self.hooks.on_hit = Some(hook);
        self
    }

    pub fn on_second(mut self, hook: ItemHook) -> Self {
        self.hooks.on_second = Some(hook);
        self
    }

    pub fn on_cast(mut self, hook: ItemHook) -> Self {
        self.hooks.on_cast = Some(hook);
        self
    }

    pub fn on_equip(mut self, hook: ItemHook) -> Self {
        self.hooks.on_equip = Some(hook);
        self
    }
}

impl fmt::Debug for ItemDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemDef")
            .field("name", &self.name)
            .field("stats", &self.stats)
            .field("hooks", &self.hooks)
            .field("unique", &self.unique)
            .field("grants_ability_crit", &self.grants_ability_crit)
            .field("stacking", &self.stacking)
            .field("max_stacks", &self.max_stacks)
            .finish_non_exhaustive()
    }
}

/// Live per-unit binding of an equipped item
#[derive(Debug, Clone)]
pub struct ItemInstance {
    pub id: InstanceId,
    pub def: ItemDef,
    pub stacks: u32,
}

/// Static augment definition: pure stat grants
#[derive(Debug, Clone)]
pub struct Augment {
    pub name: String,
    pub description: String,
    pub stats: BTreeMap<StatKind, f64>,
}

impl Augment {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Augment {
            name: name.into(),
            description: description.into(),
            stats: BTreeMap::new(),
        }
    }

    pub fn with_stat(mut self, stat: StatKind, value: f64) -> Self {
        self.stats.insert(stat, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_bound_triggers_reports_in_order() {
        let def = ItemDef::new("test", "")
            .on_second(Arc::new(|_, _| {}))
            .on_attack(Arc::new(|_, _| {}));
        assert_eq!(
            def.hooks.bound_triggers(),
            vec![Trigger::OnAttack, Trigger::OnSecond]
        );
        assert!(!def.hooks.binds(Trigger::OnHit));
        assert!(!def.hooks.binds(Trigger::OnExpire));
    }

    #[test]
    fn test_builder_accumulates_stats() {
        let def = ItemDef::new("blade", "+AD")
            .with_stat(StatKind::AttackDamage, 0.55)
            .with_stat(StatKind::DamageAmp, 0.10)
            .unique();
        assert_eq!(def.stats.len(), 2);
        assert!(def.unique);
    }
}
