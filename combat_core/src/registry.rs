//! Content registry - name-keyed lookup for units, items, and augments
//!
//! Content is injected rather than hardcoded into the engine: the caller
//! registers factories and definitions up front and resolves builds by
//! name. Unknown names return `None` so callers surface a proper error
//! instead of panicking mid-run.

use crate::item::{Augment, ItemDef};
use crate::unit::Unit;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Builds a fresh unit at the requested star level
pub type UnitFactory = Arc<dyn Fn(u8) -> Unit + Send + Sync>;

/// Name-keyed content store
#[derive(Default)]
pub struct ContentRegistry {
    units: BTreeMap<String, UnitFactory>,
    items: BTreeMap<String, ItemDef>,
    augments: BTreeMap<String, Augment>,
}

impl ContentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_unit(&mut self, name: impl Into<String>, factory: UnitFactory) {
        self.units.insert(name.into(), factory);
    }

    pub fn register_item(&mut self, def: ItemDef) {
        self.items.insert(def.name.clone(), def);
    }

    pub fn register_augment(&mut self, augment: Augment) {
        self.augments.insert(augment.name.clone(), augment);
    }

    /// Instantiate the named unit at the given star level
    pub fn build_unit(&self, name: &str, star_level: u8) -> Option<Unit> {
        self.units.get(name).map(|f| f(star_level))
    }

    pub fn item(&self, name: &str) -> Option<ItemDef> {
        self.items.get(name).cloned()
    }

    pub fn augment(&self, name: &str) -> Option<Augment> {
        self.augments.get(name).cloned()
    }

    pub fn unit_names(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }

    pub fn item_names(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    pub fn augment_names(&self) -> impl Iterator<Item = &str> {
        self.augments.keys().map(String::as_str)
    }
}

impl fmt::Debug for ContentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentRegistry")
            .field("units", &self.units.keys().collect::<Vec<_>>())
            .field("items", &self.items.keys().collect::<Vec<_>>())
            .field("augments", &self.augments.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DamageType, Role, StatKind};
    use crate::unit::{Ability, UnitDescriptor};
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn dummy_factory() -> UnitFactory {
        Arc::new(|star_level| {
            Unit::new(UnitDescriptor {
                name: "dummy".to_string(),
                role: Role::Marksman,
                star_level,
                starting_mana: 0.0,
                attack_windup: Duration::ZERO,
                base_stats: BTreeMap::new(),
                ability: Ability::new("noop", DamageType::Physical),
            })
        })
    }

    #[test]
    fn test_unknown_names_resolve_to_none() {
        let registry = ContentRegistry::new();
        assert!(registry.build_unit("ghost", 1).is_none());
        assert!(registry.item("ghost").is_none());
        assert!(registry.augment("ghost").is_none());
    }

    #[test]
    fn test_factory_receives_star_level() {
        let mut registry = ContentRegistry::new();
        registry.register_unit("dummy", dummy_factory());
        let unit = registry.build_unit("dummy", 3).expect("registered");
        assert_eq!(unit.star_level, 3);
    }

    #[test]
    fn test_item_lookup_clones_definition() {
        let mut registry = ContentRegistry::new();
        registry.register_item(ItemDef::new("blade", "").with_stat(StatKind::AttackDamage, 0.55));
        let def = registry.item("blade").expect("registered");
        assert!((def.stats[&StatKind::AttackDamage] - 0.55).abs() < f64::EPSILON);
    }
}
