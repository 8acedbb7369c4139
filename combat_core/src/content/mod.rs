//! Built-in content: the default item, augment, and unit roster
//!
//! The engine itself is content-agnostic; everything here registers
//! through the same [`ContentRegistry`] API available to callers.

pub mod items;
pub mod units;

use crate::registry::ContentRegistry;

/// Registry pre-populated with the default roster
pub fn default_registry() -> ContentRegistry {
    let mut registry = ContentRegistry::new();
    register_defaults(&mut registry);
    registry
}

pub fn register_defaults(registry: &mut ContentRegistry) {
    items::register_defaults(registry);
    units::register_defaults(registry);
}
