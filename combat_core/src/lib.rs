//! combat_core - Deterministic single-combatant combat simulation
//!
//! This library provides:
//! - StatTable: Base/bonus/multiplier stat resolution with buff overlays
//! - Buff/BuffManager: Timed stat modifiers with stacking semantics
//! - Damage pipeline: Layered physical/magic/true calculations
//! - Items & augments: Stat grants plus trigger-bound hook closures
//! - Simulator: Fixed-step tick loop against stationary targets

pub mod buff;
pub mod config;
pub mod content;
pub mod crit;
pub mod damage;
pub mod item;
pub mod registry;
pub mod result;
pub mod simulator;
pub mod stats;
pub mod target;
pub mod types;
pub mod unit;

// Re-export core types for convenience
pub use buff::{Buff, BuffManager, BuffOrigin, OverrideAttack, SupplementalDamage};
pub use config::{load_builds, parse_builds, BuildSpec, BuildsFile, ConfigError, TargetSpec};
pub use crit::CritRoller;
pub use damage::{AttackerSnapshot, DamageOutcome, TargetSnapshot};
pub use item::{Augment, InstanceId, ItemDef, ItemHooks, ItemInstance};
pub use registry::{ContentRegistry, UnitFactory};
pub use result::{DamageEvent, SimulationResult, SummaryStats};
pub use simulator::{SimulationConfig, Simulator};
pub use stats::{BuffOverlay, StatTable, ATTACK_SPEED_CAP};
pub use target::Target;
pub use types::{DamageSource, DamageType, Role, StackPolicy, StatKind, Trigger, UnitState};
pub use unit::{Ability, CastingContext, Unit, UnitDescriptor};
