//! Core enums shared across the simulation

use serde::{Deserialize, Serialize};

/// Numeric attribute kinds tracked per entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Health,
    Armor,
    MagicResist,
    AttackDamage,
    AbilityPower,
    AttackSpeed,
    CritChance,
    CritDamage,
    Mana,
    ManaRegen,
    /// Flat percentage reduction (0..1) applied before resistance
    DamageReduction,
    DamageAmp,
}

/// Damage classification, determines which mitigation path applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    Physical,
    Magic,
    True,
}

/// Whether a damage event came from an auto-attack or an ability cast
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageSource {
    AutoAttack,
    Ability,
}

/// Unit role, drives mana gain rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Tank,
    Fighter,
    Marksman,
    Caster,
    Assassin,
    Specialist,
}

/// Casting state machine states
///
/// `Attacking` is cosmetic and gates identically to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitState {
    Idle,
    Attacking,
    Casting,
    Channeling,
}

/// How a buff reacts to being applied while already active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackPolicy {
    /// Reset the duration, keep stacks and stats unchanged
    Refresh,
    /// Add a stack under the cap, summing the incoming bonuses onto the existing ones
    Additive,
    /// Add a stack under the cap, compounding existing multipliers by `(1 + new)`
    Multiplicative,
    /// Every application is its own parallel instance
    Independent,
}

/// The closed set of hook trigger points
///
/// Item and ability definitions bind behavior to these; the simulator
/// enumerates and invokes them in a fixed order within a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    OnAttack,
    OnHit,
    OnSecond,
    OnCast,
    OnEquip,
    OnApply,
    OnTick,
    OnExpire,
    OnRefresh,
}
