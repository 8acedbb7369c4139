//! Buff & BuffManager - timed stat modifiers with stacking semantics
//!
//! A buff is a named, timed overlay of stat bonuses/multipliers, optionally
//! carrying behavioral overrides (auto-attack replacement, on-hit side
//! effect) and lifecycle callbacks. The manager owns the live list per
//! holder; callback invocation is orchestrated by [`crate::unit::Unit`] so
//! hooks can mutate the holder while the list is being walked.

use crate::item::InstanceId;
use crate::stats::BuffOverlay;
use crate::target::Target;
use crate::types::{DamageType, StackPolicy, StatKind};
use crate::unit::Unit;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Lifecycle callback (on-apply, on-expire, on-refresh)
pub type BuffCallback = Arc<dyn Fn(&mut Unit) + Send + Sync>;

/// Per-tick callback, receives time elapsed since application
pub type BuffTickCallback = Arc<dyn Fn(&mut Unit, Duration) + Send + Sync>;

/// Replacement for the default auto-attack calculation
///
/// Returns the substituted pre-mitigation amount and damage type; the
/// simulator still runs the shared pipeline steps on the result.
pub type AutoAttackOverride = Arc<dyn Fn(&Unit, &Target) -> OverrideAttack + Send + Sync>;

/// Side effect fired after a normal auto-attack lands
///
/// Receives the already-mitigated damage and the crit flag, and may return
/// supplementary damage of a different type, logged as a separate event.
pub type BuffOnHit =
    Arc<dyn Fn(&mut Unit, &Target, f64, bool) -> Option<SupplementalDamage> + Send + Sync>;

/// Substituted auto-attack produced by an override
#[derive(Debug, Clone, Copy)]
pub struct OverrideAttack {
    pub base_damage: f64,
    pub damage_type: DamageType,
}

/// Extra damage dealt by a buff's on-hit side effect
#[derive(Debug, Clone, Copy)]
pub struct SupplementalDamage {
    pub amount: f64,
    pub damage_type: DamageType,
}

/// What created a buff; a reference, never ownership
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuffOrigin {
    Unit,
    Item(InstanceId),
    Ability(String),
}

/// A timed stat modifier on a unit
///
/// The name is the identity key within one holder: at most one
/// non-independent buff with a given name is active at a time. A zero
/// duration means permanent (until explicitly removed).
#[derive(Clone)]
pub struct Buff {
    pub name: String,
    pub duration: Duration,
    pub applied_time: Duration,
    pub origin: BuffOrigin,
    pub stat_bonuses: BTreeMap<StatKind, f64>,
    pub stat_multipliers: BTreeMap<StatKind, f64>,
    pub auto_attack_override: Option<AutoAttackOverride>,
    pub on_hit: Option<BuffOnHit>,
    pub on_apply: Option<BuffCallback>,
    pub on_tick: Option<BuffTickCallback>,
    pub on_expire: Option<BuffCallback>,
    pub on_refresh: Option<BuffCallback>,
    pub max_stacks: u32,
    pub stacks: u32,
    pub policy: StackPolicy,
    pub expired: bool,
}

impl Buff {
    pub fn new(name: impl Into<String>, duration: Duration) -> Self {
        Buff {
            name: name.into(),
            duration,
            applied_time: Duration::ZERO,
            origin: BuffOrigin::Unit,
            stat_bonuses: BTreeMap::new(),
            stat_multipliers: BTreeMap::new(),
            auto_attack_override: None,
            on_hit: None,
            on_apply: None,
            on_tick: None,
            on_expire: None,
            on_refresh: None,
            max_stacks: 1,
            stacks: 1,
            policy: StackPolicy::Refresh,
            expired: false,
        }
    }

    /// Permanent buff, active until explicitly removed
    pub fn permanent(name: impl Into<String>) -> Self {
        Self::new(name, Duration::ZERO)
    }

    pub fn with_origin(mut self, origin: BuffOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_bonus(mut self, stat: StatKind, value: f64) -> Self {
        self.stat_bonuses.insert(stat, value);
        self
    }

    pub fn with_multiplier(mut self, stat: StatKind, value: f64) -> Self {
        self.stat_multipliers.insert(stat, value);
        self
    }

    pub fn with_stacking(mut self, max_stacks: u32, policy: StackPolicy) -> Self {
        self.max_stacks = max_stacks;
        self.policy = policy;
        self
    }

    pub fn with_auto_attack_override(mut self, f: AutoAttackOverride) -> Self {
        self.auto_attack_override = Some(f);
        self
    }

    pub fn with_on_hit(mut self, f: BuffOnHit) -> Self {
        self.on_hit = Some(f);
        self
    }

    pub fn with_on_apply(mut self, f: BuffCallback) -> Self {
        self.on_apply = Some(f);
        self
    }

    pub fn with_on_tick(mut self, f: BuffTickCallback) -> Self {
        self.on_tick = Some(f);
        self
    }

    pub fn with_on_expire(mut self, f: BuffCallback) -> Self {
        self.on_expire = Some(f);
        self
    }

    pub fn with_on_refresh(mut self, f: BuffCallback) -> Self {
        self.on_refresh = Some(f);
        self
    }

    /// Whether the buff's active window covers `now`
    pub fn is_active(&self, now: Duration) -> bool {
        if self.expired {
            return false;
        }
        if self.duration.is_zero() {
            return true;
        }
        now < self.applied_time + self.duration
    }

    /// Time left in the active window; zero for expired or permanent buffs
    pub fn remaining(&self, now: Duration) -> Duration {
        if self.duration.is_zero() || self.expired {
            return Duration::ZERO;
        }
        (self.applied_time + self.duration).saturating_sub(now)
    }

    /// Merge a re-application according to the stacking policy
    ///
    /// The duration window restarts; additive stacking sums the incoming
    /// instance's stats under the cap, multiplicative compounds existing
    /// multipliers by `(1 + new)`.
    pub fn refresh_from(&mut self, now: Duration, incoming: &Buff) {
        self.applied_time = now;

        match self.policy {
            StackPolicy::Additive => {
                if self.stacks < self.max_stacks {
                    self.stacks += 1;
                    for (&stat, &value) in &incoming.stat_bonuses {
                        *self.stat_bonuses.entry(stat).or_insert(0.0) += value;
                    }
                    for (&stat, &value) in &incoming.stat_multipliers {
                        *self.stat_multipliers.entry(stat).or_insert(0.0) += value;
                    }
                }
            }
            StackPolicy::Multiplicative => {
                if self.stacks < self.max_stacks {
                    self.stacks += 1;
                    for (&stat, &value) in &incoming.stat_multipliers {
                        let entry = self.stat_multipliers.entry(stat).or_insert(1.0);
                        *entry *= 1.0 + value;
                    }
                }
            }
            StackPolicy::Refresh | StackPolicy::Independent => {}
        }
    }
}

impl fmt::Debug for Buff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buff")
            .field("name", &self.name)
            .field("duration", &self.duration)
            .field("applied_time", &self.applied_time)
            .field("origin", &self.origin)
            .field("stat_bonuses", &self.stat_bonuses)
            .field("stat_multipliers", &self.stat_multipliers)
            .field("stacks", &self.stacks)
            .field("max_stacks", &self.max_stacks)
            .field("policy", &self.policy)
            .field("expired", &self.expired)
            .finish_non_exhaustive()
    }
}

/// Live buff list for one holder
///
/// Storage and read-side queries only; mutations that fire callbacks go
/// through the owning [`Unit`], which walks a stable index snapshot and
/// sweeps expired entries after each pass. Iteration order is insertion
/// order, which keeps hook invocation deterministic.
#[derive(Debug, Default)]
pub struct BuffManager {
    buffs: Vec<Buff>,
}

impl BuffManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.buffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffs.is_empty()
    }

    pub fn push(&mut self, buff: Buff) {
        self.buffs.push(buff);
    }

    pub fn get(&self, index: usize) -> Option<&Buff> {
        self.buffs.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Buff> {
        self.buffs.get_mut(index)
    }

    /// Index of the non-expired buff with this name, if any
    pub fn position(&self, name: &str) -> Option<usize> {
        self.buffs
            .iter()
            .position(|b| b.name == name && !b.expired)
    }

    /// Mutable access to the non-expired buff with this name
    pub fn find_mut(&mut self, name: &str) -> Option<&mut Buff> {
        self.buffs.iter_mut().find(|b| b.name == name && !b.expired)
    }

    /// All buffs active at `now`, in insertion order
    pub fn active(&self, now: Duration) -> impl Iterator<Item = &Buff> {
        self.buffs.iter().filter(move |b| b.is_active(now))
    }

    /// The active buff with this name, if any
    pub fn get_active(&self, name: &str, now: Duration) -> Option<&Buff> {
        self.active(now).find(|b| b.name == name)
    }

    pub fn has_buff(&self, name: &str, now: Duration) -> bool {
        self.get_active(name, now).is_some()
    }

    /// Current stack count of the named buff, zero when absent
    pub fn stacks(&self, name: &str, now: Duration) -> u32 {
        self.get_active(name, now).map(|b| b.stacks).unwrap_or(0)
    }

    /// Remaining duration of the named buff
    pub fn remaining_duration(&self, name: &str, now: Duration) -> Option<Duration> {
        self.get_active(name, now).map(|b| b.remaining(now))
    }

    /// Stat bonuses and multipliers summed across all active buffs
    pub fn overlay(&self, now: Duration) -> BuffOverlay {
        let mut overlay = BuffOverlay::default();
        for buff in self.active(now) {
            for (&stat, &value) in &buff.stat_bonuses {
                *overlay.bonuses.entry(stat).or_insert(0.0) += value;
            }
            for (&stat, &value) in &buff.stat_multipliers {
                *overlay.multipliers.entry(stat).or_insert(0.0) += value;
            }
        }
        overlay
    }

    /// First active auto-attack override, in insertion order
    pub fn auto_attack_override(&self, now: Duration) -> Option<AutoAttackOverride> {
        self.active(now)
            .find_map(|b| b.auto_attack_override.clone())
    }

    /// On-hit side effects of all active buffs, in insertion order
    pub fn on_hit_effects(&self, now: Duration) -> Vec<BuffOnHit> {
        self.active(now).filter_map(|b| b.on_hit.clone()).collect()
    }

    /// Drop expired entries; called after each update/removal pass
    pub fn sweep(&mut self) {
        self.buffs.retain(|b| !b.expired);
    }
}
