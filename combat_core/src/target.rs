//! Target - a stationary damage recipient

use crate::damage::TargetSnapshot;
use crate::stats::StatTable;
use crate::types::StatKind;

/// Stationary target with defensive stats
///
/// Mitigation happens in the damage pipeline; a target only receives
/// already-final amounts. Health is clamped at zero and never recovers.
/// Flat damage reduction lives in the stat table under
/// [`StatKind::DamageReduction`], fixed at construction.
#[derive(Debug, Clone)]
pub struct Target {
    pub name: String,
    pub stats: StatTable,
    pub current_hp: f64,
    pub max_hp: f64,
}

impl Target {
    pub fn new(name: impl Into<String>, hp: f64, armor: f64, magic_resist: f64) -> Self {
        let mut stats = StatTable::new();
        stats.set_base(StatKind::Health, hp);
        stats.set_base(StatKind::Armor, armor);
        stats.set_base(StatKind::MagicResist, magic_resist);

        Target {
            name: name.into(),
            stats,
            current_hp: hp,
            max_hp: hp,
        }
    }

    pub fn with_flat_reduction(mut self, reduction: f64) -> Self {
        self.stats.set_base(StatKind::DamageReduction, reduction);
        self
    }

    /// Defensive snapshot for the damage pipeline
    pub fn snapshot(&self) -> TargetSnapshot {
        TargetSnapshot {
            armor: self.stats.get(StatKind::Armor),
            magic_resist: self.stats.get(StatKind::MagicResist),
            flat_reduction: self.stats.get(StatKind::DamageReduction),
        }
    }

    /// Subtract an already-mitigated amount; returns true when this hit
    /// brought the target to zero
    pub fn apply_damage(&mut self, amount: f64) -> bool {
        if self.current_hp <= 0.0 {
            return false;
        }
        self.current_hp -= amount;
        if self.current_hp <= 0.0 {
            self.current_hp = 0.0;
            return true;
        }
        false
    }

    pub fn is_alive(&self) -> bool {
        self.current_hp > 0.0
    }
}
