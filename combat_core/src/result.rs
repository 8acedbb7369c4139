//! Simulation output - the append-only event log and derived result

use crate::types::{DamageSource, DamageType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// One damage application, immutable once logged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageEvent {
    pub timestamp: Duration,
    pub amount: f64,
    pub damage_type: DamageType,
    pub source: DamageSource,
    pub is_crit: bool,
    pub target: String,
}

/// Diagnostic snapshot of the unit's summary stats at run end
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryStats {
    pub final_mana: f64,
    pub max_mana: f64,
    pub attack_speed: f64,
    pub attack_damage: f64,
    pub ability_power: f64,
}

/// Read-only snapshot computed once at run end
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationResult {
    pub total_damage: f64,
    /// Total damage over elapsed seconds; zero when no time elapsed
    pub dps: f64,
    pub damage_by_type: BTreeMap<DamageType, f64>,
    pub damage_by_source: BTreeMap<DamageSource, f64>,
    pub events: Vec<DamageEvent>,
    /// `None` means the target survived the run
    pub time_to_kill: BTreeMap<String, Option<Duration>>,
    pub final_health: BTreeMap<String, f64>,
    pub attack_count: u64,
    pub ability_count: u64,
    /// Crits over attacks; zero when no attacks occurred
    pub crit_rate: f64,
    pub summary: SummaryStats,
    pub elapsed: Duration,
}

impl SimulationResult {
    /// Share of total damage dealt as the given type, in 0..1
    pub fn type_share(&self, damage_type: DamageType) -> f64 {
        if self.total_damage <= 0.0 {
            return 0.0;
        }
        self.damage_by_type.get(&damage_type).copied().unwrap_or(0.0) / self.total_damage
    }

    /// Share of total damage from the given source, in 0..1
    pub fn source_share(&self, source: DamageSource) -> f64 {
        if self.total_damage <= 0.0 {
            return 0.0;
        }
        self.damage_by_source.get(&source).copied().unwrap_or(0.0) / self.total_damage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shares_guard_zero_total() {
        let result = SimulationResult::default();
        assert!((result.type_share(DamageType::Physical) - 0.0).abs() < f64::EPSILON);
        assert!((result.source_share(DamageSource::Ability) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_type_share() {
        let mut result = SimulationResult {
            total_damage: 200.0,
            ..Default::default()
        };
        result.damage_by_type.insert(DamageType::Physical, 150.0);
        result.damage_by_type.insert(DamageType::True, 50.0);
        assert!((result.type_share(DamageType::Physical) - 0.75).abs() < f64::EPSILON);
        assert!((result.type_share(DamageType::Magic) - 0.0).abs() < f64::EPSILON);
    }
}
