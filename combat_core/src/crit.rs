//! CritRoller - seedable critical strike determination and streak tracking

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Per-attacker critical strike roller
///
/// Every roll counts as one attack, whether or not the caller ends up
/// honoring the crit (abilities without an ability-crit grant still roll).
/// The consecutive-crit streak lets item hooks detect "the last attack
/// was a crit" without re-rolling.
#[derive(Debug, Clone)]
pub struct CritRoller {
    rng: ChaCha8Rng,
    total_crits: u64,
    total_attacks: u64,
    streak: u32,
}

impl CritRoller {
    /// Roller seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
            total_crits: 0,
            total_attacks: 0,
            streak: 0,
        }
    }

    /// Roller with a fixed seed, for reproducible runs
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            total_crits: 0,
            total_attacks: 0,
            streak: 0,
        }
    }

    /// Roll one critical strike check
    ///
    /// `chance >= 1.0` always crits, `chance <= 0.0` never does; anything
    /// in between draws one uniform sample.
    pub fn roll(&mut self, chance: f64) -> bool {
        self.total_attacks += 1;
        if chance >= 1.0 || (chance > 0.0 && self.rng.gen::<f64>() < chance) {
            self.total_crits += 1;
            self.streak += 1;
            return true;
        }
        self.streak = 0;
        false
    }

    /// Whether the most recent roll was a crit
    pub fn last_was_crit(&self) -> bool {
        self.streak > 0
    }

    /// Consecutive crits ending at the most recent roll
    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn total_attacks(&self) -> u64 {
        self.total_attacks
    }

    pub fn total_crits(&self) -> u64 {
        self.total_crits
    }

    /// Crits over attacks, zero when nothing has been rolled
    pub fn crit_rate(&self) -> f64 {
        if self.total_attacks == 0 {
            return 0.0;
        }
        self.total_crits as f64 / self.total_attacks as f64
    }
}

impl Default for CritRoller {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_certain_crit() {
        let mut roller = CritRoller::with_seed(1);
        for _ in 0..100 {
            assert!(roller.roll(1.0));
        }
        assert_eq!(roller.total_crits(), 100);
        assert_eq!(roller.streak(), 100);
    }

    #[test]
    fn test_impossible_crit() {
        let mut roller = CritRoller::with_seed(1);
        for _ in 0..100 {
            assert!(!roller.roll(0.0));
        }
        assert_eq!(roller.total_crits(), 0);
        assert!((roller.crit_rate() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_streak_resets_on_miss() {
        let mut roller = CritRoller::with_seed(7);
        roller.roll(1.0);
        roller.roll(1.0);
        assert_eq!(roller.streak(), 2);
        roller.roll(0.0);
        assert_eq!(roller.streak(), 0);
        assert!(!roller.last_was_crit());
    }

    #[test]
    fn test_crit_rate_guards_zero_attacks() {
        let roller = CritRoller::with_seed(3);
        assert!((roller.crit_rate() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fixed_seed_reproduces_rolls() {
        let mut a = CritRoller::with_seed(42);
        let mut b = CritRoller::with_seed(42);
        for _ in 0..1000 {
            assert_eq!(a.roll(0.25), b.roll(0.25));
        }
    }
}
