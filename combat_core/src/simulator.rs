//! Fixed-step simulation loop
//!
//! Each tick runs in a fixed order: advance the time-cursor, update buffs,
//! resolve cast completion, consider starting a cast, consider an
//! auto-attack, then once-per-second housekeeping. The order is part of
//! the model; reordering steps changes results.

use crate::config::{DEFAULT_DURATION, DEFAULT_TICK_INTERVAL};
use crate::damage;
use crate::result::{DamageEvent, SimulationResult, SummaryStats};
use crate::target::Target;
use crate::types::{DamageSource, DamageType, StatKind, UnitState};
use crate::unit::Unit;
use std::collections::BTreeMap;
use std::time::Duration;

/// Loop parameters, sanitized at construction
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub duration: Duration,
    pub tick_interval: Duration,
    pub verbose: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            duration: DEFAULT_DURATION,
            tick_interval: DEFAULT_TICK_INTERVAL,
            verbose: false,
        }
    }
}

impl SimulationConfig {
    /// Replace non-positive fields with defaults
    pub fn sanitized(mut self) -> Self {
        if self.duration.is_zero() {
            self.duration = DEFAULT_DURATION;
        }
        if self.tick_interval.is_zero() {
            self.tick_interval = DEFAULT_TICK_INTERVAL;
        }
        self
    }
}

/// Single-combatant simulation: one unit against stationary targets
#[derive(Debug)]
pub struct Simulator {
    unit: Unit,
    targets: Vec<Target>,
    config: SimulationConfig,
    time: Duration,
    last_second: u64,
    kill_times: BTreeMap<String, Option<Duration>>,
}

impl Simulator {
    pub fn new(unit: Unit, targets: Vec<Target>) -> Self {
        Self::with_config(unit, targets, SimulationConfig::default())
    }

    pub fn with_config(unit: Unit, targets: Vec<Target>, config: SimulationConfig) -> Self {
        Simulator {
            unit,
            targets,
            config: config.sanitized(),
            time: Duration::ZERO,
            last_second: 0,
            kill_times: BTreeMap::new(),
        }
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Run to the configured duration or until every target is dead
    pub fn run(&mut self) -> SimulationResult {
        for target in &self.targets {
            if !target.is_alive() {
                self.kill_times
                    .insert(target.name.clone(), Some(Duration::ZERO));
            }
        }

        self.unit.next_attack_time = self.unit.attack_windup;

        tracing::debug!(
            unit = %self.unit.name,
            targets = self.targets.len(),
            duration = ?self.config.duration,
            "simulation start"
        );

        while self.time < self.config.duration && self.targets.iter().any(|t| t.is_alive()) {
            self.tick();
            self.time += self.config.tick_interval;
        }

        self.finalize()
    }

    fn tick(&mut self) {
        self.unit.now = self.time;
        self.unit.update_buffs();
        // A tick that starts a cast ends there; a crossed second boundary
        // stays pending and is consumed on the next tick.
        if self.advance_combat() {
            return;
        }
        self.on_second();
    }

    /// Returns true when a cast was started this tick
    fn advance_combat(&mut self) -> bool {
        if self.unit.state == UnitState::Casting {
            let (done, can_auto) = match &self.unit.casting {
                Some(ctx) => (self.time >= ctx.end_time, ctx.can_auto_attack),
                None => (true, false),
            };
            if done {
                self.complete_cast();
            } else if !can_auto {
                return false;
            }
        }

        if self.unit.state != UnitState::Casting && self.unit.can_cast() {
            self.begin_cast();
            return true;
        }

        if self.unit.can_auto_attack(self.time) {
            self.perform_auto_attack();
        }
        false
    }

    fn alive_target_index(&self) -> Option<usize> {
        self.targets.iter().position(Target::is_alive)
    }

    fn begin_cast(&mut self) {
        let targets: Vec<usize> = if self.unit.ability.is_aoe {
            self.targets
                .iter()
                .enumerate()
                .filter(|(_, t)| t.is_alive())
                .map(|(i, _)| i)
                .collect()
        } else {
            self.alive_target_index().into_iter().collect()
        };

        tracing::debug!(
            unit = %self.unit.name,
            ability = %self.unit.ability.name,
            at = ?self.time,
            "cast start"
        );

        self.unit.ability_count += 1;
        self.unit.start_cast(targets);
    }

    fn complete_cast(&mut self) {
        let ctx = match self.unit.finish_cast() {
            Some(ctx) => ctx,
            None => return,
        };
        let ability = self.unit.ability.clone();

        if ability.base_damage > 0.0 || ability.ap_ratio > 0.0 {
            let snapshot = self.unit.snapshot();
            let can_crit = self.unit.ability_can_crit;
            let raw = ability.base_damage + snapshot.ability_power * ability.ap_ratio;

            // Falloff compounds across the resolved target set in hit order.
            let mut falloff = 1.0;
            for idx in ctx.targets {
                let target = match self.targets.get(idx) {
                    Some(t) if t.is_alive() => t,
                    _ => continue,
                };
                let target_snapshot = target.snapshot();
                let outcome = damage::resolve(
                    raw * falloff,
                    ability.damage_type,
                    &snapshot,
                    &target_snapshot,
                    can_crit,
                    &mut self.unit.crits,
                );
                self.record_damage(
                    idx,
                    outcome.amount,
                    ability.damage_type,
                    DamageSource::Ability,
                    outcome.is_crit && can_crit,
                );
                falloff *= 1.0 - ability.falloff_per_target;
            }
        }

        if let Some(cb) = ability.on_cast_complete {
            cb(&mut self.unit);
        }
    }

    fn perform_auto_attack(&mut self) {
        let idx = match self.alive_target_index() {
            Some(idx) => idx,
            None => return,
        };
        let now = self.time;

        let snapshot = self.unit.snapshot();
        let target_snapshot = match self.targets.get(idx) {
            Some(t) => t.snapshot(),
            None => return,
        };

        let (outcome, damage_type) = match self.unit.buffs.auto_attack_override(now) {
            Some(substitute) => {
                let attack = match self.targets.get(idx) {
                    Some(t) => substitute(&self.unit, t),
                    None => return,
                };
                let out = damage::resolve(
                    attack.base_damage,
                    attack.damage_type,
                    &snapshot,
                    &target_snapshot,
                    true,
                    &mut self.unit.crits,
                );
                (out, attack.damage_type)
            }
            None => (
                damage::physical_damage(
                    &snapshot,
                    &target_snapshot,
                    0.0,
                    true,
                    &mut self.unit.crits,
                ),
                DamageType::Physical,
            ),
        };

        // Pre-application item bookkeeping: stack buffs granted here take
        // effect from the next attack onward, not this one.
        let item_count = self.unit.items.len();
        for i in 0..item_count {
            let bound = self
                .unit
                .items
                .get(i)
                .map(|it| (it.id, it.def.hooks.on_attack.clone()));
            if let Some((id, Some(hook))) = bound {
                hook(&mut self.unit, id);
            }
        }

        self.unit.attack_count += 1;
        self.record_damage(
            idx,
            outcome.amount,
            damage_type,
            DamageSource::AutoAttack,
            outcome.is_crit,
        );

        // Reactive item effects receive the mitigated amount.
        for i in 0..item_count {
            let bound = self
                .unit
                .items
                .get(i)
                .map(|it| (it.id, it.def.hooks.on_hit.clone()));
            if let Some((id, Some(hook))) = bound {
                if let Some(target) = self.targets.get_mut(idx) {
                    hook(&mut self.unit, id, target, outcome.amount);
                }
            }
        }

        // Buff on-hit side effects may add supplementary damage of their
        // own type; its crit was decided by the source, so only the
        // mitigation steps apply.
        for effect in self.unit.buffs.on_hit_effects(now) {
            let extra = match self.targets.get(idx) {
                Some(t) => effect(&mut self.unit, t, outcome.amount, outcome.is_crit),
                None => None,
            };
            if let Some(extra) = extra {
                let amount = damage::mitigate_only(extra.amount, extra.damage_type, &target_snapshot);
                self.record_damage(idx, amount, extra.damage_type, DamageSource::AutoAttack, false);
            }
        }

        self.unit.gain_mana_from_attack();
        self.unit.next_attack_time = now + self.unit.attack_interval();
    }

    /// Whole-second housekeeping: mana regeneration and item on-second
    /// hooks, fired once per crossed boundary
    fn on_second(&mut self) {
        let second = self.time.as_secs();
        while self.last_second < second {
            self.last_second += 1;

            self.unit.regen_mana();

            let item_count = self.unit.items.len();
            for i in 0..item_count {
                let bound = self
                    .unit
                    .items
                    .get(i)
                    .map(|it| (it.id, it.def.hooks.on_second.clone()));
                if let Some((id, Some(hook))) = bound {
                    hook(&mut self.unit, id);
                }
            }
        }
    }

    /// Apply an already-mitigated amount and log the event
    fn record_damage(
        &mut self,
        idx: usize,
        amount: f64,
        damage_type: DamageType,
        source: DamageSource,
        is_crit: bool,
    ) {
        let target = match self.targets.get_mut(idx) {
            Some(t) => t,
            None => return,
        };
        let name = target.name.clone();
        let killed = target.apply_damage(amount);

        self.unit.total_damage += amount;
        self.unit.damage_log.push(DamageEvent {
            timestamp: self.time,
            amount,
            damage_type,
            source,
            is_crit,
            target: name.clone(),
        });

        if self.config.verbose {
            tracing::debug!(
                at = ?self.time,
                target = %name,
                amount,
                ?damage_type,
                ?source,
                is_crit,
                "damage"
            );
        }

        if killed {
            tracing::debug!(target = %name, at = ?self.time, "target killed");
            self.kill_times.insert(name, Some(self.time));
        }
    }

    fn finalize(&self) -> SimulationResult {
        let elapsed = self.time.min(self.config.duration);
        let elapsed_secs = elapsed.as_secs_f64();

        let mut damage_by_type = BTreeMap::new();
        let mut damage_by_source = BTreeMap::new();
        for event in &self.unit.damage_log {
            *damage_by_type.entry(event.damage_type).or_insert(0.0) += event.amount;
            *damage_by_source.entry(event.source).or_insert(0.0) += event.amount;
        }

        let mut time_to_kill = self.kill_times.clone();
        let mut final_health = BTreeMap::new();
        for target in &self.targets {
            time_to_kill.entry(target.name.clone()).or_insert(None);
            final_health.insert(target.name.clone(), target.current_hp);
        }

        let total_damage = self.unit.total_damage;
        SimulationResult {
            total_damage,
            dps: if elapsed_secs > 0.0 {
                total_damage / elapsed_secs
            } else {
                0.0
            },
            damage_by_type,
            damage_by_source,
            events: self.unit.damage_log.clone(),
            time_to_kill,
            final_health,
            attack_count: self.unit.attack_count,
            ability_count: self.unit.ability_count,
            crit_rate: self.unit.crits.crit_rate(),
            summary: SummaryStats {
                final_mana: self.unit.current_mana,
                max_mana: self.unit.stat(StatKind::Mana),
                attack_speed: self.unit.attack_speed(),
                attack_damage: self.unit.stat(StatKind::AttackDamage),
                ability_power: self.unit.stat(StatKind::AbilityPower),
            },
            elapsed,
        }
    }
}
