//! Unit - the simulated combatant and its casting state machine
//!
//! The unit owns its stat table, buff manager, crit roller, equipped item
//! instances, damage counters, and a `now` time-cursor advanced by the
//! simulator at the start of every tick. All buff and item callbacks are
//! invoked from here: hook closures are cloned out of the collections
//! before the call, and passes walk a stable index snapshot so hooks may
//! apply further buffs or mutate stats mid-pass.

use crate::buff::{Buff, BuffCallback, BuffTickCallback, BuffManager};
use crate::crit::CritRoller;
use crate::damage::AttackerSnapshot;
use crate::item::{Augment, InstanceId, ItemDef, ItemInstance};
use crate::result::DamageEvent;
use crate::stats::StatTable;
use crate::types::{DamageType, Role, StackPolicy, StatKind, UnitState};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Callback bound to an ability's cast lifecycle
pub type UnitCallback = Arc<dyn Fn(&mut Unit) + Send + Sync>;

/// Static ability definition
#[derive(Clone)]
pub struct Ability {
    pub name: String,
    pub base_damage: f64,
    pub ap_ratio: f64,
    pub damage_type: DamageType,
    pub cast_time: Duration,
    pub is_aoe: bool,
    /// Resolved against the unit's max-mana stat when absent
    pub mana_cost: Option<f64>,
    /// Damage reduction per target already passed through, for piercing
    /// area abilities; applied across the resolved target set in hit order
    pub falloff_per_target: f64,
    pub allows_mana_gain_during_cast: bool,
    pub allows_auto_attacks_during_cast: bool,
    /// Whether this ability may crit without an item grant
    pub can_crit: bool,
    pub on_cast_start: Option<UnitCallback>,
    pub on_cast_complete: Option<UnitCallback>,
}

impl Ability {
    pub fn new(name: impl Into<String>, damage_type: DamageType) -> Self {
        Ability {
            name: name.into(),
            base_damage: 0.0,
            ap_ratio: 0.0,
            damage_type,
            cast_time: Duration::ZERO,
            is_aoe: false,
            mana_cost: None,
            falloff_per_target: 0.0,
            allows_mana_gain_during_cast: false,
            allows_auto_attacks_during_cast: false,
            can_crit: false,
            on_cast_start: None,
            on_cast_complete: None,
        }
    }

    pub fn with_base_damage(mut self, damage: f64) -> Self {
        self.base_damage = damage;
        self
    }

    pub fn with_ap_ratio(mut self, ratio: f64) -> Self {
        self.ap_ratio = ratio;
        self
    }

    pub fn with_cast_time(mut self, cast_time: Duration) -> Self {
        self.cast_time = cast_time;
        self
    }

    pub fn with_mana_cost(mut self, cost: f64) -> Self {
        self.mana_cost = Some(cost);
        self
    }

    pub fn aoe(mut self) -> Self {
        self.is_aoe = true;
        self
    }

    pub fn with_falloff(mut self, per_target: f64) -> Self {
        self.falloff_per_target = per_target;
        self
    }

    pub fn allow_auto_attacks_during_cast(mut self) -> Self {
        self.allows_auto_attacks_during_cast = true;
        self
    }

    pub fn allow_mana_gain_during_cast(mut self) -> Self {
        self.allows_mana_gain_during_cast = true;
        self
    }

    pub fn on_cast_start(mut self, cb: UnitCallback) -> Self {
        self.on_cast_start = Some(cb);
        self
    }

    pub fn on_cast_complete(mut self, cb: UnitCallback) -> Self {
        self.on_cast_complete = Some(cb);
        self
    }
}

impl fmt::Debug for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ability")
            .field("name", &self.name)
            .field("base_damage", &self.base_damage)
            .field("ap_ratio", &self.ap_ratio)
            .field("damage_type", &self.damage_type)
            .field("cast_time", &self.cast_time)
            .field("is_aoe", &self.is_aoe)
            .field("mana_cost", &self.mana_cost)
            .field("falloff_per_target", &self.falloff_per_target)
            .finish_non_exhaustive()
    }
}

/// Live instance of an in-flight cast
#[derive(Debug, Clone)]
pub struct CastingContext {
    pub start_time: Duration,
    pub end_time: Duration,
    pub can_gain_mana: bool,
    pub can_auto_attack: bool,
    /// Indices into the simulator's target list, resolved at cast start
    pub targets: Vec<usize>,
}

/// Construction-time description of a unit
#[derive(Debug, Clone)]
pub struct UnitDescriptor {
    pub name: String,
    pub role: Role,
    pub star_level: u8,
    pub starting_mana: f64,
    pub attack_windup: Duration,
    pub base_stats: BTreeMap<StatKind, f64>,
    pub ability: Ability,
}

/// The simulated combatant
#[derive(Debug)]
pub struct Unit {
    pub name: String,
    pub role: Role,
    pub star_level: u8,
    pub stats: StatTable,
    pub current_mana: f64,

    pub state: UnitState,
    pub casting: Option<CastingContext>,

    pub attack_windup: Duration,
    pub next_attack_time: Duration,
    /// Time-cursor for buff/stat resolution, advanced each tick
    pub now: Duration,

    pub ability: Ability,
    /// Whether the ability may currently crit (item grants included)
    pub ability_can_crit: bool,

    pub items: Vec<ItemInstance>,
    next_instance_id: InstanceId,
    pub augments: Vec<Augment>,
    pub buffs: BuffManager,
    next_buff_seq: u32,

    pub total_damage: f64,
    pub damage_log: Vec<DamageEvent>,
    pub attack_count: u64,
    pub ability_count: u64,
    pub crits: CritRoller,
}

impl Unit {
    pub fn new(desc: UnitDescriptor) -> Self {
        let mut stats = StatTable::new();
        for (&stat, &value) in &desc.base_stats {
            stats.set_base(stat, value);
        }
        if desc.role == Role::Caster {
            stats.set_base(StatKind::ManaRegen, 2.0);
        }

        let ability_can_crit = desc.ability.can_crit;

        Unit {
            name: desc.name,
            role: desc.role,
            star_level: desc.star_level,
            stats,
            current_mana: desc.starting_mana,
            state: UnitState::Idle,
            casting: None,
            attack_windup: desc.attack_windup,
            next_attack_time: Duration::ZERO,
            now: Duration::ZERO,
            ability: desc.ability,
            ability_can_crit,
            items: Vec::new(),
            next_instance_id: 0,
            augments: Vec::new(),
            buffs: BuffManager::new(),
            next_buff_seq: 0,
            total_damage: 0.0,
            damage_log: Vec::new(),
            attack_count: 0,
            ability_count: 0,
            crits: CritRoller::new(),
        }
    }

    /// Replace the crit roller, usually with a seeded one
    pub fn with_crit_roller(mut self, crits: CritRoller) -> Self {
        self.crits = crits;
        self
    }

    // === Stat resolution ===

    /// Resolved stat value at the current time-cursor, buffs included
    pub fn stat(&self, kind: StatKind) -> f64 {
        let overlay = self.buffs.overlay(self.now);
        self.stats.get_with(kind, &overlay)
    }

    /// Bonus layer only, buffs included
    pub fn bonus(&self, kind: StatKind) -> f64 {
        let overlay = self.buffs.overlay(self.now);
        self.stats.bonus_with(kind, &overlay)
    }

    /// Attacker-side snapshot for the damage pipeline
    pub fn snapshot(&self) -> AttackerSnapshot {
        let overlay = self.buffs.overlay(self.now);
        AttackerSnapshot {
            attack_damage: self.stats.get_with(StatKind::AttackDamage, &overlay),
            ability_power: self.stats.get_with(StatKind::AbilityPower, &overlay),
            crit_chance: self.stats.get_with(StatKind::CritChance, &overlay),
            crit_damage: self.stats.get_with(StatKind::CritDamage, &overlay),
            damage_amp: self.stats.get_with(StatKind::DamageAmp, &overlay),
        }
    }

    // === Attack timing ===

    pub fn attack_speed(&self) -> f64 {
        self.stat(StatKind::AttackSpeed)
    }

    /// `1000 ms / attack speed`; one second when speed is non-positive
    pub fn attack_interval(&self) -> Duration {
        let speed = self.attack_speed();
        if speed <= 0.0 {
            return Duration::from_secs(1);
        }
        Duration::from_secs_f64(1.0 / speed)
    }

    pub fn can_auto_attack(&self, now: Duration) -> bool {
        match self.state {
            UnitState::Channeling => return false,
            UnitState::Casting => {
                if let Some(ctx) = &self.casting {
                    if !ctx.can_auto_attack {
                        return false;
                    }
                }
            }
            UnitState::Idle | UnitState::Attacking => {}
        }
        now >= self.next_attack_time
    }

    // === Casting ===

    /// The ability's mana cost, defaulting to the max-mana stat
    pub fn resolved_mana_cost(&self) -> f64 {
        self.ability
            .mana_cost
            .unwrap_or_else(|| self.stat(StatKind::Mana))
    }

    /// Castable: idle or attacking, with mana for a positive cost
    pub fn can_cast(&self) -> bool {
        if !matches!(self.state, UnitState::Idle | UnitState::Attacking) {
            return false;
        }
        let cost = self.resolved_mana_cost();
        cost > 0.0 && self.current_mana >= cost
    }

    /// Open a casting context, spend mana, fire cast-start hooks
    pub fn start_cast(&mut self, targets: Vec<usize>) {
        let now = self.now;
        let ability = self.ability.clone();

        self.state = UnitState::Casting;
        self.casting = Some(CastingContext {
            start_time: now,
            end_time: now + ability.cast_time,
            can_gain_mana: ability.allows_mana_gain_during_cast,
            can_auto_attack: ability.allows_auto_attacks_during_cast,
            targets,
        });

        let cost = self.resolved_mana_cost();
        if cost > 0.0 {
            self.current_mana -= cost;
        }

        if let Some(cb) = ability.on_cast_start {
            cb(self);
        }

        let count = self.items.len();
        for i in 0..count {
            let bound = self
                .items
                .get(i)
                .map(|it| (it.id, it.def.hooks.on_cast.clone()));
            if let Some((id, Some(hook))) = bound {
                hook(self, id);
            }
        }
    }

    /// Close the casting context and return to idle; the simulator applies
    /// the ability's damage from the returned context
    pub fn finish_cast(&mut self) -> Option<CastingContext> {
        let ctx = self.casting.take();
        if ctx.is_some() {
            self.state = UnitState::Idle;
        }
        ctx
    }

    // === Mana ===

    pub fn mana_gain_allowed(&self) -> bool {
        if self.state == UnitState::Casting {
            if let Some(ctx) = &self.casting {
                return ctx.can_gain_mana;
            }
        }
        true
    }

    /// Add mana, clamped to the max-mana stat
    pub fn add_mana(&mut self, amount: f64) {
        self.current_mana += amount;
        let max = self.stat(StatKind::Mana);
        if self.current_mana > max {
            self.current_mana = max;
        }
    }

    /// Role-based mana gain for one landed auto-attack
    pub fn gain_mana_from_attack(&mut self) {
        if !self.mana_gain_allowed() {
            return;
        }
        let gain = match self.role {
            Role::Tank => 5.0,
            Role::Caster => 7.0,
            _ => 10.0,
        };
        self.add_mana(gain);
    }

    /// Per-second regeneration, gated while casting
    pub fn regen_mana(&mut self) {
        if !self.mana_gain_allowed() {
            return;
        }
        let regen = self.stat(StatKind::ManaRegen);
        if regen > 0.0 {
            self.add_mana(regen);
        }
    }

    // === Items & augments ===

    /// Equip an item, granting its stats for the unit's lifetime
    ///
    /// Returns the stable instance id, or `None` when a duplicate unique
    /// item was ignored. A second ability-crit grant converts to +10%
    /// crit damage instead.
    pub fn equip(&mut self, def: ItemDef) -> Option<InstanceId> {
        if def.unique && self.items.iter().any(|i| i.def.name == def.name) {
            tracing::debug!(unit = %self.name, item = %def.name, "duplicate unique item ignored");
            return None;
        }

        for (&stat, &value) in &def.stats {
            self.stats.add_bonus(stat, value);
        }

        if def.grants_ability_crit {
            if self.ability_can_crit {
                self.stats.add_bonus(StatKind::CritDamage, 0.1);
            }
            self.ability_can_crit = true;
        }

        let id = self.next_instance_id;
        self.next_instance_id += 1;
        let on_equip = def.hooks.on_equip.clone();
        self.items.push(ItemInstance { id, def, stacks: 0 });

        if let Some(hook) = on_equip {
            hook(self, id);
        }
        Some(id)
    }

    pub fn add_augment(&mut self, augment: Augment) {
        for (&stat, &value) in &augment.stats {
            self.stats.add_bonus(stat, value);
        }
        self.augments.push(augment);
    }

    /// The equipped instance with this id
    pub fn item(&self, id: InstanceId) -> Option<&ItemInstance> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn item_mut(&mut self, id: InstanceId) -> Option<&mut ItemInstance> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    // === Buff lifecycle ===

    /// Apply a buff at the current time-cursor, returning its stored
    /// identity
    ///
    /// A non-expired buff with the same name takes the refresh path under
    /// its own stacking policy. Independent buffs always become parallel
    /// instances: each gets a disambiguating suffix, so every instance
    /// stays individually addressable through the returned name.
    pub fn apply_buff(&mut self, mut buff: Buff) -> String {
        let now = self.now;

        if buff.policy == StackPolicy::Independent {
            buff.name = format!("{}#{}", buff.name, self.next_buff_seq);
            self.next_buff_seq += 1;
        } else {
            let on_refresh = match self.buffs.find_mut(&buff.name) {
                Some(existing) => {
                    existing.refresh_from(now, &buff);
                    Some(existing.on_refresh.clone())
                }
                None => None,
            };
            if let Some(cb) = on_refresh {
                let name = buff.name;
                if let Some(cb) = cb {
                    cb(self);
                }
                return name;
            }
        }

        buff.applied_time = now;
        let name = buff.name.clone();
        let on_apply = buff.on_apply.clone();
        self.buffs.push(buff);
        if let Some(cb) = on_apply {
            cb(self);
        }
        name
    }

    /// Expire every non-expired buff with this name and sweep
    pub fn remove_buff(&mut self, name: &str) {
        let mut callbacks: Vec<BuffCallback> = Vec::new();
        for i in 0..self.buffs.len() {
            if let Some(b) = self.buffs.get_mut(i) {
                if b.name == name && !b.expired {
                    b.expired = true;
                    if let Some(cb) = b.on_expire.clone() {
                        callbacks.push(cb);
                    }
                }
            }
        }
        for cb in callbacks {
            cb(self);
        }
        self.buffs.sweep();
    }

    /// Once-per-tick buff maintenance: expire lapsed windows, run tick
    /// callbacks, sweep afterwards
    ///
    /// Walks a snapshot of the index range; buffs applied by callbacks
    /// append past it and removals only flag, so no entry is skipped or
    /// processed twice.
    pub fn update_buffs(&mut self) {
        let now = self.now;
        let count = self.buffs.len();

        enum Step {
            Nothing,
            Expire(Option<BuffCallback>),
            Tick(Option<BuffTickCallback>, Duration),
        }

        for i in 0..count {
            let step = match self.buffs.get_mut(i) {
                None => Step::Nothing,
                Some(b) if b.expired => Step::Nothing,
                Some(b) if !b.is_active(now) => {
                    b.expired = true;
                    Step::Expire(b.on_expire.clone())
                }
                Some(b) => Step::Tick(b.on_tick.clone(), now.saturating_sub(b.applied_time)),
            };

            match step {
                Step::Nothing => {}
                Step::Expire(cb) => {
                    if let Some(cb) = cb {
                        cb(self);
                    }
                }
                Step::Tick(cb, elapsed) => {
                    if let Some(cb) = cb {
                        cb(self, elapsed);
                    }
                }
            }
        }

        self.buffs.sweep();
    }
}
