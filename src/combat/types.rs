use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::effects::StatusEffectLedger;
use crate::core::combat_math::{apply_damage, apply_heal, combat_power, is_alive};
use crate::core::constants::{EXPIRY_EPSILON, SYMPATHY_LINK_THRESHOLD, TICKS_PER_SECOND};
use crate::error::InvalidStat;

/// Which side of the encounter a combatant fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    /// Resolution order when both counters mature on the same tick.
    pub const ALL: [Side; 2] = [Side::Player, Side::Enemy];

    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Player => f.write_str("player"),
            Side::Enemy => f.write_str("enemy"),
        }
    }
}

bitflags! {
    /// Proc capabilities. Any of the effect flags makes an attack roll for a proc;
    /// on success every owned effect fires.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ProcFlags: u8 {
        /// Proc forces the attacker's next hit to crit.
        const MASTERY           = 1 << 0;
        /// Proc stuns the defender.
        const STORM             = 1 << 1;
        /// Proc grants timed bonus armor.
        const SHIELD            = 1 << 2;
        /// Proc heals the attacker.
        const HEAL              = 1 << 3;
        /// Proc grants a timed attack-speed multiplier.
        const FURY              = 1 << 4;
        /// Roll against the enhanced proc chance.
        const ENHANCED_CHANCE   = 1 << 5;
        /// Stretch timed proc effects by the enhanced duration factor.
        const ENHANCED_DURATION = 1 << 6;

        const EFFECTS = Self::MASTERY.bits()
            | Self::STORM.bits()
            | Self::SHIELD.bits()
            | Self::HEAL.bits()
            | Self::FURY.bits();
    }
}

bitflags! {
    /// Passive traits evaluated on every attack regardless of procs.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct TraitFlags: u8 {
        /// Hits feed the combo counter.
        const COMBO          = 1 << 0;
        /// Hits may apply bleed.
        const BLEED          = 1 << 1;
        /// Hits may apply poison.
        const POISON         = 1 << 2;
        /// Max hp locks at half once hp first falls to half.
        const SYMPATHY_LINK  = 1 << 3;
        /// Every Nth hit received reflects damage to the attacker.
        const REFLECT        = 1 << 4;
        /// Outgoing hits ignore armor and flat reduction.
        const ARMOR_PIERCING = 1 << 5;
    }
}

/// Healing applied to the attacker after each landed hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Lifesteal {
    /// Fixed heal per hit.
    Flat(f64),
    /// Fraction of the damage that landed.
    Proportional(f64),
}

impl Default for Lifesteal {
    fn default() -> Self {
        Lifesteal::Flat(0.0)
    }
}

impl Lifesteal {
    pub fn heal_for(self, final_damage: f64) -> f64 {
        match self {
            Lifesteal::Flat(amount) => amount,
            Lifesteal::Proportional(fraction) => final_damage * fraction,
        }
    }

    fn amount(self) -> f64 {
        match self {
            Lifesteal::Flat(value) | Lifesteal::Proportional(value) => value,
        }
    }
}

/// Sympathy link state. Only meaningful for combatants with [`TraitFlags::SYMPATHY_LINK`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum SympathyLink {
    #[default]
    Armed,
    /// Max hp is locked for the rest of the battle.
    Locked { original_max_hp: f64 },
}

/// A multiplier or bonus with a remaining duration in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedModifier {
    pub value: f64,
    pub remaining: f64,
}

/// Permanent improvements the player collects between battles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Upgrade {
    Attack(f64),
    /// Percent increase to base attack speed (10.0 = +10%).
    AttackSpeedPercent(f64),
    Armor(f64),
    MaxHp(f64),
    FlatReduction(f64),
    CritChance(f64),
    Lifesteal(Lifesteal),
    Proc(ProcFlags),
    Trait(TraitFlags),
}

/// Outcome of one call to [`Combatant::take_damage`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DamageTaken {
    pub dealt: f64,
    /// Set to the new max hp when this hit tripped the sympathy link.
    pub sympathy_locked: Option<f64>,
}

/// One fighter's combat record.
///
/// Exactly one instance represents the player (kept across battles and
/// upgraded between them); the enemy instance is built fresh per level.
/// `hp` stays within `0..=max_hp` and `ticks_per_attack` is recomputed every
/// time the effective attack speed changes, so both are only writable
/// through methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub name: String,
    hp: f64,
    max_hp: f64,
    pub attack: f64,
    attack_speed: f64,
    pub armor: f64,
    pub flat_reduction: f64,
    pub crit_chance: f64,
    pub lifesteal: Lifesteal,
    pub procs: ProcFlags,
    pub traits: TraitFlags,
    ticks_per_attack: u32,
    ticks_since_last_attack: u32,
    haste: Option<TimedModifier>,
    shield: Option<TimedModifier>,
    stun_remaining: f64,
    forced_next_crit: bool,
    pending_bonus_damage: f64,
    sympathy: SympathyLink,
    hits_received: u32,
}

impl Combatant {
    /// Create a combatant at full hp with no flat reduction, crits, procs, or traits.
    pub fn new(
        name: impl Into<String>,
        max_hp: f64,
        attack: f64,
        attack_speed: f64,
        armor: f64,
    ) -> Self {
        let mut combatant = Self {
            name: name.into(),
            hp: max_hp,
            max_hp,
            attack,
            attack_speed,
            armor,
            flat_reduction: 0.0,
            crit_chance: 0.0,
            lifesteal: Lifesteal::default(),
            procs: ProcFlags::empty(),
            traits: TraitFlags::empty(),
            ticks_per_attack: 1,
            ticks_since_last_attack: 0,
            haste: None,
            shield: None,
            stun_remaining: 0.0,
            forced_next_crit: false,
            pending_bonus_damage: 0.0,
            sympathy: SympathyLink::Armed,
            hits_received: 0,
        };
        combatant.recompute_ticks_per_attack();
        combatant
    }

    pub fn with_flat_reduction(mut self, flat_reduction: f64) -> Self {
        self.flat_reduction = flat_reduction;
        self
    }

    pub fn with_crit_chance(mut self, crit_chance: f64) -> Self {
        self.crit_chance = crit_chance;
        self
    }

    pub fn with_lifesteal(mut self, lifesteal: Lifesteal) -> Self {
        self.lifesteal = lifesteal;
        self
    }

    pub fn with_procs(mut self, procs: ProcFlags) -> Self {
        self.procs = procs;
        self
    }

    pub fn with_traits(mut self, traits: TraitFlags) -> Self {
        self.traits = traits;
        self
    }

    /// Start below full hp (clamped into `0..=max_hp`).
    pub fn with_hp(mut self, hp: f64) -> Self {
        self.hp = hp.clamp(0.0, self.max_hp);
        self
    }

    /// Check the record is structurally sound before it enters a battle.
    pub fn validate(&self) -> Result<(), InvalidStat> {
        if !(self.max_hp.is_finite() && self.max_hp > 0.0) {
            return Err(InvalidStat::MaxHp(self.max_hp));
        }
        if !(self.hp.is_finite() && (0.0..=self.max_hp).contains(&self.hp)) {
            return Err(InvalidStat::Hp {
                hp: self.hp,
                max_hp: self.max_hp,
            });
        }
        if !(self.attack_speed.is_finite() && self.attack_speed > 0.0) {
            return Err(InvalidStat::AttackSpeed(self.attack_speed));
        }
        if !(self.attack.is_finite() && self.attack >= 0.0) {
            return Err(InvalidStat::Attack(self.attack));
        }
        if !(self.armor.is_finite() && self.armor >= 0.0) {
            return Err(InvalidStat::Armor(self.armor));
        }
        if !(self.flat_reduction.is_finite() && self.flat_reduction >= 0.0) {
            return Err(InvalidStat::FlatReduction(self.flat_reduction));
        }
        if !(0.0..=1.0).contains(&self.crit_chance) {
            return Err(InvalidStat::CritChance(self.crit_chance));
        }
        let steal = self.lifesteal.amount();
        if !(steal.is_finite() && steal >= 0.0) {
            return Err(InvalidStat::Lifesteal(steal));
        }
        Ok(())
    }

    pub fn hp(&self) -> f64 {
        self.hp
    }

    pub fn max_hp(&self) -> f64 {
        self.max_hp
    }

    pub fn is_alive(&self) -> bool {
        is_alive(self.hp)
    }

    /// Base attacks per second, before haste.
    pub fn attack_speed(&self) -> f64 {
        self.attack_speed
    }

    /// Attacks per second including any active haste.
    pub fn effective_attack_speed(&self) -> f64 {
        self.attack_speed * self.haste_multiplier()
    }

    pub fn haste_multiplier(&self) -> f64 {
        self.haste.map_or(1.0, |h| h.value)
    }

    pub fn haste(&self) -> Option<TimedModifier> {
        self.haste
    }

    pub fn shield(&self) -> Option<TimedModifier> {
        self.shield
    }

    /// Armor including any active shield.
    pub fn effective_armor(&self) -> f64 {
        self.armor + self.shield.map_or(0.0, |s| s.value)
    }

    pub fn ticks_per_attack(&self) -> u32 {
        self.ticks_per_attack
    }

    pub fn ticks_since_last_attack(&self) -> u32 {
        self.ticks_since_last_attack
    }

    pub fn is_stunned(&self) -> bool {
        self.stun_remaining > 0.0
    }

    pub fn stun_remaining(&self) -> f64 {
        self.stun_remaining
    }

    pub fn forced_next_crit(&self) -> bool {
        self.forced_next_crit
    }

    pub fn pending_bonus_damage(&self) -> f64 {
        self.pending_bonus_damage
    }

    pub fn sympathy(&self) -> SympathyLink {
        self.sympathy
    }

    pub fn hits_received(&self) -> u32 {
        self.hits_received
    }

    /// Raw balancing scalar for this record: DPS x effective HP at full health.
    pub fn raw_power(&self) -> f64 {
        combat_power(self.attack, self.attack_speed, self.max_hp, self.armor)
    }

    /// Change base attack speed and recompute the attack cadence.
    pub fn set_attack_speed(&mut self, attack_speed: f64) {
        self.attack_speed = attack_speed;
        self.recompute_ticks_per_attack();
    }

    fn recompute_ticks_per_attack(&mut self) {
        let speed = self.effective_attack_speed();
        self.ticks_per_attack = if speed.is_finite() && speed > 0.0 {
            (f64::from(TICKS_PER_SECOND) / speed).round().max(1.0) as u32
        } else {
            u32::MAX
        };
    }

    /// Step 1 of a tick: advance the attack counter unless stunned.
    /// Returns true once the counter has reached `ticks_per_attack`.
    pub(crate) fn advance_attack_counter(&mut self) -> bool {
        if !self.is_stunned() {
            self.ticks_since_last_attack = self.ticks_since_last_attack.saturating_add(1);
        }
        self.ticks_since_last_attack >= self.ticks_per_attack
    }

    pub(crate) fn reset_attack_counter(&mut self) {
        self.ticks_since_last_attack = 0;
    }

    /// Apply damage (floored at zero hp) and evaluate the sympathy link.
    pub fn take_damage(&mut self, amount: f64) -> DamageTaken {
        let before = self.hp;
        self.hp = apply_damage(self.hp, amount);
        let sympathy_locked = self.check_sympathy_link(before);
        DamageTaken {
            dealt: before - self.hp,
            sympathy_locked,
        }
    }

    /// Heal up to max hp. Returns the amount actually restored.
    pub fn heal(&mut self, amount: f64) -> f64 {
        let before = self.hp;
        self.hp = apply_heal(self.hp, amount, self.max_hp);
        self.hp - before
    }

    /// Restore hp to max.
    pub fn heal_full(&mut self) {
        self.hp = self.max_hp;
    }

    /// Locks only when this hit carried hp from above the threshold to at or
    /// below it.
    fn check_sympathy_link(&mut self, hp_before: f64) -> Option<f64> {
        if !self.traits.contains(TraitFlags::SYMPATHY_LINK) {
            return None;
        }
        if self.sympathy != SympathyLink::Armed {
            return None;
        }
        let threshold = self.max_hp * SYMPATHY_LINK_THRESHOLD;
        if self.hp > threshold || hp_before <= threshold {
            return None;
        }
        self.sympathy = SympathyLink::Locked {
            original_max_hp: self.max_hp,
        };
        self.max_hp = threshold;
        self.hp = self.hp.min(self.max_hp);
        Some(self.max_hp)
    }

    /// Grant a timed attack-speed multiplier, replacing any active one.
    pub fn apply_haste(&mut self, multiplier: f64, seconds: f64) {
        self.haste = Some(TimedModifier {
            value: multiplier,
            remaining: seconds,
        });
        self.recompute_ticks_per_attack();
    }

    /// Grant timed bonus armor, replacing any active shield.
    pub fn apply_shield(&mut self, armor: f64, seconds: f64) {
        self.shield = Some(TimedModifier {
            value: armor,
            remaining: seconds,
        });
    }

    /// Stun for `seconds`; a longer running stun is not shortened.
    pub fn apply_stun(&mut self, seconds: f64) {
        self.stun_remaining = self.stun_remaining.max(seconds);
    }

    pub fn force_next_crit(&mut self) {
        self.forced_next_crit = true;
    }

    /// Consume the forced-crit flag.
    pub(crate) fn take_forced_crit(&mut self) -> bool {
        std::mem::take(&mut self.forced_next_crit)
    }

    pub fn add_pending_bonus_damage(&mut self, amount: f64) {
        self.pending_bonus_damage += amount;
    }

    /// Consume pending one-shot bonus damage.
    pub(crate) fn take_pending_bonus_damage(&mut self) -> f64 {
        std::mem::take(&mut self.pending_bonus_damage)
    }

    /// Count a received hit. Returns true (and resets the counter) on every
    /// `interval`-th hit.
    pub(crate) fn register_hit_received(&mut self, interval: u32) -> bool {
        self.hits_received += 1;
        if self.hits_received >= interval.max(1) {
            self.hits_received = 0;
            true
        } else {
            false
        }
    }

    /// Count down haste, shield, and stun timers by one tick.
    pub(crate) fn tick_modifiers(&mut self, delta_time: f64) {
        self.stun_remaining -= delta_time;
        if self.stun_remaining <= EXPIRY_EPSILON {
            self.stun_remaining = 0.0;
        }

        if let Some(shield) = self.shield.as_mut() {
            shield.remaining -= delta_time;
            if shield.remaining <= EXPIRY_EPSILON {
                self.shield = None;
            }
        }

        if let Some(haste) = self.haste.as_mut() {
            haste.remaining -= delta_time;
            if haste.remaining <= EXPIRY_EPSILON {
                self.haste = None;
                self.recompute_ticks_per_attack();
            }
        }
    }

    /// Clear everything that only lives for one battle: transient modifiers,
    /// counters, and a sympathy-link lock (max hp returns to its pre-lock value).
    pub fn reset_after_battle(&mut self) {
        if let SympathyLink::Locked { original_max_hp } = self.sympathy {
            self.max_hp = original_max_hp;
        }
        self.sympathy = SympathyLink::Armed;
        self.haste = None;
        self.shield = None;
        self.stun_remaining = 0.0;
        self.forced_next_crit = false;
        self.pending_bonus_damage = 0.0;
        self.hits_received = 0;
        self.ticks_since_last_attack = 0;
        self.recompute_ticks_per_attack();
    }

    /// Apply a permanent upgrade.
    pub fn apply_upgrade(&mut self, upgrade: Upgrade) {
        match upgrade {
            Upgrade::Attack(amount) => self.attack += amount,
            Upgrade::AttackSpeedPercent(percent) => {
                self.set_attack_speed(self.attack_speed * (1.0 + percent / 100.0));
            }
            Upgrade::Armor(amount) => self.armor += amount,
            Upgrade::MaxHp(amount) => {
                self.max_hp += amount;
                self.hp = apply_heal(self.hp, amount, self.max_hp);
            }
            Upgrade::FlatReduction(amount) => self.flat_reduction += amount,
            Upgrade::CritChance(amount) => {
                self.crit_chance = (self.crit_chance + amount).clamp(0.0, 1.0);
            }
            Upgrade::Lifesteal(lifesteal) => self.lifesteal = lifesteal,
            Upgrade::Proc(flags) => self.procs |= flags,
            Upgrade::Trait(flags) => self.traits |= flags,
        }
    }
}

/// A combatant paired with its status-effect ledger for the length of one battle.
///
/// The ledger never holds a reference back to its owner; the battle passes
/// the combatant into ledger calls explicitly.
#[derive(Debug, Clone)]
pub struct Fighter {
    pub combatant: Combatant,
    pub effects: StatusEffectLedger,
}

impl Fighter {
    pub fn new(combatant: Combatant) -> Self {
        Self {
            combatant,
            effects: StatusEffectLedger::new(),
        }
    }
}
