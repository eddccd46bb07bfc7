//! Status-effect ledger: bleed and poison instances plus the combo counter.
//!
//! Each fighter owns one ledger for the length of a battle. The ledger is
//! pure bookkeeping; the battle passes the owning [`Combatant`] into
//! [`StatusEffectLedger::update`] and [`StatusEffectLedger::register_hit`]
//! so periodic damage and combo rewards are applied without a back-reference.
//!
//! # Stacking
//!
//! - **Bleed**: at most one instance. An incoming bleed replaces the resident
//!   one only if its source attack power is at least as high; a weaker bleed
//!   is dropped and never touches the resident's remaining duration.
//! - **Poison**: unbounded instances. Every new application resets the
//!   remaining duration of all held poisons to the new duration.

use serde::{Deserialize, Serialize};

use super::types::Combatant;
use crate::core::config::{ComboConfig, CombatConfig};
use crate::core::constants::EXPIRY_EPSILON;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EffectKind {
    Bleed,
    Poison,
}

/// One live damage-over-time instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: EffectKind,
    /// Bleed: total damage dealt over the bleed window.
    /// Poison: fraction of the owner's max hp dealt per second.
    pub magnitude: f64,
    pub remaining: f64,
    pub source_attack_power: f64,
}

impl StatusEffect {
    /// Damage per second this instance deals to `owner`.
    fn damage_per_second(&self, owner: &Combatant, config: &CombatConfig) -> f64 {
        match self.kind {
            EffectKind::Bleed => self.magnitude / config.bleed.window_seconds,
            EffectKind::Poison => self.magnitude * owner.max_hp(),
        }
    }
}

/// What [`StatusEffectLedger::add_effect`] did with an incoming effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectApplication {
    /// No bleed was resident; the new one was stored.
    Applied,
    /// The resident bleed was weaker (or equal) and was replaced.
    Replaced,
    /// The resident bleed was stronger; the incoming one was dropped.
    Ignored,
    /// A poison was added; `stacks` is the new instance count.
    Stacked { stacks: usize },
}

/// A combo reward granted on a qualifying hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ComboMilestone {
    ForcedCrit,
    Haste { multiplier: f64, seconds: f64 },
    BonusDamage { amount: f64 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComboState {
    pub hit_count: u32,
    pub time_until_reset: f64,
}

/// Periodic damage dealt to the owner during one [`StatusEffectLedger::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeriodicDamage {
    pub bleed: f64,
    pub poison: f64,
    /// Set to the new max hp when periodic damage tripped the sympathy link.
    pub sympathy_locked: Option<f64>,
}

impl PeriodicDamage {
    pub fn total(&self) -> f64 {
        self.bleed + self.poison
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEffectLedger {
    bleed: Option<StatusEffect>,
    poison: Vec<StatusEffect>,
    combo: ComboState,
}

impl StatusEffectLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live instances of `kind`, oldest first.
    pub fn effects(&self, kind: EffectKind) -> &[StatusEffect] {
        match kind {
            EffectKind::Bleed => self.bleed.as_slice(),
            EffectKind::Poison => &self.poison,
        }
    }

    pub fn bleed(&self) -> Option<&StatusEffect> {
        self.bleed.as_ref()
    }

    pub fn poison_stacks(&self) -> usize {
        self.poison.len()
    }

    pub fn combo(&self) -> ComboState {
        self.combo
    }

    pub fn is_empty(&self) -> bool {
        self.bleed.is_none() && self.poison.is_empty()
    }

    /// Apply an effect under its kind's stacking policy.
    pub fn add_effect(
        &mut self,
        kind: EffectKind,
        magnitude: f64,
        duration: f64,
        source_attack_power: f64,
    ) -> EffectApplication {
        let incoming = StatusEffect {
            kind,
            magnitude,
            remaining: duration,
            source_attack_power,
        };

        match kind {
            EffectKind::Bleed => match self.bleed {
                None => {
                    self.bleed = Some(incoming);
                    EffectApplication::Applied
                }
                Some(resident) if source_attack_power >= resident.source_attack_power => {
                    self.bleed = Some(incoming);
                    EffectApplication::Replaced
                }
                Some(_) => EffectApplication::Ignored,
            },
            EffectKind::Poison => {
                for held in &mut self.poison {
                    held.remaining = duration;
                }
                self.poison.push(incoming);
                EffectApplication::Stacked {
                    stacks: self.poison.len(),
                }
            }
        }
    }

    /// Advance every timer by `delta_time` seconds.
    ///
    /// Deals armor-ignoring periodic damage to `owner`, prunes expired
    /// instances, then counts down the combo window.
    pub fn update(
        &mut self,
        delta_time: f64,
        owner: &mut Combatant,
        config: &CombatConfig,
    ) -> PeriodicDamage {
        let mut damage = PeriodicDamage::default();

        if let Some(bleed) = self.bleed.as_mut() {
            let amount = bleed.damage_per_second(owner, config) * delta_time;
            let taken = owner.take_damage(amount);
            damage.bleed += taken.dealt;
            damage.sympathy_locked = damage.sympathy_locked.or(taken.sympathy_locked);
            bleed.remaining -= delta_time;
        }
        if self.bleed.is_some_and(|b| b.remaining <= EXPIRY_EPSILON) {
            self.bleed = None;
        }

        for poison in &mut self.poison {
            let amount = poison.damage_per_second(owner, config) * delta_time;
            let taken = owner.take_damage(amount);
            damage.poison += taken.dealt;
            damage.sympathy_locked = damage.sympathy_locked.or(taken.sympathy_locked);
            poison.remaining -= delta_time;
        }
        self.poison.retain(|p| p.remaining > EXPIRY_EPSILON);

        if self.combo.hit_count > 0 {
            self.combo.time_until_reset -= delta_time;
            if self.combo.time_until_reset <= EXPIRY_EPSILON {
                self.combo = ComboState::default();
            }
        }

        damage
    }

    /// Count a qualifying hit by `owner` and grant any milestone reward.
    ///
    /// The final milestone is consumed: the counter drops back to zero.
    pub fn register_hit(
        &mut self,
        owner: &mut Combatant,
        config: &ComboConfig,
    ) -> Option<ComboMilestone> {
        self.combo.hit_count += 1;
        self.combo.time_until_reset = config.window_seconds;

        let count = self.combo.hit_count;
        if count == config.bonus_milestone {
            let amount = config.bonus_attack_factor * owner.attack;
            owner.add_pending_bonus_damage(amount);
            self.combo.hit_count = 0;
            Some(ComboMilestone::BonusDamage { amount })
        } else if count == config.haste_milestone {
            owner.apply_haste(config.haste_multiplier, config.haste_seconds);
            Some(ComboMilestone::Haste {
                multiplier: config.haste_multiplier,
                seconds: config.haste_seconds,
            })
        } else if count == config.crit_milestone {
            owner.force_next_crit();
            Some(ComboMilestone::ForcedCrit)
        } else {
            None
        }
    }
}
