//! Single-attack resolution.
//!
//! [`DamageResolver::resolve`] runs one attack from start to finish inside a
//! tick: crit and one-shot bonus damage, the proc roll and its effects, the
//! attacker's passive triggers (combo, bleed, poison), mitigation, damage and
//! the sympathy link, lifesteal, and the defender's reflect cadence. Nothing
//! is deferred past the tick except the timed modifiers it grants.

use rand::Rng;
use tracing::trace;

use super::effects::{ComboMilestone, EffectApplication, EffectKind};
use super::events::{CombatEvent, HealSource};
use super::types::{Fighter, ProcFlags, Side, TraitFlags};
use crate::core::combat_math::mitigate;
use crate::core::config::CombatConfig;

/// Everything that happened during one attack.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttackOutcome {
    /// Damage before mitigation (after crit, bonus, and proc).
    pub raw_damage: f64,
    /// Damage that actually came off the defender's hp.
    pub final_damage: f64,
    pub was_crit: bool,
    /// One-shot bonus damage consumed by this attack.
    pub bonus_damage: f64,
    pub procced: bool,
    pub armor_ignored: bool,
    pub proc_heal: f64,
    /// Stun applied to the defender, in seconds.
    pub stun_seconds: Option<f64>,
    pub combo: Option<ComboMilestone>,
    pub bleed: Option<EffectApplication>,
    pub poison: Option<EffectApplication>,
    pub lifesteal_heal: f64,
    /// Damage reflected back onto the attacker.
    pub reflected: Option<f64>,
    /// The defender's sympathy link locked during this attack.
    pub defender_sympathy_locked: Option<f64>,
    /// The attacker's sympathy link locked from reflect damage.
    pub attacker_sympathy_locked: Option<f64>,
}

impl AttackOutcome {
    /// Translate this outcome into events for the presentation layer.
    pub fn push_events(&self, attacker: Side, events: &mut Vec<CombatEvent>) {
        let defender = attacker.opponent();

        events.push(CombatEvent::Attack {
            attacker,
            damage: self.final_damage,
            was_crit: self.was_crit,
            procced: self.procced,
            armor_ignored: self.armor_ignored,
        });
        if self.proc_heal > 0.0 {
            events.push(CombatEvent::Healed {
                side: attacker,
                amount: self.proc_heal,
                source: HealSource::Proc,
            });
        }
        if let Some(seconds) = self.stun_seconds {
            events.push(CombatEvent::Stunned {
                side: defender,
                seconds,
            });
        }
        if let Some(milestone) = self.combo {
            events.push(CombatEvent::ComboMilestone {
                side: attacker,
                milestone,
            });
        }
        for (kind, application) in [
            (EffectKind::Bleed, self.bleed),
            (EffectKind::Poison, self.poison),
        ] {
            if let Some(application) = application {
                events.push(CombatEvent::EffectApplied {
                    target: defender,
                    kind,
                    application,
                });
            }
        }
        if let Some(max_hp) = self.defender_sympathy_locked {
            events.push(CombatEvent::SympathyLinkLocked {
                side: defender,
                max_hp,
            });
        }
        if self.lifesteal_heal > 0.0 {
            events.push(CombatEvent::Healed {
                side: attacker,
                amount: self.lifesteal_heal,
                source: HealSource::Lifesteal,
            });
        }
        if let Some(damage) = self.reflected {
            events.push(CombatEvent::Reflected {
                by: defender,
                damage,
            });
        }
        if let Some(max_hp) = self.attacker_sympathy_locked {
            events.push(CombatEvent::SympathyLinkLocked {
                side: attacker,
                max_hp,
            });
        }
    }
}

/// Resolves attacks against the tuning in a [`CombatConfig`].
#[derive(Debug, Clone, Copy)]
pub struct DamageResolver<'a> {
    config: &'a CombatConfig,
}

impl<'a> DamageResolver<'a> {
    pub fn new(config: &'a CombatConfig) -> Self {
        Self { config }
    }

    /// Resolve one attack by `attacker` against `defender`.
    ///
    /// Both fighters must already be validated; the attacker is expected to
    /// be alive (the battle skips dead attackers before calling this).
    pub fn resolve(
        &self,
        attacker: &mut Fighter,
        defender: &mut Fighter,
        rng: &mut impl Rng,
    ) -> AttackOutcome {
        let config = self.config;
        let mut outcome = AttackOutcome::default();

        // 1. Base damage and crit
        let mut damage = attacker.combatant.attack;
        let forced = attacker.combatant.take_forced_crit();
        if forced || rng.gen::<f64>() < attacker.combatant.crit_chance {
            damage *= config.crit_multiplier;
            outcome.was_crit = true;
        }

        // 2. One-shot bonus damage
        let bonus = attacker.combatant.take_pending_bonus_damage();
        if bonus > 0.0 {
            damage += bonus;
            outcome.bonus_damage = bonus;
        }

        // 3. Proc roll
        let procs = attacker.combatant.procs;
        if procs.intersects(ProcFlags::EFFECTS) {
            let chance = if procs.contains(ProcFlags::ENHANCED_CHANCE) {
                config.proc.enhanced_chance
            } else {
                config.proc.base_chance
            };
            if rng.gen::<f64>() < chance {
                damage *= config.proc.damage_multiplier;
                outcome.procced = true;
                self.apply_proc_effects(attacker, defender, &mut outcome);
            }
        }

        // 4. Passive triggers, independent of the proc roll
        let traits = attacker.combatant.traits;
        if traits.contains(TraitFlags::COMBO) {
            outcome.combo = attacker
                .effects
                .register_hit(&mut attacker.combatant, &config.combo);
        }
        if traits.contains(TraitFlags::BLEED) && rng.gen::<f64>() < config.bleed.chance {
            outcome.bleed = Some(defender.effects.add_effect(
                EffectKind::Bleed,
                config.bleed.damage_fraction * damage,
                config.bleed.duration_seconds,
                damage,
            ));
        }
        if traits.contains(TraitFlags::POISON) && rng.gen::<f64>() < config.poison.chance {
            outcome.poison = Some(defender.effects.add_effect(
                EffectKind::Poison,
                config.poison.max_hp_rate,
                config.poison.duration_seconds,
                attacker.combatant.attack,
            ));
        }

        // 5. Mitigation
        outcome.raw_damage = damage;
        outcome.armor_ignored = traits.contains(TraitFlags::ARMOR_PIERCING);
        let final_damage = if outcome.armor_ignored {
            damage
        } else {
            mitigate(
                damage,
                defender.combatant.effective_armor(),
                defender.combatant.flat_reduction,
            )
        };

        // 6. Damage and sympathy link
        let taken = defender.combatant.take_damage(final_damage);
        outcome.final_damage = taken.dealt;
        outcome.defender_sympathy_locked = taken.sympathy_locked;

        // 7. Lifesteal
        let steal = attacker.combatant.lifesteal.heal_for(outcome.final_damage);
        if steal > 0.0 {
            outcome.lifesteal_heal = attacker.combatant.heal(steal);
        }

        // 8. Reflect cadence
        if defender
            .combatant
            .register_hit_received(config.reflect.hit_interval)
            && defender.combatant.traits.contains(TraitFlags::REFLECT)
        {
            let reflect = attacker.combatant.max_hp() * config.reflect.max_hp_fraction;
            let back = attacker.combatant.take_damage(reflect);
            outcome.reflected = Some(back.dealt);
            outcome.attacker_sympathy_locked = back.sympathy_locked;
        }

        trace!(
            raw = outcome.raw_damage,
            dealt = outcome.final_damage,
            crit = outcome.was_crit,
            procced = outcome.procced,
            "attack resolved"
        );
        outcome
    }

    fn apply_proc_effects(
        &self,
        attacker: &mut Fighter,
        defender: &mut Fighter,
        outcome: &mut AttackOutcome,
    ) {
        let proc = &self.config.proc;
        let procs = attacker.combatant.procs;
        let duration_factor = if procs.contains(ProcFlags::ENHANCED_DURATION) {
            proc.enhanced_duration_factor
        } else {
            1.0
        };

        if procs.contains(ProcFlags::MASTERY) {
            attacker.combatant.force_next_crit();
        }
        if procs.contains(ProcFlags::SHIELD) {
            attacker
                .combatant
                .apply_shield(proc.shield_armor, proc.shield_seconds * duration_factor);
        }
        if procs.contains(ProcFlags::HEAL) {
            outcome.proc_heal = attacker.combatant.heal(proc.heal_amount);
        }
        if procs.contains(ProcFlags::FURY) {
            attacker
                .combatant
                .apply_haste(proc.haste_multiplier, proc.haste_seconds * duration_factor);
        }
        if procs.contains(ProcFlags::STORM) {
            if let Some(stun) = proc.stun {
                let seconds = stun.seconds * duration_factor;
                defender.combatant.apply_stun(seconds);
                outcome.stun_seconds = Some(seconds);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::types::{Combatant, Lifesteal};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    fn attacker() -> Fighter {
        Fighter::new(Combatant::new("Attacker", 100.0, 20.0, 1.0, 0.0))
    }

    fn defender() -> Fighter {
        Fighter::new(Combatant::new("Defender", 1000.0, 10.0, 1.0, 25.0).with_flat_reduction(2.0))
    }

    #[test]
    fn test_plain_hit_is_mitigated() {
        let config = CombatConfig::default();
        let resolver = DamageResolver::new(&config);
        let (mut a, mut d) = (attacker(), defender());

        let outcome = resolver.resolve(&mut a, &mut d, &mut rng());
        // 20 / 1.25 - 2 = 14
        assert!(!outcome.was_crit);
        assert!(!outcome.procced);
        assert!((outcome.final_damage - 14.0).abs() < 1e-9);
        assert!((d.combatant.hp() - 986.0).abs() < 1e-9);
    }

    #[test]
    fn test_armor_piercing_skips_mitigation() {
        let config = CombatConfig::default();
        let resolver = DamageResolver::new(&config);
        let mut a = attacker();
        a.combatant.traits = TraitFlags::ARMOR_PIERCING;
        let mut d = defender();

        let outcome = resolver.resolve(&mut a, &mut d, &mut rng());
        assert!(outcome.armor_ignored);
        assert_eq!(outcome.final_damage, outcome.raw_damage);
        assert_eq!(outcome.final_damage, 20.0);
    }

    #[test]
    fn test_enhanced_chance_selects_proc_roll() {
        let mut config = CombatConfig::default();
        config.proc.base_chance = 0.0;
        config.proc.enhanced_chance = 1.0;
        let resolver = DamageResolver::new(&config);

        let mut enhanced = attacker();
        enhanced.combatant.procs = ProcFlags::MASTERY | ProcFlags::ENHANCED_CHANCE;
        let outcome = resolver.resolve(&mut enhanced, &mut defender(), &mut rng());
        assert!(outcome.procced);
        assert!(enhanced.combatant.forced_next_crit());

        let mut base = attacker();
        base.combatant.procs = ProcFlags::MASTERY;
        let outcome = resolver.resolve(&mut base, &mut defender(), &mut rng());
        assert!(!outcome.procced);
        assert!(!base.combatant.forced_next_crit());
    }

    #[test]
    fn test_forced_crit_is_consumed() {
        let config = CombatConfig::default();
        let resolver = DamageResolver::new(&config);
        let (mut a, mut d) = (attacker(), defender());
        a.combatant.force_next_crit();

        let outcome = resolver.resolve(&mut a, &mut d, &mut rng());
        assert!(outcome.was_crit);
        assert_eq!(outcome.raw_damage, 40.0);
        assert!(!a.combatant.forced_next_crit());

        let outcome = resolver.resolve(&mut a, &mut d, &mut rng());
        assert!(!outcome.was_crit);
    }

    #[test]
    fn test_pending_bonus_damage_is_one_shot() {
        let config = CombatConfig::default();
        let resolver = DamageResolver::new(&config);
        let (mut a, mut d) = (attacker(), defender());
        a.combatant.add_pending_bonus_damage(60.0);

        let outcome = resolver.resolve(&mut a, &mut d, &mut rng());
        assert_eq!(outcome.bonus_damage, 60.0);
        assert_eq!(outcome.raw_damage, 80.0);

        let outcome = resolver.resolve(&mut a, &mut d, &mut rng());
        assert_eq!(outcome.bonus_damage, 0.0);
        assert_eq!(outcome.raw_damage, 20.0);
    }

    #[test]
    fn test_guaranteed_proc_applies_every_owned_effect() {
        let mut config = CombatConfig::default();
        config.proc.base_chance = 1.0;
        let resolver = DamageResolver::new(&config);
        let mut a = attacker();
        a.combatant.procs = ProcFlags::EFFECTS;
        a.combatant = a.combatant.with_hp(50.0);
        let mut d = defender();

        let outcome = resolver.resolve(&mut a, &mut d, &mut rng());
        assert!(outcome.procced);
        assert_eq!(outcome.raw_damage, 20.0 * config.proc.damage_multiplier);
        assert!(a.combatant.forced_next_crit());
        assert!(a.combatant.shield().is_some());
        assert!(a.combatant.haste().is_some());
        assert_eq!(outcome.proc_heal, config.proc.heal_amount);
        assert!(d.combatant.is_stunned());
        assert_eq!(outcome.stun_seconds, Some(1.0));
    }

    #[test]
    fn test_disabled_stun_leaves_defender_free() {
        let mut config = CombatConfig::default();
        config.proc.base_chance = 1.0;
        config.proc.stun = None;
        let resolver = DamageResolver::new(&config);
        let mut a = attacker();
        a.combatant.procs = ProcFlags::STORM;
        let mut d = defender();

        let outcome = resolver.resolve(&mut a, &mut d, &mut rng());
        assert!(outcome.procced);
        assert_eq!(outcome.stun_seconds, None);
        assert!(!d.combatant.is_stunned());
    }

    #[test]
    fn test_enhanced_duration_stretches_timed_effects() {
        let mut config = CombatConfig::default();
        config.proc.base_chance = 1.0;
        let resolver = DamageResolver::new(&config);
        let mut a = attacker();
        a.combatant.procs = ProcFlags::SHIELD | ProcFlags::ENHANCED_DURATION;
        let mut d = defender();

        resolver.resolve(&mut a, &mut d, &mut rng());
        let shield = a.combatant.shield().unwrap();
        assert_eq!(
            shield.remaining,
            config.proc.shield_seconds * config.proc.enhanced_duration_factor
        );
    }

    #[test]
    fn test_lifesteal_flat_and_proportional() {
        let config = CombatConfig::default();
        let resolver = DamageResolver::new(&config);
        let mut d = defender();

        let mut a = attacker();
        a.combatant = a.combatant.with_hp(50.0).with_lifesteal(Lifesteal::Flat(3.0));
        let outcome = resolver.resolve(&mut a, &mut d, &mut rng());
        assert_eq!(outcome.lifesteal_heal, 3.0);
        assert_eq!(a.combatant.hp(), 53.0);

        let mut a = attacker();
        a.combatant = a
            .combatant
            .with_hp(50.0)
            .with_lifesteal(Lifesteal::Proportional(0.5));
        let outcome = resolver.resolve(&mut a, &mut d, &mut rng());
        assert!((outcome.lifesteal_heal - 7.0).abs() < 1e-9);

        // Capped at max hp
        let mut a = attacker();
        a.combatant = a.combatant.with_lifesteal(Lifesteal::Flat(50.0));
        let outcome = resolver.resolve(&mut a, &mut d, &mut rng());
        assert_eq!(outcome.lifesteal_heal, 0.0);
        assert_eq!(a.combatant.hp(), 100.0);
    }

    #[test]
    fn test_reflect_fires_on_fifth_hit() {
        let config = CombatConfig::default();
        let resolver = DamageResolver::new(&config);
        let mut a = attacker();
        let mut d = defender();
        d.combatant.traits = TraitFlags::REFLECT;
        let mut rng = rng();

        for hit in 1..=4 {
            let outcome = resolver.resolve(&mut a, &mut d, &mut rng);
            assert_eq!(outcome.reflected, None, "hit {hit} must not reflect");
        }
        let outcome = resolver.resolve(&mut a, &mut d, &mut rng);
        // 5% of the attacker's 100 max hp
        assert_eq!(outcome.reflected, Some(5.0));
        assert_eq!(a.combatant.hp(), 95.0);
        assert_eq!(d.combatant.hits_received(), 0);
    }

    #[test]
    fn test_guaranteed_bleed_and_poison() {
        let mut config = CombatConfig::default();
        config.bleed.chance = 1.0;
        config.poison.chance = 1.0;
        let resolver = DamageResolver::new(&config);
        let mut a = attacker();
        a.combatant.traits = TraitFlags::BLEED | TraitFlags::POISON;
        let mut d = defender();

        let outcome = resolver.resolve(&mut a, &mut d, &mut rng());
        assert_eq!(outcome.bleed, Some(EffectApplication::Applied));
        assert_eq!(outcome.poison, Some(EffectApplication::Stacked { stacks: 1 }));

        let bleed = d.effects.bleed().unwrap();
        assert_eq!(bleed.source_attack_power, 20.0);
        assert!((bleed.magnitude - 8.0).abs() < 1e-9);
        assert_eq!(d.effects.poison_stacks(), 1);
    }

    #[test]
    fn test_push_events_orders_attack_first() {
        let mut config = CombatConfig::default();
        config.proc.base_chance = 1.0;
        let resolver = DamageResolver::new(&config);
        let mut a = attacker();
        a.combatant.procs = ProcFlags::STORM;
        let mut d = defender();

        let outcome = resolver.resolve(&mut a, &mut d, &mut rng());
        let mut events = Vec::new();
        outcome.push_events(Side::Player, &mut events);

        assert!(matches!(
            events[0],
            CombatEvent::Attack {
                attacker: Side::Player,
                procced: true,
                ..
            }
        ));
        assert!(events.iter().any(|e| matches!(
            e,
            CombatEvent::Stunned {
                side: Side::Enemy,
                ..
            }
        )));
    }
}
