//! Status effects and combo rewards exercised through the resolver and battle.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use skirmish::combat::{
    Battle, CombatEvent, Combatant, DamageResolver, EffectKind, Fighter, Side, TickReport,
    TraitFlags,
};
use skirmish::core::CombatConfig;

fn sparring_pair() -> (Fighter, Fighter) {
    let attacker = Combatant::new("Duelist", 100.0, 10.0, 1.0, 0.0).with_traits(TraitFlags::COMBO);
    let dummy = Combatant::new("Dummy", 100_000.0, 0.0, 1.0, 0.0);
    (Fighter::new(attacker), Fighter::new(dummy))
}

#[test]
fn test_fifth_combo_hit_forces_sixth_to_crit() {
    let config = CombatConfig::default();
    let resolver = DamageResolver::new(&config);
    let (mut attacker, mut dummy) = sparring_pair();
    let mut rng = ChaCha8Rng::seed_from_u64(9);

    let crits: Vec<bool> = (0..6)
        .map(|_| resolver.resolve(&mut attacker, &mut dummy, &mut rng).was_crit)
        .collect();
    assert_eq!(crits, [false, false, false, false, false, true]);
}

#[test]
fn test_twentieth_combo_hit_grants_bonus_damage() {
    let config = CombatConfig::default();
    let resolver = DamageResolver::new(&config);
    let (mut attacker, mut dummy) = sparring_pair();
    let mut rng = ChaCha8Rng::seed_from_u64(9);

    for _ in 0..20 {
        resolver.resolve(&mut attacker, &mut dummy, &mut rng);
    }
    assert_eq!(attacker.effects.combo().hit_count, 0);
    assert_eq!(attacker.combatant.pending_bonus_damage(), 30.0);

    let next = resolver.resolve(&mut attacker, &mut dummy, &mut rng);
    assert_eq!(next.bonus_damage, 30.0);
    assert_eq!(next.raw_damage, 40.0);
    assert_eq!(attacker.combatant.pending_bonus_damage(), 0.0);
}

#[test]
fn test_slow_attacker_never_builds_a_combo() {
    // One swing every 2s: the window closes before the next hit lands
    let config = CombatConfig::default();
    let attacker = Combatant::new("Sloth", 100.0, 10.0, 0.5, 0.0).with_traits(TraitFlags::COMBO);
    let dummy = Combatant::new("Dummy", 100_000.0, 0.0, 1.0, 0.0);
    let mut battle = Battle::new(attacker, dummy, config).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    battle.start().unwrap();

    let mut milestones = 0;
    for _ in 0..(40 * 12) {
        let report = battle.tick(&mut rng).unwrap();
        milestones += report
            .events
            .iter()
            .filter(|e| matches!(e, CombatEvent::ComboMilestone { .. }))
            .count();
    }
    assert_eq!(milestones, 0);
    assert_eq!(battle.stats().player.crits, 0);
}

#[test]
fn test_poison_ticks_through_armor_in_battle() {
    let mut config = CombatConfig::default();
    config.poison.chance = 1.0;
    let viper = Combatant::new("Viper", 100.0, 0.0, 1.0, 0.0).with_traits(TraitFlags::POISON);
    let golem = Combatant::new("Golem", 1000.0, 0.0, 1.0, 500.0);
    let mut battle = Battle::new(viper, golem, config).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    battle.start().unwrap();

    let mut poison_damage = 0.0_f64;
    let mut observer = |_: &Battle, report: &TickReport| {
        for event in &report.events {
            if let CombatEvent::PeriodicDamage {
                kind: EffectKind::Poison,
                amount,
                ..
            } = event
            {
                poison_damage += *amount;
            }
        }
    };
    // First hit lands on tick 20; the second would land on tick 40
    for _ in 0..39 {
        battle.run_batch(&mut rng, &mut observer).unwrap();
    }

    // 0.5% of 1000 max hp per second for 20 ticks
    assert!((poison_damage - 5.0).abs() < 1e-6, "poison dealt {poison_damage}");
    assert_eq!(battle.fighter(Side::Enemy).effects.poison_stacks(), 1);
    assert!((battle.enemy().hp() - 995.0).abs() < 1e-6);
}

#[test]
fn test_bleed_keeps_stronger_instance_in_battle() {
    let mut config = CombatConfig::default();
    config.bleed.chance = 1.0;
    let mut attacker = Fighter::new(
        Combatant::new("Butcher", 100.0, 50.0, 1.0, 0.0).with_traits(TraitFlags::BLEED),
    );
    let mut dummy = Fighter::new(Combatant::new("Dummy", 100_000.0, 0.0, 1.0, 0.0));
    let resolver = DamageResolver::new(&config);
    let mut rng = ChaCha8Rng::seed_from_u64(8);

    resolver.resolve(&mut attacker, &mut dummy, &mut rng);
    attacker.combatant.attack = 30.0;
    resolver.resolve(&mut attacker, &mut dummy, &mut rng);

    let bleed = dummy.effects.bleed().unwrap();
    assert_eq!(bleed.source_attack_power, 50.0);
    assert!((bleed.magnitude - 20.0).abs() < 1e-9);
    assert_eq!(bleed.remaining, config.bleed.duration_seconds);
}
