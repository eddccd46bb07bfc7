//! Stat solver and enemy generation across a whole campaign.

use proptest::prelude::*;
use skirmish::balance::{
    archetype_for_level, default_archetypes, generate_enemy, BalanceRating, StatSolver,
};
use skirmish::core::{combat_power, damage_reduction, effective_hp, BalanceConfig, GameConfig};

#[test]
fn test_reference_level_one_within_ten_percent() {
    let config = BalanceConfig::default();
    let solved = StatSolver::new(&config).solve(1200.0, 1.0, 1.0);
    assert!(solved.relative_error <= 0.10);
    assert!(solved.iterations <= 50);
}

#[test]
fn test_every_generated_enemy_can_fight() {
    let config = BalanceConfig::default();
    let archetypes = default_archetypes();

    for level in 1..=40 {
        let archetype = archetype_for_level(level, &archetypes).unwrap();
        let enemy = generate_enemy(level, archetype, &config);
        assert!(
            enemy.combatant.validate().is_ok(),
            "level {level} produced {:?}",
            enemy.combatant
        );
        assert!(enemy.solved.relative_error.is_finite());
        assert_eq!(enemy.combatant.max_hp(), enemy.solved.hp);
    }
}

#[test]
fn test_enemy_power_tracks_the_curve() {
    let config = BalanceConfig::default();
    let archetypes = default_archetypes();
    let grunt = &archetypes[0];

    // Same archetype, non-boss levels: later levels must be stronger
    let early = generate_enemy(1, grunt, &config);
    let later = generate_enemy(11, grunt, &config);
    assert!(later.solved.achieved_power > early.solved.achieved_power * 2.0);
    assert_ne!(later.rating, BalanceRating::TooWeak);
}

#[test]
fn test_difficulty_from_config_file_raises_targets() {
    let game = GameConfig::from_json(r#"{ "balance": { "difficulty": 2.0 } }"#).unwrap();
    let archetypes = default_archetypes();
    let grunt = &archetypes[0];

    let normal = generate_enemy(3, grunt, &BalanceConfig::default());
    let hard = generate_enemy(3, grunt, &game.balance);
    assert_eq!(hard.solved.target_power, normal.solved.target_power * 2.0);
}

#[test]
fn test_milestone_curve_from_json() {
    let game = GameConfig::from_json(
        r#"{ "balance": { "curve": { "kind": "milestones", "milestones": [
            { "level": 1, "power": 2000.0 },
            { "level": 3, "power": 8000.0 }
        ] } } }"#,
    )
    .unwrap();
    let target = game.balance.curve.target_power(2);
    assert!((target - 4000.0).abs() < 1e-6);
}

proptest! {
    #[test]
    fn prop_damage_reduction_bounded_and_increasing(a in 0.0f64..1e5, delta in 0.001f64..1e3) {
        let dr = damage_reduction(a);
        prop_assert!((0.0..1.0).contains(&dr));
        prop_assert!(damage_reduction(a + delta) > dr);
    }

    #[test]
    fn prop_effective_hp_never_below_hp(hp in 1.0f64..1e6, armor in 0.0f64..1e4) {
        prop_assert!(effective_hp(hp, armor) >= hp);
    }

    #[test]
    fn prop_combat_power_is_dps_times_ehp(
        attack in 0.0f64..1e3,
        speed in 0.1f64..5.0,
        hp in 1.0f64..1e5,
        armor in 0.0f64..500.0,
    ) {
        let power = combat_power(attack, speed, hp, armor);
        let expected = attack * speed * hp * (1.0 + armor / 100.0);
        prop_assert!((power - expected).abs() <= 1e-9 * expected.max(1.0));
    }
}
