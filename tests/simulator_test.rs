//! Campaign simulator smoke tests.

use skirmish::core::GameConfig;
use skirmish::simulator::{run_simulation, SimConfig};

#[test]
fn test_seeded_simulation_is_reproducible() {
    let config = SimConfig::quick(42);
    let game = GameConfig::default();

    let a = run_simulation(&config, &game);
    let b = run_simulation(&config, &game);

    assert_eq!(a.num_runs, 10);
    assert_eq!(a.run_stats, b.run_stats);
    assert_eq!(a.per_level, b.per_level);
}

#[test]
fn test_report_covers_every_level() {
    let config = SimConfig {
        num_runs: 3,
        seed: Some(5),
        levels: 6,
        ..Default::default()
    };
    let report = run_simulation(&config, &GameConfig::default());

    assert_eq!(report.per_level.len(), 6);
    // Every run reaches level 1
    assert_eq!(report.per_level[0].attempts, 3);
    // Level 5 is the first boss level
    let level_five = &report.per_level[4];
    if level_five.attempts > 0 {
        assert!(level_five.boss);
    }
    for pair in report.per_level.windows(2) {
        assert!(pair[1].attempts <= pair[0].attempts);
    }
    assert!(report.to_json().contains("\"per_level\""));
}

#[test]
fn test_level_one_is_cleared_by_the_starting_player() {
    let config = SimConfig {
        num_runs: 5,
        seed: Some(1),
        levels: 1,
        ..Default::default()
    };
    let report = run_simulation(&config, &GameConfig::default());
    assert_eq!(report.runs_completed, 5);
    assert_eq!(report.per_level[0].win_rate(), 1.0);
}
