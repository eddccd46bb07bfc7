//! Campaign runner built on the real battle engine.
//!
//! Each run takes a fresh player through consecutive levels against solved
//! enemies, stopping at the first loss. Statistics are collected from the
//! battle summaries; the runner never reaches into combat internals.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::config::SimConfig;
use super::report::SimReport;
use crate::balance::enemy::{
    archetype_for_level, default_archetypes, generate_enemy, EnemyArchetype,
};
use crate::balance::solver::BalanceRating;
use crate::combat::engine::Battle;
use crate::combat::events::BattleOutcome;
use crate::combat::types::{Combatant, Lifesteal, ProcFlags, Side, TraitFlags, Upgrade};
use crate::core::config::GameConfig;
use crate::error::CombatError;

/// Upgrades granted after each win, in order, then repeating.
pub const UPGRADE_ROTATION: [Upgrade; 10] = [
    Upgrade::Attack(4.0),
    Upgrade::MaxHp(25.0),
    Upgrade::Armor(5.0),
    Upgrade::AttackSpeedPercent(10.0),
    Upgrade::CritChance(0.05),
    Upgrade::Proc(ProcFlags::FURY),
    Upgrade::FlatReduction(2.0),
    Upgrade::Lifesteal(Lifesteal::Flat(2.0)),
    Upgrade::Trait(TraitFlags::BLEED),
    Upgrade::Proc(ProcFlags::SHIELD),
];

/// The persistent player every run starts with.
pub fn starting_player() -> Combatant {
    Combatant::new("Hero", 100.0, 20.0, 0.5, 20.0)
        .with_flat_reduction(5.0)
        .with_crit_chance(0.1)
}

/// One battle within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleRecord {
    pub level: u32,
    /// `None` if the battle hit the tick cap.
    pub outcome: Option<BattleOutcome>,
    pub boss: bool,
    pub ticks: u64,
    pub player_dps: f64,
    pub player_hp_left: f64,
    pub rating: BalanceRating,
}

impl BattleRecord {
    pub fn won(&self) -> bool {
        self.outcome == Some(BattleOutcome::Won)
    }
}

/// Everything recorded for one campaign.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub levels_cleared: u32,
    pub total_ticks: u64,
    pub battles: Vec<BattleRecord>,
}

/// Run the full simulation and return a report.
pub fn run_simulation(config: &SimConfig, game: &GameConfig) -> SimReport {
    let archetypes = default_archetypes();
    let mut all_runs = Vec::with_capacity(config.num_runs as usize);

    for run_idx in 0..config.num_runs {
        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(u64::from(run_idx))),
            None => ChaCha8Rng::from_entropy(),
        };

        let run = simulate_single_run(config, game, &archetypes, &mut rng);
        info!(
            run = run_idx + 1,
            of = config.num_runs,
            levels_cleared = run.levels_cleared,
            ticks = run.total_ticks,
            "run finished"
        );
        all_runs.push(run);
    }

    SimReport::from_runs(all_runs, config.levels)
}

/// Play one campaign from level 1 until the first loss or the last level.
pub fn simulate_single_run(
    config: &SimConfig,
    game: &GameConfig,
    archetypes: &[EnemyArchetype],
    rng: &mut ChaCha8Rng,
) -> RunStats {
    let mut stats = RunStats::default();
    let mut player = starting_player();

    for level in 1..=config.levels {
        let Some(archetype) = archetype_for_level(level, archetypes) else {
            warn!("no enemy archetypes configured");
            break;
        };
        let enemy = generate_enemy(level, archetype, &game.balance);
        let boss = enemy.is_boss();
        let rating = enemy.rating;

        let mut battle = match Battle::new(player, enemy.combatant, game.combat.clone()) {
            Ok(battle) => battle,
            Err(err) => {
                warn!(level, %err, "battle rejected");
                break;
            }
        };
        match battle.run_to_completion(rng, config.max_ticks_per_battle) {
            Ok(_) => {}
            Err(CombatError::TickLimitExceeded { ticks }) => {
                warn!(level, ticks, "battle hit the tick cap");
            }
            Err(err) => {
                warn!(level, %err, "battle aborted");
            }
        }

        let summary = battle.into_summary();
        let record = BattleRecord {
            level,
            outcome: summary.outcome,
            boss,
            ticks: summary.stats.ticks,
            player_dps: summary.stats.average_dps(Side::Player),
            player_hp_left: summary.player.hp(),
            rating,
        };
        debug!(level, outcome = ?record.outcome, ticks = record.ticks, "battle recorded");
        stats.total_ticks += record.ticks;
        let won = record.won();
        stats.battles.push(record);

        if !won {
            break;
        }
        stats.levels_cleared += 1;

        player = summary.player;
        player.reset_after_battle();
        if config.heal_between_battles {
            player.heal_full();
        }
        if config.upgrade_each_win {
            let slot = (stats.levels_cleared as usize - 1) % UPGRADE_ROTATION.len();
            player.apply_upgrade(UPGRADE_ROTATION[slot]);
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_player_is_valid() {
        assert!(starting_player().validate().is_ok());
        assert_eq!(starting_player().ticks_per_attack(), 40);
    }

    #[test]
    fn test_run_stops_at_first_loss() {
        let config = SimConfig {
            levels: 50,
            upgrade_each_win: false,
            ..SimConfig::quick(3)
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let run = simulate_single_run(
            &config,
            &GameConfig::default(),
            &default_archetypes(),
            &mut rng,
        );

        assert!(!run.battles.is_empty());
        let losses = run.battles.iter().filter(|b| !b.won()).count();
        assert!(losses <= 1);
        if losses == 1 {
            assert!(!run.battles.last().unwrap().won());
        }
        assert_eq!(run.levels_cleared as usize, run.battles.len() - losses);
        assert_eq!(
            run.total_ticks,
            run.battles.iter().map(|b| b.ticks).sum::<u64>()
        );
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let config = SimConfig::quick(11);
        let game = GameConfig::default();
        let archetypes = default_archetypes();

        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let a = simulate_single_run(&config, &game, &archetypes, &mut rng);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let b = simulate_single_run(&config, &game, &archetypes, &mut rng);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_archetype_list_ends_run() {
        let config = SimConfig::quick(1);
        let run = simulate_single_run(
            &config,
            &GameConfig::default(),
            &[],
            &mut ChaCha8Rng::seed_from_u64(1),
        );
        assert!(run.battles.is_empty());
        assert_eq!(run.levels_cleared, 0);
    }
}
