//! Headless campaign simulator for balance analysis.
//!
//! Runs many seeded playthroughs of consecutive levels to see where the
//! difficulty curve bites:
//! - Win rate per level
//! - Battle length and player DPS
//! - How well the solver hit each level's power target
//!
//! The simulator drives the real [`Battle`](crate::combat::Battle) engine and
//! the real enemy generator, so results match actual gameplay.

mod config;
mod report;
mod runner;

pub use config::SimConfig;
pub use report::{LevelStats, SimReport};
pub use runner::{
    run_simulation, simulate_single_run, starting_player, BattleRecord, RunStats,
    UPGRADE_ROTATION,
};
