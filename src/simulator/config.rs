//! Simulation configuration.

use crate::core::constants::DEFAULT_MAX_BATTLE_TICKS;

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of simulated campaigns
    pub num_runs: u32,

    /// Random seed for reproducibility (None = random). Run `i` uses `seed + i`.
    pub seed: Option<u64>,

    /// Levels in one campaign
    pub levels: u32,

    /// A battle still going after this many ticks counts as a loss
    pub max_ticks_per_battle: u64,

    /// Restore the player to full hp after each win
    pub heal_between_battles: bool,

    /// Apply the next upgrade from the rotation after each win
    pub upgrade_each_win: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_runs: 100,
            seed: None,
            levels: 20,
            max_ticks_per_battle: DEFAULT_MAX_BATTLE_TICKS,
            heal_between_battles: true,
            upgrade_each_win: true,
        }
    }
}

impl SimConfig {
    /// Small seeded config for quick balance checks.
    pub fn quick(seed: u64) -> Self {
        Self {
            num_runs: 10,
            seed: Some(seed),
            levels: 10,
            ..Default::default()
        }
    }
}
