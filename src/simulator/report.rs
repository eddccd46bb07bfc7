//! Simulation report generation.

use serde::Serialize;

use super::runner::RunStats;
use crate::balance::solver::BalanceRating;

/// Aggregates for one level across every run that reached it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelStats {
    pub level: u32,
    pub attempts: u32,
    pub wins: u32,
    pub timeouts: u32,
    pub boss: bool,
    pub avg_ticks: f64,
    pub avg_player_dps: f64,
    /// Solver rating for this level's enemy (the solve is deterministic).
    pub rating: Option<BalanceRating>,
}

impl LevelStats {
    pub fn win_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            f64::from(self.wins) / f64::from(self.attempts)
        }
    }
}

/// Aggregated results from multiple simulation runs.
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub num_runs: u32,
    pub levels: u32,
    /// Runs that cleared every level.
    pub runs_completed: u32,
    pub avg_levels_cleared: f64,
    pub avg_battle_ticks: f64,
    pub per_level: Vec<LevelStats>,

    #[serde(skip)]
    pub run_stats: Vec<RunStats>,
}

impl SimReport {
    /// Create a new report from completed run stats.
    pub fn from_runs(runs: Vec<RunStats>, levels: u32) -> Self {
        let num_runs = runs.len() as u32;
        let runs_completed = runs.iter().filter(|r| r.levels_cleared >= levels).count() as u32;
        let avg_levels_cleared = runs
            .iter()
            .map(|r| f64::from(r.levels_cleared))
            .sum::<f64>()
            / f64::from(num_runs.max(1));

        let battles: Vec<_> = runs.iter().flat_map(|r| r.battles.iter()).collect();
        let avg_battle_ticks =
            battles.iter().map(|b| b.ticks as f64).sum::<f64>() / battles.len().max(1) as f64;

        let per_level = (1..=levels)
            .map(|level| {
                let at_level: Vec<_> = battles.iter().filter(|b| b.level == level).collect();
                let attempts = at_level.len() as u32;
                let denominator = f64::from(attempts.max(1));
                LevelStats {
                    level,
                    attempts,
                    wins: at_level.iter().filter(|b| b.won()).count() as u32,
                    timeouts: at_level.iter().filter(|b| b.outcome.is_none()).count() as u32,
                    boss: at_level.iter().any(|b| b.boss),
                    avg_ticks: at_level.iter().map(|b| b.ticks as f64).sum::<f64>() / denominator,
                    avg_player_dps: at_level.iter().map(|b| b.player_dps).sum::<f64>()
                        / denominator,
                    rating: at_level.first().map(|b| b.rating),
                }
            })
            .collect();

        Self {
            num_runs,
            levels,
            runs_completed,
            avg_levels_cleared,
            avg_battle_ticks,
            per_level,
            run_stats: runs,
        }
    }

    /// Generate a human-readable report.
    pub fn to_text(&self) -> String {
        let mut report = String::new();

        report.push_str("═══════════════════════════════════════════════════════════════\n");
        report.push_str("                    SIMULATION REPORT\n");
        report.push_str("═══════════════════════════════════════════════════════════════\n\n");

        report.push_str(&format!(
            "Runs: {} total, {} cleared all {} levels\n",
            self.num_runs, self.runs_completed, self.levels
        ));
        report.push_str(&format!(
            "  Avg Levels Cleared:  {:.1}\n",
            self.avg_levels_cleared
        ));
        report.push_str(&format!(
            "  Avg Battle Length:   {:.0} ticks\n\n",
            self.avg_battle_ticks
        ));

        report.push_str("── PER-LEVEL BREAKDOWN ──────────────────────────────────────────\n");
        report.push_str("  Level  Tries   Win%    Ticks   Hero DPS   Solve\n");
        report.push_str("  ─────  ─────   ─────   ─────   ────────   ─────\n");
        for stats in self.per_level.iter().filter(|s| s.attempts > 0) {
            let rating = stats
                .rating
                .map_or_else(|| "-".to_string(), |r| format!("{r:?}"));
            report.push_str(&format!(
                "  {:5}{} {:5}   {:5.1}   {:5.0}   {:8.1}   {}\n",
                stats.level,
                if stats.boss { "*" } else { " " },
                stats.attempts,
                stats.win_rate() * 100.0,
                stats.avg_ticks,
                stats.avg_player_dps,
                rating
            ));
        }
        report.push_str("  (* boss level)\n\n");

        report.push_str("── BALANCE ASSESSMENT ───────────────────────────────────────────\n");
        let mut flagged = false;
        for stats in &self.per_level {
            if stats.attempts > 0 && stats.win_rate() < 0.5 {
                flagged = true;
                report.push_str(&format!(
                    "  ⚠️  Level {} wins only {:.0}% of attempts\n",
                    stats.level,
                    stats.win_rate() * 100.0
                ));
            }
            if stats.rating.is_some_and(|r| !r.is_acceptable()) {
                flagged = true;
                report.push_str(&format!(
                    "  ⚠️  Level {} enemy misses its power target\n",
                    stats.level
                ));
            }
            if stats.timeouts > 0 {
                flagged = true;
                report.push_str(&format!(
                    "  ⚠️  Level {} had {} battles hit the tick cap\n",
                    stats.level, stats.timeouts
                ));
            }
        }
        if !flagged {
            report.push_str("  No problem levels found\n");
        }

        report.push_str("\n═══════════════════════════════════════════════════════════════\n");

        report
    }

    /// Generate a JSON report for further analysis.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
