//! Enemy balancing: target curves, the stat solver, and enemy generation.

pub mod display;
pub mod enemy;
pub mod solver;
pub mod targets;

pub use display::{display_power, format_power};
pub use enemy::{
    archetype_for_level, default_archetypes, generate_enemy, is_boss_level, BossAbility,
    EncounterKind, EnemyArchetype, GeneratedEnemy,
};
pub use solver::{
    BalanceBands, BalanceRating, BalanceTarget, ReferenceStats, SolvedStats, SolverConfig,
    StatSolver,
};
pub use targets::{balance_target, Milestone, TargetCurve};
